#![cfg_attr(docsrs, doc = include_str!("../README.md"))]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![cfg_attr(docsrs, deny(missing_docs))]
#![warn(missing_debug_implementations)]
//! Arena-backed singly- and doubly-linked lists with detached cursors.
//!
//! This crate provides two list types:
//!
//! - [`List`], a doubly-linked list with a bidirectional [`list::Cursor`]
//!   supporting positional seeks, and
//! - [`SList`], a singly-linked list with a forward-only
//!   [`slist::Cursor`].
//!
//! Both store their nodes in an internal arena, so links are indices rather
//! than pointers, and neither requires `unsafe` code.
//!
//! Cursors are *detached*: they do not borrow the list they traverse, and are
//! handed the list on every call. A cursor notices when its list has been
//! structurally changed through some other handle, and fails with
//! [`Error::InvalidIterator`] rather than walking stale links.
//!
//! Each list owns a [`Policy`] that decides how elements are duplicated,
//! released, and compared. [`DefaultPolicy`] uses [`Clone`], [`Drop`] and
//! [`Ord`]; [`Hooks`] accepts closures for any of the three.
//!
//! # Logging
//!
//! Structural operations emit [`tracing`] events at the `TRACE` level, and
//! failed operations emit `DEBUG` events naming the operation and the error.
//! No subscriber is installed by this crate.
//!
//! [`tracing`]: https://docs.rs/tracing

mod arena;
pub(crate) mod util;
pub mod error;
pub mod list;
pub mod policy;
pub mod slist;

#[doc(inline)]
pub use self::error::{Error, Result};
#[doc(inline)]
pub use self::list::List;
#[doc(inline)]
pub use self::policy::{DefaultPolicy, Hooks, Policy};
#[doc(inline)]
pub use self::slist::SList;
