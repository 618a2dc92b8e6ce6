//! Errors returned by list and cursor operations.

/// A `Result` whose error type defaults to [`Error`].
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// The ways in which a list or cursor operation can fail.
///
/// Every fallible operation in this crate returns one of these. Failures
/// never leave a list half-mutated: either the operation completed, or the
/// list is exactly as it was before the call.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// An argument was rejected, such as a zero-sized element type.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    /// Storage for a new node could not be allocated, or the list's
    /// [`Policy`](crate::Policy) failed to duplicate an element.
    #[error("out of memory")]
    OutOfMemory,

    /// The cursor's list was structurally changed through another handle, or
    /// the cursor was used with a list other than the one it was created for.
    #[error("cursor was invalidated by a structural change to its list")]
    InvalidIterator,

    /// The operation requires at least one element.
    #[error("the list is empty")]
    EmptyCollection,

    /// No element compared equal to the value being removed.
    #[error("element not found")]
    NotFound,

    /// A positional seek named an index past the end of the list.
    #[error("index {index} is out of range for a list of length {len}")]
    OutOfRange {
        /// The requested index.
        index: usize,
        /// The length of the list at the time of the request.
        len: usize,
    },

    /// The cursor has no element in the requested direction.
    #[error("cursor has no element in that direction")]
    IteratorExhausted,
}

impl Error {
    /// Returns a short, stable name for this kind of error, suitable for use
    /// as a structured logging field.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::InvalidArgument(_) => "invalid_argument",
            Error::OutOfMemory => "out_of_memory",
            Error::InvalidIterator => "invalid_iterator",
            Error::EmptyCollection => "empty_collection",
            Error::NotFound => "not_found",
            Error::OutOfRange { .. } => "out_of_range",
            Error::IteratorExhausted => "iterator_exhausted",
        }
    }
}

/// Logs a failed operation at the `debug` level and returns the error.
#[inline]
pub(crate) fn fail<T>(op: &'static str, error: Error) -> Result<T> {
    tracing::debug!(op, error = error.kind(), "{error}");
    Err(error)
}
