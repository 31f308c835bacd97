use std::convert::Infallible;
use std::fmt;

/// The allocation strategy could not provide a block or the block table
/// could not be resized.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AllocError;

impl fmt::Display for AllocError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("memory allocation failed")
    }
}

impl std::error::Error for AllocError {}

/// Failures reported by [`ChunkedDeque`](crate::ChunkedDeque).
///
/// `E` is the error type of a fallible element constructor passed to the
/// `emplace*` family. Operations that never run user constructors use the
/// default `Infallible`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Error<E = Infallible> {
    /// `pop_*` was called on an empty deque.
    EmptyContainer,
    /// Checked access or a positional operation addressed a slot outside the
    /// live range. Cursors that lie before the front report `usize::MAX`.
    IndexOutOfRange { index: usize, len: usize },
    /// The block table could not be grown or initially allocated.
    AllocationFailure(AllocError),
    /// The element constructor returned an error.
    ElementConstruction(E),
}

impl<E> From<AllocError> for Error<E> {
    fn from(err: AllocError) -> Self {
        Error::AllocationFailure(err)
    }
}

impl<E: fmt::Display> fmt::Display for Error<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::EmptyContainer => f.write_str("pop from an empty deque"),
            Error::IndexOutOfRange { index, len } => {
                write!(f, "index out of range: the len is {len} but the index is {index}")
            }
            Error::AllocationFailure(err) => write!(f, "block table allocation failed: {err}"),
            Error::ElementConstruction(err) => write!(f, "element construction failed: {err}"),
        }
    }
}

impl<E: fmt::Debug + fmt::Display> std::error::Error for Error<E> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::AllocationFailure(err) => Some(err),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{AllocError, Error};

    #[test]
    fn display_messages() {
        let err: Error = Error::IndexOutOfRange { index: 7, len: 3 };
        assert_eq!(
            err.to_string(),
            "index out of range: the len is 3 but the index is 7"
        );
        let err: Error = Error::EmptyContainer;
        assert_eq!(err.to_string(), "pop from an empty deque");
        let err: Error<&str> = Error::ElementConstruction("boom");
        assert_eq!(err.to_string(), "element construction failed: boom");
    }

    #[test]
    fn alloc_error_is_source() {
        use std::error::Error as _;

        let err: Error = AllocError.into();
        assert_eq!(err, Error::AllocationFailure(AllocError));
        assert!(err.source().is_some());
    }
}
