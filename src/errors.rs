/* ************************************************************************ **
** This file is part of rsp2, and is licensed under EITHER the MIT license  **
** or the Apache 2.0 license, at your option.                               **
**                                                                          **
**     http://www.apache.org/licenses/LICENSE-2.0                           **
**     http://opensource.org/licenses/MIT                                   **
**                                                                          **
** Be aware that not all of rsp2 is provided under this permissive license, **
** and that the project as a whole is licensed under the GPL 3.0.           **
** ************************************************************************ */

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Failures signaled by sizing, assignment, and sampling operations.
///
/// Misuse that is a plain programming error (indexing out of bounds,
/// combining differently-sized operands with an arithmetic operator)
/// panics instead.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("incompatible vector sizes: expected {expected}, got {actual}")]
    VectorSizeMismatch { expected: usize, actual: usize },

    #[error("incompatible matrix sizes: expected {}x{}, got {}x{}", .expected.0, .expected.1, .actual.0, .actual.1)]
    MatrixSizeMismatch { expected: (usize, usize), actual: (usize, usize) },

    #[error("failed to allocate {count} elements of {elem_size} bytes each")]
    AllocationFailure { count: usize, elem_size: usize },
}

impl Error {
    pub(crate) fn invalid_argument(msg: impl Into<String>) -> Self
    { Error::InvalidArgument(msg.into()) }

    pub(crate) fn allocation_failure<X>(count: usize) -> Self
    { Error::AllocationFailure { count, elem_size: std::mem::size_of::<X>() } }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages() {
        let e = Error::MatrixSizeMismatch { expected: (2, 3), actual: (3, 2) };
        assert_eq!(e.to_string(), "incompatible matrix sizes: expected 2x3, got 3x2");

        let e = Error::allocation_failure::<f64>(10);
        assert_eq!(e.to_string(), "failed to allocate 10 elements of 8 bytes each");
    }
}
