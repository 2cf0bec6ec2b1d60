// ============================================================================
// mantle-collections - Errors
// The single error taxonomy shared by every container and decorator
// ============================================================================

use thiserror::Error;

/// Errors produced by the containers and decorators in this crate.
///
/// Decorators never translate errors from the store they wrap: anything a
/// backing container returns passes through a decorator unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CollectionError {
    /// A keyed insert derived a key that is already present in the index.
    /// The rejected operation has no effect on either structure.
    #[error("an element with the same key is already present")]
    DuplicateKey,

    /// A by-key lookup did not find the key.
    #[error("key not found")]
    KeyNotFound,

    /// `unwrap()` was called on a wrapper whose backing store was kept
    /// private at construction time.
    #[error("the wrapped container is not public")]
    InvalidState,

    /// A sequence operation addressed a position outside the live range.
    #[error("index {index} out of bounds (len {len})")]
    IndexOutOfBounds {
        /// The offending index.
        index: usize,
        /// The sequence length at the time of the call.
        len: usize,
    },
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages() {
        assert_eq!(
            CollectionError::DuplicateKey.to_string(),
            "an element with the same key is already present"
        );
        assert_eq!(
            CollectionError::IndexOutOfBounds { index: 5, len: 3 }.to_string(),
            "index 5 out of bounds (len 3)"
        );
    }

    #[test]
    fn errors_are_comparable() {
        assert_eq!(CollectionError::KeyNotFound, CollectionError::KeyNotFound);
        assert_ne!(CollectionError::KeyNotFound, CollectionError::InvalidState);
    }
}
