//! Error types for fastbidi
//!
//! The resolver distinguishes two failure classes:
//!
//! - **Contract violations** ([`Error::MismatchedInputs`]): the caller
//!   passed inconsistent inputs. These indicate a bug in the calling code,
//!   never a property of the text, and fail fast.
//! - **Internal faults** ([`Error::Internal`]): a run-list invariant was
//!   violated mid-resolution. These should never occur; callers that want
//!   to keep rendering should fall back to uniform base-direction levels.
//!
//! Capacity overflow (too many nested embeddings, isolates, or bracket
//! pairs) is *not* an error: the resolver degrades gracefully and still
//! assigns a level to every character.
//!
//! All errors use the `thiserror` crate for minimal boilerplate and proper
//! error trait implementations.

use thiserror::Error;

/// Result type alias for fastbidi operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced by the embedding-level resolver.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The bracket slice is neither empty nor the same length as the class
    /// slice.
    #[error(
        "bracket types must be empty or match the character classes in length \
         (got {bracket_len} brackets for {class_len} classes)"
    )]
    MismatchedInputs {
        /// Number of character classes supplied.
        class_len: usize,
        /// Number of bracket types supplied.
        bracket_len: usize,
    },

    /// A run-list invariant failed during resolution. Indicates a bug in
    /// this crate, not in the input.
    #[error("internal run-list fault: {0}")]
    Internal(&'static str),
}
