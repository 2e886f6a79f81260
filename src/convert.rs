//! Loaders for external vocabulary data formats.

use alloc::string::String;

use crate::InitializationError;

#[cfg(feature = "convert-claude")]
mod claude;
#[cfg(feature = "convert-claude")]
pub use claude::*;

#[cfg(feature = "convert-tiktoken")]
mod tiktoken;
#[cfg(feature = "convert-tiktoken")]
pub use tiktoken::*;

/// Errors encountered when loading a vocabulary fails.
#[non_exhaustive]
#[derive(Debug)]
#[cfg_attr(feature = "std", derive(thiserror::Error))]
pub enum ConvertError {
    /// The vocabulary input is empty.
    #[cfg_attr(feature = "std", error("empty vocab"))]
    EmptyVocab,
    /// A vocabulary entry failed to parse. See the error message for more information.
    #[cfg_attr(feature = "std", error("malformed vocab entry: {0}"))]
    MalformedEntry(String),
    /// The rank offset is negative.
    #[cfg_attr(feature = "std", error("negative offset: {0}"))]
    NegativeOffset(i64),
    /// A derived rank does not fit the 32-bit range.
    #[cfg_attr(feature = "std", error("integer overflow in rank calculation: {0}"))]
    Overflow(String),
    /// The data is invalid. See the error message for more information.
    #[cfg_attr(feature = "std", error("invalid data: {0}"))]
    InvalidData(String),
    /// The encoding failed to initialize.
    #[cfg_attr(feature = "std", error("{0}"))]
    InitializationError(InitializationError),
    /// Reading the data failed.
    #[cfg(feature = "std")]
    #[error("{0}")]
    IOError(#[from] std::io::Error),
}
impl From<InitializationError> for ConvertError {
    fn from(e: InitializationError) -> Self {
        Self::InitializationError(e)
    }
}
