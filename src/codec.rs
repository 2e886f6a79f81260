//! Codec descriptors for tokenization schemes.

use alloc::string::String;

use crate::{Encoding, InitializationError, RankMap, SpecialMap};

/// Descriptor of a tokenization scheme.
///
/// Holds the pre-tokenization pattern, the mergeable ranks and the special
/// tokens of one encoding. Used for initializing an [`Encoding`].
///
/// The rank of a token doubles as its merge priority: lower ranks are merged
/// earlier. Every single byte `0x00..=0xFF` must be present in
/// `mergeable_ranks` so any input byte sequence stays representable, and
/// special token ids must not collide with mergeable ranks.
#[derive(Debug, Clone, PartialEq)]
pub struct Codec {
    /// Human-readable identifier of the scheme.
    pub name:             String,
    /// The pre-tokenization regex pattern.
    pub pat_str:          String,
    /// Mapping from token bytes to merge rank.
    pub mergeable_ranks:  RankMap,
    /// Mapping from special token literals to their id.
    pub special_tokens:   SpecialMap,
    /// The expected total vocabulary size, if known.
    /// Checked against the rank and special token counts during initialization.
    pub explicit_n_vocab: Option<usize>,
}

impl TryFrom<Codec> for Encoding {
    type Error = InitializationError;

    fn try_from(value: Codec) -> Result<Self, Self::Error> {
        Encoding::new(value)
    }
}

impl Codec {
    /// Returns the total vocabulary size, counting mergeable ranks and special tokens.
    #[inline(always)]
    pub fn vocab_size(&self) -> usize {
        self.mergeable_ranks.len() + self.special_tokens.len()
    }
}
