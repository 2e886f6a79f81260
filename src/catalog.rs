//! Catalog of known encodings and model mappings.
//!
//! Holds the pre-tokenization patterns and special token tables of the
//! bundled encodings, constructors that combine them with caller-provided
//! vocabulary data, and the lookup from model names to encoding names.

use alloc::string::{String, ToString};

#[cfg(feature = "convert-tiktoken")]
use crate::convert::{ConvertError, parse_tiktoken};
#[cfg(feature = "convert-tiktoken")]
use crate::{Codec, Encoding, SpecialMap, TokenId};

/// Name of the GPT-2 encoding.
pub const GPT2: &str = "gpt2";
/// Name of the r50k encoding.
pub const R50K_BASE: &str = "r50k_base";
/// Name of the p50k encoding.
pub const P50K_BASE: &str = "p50k_base";
/// Name of the p50k edit encoding.
pub const P50K_EDIT: &str = "p50k_edit";
/// Name of the cl100k encoding.
pub const CL100K_BASE: &str = "cl100k_base";
/// Name of the o200k encoding.
pub const O200K_BASE: &str = "o200k_base";
/// Name of the Claude encoding.
pub const CLAUDE: &str = "claude";

/// End-of-text marker literal.
pub const END_OF_TEXT: &str = "<|endoftext|>";
/// Fill-in-the-middle prefix section literal.
pub const FIM_PREFIX: &str = "<|fim_prefix|>";
/// Fill-in-the-middle middle section literal.
pub const FIM_MIDDLE: &str = "<|fim_middle|>";
/// Fill-in-the-middle suffix section literal.
pub const FIM_SUFFIX: &str = "<|fim_suffix|>";
/// End-of-prompt marker literal.
pub const END_OF_PROMPT: &str = "<|endofprompt|>";

/// Pre-tokenization pattern shared by the GPT-2, r50k and p50k encodings.
pub const R50K_PATTERN: &str =
    r"'s|'t|'re|'ve|'m|'ll|'d| ?\p{L}+| ?\p{N}+| ?[^\s\p{L}\p{N}]+|\s+(?!\S)|\s+";
/// Pre-tokenization pattern of the cl100k encoding.
pub const CL100K_PATTERN: &str = r"(?i:'s|'t|'re|'ve|'m|'ll|'d)|[^\r\n\p{L}\p{N}]?\p{L}+|\p{N}{1,3}| ?[^\s\p{L}\p{N}]+[\r\n]*|\s*[\r\n]+|\s+(?!\S)|\s+";
/// Pre-tokenization pattern of the o200k encoding.
pub const O200K_PATTERN: &str = r"[^\r\n\p{L}\p{N}]?[\p{Lu}\p{Lt}\p{Lm}\p{Lo}\p{M}]*[\p{Ll}\p{Lm}\p{Lo}\p{M}]+(?i:'s|'t|'re|'ve|'m|'ll|'d)?|[^\r\n\p{L}\p{N}]?[\p{Lu}\p{Lt}\p{Lm}\p{Lo}\p{M}]+[\p{Ll}\p{Lm}\p{Lo}\p{M}]*(?i:'s|'t|'re|'ve|'m|'ll|'d)?|\p{N}{1,3}| ?[^\s\p{L}\p{N}]+[\r\n/]*|\s*[\r\n]+|\s+(?!\S)|\s+";

/// Mapping from exact model names to their encoding name.
static MODEL_ENCODINGS: &[(&str, &str)] = &[
    ("gpt2", GPT2),
    ("gpt-4o", O200K_BASE),
    ("gpt-4", CL100K_BASE),
    ("gpt-3.5-turbo", CL100K_BASE),
    ("gpt-3.5", CL100K_BASE),
    ("gpt-35-turbo", CL100K_BASE),
    ("text-embedding-ada-002", CL100K_BASE),
    ("text-embedding-3-small", CL100K_BASE),
    ("text-embedding-3-large", CL100K_BASE),
    ("text-davinci-003", P50K_BASE),
    ("text-davinci-002", P50K_BASE),
    ("code-davinci-002", P50K_BASE),
    ("code-davinci-001", P50K_BASE),
    ("code-cushman-002", P50K_BASE),
    ("code-cushman-001", P50K_BASE),
    ("davinci-codex", P50K_BASE),
    ("cushman-codex", P50K_BASE),
    ("text-davinci-edit-001", P50K_EDIT),
    ("code-davinci-edit-001", P50K_EDIT),
    ("text-davinci-001", R50K_BASE),
    ("text-curie-001", R50K_BASE),
    ("text-babbage-001", R50K_BASE),
    ("text-ada-001", R50K_BASE),
    ("davinci", R50K_BASE),
    ("curie", R50K_BASE),
    ("babbage", R50K_BASE),
    ("ada", R50K_BASE),
    ("text-similarity-davinci-001", R50K_BASE),
    ("text-similarity-curie-001", R50K_BASE),
    ("text-similarity-babbage-001", R50K_BASE),
    ("text-similarity-ada-001", R50K_BASE),
    ("text-search-davinci-doc-001", R50K_BASE),
    ("text-search-curie-doc-001", R50K_BASE),
    ("text-search-babbage-doc-001", R50K_BASE),
    ("text-search-ada-doc-001", R50K_BASE),
    ("code-search-babbage-code-001", R50K_BASE),
    ("code-search-ada-code-001", R50K_BASE),
];

/// Mapping from model name prefixes to their encoding name.
static MODEL_PREFIX_ENCODINGS: &[(&str, &str)] = &[
    ("gpt-4o-", O200K_BASE),
    ("gpt-4-", CL100K_BASE),
    ("gpt-3.5-turbo-", CL100K_BASE),
    ("gpt-35-turbo-", CL100K_BASE),
    ("ft:gpt-4", CL100K_BASE),
    ("ft:gpt-3.5-turbo", CL100K_BASE),
    ("claude-", CLAUDE),
];

/// Error returned when no encoding is registered for a model.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(thiserror::Error))]
#[cfg_attr(feature = "std", error("no encoding for model {0}"))]
pub struct UnknownModelError(pub String);

/// Returns the encoding name for the given model.
///
/// Exact model names win over prefix matches; among matching prefixes the
/// longest wins.
///
/// Returns an error if neither table has a match.
pub fn encoding_for_model(model: &str) -> Result<&'static str, UnknownModelError> {
    if let Some((_, encoding)) = MODEL_ENCODINGS.iter().find(|(name, _)| *name == model) {
        return Ok(encoding);
    }
    MODEL_PREFIX_ENCODINGS
        .iter()
        .filter(|(prefix, _)| model.starts_with(prefix))
        .max_by_key(|(prefix, _)| prefix.len())
        .map(|(_, encoding)| *encoding)
        .ok_or_else(|| UnknownModelError(model.to_string()))
}

#[cfg(feature = "convert-tiktoken")]
fn special_map(entries: &[(&str, TokenId)]) -> SpecialMap {
    entries.iter().map(|(literal, id)| ((*literal).to_string(), *id)).collect()
}

#[cfg(feature = "convert-tiktoken")]
impl Codec {
    /// Creates the `gpt2` codec from tiktoken-format vocabulary data.
    pub fn gpt2(data: impl AsRef<[u8]>) -> Result<Self, ConvertError> {
        Ok(Self {
            name:             GPT2.to_string(),
            pat_str:          R50K_PATTERN.to_string(),
            mergeable_ranks:  parse_tiktoken(data)?,
            special_tokens:   special_map(&[(END_OF_TEXT, 50256)]),
            explicit_n_vocab: Some(50257),
        })
    }

    /// Creates the `r50k_base` codec from tiktoken-format vocabulary data.
    pub fn r50k_base(data: impl AsRef<[u8]>) -> Result<Self, ConvertError> {
        Ok(Self {
            name:             R50K_BASE.to_string(),
            pat_str:          R50K_PATTERN.to_string(),
            mergeable_ranks:  parse_tiktoken(data)?,
            special_tokens:   special_map(&[(END_OF_TEXT, 50256)]),
            explicit_n_vocab: Some(50257),
        })
    }

    /// Creates the `p50k_base` codec from tiktoken-format vocabulary data.
    pub fn p50k_base(data: impl AsRef<[u8]>) -> Result<Self, ConvertError> {
        Ok(Self {
            name:             P50K_BASE.to_string(),
            pat_str:          R50K_PATTERN.to_string(),
            mergeable_ranks:  parse_tiktoken(data)?,
            special_tokens:   special_map(&[(END_OF_TEXT, 50256)]),
            explicit_n_vocab: Some(50281),
        })
    }

    /// Creates the `p50k_edit` codec from tiktoken-format vocabulary data.
    pub fn p50k_edit(data: impl AsRef<[u8]>) -> Result<Self, ConvertError> {
        Ok(Self {
            name:             P50K_EDIT.to_string(),
            pat_str:          R50K_PATTERN.to_string(),
            mergeable_ranks:  parse_tiktoken(data)?,
            special_tokens:   special_map(&[
                (END_OF_TEXT, 50256),
                (FIM_PREFIX, 50281),
                (FIM_MIDDLE, 50282),
                (FIM_SUFFIX, 50283),
            ]),
            explicit_n_vocab: None,
        })
    }

    /// Creates the `cl100k_base` codec from tiktoken-format vocabulary data.
    pub fn cl100k_base(data: impl AsRef<[u8]>) -> Result<Self, ConvertError> {
        Ok(Self {
            name:             CL100K_BASE.to_string(),
            pat_str:          CL100K_PATTERN.to_string(),
            mergeable_ranks:  parse_tiktoken(data)?,
            special_tokens:   special_map(&[
                (END_OF_TEXT, 100257),
                (FIM_PREFIX, 100258),
                (FIM_MIDDLE, 100259),
                (FIM_SUFFIX, 100260),
                (END_OF_PROMPT, 100276),
            ]),
            explicit_n_vocab: None,
        })
    }

    /// Creates the `o200k_base` codec from tiktoken-format vocabulary data.
    pub fn o200k_base(data: impl AsRef<[u8]>) -> Result<Self, ConvertError> {
        Ok(Self {
            name:             O200K_BASE.to_string(),
            pat_str:          O200K_PATTERN.to_string(),
            mergeable_ranks:  parse_tiktoken(data)?,
            special_tokens:   special_map(&[(END_OF_TEXT, 199999), (END_OF_PROMPT, 200018)]),
            explicit_n_vocab: None,
        })
    }
}

#[cfg(feature = "convert-tiktoken")]
impl Encoding {
    /// Initializes the `gpt2` encoding from tiktoken-format vocabulary data.
    pub fn gpt2(data: impl AsRef<[u8]>) -> Result<Self, ConvertError> {
        Ok(Self::new(Codec::gpt2(data)?)?)
    }

    /// Initializes the `r50k_base` encoding from tiktoken-format vocabulary data.
    pub fn r50k_base(data: impl AsRef<[u8]>) -> Result<Self, ConvertError> {
        Ok(Self::new(Codec::r50k_base(data)?)?)
    }

    /// Initializes the `p50k_base` encoding from tiktoken-format vocabulary data.
    pub fn p50k_base(data: impl AsRef<[u8]>) -> Result<Self, ConvertError> {
        Ok(Self::new(Codec::p50k_base(data)?)?)
    }

    /// Initializes the `p50k_edit` encoding from tiktoken-format vocabulary data.
    pub fn p50k_edit(data: impl AsRef<[u8]>) -> Result<Self, ConvertError> {
        Ok(Self::new(Codec::p50k_edit(data)?)?)
    }

    /// Initializes the `cl100k_base` encoding from tiktoken-format vocabulary data.
    pub fn cl100k_base(data: impl AsRef<[u8]>) -> Result<Self, ConvertError> {
        Ok(Self::new(Codec::cl100k_base(data)?)?)
    }

    /// Initializes the `o200k_base` encoding from tiktoken-format vocabulary data.
    pub fn o200k_base(data: impl AsRef<[u8]>) -> Result<Self, ConvertError> {
        Ok(Self::new(Codec::o200k_base(data)?)?)
    }
}
