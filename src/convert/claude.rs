#[cfg(feature = "std")]
use std::fs::File;
#[cfg(feature = "std")]
use std::io::Read;
#[cfg(feature = "std")]
use std::path::Path;

use alloc::format;
use alloc::string::ToString;
#[cfg(feature = "std")]
use alloc::vec::Vec;

use base64::{Engine, alphabet, engine};

use crate::catalog::CLAUDE;
use crate::convert::ConvertError;
use crate::{Codec, Encoding, RankMap, TokenId};

static BASE64: engine::GeneralPurpose =
    engine::GeneralPurpose::new(&alphabet::STANDARD, engine::general_purpose::PAD);

mod ms {
    use alloc::string::String;
    use hashbrown::HashMap;
    use serde::Deserialize;

    #[derive(Deserialize, Debug, Clone, PartialEq)]
    pub struct Document {
        pub pat_str:          String,
        #[serde(default)]
        pub explicit_n_vocab: Option<usize>,
        #[serde(default)]
        pub special_tokens:   HashMap<String, u32>,
        pub bpe_ranks:        String,
    }
}

use ms::Document;

/// Parses a Claude vocabulary document into a [`Codec`].
///
/// `data` is the JSON document used by the Claude tokenization scheme.
///
/// Returns the codec, or an error if the document fails to parse or the rank
/// derivation overflows.
///
/// # Format
///
/// The document is a JSON object with the following fields:
///
/// - `pat_str`: The regex pattern used to split the input.
/// - `explicit_n_vocab`: The total vocabulary size.
/// - `special_tokens`: The special token literals and their ids.
/// - `bpe_ranks`: A single whitespace-separated string
///   `"<label> <offset> <tok0> <tok1> …"`, where each `<tokI>` is a
///   base64-encoded byte sequence with rank `I * offset`.
///
/// The offset must be non-negative and every derived rank must fit the
/// 32-bit range.
pub fn parse_claude(data: impl AsRef<[u8]>) -> Result<Codec, ConvertError> {
    let data = data.as_ref();
    let document = serde_json::from_slice::<Document>(data)
        .map_err(|e| ConvertError::InvalidData(format!("invalid JSON: {e}")))?;

    let mut fields = document.bpe_ranks.splitn(3, ' ');
    let _label = fields.next();
    let offset = fields
        .next()
        .ok_or_else(|| ConvertError::InvalidData("missing offset in bpe_ranks".to_string()))?
        .parse::<i64>()
        .map_err(|e| ConvertError::InvalidData(format!("invalid offset in bpe_ranks: {e}")))?;
    if offset < 0 {
        return Err(ConvertError::NegativeOffset(offset));
    }
    let tokens = fields.next().unwrap_or("");

    let mut ranks = RankMap::new();
    for (i, token) in tokens.split(' ').filter(|t| !t.is_empty()).enumerate() {
        let bytes = BASE64.decode(token).map_err(|e| {
            ConvertError::MalformedEntry(format!("invalid base64 in token {i}: {e}"))
        })?;
        // Widened so the product itself cannot overflow for any i64 offset.
        let product = i as u128 * offset as u128;
        if product > u128::from(u32::MAX) {
            return Err(ConvertError::Overflow(format!("{i} * {offset}")));
        }
        ranks.insert(bytes, product as TokenId);
    }
    if ranks.is_empty() {
        return Err(ConvertError::EmptyVocab);
    }

    log::debug!("parsed claude vocab with {} entries", ranks.len());
    Ok(Codec {
        name:             CLAUDE.to_string(),
        pat_str:          document.pat_str,
        mergeable_ranks:  ranks,
        special_tokens:   document.special_tokens,
        explicit_n_vocab: document.explicit_n_vocab,
    })
}

/// Parses a Claude vocabulary document from a reader.
/// See [`parse_claude`] for more details.
#[cfg(feature = "std")]
pub fn parse_claude_reader<R: Read>(reader: &mut R) -> Result<Codec, ConvertError> {
    let mut data = Vec::with_capacity(1024);
    reader.read_to_end(&mut data)?;
    parse_claude(&data)
}

/// Parses a Claude vocabulary document from a file.
/// See [`parse_claude`] for more details.
#[cfg(feature = "std")]
pub fn parse_claude_file(path: impl AsRef<Path>) -> Result<Codec, ConvertError> {
    let mut file = File::open(path)?;
    parse_claude_reader(&mut file)
}

impl Codec {
    /// Creates the `claude` codec from a Claude vocabulary document.
    /// See [`parse_claude`] for more details.
    pub fn claude(data: impl AsRef<[u8]>) -> Result<Self, ConvertError> {
        parse_claude(data)
    }
}

impl Encoding {
    /// Initializes the `claude` encoding from a Claude vocabulary document.
    /// See [`parse_claude`] for more details.
    pub fn claude(data: impl AsRef<[u8]>) -> Result<Self, ConvertError> {
        Ok(Self::new(Codec::claude(data)?)?)
    }
}
