#[cfg(feature = "std")]
use std::fs::File;
#[cfg(feature = "std")]
use std::io::Read;
#[cfg(feature = "std")]
use std::path::Path;

use alloc::format;
use alloc::vec::Vec;

use base64::{Engine, alphabet, engine};
use bstr::ByteSlice;

use crate::RankMap;
use crate::convert::ConvertError;

static BASE64: engine::GeneralPurpose =
    engine::GeneralPurpose::new(&alphabet::STANDARD, engine::general_purpose::PAD);

/// Parses a `tiktoken` vocabulary into a rank map.
///
/// `data` is the raw data format used by the `tiktoken` tokenizer.
///
/// Returns the mapping from token bytes to rank, or an error if the input is
/// empty or an entry fails to parse.
///
/// # Examples
///
/// ```
/// use bpetok::convert::parse_tiktoken;
///
/// let ranks = parse_tiktoken(b"aGU= 0\nbGw= 1").unwrap();
/// assert_eq!(ranks[b"he".as_slice()], 0);
/// ```
///
/// # Format
///
/// The data is composed of lines of the form `<token bytes> <rank>`, where
/// `<token bytes>` is a base64-encoded byte sequence and `<rank>` is a
/// decimal number. Lines repeating earlier token bytes overwrite their rank.
pub fn parse_tiktoken(data: impl AsRef<[u8]>) -> Result<RankMap, ConvertError> {
    let data = data.as_ref();
    let lines = data
        .split(|u| *u == b'\n')
        .map(|l| l.trim_with(|u| u == '\r'))
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>();
    if lines.is_empty() {
        return Err(ConvertError::EmptyVocab);
    }

    let mut ranks = RankMap::with_capacity(lines.len());
    for (i, line) in lines.into_iter().enumerate() {
        let (l, r) = line.split_once_str(" ").ok_or_else(|| {
            ConvertError::MalformedEntry(format!("missing separator in line {i}"))
        })?;
        let bytes = BASE64.decode(l).map_err(|e| {
            ConvertError::MalformedEntry(format!("invalid base64 in line {i}: {e}"))
        })?;
        let rank = r
            .to_str()
            .map_err(|e| ConvertError::MalformedEntry(format!("invalid utf-8 in line {i}: {e}")))?
            .parse::<u32>()
            .map_err(|e| ConvertError::MalformedEntry(format!("invalid rank in line {i}: {e}")))?;
        ranks.insert(bytes, rank);
    }

    log::debug!("parsed tiktoken vocab with {} entries", ranks.len());
    Ok(ranks)
}

/// Parses a `tiktoken` vocabulary from a reader.
/// See [`parse_tiktoken`] for more details.
#[cfg(feature = "std")]
pub fn parse_tiktoken_reader<R: Read>(reader: &mut R) -> Result<RankMap, ConvertError> {
    let mut data = Vec::with_capacity(1024);
    reader.read_to_end(&mut data)?;
    parse_tiktoken(&data)
}

/// Parses a `tiktoken` vocabulary from a file.
/// See [`parse_tiktoken`] for more details.
#[cfg(feature = "std")]
pub fn parse_tiktoken_file(path: impl AsRef<Path>) -> Result<RankMap, ConvertError> {
    let mut file = File::open(path)?;
    parse_tiktoken_reader(&mut file)
}
