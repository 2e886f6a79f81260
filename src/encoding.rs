//! Runtime encoding assembled from a codec.

use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt::Debug;

use hashbrown::{HashMap, HashSet};

use crate::bpe;
use crate::regex::{Regex, RegexError, escape};
use crate::{Codec, SpecialMap, TokenBytes, TokenId};

/// Bytes substituted for ids absent from both decoders.
const REPLACEMENT: &[u8] = "\u{FFFD}".as_bytes();

pub(crate) type DecoderMap = HashMap<TokenId, TokenBytes>;
pub(crate) type SpecialDecoderMap = HashMap<TokenId, String>;

/// Errors encountered during initialization.
#[non_exhaustive]
#[derive(Debug)]
#[cfg_attr(feature = "std", derive(thiserror::Error))]
pub enum InitializationError {
    /// The pre-tokenization pattern failed to compile.
    #[cfg_attr(feature = "std", error("invalid regex: {0}"))]
    InvalidRegex(RegexError),
    /// The rank map contains duplicate ranks.
    #[cfg_attr(feature = "std", error("mergeable ranks must not contain duplicate ranks"))]
    InvalidRanks,
    /// The special token map contains duplicate ids.
    #[cfg_attr(feature = "std", error("special tokens must not contain duplicate ids"))]
    InvalidSpecials,
    /// A single-byte token is missing from the rank map.
    #[cfg_attr(
        feature = "std",
        error("mergeable ranks must cover every single byte, 0x{0:02x} is missing")
    )]
    IncompleteByteRanks(u8),
    /// A special token id collides with a mergeable rank.
    #[cfg_attr(feature = "std", error("special token id {0} collides with a mergeable rank"))]
    OverlappingSpecials(TokenId),
    /// The vocabulary size does not match the declared size.
    #[cfg_attr(
        feature = "std",
        error("explicit vocab size is {expected} but the vocabulary holds {actual} entries")
    )]
    VocabSizeMismatch { expected: usize, actual: usize },
}
impl From<RegexError> for InitializationError {
    fn from(e: RegexError) -> Self {
        Self::InvalidRegex(e)
    }
}

/// Errors encountered during encoding.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(thiserror::Error))]
pub enum EncodeError {
    /// The input contains a special token the caller marked as disallowed.
    #[cfg_attr(
        feature = "std",
        error("disallowed special token {token:?} found at offset {offset}")
    )]
    DisallowedSpecial {
        /// The disallowed literal.
        token:  String,
        /// Byte offset of the first occurrence in the input.
        offset: usize,
    },
}

/// Special tokens to recognize during encoding.
///
/// Recognized literals are emitted as their special token id instead of
/// passing through the ordinary pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllowedSpecial<'a> {
    /// Recognize every special token of the codec.
    All,
    /// Recognize exactly the listed literals.
    List(&'a [&'a str]),
}

/// Special tokens to reject during encoding.
///
/// Occurrences of rejected literals in the input fail the call with
/// [`EncodeError::DisallowedSpecial`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisallowedSpecial<'a> {
    /// Reject every special token that is not allowed.
    All,
    /// Reject exactly the listed literals.
    List(&'a [&'a str]),
}

/// Result of an encoding operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Encoded {
    /// The token ids.
    pub ids:    Vec<TokenId>,
    /// The byte span behind each id, in the same order.
    pub pieces: Vec<TokenBytes>,
}
impl Encoded {
    #[inline(always)]
    fn with_capacity(capacity: usize) -> Self {
        Self {
            ids:    Vec::with_capacity(capacity),
            pieces: Vec::with_capacity(capacity),
        }
    }

    /// Returns the number of tokens.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Returns `true` if no tokens were produced.
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Runtime tokenizer assembled from a [`Codec`].
///
/// Holds the forward and inverse token maps and the compiled patterns.
/// Read-only after construction and freely shareable between threads.
#[derive(Clone)]
pub struct Encoding {
    codec: Codec,

    decoder:         DecoderMap,
    special_decoder: SpecialDecoderMap,

    split:         Regex,
    special_split: Option<Regex>,
}

impl Encoding {
    /// Creates an encoding from the given codec.
    ///
    /// Compiles the pre-tokenization pattern and the special token pattern and
    /// builds the inverse token maps.
    ///
    /// Returns an error if a pattern fails to compile, the rank or special
    /// maps contain duplicate ids or overlap each other, a single-byte token
    /// is missing, or the vocabulary size does not match `explicit_n_vocab`.
    #[inline(never)]
    pub fn new(codec: Codec) -> Result<Self, InitializationError> {
        let split = Regex::new(&codec.pat_str)?;
        let special_split = if codec.special_tokens.is_empty() {
            None
        } else {
            Some(Regex::new(&literal_alternation(
                codec.special_tokens.keys().map(String::as_str),
            ))?)
        };

        let decoder =
            codec.mergeable_ranks.iter().map(|(k, v)| (*v, k.clone())).collect::<DecoderMap>();
        if decoder.len() != codec.mergeable_ranks.len() {
            return Err(InitializationError::InvalidRanks);
        }
        for byte in 0..=u8::MAX {
            if !codec.mergeable_ranks.contains_key([byte].as_slice()) {
                return Err(InitializationError::IncompleteByteRanks(byte));
            }
        }

        let special_decoder = codec
            .special_tokens
            .iter()
            .map(|(k, v)| (*v, k.clone()))
            .collect::<SpecialDecoderMap>();
        if special_decoder.len() != codec.special_tokens.len() {
            return Err(InitializationError::InvalidSpecials);
        }
        for &id in special_decoder.keys() {
            if decoder.contains_key(&id) {
                return Err(InitializationError::OverlappingSpecials(id));
            }
        }

        if let Some(expected) = codec.explicit_n_vocab {
            let actual = codec.vocab_size();
            if actual != expected {
                return Err(InitializationError::VocabSizeMismatch { expected, actual });
            }
        }

        log::debug!(
            "initialized encoding {} with {} ranks and {} special tokens",
            codec.name,
            codec.mergeable_ranks.len(),
            codec.special_tokens.len()
        );
        Ok(Self {
            codec,
            decoder,
            special_decoder,
            split,
            special_split,
        })
    }

    /// Encodes the given text into a sequence of tokens without recognizing
    /// special tokens.
    ///
    /// Special token literals in the input are tokenized like any other text.
    #[inline(never)]
    pub fn encode_ordinary(&self, text: &str) -> Encoded {
        let mut result = Encoded::with_capacity(text.len() / 3);
        let mut buffer = bpe::merge_buffer();
        self.encode_span(text, &mut buffer, &mut result);
        result
    }

    /// Encodes the given text into a sequence of tokens.
    ///
    /// Occurrences of `allowed` special token literals are emitted as their
    /// id; the text around them passes through the ordinary pipeline. The
    /// output preserves the left-to-right order of the input.
    ///
    /// Returns an error if the input contains a `disallowed` literal.
    /// [`DisallowedSpecial::All`] expands to every special token that is not
    /// allowed; the check runs on the original input before any splitting.
    #[inline(never)]
    pub fn encode(
        &self, text: &str, allowed: AllowedSpecial, disallowed: DisallowedSpecial,
    ) -> Result<Encoded, EncodeError> {
        let allowed = match allowed {
            AllowedSpecial::All => {
                self.codec.special_tokens.keys().map(String::as_str).collect::<HashSet<_>>()
            }
            AllowedSpecial::List(list) => list
                .iter()
                .copied()
                .filter(|literal| self.codec.special_tokens.contains_key(*literal))
                .collect(),
        };
        let disallowed = match disallowed {
            DisallowedSpecial::All => self
                .codec
                .special_tokens
                .keys()
                .map(String::as_str)
                .filter(|literal| !allowed.contains(literal))
                .collect::<HashSet<_>>(),
            DisallowedSpecial::List(list) => list.iter().copied().collect(),
        };
        if let Some((offset, token)) = find_earliest(text, &disallowed) {
            return Err(EncodeError::DisallowedSpecial {
                token: token.to_string(),
                offset,
            });
        }

        let mut result = Encoded::with_capacity(text.len() / 3);
        let mut buffer = bpe::merge_buffer();
        let special_split = match &self.special_split {
            Some(regex) if !allowed.is_empty() => regex,
            _ => {
                self.encode_span(text, &mut buffer, &mut result);
                return Ok(result);
            }
        };

        let mut posit = 0;
        loop {
            let next = self.find_allowed(special_split, text, posit, &allowed);
            let end = next.map_or(text.len(), |(start, _)| start);
            self.encode_span(&text[posit..end], &mut buffer, &mut result);
            match next {
                Some((start, end)) => {
                    let literal = &text[start..end];
                    result.ids.push(self.codec.special_tokens[literal]);
                    result.pieces.push(literal.as_bytes().to_vec());
                    posit = end;
                }
                None => break,
            }
        }
        Ok(result)
    }

    /// Decodes the given sequence of tokens into bytes.
    ///
    /// Ids absent from both the rank and special vocabularies decode to the
    /// replacement character `U+FFFD`. The result is the concatenation of the
    /// token bytes and is not guaranteed to be valid utf-8.
    #[inline(never)]
    pub fn decode(&self, tokens: &[TokenId]) -> Vec<u8> {
        let mut result = Vec::<u8>::with_capacity(tokens.len() * 3);
        for token in tokens {
            if let Some(bytes) = self.decoder.get(token) {
                result.extend_from_slice(bytes);
            } else if let Some(literal) = self.special_decoder.get(token) {
                result.extend_from_slice(literal.as_bytes());
            } else {
                result.extend_from_slice(REPLACEMENT);
            }
        }
        result
    }

    /// Returns the name of the underlying codec.
    #[inline(always)]
    pub fn name(&self) -> &str {
        &self.codec.name
    }

    /// Returns the total vocabulary size, counting mergeable ranks and special tokens.
    #[inline(always)]
    pub fn vocab_size(&self) -> usize {
        self.codec.vocab_size()
    }

    /// Returns the special tokens of the underlying codec.
    #[inline(always)]
    pub fn special_tokens(&self) -> &SpecialMap {
        &self.codec.special_tokens
    }

    /// Returns the underlying codec.
    #[inline(always)]
    pub fn codec(&self) -> &Codec {
        &self.codec
    }

    /// Applies the pre-tokenization pattern to the given span and encodes
    /// every piece.
    ///
    /// Pieces present in the rank map wholesale are emitted directly, the
    /// rest go through the merge loop. Empty matches are skipped.
    #[inline(never)]
    fn encode_span(&self, span: &str, buffer: &mut bpe::MergeBuffer, result: &mut Encoded) {
        for (start, end) in self.split.find_iter(span) {
            if end <= start {
                continue;
            }
            let piece = span[start..end].as_bytes();
            if let Some(&token) = self.codec.mergeable_ranks.get(piece) {
                result.ids.push(token);
                result.pieces.push(piece.to_vec());
                continue;
            }
            bpe::encode_piece(
                piece,
                &self.codec.mergeable_ranks,
                buffer,
                &mut result.ids,
                &mut result.pieces,
            );
        }
    }

    /// Returns the start and end offsets of the earliest allowed special
    /// token at or after `posit`.
    ///
    /// Matches of literals outside the allowed set do not terminate the scan;
    /// the search resumes one character after their start.
    #[inline(never)]
    fn find_allowed(
        &self, special_split: &Regex, text: &str, posit: usize, allowed: &HashSet<&str>,
    ) -> Option<(usize, usize)> {
        let mut search = posit;
        loop {
            let (start, end) = special_split.find_from(text, search)?;
            if allowed.contains(&text[start..end]) {
                return Some((start, end));
            }
            search = start + text[start..].chars().next().map_or(1, char::len_utf8);
        }
    }
}

impl Debug for Encoding {
    #[inline(never)]
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        f.debug_struct("Encoding")
            .field("name", &self.codec.name)
            .field("ranks", &format!("RankMap({})", self.codec.mergeable_ranks.len()))
            .field("specials", &format!("SpecialMap({})", self.codec.special_tokens.len()))
            .field("split", &self.split)
            .field("special_split", &self.special_split)
            .finish()
    }
}

/// Joins the given literals into an escaped alternation pattern.
///
/// Longer literals sort first so a literal is never shadowed by one of its
/// prefixes.
fn literal_alternation<'a>(literals: impl Iterator<Item = &'a str>) -> String {
    let mut literals = literals.collect::<Vec<_>>();
    literals.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
    literals.into_iter().map(escape).collect::<Vec<_>>().join("|")
}

/// Returns the earliest occurrence of any of the given literals, preferring
/// the longer literal on equal offsets.
fn find_earliest<'a>(text: &str, literals: &HashSet<&'a str>) -> Option<(usize, &'a str)> {
    let mut found: Option<(usize, &'a str)> = None;
    for &literal in literals {
        if let Some(offset) = text.find(literal) {
            found = match found {
                Some((prior, other))
                    if prior < offset || (prior == offset && other.len() >= literal.len()) =>
                {
                    Some((prior, other))
                }
                _ => Some((offset, literal)),
            };
        }
    }
    found
}
