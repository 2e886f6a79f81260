//! **Byte-pair tokenizer core for language models.**
//!
//! Segments text into the integer token ids used by BPE-based language models
//! and reconstructs the original bytes from token ids. Compatible with the
//! vocabularies used by the GPT-2, p50k, cl100k and o200k encodings as well as
//! the Claude vocabulary variant.
//!
//! # Overview
//!
//! A tokenization scheme is described by a [`Codec`]: the pre-tokenization
//! pattern, the mergeable ranks and the special tokens of one encoding.
//! A codec is turned into an [`Encoding`], which holds the compiled patterns
//! and the inverse token maps and exposes [`Encoding::encode`],
//! [`Encoding::encode_ordinary`] and [`Encoding::decode`].
//!
//! Encodings are read-only after construction and can be shared between any
//! number of threads without coordination.
//!
//! # Examples
//!
//! ### Building an encoding from a codec
//!
//! ```
//! use bpetok::{Codec, Encoding, RankMap, SpecialMap};
//!
//! let mut ranks = (0u32..=255).map(|b| (vec![b as u8], b)).collect::<RankMap>();
//! ranks.insert(b"he".to_vec(), 256);
//! ranks.insert(b"ll".to_vec(), 257);
//! ranks.insert(b"hell".to_vec(), 258);
//! ranks.insert(b"hello".to_vec(), 259);
//!
//! let encoding = Encoding::new(Codec {
//!     name:             "example".into(),
//!     pat_str:          r"\S+|\s+".into(),
//!     mergeable_ranks:  ranks,
//!     special_tokens:   SpecialMap::new(),
//!     explicit_n_vocab: None,
//! })?;
//!
//! let encoded = encoding.encode_ordinary("hello");
//! assert_eq!(encoded.ids, [259]);
//! assert_eq!(encoding.decode(&encoded.ids), b"hello");
//! # Ok::<(), bpetok::InitializationError>(())
//! ```
//!
//! ### Loading a tiktoken vocabulary
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use bpetok::Encoding;
//!
//! let data = std::fs::read("cl100k_base.tiktoken")?;
//! let encoding = Encoding::cl100k_base(&data)?;
//! # Ok(())
//! # }
//! ```
//!
//! See [`convert`] for the supported vocabulary data formats and [`catalog`]
//! for the known encodings and the model-name lookup.
//!
//! # Cargo features
//!
//! - `std`: Enables standard library features, including reading vocabulary
//!   data from files. Enabled by default.
//! - `convert`: Enables the vocabulary loaders. When disabled, individual
//!   loaders can be enabled with `convert-tiktoken` and `convert-claude`.
//! - `regex-perf`: Enables additional regex performance optimizations.
//!   Can be disabled to reduce binary size.

#![cfg_attr(not(feature = "std"), no_std)]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

mod bpe;
mod codec;
mod encoding;
mod regex;

pub mod catalog;
pub mod convert;

use alloc::string::String;
use alloc::vec::Vec;

use hashbrown::HashMap;

pub use crate::codec::*;
pub use crate::encoding::*;
pub use crate::regex::{Regex, RegexError};

/// Numeric identifier of a token. Mergeable ranks and special ids share this domain.
pub type TokenId = u32;
/// Byte sequence of a token.
pub type TokenBytes = Vec<u8>;
/// Mapping from token bytes to their merge rank.
pub type RankMap = HashMap<TokenBytes, TokenId>;
/// Mapping from special token literals to their id.
pub type SpecialMap = HashMap<String, TokenId>;
