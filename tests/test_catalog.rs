//! Tests for the encoding catalog and the model-name lookup.

use bpetok::catalog::{
    CL100K_BASE, CL100K_PATTERN, CLAUDE, GPT2, O200K_BASE, O200K_PATTERN, P50K_BASE, P50K_EDIT,
    R50K_BASE, R50K_PATTERN, encoding_for_model,
};
use bpetok::{Codec, Encoding, Regex, convert::ConvertError};

mod util;
use util::*;

#[test]
fn test_patterns_compile() {
    init_env();
    assert!(Regex::new(R50K_PATTERN).is_ok());
    assert!(Regex::new(CL100K_PATTERN).is_ok());
    assert!(Regex::new(O200K_PATTERN).is_ok());
}

#[test]
fn test_r50k_contraction_split() {
    init_env();
    // "'s" is its own pre-token, so "t'" can never merge across the boundary.
    let encoding = test_encoding(&[b"t'"], &[]);
    assert_eq!(encoding.encode_ordinary("it's").ids, [105, 116, 39, 115]);
}

#[test]
fn test_r50k_number_split() {
    init_env();
    // r50k keeps digit runs whole, so the "34" merge applies.
    let encoding = test_encoding(&[b"34"], &[]);
    assert_eq!(encoding.encode_ordinary("1234").ids, [49, 50, 256]);
}

#[test]
fn test_cl100k_number_split() {
    init_env();
    // cl100k splits digit runs into groups of at most three, which keeps
    // "3" and "4" in different pre-tokens.
    let mut codec = test_codec(&[b"34"], &[]);
    codec.pat_str = CL100K_PATTERN.into();
    let encoding = Encoding::new(codec).unwrap();
    assert_eq!(encoding.encode_ordinary("1234").ids, [49, 50, 51, 52]);
}

#[test]
fn test_o200k_roundtrip() {
    init_env();
    let mut codec = test_codec(&[], &[]);
    codec.pat_str = O200K_PATTERN.into();
    let encoding = Encoding::new(codec).unwrap();
    for input in ["Hello World", "MiXeD CaSe 123", "line\nbreaks\r\n", "  padded  "] {
        let encoded = encoding.encode_ordinary(input);
        assert_eq!(encoding.decode(&encoded.ids), input.as_bytes());
    }
}

#[test]
fn test_gpt2_codec() {
    init_env();
    let codec = Codec::gpt2(byte_tiktoken_data()).unwrap();
    assert_eq!(codec.name, GPT2);
    assert_eq!(codec.pat_str, R50K_PATTERN);
    assert_eq!(codec.special_tokens["<|endoftext|>"], 50256);
    assert_eq!(codec.explicit_n_vocab, Some(50257));
}

#[test]
fn test_p50k_edit_codec() {
    init_env();
    let codec = Codec::p50k_edit(byte_tiktoken_data()).unwrap();
    assert_eq!(codec.name, P50K_EDIT);
    assert_eq!(codec.special_tokens.len(), 4);
    assert_eq!(codec.special_tokens["<|endoftext|>"], 50256);
    assert_eq!(codec.special_tokens["<|fim_prefix|>"], 50281);
    assert_eq!(codec.special_tokens["<|fim_middle|>"], 50282);
    assert_eq!(codec.special_tokens["<|fim_suffix|>"], 50283);
}

#[test]
fn test_cl100k_codec() {
    init_env();
    let codec = Codec::cl100k_base(byte_tiktoken_data()).unwrap();
    assert_eq!(codec.name, CL100K_BASE);
    assert_eq!(codec.pat_str, CL100K_PATTERN);
    assert_eq!(codec.special_tokens.len(), 5);
    assert_eq!(codec.special_tokens["<|endoftext|>"], 100257);
    assert_eq!(codec.special_tokens["<|endofprompt|>"], 100276);
}

#[test]
fn test_o200k_codec() {
    init_env();
    let codec = Codec::o200k_base(byte_tiktoken_data()).unwrap();
    assert_eq!(codec.name, O200K_BASE);
    assert_eq!(codec.pat_str, O200K_PATTERN);
    assert_eq!(codec.special_tokens["<|endoftext|>"], 199999);
    assert_eq!(codec.special_tokens["<|endofprompt|>"], 200018);
}

#[test]
fn test_explicit_size_checked_at_initialization() {
    init_env();
    // The synthetic vocabulary is far smaller than the declared gpt2 size.
    let error = Encoding::gpt2(byte_tiktoken_data()).unwrap_err();
    assert!(matches!(error, ConvertError::InitializationError(_)));
}

#[test]
fn test_p50k_edit_encoding() {
    init_env();
    let encoding = Encoding::p50k_edit(byte_tiktoken_data()).unwrap();
    assert_eq!(encoding.name(), P50K_EDIT);
    assert_eq!(encoding.vocab_size(), 260);
}

#[test]
fn test_encoding_for_model() {
    init_env();
    assert_eq!(encoding_for_model("gpt2").unwrap(), GPT2);
    assert_eq!(encoding_for_model("davinci").unwrap(), R50K_BASE);
    assert_eq!(encoding_for_model("text-davinci-003").unwrap(), P50K_BASE);
    assert_eq!(encoding_for_model("text-davinci-edit-001").unwrap(), P50K_EDIT);
    assert_eq!(encoding_for_model("gpt-4").unwrap(), CL100K_BASE);
    assert_eq!(encoding_for_model("gpt-3.5-turbo-0301").unwrap(), CL100K_BASE);
    assert_eq!(encoding_for_model("gpt-4o-2024-05-13").unwrap(), O200K_BASE);
    assert_eq!(encoding_for_model("gpt-4-").unwrap(), CL100K_BASE);
    assert_eq!(encoding_for_model("claude-3-opus").unwrap(), CLAUDE);
}

#[test]
fn test_encoding_for_unknown_model() {
    init_env();
    let error = encoding_for_model("UnknownModel").unwrap_err();
    assert_eq!(error.to_string(), "no encoding for model UnknownModel");
}
