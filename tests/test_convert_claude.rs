//! Tests for the Claude vocabulary loader.

use bpetok::convert::{ConvertError, parse_claude};
use bpetok::{AllowedSpecial, DisallowedSpecial, Encoding, catalog};

mod util;
use util::*;

#[test]
fn test_parse() {
    init_env();
    let data = r#"{
        "pat_str": "'s|\\S+|\\s+",
        "explicit_n_vocab": 260,
        "special_tokens": {"<EOT>": 258},
        "bpe_ranks": "v1 2 aGU= bGw="
    }"#;
    let codec = parse_claude(data).unwrap();
    assert_eq!(codec.name, catalog::CLAUDE);
    assert_eq!(codec.pat_str, r"'s|\S+|\s+");
    assert_eq!(codec.explicit_n_vocab, Some(260));
    assert_eq!(codec.mergeable_ranks.len(), 2);
    assert_eq!(codec.mergeable_ranks[b"he".as_slice()], 0);
    assert_eq!(codec.mergeable_ranks[b"ll".as_slice()], 2);
    assert_eq!(codec.special_tokens["<EOT>"], 258);
}

#[test]
fn test_rank_offset_scaling() {
    init_env();
    let data = r#"{"pat_str": "\\S+", "bpe_ranks": "v1 3 YQ== Yg== Yw=="}"#;
    let codec = parse_claude(data).unwrap();
    assert_eq!(codec.mergeable_ranks[b"a".as_slice()], 0);
    assert_eq!(codec.mergeable_ranks[b"b".as_slice()], 3);
    assert_eq!(codec.mergeable_ranks[b"c".as_slice()], 6);
    assert_eq!(codec.explicit_n_vocab, None);
    assert!(codec.special_tokens.is_empty());
}

#[test]
fn test_negative_offset() {
    init_env();
    let data = r#"{"pat_str": "\\S+", "bpe_ranks": "v1 -3 aGU="}"#;
    let error = parse_claude(data).unwrap_err();
    assert!(matches!(error, ConvertError::NegativeOffset(-3)));
    assert_eq!(error.to_string(), "negative offset: -3");
}

#[test]
fn test_rank_overflow() {
    init_env();
    // The second token still fits the 32-bit range, the third does not.
    let data = r#"{"pat_str": "\\S+", "bpe_ranks": "v1 2147483648 YQ== Yg== Yw=="}"#;
    let error = parse_claude(data).unwrap_err();
    assert!(matches!(error, ConvertError::Overflow(_)));
    assert!(error.to_string().starts_with("integer overflow"));

    let data = r#"{"pat_str": "\\S+", "bpe_ranks": "v1 2147483648 YQ== Yg=="}"#;
    assert!(parse_claude(data).is_ok());
}

#[test]
fn test_rank_overflow_extreme_offset() {
    init_env();
    // Large enough that the product would wrap a 64-bit intermediate.
    let data = r#"{"pat_str": "\\S+", "bpe_ranks": "v1 9223372036854775807 YQ== Yg== Yw=="}"#;
    let error = parse_claude(data).unwrap_err();
    assert!(matches!(error, ConvertError::Overflow(_)));
}

#[test]
fn test_invalid_json() {
    init_env();
    assert!(matches!(parse_claude(b"not json").unwrap_err(), ConvertError::InvalidData(_)));
    // Missing bpe_ranks field.
    assert!(matches!(
        parse_claude(r#"{"pat_str": "\\S+"}"#).unwrap_err(),
        ConvertError::InvalidData(_)
    ));
}

#[test]
fn test_invalid_token_base64() {
    init_env();
    let data = r#"{"pat_str": "\\S+", "bpe_ranks": "v1 1 @@@"}"#;
    assert!(matches!(parse_claude(data).unwrap_err(), ConvertError::MalformedEntry(_)));
}

#[test]
fn test_empty_ranks() {
    init_env();
    let data = r#"{"pat_str": "\\S+", "bpe_ranks": "v1 1"}"#;
    assert!(matches!(parse_claude(data).unwrap_err(), ConvertError::EmptyVocab));
}

#[test]
fn test_encoding_from_document() {
    init_env();
    let data = byte_claude_document(&[("<EOT>", 300)], Some(259));
    let encoding = Encoding::claude(data).unwrap();
    assert_eq!(encoding.name(), catalog::CLAUDE);
    assert_eq!(encoding.vocab_size(), 259);

    assert_eq!(encoding.encode_ordinary("he").ids, [256]);
    assert_eq!(encoding.encode_ordinary("hell").ids, [256, 257]);

    let encoded =
        encoding.encode("he<EOT>", AllowedSpecial::All, DisallowedSpecial::List(&[])).unwrap();
    assert_eq!(encoded.ids, [256, 300]);
    assert_eq!(encoding.decode(&encoded.ids), b"he<EOT>");
}

#[test]
fn test_encoding_from_document_size_mismatch() {
    init_env();
    let data = byte_claude_document(&[("<EOT>", 300)], Some(1000));
    assert!(matches!(
        Encoding::claude(data).unwrap_err(),
        ConvertError::InitializationError(_)
    ));
}
