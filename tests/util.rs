#![allow(dead_code)]

use bpetok::{Codec, Encoding, RankMap, SpecialMap, TokenId, catalog};

pub fn init_env() {
    let _ = simple_logger::SimpleLogger::new().init();
}

/// Rank map covering every single byte with its own value as rank.
pub fn byte_ranks() -> RankMap {
    (0u32..=255).map(|b| (vec![b as u8], b)).collect()
}

/// Byte-complete rank map extended with the given merges, ranked in order
/// starting at 256.
pub fn ranks_with_merges(merges: &[&[u8]]) -> RankMap {
    let mut ranks = byte_ranks();
    for (i, merge) in merges.iter().enumerate() {
        ranks.insert(merge.to_vec(), 256 + i as TokenId);
    }
    ranks
}

pub fn special_map(specials: &[(&str, TokenId)]) -> SpecialMap {
    specials.iter().map(|(literal, id)| (literal.to_string(), *id)).collect()
}

/// Codec over the r50k pattern with the given merges and specials.
pub fn test_codec(merges: &[&[u8]], specials: &[(&str, TokenId)]) -> Codec {
    Codec {
        name:             "test".into(),
        pat_str:          catalog::R50K_PATTERN.into(),
        mergeable_ranks:  ranks_with_merges(merges),
        special_tokens:   special_map(specials),
        explicit_n_vocab: None,
    }
}

pub fn test_encoding(merges: &[&[u8]], specials: &[(&str, TokenId)]) -> Encoding {
    Encoding::new(test_codec(merges, specials)).unwrap()
}

/// Tiktoken-format data covering every single byte, with the byte value as rank.
pub fn byte_tiktoken_data() -> String {
    use base64::{Engine, engine::general_purpose::STANDARD};
    let mut data = String::new();
    for b in 0u16..=255 {
        data.push_str(&STANDARD.encode([b as u8]));
        data.push(' ');
        data.push_str(&b.to_string());
        data.push('\n');
    }
    data
}

/// Claude-format document over the r50k pattern with a byte-complete
/// vocabulary followed by the merges "he" and "ll".
pub fn byte_claude_document(specials: &[(&str, TokenId)], explicit_n_vocab: Option<usize>) -> String {
    use base64::{Engine, engine::general_purpose::STANDARD};
    let mut tokens = (0u16..=255).map(|b| STANDARD.encode([b as u8])).collect::<Vec<_>>();
    tokens.push(STANDARD.encode(b"he"));
    tokens.push(STANDARD.encode(b"ll"));
    let specials = specials
        .iter()
        .map(|(literal, id)| format!("{literal:?}: {id}"))
        .collect::<Vec<_>>()
        .join(", ");
    let explicit = explicit_n_vocab.map(|n| format!("\"explicit_n_vocab\": {n},")).unwrap_or_default();
    format!(
        "{{\"pat_str\": {:?}, {explicit} \"special_tokens\": {{{specials}}}, \"bpe_ranks\": \"v1 1 {}\"}}",
        catalog::R50K_PATTERN,
        tokens.join(" ")
    )
}
