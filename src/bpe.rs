//! Greedy lowest-rank pair merging.
//!
//! Reduces a pre-token to the rank sequence produced by repeatedly merging
//! the adjacent pair with the lowest rank, breaking ties towards the left.

use alloc::vec::Vec;
use core::cmp::Ordering;

use orx_priority_queue::{DaryHeapOfIndices, PriorityQueue, PriorityQueueDecKey};

use crate::{RankMap, TokenBytes, TokenId};

const INVALID: TokenId = TokenId::MAX;

/// Pieces longer than this use the heap-based merge path.
const LINEAR_LIMIT: usize = 192;
const BUFFER_SIZE: usize = 256;

#[derive(Debug, Clone, Copy)]
pub(crate) struct RankedPart {
    start: u32,
    rank:  TokenId,
}

#[derive(Debug, Clone, Copy)]
struct LinkedPart {
    start: u32,
    width: u32,
    prior: u32,
    after: u32,
    rank:  TokenId,
}
impl PartialEq for LinkedPart {
    #[inline(always)]
    fn eq(&self, other: &Self) -> bool {
        self.rank == other.rank
    }
}
impl Eq for LinkedPart {}
impl PartialOrd for LinkedPart {
    #[inline(always)]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for LinkedPart {
    #[inline(always)]
    fn cmp(&self, other: &Self) -> Ordering {
        (self.rank, self.start).cmp(&(other.rank, other.start))
    }
}

/// Scratch space reused between piece encodes.
pub(crate) type MergeBuffer = Vec<RankedPart>;
type PieceHeap = DaryHeapOfIndices<u32, LinkedPart, 4>;

pub(crate) fn merge_buffer() -> MergeBuffer {
    Vec::with_capacity(BUFFER_SIZE)
}

/// Encodes the given piece into a sequence of tokens, appending the ids and
/// their byte spans to `ids` and `pieces`.
///
/// The rank map must cover every single byte, which makes the merge total:
/// every span in the final partition is either a single byte or the
/// concatenation of a pair that was found in the map when it was merged.
#[inline(always)]
pub(crate) fn encode_piece(
    piece: &[u8], ranks: &RankMap, buffer: &mut MergeBuffer, ids: &mut Vec<TokenId>,
    pieces: &mut Vec<TokenBytes>,
) {
    if piece.len() == 1 {
        ids.push(ranks[piece]);
        pieces.push(piece.to_vec());
    } else if piece.len() > LINEAR_LIMIT {
        encode_piece_heap(piece, ranks, ids, pieces);
    } else {
        encode_piece_linear(piece, ranks, buffer, ids, pieces);
    }
}

/// Returns the rank of the span covering parts `start..end`, or [`INVALID`]
/// if the span is out of bounds or carries no rank.
#[inline(always)]
fn pair_rank(
    piece: &[u8], parts: &[RankedPart], start: usize, end: usize, ranks: &RankMap,
) -> TokenId {
    if end < parts.len() {
        ranks
            .get(&piece[parts[start].start as usize..parts[end].start as usize])
            .copied()
            .unwrap_or(INVALID)
    } else {
        INVALID
    }
}

/// Merges the given parts, prioritizing merges with the lowest rank.
#[inline(never)]
fn merge_parts(piece: &[u8], parts: &mut Vec<RankedPart>, ranks: &RankMap) {
    let mut min_rank = INVALID;
    let mut i = 0;
    for j in 0..parts.len() - 1 {
        parts[j].rank = pair_rank(piece, parts, j, j + 2, ranks);
        if parts[j].rank < min_rank {
            (min_rank, i) = (parts[j].rank, j);
        }
    }
    while min_rank != INVALID {
        if i > 0 {
            parts[i - 1].rank = pair_rank(piece, parts, i - 1, i + 2, ranks);
        }
        parts[i].rank = pair_rank(piece, parts, i, i + 3, ranks);
        parts.remove(i + 1);
        min_rank = INVALID;
        #[allow(clippy::needless_range_loop)]
        for j in 0..parts.len() - 1 {
            if parts[j].rank < min_rank {
                (min_rank, i) = (parts[j].rank, j);
            }
        }
    }
}

/// Encodes the given piece using a linear scan over the merge candidates.
#[inline(never)]
fn encode_piece_linear(
    piece: &[u8], ranks: &RankMap, buffer: &mut MergeBuffer, ids: &mut Vec<TokenId>,
    pieces: &mut Vec<TokenBytes>,
) {
    buffer.clear();
    buffer.extend((0..piece.len()).map(|i| RankedPart {
        start: i as u32,
        rank:  INVALID,
    }));
    buffer.push(RankedPart {
        start: piece.len() as u32,
        rank:  INVALID,
    });
    merge_parts(piece, buffer, ranks);
    for i in 0..buffer.len() - 1 {
        let bytes = &piece[buffer[i].start as usize..buffer[i + 1].start as usize];
        ids.push(ranks[bytes]);
        pieces.push(bytes.to_vec());
    }
}

/// Merges the given parts, prioritizing merges with the lowest rank.
///
/// This version uses a heap for tracking the merge candidates.
/// The additional allocation overhead compared to the linear scan is
/// amortized for longer pieces.
#[inline(never)]
#[cold]
fn merge_parts_heap(piece: &[u8], heap: &mut PieceHeap, ranks: &RankMap) {
    while heap.len() > 1 {
        let &(i, mut part) = heap.peek().unwrap();
        if part.rank == INVALID {
            break;
        }
        let next = heap.remove(&part.after);
        part.width += next.width;
        part.after = next.after;
        if part.after != u32::MAX {
            let mut after = heap.key_of(&part.after).unwrap();
            if let Some(&rank) =
                ranks.get(&piece[part.start as usize..(after.start + after.width) as usize])
            {
                part.rank = rank;
            } else {
                part.rank = INVALID;
            }
            after.prior = i;
            heap.update_key(&part.after, after);
        } else {
            part.rank = INVALID;
        }
        if part.prior != u32::MAX {
            let mut prior = heap.key_of(&part.prior).unwrap();
            if let Some(&rank) =
                ranks.get(&piece[prior.start as usize..(part.start + part.width) as usize])
            {
                prior.rank = rank;
            } else {
                prior.rank = INVALID;
            }
            heap.update_key(&part.prior, prior);
        }
        heap.update_key(&i, part);
    }
}

/// Encodes the given piece using a heap over the merge candidates.
#[inline(never)]
#[cold]
fn encode_piece_heap(
    piece: &[u8], ranks: &RankMap, ids: &mut Vec<TokenId>, pieces: &mut Vec<TokenBytes>,
) {
    let mut heap = PieceHeap::with_index_bound(piece.len());
    for i in 0..piece.len() {
        let last = i + 1 == piece.len();
        heap.push(i as u32, LinkedPart {
            start: i as u32,
            width: 1,
            prior: if i == 0 { u32::MAX } else { i as u32 - 1 },
            after: if last { u32::MAX } else { i as u32 + 1 },
            rank:  if last {
                INVALID
            } else {
                ranks.get(&piece[i..i + 2]).copied().unwrap_or(INVALID)
            },
        });
    }
    merge_parts_heap(piece, &mut heap, ranks);
    let mut e = 0;
    while e != u32::MAX {
        let part = heap.key_of(&e).unwrap();
        let bytes = &piece[part.start as usize..(part.start + part.width) as usize];
        ids.push(ranks[bytes]);
        pieces.push(bytes.to_vec());
        e = part.after;
    }
}
