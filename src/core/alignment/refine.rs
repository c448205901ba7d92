//! Anchor-to-range expansion
//!
//! The solver pins one frame per slide; playback needs the full run of
//! frames each slide was on screen. The first and last slides grow outward
//! while nearby frames still score a meaningful fraction of their anchor,
//! and every adjacent pair is split at the divider that keeps the most
//! score on each side.

use crate::core::alignment::grid::SimilarityGrid;

/// Inclusive range of frame indices assigned to one slide.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameRange {
    pub start: usize,
    pub end: usize,
}

/// Walk left from `anchor` while the next frame scores at least
/// `threshold` times the anchor's score. Floors at frame 0.
pub fn extend_start(row: &[f32], anchor: usize, threshold: f32) -> usize {
    let floor = row[anchor] * threshold;
    let mut start = anchor;
    while start > 0 && row[start - 1] >= floor {
        start -= 1;
    }
    start
}

/// Mirror of `extend_start`: walk right toward the last frame.
pub fn extend_end(row: &[f32], anchor: usize, threshold: f32) -> usize {
    let floor = row[anchor] * threshold;
    let mut end = anchor;
    while end < row.len() - 1 && row[end + 1] >= floor {
        end += 1;
    }
    end
}

/// Best split point between two adjacent slides with anchors `a < b`.
///
/// Every candidate divider `d` in `[a, b)` is scored by how much of each
/// row's mass it keeps on its own side; strict greater-than keeps the first
/// maximum, so ties resolve to the earliest divider.
fn best_divider(grid: &SimilarityGrid, row: usize, a: usize, b: usize) -> usize {
    let mut best = a;
    let mut best_metric = -1.0f32;
    for divider in a..b {
        let left: f32 = grid.row(row)[a..=divider].iter().sum();
        let right: f32 = grid.row(row + 1)[divider + 1..=b].iter().sum();
        let metric = left + right;
        if metric > best_metric {
            best_metric = metric;
            best = divider;
        }
    }
    best
}

/// Expand anchors into one contiguous frame range per slide.
///
/// Interior boundaries partition the covered span with no gaps or overlaps
/// (`start` of each slide is one past the `end` of the previous). The outer
/// bounds reach frame 0 and the last frame whenever the edge frames clear
/// the extension threshold.
pub fn expand_to_segments(
    grid: &SimilarityGrid,
    anchors: &[usize],
    edge_threshold: f32,
) -> Vec<FrameRange> {
    debug_assert_eq!(anchors.len(), grid.num_slides());
    let last_row = grid.num_slides() - 1;

    let start = extend_start(grid.row(0), anchors[0], edge_threshold);
    let end = extend_end(grid.row(last_row), anchors[last_row], edge_threshold);

    if anchors.len() == 1 {
        return vec![FrameRange { start, end }];
    }

    let dividers: Vec<usize> = (0..anchors.len() - 1)
        .map(|i| best_divider(grid, i, anchors[i], anchors[i + 1]))
        .collect();

    let mut ranges = Vec::with_capacity(anchors.len());
    ranges.push(FrameRange {
        start,
        end: dividers[0],
    });
    for pair in dividers.windows(2) {
        ranges.push(FrameRange {
            start: pair[0] + 1,
            end: pair[1],
        });
    }
    ranges.push(FrameRange {
        start: dividers[dividers.len() - 1] + 1,
        end,
    });
    ranges
}
