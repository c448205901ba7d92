//! Monotonic slide-to-frame alignment
//!
//! Traces the maximum-score path from the top row of the grid to the bottom,
//! moving right at least one column per row. Assumes every slide appears
//! exactly once and later in the video than the previous one; repeated or
//! skipped slides are outside the model and degrade the result rather than
//! being detected.

use crate::core::alignment::grid::SimilarityGrid;
use crate::core::error::SyncError;

/// One anchor frame index per slide, strictly increasing.
///
/// Normalizes the grid rows, then runs a two-phase dynamic program: a
/// forward sweep tracking, per cell, the best score reachable in that row up
/// to that column together with a back-pointer to the column that set it,
/// and a backtrack from the last cell recovering one anchor per row. A cell
/// in row `r` is only reachable from column `r` on (each earlier slide needs
/// a distinct earlier frame), so fewer frames than slides is rejected
/// before the sweep.
pub fn determine_best_frames(grid: &mut SimilarityGrid) -> Result<Vec<usize>, SyncError> {
    let num_slides = grid.num_slides();
    let num_frames = grid.num_frames();

    if num_slides == 0 {
        return Err(SyncError::EmptyInput("no slide rows in grid"));
    }
    if num_frames < num_slides {
        return Err(SyncError::InfeasiblePath {
            num_slides,
            num_frames,
        });
    }

    grid.normalize_rows();

    let mut score = vec![0.0f32; num_slides * num_frames];
    // pointers[r][c] = column whose "advance" move produced the running
    // maximum at (r, c); initialized to the cell's own column.
    let mut pointers: Vec<usize> = (0..num_slides)
        .flat_map(|_| 0..num_frames)
        .collect();
    let idx = |row: usize, col: usize| row * num_frames + col;

    score[idx(0, 0)] = grid.get(0, 0);
    for col in 1..num_frames {
        // Ties prefer the carried maximum, biasing toward earlier frames.
        if score[idx(0, col - 1)] >= grid.get(0, col) {
            score[idx(0, col)] = score[idx(0, col - 1)];
            pointers[idx(0, col)] = pointers[idx(0, col - 1)];
        } else {
            score[idx(0, col)] = grid.get(0, col);
        }
    }

    for row in 1..num_slides {
        score[idx(row, row)] = score[idx(row - 1, row - 1)] + grid.get(row, row);
        for col in row + 1..num_frames {
            let advance = score[idx(row - 1, col - 1)] + grid.get(row, col);
            if score[idx(row, col - 1)] >= advance {
                score[idx(row, col)] = score[idx(row, col - 1)];
                pointers[idx(row, col)] = pointers[idx(row, col - 1)];
            } else {
                score[idx(row, col)] = advance;
            }
        }
    }

    let mut anchors = vec![0usize; num_slides];
    let mut frame = pointers[idx(num_slides - 1, num_frames - 1)];
    anchors[num_slides - 1] = frame;
    for row in (0..num_slides - 1).rev() {
        // The previous slide's anchor is the best column strictly before
        // this slide's anchor.
        frame = pointers[idx(row, frame - 1)];
        anchors[row] = frame;
    }

    Ok(anchors)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(rows: Vec<Vec<f32>>) -> SimilarityGrid {
        SimilarityGrid::from_rows(rows)
    }

    #[test]
    fn test_diagonal_grid() {
        let mut g = grid(vec![
            vec![1.0, 0.0, 0.0],
            vec![0.0, 1.0, 0.0],
            vec![0.0, 0.0, 1.0],
        ]);
        assert_eq!(determine_best_frames(&mut g).unwrap(), vec![0, 1, 2]);
    }

    #[test]
    fn test_single_row_picks_maximum() {
        let mut g = grid(vec![vec![0.2, 0.5, 1.0, 0.3]]);
        assert_eq!(determine_best_frames(&mut g).unwrap(), vec![2]);
    }

    #[test]
    fn test_anchors_strictly_increasing_and_in_bounds() {
        let mut g = grid(vec![
            vec![0.9, 0.8, 0.1, 0.0, 0.0],
            vec![0.8, 0.9, 0.2, 0.1, 0.0],
            vec![0.0, 0.1, 0.2, 0.9, 0.8],
        ]);
        let anchors = determine_best_frames(&mut g).unwrap();
        for (row, window) in anchors.windows(2).enumerate() {
            assert!(window[0] < window[1], "anchors not increasing: {:?}", anchors);
            assert!(window[0] >= row);
        }
        assert!(*anchors.last().unwrap() <= 4);
    }

    #[test]
    fn test_tie_break_prefers_earlier_frame() {
        // Frames 0 and 2 score identically for the only slide; the earlier
        // one wins.
        let mut g = grid(vec![vec![1.0, 0.0, 1.0]]);
        assert_eq!(determine_best_frames(&mut g).unwrap(), vec![0]);
    }

    #[test]
    fn test_rerun_is_idempotent() {
        let mut g = grid(vec![
            vec![0.3, 0.9, 0.2, 0.1],
            vec![0.1, 0.4, 0.8, 0.3],
        ]);
        let first = determine_best_frames(&mut g).unwrap();
        let second = determine_best_frames(&mut g).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_exact_frame_count() {
        // As many frames as slides leaves exactly one feasible path.
        let mut g = grid(vec![
            vec![0.1, 0.9, 0.9],
            vec![0.9, 0.1, 0.9],
            vec![0.9, 0.9, 0.1],
        ]);
        assert_eq!(determine_best_frames(&mut g).unwrap(), vec![0, 1, 2]);
    }

    #[test]
    fn test_infeasible_when_fewer_frames_than_slides() {
        let mut g = grid(vec![vec![1.0, 0.5], vec![0.5, 1.0], vec![0.2, 0.3]]);
        let err = determine_best_frames(&mut g).unwrap_err();
        assert!(matches!(
            err,
            SyncError::InfeasiblePath {
                num_slides: 3,
                num_frames: 2,
            }
        ));
    }

    #[test]
    fn test_degenerate_row_still_gets_a_frame() {
        let mut g = grid(vec![
            vec![1.0, 0.2, 0.1],
            vec![0.0, 0.0, 0.0],
            vec![0.1, 0.2, 1.0],
        ]);
        let anchors = determine_best_frames(&mut g).unwrap();
        assert_eq!(anchors.len(), 3);
        assert!(anchors[0] < anchors[1] && anchors[1] < anchors[2]);
    }
}
