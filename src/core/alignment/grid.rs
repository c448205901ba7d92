//! Slide-by-frame similarity grid

use rayon::prelude::*;

use crate::core::extraction::descriptor::{confident_match_count, DescriptorSet};

/// Dense `num_slides x num_frames` matrix of non-negative match scores.
/// Rows are slides in slide order, columns are frames in chronological
/// order. Mutated in place by normalization and the text blend, then
/// discarded once the segmentation is produced.
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityGrid {
    rows: usize,
    cols: usize,
    data: Vec<f32>,
}

impl SimilarityGrid {
    pub fn from_rows(row_data: Vec<Vec<f32>>) -> Self {
        let rows = row_data.len();
        let cols = row_data.first().map(|r| r.len()).unwrap_or(0);
        debug_assert!(row_data.iter().all(|r| r.len() == cols));
        Self {
            rows,
            cols,
            data: row_data.into_iter().flatten().collect(),
        }
    }

    pub fn num_slides(&self) -> usize {
        self.rows
    }

    pub fn num_frames(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f32 {
        self.data[row * self.cols + col]
    }

    #[inline]
    pub fn set(&mut self, row: usize, col: usize, value: f32) {
        self.data[row * self.cols + col] = value;
    }

    pub fn row(&self, row: usize) -> &[f32] {
        &self.data[row * self.cols..(row + 1) * self.cols]
    }

    pub fn row_mut(&mut self, row: usize) -> &mut [f32] {
        &mut self.data[row * self.cols..(row + 1) * self.cols]
    }

    /// Divide every row by its maximum so the best frame scores 1.0.
    /// All-zero rows are left unchanged (a slide with no visual match
    /// anywhere is recoverable, not a division by zero).
    pub fn normalize_rows(&mut self) {
        for row in 0..self.rows {
            normalize_row(self.row_mut(row));
        }
    }
}

/// Same normalization for one standalone score row.
pub fn normalize_row(row: &mut [f32]) {
    let max = row.iter().cloned().fold(0.0f32, f32::max);
    if max > 0.0 {
        for value in row.iter_mut() {
            *value /= max;
        }
    }
}

/// Count confident descriptor matches for every slide/frame pair.
///
/// This is the dominant cost of an alignment run, so rows are computed in
/// parallel; rows have no data dependency on each other.
pub fn build_similarity_grid(
    slides: &[DescriptorSet],
    frames: &[DescriptorSet],
    match_ratio: f32,
) -> SimilarityGrid {
    let row_data: Vec<Vec<f32>> = slides
        .par_iter()
        .map(|slide| {
            frames
                .iter()
                .map(|frame| confident_match_count(slide, frame, match_ratio) as f32)
                .collect()
        })
        .collect();

    SimilarityGrid::from_rows(row_data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::extraction::descriptor::Descriptor;

    fn set(vectors: &[&[f32]]) -> DescriptorSet {
        DescriptorSet::new(vectors.iter().map(|v| Descriptor::new(v.to_vec())).collect())
    }

    #[test]
    fn test_normalize_rows_max_is_one() {
        let mut grid = SimilarityGrid::from_rows(vec![vec![2.0, 4.0, 1.0], vec![0.5, 0.25, 0.1]]);
        grid.normalize_rows();

        assert_eq!(grid.row(0), &[0.5, 1.0, 0.25]);
        let max: f32 = grid.row(1).iter().cloned().fold(0.0, f32::max);
        assert_eq!(max, 1.0);
    }

    #[test]
    fn test_normalize_rows_keeps_zero_rows() {
        let mut grid = SimilarityGrid::from_rows(vec![vec![0.0, 0.0], vec![3.0, 1.0]]);
        grid.normalize_rows();

        assert_eq!(grid.row(0), &[0.0, 0.0]);
        assert_eq!(grid.row(1), &[1.0, 1.0 / 3.0]);
    }

    #[test]
    fn test_build_grid_dimensions_and_counts() {
        let slides = vec![set(&[&[0.0, 0.0], &[9.0, 9.0]]), set(&[&[50.0, 50.0]])];
        let frames = vec![
            set(&[&[0.0, 0.1], &[9.0, 9.1], &[30.0, 30.0]]),
            set(&[&[50.0, 50.1], &[80.0, 80.0]]),
        ];

        let grid = build_similarity_grid(&slides, &frames, 0.6);
        assert_eq!(grid.num_slides(), 2);
        assert_eq!(grid.num_frames(), 2);
        // Slide 0's two descriptors both match frame 0 confidently.
        assert_eq!(grid.get(0, 0), 2.0);
        assert_eq!(grid.get(1, 1), 1.0);
    }
}
