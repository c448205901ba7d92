//! OCR text refinement
//!
//! Visual matching alone confuses near-identical slides (section headers,
//! incremental bullet reveals). A second pass compares recognized text, but
//! only inside a window around the first-pass anchors to keep the cost
//! linear in the number of frames.

use crate::core::alignment::grid::{normalize_row, SimilarityGrid};

/// Length of the longest common subsequence of `a` and `b`, char-based.
pub fn lcs_length(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    let mut prev = vec![0usize; b.len() + 1];
    let mut curr = vec![0usize; b.len() + 1];

    for &x in &a {
        for (j, &y) in b.iter().enumerate() {
            curr[j + 1] = if x == y {
                prev[j] + 1
            } else {
                curr[j].max(prev[j + 1])
            };
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

/// How closely the text on a frame matches the text on a slide.
///
/// The square-root factor penalizes frames whose OCR output is long
/// relative to the slide (noisy recognition picks up spurious characters)
/// and rewards compact matches. Zero when the frame has no text.
pub fn text_similarity(slide_text: &str, frame_text: &str) -> f32 {
    let frame_len = frame_text.chars().count();
    if frame_len == 0 {
        return 0.0;
    }
    let slide_len = slide_text.chars().count();
    let lcs = lcs_length(slide_text, frame_text) as f32;
    lcs * (slide_len as f32 / frame_len as f32).sqrt()
}

/// Blend text similarity into the grid around the first-pass anchors.
///
/// For slide `i` the window of frame columns is
/// `[anchor[i - window], anchor[i + window]]`, clamped to the grid at the
/// sequence ends. Window scores are normalized by their maximum and
/// averaged into the visual scores cell by cell; columns outside the window
/// keep their pure-visual score.
pub fn blend_text_scores(
    grid: &mut SimilarityGrid,
    anchors: &[usize],
    slide_texts: &[String],
    frame_texts: &[String],
    window: usize,
) {
    let num_slides = grid.num_slides();
    let last_frame = grid.num_frames() - 1;
    debug_assert_eq!(anchors.len(), num_slides);

    for slide in 0..num_slides {
        let lower = if slide < window {
            0
        } else {
            anchors[slide - window]
        };
        let upper = if slide + window >= num_slides {
            last_frame
        } else {
            anchors[slide + window]
        };

        let mut text_scores: Vec<f32> = (lower..=upper)
            .map(|frame| text_similarity(&slide_texts[slide], &frame_texts[frame]))
            .collect();
        normalize_row(&mut text_scores);

        for frame in lower..=upper {
            let blended = (grid.get(slide, frame) + text_scores[frame - lower]) / 2.0;
            grid.set(slide, frame, blended);
        }
    }
}
