//! Full alignment run: grid, two solver passes, segmentation

use log::{debug, info, warn};

use crate::core::alignment::grid::build_similarity_grid;
use crate::core::alignment::refine::{expand_to_segments, FrameRange};
use crate::core::alignment::solver::determine_best_frames;
use crate::core::alignment::text::blend_text_scores;
use crate::core::error::SyncError;
use crate::core::extraction::extractor::ExtractedImage;

#[derive(Debug, Clone)]
pub struct AlignmentConfig {
    /// Nearest-neighbor ratio test threshold for a confident descriptor
    /// match.
    pub match_ratio: f32,
    /// Fraction of the anchor score a frame must keep for the first/last
    /// segment to extend over it.
    pub edge_threshold: f32,
    /// Half-width, in slides, of the anchor window the text pass blends
    /// inside.
    pub text_window: usize,
}

impl Default for AlignmentConfig {
    fn default() -> Self {
        Self {
            match_ratio: 0.6,
            edge_threshold: 0.2,
            text_window: 2,
        }
    }
}

/// Align slides to frames and return one frame range per slide.
///
/// Visual pass first: descriptor match counts over all slide/frame pairs,
/// solved for preliminary anchors. When any input carries text, a second
/// pass blends text similarity into the grid around those anchors and
/// re-solves. Anchors then expand into contiguous per-slide ranges.
pub fn align(
    slides: &[ExtractedImage],
    frames: &[ExtractedImage],
    config: &AlignmentConfig,
) -> Result<Vec<FrameRange>, SyncError> {
    if slides.is_empty() {
        return Err(SyncError::EmptyInput("no slides"));
    }
    if frames.is_empty() {
        return Err(SyncError::EmptyInput("no frames"));
    }
    if frames.len() < slides.len() {
        return Err(SyncError::InfeasiblePath {
            num_slides: slides.len(),
            num_frames: frames.len(),
        });
    }

    info!(
        "building {}x{} similarity grid",
        slides.len(),
        frames.len()
    );
    let slide_sets: Vec<_> = slides.iter().map(|s| s.descriptors.clone()).collect();
    let frame_sets: Vec<_> = frames.iter().map(|f| f.descriptors.clone()).collect();
    let mut grid = build_similarity_grid(&slide_sets, &frame_sets, config.match_ratio);
    for row in 0..grid.num_slides() {
        if grid.row(row).iter().all(|&score| score == 0.0) {
            // Recoverable: the row stays all-zero and the solver still
            // assigns it a frame, just without evidence.
            warn!("slide {} has no visual match in any frame", row);
        }
    }

    let preliminary = determine_best_frames(&mut grid)?;
    debug!("preliminary anchors: {:?}", preliminary);

    let has_text = slides.iter().any(|s| !s.text.is_empty())
        && frames.iter().any(|f| !f.text.is_empty());
    let refined = if has_text {
        let slide_texts: Vec<String> = slides.iter().map(|s| s.text.clone()).collect();
        let frame_texts: Vec<String> = frames.iter().map(|f| f.text.clone()).collect();
        blend_text_scores(
            &mut grid,
            &preliminary,
            &slide_texts,
            &frame_texts,
            config.text_window,
        );
        determine_best_frames(&mut grid)?
    } else {
        // No recognized text anywhere; blending zeros would only dilute
        // the visual scores inside the windows.
        debug!("no text on either side, skipping text refinement");
        preliminary
    };
    debug!("refined anchors: {:?}", refined);

    let segments = expand_to_segments(&grid, &refined, config.edge_threshold);
    info!("aligned {} slides", segments.len());
    Ok(segments)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::extraction::descriptor::{Descriptor, DescriptorSet};

    /// One far-apart descriptor cluster per identity, so matching is
    /// unambiguous: identity 0 descriptors sit near (0, 0), identity 1
    /// near (100, 0), and so on.
    fn image_for(identity: usize, text: &str) -> ExtractedImage {
        let base = identity as f32 * 100.0;
        let descriptors = (0..4)
            .map(|i| Descriptor::new(vec![base + i as f32 * 0.1, i as f32 * 0.1]))
            .collect();
        ExtractedImage {
            descriptors: DescriptorSet::new(descriptors),
            text: text.to_string(),
        }
    }

    #[test]
    fn test_visual_only_alignment() {
        let slides = vec![image_for(0, ""), image_for(1, ""), image_for(2, "")];
        // Each slide shown for two keyframes.
        let frames = vec![
            image_for(0, ""),
            image_for(0, ""),
            image_for(1, ""),
            image_for(1, ""),
            image_for(2, ""),
            image_for(2, ""),
        ];

        let ranges = align(&slides, &frames, &AlignmentConfig::default()).unwrap();
        assert_eq!(ranges.len(), 3);
        assert_eq!(ranges[0].start, 0);
        assert_eq!(ranges[2].end, 5);
        for pair in ranges.windows(2) {
            assert_eq!(pair[1].start, pair[0].end + 1);
        }
    }

    #[test]
    fn test_text_breaks_visual_tie() {
        // Slides 0 and 1 look identical; only their text differs.
        let slides = vec![image_for(0, "first part"), image_for(0, "second part")];
        let frames = vec![
            image_for(0, "first part"),
            image_for(0, "second part"),
            image_for(0, "second part"),
        ];

        let ranges = align(&slides, &frames, &AlignmentConfig::default()).unwrap();
        assert_eq!(ranges.len(), 2);
        // The text pass pins slide 1 no earlier than frame 1.
        assert!(ranges[1].start >= 1);
        assert_eq!(ranges[1].end, 2);
    }

    #[test]
    fn test_infeasible_input_rejected_up_front() {
        let slides = vec![image_for(0, ""), image_for(1, "")];
        let frames = vec![image_for(0, "")];
        assert!(matches!(
            align(&slides, &frames, &AlignmentConfig::default()),
            Err(SyncError::InfeasiblePath {
                num_slides: 2,
                num_frames: 1,
            })
        ));
    }

    #[test]
    fn test_empty_inputs_rejected() {
        let some = vec![image_for(0, "")];
        assert!(matches!(
            align(&[], &some, &AlignmentConfig::default()),
            Err(SyncError::EmptyInput(_))
        ));
        assert!(matches!(
            align(&some, &[], &AlignmentConfig::default()),
            Err(SyncError::EmptyInput(_))
        ));
    }
}
