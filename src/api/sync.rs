//! Public entry point
//!
//! ```no_run
//! use std::sync::Arc;
//! use slide_sync::api::sync::SlideSynchronizer;
//! use slide_sync::core::extraction::PatchFeatureExtractor;
//!
//! let synchronizer = SlideSynchronizer::new(Arc::new(PatchFeatureExtractor::new()));
//! let timings = synchronizer
//!     .synchronize("files/after/slides".as_ref(), "files/after/frames".as_ref(), &[0.0, 4.5, 9.2])
//!     .unwrap();
//! ```

use std::path::Path;
use std::sync::Arc;

use log::info;

use crate::api::models::SlideTiming;
use crate::core::alignment::{align, AlignmentConfig};
use crate::core::error::SyncError;
use crate::core::extraction::{ExtractionCoordinator, FeatureExtractor};
use crate::core::files::numbered_files;

/// Keyframe images as produced by the external keyframe extractor.
const FRAME_EXTENSION: &str = "png";
/// Slide page images as produced by the external PDF converter.
const SLIDE_EXTENSION: &str = "jpg";

#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Resize bound for slide images before extraction.
    pub slide_size_bound: u32,
    /// Resize bound for frame images before extraction.
    pub frame_size_bound: u32,
    /// Worker threads for extraction; 0 means one per logical CPU.
    pub workers: usize,
    pub alignment: AlignmentConfig,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            slide_size_bound: 500,
            frame_size_bound: 200,
            workers: 0,
            alignment: AlignmentConfig::default(),
        }
    }
}

/// Matches a directory of slide images against a directory of timestamped
/// video keyframes.
pub struct SlideSynchronizer {
    coordinator: ExtractionCoordinator,
    config: SyncConfig,
}

impl SlideSynchronizer {
    pub fn new(extractor: Arc<dyn FeatureExtractor>) -> Self {
        Self::with_config(extractor, SyncConfig::default())
    }

    pub fn with_config(extractor: Arc<dyn FeatureExtractor>, config: SyncConfig) -> Self {
        Self {
            coordinator: ExtractionCoordinator::with_workers(extractor, config.workers),
            config,
        }
    }

    /// Determine when each slide first appears in the video.
    ///
    /// `slide_dir` holds one numbered `.jpg` per page, `frame_dir` one
    /// numbered `.png` per keyframe, and `timestamps` the keyframe times in
    /// seconds, one per frame in frame order.
    pub fn synchronize(
        &self,
        slide_dir: &Path,
        frame_dir: &Path,
        timestamps: &[f64],
    ) -> Result<Vec<SlideTiming>, SyncError> {
        let frame_paths = numbered_files(frame_dir, FRAME_EXTENSION)?;
        let slide_paths = numbered_files(slide_dir, SLIDE_EXTENSION)?;
        info!(
            "synchronizing {} slides against {} frames",
            slide_paths.len(),
            frame_paths.len()
        );

        if timestamps.len() != frame_paths.len() {
            return Err(SyncError::TimestampMismatch {
                timestamps: timestamps.len(),
                frames: frame_paths.len(),
            });
        }

        // Frames first, then slides, as two separate batches.
        let frames = self
            .coordinator
            .extract_batch(&frame_paths, self.config.frame_size_bound)?;
        let slides = self
            .coordinator
            .extract_batch(&slide_paths, self.config.slide_size_bound)?;

        let segments = align(&slides, &frames, &self.config.alignment)?;

        Ok(slide_paths
            .iter()
            .zip(segments.iter())
            .map(|(path, segment)| SlideTiming {
                image: path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default(),
                timestamp: timestamps[segment.start],
            })
            .collect())
    }

    /// Same as `synchronize`, serialized to the JSON array consumed by the
    /// delivery layer.
    pub fn synchronize_to_json(
        &self,
        slide_dir: &Path,
        frame_dir: &Path,
        timestamps: &[f64],
    ) -> Result<String, SyncError> {
        let timings = self.synchronize(slide_dir, frame_dir, timestamps)?;
        Ok(serde_json::to_string(&timings)?)
    }
}
