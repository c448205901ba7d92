//! Batch extraction over the worker pool
//!
//! One job per image, all submitted before any wait, results assembled in
//! input order once every job has reported. Partial batches are never
//! returned: a dropped image would silently shift every later grid index.

use std::path::PathBuf;
use std::sync::Arc;

use log::{debug, info};

use crate::core::error::SyncError;
use crate::core::extraction::extractor::{ExtractedImage, FeatureExtractor};
use crate::core::extraction::pool::WorkerPool;

pub struct ExtractionCoordinator {
    pool: WorkerPool,
    extractor: Arc<dyn FeatureExtractor>,
}

impl ExtractionCoordinator {
    pub fn new(extractor: Arc<dyn FeatureExtractor>) -> Self {
        Self::with_workers(extractor, 0)
    }

    /// `workers` of 0 means one per logical CPU.
    pub fn with_workers(extractor: Arc<dyn FeatureExtractor>, workers: usize) -> Self {
        Self {
            pool: WorkerPool::new(workers),
            extractor,
        }
    }

    /// Extract every image, preserving input order in the result.
    ///
    /// Waits out the whole batch even when a job fails early, then reports
    /// the first failure; workers never race a half-abandoned batch.
    pub fn extract_batch(
        &self,
        images: &[PathBuf],
        size_bound: u32,
    ) -> Result<Vec<ExtractedImage>, SyncError> {
        info!(
            "extracting {} images (size bound {})",
            images.len(),
            size_bound
        );

        let tickets: Vec<_> = images
            .iter()
            .map(|path| {
                let extractor = Arc::clone(&self.extractor);
                let path = path.clone();
                self.pool
                    .submit(move || extractor.extract(&path, size_bound))
            })
            .collect();

        let results: Vec<Result<ExtractedImage, SyncError>> =
            tickets.into_iter().map(|ticket| ticket.wait()).collect();
        debug!("batch of {} jobs reported", results.len());

        results.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::extraction::descriptor::{Descriptor, DescriptorSet};
    use crate::core::extraction::extractor::MockFeatureExtractor;
    use crate::core::files::file_number;
    use std::time::Duration;

    fn tagged_extractor() -> MockFeatureExtractor {
        MockFeatureExtractor::with_responses(|path| {
            let name = path.file_name().unwrap().to_str().unwrap();
            let tag = file_number(name).unwrap() as f32;
            Ok(ExtractedImage {
                descriptors: DescriptorSet::new(vec![Descriptor::new(vec![tag])]),
                text: name.to_string(),
            })
        })
    }

    fn paths(count: u64) -> Vec<PathBuf> {
        (1..=count).map(|i| PathBuf::from(format!("img_{i}.png"))).collect()
    }

    #[test]
    fn test_results_in_input_order() {
        let coordinator = ExtractionCoordinator::with_workers(Arc::new(tagged_extractor()), 4);
        let results = coordinator.extract_batch(&paths(8), 200).unwrap();

        let texts: Vec<_> = results.iter().map(|r| r.text.as_str()).collect();
        let expected: Vec<String> = (1..=8).map(|i| format!("img_{i}.png")).collect();
        assert_eq!(texts, expected.iter().map(String::as_str).collect::<Vec<_>>());
    }

    #[test]
    fn test_order_preserved_under_reordered_completion() {
        // Earlier submissions sleep longer, so completion order is the
        // reverse of submission order.
        let extractor = tagged_extractor().with_delays(|path| {
            let number = file_number(path.to_str().unwrap()).unwrap();
            Duration::from_millis(10 * (9 - number))
        });
        let coordinator = ExtractionCoordinator::with_workers(Arc::new(extractor), 8);
        let results = coordinator.extract_batch(&paths(8), 200).unwrap();

        for (i, result) in results.iter().enumerate() {
            assert_eq!(result.text, format!("img_{}.png", i + 1));
        }
    }

    #[test]
    fn test_any_failure_fails_the_batch() {
        let extractor = MockFeatureExtractor::with_responses(|path| {
            if path.to_str().unwrap().contains("3") {
                Err(SyncError::extraction(path, "unreadable"))
            } else {
                Ok(ExtractedImage::default())
            }
        });
        let coordinator = ExtractionCoordinator::with_workers(Arc::new(extractor), 2);
        let err = coordinator.extract_batch(&paths(5), 200).unwrap_err();
        assert!(matches!(err, SyncError::Extraction { .. }));
    }

    #[test]
    fn test_empty_batch_is_empty() {
        let coordinator = ExtractionCoordinator::with_workers(Arc::new(tagged_extractor()), 2);
        assert!(coordinator.extract_batch(&[], 200).unwrap().is_empty());
    }
}
