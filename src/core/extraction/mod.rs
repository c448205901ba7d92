//! Feature extraction: descriptors and recognized text per image
//!
//! The heavy lifting is behind the `FeatureExtractor` capability; this
//! module supplies the worker pool and the batch coordinator that keep
//! result order aligned with input order.

pub mod coordinator;
pub mod descriptor;
pub mod extractor;
pub mod pool;

pub use coordinator::ExtractionCoordinator;
pub use descriptor::{confident_match_count, Descriptor, DescriptorSet};
pub use extractor::{ExtractedImage, FeatureExtractor, MockFeatureExtractor, PatchFeatureExtractor};
pub use pool::{JobTicket, WorkerPool};
