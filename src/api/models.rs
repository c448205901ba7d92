use serde::{Deserialize, Serialize};

/// Final answer for one slide: the slide image's filename and the video
/// timestamp (seconds) at which it first appears.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlideTiming {
    pub image: String,
    pub timestamp: f64,
}
