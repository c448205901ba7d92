pub mod models;
pub mod sync;

pub use models::SlideTiming;
pub use sync::{SlideSynchronizer, SyncConfig};
