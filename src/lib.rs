pub mod api;
pub mod core;

pub use api::{SlideSynchronizer, SlideTiming, SyncConfig};
pub use core::SyncError;

pub fn init_logging() {
    let _ = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info"),
    )
    .try_init();
}
