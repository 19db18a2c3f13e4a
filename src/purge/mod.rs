pub mod context;
pub mod engine;
pub mod lock;
pub mod result;

pub use context::ExecutionContext;
pub use engine::{cache_usage, check_cache_dir, empty_dir, CacheUsage, PurgeEngine};
pub use lock::PurgeLock;
pub use result::{PurgeResult, PurgeStats};
