pub mod admin_operations;
pub mod maintenance;
pub mod operation;
pub mod stats;

pub use admin_operations::CacheAdmin;
pub use maintenance::CleanupScheduler;
pub use operation::AdminOperations;
pub use stats::{StatsCollector, format_size};
