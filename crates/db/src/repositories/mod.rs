//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods over
//! either `&PgPool` or `&mut PgConnection` (for steps inside a caller's
//! transaction).

pub mod agent_error_repo;
pub mod agent_repo;
pub mod attack_repo;
pub mod benchmark_repo;
pub mod crack_repo;
pub mod device_performance_repo;
pub mod status_update_repo;
pub mod task_repo;

pub use agent_error_repo::AgentErrorRepo;
pub use agent_repo::AgentRepo;
pub use attack_repo::AttackRepo;
pub use benchmark_repo::BenchmarkRepo;
pub use crack_repo::CrackRepo;
pub use device_performance_repo::DevicePerformanceRepo;
pub use status_update_repo::StatusUpdateRepo;
pub use task_repo::TaskRepo;
