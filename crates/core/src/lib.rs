//! Pure domain logic for the CipherSwarm task coordinator.
//!
//! Nothing in this crate performs I/O. The persistence layer, the
//! coordinator service and the HTTP adapters all build on these types.

pub mod agent_errors;
pub mod agent_token;
pub mod benchmarks;
pub mod cracks;
pub mod error;
pub mod hashing;
pub mod keyspace;
pub mod liveness;
pub mod registry;
pub mod status;
pub mod task_details;
pub mod task_lifecycle;
pub mod telemetry;
pub mod types;
