//! Row types and input DTOs.

pub mod agent;
pub mod agent_error;
pub mod attack;
pub mod benchmark;
pub mod crack;
pub mod device_performance;
pub mod status_update;
pub mod task;
