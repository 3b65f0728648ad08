//! Ports implemented by the infrastructure layer.

pub mod execution;
pub mod storage;

pub use execution::{ExecutionAdapter, ExecutionError, ExecutionResponse, ResolvedCall};
pub use storage::RunnerStorage;
