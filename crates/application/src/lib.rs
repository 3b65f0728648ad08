//! Quiver Application Layer
//!
//! Orchestration logic that is independent of any concrete storage or
//! transport: the variable resolver, the collection runner, and the
//! ports the infrastructure layer implements.

pub mod error;
pub mod ports;
pub mod resolver;
pub mod runner;

pub use error::{ApplicationError, ApplicationResult};
