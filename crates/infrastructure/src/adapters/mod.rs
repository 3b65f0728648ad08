//! Outbound adapters.

mod reqwest_adapter;

pub use reqwest_adapter::ReqwestExecutionAdapter;
