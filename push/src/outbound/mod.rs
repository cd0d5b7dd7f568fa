//! Outbound adapters implementing domain ports.
//!
//! - **kv**: in-memory and file-backed key-value stores
//! - **presenter**: headless notification presenter that logs through
//!   `tracing`
//!
//! Adapters translate between domain types and the host resources. They
//! contain no pipeline logic.

pub mod kv;
pub mod presenter;
