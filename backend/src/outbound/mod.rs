//! Outbound adapters implementing the driven domain ports.
//!
//! Adapters translate between domain types and their storage
//! representation and contain no business logic.
//!
//! - **memory**: process-local stores used by the server and in tests.

pub mod memory;
