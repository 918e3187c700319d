//! The secondary node: an idempotent, order-tolerant sink for replicated entries.

pub mod log;
pub mod routes;
