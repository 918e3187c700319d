//! A primary-backup replicated append-only log served over HTTP.
//!
//! See `primary` for the master side (C3-C7) and `secondary` for the replica side (C1).

pub mod config;
pub mod entry;
pub mod error;
pub mod primary;
pub mod secondary;
