//! Batched stepping of many Depot warehouse instances.
//!
//! [`BatchedEngine`] owns N independent [`Warehouse`](depot_sim::Warehouse)
//! instances and steps them all in one call against flat, caller-owned
//! buffers, optionally fanning out across a rayon thread pool. Episode
//! statistics are drained in aggregate with
//! [`aggregate_and_clear`](BatchedEngine::aggregate_and_clear).

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod batched;
pub mod buffers;

pub use batched::{BatchError, BatchResult, BatchedEngine};
pub use buffers::{BatchBuffers, OwnedBuffers};
pub use depot_sim::LogSummary;
