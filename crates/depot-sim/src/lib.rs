//! Single-instance warehouse simulation for Depot.
//!
//! A [`Warehouse`] is one multi-agent robotic-warehouse environment:
//! agents drive around a grid, pick up requested shelves, carry them to
//! goal cells and return them. Each [`step`](Warehouse::step) decodes one
//! action per agent, resolves all moves simultaneously with the
//! [`MovementResolver`], scores deliveries, and writes flat per-agent
//! observations.
//!
//! Batching many instances and draining their episode logs is the job of
//! `depot-engine`.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod agent;
pub mod client;
pub mod config;
pub mod grid;
pub mod log;
pub mod metrics;
pub mod movement;
pub mod obs;
pub mod reward;
pub mod shelf;
pub mod start;
pub mod view;
pub mod warehouse;

pub use agent::{Agent, AgentState};
pub use client::{Client, Interactive};
pub use config::{ConfigError, WarehouseConfig};
pub use grid::Grid;
pub use log::{EpisodeLog, LogRecord, LogSummary};
pub use metrics::StepMetrics;
pub use movement::{Intent, MoveOutcome, MovementGraph, MovementResolver, Resolution};
pub use obs::ObsLayout;
pub use reward::RewardConfig;
pub use shelf::{Shelf, ShelfRegistry};
pub use start::{AgentPlacement, StartState};
pub use view::WarehouseView;
pub use warehouse::{StepOutcome, Warehouse};
