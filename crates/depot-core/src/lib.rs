//! Core types for the Depot warehouse simulation.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the identifiers, grid geometry, the per-tick action enum, and the
//! error taxonomy shared by every other Depot crate.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod action;
pub mod error;
pub mod geometry;
pub mod id;

pub use action::Action;
pub use error::{DropFailure, PickupFailure, WarehouseError};
pub use geometry::{Coord, Direction};
pub use id::{AgentId, ShelfId, TickId};
