//! Static warehouse layouts for Depot simulations.
//!
//! A [`Layout`] is the immutable part of a warehouse: its dimensions and
//! the [`CellKind`] of every cell. Dynamic occupancy (which agent stands
//! where, which shelf is parked where) lives in `depot-sim`.
//!
//! # Map sources
//!
//! - [`MapId`]: procedurally generated robotic-warehouse presets
//!   (tiny, small, medium, large, or explicit block counts)
//! - [`AsciiMap`]: hand-written maps in a one-character-per-cell format
//!
//! Both implement [`MapSource`], the seam through which a host can inject
//! its own map loader.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod cell;
pub mod error;
pub mod layout;
pub mod parse;
pub mod preset;
pub mod source;

pub use cell::CellKind;
pub use error::GridError;
pub use layout::Layout;
pub use preset::MapId;
pub use source::{AsciiMap, MapSource};
