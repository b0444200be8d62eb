//! Depot: a multi-agent robotic warehouse simulation for reinforcement learning.
//!
//! This is the top-level facade crate that re-exports the public API from
//! all Depot sub-crates. For most users, adding `depot` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use depot::prelude::*;
//!
//! let config = WarehouseConfig {
//!     map: MapId::Tiny,
//!     num_agents: 2,
//!     seed: 42,
//!     ..Default::default()
//! };
//! let mut engine = BatchedEngine::new(config, 4, None).unwrap();
//! let mut buffers = OwnedBuffers::for_engine(&engine);
//! engine.reset(&mut buffers.view()).unwrap();
//!
//! buffers.actions.fill(Action::Forward.code());
//! let result = engine.step(&mut buffers.view()).unwrap();
//! assert_eq!(result.metrics.len(), 4);
//! assert_eq!(buffers.observations.len(), 4 * 2 * engine.obs_size());
//!
//! let summary = engine.shutdown();
//! assert_eq!(summary.n, 0);
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for types not in the prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `depot-core` | IDs, geometry, actions, errors |
//! | [`grid`] | `depot-grid` | Layouts, presets, ASCII maps |
//! | [`sim`] | `depot-sim` | Single warehouse instance, movement resolver, observations |
//! | [`engine`] | `depot-engine` | Batched and parallel stepping |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Identifiers, geometry, actions and the error taxonomy (`depot-core`).
pub use depot_core as types;

/// Static layouts and map sources (`depot-grid`).
///
/// [`grid::MapId`] builds the robotic-warehouse presets;
/// [`grid::AsciiMap`] parses hand-written maps.
pub use depot_grid as grid;

/// Single-instance simulation (`depot-sim`).
///
/// [`sim::Warehouse`] is one environment; [`sim::MovementResolver`] is
/// the simultaneous-move conflict resolver it uses every tick.
pub use depot_sim as sim;

/// Batched stepping (`depot-engine`).
pub use depot_engine as engine;

/// Common imports for typical Depot usage.
///
/// ```rust
/// use depot::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use depot_core::{Action, AgentId, Coord, Direction, ShelfId, TickId, WarehouseError};

    // Layouts
    pub use depot_grid::{AsciiMap, CellKind, Layout, MapId, MapSource};

    // Single instance
    pub use depot_sim::{
        AgentState, Client, ConfigError, Interactive, LogSummary, RewardConfig, StartState,
        StepMetrics, StepOutcome, Warehouse, WarehouseConfig, WarehouseView,
    };

    // Batching
    pub use depot_engine::{BatchBuffers, BatchError, BatchedEngine, OwnedBuffers};
}
