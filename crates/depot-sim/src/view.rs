//! Read-only snapshots for rendering clients.

use depot_core::{Coord, TickId};
use depot_grid::{CellKind, Layout};

use crate::agent::Agent;
use crate::shelf::ShelfRegistry;
use crate::warehouse::Warehouse;

/// A borrowed, read-only view of one instance between ticks.
///
/// Clients render from this and never see mutable state.
#[derive(Clone, Copy, Debug)]
pub struct WarehouseView<'a> {
    /// Static floor plan.
    pub layout: &'a Layout,
    /// Agents in id order.
    pub agents: &'a [Agent],
    /// Shelves and requests.
    pub shelves: &'a ShelfRegistry,
    /// Ticks played in the current episode.
    pub tick: TickId,
    /// Summed reward of the current episode so far.
    pub episode_return: f32,
    /// Pixels per cell requested by the configuration.
    pub pixel_scale: u32,
}

impl<'a> WarehouseView<'a> {
    pub(crate) fn new(w: &'a Warehouse) -> Self {
        Self {
            layout: w.grid().layout(),
            agents: w.agents(),
            shelves: w.shelves(),
            tick: w.tick(),
            episode_return: w.episode_return(),
            pixel_scale: w.config().pixel_scale,
        }
    }

    /// Shelves delivered in the current episode.
    pub fn delivered(&self) -> u32 {
        self.shelves.delivered_total()
    }

    /// Glyph for one cell.
    ///
    /// Agents draw as `A` (empty-handed) or `L` (loaded); otherwise a
    /// parked requested shelf draws as `R`, and everything else falls back
    /// to the layout glyph.
    pub fn glyph(&self, at: Coord) -> char {
        if let Some(agent) = self.agents.iter().find(|a| a.position() == at) {
            return if agent.carrying().is_some() { 'L' } else { 'A' };
        }
        let parked_requested = self
            .shelves
            .requested_ids()
            .filter_map(|id| self.shelves.get(id))
            .any(|s| s.is_parked() && s.location() == at);
        if parked_requested {
            return 'R';
        }
        self.layout.kind(at).map_or(' ', CellKind::glyph)
    }

    /// Render the whole floor, one line per row.
    pub fn to_ascii(&self) -> String {
        let mut out =
            String::with_capacity(self.layout.cell_count() + self.layout.height() as usize);
        for y in 0..self.layout.height() as i32 {
            for x in 0..self.layout.width() as i32 {
                out.push(self.glyph(Coord::new(x, y)));
            }
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WarehouseConfig;
    use crate::start::{AgentPlacement, StartState};
    use depot_core::{Direction, ShelfId};
    use depot_grid::AsciiMap;

    #[test]
    fn renders_agents_and_requests() {
        let config = WarehouseConfig {
            num_agents: 1,
            num_requested: 1,
            ..Default::default()
        };
        let mut w = Warehouse::with_map(config, &AsciiMap::new("xx.\n..g")).unwrap();
        w.reset_to(&StartState {
            agents: vec![AgentPlacement::new(2, 0, Direction::West)],
            requested: vec![ShelfId(1)],
        })
        .unwrap();
        let view = w.view();
        assert_eq!(view.to_ascii(), "xRA\n..g\n");
        assert_eq!(view.delivered(), 0);
        assert_eq!(view.pixel_scale, 64);
    }
}
