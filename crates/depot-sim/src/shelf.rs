//! Shelf registry: identity, location and request status of every shelf.

use depot_core::{AgentId, Coord, DropFailure, PickupFailure, ShelfId, WarehouseError};
use depot_grid::Layout;
use indexmap::IndexSet;
use rand::Rng;

/// One shelf of goods.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Shelf {
    id: ShelfId,
    home: Coord,
    location: Coord,
    requested: bool,
    carried_by: Option<AgentId>,
    delivered_count: u32,
}

impl Shelf {
    /// A shelf parked on its home storage cell.
    pub fn new(id: ShelfId, home: Coord) -> Self {
        Self {
            id,
            home,
            location: home,
            requested: false,
            carried_by: None,
            delivered_count: 0,
        }
    }

    /// Registry id.
    pub fn id(&self) -> ShelfId {
        self.id
    }

    /// The storage cell this shelf belongs on.
    pub fn home(&self) -> Coord {
        self.home
    }

    /// Current cell (the carrier's cell while carried).
    pub fn location(&self) -> Coord {
        self.location
    }

    /// Whether the shelf is on the request queue.
    pub fn is_requested(&self) -> bool {
        self.requested
    }

    /// The carrying agent, if any.
    pub fn carried_by(&self) -> Option<AgentId> {
        self.carried_by
    }

    /// Whether the shelf is parked (not carried).
    pub fn is_parked(&self) -> bool {
        self.carried_by.is_none()
    }

    /// Deliveries of this shelf in the current episode.
    pub fn delivered_count(&self) -> u32 {
        self.delivered_count
    }
}

/// All shelves of one instance, plus the request queue.
///
/// Ids are dense and assigned in row-major order of the layout's storage
/// cells. The request queue preserves insertion order so that
/// observations and logs are deterministic.
#[derive(Clone, Debug)]
pub struct ShelfRegistry {
    shelves: Vec<Shelf>,
    requested: IndexSet<ShelfId>,
    delivered: u32,
}

impl ShelfRegistry {
    /// One shelf per storage cell of `layout`, all parked at home.
    pub fn new(layout: &Layout) -> Self {
        let shelves = layout
            .storage()
            .iter()
            .enumerate()
            .map(|(i, &home)| Shelf::new(ShelfId(i as u32), home))
            .collect();
        Self {
            shelves,
            requested: IndexSet::new(),
            delivered: 0,
        }
    }

    /// Send every shelf home and clear requests and counters.
    pub(crate) fn reset(&mut self) {
        for shelf in &mut self.shelves {
            *shelf = Shelf::new(shelf.id, shelf.home);
        }
        self.requested.clear();
        self.delivered = 0;
    }

    /// Number of shelves.
    pub fn len(&self) -> usize {
        self.shelves.len()
    }

    /// Whether the registry holds no shelves.
    pub fn is_empty(&self) -> bool {
        self.shelves.is_empty()
    }

    /// Look up a shelf.
    pub fn get(&self, id: ShelfId) -> Option<&Shelf> {
        self.shelves.get(id.index())
    }

    fn slot(&mut self, id: ShelfId) -> Result<&mut Shelf, WarehouseError> {
        self.shelves
            .get_mut(id.index())
            .ok_or_else(|| WarehouseError::invariant(format!("unknown shelf {id}")))
    }

    /// Iterate shelves in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Shelf> {
        self.shelves.iter()
    }

    /// Requested shelf ids, oldest request first.
    pub fn requested_ids(&self) -> impl Iterator<Item = ShelfId> + '_ {
        self.requested.iter().copied()
    }

    /// Number of outstanding requests.
    pub fn requested_len(&self) -> usize {
        self.requested.len()
    }

    /// Whether `id` is currently requested.
    pub fn is_requested(&self, id: ShelfId) -> bool {
        self.requested.contains(&id)
    }

    /// Total deliveries this episode.
    pub fn delivered_total(&self) -> u32 {
        self.delivered
    }

    /// The shelf carried by `agent`, if any.
    pub fn carried_by(&self, agent: AgentId) -> Option<ShelfId> {
        self.shelves
            .iter()
            .find(|s| s.carried_by == Some(agent))
            .map(|s| s.id)
    }

    /// Put `id` on the request queue.
    ///
    /// Idempotent: returns `Ok(false)` if the shelf was already requested.
    pub fn request(&mut self, id: ShelfId) -> Result<bool, WarehouseError> {
        self.slot(id)?.requested = true;
        Ok(self.requested.insert(id))
    }

    /// Request a uniformly chosen shelf that is neither requested nor
    /// carried. Returns `None` when no candidate exists.
    pub fn request_random<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<ShelfId> {
        let candidates = self
            .shelves
            .iter()
            .filter(|s| !s.requested && s.carried_by.is_none())
            .count();
        if candidates == 0 {
            return None;
        }
        let pick = rng.random_range(0..candidates);
        let id = self
            .shelves
            .iter()
            .filter(|s| !s.requested && s.carried_by.is_none())
            .nth(pick)
            .map(|s| s.id)?;
        self.shelves[id.index()].requested = true;
        self.requested.insert(id);
        Some(id)
    }

    /// Hand the parked shelf `id` at `at` to `agent`.
    pub fn pick_up(
        &mut self,
        id: ShelfId,
        agent: AgentId,
        at: Coord,
    ) -> Result<(), WarehouseError> {
        if self.carried_by(agent).is_some() {
            return Err(WarehouseError::InvalidPickup {
                agent,
                reason: PickupFailure::AlreadyCarrying,
            });
        }
        let shelf = self.slot(id)?;
        if shelf.carried_by.is_some() || shelf.location != at {
            return Err(WarehouseError::InvalidPickup {
                agent,
                reason: PickupFailure::NoShelfHere,
            });
        }
        shelf.carried_by = Some(agent);
        Ok(())
    }

    /// Set down the shelf carried by `agent` at `at`.
    ///
    /// Only the shelf's own home cell accepts it. Returns the shelf id.
    pub fn set_down(&mut self, agent: AgentId, at: Coord) -> Result<ShelfId, WarehouseError> {
        let id = self.carried_by(agent).ok_or(WarehouseError::InvalidDrop {
            agent,
            reason: DropFailure::NotCarrying,
        })?;
        let shelf = self.slot(id)?;
        if shelf.home != at {
            return Err(WarehouseError::InvalidDrop {
                agent,
                reason: DropFailure::NotHomeCell,
            });
        }
        shelf.carried_by = None;
        shelf.location = at;
        Ok(id)
    }

    /// Track a carried shelf following its agent.
    pub(crate) fn move_carried(&mut self, id: ShelfId, to: Coord) -> Result<(), WarehouseError> {
        let shelf = self.slot(id)?;
        if shelf.carried_by.is_none() {
            return Err(WarehouseError::invariant(format!(
                "shelf {id} moved while parked"
            )));
        }
        shelf.location = to;
        Ok(())
    }

    /// Complete a delivery of `id`.
    ///
    /// Clears the request, bumps the counters and returns the shelf to its
    /// home cell, parked. Returns the home cell.
    pub fn mark_delivered(&mut self, id: ShelfId) -> Result<Coord, WarehouseError> {
        let shelf = self.slot(id)?;
        if !shelf.requested {
            return Err(WarehouseError::invariant(format!(
                "shelf {id} delivered without a request"
            )));
        }
        shelf.requested = false;
        shelf.delivered_count += 1;
        shelf.carried_by = None;
        shelf.location = shelf.home;
        let home = shelf.home;
        self.requested.shift_remove(&id);
        self.delivered += 1;
        Ok(home)
    }
}
