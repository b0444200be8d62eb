//! Instance configuration, validation, and error types.
//!
//! [`WarehouseConfig`] is the constructor input for a
//! [`Warehouse`](crate::Warehouse). [`validate()`](WarehouseConfig::validate)
//! checks everything that does not depend on the map;
//! [`validate_layout()`](WarehouseConfig::validate_layout) checks the rest
//! once the layout is loaded.

use depot_core::WarehouseError;
use depot_grid::{GridError, Layout, MapId};
use thiserror::Error;

use crate::reward::RewardConfig;
use crate::start::start_cells;

// ── ConfigError ────────────────────────────────────────────────────

/// Errors detected while validating a [`WarehouseConfig`].
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The map could not be built or parsed.
    #[error("map: {0}")]
    Map(#[from] GridError),
    /// `num_agents` is zero.
    #[error("at least one agent is required")]
    NoAgents,
    /// More agents than ids or free start cells.
    #[error("{agents} agents requested but only {capacity} fit")]
    TooManyAgents {
        /// Configured agent count.
        agents: usize,
        /// How many fit.
        capacity: usize,
    },
    /// `num_requested` is zero.
    #[error("at least one shelf must be requested")]
    NoRequests,
    /// More requests than shelves.
    #[error("{requested} requests configured but the map has {shelves} shelves")]
    TooManyRequests {
        /// Configured request count.
        requested: usize,
        /// Shelves on the map.
        shelves: usize,
    },
    /// `max_episode_length` is zero.
    #[error("max_episode_length must be at least 1")]
    ZeroEpisodeLength,
    /// `target_deliveries` is `Some(0)`.
    #[error("target_deliveries must be at least 1 when set")]
    ZeroTargetDeliveries,
    /// The view window would exceed the supported size.
    #[error("view radius {radius} exceeds maximum of {max}")]
    ViewRadiusTooLarge {
        /// Configured radius.
        radius: u32,
        /// Largest supported radius.
        max: u32,
    },
    /// `human_agent` names an agent that does not exist.
    #[error("human agent {index} out of range for {agents} agents")]
    HumanAgentOutOfRange {
        /// Configured index.
        index: usize,
        /// Agent count.
        agents: usize,
    },
    /// `pixel_scale` is zero.
    #[error("pixel_scale must be at least 1")]
    ZeroPixelScale,
    /// The first episode could not be set up.
    #[error("initial reset: {0}")]
    InitialReset(WarehouseError),
    /// A reward weight is NaN or infinite.
    #[error("reward weight `{name}` must be finite")]
    InvalidReward {
        /// The offending field.
        name: &'static str,
    },
}

// ── WarehouseConfig ────────────────────────────────────────────────

/// Everything needed to build one warehouse instance.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct WarehouseConfig {
    /// Preset layout. Ignored by [`Warehouse::with_map`](crate::Warehouse::with_map).
    pub map: MapId,
    /// Number of agents. Default: 2.
    pub num_agents: usize,
    /// Size of the request queue, refilled after every delivery. Default: 2.
    pub num_requested: usize,
    /// Ticks before an episode is cut off. Default: 500.
    pub max_episode_length: u64,
    /// End the episode once this many shelves are delivered. Default: `None`.
    pub target_deliveries: Option<u32>,
    /// Radius of the egocentric view window. Default: 1.
    pub view_radius: u32,
    /// Reward weights.
    pub rewards: RewardConfig,
    /// Agent driven by [`set_human_action`](crate::Warehouse::set_human_action).
    pub human_agent: Option<usize>,
    /// Pixels per cell, for rendering clients only. Default: 64.
    pub pixel_scale: u32,
    /// Seed for the first episode. Default: 0.
    pub seed: u64,
}

impl Default for WarehouseConfig {
    fn default() -> Self {
        Self {
            map: MapId::default(),
            num_agents: 2,
            num_requested: 2,
            max_episode_length: 500,
            target_deliveries: None,
            view_radius: 1,
            rewards: RewardConfig::default(),
            human_agent: None,
            pixel_scale: 64,
            seed: 0,
        }
    }
}

impl WarehouseConfig {
    /// Largest supported view radius.
    pub const MAX_VIEW_RADIUS: u32 = 32;

    /// Check the map-independent invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.num_agents == 0 {
            return Err(ConfigError::NoAgents);
        }
        let id_capacity = usize::from(u16::MAX) + 1;
        if self.num_agents > id_capacity {
            return Err(ConfigError::TooManyAgents {
                agents: self.num_agents,
                capacity: id_capacity,
            });
        }
        if self.num_requested == 0 {
            return Err(ConfigError::NoRequests);
        }
        if self.max_episode_length == 0 {
            return Err(ConfigError::ZeroEpisodeLength);
        }
        if self.target_deliveries == Some(0) {
            return Err(ConfigError::ZeroTargetDeliveries);
        }
        if self.view_radius > Self::MAX_VIEW_RADIUS {
            return Err(ConfigError::ViewRadiusTooLarge {
                radius: self.view_radius,
                max: Self::MAX_VIEW_RADIUS,
            });
        }
        if let Some(index) = self.human_agent {
            if index >= self.num_agents {
                return Err(ConfigError::HumanAgentOutOfRange {
                    index,
                    agents: self.num_agents,
                });
            }
        }
        if self.pixel_scale == 0 {
            return Err(ConfigError::ZeroPixelScale);
        }
        if let Some(name) = self.rewards.non_finite() {
            return Err(ConfigError::InvalidReward { name });
        }
        Ok(())
    }

    /// Check the invariants that depend on the loaded layout.
    pub fn validate_layout(&self, layout: &Layout) -> Result<(), ConfigError> {
        let capacity = start_cells(layout).count();
        if self.num_agents > capacity {
            return Err(ConfigError::TooManyAgents {
                agents: self.num_agents,
                capacity,
            });
        }
        let shelves = layout.storage().len();
        if self.num_requested > shelves {
            return Err(ConfigError::TooManyRequests {
                requested: self.num_requested,
                shelves,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let c = WarehouseConfig::default();
        c.validate().unwrap();
        c.validate_layout(&c.map.build().unwrap()).unwrap();
    }

    #[test]
    fn rejects_degenerate_counts() {
        let c = WarehouseConfig {
            num_agents: 0,
            ..Default::default()
        };
        assert_eq!(c.validate(), Err(ConfigError::NoAgents));

        let c = WarehouseConfig {
            num_requested: 0,
            ..Default::default()
        };
        assert_eq!(c.validate(), Err(ConfigError::NoRequests));

        let c = WarehouseConfig {
            max_episode_length: 0,
            ..Default::default()
        };
        assert_eq!(c.validate(), Err(ConfigError::ZeroEpisodeLength));

        let c = WarehouseConfig {
            target_deliveries: Some(0),
            ..Default::default()
        };
        assert_eq!(c.validate(), Err(ConfigError::ZeroTargetDeliveries));
    }

    #[test]
    fn rejects_human_agent_out_of_range() {
        let c = WarehouseConfig {
            human_agent: Some(2),
            ..Default::default()
        };
        assert_eq!(
            c.validate(),
            Err(ConfigError::HumanAgentOutOfRange { index: 2, agents: 2 })
        );
    }

    #[test]
    fn rejects_nan_rewards() {
        let mut c = WarehouseConfig::default();
        c.rewards.progress = f32::INFINITY;
        assert_eq!(c.validate(), Err(ConfigError::InvalidReward { name: "progress" }));
    }

    #[test]
    fn layout_limits_agents_and_requests() {
        let layout = Layout::parse("x.g").unwrap();
        let c = WarehouseConfig {
            num_agents: 3,
            num_requested: 1,
            ..Default::default()
        };
        assert_eq!(
            c.validate_layout(&layout),
            Err(ConfigError::TooManyAgents { agents: 3, capacity: 2 })
        );
        let c = WarehouseConfig {
            num_agents: 1,
            num_requested: 2,
            ..Default::default()
        };
        assert_eq!(
            c.validate_layout(&layout),
            Err(ConfigError::TooManyRequests { requested: 2, shelves: 1 })
        );
    }

    #[test]
    fn map_errors_convert() {
        let e: ConfigError = GridError::NoGoals.into();
        assert_eq!(e.to_string(), format!("map: {}", GridError::NoGoals));
    }
}
