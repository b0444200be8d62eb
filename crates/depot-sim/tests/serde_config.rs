//! Config and start states survive a JSON round trip.
#![cfg(feature = "serde")]

use depot_core::{Direction, ShelfId};
use depot_grid::MapId;
use depot_sim::{AgentPlacement, RewardConfig, StartState, WarehouseConfig};

#[test]
fn config_round_trip() {
    let config = WarehouseConfig {
        map: MapId::Small,
        num_agents: 4,
        num_requested: 3,
        rewards: RewardConfig::sparse(),
        human_agent: Some(1),
        seed: 99,
        ..Default::default()
    };
    let json = serde_json::to_string(&config).unwrap();
    let back: WarehouseConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(back, config);
}

#[test]
fn missing_fields_take_defaults() {
    let back: WarehouseConfig = serde_json::from_str(r#"{"num_agents": 5}"#).unwrap();
    assert_eq!(back.num_agents, 5);
    assert_eq!(back.max_episode_length, WarehouseConfig::default().max_episode_length);
}

#[test]
fn start_state_round_trip() {
    let start = StartState {
        agents: vec![
            AgentPlacement::new(0, 1, Direction::North),
            AgentPlacement::new(3, 2, Direction::West),
        ],
        requested: vec![ShelfId(1)],
    };
    let json = serde_json::to_string(&start).unwrap();
    let back: StartState = serde_json::from_str(&json).unwrap();
    assert_eq!(back, start);
}
