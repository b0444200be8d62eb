//! The facade exposes a working end-to-end API.

use depot::prelude::*;

#[test]
fn single_instance_via_prelude() {
    let config = WarehouseConfig {
        num_agents: 1,
        num_requested: 1,
        ..Default::default()
    };
    let mut w = Warehouse::with_map(config, &AsciiMap::new("x..\n..g")).unwrap();
    let mut obs = vec![0.0; w.obs_size()];
    let mut rewards = vec![0.0; 1];
    let out = w
        .step(&[Action::TurnLeft.code()], &mut obs, &mut rewards)
        .unwrap();
    assert!(!out.done);
    assert_eq!(w.tick(), TickId(1));
    assert_eq!(w.agents()[0].state(), AgentState::MovingToShelf);
}

#[test]
fn preset_selection_matches_named_maps() {
    assert_eq!(MapId::from_selection(1), Some(MapId::Tiny));
    assert_eq!(MapId::from_selection(4), Some(MapId::Large));
    assert_eq!(MapId::from_selection(0), None);
}

#[cfg(feature = "serde")]
#[test]
fn config_round_trips_through_json() {
    let config = WarehouseConfig {
        map: MapId::Medium,
        num_agents: 6,
        target_deliveries: Some(10),
        ..Default::default()
    };
    let json = serde_json::to_string(&config).unwrap();
    let back: WarehouseConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(back, config);
}
