use lane_defence_core::{
    ActionFrame, BreachEvent, MobileSighting, Player, Position, SelfDestructEvent, UnitType,
};
use lane_defence_system_spawn_history::{EstimateSource, FlankBreaches, Lookback, SpawnHistory};

fn deploy_frame(turn: u32, sightings: &[(UnitType, i32, i32)]) -> ActionFrame {
    ActionFrame {
        turn,
        frame: 0,
        enemy_units: sightings
            .iter()
            .map(|(unit, x, y)| MobileSighting {
                unit: *unit,
                position: Position::new(*x, *y),
                health: 15.0,
            })
            .collect(),
        ..ActionFrame::default()
    }
}

fn breach_frame(turn: u32, frame: u32, breaches: &[(i32, i32, Player)]) -> ActionFrame {
    ActionFrame {
        turn,
        frame,
        breaches: breaches
            .iter()
            .map(|(x, y, owner)| BreachEvent {
                position: Position::new(*x, *y),
                owner: *owner,
            })
            .collect(),
        ..ActionFrame::default()
    }
}

#[test]
fn deploy_frame_spawns_are_reconstructed() {
    let mut history = SpawnHistory::new();
    history.record(&deploy_frame(
        4,
        &[(UnitType::Scout, 20, 20), (UnitType::Interceptor, 8, 22)],
    ));

    assert_eq!(
        history.spawns(5, Lookback::One),
        &[Position::new(20, 21), Position::new(8, 22)]
    );
}

#[test]
fn later_frames_do_not_contribute_spawns() {
    let mut history = SpawnHistory::new();
    let mut moving = deploy_frame(4, &[(UnitType::Scout, 20, 18)]);
    moving.frame = 6;
    history.record(&moving);

    assert!(history.spawns(5, Lookback::One).is_empty());
    assert_eq!(history.frames_recorded(4), 1);
}

#[test]
fn redelivered_deploy_frames_merge_without_overwriting() {
    let mut history = SpawnHistory::new();
    history.record(&deploy_frame(2, &[(UnitType::Demolisher, 10, 23)]));
    history.record(&deploy_frame(
        2,
        &[(UnitType::Demolisher, 17, 24), (UnitType::Demolisher, 10, 23)],
    ));

    assert_eq!(
        history.spawns(3, Lookback::One),
        &[Position::new(10, 23), Position::new(17, 24)]
    );
    assert_eq!(history.frames_recorded(2), 1);
    assert_eq!(history.recorded_turns(), 1);
}

#[test]
fn fallback_chain_reaches_three_turns_back() {
    let mut history = SpawnHistory::new();
    history.record(&deploy_frame(7, &[(UnitType::Interceptor, 4, 18)]));

    let estimate = history.resolve(10, || panic!("history should answer"));
    assert_eq!(estimate.source, EstimateSource::History(Lookback::Three));
    assert_eq!(estimate.origins, vec![Position::new(4, 18)]);

    let closer = history.resolve(8, || None);
    assert_eq!(closer.source, EstimateSource::History(Lookback::One));
}

#[test]
fn empty_history_uses_the_hypothetical_spawn() {
    let history = SpawnHistory::new();
    let estimate = history.resolve(6, || Some(Position::new(13, 27)));

    assert_eq!(estimate.source, EstimateSource::Hypothetical);
    assert_eq!(estimate.origins, vec![Position::new(13, 27)]);

    let nothing = history.resolve(6, || None);
    assert!(nothing.origins.is_empty());
}

#[test]
fn breaches_are_split_by_scorer_and_flank() {
    let mut history = SpawnHistory::new();
    history.record(&breach_frame(
        3,
        12,
        &[(2, 11, Player::Opponent), (24, 10, Player::Opponent), (5, 22, Player::Friendly)],
    ));
    history.record(&breach_frame(3, 14, &[(1, 12, Player::Opponent)]));
    history.record(&breach_frame(3, 14, &[(1, 12, Player::Opponent)]));

    assert_eq!(
        history.breaches_against(4),
        vec![Position::new(2, 11), Position::new(24, 10), Position::new(1, 12)]
    );
    assert_eq!(history.breaches_scored(4), vec![Position::new(5, 22)]);
    assert_eq!(history.breach_flanks(4), FlankBreaches { left: 2, right: 1 });
    assert!(history.breaches_against(3).is_empty(), "only the previous turn counts");
}

#[test]
fn self_destructs_only_report_friendly_units() {
    let mut history = SpawnHistory::new();
    history.record(&ActionFrame {
        turn: 5,
        frame: 20,
        self_destructs: vec![
            SelfDestructEvent {
                position: Position::new(9, 15),
                owner: Player::Friendly,
            },
            SelfDestructEvent {
                position: Position::new(12, 10),
                owner: Player::Opponent,
            },
        ],
        ..ActionFrame::default()
    });

    assert_eq!(history.self_destructs(6), vec![Position::new(9, 15)]);
}

#[test]
fn frames_deserialise_from_json() {
    let frame: ActionFrame = serde_json::from_str(
        r#"{
            "turn": 1,
            "frame": 0,
            "enemy_units": [
                { "unit": "Scout", "position": { "x": 15, "y": 25 } }
            ]
        }"#,
    )
    .expect("frame parses");

    let mut history = SpawnHistory::new();
    history.record(&frame);
    assert_eq!(history.spawns(2, Lookback::One), &[Position::new(15, 26)]);
}
