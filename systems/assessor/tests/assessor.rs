use lane_defence_core::{
    tuning::UnitCatalog, Defender, Engine, Player, Position, ResourceKind, UnitType,
};
use lane_defence_system_assessor::{assess, capture};
use lane_defence_world::World;

#[test]
fn capture_reflects_engine_state() {
    let mut world = World::default();
    world.set_turn(6);
    world.set_health(Player::Opponent, 12.0);
    world
        .place(UnitType::Turret, Player::Opponent, Position::new(20, 18), true)
        .expect("enemy turret");

    let snapshot = capture(&world);

    assert_eq!(snapshot.turn, 6);
    assert_eq!(snapshot.opponent_health, 12.0);
    assert_eq!(snapshot.units.len(), 1);
    assert_eq!(
        snapshot.affordable.get(UnitType::Scout),
        world.affordable_count(UnitType::Scout)
    );
}

#[test]
fn features_partition_the_board_by_half() {
    let mut world = World::default();
    let own_turret = Position::new(6, 12);
    let enemy_turret = Position::new(20, 18);
    world
        .place(UnitType::Turret, Player::Friendly, own_turret, false)
        .expect("own turret");
    world
        .place(UnitType::Turret, Player::Opponent, enemy_turret, true)
        .expect("enemy turret");
    world
        .place(UnitType::Wall, Player::Opponent, Position::new(4, 14), false)
        .expect("front wall");
    world
        .place(UnitType::Wall, Player::Opponent, Position::new(13, 20), false)
        .expect("centre wall");

    let features = assess(&capture(&world), &UnitCatalog::default());

    assert_eq!(features.own_structures, vec![own_turret]);
    assert_eq!(features.enemy_structures.len(), 3);
    assert_eq!(
        features.own_turrets,
        vec![Defender {
            position: own_turret,
            upgraded: false,
        }]
    );
    assert_eq!(
        features.enemy_turrets,
        vec![Defender {
            position: enemy_turret,
            upgraded: true,
        }]
    );
    assert_eq!(features.front_row_occupancy, 1);
    assert_eq!(features.enemy_flanks.left, 60.0);
    assert_eq!(features.enemy_flanks.right, 75.0);
    assert_eq!(features.enemy_structure_health(), 135.0);
}

#[test]
fn projected_affordability_counts_factory_income() {
    let mut world = World::default();
    world.set_resource(ResourceKind::Mobile, Player::Friendly, 20.0);
    for x in 12..=15 {
        world
            .place(UnitType::Factory, Player::Friendly, Position::new(x, 4), false)
            .expect("factory");
    }

    let features = assess(&capture(&world), &UnitCatalog::default());

    assert_eq!(features.factories, 4);
    assert_eq!(features.projected_mobile, 24.0);
    assert_eq!(features.affordable.get(UnitType::Scout), 20);
    assert_eq!(features.projected.get(UnitType::Scout), 24);
    assert_eq!(features.projected.get(UnitType::Demolisher), 8);
    assert_eq!(
        features.projected.get(UnitType::Wall),
        features.affordable.get(UnitType::Wall)
    );
}
