#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Battlefield feature extraction from per-turn engine snapshots.

use std::{collections::BTreeMap, ops::RangeInclusive};

use lane_defence_core::{
    arena::{self, HALF_ARENA},
    tuning::UnitCatalog,
    Affordability, Defender, Engine, GameSnapshot, Player, Position, ResourceKind,
    ResourcePools, Side, UnitType,
};
use tracing::debug;

/// Enemy rows whose occupancy signals a crowded front line.
pub const FRONT_ROWS: RangeInclusive<i32> = HALF_ARENA..=HALF_ARENA + 2;

/// Remaining structure health of the enemy, split by flank.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FlankHealth {
    /// Health of structures with `x` up to [`arena::LEFT_FLANK_MAX_X`].
    pub left: f32,
    /// Health of structures with `x` from [`arena::RIGHT_FLANK_MIN_X`].
    pub right: f32,
}

impl FlankHealth {
    /// Combined health of both flanks, excluding the centre strip.
    #[must_use]
    pub fn total(&self) -> f32 {
        self.left + self.right
    }

    /// Flank with strictly less health, `None` on a tie.
    #[must_use]
    pub fn weaker(&self) -> Option<Side> {
        if self.left < self.right {
            Some(Side::Left)
        } else if self.left > self.right {
            Some(Side::Right)
        } else {
            None
        }
    }
}

/// Derived view of the battlefield consumed by the decision systems.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Features {
    /// Turn the features describe.
    pub turn: u32,
    /// Occupied tiles on the agent's half.
    pub own_structures: Vec<Position>,
    /// Occupied tiles on the opponent's half.
    pub enemy_structures: Vec<Position>,
    /// Enemy structure health per flank.
    pub enemy_flanks: FlankHealth,
    /// Factories on the agent's half.
    pub factories: u32,
    /// Turrets on the agent's half.
    pub own_turrets: Vec<Defender>,
    /// Turrets on the opponent's half.
    pub enemy_turrets: Vec<Defender>,
    /// Enemy structures inside [`FRONT_ROWS`].
    pub front_row_occupancy: u32,
    /// Affordable counts at current resources.
    pub affordable: Affordability,
    /// Affordable counts once next turn's mobile points arrive.
    pub projected: Affordability,
    /// Mobile points expected next turn, including factory income.
    pub projected_mobile: f32,
    /// Agent resource pools.
    pub own_resources: ResourcePools,
    /// Opponent resource pools.
    pub enemy_resources: ResourcePools,
    /// Agent health pool.
    pub own_health: f32,
    /// Opponent health pool.
    pub enemy_health: f32,
}

impl Features {
    /// Total enemy structure health outside the centre strip.
    #[must_use]
    pub fn enemy_structure_health(&self) -> f32 {
        self.enemy_flanks.total()
    }
}

/// Reads everything the engine reports into a fresh snapshot.
pub fn capture<E>(engine: &E) -> GameSnapshot
where
    E: Engine + ?Sized,
{
    let units: BTreeMap<_, _> = arena::positions()
        .filter_map(|position| engine.unit_at(position).map(|unit| (position, unit)))
        .collect();

    let mut affordable = Affordability::default();
    for unit in UnitType::ALL {
        affordable.set(unit, engine.affordable_count(unit));
    }

    let pools = |player| ResourcePools {
        structure: engine.resource(ResourceKind::Structure, player),
        mobile: engine.resource(ResourceKind::Mobile, player),
    };

    GameSnapshot {
        turn: engine.turn_number(),
        friendly: pools(Player::Friendly),
        opponent: pools(Player::Opponent),
        friendly_health: engine.health(Player::Friendly),
        opponent_health: engine.health(Player::Opponent),
        projected_mobile: engine.projected_future_resource(1),
        affordable,
        units,
    }
}

/// Derives the decision features from a snapshot. Non-finite or negative
/// quantities are treated as zero.
#[must_use]
pub fn assess(snapshot: &GameSnapshot, catalog: &UnitCatalog) -> Features {
    let mut features = Features {
        turn: snapshot.turn,
        affordable: snapshot.affordable,
        own_resources: sanitize_pools(snapshot.friendly),
        enemy_resources: sanitize_pools(snapshot.opponent),
        own_health: sanitize(snapshot.friendly_health),
        enemy_health: sanitize(snapshot.opponent_health),
        ..Features::default()
    };

    for (position, unit) in &snapshot.units {
        let position = *position;
        let friendly_half = arena::is_friendly_half(position);

        if friendly_half {
            features.own_structures.push(position);
        } else {
            features.enemy_structures.push(position);
            match arena::flank_of(position) {
                Some(Side::Left) => features.enemy_flanks.left += sanitize(unit.health),
                Some(Side::Right) => features.enemy_flanks.right += sanitize(unit.health),
                None => {}
            }
            if FRONT_ROWS.contains(&position.y()) {
                features.front_row_occupancy += 1;
            }
        }

        match unit.unit {
            UnitType::Factory if friendly_half => features.factories += 1,
            UnitType::Turret => {
                let defender = Defender {
                    position,
                    upgraded: unit.upgraded,
                };
                if friendly_half {
                    features.own_turrets.push(defender);
                } else {
                    features.enemy_turrets.push(defender);
                }
            }
            _ => {}
        }
    }

    features.projected_mobile = sanitize(snapshot.projected_mobile) + features.factories as f32;
    features.projected = project(snapshot.affordable, features.projected_mobile, catalog);

    debug!(
        turn = features.turn,
        factories = features.factories,
        enemy_left = features.enemy_flanks.left,
        enemy_right = features.enemy_flanks.right,
        projected_mobile = features.projected_mobile,
        "assessed battlefield"
    );
    features
}

fn project(current: Affordability, mobile: f32, catalog: &UnitCatalog) -> Affordability {
    let mut projected = current;
    for unit in UnitType::ALL.into_iter().filter(|unit| unit.is_mobile()) {
        let cost = catalog.stats(unit).cost;
        let count = if cost > 0.0 {
            (mobile / cost).floor() as u32
        } else {
            0
        };
        projected.set(unit, count);
    }
    projected
}

fn sanitize(value: f32) -> f32 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

fn sanitize_pools(pools: ResourcePools) -> ResourcePools {
    ResourcePools {
        structure: sanitize(pools.structure),
        mobile: sanitize(pools.mobile),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lane_defence_core::UnitSnapshot;

    fn enemy(unit: UnitType, health: f32) -> UnitSnapshot {
        UnitSnapshot {
            unit,
            owner: Player::Opponent,
            health,
            upgraded: false,
        }
    }

    #[test]
    fn centre_strip_is_excluded_from_flank_health() {
        let mut snapshot = GameSnapshot::default();
        for (x, health) in [(12, 10.0), (13, 100.0), (14, 1000.0), (15, 1.0)] {
            let _ = snapshot
                .units
                .insert(Position::new(x, 20), enemy(UnitType::Wall, health));
        }

        let features = assess(&snapshot, &UnitCatalog::default());
        assert_eq!(features.enemy_flanks, FlankHealth { left: 10.0, right: 1.0 });
        assert_eq!(features.enemy_structures.len(), 4);
        assert_eq!(arena::LEFT_FLANK_MAX_X, 12);
        assert_eq!(arena::RIGHT_FLANK_MIN_X, 15);
    }

    #[test]
    fn malformed_quantities_become_zero() {
        let mut snapshot = GameSnapshot {
            friendly_health: f32::NAN,
            opponent_health: -4.0,
            projected_mobile: f32::INFINITY,
            ..GameSnapshot::default()
        };
        snapshot.friendly.mobile = -1.0;
        let _ = snapshot
            .units
            .insert(Position::new(3, 20), enemy(UnitType::Turret, f32::NAN));

        let features = assess(&snapshot, &UnitCatalog::default());
        assert_eq!(features.own_health, 0.0);
        assert_eq!(features.enemy_health, 0.0);
        assert_eq!(features.own_resources.mobile, 0.0);
        assert_eq!(features.projected_mobile, 0.0);
        assert_eq!(features.enemy_flanks.total(), 0.0);
        assert_eq!(features.enemy_turrets.len(), 1);
    }

    #[test]
    fn weaker_flank_is_strict() {
        assert_eq!(FlankHealth { left: 1.0, right: 2.0 }.weaker(), Some(Side::Left));
        assert_eq!(FlankHealth { left: 3.0, right: 2.0 }.weaker(), Some(Side::Right));
        assert_eq!(FlankHealth { left: 2.0, right: 2.0 }.weaker(), None);
    }
}
