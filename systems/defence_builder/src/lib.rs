#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Stationary defence placement driven by a mirrored template.
//!
//! Every placement is idempotent: empty tiles are spawned, tiles holding the
//! template's structure are skipped or upgraded according to their intent,
//! and tiles holding anything else are left alone.

mod template;

use lane_defence_core::{
    arena::{self, Edge, HALF_ARENA},
    committed_layout,
    tuning::{DefenceTuning, RushTuning, StrategyTuning},
    Engine, PlacementError, Player, Position, Side, UnitType,
};
use lane_defence_system_assessor::Features;
use lane_defence_system_posture::commit_side;
use rand::Rng;
use tracing::{debug, info};

pub use template::{DefenceTemplate, Stage, TemplateTile, UpgradeIntent};

/// Turrets of the neutral opening layout.
pub const OPENING_TURRETS: [Position; 2] = [Position::new(6, 12), Position::new(21, 12)];

/// Factories of the neutral opening layout.
pub const OPENING_FACTORIES: [Position; 3] =
    [Position::new(13, 3), Position::new(14, 3), Position::new(13, 4)];

/// Corner walls maintained by the reinforcement pass, left corner first.
pub const CORNER_WALLS: [Position; 6] = [
    Position::new(0, 13),
    Position::new(1, 13),
    Position::new(2, 13),
    Position::new(27, 13),
    Position::new(26, 13),
    Position::new(25, 13),
];

/// Builder emitting spawn, upgrade and removal commands for the defence.
#[derive(Clone, Debug)]
pub struct DefenceBuilder {
    left: DefenceTemplate,
    right: DefenceTemplate,
    tuning: DefenceTuning,
    rush: RushTuning,
}

impl DefenceBuilder {
    /// Creates a builder with both mirrored templates.
    #[must_use]
    pub fn new(tuning: &StrategyTuning) -> Self {
        let left = DefenceTemplate::left_anchored();
        let right = left.reflect();
        Self {
            left,
            right,
            tuning: tuning.defence,
            rush: tuning.rush,
        }
    }

    /// Template committed to the provided side.
    #[must_use]
    pub fn template(&self, side: Side) -> &DefenceTemplate {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }

    /// Neutral opening: two turrets and a small upgraded factory block.
    pub fn starting_defence<E>(&self, engine: &mut E)
    where
        E: Engine + ?Sized,
    {
        for position in OPENING_TURRETS {
            place(engine, UnitType::Turret, position, false);
        }
        for position in OPENING_FACTORIES {
            place(engine, UnitType::Factory, position, false);
        }
        for position in OPENING_FACTORIES {
            upgrade_present(engine, position);
        }
    }

    /// Drops the opening turret on the far flank and builds the chosen layout.
    pub fn initial_commit<E>(&self, engine: &mut E, side: Side, features: &Features)
    where
        E: Engine + ?Sized,
    {
        info!(?side, "committing defence layout");
        let far_turret = match side {
            Side::Left => OPENING_TURRETS[1],
            Side::Right => OPENING_TURRETS[0],
        };
        attempt(engine.remove(far_turret), "remove", far_turret);
        self.build(engine, side, features);
    }

    /// Maintains the corner walls and keeps building the committed layout.
    ///
    /// Returns the side that was built. Without a recognisable layout the
    /// builder falls back to an initial commit using `rng` for ties.
    pub fn reinforce<E, R>(&self, engine: &mut E, features: &Features, rng: &mut R) -> Side
    where
        E: Engine + ?Sized,
        R: Rng + ?Sized,
    {
        let layout = committed_layout(engine);
        let rushing = features.enemy_health <= self.rush.enemy_health
            || features.affordable.get(UnitType::Scout) > self.rush.scouts;

        let held = match (rushing, layout) {
            (true, Some(side)) => self.template(side).corner_pair().to_vec(),
            _ => {
                let gate = self.template(layout.unwrap_or(Side::Right)).gate();
                attempt(engine.remove(gate), "remove", gate);
                Vec::new()
            }
        };
        for position in CORNER_WALLS {
            if !held.contains(&position) {
                place(engine, UnitType::Wall, position, true);
            }
        }

        let side = if holds_layout_edge(engine, Edge::BottomRight) {
            Side::Left
        } else if holds_layout_edge(engine, Edge::BottomLeft) {
            Side::Right
        } else {
            let side = commit_side(features.enemy_flanks, rng);
            self.initial_commit(engine, side, features);
            return side;
        };
        self.build(engine, side, features);
        side
    }

    /// Places the template for `side` stage by stage, then runs the escalations.
    pub fn build<E>(&self, engine: &mut E, side: Side, features: &Features)
    where
        E: Engine + ?Sized,
    {
        let template = self.template(side);
        let rushing = features.affordable.get(UnitType::Scout) > self.rush.scouts
            || features.projected_mobile > self.rush.projected_mobile
            || features.enemy_health <= self.rush.enemy_health;

        for stage in Stage::FOUNDATION {
            for tile in template.stage(stage) {
                place(
                    engine,
                    tile.unit,
                    tile.position,
                    tile.intent == UpgradeIntent::Immediate,
                );
            }
        }

        if rushing {
            let gate = template.gate();
            attempt(engine.spawn(UnitType::Wall, gate), "spawn", gate);
            attempt(engine.remove(gate), "remove", gate);
            for position in template.corner_pair() {
                attempt(engine.remove(position), "remove", position);
            }
        }

        self.escalate_turrets(engine, template, features, self.tuning.turret_upgrade_affordable);

        for tile in template.stage(Stage::Battery) {
            place(engine, tile.unit, tile.position, false);
        }
        for tile in template
            .tiles()
            .iter()
            .filter(|tile| tile.intent == UpgradeIntent::Deferred)
        {
            if engine.unit_at(tile.position).is_some_and(|present| present.unit == tile.unit) {
                upgrade_present(engine, tile.position);
            }
        }

        self.escalate_turrets(
            engine,
            template,
            features,
            self.tuning.late_turret_upgrade_affordable,
        );

        if engine.affordable_count(UnitType::Wall) > self.tuning.full_upgrade_walls {
            debug!(?side, "upgrading every owned structure");
            for position in owned(engine, None) {
                upgrade_present(engine, position);
            }
        }

        if engine.affordable_count(UnitType::Factory) > self.tuning.expansion_factories {
            self.expand_factories(engine, side);
        }
    }

    /// Grows the factory block for `side` while factories stay affordable,
    /// then upgrades whatever part of the block is present.
    pub fn expand_factories<E>(&self, engine: &mut E, side: Side)
    where
        E: Engine + ?Sized,
    {
        let block = self.template(side).expansion();
        for position in block {
            if engine.affordable_count(UnitType::Factory) <= self.tuning.expansion_reserve {
                break;
            }
            place(engine, UnitType::Factory, *position, false);
        }
        for position in block {
            upgrade_present(engine, *position);
        }
    }

    fn escalate_turrets<E>(
        &self,
        engine: &mut E,
        template: &DefenceTemplate,
        features: &Features,
        affordable: u32,
    ) where
        E: Engine + ?Sized,
    {
        if engine.affordable_count(UnitType::Turret) > affordable
            && features.factories > self.tuning.turret_upgrade_factories
            && engine.occupied(template.corner_anchor())
        {
            debug!(threshold = affordable, "upgrading every owned turret");
            for position in owned(engine, Some(UnitType::Turret)) {
                upgrade_present(engine, position);
            }
        }
    }
}

/// Spawns `unit` on an empty tile, or upgrades it when `upgrade` is set and
/// the tile already holds the same structure.
fn place<E>(engine: &mut E, unit: UnitType, position: Position, upgrade: bool)
where
    E: Engine + ?Sized,
{
    match engine.unit_at(position) {
        None => attempt(engine.spawn(unit, position), "spawn", position),
        Some(present) if upgrade && present.unit == unit && !present.upgraded => {
            attempt(engine.upgrade(position), "upgrade", position);
        }
        Some(_) => {}
    }
}

fn upgrade_present<E>(engine: &mut E, position: Position)
where
    E: Engine + ?Sized,
{
    if let Some(present) = engine.unit_at(position) {
        if present.owner == Player::Friendly && !present.upgraded {
            attempt(engine.upgrade(position), "upgrade", position);
        }
    }
}

fn attempt(outcome: Result<(), PlacementError>, action: &'static str, position: Position) {
    if let Err(error) = outcome {
        debug!(action, %position, %error, "structure command rejected");
    }
}

/// Friendly structures, optionally of one type, in tile order.
fn owned<E>(engine: &E, unit: Option<UnitType>) -> Vec<Position>
where
    E: Engine + ?Sized,
{
    arena::positions()
        .filter(|position| arena::is_friendly_half(*position))
        .filter(|position| {
            engine.unit_at(*position).is_some_and(|present| {
                present.owner == Player::Friendly && unit.map_or(true, |unit| present.unit == unit)
            })
        })
        .collect()
}

/// Reports whether structures stand on the edge, ignoring its two corner tiles.
fn holds_layout_edge<E>(engine: &E, edge: Edge) -> bool
where
    E: Engine + ?Sized,
{
    edge.locations()
        .into_iter()
        .take((HALF_ARENA - 2) as usize)
        .any(|position| engine.occupied(position))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_edge_ignores_the_corner() {
        let tiles: Vec<Position> = Edge::BottomRight
            .locations()
            .into_iter()
            .take((HALF_ARENA - 2) as usize)
            .collect();
        assert!(!tiles.contains(&Position::new(27, 13)));
        assert!(!tiles.contains(&Position::new(26, 12)));
        assert!(tiles.contains(&Position::new(18, 4)));
    }

    #[test]
    fn corner_walls_are_mirror_pairs() {
        let (left, right) = CORNER_WALLS.split_at(3);
        for (a, b) in left.iter().zip(right) {
            assert_eq!(arena::mirror(*a), *b);
        }
        assert_eq!(arena::mirror(OPENING_TURRETS[0]), OPENING_TURRETS[1]);
    }
}
