#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Path-damage estimation against turret defender sets.

use std::collections::{HashMap, HashSet};

use lane_defence_core::{arena::Edge, tuning::UnitStats, Defender, Engine, Position};

/// Expected damage along a path, split by defender upgrade state.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ThreatEstimate {
    /// Contribution of upgraded turrets.
    pub upgraded: f32,
    /// Contribution of non-upgraded turrets.
    pub standard: f32,
}

impl ThreatEstimate {
    /// Combined damage of both defender classes.
    #[must_use]
    pub fn total(&self) -> f32 {
        self.upgraded + self.standard
    }

    /// Scales both contributions, used to project damage onto sturdier stacks.
    #[must_use]
    pub fn scaled(self, factor: f32) -> Self {
        Self {
            upgraded: self.upgraded * factor,
            standard: self.standard * factor,
        }
    }
}

/// Health a stack brings to the fight once `margin` health is held back.
#[must_use]
pub fn stack_survivability(affordable: u32, unit_health: f32, margin: f32) -> f32 {
    affordable as f32 * unit_health - margin
}

/// Reports whether the stack outlasts the expected damage. Ties do not survive.
#[must_use]
pub fn survives(survivability: f32, threat: &ThreatEstimate) -> bool {
    survivability > threat.total()
}

/// Candidates not occupied by a stationary unit, in their original order.
pub fn unblocked<E>(engine: &E, candidates: &[Position]) -> Vec<Position>
where
    E: Engine + ?Sized,
{
    candidates
        .iter()
        .copied()
        .filter(|candidate| !engine.occupied(*candidate))
        .collect()
}

/// Threat model that caches turret coverage between queries.
#[derive(Debug)]
pub struct ThreatModel {
    turret: UnitStats,
    coverage: HashMap<Defender, HashSet<Position>>,
}

impl ThreatModel {
    /// Creates a model measuring damage with the provided turret profile.
    #[must_use]
    pub fn new(turret: UnitStats) -> Self {
        Self {
            turret,
            coverage: HashMap::new(),
        }
    }

    /// Sums the damage every defender deals to the tiles of `path`.
    ///
    /// Each path tile inside a defender's range counts as one hit. An empty
    /// path carries no threat.
    pub fn path_damage<E>(
        &mut self,
        engine: &E,
        path: &[Position],
        defenders: &[Defender],
    ) -> ThreatEstimate
    where
        E: Engine + ?Sized,
    {
        let mut estimate = ThreatEstimate::default();
        if path.is_empty() {
            return estimate;
        }

        for defender in defenders {
            let covered = self.coverage_of(engine, *defender);
            let hits = path.iter().filter(|tile| covered.contains(tile)).count();
            let damage = hits as f32 * self.turret.damage_for(defender.upgraded);
            if defender.upgraded {
                estimate.upgraded += damage;
            } else {
                estimate.standard += damage;
            }
        }
        estimate
    }

    /// Damage taken by a unit spawned at `start` walking to the opposite edge.
    pub fn lane_damage<E>(
        &mut self,
        engine: &E,
        start: Position,
        defenders: &[Defender],
    ) -> ThreatEstimate
    where
        E: Engine + ?Sized,
    {
        let path = engine.find_path(start, None);
        self.path_damage(engine, &path, defenders)
    }

    /// Candidate whose path takes the least damage; the first wins ties.
    pub fn least_damage_location<E>(
        &mut self,
        engine: &E,
        candidates: &[Position],
        defenders: &[Defender],
    ) -> Option<Position>
    where
        E: Engine + ?Sized,
    {
        let mut best: Option<(f32, Position)> = None;
        for candidate in candidates {
            let damage = self.lane_damage(engine, *candidate, defenders).total();
            match best {
                Some((lowest, _)) if damage >= lowest => {}
                _ => best = Some((damage, *candidate)),
            }
        }
        best.map(|(_, position)| position)
    }

    /// Least-damage unblocked tile on the opponent's edges, judged against our turrets.
    pub fn hypothetical_enemy_spawn<E>(
        &mut self,
        engine: &E,
        own_turrets: &[Defender],
    ) -> Option<Position>
    where
        E: Engine + ?Sized,
    {
        let edges: Vec<Position> = Edge::OPPONENT
            .iter()
            .flat_map(|edge| edge.locations())
            .collect();
        let candidates = unblocked(engine, &edges);
        self.least_damage_location(engine, &candidates, own_turrets)
    }

    fn coverage_of<E>(&mut self, engine: &E, defender: Defender) -> &HashSet<Position>
    where
        E: Engine + ?Sized,
    {
        let radius = self.turret.range_for(defender.upgraded);
        self.coverage
            .entry(defender)
            .or_insert_with(|| engine.attack_range(defender.position, radius).into_iter().collect())
    }
}
