#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Match-long log of reconstructed enemy spawns and action-phase events.

use std::collections::{BTreeMap, BTreeSet};

use lane_defence_core::{
    arena::{self, Edge},
    ActionFrame, BreachEvent, MobileSighting, Player, Position, SelfDestructEvent, Side, UnitType,
};
use tracing::debug;

/// How far back a spawn lookup reaches.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Lookback {
    /// The previous turn.
    One,
    /// Two turns ago.
    Two,
    /// Three turns ago.
    Three,
}

impl Lookback {
    /// Lookups in the order the fallback chain tries them.
    pub const CHAIN: [Lookback; 3] = [Self::One, Self::Two, Self::Three];

    /// Number of turns reached back.
    #[must_use]
    pub const fn turns(self) -> u32 {
        match self {
            Self::One => 1,
            Self::Two => 2,
            Self::Three => 3,
        }
    }
}

/// Level of the fallback chain that produced a spawn estimate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EstimateSource {
    /// Spawns reconstructed from the recorded history.
    History(Lookback),
    /// Synthetic spawn supplied by the threat model.
    Hypothetical,
}

/// Predicted enemy spawn origins.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SpawnEstimate {
    /// Level that produced the origins.
    pub source: EstimateSource,
    /// Predicted origins in first-seen order.
    pub origins: Vec<Position>,
}

/// Breaches scored against the agent, split by the friendly edge they hit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FlankBreaches {
    /// Breaches on the bottom-left edge.
    pub left: u32,
    /// Breaches on the bottom-right edge.
    pub right: u32,
}

impl FlankBreaches {
    /// Breach count for the provided flank.
    #[must_use]
    pub const fn on(&self, side: Side) -> u32 {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }
}

#[derive(Clone, Debug, Default)]
struct TurnLog {
    spawns: Vec<Position>,
    breaches: Vec<(u32, BreachEvent)>,
    self_destructs: Vec<(u32, SelfDestructEvent)>,
    frames: BTreeSet<u32>,
}

impl TurnLog {
    fn merge_spawn(&mut self, origin: Position) {
        if !self.spawns.contains(&origin) {
            self.spawns.push(origin);
        }
    }
}

/// Append-only record of every turn's action phase.
#[derive(Clone, Debug, Default)]
pub struct SpawnHistory {
    turns: BTreeMap<u32, TurnLog>,
}

impl SpawnHistory {
    /// Creates an empty history for a new match.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds an action frame into the log of its turn.
    ///
    /// Only the deploy frame contributes spawn origins. Redelivered frames
    /// merge into the existing entries without duplicating them.
    pub fn record(&mut self, frame: &ActionFrame) {
        let log = self.turns.entry(frame.turn).or_default();
        let _ = log.frames.insert(frame.frame);

        if frame.is_deploy_frame() {
            for sighting in &frame.enemy_units {
                log.merge_spawn(spawn_origin(sighting));
            }
        }

        for breach in &frame.breaches {
            let entry = (frame.frame, *breach);
            if !log.breaches.contains(&entry) {
                log.breaches.push(entry);
            }
        }
        for self_destruct in &frame.self_destructs {
            let entry = (frame.frame, *self_destruct);
            if !log.self_destructs.contains(&entry) {
                log.self_destructs.push(entry);
            }
        }

        debug!(
            turn = frame.turn,
            frame = frame.frame,
            spawns = log.spawns.len(),
            breaches = log.breaches.len(),
            "recorded action frame"
        );
    }

    /// Number of turns with at least one recorded frame.
    #[must_use]
    pub fn recorded_turns(&self) -> usize {
        self.turns.len()
    }

    /// Number of distinct frames recorded for the turn.
    #[must_use]
    pub fn frames_recorded(&self, turn: u32) -> usize {
        self.turns.get(&turn).map_or(0, |log| log.frames.len())
    }

    /// Reconstructed enemy origins from `lookback` turns before `current_turn`.
    #[must_use]
    pub fn spawns(&self, current_turn: u32, lookback: Lookback) -> &[Position] {
        self.previous(current_turn, lookback.turns())
            .map(|log| log.spawns.as_slice())
            .unwrap_or_default()
    }

    /// Walks the fallback chain, ending with the synthetic spawn when every level is empty.
    pub fn resolve<F>(&self, current_turn: u32, hypothetical: F) -> SpawnEstimate
    where
        F: FnOnce() -> Option<Position>,
    {
        for lookback in Lookback::CHAIN {
            let origins = self.spawns(current_turn, lookback);
            if !origins.is_empty() {
                return SpawnEstimate {
                    source: EstimateSource::History(lookback),
                    origins: origins.to_vec(),
                };
            }
        }

        SpawnEstimate {
            source: EstimateSource::Hypothetical,
            origins: hypothetical().into_iter().collect(),
        }
    }

    /// Tiles where the opponent scored during the previous turn.
    #[must_use]
    pub fn breaches_against(&self, current_turn: u32) -> Vec<Position> {
        self.breaches_by(current_turn, Player::Opponent)
    }

    /// Tiles where the agent scored during the previous turn.
    #[must_use]
    pub fn breaches_scored(&self, current_turn: u32) -> Vec<Position> {
        self.breaches_by(current_turn, Player::Friendly)
    }

    /// Tiles where the agent's units self-destructed during the previous turn.
    #[must_use]
    pub fn self_destructs(&self, current_turn: u32) -> Vec<Position> {
        self.previous(current_turn, 1)
            .map(|log| {
                log.self_destructs
                    .iter()
                    .filter(|(_, event)| event.owner == Player::Friendly)
                    .map(|(_, event)| event.position)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Previous-turn breaches against the agent grouped by friendly edge.
    #[must_use]
    pub fn breach_flanks(&self, current_turn: u32) -> FlankBreaches {
        let mut flanks = FlankBreaches::default();
        for position in self.breaches_against(current_turn) {
            match Edge::of(position) {
                Some(Edge::BottomLeft) => flanks.left += 1,
                Some(Edge::BottomRight) => flanks.right += 1,
                _ => {}
            }
        }
        flanks
    }

    fn previous(&self, current_turn: u32, turns_back: u32) -> Option<&TurnLog> {
        let turn = current_turn.checked_sub(turns_back)?;
        self.turns.get(&turn)
    }

    fn breaches_by(&self, current_turn: u32, owner: Player) -> Vec<Position> {
        self.previous(current_turn, 1)
            .map(|log| {
                log.breaches
                    .iter()
                    .filter(|(_, event)| event.owner == owner)
                    .map(|(_, event)| event.position)
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Spawn tile a sighting back-projects to.
///
/// Scouts move before the deploy frame is captured, so they are seen one tile
/// inset from the edge they spawned on. Other units are seen where they spawned.
#[must_use]
pub fn spawn_origin(sighting: &MobileSighting) -> Position {
    if sighting.unit != UnitType::Scout {
        return sighting.position;
    }
    let origin = sighting.position.offset(0, 1);
    if arena::in_bounds(origin) {
        origin
    } else {
        sighting.position
    }
}
