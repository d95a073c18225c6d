#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Lane Defence strategy engine.
//!
//! This crate defines the vocabulary that connects the engine collaborator,
//! the pure strategy systems, and the adapters. Systems read the battlefield
//! through the [`Engine`] trait, issue spawn/remove/upgrade requests through
//! the same trait, and report the accepted requests as [`Command`] batches.
//! Action frames delivered between turns are described by [`ActionFrame`].

use std::{collections::BTreeMap, fmt};

use serde::{Deserialize, Serialize};

pub mod arena;
mod engine;
mod frames;
pub mod tuning;

pub use engine::{committed_layout, layout_anchor, Engine, Recorder, LEFT_LAYOUT_ANCHOR};
pub use frames::{ActionFrame, BreachEvent, MobileSighting, SelfDestructEvent};
pub use tuning::StrategyTuning;

/// Location of a single arena tile expressed as `x` and `y` coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    x: i32,
    y: i32,
}

impl Position {
    /// Creates a new tile position.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Horizontal coordinate of the tile.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Vertical coordinate of the tile; `0` is the friendly bottom corner.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    /// Returns the position shifted by the provided deltas.
    #[must_use]
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Euclidean distance between two tiles.
    #[must_use]
    pub fn distance(self, other: Position) -> f32 {
        let dx = (self.x - other.x) as f32;
        let dy = (self.y - other.y) as f32;
        (dx * dx + dy * dy).sqrt()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Every unit that can be placed in the arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum UnitType {
    /// Cheap stationary blocker.
    Wall,
    /// Stationary economy structure that raises mobile point income.
    Factory,
    /// Stationary defender that damages mobile units in range.
    Turret,
    /// Fast, fragile mobile attacker.
    Scout,
    /// Slow mobile attacker specialised against structures.
    Demolisher,
    /// Durable mobile unit that hunts other mobile units.
    Interceptor,
}

impl UnitType {
    /// Number of distinct unit types.
    pub const COUNT: usize = 6;

    /// All unit types in catalogue order.
    pub const ALL: [UnitType; Self::COUNT] = [
        Self::Wall,
        Self::Factory,
        Self::Turret,
        Self::Scout,
        Self::Demolisher,
        Self::Interceptor,
    ];

    /// Dense index of the unit type, matching [`UnitType::ALL`].
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Wall => 0,
            Self::Factory => 1,
            Self::Turret => 2,
            Self::Scout => 3,
            Self::Demolisher => 4,
            Self::Interceptor => 5,
        }
    }

    /// Reports whether the unit occupies a tile until destroyed or removed.
    #[must_use]
    pub const fn is_stationary(self) -> bool {
        matches!(self, Self::Wall | Self::Factory | Self::Turret)
    }

    /// Reports whether the unit walks a path once deployed.
    #[must_use]
    pub const fn is_mobile(self) -> bool {
        !self.is_stationary()
    }

    /// Currency that pays for the unit.
    #[must_use]
    pub const fn resource(self) -> ResourceKind {
        if self.is_stationary() {
            ResourceKind::Structure
        } else {
            ResourceKind::Mobile
        }
    }
}

impl fmt::Display for UnitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Wall => "wall",
            Self::Factory => "factory",
            Self::Turret => "turret",
            Self::Scout => "scout",
            Self::Demolisher => "demolisher",
            Self::Interceptor => "interceptor",
        };
        f.write_str(name)
    }
}

/// The two independent currencies of the game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    /// Structure points, spent on walls, factories and turrets.
    Structure,
    /// Mobile points, spent on scouts, demolishers and interceptors.
    Mobile,
}

/// Participants of a match from the agent's point of view.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Player {
    /// The agent, defending the bottom half of the arena.
    Friendly,
    /// The opponent, defending the top half of the arena.
    Opponent,
}

impl Player {
    /// Returns the other participant.
    #[must_use]
    pub const fn other(self) -> Self {
        match self {
            Self::Friendly => Self::Opponent,
            Self::Opponent => Self::Friendly,
        }
    }
}

/// Horizontal flank of the arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    /// Flank with small `x` coordinates.
    Left,
    /// Flank with large `x` coordinates.
    Right,
}

impl Side {
    /// Returns the opposite flank.
    #[must_use]
    pub const fn mirror(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }
}

/// Strategic choice made once per turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Posture {
    /// Opening turns: build the neutral opening layout and screen with interceptors.
    StartingDefense,
    /// Commit the defence template to one flank and open with a main attack.
    InitialCommit,
    /// Mass mobile commit aimed at finishing the opponent.
    LowHealthRush,
    /// Threat-evaluated attack that resolves into a burst or a pass.
    MainAttack,
    /// Scout burst against a weakened defence.
    ScoutAttack,
    /// Hold with a handful of interceptors against incoming pressure.
    InterceptorStall,
    /// Emit nothing this turn.
    NoOp,
}

impl fmt::Display for Posture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::StartingDefense => "starting-defense",
            Self::InitialCommit => "initial-commit",
            Self::LowHealthRush => "low-health-rush",
            Self::MainAttack => "main-attack",
            Self::ScoutAttack => "scout-attack",
            Self::InterceptorStall => "interceptor-stall",
            Self::NoOp => "no-op",
        };
        f.write_str(name)
    }
}

/// Requests accepted by the engine during a turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Command {
    /// Places a unit on the provided tile.
    Spawn {
        /// Type of unit that was placed.
        unit: UnitType,
        /// Tile receiving the unit.
        position: Position,
    },
    /// Flags the stationary unit on the tile for removal at turn end.
    Remove {
        /// Tile whose structure is removed.
        position: Position,
    },
    /// Upgrades the stationary unit on the tile.
    Upgrade {
        /// Tile whose structure is upgraded.
        position: Position,
    },
}

/// Planned placement of one or more units on a single tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UnitPlacement {
    /// Type of unit to place.
    pub unit: UnitType,
    /// Tile receiving the units.
    pub position: Position,
    /// Number of units to stack on the tile.
    pub count: u32,
    /// Whether the placement should be upgraded once present.
    pub upgraded: bool,
}

impl UnitPlacement {
    /// Creates a placement of `count` non-upgraded units.
    #[must_use]
    pub const fn new(unit: UnitType, position: Position, count: u32) -> Self {
        Self {
            unit,
            position,
            count,
            upgraded: false,
        }
    }
}

/// Immutable view of the unit occupying a tile.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UnitSnapshot {
    /// Type of unit on the tile.
    pub unit: UnitType,
    /// Player that owns the unit.
    pub owner: Player,
    /// Remaining health.
    pub health: f32,
    /// Whether the unit has been upgraded.
    pub upgraded: bool,
}

/// Turret contributing to the threat along a path.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Defender {
    /// Tile holding the turret.
    pub position: Position,
    /// Whether the turret has been upgraded.
    pub upgraded: bool,
}

/// Reasons the engine may reject a spawn, removal or upgrade request.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, thiserror::Error,
)]
pub enum PlacementError {
    /// The tile lies outside the arena diamond.
    #[error("tile is outside the arena")]
    OutOfBounds,
    /// Stationary units may only be placed on the owner's half.
    #[error("tile is not on the friendly half")]
    NotOwnHalf,
    /// Mobile units may only be deployed on the owner's edges.
    #[error("tile is not on a friendly edge")]
    NotOwnEdge,
    /// A stationary unit already holds the tile.
    #[error("tile is occupied by a structure")]
    Occupied,
    /// The player cannot pay for the request.
    #[error("insufficient resources")]
    InsufficientResources,
    /// No friendly structure holds the tile.
    #[error("no friendly structure on tile")]
    Vacant,
    /// The structure has already been upgraded.
    #[error("structure is already upgraded")]
    AlreadyUpgraded,
}

/// Resource pools of one player.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourcePools {
    /// Structure points available.
    pub structure: f32,
    /// Mobile points available.
    pub mobile: f32,
}

/// Affordable unit counts indexed by unit type.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Affordability {
    counts: [u32; UnitType::COUNT],
}

impl Affordability {
    /// Creates an affordability table from per-type counts.
    #[must_use]
    pub const fn from_counts(counts: [u32; UnitType::COUNT]) -> Self {
        Self { counts }
    }

    /// Number of units of the provided type that can be paid for.
    #[must_use]
    pub const fn get(&self, unit: UnitType) -> u32 {
        self.counts[unit.index()]
    }

    /// Overrides the count for a single unit type.
    pub fn set(&mut self, unit: UnitType, count: u32) {
        self.counts[unit.index()] = count;
    }
}

/// Turn-scoped capture of everything the engine reports about the battlefield.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GameSnapshot {
    /// Zero-based turn number.
    pub turn: u32,
    /// Resource pools of the agent.
    pub friendly: ResourcePools,
    /// Resource pools of the opponent.
    pub opponent: ResourcePools,
    /// Remaining health pool of the agent.
    pub friendly_health: f32,
    /// Remaining health pool of the opponent.
    pub opponent_health: f32,
    /// Mobile points the agent will hold next turn, excluding factory income.
    pub projected_mobile: f32,
    /// Affordable counts reported by the engine at capture time.
    pub affordable: Affordability,
    /// Stationary occupancy of the arena keyed by tile.
    pub units: BTreeMap<Position, UnitSnapshot>,
}
