use serde::{Deserialize, Serialize};

use crate::{Player, Position, UnitType};

/// A mobile unit reaching its target edge and damaging the other player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BreachEvent {
    /// Tile where the breach happened.
    pub position: Position,
    /// Player whose unit scored the breach.
    pub owner: Player,
}

/// A mobile unit exploding after running out of path.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SelfDestructEvent {
    /// Tile where the unit exploded.
    pub position: Position,
    /// Player that owned the unit.
    pub owner: Player,
}

/// Opponent mobile unit observed in an action frame.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MobileSighting {
    /// Type of the observed unit.
    pub unit: UnitType,
    /// Tile the unit occupied in the frame.
    pub position: Position,
    /// Remaining health of the unit.
    #[serde(default)]
    pub health: f32,
}

/// One frame of the action phase that follows a turn.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionFrame {
    /// Turn the action phase belongs to.
    pub turn: u32,
    /// Frame index within the action phase; `0` is the deploy frame.
    pub frame: u32,
    /// Breaches recorded in the frame.
    #[serde(default)]
    pub breaches: Vec<BreachEvent>,
    /// Self-destructs recorded in the frame.
    #[serde(default)]
    pub self_destructs: Vec<SelfDestructEvent>,
    /// Opponent mobile units visible in the frame.
    #[serde(default)]
    pub enemy_units: Vec<MobileSighting>,
}

impl ActionFrame {
    /// Reports whether the frame is the deploy frame of its turn.
    #[must_use]
    pub const fn is_deploy_frame(&self) -> bool {
        self.frame == 0
    }
}
