use crate::{
    arena::{self, Edge},
    Command, PlacementError, Player, Position, ResourceKind, Side, UnitSnapshot, UnitType,
};

/// Surface of the match engine consumed by the strategy systems.
///
/// Queries are side-effect free. Commands take effect immediately, so later
/// queries within the same turn observe them.
pub trait Engine {
    /// Zero-based number of the turn being planned.
    fn turn_number(&self) -> u32;

    /// Number of units of the provided type the agent can currently pay for.
    fn affordable_count(&self, unit: UnitType) -> u32;

    /// Stationary unit occupying the tile, if any.
    fn unit_at(&self, position: Position) -> Option<UnitSnapshot>;

    /// Reports whether a stationary unit occupies the tile.
    fn occupied(&self, position: Position) -> bool {
        self.unit_at(position).is_some()
    }

    /// Path a mobile unit spawned at `start` would walk.
    ///
    /// When `target` is `None` the edge opposite the start edge is used. An
    /// empty path means the start is blocked or invalid.
    fn find_path(&self, start: Position, target: Option<Edge>) -> Vec<Position>;

    /// Tiles within `radius` of `center`.
    fn attack_range(&self, center: Position, radius: f32) -> Vec<Position> {
        arena::locations_in_range(center, radius)
    }

    /// Reports whether the tile lies inside the arena.
    fn in_bounds(&self, position: Position) -> bool {
        arena::in_bounds(position)
    }

    /// Amount of the currency held by the player.
    fn resource(&self, kind: ResourceKind, player: Player) -> f32;

    /// Remaining health pool of the player.
    fn health(&self, player: Player) -> f32;

    /// Mobile points the agent will hold after `turns_ahead` turns of decay
    /// and base income, excluding factory output.
    fn projected_future_resource(&self, turns_ahead: u32) -> f32;

    /// Requests a unit on the tile.
    fn spawn(&mut self, unit: UnitType, position: Position) -> Result<(), PlacementError>;

    /// Flags the agent's structure on the tile for removal at turn end.
    fn remove(&mut self, position: Position) -> Result<(), PlacementError>;

    /// Upgrades the agent's structure on the tile.
    fn upgrade(&mut self, position: Position) -> Result<(), PlacementError>;

    /// Ends the agent's turn.
    fn submit_turn(&mut self);
}

/// Structure marking the left-anchored defence layout as committed.
pub const LEFT_LAYOUT_ANCHOR: Position = Position::new(18, 4);

/// Anchor structure of the layout committed to the provided side.
#[must_use]
pub const fn layout_anchor(side: Side) -> Position {
    match side {
        Side::Left => LEFT_LAYOUT_ANCHOR,
        Side::Right => arena::mirror(LEFT_LAYOUT_ANCHOR),
    }
}

/// Side of the committed defence layout, detected through its anchor.
///
/// The left anchor takes precedence when both anchors are present.
pub fn committed_layout<E>(engine: &E) -> Option<Side>
where
    E: Engine + ?Sized,
{
    [Side::Left, Side::Right]
        .into_iter()
        .find(|side| engine.occupied(layout_anchor(*side)))
}

/// Engine adapter that records every accepted command in order.
#[derive(Debug)]
pub struct Recorder<'e, E: ?Sized> {
    engine: &'e mut E,
    batch: Vec<Command>,
}

impl<'e, E> Recorder<'e, E>
where
    E: Engine + ?Sized,
{
    /// Wraps the engine with an empty command batch.
    pub fn new(engine: &'e mut E) -> Self {
        Self {
            engine,
            batch: Vec::new(),
        }
    }

    /// Commands accepted so far.
    #[must_use]
    pub fn commands(&self) -> &[Command] {
        &self.batch
    }

    /// Consumes the recorder, returning the accepted commands.
    #[must_use]
    pub fn into_commands(self) -> Vec<Command> {
        self.batch
    }

    fn record(
        &mut self,
        outcome: Result<(), PlacementError>,
        command: Command,
    ) -> Result<(), PlacementError> {
        if outcome.is_ok() {
            self.batch.push(command);
        }
        outcome
    }
}

impl<E> Engine for Recorder<'_, E>
where
    E: Engine + ?Sized,
{
    fn turn_number(&self) -> u32 {
        self.engine.turn_number()
    }

    fn affordable_count(&self, unit: UnitType) -> u32 {
        self.engine.affordable_count(unit)
    }

    fn unit_at(&self, position: Position) -> Option<UnitSnapshot> {
        self.engine.unit_at(position)
    }

    fn occupied(&self, position: Position) -> bool {
        self.engine.occupied(position)
    }

    fn find_path(&self, start: Position, target: Option<Edge>) -> Vec<Position> {
        self.engine.find_path(start, target)
    }

    fn attack_range(&self, center: Position, radius: f32) -> Vec<Position> {
        self.engine.attack_range(center, radius)
    }

    fn in_bounds(&self, position: Position) -> bool {
        self.engine.in_bounds(position)
    }

    fn resource(&self, kind: ResourceKind, player: Player) -> f32 {
        self.engine.resource(kind, player)
    }

    fn health(&self, player: Player) -> f32 {
        self.engine.health(player)
    }

    fn projected_future_resource(&self, turns_ahead: u32) -> f32 {
        self.engine.projected_future_resource(turns_ahead)
    }

    fn spawn(&mut self, unit: UnitType, position: Position) -> Result<(), PlacementError> {
        let outcome = self.engine.spawn(unit, position);
        self.record(outcome, Command::Spawn { unit, position })
    }

    fn remove(&mut self, position: Position) -> Result<(), PlacementError> {
        let outcome = self.engine.remove(position);
        self.record(outcome, Command::Remove { position })
    }

    fn upgrade(&mut self, position: Position) -> Result<(), PlacementError> {
        let outcome = self.engine.upgrade(position);
        self.record(outcome, Command::Upgrade { position })
    }

    fn submit_turn(&mut self) {
        self.engine.submit_turn();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[derive(Default)]
    struct Board {
        structures: BTreeMap<Position, UnitSnapshot>,
        submitted: bool,
    }

    impl Engine for Board {
        fn turn_number(&self) -> u32 {
            0
        }

        fn affordable_count(&self, _unit: UnitType) -> u32 {
            1
        }

        fn unit_at(&self, position: Position) -> Option<UnitSnapshot> {
            self.structures.get(&position).copied()
        }

        fn find_path(&self, _start: Position, _target: Option<Edge>) -> Vec<Position> {
            Vec::new()
        }

        fn resource(&self, _kind: ResourceKind, _player: Player) -> f32 {
            0.0
        }

        fn health(&self, _player: Player) -> f32 {
            30.0
        }

        fn projected_future_resource(&self, _turns_ahead: u32) -> f32 {
            0.0
        }

        fn spawn(&mut self, unit: UnitType, position: Position) -> Result<(), PlacementError> {
            if self.structures.contains_key(&position) {
                return Err(PlacementError::Occupied);
            }
            let _ = self.structures.insert(
                position,
                UnitSnapshot {
                    unit,
                    owner: Player::Friendly,
                    health: 60.0,
                    upgraded: false,
                },
            );
            Ok(())
        }

        fn remove(&mut self, _position: Position) -> Result<(), PlacementError> {
            Err(PlacementError::Vacant)
        }

        fn upgrade(&mut self, _position: Position) -> Result<(), PlacementError> {
            Err(PlacementError::Vacant)
        }

        fn submit_turn(&mut self) {
            self.submitted = true;
        }
    }

    #[test]
    fn recorder_keeps_only_accepted_commands() {
        let mut board = Board::default();
        let mut recorder = Recorder::new(&mut board);
        let tile = Position::new(6, 12);

        assert!(recorder.spawn(UnitType::Turret, tile).is_ok());
        assert_eq!(
            recorder.spawn(UnitType::Turret, tile),
            Err(PlacementError::Occupied)
        );
        assert_eq!(recorder.remove(tile), Err(PlacementError::Vacant));
        recorder.submit_turn();

        assert_eq!(
            recorder.into_commands(),
            vec![Command::Spawn {
                unit: UnitType::Turret,
                position: tile,
            }]
        );
        assert!(board.submitted);
    }

    #[test]
    fn committed_layout_is_read_from_the_anchor() {
        let mut board = Board::default();
        assert_eq!(committed_layout(&board), None);

        board
            .spawn(UnitType::Wall, layout_anchor(Side::Right))
            .expect("anchor placed");
        assert_eq!(committed_layout(&board), Some(Side::Right));
        assert_eq!(layout_anchor(Side::Right), Position::new(9, 4));
    }
}
