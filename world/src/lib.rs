#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! In-memory reference engine for Lane Defence.
//!
//! The world enforces placement, affordability, range and pathing rules so
//! the strategy systems can be exercised without a live match. It never
//! simulates combat: structures only disappear through removal.

mod navigation;

use std::collections::{BTreeMap, BTreeSet};

use lane_defence_core::{
    arena::{self, Edge},
    tuning::UnitCatalog,
    Engine, PlacementError, Player, Position, ResourceKind, UnitSnapshot, UnitType,
};

const STARTING_STRUCTURE_POINTS: f32 = 40.0;
const STARTING_MOBILE_POINTS: f32 = 5.0;
const STARTING_HEALTH: f32 = 30.0;

const STRUCTURE_INCOME: f32 = 5.0;
const MOBILE_INCOME: f32 = 5.0;
const MOBILE_INCOME_STEP_TURNS: u32 = 10;
const MOBILE_DECAY: f32 = 0.75;
const FACTORY_MOBILE_INCOME: f32 = 1.0;
const REMOVAL_REFUND: f32 = 0.75;

/// Resources and health of one participant.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Ledger {
    structure: f32,
    mobile: f32,
    health: f32,
}

impl Default for Ledger {
    fn default() -> Self {
        Self {
            structure: STARTING_STRUCTURE_POINTS,
            mobile: STARTING_MOBILE_POINTS,
            health: STARTING_HEALTH,
        }
    }
}

impl Ledger {
    fn pool(&self, kind: ResourceKind) -> f32 {
        match kind {
            ResourceKind::Structure => self.structure,
            ResourceKind::Mobile => self.mobile,
        }
    }

    fn pool_mut(&mut self, kind: ResourceKind) -> &mut f32 {
        match kind {
            ResourceKind::Structure => &mut self.structure,
            ResourceKind::Mobile => &mut self.mobile,
        }
    }
}

/// Mobile unit queued on a friendly edge during the current turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Deployment {
    /// Type of the deployed unit.
    pub unit: UnitType,
    /// Edge tile the unit starts from.
    pub position: Position,
}

/// Authoritative state of the reference engine.
#[derive(Clone, Debug)]
pub struct World {
    catalog: UnitCatalog,
    turn: u32,
    structures: BTreeMap<Position, UnitSnapshot>,
    pending_removals: BTreeSet<Position>,
    deployments: Vec<Deployment>,
    ledgers: [Ledger; 2],
}

impl Default for World {
    fn default() -> Self {
        Self::new(UnitCatalog::default())
    }
}

impl World {
    /// Creates an empty arena at turn zero with the starting resources.
    #[must_use]
    pub fn new(catalog: UnitCatalog) -> Self {
        Self {
            catalog,
            turn: 0,
            structures: BTreeMap::new(),
            pending_removals: BTreeSet::new(),
            deployments: Vec::new(),
            ledgers: [Ledger::default(); 2],
        }
    }

    /// Places a structure without charging for it.
    ///
    /// Used to set up scenarios; only arena bounds and occupancy are checked.
    pub fn place(
        &mut self,
        unit: UnitType,
        owner: Player,
        position: Position,
        upgraded: bool,
    ) -> Result<(), PlacementError> {
        if !arena::in_bounds(position) {
            return Err(PlacementError::OutOfBounds);
        }
        if !unit.is_stationary() || self.structures.contains_key(&position) {
            return Err(PlacementError::Occupied);
        }
        let stats = self.catalog.stats(unit);
        let _ = self.structures.insert(
            position,
            UnitSnapshot {
                unit,
                owner,
                health: stats.health_for(upgraded),
                upgraded,
            },
        );
        Ok(())
    }

    /// Overrides a resource pool of the player.
    pub fn set_resource(&mut self, kind: ResourceKind, player: Player, amount: f32) {
        *self.ledger_mut(player).pool_mut(kind) = amount.max(0.0);
    }

    /// Overrides the health pool of the player.
    pub fn set_health(&mut self, player: Player, health: f32) {
        self.ledger_mut(player).health = health.max(0.0);
    }

    /// Jumps to the provided turn number.
    pub fn set_turn(&mut self, turn: u32) {
        self.turn = turn;
    }

    fn ledger(&self, player: Player) -> &Ledger {
        &self.ledgers[ledger_index(player)]
    }

    fn ledger_mut(&mut self, player: Player) -> &mut Ledger {
        &mut self.ledgers[ledger_index(player)]
    }

    fn owned_structure(&self, position: Position) -> Option<&UnitSnapshot> {
        self.structures
            .get(&position)
            .filter(|snapshot| snapshot.owner == Player::Friendly)
    }

    fn charge(&mut self, kind: ResourceKind, cost: f32) -> Result<(), PlacementError> {
        let pool = self.ledger_mut(Player::Friendly).pool_mut(kind);
        if *pool + f32::EPSILON < cost {
            return Err(PlacementError::InsufficientResources);
        }
        *pool = (*pool - cost).max(0.0);
        Ok(())
    }

    fn owned_factories(&self, player: Player) -> usize {
        self.structures
            .values()
            .filter(|snapshot| snapshot.owner == player && snapshot.unit == UnitType::Factory)
            .count()
    }

    fn apply_removals(&mut self) {
        for position in std::mem::take(&mut self.pending_removals) {
            let Some(removed) = self.structures.remove(&position) else {
                continue;
            };
            let stats = self.catalog.stats(removed.unit);
            let mut invested = stats.cost;
            if removed.upgraded {
                invested += stats.upgrade_cost;
            }
            self.ledger_mut(removed.owner).structure += invested * REMOVAL_REFUND;
        }
    }

    fn grant_income(&mut self) {
        let step = (self.turn / MOBILE_INCOME_STEP_TURNS) as f32;
        for player in [Player::Friendly, Player::Opponent] {
            let factories = self.owned_factories(player) as f32;
            let ledger = self.ledger_mut(player);
            ledger.structure += STRUCTURE_INCOME;
            ledger.mobile =
                decay(ledger.mobile) + MOBILE_INCOME + step + factories * FACTORY_MOBILE_INCOME;
        }
    }
}

impl Engine for World {
    fn turn_number(&self) -> u32 {
        self.turn
    }

    fn affordable_count(&self, unit: UnitType) -> u32 {
        let cost = self.catalog.stats(unit).cost;
        if cost <= 0.0 {
            return 0;
        }
        let pool = self.ledger(Player::Friendly).pool(unit.resource());
        (pool / cost + f32::EPSILON).floor().max(0.0) as u32
    }

    fn unit_at(&self, position: Position) -> Option<UnitSnapshot> {
        self.structures.get(&position).copied()
    }

    fn find_path(&self, start: Position, target: Option<Edge>) -> Vec<Position> {
        let Some(target) = target.or_else(|| Edge::of(start).map(Edge::opposite)) else {
            return Vec::new();
        };
        navigation::find_path(start, target, |tile| self.structures.contains_key(&tile))
    }

    fn resource(&self, kind: ResourceKind, player: Player) -> f32 {
        self.ledger(player).pool(kind)
    }

    fn health(&self, player: Player) -> f32 {
        self.ledger(player).health
    }

    fn projected_future_resource(&self, turns_ahead: u32) -> f32 {
        let mut mobile = self.ledger(Player::Friendly).mobile;
        for offset in 0..turns_ahead {
            let step = ((self.turn + offset) / MOBILE_INCOME_STEP_TURNS) as f32;
            mobile = decay(mobile) + MOBILE_INCOME + step;
        }
        mobile
    }

    fn spawn(&mut self, unit: UnitType, position: Position) -> Result<(), PlacementError> {
        if !arena::in_bounds(position) {
            return Err(PlacementError::OutOfBounds);
        }

        if unit.is_stationary() {
            if !arena::is_friendly_half(position) {
                return Err(PlacementError::NotOwnHalf);
            }
            if self.structures.contains_key(&position) {
                return Err(PlacementError::Occupied);
            }
            let cost = self.catalog.stats(unit).cost;
            self.charge(unit.resource(), cost)?;
            return self.place(unit, Player::Friendly, position, false);
        }

        if !Edge::FRIENDLY.iter().any(|edge| edge.contains(position)) {
            return Err(PlacementError::NotOwnEdge);
        }
        if self.structures.contains_key(&position) {
            return Err(PlacementError::Occupied);
        }
        let cost = self.catalog.stats(unit).cost;
        self.charge(unit.resource(), cost)?;
        self.deployments.push(Deployment { unit, position });
        Ok(())
    }

    fn remove(&mut self, position: Position) -> Result<(), PlacementError> {
        if !arena::in_bounds(position) {
            return Err(PlacementError::OutOfBounds);
        }
        if self.owned_structure(position).is_none() {
            return Err(PlacementError::Vacant);
        }
        let _ = self.pending_removals.insert(position);
        Ok(())
    }

    fn upgrade(&mut self, position: Position) -> Result<(), PlacementError> {
        if !arena::in_bounds(position) {
            return Err(PlacementError::OutOfBounds);
        }
        let Some(current) = self.owned_structure(position).copied() else {
            return Err(PlacementError::Vacant);
        };
        if current.upgraded {
            return Err(PlacementError::AlreadyUpgraded);
        }
        let stats = *self.catalog.stats(current.unit);
        self.charge(ResourceKind::Structure, stats.upgrade_cost)?;
        let _ = self.structures.insert(
            position,
            UnitSnapshot {
                upgraded: true,
                health: stats.upgraded_health,
                ..current
            },
        );
        Ok(())
    }

    fn submit_turn(&mut self) {
        self.apply_removals();
        self.deployments.clear();
        self.grant_income();
        self.turn = self.turn.saturating_add(1);
    }
}

fn decay(mobile: f32) -> f32 {
    (mobile * MOBILE_DECAY * 10.0).round() / 10.0
}

const fn ledger_index(player: Player) -> usize {
    match player {
        Player::Friendly => 0,
        Player::Opponent => 1,
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use super::{Deployment, World};
    use lane_defence_core::{Player, Position, UnitSnapshot};

    /// Structures owned by the player in tile order.
    pub fn structures(
        world: &World,
        owner: Player,
    ) -> impl Iterator<Item = (Position, UnitSnapshot)> + '_ {
        world
            .structures
            .iter()
            .filter(move |(_, snapshot)| snapshot.owner == owner)
            .map(|(position, snapshot)| (*position, *snapshot))
    }

    /// Tiles flagged for removal when the turn is submitted.
    #[must_use]
    pub fn pending_removals(world: &World) -> Vec<Position> {
        world.pending_removals.iter().copied().collect()
    }

    /// Mobile units queued during the current turn.
    #[must_use]
    pub fn deployments(world: &World) -> &[Deployment] {
        &world.deployments
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn structures_are_limited_to_the_friendly_half() {
        let mut world = World::default();

        assert_eq!(
            world.spawn(UnitType::Wall, Position::new(13, 14)),
            Err(PlacementError::NotOwnHalf)
        );
        assert_eq!(
            world.spawn(UnitType::Wall, Position::new(0, 0)),
            Err(PlacementError::OutOfBounds)
        );
        assert_eq!(world.spawn(UnitType::Wall, Position::new(0, 13)), Ok(()));
        assert_eq!(
            world.spawn(UnitType::Turret, Position::new(0, 13)),
            Err(PlacementError::Occupied)
        );
    }

    #[test]
    fn mobile_units_require_a_friendly_edge() {
        let mut world = World::default();

        assert_eq!(
            world.spawn(UnitType::Scout, Position::new(13, 1)),
            Err(PlacementError::NotOwnEdge)
        );
        assert_eq!(
            world.spawn(UnitType::Scout, Position::new(13, 27)),
            Err(PlacementError::NotOwnEdge)
        );
        assert_eq!(world.spawn(UnitType::Scout, Position::new(13, 0)), Ok(()));
        assert_eq!(world.spawn(UnitType::Scout, Position::new(13, 0)), Ok(()));
        assert_eq!(query::deployments(&world).len(), 2);
    }

    #[test]
    fn spending_stops_at_the_affordable_count() {
        let mut world = World::default();
        assert_eq!(world.affordable_count(UnitType::Scout), 5);
        assert_eq!(world.affordable_count(UnitType::Demolisher), 1);

        for _ in 0..5 {
            assert_eq!(world.spawn(UnitType::Scout, Position::new(14, 0)), Ok(()));
        }
        assert_eq!(
            world.spawn(UnitType::Scout, Position::new(14, 0)),
            Err(PlacementError::InsufficientResources)
        );
        assert_eq!(world.affordable_count(UnitType::Scout), 0);
        assert_eq!(world.resource(ResourceKind::Mobile, Player::Friendly), 0.0);
    }

    #[test]
    fn removal_is_deferred_until_submit() {
        let mut world = World::default();
        let gate = Position::new(5, 11);

        world.spawn(UnitType::Wall, gate).expect("spawn gate");
        world.remove(gate).expect("flag gate");
        assert!(world.occupied(gate), "removal applies at turn end");
        assert_eq!(query::pending_removals(&world), vec![gate]);

        world.submit_turn();
        assert!(!world.occupied(gate));
        assert_eq!(world.turn_number(), 1);
    }

    #[test]
    fn removing_or_upgrading_foreign_tiles_is_rejected() {
        let mut world = World::default();
        let tile = Position::new(13, 20);
        world
            .place(UnitType::Turret, Player::Opponent, tile, false)
            .expect("enemy turret");

        assert_eq!(world.remove(tile), Err(PlacementError::Vacant));
        assert_eq!(world.upgrade(tile), Err(PlacementError::Vacant));
    }

    #[test]
    fn upgrade_is_applied_once() {
        let mut world = World::default();
        let tile = Position::new(6, 12);
        world.spawn(UnitType::Turret, tile).expect("spawn turret");

        assert_eq!(world.upgrade(tile), Ok(()));
        assert_eq!(world.upgrade(tile), Err(PlacementError::AlreadyUpgraded));
        let snapshot = world.unit_at(tile).expect("turret present");
        assert!(snapshot.upgraded);
    }

    #[test]
    fn default_path_targets_the_opposite_edge() {
        let world = World::default();
        let path = world.find_path(Position::new(13, 0), None);
        let last = path.last().copied().expect("path");
        assert!(Edge::TopRight.contains(last));
    }

    #[test]
    fn projected_mobile_points_decay_and_grow() {
        let mut world = World::default();
        world.set_resource(ResourceKind::Mobile, Player::Friendly, 20.0);
        assert_eq!(world.projected_future_resource(0), 20.0);
        assert_eq!(world.projected_future_resource(1), 20.0);

        world.set_turn(12);
        assert_eq!(world.projected_future_resource(1), 21.0);
    }

    #[test]
    fn submit_grants_factory_income() {
        let mut world = World::default();
        world.set_resource(ResourceKind::Mobile, Player::Friendly, 0.0);
        world
            .place(UnitType::Factory, Player::Friendly, Position::new(13, 3), false)
            .expect("factory");

        world.submit_turn();

        assert_eq!(world.resource(ResourceKind::Mobile, Player::Friendly), 6.0);
        assert_eq!(world.resource(ResourceKind::Structure, Player::Friendly), 45.0);
    }
}
