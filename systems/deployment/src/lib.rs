#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Mobile-unit deployment planning.
//!
//! Planners read the battlefield and produce a [`DeploymentPlan`] whose
//! totals never exceed the affordable counts sampled while planning. Plans
//! are executed separately so a rejected spawn only ends its own placement.

use std::fmt;

use lane_defence_core::{
    arena::{self, Edge},
    committed_layout,
    tuning::{BurstTuning, RushTuning, StallTuning, StrategyTuning, ThreatTuning, UnitCatalog},
    Engine, Position, Side, UnitPlacement, UnitType,
};
use lane_defence_system_assessor::Features;
use lane_defence_system_spawn_history::SpawnHistory;
use lane_defence_system_threat::{
    stack_survivability, survives, unblocked, ThreatEstimate, ThreatModel,
};
use rand::{seq::SliceRandom, Rng};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Lanes interceptors screen from before the defence commits to a flank.
pub const OPENING_LANES: [Position; 4] = [
    Position::new(9, 4),
    Position::new(18, 4),
    Position::new(22, 8),
    Position::new(5, 8),
];

/// Spawn lanes owned by a committed defence layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LayoutLanes {
    /// Lane carrying the bulk of a split stack.
    pub primary: Position,
    /// Lane of the leading sub-stack.
    pub lead: Position,
    /// Far-flank lane used by stalls and flank demolishers.
    pub flank: Position,
    /// Lane interceptor attacks leave from.
    pub screen: Position,
    /// Tiles that must be empty before a split rush is sent.
    pub clearance: [Position; 4],
}

impl LayoutLanes {
    /// Lanes of the layout anchored on the left.
    pub const LEFT: Self = Self {
        primary: Position::new(16, 2),
        lead: Position::new(14, 0),
        flank: Position::new(5, 8),
        screen: Position::new(8, 5),
        clearance: [
            Position::new(1, 12),
            Position::new(2, 12),
            Position::new(0, 13),
            Position::new(1, 13),
        ],
    };

    /// Mirror image of the lanes across the vertical centre line.
    #[must_use]
    pub const fn reflect(self) -> Self {
        let [a, b, c, d] = self.clearance;
        Self {
            primary: arena::mirror(self.primary),
            lead: arena::mirror(self.lead),
            flank: arena::mirror(self.flank),
            screen: arena::mirror(self.screen),
            clearance: [
                arena::mirror(a),
                arena::mirror(b),
                arena::mirror(c),
                arena::mirror(d),
            ],
        }
    }

    /// Lanes of the layout committed to the provided side.
    #[must_use]
    pub const fn for_side(side: Side) -> Self {
        match side {
            Side::Left => Self::LEFT,
            Side::Right => Self::LEFT.reflect(),
        }
    }

    /// Reports whether every clearance tile is free of structures.
    pub fn clear<E>(&self, engine: &E) -> bool
    where
        E: Engine + ?Sized,
    {
        self.clearance.iter().all(|tile| !engine.occupied(*tile))
    }
}

/// How a posture was turned into placements.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Resolution {
    /// Scout rush split between the lead and primary lanes.
    RushSplit,
    /// Scout rush sent as one stack.
    RushStack,
    /// Rush withheld because the corner was not clear.
    RushHeld,
    /// Scout burst.
    ScoutBurst,
    /// Demolisher burst.
    DemolisherBurst,
    /// Opening interceptor screen.
    InterceptorScreen,
    /// Interceptor attack from the screen lane.
    InterceptorAttack,
    /// Small interceptor stall on the flank lane.
    InterceptorStall,
    /// Nothing deployed.
    Pass,
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::RushSplit => "rush-split",
            Self::RushStack => "rush-stack",
            Self::RushHeld => "rush-held",
            Self::ScoutBurst => "scout-burst",
            Self::DemolisherBurst => "demolisher-burst",
            Self::InterceptorScreen => "interceptor-screen",
            Self::InterceptorAttack => "interceptor-attack",
            Self::InterceptorStall => "interceptor-stall",
            Self::Pass => "pass",
        };
        f.write_str(name)
    }
}

/// Placements chosen for one turn.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeploymentPlan {
    /// How the plan came about.
    pub resolution: Resolution,
    /// Placements in execution order.
    pub placements: Vec<UnitPlacement>,
}

impl DeploymentPlan {
    /// Plan that deploys nothing.
    #[must_use]
    pub fn hold(resolution: Resolution) -> Self {
        Self {
            resolution,
            placements: Vec::new(),
        }
    }

    fn stack(resolution: Resolution, unit: UnitType, lane: Position, count: u32) -> Self {
        let mut plan = Self::hold(resolution);
        plan.push(UnitPlacement::new(unit, lane, count));
        plan
    }

    fn split(
        resolution: Resolution,
        unit: UnitType,
        lead: Position,
        primary: Position,
        affordable: u32,
        lead_size: u32,
    ) -> Self {
        let leading = lead_size.min(affordable);
        let mut plan = Self::hold(resolution);
        plan.push(UnitPlacement::new(unit, lead, leading));
        plan.push(UnitPlacement::new(unit, primary, affordable - leading));
        plan
    }

    fn push(&mut self, placement: UnitPlacement) {
        if placement.count > 0 {
            self.placements.push(placement);
        }
    }

    /// Units of the provided type the plan places.
    #[must_use]
    pub fn total(&self, unit: UnitType) -> u32 {
        self.placements
            .iter()
            .filter(|placement| placement.unit == unit)
            .map(|placement| placement.count)
            .sum()
    }

    /// Reports whether the plan places nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }

    /// Spawns every placement, returning the number of accepted units.
    ///
    /// A rejected spawn ends the loop of its placement; later placements are
    /// still attempted.
    pub fn execute<E>(&self, engine: &mut E) -> u32
    where
        E: Engine + ?Sized,
    {
        let mut spawned = 0;
        for placement in &self.placements {
            for _ in 0..placement.count {
                match engine.spawn(placement.unit, placement.position) {
                    Ok(()) => spawned += 1,
                    Err(error) => {
                        debug!(
                            unit = %placement.unit,
                            position = %placement.position,
                            %error,
                            "mobile placement rejected"
                        );
                        break;
                    }
                }
            }
        }
        spawned
    }
}

/// Planner turning postures into [`DeploymentPlan`] values.
#[derive(Debug)]
pub struct DeploymentPlanner {
    catalog: UnitCatalog,
    threat: ThreatTuning,
    rush: RushTuning,
    burst: BurstTuning,
    stall: StallTuning,
    model: ThreatModel,
}

impl DeploymentPlanner {
    /// Creates a planner with the provided tuning.
    #[must_use]
    pub fn new(tuning: &StrategyTuning) -> Self {
        Self {
            catalog: tuning.catalog,
            threat: tuning.threat,
            rush: tuning.rush,
            burst: tuning.burst,
            stall: tuning.stall.clone(),
            model: ThreatModel::new(tuning.catalog.turret),
        }
    }

    /// Least-damage unblocked tile on the provided edges against enemy turrets.
    pub fn least_damage_lane<E>(
        &mut self,
        engine: &E,
        edges: &[Edge],
        features: &Features,
    ) -> Option<Position>
    where
        E: Engine + ?Sized,
    {
        let tiles: Vec<Position> = edges.iter().flat_map(|edge| edge.locations()).collect();
        let candidates = unblocked(engine, &tiles);
        self.model
            .least_damage_location(engine, &candidates, &features.enemy_turrets)
    }

    /// Mass scout commit aimed at finishing the opponent.
    pub fn plan_rush<E>(&mut self, engine: &E, features: &Features) -> DeploymentPlan
    where
        E: Engine + ?Sized,
    {
        let scouts = features.affordable.get(UnitType::Scout);
        if scouts == 0 {
            return DeploymentPlan::hold(Resolution::Pass);
        }

        if scouts > self.rush.split_threshold {
            let (lead, primary) = match committed_layout(engine) {
                Some(side) => {
                    let lanes = LayoutLanes::for_side(side);
                    if !lanes.clear(engine) {
                        debug!(?side, "rush held until the corner clears");
                        return DeploymentPlan::hold(Resolution::RushHeld);
                    }
                    (lanes.lead, lanes.primary)
                }
                None => match self.least_damage_lane(engine, &Edge::FRIENDLY, features) {
                    Some(primary) => match free_edge_neighbour(engine, primary) {
                        Some(lead) => (lead, primary),
                        None => {
                            debug!(%primary, "no free lead lane, rushing as one stack");
                            return DeploymentPlan::stack(
                                Resolution::RushStack,
                                UnitType::Scout,
                                primary,
                                scouts,
                            );
                        }
                    },
                    None => return DeploymentPlan::hold(Resolution::Pass),
                },
            };
            return DeploymentPlan::split(
                Resolution::RushSplit,
                UnitType::Scout,
                lead,
                primary,
                scouts,
                self.rush.lead_size,
            );
        }

        match self.least_damage_lane(engine, &Edge::FRIENDLY, features) {
            Some(lane) => DeploymentPlan::stack(Resolution::RushStack, UnitType::Scout, lane, scouts),
            None => DeploymentPlan::hold(Resolution::Pass),
        }
    }

    /// Scout burst aimed at the lighter enemy flank.
    pub fn plan_scout_burst<E>(&mut self, engine: &E, features: &Features) -> DeploymentPlan
    where
        E: Engine + ?Sized,
    {
        let scouts = features.affordable.get(UnitType::Scout);
        if scouts == 0 {
            return DeploymentPlan::hold(Resolution::Pass);
        }

        let layout = committed_layout(engine);
        if let (true, Some(side)) = (scouts > self.burst.split_threshold, layout) {
            let lanes = LayoutLanes::for_side(side);
            return DeploymentPlan::split(
                Resolution::ScoutBurst,
                UnitType::Scout,
                lanes.lead,
                lanes.primary,
                scouts,
                self.burst.lead_size,
            );
        }

        let flanks = features.enemy_flanks;
        let lane = if flanks.left > flanks.right {
            self.least_damage_lane(engine, &[Edge::BottomLeft], features)
        } else if flanks.left < flanks.right {
            self.least_damage_lane(engine, &[Edge::BottomRight], features)
        } else {
            match layout {
                Some(side) => Some(LayoutLanes::for_side(side).lead),
                None => self.least_damage_lane(engine, &Edge::FRIENDLY, features),
            }
        };

        match lane {
            Some(lane) => {
                DeploymentPlan::stack(Resolution::ScoutBurst, UnitType::Scout, lane, scouts)
            }
            None => DeploymentPlan::hold(Resolution::Pass),
        }
    }

    /// Demolisher burst through the lane matching the weaker enemy flank.
    pub fn plan_demolisher_burst<E>(&mut self, engine: &E, features: &Features) -> DeploymentPlan
    where
        E: Engine + ?Sized,
    {
        let demolishers = features.affordable.get(UnitType::Demolisher);
        if demolishers == 0 {
            return DeploymentPlan::hold(Resolution::Pass);
        }

        let lane = match (committed_layout(engine), features.enemy_flanks.weaker()) {
            (Some(side), Some(weaker)) => {
                let lanes = LayoutLanes::for_side(side);
                Some(if weaker == side { lanes.flank } else { lanes.lead })
            }
            _ => self.least_damage_lane(engine, &Edge::FRIENDLY, features),
        };

        match lane {
            Some(lane) => DeploymentPlan::stack(
                Resolution::DemolisherBurst,
                UnitType::Demolisher,
                lane,
                demolishers,
            ),
            None => DeploymentPlan::hold(Resolution::Pass),
        }
    }

    /// Threat-evaluated attack resolving into a burst, an interceptor attack
    /// or a pass.
    pub fn plan_main_attack<E>(
        &mut self,
        engine: &E,
        features: &Features,
        history: &SpawnHistory,
    ) -> DeploymentPlan
    where
        E: Engine + ?Sized,
    {
        let tuning = self.threat;
        let flanks = features.enemy_flanks;
        let edges: &[Edge] = if flanks.left > flanks.right {
            &[Edge::BottomLeft]
        } else if flanks.left < flanks.right {
            &[Edge::BottomRight]
        } else {
            &Edge::FRIENDLY
        };

        let threat = match self.least_damage_lane(engine, edges, features) {
            Some(lane) => self
                .model
                .lane_damage(engine, lane, &features.enemy_turrets),
            None => ThreatEstimate::default(),
        };
        let interceptor_threat = threat.scaled(tuning.interceptor_exposure);

        let reserve_units = if features.turn > tuning.late_reserve_after_turn {
            tuning.late_reserve
        } else {
            tuning.reserve
        };
        let reserve = reserve_units as f32;
        let scouts = features.affordable.get(UnitType::Scout);
        let interceptors = features.affordable.get(UnitType::Interceptor);
        let demolishers = features.affordable.get(UnitType::Demolisher);
        let scout_health = self.catalog.scout.health;
        let interceptor_health = self.catalog.interceptor.health;

        let scout_survivability = stack_survivability(scouts, scout_health, reserve * scout_health);
        let interceptor_survivability =
            stack_survivability(interceptors, interceptor_health, reserve * interceptor_health);
        let salvo = demolishers as f32 * tuning.demolisher_salvo;
        let enemy_mobile = features.enemy_resources.mobile;
        let own_mobile = features.own_resources.mobile;

        let demolish = (salvo > tuning.salvo_threshold
            && scouts < tuning.demolisher_max_scouts
            && features.projected_mobile < tuning.demolisher_max_projected_mobile
            && enemy_mobile < tuning.demolisher_max_enemy_mobile)
            || (features.front_row_occupancy > tuning.siege_front_occupancy
                && salvo > tuning.siege_salvo_threshold
                && scouts < tuning.siege_max_scouts
                && enemy_mobile < tuning.demolisher_max_enemy_mobile);
        let scout = (survives(scout_survivability, &threat)
            && features.turn > tuning.scout_after_turn
            && enemy_mobile < features.own_health + tuning.scout_health_slack)
            || scouts >= tuning.scout_flush;
        let intercept = (survives(interceptor_survivability, &interceptor_threat)
            && enemy_mobile < tuning.interceptor_max_enemy_mobile
            && own_mobile < tuning.interceptor_max_own_mobile)
            || features.turn < tuning.interceptor_before_turn;

        debug!(
            turn = features.turn,
            threat = threat.total(),
            salvo,
            demolish,
            scout,
            intercept,
            "main attack evaluated"
        );

        if demolish {
            self.plan_demolisher_burst(engine, features)
        } else if scout {
            self.plan_scout_burst(engine, features)
        } else if intercept {
            self.plan_interceptor_attack(engine, features, history)
        } else {
            DeploymentPlan::hold(Resolution::Pass)
        }
    }

    /// Opening screen: every affordable interceptor on one randomly drawn lane.
    pub fn plan_interceptor_screen<R>(&self, features: &Features, rng: &mut R) -> DeploymentPlan
    where
        R: Rng + ?Sized,
    {
        let interceptors = features.affordable.get(UnitType::Interceptor);
        if interceptors == 0 {
            return DeploymentPlan::hold(Resolution::Pass);
        }
        match OPENING_LANES.choose(rng) {
            Some(lane) => DeploymentPlan::stack(
                Resolution::InterceptorScreen,
                UnitType::Interceptor,
                *lane,
                interceptors,
            ),
            None => DeploymentPlan::hold(Resolution::Pass),
        }
    }

    /// Interceptor attack from the layout's screen lane, keeping a reserve.
    pub fn plan_interceptor_attack<E>(
        &mut self,
        engine: &E,
        features: &Features,
        history: &SpawnHistory,
    ) -> DeploymentPlan
    where
        E: Engine + ?Sized,
    {
        let interceptors = features.affordable.get(UnitType::Interceptor);
        let lane = match committed_layout(engine) {
            Some(side) => Some(LayoutLanes::for_side(side).screen),
            None if interceptors >= self.threat.interceptor_stall_handoff => {
                return self.plan_stall(engine, features, history);
            }
            None => self.least_damage_lane(engine, &Edge::FRIENDLY, features),
        };

        let count = interceptors.saturating_sub(self.threat.interceptor_reserve);
        match lane {
            Some(lane) if count > 0 => DeploymentPlan::stack(
                Resolution::InterceptorAttack,
                UnitType::Interceptor,
                lane,
                count,
            ),
            _ => DeploymentPlan::hold(Resolution::Pass),
        }
    }

    /// A few interceptors on the flank lane when the predicted enemy wave
    /// outguns the agent's turrets and the opponent scored last turn.
    pub fn plan_stall<E>(
        &mut self,
        engine: &E,
        features: &Features,
        history: &SpawnHistory,
    ) -> DeploymentPlan
    where
        E: Engine + ?Sized,
    {
        let enemy_mobile = features.enemy_resources.mobile;
        let wanted = self.stall.interceptors_for(enemy_mobile);
        if wanted == 0 {
            return DeploymentPlan::hold(Resolution::Pass);
        }
        let Some(side) = committed_layout(engine) else {
            return DeploymentPlan::hold(Resolution::Pass);
        };
        if history.breaches_against(features.turn).is_empty() {
            return DeploymentPlan::hold(Resolution::Pass);
        }

        let own_turrets = &features.own_turrets;
        let model = &mut self.model;
        let estimate = history.resolve(features.turn, || {
            model.hypothetical_enemy_spawn(engine, own_turrets)
        });
        let Some(origin) = estimate.origins.first().copied() else {
            return DeploymentPlan::hold(Resolution::Pass);
        };

        let path = engine.find_path(origin, None);
        let defended = self.model.path_damage(engine, &path, own_turrets).total();
        let pressure = enemy_mobile * self.catalog.scout.health;
        debug!(
            %origin,
            source = ?estimate.source,
            defended,
            pressure,
            "stall evaluated"
        );
        if defended >= pressure {
            return DeploymentPlan::hold(Resolution::Pass);
        }

        let count = wanted.min(features.affordable.get(UnitType::Interceptor));
        if count == 0 {
            return DeploymentPlan::hold(Resolution::Pass);
        }
        DeploymentPlan::stack(
            Resolution::InterceptorStall,
            UnitType::Interceptor,
            LayoutLanes::for_side(side).flank,
            count,
        )
    }
}

/// Unoccupied neighbour of `position` on its edge, preferring the outward tile.
fn free_edge_neighbour<E>(engine: &E, position: Position) -> Option<Position>
where
    E: Engine + ?Sized,
{
    let edge = Edge::of(position)?;
    let tiles = edge.locations();
    let index = tiles.iter().position(|tile| *tile == position)?;
    let outward = tiles.get(index + 1).copied();
    let inward = index.checked_sub(1).map(|i| tiles[i]);
    let neighbours: Vec<Position> = outward.into_iter().chain(inward).collect();
    unblocked(engine, &neighbours).first().copied()
}
