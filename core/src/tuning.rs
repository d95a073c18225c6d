//! Tunable thresholds consumed by the strategy systems.
//!
//! Every table implements [`Default`] with the values the agent plays with and
//! is deserialised with `#[serde(default)]`, so configuration files only need
//! to list the values they override.

use serde::{Deserialize, Serialize};

use crate::UnitType;

/// Top-level tuning grouping every subsystem's thresholds.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategyTuning {
    /// Unit statistics.
    pub catalog: UnitCatalog,
    /// Posture rule thresholds.
    pub posture: PostureTuning,
    /// Main-attack evaluation thresholds.
    pub threat: ThreatTuning,
    /// Low-health rush thresholds.
    pub rush: RushTuning,
    /// Scout burst split.
    pub burst: BurstTuning,
    /// Interceptor stall tiers.
    pub stall: StallTuning,
    /// Defence template escalation thresholds.
    pub defence: DefenceTuning,
}

/// Statistics of a single unit type.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UnitStats {
    /// Price in the unit's currency.
    pub cost: f32,
    /// Starting health.
    pub health: f32,
    /// Health after upgrading.
    pub upgraded_health: f32,
    /// Price of the upgrade.
    pub upgrade_cost: f32,
    /// Damage per hit.
    pub damage: f32,
    /// Damage per hit after upgrading.
    pub upgraded_damage: f32,
    /// Attack radius.
    pub range: f32,
    /// Attack radius after upgrading.
    pub upgraded_range: f32,
}

impl UnitStats {
    /// Damage per hit for the requested upgrade state.
    #[must_use]
    pub const fn damage_for(&self, upgraded: bool) -> f32 {
        if upgraded {
            self.upgraded_damage
        } else {
            self.damage
        }
    }

    /// Attack radius for the requested upgrade state.
    #[must_use]
    pub const fn range_for(&self, upgraded: bool) -> f32 {
        if upgraded {
            self.upgraded_range
        } else {
            self.range
        }
    }

    /// Health for the requested upgrade state.
    #[must_use]
    pub const fn health_for(&self, upgraded: bool) -> f32 {
        if upgraded {
            self.upgraded_health
        } else {
            self.health
        }
    }
}

/// Statistics of every unit type.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UnitCatalog {
    /// Wall statistics.
    pub wall: UnitStats,
    /// Factory statistics.
    pub factory: UnitStats,
    /// Turret statistics.
    pub turret: UnitStats,
    /// Scout statistics.
    pub scout: UnitStats,
    /// Demolisher statistics.
    pub demolisher: UnitStats,
    /// Interceptor statistics.
    pub interceptor: UnitStats,
}

impl UnitCatalog {
    /// Statistics of the provided unit type.
    #[must_use]
    pub const fn stats(&self, unit: UnitType) -> &UnitStats {
        match unit {
            UnitType::Wall => &self.wall,
            UnitType::Factory => &self.factory,
            UnitType::Turret => &self.turret,
            UnitType::Scout => &self.scout,
            UnitType::Demolisher => &self.demolisher,
            UnitType::Interceptor => &self.interceptor,
        }
    }
}

impl Default for UnitCatalog {
    fn default() -> Self {
        Self {
            wall: UnitStats {
                cost: 1.0,
                health: 60.0,
                upgraded_health: 120.0,
                upgrade_cost: 1.0,
                ..UnitStats::default()
            },
            factory: UnitStats {
                cost: 4.0,
                health: 30.0,
                upgraded_health: 60.0,
                upgrade_cost: 4.0,
                ..UnitStats::default()
            },
            turret: UnitStats {
                cost: 2.0,
                health: 75.0,
                upgraded_health: 75.0,
                upgrade_cost: 4.0,
                damage: 5.0,
                upgraded_damage: 15.0,
                range: 2.5,
                upgraded_range: 3.5,
            },
            scout: UnitStats {
                cost: 1.0,
                health: 15.0,
                upgraded_health: 15.0,
                damage: 2.0,
                upgraded_damage: 2.0,
                range: 3.5,
                upgraded_range: 3.5,
                ..UnitStats::default()
            },
            demolisher: UnitStats {
                cost: 3.0,
                health: 5.0,
                upgraded_health: 5.0,
                damage: 8.0,
                upgraded_damage: 8.0,
                range: 4.5,
                upgraded_range: 4.5,
                ..UnitStats::default()
            },
            interceptor: UnitStats {
                cost: 1.0,
                health: 40.0,
                upgraded_health: 40.0,
                damage: 20.0,
                upgraded_damage: 20.0,
                range: 4.5,
                upgraded_range: 4.5,
                ..UnitStats::default()
            },
        }
    }
}

/// Thresholds of the posture rule table.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PostureTuning {
    /// Turns spent in the opening posture.
    pub opening_turns: u32,
    /// Turn on which the defence commits to a flank.
    pub commit_turn: u32,
    /// Odd turns after this one trigger a main attack.
    pub cadence_after_turn: u32,
    /// Affordable scouts that force a main attack regardless of cadence.
    pub flush_scouts: u32,
    /// Turns before this one always resolve to a main attack.
    pub early_attack_before_turn: u32,
    /// Enemy structure health under which scouts are sent.
    pub weak_structure_health: f32,
}

impl Default for PostureTuning {
    fn default() -> Self {
        Self {
            opening_turns: 3,
            commit_turn: 3,
            cadence_after_turn: 5,
            flush_scouts: 60,
            early_attack_before_turn: 5,
            weak_structure_health: 2000.0,
        }
    }
}

/// Thresholds that decide between the main attack resolutions.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThreatTuning {
    /// Multiplier applied to path damage when judging interceptor stacks.
    pub interceptor_exposure: f32,
    /// Expected structure damage dealt per affordable demolisher.
    pub demolisher_salvo: f32,
    /// Units held back when judging stack survivability.
    pub reserve: u32,
    /// Units held back once the late reserve turn has passed.
    pub late_reserve: u32,
    /// Turn after which the late reserve applies.
    pub late_reserve_after_turn: u32,
    /// Salvo estimate required for an open-field demolisher burst.
    pub salvo_threshold: f32,
    /// Salvo estimate required for a demolisher burst into a crowded front.
    pub siege_salvo_threshold: f32,
    /// Enemy front-row structures that count as a crowded front.
    pub siege_front_occupancy: u32,
    /// Affordable scouts below which demolishers are preferred.
    pub demolisher_max_scouts: u32,
    /// Affordable scouts below which a siege burst is preferred.
    pub siege_max_scouts: u32,
    /// Projected mobile points below which demolishers are preferred.
    pub demolisher_max_projected_mobile: f32,
    /// Enemy mobile points below which demolishers are sent.
    pub demolisher_max_enemy_mobile: f32,
    /// Turn after which scout bursts are considered.
    pub scout_after_turn: u32,
    /// Slack added to own health when comparing against enemy mobile points.
    pub scout_health_slack: f32,
    /// Affordable scouts that force a scout burst.
    pub scout_flush: u32,
    /// Enemy mobile points below which interceptors attack.
    pub interceptor_max_enemy_mobile: f32,
    /// Own mobile points below which interceptors attack.
    pub interceptor_max_own_mobile: f32,
    /// Turns before this one always send interceptors when nothing else fits.
    pub interceptor_before_turn: u32,
    /// Interceptors kept back by the interceptor attack.
    pub interceptor_reserve: u32,
    /// Affordable interceptors at which an unanchored attack becomes a stall.
    pub interceptor_stall_handoff: u32,
}

impl Default for ThreatTuning {
    fn default() -> Self {
        Self {
            interceptor_exposure: 4.0,
            demolisher_salvo: 54.0,
            reserve: 5,
            late_reserve: 10,
            late_reserve_after_turn: 10,
            salvo_threshold: 300.0,
            siege_salvo_threshold: 350.0,
            siege_front_occupancy: 25,
            demolisher_max_scouts: 40,
            siege_max_scouts: 45,
            demolisher_max_projected_mobile: 40.0,
            demolisher_max_enemy_mobile: 30.0,
            scout_after_turn: 1,
            scout_health_slack: 15.0,
            scout_flush: 45,
            interceptor_max_enemy_mobile: 15.0,
            interceptor_max_own_mobile: 15.0,
            interceptor_before_turn: 2,
            interceptor_reserve: 3,
            interceptor_stall_handoff: 10,
        }
    }
}

/// Thresholds of the low-health rush.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RushTuning {
    /// Enemy health at or below which the agent rushes.
    pub enemy_health: f32,
    /// Projected mobile points above which the agent rushes.
    pub projected_mobile: f32,
    /// Affordable scouts above which the agent rushes.
    pub scouts: u32,
    /// Affordable scouts above which the rush is split into two stacks.
    pub split_threshold: u32,
    /// Size of the leading stack of a split rush.
    pub lead_size: u32,
}

impl Default for RushTuning {
    fn default() -> Self {
        Self {
            enemy_health: 15.0,
            projected_mobile: 40.0,
            scouts: 40,
            split_threshold: 35,
            lead_size: 15,
        }
    }
}

/// Split applied to scout bursts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BurstTuning {
    /// Affordable scouts above which a burst is split along the layout lanes.
    pub split_threshold: u32,
    /// Size of the leading stack of a split burst.
    pub lead_size: u32,
}

impl Default for BurstTuning {
    fn default() -> Self {
        Self {
            split_threshold: 30,
            lead_size: 15,
        }
    }
}

/// Interceptors committed for an enemy mobile point bracket `(above, up_to]`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct StallTier {
    /// Exclusive lower bound of the bracket.
    pub above: f32,
    /// Inclusive upper bound; `None` leaves the bracket open.
    #[serde(default)]
    pub up_to: Option<f32>,
    /// Interceptors to place.
    pub interceptors: u32,
}

impl StallTier {
    /// Reports whether the enemy mobile points fall into the bracket.
    #[must_use]
    pub fn contains(&self, enemy_mobile: f32) -> bool {
        enemy_mobile > self.above && self.up_to.map_or(true, |limit| enemy_mobile <= limit)
    }
}

/// Interceptor stall brackets.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StallTuning {
    /// Brackets checked in order; the first match wins.
    pub tiers: Vec<StallTier>,
}

impl StallTuning {
    /// Interceptors to commit for the enemy mobile points, `0` outside every bracket.
    #[must_use]
    pub fn interceptors_for(&self, enemy_mobile: f32) -> u32 {
        self.tiers
            .iter()
            .find(|tier| tier.contains(enemy_mobile))
            .map_or(0, |tier| tier.interceptors)
    }
}

impl Default for StallTuning {
    fn default() -> Self {
        Self {
            tiers: vec![
                StallTier {
                    above: 10.0,
                    up_to: Some(20.0),
                    interceptors: 1,
                },
                StallTier {
                    above: 20.0,
                    up_to: Some(30.0),
                    interceptors: 3,
                },
                StallTier {
                    above: 40.0,
                    up_to: None,
                    interceptors: 5,
                },
            ],
        }
    }
}

/// Escalation thresholds of the defence template.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefenceTuning {
    /// Affordable turrets above which every turret is upgraded.
    pub turret_upgrade_affordable: u32,
    /// Affordable turrets above which the second upgrade pass runs.
    pub late_turret_upgrade_affordable: u32,
    /// Owned factories above which turret upgrades are unlocked.
    pub turret_upgrade_factories: u32,
    /// Affordable walls above which every owned structure is upgraded.
    pub full_upgrade_walls: u32,
    /// Affordable factories above which the factory block is expanded.
    pub expansion_factories: u32,
    /// Affordable factories kept in hand while expanding.
    pub expansion_reserve: u32,
}

impl Default for DefenceTuning {
    fn default() -> Self {
        Self {
            turret_upgrade_affordable: 4,
            late_turret_upgrade_affordable: 8,
            turret_upgrade_factories: 10,
            full_upgrade_walls: 200,
            expansion_factories: 1,
            expansion_reserve: 2,
        }
    }
}
