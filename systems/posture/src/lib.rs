#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Ordered rule table that maps battlefield features to a turn posture.

use lane_defence_core::{
    tuning::{PostureTuning, RushTuning},
    Posture, Side, UnitType,
};
use lane_defence_system_assessor::{Features, FlankHealth};
use rand::Rng;
use tracing::debug;

/// Stage of the match the selector is in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Neutral opening layout.
    Opening,
    /// The turn the defence commits to a flank.
    Commit,
    /// Every later turn.
    Steady,
}

/// Quantities the posture rules are evaluated against.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PostureInputs {
    /// Turn being planned.
    pub turn: u32,
    /// Opponent health pool.
    pub enemy_health: f32,
    /// Mobile points expected next turn, including factory income.
    pub projected_mobile: f32,
    /// Scouts affordable right now.
    pub affordable_scouts: u32,
    /// Enemy structure health outside the centre strip.
    pub enemy_structure_health: f32,
}

impl PostureInputs {
    /// Extracts the rule inputs from assessed features.
    #[must_use]
    pub fn from_features(features: &Features) -> Self {
        Self {
            turn: features.turn,
            enemy_health: features.enemy_health,
            projected_mobile: features.projected_mobile,
            affordable_scouts: features.affordable.get(UnitType::Scout),
            enemy_structure_health: features.enemy_structure_health(),
        }
    }
}

/// Named predicate mapping to a posture.
#[derive(Clone, Copy)]
pub struct Rule {
    /// Name reported alongside the chosen posture.
    pub name: &'static str,
    /// Posture chosen when the rule matches.
    pub posture: Posture,
    applies: fn(&PostureInputs, &PostureSelector) -> bool,
}

impl Rule {
    /// Reports whether the rule matches the inputs.
    #[must_use]
    pub fn matches(&self, inputs: &PostureInputs, selector: &PostureSelector) -> bool {
        (self.applies)(inputs, selector)
    }
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.name)
            .field("posture", &self.posture)
            .finish()
    }
}

/// Rules in evaluation order; the first match wins.
pub static RULES: [Rule; 7] = [
    Rule {
        name: "opening",
        posture: Posture::StartingDefense,
        applies: |inputs, selector| inputs.turn < selector.posture.opening_turns,
    },
    Rule {
        name: "commit",
        posture: Posture::InitialCommit,
        applies: |inputs, selector| inputs.turn == selector.posture.commit_turn,
    },
    Rule {
        name: "low-health-rush",
        posture: Posture::LowHealthRush,
        applies: |inputs, selector| {
            inputs.enemy_health <= selector.rush.enemy_health
                || inputs.projected_mobile > selector.rush.projected_mobile
                || inputs.affordable_scouts > selector.rush.scouts
        },
    },
    Rule {
        name: "attack-cadence",
        posture: Posture::MainAttack,
        applies: |inputs, selector| {
            (inputs.turn > selector.posture.cadence_after_turn && inputs.turn % 2 == 1)
                || inputs.affordable_scouts > selector.posture.flush_scouts
        },
    },
    Rule {
        name: "early-attack",
        posture: Posture::MainAttack,
        applies: |inputs, selector| inputs.turn < selector.posture.early_attack_before_turn,
    },
    Rule {
        name: "weak-structures",
        posture: Posture::ScoutAttack,
        applies: |inputs, selector| {
            inputs.enemy_structure_health < selector.posture.weak_structure_health
        },
    },
    Rule {
        name: "stall",
        posture: Posture::InterceptorStall,
        applies: |_, _| true,
    },
];

/// Outcome of a posture selection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Decision {
    /// Chosen posture.
    pub posture: Posture,
    /// Name of the rule that matched.
    pub rule: &'static str,
    /// Flank chosen when the posture commits the defence.
    pub commit: Option<Side>,
}

/// Posture state machine driven by [`RULES`].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PostureSelector {
    posture: PostureTuning,
    rush: RushTuning,
}

impl PostureSelector {
    /// Creates a selector with the provided thresholds.
    #[must_use]
    pub const fn new(posture: PostureTuning, rush: RushTuning) -> Self {
        Self { posture, rush }
    }

    /// Phase of the match for the provided turn.
    #[must_use]
    pub const fn phase(&self, turn: u32) -> Phase {
        if turn < self.posture.opening_turns {
            Phase::Opening
        } else if turn == self.posture.commit_turn {
            Phase::Commit
        } else {
            Phase::Steady
        }
    }

    /// Evaluates the rule table top to bottom.
    ///
    /// The random source is only consulted when the commit rule matches and
    /// both enemy flanks are equally healthy.
    pub fn select<R>(&self, inputs: &PostureInputs, flanks: FlankHealth, rng: &mut R) -> Decision
    where
        R: Rng + ?Sized,
    {
        let rule = RULES
            .iter()
            .find(|rule| rule.matches(inputs, self))
            .unwrap_or(&RULES[RULES.len() - 1]);

        let commit = (rule.posture == Posture::InitialCommit).then(|| commit_side(flanks, rng));
        debug!(
            turn = inputs.turn,
            rule = rule.name,
            posture = %rule.posture,
            "posture rule matched"
        );

        Decision {
            posture: rule.posture,
            rule: rule.name,
            commit,
        }
    }
}

/// Flank the defence commits to: the strictly weaker enemy flank, or a fair
/// coin flip when both are equal.
pub fn commit_side<R>(flanks: FlankHealth, rng: &mut R) -> Side
where
    R: Rng + ?Sized,
{
    flanks.weaker().unwrap_or_else(|| {
        if rng.gen_bool(0.5) {
            Side::Left
        } else {
            Side::Right
        }
    })
}
