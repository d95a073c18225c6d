#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Per-turn orchestration of the strategy systems.
//!
//! The controller owns the match context, captures and assesses the engine
//! state, selects a posture, drives the defence builder and the deployment
//! planner, and always submits the turn.

use lane_defence_core::{
    tuning::{StrategyTuning, UnitCatalog},
    ActionFrame, Command, Engine, Posture, Recorder, Side,
};
use lane_defence_system_assessor::{assess, capture, Features};
use lane_defence_system_defence_builder::DefenceBuilder;
use lane_defence_system_deployment::{DeploymentPlan, DeploymentPlanner, Resolution};
use lane_defence_system_posture::{Decision, PostureInputs, PostureSelector};
use lane_defence_system_spawn_history::SpawnHistory;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use tracing::info;

/// State that lives for one match.
#[derive(Clone, Debug)]
pub struct MatchContext {
    seed: u64,
    rng: ChaCha8Rng,
    history: SpawnHistory,
}

impl MatchContext {
    /// Starts a fresh match context from the provided seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: ChaCha8Rng::seed_from_u64(seed),
            history: SpawnHistory::new(),
        }
    }

    /// Seed the random source was created from.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Action-phase history recorded so far.
    #[must_use]
    pub fn history(&self) -> &SpawnHistory {
        &self.history
    }
}

/// Outcome of one played turn.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TurnReport {
    /// Turn that was played.
    pub turn: u32,
    /// Posture chosen for the turn.
    pub posture: Posture,
    /// Name of the rule that selected the posture.
    pub rule: &'static str,
    /// Flank committed to on the commit turn.
    pub commit: Option<Side>,
    /// Flank the defence template was built on this turn.
    pub layout: Option<Side>,
    /// How the mobile deployment was resolved.
    pub resolution: Resolution,
    /// Mobile units the engine accepted.
    pub deployed: u32,
    /// Every command the engine accepted, in order.
    pub commands: Vec<Command>,
}

/// Drives one match turn by turn.
#[derive(Debug)]
pub struct TurnController {
    catalog: UnitCatalog,
    selector: PostureSelector,
    planner: DeploymentPlanner,
    builder: DefenceBuilder,
    context: MatchContext,
}

impl TurnController {
    /// Creates a controller for a new match.
    #[must_use]
    pub fn new(tuning: &StrategyTuning, seed: u64) -> Self {
        info!(seed, "match context created");
        Self {
            catalog: tuning.catalog,
            selector: PostureSelector::new(tuning.posture, tuning.rush),
            planner: DeploymentPlanner::new(tuning),
            builder: DefenceBuilder::new(tuning),
            context: MatchContext::new(seed),
        }
    }

    /// Match context owned by the controller.
    #[must_use]
    pub fn context(&self) -> &MatchContext {
        &self.context
    }

    /// Feeds an action-phase frame into the spawn history.
    pub fn on_action_frame(&mut self, frame: &ActionFrame) {
        self.context.history.record(frame);
    }

    /// Plays the engine's current turn and submits it.
    pub fn play_turn<E>(&mut self, engine: &mut E) -> TurnReport
    where
        E: Engine + ?Sized,
    {
        let snapshot = capture(engine);
        let features = assess(&snapshot, &self.catalog);
        let inputs = PostureInputs::from_features(&features);
        let decision = self
            .selector
            .select(&inputs, features.enemy_flanks, &mut self.context.rng);

        let mut recorder = Recorder::new(&mut *engine);
        let (plan, layout) = self.act(&mut recorder, &decision, &features);
        let deployed = plan.execute(&mut recorder);
        let commands = recorder.into_commands();
        engine.submit_turn();

        info!(
            turn = features.turn,
            posture = %decision.posture,
            rule = decision.rule,
            ?layout,
            resolution = %plan.resolution,
            deployed,
            commands = commands.len(),
            "turn submitted"
        );

        TurnReport {
            turn: features.turn,
            posture: decision.posture,
            rule: decision.rule,
            commit: decision.commit,
            layout,
            resolution: plan.resolution,
            deployed,
            commands,
        }
    }

    fn act<E>(
        &mut self,
        engine: &mut E,
        decision: &Decision,
        features: &Features,
    ) -> (DeploymentPlan, Option<Side>)
    where
        E: Engine + ?Sized,
    {
        let history = &self.context.history;
        match decision.posture {
            Posture::NoOp => (DeploymentPlan::hold(Resolution::Pass), None),
            Posture::StartingDefense => {
                self.builder.starting_defence(engine);
                let plan = self
                    .planner
                    .plan_interceptor_screen(features, &mut self.context.rng);
                (plan, None)
            }
            Posture::InitialCommit => {
                let side = decision.commit.unwrap_or(Side::Left);
                self.builder.initial_commit(engine, side, features);
                let plan = self.planner.plan_main_attack(engine, features, history);
                (plan, Some(side))
            }
            posture => {
                let side = self
                    .builder
                    .reinforce(engine, features, &mut self.context.rng);
                let plan = match posture {
                    Posture::LowHealthRush => self.planner.plan_rush(engine, features),
                    Posture::ScoutAttack => self.planner.plan_scout_burst(engine, features),
                    Posture::InterceptorStall => {
                        self.planner.plan_stall(engine, features, history)
                    }
                    _ => self.planner.plan_main_attack(engine, features, history),
                };
                (plan, Some(side))
            }
        }
    }
}
