use std::collections::BTreeMap;

use anyhow::{Context, Result};
use lane_defence_core::{ActionFrame, Player};
use lane_defence_system_turn_controller::{TurnController, TurnReport};
use lane_defence_world::World;
use tracing::warn;

use crate::settings::Settings;

/// Scripted match of the controller against the reference world.
///
/// The opponent never acts on its own; its behaviour is replayed from the
/// provided action frames, which are delivered once the turn they describe
/// has been submitted.
#[derive(Debug)]
pub struct Skirmish {
    world: World,
    controller: TurnController,
    frames: BTreeMap<u32, Vec<ActionFrame>>,
}

impl Skirmish {
    /// Builds the starting board described by the settings.
    pub fn new(settings: &Settings, seed: u64, frames: Vec<ActionFrame>) -> Result<Self> {
        let mut world = World::new(settings.tuning.catalog);
        if let Some(health) = settings.scenario.opponent_health {
            world.set_health(Player::Opponent, health);
        }
        for placement in &settings.scenario.opponent_structures {
            world
                .place(
                    placement.unit,
                    Player::Opponent,
                    placement.position,
                    placement.upgraded,
                )
                .with_context(|| {
                    format!(
                        "cannot place opponent {} at {}",
                        placement.unit, placement.position
                    )
                })?;
        }

        let mut grouped: BTreeMap<u32, Vec<ActionFrame>> = BTreeMap::new();
        for frame in frames {
            grouped.entry(frame.turn).or_default().push(frame);
        }

        Ok(Self {
            world,
            controller: TurnController::new(&settings.tuning, seed),
            frames: grouped,
        })
    }

    /// Reference world the skirmish is played on.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Plays `turns` turns and returns one report per turn.
    pub fn run(&mut self, turns: u32) -> Vec<TurnReport> {
        let mut reports = Vec::new();
        for _ in 0..turns {
            let report = self.controller.play_turn(&mut self.world);
            if let Some(frames) = self.frames.remove(&report.turn) {
                for frame in &frames {
                    self.controller.on_action_frame(frame);
                }
            }
            reports.push(report);
        }
        if let Some(turn) = self.frames.keys().next() {
            warn!(turn, "action frames left unplayed");
        }
        reports
    }
}

/// Parses a JSON array of action frames.
pub fn parse_frames(json: &str) -> Result<Vec<ActionFrame>> {
    serde_json::from_str(json).context("action frames must be a JSON array")
}
