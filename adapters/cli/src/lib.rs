#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Skirmish harness that plays the strategy against the reference world.

mod settings;
mod skirmish;

pub use settings::{Scenario, Settings, SettingsError, SETTINGS_VERSION};
pub use skirmish::{parse_frames, Skirmish};
