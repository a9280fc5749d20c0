//! Client tooling for sealbid auctions: phase rendering and scripted scenario runs.

pub mod display;
pub mod scenario;

pub use display::{phase_label, progress_percent, PhaseView};
pub use scenario::{Report, Scenario, ScenarioError};
