//! Timed execution of the simulated pipeline tracks.

pub mod sequencer;

pub use sequencer::{RunHandle, RunOutcome, StepSequencer};
