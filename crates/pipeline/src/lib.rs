//! Async orchestration of character-profile generation.
//!
//! [`ProfileGenerator`] runs one request through the pure stages in
//! `cast-core`, calling out to the registry and the text-generation
//! provider where needed. [`ProfileSynthesizer`] owns the bounded,
//! timeout-guarded provider fan-out; [`Reconciler`] owns registry
//! write-back after the response has been produced.

pub mod config;
pub mod generator;
pub mod reconciler;
pub mod synthesizer;

pub use config::GenerationConfig;
pub use generator::ProfileGenerator;
pub use reconciler::{ReconcileJob, Reconciler, ReconcilerHandle};
pub use synthesizer::{ProfileSynthesizer, SynthesisOutcome};
