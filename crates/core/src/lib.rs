//! Character-profile generation domain logic.
//!
//! Everything in this crate is a pure, synchronous transform over
//! request-scoped data. Network calls (registry, text-generation provider)
//! and scheduling live in `cast-pipeline`; this crate only decides *what*
//! those calls should carry and how their results are folded back in.
//!
//! Stage order for a single request:
//!
//! 1. [`scene::validate_request`] reject malformed input before any I/O.
//! 2. [`extraction::extract_mentions`] fold scene listings into mentions.
//! 3. [`dedup::deduplicate`] reconcile against the registry snapshot.
//! 4. [`guidance::classify`] / [`guidance::plan_synthesis`] decide who
//!    gets a provider call.
//! 5. [`prompt`] / [`response_parser`] / [`word_limit`] build provider
//!    input and interpret its output.
//! 6. [`assembly::assemble`] produce the final [`result::GenerationResult`].

pub mod assembly;
pub mod character;
pub mod dedup;
pub mod error;
pub mod extraction;
pub mod guidance;
pub mod prompt;
pub mod response_parser;
pub mod result;
pub mod scene;
pub mod types;
pub mod word_limit;
