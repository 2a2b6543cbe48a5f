//! Character registry boundary.
//!
//! [`CharacterRegistry`] is the seam the pipeline talks to: one read per
//! request ([`CharacterRegistry::fetch`]) and best-effort write-back
//! ([`CharacterRegistry::submit`]) from the reconciler.
//! [`PayloadRegistry`] implements it against a Payload CMS `characters`
//! collection.

pub mod client;
pub mod payload;

pub use client::{CharacterRegistry, RegistryError, SubmitAck};
pub use payload::{PayloadRegistry, RegistryConfig};
