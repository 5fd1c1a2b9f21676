//! # Nameforge
//!
//! A proof-of-work registry for scarce human-readable names.
//!
//! ## Architecture
//!
//! Claiming a name requires a proof of computational work whose difficulty
//! is continuously retargeted to hold the registry-wide claim cadence at one
//! claim per ten minutes. Each claimed name then moves through a
//! time-derived lifecycle: Active, a post-expiry grace period reserved for
//! the owner, and finally a repossession auction whose extra difficulty
//! decays back to the base cost.
//!
//! Components:
//! - **proof**: commitment digest binding (name, owner, miner, nonce)
//! - **difficulty**: per-name difficulty model + rolling-window retargeting
//! - **lifecycle**: lazy, timer-free state resolution and auction decay
//! - **registry**: orchestration, records, deposits, events
//!
//! ## Security Model
//!
//! - The miner identity is bound into the proof digest, so a solved nonce
//!   is valid only for the exact (name, owner, miner) tuple it was found
//!   under
//! - Short and digits-only names carry additive difficulty weights
//! - Renewal difficulty is punitive to discourage indefinite squatting

#![forbid(unsafe_code)]
#![deny(clippy::all, rust_2018_idioms)]
#![warn(clippy::pedantic, clippy::nursery, missing_docs)]
#![allow(
    clippy::module_name_repetitions,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::too_many_lines,
    clippy::too_many_arguments,
    // Intentional numeric casts - difficulty bits and timing are bounded
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss,
    clippy::cast_lossless,
    // Const fn not always beneficial for complex types
    clippy::missing_const_for_fn,
    // Self methods kept for API consistency even if unused
    clippy::unused_self,
    // must_use on every fn is excessive
    clippy::must_use_candidate,
    // Pass by value is fine for small Copy types
    clippy::needless_pass_by_value,
    // Field naming matches domain terminology
    clippy::struct_field_names,
    // Match arms with same body are sometimes clearer separate
    clippy::match_same_arms
)]

pub mod config;
pub mod crypto;
pub mod difficulty;
pub mod lifecycle;
pub mod proof;
pub mod registry;
pub mod types;

pub use config::RegistryConfig;
pub use crypto::{hash_data, Hash};
pub use difficulty::{difficulty_bits, target_from_bits, DifficultyEngine};
pub use lifecycle::{auction_extra_bits, renewal_bits, resolve_state, LifecycleState};
pub use proof::{ProofVerifier, Sha3Verifier, Target};
pub use registry::{
    ClaimRequest, MetadataRenderer, NameRecord, Registry, RegistryError, RegistryEvent,
    ValueOutlet,
};
pub use types::{Amount, Identity, Name, SurrogateId, Timestamp};

/// Protocol version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Desired interval between successful claims, in seconds (10 minutes)
pub const TARGET_CLAIM_INTERVAL_SECS: i64 = 600;

/// Seconds in one day
pub const DAY_SECS: i64 = 24 * 60 * 60;

/// Seconds in one registration year (365 days)
pub const YEAR_SECS: i64 = 365 * DAY_SECS;
