//! Core domain types for the name registry.

mod amount;
mod identity;
mod name;

pub use amount::Amount;
pub use identity::{Identity, IdentityError};
pub use name::{Name, NameError, MAX_NAME_LEN, MIN_NAME_LEN};

/// Registry timestamp: seconds since the Unix epoch.
///
/// Signed so that intervals can be computed without casts; the registry
/// never produces negative timestamps itself.
pub type Timestamp = i64;

/// Stable numeric handle for a claimed name.
///
/// Bijective with the name while the record is live; freed and reused only
/// after the record becomes reclaimable again.
pub type SurrogateId = u64;
