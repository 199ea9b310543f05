//! Observatory identities and their clock-chain specifications.
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`record`] | [`ObservatoryRecord`], [`ClockLinkSpec`], [`SiteCodes`] |
//! | [`entry`] | Declarative input ([`ObservatoryEntry`]) and its conversion to records |
//! | [`registry`] | [`ObservatoryRegistry`]: alias resolution and uniqueness checks |

pub mod entry;
pub mod record;
pub mod registry;

pub use entry::{ClockLinkEntry, ClockSourceEntry, GeodeticEntry, ObservatoryEntry, Provenance};
pub use record::{ClockLinkSpec, ObservatoryRecord, SiteCodes};
pub use registry::ObservatoryRegistry;

/// Case-folded form used for identities and aliases.
///
/// Upper-casing first folds characters whose upper case expands, so `ß` and
/// `SS` land on the same key.
pub(crate) fn normalize_name(name: &str) -> String {
    name.trim().to_uppercase().to_lowercase()
}
