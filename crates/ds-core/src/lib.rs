#![deny(missing_docs)]
#![doc = "Shared types for the decision-space analysis workspace: errors, provenance and canonical JSON."]

pub mod errors;
pub mod hash;
pub mod provenance;
pub mod serde;

pub use errors::{DsError, ErrorInfo};
pub use hash::stable_hash_string;
pub use provenance::{RunProvenance, SchemaVersion};
pub use self::serde::{from_json_slice, to_canonical_json_bytes};
