//! # Org View Model
//!
//! Typed snapshot of the five organization collections consumed by the view
//! composition engine.
//!
//! ## Pipeline
//!
//! ```text
//! SnapshotSource (5 independent fetches)
//!     │
//!     ├──> fan-out / fan-in (all must succeed)
//!     │
//!     ├──> Decoder
//!     │      ├─ unwrap bare array or {data: [...]} envelope
//!     │      ├─ lenient numbers, optional references
//!     │      └─ reject records without an id
//!     │
//!     └──> EntityStore (atomic swap, last good snapshot kept on failure)
//! ```

mod collection;
mod decode;
mod error;
mod reference;
mod store;
mod types;

pub use collection::Collection;
pub use decode::{decode_collection, parse_collection, unwrap_envelope};
pub use error::{ModelError, Result};
pub use reference::EntityRef;
pub use store::{EntityStore, Snapshot, SnapshotSource};
pub use types::{
    Assignment, AssignmentType, BusinessUnit, GeographicalUnit, Location, OrgUnit, Record,
};
