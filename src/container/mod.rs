//! Container projection: lazy load-and-project pipeline for asset containers.
//!
//! A node loads its container once, on first expansion, through the decoder
//! behind `ContainerOpener`, then projects the parsed records into an
//! immutable display tree. One malformed record costs one error leaf, never
//! the whole view.
//!
//! ## Architecture
//!
//! ```text
//! container/
//! ├── mod.rs       - entry point, re-exports
//! ├── display.rs   - DisplayNode value tree + regex filtering
//! ├── types.rs     - decoder-boundary data model
//! ├── error.rs     - LoadError / DecodeError taxonomy
//! ├── service.rs   - ContainerOpener trait, AssetSource variants
//! ├── node.rs      - AssetNode lifecycle: load once, compose, export
//! ├── classify.rs  - objects -> type-name categories ("Objects")
//! ├── project.rs   - declared field types -> sorted fragments ("Types")
//! └── refs.rs      - external references -> leaves ("References")
//! ```
//!
//! Composition order on load: Types (unless the container is standalone),
//! then Objects (always), then References (unless empty).

pub mod classify;
pub mod display;
pub mod error;
pub mod node;
pub mod project;
pub mod refs;
pub mod service;
pub mod types;

pub use classify::classify;
pub use display::{DisplayNode, NodeKind};
pub use error::{DecodeError, LoadError};
pub use node::{AssetNode, LoadPhase};
pub use project::{project, FieldTypeOrder};
pub use refs::collect;
pub use service::{AssetSource, ContainerOpener};
pub use types::{
    BundleEntry, ContainerHandle, EntryInfo, FieldTypeNode, Header, ObjectRecord, Reference,
    StructRecord, TypeTree,
};
