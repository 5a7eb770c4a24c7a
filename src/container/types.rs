//! Data model at the decoder boundary.
//!
//! Everything here is produced by a `ContainerOpener` implementation and
//! consumed read-only by the projection pipeline. Payload bytes are opaque:
//! this crate classifies and orders records, it never interprets them.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::error::DecodeError;

// ============ Header ============

/// Parsed container header, retained by the node for struct export.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Header {
    pub metadata_size: u32,
    pub file_size: u64,
    pub format_revision: u32,
    pub data_offset: u64,
    pub big_endian: bool,
}

// ============ Type tree ============

/// A declared field type: type name, field name, nested fields.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FieldTypeNode {
    pub type_name: String,
    pub field_name: String,
    pub children: Vec<FieldTypeNode>,
}

impl FieldTypeNode {
    pub fn new(type_name: impl Into<String>, field_name: impl Into<String>) -> Self {
        Self::with_children(type_name, field_name, Vec::new())
    }

    pub fn with_children(
        type_name: impl Into<String>,
        field_name: impl Into<String>,
        children: Vec<FieldTypeNode>,
    ) -> Self {
        Self {
            type_name: type_name.into(),
            field_name: field_name.into(),
            children,
        }
    }
}

/// Embedded type definitions, keyed by class id.
///
/// Absent from standalone containers, which resolve types externally.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeTree {
    pub fields: BTreeMap<i64, FieldTypeNode>,
}

impl TypeTree {
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

// ============ Object records ============

/// One serialized entity inside a container.
///
/// The declared type name is resolved lazily and can fail per record when the
/// decoder met a malformed per-object type tree; the payload stays opaque
/// either way.
#[derive(Debug, Clone)]
pub struct ObjectRecord {
    path_id: i64,
    type_name: TypeNameState,
    payload: Vec<u8>,
}

#[derive(Debug, Clone)]
enum TypeNameState {
    Resolved(String),
    Malformed(String),
}

impl ObjectRecord {
    /// Record with a successfully decoded type name.
    pub fn new(path_id: i64, type_name: impl Into<String>, payload: Vec<u8>) -> Self {
        Self {
            path_id,
            type_name: TypeNameState::Resolved(type_name.into()),
            payload,
        }
    }

    /// Record whose per-object type tree failed to decode.
    pub fn malformed(path_id: i64, reason: impl Into<String>, payload: Vec<u8>) -> Self {
        Self {
            path_id,
            type_name: TypeNameState::Malformed(reason.into()),
            payload,
        }
    }

    pub fn path_id(&self) -> i64 {
        self.path_id
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Declared type name, or the decode failure the opener recorded.
    pub fn resolve_type_name(&self) -> Result<&str, DecodeError> {
        match &self.type_name {
            TypeNameState::Resolved(name) => Ok(name),
            TypeNameState::Malformed(reason) => Err(DecodeError::new(self.path_id, reason.clone())),
        }
    }
}

// ============ References ============

/// Pointer to an entity in another container, exposed as-is.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Reference {
    pub guid: String,
    pub file_path: String,
    pub ref_kind: i32,
}

// ============ Bundle entries ============

/// Structural record of one entry inside a bundle file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EntryInfo {
    pub name: String,
    pub offset: u64,
    pub size: u64,
}

/// A bundle entry buffered in memory, usable as a load source.
#[derive(Debug, Clone)]
pub struct BundleEntry {
    pub info: EntryInfo,
    pub data: Vec<u8>,
}

// ============ Struct export ============

/// Raw structural record backing a node, for round-trip tooling.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "struct", rename_all = "snake_case")]
pub enum StructRecord {
    BundleEntry(EntryInfo),
    Header(Header),
}

// ============ Container handle ============

/// Everything a successful load produced. Owned exclusively by one node and
/// dropped with it.
#[derive(Debug)]
pub struct ContainerHandle {
    header: Header,
    type_tree: Option<TypeTree>,
    objects: Vec<ObjectRecord>,
    references: Vec<Reference>,
}

impl ContainerHandle {
    pub fn new(
        header: Header,
        type_tree: Option<TypeTree>,
        objects: Vec<ObjectRecord>,
        references: Vec<Reference>,
    ) -> Self {
        Self {
            header,
            type_tree,
            objects,
            references,
        }
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    /// True when the container carries no embedded type definitions.
    pub fn is_standalone(&self) -> bool {
        self.type_tree.is_none()
    }

    pub fn type_tree(&self) -> Option<&TypeTree> {
        self.type_tree.as_ref()
    }

    /// Object records in parse order.
    pub fn objects(&self) -> &[ObjectRecord] {
        &self.objects
    }

    pub fn references(&self) -> &[Reference] {
        &self.references
    }
}
