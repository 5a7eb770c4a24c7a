//! Immutable display tree handed to the frontend.
//!
//! A `DisplayNode` is a label plus an ordered list of children. The webview
//! renders it as-is; nothing in here knows about widgets or selection.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::types::Reference;

/// One node of the browsable tree. Built bottom-up, never mutated after that.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DisplayNode {
    pub label: String,
    #[serde(flatten)]
    pub kind: NodeKind,
    pub children: Vec<DisplayNode>,
}

/// What a tree node stands for, with enough payload for the detail panel.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NodeKind {
    /// Fixed grouping root: "Objects", "Types" or "References".
    Section,
    /// One type-name bucket under "Objects".
    Category,
    /// A serialized object, addressable by its path id.
    Object { path_id: i64 },
    /// A declared field type, possibly with nested fields.
    TypeField,
    /// An external reference leaf, carrying the raw record.
    Reference { record: Reference },
    /// Failure marker; the label is the failure cause.
    Error { cause: String },
}

impl DisplayNode {
    /// Leaf node without children.
    pub fn leaf(label: impl Into<String>, kind: NodeKind) -> Self {
        Self::branch(label, kind, Vec::new())
    }

    pub fn branch(label: impl Into<String>, kind: NodeKind, children: Vec<DisplayNode>) -> Self {
        Self {
            label: label.into(),
            kind,
            children,
        }
    }

    /// Failure marker whose label carries the cause.
    pub fn error(cause: &dyn fmt::Display) -> Self {
        let cause = cause.to_string();
        Self {
            label: cause.clone(),
            kind: NodeKind::Error { cause },
            children: Vec::new(),
        }
    }

    /// Prune the tree to branches whose label matches `pattern`.
    ///
    /// A matching node keeps its whole subtree; a non-matching node survives
    /// only if some descendant matches. Sibling order is preserved.
    pub fn retain_matching(&self, pattern: &Regex) -> Option<DisplayNode> {
        if pattern.is_match(&self.label) {
            return Some(self.clone());
        }

        let kept: Vec<DisplayNode> = self
            .children
            .iter()
            .filter_map(|child| child.retain_matching(pattern))
            .collect();

        if kept.is_empty() {
            None
        } else {
            Some(DisplayNode {
                label: self.label.clone(),
                kind: self.kind.clone(),
                children: kept,
            })
        }
    }
}
