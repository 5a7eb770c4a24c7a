//! Type Tree Projector: declared field types, deduplicated and totally
//! ordered, converted into display fragments.

use log::debug;
use std::cmp::Ordering;

use super::display::{DisplayNode, NodeKind};
use super::types::{FieldTypeNode, TypeTree};

/// Deterministic total order over field-type nodes.
///
/// Compares type name, then field name, then child count. The same order
/// decides deduplication and sibling ordering, so projected output is stable
/// across runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct FieldTypeOrder;

impl FieldTypeOrder {
    pub fn compare(&self, a: &FieldTypeNode, b: &FieldTypeNode) -> Ordering {
        a.type_name
            .cmp(&b.type_name)
            .then_with(|| a.field_name.cmp(&b.field_name))
            .then_with(|| a.children.len().cmp(&b.children.len()))
    }
}

/// Project the declared field types into sorted, deduplicated fragments.
///
/// Nodes the comparator treats as equal collapse to one fragment. When the
/// collapsed pair was not structurally identical a debug line records the
/// drop, since the comparator's equality is coarser than structural equality.
pub fn project(tree: &TypeTree, order: &FieldTypeOrder) -> Vec<DisplayNode> {
    let mut nodes: Vec<&FieldTypeNode> = tree.fields.values().collect();
    nodes.sort_by(|a, b| order.compare(a, b));
    nodes.dedup_by(|a, b| {
        let equal = order.compare(*a, *b) == Ordering::Equal;
        if equal && *a != *b {
            debug!(
                "dropping declared type {} {}: comparator-equal to a structurally different node",
                a.type_name, a.field_name
            );
        }
        equal
    });

    nodes.into_iter().map(convert_field_type).collect()
}

/// Pure recursive conversion of one field type into a display fragment.
/// Nested fields keep their declared order.
fn convert_field_type(node: &FieldTypeNode) -> DisplayNode {
    DisplayNode::branch(
        format!("{} {}", node.type_name, node.field_name),
        NodeKind::TypeField,
        node.children.iter().map(convert_field_type).collect(),
    )
}
