//! Reference Collector: external references as leaves under one root.

use super::display::{DisplayNode, NodeKind};
use super::types::Reference;

/// Wrap the container's external references under a "References" root,
/// input order preserved. `None` when there are no references; the caller
/// attaches nothing in that case.
pub fn collect(references: &[Reference]) -> Option<DisplayNode> {
    if references.is_empty() {
        return None;
    }

    let children = references
        .iter()
        .map(|reference| {
            let label = if reference.file_path.is_empty() {
                reference.guid.clone()
            } else {
                reference.file_path.clone()
            };
            DisplayNode::leaf(
                label,
                NodeKind::Reference {
                    record: reference.clone(),
                },
            )
        })
        .collect();

    Some(DisplayNode::branch("References", NodeKind::Section, children))
}
