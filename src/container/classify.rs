//! Object Classifier: parsed objects bucketed by declared type name.

use log::warn;
use std::collections::BTreeMap;

use super::display::{DisplayNode, NodeKind};
use super::types::ObjectRecord;

/// Group object records into type-name categories under an "Objects" root.
///
/// Categories come out ascending by type name (the map is ordered by key);
/// within a category objects keep their parse order. A record whose type
/// fails to resolve becomes an error leaf directly under the root, after the
/// categories, and processing continues with the remaining records. The root
/// is returned even when there are no objects at all.
pub fn classify(objects: &[ObjectRecord]) -> DisplayNode {
    let mut categories: BTreeMap<String, Vec<DisplayNode>> = BTreeMap::new();
    let mut failures: Vec<DisplayNode> = Vec::new();

    for record in objects {
        match record.resolve_type_name() {
            Ok(type_name) => {
                let leaf = DisplayNode::leaf(
                    format!("{} #{}", type_name, record.path_id()),
                    NodeKind::Object {
                        path_id: record.path_id(),
                    },
                );
                categories.entry(type_name.to_string()).or_default().push(leaf);
            }
            Err(err) => {
                warn!("{err}");
                failures.push(DisplayNode::error(&err));
            }
        }
    }

    let mut children: Vec<DisplayNode> = categories
        .into_iter()
        .map(|(type_name, objects)| DisplayNode::branch(type_name, NodeKind::Category, objects))
        .collect();
    children.extend(failures);

    DisplayNode::branch("Objects", NodeKind::Section, children)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(path_id: i64, type_name: &str) -> ObjectRecord {
        ObjectRecord::new(path_id, type_name, Vec::new())
    }

    #[test]
    fn test_empty_input_still_yields_objects_root() {
        let root = classify(&[]);
        assert_eq!(root.label, "Objects");
        assert_eq!(root.kind, NodeKind::Section);
        assert!(root.children.is_empty());
    }

    #[test]
    fn test_categories_sorted_by_type_name_not_parse_order() {
        let objects = vec![
            record(1, "Texture2D"),
            record(2, "Material"),
            record(3, "Shader"),
            record(4, "Material"),
        ];

        let root = classify(&objects);
        let labels: Vec<&str> = root.children.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(labels, vec!["Material", "Shader", "Texture2D"]);
    }

    #[test]
    fn test_objects_keep_parse_order_within_category() {
        let objects = vec![
            record(9, "Material"),
            record(2, "Material"),
            record(5, "Material"),
        ];

        let root = classify(&objects);
        let material = &root.children[0];
        let ids: Vec<i64> = material
            .children
            .iter()
            .map(|leaf| match leaf.kind {
                NodeKind::Object { path_id } => path_id,
                _ => panic!("expected object leaf"),
            })
            .collect();
        assert_eq!(ids, vec![9, 2, 5]);
    }

    #[test]
    fn test_malformed_record_becomes_error_leaf_under_root() {
        let objects = vec![
            record(1, "Material"),
            ObjectRecord::malformed(2, "truncated type tree", Vec::new()),
            record(3, "Material"),
        ];

        let root = classify(&objects);
        // One category plus one error leaf, directly under the root.
        assert_eq!(root.children.len(), 2);
        assert_eq!(root.children[0].label, "Material");
        assert_eq!(root.children[0].children.len(), 2);
        assert!(matches!(root.children[1].kind, NodeKind::Error { .. }));
        assert!(root.children[1].label.contains("#2"));
    }

    #[test]
    fn test_category_count_matches_distinct_resolved_names() {
        let objects = vec![
            record(1, "Mesh"),
            record(2, "Mesh"),
            ObjectRecord::malformed(3, "bad", Vec::new()),
            record(4, "AudioClip"),
            ObjectRecord::malformed(5, "bad", Vec::new()),
        ];

        let root = classify(&objects);
        let categories = root
            .children
            .iter()
            .filter(|c| c.kind == NodeKind::Category)
            .count();
        let errors = root
            .children
            .iter()
            .filter(|c| matches!(c.kind, NodeKind::Error { .. }))
            .count();
        assert_eq!(categories, 2);
        assert_eq!(errors, 2);
    }
}
