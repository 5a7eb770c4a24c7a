//! A lazily-loaded container node.
//!
//! The node loads its container once, on first expansion, and serves the
//! built display tree from memory afterwards. A failed load is just as final
//! as a successful one: the node shows a single error marker and never
//! retries.

use log::warn;

use super::classify::classify;
use super::display::{DisplayNode, NodeKind};
use super::error::LoadError;
use super::project::{project, FieldTypeOrder};
use super::refs::collect;
use super::service::{AssetSource, ContainerOpener};
use super::types::{BundleEntry, ContainerHandle, Header, StructRecord};
use std::path::PathBuf;

/// Lifecycle phase of a node. Transitions run Unloaded -> Loaded or
/// Unloaded -> Failed, exactly once, and never back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadPhase {
    Unloaded,
    Loaded,
    Failed,
}

#[derive(Debug)]
enum LoadState {
    Unloaded,
    Loaded {
        handle: ContainerHandle,
        children: Vec<DisplayNode>,
    },
    Failed {
        marker: DisplayNode,
    },
}

/// One container in the browser tree.
#[derive(Debug)]
pub struct AssetNode {
    source: AssetSource,
    order: FieldTypeOrder,
    state: LoadState,
}

impl AssetNode {
    /// Node backed by a container file on disk.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self::new(AssetSource::Path(path.into()))
    }

    /// Node backed by a buffered entry of a larger bundle.
    pub fn from_entry(entry: BundleEntry) -> Self {
        Self::new(AssetSource::Entry(entry))
    }

    fn new(source: AssetSource) -> Self {
        Self {
            source,
            order: FieldTypeOrder,
            state: LoadState::Unloaded,
        }
    }

    pub fn label(&self) -> String {
        self.source.label()
    }

    pub fn phase(&self) -> LoadPhase {
        match self.state {
            LoadState::Unloaded => LoadPhase::Unloaded,
            LoadState::Loaded { .. } => LoadPhase::Loaded,
            LoadState::Failed { .. } => LoadPhase::Failed,
        }
    }

    /// Guarded load-on-first-expansion. Acts once; later calls return the
    /// already-built tree. A load failure becomes a single error marker and
    /// a warning in the log, never an error to the caller.
    pub fn expand(&mut self, opener: &dyn ContainerOpener) -> &[DisplayNode] {
        if let LoadState::Unloaded = self.state {
            self.state = match self.load(opener) {
                Ok((handle, children)) => LoadState::Loaded { handle, children },
                Err(err) => {
                    warn!("can't load container {}: {err}", self.source.label());
                    LoadState::Failed {
                        marker: DisplayNode::error(&err),
                    }
                }
            };
        }
        self.children()
    }

    fn load(
        &self,
        opener: &dyn ContainerOpener,
    ) -> Result<(ContainerHandle, Vec<DisplayNode>), LoadError> {
        let handle = match &self.source {
            AssetSource::Path(path) => opener.open_path(path)?,
            AssetSource::Entry(entry) => opener.open_entry(entry)?,
        };

        let mut children = Vec::new();

        if !handle.is_standalone() {
            if let Some(tree) = handle.type_tree() {
                let fragments = project(tree, &self.order);
                if !fragments.is_empty() {
                    children.push(DisplayNode::branch("Types", NodeKind::Section, fragments));
                }
            }
        }

        children.push(classify(handle.objects()));

        if let Some(references) = collect(handle.references()) {
            children.push(references);
        }

        Ok((handle, children))
    }

    /// Display children built so far: empty before expansion, the projected
    /// tree after a successful load, a single error marker after a failure.
    pub fn children(&self) -> &[DisplayNode] {
        match &self.state {
            LoadState::Unloaded => &[],
            LoadState::Loaded { children, .. } => children,
            LoadState::Failed { marker } => std::slice::from_ref(marker),
        }
    }

    /// Header of the loaded container; `None` before load and after failure.
    pub fn header(&self) -> Option<&Header> {
        match &self.state {
            LoadState::Loaded { handle, .. } => Some(handle.header()),
            _ => None,
        }
    }

    /// Opaque payload of one loaded object, by path id.
    pub fn object_payload(&self, path_id: i64) -> Option<&[u8]> {
        match &self.state {
            LoadState::Loaded { handle, .. } => handle
                .objects()
                .iter()
                .find(|record| record.path_id() == path_id)
                .map(|record| record.payload()),
            _ => None,
        }
    }

    /// Raw structural records backing this node: the bundle-entry record when
    /// the node came from a bundle, then the header once loaded. Before the
    /// load completes the header slot is simply absent.
    pub fn export_structs(&self) -> Vec<StructRecord> {
        let mut structs = Vec::new();
        if let AssetSource::Entry(entry) = &self.source {
            structs.push(StructRecord::BundleEntry(entry.info.clone()));
        }
        if let Some(header) = self.header() {
            structs.push(StructRecord::Header(header.clone()));
        }
        structs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::types::{
        EntryInfo, FieldTypeNode, ObjectRecord, Reference, TypeTree,
    };
    use std::collections::BTreeMap;
    use std::io;
    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};

    // ============ Fixtures ============

    fn header() -> Header {
        Header {
            metadata_size: 64,
            file_size: 1024,
            format_revision: 17,
            data_offset: 256,
            big_endian: false,
        }
    }

    /// Opener that builds a fresh handle per call and counts invocations.
    struct FixtureOpener {
        build: Box<dyn Fn() -> Result<ContainerHandle, LoadError> + Send + Sync>,
        calls: AtomicUsize,
    }

    impl FixtureOpener {
        fn new(
            build: impl Fn() -> Result<ContainerHandle, LoadError> + Send + Sync + 'static,
        ) -> Self {
            Self {
                build: Box::new(build),
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl ContainerOpener for FixtureOpener {
        fn open_path(&self, _path: &Path) -> Result<ContainerHandle, LoadError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            (self.build)()
        }

        fn open_entry(&self, _entry: &BundleEntry) -> Result<ContainerHandle, LoadError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            (self.build)()
        }
    }

    fn mixed_container() -> ContainerHandle {
        let mut fields = BTreeMap::new();
        fields.insert(1, FieldTypeNode::new("AudioClip", "Base"));
        fields.insert(2, FieldTypeNode::new("Behaviour", "Base"));

        ContainerHandle::new(
            header(),
            Some(TypeTree { fields }),
            vec![
                ObjectRecord::new(1, "Foo", Vec::new()),
                ObjectRecord::new(2, "Bar", Vec::new()),
                ObjectRecord::malformed(3, "bad per-object type tree", Vec::new()),
            ],
            Vec::new(),
        )
    }

    fn entry() -> BundleEntry {
        BundleEntry {
            info: EntryInfo {
                name: "CAB-77aa".to_string(),
                offset: 128,
                size: 512,
            },
            data: vec![0xde, 0xad],
        }
    }

    // ============ Tree shape ============

    #[test]
    fn test_mixed_container_tree_shape() {
        let opener = FixtureOpener::new(|| Ok(mixed_container()));
        let mut node = AssetNode::from_path("/data/level1.assets");

        let children = node.expand(&opener);

        // Types (non-standalone, non-empty), Objects, no References.
        assert_eq!(children.len(), 2);

        let types = &children[0];
        assert_eq!(types.label, "Types");
        let type_labels: Vec<&str> = types.children.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(type_labels, vec!["AudioClip Base", "Behaviour Base"]);

        let objects = &children[1];
        assert_eq!(objects.label, "Objects");
        // Bar before Foo, then the error leaf for object #3.
        assert_eq!(objects.children.len(), 3);
        assert_eq!(objects.children[0].label, "Bar");
        assert_eq!(objects.children[1].label, "Foo");
        assert_eq!(objects.children[1].children.len(), 1);
        assert!(matches!(objects.children[2].kind, NodeKind::Error { .. }));

        assert_eq!(node.phase(), LoadPhase::Loaded);
    }

    #[test]
    fn test_standalone_container_has_no_types_root() {
        let opener = FixtureOpener::new(|| {
            Ok(ContainerHandle::new(
                header(),
                None,
                vec![ObjectRecord::new(1, "Foo", Vec::new())],
                Vec::new(),
            ))
        });
        let mut node = AssetNode::from_path("/data/standalone.assets");

        let children = node.expand(&opener);
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].label, "Objects");
    }

    #[test]
    fn test_empty_type_tree_omits_types_root() {
        let opener = FixtureOpener::new(|| {
            Ok(ContainerHandle::new(
                header(),
                Some(TypeTree::default()),
                Vec::new(),
                Vec::new(),
            ))
        });
        let mut node = AssetNode::from_path("/data/empty-types.assets");

        let children = node.expand(&opener);
        // Objects root stays even with zero objects; Types root does not.
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].label, "Objects");
        assert!(children[0].children.is_empty());
    }

    #[test]
    fn test_references_present_when_non_empty() {
        let opener = FixtureOpener::new(|| {
            Ok(ContainerHandle::new(
                header(),
                None,
                Vec::new(),
                vec![Reference {
                    guid: "0000".to_string(),
                    file_path: "shared.assets".to_string(),
                    ref_kind: 0,
                }],
            ))
        });
        let mut node = AssetNode::from_path("/data/with-refs.assets");

        let children = node.expand(&opener);
        assert_eq!(children.len(), 2);
        assert_eq!(children[1].label, "References");
        assert_eq!(children[1].children.len(), 1);
    }

    // ============ Lifecycle ============

    #[test]
    fn test_expand_is_idempotent() {
        let opener = FixtureOpener::new(|| Ok(mixed_container()));
        let mut node = AssetNode::from_path("/data/level1.assets");

        let first = node.expand(&opener).to_vec();
        let second = node.expand(&opener).to_vec();

        assert_eq!(first, second);
        assert_eq!(opener.calls(), 1);
    }

    #[test]
    fn test_failed_load_yields_single_marker_and_no_retry() {
        let opener = FixtureOpener::new(|| {
            Err(LoadError::Io(io::Error::new(
                io::ErrorKind::NotFound,
                "no such file",
            )))
        });
        let mut node = AssetNode::from_path("/data/missing.assets");

        let children = node.expand(&opener).to_vec();
        assert_eq!(children.len(), 1);
        assert!(matches!(children[0].kind, NodeKind::Error { .. }));
        assert!(children[0].label.contains("no such file"));
        assert!(node.header().is_none());

        // A failed node is final: expanding again does not reopen.
        node.expand(&opener);
        assert_eq!(opener.calls(), 1);
        assert_eq!(node.phase(), LoadPhase::Failed);
    }

    // ============ Struct export ============

    #[test]
    fn test_export_structs_before_load_omits_header() {
        let node = AssetNode::from_entry(entry());
        let structs = node.export_structs();

        // Entry record present, header slot absent until loaded.
        assert_eq!(structs.len(), 1);
        assert_eq!(structs[0], StructRecord::BundleEntry(entry().info));
    }

    #[test]
    fn test_export_structs_after_load_appends_header() {
        let opener = FixtureOpener::new(|| Ok(mixed_container()));
        let mut node = AssetNode::from_entry(entry());
        node.expand(&opener);

        let structs = node.export_structs();
        assert_eq!(structs.len(), 2);
        assert_eq!(structs[0], StructRecord::BundleEntry(entry().info));
        assert_eq!(structs[1], StructRecord::Header(header()));
    }

    #[test]
    fn test_export_structs_for_path_node_before_load_is_empty() {
        let node = AssetNode::from_path("/data/level1.assets");
        assert!(node.export_structs().is_empty());
    }

    // ============ Payload access ============

    #[test]
    fn test_object_payload_by_path_id() {
        let opener = FixtureOpener::new(|| {
            Ok(ContainerHandle::new(
                header(),
                None,
                vec![ObjectRecord::new(7, "Mesh", vec![1, 2, 3])],
                Vec::new(),
            ))
        });
        let mut node = AssetNode::from_path("/data/mesh.assets");

        assert!(node.object_payload(7).is_none());
        node.expand(&opener);
        assert_eq!(node.object_payload(7), Some(&[1u8, 2, 3][..]));
        assert!(node.object_payload(8).is_none());
    }
}
