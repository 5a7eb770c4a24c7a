use ignore::WalkBuilder;
use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};
use rayon::prelude::*;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tauri::{Emitter, Manager, State};

mod container;

pub use container::{
    AssetNode, AssetSource, BundleEntry, ContainerHandle, ContainerOpener, DecodeError,
    DisplayNode, EntryInfo, FieldTypeNode, FieldTypeOrder, Header, LoadError, LoadPhase,
    NodeKind, ObjectRecord, Reference, StructRecord, TypeTree,
};

/// File extensions treated as asset containers during a scan.
const CONTAINER_EXTENSIONS: &[&str] = &["assets", "sharedassets", "bundle", "pak", "resource"];

struct WatcherState {
    watcher: Mutex<Option<RecommendedWatcher>>,
}

/// Open nodes, keyed by the id handed to the frontend.
#[derive(Default)]
struct NodeRegistry {
    next_id: u32,
    nodes: HashMap<u32, AssetNode>,
}

impl NodeRegistry {
    fn insert(&mut self, node: AssetNode) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        self.nodes.insert(id, node);
        id
    }
}

struct BrowserState {
    opener: Arc<dyn ContainerOpener>,
    nodes: Mutex<NodeRegistry>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
struct ContainerEntry {
    path: String,
    relative_path: String,
    size: u64,
    extension: String,
}

/// Container extension of a path, when it is one we browse.
fn container_extension(path: &Path) -> Option<String> {
    let ext = path.extension()?.to_str()?.to_lowercase();
    CONTAINER_EXTENSIONS.contains(&ext.as_str()).then_some(ext)
}

/// List asset containers under a directory, sorted by relative path.
#[tauri::command]
fn scan_containers(path: String) -> Result<Vec<ContainerEntry>, String> {
    let root_path = Path::new(&path);
    if !root_path.exists() {
        return Err("Path does not exist".to_string());
    }

    let walker = WalkBuilder::new(&path).standard_filters(true).build();

    let mut candidates = Vec::new();
    for result in walker {
        match result {
            Ok(entry) => {
                let p = entry.path();
                if p.is_dir() {
                    continue;
                }
                if let Some(extension) = container_extension(p) {
                    candidates.push((p.to_path_buf(), extension));
                }
            }
            Err(err) => log::warn!("error walking path: {err}"),
        }
    }

    let mut entries: Vec<ContainerEntry> = candidates
        .par_iter()
        .map(|(p, extension)| {
            let relative = p.strip_prefix(&path).unwrap_or(p.as_path());
            ContainerEntry {
                path: p.to_string_lossy().to_string(),
                relative_path: relative.to_string_lossy().to_string(),
                size: p.metadata().map(|m| m.len()).unwrap_or(0),
                extension: extension.clone(),
            }
        })
        .collect();

    entries.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));

    Ok(entries)
}

/// Register an unloaded node for a container file. Loading happens on the
/// first expand_node call for the returned id.
#[tauri::command]
fn open_container(path: String, state: State<'_, BrowserState>) -> Result<u32, String> {
    let mut registry = state
        .nodes
        .lock()
        .map_err(|_| "Failed to lock node registry")?;
    Ok(registry.insert(AssetNode::from_path(path)))
}

/// Expand a node, loading its container on the first call. Returns the
/// display tree; load failures come back as a single error-marker child.
#[tauri::command]
fn expand_node(id: u32, state: State<'_, BrowserState>) -> Result<Vec<DisplayNode>, String> {
    let opener = state.opener.clone();
    let mut registry = state
        .nodes
        .lock()
        .map_err(|_| "Failed to lock node registry")?;
    let node = registry.nodes.get_mut(&id).ok_or("Unknown node id")?;
    Ok(node.expand(opener.as_ref()).to_vec())
}

/// Header of a loaded node; null before loading and after a failed load.
#[tauri::command]
fn node_header(id: u32, state: State<'_, BrowserState>) -> Result<Option<Header>, String> {
    let registry = state
        .nodes
        .lock()
        .map_err(|_| "Failed to lock node registry")?;
    let node = registry.nodes.get(&id).ok_or("Unknown node id")?;
    Ok(node.header().cloned())
}

/// Structural records backing a node, for round-trip tooling.
#[tauri::command]
fn export_node_structs(
    id: u32,
    state: State<'_, BrowserState>,
) -> Result<Vec<StructRecord>, String> {
    let registry = state
        .nodes
        .lock()
        .map_err(|_| "Failed to lock node registry")?;
    let node = registry.nodes.get(&id).ok_or("Unknown node id")?;
    Ok(node.export_structs())
}

/// Same records as JSON text, for the clipboard and file export.
#[tauri::command]
fn export_structs_json(id: u32, state: State<'_, BrowserState>) -> Result<String, String> {
    let registry = state
        .nodes
        .lock()
        .map_err(|_| "Failed to lock node registry")?;
    let node = registry.nodes.get(&id).ok_or("Unknown node id")?;
    serde_json::to_string_pretty(&node.export_structs()).map_err(|e| e.to_string())
}

/// Prune a node's tree to branches whose labels match a regex. Expands the
/// node first if it has not been expanded yet.
#[tauri::command]
fn filter_tree(
    id: u32,
    pattern: String,
    state: State<'_, BrowserState>,
) -> Result<Vec<DisplayNode>, String> {
    let re = Regex::new(&pattern).map_err(|e| e.to_string())?;
    let opener = state.opener.clone();
    let mut registry = state
        .nodes
        .lock()
        .map_err(|_| "Failed to lock node registry")?;
    let node = registry.nodes.get_mut(&id).ok_or("Unknown node id")?;
    node.expand(opener.as_ref());
    Ok(node
        .children()
        .iter()
        .filter_map(|child| child.retain_matching(&re))
        .collect())
}

/// Drop a node and everything it loaded.
#[tauri::command]
fn close_node(id: u32, state: State<'_, BrowserState>) -> Result<(), String> {
    let mut registry = state
        .nodes
        .lock()
        .map_err(|_| "Failed to lock node registry")?;
    registry.nodes.remove(&id).ok_or("Unknown node id")?;
    Ok(())
}

/// Watch a container file and notify the frontend on changes, so it can
/// offer a reload (a reload opens a fresh node; nodes load at most once).
#[tauri::command]
fn watch_container(
    app: tauri::AppHandle,
    path: String,
    state: State<'_, WatcherState>,
) -> Result<(), String> {
    let mut watcher_guard = state
        .watcher
        .lock()
        .map_err(|_| "Failed to lock watcher state")?;

    // Stop any existing watcher by dropping it
    let _ = watcher_guard.take();

    let app_handle = app.clone();
    let mut watcher = notify::recommended_watcher(move |res: Result<Event, notify::Error>| {
        match res {
            Ok(_) => {
                let _ = app_handle.emit("container-change", ());
            }
            Err(e) => log::warn!("watch error: {e:?}"),
        }
    })
    .map_err(|e| e.to_string())?;

    watcher
        .watch(Path::new(&path), RecursiveMode::NonRecursive)
        .map_err(|e| e.to_string())?;

    *watcher_guard = Some(watcher);

    Ok(())
}

/// Start the browser shell. The embedding binary supplies the
/// engine-specific container decoder.
pub fn run(opener: Arc<dyn ContainerOpener>) {
    let _ = env_logger::try_init();

    tauri::Builder::default()
        .plugin(tauri_plugin_fs::init())
        .plugin(tauri_plugin_dialog::init())
        .plugin(tauri_plugin_opener::init())
        .plugin(tauri_plugin_clipboard_manager::init())
        .setup(move |app| {
            app.manage(WatcherState {
                watcher: Mutex::new(None),
            });
            app.manage(BrowserState {
                opener,
                nodes: Mutex::new(NodeRegistry::default()),
            });
            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            scan_containers,
            open_container,
            expand_node,
            node_header,
            export_node_structs,
            export_structs_json,
            filter_tree,
            close_node,
            watch_container
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
