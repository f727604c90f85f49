//! History replay and final-tree emission.
//!
//! Replays file change events against a path-keyed node table, inferring
//! directory nodes from their descendants, then emits the live tree as a
//! sorted, nested snapshot. Directories have no events of their own: their
//! lifecycle is derived entirely from the files beneath them.

use crate::tree::node::NodeState;
use crate::types::{ActionKind, FileAction, FileNode, NodeKind};
use std::collections::HashMap;

/// Incremental tree reconstruction over a change event stream.
///
/// The builder owns two structures: a node table keyed by full path, and a
/// parent-path → child-path index appended to exactly once, when a node is
/// first created. Deletions only mark the node table; the index is filtered
/// at emission time. Replay is O(events × depth) and emission is dominated
/// by sorting.
#[derive(Debug, Default)]
pub struct TreeBuilder {
    nodes: HashMap<String, NodeState>,
    children: HashMap<String, Vec<String>>,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replay a newest-first action slice (the extractor's native order).
    ///
    /// Events are applied oldest-first so that later events override
    /// earlier state: a delete lands after the modifications it supersedes,
    /// and a re-add after a delete resurrects the node.
    pub fn replay(&mut self, actions: &[FileAction]) {
        for action in actions.iter().rev() {
            self.apply(action);
        }
    }

    /// Apply a single event. Callers iterating themselves must feed events
    /// oldest-first.
    pub fn apply(&mut self, action: &FileAction) {
        match action.kind {
            ActionKind::Added | ActionKind::Modified => {
                self.touch(&action.path, action.timestamp);
            }
            ActionKind::Deleted => self.mark_deleted(&action.path, action.timestamp),
        }
    }

    fn touch(&mut self, path: &str, timestamp: i64) {
        self.upsert(path, NodeKind::File, timestamp);
        for ancestor in ancestors(path) {
            self.upsert(ancestor, NodeKind::Directory, timestamp);
        }
    }

    /// Create the node if absent, otherwise refresh it. A node that was
    /// previously deleted comes back as a fresh creation: `created_at`
    /// moves to the resurrection timestamp and the deletion mark clears.
    /// The kind of an existing node never changes.
    fn upsert(&mut self, path: &str, kind: NodeKind, timestamp: i64) {
        match self.nodes.get_mut(path) {
            Some(node) => {
                node.last_modified = timestamp;
                if node.deleted_at.take().is_some() {
                    node.created_at = timestamp;
                }
            }
            None => {
                self.nodes
                    .insert(path.to_string(), NodeState::new(kind, timestamp));
                self.children
                    .entry(parent_of(path).to_string())
                    .or_default()
                    .push(path.to_string());
            }
        }
    }

    /// Mark the node at `path` deleted. Ancestor directories are never
    /// touched by a delete; they drop out of the emitted tree on their own
    /// once no live descendant remains.
    fn mark_deleted(&mut self, path: &str, timestamp: i64) {
        if let Some(node) = self.nodes.get_mut(path) {
            node.deleted_at = Some(timestamp);
        }
    }

    /// Look up the working state for a path.
    pub fn node(&self, path: &str) -> Option<&NodeState> {
        self.nodes.get(path)
    }

    /// Emit the final live tree: value copies, lexicographically sorted at
    /// every level. A directory is live only through live descendants;
    /// one with no surviving children is pruned. Emission never mutates the
    /// working state, so repeated snapshots are identical.
    pub fn snapshot(&self) -> Vec<FileNode> {
        let mut roots: Vec<FileNode> = self
            .children
            .get("")
            .map(|paths| paths.iter().filter_map(|p| self.emit(p)).collect())
            .unwrap_or_default();
        roots.sort_by(|a, b| a.path.cmp(&b.path));
        roots
    }

    fn emit(&self, path: &str) -> Option<FileNode> {
        let node = self.nodes.get(path)?;
        if !node.is_live() {
            return None;
        }
        let children = match node.kind {
            // A file path that was later walked as an ancestor keeps its
            // kind and emits no children.
            NodeKind::File => Vec::new(),
            NodeKind::Directory => {
                let mut children: Vec<FileNode> = self
                    .children
                    .get(path)
                    .map(|paths| paths.iter().filter_map(|p| self.emit(p)).collect())
                    .unwrap_or_default();
                if children.is_empty() {
                    return None;
                }
                children.sort_by(|a, b| a.path.cmp(&b.path));
                children
            }
        };
        Some(FileNode {
            path: path.to_string(),
            kind: node.kind,
            children,
            last_modified: node.last_modified,
            created_at: node.created_at,
            deleted_at: None,
        })
    }
}

/// Parent path of `path`, or `""` for a root entry.
fn parent_of(path: &str) -> &str {
    path.rfind('/').map(|i| &path[..i]).unwrap_or("")
}

/// Every proper ancestor directory of `path`, shallowest first.
fn ancestors(path: &str) -> impl Iterator<Item = &str> {
    path.match_indices('/').map(move |(i, _)| &path[..i])
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn action(kind: ActionKind, path: &str, timestamp: i64) -> FileAction {
        FileAction {
            kind,
            path: path.to_string(),
            timestamp,
            author: "tester".to_string(),
            commit_hash: String::new(),
            commit_message: String::new(),
        }
    }

    fn apply_all(builder: &mut TreeBuilder, actions: &[FileAction]) {
        for a in actions {
            builder.apply(a);
        }
    }

    #[test]
    fn ancestor_inference_creates_directory_chain() {
        let mut builder = TreeBuilder::new();
        builder.apply(&action(ActionKind::Added, "a/b/c.txt", 100));

        let roots = builder.snapshot();
        assert_eq!(roots.len(), 1);
        let a = &roots[0];
        assert_eq!(a.path, "a");
        assert_eq!(a.kind, NodeKind::Directory);
        assert_eq!(a.created_at, 100);
        assert_eq!(a.last_modified, 100);

        let ab = &a.children[0];
        assert_eq!(ab.path, "a/b");
        assert_eq!(ab.kind, NodeKind::Directory);
        assert_eq!(ab.children[0].path, "a/b/c.txt");
        assert_eq!(ab.children[0].kind, NodeKind::File);
    }

    #[test]
    fn roots_and_children_are_sorted_lexicographically() {
        let mut builder = TreeBuilder::new();
        apply_all(
            &mut builder,
            &[
                action(ActionKind::Added, "b.txt", 1),
                action(ActionKind::Added, "a.txt", 2),
                action(ActionKind::Added, "src/z.rs", 3),
                action(ActionKind::Added, "src/a.rs", 4),
            ],
        );

        let roots = builder.snapshot();
        let paths: Vec<&str> = roots.iter().map(|n| n.path.as_str()).collect();
        assert_eq!(paths, vec!["a.txt", "b.txt", "src"]);
        let src = &roots[2];
        let children: Vec<&str> = src.children.iter().map(|n| n.path.as_str()).collect();
        assert_eq!(children, vec!["src/a.rs", "src/z.rs"]);
    }

    #[test]
    fn delete_removes_file_from_live_tree() {
        let mut builder = TreeBuilder::new();
        apply_all(
            &mut builder,
            &[
                action(ActionKind::Added, "x.txt", 1),
                action(ActionKind::Deleted, "x.txt", 2),
            ],
        );
        assert!(builder.snapshot().is_empty());
        assert_eq!(builder.node("x.txt").unwrap().deleted_at, Some(2));
    }

    #[test]
    fn resurrection_clears_deletion_and_resets_creation() {
        let mut builder = TreeBuilder::new();
        apply_all(
            &mut builder,
            &[
                action(ActionKind::Added, "x.txt", 1),
                action(ActionKind::Deleted, "x.txt", 2),
                action(ActionKind::Added, "x.txt", 3),
            ],
        );

        let roots = builder.snapshot();
        assert_eq!(roots.len(), 1);
        assert_eq!(roots[0].path, "x.txt");
        assert_eq!(roots[0].created_at, 3);
        assert_eq!(roots[0].last_modified, 3);
        assert_eq!(roots[0].deleted_at, None);
    }

    #[test]
    fn modify_updates_last_modified_but_not_creation() {
        let mut builder = TreeBuilder::new();
        apply_all(
            &mut builder,
            &[
                action(ActionKind::Added, "x.txt", 1),
                action(ActionKind::Modified, "x.txt", 5),
            ],
        );
        let node = builder.node("x.txt").unwrap();
        assert_eq!(node.created_at, 1);
        assert_eq!(node.last_modified, 5);
    }

    #[test]
    fn directory_last_modified_reflects_latest_descendant_touch() {
        let mut builder = TreeBuilder::new();
        apply_all(
            &mut builder,
            &[
                action(ActionKind::Added, "a/b.txt", 1),
                action(ActionKind::Added, "a/c.txt", 7),
            ],
        );
        let a = builder.node("a").unwrap();
        assert_eq!(a.created_at, 1);
        assert_eq!(a.last_modified, 7);
    }

    #[test]
    fn directory_with_no_live_children_is_pruned() {
        let mut builder = TreeBuilder::new();
        apply_all(
            &mut builder,
            &[
                action(ActionKind::Added, "a/x.txt", 1),
                action(ActionKind::Deleted, "a/x.txt", 2),
            ],
        );
        assert!(builder.snapshot().is_empty());
    }

    #[test]
    fn pruned_directory_reappears_with_original_creation() {
        let mut builder = TreeBuilder::new();
        apply_all(
            &mut builder,
            &[
                action(ActionKind::Added, "a/x.txt", 1),
                action(ActionKind::Deleted, "a/x.txt", 2),
                action(ActionKind::Added, "a/y.txt", 5),
            ],
        );
        let roots = builder.snapshot();
        assert_eq!(roots.len(), 1);
        assert_eq!(roots[0].path, "a");
        assert_eq!(roots[0].created_at, 1);
        assert_eq!(roots[0].last_modified, 5);
        assert_eq!(roots[0].children.len(), 1);
        assert_eq!(roots[0].children[0].path, "a/y.txt");
    }

    #[test]
    fn delete_of_unknown_path_is_ignored() {
        let mut builder = TreeBuilder::new();
        builder.apply(&action(ActionKind::Deleted, "ghost.txt", 9));
        assert!(builder.snapshot().is_empty());
        assert!(builder.node("ghost.txt").is_none());
    }

    #[test]
    fn replay_reverses_newest_first_input() {
        // Newest-first input: the delete must land after the add when
        // replayed, leaving the tree empty.
        let mut builder = TreeBuilder::new();
        builder.replay(&[
            action(ActionKind::Deleted, "x.txt", 2),
            action(ActionKind::Added, "x.txt", 1),
        ]);
        assert!(builder.snapshot().is_empty());
    }

    #[test]
    fn snapshot_is_idempotent() {
        let mut builder = TreeBuilder::new();
        apply_all(
            &mut builder,
            &[
                action(ActionKind::Added, "src/main.rs", 10),
                action(ActionKind::Added, "src/lib.rs", 20),
                action(ActionKind::Deleted, "src/main.rs", 30),
            ],
        );
        assert_eq!(builder.snapshot(), builder.snapshot());
    }

    #[test]
    fn empty_event_sequence_yields_empty_tree() {
        assert!(TreeBuilder::new().snapshot().is_empty());
    }

    const PATHS: [&str; 6] = [
        "a.txt",
        "b.txt",
        "lib/core.rs",
        "lib/util/io.rs",
        "lib/util/net.rs",
        "docs/guide.md",
    ];

    fn assert_sorted(nodes: &[FileNode]) {
        for pair in nodes.windows(2) {
            assert!(pair[0].path < pair[1].path, "unsorted: {:?}", pair);
        }
        for node in nodes {
            assert_sorted(&node.children);
        }
    }

    fn collect_files(nodes: &[FileNode], out: &mut Vec<String>) {
        for node in nodes {
            match node.kind {
                NodeKind::File => out.push(node.path.clone()),
                NodeKind::Directory => {
                    assert!(!node.children.is_empty(), "empty directory emitted");
                    collect_files(&node.children, out);
                }
            }
        }
    }

    proptest! {
        /// Any event sequence yields a snapshot that is sorted at every
        /// level, contains exactly the files whose final state is live, and
        /// is stable across repeated emission.
        #[test]
        fn snapshot_matches_final_file_state(
            ops in prop::collection::vec((0usize..PATHS.len(), 0usize..3, 1i64..1_000), 0..48)
        ) {
            let mut builder = TreeBuilder::new();
            let mut live: std::collections::HashMap<&str, bool> =
                std::collections::HashMap::new();

            for (path_idx, kind_idx, timestamp) in ops {
                let path = PATHS[path_idx];
                let kind = match kind_idx {
                    0 => ActionKind::Added,
                    1 => ActionKind::Modified,
                    _ => ActionKind::Deleted,
                };
                builder.apply(&action(kind, path, timestamp));
                match kind {
                    ActionKind::Added | ActionKind::Modified => {
                        live.insert(path, true);
                    }
                    ActionKind::Deleted => {
                        if let Some(state) = live.get_mut(path) {
                            *state = false;
                        }
                    }
                }
            }

            let snapshot = builder.snapshot();
            assert_sorted(&snapshot);
            prop_assert_eq!(&snapshot, &builder.snapshot());

            let mut emitted = Vec::new();
            collect_files(&snapshot, &mut emitted);
            emitted.sort();
            let mut expected: Vec<String> = live
                .iter()
                .filter(|(_, live)| **live)
                .map(|(path, _)| path.to_string())
                .collect();
            expected.sort();
            prop_assert_eq!(emitted, expected);
        }
    }
}
