use crate::tree_builder::TreeNode;
use std::collections::HashSet;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisibleKind<'a> {
    File,
    Dir {
        id: &'a str,
        path: &'a [String],
        is_open: bool,
    },
}

/// One line of the flattened tree as it is currently shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibleRow<'a> {
    pub depth: usize,
    pub name: &'a str,
    pub kind: VisibleKind<'a>,
}

/// Open/closed flags for the directories of one tree, plus the cursor.
///
/// Flags are keyed by the directory's full path, not its display id, so
/// two directories whose ids happen to coincide still fold on their own.
/// They are never touched when an ancestor
/// closes, so reopening the ancestor shows its subtree exactly as it
/// was left. Every directory starts closed.
#[derive(Debug, Default)]
pub struct TreeViewState {
    open_dirs: HashSet<Vec<String>>,
    pub(crate) cursor: usize,
}

impl TreeViewState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self, dir_path: &[String]) -> bool {
        self.open_dirs.contains(dir_path)
    }

    pub fn toggle(&mut self, dir_path: &[String]) {
        if !self.open_dirs.remove(dir_path) {
            self.open_dirs.insert(dir_path.to_vec());
        }
    }

    /// Rows for the root's descendants, skipping the contents of closed
    /// directories.
    pub fn visible_rows<'a>(&self, root: &'a TreeNode) -> Vec<VisibleRow<'a>> {
        let mut rows = Vec::new();
        self.push_visible(root.children(), 0, &mut rows);
        rows
    }

    fn push_visible<'a>(&self, nodes: &'a [TreeNode], depth: usize, rows: &mut Vec<VisibleRow<'a>>) {
        for node in nodes {
            match node {
                TreeNode::File { name } => rows.push(VisibleRow {
                    depth,
                    name,
                    kind: VisibleKind::File,
                }),
                TreeNode::Dir {
                    name,
                    id,
                    path,
                    children,
                } => {
                    let is_open = self.is_open(path);
                    rows.push(VisibleRow {
                        depth,
                        name,
                        kind: VisibleKind::Dir { id, path, is_open },
                    });
                    if is_open {
                        self.push_visible(children, depth + 1, rows);
                    }
                }
            }
        }
    }

    pub fn move_cursor(&mut self, root: &TreeNode, delta: i32) {
        let visible = self.visible_rows(root).len();
        if visible == 0 {
            self.cursor = 0;
            return;
        }
        self.cursor = (self.cursor as i32 + delta).rem_euclid(visible as i32) as usize;
    }

    /// Toggle the directory under the cursor. Files are left alone.
    pub fn toggle_at_cursor(&mut self, root: &TreeNode) {
        let dir_path = match self.visible_rows(root).get(self.cursor) {
            Some(VisibleRow {
                kind: VisibleKind::Dir { id, path, is_open },
                ..
            }) => {
                debug!(id, open = !is_open, "directory toggled");
                path.to_vec()
            }
            _ => return,
        };
        self.toggle(&dir_path);
        self.clamp_cursor(root);
    }

    pub fn clamp_cursor(&mut self, root: &TreeNode) {
        let visible = self.visible_rows(root).len();
        self.cursor = self.cursor.min(visible.saturating_sub(1));
    }
}
