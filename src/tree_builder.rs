use indexmap::IndexMap;
use serde::{Deserialize, Deserializer};

/// Id given to the root directory node.
pub const ROOT_DIR_ID: &str = "dir-root";

/// Nested directory listing as supplied by the portal.
///
/// Files and directories keep the order they were supplied in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct DirMapping {
    #[serde(default)]
    pub files: Vec<String>,
    #[serde(default, deserialize_with = "dirs_object_or_empty_array")]
    pub dirs: IndexMap<String, DirMapping>,
}

// An empty dataset is sent as `{"files": [], "dirs": []}`.
fn dirs_object_or_empty_array<'de, D>(
    deserializer: D,
) -> Result<IndexMap<String, DirMapping>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Dirs {
        Object(IndexMap<String, DirMapping>),
        Array(Vec<serde_json::Value>),
    }

    match Dirs::deserialize(deserializer)? {
        Dirs::Object(dirs) => Ok(dirs),
        Dirs::Array(entries) if entries.is_empty() => Ok(IndexMap::new()),
        Dirs::Array(_) => Err(serde::de::Error::custom(
            "`dirs` must be an object keyed by directory name",
        )),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeNode {
    File {
        name: String,
    },
    /// `id` is the stable display identifier; `path` (names from the
    /// root down to this directory) is the unambiguous key.
    Dir {
        name: String,
        id: String,
        path: Vec<String>,
        children: Vec<TreeNode>,
    },
}

impl TreeNode {
    pub fn name(&self) -> &str {
        match self {
            TreeNode::File { name } | TreeNode::Dir { name, .. } => name,
        }
    }

    pub fn children(&self) -> &[TreeNode] {
        match self {
            TreeNode::File { .. } => &[],
            TreeNode::Dir { children, .. } => children,
        }
    }

    /// Total number of nodes in this subtree, including `self`.
    pub fn node_count(&self) -> usize {
        1 + self.children().iter().map(TreeNode::node_count).sum::<usize>()
    }
}

/// Build the renderable tree for `mapping` in a single pass.
///
/// Children of every directory are its files followed by its
/// subdirectories, both in supplied order.
pub fn build_tree(mapping: &DirMapping) -> TreeNode {
    TreeNode::Dir {
        name: String::new(),
        id: ROOT_DIR_ID.to_string(),
        path: Vec::new(),
        children: build_children(mapping, &mut String::new(), &mut Vec::new()),
    }
}

fn build_children(
    mapping: &DirMapping,
    path_key: &mut String,
    path: &mut Vec<String>,
) -> Vec<TreeNode> {
    let mut children = Vec::with_capacity(mapping.files.len() + mapping.dirs.len());
    children.extend(
        mapping
            .files
            .iter()
            .map(|name| TreeNode::File { name: name.clone() }),
    );

    for (name, sub) in &mapping.dirs {
        let parent_len = path_key.len();
        path_key.extend(name.chars().filter(|c| !is_separator(*c)));
        path.push(name.clone());
        children.push(TreeNode::Dir {
            name: name.clone(),
            id: format!("dir-{path_key}"),
            path: path.clone(),
            children: build_children(sub, path_key, path),
        });
        path.pop();
        path_key.truncate(parent_len);
    }
    children
}

fn is_separator(c: char) -> bool {
    c == '/' || c == '\\'
}

/// Box-drawing labels for every node below `root`, one per line, in
/// display order. Directories get a trailing `/`.
pub fn build_tree_labels(root: &TreeNode) -> Vec<String> {
    let mut labels = vec!["./".to_string()];
    push_labels(root.children(), &mut String::new(), &mut labels);
    labels
}

fn push_labels(nodes: &[TreeNode], prefix: &mut String, labels: &mut Vec<String>) {
    for (idx, node) in nodes.iter().enumerate() {
        let is_last = idx + 1 == nodes.len();
        let branch = if is_last { "└─ " } else { "├─ " };
        let name = node.name();
        match node {
            TreeNode::File { .. } => labels.push(format!("{prefix}{branch}{name}")),
            TreeNode::Dir { children, .. } => {
                labels.push(format!("{prefix}{branch}{name}/"));
                let parent_len = prefix.len();
                prefix.push_str(if is_last { "   " } else { "│  " });
                push_labels(children, prefix, labels);
                prefix.truncate(parent_len);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapping(json: &str) -> DirMapping {
        serde_json::from_str(json).expect("valid mapping")
    }

    #[test]
    fn builds_files_then_directories() {
        let tree = build_tree(&mapping(
            r#"{"files": ["a.txt"], "dirs": {"sub": {"files": ["b.txt"], "dirs": {}}}}"#,
        ));

        let expected = TreeNode::Dir {
            name: String::new(),
            id: ROOT_DIR_ID.to_string(),
            path: vec![],
            children: vec![
                TreeNode::File {
                    name: "a.txt".into(),
                },
                TreeNode::Dir {
                    name: "sub".into(),
                    id: "dir-sub".into(),
                    path: vec!["sub".into()],
                    children: vec![TreeNode::File {
                        name: "b.txt".into(),
                    }],
                },
            ],
        };
        assert_eq!(tree, expected);
    }

    #[test]
    fn rebuilding_is_deterministic() {
        let input = mapping(
            r#"{"files": ["x", "y"], "dirs": {"d1": {"files": [], "dirs": {"d2": {"files": ["z"]}}}}}"#,
        );
        assert_eq!(build_tree(&input), build_tree(&input));
    }

    #[test]
    fn keeps_supplied_order_at_every_level() {
        let tree = build_tree(&mapping(
            r#"{
                "files": ["zeta.json", "alpha.json", "Mid.json"],
                "dirs": {
                    "sub-02": {"files": ["b", "a"], "dirs": {}},
                    "sub-01": {"files": [], "dirs": {"ses-2": {}, "ses-1": {}}}
                }
            }"#,
        ));

        let names: Vec<&str> = tree.children().iter().map(TreeNode::name).collect();
        assert_eq!(
            names,
            ["zeta.json", "alpha.json", "Mid.json", "sub-02", "sub-01"]
        );
        let sub02: Vec<&str> = tree.children()[3]
            .children()
            .iter()
            .map(TreeNode::name)
            .collect();
        assert_eq!(sub02, ["b", "a"]);
        let sub01: Vec<&str> = tree.children()[4]
            .children()
            .iter()
            .map(TreeNode::name)
            .collect();
        assert_eq!(sub01, ["ses-2", "ses-1"]);
    }

    #[test]
    fn directory_ids_concatenate_path_without_separators() {
        let tree = build_tree(&mapping(
            r#"{"dirs": {"sub-01": {"dirs": {"ses/1": {"dirs": {"anat": {}}}}}}}"#,
        ));
        let sub = &tree.children()[0];
        let ses = &sub.children()[0];
        let anat = &ses.children()[0];

        let id_of = |node: &TreeNode| match node {
            TreeNode::Dir { id, .. } => id.clone(),
            TreeNode::File { .. } => panic!("expected a directory"),
        };
        assert_eq!(id_of(sub), "dir-sub-01");
        assert_eq!(id_of(ses), "dir-sub-01ses1");
        assert_eq!(id_of(anat), "dir-sub-01ses1anat");
    }

    #[test]
    fn paths_tell_apart_directories_sharing_an_id() {
        let tree = build_tree(&mapping(r#"{"dirs": {"a": {"dirs": {"b": {}}}, "ab": {}}}"#));
        let nested = &tree.children()[0].children()[0];
        let top = &tree.children()[1];

        let (
            TreeNode::Dir {
                id: nested_id,
                path: nested_path,
                ..
            },
            TreeNode::Dir {
                id: top_id,
                path: top_path,
                ..
            },
        ) = (nested, top)
        else {
            panic!("expected directories");
        };
        assert_eq!(nested_id, top_id);
        assert_eq!(nested_path, &["a", "b"]);
        assert_eq!(top_path, &["ab"]);
    }

    #[test]
    fn sibling_directories_get_distinct_ids() {
        let tree = build_tree(&mapping(r#"{"dirs": {"a": {}, "b": {}, "c": {}}}"#));
        let ids: std::collections::HashSet<&str> = tree
            .children()
            .iter()
            .filter_map(|n| match n {
                TreeNode::Dir { id, .. } => Some(id.as_str()),
                TreeNode::File { .. } => None,
            })
            .collect();
        assert_eq!(ids.len(), 3);
    }

    #[test]
    fn accepts_empty_array_for_dirs() {
        let parsed = mapping(r#"{"files": [], "dirs": []}"#);
        assert_eq!(parsed, DirMapping::default());
        assert_eq!(build_tree(&parsed).node_count(), 1);
    }

    #[test]
    fn rejects_non_empty_array_for_dirs() {
        let err = serde_json::from_str::<DirMapping>(r#"{"files": [], "dirs": ["sub"]}"#);
        assert!(err.is_err());
    }

    #[test]
    fn large_tree_counts_every_node() {
        let mut root = DirMapping::default();
        for d in 0..40 {
            let mut sub = DirMapping::default();
            for f in 0..10 {
                sub.files.push(format!("file-{f}.nii.gz"));
            }
            root.dirs.insert(format!("sub-{d:02}"), sub);
        }
        assert_eq!(build_tree(&root).node_count(), 1 + 40 + 400);
    }

    #[test]
    fn labels_draw_branches() {
        let tree = build_tree(&mapping(
            r#"{"files": ["README"], "dirs": {"sub-01": {"files": ["a.nii", "b.nii"]}, "sub-02": {"files": ["c.nii"]}}}"#,
        ));
        assert_eq!(
            build_tree_labels(&tree),
            [
                "./",
                "├─ README",
                "├─ sub-01/",
                "│  ├─ a.nii",
                "│  └─ b.nii",
                "└─ sub-02/",
                "   └─ c.nii",
            ]
        );
    }
}
