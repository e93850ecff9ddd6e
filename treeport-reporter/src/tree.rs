// Copyright (c) The treeport Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! A named tree of test scopes.
//!
//! The tree is rooted at a sentinel node named [`Tree::ROOT_NAME`] with depth 0. Each path segment
//! of a [`ScopePath`] becomes a node one level further down: top-level scopes have depth 1, scopes
//! nested directly within them depth 2, and so on.
//!
//! Children are stored in an [`IndexMap`] keyed by name. That gives constant-time lookup of a
//! child while keeping children in the order they were first inserted, which is the order they
//! are rendered in. Nodes own their children; ancestors are addressed by path rather than through
//! back-pointers.

use crate::{names::ScopePath, reporter::ReportEntry};
use indexmap::{IndexMap, map::Values};
use smol_str::SmolStr;

/// A node in the [`Tree`]: one segment of a qualified scope name.
#[derive(Clone, Debug)]
pub struct Node {
    name: SmolStr,
    depth: usize,
    children: IndexMap<SmolStr, Node>,
    class_summary: Option<ReportEntry>,
    entries: Vec<ReportEntry>,
}

impl Node {
    fn new(name: SmolStr, depth: usize) -> Self {
        Self {
            name,
            depth,
            children: IndexMap::new(),
            class_summary: None,
            entries: Vec::new(),
        }
    }

    /// Returns the name of this node's segment.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the depth of this node. The root has depth 0.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Returns true if this node has any children.
    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Returns the children of this node, in insertion order.
    pub fn children(&self) -> Values<'_, SmolStr, Node> {
        self.children.values()
    }

    /// Returns the child with the given name.
    pub fn child(&self, name: &str) -> Option<&Node> {
        self.children.get(name)
    }

    /// Returns true if this node has a child with the given name.
    pub fn contains_child(&self, name: &str) -> bool {
        self.children.contains_key(name)
    }

    /// Returns the most recently inserted child that is still present.
    pub fn last_child(&self) -> Option<&Node> {
        self.children.last().map(|(_, child)| child)
    }

    /// Returns the summary entry for the scope this node represents, if it has completed.
    pub fn class_summary(&self) -> Option<&ReportEntry> {
        self.class_summary.as_ref()
    }

    /// Sets the summary entry for this scope, replacing any previous summary.
    pub fn set_class_summary(&mut self, entry: ReportEntry) {
        self.class_summary = Some(entry);
    }

    /// Returns the test entries attached directly to this node, in arrival order.
    pub fn entries(&self) -> &[ReportEntry] {
        &self.entries
    }

    /// Appends a test entry to this node.
    pub fn push_entry(&mut self, entry: ReportEntry) {
        self.entries.push(entry);
    }

    fn child_or_insert(&mut self, name: &SmolStr) -> &mut Node {
        let depth = self.depth + 1;
        self.children
            .entry(name.clone())
            .or_insert_with(|| Node::new(name.clone(), depth))
    }

    fn child_mut(&mut self, name: &str) -> Option<&mut Node> {
        self.children.get_mut(name)
    }
}

/// A tree of scopes, owned by a single reporter for the duration of a run.
#[derive(Clone, Debug)]
pub struct Tree {
    root: Node,
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

impl Tree {
    /// The name of the sentinel root node.
    pub const ROOT_NAME: &'static str = "ROOT";

    /// Creates an empty tree.
    pub fn new() -> Self {
        Self {
            root: Node::new(SmolStr::new_static(Self::ROOT_NAME), 0),
        }
    }

    /// Creates a tree holding a single top-level family that was pruned from another tree.
    ///
    /// # Panics
    ///
    /// Panics if `family` is not a top-level node (depth 1).
    pub fn from_family(family: Node) -> Self {
        assert_eq!(
            family.depth, 1,
            "family `{}` is not a top-level node",
            family.name
        );
        let mut tree = Self::new();
        tree.root.children.insert(family.name.clone(), family);
        tree
    }

    /// Returns the root node.
    pub fn root(&self) -> &Node {
        &self.root
    }

    /// Inserts a path into the tree, creating any missing nodes along the way, and returns the
    /// node at the end of the path.
    ///
    /// Inserting a path that already exists returns the existing node.
    pub fn insert(&mut self, path: &ScopePath) -> &mut Node {
        let mut node = &mut self.root;
        for segment in path.segments() {
            node = node.child_or_insert(segment);
        }
        node
    }

    /// Returns the node at `path`, or `None` if any segment is missing.
    ///
    /// The empty path refers to the root.
    pub fn lookup(&self, path: &[SmolStr]) -> Option<&Node> {
        path.iter()
            .try_fold(&self.root, |node, segment| node.child(segment))
    }

    /// Returns a mutable reference to the node at `path`, or `None` if any segment is missing.
    pub fn lookup_mut(&mut self, path: &[SmolStr]) -> Option<&mut Node> {
        path.iter()
            .try_fold(&mut self.root, |node, segment| node.child_mut(segment))
    }

    /// Returns the nearest proper ancestor of the node at `path` whose name is `name`.
    ///
    /// Returns `None` if the node at `path` doesn't exist or no ancestor matches. The root is
    /// considered an ancestor of every other node.
    pub fn ancestor_named(&self, path: &[SmolStr], name: &str) -> Option<&Node> {
        let mut chain = Vec::with_capacity(path.len() + 1);
        let mut node = &self.root;
        chain.push(node);
        for segment in path {
            node = node.child(segment)?;
            chain.push(node);
        }
        // The last element of the chain is the node itself.
        chain.pop();
        chain
            .into_iter()
            .rev()
            .find(|ancestor| ancestor.name.as_str() == name)
    }

    /// Detaches the node at `path`, along with its subtree, and returns it.
    ///
    /// The order of the remaining siblings is preserved. Returns `None` if the node doesn't
    /// exist; the root itself cannot be pruned.
    pub fn prune(&mut self, path: &[SmolStr]) -> Option<Node> {
        let (name, parent_path) = path.split_last()?;
        self.lookup_mut(parent_path)?.children.shift_remove(name)
    }

    /// Removes every node apart from the root.
    pub fn clear(&mut self) {
        self.root.children.clear();
    }
}
