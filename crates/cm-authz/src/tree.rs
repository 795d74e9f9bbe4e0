//! Module Tree
//!
//! The module hierarchy as a forest, plus the two independent id sets the
//! console tracks over it: which branches are expanded and which modules
//! are checked. [`TreeState`] is a plain value; every toggle consumes the
//! state and returns the next one.
//!
//! Checking never cascades. A parent and its children are checked
//! independently.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt::Write;

use cm_common::{EntityId, ModuleNode, ROOT_PARENT_ID};

// ============================================================================
// Forest
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModuleForest {
    roots: Vec<ModuleNode>,
}

impl ModuleForest {
    pub fn new(roots: Vec<ModuleNode>) -> Self {
        Self { roots }
    }

    /// Build from a `getModulesList` payload.
    ///
    /// Nested payloads are taken as-is. A flat payload (no node carries
    /// children) is assembled from parent pointers in list order; nodes
    /// whose parent is absent become roots.
    pub fn from_backend(nodes: Vec<ModuleNode>) -> Self {
        if nodes.iter().any(ModuleNode::has_children) {
            Self::new(nodes)
        } else {
            Self::new(assemble_flat(nodes))
        }
    }

    pub fn roots(&self) -> &[ModuleNode] {
        &self.roots
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    pub fn find(&self, id: EntityId) -> Option<&ModuleNode> {
        fn walk(nodes: &[ModuleNode], id: EntityId) -> Option<&ModuleNode> {
            for node in nodes {
                if node.id == id {
                    return Some(node);
                }
                if let Some(found) = walk(node.child_nodes(), id) {
                    return Some(found);
                }
            }
            None
        }
        walk(&self.roots, id)
    }

    pub fn is_branch(&self, id: EntityId) -> bool {
        self.find(id).is_some_and(ModuleNode::has_children)
    }

    /// Every id, depth-first with parents before their children.
    pub fn flatten_ids(&self) -> Vec<EntityId> {
        let mut ids = Vec::new();
        let mut stack: Vec<&ModuleNode> = self.roots.iter().rev().collect();
        while let Some(node) = stack.pop() {
            ids.push(node.id);
            stack.extend(node.child_nodes().iter().rev());
        }
        ids
    }

    /// Ids of nodes that have children.
    pub fn branch_ids(&self) -> Vec<EntityId> {
        let mut ids = Vec::new();
        let mut stack: Vec<&ModuleNode> = self.roots.iter().rev().collect();
        while let Some(node) = stack.pop() {
            if node.has_children() {
                ids.push(node.id);
            }
            stack.extend(node.child_nodes().iter().rev());
        }
        ids
    }
}

fn assemble_flat(nodes: Vec<ModuleNode>) -> Vec<ModuleNode> {
    let ids: HashSet<EntityId> = nodes.iter().map(|n| n.id).collect();
    let mut children_of: HashMap<EntityId, Vec<usize>> = HashMap::new();
    let mut root_indices = Vec::new();

    for (idx, node) in nodes.iter().enumerate() {
        let attached = node.parent_id != ROOT_PARENT_ID
            && node.parent_id != node.id
            && ids.contains(&node.parent_id);
        if attached {
            children_of.entry(node.parent_id).or_default().push(idx);
        } else {
            root_indices.push(idx);
        }
    }

    let mut placed = vec![false; nodes.len()];
    let mut roots = Vec::new();
    for idx in root_indices {
        roots.push(attach(idx, &nodes, &children_of, &mut placed));
    }
    // Parent cycles leave nodes unreachable from any root.
    for idx in 0..nodes.len() {
        if !placed[idx] {
            roots.push(attach(idx, &nodes, &children_of, &mut placed));
        }
    }
    roots
}

fn attach(
    idx: usize,
    nodes: &[ModuleNode],
    children_of: &HashMap<EntityId, Vec<usize>>,
    placed: &mut [bool],
) -> ModuleNode {
    placed[idx] = true;
    let mut node = nodes[idx].clone();

    let mut children = Vec::new();
    if let Some(kids) = children_of.get(&node.id) {
        for &kid in kids {
            if !placed[kid] {
                children.push(attach(kid, nodes, children_of, placed));
            }
        }
    }
    node.children = (!children.is_empty()).then_some(children);
    node
}

// ============================================================================
// State
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Leaf,
    Branch { expanded: bool },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    Checked,
    Unchecked,
}

impl Selection {
    fn of(checked: bool) -> Self {
        if checked {
            Selection::Checked
        } else {
            Selection::Unchecked
        }
    }
}

/// Expanded and checked ids over a [`ModuleForest`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreeState {
    expanded: BTreeSet<EntityId>,
    checked: BTreeSet<EntityId>,
}

impl TreeState {
    pub fn new() -> Self {
        Self::default()
    }

    /// State right after modules load: the first root is open.
    pub fn initial(forest: &ModuleForest) -> Self {
        let mut state = Self::new();
        if let Some(first) = forest.roots().first().filter(|n| n.has_children()) {
            state.expanded.insert(first.id);
        }
        state
    }

    pub fn with_checked(mut self, ids: impl IntoIterator<Item = EntityId>) -> Self {
        self.checked = ids.into_iter().collect();
        self
    }

    pub fn expanded(&self) -> &BTreeSet<EntityId> {
        &self.expanded
    }

    pub fn checked(&self) -> &BTreeSet<EntityId> {
        &self.checked
    }

    pub fn is_expanded(&self, id: EntityId) -> bool {
        self.expanded.contains(&id)
    }

    pub fn is_checked(&self, id: EntityId) -> bool {
        self.checked.contains(&id)
    }

    /// Open or close a branch. Leaves and unknown ids are left alone.
    pub fn toggle_expanded(mut self, forest: &ModuleForest, id: EntityId) -> Self {
        if forest.is_branch(id) && !self.expanded.remove(&id) {
            self.expanded.insert(id);
        }
        self
    }

    pub fn toggle_checked(mut self, id: EntityId) -> Self {
        if !self.checked.remove(&id) {
            self.checked.insert(id);
        }
        self
    }

    /// A click on the row: branches expand or collapse, leaves check or
    /// uncheck.
    pub fn activate(self, forest: &ModuleForest, id: EntityId) -> Self {
        match forest.find(id) {
            Some(node) if node.has_children() => self.toggle_expanded(forest, id),
            Some(_) => self.toggle_checked(id),
            None => self,
        }
    }

    pub fn expand_all(mut self, forest: &ModuleForest) -> Self {
        self.expanded.extend(forest.branch_ids());
        self
    }

    /// Visible rows in display order. Collapsed branches hide their
    /// descendants.
    pub fn rows(&self, forest: &ModuleForest) -> Vec<TreeRow> {
        let mut rows = Vec::new();
        self.push_rows(forest.roots(), 0, &mut rows);
        rows
    }

    fn push_rows(&self, nodes: &[ModuleNode], depth: usize, rows: &mut Vec<TreeRow>) {
        for node in nodes {
            let kind = if node.has_children() {
                NodeKind::Branch {
                    expanded: self.is_expanded(node.id),
                }
            } else {
                NodeKind::Leaf
            };

            rows.push(TreeRow {
                id: node.id,
                name: node.name.clone(),
                depth,
                kind,
                selection: Selection::of(self.is_checked(node.id)),
            });

            if kind == (NodeKind::Branch { expanded: true }) {
                self.push_rows(node.child_nodes(), depth + 1, rows);
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeRow {
    pub id: EntityId,
    pub name: String,
    pub depth: usize,
    pub kind: NodeKind,
    pub selection: Selection,
}

/// Plain-text tree, one row per line.
pub fn render_rows(rows: &[TreeRow]) -> String {
    let mut out = String::new();
    for row in rows {
        let marker = match row.kind {
            NodeKind::Branch { expanded: true } => '▾',
            NodeKind::Branch { expanded: false } => '▸',
            NodeKind::Leaf => '•',
        };
        let check = match row.selection {
            Selection::Checked => "[x]",
            Selection::Unchecked => "[ ]",
        };
        let _ = writeln!(
            out,
            "{:indent$}{} {} {} #{}",
            "",
            marker,
            check,
            row.name,
            row.id,
            indent = row.depth * 2
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    // 1 ─┬─ 2 ── 4
    //    └─ 3
    // 5
    fn sample() -> ModuleForest {
        ModuleForest::new(vec![
            ModuleNode::new(1, "Admin", 0).with_children(vec![
                ModuleNode::new(2, "Users", 1).with_children(vec![ModuleNode::new(4, "Audit", 2)]),
                ModuleNode::new(3, "Roles", 1),
            ]),
            ModuleNode::new(5, "Reports", 0).with_children(vec![]),
        ])
    }

    #[test]
    fn test_flatten_depth_first() {
        let forest = ModuleForest::new(vec![ModuleNode::new(1, "Root", 0).with_children(vec![
            ModuleNode::new(2, "A", 1).with_children(vec![ModuleNode::new(4, "A1", 2)]),
            ModuleNode::new(3, "B", 1),
        ])]);

        assert_eq!(forest.flatten_ids(), vec![1, 2, 4, 3]);
    }

    #[test]
    fn test_empty_children_is_leaf() {
        let forest = sample();
        assert!(!forest.is_branch(5));
        assert!(forest.is_branch(1));
        assert!(!forest.is_branch(99));
    }

    #[test]
    fn test_flat_list_is_assembled() {
        let flat = vec![
            ModuleNode::new(3, "Roles", 1),
            ModuleNode::new(1, "Admin", 0),
            ModuleNode::new(4, "Audit", 2),
            ModuleNode::new(2, "Users", 1),
            ModuleNode::new(7, "Orphan", 42),
        ];
        let forest = ModuleForest::from_backend(flat);

        let roots: Vec<_> = forest.roots().iter().map(|n| n.id).collect();
        assert_eq!(roots, vec![1, 7]);
        let admin_children: Vec<_> = forest.roots()[0].child_nodes().iter().map(|n| n.id).collect();
        assert_eq!(admin_children, vec![3, 2]);
        assert_eq!(forest.flatten_ids(), vec![1, 3, 2, 4, 7]);
    }

    #[test]
    fn test_flat_list_with_parent_cycle_keeps_every_node() {
        let flat = vec![ModuleNode::new(1, "A", 2), ModuleNode::new(2, "B", 1)];
        let forest = ModuleForest::from_backend(flat);

        let mut ids = forest.flatten_ids();
        ids.sort();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn test_nested_payload_kept_as_is() {
        let nested = sample().roots().to_vec();
        assert_eq!(ModuleForest::from_backend(nested.clone()).roots(), nested.as_slice());
    }

    #[test]
    fn test_initial_expands_first_root() {
        let forest = sample();
        let state = TreeState::initial(&forest);

        assert!(state.is_expanded(1));
        assert_eq!(state.expanded().len(), 1);
        assert!(state.checked().is_empty());
    }

    #[test]
    fn test_expansion_never_changes_selection() {
        let forest = sample();
        let state = TreeState::new().with_checked([2, 3]);

        let next = state.clone().toggle_expanded(&forest, 1).toggle_expanded(&forest, 2);

        assert_eq!(next.checked(), state.checked());
        assert!(next.is_expanded(1));
        assert!(next.is_expanded(2));
    }

    #[test]
    fn test_leaf_expansion_is_noop() {
        let forest = sample();
        let state = TreeState::new();

        assert_eq!(state.clone().toggle_expanded(&forest, 3), state);
        assert_eq!(state.clone().toggle_expanded(&forest, 5), state);
    }

    #[test]
    fn test_checking_parent_does_not_cascade() {
        let forest = sample();
        let state = TreeState::new().with_checked([4]).toggle_checked(1);

        assert!(state.is_checked(1));
        assert!(!state.is_checked(2));
        assert!(!state.is_checked(3));
        assert!(state.is_checked(4));

        let state = state.toggle_checked(1);
        assert!(!state.is_checked(1));
        assert!(state.is_checked(4));
        assert_eq!(forest.flatten_ids().len(), 5);
    }

    #[test]
    fn test_activate_branch_expands_leaf_checks() {
        let forest = sample();
        let state = TreeState::new().activate(&forest, 1).activate(&forest, 3);

        assert!(state.is_expanded(1));
        assert!(!state.is_checked(1));
        assert!(state.is_checked(3));
        assert!(!state.is_expanded(3));
    }

    #[test]
    fn test_rows_hide_collapsed_descendants() {
        let forest = sample();
        let rows = TreeState::initial(&forest).rows(&forest);

        let ids: Vec<_> = rows.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 5]);
        assert_eq!(rows[0].kind, NodeKind::Branch { expanded: true });
        assert_eq!(rows[1].kind, NodeKind::Branch { expanded: false });
        assert_eq!(rows[1].depth, 1);
        assert_eq!(rows[3].kind, NodeKind::Leaf);
    }

    #[test]
    fn test_render_rows() {
        let forest = sample();
        let state = TreeState::new().expand_all(&forest).with_checked([1, 4]);

        let text = render_rows(&state.rows(&forest));
        let expected = "\
▾ [x] Admin #1
  ▾ [ ] Users #2
    • [x] Audit #4
  • [ ] Roles #3
• [ ] Reports #5
";
        assert_eq!(text, expected);
    }
}
