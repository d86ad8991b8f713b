//! Regression tree storage (SoA) and the mutable builder used while growing.
//!
//! This module provides:
//! - [`Tree`]: Immutable SoA tree storage for traversal
//! - [`MutableTree`]: Builder for constructing trees during training
//! - [`TreeView`]: Read-only trait shared by both
//! - [`TreeValidationError`]: Structural validation errors

use super::NodeId;

// ============================================================================
// TreeView Trait
// ============================================================================

/// Read-only view of a tree for traversal.
///
/// Implemented for both [`Tree`] and [`MutableTree`], so prediction code can
/// run on a tree that is still being grown.
pub trait TreeView {
    /// Number of nodes in the tree.
    fn n_nodes(&self) -> usize;

    /// Check if a node is a leaf.
    fn is_leaf(&self, node: NodeId) -> bool;

    /// Feature index for a split node.
    fn split_index(&self, node: NodeId) -> u32;

    /// Split threshold. Values strictly below go left.
    fn split_threshold(&self, node: NodeId) -> f32;

    fn left_child(&self, node: NodeId) -> NodeId;

    fn right_child(&self, node: NodeId) -> NodeId;

    /// Leaf value at a leaf node.
    fn leaf_value(&self, node: NodeId) -> f32;

    /// Traverse from the root to the leaf reached by `features`.
    ///
    /// Features are indexed in schema order. A NaN feature fails every
    /// `value < threshold` test and therefore goes right.
    #[inline]
    fn traverse_to_leaf(&self, features: &[f32]) -> NodeId {
        let mut node = 0;
        while !self.is_leaf(node) {
            let fvalue = features[self.split_index(node) as usize];
            node = if fvalue < self.split_threshold(node) {
                self.left_child(node)
            } else {
                self.right_child(node)
            };
        }
        node
    }

    /// Predict a single row.
    #[inline]
    fn predict_row(&self, features: &[f32]) -> f32 {
        self.leaf_value(self.traverse_to_leaf(features))
    }

    /// Depth of the deepest leaf (root only = 0).
    fn depth(&self) -> usize {
        let mut max_depth = 0;
        let mut stack = vec![(0 as NodeId, 0usize)];
        while let Some((node, depth)) = stack.pop() {
            if self.is_leaf(node) {
                max_depth = max_depth.max(depth);
            } else {
                stack.push((self.left_child(node), depth + 1));
                stack.push((self.right_child(node), depth + 1));
            }
        }
        max_depth
    }
}

// ============================================================================
// TreeValidationError
// ============================================================================

/// Structural validation errors for [`Tree`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeValidationError {
    /// Tree has no nodes.
    EmptyTree,
    /// A child pointer references an out-of-bounds node.
    ChildOutOfBounds { node: NodeId, child: NodeId, n_nodes: usize },
    /// A node was reached twice (shared child or cycle).
    DuplicateVisit { node: NodeId },
    /// A node exists in storage but is unreachable from the root.
    UnreachableNode { node: NodeId },
}

// ============================================================================
// Tree
// ============================================================================

/// Structure-of-Arrays tree storage.
///
/// Child indices are local to this tree (0 = root).
#[derive(Debug, Clone)]
pub struct Tree {
    split_indices: Box<[u32]>,
    split_thresholds: Box<[f32]>,
    left_children: Box<[u32]>,
    right_children: Box<[u32]>,
    is_leaf: Box<[bool]>,
    leaf_values: Box<[f32]>,
    /// Weighted squared-error decrease at each split node (0 for leaves).
    gains: Box<[f32]>,
    /// Weighted number of training rows reaching each node.
    covers: Box<[f32]>,
}

impl Tree {
    /// Number of leaves.
    pub fn n_leaves(&self) -> usize {
        self.is_leaf.iter().filter(|&&l| l).count()
    }

    /// Per-node split gains. Leaves have gain 0.
    pub fn gains(&self) -> &[f32] {
        &self.gains
    }

    /// Per-node weighted sample counts.
    pub fn covers(&self) -> &[f32] {
        &self.covers
    }

    /// Validate basic structural invariants.
    pub fn validate(&self) -> Result<(), TreeValidationError> {
        let n_nodes = self.n_nodes();
        if n_nodes == 0 {
            return Err(TreeValidationError::EmptyTree);
        }

        let mut seen = vec![false; n_nodes];
        let mut stack: Vec<NodeId> = vec![0];
        while let Some(node) = stack.pop() {
            let idx = node as usize;
            if seen[idx] {
                return Err(TreeValidationError::DuplicateVisit { node });
            }
            seen[idx] = true;

            if !self.is_leaf(node) {
                for child in [self.left_child(node), self.right_child(node)] {
                    if child as usize >= n_nodes {
                        return Err(TreeValidationError::ChildOutOfBounds {
                            node,
                            child,
                            n_nodes,
                        });
                    }
                    stack.push(child);
                }
            }
        }

        match seen.iter().position(|&s| !s) {
            Some(i) => Err(TreeValidationError::UnreachableNode { node: i as NodeId }),
            None => Ok(()),
        }
    }
}

impl TreeView for Tree {
    #[inline]
    fn n_nodes(&self) -> usize {
        self.split_indices.len()
    }

    #[inline]
    fn is_leaf(&self, node: NodeId) -> bool {
        self.is_leaf[node as usize]
    }

    #[inline]
    fn split_index(&self, node: NodeId) -> u32 {
        self.split_indices[node as usize]
    }

    #[inline]
    fn split_threshold(&self, node: NodeId) -> f32 {
        self.split_thresholds[node as usize]
    }

    #[inline]
    fn left_child(&self, node: NodeId) -> NodeId {
        self.left_children[node as usize]
    }

    #[inline]
    fn right_child(&self, node: NodeId) -> NodeId {
        self.right_children[node as usize]
    }

    #[inline]
    fn leaf_value(&self, node: NodeId) -> f32 {
        self.leaf_values[node as usize]
    }
}

// =============================================================================
// MutableTree (training-time construction)
// =============================================================================

/// Mutable tree for use during training.
///
/// Nodes are allocated as placeholders and filled in once the grower decides
/// whether they split or become leaves.
#[derive(Debug, Clone, Default)]
pub struct MutableTree {
    split_indices: Vec<u32>,
    split_thresholds: Vec<f32>,
    left_children: Vec<u32>,
    right_children: Vec<u32>,
    is_leaf: Vec<bool>,
    leaf_values: Vec<f32>,
    gains: Vec<f32>,
    covers: Vec<f32>,
}

impl MutableTree {
    /// Create a tree with capacity hint.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            split_indices: Vec::with_capacity(capacity),
            split_thresholds: Vec::with_capacity(capacity),
            left_children: Vec::with_capacity(capacity),
            right_children: Vec::with_capacity(capacity),
            is_leaf: Vec::with_capacity(capacity),
            leaf_values: Vec::with_capacity(capacity),
            gains: Vec::with_capacity(capacity),
            covers: Vec::with_capacity(capacity),
        }
    }

    /// Reset and allocate the root placeholder. Returns the root id (always 0).
    pub fn init_root(&mut self) -> NodeId {
        self.split_indices.clear();
        self.split_thresholds.clear();
        self.left_children.clear();
        self.right_children.clear();
        self.is_leaf.clear();
        self.leaf_values.clear();
        self.gains.clear();
        self.covers.clear();
        self.allocate_node()
    }

    /// Turn `node` into a numeric split, allocating both children.
    ///
    /// Returns `(left_id, right_id)`.
    pub fn apply_split(
        &mut self,
        node: NodeId,
        feature: u32,
        threshold: f32,
        gain: f32,
    ) -> (NodeId, NodeId) {
        let left_id = self.allocate_node();
        let right_id = self.allocate_node();

        let idx = node as usize;
        self.split_indices[idx] = feature;
        self.split_thresholds[idx] = threshold;
        self.left_children[idx] = left_id;
        self.right_children[idx] = right_id;
        self.is_leaf[idx] = false;
        self.gains[idx] = gain;

        (left_id, right_id)
    }

    /// Set a node as a leaf with the given value.
    pub fn make_leaf(&mut self, node: NodeId, value: f32) {
        let idx = node as usize;
        self.is_leaf[idx] = true;
        self.leaf_values[idx] = value;
        self.gains[idx] = 0.0;
    }

    /// Record the weighted number of rows reaching `node`.
    pub fn set_cover(&mut self, node: NodeId, cover: f32) {
        self.covers[node as usize] = cover;
    }

    /// Finalize the tree and return immutable storage.
    pub fn freeze(self) -> Tree {
        Tree {
            split_indices: self.split_indices.into_boxed_slice(),
            split_thresholds: self.split_thresholds.into_boxed_slice(),
            left_children: self.left_children.into_boxed_slice(),
            right_children: self.right_children.into_boxed_slice(),
            is_leaf: self.is_leaf.into_boxed_slice(),
            leaf_values: self.leaf_values.into_boxed_slice(),
            gains: self.gains.into_boxed_slice(),
            covers: self.covers.into_boxed_slice(),
        }
    }

    fn allocate_node(&mut self) -> NodeId {
        let id = self.split_indices.len() as NodeId;
        self.split_indices.push(0);
        self.split_thresholds.push(0.0);
        self.left_children.push(0);
        self.right_children.push(0);
        // Placeholders are leaves until split, so traversal of a partial tree terminates.
        self.is_leaf.push(true);
        self.leaf_values.push(0.0);
        self.gains.push(0.0);
        self.covers.push(0.0);
        id
    }
}

impl TreeView for MutableTree {
    #[inline]
    fn n_nodes(&self) -> usize {
        self.split_indices.len()
    }

    #[inline]
    fn is_leaf(&self, node: NodeId) -> bool {
        self.is_leaf[node as usize]
    }

    #[inline]
    fn split_index(&self, node: NodeId) -> u32 {
        self.split_indices[node as usize]
    }

    #[inline]
    fn split_threshold(&self, node: NodeId) -> f32 {
        self.split_thresholds[node as usize]
    }

    #[inline]
    fn left_child(&self, node: NodeId) -> NodeId {
        self.left_children[node as usize]
    }

    #[inline]
    fn right_child(&self, node: NodeId) -> NodeId {
        self.right_children[node as usize]
    }

    #[inline]
    fn leaf_value(&self, node: NodeId) -> f32 {
        self.leaf_values[node as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// root: feat0 < 0.5 ? 1.0 : (feat1 < 0.3 ? 2.0 : 3.0)
    fn two_level_tree() -> Tree {
        let mut tree = MutableTree::with_capacity(5);
        let root = tree.init_root();
        let (l, r) = tree.apply_split(root, 0, 0.5, 10.0);
        tree.make_leaf(l, 1.0);
        let (rl, rr) = tree.apply_split(r, 1, 0.3, 5.0);
        tree.make_leaf(rl, 2.0);
        tree.make_leaf(rr, 3.0);
        tree.freeze()
    }

    #[test]
    fn predict_simple_tree() {
        let tree = two_level_tree();
        assert_eq!(tree.predict_row(&[0.3, 0.0]), 1.0);
        assert_eq!(tree.predict_row(&[0.7, 0.1]), 2.0);
        assert_eq!(tree.predict_row(&[0.7, 0.9]), 3.0);
        // Threshold itself goes right
        assert_eq!(tree.predict_row(&[0.5, 0.3]), 3.0);
    }

    #[test]
    fn structure_queries() {
        let tree = two_level_tree();
        assert_eq!(tree.n_nodes(), 5);
        assert_eq!(tree.n_leaves(), 3);
        assert_eq!(tree.depth(), 2);
        assert_eq!(tree.gains()[0], 10.0);
        assert!(tree.validate().is_ok());
    }

    #[test]
    fn single_leaf_tree() {
        let mut tree = MutableTree::default();
        let root = tree.init_root();
        tree.make_leaf(root, 4.5);
        let tree = tree.freeze();
        assert_eq!(tree.depth(), 0);
        assert_eq!(tree.predict_row(&[]), 4.5);
        assert!(tree.validate().is_ok());
    }

    #[test]
    fn mutable_tree_is_traversable_while_growing() {
        let mut tree = MutableTree::default();
        let root = tree.init_root();
        let (l, _r) = tree.apply_split(root, 0, 1.0, 1.0);
        tree.make_leaf(l, -1.0);
        assert_eq!(tree.predict_row(&[0.0]), -1.0);
        // Unfinished right placeholder reads as a zero leaf.
        assert_eq!(tree.predict_row(&[2.0]), 0.0);
    }

    #[test]
    fn empty_tree_fails_validation() {
        let tree = MutableTree::default().freeze();
        assert_eq!(tree.validate(), Err(TreeValidationError::EmptyTree));
    }
}
