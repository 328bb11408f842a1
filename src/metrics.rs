use crate::tree::VisualizableNode;
use std::fmt;
use thiserror::Error;

/// Location of a node in a traversal: child indices from the root, counted in the
/// unfiltered child sequence, plus the pre-order position among visited nodes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NodePath {
    pub indices: Vec<usize>,
    pub preorder: usize,
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("root")?;
        for idx in &self.indices {
            write!(f, "/{idx}")?;
        }
        write!(f, " (pre-order #{})", self.preorder)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DrawError {
    #[error("node at {path} has no keys")]
    EmptyKeys { path: NodePath },
}

/// Shape statistics of a tree, computed once per draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TreeMetrics {
    pub node_count: usize,
    /// Height of the tree; 1 for a single node, 0 for an empty tree.
    pub max_depth: usize,
    pub has_multiple_key_nodes: bool,
}

impl TreeMetrics {
    /// Single depth-first pass over the tree. Holes among children are skipped.
    ///
    /// Fails on the first node (in pre-order) that reports no keys. The walk keeps
    /// its own stack, so depth is bounded by memory only.
    pub fn compute<N: VisualizableNode>(root: Option<&N>) -> Result<Self, DrawError> {
        let Some(root) = root else {
            return Ok(Self::default());
        };
        let mut metrics = Self::default();
        let mut path = Vec::new();
        metrics.record(root, &path, 1)?;
        let mut stack = vec![root.children().into_iter().enumerate()];
        while let Some(children) = stack.last_mut() {
            match children.next() {
                Some((idx, Some(child))) => {
                    path.push(idx);
                    metrics.record(child, &path, stack.len() + 1)?;
                    stack.push(child.children().into_iter().enumerate());
                }
                Some((_, None)) => {}
                None => {
                    stack.pop();
                    path.pop();
                }
            }
        }
        Ok(metrics)
    }

    pub fn is_empty(&self) -> bool {
        self.node_count == 0
    }

    fn record<N: VisualizableNode>(
        &mut self,
        node: &N,
        path: &[usize],
        depth: usize,
    ) -> Result<(), DrawError> {
        let keys = node.keys();
        if keys.is_empty() {
            return Err(DrawError::EmptyKeys {
                path: NodePath {
                    indices: path.to_vec(),
                    preorder: self.node_count,
                },
            });
        }
        self.node_count += 1;
        self.max_depth = self.max_depth.max(depth);
        self.has_multiple_key_nodes |= keys.len() > 1;
        Ok(())
    }
}
