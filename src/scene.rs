use crate::layout::{Bounds, Point};
use crate::theme::Color;
use serde::Serialize;
use std::fmt;

/// Stable per-draw node identifier: the node's pre-order index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId(pub usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeClass {
    Regular,
    /// Placeholder drawn for an empty tree.
    Empty,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SceneNode {
    pub id: NodeId,
    pub label: String,
    /// `None` until the backend places the node (backend layout mode).
    pub position: Option<Point>,
    pub width: f64,
    pub height: f64,
    pub fill: Option<Color>,
    pub marked: bool,
    pub class: NodeClass,
    pub depth: usize,
    pub parent: Option<NodeId>,
}

impl SceneNode {
    pub fn bounds(&self) -> Option<Bounds> {
        self.position
            .map(|center| Bounds::around(center, self.width, self.height))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SceneEdge {
    pub from: NodeId,
    pub to: NodeId,
    pub marked: bool,
}

impl SceneEdge {
    pub fn id(&self) -> String {
        format!("{}to{}", self.from, self.to)
    }

    pub fn touches(&self, node: NodeId) -> bool {
        self.from == node || self.to == node
    }
}

/// Positioned nodes and edges produced by one draw.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scene {
    generation: u64,
    nodes: Vec<SceneNode>,
    edges: Vec<SceneEdge>,
    /// Initial camera view percent suggested for this scene.
    pub view_percent: f64,
    /// All nodes drawn as rounded boxes instead of circles.
    pub rounded_nodes: bool,
}

impl Scene {
    pub fn new(generation: u64) -> Self {
        Self {
            generation,
            nodes: Vec::new(),
            edges: Vec::new(),
            view_percent: 1.0,
            rounded_nodes: false,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub(crate) fn set_generation(&mut self, generation: u64) {
        self.generation = generation;
    }

    /// Adds a node; its id is the next pre-order index.
    pub fn add_node(&mut self, label: String, parent: Option<NodeId>, depth: usize) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(SceneNode {
            id,
            label,
            position: None,
            width: 0.0,
            height: 0.0,
            fill: None,
            marked: false,
            class: NodeClass::Regular,
            depth,
            parent,
        });
        id
    }

    pub fn add_edge(&mut self, from: NodeId, to: NodeId) {
        self.edges.push(SceneEdge {
            from,
            to,
            marked: false,
        });
    }

    pub fn node(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.get(id.0)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut SceneNode> {
        self.nodes.get_mut(id.0)
    }

    pub fn nodes(&self) -> &[SceneNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[SceneEdge] {
        &self.edges
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_placeholder(&self) -> bool {
        self.nodes.len() == 1 && self.nodes[0].class == NodeClass::Empty
    }

    /// Children of `id` in display order.
    pub fn children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.edges.iter().filter(move |edge| edge.from == id).map(|edge| edge.to)
    }

    /// Topmost node whose box contains `point`. Marked nodes are drawn above
    /// unmarked ones; within a layer later nodes are on top.
    pub fn node_at(&self, point: Point) -> Option<NodeId> {
        let hit = |marked: bool| {
            self.nodes
                .iter()
                .rev()
                .filter(|node| node.marked == marked)
                .find(|node| node.bounds().is_some_and(|bounds| bounds.contains(point)))
                .map(|node| node.id)
        };
        hit(true).or_else(|| hit(false))
    }

    pub fn set_position(&mut self, id: NodeId, position: Point) -> bool {
        match self.node_mut(id) {
            Some(node) => {
                node.position = Some(position);
                true
            }
            None => false,
        }
    }

    /// Marks or unmarks a node and refreshes the emphasis of its edges.
    pub fn set_marked(&mut self, id: NodeId, marked: bool) -> bool {
        let Some(node) = self.node_mut(id) else {
            return false;
        };
        node.marked = marked;
        self.refresh_edges(id);
        true
    }

    pub fn is_marked(&self, id: NodeId) -> bool {
        self.node(id).is_some_and(|node| node.marked)
    }

    pub fn clear_marks(&mut self) {
        for node in &mut self.nodes {
            node.marked = false;
        }
        for edge in &mut self.edges {
            edge.marked = false;
        }
    }

    pub fn marked_nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.iter().filter(|node| node.marked).map(|node| node.id)
    }

    fn refresh_edges(&mut self, id: NodeId) {
        let nodes = &self.nodes;
        let marked = |node: NodeId| nodes.get(node.0).is_some_and(|n| n.marked);
        for edge in self.edges.iter_mut().filter(|edge| edge.touches(id)) {
            edge.marked = marked(edge.from) || marked(edge.to);
        }
    }

    /// Union of all placed node boxes.
    pub fn bounds(&self) -> Option<Bounds> {
        self.nodes
            .iter()
            .filter_map(SceneNode::bounds)
            .reduce(Bounds::union)
    }
}
