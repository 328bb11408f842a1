use crate::config::LayoutConfig;
use crate::layout::{LayoutEngine, Point};
use crate::metrics::{DrawError, NodePath, TreeMetrics};
use crate::scene::{NodeClass, NodeId, Scene};
use crate::style::{self, EMPTY_CLASS, NODE, ROUNDED_SHAPE, Selector, Stylesheet};
use crate::tree::{KEY_DELIMITER, VisualizableNode, label_for};

pub const EMPTY_LABEL: &str = "EMPTY";

/// A fully built scene together with its stylesheet and the metrics it was built from.
#[derive(Debug, Clone, PartialEq)]
pub struct Drawing {
    pub scene: Scene,
    pub stylesheet: Stylesheet,
    pub metrics: TreeMetrics,
}

/// Computes metrics and builds the scene in one go.
pub fn draw_tree<N: VisualizableNode>(
    root: Option<&N>,
    config: &LayoutConfig,
) -> Result<Drawing, DrawError> {
    let metrics = TreeMetrics::compute(root)?;
    build_scene(root, &metrics, config)
}

/// Builds the positioned scene and stylesheet for a tree.
///
/// Nothing is returned unless the whole tree was traversed successfully.
pub fn build_scene<N: VisualizableNode>(
    root: Option<&N>,
    metrics: &TreeMetrics,
    config: &LayoutConfig,
) -> Result<Drawing, DrawError> {
    let mut stylesheet = Stylesheet::for_config(config);
    let mut scene = Scene::new(0);

    let Some(root) = root else {
        build_placeholder(&mut scene, &mut stylesheet, config);
        log::debug!("drew empty tree placeholder");
        return Ok(Drawing {
            scene,
            stylesheet,
            metrics: *metrics,
        });
    };

    scene.view_percent = initial_view_percent(metrics.node_count, config);
    if metrics.has_multiple_key_nodes {
        scene.rounded_nodes = true;
        stylesheet.set(Selector::element(NODE), "shape", ROUNDED_SHAPE);
    }

    let mut builder = Builder {
        scene,
        stylesheet,
        engine: LayoutEngine::new(config, metrics),
        config,
        metrics,
        path: Vec::new(),
    };
    let root_id = builder.add_node(root, None, 0)?;
    if let Some(engine) = &builder.engine {
        builder.scene.set_position(root_id, engine.root_position());
    }
    builder.walk(root, root_id)?;

    let Builder {
        scene, stylesheet, ..
    } = builder;
    log::debug!(
        "built scene: {} nodes, {} edges, max depth {}, view percent {}",
        scene.node_count(),
        scene.edge_count(),
        metrics.max_depth,
        scene.view_percent
    );
    Ok(Drawing {
        scene,
        stylesheet,
        metrics: *metrics,
    })
}

fn build_placeholder(scene: &mut Scene, stylesheet: &mut Stylesheet, config: &LayoutConfig) {
    let id = scene.add_node(EMPTY_LABEL.to_string(), None, 0);
    let (width, height) = label_box(EMPTY_LABEL, false, config);
    if let Some(node) = scene.node_mut(id) {
        node.class = NodeClass::Empty;
        node.width = width;
        node.height = height;
    }
    scene.set_position(id, Point::ORIGIN);
    stylesheet
        .rule_mut(Selector::class(NODE, EMPTY_CLASS))
        .set("fill-mode", "none")
        .set("stroke-mode", "none")
        .set("size", style::size_value(width, height));
}

/// View percent the backend should start with: zoomed out one step per
/// exceeded large-tree threshold.
pub fn initial_view_percent(node_count: usize, config: &LayoutConfig) -> f64 {
    let tunables = config.tunables();
    let steps = tunables
        .large_tree_thresholds
        .iter()
        .filter(|&&threshold| node_count > threshold)
        .count();
    1.0 + steps as f64 * tunables.large_tree_view_step
}

/// Width and height of a node showing `label`.
///
/// Flat capsules when the tree has multi-key nodes, squares otherwise.
pub fn label_box(label: &str, flat: bool, config: &LayoutConfig) -> (f64, f64) {
    let tunables = config.tunables();
    let char_width = tunables.char_width_factor * config.text_size();
    let padding = KEY_DELIMITER.len() as f64 * char_width + 2.0 * tunables.stroke_width;
    let width = label.chars().count() as f64 * char_width + padding;
    let height = if flat {
        config.text_size() + config.height_padding()
    } else {
        width
    };
    (width, height)
}

/// Present children of one node and how many of them were visited.
struct Frame<'n, N> {
    id: NodeId,
    depth: usize,
    children: Vec<(usize, &'n N)>,
    next: usize,
}

impl<'n, N: VisualizableNode> Frame<'n, N> {
    fn new(node: &'n N, id: NodeId, depth: usize) -> Self {
        let children = node
            .children()
            .into_iter()
            .enumerate()
            .filter_map(|(idx, child)| child.map(|child| (idx, child)))
            .collect();
        Self {
            id,
            depth,
            children,
            next: 0,
        }
    }
}

struct Builder<'a> {
    scene: Scene,
    stylesheet: Stylesheet,
    engine: Option<LayoutEngine>,
    config: &'a LayoutConfig,
    metrics: &'a TreeMetrics,
    path: Vec<usize>,
}

impl Builder<'_> {
    /// Pre-order walk below `root` on an explicit stack.
    fn walk<N: VisualizableNode>(&mut self, root: &N, root_id: NodeId) -> Result<(), DrawError> {
        let mut stack = vec![Frame::new(root, root_id, 0)];
        while let Some(frame) = stack.last_mut() {
            let Some(&(raw_idx, child)) = frame.children.get(frame.next) else {
                stack.pop();
                self.path.pop();
                continue;
            };
            let slot = frame.next;
            let count = frame.children.len();
            let parent = frame.id;
            let depth = frame.depth + 1;
            frame.next += 1;

            self.path.push(raw_idx);
            let child_id = self.add_node(child, Some(parent), depth)?;
            let parent_position = self.scene.node(parent).and_then(|node| node.position);
            if let (Some(engine), Some(parent_position)) = (&self.engine, parent_position) {
                let position = engine.child_position(parent_position, slot, count, depth);
                self.scene.set_position(child_id, position);
            }
            self.scene.add_edge(parent, child_id);
            stack.push(Frame::new(child, child_id, depth));
        }
        Ok(())
    }

    fn add_node<N: VisualizableNode>(
        &mut self,
        node: &N,
        parent: Option<NodeId>,
        depth: usize,
    ) -> Result<NodeId, DrawError> {
        let keys = node.keys();
        if keys.is_empty() {
            return Err(DrawError::EmptyKeys {
                path: NodePath {
                    indices: self.path.clone(),
                    preorder: self.scene.node_count(),
                },
            });
        }
        let label = label_for(&keys);
        let (width, height) = if self.config.automatic_node_scaling() {
            label_box(&label, self.metrics.has_multiple_key_nodes, self.config)
        } else {
            (self.config.node_size(), self.config.node_size())
        };
        let fill = node.color();
        let id = self.scene.add_node(label, parent, depth);
        if let Some(scene_node) = self.scene.node_mut(id) {
            scene_node.width = width;
            scene_node.height = height;
            scene_node.fill = fill;
        }

        let selector = Selector::id(NODE, &id.to_string());
        if self.config.automatic_node_scaling() {
            self.stylesheet
                .set(selector.clone(), "size", style::size_value(width, height));
        }
        if let Some(color) = fill {
            self.stylesheet.set(selector, "fill-color", color.css());
        }
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{LayoutMode, YOffsetMode};
    use crate::ir::TreeNode;
    use crate::theme::Color;

    fn config(k: u32) -> LayoutConfig {
        LayoutConfig::new(k).unwrap()
    }

    #[test]
    fn empty_root_draws_placeholder_only() {
        let drawing = draw_tree::<TreeNode>(None, &config(2)).unwrap();
        assert_eq!(drawing.scene.node_count(), 1);
        assert_eq!(drawing.scene.edge_count(), 0);
        let node = &drawing.scene.nodes()[0];
        assert_eq!(node.label, EMPTY_LABEL);
        assert_eq!(node.class, NodeClass::Empty);
        assert!(drawing.scene.is_placeholder());
        let empty = Selector::class(NODE, EMPTY_CLASS);
        assert_eq!(drawing.stylesheet.get(&empty, "stroke-mode"), Some("none"));
    }

    #[test]
    fn three_node_binary_tree() {
        let root = TreeNode::new([1], vec![Some(TreeNode::leaf([2])), Some(TreeNode::leaf([3]))]);
        let drawing = draw_tree(Some(&root), &config(2)).unwrap();
        let scene = &drawing.scene;
        assert_eq!(scene.node_count(), 3);
        assert_eq!(scene.edge_count(), 2);
        let positions: Vec<Point> = scene.nodes().iter().map(|n| n.position.unwrap()).collect();
        assert_eq!(positions[0], Point::ORIGIN);
        assert_eq!(positions[1].x, -positions[2].x);
        assert!(positions[1].x < 0.0);
        assert_eq!(positions[1].y, 120.0);
        assert_eq!(positions[2].y, 120.0);
        assert_eq!(positions[1].z, 0.0);
    }

    #[test]
    fn holes_are_skipped_and_order_kept() {
        let root = TreeNode::new(
            ["r"],
            vec![Some(TreeNode::leaf(["a"])), None, Some(TreeNode::leaf(["c"]))],
        );
        let drawing = draw_tree(Some(&root), &config(3)).unwrap();
        let scene = &drawing.scene;
        assert_eq!(scene.node_count(), 3);
        let targets: Vec<&str> = scene
            .edges()
            .iter()
            .map(|edge| scene.node(edge.to).unwrap().label.as_str())
            .collect();
        assert_eq!(targets, vec!["a", "c"]);
        // two visible siblings spread symmetrically
        let xs: Vec<f64> = scene.nodes()[1..].iter().map(|n| n.position.unwrap().x).collect();
        assert_eq!(xs[0], -xs[1]);
    }

    #[test]
    fn single_node_tree_has_no_edges() {
        let root = TreeNode::leaf([42]);
        let drawing = draw_tree(Some(&root), &config(2)).unwrap();
        assert_eq!(drawing.scene.node_count(), 1);
        assert_eq!(drawing.scene.edge_count(), 0);
        assert_eq!(drawing.metrics.max_depth, 1);
        assert_eq!(drawing.scene.nodes()[0].position, Some(Point::ORIGIN));
    }

    #[test]
    fn single_keys_produce_square_nodes() {
        let root = TreeNode::new([100], vec![Some(TreeNode::leaf([7]))]);
        let drawing = draw_tree(Some(&root), &config(2)).unwrap();
        let root_node = &drawing.scene.nodes()[0];
        // 3 chars * 7.2 + 3 * 7.2 + 2
        assert!((root_node.width - 45.2).abs() < 1e-4);
        assert_eq!(root_node.width, root_node.height);
        assert!(!drawing.scene.rounded_nodes);
        let size = drawing.stylesheet.get(&Selector::id(NODE, "n0"), "size").unwrap();
        assert_eq!(size, "45.2px, 45.2px");
    }

    #[test]
    fn multi_key_trees_use_flat_rounded_nodes() {
        let root = TreeNode::new([1], vec![Some(TreeNode::leaf([2, 3]))]);
        let drawing = draw_tree(Some(&root), &config(2)).unwrap();
        assert!(drawing.scene.rounded_nodes);
        assert_eq!(
            drawing.stylesheet.get(&Selector::element(NODE), "shape"),
            Some(ROUNDED_SHAPE)
        );
        for node in drawing.scene.nodes() {
            assert_eq!(node.height, 16.0);
        }
        assert_eq!(drawing.scene.nodes()[1].label, "2 | 3");
        assert!(drawing.scene.nodes()[1].width > drawing.scene.nodes()[0].width);
    }

    #[test]
    fn fixed_size_when_scaling_disabled() {
        let mut config = config(2);
        config.set_automatic_node_scaling(false);
        config.set_node_size(30.0).unwrap();
        let root = TreeNode::leaf(["a very long label indeed"]);
        let drawing = draw_tree(Some(&root), &config).unwrap();
        let node = &drawing.scene.nodes()[0];
        assert_eq!((node.width, node.height), (30.0, 30.0));
        assert!(drawing.stylesheet.rule(&Selector::id(NODE, "n0")).is_none());
    }

    #[test]
    fn color_override_becomes_id_rule() {
        let root = TreeNode::new(
            [1],
            vec![Some(TreeNode::leaf([2]).with_color(Color::RED)), Some(TreeNode::leaf([3]))],
        );
        let drawing = draw_tree(Some(&root), &config(2)).unwrap();
        assert_eq!(drawing.scene.nodes()[1].fill, Some(Color::RED));
        assert_eq!(drawing.scene.nodes()[2].fill, None);
        assert_eq!(
            drawing.stylesheet.get(&Selector::id(NODE, "n1"), "fill-color"),
            Some("rgb(255,0,0)")
        );
        assert_eq!(drawing.stylesheet.get(&Selector::id(NODE, "n2"), "fill-color"), None);
        let css = drawing.stylesheet.to_css();
        let base = css.find("node {").unwrap();
        let over = css.find("node#n1 {").unwrap();
        assert!(base < over);
    }

    #[test]
    fn backend_layout_leaves_positions_unset() {
        let mut config = config(2);
        config.set_layout_mode(LayoutMode::None);
        let root = TreeNode::new([1], vec![Some(TreeNode::leaf([2]))]);
        let drawing = draw_tree(Some(&root), &config).unwrap();
        assert!(drawing.scene.nodes().iter().all(|node| node.position.is_none()));
        assert_eq!(drawing.scene.edge_count(), 1);
    }

    #[test]
    fn sibling_offsets_apply_when_forced() {
        let mut config = config(3);
        config.set_y_offset_mode(YOffsetMode::On);
        let root = TreeNode::new(
            [0],
            vec![
                Some(TreeNode::leaf([1])),
                Some(TreeNode::leaf([2])),
                Some(TreeNode::leaf([3])),
            ],
        );
        let drawing = draw_tree(Some(&root), &config).unwrap();
        let ys: Vec<f64> = drawing.scene.nodes()[1..]
            .iter()
            .map(|n| n.position.unwrap().y)
            .collect();
        assert_eq!(ys, vec![120.0, 140.0, 160.0]);
    }

    #[test]
    fn large_trees_start_zoomed_out() {
        let config = config(2);
        assert_eq!(initial_view_percent(300, &config), 1.0);
        assert_eq!(initial_view_percent(301, &config), 1.5);
        assert_eq!(initial_view_percent(501, &config), 2.0);
        assert_eq!(initial_view_percent(701, &config), 2.5);
    }

    #[test]
    fn empty_keys_fail_without_partial_scene() {
        let root = TreeNode::new([1], vec![None, Some(TreeNode::leaf(Vec::<i32>::new()))]);
        let metrics = TreeMetrics {
            node_count: 2,
            max_depth: 2,
            has_multiple_key_nodes: false,
        };
        let err = build_scene(Some(&root), &metrics, &config(2)).unwrap_err();
        let DrawError::EmptyKeys { path } = err;
        assert_eq!(path.indices, vec![1]);
        assert_eq!(path.preorder, 1);
    }

    #[test]
    fn deep_siblings_keep_distinct_x() {
        let mut node = TreeNode::new(
            ["b"],
            vec![Some(TreeNode::leaf(["l"])), Some(TreeNode::leaf(["r"]))],
        );
        for key in 0..28 {
            node = TreeNode::new([key], vec![Some(node)]);
        }
        let root = TreeNode::new(["root"], vec![Some(TreeNode::leaf(["a"])), Some(node)]);
        let drawing = draw_tree(Some(&root), &config(2)).unwrap();
        assert_eq!(drawing.metrics.max_depth, 31);
        let nodes = drawing.scene.nodes();
        let left = nodes[nodes.len() - 2].position.unwrap();
        let right = nodes[nodes.len() - 1].position.unwrap();
        assert_eq!(nodes[nodes.len() - 1].depth, 30);
        assert!(left.x < right.x, "{} vs {}", left.x, right.x);
        assert!((left.x - 48050.0).abs() < 1.0);
    }

    #[test]
    fn deep_chain_builds_without_recursion() {
        let depth = 100_000;
        let mut node = TreeNode::leaf([depth]);
        for key in (1..depth).rev() {
            node = TreeNode::new([key], vec![Some(node)]);
        }
        let drawing = draw_tree(Some(&node), &config(1)).unwrap();
        assert_eq!(drawing.scene.node_count(), depth as usize);
        assert_eq!(drawing.scene.edge_count(), depth as usize - 1);
        let last = drawing.scene.nodes().last().unwrap();
        assert_eq!(last.depth, depth as usize - 1);
        assert_eq!(last.position.unwrap().y, 120.0 * (depth - 1) as f64);
    }
}
