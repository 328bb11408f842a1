use crate::camera::Camera;
use crate::config::{ConfigError, LayoutConfig};
use crate::interaction::{InteractionController, PointerEvent, WheelEvent};
use crate::layout::{Bounds, Point, uses_backend_layout};
use crate::metrics::{DrawError, TreeMetrics};
use crate::render::apply_auto_layout;
use crate::scene::{NodeId, Scene};
use crate::scene_builder::{Drawing, build_scene};
use crate::style::Stylesheet;
use crate::tree::VisualizableNode;

pub const DEFAULT_VIEWPORT: (f64, f64) = (1200.0, 800.0);

/// Draws trees and tracks interaction with the current drawing.
///
/// ```
/// use tree_visualizer::{TreeNode, TreeVisualizer};
///
/// let root = TreeNode::new([1], vec![Some(TreeNode::leaf([2])), Some(TreeNode::leaf([3]))]);
/// let mut visualizer = TreeVisualizer::new(2).unwrap();
/// visualizer.draw(Some(&root)).unwrap();
/// assert_eq!(visualizer.scene().node_count(), 3);
/// ```
#[derive(Debug, Clone)]
pub struct TreeVisualizer {
    config: LayoutConfig,
    drawing: Drawing,
    camera: Camera,
    controller: InteractionController,
    generation: u64,
}

impl TreeVisualizer {
    pub fn new(branching_factor: u32) -> Result<Self, ConfigError> {
        Self::with_config(LayoutConfig::new(branching_factor)?)
    }

    pub fn with_config(config: LayoutConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let drawing = Drawing {
            scene: Scene::new(0),
            stylesheet: Stylesheet::for_config(&config),
            metrics: TreeMetrics::default(),
        };
        Ok(Self {
            config,
            drawing,
            camera: Camera::new(DEFAULT_VIEWPORT.0, DEFAULT_VIEWPORT.1),
            controller: InteractionController::new(),
            generation: 0,
        })
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Configuration for subsequent draws; the current drawing is unaffected.
    pub fn config_mut(&mut self) -> &mut LayoutConfig {
        &mut self.config
    }

    /// Clears and rebuilds the scene and stylesheet from `root`.
    ///
    /// On error the previous drawing stays in place untouched.
    pub fn draw<N: VisualizableNode>(&mut self, root: Option<&N>) -> Result<(), DrawError> {
        let metrics = TreeMetrics::compute(root)?;
        let mut drawing = build_scene(root, &metrics, &self.config)?;

        if uses_backend_layout(&self.config) {
            apply_auto_layout(&mut drawing.scene);
        }
        self.generation += 1;
        drawing.scene.set_generation(self.generation);
        let bounds = drawing
            .scene
            .bounds()
            .unwrap_or_else(|| Bounds::around(Point::ORIGIN, 1.0, 1.0));
        self.camera.fit(bounds, 1.0);
        self.camera
            .set_view_percent(drawing.scene.view_percent, self.config.tunables());
        self.drawing = drawing;
        self.controller.reset(self.generation);
        log::debug!(
            "draw #{}: {} nodes, depth {}",
            self.generation,
            metrics.node_count,
            metrics.max_depth
        );
        Ok(())
    }

    pub fn drawing(&self) -> &Drawing {
        &self.drawing
    }

    pub fn scene(&self) -> &Scene {
        &self.drawing.scene
    }

    pub fn stylesheet(&self) -> &Stylesheet {
        &self.drawing.stylesheet
    }

    pub fn metrics(&self) -> &TreeMetrics {
        &self.drawing.metrics
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn resize_viewport(&mut self, width: f64, height: f64) {
        self.camera.resize(width, height);
    }

    pub fn selection(&self) -> &[NodeId] {
        self.controller.selection()
    }

    pub fn controller(&self) -> &InteractionController {
        &self.controller
    }

    pub fn pointer_down(&mut self, event: PointerEvent) {
        self.controller
            .pointer_down(&mut self.drawing.scene, &self.camera, event);
    }

    pub fn pointer_drag(&mut self, event: PointerEvent) {
        self.controller
            .pointer_drag(&mut self.drawing.scene, &mut self.camera, event);
    }

    pub fn pointer_up(&mut self) {
        self.controller.pointer_up();
    }

    pub fn wheel(&mut self, event: WheelEvent) -> bool {
        self.controller
            .wheel(&mut self.camera, event, self.config.tunables())
    }
}
