pub mod camera;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod interaction;
pub mod ir;
pub mod layout;
pub mod layout_dump;
pub mod metrics;
pub mod render;
pub mod sample;
pub mod scene;
pub mod scene_builder;
pub mod style;
pub mod theme;
pub mod tree;
pub mod visualizer;

pub use camera::Camera;
#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{ConfigError, LayoutConfig, LayoutMode, Tunables, YOffsetMode, load_config};
pub use interaction::{
    Gesture, InteractionController, Modifiers, PointerButton, PointerEvent, WheelEvent,
};
pub use ir::{TreeNode, parse_tree};
pub use layout::{LayoutEngine, Point};
pub use metrics::{DrawError, NodePath, TreeMetrics};
pub use render::render_svg;
pub use scene::{NodeClass, NodeId, Scene, SceneEdge, SceneNode};
pub use scene_builder::{Drawing, build_scene, draw_tree};
pub use style::{Selector, StyleRule, Stylesheet};
pub use theme::Color;
pub use tree::{VisualizableNode, avl_keys, one_key};
pub use visualizer::TreeVisualizer;

/// Draws `root` and renders it to SVG, fitted to a `width` x `height` viewport.
pub fn render_tree_svg<N: VisualizableNode>(
    root: Option<&N>,
    config: &LayoutConfig,
    width: f64,
    height: f64,
) -> Result<String, DrawError> {
    let mut drawing = draw_tree(root, config)?;
    Ok(render::render_fitted(&mut drawing, width, height, config.tunables()))
}
