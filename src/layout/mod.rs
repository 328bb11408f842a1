pub(crate) mod types;
pub use types::*;

use crate::config::{LayoutConfig, LayoutMode, Tunables, YOffsetMode};
use crate::metrics::TreeMetrics;

/// Analytic tree layout.
///
/// Positions depend only on depth, sibling index, sibling count and the global
/// shape of the tree, so no collision detection pass is needed. Horizontal spread
/// shrinks by a factor of `k` per level and grows with `k²·D²`, which keeps sibling
/// subtrees of up to `k` children apart.
#[derive(Debug, Clone)]
pub struct LayoutEngine {
    k: f64,
    max_depth: f64,
    direction: f64,
    y_step: f64,
    x_scale: f64,
    /// Sibling offset unit, zero when offsets are disabled for this tree.
    offset_unit: f64,
}

impl LayoutEngine {
    /// Returns `None` for [`LayoutMode::None`], where positions are left to the backend.
    pub fn new(config: &LayoutConfig, metrics: &TreeMetrics) -> Option<Self> {
        let direction = config.layout_mode().direction()?;
        let tunables = config.tunables();
        let offset_unit = if y_offset_enabled(
            config.y_offset_mode(),
            metrics,
            config.branching_factor(),
            tunables,
        ) {
            tunables.y_offset_factor * (config.text_size() + config.height_padding())
        } else {
            0.0
        };
        Some(Self {
            k: config.branching_factor() as f64,
            max_depth: metrics.max_depth as f64,
            direction,
            y_step: tunables.y_step,
            x_scale: tunables.x_scale,
            offset_unit,
        })
    }

    pub fn root_position(&self) -> Point {
        Point::ORIGIN
    }

    /// Position of the `index`-th of `count` children of a node at `parent`.
    /// `depth` is the child's depth; children of the root are at depth 1.
    pub fn child_position(&self, parent: Point, index: usize, count: usize, depth: usize) -> Point {
        Point::new(
            self.child_x(parent.x, index, count, depth),
            self.level_y(depth) + self.y_offset(index, depth),
        )
    }

    pub fn child_x(&self, parent_x: f64, index: usize, count: usize, depth: usize) -> f64 {
        if count <= 1 {
            return parent_x;
        }
        let spread = self.spread(depth);
        let start = parent_x - spread / 2.0;
        start + index as f64 * (spread / (count - 1) as f64)
    }

    /// Total horizontal distance between the first and last child at `depth`.
    pub fn spread(&self, depth: usize) -> f64 {
        let decay = self.k.powi(depth as i32);
        self.x_scale * self.k * self.k * self.max_depth * self.max_depth / decay
    }

    /// Baseline y of a depth level, before sibling offsets.
    pub fn level_y(&self, depth: usize) -> f64 {
        self.direction * self.y_step * depth as f64
    }

    pub fn y_offset(&self, index: usize, depth: usize) -> f64 {
        if self.offset_unit == 0.0 {
            return 0.0;
        }
        let parity = ((depth % 2) * 2) as f64 - 1.0;
        index as f64 * self.offset_unit * parity
    }
}

/// Whether sibling y offsets apply to a tree of the given shape.
///
/// AUTO enables them where labels tend to collide: multi-key trees deeper than
/// `auto_offset_min_depth`, or trees whose `k * max_depth` exceeds
/// `auto_offset_fan_product`.
pub fn y_offset_enabled(
    mode: YOffsetMode,
    metrics: &TreeMetrics,
    k: u32,
    tunables: &Tunables,
) -> bool {
    match mode {
        YOffsetMode::On => true,
        YOffsetMode::Off => false,
        YOffsetMode::Auto => {
            (metrics.has_multiple_key_nodes && metrics.max_depth > tunables.auto_offset_min_depth)
                || k as usize * metrics.max_depth > tunables.auto_offset_fan_product
        }
    }
}

/// `true` when the layout mode hands positioning to the rendering backend.
pub fn uses_backend_layout(config: &LayoutConfig) -> bool {
    config.layout_mode() == LayoutMode::None
}
