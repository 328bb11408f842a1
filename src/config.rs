use crate::theme::Color;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

pub const DEFAULT_TEXT_SIZE: f64 = 12.0;
pub const DEFAULT_NODE_SIZE: f64 = 35.0;
pub const DEFAULT_NODE_COLOR: Color = Color::WHITE;
pub const DEFAULT_MARK_COLOR: Color = Color::WHITE;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("branching factor must be at least 1, got {0}")]
    InvalidBranchingFactor(u32),
    #[error("text size must be a positive finite number, got {0}")]
    InvalidTextSize(f64),
    #[error("node size must be a positive finite number, got {0}")]
    InvalidNodeSize(f64),
    #[error("invalid zoom bounds: min view percent {min} must be positive and not above max {max:?}")]
    InvalidZoomBounds { min: f64, max: Option<f64> },
    #[error("invalid tunable `{name}`: {value}")]
    InvalidTunable { name: &'static str, value: f64 },
    #[error("invalid color: {0}")]
    InvalidColor(String),
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// How node positions are produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LayoutMode {
    /// Positions are left to the rendering backend's automatic layout.
    None,
    /// Root on top, children grow downwards.
    #[default]
    TreeDown,
    /// Root at the bottom, children grow upwards.
    TreeUp,
}

impl LayoutMode {
    /// Sign applied to the per-level y step, `None` when no tree layout is computed.
    pub fn direction(self) -> Option<f64> {
        match self {
            LayoutMode::None => None,
            LayoutMode::TreeDown => Some(1.0),
            LayoutMode::TreeUp => Some(-1.0),
        }
    }
}

/// Alternating per-sibling vertical offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum YOffsetMode {
    On,
    Off,
    #[default]
    Auto,
}

/// Empirically tuned rendering constants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Tunables {
    pub x_scale: f64,
    pub y_step: f64,
    pub y_offset_factor: f64,
    /// AUTO offset kicks in for multi-key trees deeper than this.
    pub auto_offset_min_depth: usize,
    /// AUTO offset kicks in when `k * max_depth` exceeds this.
    pub auto_offset_fan_product: usize,
    pub char_width_factor: f64,
    pub stroke_width: f64,
    pub marked_stroke_width: f64,
    pub large_tree_thresholds: Vec<usize>,
    pub large_tree_view_step: f64,
    pub zoom_step: f64,
    pub min_view_percent: f64,
    pub max_view_percent: Option<f64>,
}

impl Default for Tunables {
    fn default() -> Self {
        Self {
            x_scale: 50.0,
            y_step: 120.0,
            y_offset_factor: 1.25,
            auto_offset_min_depth: 2,
            auto_offset_fan_product: 16,
            char_width_factor: 0.6,
            stroke_width: 1.0,
            marked_stroke_width: 2.0,
            large_tree_thresholds: vec![300, 500, 700],
            large_tree_view_step: 0.5,
            zoom_step: 0.05,
            min_view_percent: 0.05,
            max_view_percent: None,
        }
    }
}

impl Tunables {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("xScale", self.x_scale),
            ("yStep", self.y_step),
            ("charWidthFactor", self.char_width_factor),
            ("zoomStep", self.zoom_step),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::InvalidTunable { name, value });
            }
        }
        let non_negative = [
            ("yOffsetFactor", self.y_offset_factor),
            ("strokeWidth", self.stroke_width),
            ("markedStrokeWidth", self.marked_stroke_width),
            ("largeTreeViewStep", self.large_tree_view_step),
        ];
        for (name, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ConfigError::InvalidTunable { name, value });
            }
        }
        let min = self.min_view_percent;
        let max_ok = self.max_view_percent.is_none_or(|max| max.is_finite() && max >= min);
        if !(min.is_finite() && min > 0.0) || !max_ok {
            return Err(ConfigError::InvalidZoomBounds {
                min,
                max: self.max_view_percent,
            });
        }
        Ok(())
    }
}

/// Configuration consumed by the layout engine and the scene builder.
///
/// Every setter validates its input; invalid values are rejected rather than clamped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutConfig {
    branching_factor: u32,
    #[serde(default)]
    layout_mode: LayoutMode,
    #[serde(default)]
    y_offset_mode: YOffsetMode,
    #[serde(default = "default_text_size")]
    text_size: f64,
    #[serde(default = "default_node_color")]
    node_color: Color,
    #[serde(default = "default_mark_color")]
    mark_color: Color,
    #[serde(default = "default_true")]
    automatic_node_scaling: bool,
    #[serde(default = "default_node_size")]
    node_size: f64,
    #[serde(default)]
    tunables: Tunables,
}

fn default_text_size() -> f64 {
    DEFAULT_TEXT_SIZE
}

fn default_node_size() -> f64 {
    DEFAULT_NODE_SIZE
}

fn default_node_color() -> Color {
    DEFAULT_NODE_COLOR
}

fn default_mark_color() -> Color {
    DEFAULT_MARK_COLOR
}

fn default_true() -> bool {
    true
}

impl LayoutConfig {
    /// Configuration with the given branching factor and defaults everywhere else.
    pub fn new(branching_factor: u32) -> Result<Self, ConfigError> {
        validate_branching_factor(branching_factor)?;
        Ok(Self {
            branching_factor,
            layout_mode: LayoutMode::default(),
            y_offset_mode: YOffsetMode::default(),
            text_size: DEFAULT_TEXT_SIZE,
            node_color: DEFAULT_NODE_COLOR,
            mark_color: DEFAULT_MARK_COLOR,
            automatic_node_scaling: true,
            node_size: DEFAULT_NODE_SIZE,
            tunables: Tunables::default(),
        })
    }

    /// Like [`LayoutConfig::new`] with text and node size scaled from their defaults.
    pub fn with_scale(branching_factor: u32, scale: f64) -> Result<Self, ConfigError> {
        let mut config = Self::new(branching_factor)?;
        config.set_text_size((DEFAULT_TEXT_SIZE * scale).trunc())?;
        config.set_node_size((DEFAULT_NODE_SIZE * scale).trunc())?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_branching_factor(self.branching_factor)?;
        validate_text_size(self.text_size)?;
        validate_node_size(self.node_size)?;
        self.tunables.validate()
    }

    pub fn branching_factor(&self) -> u32 {
        self.branching_factor
    }

    pub fn set_branching_factor(&mut self, k: u32) -> Result<(), ConfigError> {
        validate_branching_factor(k)?;
        self.branching_factor = k;
        Ok(())
    }

    pub fn layout_mode(&self) -> LayoutMode {
        self.layout_mode
    }

    pub fn set_layout_mode(&mut self, mode: LayoutMode) {
        self.layout_mode = mode;
    }

    pub fn y_offset_mode(&self) -> YOffsetMode {
        self.y_offset_mode
    }

    pub fn set_y_offset_mode(&mut self, mode: YOffsetMode) {
        self.y_offset_mode = mode;
    }

    pub fn text_size(&self) -> f64 {
        self.text_size
    }

    pub fn set_text_size(&mut self, size: f64) -> Result<(), ConfigError> {
        validate_text_size(size)?;
        self.text_size = size;
        Ok(())
    }

    /// Vertical padding added to the text height of a flat node.
    pub fn height_padding(&self) -> f64 {
        self.text_size / 3.0
    }

    pub fn node_size(&self) -> f64 {
        self.node_size
    }

    pub fn set_node_size(&mut self, size: f64) -> Result<(), ConfigError> {
        validate_node_size(size)?;
        self.node_size = size;
        Ok(())
    }

    pub fn node_color(&self) -> Color {
        self.node_color
    }

    pub fn set_node_color(&mut self, color: Color) {
        self.node_color = color;
    }

    pub fn mark_color(&self) -> Color {
        self.mark_color
    }

    pub fn set_mark_color(&mut self, color: Color) {
        self.mark_color = color;
    }

    pub fn automatic_node_scaling(&self) -> bool {
        self.automatic_node_scaling
    }

    pub fn set_automatic_node_scaling(&mut self, enabled: bool) {
        self.automatic_node_scaling = enabled;
    }

    pub fn tunables(&self) -> &Tunables {
        &self.tunables
    }

    pub fn set_tunables(&mut self, tunables: Tunables) -> Result<(), ConfigError> {
        tunables.validate()?;
        self.tunables = tunables;
        Ok(())
    }

    /// Scales text size and node size, truncating to whole pixels.
    pub fn scale(&mut self, text_scale: f64, node_scale: f64) -> Result<(), ConfigError> {
        let text_size = (self.text_size * text_scale).trunc();
        let node_size = (self.node_size * node_scale).trunc();
        validate_text_size(text_size)?;
        validate_node_size(node_size)?;
        self.text_size = text_size;
        self.node_size = node_size;
        Ok(())
    }
}

fn validate_branching_factor(k: u32) -> Result<(), ConfigError> {
    if k == 0 {
        return Err(ConfigError::InvalidBranchingFactor(k));
    }
    Ok(())
}

fn validate_text_size(size: f64) -> Result<(), ConfigError> {
    if !(size.is_finite() && size > 0.0) {
        return Err(ConfigError::InvalidTextSize(size));
    }
    Ok(())
}

fn validate_node_size(size: f64) -> Result<(), ConfigError> {
    if !(size.is_finite() && size > 0.0) {
        return Err(ConfigError::InvalidNodeSize(size));
    }
    Ok(())
}

/// Reads a JSON config file. Keys are camelCase; everything but `branchingFactor`
/// may be omitted.
pub fn load_config(path: &Path) -> Result<LayoutConfig, ConfigError> {
    let contents = std::fs::read_to_string(path)?;
    parse_config(&contents)
}

pub fn parse_config(contents: &str) -> Result<LayoutConfig, ConfigError> {
    let config: LayoutConfig = serde_json::from_str(contents)?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_follow_branching_factor_constructor() {
        let config = LayoutConfig::new(3).unwrap();
        assert_eq!(config.branching_factor(), 3);
        assert_eq!(config.layout_mode(), LayoutMode::TreeDown);
        assert_eq!(config.y_offset_mode(), YOffsetMode::Auto);
        assert_eq!(config.text_size(), DEFAULT_TEXT_SIZE);
        assert_eq!(config.node_size(), DEFAULT_NODE_SIZE);
        assert!(config.automatic_node_scaling());
        assert_eq!(config.height_padding(), 4.0);
    }

    #[test]
    fn rejects_zero_branching_factor() {
        assert!(matches!(
            LayoutConfig::new(0),
            Err(ConfigError::InvalidBranchingFactor(0))
        ));
        let mut config = LayoutConfig::new(2).unwrap();
        assert!(config.set_branching_factor(0).is_err());
        assert_eq!(config.branching_factor(), 2);
    }

    #[test]
    fn rejects_non_positive_sizes_without_clamping() {
        let mut config = LayoutConfig::new(2).unwrap();
        assert!(config.set_text_size(0.0).is_err());
        assert!(config.set_node_size(-3.0).is_err());
        assert!(config.set_text_size(f64::NAN).is_err());
        assert_eq!(config.text_size(), DEFAULT_TEXT_SIZE);
        assert_eq!(config.node_size(), DEFAULT_NODE_SIZE);
    }

    #[test]
    fn scale_truncates_like_integer_sizes() {
        let config = LayoutConfig::with_scale(2, 1.5).unwrap();
        assert_eq!(config.text_size(), 18.0);
        assert_eq!(config.node_size(), 52.0);

        let mut config = LayoutConfig::new(2).unwrap();
        config.scale(0.5, 2.0).unwrap();
        assert_eq!(config.text_size(), 6.0);
        assert_eq!(config.node_size(), 70.0);
        assert!(config.scale(0.01, 1.0).is_err());
    }

    #[test]
    fn zoom_bounds_are_validated() {
        let mut tunables = Tunables::default();
        tunables.max_view_percent = Some(0.01);
        assert!(matches!(
            tunables.validate(),
            Err(ConfigError::InvalidZoomBounds { .. })
        ));
        tunables.max_view_percent = Some(4.0);
        assert!(tunables.validate().is_ok());
    }

    #[test]
    fn parses_partial_json_config() {
        let config = parse_config(
            r##"{
                "branchingFactor": 4,
                "layoutMode": "treeUp",
                "yOffsetMode": "off",
                "markColor": "#ff0000",
                "tunables": { "yStep": 80, "maxViewPercent": 3.0 }
            }"##,
        )
        .unwrap();
        assert_eq!(config.branching_factor(), 4);
        assert_eq!(config.layout_mode(), LayoutMode::TreeUp);
        assert_eq!(config.y_offset_mode(), YOffsetMode::Off);
        assert_eq!(config.mark_color(), Color::RED);
        assert_eq!(config.tunables().y_step, 80.0);
        assert_eq!(config.tunables().x_scale, 50.0);
        assert_eq!(config.tunables().max_view_percent, Some(3.0));
    }

    #[test]
    fn parsed_config_is_validated() {
        let err = parse_config(r#"{ "branchingFactor": 0 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidBranchingFactor(0)));
    }
}
