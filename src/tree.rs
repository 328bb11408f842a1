use crate::theme::Color;
use std::fmt::Display;

/// A node of any tree shape that can be visualized.
///
/// The visualizer only ever borrows nodes for the duration of a single draw.
///
/// ```
/// use tree_visualizer::{Color, VisualizableNode, one_key};
///
/// struct Bst {
///     key: i32,
///     left: Option<Box<Bst>>,
///     right: Option<Box<Bst>>,
/// }
///
/// impl VisualizableNode for Bst {
///     fn keys(&self) -> Vec<String> {
///         one_key(self.key)
///     }
///
///     fn children(&self) -> Vec<Option<&Self>> {
///         vec![self.left.as_deref(), self.right.as_deref()]
///     }
///
///     fn color(&self) -> Option<Color> {
///         (self.key < 0).then_some(Color::RED)
///     }
/// }
/// ```
pub trait VisualizableNode {
    /// Keys shown on the node, in display order. Must not be empty.
    fn keys(&self) -> Vec<String>;

    /// Children in display order. `None` entries are holes and are skipped.
    fn children(&self) -> Vec<Option<&Self>>;

    /// Fill color override for this node; `None` uses the stylesheet default.
    fn color(&self) -> Option<Color> {
        None
    }
}

/// Keys of a node carrying a single key.
pub fn one_key(key: impl Display) -> Vec<String> {
    vec![key.to_string()]
}

/// Keys of an AVL node: the key followed by its balance factor.
pub fn avl_keys(key: impl Display, balance: i32) -> Vec<String> {
    vec![key.to_string(), balance.to_string()]
}

pub const KEY_DELIMITER: &str = " | ";

/// Display label of a node: its keys joined by [`KEY_DELIMITER`].
pub fn label_for(keys: &[String]) -> String {
    keys.join(KEY_DELIMITER)
}
