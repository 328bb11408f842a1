use crate::config::LayoutConfig;
use indexmap::IndexMap;
use std::collections::BTreeMap;
use std::fmt;

pub const NODE: &str = "node";
pub const EDGE: &str = "edge";
pub const MARKED_CLASS: &str = "marked";
pub const EMPTY_CLASS: &str = "empty";
pub const ROUNDED_SHAPE: &str = "rounded-box";

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Selector {
    /// Every element of a kind, e.g. `node`.
    Element(String),
    /// Elements carrying a class, e.g. `node.marked`.
    Class { element: String, class: String },
    /// A single element, e.g. `node#n4`.
    Id { element: String, id: String },
}

impl Selector {
    pub fn element(element: &str) -> Self {
        Selector::Element(element.to_string())
    }

    pub fn class(element: &str, class: &str) -> Self {
        Selector::Class {
            element: element.to_string(),
            class: class.to_string(),
        }
    }

    pub fn id(element: &str, id: &str) -> Self {
        Selector::Id {
            element: element.to_string(),
            id: id.to_string(),
        }
    }

    fn specificity(&self) -> u8 {
        match self {
            Selector::Element(_) => 0,
            Selector::Class { .. } => 1,
            Selector::Id { .. } => 2,
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::Element(element) => write!(f, "{element}"),
            Selector::Class { element, class } => write!(f, "{element}.{class}"),
            Selector::Id { element, id } => write!(f, "{element}#{id}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleRule {
    pub selector: Selector,
    declarations: BTreeMap<String, String>,
}

impl StyleRule {
    pub fn new(selector: Selector) -> Self {
        Self {
            selector,
            declarations: BTreeMap::new(),
        }
    }

    pub fn set(&mut self, key: &str, value: impl Into<String>) -> &mut Self {
        self.declarations.insert(key.to_string(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.declarations.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    pub fn declarations(&self) -> impl Iterator<Item = (&str, &str)> {
        self.declarations.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl fmt::Display for StyleRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {{", self.selector)?;
        for (key, value) in &self.declarations {
            write!(f, " {key}: {value};")?;
        }
        f.write_str(" }")
    }
}

/// Generated stylesheet, one rule per selector.
///
/// Declaring a property twice overwrites it. The serialized sheet lists element
/// rules first, then class rules, then id rules, so per-node overrides win over
/// the global appearance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stylesheet {
    rules: IndexMap<Selector, StyleRule>,
}

impl Stylesheet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Base sheet for a configuration: node, marked node and edge appearance.
    pub fn for_config(config: &LayoutConfig) -> Self {
        let tunables = config.tunables();
        let mut sheet = Self::new();
        sheet
            .rule_mut(Selector::element(NODE))
            .set("size", size_value(config.node_size(), config.node_size()))
            .set("fill-mode", "plain")
            .set("stroke-mode", "plain")
            .set("stroke-color", "black")
            .set("stroke-width", number(tunables.stroke_width))
            .set("text-size", number(config.text_size()))
            .set("fill-color", config.node_color().css());
        sheet
            .rule_mut(Selector::class(NODE, MARKED_CLASS))
            .set("fill-color", config.mark_color().css())
            .set("text-style", "bold")
            .set("stroke-width", number(tunables.marked_stroke_width))
            .set("z-index", "1000");
        sheet
            .rule_mut(Selector::element(EDGE))
            .set("size", px(tunables.stroke_width));
        sheet
            .rule_mut(Selector::class(EDGE, MARKED_CLASS))
            .set("size", px(tunables.marked_stroke_width));
        sheet
    }

    /// Returns the rule for `selector`, creating an empty one if needed.
    pub fn rule_mut(&mut self, selector: Selector) -> &mut StyleRule {
        self.rules
            .entry(selector)
            .or_insert_with_key(|selector| StyleRule::new(selector.clone()))
    }

    pub fn rule(&self, selector: &Selector) -> Option<&StyleRule> {
        self.rules.get(selector)
    }

    pub fn set(&mut self, selector: Selector, key: &str, value: impl Into<String>) {
        self.rule_mut(selector).set(key, value);
    }

    pub fn get(&self, selector: &Selector, key: &str) -> Option<&str> {
        self.rule(selector)?.get(key)
    }

    pub fn rules(&self) -> impl Iterator<Item = &StyleRule> {
        self.rules.values()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Rules in application order: elements, classes, ids; insertion order within a scope.
    pub fn ordered_rules(&self) -> Vec<&StyleRule> {
        let mut ordered: Vec<&StyleRule> =
            self.rules.values().filter(|rule| !rule.is_empty()).collect();
        ordered.sort_by_key(|rule| rule.selector.specificity());
        ordered
    }

    /// Effective declarations for one element, cascading element, class and id rules.
    ///
    /// Looks up only the rules that can apply, so the cost does not grow with the
    /// number of per-node rules in the sheet.
    pub fn resolve(
        &self,
        element: &str,
        classes: &[&str],
        id: Option<&str>,
    ) -> BTreeMap<&str, &str> {
        let mut resolved = BTreeMap::new();
        if let Some(rule) = self.rules.get(&Selector::element(element)) {
            resolved.extend(rule.declarations());
        }
        for class in classes {
            if let Some(rule) = self.rules.get(&Selector::class(element, class)) {
                resolved.extend(rule.declarations());
            }
        }
        if let Some(rule) = id.and_then(|id| self.rules.get(&Selector::id(element, id))) {
            resolved.extend(rule.declarations());
        }
        resolved
    }

    pub fn to_css(&self) -> String {
        self.ordered_rules()
            .iter()
            .map(|rule| rule.to_string())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl fmt::Display for Stylesheet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_css())
    }
}

pub fn size_value(width: f64, height: f64) -> String {
    format!("{}, {}", px(width), px(height))
}

pub fn px(value: f64) -> String {
    format!("{}px", number(value))
}

/// Formats with at most two decimals and no trailing zeros.
pub fn number(value: f64) -> String {
    let text = format!("{value:.2}");
    let text = text.trim_end_matches('0').trim_end_matches('.');
    if text == "-0" {
        "0".to_string()
    } else {
        text.to_string()
    }
}

/// Parses a `"Wpx, Hpx"` size declaration.
pub fn parse_size(value: &str) -> Option<(f64, f64)> {
    let mut parts = value.split(',').map(|part| part.trim().trim_end_matches("px").parse::<f64>());
    let width = parts.next()?.ok()?;
    let height = match parts.next() {
        Some(height) => height.ok()?,
        None => width,
    };
    Some((width, height))
}
