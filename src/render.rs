use crate::camera::Camera;
use crate::config::Tunables;
use crate::layout::Point;
use crate::scene::{NodeClass, Scene, SceneNode};
use crate::scene_builder::Drawing;
use crate::style::{self, EDGE, EMPTY_CLASS, MARKED_CLASS, NODE, ROUNDED_SHAPE};
use anyhow::Result;
use std::f64::consts::PI;
use std::path::Path;

const FONT_FAMILY: &str = "Inter, Segoe UI, system-ui, -apple-system, sans-serif";
const AUTO_LAYOUT_SPACING: f64 = 60.0;

/// Renders `drawing` as seen through `camera`.
pub fn render_svg(drawing: &Drawing, camera: &Camera) -> String {
    let scene = &drawing.scene;
    let sheet = &drawing.stylesheet;
    let (width, height) = camera.viewport();
    let view = camera.visible_bounds();
    let positions = resolve_positions(scene);

    let mut svg = String::new();
    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"{:.2} {:.2} {:.2} {:.2}\">",
        view.min_x,
        view.min_y,
        view.width(),
        view.height()
    ));
    svg.push_str(&format!(
        "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"100%\" height=\"100%\" fill=\"#FFFFFF\"/>",
        view.min_x, view.min_y
    ));

    for edge in scene.edges() {
        let (Some(from), Some(to)) = (positions.get(edge.from.0), positions.get(edge.to.0)) else {
            continue;
        };
        let classes: &[&str] = if edge.marked { &[MARKED_CLASS] } else { &[] };
        let decl = sheet.resolve(EDGE, classes, Some(&edge.id()));
        let stroke_width = decl
            .get("size")
            .and_then(|value| style::parse_size(value))
            .map(|(w, _)| w)
            .unwrap_or(1.0);
        let color = decl.get("fill-color").copied().unwrap_or("black");
        svg.push_str(&format!(
            "<line id=\"{}\" x1=\"{:.2}\" y1=\"{:.2}\" x2=\"{:.2}\" y2=\"{:.2}\" stroke=\"{}\" stroke-width=\"{}\"/>",
            edge.id(),
            from.x,
            from.y,
            to.x,
            to.y,
            color,
            style::number(stroke_width)
        ));
    }

    // Marked nodes are elevated above the rest.
    let (marked, plain): (Vec<&SceneNode>, Vec<&SceneNode>) =
        scene.nodes().iter().partition(|node| node.marked);
    for node in plain.into_iter().chain(marked) {
        let Some(center) = positions.get(node.id.0).copied() else {
            continue;
        };
        svg.push_str(&node_svg(node, center, drawing));
    }

    svg.push_str("</svg>");
    svg
}

fn node_svg(node: &SceneNode, center: Point, drawing: &Drawing) -> String {
    let mut classes = Vec::new();
    if node.marked {
        classes.push(MARKED_CLASS);
    }
    if node.class == NodeClass::Empty {
        classes.push(EMPTY_CLASS);
    }
    let id = node.id.to_string();
    let decl = drawing.stylesheet.resolve(NODE, &classes, Some(&id));
    let (width, height) = decl
        .get("size")
        .and_then(|value| style::parse_size(value))
        .unwrap_or((node.width, node.height));
    let fill = if decl.get("fill-mode") == Some(&"none") {
        "none"
    } else {
        decl.get("fill-color").copied().unwrap_or("white")
    };
    let (stroke, stroke_width) = if decl.get("stroke-mode") == Some(&"none") {
        ("none", "0")
    } else {
        (
            decl.get("stroke-color").copied().unwrap_or("black"),
            decl.get("stroke-width").copied().unwrap_or("1"),
        )
    };

    let mut out = String::new();
    if decl.get("shape") == Some(&ROUNDED_SHAPE) {
        out.push_str(&format!(
            "<rect id=\"{id}\" x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" rx=\"{:.2}\" ry=\"{:.2}\" fill=\"{fill}\" stroke=\"{stroke}\" stroke-width=\"{stroke_width}\"/>",
            center.x - width / 2.0,
            center.y - height / 2.0,
            width,
            height,
            height / 2.0,
            height / 2.0
        ));
    } else {
        out.push_str(&format!(
            "<ellipse id=\"{id}\" cx=\"{:.2}\" cy=\"{:.2}\" rx=\"{:.2}\" ry=\"{:.2}\" fill=\"{fill}\" stroke=\"{stroke}\" stroke-width=\"{stroke_width}\"/>",
            center.x,
            center.y,
            width / 2.0,
            height / 2.0
        ));
    }

    let text_size = decl.get("text-size").copied().unwrap_or("12");
    let weight = if decl.get("text-style") == Some(&"bold") {
        "bold"
    } else {
        "normal"
    };
    out.push_str(&format!(
        "<text x=\"{:.2}\" y=\"{:.2}\" text-anchor=\"middle\" dominant-baseline=\"central\" font-family=\"{FONT_FAMILY}\" font-size=\"{text_size}\" font-weight=\"{weight}\" fill=\"black\">{}</text>",
        center.x,
        center.y,
        escape_xml(&node.label)
    ));
    out
}

/// Scene positions, with nodes the tree layout left unplaced arranged on a ring.
fn resolve_positions(scene: &Scene) -> Vec<Point> {
    let count = scene.node_count();
    let radius = AUTO_LAYOUT_SPACING * count as f64 / (2.0 * PI);
    scene
        .nodes()
        .iter()
        .enumerate()
        .map(|(idx, node)| {
            node.position.unwrap_or_else(|| {
                if count <= 1 {
                    return Point::ORIGIN;
                }
                let angle = 2.0 * PI * idx as f64 / count as f64;
                Point::new(radius * angle.cos(), radius * angle.sin())
            })
        })
        .collect()
}

/// Places every unpositioned node the way [`render_svg`] shows it.
pub fn apply_auto_layout(scene: &mut Scene) {
    let positions = resolve_positions(scene);
    let unplaced: Vec<_> = scene
        .nodes()
        .iter()
        .filter(|node| node.position.is_none())
        .map(|node| node.id)
        .collect();
    for id in unplaced {
        scene.set_position(id, positions[id.0]);
    }
}

/// Places unpositioned nodes, fits a fresh camera to the scene and renders.
pub fn render_fitted(
    drawing: &mut Drawing,
    width: f64,
    height: f64,
    tunables: &Tunables,
) -> String {
    apply_auto_layout(&mut drawing.scene);
    let mut camera = Camera::new(width, height);
    if let Some(bounds) = drawing.scene.bounds() {
        camera.fit(bounds, 1.0);
    }
    camera.set_view_percent(drawing.scene.view_percent, tunables);
    render_svg(drawing, &camera)
}

pub fn write_output_svg(svg: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, svg)?;
        }
        None => {
            print!("{}", svg);
        }
    }
    Ok(())
}

#[cfg(feature = "png")]
pub fn write_output_png(svg: &str, output: &Path, width: f64, height: f64) -> Result<()> {
    let mut opt = usvg::Options::default();
    opt.font_family = "Inter".to_string();
    opt.default_size = usvg::Size::from_wh(width as f32, height as f32)
        .or_else(|| usvg::Size::from_wh(800.0, 600.0))
        .ok_or_else(|| anyhow::anyhow!("Invalid output size {width}x{height}"))?;

    let tree = usvg::Tree::from_str(svg, &opt)?;
    let size = tree.size().to_int_size();
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| anyhow::anyhow!("Failed to allocate pixmap"))?;

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(&tree, resvg::tiny_skia::Transform::default(), &mut pixmap_mut);
    pixmap.save_png(output)?;
    Ok(())
}

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
