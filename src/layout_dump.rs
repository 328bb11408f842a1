use crate::scene_builder::Drawing;
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawingDump {
    pub node_count: usize,
    pub max_depth: usize,
    pub has_multiple_key_nodes: bool,
    pub view_percent: f64,
    pub rounded_nodes: bool,
    pub nodes: Vec<NodeDump>,
    pub edges: Vec<EdgeDump>,
    pub stylesheet: String,
}

#[derive(Debug, Serialize)]
pub struct NodeDump {
    pub id: String,
    pub label: String,
    pub class: String,
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub width: f64,
    pub height: f64,
    pub fill: Option<String>,
    pub marked: bool,
    pub depth: usize,
    pub parent: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct EdgeDump {
    pub id: String,
    pub from: String,
    pub to: String,
    pub marked: bool,
}

impl DrawingDump {
    pub fn from_drawing(drawing: &Drawing) -> Self {
        let scene = &drawing.scene;
        let nodes = scene
            .nodes()
            .iter()
            .map(|node| NodeDump {
                id: node.id.to_string(),
                label: node.label.clone(),
                class: format!("{:?}", node.class).to_lowercase(),
                x: node.position.map(|p| p.x),
                y: node.position.map(|p| p.y),
                width: node.width,
                height: node.height,
                fill: node.fill.map(|color| color.css()),
                marked: node.marked,
                depth: node.depth,
                parent: node.parent.map(|id| id.to_string()),
            })
            .collect();

        let edges = scene
            .edges()
            .iter()
            .map(|edge| EdgeDump {
                id: edge.id(),
                from: edge.from.to_string(),
                to: edge.to.to_string(),
                marked: edge.marked,
            })
            .collect();

        DrawingDump {
            node_count: drawing.metrics.node_count,
            max_depth: drawing.metrics.max_depth,
            has_multiple_key_nodes: drawing.metrics.has_multiple_key_nodes,
            view_percent: scene.view_percent,
            rounded_nodes: scene.rounded_nodes,
            nodes,
            edges,
            stylesheet: drawing.stylesheet.to_css(),
        }
    }
}

pub fn write_layout_dump(path: &Path, drawing: &Drawing) -> anyhow::Result<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    let dump = DrawingDump::from_drawing(drawing);
    serde_json::to_writer_pretty(writer, &dump)?;
    Ok(())
}

pub fn layout_dump_string(drawing: &Drawing) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(&DrawingDump::from_drawing(drawing))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LayoutConfig;
    use crate::ir::TreeNode;
    use crate::scene_builder::draw_tree;

    #[test]
    fn dump_lists_nodes_edges_and_sheet() {
        let root = TreeNode::new(["r"], vec![None, Some(TreeNode::leaf(["c"]))]);
        let drawing = draw_tree(Some(&root), &LayoutConfig::new(2).unwrap()).unwrap();
        let dump = layout_dump_string(&drawing).unwrap();
        let json: serde_json::Value = serde_json::from_str(&dump).unwrap();
        assert_eq!(json["nodeCount"], 2);
        assert_eq!(json["nodes"][1]["parent"], "n0");
        assert_eq!(json["nodes"][1]["class"], "regular");
        assert_eq!(json["edges"][0]["id"], "n0ton1");
        assert!(json["stylesheet"].as_str().unwrap().starts_with("node {"));
    }
}
