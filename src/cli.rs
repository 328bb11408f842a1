use crate::config::{LayoutConfig, LayoutMode, YOffsetMode, load_config};
use crate::ir::{TreeNode, parse_tree};
use crate::layout_dump::write_layout_dump;
use crate::render::{render_fitted, write_output_svg};
use crate::sample::{k_ary_tree, sequential_values};
use crate::scene_builder::draw_tree;
use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "treeviz", version, about = "Lay out and render tree structures")]
pub struct Args {
    /// Input tree document (JSON/JSON5) or '-' for stdin
    #[arg(short = 'i', long = "input", conflicts_with = "sample")]
    pub input: Option<PathBuf>,

    /// Output file (svg/png/json). Defaults to stdout for SVG if omitted.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short = 'e', long = "outputFormat", value_enum, default_value = "svg")]
    pub output_format: OutputFormat,

    /// Config JSON file
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Branching factor, overrides the config file
    #[arg(short = 'k', long = "branching")]
    pub branching_factor: Option<u32>,

    /// Layout mode, overrides the config file
    #[arg(short = 'l', long = "layout", value_enum)]
    pub layout: Option<LayoutArg>,

    /// Sibling y offset mode, overrides the config file
    #[arg(long = "yOffset", value_enum)]
    pub y_offset: Option<YOffsetArg>,

    /// Draw a generated k-ary sample tree with this many nodes instead of reading input
    #[arg(long = "sample")]
    pub sample: Option<usize>,

    /// Keys per node of the generated sample tree
    #[arg(long = "keysPerNode", default_value_t = 1)]
    pub keys_per_node: usize,

    /// Width
    #[arg(short = 'w', long = "width", default_value_t = 1200.0)]
    pub width: f64,

    /// Height
    #[arg(short = 'H', long = "height", default_value_t = 800.0)]
    pub height: f64,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum OutputFormat {
    Svg,
    Png,
    Json,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum LayoutArg {
    None,
    Down,
    Up,
}

impl From<LayoutArg> for LayoutMode {
    fn from(value: LayoutArg) -> Self {
        match value {
            LayoutArg::None => LayoutMode::None,
            LayoutArg::Down => LayoutMode::TreeDown,
            LayoutArg::Up => LayoutMode::TreeUp,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum YOffsetArg {
    On,
    Off,
    Auto,
}

impl From<YOffsetArg> for YOffsetMode {
    fn from(value: YOffsetArg) -> Self {
        match value {
            YOffsetArg::On => YOffsetMode::On,
            YOffsetArg::Off => YOffsetMode::Off,
            YOffsetArg::Auto => YOffsetMode::Auto,
        }
    }
}

pub fn run() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::parse();
    let config = build_config(&args)?;

    let tree = match args.sample {
        Some(count) => k_ary_tree(
            config.branching_factor() as usize,
            args.keys_per_node,
            &sequential_values(count),
        ),
        None => read_tree(args.input.as_deref())?,
    };

    let mut drawing = draw_tree(tree.as_ref(), &config)?;
    log::info!(
        "drew {} nodes (depth {})",
        drawing.metrics.node_count,
        drawing.metrics.max_depth
    );

    if let OutputFormat::Json = args.output_format {
        let output = ensure_output(&args.output, "json")?;
        return write_layout_dump(&output, &drawing);
    }

    let svg = render_fitted(&mut drawing, args.width, args.height, config.tunables());

    match args.output_format {
        OutputFormat::Svg => write_output_svg(&svg, args.output.as_deref()),
        OutputFormat::Png => write_png(&svg, &args),
        OutputFormat::Json => Ok(()),
    }
}

fn build_config(args: &Args) -> Result<LayoutConfig> {
    let mut config = match args.config.as_deref() {
        Some(path) => load_config(path)?,
        None => LayoutConfig::new(args.branching_factor.unwrap_or(2))?,
    };
    if let Some(k) = args.branching_factor {
        config.set_branching_factor(k)?;
    }
    if let Some(layout) = args.layout {
        config.set_layout_mode(layout.into());
    }
    if let Some(y_offset) = args.y_offset {
        config.set_y_offset_mode(y_offset.into());
    }
    Ok(config)
}

fn read_tree(path: Option<&Path>) -> Result<Option<TreeNode>> {
    let input = match path {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path)?,
        _ => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };
    Ok(parse_tree(&input)?)
}

fn ensure_output(output: &Option<PathBuf>, ext: &str) -> Result<PathBuf> {
    if let Some(path) = output {
        return Ok(path.clone());
    }
    Err(anyhow::anyhow!("Output path required for {} output", ext))
}

#[cfg(feature = "png")]
fn write_png(svg: &str, args: &Args) -> Result<()> {
    let output = ensure_output(&args.output, "png")?;
    crate::render::write_output_png(svg, &output, args.width, args.height)
}

#[cfg(not(feature = "png"))]
fn write_png(_svg: &str, _args: &Args) -> Result<()> {
    Err(anyhow::anyhow!("PNG output requires the `png` feature"))
}
