//! Trellis CLI - lay out a JSON scene and print the result
//!
//! Usage:
//!   trellis <scene.json>                          Print the layout tree
//!   trellis <scene.json> --format json            Print layout and diagnostics as JSON
//!   trellis <scene.json> --hover button           Lay out with `#button` hovered
//!   trellis <scene.json> --update text --width 120 --height 40
//!                                                 Re-lay out after a content size change

mod scene;

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::info;
use owo_colors::OwoColorize;
use serde::Serialize;
use trellis_common::warning::clear_warnings;
use trellis_css::{
    Axis, Diagnostic, DiagnosticKind, EdgeSizes, LayoutBox, LayoutEngine, LayoutOutput,
    LayoutUpdate, Size,
};
use trellis_dom::DomTree;

use scene::Scene;

/// Trellis - box, flex, table, list and positioned layout for a JSON scene
#[derive(Parser, Debug)]
#[command(name = "trellis")]
#[command(author, version, about, long_about = None)]
#[command(after_help = r#"EXAMPLES:
    # Print the layout tree
    trellis scene.json

    # JSON output
    trellis scene.json --format json

    # Apply :hover rules to two elements
    trellis scene.json --hover menu --hover item-2

    # Give #label a 120x40 content size and show what moved
    trellis scene.json --update label --width 120 --height 40

Set RUST_LOG=debug to trace the layout passes.
"#)]
struct Cli {
    /// Scene file (JSON)
    #[arg(value_name = "SCENE")]
    scene: PathBuf,

    /// Output format
    #[arg(long, value_enum, default_value_t = Format::Tree)]
    format: Format,

    /// Mark the element with this id as hovered (repeatable)
    #[arg(long, value_name = "ID")]
    hover: Vec<String>,

    /// After the first pass, give the element with this id a new content size
    #[arg(long, value_name = "ID", requires_all = ["width", "height"])]
    update: Option<String>,

    /// Content width for --update
    #[arg(long, requires = "update")]
    width: Option<f32>,

    /// Content height for --update
    #[arg(long, requires = "update")]
    height: Option<f32>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    /// Indented, colored box tree
    Tree,
    /// Pretty-printed JSON
    Json,
}

/// JSON output document.
#[derive(Serialize)]
struct Report<'a> {
    layout: &'a LayoutOutput,
    #[serde(skip_serializing_if = "Option::is_none")]
    update: Option<&'a LayoutUpdate>,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    clear_warnings();
    let source = fs::read_to_string(&cli.scene)
        .with_context(|| format!("failed to read {}", cli.scene.display()))?;
    let mut scene = Scene::from_json(&source)
        .with_context(|| format!("failed to load {}", cli.scene.display()))?;

    for id in &cli.hover {
        let node = scene.find(id)?;
        scene.resolver.set_hovered(node, true);
    }

    let mut engine = LayoutEngine::with_config(scene.config);
    let output = engine
        .layout(&scene.tree, &scene.resolver, &scene.viewport)
        .context("layout failed")?;
    info!("layout pass produced {} diagnostics", output.diagnostics.len());

    let update = match (&cli.update, cli.width, cli.height) {
        (Some(id), Some(width), Some(height)) => {
            let node = scene.find(id)?;
            let update = engine
                .update(
                    &scene.tree,
                    &scene.resolver,
                    &scene.viewport,
                    node,
                    Size::new(width, height),
                )
                .with_context(|| format!("update of #{id} failed"))?;
            Some(update)
        }
        _ => None,
    };

    match cli.format {
        Format::Json => {
            let report = Report {
                layout: &output,
                update: update.as_ref(),
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Format::Tree => {
            println!(
                "=== Layout Tree (viewport: {}x{}) ===\n",
                scene.viewport.width, scene.viewport.height
            );
            print_layout_box(&output.root, 0, &scene.tree);
            print_diagnostics(&output.diagnostics, &scene.tree);
            if let Some(update) = &update {
                print_update(update, &scene.tree);
            }
        }
    }
    Ok(())
}

/// `<tag id="..."> (#n)` for a box.
fn box_name(layout_box: &LayoutBox, tree: &DomTree) -> String {
    let id = tree
        .element(layout_box.node)
        .and_then(|element| element.id.as_deref())
        .map(|id| format!(" id=\"{id}\""))
        .unwrap_or_default();
    format!("<{}{id}> ({})", layout_box.kind, layout_box.node)
}

fn edges_line(label: &str, edges: &EdgeSizes) -> Option<String> {
    if edges.top == 0.0 && edges.right == 0.0 && edges.bottom == 0.0 && edges.left == 0.0 {
        return None;
    }
    Some(format!(
        "{label}: t={:.1} r={:.1} b={:.1} l={:.1}",
        edges.top, edges.right, edges.bottom, edges.left
    ))
}

/// Recursively print a layout box with its dimensions
fn print_layout_box(layout_box: &LayoutBox, depth: usize, tree: &DomTree) {
    let indent = "  ".repeat(depth);
    println!(
        "{indent}[{}] {}{}",
        box_name(layout_box, tree).cyan(),
        layout_box.display.green(),
        if layout_box.position.is_positioned() {
            format!(" {}", layout_box.position.yellow())
        } else {
            String::new()
        }
    );

    print_box_details(layout_box, &indent);
    println!();

    for child in &layout_box.children {
        print_layout_box(child, depth + 1, tree);
    }
}

fn print_box_details(layout_box: &LayoutBox, indent: &str) {
    let content = layout_box.absolute;
    println!(
        "{indent}  content: x={:.1} y={:.1} w={:.1} h={:.1}",
        content.x, content.y, content.width, content.height
    );
    let dims = &layout_box.dimensions;
    for line in [
        edges_line("margin", &dims.margin),
        edges_line("border", &dims.border),
        edges_line("padding", &dims.padding),
    ]
    .into_iter()
    .flatten()
    {
        println!("{indent}  {line}");
    }
    if layout_box.depth != 0.0 {
        println!(
            "{indent}  depth: {} paint: {}",
            layout_box.depth.magenta(),
            layout_box.paint_order
        );
    }
    if let Some(marker) = &layout_box.marker {
        println!("{indent}  marker: {marker}");
    }
    for line in &layout_box.text_lines {
        println!("{indent}  \"{}\"", line.dimmed());
    }
}

fn print_diagnostics(diagnostics: &[Diagnostic], tree: &DomTree) {
    if diagnostics.is_empty() {
        return;
    }
    println!("=== Diagnostics ({}) ===", diagnostics.len());
    for diagnostic in diagnostics {
        let tag = tree
            .element(diagnostic.node)
            .map_or("?", |element| element.kind.tag_name());
        let message = match diagnostic.kind {
            DiagnosticKind::ContentSizingFallback { width, height } => {
                format!("no content size, used {width:.1}x{height:.1}")
            }
            DiagnosticKind::Overflow { axis, amount } => {
                let axis = match axis {
                    Axis::Horizontal => "horizontally",
                    Axis::Vertical => "vertically",
                };
                format!("content overflows {axis} by {amount:.1}")
            }
        };
        println!(
            "  {} <{tag}> ({}): {message}",
            "warning".yellow().bold(),
            diagnostic.node
        );
    }
    println!();
}

fn print_update(update: &LayoutUpdate, tree: &DomTree) {
    println!(
        "=== Update (re-layout from {}, {} changed) ===\n",
        update.relayout_root,
        update.changed.len()
    );
    for layout_box in &update.boxes {
        println!("[{}]", box_name(layout_box, tree).cyan());
        print_box_details(layout_box, "");
    }
    print_diagnostics(&update.diagnostics, tree);
}
