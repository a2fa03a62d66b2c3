use crate::cli::{Cli, Commands, LayoutArg, OutputFormat};
use crate::errors::AnalysisError;
use crate::graph::view::{GraphEdge, GraphNode, GraphView};
use crate::graph::GraphBuilder;
use crate::layout::{
    approx_text_size, Algorithm, LayoutEngine, LayoutOptions, NodeBox, Point, PositionMap,
    PositionStore,
};
use crate::utils::{config, positions, project_root, table};
use clap::CommandFactory;
use clap_complete::generate;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Everything the JSON outputs carry: the view plus computed positions.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Snapshot<'a> {
    nodes: &'a [GraphNode],
    edges: &'a [GraphEdge],
    positions: &'a BTreeMap<String, NodeBox>,
    entry_missing: bool,
}

struct RunArgs {
    path: PathBuf,
    entry: Option<PathBuf>,
    config: Option<PathBuf>,
    json: Option<PathBuf>,
    layout: LayoutArg,
    positions: Option<PathBuf>,
    no_positions: bool,
    format: OutputFormat,
    quiet: bool,
    verbose: u8,
}

/// Run the CLI logic in-process.
///
/// Returns an exit code (0 = success).
#[must_use]
pub fn run_cli(cli: Cli) -> i32 {
    match cli.command {
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            let bin_name = env!("CARGO_PKG_NAME");
            let mut out = io::stdout();
            generate(shell, &mut cmd, bin_name, &mut out);
            0
        }
        Commands::Analyze { path, config, json, layout, positions, no_positions, format } => {
            run_analysis(RunArgs {
                path,
                entry: None,
                config,
                json,
                layout,
                positions,
                no_positions,
                format,
                quiet: cli.quiet,
                verbose: cli.verbose,
            })
        }
        Commands::Focus { entry, path, config, json, layout, positions, no_positions, format } => {
            run_analysis(RunArgs {
                path,
                entry: Some(entry),
                config,
                json,
                layout,
                positions,
                no_positions,
                format,
                quiet: cli.quiet,
                verbose: cli.verbose,
            })
        }
    }
}

fn run_analysis(args: RunArgs) -> i32 {
    let root = project_root::effective_path_opt(Some(&args.path));

    // Flags first, then config overrides, as for every tunable below.
    let cfg = match args.config.as_ref() {
        Some(p) => config::load_config_at(p),
        None => config::load_config_near(&root),
    };
    let mut opts = LayoutOptions::default();
    let mut algorithm = match args.layout {
        LayoutArg::Spiral => Algorithm::Spiral,
        LayoutArg::Hierarchical => Algorithm::Hierarchical,
    };
    let mut format = args.format;
    if let Some(cfg) = cfg {
        if let Some(layout) = cfg.layout {
            if let Some(v) = layout.canvas_width {
                opts.canvas_width = v;
            }
            if let Some(v) = layout.canvas_height {
                opts.canvas_height = v;
            }
            if let Some(v) = layout.margin {
                opts.margin = v;
            }
            if let Some(v) = layout.algorithm {
                algorithm = if v == "hierarchical" {
                    Algorithm::Hierarchical
                } else {
                    Algorithm::Spiral
                };
            }
        }
        if let Some(output) = cfg.output {
            match output.default_format.as_deref() {
                Some("json") => format = OutputFormat::Json,
                Some("text") => format = OutputFormat::Text,
                _ => {}
            }
        }
    }

    let builder = match GraphBuilder::new(&root) {
        Ok(b) => b,
        Err(e) => {
            eprintln!("Analysis failed: {e}");
            return 1;
        }
    };
    let graph = match args.entry.as_ref() {
        Some(entry) => builder.build_focused(entry),
        None => builder.build_project(),
    };
    let view = GraphView::build(&graph);

    let engine = LayoutEngine::new(opts);
    let mut store = (!args.no_positions && !graph.entry_missing).then(|| {
        match args.positions.as_ref() {
            Some(p) => positions::JsonFileStore::at(p.clone()),
            None => positions::JsonFileStore::open(builder.root()),
        }
    });
    let key = positions::identity(builder.root(), graph.entry.as_deref());
    let saved = store.as_ref().and_then(|s| s.get(&key));
    let boxes = engine.layout(&view, algorithm, &approx_text_size, saved.as_ref());
    if let Some(store) = store.as_mut() {
        let points: PositionMap =
            boxes.iter().map(|(id, b)| (id.clone(), Point { x: b.x, y: b.y })).collect();
        store.set(&key, &points);
        store.save();
    }

    let snapshot = Snapshot {
        nodes: &view.nodes,
        edges: &view.edges,
        positions: &boxes,
        entry_missing: graph.entry_missing,
    };
    if let Some(json_path) = args.json.as_ref() {
        if let Err(e) = write_snapshot(json_path, &snapshot) {
            eprintln!("Failed to write JSON output {}: {e}", json_path.display());
        }
    }

    match format {
        OutputFormat::Json => match serde_json::to_string_pretty(&snapshot) {
            Ok(s) => println!("{s}"),
            Err(e) => {
                eprintln!("JSON encode error: {e}");
                return 1;
            }
        },
        OutputFormat::Text => {
            if args.quiet {
                return 0;
            }
            if graph.entry_missing {
                if let Some(entry) = args.entry.as_ref() {
                    println!("Entry not found: {}", entry.display());
                }
                return 0;
            }
            let internal = view.nodes.iter().filter(|n| !n.is_external).count();
            let external = view.nodes.len() - internal;
            println!(
                "Analyzed {} files: {} edges, {} external packages",
                internal,
                view.edges.len(),
                external
            );
            // -v lifts the row cap so the table covers the whole project.
            let cap = if args.verbose > 0 { usize::MAX } else { 10 };
            let rows = degree_rows(&view, cap);
            if !rows.is_empty() {
                println!("{}", table::render(&["Path", "In", "Out"], &rows));
            }
        }
    }
    0
}

fn write_snapshot(path: &Path, snapshot: &Snapshot) -> Result<(), AnalysisError> {
    let text = serde_json::to_string_pretty(snapshot)?;
    fs::write(path, text)?;
    Ok(())
}

/// Top internal files by connection count. An edge's `from` side is the
/// imported file (In), its `to` side the importer (Out).
fn degree_rows(view: &GraphView, cap: usize) -> Vec<Vec<String>> {
    let mut by_id: BTreeMap<&str, (usize, usize)> = view
        .nodes
        .iter()
        .filter(|n| !n.is_external)
        .map(|n| (n.id.as_str(), (0, 0)))
        .collect();
    for edge in &view.edges {
        if let Some(d) = by_id.get_mut(edge.from.as_str()) {
            d.0 += 1;
        }
        if let Some(d) = by_id.get_mut(edge.to.as_str()) {
            d.1 += 1;
        }
    }
    let mut rows: Vec<(&str, usize, usize)> =
        by_id.into_iter().map(|(id, (i, o))| (id, i, o)).collect();
    rows.sort_by(|a, b| (b.1 + b.2).cmp(&(a.1 + a.2)).then(a.0.cmp(b.0)));
    rows.truncate(cap);
    rows.into_iter()
        .map(|(id, i, o)| vec![id.to_string(), i.to_string(), o.to_string()])
        .collect()
}
