//! import-atlas — JavaScript/TypeScript import graph explorer
//!
//! Scan a JS/TS source tree, extract import relationships into a
//! bidirectional dependency graph, and lay the graph out on a 2D canvas.
//!
//! # Features
//! - Dialect detection (TypeScript vs JavaScript) once per run
//! - Text-pattern import extraction: `import`, `require`, dynamic `import()`,
//!   including Vue/Svelte `<script>` blocks
//! - Module resolution with `@/`, `~/`, `~~/`, `@@/` aliases and the usual
//!   extension/index probing
//! - Whole-project or focused (one entry file plus its neighborhood) analysis
//! - Deterministic spiral and hierarchical layouts with position persistence
//!
//! # Quickstart (Library)
//! ```no_run
//! use import_atlas::graph::view::GraphView;
//! use import_atlas::graph::GraphBuilder;
//!
//! let builder = GraphBuilder::new(std::path::Path::new(".")).expect("open project");
//! let graph = builder.build_project();
//! let view = GraphView::build(&graph);
//! println!("files: {} edges: {}", view.nodes.len(), view.edges.len());
//! ```
//!
//! # Quickstart (CLI)
//! ```text
//! import-atlas analyze --path . --json atlas.json
//! import-atlas focus src/main.ts --path . --layout hierarchical
//! ```
//!
//! # Ignore Behavior
//! The root `.gitignore` is honored (last matching rule wins); `node_modules`
//! and build-output directories are always skipped.
pub mod app;
pub mod cli;
pub mod errors;
pub mod filter;
pub mod graph;
pub mod layout;
pub mod parser;
pub mod scanner;
pub mod utils;
