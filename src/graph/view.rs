//! Renderer-facing snapshot of a built graph: flat node and edge lists with
//! synthetic nodes for external dependencies.

use super::{AnalysisMode, DependencyGraph};
use crate::parser::ImportKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphNode {
    pub id: String,
    pub label: String,
    pub path: String,
    pub is_external: bool,
    pub is_entry: bool,
}

/// `from` is the dependency, `to` the file that imports it.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphEdge {
    pub from: String,
    pub to: String,
    pub kind: ImportKind,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphView {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

impl GraphView {
    /// Flattens a graph. Every record becomes a node. External imports
    /// become `ext:` nodes for every file in whole-project mode, but only
    /// for the entry file in focused mode. Both endpoints of every emitted
    /// edge are guaranteed to be in the node list.
    #[must_use]
    pub fn build(graph: &DependencyGraph) -> Self {
        let mut nodes = Vec::with_capacity(graph.files.len());
        let mut edges: BTreeSet<GraphEdge> = BTreeSet::new();
        let mut externals: BTreeSet<(String, String)> = BTreeSet::new();

        for (path, record) in &graph.files {
            let id = node_id(path);
            let is_entry = graph.entry.as_deref() == Some(path.as_path());
            nodes.push(GraphNode {
                id: id.clone(),
                label: record.name.clone(),
                path: path.to_string_lossy().replace('\\', "/"),
                is_external: false,
                is_entry,
            });
            let include_externals = match graph.mode {
                AnalysisMode::Project => true,
                AnalysisMode::Focused => is_entry,
            };
            for imp in &record.imports {
                if let Some(resolved) = &imp.resolved {
                    if resolved != path && graph.files.contains_key(resolved) {
                        edges.insert(GraphEdge {
                            from: node_id(resolved),
                            to: id.clone(),
                            kind: imp.kind,
                        });
                    }
                } else if imp.is_external && include_externals {
                    let ext = external_id(&imp.raw_source);
                    externals.insert((ext.clone(), imp.raw_source.clone()));
                    edges.insert(GraphEdge { from: ext, to: id.clone(), kind: imp.kind });
                }
            }
        }

        for (ext, source) in externals {
            nodes.push(GraphNode {
                id: ext,
                label: source.clone(),
                path: source,
                is_external: true,
                is_entry: false,
            });
        }

        Self { nodes, edges: edges.into_iter().collect() }
    }

    #[must_use]
    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.iter().find(|n| n.id == id)
    }
}

fn node_id(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

fn external_id(source: &str) -> String {
    format!("ext:{source}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::GraphBuilder;
    use std::fs;
    use tempfile::tempdir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    fn ids(view: &GraphView) -> BTreeSet<String> {
        view.nodes.iter().map(|n| n.id.clone()).collect()
    }

    #[test]
    fn test_edges_point_from_dependency_to_dependent() {
        let td = tempdir().unwrap();
        write(td.path(), "a.js", "import './b';\n");
        write(td.path(), "b.js", "");
        let graph = GraphBuilder::new(td.path()).unwrap().build_project();
        let view = GraphView::build(&graph);

        assert_eq!(view.edges.len(), 1);
        let edge = &view.edges[0];
        assert!(edge.from.ends_with("b.js"));
        assert!(edge.to.ends_with("a.js"));
        assert_eq!(edge.kind, ImportKind::Import);
    }

    #[test]
    fn test_project_mode_collects_every_external() {
        let td = tempdir().unwrap();
        write(td.path(), "a.js", "import 'vue';\n");
        write(td.path(), "b.js", "import 'vue';\nimport 'pinia';\n");
        let graph = GraphBuilder::new(td.path()).unwrap().build_project();
        let view = GraphView::build(&graph);

        let id_set = ids(&view);
        assert!(id_set.contains("ext:vue"));
        assert!(id_set.contains("ext:pinia"));
        let vue = view.node("ext:vue").unwrap();
        assert!(vue.is_external);
        assert_eq!(vue.label, "vue");
        // One node per distinct source, however many importers.
        assert_eq!(view.nodes.iter().filter(|n| n.is_external).count(), 2);
        assert_eq!(view.edges.iter().filter(|e| e.from == "ext:vue").count(), 2);
    }

    #[test]
    fn test_focused_mode_keeps_externals_of_entry_only() {
        let td = tempdir().unwrap();
        write(td.path(), "e.js", "import 'vue';\nimport './a';\n");
        write(td.path(), "a.js", "import 'lodash';\nimport './e';\n");
        let builder = GraphBuilder::new(td.path()).unwrap();
        let graph = builder.build_focused(&td.path().join("e.js"));
        let view = GraphView::build(&graph);

        let id_set = ids(&view);
        assert!(id_set.contains("ext:vue"));
        assert!(!id_set.contains("ext:lodash"));
    }

    #[test]
    fn test_entry_flag_marks_exactly_the_entry_node() {
        let td = tempdir().unwrap();
        write(td.path(), "e.js", "import './a';\n");
        write(td.path(), "a.js", "");
        let builder = GraphBuilder::new(td.path()).unwrap();
        let graph = builder.build_focused(&td.path().join("e.js"));
        let view = GraphView::build(&graph);

        let entries: Vec<_> = view.nodes.iter().filter(|n| n.is_entry).collect();
        assert_eq!(entries.len(), 1);
        assert!(entries[0].id.ends_with("e.js"));
    }

    #[test]
    fn test_no_dangling_edges() {
        let td = tempdir().unwrap();
        write(td.path(), "e.js", "import './a';\nimport 'vue';\nimport './gone';\n");
        write(td.path(), "a.js", "import './b';\n");
        write(td.path(), "b.js", "const x = require('fs');\n");
        let graph = GraphBuilder::new(td.path()).unwrap().build_project();
        let view = GraphView::build(&graph);

        let id_set = ids(&view);
        for edge in &view.edges {
            assert!(id_set.contains(&edge.from), "dangling from: {}", edge.from);
            assert!(id_set.contains(&edge.to), "dangling to: {}", edge.to);
        }
    }

    #[test]
    fn test_unresolved_internal_import_emits_no_edge() {
        let td = tempdir().unwrap();
        write(td.path(), "a.js", "import './missing';\n");
        let graph = GraphBuilder::new(td.path()).unwrap().build_project();
        let view = GraphView::build(&graph);
        assert!(view.edges.is_empty());
        assert_eq!(view.nodes.len(), 1);
    }
}
