use std::fs;
use std::path::Path;

use import_atlas::graph::view::GraphView;
use import_atlas::graph::GraphBuilder;
use import_atlas::parser::ImportKind;

fn write_file(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent);
    }
    fs::write(path, content).unwrap();
}

#[test]
fn typescript_project_skips_compiled_siblings() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write_file(&root.join("tsconfig.json"), "{}");
    write_file(&root.join("main.ts"), "import './util';\n");
    write_file(&root.join("util.ts"), "export const u = 1;\n");
    // Compiled artifact sitting next to its source.
    write_file(&root.join("util.js"), "exports.u = 1;\n");
    // A plain .js with no TS sibling stays analyzable.
    write_file(&root.join("legacy.js"), "");

    let graph = GraphBuilder::new(root).unwrap().build_project();
    let names: Vec<&str> = graph.files.values().map(|r| r.name.as_str()).collect();
    assert!(names.contains(&"main.ts"));
    assert!(names.contains(&"util.ts"));
    assert!(names.contains(&"legacy.js"));
    assert!(!names.contains(&"util.js"));
}

#[test]
fn javascript_project_does_not_pick_up_typescript_files() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write_file(&root.join("package.json"), r#"{"dependencies":{"express":"^4"}}"#);
    write_file(&root.join("index.js"), "const app = require('./app');\n");
    write_file(&root.join("app.js"), "");
    write_file(&root.join("stray.ts"), "");

    let graph = GraphBuilder::new(root).unwrap().build_project();
    let names: Vec<&str> = graph.files.values().map(|r| r.name.as_str()).collect();
    assert!(names.contains(&"index.js"));
    assert!(names.contains(&"app.js"));
    assert!(!names.contains(&"stray.ts"));
}

#[test]
fn alias_imports_resolve_into_the_source_dir() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write_file(&root.join("tsconfig.json"), "{}");
    write_file(&root.join("src/components/button.ts"), "import helper from '@/utils/helper';\n");
    write_file(&root.join("src/utils/helper.ts"), "export default {};\n");
    write_file(&root.join("root-level.ts"), "import b from '~~/src/components/button';\n");

    let graph = GraphBuilder::new(root).unwrap().build_project();
    let button = graph
        .files
        .values()
        .find(|r| r.name == "button.ts")
        .expect("button record");
    let resolved = button.imports[0].resolved.as_ref().expect("alias resolves");
    assert!(resolved.ends_with("src/utils/helper.ts"));

    let root_level = graph.files.values().find(|r| r.name == "root-level.ts").unwrap();
    let resolved = root_level.imports[0].resolved.as_ref().expect("root alias resolves");
    assert!(resolved.ends_with("src/components/button.ts"));
}

#[test]
fn vue_script_block_imports_are_extracted() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write_file(
        &root.join("App.vue"),
        "<template>\n  <div>import fake from './nope'</div>\n</template>\n<script>\nimport dep from './dep';\nexport default {};\n</script>\n",
    );
    write_file(&root.join("dep.js"), "");

    let graph = GraphBuilder::new(root).unwrap().build_project();
    let app = graph.files.values().find(|r| r.name == "App.vue").unwrap();
    assert_eq!(app.imports.len(), 1);
    assert_eq!(app.imports[0].raw_source, "./dep");
    assert!(app.imports[0].resolved.as_ref().unwrap().ends_with("dep.js"));
}

#[test]
fn index_files_resolve_from_directory_imports() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write_file(&root.join("main.js"), "import comp from './components';\n");
    write_file(&root.join("components/index.js"), "");

    let graph = GraphBuilder::new(root).unwrap().build_project();
    let main = graph.files.values().find(|r| r.name == "main.js").unwrap();
    assert!(main.imports[0].resolved.as_ref().unwrap().ends_with("components/index.js"));
}

#[test]
fn view_serializes_with_camel_case_keys_and_kebab_kinds() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write_file(
        &root.join("a.js"),
        "import './b';\nconst lazy = () => import('./c');\nconst d = require('./d');\n",
    );
    write_file(&root.join("b.js"), "");
    write_file(&root.join("c.js"), "");
    write_file(&root.join("d.js"), "");

    let graph = GraphBuilder::new(root).unwrap().build_project();
    let view = GraphView::build(&graph);
    let v = serde_json::to_value(&view.nodes).unwrap();
    let first = &v.as_array().unwrap()[0];
    assert!(first.get("isExternal").is_some());
    assert!(first.get("isEntry").is_some());
    assert!(first.get("is_external").is_none());

    let kinds: Vec<String> = view
        .edges
        .iter()
        .map(|e| serde_json::to_value(e.kind).unwrap().as_str().unwrap().to_string())
        .collect();
    assert!(kinds.contains(&"import".to_string()));
    assert!(kinds.contains(&"dynamic-import".to_string()));
    assert!(kinds.contains(&"require".to_string()));
}

#[test]
fn edges_point_from_dependency_to_dependent() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write_file(&root.join("a.js"), "import './b';\n");
    write_file(&root.join("b.js"), "");

    let graph = GraphBuilder::new(root).unwrap().build_project();
    let view = GraphView::build(&graph);
    let edge = &view.edges[0];
    assert!(edge.from.ends_with("b.js"), "from is the imported file");
    assert!(edge.to.ends_with("a.js"), "to is the importer");
    assert_eq!(edge.kind, ImportKind::Import);
}

#[test]
fn dialect_falls_back_to_statement_sampling() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    // No manifests and a 1-1 extension tie, so the require-vs-import
    // sample decides.
    write_file(
        &root.join("one.js"),
        "const a = require('./two');\nconst b = require('./two');\nrequire('./two');\n",
    );
    write_file(&root.join("stray.ts"), "");
    write_file(&root.join("two.mjs"), "");

    let graph = GraphBuilder::new(root).unwrap().build_project();
    // More requires than imports: JavaScript, so the stray .ts is excluded.
    assert!(!graph.files.values().any(|r| r.name == "stray.ts"));
    assert!(graph.files.values().any(|r| r.name == "one.js"));
    assert!(graph.files.values().any(|r| r.name == "two.mjs"));
}
