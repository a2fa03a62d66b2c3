//! Graph model and builder.
//!
//! This module defines the dependency-graph structures (`DependencyGraph`,
//! `FileRecord`, `ImportReference`) and the two-pass build that populates
//! them: pass 1 reads, extracts, and resolves every discovered file; pass 2
//! inverts the resolved imports into each target's `imported_by` set.
//!
//! You typically construct a graph via `GraphBuilder` and pass it to
//! `crate::graph::view` and `crate::layout`.
use crate::errors::{AnalysisError, ExtractError};
use crate::filter::PathFilter;
use crate::parser::{FileKind, ImportKind, ImportParser, RawImport};
use crate::scanner::SourceScanner;
use log::{debug, warn};
use rayon::prelude::*;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

pub mod resolver;
pub mod view;

use resolver::{ModuleResolver, SourceKind};

/// One import statement after classification and resolution. Never mutated
/// once created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportReference {
    pub raw_source: String,
    pub kind: ImportKind,
    pub is_external: bool,
    pub resolved: Option<PathBuf>,
}

/// One analyzable file and its known import relationships.
///
/// `imported_by` is the exact inverse of every other record's resolved
/// imports pointing at this path. That is a standing invariant of a built
/// graph, not a cache.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileRecord {
    pub path: PathBuf,
    pub name: String,
    pub imports: Vec<ImportReference>,
    pub imported_by: BTreeSet<PathBuf>,
}

impl FileRecord {
    fn new(path: PathBuf, imports: Vec<ImportReference>) -> Self {
        let name = file_label(&path);
        Self { path, name, imports, imported_by: BTreeSet::new() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisMode {
    Project,
    Focused,
}

/// A fully built graph for one analysis invocation. Rebuilt from scratch on
/// every run; records are created in pass 1 and only appended to in pass 2.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyGraph {
    pub files: BTreeMap<PathBuf, FileRecord>,
    pub entry: Option<PathBuf>,
    pub entry_missing: bool,
    pub mode: AnalysisMode,
}

impl DependencyGraph {
    fn new(mode: AnalysisMode) -> Self {
        Self { files: BTreeMap::new(), entry: None, entry_missing: false, mode }
    }

    #[must_use]
    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    /// Inserts an empty-import record for a resolved target that was not in
    /// the scan set (a literal hit on a non-analyzable file), so pass 2
    /// never appends to a missing key.
    fn ensure_record(&mut self, path: &Path) {
        if !self.files.contains_key(path) {
            self.files.insert(path.to_path_buf(), FileRecord::new(path.to_path_buf(), Vec::new()));
        }
    }

    /// Pass 2: append each importing path onto its target's `imported_by`.
    /// The set insert is idempotent, so duplicate or re-ordered processing
    /// converges on the same state.
    fn link_importers(&mut self) {
        let pairs: Vec<(PathBuf, PathBuf)> = self
            .files
            .values()
            .flat_map(|record| {
                record
                    .imports
                    .iter()
                    .filter_map(|imp| imp.resolved.clone())
                    .filter(|to| *to != record.path && self.files.contains_key(to))
                    .map(|to| (to, record.path.clone()))
                    .collect::<Vec<_>>()
            })
            .collect();
        for (to, from) in pairs {
            if let Some(record) = self.files.get_mut(&to) {
                record.imported_by.insert(from);
            }
        }
    }
}

/// Orchestrates scanning, extraction, and resolution into a consistent
/// bidirectional graph.
///
/// A builder is constructed fresh per analysis invocation: the ignore rules
/// are loaded once here and threaded into both scanning and resolution, and
/// nothing is retained across runs.
pub struct GraphBuilder {
    root: PathBuf,
    filter: PathFilter,
    parser: ImportParser,
}

impl GraphBuilder {
    /// # Errors
    /// Returns `AnalysisError::Io` when the root does not exist or cannot be
    /// canonicalized.
    pub fn new(root: &Path) -> Result<Self, AnalysisError> {
        let root = root.canonicalize()?;
        let filter = PathFilter::load(&root);
        Ok(Self { root, filter, parser: ImportParser::new() })
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Builds the whole-project graph: every discovered file becomes a
    /// record. Per-file read or decode failures are skipped and logged,
    /// never fatal.
    #[must_use]
    pub fn build_project(&self) -> DependencyGraph {
        let scan = SourceScanner::new(&self.root, &self.filter).scan();
        let resolver = ModuleResolver::new(&self.root, &self.filter);
        let mut graph = DependencyGraph::new(AnalysisMode::Project);

        // Pass 1, parallel per file. The whole set is joined here before
        // pass 2 looks at any record.
        let parsed = self.extract_all(&scan.files, &resolver);
        for (path, imports) in parsed {
            graph.files.insert(path.clone(), FileRecord::new(path, imports));
        }

        let targets: Vec<PathBuf> = graph
            .files
            .values()
            .flat_map(|r| r.imports.iter().filter_map(|i| i.resolved.clone()))
            .collect();
        for target in targets {
            graph.ensure_record(&target);
        }

        graph.link_importers();
        debug!("project graph: {} files", graph.file_count());
        graph
    }

    /// Builds the strict two-hop neighborhood of `entry`: the entry itself,
    /// every file whose imports resolve to it, and every file its own
    /// imports resolve to. A missing or unreadable entry yields an empty
    /// graph with `entry_missing` set, not an error.
    #[must_use]
    pub fn build_focused(&self, entry: &Path) -> DependencyGraph {
        let mut graph = DependencyGraph::new(AnalysisMode::Focused);
        let Ok(entry) = entry.canonicalize() else {
            warn!("entry file not found: {}", entry.display());
            graph.entry_missing = true;
            return graph;
        };
        let resolver = ModuleResolver::new(&self.root, &self.filter);
        let entry_imports = match self.extract_references(&entry, &resolver) {
            Ok(imports) => imports,
            Err(e) => {
                warn!("entry file unreadable: {e}");
                graph.entry_missing = true;
                return graph;
            }
        };
        graph.entry = Some(entry.clone());

        let scan = SourceScanner::new(&self.root, &self.filter).scan();
        let others: Vec<PathBuf> =
            scan.files.iter().filter(|p| **p != entry).cloned().collect();
        let parsed = self.extract_all(&others, &resolver);

        // Group 2: one hop of importers, anywhere in the tree.
        let mut dependents: BTreeMap<PathBuf, Vec<ImportReference>> = BTreeMap::new();
        let mut scanned: BTreeMap<PathBuf, Vec<ImportReference>> = BTreeMap::new();
        for (path, imports) in parsed {
            if imports.iter().any(|i| i.resolved.as_deref() == Some(entry.as_path())) {
                dependents.insert(path, imports);
            } else {
                scanned.insert(path, imports);
            }
        }

        graph.files.insert(entry.clone(), FileRecord::new(entry.clone(), entry_imports));
        for (path, imports) in dependents {
            graph.files.insert(path.clone(), FileRecord::new(path, imports));
        }

        // Group 3: one hop of dependencies. Scanned ones keep their own
        // imports; anything else becomes an empty leaf record.
        let entry_targets: Vec<PathBuf> = graph.files[&entry]
            .imports
            .iter()
            .filter_map(|i| i.resolved.clone())
            .collect();
        for target in entry_targets {
            if graph.files.contains_key(&target) {
                continue;
            }
            let imports = scanned.remove(&target).unwrap_or_default();
            graph.files.insert(target.clone(), FileRecord::new(target, imports));
        }

        graph.link_importers();
        debug!("focused graph around {}: {} files", entry.display(), graph.file_count());
        graph
    }

    fn extract_all(
        &self,
        files: &[PathBuf],
        resolver: &ModuleResolver,
    ) -> Vec<(PathBuf, Vec<ImportReference>)> {
        files
            .par_iter()
            .filter_map(|path| match self.extract_references(path, resolver) {
                Ok(imports) => Some((path.clone(), imports)),
                Err(e) => {
                    warn!("skipping {}: {e}", path.display());
                    None
                }
            })
            .collect()
    }

    fn extract_references(
        &self,
        path: &Path,
        resolver: &ModuleResolver,
    ) -> Result<Vec<ImportReference>, ExtractError> {
        let bytes = std::fs::read(path)?;
        let Ok(text) = String::from_utf8(bytes) else {
            return Err(ExtractError::InvalidUtf8 { file: path.to_path_buf() });
        };
        let raw = self.parser.extract(&text, FileKind::of(path));
        Ok(raw.into_iter().map(|imp| self.to_reference(path, imp, resolver)).collect())
    }

    fn to_reference(
        &self,
        from: &Path,
        raw: RawImport,
        resolver: &ModuleResolver,
    ) -> ImportReference {
        let is_external = resolver.classify(&raw.source) == SourceKind::External;
        let resolved = if is_external { None } else { resolver.resolve(from, &raw.source) };
        ImportReference { raw_source: raw.source, kind: raw.kind, is_external, resolved }
    }
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned())
}
