use crate::filter::PathFilter;
use log::debug;
use regex::Regex;
use std::path::{Path, PathBuf};

/// Directory names never descended into, at any depth.
const SKIP_DIRS: &[&str] =
    &["node_modules", "dist", "build", "out", ".output", "coverage", ".nuxt", ".next"];

/// How many files the require-vs-import tie-break may read.
const DIALECT_SAMPLE: usize = 25;

/// The project's module/type-system flavor, detected once per scan. Each
/// variant carries its fixed list of analyzable extensions; per-file
/// re-evaluation never happens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    TypeScript,
    JavaScript,
}

impl Dialect {
    /// Analyzable extensions for this dialect. The two single-file-component
    /// extensions are always included.
    #[must_use]
    pub fn extensions(self) -> &'static [&'static str] {
        match self {
            Self::TypeScript => &["ts", "tsx", "js", "jsx", "mjs", "cjs", "vue", "svelte"],
            Self::JavaScript => &["js", "jsx", "mjs", "cjs", "vue", "svelte"],
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::TypeScript => "typescript",
            Self::JavaScript => "javascript",
        }
    }
}

/// Union of both dialects' extensions, used before the dialect is known.
const CANDIDATE_EXTENSIONS: &[&str] = &["ts", "tsx", "js", "jsx", "mjs", "cjs", "vue", "svelte"];

#[derive(Debug)]
pub struct ScanSummary {
    pub dialect: Dialect,
    pub files: Vec<PathBuf>,
}

#[derive(Debug)]
struct DialectPatterns {
    require_call: Regex,
    import_stmt: Regex,
}

impl DialectPatterns {
    fn compile() -> Self {
        Self {
            require_call: Regex::new(r"\brequire\s*\(").unwrap(),
            import_stmt: Regex::new(r"(?m)^\s*import\s").unwrap(),
        }
    }
}

/// Walks one root and produces the ordered list of analyzable files.
#[derive(Debug)]
pub struct SourceScanner<'a> {
    root: PathBuf,
    filter: &'a PathFilter,
    patterns: DialectPatterns,
}

impl<'a> SourceScanner<'a> {
    #[must_use]
    pub fn new(root: &Path, filter: &'a PathFilter) -> Self {
        Self { root: root.to_path_buf(), filter, patterns: DialectPatterns::compile() }
    }

    /// Scans the tree: detect the dialect, then keep the files whose
    /// extension that dialect analyzes, dropping compiled artifacts that
    /// shadow a type-dialect sibling. The result is sorted for
    /// reproducibility.
    #[must_use]
    pub fn scan(&self) -> ScanSummary {
        let candidates = self.collect_candidates();
        let dialect = self.detect_dialect(&candidates);
        let exts = dialect.extensions();
        let files: Vec<PathBuf> = candidates
            .into_iter()
            .filter(|p| extension_of(p).is_some_and(|e| exts.contains(&e)))
            .filter(|p| !has_type_sibling(p))
            .collect();
        debug!("scan of {} found {} {} files", self.root.display(), files.len(), dialect.as_str());
        ScanSummary { dialect, files }
    }

    /// Every file under the root with a candidate extension that survives
    /// the directory skip set and the ignore rules, sorted.
    fn collect_candidates(&self) -> Vec<PathBuf> {
        let mut builder = ignore::WalkBuilder::new(&self.root);
        // The ignore-rule semantics live in PathFilter; the walker's own
        // gitignore machinery stays off.
        builder
            .follow_links(false)
            .git_ignore(false)
            .git_global(false)
            .git_exclude(false)
            .ignore(false)
            .hidden(false)
            .parents(false);
        builder.filter_entry(|entry| {
            if entry.file_type().is_some_and(|t| t.is_dir()) && entry.depth() > 0 {
                let name = entry.file_name().to_string_lossy();
                if name.starts_with('.') || SKIP_DIRS.contains(&name.as_ref()) {
                    return false;
                }
            }
            true
        });

        let mut out = Vec::new();
        for entry in builder.build().flatten() {
            if !entry.file_type().is_some_and(|t| t.is_file()) {
                continue;
            }
            let path = entry.path();
            let Some(ext) = extension_of(path) else { continue };
            if !CANDIDATE_EXTENSIONS.contains(&ext) {
                continue;
            }
            if self.filter.is_ignored(&self.relative(path), false) {
                continue;
            }
            out.push(path.to_path_buf());
        }
        out.sort();
        out
    }

    fn detect_dialect(&self, candidates: &[PathBuf]) -> Dialect {
        if self.root.join("tsconfig.json").is_file() {
            debug!("dialect: typescript (tsconfig.json present)");
            return Dialect::TypeScript;
        }
        if manifest_declares_typescript(&self.root) {
            debug!("dialect: typescript (package.json dependency)");
            return Dialect::TypeScript;
        }
        let typed = count_extensions(candidates, &["ts", "tsx"]);
        let plain = count_extensions(candidates, &["js", "jsx"]);
        match typed.cmp(&plain) {
            std::cmp::Ordering::Greater => Dialect::TypeScript,
            std::cmp::Ordering::Less => Dialect::JavaScript,
            std::cmp::Ordering::Equal => self.sample_dialect(candidates),
        }
    }

    /// Tie-break: read a capped sample and compare require-style against
    /// import-style statement counts.
    fn sample_dialect(&self, candidates: &[PathBuf]) -> Dialect {
        let mut requires = 0usize;
        let mut imports = 0usize;
        for path in candidates.iter().take(DIALECT_SAMPLE) {
            let Ok(text) = std::fs::read_to_string(path) else { continue };
            requires += self.patterns.require_call.find_iter(&text).count();
            imports += self.patterns.import_stmt.find_iter(&text).count();
        }
        if requires > imports {
            debug!("dialect: javascript ({requires} requires vs {imports} imports in sample)");
            Dialect::JavaScript
        } else {
            Dialect::TypeScript
        }
    }

    fn relative(&self, path: &Path) -> String {
        let rel = path.strip_prefix(&self.root).unwrap_or(path);
        rel.to_string_lossy().replace('\\', "/")
    }
}

fn extension_of(path: &Path) -> Option<&str> {
    path.extension().and_then(|e| e.to_str())
}

/// A compiled `.js`/`.jsx` artifact is shadowed by its `.ts`/`.tsx` source.
fn has_type_sibling(path: &Path) -> bool {
    let Some(ext) = extension_of(path) else { return false };
    if ext != "js" && ext != "jsx" {
        return false;
    }
    path.with_extension("ts").is_file() || path.with_extension("tsx").is_file()
}

fn count_extensions(paths: &[PathBuf], exts: &[&str]) -> usize {
    paths.iter().filter(|p| extension_of(p).is_some_and(|e| exts.contains(&e))).count()
}

fn manifest_declares_typescript(root: &Path) -> bool {
    let Ok(text) = std::fs::read_to_string(root.join("package.json")) else {
        return false;
    };
    let Ok(manifest) = serde_json::from_str::<serde_json::Value>(&text) else {
        return false;
    };
    ["dependencies", "devDependencies"]
        .iter()
        .any(|key| manifest.get(key).and_then(|deps| deps.get("typescript")).is_some())
}
