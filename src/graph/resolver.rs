use log::debug;
use regex::Regex;
use std::path::{Component, Path, PathBuf};

use crate::filter::PathFilter;

/// Extension probe order. Type-annotated extensions come first so a typed
/// source wins over a compiled sibling.
const PROBE_EXTENSIONS: &[&str] = &["ts", "tsx", "js", "jsx", "mjs", "cjs", "vue", "svelte"];

/// Alias prefixes mapped to the project root.
const ROOT_ALIASES: &[&str] = &["~~/", "@@/"];
/// Alias prefixes mapped to the detected source directory.
const SRC_ALIASES: &[&str] = &["@/", "~/"];

/// Classification of a raw import source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Relative,
    Alias,
    External,
}

/// Resolves raw import sources to files on disk.
///
/// Built once per analysis from the current filesystem state and the active
/// ignore rules; resolution itself has no side effects beyond logging.
pub struct ModuleResolver<'a> {
    root: PathBuf,
    src_dir: PathBuf,
    filter: &'a PathFilter,
}

impl<'a> ModuleResolver<'a> {
    #[must_use]
    pub fn new(root: &Path, filter: &'a PathFilter) -> Self {
        let src_dir = detect_src_dir(root);
        debug!("resolver source directory: {}", src_dir.display());
        Self { root: root.to_path_buf(), src_dir, filter }
    }

    /// The directory alias prefixes resolve against.
    #[must_use]
    pub fn src_dir(&self) -> &Path {
        &self.src_dir
    }

    /// External means: not relative, not absolute, and not a recognized
    /// alias prefix. External sources are never resolved to files.
    #[must_use]
    pub fn classify(&self, raw: &str) -> SourceKind {
        if raw.starts_with('.') || raw.starts_with('/') {
            return SourceKind::Relative;
        }
        if ROOT_ALIASES.iter().chain(SRC_ALIASES).any(|p| raw.starts_with(p)) {
            return SourceKind::Alias;
        }
        SourceKind::External
    }

    /// Resolves a relative or alias source against the importing file.
    /// Probes the base literally, then with each known extension, then as a
    /// directory holding an `index.<ext>`. The first existing file that the
    /// ignore rules allow wins; `None` means the import stays unresolved.
    #[must_use]
    pub fn resolve(&self, from_file: &Path, raw: &str) -> Option<PathBuf> {
        let base = self.base_for(from_file, raw)?;
        if let Some(found) = self.probe(&base) {
            return Some(found);
        }
        debug!("unresolved import '{}' from {}", raw, from_file.display());
        None
    }

    fn base_for(&self, from_file: &Path, raw: &str) -> Option<PathBuf> {
        for prefix in ROOT_ALIASES {
            if let Some(rest) = raw.strip_prefix(prefix) {
                return Some(self.root.join(rest));
            }
        }
        for prefix in SRC_ALIASES {
            if let Some(rest) = raw.strip_prefix(prefix) {
                return Some(self.src_dir.join(rest));
            }
        }
        if let Some(rest) = raw.strip_prefix('/') {
            return Some(self.root.join(rest));
        }
        if raw.starts_with('.') {
            let dir = from_file.parent()?;
            return Some(normalize(&dir.join(raw)));
        }
        None
    }

    fn probe(&self, base: &Path) -> Option<PathBuf> {
        if self.accepts(base) {
            return Some(base.to_path_buf());
        }
        for ext in PROBE_EXTENSIONS {
            let mut with_ext = base.as_os_str().to_os_string();
            with_ext.push(".");
            with_ext.push(ext);
            let candidate = PathBuf::from(with_ext);
            if self.accepts(&candidate) {
                return Some(candidate);
            }
        }
        for ext in PROBE_EXTENSIONS {
            let candidate = base.join(format!("index.{ext}"));
            if self.accepts(&candidate) {
                return Some(candidate);
            }
        }
        None
    }

    fn accepts(&self, candidate: &Path) -> bool {
        if !candidate.is_file() {
            return false;
        }
        let rel = candidate.strip_prefix(&self.root).unwrap_or(candidate);
        !self.filter.is_ignored(&rel.to_string_lossy().replace('\\', "/"), false)
    }
}

/// Lexical `.`/`..` normalization; the candidate may not exist yet, so
/// filesystem canonicalization is not an option.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for comp in path.components() {
        match comp {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push(comp.as_os_str());
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Source-directory detection, in order: a `srcDir` setting pattern-matched
/// from a nuxt config at the root, the conventional `src/` subdirectory,
/// the root itself.
fn detect_src_dir(root: &Path) -> PathBuf {
    if let Some(dir) = configured_src_dir(root) {
        return root.join(dir);
    }
    let conventional = root.join("src");
    if conventional.is_dir() {
        return conventional;
    }
    root.to_path_buf()
}

fn configured_src_dir(root: &Path) -> Option<String> {
    // One string setting read by pattern match, never by evaluating the
    // config file.
    let setting = Regex::new(r#"srcDir\s*:\s*["']([^"']+)["']"#).unwrap();
    for name in ["nuxt.config.js", "nuxt.config.ts"] {
        let Ok(text) = std::fs::read_to_string(root.join(name)) else { continue };
        if let Some(dir) = setting.captures(&text).and_then(|c| c.get(1)) {
            return Some(dir.as_str().to_string());
        }
    }
    None
}
