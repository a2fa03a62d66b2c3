use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Which statement form produced an import reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ImportKind {
    Import,
    Require,
    DynamicImport,
}

/// How a file's text is scanned: plain script, or a single-file component
/// whose script blocks must be isolated first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Script,
    Template,
}

impl FileKind {
    #[must_use]
    pub fn of(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("vue" | "svelte") => Self::Template,
            _ => Self::Script,
        }
    }
}

/// One extracted statement, before resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawImport {
    pub source: String,
    pub kind: ImportKind,
}

/// Text-pattern import extractor.
///
/// Statements are recognized by compiled regexes, not by parsing: static
/// `import` statements (named-brace, namespace-star, default-binding, and
/// bare side-effect forms), dynamic `import(...)` calls (direct or inside a
/// lazy wrapper), and `require(...)` calls (bound or inline). Source
/// literals may use single, double, or backtick quotes. Statements whose
/// source argument is computed or interpolated are not extracted; that is a
/// documented limit of this layer, not a defect.
#[derive(Debug, Default)]
pub struct ImportParser {
    patterns: ImportPatterns,
}

#[derive(Debug)]
pub struct ImportPatterns {
    pub import_stmt: Regex,
    pub dynamic_import: Regex,
    pub require_call: Regex,
    pub script_block: Regex,
}

impl ImportPatterns {
    pub fn compile() -> Self {
        // Simple, conservative regexes to avoid catastrophic backtracking.
        // Source character classes exclude braces so interpolated template
        // literals never match.
        let import_stmt =
            Regex::new(r#"(?m)^\s*import\s+(?:[\w$*{},\s]+?from\s*)?["'`]([^"'`{}\n]+)["'`]"#)
                .unwrap();
        let dynamic_import =
            Regex::new(r#"\bimport\s*\(\s*["'`]([^"'`{}\n]+)["'`]\s*\)"#).unwrap();
        let require_call =
            Regex::new(r#"\brequire\s*\(\s*["'`]([^"'`{}\n]+)["'`]\s*\)"#).unwrap();
        let script_block = Regex::new(r"(?is)<script[^>]*>(.*?)</script>").unwrap();
        Self { import_stmt, dynamic_import, require_call, script_block }
    }
}

impl Default for ImportPatterns {
    fn default() -> Self {
        Self::compile()
    }
}

impl ImportParser {
    #[must_use]
    pub fn new() -> Self {
        Self { patterns: ImportPatterns::compile() }
    }

    /// Extracts every recognizable import from `text`, in document order.
    #[must_use]
    pub fn extract(&self, text: &str, kind: FileKind) -> Vec<RawImport> {
        match kind {
            FileKind::Script => self.extract_script(text),
            FileKind::Template => self.extract_script(&self.script_text(text)),
        }
    }

    /// Concatenates the bodies of all `<script ...>` blocks; only that text
    /// is scanned for a single-file component.
    #[must_use]
    pub fn script_text(&self, text: &str) -> String {
        let mut out = String::new();
        for cap in self.patterns.script_block.captures_iter(text) {
            if let Some(body) = cap.get(1) {
                out.push_str(body.as_str());
                out.push('\n');
            }
        }
        out
    }

    fn extract_script(&self, text: &str) -> Vec<RawImport> {
        let mut found: Vec<(usize, RawImport)> = Vec::new();
        for cap in self.patterns.import_stmt.captures_iter(text) {
            if let (Some(m), Some(src)) = (cap.get(0), cap.get(1)) {
                found.push((
                    m.start(),
                    RawImport { source: src.as_str().to_string(), kind: ImportKind::Import },
                ));
            }
        }
        for cap in self.patterns.dynamic_import.captures_iter(text) {
            if let (Some(m), Some(src)) = (cap.get(0), cap.get(1)) {
                found.push((
                    m.start(),
                    RawImport { source: src.as_str().to_string(), kind: ImportKind::DynamicImport },
                ));
            }
        }
        for cap in self.patterns.require_call.captures_iter(text) {
            if let (Some(m), Some(src)) = (cap.get(0), cap.get(1)) {
                found.push((
                    m.start(),
                    RawImport { source: src.as_str().to_string(), kind: ImportKind::Require },
                ));
            }
        }
        found.sort_by_key(|(pos, _)| *pos);
        found.into_iter().map(|(_, imp)| imp).collect()
    }
}
