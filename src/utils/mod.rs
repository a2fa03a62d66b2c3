//! Shared helpers: optional config file, position persistence, project-root
//! detection, and the ASCII table used by the text output.

pub mod table {
    fn sep(widths: &[usize]) -> String {
        let mut s = String::from("+");
        for w in widths {
            s.push_str(&"-".repeat(w + 2));
            s.push('+');
        }
        s
    }

    fn line(cells: &[String], widths: &[usize]) -> String {
        let mut s = String::from("|");
        for (cell, &w) in cells.iter().zip(widths) {
            s.push_str(&format!(" {cell:<w$} |"));
        }
        s
    }

    /// Render a simple ASCII table given headers and rows.
    #[must_use]
    pub fn render(headers: &[&str], rows: &[Vec<String>]) -> String {
        let cols = headers.len();
        let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
        for row in rows {
            for (c, w) in widths.iter_mut().enumerate().take(cols) {
                *w = (*w).max(row.get(c).map_or(0, String::len));
            }
        }

        let header_cells: Vec<String> = headers.iter().map(|h| (*h).to_string()).collect();
        let mut out = String::new();
        out.push_str(&sep(&widths));
        out.push('\n');
        out.push_str(&line(&header_cells, &widths));
        out.push('\n');
        out.push_str(&sep(&widths));
        out.push('\n');
        for row in rows {
            let cells: Vec<String> =
                (0..cols).map(|i| row.get(i).cloned().unwrap_or_default()).collect();
            out.push_str(&line(&cells, &widths));
            out.push('\n');
        }
        out.push_str(&sep(&widths));
        out
    }
}

pub mod config {
    use serde::Deserialize;
    use std::fs;
    use std::path::{Path, PathBuf};

    #[derive(Debug, Clone, Deserialize, Default)]
    pub struct LayoutConfig {
        pub canvas_width: Option<f64>,
        pub canvas_height: Option<f64>,
        pub margin: Option<f64>,
        pub algorithm: Option<String>, // "spiral" | "hierarchical"
    }

    #[derive(Debug, Clone, Deserialize, Default)]
    pub struct OutputConfig {
        pub default_format: Option<String>, // "text" | "json"
    }

    #[derive(Debug, Clone, Deserialize, Default)]
    pub struct Config {
        pub root: Option<String>,
        pub layout: Option<LayoutConfig>,
        pub output: Option<OutputConfig>,
    }

    fn default_config_path(root: &Path) -> PathBuf {
        root.join("import-atlas.toml")
    }

    #[must_use]
    pub fn load_config_at(path: &Path) -> Option<Config> {
        let data = fs::read_to_string(path).ok()?;
        toml::from_str::<Config>(&data).ok()
    }

    #[must_use]
    pub fn load_config_near(root: &Path) -> Option<Config> {
        let p = default_config_path(root);
        if p.exists() {
            load_config_at(&p)
        } else {
            None
        }
    }
}

pub mod positions {
    use serde::{Deserialize, Serialize};
    use std::collections::BTreeMap;
    use std::path::{Path, PathBuf};

    use crate::layout::{PositionMap, PositionStore};

    #[derive(Debug, Clone, Serialize, Deserialize, Default)]
    struct StoreFile {
        entries: BTreeMap<String, PositionMap>,
    }

    /// File-backed [`PositionStore`]. Reads once on open; `save` writes the
    /// whole file back and swallows failures, a stale or absent store only
    /// costs a re-layout.
    #[derive(Debug)]
    pub struct JsonFileStore {
        path: PathBuf,
        data: StoreFile,
    }

    fn store_path(root: &Path) -> PathBuf {
        root.join(".import_atlas_positions.json")
    }

    /// Identity string for one analyzed (root, entry) pair. Separators are
    /// normalized so the same project maps to the same key across
    /// platforms.
    #[must_use]
    pub fn identity(root: &Path, entry: Option<&Path>) -> String {
        let norm = |p: &Path| p.to_string_lossy().replace('\\', "/");
        match entry {
            Some(e) => format!("{}::{}", norm(root), norm(e)),
            None => format!("{}::*", norm(root)),
        }
    }

    impl JsonFileStore {
        /// Store at the conventional location inside `root`.
        #[must_use]
        pub fn open(root: &Path) -> Self {
            Self::at(store_path(root))
        }

        /// Store at an explicit path. Unreadable or malformed content is
        /// treated as an empty store.
        #[must_use]
        pub fn at(path: PathBuf) -> Self {
            let data = std::fs::read_to_string(&path)
                .ok()
                .and_then(|text| serde_json::from_str::<StoreFile>(&text).ok())
                .unwrap_or_default();
            Self { path, data }
        }

        pub fn save(&self) {
            if let Ok(text) = serde_json::to_string_pretty(&self.data) {
                let _ = std::fs::write(&self.path, text);
            }
        }
    }

    impl PositionStore for JsonFileStore {
        fn get(&self, key: &str) -> Option<PositionMap> {
            self.data.entries.get(key).cloned()
        }

        fn set(&mut self, key: &str, positions: &PositionMap) {
            self.data.entries.insert(key.to_string(), positions.clone());
        }
    }
}

pub mod project_root {
    use std::env;
    use std::path::{Path, PathBuf};

    /// Detect the project root by walking ancestors looking for
    /// `package.json`.
    #[must_use]
    pub fn detect(start: Option<&Path>) -> PathBuf {
        let mut cur = start
            .map(Path::to_path_buf)
            .unwrap_or_else(|| env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));
        loop {
            if cur.join("package.json").is_file() {
                return cur;
            }
            if let Some(parent) = cur.parent() {
                cur = parent.to_path_buf();
            } else {
                return env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
            }
        }
    }

    /// None or "." resolve to the detected project root; any other path is
    /// returned as-is.
    #[must_use]
    pub fn effective_path_opt(p: Option<&Path>) -> PathBuf {
        match p {
            None => detect(None),
            Some(path) if path == Path::new(".") => detect(None),
            Some(path) => path.to_path_buf(),
        }
    }
}
