use log::warn;
use regex::Regex;
use std::path::Path;

/// One parsed ignore rule.
#[derive(Debug, Clone)]
pub struct IgnoreRule {
    pub pattern: String,
    pub negated: bool,
    pub dir_only: bool,
    pub anchored: bool,
    matcher: Regex,
}

/// Ordered ignore-rule set for one analyzed root.
///
/// Follows the common ignore-file syntax: blank lines and `#` comments are
/// skipped, a leading `!` re-includes, a trailing `/` restricts the rule to
/// directories, and a leading `/` anchors the pattern at the root. When
/// several rules match the same path, the last one in file order decides.
#[derive(Debug, Default)]
pub struct PathFilter {
    rules: Vec<IgnoreRule>,
}

impl PathFilter {
    /// Reads `<root>/.gitignore`. A missing or unreadable file yields an
    /// empty rule set, never an error.
    #[must_use]
    pub fn load(root: &Path) -> Self {
        match std::fs::read_to_string(root.join(".gitignore")) {
            Ok(text) => Self::parse(&text),
            Err(_) => Self::default(),
        }
    }

    /// Parses rule text into an ordered rule set.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let mut rules = Vec::new();
        for line in text.lines() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            if let Some(rule) = compile_rule(trimmed) {
                rules.push(rule);
            }
        }
        Self { rules }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Whether `rel_path` (forward-slash separated, relative to the root)
    /// is excluded. A path inside an excluded directory is excluded even
    /// when no rule names it directly.
    #[must_use]
    pub fn is_ignored(&self, rel_path: &str, is_dir: bool) -> bool {
        if self.rules.is_empty() {
            return false;
        }
        let rel = rel_path.trim_matches('/');
        if rel.is_empty() {
            return false;
        }
        for (idx, _) in rel.match_indices('/') {
            if self.matches(&rel[..idx], true) {
                return true;
            }
        }
        self.matches(rel, is_dir)
    }

    fn matches(&self, rel: &str, is_dir: bool) -> bool {
        let mut ignored = false;
        for rule in &self.rules {
            if rule.dir_only && !is_dir {
                continue;
            }
            if rule.matcher.is_match(rel) {
                ignored = !rule.negated;
            }
        }
        ignored
    }
}

fn compile_rule(line: &str) -> Option<IgnoreRule> {
    let (negated, rest) = match line.strip_prefix('!') {
        Some(r) => (true, r),
        None => (false, line),
    };
    let (dir_only, rest) = match rest.strip_suffix('/') {
        Some(r) => (true, r),
        None => (false, rest),
    };
    let (anchored, body) = match rest.strip_prefix('/') {
        Some(r) => (true, r),
        None => (false, rest),
    };
    if body.is_empty() {
        return None;
    }
    // Unanchored rules match the whole relative path or any suffix that
    // starts at a segment boundary.
    let mut re = String::with_capacity(body.len() + 8);
    re.push_str(if anchored { "^" } else { "(?:^|/)" });
    for ch in body.chars() {
        match ch {
            '*' => re.push_str(".*"),
            '?' => re.push('.'),
            c if c.is_ascii_alphanumeric() || c == '_' || c == '/' || !c.is_ascii() => re.push(c),
            c => {
                re.push('\\');
                re.push(c);
            }
        }
    }
    re.push('$');
    match Regex::new(&re) {
        Ok(matcher) => Some(IgnoreRule {
            pattern: line.to_string(),
            negated,
            dir_only,
            anchored,
            matcher,
        }),
        Err(e) => {
            warn!("skipping unusable ignore rule '{line}': {e}");
            None
        }
    }
}
