//! Media path normalisation.
//!
//! The same file can be reachable through several mount points (for
//! example the legacy emulated-storage alias and the per-user path). Cache
//! keys and album lookups use the normalised form so that all of them hit
//! the same entry.

use std::path::{Component, Path};

use serde::{Deserialize, Serialize};

use crate::nfc_string;

/// A prefix rewrite applied after lexical normalisation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathAlias {
    pub from: String,
    pub to: String,
}

impl PathAlias {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

/// Returns the aliases used when the configuration names none.
pub fn default_aliases() -> Vec<PathAlias> {
    vec![
        PathAlias::new("/storage/emulated/legacy", "/storage/emulated/0"),
        PathAlias::new("/mnt/shell/emulated/0", "/storage/emulated/0"),
        PathAlias::new("/sdcard", "/storage/emulated/0"),
    ]
}

/// Turns arbitrary entry paths into stable cache keys.
#[derive(Debug, Clone)]
pub struct MediaPathNormalizer {
    aliases: Vec<PathAlias>,
}

impl Default for MediaPathNormalizer {
    fn default() -> Self {
        Self::new(default_aliases())
    }
}

impl MediaPathNormalizer {
    pub fn new(aliases: Vec<PathAlias>) -> Self {
        let aliases = aliases
            .into_iter()
            .map(|a| PathAlias::new(trim_trailing(&a.from), trim_trailing(&a.to)))
            .filter(|a| !a.from.is_empty())
            .collect();
        Self { aliases }
    }

    /// Normalises `path` lexically (`.`/`..`, duplicate and trailing
    /// separators, NFC) and rewrites the first matching alias prefix.
    pub fn normalize(&self, path: &Path) -> String {
        let lexical = lexical_normalize(path);
        for alias in &self.aliases {
            if let Some(rest) = strip_dir_prefix(&lexical, &alias.from) {
                return format!("{}{}", alias.to, rest);
            }
        }
        lexical
    }
}

fn trim_trailing(s: &str) -> String {
    if s.len() > 1 {
        s.trim_end_matches('/').to_string()
    } else {
        s.to_string()
    }
}

/// Returns the remainder of `path` after `prefix` if `prefix` is a whole
/// leading run of components.
fn strip_dir_prefix<'a>(path: &'a str, prefix: &str) -> Option<&'a str> {
    let rest = path.strip_prefix(prefix)?;
    if rest.is_empty() || rest.starts_with('/') {
        Some(rest)
    } else {
        None
    }
}

fn lexical_normalize(path: &Path) -> String {
    let mut absolute = false;
    let mut parts: Vec<String> = Vec::new();

    for component in path.components() {
        match component {
            Component::RootDir => absolute = true,
            Component::Prefix(p) => parts.push(p.as_os_str().to_string_lossy().into_owned()),
            Component::CurDir => {}
            Component::ParentDir => {
                if parts.last().is_some_and(|p| p != "..") {
                    parts.pop();
                } else if !absolute {
                    parts.push("..".to_string());
                }
            }
            Component::Normal(name) => parts.push(nfc_string(&name.to_string_lossy())),
        }
    }

    let joined = parts.join("/");
    match (absolute, joined.is_empty()) {
        (true, _) => format!("/{joined}"),
        (false, true) => ".".to_string(),
        (false, false) => joined,
    }
}
