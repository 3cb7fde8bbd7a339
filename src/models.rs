//! Core data models for a single analysis run.
//!
//! These types represent the directory tree, extracted code elements, and
//! aggregate artifact that flow through the walk and detection pipeline.
//! Everything is created fresh per run; nothing persists across runs.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One directory level of the repository tree.
///
/// `children` maps subdirectory name to its nested node; `files` lists the
/// plain file names directly contained. A node with no children and no files
/// is a valid empty leaf (an empty directory, or a listing that could not be
/// fetched). Hidden entries and noise directories are filtered before
/// insertion and never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoNode {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub children: BTreeMap<String, RepoNode>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<String>,
}

impl RepoNode {
    /// True when the node has no children and no files.
    pub fn is_empty(&self) -> bool {
        self.children.is_empty() && self.files.is_empty()
    }

    /// Number of directories in this subtree, the root excluded.
    pub fn dir_count(&self) -> u64 {
        self.children
            .values()
            .map(|c| 1 + c.dir_count())
            .sum()
    }

    /// Number of files in this subtree.
    pub fn file_count(&self) -> u64 {
        self.files.len() as u64
            + self.children.values().map(|c| c.file_count()).sum::<u64>()
    }

    /// Every directory and file name in this subtree, newline-joined.
    ///
    /// Feature detection runs case-insensitive substring checks over this
    /// text; tree structure is deliberately discarded.
    pub fn flatten_names(&self) -> String {
        let mut out = String::new();
        self.collect_names(&mut out);
        out
    }

    fn collect_names(&self, out: &mut String) {
        for (name, child) in &self.children {
            out.push_str(name);
            out.push('\n');
            child.collect_names(out);
        }
        for file in &self.files {
            out.push_str(file);
            out.push('\n');
        }
    }
}

/// Whether an extracted element is a function or a class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    Function,
    Class,
}

/// One function or class extracted from a source file.
///
/// Immutable once produced. `params` and `inheritance` carry raw matched
/// text, never validated for well-formedness; each is empty when the
/// corresponding grammar position is absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeElement {
    pub name: String,
    /// Repository-relative path of the defining file.
    pub file: String,
    pub kind: ElementKind,
    /// Raw parameter text; the sentinel `arrow function` for
    /// assignment-bound arrow functions.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub params: String,
    /// Language tag, e.g. `Python` or `Kotlin (Extension)`.
    pub language: String,
    /// Raw base-class/interface text, empty when none.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub inheritance: String,
}

impl CodeElement {
    pub fn function(name: &str, file: &str, params: &str, language: &str) -> Self {
        Self {
            name: name.to_string(),
            file: file.to_string(),
            kind: ElementKind::Function,
            params: params.to_string(),
            language: language.to_string(),
            inheritance: String::new(),
        }
    }

    pub fn class(name: &str, file: &str, inheritance: &str, language: &str) -> Self {
        Self {
            name: name.to_string(),
            file: file.to_string(),
            kind: ElementKind::Class,
            params: String::new(),
            language: language.to_string(),
            inheritance: inheritance.to_string(),
        }
    }
}

/// License metadata as reported by the repository API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct License {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spdx_id: Option<String>,
}

/// Repository metadata from `GET /repos/{owner}/{repo}`.
///
/// Only the fields the summary surfaces; unknown upstream fields are dropped
/// on deserialization, and every field defaults so a failed metadata fetch
/// still yields a usable empty record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RepoInfo {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<License>,
    #[serde(default)]
    pub stargazers_count: u64,
    #[serde(default)]
    pub forks_count: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub default_branch: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub homepage: Option<String>,
}

/// Per-stage counters for one walk.
///
/// These distinguish a partially failed walk from a genuinely empty
/// repository, which the tree alone cannot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalkStats {
    /// Directory listings fetched and parsed successfully.
    pub dirs_listed: u64,
    /// Directory listings that failed or returned a non-list body.
    pub dir_failures: u64,
    /// Files recorded in the tree.
    pub files_seen: u64,
    /// Code files whose content was fetched for extraction.
    pub files_fetched: u64,
    /// Code-file content downloads that failed.
    pub file_failures: u64,
    /// Code files skipped because they exceed the size ceiling.
    pub files_skipped_size: u64,
}

impl WalkStats {
    /// Fold counters from a completed subtree into this accumulator.
    pub fn merge(&mut self, other: &WalkStats) {
        self.dirs_listed += other.dirs_listed;
        self.dir_failures += other.dir_failures;
        self.files_seen += other.files_seen;
        self.files_fetched += other.files_fetched;
        self.file_failures += other.file_failures;
        self.files_skipped_size += other.files_skipped_size;
    }

    /// True when any stage recorded a failure.
    pub fn any_failures(&self) -> bool {
        self.dir_failures > 0 || self.file_failures > 0
    }
}

/// Aggregate artifact of one analysis run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepoAnalysis {
    pub repo_info: RepoInfo,
    /// Language name to byte count, as reported by the API.
    pub language_stats: BTreeMap<String, u64>,
    /// Decoded readme text; empty when missing or undecodable.
    pub readme_content: String,
    pub has_readme: bool,
    pub repo_structure: RepoNode,
    pub functions: Vec<CodeElement>,
    pub classes: Vec<CodeElement>,
    /// Detected language and framework tags, deduplicated.
    pub features: BTreeSet<String>,
    /// Files recorded in the tree (hidden and noise entries excluded).
    pub file_count: u64,
    pub stats: WalkStats,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tree() -> RepoNode {
        let mut root = RepoNode::default();
        root.files.push("README.md".to_string());
        root.files.push("setup.py".to_string());

        let mut src = RepoNode::default();
        src.files.push("main.py".to_string());
        let mut nested = RepoNode::default();
        nested.files.push("helpers.py".to_string());
        src.children.insert("util".to_string(), nested);

        root.children.insert("src".to_string(), src);
        root.children.insert("docs".to_string(), RepoNode::default());
        root
    }

    #[test]
    fn node_counts() {
        let tree = sample_tree();
        assert_eq!(tree.dir_count(), 3);
        assert_eq!(tree.file_count(), 4);
        assert!(!tree.is_empty());
        assert!(RepoNode::default().is_empty());
    }

    #[test]
    fn serde_round_trip_preserves_file_sets() {
        let tree = sample_tree();
        let json = serde_json::to_string(&tree).unwrap();
        let back: RepoNode = serde_json::from_str(&json).unwrap();
        assert_eq!(tree, back);
        // Nested level survives with its files intact.
        assert_eq!(
            back.children["src"].children["util"].files,
            vec!["helpers.py".to_string()]
        );
    }

    #[test]
    fn empty_directories_round_trip() {
        let tree = sample_tree();
        let json = serde_json::to_string(&tree).unwrap();
        let back: RepoNode = serde_json::from_str(&json).unwrap();
        assert!(back.children["docs"].is_empty());
    }

    #[test]
    fn flatten_names_covers_all_levels() {
        let text = sample_tree().flatten_names();
        for needle in ["src", "util", "docs", "README.md", "helpers.py"] {
            assert!(text.contains(needle), "missing {needle} in {text:?}");
        }
    }

    #[test]
    fn walk_stats_merge_adds_counters() {
        let mut a = WalkStats {
            dirs_listed: 2,
            files_seen: 5,
            ..Default::default()
        };
        let b = WalkStats {
            dirs_listed: 1,
            dir_failures: 1,
            files_fetched: 3,
            ..Default::default()
        };
        a.merge(&b);
        assert_eq!(a.dirs_listed, 3);
        assert_eq!(a.dir_failures, 1);
        assert_eq!(a.files_seen, 5);
        assert_eq!(a.files_fetched, 3);
        assert!(a.any_failures());
    }

    #[test]
    fn element_constructors_fill_kind_fields() {
        let f = CodeElement::function("run", "src/main.py", "self, x", "Python");
        assert_eq!(f.kind, ElementKind::Function);
        assert!(f.inheritance.is_empty());

        let c = CodeElement::class("Runner", "src/main.py", "Base", "Python");
        assert_eq!(c.kind, ElementKind::Class);
        assert!(c.params.is_empty());
        assert_eq!(c.inheritance, "Base");
    }
}
