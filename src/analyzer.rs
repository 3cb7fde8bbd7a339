//! Pipeline orchestration: metadata, languages, readme, walk, detection.
//!
//! Every stage after construction degrades to an empty section instead of
//! erroring; `WalkStats` in the artifact records what was lost. The one
//! hard failure is an unparsable repository URL at construction.

use std::collections::BTreeMap;

use anyhow::Result;
use tracing::info;

use crate::config::Config;
use crate::features::detect_features;
use crate::github::GitHubClient;
use crate::languages::MatcherRegistry;
use crate::models::{ElementKind, RepoAnalysis};
use crate::walker::TreeWalker;

/// Runs the full introspection pipeline for one repository.
pub struct Analyzer {
    client: GitHubClient,
    registry: MatcherRegistry,
    max_file_size: u64,
}

impl Analyzer {
    /// Build an analyzer for one repository URL.
    pub fn new(repo_url: &str, token: Option<String>, config: &Config) -> Result<Self> {
        Ok(Self {
            client: GitHubClient::new(repo_url, token, &config.api)?,
            registry: MatcherRegistry::with_builtins(),
            max_file_size: config.walker.max_file_size,
        })
    }

    /// Run every stage and assemble the artifact.
    pub async fn analyze(&self) -> RepoAnalysis {
        let target = self.client.target();
        info!(owner = %target.owner, repo = %target.repo, "starting analysis");

        let repo_info = self.client.repo_info().await;
        let language_stats: BTreeMap<String, u64> = self.client.languages().await;
        let readme_content = self.client.readme().await;
        let has_readme = !readme_content.is_empty();

        info!(languages = language_stats.len(), "walking repository tree");
        let walker = TreeWalker::new(&self.client, &self.registry, self.max_file_size);
        let outcome = walker.walk().await;

        let features = detect_features(&language_stats, &outcome.node.flatten_names());

        let (functions, classes): (Vec<_>, Vec<_>) = outcome
            .elements
            .into_iter()
            .partition(|e| e.kind == ElementKind::Function);

        info!(
            files = outcome.stats.files_seen,
            functions = functions.len(),
            classes = classes.len(),
            features = features.len(),
            dir_failures = outcome.stats.dir_failures,
            "analysis complete"
        );

        RepoAnalysis {
            repo_info,
            language_stats,
            readme_content,
            has_readme,
            repo_structure: outcome.node,
            functions,
            classes,
            features,
            file_count: outcome.stats.files_seen,
            stats: outcome.stats,
        }
    }
}
