//! Recursive repository tree walk.
//!
//! Drives the whole pipeline: lists each directory level through a
//! [`RepoSource`], filters hidden and noise entries, recurses into
//! subdirectories, and forwards eligible code files to the matcher
//! registry. Results come back by value (`WalkOutcome`) and merge at join
//! points, so subtrees can fan out concurrently without shared state.
//!
//! Failures stay local: a listing that cannot be fetched becomes an empty
//! node, a file that cannot be downloaded contributes no elements, and the
//! walk always runs to completion over everything else. `WalkStats` records
//! what went missing.

use futures::future::{join_all, BoxFuture};
use futures::FutureExt;
use tracing::debug;

use crate::github::{DirEntry, RepoSource};
use crate::languages::MatcherRegistry;
use crate::models::{CodeElement, RepoNode, WalkStats};

/// Directory names excluded from traversal along with hidden entries.
const NOISE_DIRS: &[&str] = &["node_modules", "__pycache__"];

/// Extensions eligible for content fetch and extraction dispatch. Files
/// with any other extension are listed and counted but never fetched.
const CODE_EXTENSIONS: &[&str] = &[
    "py", "js", "java", "cpp", "c", "go", "rb", "php", "ts", "jsx", "tsx", "kt", "kts",
];

/// Everything one walk produces, merged bottom-up from subtree results.
#[derive(Debug, Default)]
pub struct WalkOutcome {
    pub node: RepoNode,
    pub elements: Vec<CodeElement>,
    pub stats: WalkStats,
}

/// What happened to one file entry's content.
enum FileContent {
    /// Recognized code file at or under the size ceiling, fetched.
    Fetched(String),
    /// Recognized code file whose download failed.
    Failed,
    /// Recognized code file above the size ceiling; never fetched.
    TooLarge,
    /// Not a recognized code file, or no download URL advertised.
    NotCode,
}

/// Walks one repository's directory tree through a [`RepoSource`].
pub struct TreeWalker<'a> {
    source: &'a dyn RepoSource,
    registry: &'a MatcherRegistry,
    max_file_size: u64,
}

impl<'a> TreeWalker<'a> {
    pub fn new(
        source: &'a dyn RepoSource,
        registry: &'a MatcherRegistry,
        max_file_size: u64,
    ) -> Self {
        Self {
            source,
            registry,
            max_file_size,
        }
    }

    /// Walk from the repository root.
    pub async fn walk(&self) -> WalkOutcome {
        self.walk_dir(String::new()).await
    }

    /// Walk one directory level. A failed or cancelled listing yields an
    /// empty node; sibling subtrees are unaffected.
    fn walk_dir(&self, path: String) -> BoxFuture<'_, WalkOutcome> {
        async move {
            let mut outcome = WalkOutcome::default();

            if self.source.cancelled() {
                debug!(%path, "skipping directory, run deadline passed");
                outcome.stats.dir_failures += 1;
                return outcome;
            }

            let entries = match self.source.list_dir(&path).await {
                Some(entries) => entries,
                None => {
                    debug!(%path, "directory listing failed");
                    outcome.stats.dir_failures += 1;
                    return outcome;
                }
            };
            outcome.stats.dirs_listed += 1;

            let (dirs, files): (Vec<_>, Vec<_>) = entries
                .into_iter()
                .filter(|e| !is_excluded(&e.name))
                .partition(DirEntry::is_dir);

            // Sibling files fetch concurrently; the source's request cap
            // bounds actual parallelism. Merging in listing order keeps the
            // aggregate deterministic for a given snapshot.
            let contents = join_all(files.iter().map(|f| self.fetch_content(f))).await;
            for (entry, content) in files.iter().zip(contents) {
                outcome.stats.files_seen += 1;
                outcome.node.files.push(entry.name.clone());
                match content {
                    FileContent::Fetched(text) => {
                        outcome.stats.files_fetched += 1;
                        if let Some(ext) = file_extension(&entry.name) {
                            outcome
                                .elements
                                .extend(self.registry.extract(&text, &entry.path, &ext));
                        }
                    }
                    FileContent::Failed => outcome.stats.file_failures += 1,
                    FileContent::TooLarge => outcome.stats.files_skipped_size += 1,
                    FileContent::NotCode => {}
                }
            }

            let subtrees = join_all(dirs.iter().map(|d| self.walk_dir(d.path.clone()))).await;
            for (entry, sub) in dirs.iter().zip(subtrees) {
                outcome.stats.merge(&sub.stats);
                outcome.elements.extend(sub.elements);
                outcome.node.children.insert(entry.name.clone(), sub.node);
            }

            outcome
        }
        .boxed()
    }

    async fn fetch_content(&self, entry: &DirEntry) -> FileContent {
        let Some(ext) = file_extension(&entry.name) else {
            return FileContent::NotCode;
        };
        if !CODE_EXTENSIONS.contains(&ext.as_str()) {
            return FileContent::NotCode;
        }
        if entry.size > self.max_file_size {
            debug!(path = %entry.path, size = entry.size, "skipping oversized file");
            return FileContent::TooLarge;
        }
        let Some(url) = entry.download_url.as_deref() else {
            return FileContent::NotCode;
        };
        match self.source.download(url).await {
            Some(text) => FileContent::Fetched(text),
            None => FileContent::Failed,
        }
    }
}

/// Hidden entries (leading `.`) and noise directories are never traversed,
/// listed, or counted.
fn is_excluded(name: &str) -> bool {
    name.starts_with('.') || NOISE_DIRS.contains(&name)
}

/// Lowercased extension without the dot, `None` for extension-less names.
fn file_extension(name: &str) -> Option<String> {
    std::path::Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}
