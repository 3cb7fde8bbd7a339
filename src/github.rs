//! GitHub API client with rate-limit-aware fetching.
//!
//! Wraps reqwest with the quota bookkeeping the contents API needs: the
//! `X-RateLimit-Remaining` / `X-RateLimit-Reset` headers are read off every
//! response, and a throttled request (403/429 with zero quota) sleeps until
//! the reset passes, then re-issues the identical request. Retries are
//! bounded by `max_rate_limit_waits` and by the optional run deadline.
//!
//! Every fetch is soft-failing: `None` means "could not fetch," which the
//! walk treats as a missing subtree, never as an empty one.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use anyhow::{bail, Result};
use async_trait::async_trait;
use base64::Engine;
use chrono::Utc;
use reqwest::header::{HeaderMap, AUTHORIZATION};
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Value;
use tokio::sync::Semaphore;
use tracing::{debug, warn};

use crate::config::ApiConfig;
use crate::models::RepoInfo;

/// Owner/name pair identifying one repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoTarget {
    pub owner: String,
    pub repo: String,
}

impl RepoTarget {
    /// Parse a repository URL or a bare `owner/repo` into a target.
    ///
    /// Accepts full URLs with or without extra path segments, query, or
    /// fragment; a trailing `.git` on the repository segment is trimmed.
    /// Fewer than two path segments is a hard input error, the one failure
    /// in this crate that is not recovered.
    pub fn parse(url: &str) -> Result<Self> {
        let trimmed = url.trim();
        // Everything after the host is the path; without a scheme the whole
        // input is treated as a path.
        let path = match trimmed.find("://") {
            Some(idx) => {
                let after_scheme = &trimmed[idx + 3..];
                match after_scheme.find('/') {
                    Some(slash) => &after_scheme[slash + 1..],
                    None => "",
                }
            }
            None => trimmed,
        };
        let path = path.split(['?', '#']).next().unwrap_or("");

        let mut segments = path.split('/').filter(|s| !s.is_empty());
        match (segments.next(), segments.next()) {
            (Some(owner), Some(repo)) => Ok(Self {
                owner: owner.to_string(),
                repo: repo.trim_end_matches(".git").to_string(),
            }),
            _ => bail!("invalid repository URL '{}': expected owner/repo", url),
        }
    }
}

/// Remaining request quota and its reset time, as reported by the API.
///
/// Updated after every API response, success or not. Missing headers read
/// as zero, which is the conservative default.
#[derive(Debug, Clone, Copy, Default)]
pub struct FetchQuota {
    pub remaining: u64,
    /// Epoch seconds at which the quota window resets.
    pub reset_at: i64,
}

/// One entry of a directory listing from the contents endpoint.
///
/// `kind` carries the raw `type` field; anything other than `dir` is
/// handled as a file downstream, symlinks and submodules included.
#[derive(Debug, Clone, Deserialize)]
pub struct DirEntry {
    pub name: String,
    pub path: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub download_url: Option<String>,
}

impl DirEntry {
    pub fn is_dir(&self) -> bool {
        self.kind == "dir"
    }
}

/// Remote source of directory listings and raw file content.
///
/// The walker depends on this seam rather than on the concrete client so
/// traversal logic stays testable against an in-memory source. Both fetch
/// methods are soft-failing.
#[async_trait]
pub trait RepoSource: Send + Sync {
    /// List one directory level; `path` is repository-relative, `""` for
    /// the root.
    async fn list_dir(&self, path: &str) -> Option<Vec<DirEntry>>;

    /// Fetch raw file content from an absolute download URL.
    async fn download(&self, url: &str) -> Option<String>;

    /// True once the run deadline has passed; traversal stops descending.
    fn cancelled(&self) -> bool {
        false
    }
}

/// Authenticated, quota-tracking client for one repository.
pub struct GitHubClient {
    http: reqwest::Client,
    base_url: String,
    target: RepoTarget,
    token: Option<String>,
    max_rate_limit_waits: u32,
    deadline: Option<Instant>,
    permits: Semaphore,
    quota: Mutex<FetchQuota>,
}

impl GitHubClient {
    /// Build a client for one repository. Fails on an unparsable repository
    /// URL or a broken TLS stack; never performs network I/O.
    pub fn new(repo_url: &str, token: Option<String>, api: &ApiConfig) -> Result<Self> {
        let target = RepoTarget::parse(repo_url)?;
        let http = reqwest::Client::builder()
            .user_agent(concat!("repo-scout/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(api.timeout_secs))
            .build()?;
        let deadline = (api.deadline_secs > 0)
            .then(|| Instant::now() + Duration::from_secs(api.deadline_secs));

        Ok(Self {
            http,
            base_url: api.base_url.trim_end_matches('/').to_string(),
            target,
            token,
            max_rate_limit_waits: api.max_rate_limit_waits,
            deadline,
            permits: Semaphore::new(api.max_concurrency),
            quota: Mutex::new(FetchQuota::default()),
        })
    }

    pub fn target(&self) -> &RepoTarget {
        &self.target
    }

    /// Last observed quota state.
    pub fn quota(&self) -> FetchQuota {
        *self.quota_state()
    }

    fn quota_state(&self) -> MutexGuard<'_, FetchQuota> {
        // Quota is plain Copy data; a poisoned lock cannot leave it in a
        // bad state, so recover rather than propagate the panic.
        self.quota.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn update_quota(&self, headers: &HeaderMap) {
        let remaining: u64 = header_number(headers, "x-ratelimit-remaining");
        let reset_at: i64 = header_number(headers, "x-ratelimit-reset");
        let mut quota = self.quota_state();
        quota.remaining = remaining;
        quota.reset_at = reset_at;
    }

    /// Seconds until the quota window reopens: `max(0, reset - now) + 1`,
    /// one past the reset to stay clear of its granularity.
    fn throttle_wait(&self) -> Duration {
        let reset_at = self.quota().reset_at;
        let now = Utc::now().timestamp();
        Duration::from_secs(reset_at.saturating_sub(now).max(0) as u64 + 1)
    }

    /// GET a JSON API endpoint with quota bookkeeping and bounded throttle
    /// retries. Every failure mode maps to `None`; callers treat that as
    /// "could not fetch," never as an empty body.
    pub async fn get_json(&self, url: &str, params: &[(&str, &str)]) -> Option<Value> {
        let mut waits = 0u32;
        loop {
            if self.cancelled() {
                debug!(url, "skipping fetch, run deadline passed");
                return None;
            }

            let response = {
                let _permit = self.permits.acquire().await.ok()?;
                let mut request = self.http.get(url);
                if !params.is_empty() {
                    request = request.query(params);
                }
                if let Some(token) = &self.token {
                    request = request.header(AUTHORIZATION, format!("token {token}"));
                }
                request.send().await
            };

            let response = match response {
                Ok(r) => r,
                Err(err) => {
                    debug!(url, error = %err, "request failed");
                    return None;
                }
            };

            self.update_quota(response.headers());
            let status = response.status();

            let throttled =
                status == StatusCode::FORBIDDEN || status == StatusCode::TOO_MANY_REQUESTS;
            if throttled && self.quota().remaining == 0 {
                if waits >= self.max_rate_limit_waits {
                    warn!(url, waits, "rate limit still exhausted, giving up on request");
                    return None;
                }
                let wait = self.throttle_wait();
                if let Some(deadline) = self.deadline {
                    if Instant::now() + wait >= deadline {
                        warn!(
                            url,
                            wait_secs = wait.as_secs(),
                            "throttle wait would overrun the run deadline, giving up"
                        );
                        return None;
                    }
                }
                warn!(
                    url,
                    wait_secs = wait.as_secs(),
                    "rate limit exhausted, waiting for reset"
                );
                tokio::time::sleep(wait).await;
                waits += 1;
                continue;
            }

            if !status.is_success() {
                debug!(url, status = status.as_u16(), "non-success response");
                return None;
            }

            return match response.json::<Value>().await {
                Ok(body) => Some(body),
                Err(err) => {
                    debug!(url, error = %err, "response body was not valid JSON");
                    None
                }
            };
        }
    }

    /// Repository metadata; a failed fetch yields the empty default record.
    pub async fn repo_info(&self) -> RepoInfo {
        let url = format!(
            "{}/repos/{}/{}",
            self.base_url, self.target.owner, self.target.repo
        );
        match self.get_json(&url, &[]).await {
            Some(body) => serde_json::from_value(body).unwrap_or_default(),
            None => RepoInfo::default(),
        }
    }

    /// Language name to byte count; empty on failure.
    pub async fn languages(&self) -> BTreeMap<String, u64> {
        let url = format!(
            "{}/repos/{}/{}/languages",
            self.base_url, self.target.owner, self.target.repo
        );
        self.get_json(&url, &[])
            .await
            .and_then(|body| serde_json::from_value(body).ok())
            .unwrap_or_default()
    }

    /// Decoded readme text. A missing readme, undecodable base64, or
    /// invalid UTF-8 all yield the empty string.
    pub async fn readme(&self) -> String {
        let url = format!(
            "{}/repos/{}/{}/readme",
            self.base_url, self.target.owner, self.target.repo
        );
        let Some(body) = self.get_json(&url, &[]).await else {
            return String::new();
        };
        let encoded = body.get("content").and_then(Value::as_str).unwrap_or("");
        decode_base64_text(encoded)
    }
}

#[async_trait]
impl RepoSource for GitHubClient {
    async fn list_dir(&self, path: &str) -> Option<Vec<DirEntry>> {
        let url = format!(
            "{}/repos/{}/{}/contents/{}",
            self.base_url, self.target.owner, self.target.repo, path
        );
        let body = self.get_json(&url, &[]).await?;
        match serde_json::from_value(body) {
            Ok(entries) => Some(entries),
            Err(err) => {
                // The endpoint returns an object when the path is a file.
                debug!(path, error = %err, "contents body was not a directory listing");
                None
            }
        }
    }

    /// Raw downloads skip quota bookkeeping: the content host does not
    /// return rate-limit headers.
    async fn download(&self, url: &str) -> Option<String> {
        if self.cancelled() {
            debug!(url, "skipping download, run deadline passed");
            return None;
        }

        let _permit = self.permits.acquire().await.ok()?;
        let mut request = self.http.get(url);
        if let Some(token) = &self.token {
            request = request.header(AUTHORIZATION, format!("token {token}"));
        }
        match request.send().await {
            Ok(r) if r.status().is_success() => match r.text().await {
                Ok(text) => Some(text),
                Err(err) => {
                    debug!(url, error = %err, "download body unreadable");
                    None
                }
            },
            Ok(r) => {
                debug!(url, status = r.status().as_u16(), "download failed");
                None
            }
            Err(err) => {
                debug!(url, error = %err, "download request failed");
                None
            }
        }
    }

    fn cancelled(&self) -> bool {
        self.deadline.is_some_and(|d| Instant::now() >= d)
    }
}

fn header_number<T>(headers: &HeaderMap, name: &str) -> T
where
    T: std::str::FromStr + Default,
{
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or_default()
}

/// Decode base64 that may carry embedded newlines (the readme endpoint
/// wraps its payload). Any failure yields the empty string.
fn decode_base64_text(encoded: &str) -> String {
    let compact: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
    match base64::engine::general_purpose::STANDARD.decode(compact.as_bytes()) {
        Ok(bytes) => String::from_utf8(bytes).unwrap_or_default(),
        Err(_) => String::new(),
    }
}
