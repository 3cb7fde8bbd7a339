//! # Repo Scout
//!
//! A rate-limit-aware GitHub repository introspection engine.
//!
//! Repo Scout fetches repository metadata, walks the entire file tree via
//! the GitHub contents API, extracts functions and classes from source
//! files with per-language pattern matchers, and flags likely frameworks
//! from filename and language evidence. Every stage degrades gracefully:
//! a failed request empties its subtree and is counted, never fatal.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────┐   ┌────────────┐   ┌─────────────┐
//! │  GitHub    │──▶│ TreeWalker │──▶│  Matchers   │
//! │  client    │   │ (parallel) │   │ py/js/java/ │
//! │ (throttle) │   │            │   │     kt      │
//! └────────────┘   └─────┬──────┘   └──────┬──────┘
//!                        │                 │
//!                        ▼                 ▼
//!                  ┌───────────────────────────┐
//!                  │   RepoAnalysis artifact   │
//!                  │ tree + elements + features│
//!                  └───────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! rscout analyze https://github.com/pallets/flask
//! rscout analyze pallets/flask --json            # machine-readable
//! rscout analyze pallets/flask --output out.json # write artifact
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Core data types and the analysis artifact |
//! | [`github`] | REST client, quota tracking, throttled retries |
//! | [`walker`] | Concurrent recursive tree walk |
//! | [`languages`] | Per-language code element matchers |
//! | [`features`] | Framework and tooling detection |
//! | [`analyzer`] | End-to-end analysis pipeline |
//! | [`report`] | Human-readable summary output |

pub mod analyzer;
pub mod config;
pub mod features;
pub mod github;
pub mod languages;
pub mod models;
pub mod report;
pub mod walker;
