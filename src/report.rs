//! Human-readable analysis summary.
//!
//! Renders the aggregate artifact as aligned plain text on stdout. The
//! machine-readable path is the JSON artifact; this view is for eyes, and
//! it surfaces partial-failure counts so a degraded walk never passes for
//! an empty repository.

use crate::models::RepoAnalysis;

/// Print the run summary for one analyzed repository.
pub fn print_summary(analysis: &RepoAnalysis) {
    let info = &analysis.repo_info;
    let title = if info.full_name.is_empty() {
        "(metadata unavailable)"
    } else {
        info.full_name.as_str()
    };

    println!("Repo Scout Analysis");
    println!("===================");
    println!();
    println!("  Repository:  {}", title);
    if let Some(description) = info.description.as_deref().filter(|d| !d.is_empty()) {
        println!("  About:       {}", description);
    }
    if let Some(license) = &info.license {
        if !license.name.is_empty() {
            println!("  License:     {}", license.name);
        }
    }
    if !info.default_branch.is_empty() {
        println!("  Branch:      {}", info.default_branch);
    }
    println!("  Stars:       {}", format_number(info.stargazers_count));
    println!("  Forks:       {}", format_number(info.forks_count));
    if let Some(updated) = info.updated_at {
        println!("  Updated:     {}", updated.format("%Y-%m-%d %H:%M"));
    }
    println!();
    println!(
        "  Tree:        {} directories, {} files",
        format_number(analysis.repo_structure.dir_count()),
        format_number(analysis.file_count)
    );
    println!(
        "  Elements:    {} functions, {} classes",
        format_number(analysis.functions.len() as u64),
        format_number(analysis.classes.len() as u64)
    );
    println!(
        "  Readme:      {}",
        if analysis.has_readme { "present" } else { "missing" }
    );

    if !analysis.language_stats.is_empty() {
        let total: u64 = analysis.language_stats.values().sum();
        println!();
        println!("  Languages:");
        println!("  {:<16} {:>10} {:>7}", "LANGUAGE", "BYTES", "SHARE");
        println!("  {}", "-".repeat(36));

        // Largest share first; the map itself is alphabetical.
        let mut rows: Vec<_> = analysis.language_stats.iter().collect();
        rows.sort_by(|a, b| b.1.cmp(a.1).then(a.0.cmp(b.0)));
        for (language, bytes) in rows {
            let share = if total > 0 { bytes * 100 / total } else { 0 };
            println!(
                "  {:<16} {:>10} {:>6}%",
                language,
                format_bytes(*bytes),
                share
            );
        }
    }

    if !analysis.features.is_empty() {
        let tags: Vec<&str> = analysis.features.iter().map(String::as_str).collect();
        println!();
        println!("  Detected:    {}", tags.join(", "));
    }

    let stats = &analysis.stats;
    if stats.any_failures() || stats.files_skipped_size > 0 {
        println!();
        println!(
            "  Partial:     {} listings failed, {} downloads failed, {} files over the size ceiling",
            stats.dir_failures, stats.file_failures, stats.files_skipped_size
        );
    }

    println!();
}

/// Format a byte count as a human-readable string.
fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else if bytes < 1024 * 1024 * 1024 {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    } else {
        format!("{:.2} GB", bytes as f64 / (1024.0 * 1024.0 * 1024.0))
    }
}

/// Format a count with thousands separators.
fn format_number(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::with_capacity(s.len() + (s.len() - 1) / 3);
    let chars: Vec<char> = s.chars().rev().collect();
    for (i, c) in chars.iter().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(*c);
    }
    result.chars().rev().collect()
}
