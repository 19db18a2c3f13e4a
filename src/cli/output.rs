use colored::*;
use serde_json::json;
use std::path::Path;

use crate::common::format::{self, format_path, format_size, format_size_colored};
use crate::notice::{Notice, NoticeLevel};
use crate::purge::{CacheUsage, PurgeResult};
use crate::triggers::{Redirect, TriggerEvent};

/// Cache directory facts shown by `status`
#[derive(Debug)]
pub struct CacheStatus<'a> {
    pub path: &'a Path,
    pub exists: bool,
    pub writable: bool,
    pub protected: bool,
    pub usage: Option<CacheUsage>,
}

/// Print a purge outcome in human-readable format
pub fn print_purge_result(result: &PurgeResult, cache_path: &Path) {
    println!();
    println!("  {}  NGINX Cache Purge", "🧹");
    println!("{}", "─".repeat(60).dimmed());
    format::print_kv("Cache", &format_path(cache_path));

    match result {
        PurgeResult::Skipped(reason) => {
            println!();
            println!("  {} Skipped: {}", "⚠".yellow(), reason);
        }
        PurgeResult::Success(stats) => {
            println!();
            println!(
                "  {} Removed {} and {} in {}",
                "✓".green(),
                format::format_count(stats.files_removed, "file", "files"),
                format::format_count(stats.dirs_removed, "directory", "directories"),
                format::format_duration(stats.duration_secs).cyan()
            );
            println!("  {} Freed {}", "🔥", format_size_colored(stats.bytes_freed));
        }
        PurgeResult::PartialFailure { stats, unremoved } => {
            println!();
            println!(
                "  {} Removed {}, freed {}",
                "⚠".yellow(),
                format::format_count(stats.files_removed, "file", "files"),
                format_size(stats.bytes_freed)
            );
            println!(
                "  {} {} could not be removed:",
                "✗".red(),
                format::format_count(unremoved.len(), "path", "paths")
            );
            for failure in unremoved.iter().take(10) {
                println!("    {}", failure.to_string().dimmed());
            }
            if unremoved.len() > 10 {
                println!("    {}", format!("... and {} more", unremoved.len() - 10).dimmed());
            }
        }
    }
    println!();
}

/// Print where the operator is sent next
pub fn print_redirect(redirect: &Redirect) {
    println!(
        "  {} Redirect ({}): {}",
        "→".cyan(),
        redirect.status,
        redirect.location.cyan()
    );
    println!();
}

/// JSON view of a purge outcome
pub fn purge_result_json(result: &PurgeResult) -> serde_json::Value {
    let stats = result.stats().map(|s| {
        json!({
            "files_removed": s.files_removed,
            "dirs_removed": s.dirs_removed,
            "bytes_freed": s.bytes_freed,
            "duration_secs": s.duration_secs,
        })
    });

    json!({
        "status": result.status(),
        "reason": result.skip_reason().map(|r| json!({
            "kind": r.kind(),
            "configuration": r.is_configuration(),
            "message": r.to_string(),
        })),
        "stats": stats,
        "unremoved": result.unremoved().iter().map(|e| e.to_string()).collect::<Vec<_>>(),
    })
}

/// One-line view of a purge outcome: status, files, bytes
pub fn purge_result_quiet(result: &PurgeResult) -> String {
    let (files, bytes) = result
        .stats()
        .map(|s| (s.files_removed, s.bytes_freed))
        .unwrap_or((0, 0));
    format!("{}  {}  {}", result.status(), files, format_size(bytes))
}

/// Print the bound trigger events
pub fn print_events(events: &[TriggerEvent]) {
    format::print_header("Events that purge the cache");
    for event in events {
        println!(
            "  {} {:<34} {}",
            "●".green(),
            event.as_str(),
            event.description().dimmed()
        );
    }
    println!();
    println!(
        "  {}",
        format!("{} events, each purges the whole cache", events.len()).dimmed()
    );
    println!();
}

pub fn events_json(events: &[TriggerEvent]) -> serde_json::Value {
    json!(events
        .iter()
        .map(|e| json!({ "name": e.as_str(), "description": e.description() }))
        .collect::<Vec<_>>())
}

/// Print a pending notice, or say there is none
pub fn print_notice(notice: Option<&Notice>) {
    match notice {
        Some(n) => {
            let marker = match n.level {
                NoticeLevel::Success => "✓".green(),
                NoticeLevel::Warning => "⚠".yellow(),
            };
            println!("  {} {}", marker, n.message);
        }
        None => println!("  {}", "No pending notice".dimmed()),
    }
}

/// Print cache directory status
pub fn print_status(status: &CacheStatus<'_>) {
    println!();
    println!("  {} NGINX Cache Status", "📊");
    println!("{}", "─".repeat(60).dimmed());
    println!();

    format::print_kv("Cache directory", &format_path(status.path));
    format::print_kv("Exists", &yes_no(status.exists));
    format::print_kv("Writable", &yes_no(status.writable));
    if status.protected {
        println!("  {} Protected system path, purges are refused", "⚠".yellow());
    }

    if let Some(usage) = &status.usage {
        println!();
        println!(
            "  {} {} in {}, {} cached",
            "📦",
            format::format_count(usage.files, "file", "files"),
            format::format_count(usage.dirs, "directory", "directories"),
            format_size_colored(usage.bytes)
        );
    }
    println!();
}

pub fn status_json(status: &CacheStatus<'_>) -> serde_json::Value {
    json!({
        "cache_path": status.path,
        "exists": status.exists,
        "writable": status.writable,
        "protected": status.protected,
        "files": status.usage.as_ref().map(|u| u.files),
        "dirs": status.usage.as_ref().map(|u| u.dirs),
        "bytes": status.usage.as_ref().map(|u| u.bytes),
    })
}

fn yes_no(value: bool) -> String {
    if value {
        "yes".green().to_string()
    } else {
        "no".red().to_string()
    }
}
