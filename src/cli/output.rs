use colored::*;

use crate::common::format::{self, format_path, format_size, format_size_colored, truncate};
use crate::duplicates::{DeletionResult, DuplicateGroup, GroupKind, ScanReport, Snapshot};

/// Print scan results in human-readable format
pub fn print_scan_results(report: &ScanReport, detailed: bool) {
    let stats = &report.stats;

    println!();
    println!("  {} imgdedup Scan Results", "🖼️");
    println!("{}", "─".repeat(60).dimmed());
    println!(
        "  Scanned {} in {}  •  {} reclaimable",
        format::format_count(stats.total_files).cyan(),
        format::format_duration(report.duration_secs).cyan(),
        format_size_colored(stats.space_saved),
    );
    println!(
        "  {} processed  •  {} groups  •  {} removable",
        stats.processed_files,
        stats.duplicate_groups,
        stats.files_to_delete,
    );
    if !report.unavailable.is_empty() {
        println!(
            "  {} {} could not be read",
            "⚠".yellow(),
            format::format_count(report.unavailable.len())
        );
    }
    println!("{}", "─".repeat(60).dimmed());
    println!();

    if report.cancelled {
        println!("  {} Scan cancelled — no groups reported", "✗".red());
        println!();
        return;
    }

    if report.groups.is_empty() {
        println!("  {} No duplicates found!", "✨");
        println!();
        return;
    }

    for (i, group) in report.groups.iter().enumerate() {
        print_group(i, group, detailed);
    }

    if !detailed {
        println!("      Run with {} to see file paths", "--detailed".cyan());
        println!();
    }

    if detailed && !report.unavailable.is_empty() {
        println!("  {} Unreadable files:", "⚠".yellow());
        for u in &report.unavailable {
            println!("    {} {}", "•".dimmed(), truncate(&u.to_string(), 100).dimmed());
        }
        println!();
    }
}

fn print_group(index: usize, group: &DuplicateGroup, detailed: bool) {
    let label = match group.kind() {
        GroupKind::Exact => "exact".red().bold(),
        GroupKind::Similar => "similar".yellow().bold(),
    };
    println!(
        "    Group {} ({}) — {} files, {} reclaimable",
        (index + 1).to_string().bold(),
        label,
        group.len(),
        format_size(group.space_saved()),
    );

    if detailed {
        let keep = group.keep();
        println!(
            "      {} {} ({}, {})",
            "keep →".dimmed(),
            format_path(&keep.path).green(),
            format_size(keep.size_bytes),
            format::format_dimensions(keep.width, keep.height),
        );
        for member in group.delete() {
            println!(
                "      {} {} ({}, {})",
                "  dup →".dimmed(),
                format_path(&member.path).dimmed(),
                format_size(member.size_bytes),
                format::format_dimensions(member.width, member.height),
            );
        }
        println!();
    }
}

/// Print scan results as JSON
pub fn print_scan_json(snapshot: &Snapshot, report: &ScanReport) {
    let json = serde_json::json!({
        "snapshot": snapshot,
        "cancelled": report.cancelled,
        "duration_secs": report.duration_secs,
        "unavailable": report.unavailable.iter().map(|u| u.to_string()).collect::<Vec<_>>(),
    });
    match serde_json::to_string_pretty(&json) {
        Ok(s) => println!("{}", s),
        Err(e) => eprintln!("Error serializing: {}", e),
    }
}

/// One line: groups, removable files, reclaimable bytes
pub fn print_scan_quiet(report: &ScanReport) {
    println!(
        "{}  {}  {}",
        report.stats.duplicate_groups,
        report.stats.files_to_delete,
        format_size(report.stats.space_saved)
    );
}

/// Print the outcome of a delete operation
pub fn print_deletion_result(result: &DeletionResult) {
    println!();
    if result.dry_run {
        println!(
            "  {} {} — would delete {}, freeing {}. No files modified.",
            "ℹ️",
            "Dry run".bold(),
            format::format_count(result.would_delete).cyan(),
            format_size_colored(result.would_free),
        );
        println!(
            "  {} Run with {} to delete",
            "💡",
            "--no-dry-run".cyan()
        );
    } else {
        println!(
            "  {} {} — {} deleted, {} freed",
            "🔥",
            "Deleted".bold(),
            format::format_count(result.deleted_count).cyan(),
            format_size_colored(result.bytes_freed),
        );
    }

    if !result.errors.is_empty() {
        println!();
        println!("  {} {} errors:", "⚠".yellow(), result.error_count);
        for e in result.errors.iter().take(10) {
            println!("    {} {}", "•".dimmed(), truncate(&e.to_string(), 100).dimmed());
        }
        if result.errors.len() > 10 {
            println!("    ... and {} more", result.errors.len() - 10);
        }
    }
    println!();
}

pub fn print_deletion_json(result: &DeletionResult) {
    match serde_json::to_string_pretty(result) {
        Ok(s) => println!("{}", s),
        Err(e) => eprintln!("Error serializing: {}", e),
    }
}
