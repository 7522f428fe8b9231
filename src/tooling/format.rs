//! Format sync reports, diffs and configuration summaries as text.

use crate::config::PublishConfig;
use crate::sync::{SyncReport, TargetSnapshot};
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;
use owo_colors::OwoColorize;

/// Format a section heading with bold/underline.
pub fn format_section_heading(title: &str) -> String {
    format!("{}", title.bold().underline())
}

/// Summary table of one or more target runs, followed by every error.
pub fn format_sync_reports(reports: &[SyncReport]) -> String {
    let mut out = String::new();
    if reports.iter().any(|r| r.dry_run) {
        out.push_str(&format!("{}\n\n", "DRY RUN: nothing was written".yellow()));
    }
    out.push_str(&format!("{}\n\n", format_section_heading("Sync Summary")));

    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Target", "Created", "Updated", "Skipped", "Errors"]);
    for report in reports {
        table.add_row(vec![
            report.target.clone(),
            report.created.to_string(),
            report.updated.to_string(),
            report.skipped.to_string(),
            report.errors.len().to_string(),
        ]);
    }
    if reports.len() > 1 {
        let total = |f: fn(&SyncReport) -> usize| reports.iter().map(f).sum::<usize>().to_string();
        table.add_row(vec![
            "total".to_string(),
            total(|r| r.created),
            total(|r| r.updated),
            total(|r| r.skipped),
            total(|r| r.errors.len()),
        ]);
    }
    out.push_str(&format!("{}\n", table));

    let errors: Vec<String> = reports
        .iter()
        .flat_map(|r| r.errors.iter().map(move |e| format!("[{}] {}", r.target, e)))
        .collect();
    if !errors.is_empty() {
        out.push_str(&format!(
            "\n{}\n",
            format!("Errors ({})", errors.len()).red().bold()
        ));
        for error in errors {
            out.push_str(&format!("  - {}\n", error));
        }
    }
    out
}

/// Change set of a target against its cache.
pub fn format_diff(target: &str, snapshot: &TargetSnapshot) -> String {
    let mut out = format!(
        "{}\n",
        format_section_heading(&format!("Target {}", target))
    );
    if !snapshot.has_cache {
        out.push_str("  No cache: every page will be published\n");
    }
    if snapshot.diff.is_empty() {
        out.push_str("  No changes\n");
        return out;
    }
    let sections = [
        ("+", "added", &snapshot.diff.added),
        ("~", "modified", &snapshot.diff.modified),
        ("-", "deleted (kept remotely)", &snapshot.diff.deleted),
    ];
    for (sign, label, paths) in sections {
        if paths.is_empty() {
            continue;
        }
        out.push_str(&format!("  {} {}:\n", paths.len(), label));
        for path in paths {
            let line = format!("{} {}", sign, path);
            let line = match sign {
                "+" => line.green().to_string(),
                "-" => line.red().to_string(),
                _ => line.yellow().to_string(),
            };
            out.push_str(&format!("    {}\n", line));
        }
    }
    out
}

/// Targets of a valid configuration.
pub fn format_validation(config: &PublishConfig, token_present: bool) -> String {
    let mut out = format!("{}\n\n", format_section_heading("Configuration OK"));
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Target", "Source", "Parent page"]);
    for target in &config.targets {
        table.add_row(vec![
            target.name.clone(),
            target.src.clone(),
            target.parent_page_id.clone(),
        ]);
    }
    out.push_str(&format!("{}\n", table));
    if !token_present {
        out.push_str(&format!(
            "\n{} environment variable {} is not set; only --dry-run will work\n",
            "Warning:".yellow().bold(),
            config.notion.token_env
        ));
    }
    out
}
