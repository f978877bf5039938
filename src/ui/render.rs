//! Plain-text renderers for command output.
//!
//! Each returns a `String` so commands decide where it goes.

use std::fmt::Write as _;

use console::style;
use terminal_size::{Width, terminal_size};

use crate::api::BackupInfo;
use crate::dashboard::DashboardFrame;
use crate::ui::icons::{CHECK, CROSS, DEVELOPMENT, FILE_DEL, FILE_MOD, FILE_NEW, GIT, PRODUCTION};
use panel_common::{
    ActionLogEntry, Instance, LogStats, Partitioned, RepositoryLink, RepositoryStatus,
    derived_production_name,
};

const DEFAULT_WIDTH: usize = 100;
const BAR_WIDTH: usize = 20;

/// Current terminal width, or a sane default when not attached to one.
pub fn term_width() -> usize {
    terminal_size()
        .map(|(Width(w), _)| w as usize)
        .unwrap_or(DEFAULT_WIDTH)
}

/// `[#######.............]  35.0%`
pub fn percent_bar(percent: f64) -> String {
    let clamped = percent.clamp(0.0, 100.0);
    let filled = ((clamped / 100.0) * BAR_WIDTH as f64).round() as usize;
    format!(
        "[{}{}] {:5.1}%",
        "#".repeat(filled),
        ".".repeat(BAR_WIDTH - filled),
        percent
    )
}

fn or_dash(value: Option<&str>) -> &str {
    value.filter(|v| !v.is_empty()).unwrap_or("-")
}

fn instance_line(out: &mut String, instance: &Instance) {
    let status = match instance.status.as_deref() {
        Some("running") | Some("active") => style(or_dash(instance.status.as_deref())).green(),
        Some(_) => style(or_dash(instance.status.as_deref())).yellow(),
        None => style("-").dim(),
    };
    let _ = writeln!(
        out,
        "  {:<28} {:<10} {:<34} {}",
        instance.name,
        status,
        or_dash(instance.domain.as_deref()),
        or_dash(instance.version.as_deref()),
    );
}

/// Production instances first, then development instances with the
/// production instance each belongs to.
pub fn instances(partitioned: &Partitioned<'_>) -> String {
    let mut out = String::new();
    if partitioned.is_empty() {
        out.push_str("No instances match the current filters.\n");
        return out;
    }

    let _ = writeln!(
        out,
        "{}{} ({})",
        PRODUCTION,
        style("Production").bold(),
        partitioned.production.len()
    );
    for instance in &partitioned.production {
        instance_line(&mut out, instance);
    }

    let _ = writeln!(
        out,
        "\n{}{} ({})",
        DEVELOPMENT,
        style("Development").bold(),
        partitioned.development.len()
    );
    for instance in &partitioned.development {
        instance_line(&mut out, instance);
        if let Some(parent) = derived_production_name(instance) {
            let _ = writeln!(out, "      {} {}", style("of").dim(), parent);
        }
    }
    out
}

pub fn repository_link(link: &RepositoryLink) -> String {
    format!("{}{} • {}", GIT, link.repo(), link.repo_branch)
}

pub fn repository_status(status: &RepositoryStatus) -> String {
    if !status.has_changes || status.changes.is_empty() {
        return "Working tree clean.\n".to_string();
    }
    let mut out = format!("{} changed file(s):\n", status.changes.len());
    for change in &status.changes {
        let icon = match change.status.as_deref().map(str::trim) {
            Some("A") | Some("??") => &FILE_NEW,
            Some("D") => &FILE_DEL,
            _ => &FILE_MOD,
        };
        let _ = writeln!(
            out,
            "  {}{} {}",
            icon,
            style(or_dash(change.status.as_deref())).dim(),
            change.file
        );
    }
    out
}

/// Log entries with details wrapped to `width`.
pub fn log_entries(entries: &[ActionLogEntry], width: usize) -> String {
    if entries.is_empty() {
        return "No log entries in this window.\n".to_string();
    }
    let detail_width = width.saturating_sub(8).max(20);
    let mut out = String::new();
    for entry in entries {
        let icon = if entry.is_success() { &CHECK } else { &CROSS };
        let when = entry
            .timestamp
            .map(|ts| ts.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| "-".to_string());
        let _ = writeln!(
            out,
            "{}{}  {:<20} {:<20} {}",
            icon,
            style(when).dim(),
            entry.action_label(),
            or_dash(entry.instance_name.as_deref()),
            or_dash(entry.username.as_deref()),
        );
        if let Some(details) = entry.details.as_deref().filter(|d| !d.trim().is_empty()) {
            for line in textwrap::wrap(details, detail_width) {
                let _ = writeln!(out, "      {}", line);
            }
        }
    }
    out
}

pub fn log_stats(stats: &LogStats, hours: u32) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Last {} hour(s)", hours);
    let _ = writeln!(out, "  Total:        {}", stats.total);
    let _ = writeln!(out, "  Successful:   {}", style(stats.success).green());
    let _ = writeln!(out, "  Errors:       {}", style(stats.errors).red());
    let _ = writeln!(out, "  Success rate: {}%", stats.success_rate());
    if !stats.by_type.is_empty() {
        let _ = writeln!(out, "  By action:");
        for count in &stats.by_type {
            let _ = writeln!(out, "    {:<24} {}", count.action.replace('_', " "), count.count);
        }
    }
    out
}

pub fn dashboard(frame: &DashboardFrame) -> String {
    let current = &frame.current;
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} {}  up {}",
        style(or_dash(Some(&current.system.hostname))).bold(),
        style(&current.system.platform).dim(),
        or_dash(Some(&current.system.uptime_formatted)),
    );
    let _ = writeln!(
        out,
        "  CPU     {}  ({} cores)",
        percent_bar(current.cpu.percent),
        current.cpu.count_logical.max(current.cpu.count)
    );
    let _ = writeln!(
        out,
        "  Memory  {}  ({:.1}/{:.1} GB)",
        percent_bar(current.memory.percent),
        current.memory.used_gb,
        current.memory.total_gb
    );
    if let Some(disk) = current.primary_disk() {
        let _ = writeln!(
            out,
            "  Disk    {}  ({:.1}/{:.1} GB on {})",
            percent_bar(disk.percent),
            disk.used_gb,
            disk.total_gb,
            disk.mountpoint
        );
    }
    let _ = writeln!(
        out,
        "  Network ↑ {:.2} Mbps  ↓ {:.2} Mbps",
        current.network.speed_mbps_sent, current.network.speed_mbps_recv
    );
    if let (Some(cpu), Some(ram)) = (frame.history.average_cpu(), frame.history.average_ram()) {
        let _ = writeln!(
            out,
            "  Average over {} samples: CPU {:.1}%, memory {:.1}%",
            frame.history.metrics.len(),
            cpu,
            ram
        );
    }
    let _ = writeln!(
        out,
        "{}",
        style(format!("Updated {}", frame.fetched_at.format("%H:%M:%S"))).dim()
    );
    out
}

pub fn backup_info(info: &BackupInfo) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Backup manager: {}", info.full_url);
    if let Some(url) = &info.production_url {
        let _ = writeln!(out, "  Production URL: {}", url);
    }
    if let Some(path) = &info.manager_path {
        let _ = writeln!(out, "  Manager path:   {}", path);
    }
    out
}
