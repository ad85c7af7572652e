//! Terminal output: step headers, boxed errors, tables, spinner, progress.

use crate::messages::msg;
use colored::Colorize;
use console::measure_text_width;
use indicatif::{ProgressBar, ProgressStyle};
use kk_monitor::{HealthState, ImageUpdate, ServiceStatus};
use kk_types::UserError;
use kk_validator::PreflightReport;
use std::time::Duration;
use tabled::settings::Style;
use tabled::{Table, Tabled};

pub fn show_step_header(current: usize, total: usize, label: &str) {
    println!();
    println!("{} {}", format!("==> [{}/{}]", current, total).cyan().bold(), label.bold());
}

pub fn show_success(text: &str) {
    println!("  {} {}", "[OK]".green(), text);
}

pub fn show_warning(text: &str) {
    println!("  {} {}", "[!]".yellow(), text);
}

pub fn show_info(text: &str) {
    println!("  {}", text);
}

/// Human box title for an error class.
pub fn error_title(class: kk_types::ErrorClass) -> &'static str {
    use kk_types::ErrorClass;
    match class {
        ErrorClass::EngineMissing => "Docker missing",
        ErrorClass::EngineUnreachable => "Docker unavailable",
        ErrorClass::EnginePermission => "Docker permission denied",
        ErrorClass::ComposeVersion => "Compose version too old",
        ErrorClass::PortConflict => "Port conflict",
        ErrorClass::ConfigMissing => "Project not configured",
        ErrorClass::ConfigSyntax => "Configuration invalid",
        ErrorClass::EnvMissing => ".env missing",
        ErrorClass::EnvInvalid => ".env invalid",
        ErrorClass::SecretTooShort => "Secret too short",
        ErrorClass::LowDisk => "Low disk space",
        ErrorClass::PullFailed => "Pull failed",
        ErrorClass::RecreateFailed => "Engine command failed",
        ErrorClass::Inspect => "Inspection failed",
        ErrorClass::Cancelled => "Cancelled",
    }
}

/// Red titled box with message, remediation, and optional command.
pub fn show_boxed_error(title: &str, error: &UserError) {
    let mut lines: Vec<String> = Vec::new();
    lines.extend(error.message.lines().map(str::to_string));
    if !error.suggestion.is_empty() {
        lines.push(String::new());
        lines.push(format!("{}:", msg("to_fix")));
        lines.extend(error.suggestion.lines().map(|l| format!("  {}", l)));
    }
    if let Some(command) = &error.command {
        lines.push(format!("{}: {}", msg("then_run"), command));
    }

    let header = format!(" {} ", title);
    let header_width = measure_text_width(&header);
    let inner = lines
        .iter()
        .map(|l| measure_text_width(l))
        .max()
        .unwrap_or(0)
        .max(header_width)
        + 2;

    eprintln!(
        "{}",
        format!("╭─{}{}╮", header, "─".repeat(inner + 1 - header_width)).red()
    );
    for line in &lines {
        let pad = inner.saturating_sub(measure_text_width(line) + 2);
        eprintln!("{}", format!("│ {}{} │", line, " ".repeat(pad)).red());
    }
    eprintln!("{}", format!("╰{}╯", "─".repeat(inner + 2)).red());
}

/// Per-service progress line for the health monitor callback.
pub fn show_service_progress(service: &str, state: HealthState, message: Option<&str>) {
    match state {
        HealthState::Starting => println!("  {} {} ...", "[>]".cyan(), service),
        HealthState::Healthy | HealthState::Running => {
            println!("  {} {}", "[OK]".green(), service)
        }
        HealthState::Unhealthy | HealthState::Stopped | HealthState::Error => {
            let detail = message.unwrap_or("");
            println!("  {} {} {}", "[X]".red(), service, detail.dimmed())
        }
        HealthState::Timeout => println!("  {} {} (timeout)", "[X]".red(), service),
    }
}

/// Spinner with a single live message line. indicatif keeps the mutable
/// message behind its own lock, so the compose driver's stderr tee and the
/// spinner can share the terminal.
pub struct Spinner {
    bar: ProgressBar,
}

impl Spinner {
    pub fn start(message: &str) -> Self {
        let bar = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("  {spinner} {msg}") {
            bar.set_style(style);
        }
        bar.set_message(message.to_string());
        bar.enable_steady_tick(Duration::from_millis(100));
        Self { bar }
    }

    pub fn update_message(&self, message: &str) {
        self.bar.set_message(message.to_string());
    }

    pub fn finish_success(&self, message: &str) {
        self.bar
            .finish_with_message(format!("{} {}", "[OK]".green(), message));
    }

    pub fn finish_fail(&self, message: &str) {
        self.bar
            .finish_with_message(format!("{} {}", "[X]".red(), message));
    }
}

#[derive(Tabled)]
struct StatusRow {
    #[tabled(rename = "SERVICE")]
    service: String,
    #[tabled(rename = "STATUS")]
    status: String,
    #[tabled(rename = "HEALTH")]
    health: String,
    #[tabled(rename = "PORTS")]
    ports: String,
}

pub fn print_status_table(statuses: &[ServiceStatus]) {
    println!();
    println!("{}", msg("service_status").bold());

    let rows: Vec<StatusRow> = statuses
        .iter()
        .map(|s| StatusRow {
            service: s.name.clone(),
            status: if s.running {
                format!("● {}", msg("status_running")).green().to_string()
            } else {
                format!("○ {} ({})", msg("status_stopped"), s.state).red().to_string()
            },
            health: match s.health.as_str() {
                "" => "-".dimmed().to_string(),
                "healthy" => s.health.green().to_string(),
                "unhealthy" => s.health.red().to_string(),
                other => other.yellow().to_string(),
            },
            ports: if s.ports.is_empty() {
                "-".to_string()
            } else {
                truncate(&s.ports, 30)
            },
        })
        .collect();

    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{}", table);
}

#[derive(Tabled)]
struct UpdateRow {
    #[tabled(rename = "IMAGE")]
    image: String,
    #[tabled(rename = "STATUS")]
    status: String,
}

pub fn print_updates_table(updates: &[ImageUpdate]) {
    if updates.is_empty() {
        return;
    }
    println!();
    println!("{}", msg("updates_available").bold());

    let rows: Vec<UpdateRow> = updates
        .iter()
        .map(|u| UpdateRow {
            image: u.image.clone(),
            status: "updated".green().to_string(),
        })
        .collect();

    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{}", table);
}

pub fn print_preflight_results(report: &PreflightReport) {
    println!();
    for result in &report.results {
        if result.passed {
            if result.warnings.is_empty() {
                show_success(&result.check_name);
            } else {
                for warning in &result.warnings {
                    show_warning(&format!("{}: {}", result.check_name, warning));
                }
            }
        } else {
            println!("  {} {}", "[X]".red(), result.check_name);
            if let Some(error) = &result.error {
                for line in error.message.lines() {
                    println!("      {}", line.red());
                }
                println!("      {} {}", "→".dimmed(), error.suggestion.dimmed());
            }
        }
    }
    println!();
}

pub fn print_access_info(statuses: &[ServiceStatus]) {
    let urls: Vec<(String, &'static str)> = statuses
        .iter()
        .filter(|s| s.running)
        .filter_map(|s| service_url(&s.name).map(|url| (s.name.clone(), url)))
        .collect();
    if urls.is_empty() {
        return;
    }

    println!();
    println!("{}", msg("access_info").bold());
    for (service, url) in urls {
        println!("  {}: {}", service, url);
    }
}

fn service_url(service: &str) -> Option<&'static str> {
    match service {
        "kkengine" => Some("http://localhost:8019"),
        "db" => Some("localhost:3307"),
        "caddy" => Some("http://localhost (HTTPS: https://localhost)"),
        "automation" => Some("http://localhost:5678"),
        _ => None,
    }
}

fn truncate(text: &str, max: usize) -> String {
    if text.len() > max {
        format!("{}...", &text[..max.saturating_sub(3)])
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_preserves_short_text() {
        assert_eq!(truncate("3307->3306/tcp", 30), "3307->3306/tcp");
    }

    #[test]
    fn test_truncate_limits_long_text() {
        let long = "0.0.0.0:80->80/tcp, 0.0.0.0:443->443/tcp, 0.0.0.0:8019->80/tcp";
        let short = truncate(long, 30);
        assert!(short.len() <= 30);
        assert!(short.ends_with("..."));
    }
}
