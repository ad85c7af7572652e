//! Port ownership checks.
//!
//! A port counts as free when nothing listens on it, or when the listener is
//! one of our own containers publishing that port. Foreign owners are
//! reported with PID and process name when discoverable.

use bollard::container::ListContainersOptions;
use bollard::Docker;
use kk_types::{Ctx, ErrorClass, UserError};
use std::collections::HashSet;
use std::net::{Ipv4Addr, SocketAddr, TcpListener};
use tracing::debug;

/// Container-name prefix the engine gives to this project's containers.
pub const PROJECT_PREFIX: &str = "kkengine";

pub fn required_ports() -> Vec<(&'static str, u16)> {
    vec![("MariaDB", 3307), ("kkengine", 8019)]
}

pub fn optional_ports() -> Vec<(&'static str, u16)> {
    vec![("Caddy HTTP", 80), ("Caddy HTTPS", 443)]
}

#[derive(Debug, Clone)]
pub struct PortStatus {
    pub label: String,
    pub port: u16,
    pub in_use: bool,
    pub pid: Option<i32>,
    pub process: Option<String>,
    pub owned_by_us: bool,
}

/// Probe one port by binding locally. Privileged ports that cannot be bound
/// without root fall back to a listening-socket scan.
pub fn check_port(label: &str, port: u16) -> PortStatus {
    let mut status = PortStatus {
        label: label.to_string(),
        port,
        in_use: false,
        pid: None,
        process: None,
        owned_by_us: false,
    };

    let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, port));
    match TcpListener::bind(addr) {
        Ok(listener) => drop(listener),
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied && port < 1024 => {
            status.in_use = socket_scan_lists_port(port).unwrap_or(false);
        }
        Err(_) => status.in_use = true,
    }

    if status.in_use {
        let (pid, process) = find_process_using_port(port);
        status.pid = pid;
        status.process = process;
    }
    status
}

/// Probe every required port (plus the reverse-proxy ports when enabled) and
/// classify listeners. Returns all statuses plus a single conflict error when
/// any port has a foreign owner.
pub async fn check_all_ports(include_caddy: bool, ctx: &Ctx) -> (Vec<PortStatus>, Option<UserError>) {
    let mut statuses: Vec<PortStatus> = required_ports()
        .into_iter()
        .map(|(label, port)| check_port(label, port))
        .collect();
    if include_caddy {
        statuses.extend(
            optional_ports()
                .into_iter()
                .map(|(label, port)| check_port(label, port)),
        );
    }

    if statuses.iter().any(|s| s.in_use) {
        if let Some(owned) = engine_published_ports(ctx).await {
            mark_ownership(&mut statuses, &owned);
        }
    }

    let error = conflict_error(&statuses);
    (statuses, error)
}

pub(crate) fn mark_ownership(statuses: &mut [PortStatus], owned: &HashSet<u16>) {
    for status in statuses.iter_mut() {
        if status.in_use && owned.contains(&status.port) {
            status.owned_by_us = true;
        }
    }
}

pub(crate) fn conflict_error(statuses: &[PortStatus]) -> Option<UserError> {
    let conflicts: Vec<&PortStatus> = statuses
        .iter()
        .filter(|s| s.in_use && !s.owned_by_us)
        .collect();
    if conflicts.is_empty() {
        return None;
    }

    let lines: Vec<String> = conflicts
        .iter()
        .map(|s| match (s.pid, s.process.as_deref()) {
            (Some(pid), Some(process)) => format!(
                "Port {} ({}): used by {} (PID {})",
                s.port, s.label, process, pid
            ),
            (Some(pid), None) => format!("Port {} ({}): used by PID {}", s.port, s.label, pid),
            _ => format!("Port {} ({}): already in use", s.port, s.label),
        })
        .collect();

    let mut error = UserError::new(
        ErrorClass::PortConflict,
        lines.join("\n"),
        "Stop the conflicting process or change its port",
    );
    if let Some(pid) = conflicts.iter().find_map(|s| s.pid) {
        error = error.with_command(format!("sudo kill {}", pid));
    }
    Some(error)
}

/// Published ports of running containers whose name carries our project
/// prefix. `None` when the engine cannot be asked; the caller then treats
/// every listener as foreign.
async fn engine_published_ports(ctx: &Ctx) -> Option<HashSet<u16>> {
    let docker = Docker::connect_with_local_defaults().ok()?;
    let options = ListContainersOptions::<String> {
        all: false,
        ..Default::default()
    };

    let containers = tokio::select! {
        result = docker.list_containers(Some(options)) => result.ok()?,
        _ = ctx.cancelled() => return None,
    };

    let mut published = HashSet::new();
    for container in containers {
        let ours = container
            .names
            .as_deref()
            .unwrap_or_default()
            .iter()
            .any(|n| n.trim_start_matches('/').starts_with(PROJECT_PREFIX));
        if !ours {
            continue;
        }
        for port in container.ports.unwrap_or_default() {
            if let Some(public) = port.public_port {
                published.insert(public);
            }
        }
    }
    debug!(?published, "ports published by our containers");
    Some(published)
}

/// `ss -tlnp`, falling back to `netstat -tlnp`.
fn socket_scan_lists_port(port: u16) -> Option<bool> {
    for (program, args) in [("ss", ["-tlnp"]), ("netstat", ["-tlnp"])] {
        let output = match std::process::Command::new(program).args(args).output() {
            Ok(output) if output.status.success() => output,
            _ => continue,
        };
        let text = String::from_utf8_lossy(&output.stdout);
        return Some(scan_output_lists_port(&text, port));
    }
    None
}

fn scan_output_lists_port(text: &str, port: u16) -> bool {
    let suffix = format!(":{}", port);
    text.lines().any(|line| {
        line.split_whitespace()
            .any(|token| token.ends_with(&suffix) && token != suffix)
    })
}

/// `lsof -t` for the PID, then `/proc/<pid>/comm` for the name.
fn find_process_using_port(port: u16) -> (Option<i32>, Option<String>) {
    let output = match std::process::Command::new("lsof")
        .args(["-t", "-i", &format!(":{}", port), "-sTCP:LISTEN"])
        .output()
    {
        Ok(output) if output.status.success() => output,
        _ => return (None, None),
    };

    let stdout = String::from_utf8_lossy(&output.stdout);
    let pid: i32 = match stdout.lines().next().and_then(|l| l.trim().parse().ok()) {
        Some(pid) => pid,
        None => return (None, None),
    };

    let process = std::fs::read_to_string(format!("/proc/{}/comm", pid))
        .ok()
        .map(|s| s.trim().to_string());
    (Some(pid), process)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_free_port_reports_unused() {
        // Bind to an ephemeral port to learn a number, release it, probe it.
        let listener = TcpListener::bind("0.0.0.0:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);
        let status = check_port("test", port);
        assert!(!status.in_use);
        assert!(status.pid.is_none());
    }

    #[test]
    fn test_held_port_reports_in_use() {
        let listener = TcpListener::bind("0.0.0.0:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let status = check_port("test", port);
        assert!(status.in_use);
    }

    #[test]
    fn test_ownership_suppresses_conflict() {
        let mut statuses = vec![PortStatus {
            label: "kkengine".into(),
            port: 8019,
            in_use: true,
            pid: None,
            process: None,
            owned_by_us: false,
        }];
        let owned: HashSet<u16> = [8019].into_iter().collect();
        mark_ownership(&mut statuses, &owned);
        assert!(statuses[0].owned_by_us);
        assert!(conflict_error(&statuses).is_none());
    }

    #[test]
    fn test_foreign_owner_is_a_conflict_with_kill_hint() {
        let statuses = vec![PortStatus {
            label: "MariaDB".into(),
            port: 3307,
            in_use: true,
            pid: Some(4242),
            process: Some("mysqld".into()),
            owned_by_us: false,
        }];
        let error = conflict_error(&statuses).unwrap();
        assert_eq!(error.class, ErrorClass::PortConflict);
        assert!(error.message.contains("mysqld"));
        assert!(error.message.contains("4242"));
        assert_eq!(error.command.as_deref(), Some("sudo kill 4242"));
    }

    #[test]
    fn test_scan_output_port_match_is_exact() {
        let out = "LISTEN 0 128 0.0.0.0:8019 0.0.0.0:*\nLISTEN 0 128 127.0.0.1:80 0.0.0.0:*\n";
        assert!(scan_output_lists_port(out, 80));
        assert!(scan_output_lists_port(out, 8019));
        assert!(!scan_output_lists_port(out, 801));
    }
}
