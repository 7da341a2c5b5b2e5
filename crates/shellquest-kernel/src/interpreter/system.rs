//! Simulated system state: environment, processes, packages, network.
//!
//! Nothing here touches a real resource. Output has the shape of the real
//! tools but is fabricated, and deterministic for a given input.

use std::collections::BTreeMap;
use std::fmt;

use super::command::PackageManager;
use super::result::ExecResult;

const DEFAULT_PING_COUNT: u32 = 4;
const MAX_PING_COUNT: u32 = 100;
const DEFAULT_CURL_URL: &str = "https://example.quest";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessStatus {
    Running,
    Sleeping,
}

impl fmt::Display for ProcessStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessStatus::Running => f.write_str("running"),
            ProcessStatus::Sleeping => f.write_str("sleeping"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Process {
    pub pid: i64,
    pub name: String,
    pub status: ProcessStatus,
}

/// The fake machine behind `env`, `ps`, `kill`, `ping`, `curl` and the
/// package managers.
#[derive(Debug, Clone)]
pub struct SimulatedSystem {
    env: BTreeMap<String, String>,
    processes: Vec<Process>,
    /// Installed packages in install order.
    packages: Vec<String>,
}

impl Default for SimulatedSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedSystem {
    pub fn new() -> Self {
        let env = [
            ("PATH", "/usr/local/bin:/usr/bin"),
            ("HOME", "/home/adventurer"),
            ("SHELL", "/bin/bash"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        let processes = [
            (101, "scheduler", ProcessStatus::Running),
            (202, "log-watcher", ProcessStatus::Sleeping),
            (303, "telemetry", ProcessStatus::Running),
        ]
        .into_iter()
        .map(|(pid, name, status)| Process {
            pid,
            name: name.to_string(),
            status,
        })
        .collect();

        Self {
            env,
            processes,
            packages: vec!["core-utils".to_string()],
        }
    }

    pub fn env(&self) -> ExecResult {
        ExecResult::success(self.env.iter().map(|(k, v)| format!("{k}={v}")))
    }

    /// `export KEY=value`. Everything after the first `=` is the value.
    pub fn export(&mut self, argument: &str) -> ExecResult {
        let Some((raw_key, raw_value)) = argument.split_once('=') else {
            return ExecResult::failure("Usage: export KEY=value");
        };
        let key = raw_key.trim();
        let value = raw_value.trim();
        if key.is_empty() || value.is_empty() {
            return ExecResult::failure("Both key and value are required.");
        }
        let verb = match self.env.insert(key.to_string(), value.to_string()) {
            Some(_) => "updated",
            None => "added",
        };
        ExecResult::line(format!("Export {verb}: {key}={value}"))
    }

    pub fn ps(&self) -> ExecResult {
        let header = "PID   STATUS    NAME".to_string();
        let rows = self
            .processes
            .iter()
            .map(|p| format!("{:<5} {:<9} {}", p.pid, p.status.to_string(), p.name));
        ExecResult::success(std::iter::once(header).chain(rows))
    }

    pub fn kill(&mut self, pid_arg: Option<&str>) -> ExecResult {
        let Some(pid_arg) = pid_arg else {
            return ExecResult::failure("Usage: kill <pid>");
        };
        let Ok(pid) = pid_arg.parse::<i64>() else {
            return ExecResult::failure("PID must be a number.");
        };
        let Some(index) = self.processes.iter().position(|p| p.pid == pid) else {
            return ExecResult::failure(format!("Process {pid} not found."));
        };
        let process = self.processes.remove(index);
        ExecResult::line(format!(
            "Process {} ({}) terminated safely.",
            process.name, pid
        ))
    }

    /// `ping [-c N] [host]`.
    pub fn ping(&self, args: &[String]) -> ExecResult {
        let mut args = args.to_vec();
        let mut count = DEFAULT_PING_COUNT;
        if let Some(idx) = args.iter().position(|a| a == "-c") {
            if let Some(raw) = args.get(idx + 1) {
                count = raw
                    .parse::<u32>()
                    .ok()
                    .filter(|n| *n > 0)
                    .unwrap_or(DEFAULT_PING_COUNT)
                    .min(MAX_PING_COUNT);
                args.drain(idx..idx + 2);
            }
        }
        let host = args.first().map(String::as_str).unwrap_or("localhost");

        let seed = host
            .bytes()
            .fold(17u64, |acc, b| acc.wrapping_mul(31).wrapping_add(u64::from(b)));
        let samples = (1..=count).map(|seq| {
            let jitter = (seed.wrapping_add(u64::from(seq) * 7919)) % 1000;
            let time = 10.0 + jitter as f64 / 100.0;
            format!("64 bytes from {host}: icmp_seq={seq} time={time:.2} ms")
        });

        let mut lines = vec!["PING simulation".to_string()];
        lines.extend(samples);
        lines.push(format!(
            "{count} packets transmitted, {count} received, 0% packet loss"
        ));
        ExecResult::success(lines)
    }

    /// `curl [-I] [url]`.
    pub fn curl(&self, args: &[String]) -> ExecResult {
        let show_headers = args.iter().any(|a| a == "-I");
        let url = args
            .iter()
            .find(|a| a.starts_with("http"))
            .map(String::as_str)
            .unwrap_or(DEFAULT_CURL_URL);
        if show_headers {
            ExecResult::success([
                "HTTP/1.1 200 OK".to_string(),
                "Content-Type: text/html; charset=utf-8".to_string(),
                "X-ShellQuest: simulated".to_string(),
                format!("Request-URL: {url}"),
            ])
        } else {
            ExecResult::success([
                format!("Simulated response from {url}"),
                r#"{ "status": "ok", "message": "hello from ShellQuest" }"#.to_string(),
            ])
        }
    }

    /// `apt install <pkg>` / `pacman -S <pkg>` (either verb works for both).
    pub fn package(&mut self, manager: PackageManager, args: &[String]) -> ExecResult {
        let action = args.first().map(String::as_str);
        let Some(pkg) = args.get(1).filter(|_| matches!(action, Some("install" | "-S"))) else {
            return ExecResult::failure(format!("Usage: {manager} install <pkg>"));
        };
        let verb = if self.packages.contains(pkg) {
            "reinstalled"
        } else {
            self.packages.push(pkg.clone());
            "installed"
        };
        ExecResult::success([
            format!("{manager} {verb} {pkg}"),
            format!("Packages: {}", self.packages.join(", ")),
        ])
    }
}
