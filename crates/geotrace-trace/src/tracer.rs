//! Runs the system tracer and streams hops as they appear.

use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::process::Command;

use crate::error::TraceError;
use crate::parser::HopParser;

pub const DEFAULT_TRACE_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceTool {
    /// `traceroute -n -q 1 -w 1`; one probe per hop, so it is the faster choice.
    Traceroute,
    Tracepath,
}

impl TraceTool {
    #[must_use]
    pub fn executable_name(self) -> &'static str {
        match self {
            TraceTool::Traceroute => "traceroute",
            TraceTool::Tracepath => "tracepath",
        }
    }

    #[must_use]
    pub fn args(self, address: &str) -> Vec<String> {
        let flags: &[&str] = match self {
            TraceTool::Traceroute => &["-n", "-q", "1", "-w", "1"],
            TraceTool::Tracepath => &["-n"],
        };
        flags
            .iter()
            .map(|f| (*f).to_string())
            .chain(std::iter::once(address.to_string()))
            .collect()
    }
}

#[derive(Debug, Clone)]
pub struct PathTracer {
    tool: TraceTool,
    program: PathBuf,
    timeout: Duration,
}

impl PathTracer {
    /// Picks `traceroute` if installed, otherwise `tracepath`.
    ///
    /// # Errors
    ///
    /// Returns [`TraceError::NoTracerAvailable`] when neither is on `PATH`.
    pub fn detect() -> Result<Self, TraceError> {
        [TraceTool::Traceroute, TraceTool::Tracepath]
            .into_iter()
            .find_map(|tool| find_on_path(tool.executable_name()).map(|p| Self::new(tool, p)))
            .ok_or(TraceError::NoTracerAvailable)
    }

    #[must_use]
    pub fn new(tool: TraceTool, program: impl Into<PathBuf>) -> Self {
        Self {
            tool,
            program: program.into(),
            timeout: DEFAULT_TRACE_TIMEOUT,
        }
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn tool(&self) -> TraceTool {
        self.tool
    }

    #[must_use]
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Traces the route to `address`, calling `on_hop` for each new hop.
    ///
    /// The resolved destination is appended if the tracer did not report it
    /// as the last hop. The tracer is killed if it outlives the timeout.
    ///
    /// # Errors
    ///
    /// Returns [`TraceError`] if the tool cannot be started, exits with a
    /// failure status, or times out.
    pub async fn trace(
        &self,
        address: &str,
        mut on_hop: impl FnMut(IpAddr) + Send,
    ) -> Result<Vec<IpAddr>, TraceError> {
        let program = self.program.display().to_string();
        tracing::info!(%program, address, "tracing path");

        let mut child = Command::new(&self.program)
            .args(self.tool.args(address))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| TraceError::Spawn {
                program: program.clone(),
                source,
            })?;

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        let run = async {
            let stderr_task = tokio::spawn(async move {
                let mut text = String::new();
                if let Some(mut stderr) = stderr {
                    let _ = stderr.read_to_string(&mut text).await;
                }
                text
            });

            let mut parser = HopParser::new();
            if let Some(stdout) = stdout {
                let mut lines = BufReader::new(stdout).lines();
                while let Some(line) = lines.next_line().await? {
                    if let Some(hop) = parser.accept_line(&line) {
                        tracing::debug!(%hop, "hop");
                        on_hop(hop);
                    }
                }
            }

            let status = child.wait().await?;
            let stderr_text = stderr_task.await.unwrap_or_default();
            Ok::<_, TraceError>((parser, status, stderr_text))
        };

        let (parser, status, stderr) = tokio::time::timeout(self.timeout, run)
            .await
            .map_err(|_| TraceError::TimedOut {
                program: program.clone(),
                timeout_secs: self.timeout.as_secs(),
            })??;

        if !status.success() {
            return Err(TraceError::Failed {
                program,
                status: status.to_string(),
                stderr: stderr.trim().to_string(),
            });
        }

        let destination = resolve(address).await;
        if destination.is_none() {
            tracing::warn!(address, "could not resolve destination");
        }
        Ok(parser.finish(destination))
    }
}

/// Resolves a host name or literal address, preferring IPv4.
async fn resolve(address: &str) -> Option<IpAddr> {
    if let Ok(ip) = address.parse::<IpAddr>() {
        return Some(ip);
    }
    let resolved: Vec<IpAddr> = tokio::net::lookup_host((address, 0))
        .await
        .ok()?
        .map(|sa| sa.ip())
        .collect();
    resolved
        .iter()
        .copied()
        .find(IpAddr::is_ipv4)
        .or_else(|| resolved.first().copied())
}

fn find_on_path(name: &str) -> Option<PathBuf> {
    let path = std::env::var_os("PATH")?;
    std::env::split_paths(&path)
        .map(|dir| dir.join(name))
        .find(|candidate| candidate.is_file())
}
