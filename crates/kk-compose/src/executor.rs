//! Engine driver: shells out to `docker compose` / `docker-compose`.

use crate::error::{ComposeError, Result};
use kk_types::Ctx;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tokio::sync::OnceCell;
use tracing::debug;

/// Default deadline for compose operations.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5 * 60);

/// Which engine invocation shape the host supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineFlavor {
    /// `docker compose -f <file> …` (v2 plugin)
    Plugin,
    /// `docker-compose -f <file> …` (standalone v1)
    Legacy,
}

/// Compose driver bound to one project directory.
///
/// The engine flavor is resolved on first use and memoized for the life of
/// the driver. Every operation takes the caller's cancellation scope; a
/// cancelled scope kills the child process.
pub struct Executor {
    work_dir: PathBuf,
    compose_file: PathBuf,
    flavor: OnceCell<EngineFlavor>,
}

impl Executor {
    pub fn new(work_dir: impl Into<PathBuf>) -> Self {
        let work_dir = work_dir.into();
        let compose_file = work_dir.join("docker-compose.yml");
        Self {
            work_dir,
            compose_file,
            flavor: OnceCell::new(),
        }
    }

    /// Driver with a preset flavor. Used by tests; production code lets the
    /// probe decide.
    pub fn with_flavor(work_dir: impl Into<PathBuf>, flavor: EngineFlavor) -> Self {
        let executor = Self::new(work_dir);
        let _ = executor.flavor.set(flavor);
        executor
    }

    pub fn compose_file(&self) -> &Path {
        &self.compose_file
    }

    /// `up -d`: stdout streams to the terminal, stderr is additionally
    /// captured so a failure carries the engine's own error text.
    pub async fn up(&self, ctx: &Ctx) -> Result<()> {
        self.run_streamed(ctx, &["up", "-d"]).await
    }

    pub async fn down(&self, ctx: &Ctx) -> Result<()> {
        self.run_streamed(ctx, &["down"]).await
    }

    /// `down -v`. Destructive: callers gate this behind a confirmation.
    pub async fn down_with_volumes(&self, ctx: &Ctx) -> Result<()> {
        self.run_streamed(ctx, &["down", "-v"]).await
    }

    pub async fn restart(&self, ctx: &Ctx) -> Result<()> {
        self.run_streamed(ctx, &["restart"]).await
    }

    pub async fn force_recreate(&self, ctx: &Ctx) -> Result<()> {
        self.run_streamed(ctx, &["up", "-d", "--force-recreate"]).await
    }

    /// `pull`, with stdout buffered for the image-diff parser.
    pub async fn pull(&self, ctx: &Ctx) -> Result<String> {
        self.run_with_output(ctx, &["pull"]).await
    }

    /// `ps --format json`: one JSON object per output line.
    pub async fn ps(&self, ctx: &Ctx) -> Result<String> {
        self.run_with_output(ctx, &["ps", "--format", "json"]).await
    }

    async fn flavor(&self) -> EngineFlavor {
        *self
            .flavor
            .get_or_init(|| async {
                let probe = Command::new("docker")
                    .args(["compose", "version"])
                    .stdout(Stdio::null())
                    .stderr(Stdio::null())
                    .status()
                    .await;
                match probe {
                    Ok(status) if status.success() => EngineFlavor::Plugin,
                    _ => EngineFlavor::Legacy,
                }
            })
            .await
    }

    async fn build_command(&self, args: &[&str]) -> Command {
        let (program, argv) = invocation(self.flavor().await, &self.compose_file, args);
        debug!(program, ?argv, "compose invocation");
        let mut cmd = Command::new(program);
        cmd.args(argv);
        cmd.current_dir(&self.work_dir);
        cmd.kill_on_drop(true);
        cmd
    }

    async fn run_streamed(&self, ctx: &Ctx, args: &[&str]) -> Result<()> {
        let mut cmd = self.build_command(args).await;
        cmd.stdout(Stdio::inherit());
        cmd.stderr(Stdio::piped());

        let mut child = cmd.spawn()?;
        let stderr = child.stderr.take().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::Other, "child stderr not captured")
        })?;

        let mut captured = String::new();
        let status = tokio::select! {
            status = async {
                // Tee stderr: the operator sees it live, the error keeps it.
                let mut lines = BufReader::new(stderr).lines();
                while let Some(line) = lines.next_line().await? {
                    eprintln!("{}", line);
                    captured.push_str(&line);
                    captured.push('\n');
                }
                child.wait().await
            } => status?,
            _ = ctx.cancelled() => {
                let _ = child.start_kill();
                let _ = child.wait().await;
                return Err(ComposeError::Cancelled);
            }
        };

        if !status.success() {
            let stderr_text = if captured.trim().is_empty() {
                status.to_string()
            } else {
                captured.trim_end().to_string()
            };
            return Err(ComposeError::command_failed(args.join(" "), stderr_text));
        }
        Ok(())
    }

    async fn run_with_output(&self, ctx: &Ctx, args: &[&str]) -> Result<String> {
        let mut cmd = self.build_command(args).await;
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        let child = cmd.spawn()?;
        let output = tokio::select! {
            output = child.wait_with_output() => output?,
            // Dropping the in-flight future drops the child; kill_on_drop
            // reaps it.
            _ = ctx.cancelled() => return Err(ComposeError::Cancelled),
        };

        if !output.status.success() {
            let stderr_text = String::from_utf8_lossy(&output.stderr);
            return Err(ComposeError::command_failed(
                args.join(" "),
                format!("{}: {}", output.status, stderr_text.trim_end()),
            ));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Fixed argument shape for one operation: program name plus argv.
fn invocation(flavor: EngineFlavor, compose_file: &Path, args: &[&str]) -> (&'static str, Vec<String>) {
    let file = compose_file.to_string_lossy().into_owned();
    match flavor {
        EngineFlavor::Plugin => {
            let mut argv = vec!["compose".to_string(), "-f".to_string(), file];
            argv.extend(args.iter().map(|a| a.to_string()));
            ("docker", argv)
        }
        EngineFlavor::Legacy => {
            let mut argv = vec!["-f".to_string(), file];
            argv.extend(args.iter().map(|a| a.to_string()));
            ("docker-compose", argv)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plugin_invocation_shape() {
        let (program, argv) = invocation(
            EngineFlavor::Plugin,
            Path::new("/srv/app/docker-compose.yml"),
            &["up", "-d"],
        );
        assert_eq!(program, "docker");
        assert_eq!(
            argv,
            vec!["compose", "-f", "/srv/app/docker-compose.yml", "up", "-d"]
        );
    }

    #[test]
    fn test_legacy_invocation_has_no_compose_subcommand() {
        let (program, argv) = invocation(
            EngineFlavor::Legacy,
            Path::new("/srv/app/docker-compose.yml"),
            &["down", "-v"],
        );
        assert_eq!(program, "docker-compose");
        assert_eq!(argv, vec!["-f", "/srv/app/docker-compose.yml", "down", "-v"]);
        assert!(!argv.iter().any(|a| a == "compose"));
    }

    #[test]
    fn test_ps_invocation_requests_json() {
        let (_, argv) = invocation(
            EngineFlavor::Plugin,
            Path::new("/srv/app/docker-compose.yml"),
            &["ps", "--format", "json"],
        );
        assert_eq!(argv[3..], ["ps", "--format", "json"]);
    }

    #[tokio::test]
    async fn test_preset_flavor_is_memoized() {
        let executor = Executor::with_flavor("/tmp", EngineFlavor::Legacy);
        assert_eq!(executor.flavor().await, EngineFlavor::Legacy);
    }

    #[tokio::test]
    async fn test_cancelled_scope_aborts_streamed_run() {
        let ctx = Ctx::new();
        ctx.cancel();
        // `sleep`-like child never runs: the select observes the cancelled
        // scope first and kills the spawn.
        let executor = Executor::with_flavor("/tmp", EngineFlavor::Legacy);
        let err = executor.down(&ctx).await.unwrap_err();
        assert!(matches!(err, ComposeError::Cancelled | ComposeError::Io(_)));
    }
}
