//! Subprocess spawning with `tokio::process`

use std::fs::OpenOptions;
use std::path::Path;
use std::process::{ExitStatus, Stdio};
use std::sync::Arc;
use std::time::Duration;

use application::error::ApplicationError;
use application::ports::{ProcessLauncherPort, ProcessTablePort};
use async_trait::async_trait;
use domain::{CommandSpec, ProcessId, ProcessRecord};
use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::process::Command;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

/// Exit code used when the engine's status carries neither code nor signal
const UNKNOWN_EXIT_CODE: i32 = 1;

const TEE_BUFFER_SIZE: usize = 8 * 1024;

/// How long engine output is still copied after the engine has exited
const DEFAULT_DRAIN_TIMEOUT: Duration = Duration::from_secs(2);

/// Launcher for detached and foreground subprocesses
#[derive(Clone)]
pub struct TokioProcessLauncher {
    identity: Option<Arc<dyn ProcessTablePort>>,
    drain_timeout: Duration,
}

impl Default for TokioProcessLauncher {
    fn default() -> Self {
        Self {
            identity: None,
            drain_timeout: DEFAULT_DRAIN_TIMEOUT,
        }
    }
}

impl std::fmt::Debug for TokioProcessLauncher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokioProcessLauncher")
            .field("records_start_time", &self.identity.is_some())
            .field("drain_timeout", &self.drain_timeout)
            .finish()
    }
}

impl TokioProcessLauncher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bound on copying output left in the pipes once the engine is gone
    ///
    /// Children of the engine can keep its stdout/stderr open indefinitely.
    #[must_use]
    pub const fn with_drain_timeout(mut self, drain_timeout: Duration) -> Self {
        self.drain_timeout = drain_timeout;
        self
    }

    /// Look up start times of spawned processes so records carry identity
    #[must_use]
    pub fn with_identity(mut self, table: Arc<dyn ProcessTablePort>) -> Self {
        self.identity = Some(table);
        self
    }
}

fn command_for(spec: &CommandSpec) -> Command {
    let mut command = Command::new(&spec.program);
    command.args(&spec.args);
    command.envs(spec.env.iter().map(|(k, v)| (k.as_str(), v.as_str())));
    if let Some(dir) = &spec.current_dir {
        command.current_dir(dir);
    }
    command
}

fn open_log(path: &Path) -> Result<std::fs::File, ApplicationError> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| ApplicationError::io(path.display(), &e))
}

fn spawn_error(spec: &CommandSpec, err: &std::io::Error) -> ApplicationError {
    if err.kind() == std::io::ErrorKind::NotFound {
        ApplicationError::SetupFailed(format!("executable not found: {}", spec.program.display()))
    } else {
        ApplicationError::Process(format!("failed to start {}: {err}", spec.program.display()))
    }
}

/// Exit code of a finished process; death by signal `n` maps to `128 + n`
pub fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }
    UNKNOWN_EXIT_CODE
}

/// Copy `source` to both `terminal` and the shared log until EOF
fn tee<R, W>(mut source: R, mut terminal: W, log: Arc<Mutex<File>>) -> JoinHandle<()>
where
    R: AsyncRead + Unpin + Send + 'static,
    W: AsyncWrite + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        use tokio::io::AsyncReadExt;

        let mut buffer = vec![0u8; TEE_BUFFER_SIZE];
        loop {
            let read = match source.read(&mut buffer).await {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) => {
                    warn!(error = %e, "Reading engine output failed");
                    break;
                },
            };
            let chunk = &buffer[..read];

            if let Err(e) = terminal.write_all(chunk).await {
                debug!(error = %e, "Terminal write failed");
            }
            let _ = terminal.flush().await;

            let mut log = log.lock().await;
            if let Err(e) = log.write_all(chunk).await {
                warn!(error = %e, "Log write failed");
            }
        }
        let _ = log.lock().await.flush().await;
    })
}

#[async_trait]
impl ProcessLauncherPort for TokioProcessLauncher {
    #[instrument(skip(self, command), fields(program = %command.program.display()))]
    async fn spawn_detached(
        &self,
        command: &CommandSpec,
        log_file: &Path,
    ) -> Result<ProcessRecord, ApplicationError> {
        let stdout = open_log(log_file)?;
        let stderr = stdout
            .try_clone()
            .map_err(|e| ApplicationError::io(log_file.display(), &e))?;

        let mut cmd = command_for(command);
        cmd.stdin(Stdio::null())
            .stdout(Stdio::from(stdout))
            .stderr(Stdio::from(stderr))
            .kill_on_drop(false);
        #[cfg(unix)]
        cmd.process_group(0);

        let child = cmd.spawn().map_err(|e| spawn_error(command, &e))?;
        let pid = child
            .id()
            .map(ProcessId::new)
            .ok_or_else(|| ApplicationError::Process("spawned process has no id".to_string()))?;
        // Dropping the handle leaves the process running; tokio reaps it if
        // it exits while we are still alive
        drop(child);

        let mut record = ProcessRecord::new(pid);
        if let Some(table) = &self.identity
            && let Some(info) = table.inspect(pid).await
        {
            record = record.with_start_time(info.start_time);
        }

        info!(pid = %pid, command = %command, "Detached process started");
        Ok(record)
    }

    #[instrument(skip(self, command), fields(program = %command.program.display()))]
    async fn run_foreground(
        &self,
        command: &CommandSpec,
        log_file: &Path,
    ) -> Result<i32, ApplicationError> {
        let mut log = File::from_std(open_log(log_file)?);
        let header = format!(
            "=== {} started {} ===\n",
            command,
            chrono::Utc::now().to_rfc3339()
        );
        log.write_all(header.as_bytes())
            .await
            .map_err(|e| ApplicationError::io(log_file.display(), &e))?;
        let log = Arc::new(Mutex::new(log));

        let mut cmd = command_for(command);
        cmd.stdin(Stdio::inherit())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let mut child = cmd.spawn().map_err(|e| spawn_error(command, &e))?;
        info!(pid = ?child.id(), "Engine running in foreground");

        let mut tees = Vec::with_capacity(2);
        if let Some(stdout) = child.stdout.take() {
            tees.push(tee(stdout, tokio::io::stdout(), Arc::clone(&log)));
        }
        if let Some(stderr) = child.stderr.take() {
            tees.push(tee(stderr, tokio::io::stderr(), Arc::clone(&log)));
        }

        // The engine shares our process group and sees the interrupt too; keep
        // waiting so its last output reaches the log
        let status = loop {
            tokio::select! {
                status = child.wait() => {
                    break status.map_err(|e| ApplicationError::Process(e.to_string()))?;
                },
                result = tokio::signal::ctrl_c() => {
                    if let Err(e) = result {
                        warn!(error = %e, "Interrupt handler unavailable");
                        break child
                            .wait()
                            .await
                            .map_err(|e| ApplicationError::Process(e.to_string()))?;
                    }
                    warn!("Interrupt received, waiting for the engine to exit");
                },
            }
        };

        let deadline = tokio::time::Instant::now() + self.drain_timeout;
        for mut handle in tees {
            match tokio::time::timeout_at(deadline, &mut handle).await {
                Ok(Ok(())) => {},
                Ok(Err(e)) => warn!(error = %e, "Output copy task failed"),
                Err(_) => {
                    warn!("Engine output still open after exit, detaching from it");
                    handle.abort();
                },
            }
        }

        let code = exit_code(status);
        info!(code, "Engine exited");
        Ok(code)
    }
}
