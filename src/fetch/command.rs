use std::io::Read;
use std::process::Stdio;
use std::time::Duration;

use log::{debug, trace, warn};
use tokio::process::Command as TokioCommand;
use tokio::sync::mpsc;
use tokio::time::{Instant, timeout_at};

use super::error::{FetchError, FetchResult};

/// Hard limit on how long a command may run
pub const COMMAND_TIMEOUT: Duration = Duration::from_secs(30);

/// Shell command wrapper for payload retrieval
#[derive(Debug, Clone)]
pub struct ShellCommand {
    /// Shell used to interpret the command line
    shell: String,

    /// Command line handed to the shell
    command: String,

    /// Maximum time to wait for the command to exit
    timeout: Duration,
}

impl ShellCommand {
    /// Create a new command run through `sh -c`
    pub fn new<S: Into<String>>(command: S) -> Self {
        Self {
            shell: "sh".to_string(),
            command: command.into(),
            timeout: COMMAND_TIMEOUT,
        }
    }

    /// Set the timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Run the command to completion and return its combined output
    ///
    /// Stdout and stderr share one pipe, so the output keeps the order in
    /// which the command wrote it.
    pub async fn run(&self) -> FetchResult<String> {
        debug!("Spawning command: {} -c {:?}", self.shell, self.command);

        let (reader, writer) = std::io::pipe().map_err(FetchError::Spawn)?;
        let stderr_writer = writer.try_clone().map_err(FetchError::Spawn)?;

        let mut cmd = TokioCommand::new(&self.shell);
        cmd.arg("-c")
            .arg(&self.command)
            .stdin(Stdio::null())
            .stdout(writer)
            .stderr(stderr_writer)
            .kill_on_drop(true);
        let mut child = cmd.spawn().map_err(FetchError::Spawn)?;
        // Release our copies of the write end so EOF follows the child's exit
        drop(cmd);

        let mut rx = spawn_pipe_reader(reader);
        let deadline_at = Instant::now() + self.timeout;
        let deadline = tokio::time::sleep_until(deadline_at);
        tokio::pin!(deadline);

        let mut output = Vec::new();
        loop {
            tokio::select! {
                chunk = rx.recv() => match chunk {
                    Some(Ok(bytes)) => output.extend_from_slice(&bytes),
                    Some(Err(e)) => return Err(FetchError::ReadError(e)),
                    None => break,
                },
                _ = &mut deadline => return Err(self.timed_out(&mut child, &output)),
            }
        }

        let status = match timeout_at(deadline_at, child.wait()).await {
            Ok(status) => status.map_err(FetchError::Spawn)?,
            Err(_) => return Err(self.timed_out(&mut child, &output)),
        };

        let output = String::from_utf8_lossy(&output).into_owned();
        trace!("[{}] output: {}", self.command, output);

        if !status.success() {
            return Err(FetchError::NonZeroExit { status, output });
        }

        Ok(output)
    }

    fn timed_out(&self, child: &mut tokio::process::Child, output: &[u8]) -> FetchError {
        if let Err(e) = child.start_kill() {
            warn!("Failed to kill timed out command {:?}: {}", self.command, e);
        }
        FetchError::Timeout {
            after: self.timeout,
            output: String::from_utf8_lossy(output).into_owned(),
        }
    }
}

/// Forward everything written to the pipe until every writer has closed it
fn spawn_pipe_reader(mut reader: std::io::PipeReader) -> mpsc::Receiver<std::io::Result<Vec<u8>>> {
    let (tx, rx) = mpsc::channel(16);

    tokio::task::spawn_blocking(move || {
        let mut buf = [0u8; 4096];
        loop {
            let chunk = match reader.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => Ok(buf[..n].to_vec()),
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => Err(e),
            };
            let failed = chunk.is_err();
            // The receiver is gone once the command timed out
            if tx.blocking_send(chunk).is_err() || failed {
                break;
            }
        }
    });

    rx
}
