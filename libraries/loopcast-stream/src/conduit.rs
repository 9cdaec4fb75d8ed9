//! One external encoder process and its two pipes
//!
//! Raw track bytes go into the encoder's stdin from a dedicated feeder task
//! while the session pulls encoded bytes from its stdout. The two sides only
//! meet through the OS pipes and the liveness flag, so a full output pipe can
//! never stall the input side or the reverse.
//!
//! ```text
//! [track file] --feeder task--> stdin [encoder] stdout --read()--> [session]
//! ```

use crate::encoder::EncoderCommand;
use crate::error::{Result, StreamError};
use bytes::{Bytes, BytesMut};
use loopcast_core::AudioFormat;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStderr, ChildStdin, ChildStdout};
use tokio::task::JoinHandle;
use tokio::time::timeout;

/// Default time an encoder gets to exit after its pipes are closed
pub const DEFAULT_GRACE: Duration = Duration::from_secs(2);

/// Write half of the encoder
pub struct EncoderInput {
    stdin: ChildStdin,
}

impl EncoderInput {
    /// Append raw bytes to the encoder's input
    ///
    /// A dead encoder surfaces as a broken pipe error here rather than a hang.
    pub async fn feed(&mut self, bytes: &[u8]) -> Result<()> {
        self.stdin
            .write_all(bytes)
            .await
            .map_err(|e| StreamError::conduit(format!("encoder input closed: {}", e)))
    }

    /// Flush and close the encoder's stdin so it drains and exits
    pub async fn finish(mut self) -> Result<()> {
        self.stdin
            .flush()
            .await
            .map_err(|e| StreamError::conduit(format!("encoder input closed: {}", e)))
    }
}

/// A running encoder process owned by exactly one session
pub struct TranscodeConduit {
    child: Child,
    program: String,
    input: Option<EncoderInput>,
    output: Option<ChildStdout>,
    feeder: Option<JoinHandle<Result<u64>>>,
    alive: Arc<AtomicBool>,
    grace: Duration,
    stall: Option<Duration>,
    closed: bool,
}

impl TranscodeConduit {
    /// Start the encoder
    ///
    /// Fails with `EncoderUnavailable` when the program cannot be spawned.
    pub fn open(
        encoder: &EncoderCommand,
        input: AudioFormat,
        output: AudioFormat,
        bitrate_kbps: u32,
        grace: Duration,
    ) -> Result<Self> {
        let program = encoder.program_name();
        let mut child = encoder
            .command(input, output, bitrate_kbps)
            .spawn()
            .map_err(|e| StreamError::encoder_unavailable(program.clone(), Some(e)))?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| StreamError::conduit("encoder stdin was not captured"))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| StreamError::conduit("encoder stdout was not captured"))?;
        if let Some(stderr) = child.stderr.take() {
            tokio::spawn(forward_stderr(stderr, child.id()));
        }

        tracing::debug!(
            pid = ?child.id(),
            "Started encoder {} ({} -> {} @ {}kbps)",
            program,
            input,
            output,
            bitrate_kbps
        );

        Ok(Self {
            child,
            program,
            input: Some(EncoderInput { stdin }),
            output: Some(stdout),
            feeder: None,
            alive: Arc::new(AtomicBool::new(true)),
            grace,
            stall: None,
            closed: false,
        })
    }

    /// Fail reads that see no encoder output for `limit`
    #[must_use]
    pub fn with_stall_timeout(mut self, limit: Duration) -> Self {
        self.stall = Some(limit);
        self
    }

    /// OS process id, while the process is running
    pub fn id(&self) -> Option<u32> {
        self.child.id()
    }

    /// False once the input side failed or the conduit was closed
    pub fn is_alive(&self) -> bool {
        !self.closed && self.alive.load(Ordering::Acquire)
    }

    /// Feed bytes directly, before any feeder task owns the input
    pub async fn feed(&mut self, bytes: &[u8]) -> Result<()> {
        let input = self
            .input
            .as_mut()
            .ok_or_else(|| StreamError::conduit("encoder input is closed or owned by a feeder"))?;

        if let Err(e) = input.feed(bytes).await {
            self.alive.store(false, Ordering::Release);
            return Err(e);
        }
        Ok(())
    }

    /// Close the encoder's stdin
    pub async fn finish_input(&mut self) -> Result<()> {
        match self.input.take() {
            Some(input) => input.finish().await,
            None => Ok(()),
        }
    }

    /// Hand the input side to an independent task that copies `source` into
    /// the encoder in `chunk_size` pieces, then closes stdin
    pub fn spawn_feeder<R>(&mut self, source: R, path: PathBuf, chunk_size: usize) -> Result<()>
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let input = self
            .input
            .take()
            .ok_or_else(|| StreamError::conduit("encoder input is closed or owned by a feeder"))?;
        let alive = Arc::clone(&self.alive);

        self.feeder = Some(tokio::spawn(async move {
            let result = feed_all(input, source, path, chunk_size).await;
            if let Err(ref e) = result {
                tracing::debug!("Encoder feeder stopped: {}", e);
                alive.store(false, Ordering::Release);
            }
            result
        }));
        Ok(())
    }

    /// Next chunk of encoded output, at most `max` bytes
    ///
    /// Waits until the encoder produces something; `None` once it closed its
    /// output. With a stall timeout set, a wait longer than the limit is
    /// `ConduitBroken`.
    pub async fn read(&mut self, max: usize) -> Result<Option<Bytes>> {
        if !self.alive.load(Ordering::Acquire) {
            return Err(self.input_failure().await);
        }

        let output = self
            .output
            .as_mut()
            .ok_or_else(|| StreamError::conduit("encoder output is closed"))?;

        let mut buf = BytesMut::with_capacity(max.max(1));
        let result = match self.stall {
            Some(limit) => match timeout(limit, output.read_buf(&mut buf)).await {
                Ok(result) => result,
                Err(_) => {
                    self.alive.store(false, Ordering::Release);
                    return Err(StreamError::conduit(format!(
                        "{} produced no output for {:?}",
                        self.program, limit
                    )));
                }
            },
            None => output.read_buf(&mut buf).await,
        };

        match result {
            Ok(0) => Ok(None),
            Ok(_) => Ok(Some(buf.freeze())),
            Err(e) => {
                self.alive.store(false, Ordering::Release);
                Err(StreamError::conduit(format!("encoder output failed: {}", e)))
            }
        }
    }

    /// Settle a conduit whose output reached its end
    ///
    /// Joins the feeder and reaps the process, each bounded by the grace
    /// period. A feeder error or an unsuccessful exit status is reported as
    /// `ConduitBroken`.
    pub async fn finish(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.output.take();
        self.input.take();

        let fed = match self.feeder.take() {
            Some(mut handle) => match timeout(self.grace, &mut handle).await {
                Ok(Ok(result)) => result.map(|_| ()),
                Ok(Err(e)) => Err(StreamError::conduit(format!("feeder task failed: {}", e))),
                Err(_) => {
                    handle.abort();
                    Err(StreamError::conduit("encoder stopped reading its input"))
                }
            },
            None => Ok(()),
        };

        let status = match timeout(self.grace, self.child.wait()).await {
            Ok(Ok(status)) => status,
            Ok(Err(e)) => return Err(StreamError::conduit(format!("waiting for encoder: {}", e))),
            Err(_) => {
                self.kill().await;
                return Err(StreamError::conduit("encoder closed its output but kept running"));
            }
        };

        if !status.success() {
            return Err(StreamError::conduit(format!(
                "{} exited with {}",
                self.program, status
            )));
        }
        fed
    }

    /// Terminate the encoder and release both pipes
    ///
    /// The encoder gets SIGTERM (on unix) along with EOF on stdin and a
    /// broken stdout. It is killed if it is still running after the grace
    /// period. Calling this more than once is a no-op.
    pub async fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        self.alive.store(false, Ordering::Release);

        if let Some(feeder) = self.feeder.take() {
            feeder.abort();
        }
        self.terminate();
        self.input.take();
        self.output.take();

        match timeout(self.grace, self.child.wait()).await {
            Ok(Ok(status)) => tracing::debug!("Encoder {} exited with {}", self.program, status),
            Ok(Err(e)) => tracing::warn!("Failed to wait for encoder {}: {}", self.program, e),
            Err(_) => {
                tracing::warn!(
                    "Encoder {} still running after {:?}, killing it",
                    self.program,
                    self.grace
                );
                self.kill().await;
            }
        }
    }

    #[cfg(unix)]
    fn terminate(&self) {
        use nix::sys::signal::{kill, Signal};
        use nix::unistd::Pid;

        let Some(pid) = self.child.id().and_then(|id| i32::try_from(id).ok()) else {
            return;
        };
        if let Err(e) = kill(Pid::from_raw(pid), Signal::SIGTERM) {
            tracing::debug!("Failed to signal encoder {}: {}", self.program, e);
        }
    }

    #[cfg(not(unix))]
    fn terminate(&self) {}

    async fn kill(&mut self) {
        if let Err(e) = self.child.kill().await {
            tracing::warn!("Failed to kill encoder {}: {}", self.program, e);
        }
    }

    /// Why the input side stopped, taken from the feeder task when available
    async fn input_failure(&mut self) -> StreamError {
        if let Some(mut handle) = self.feeder.take() {
            match timeout(self.grace, &mut handle).await {
                Ok(Ok(Err(e))) => return e,
                Ok(Err(e)) => return StreamError::conduit(format!("feeder task failed: {}", e)),
                Ok(Ok(Ok(_))) => {}
                Err(_) => handle.abort(),
            }
        }
        StreamError::conduit("encoder input closed unexpectedly")
    }
}

impl Drop for TranscodeConduit {
    fn drop(&mut self) {
        // The child itself is reaped by kill_on_drop
        if let Some(feeder) = self.feeder.take() {
            feeder.abort();
        }
    }
}

async fn feed_all<R>(
    mut input: EncoderInput,
    mut source: R,
    path: PathBuf,
    chunk_size: usize,
) -> Result<u64>
where
    R: AsyncRead + Unpin,
{
    let mut buf = vec![0u8; chunk_size.max(1)];
    let mut total = 0u64;

    loop {
        let n = source
            .read(&mut buf)
            .await
            .map_err(|source| StreamError::UnreadableTrack {
                path: path.clone(),
                source,
            })?;
        if n == 0 {
            break;
        }
        input.feed(&buf[..n]).await?;
        total += n as u64;
    }

    input.finish().await?;
    Ok(total)
}

async fn forward_stderr(stderr: ChildStderr, pid: Option<u32>) {
    let mut lines = BufReader::new(stderr).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        tracing::debug!(pid = ?pid, "encoder: {}", line);
    }
}
