//! Single-threaded widget runtime.
//!
//! After the handshake, the loop alternates between firing a due timer tick
//! and waiting for the next inbound line, never waiting past the timer's
//! next deadline. Handlers always run to completion before the next one
//! starts. The only other thread is the line reader, which just forwards
//! raw lines over a channel.
//!
//! When the host closes its input the loop keeps ticking until the scheduler
//! goes idle (tick limit reached), then returns.

use crate::error::{RefreshError, Result};
use crate::host::Host;
use crate::protocol::{Inbound, OutboundMessage, decode_line};
use crate::scheduler::{RefreshScheduler, SchedulerState};
use std::io::{self, BufRead};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::Duration;

/// Forward lines from `reader` over a channel until EOF or a read error.
///
/// Lines are decoded lossily: invalid UTF-8 becomes U+FFFD and the line is
/// left for the decoder to reject, so only real I/O errors end the stream.
pub fn spawn_line_reader<R: BufRead + Send + 'static>(
    mut reader: R,
) -> Receiver<io::Result<String>> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let mut buf = Vec::new();
        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf) {
                Ok(0) => break,
                Ok(_) => {
                    let line = String::from_utf8_lossy(&buf)
                        .trim_end_matches(['\n', '\r'])
                        .to_string();
                    if tx.send(Ok(line)).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    let _ = tx.send(Err(e));
                    break;
                }
            }
        }
    });
    rx
}

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub final_count: u64,
    pub lines_handled: u64,
}

/// Event loop binding a scheduler to a host.
pub struct Runtime<H: Host> {
    scheduler: RefreshScheduler,
    host: H,
    lines_handled: u64,
}

impl<H: Host> Runtime<H> {
    pub fn new(scheduler: RefreshScheduler, host: H) -> Self {
        Self {
            scheduler,
            host,
            lines_handled: 0,
        }
    }

    pub fn scheduler(&self) -> &RefreshScheduler {
        &self.scheduler
    }

    #[cfg(test)]
    pub fn host(&self) -> &H {
        &self.host
    }

    /// Announce readiness and a zero-height frame.
    pub fn handshake(&mut self) -> Result<()> {
        self.host.send(&OutboundMessage::ready())?;
        self.host.send(&OutboundMessage::zero_height())
    }

    /// Handle one inbound line.
    ///
    /// Malformed lines and unknown actions are logged and skipped. A lock
    /// write that fails is logged too; only host channel errors propagate.
    pub fn handle_line(&mut self, line: &str) -> Result<()> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(());
        }
        self.lines_handled += 1;

        match decode_line(line) {
            Ok(Inbound::Message(message)) => {
                if let Err(e) = self.scheduler.handle_message(message) {
                    tracing::warn!(event = "runtime.message_failed", error = %e);
                }
            }
            Ok(Inbound::Ignored) => {
                tracing::debug!(event = "runtime.message_ignored");
            }
            Err(e) => {
                tracing::warn!(event = "runtime.malformed_line", error = %e);
            }
        }
        Ok(())
    }

    /// Run until input is closed and the scheduler is idle.
    pub fn run(&mut self, inbound: Receiver<io::Result<String>>) -> Result<RunSummary> {
        self.handshake()?;
        let mut input_open = true;

        loop {
            self.scheduler.run_due(&mut self.host)?;

            let wait = self.scheduler.next_deadline().map(|deadline| {
                let remaining = deadline.saturating_sub(self.scheduler.lock().now_millis());
                Duration::from_millis(u64::try_from(remaining).unwrap_or(0))
            });

            if !input_open {
                match wait {
                    Some(wait) => {
                        thread::sleep(wait);
                        continue;
                    }
                    None => break,
                }
            }

            let received = match wait {
                Some(wait) => inbound.recv_timeout(wait),
                None => inbound.recv().map_err(|_| RecvTimeoutError::Disconnected),
            };

            match received {
                Ok(Ok(line)) => self.handle_line(&line)?,
                Ok(Err(e)) => {
                    return Err(RefreshError::HostError(format!(
                        "failed to read from host: {}",
                        e
                    )));
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => {
                    input_open = false;
                    tracing::info!(
                        event = "runtime.input_closed",
                        running = self.scheduler.state() == SchedulerState::Running,
                    );
                }
            }
        }

        Ok(RunSummary {
            final_count: self.scheduler.count(),
            lines_handled: self.lines_handled,
        })
    }
}
