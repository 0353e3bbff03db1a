//! Outbound channel to the host application.

use crate::error::{RefreshError, Result};
use crate::protocol::OutboundMessage;
use std::io::Write;

/// Receiver of component messages.
pub trait Host {
    fn send(&mut self, message: &OutboundMessage) -> Result<()>;
}

/// Host reached through a byte stream, one JSON message per line.
#[derive(Debug)]
pub struct StdioHost<W: Write> {
    out: W,
}

impl<W: Write> StdioHost<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Host for StdioHost<W> {
    fn send(&mut self, message: &OutboundMessage) -> Result<()> {
        let line = message.to_ndjson_line().map_err(|e| {
            RefreshError::HostError(format!("failed to serialize host message: {}", e))
        })?;

        writeln!(self.out, "{}", line)
            .and_then(|()| self.out.flush())
            .map_err(|e| RefreshError::HostError(format!("failed to write to host: {}", e)))
    }
}

/// Collects messages in memory.
#[cfg(test)]
impl Host for Vec<OutboundMessage> {
    fn send(&mut self, message: &OutboundMessage) -> Result<()> {
        self.push(message.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stdio_host_writes_one_line_per_message() {
        let mut host = StdioHost::new(Vec::new());

        host.send(&OutboundMessage::ready()).unwrap();
        host.send(&OutboundMessage::update(1)).unwrap();

        let output = String::from_utf8(host.into_inner()).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("streamlit:componentReady"));
        assert!(lines[1].contains("\"count\":1"));
    }

    #[test]
    fn test_stdio_host_reports_write_failure() {
        struct Broken;
        impl Write for Broken {
            fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
                Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed"))
            }
            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        let mut host = StdioHost::new(Broken);
        let err = host.send(&OutboundMessage::zero_height()).unwrap_err();

        assert!(matches!(err, RefreshError::HostError(_)));
    }
}
