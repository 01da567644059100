//! LineSource - newline-delimited records from a byte stream

use std::time::Duration;

use bytes::Bytes;
use contracts::{ContractError, MessageSource, SourceEvent};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Stdin};
use tracing::debug;

/// Line source reading standard input
pub type StdinSource = LineSource<BufReader<Stdin>>;

/// Source yielding one record per line
///
/// Line terminators (`\n`, `\r\n`) are stripped and empty lines skipped.
/// A partial line survives a poll timeout and is completed by the next
/// poll. End of stream reports `Closed`; a read error is fatal.
pub struct LineSource<R> {
    name: String,
    reader: R,
    buf: Vec<u8>,
}

impl<R> LineSource<R>
where
    R: AsyncBufRead + Unpin + Send,
{
    /// Wrap a buffered reader
    pub fn new(name: impl Into<String>, reader: R) -> Self {
        Self {
            name: name.into(),
            reader,
            buf: Vec::new(),
        }
    }

    fn take_line(&mut self) -> Bytes {
        let mut line = std::mem::take(&mut self.buf);
        if line.last() == Some(&b'\n') {
            line.pop();
            if line.last() == Some(&b'\r') {
                line.pop();
            }
        }
        Bytes::from(line)
    }
}

impl LineSource<BufReader<Stdin>> {
    /// Read records from standard input
    pub fn stdin() -> Self {
        Self::new("stdin", BufReader::new(tokio::io::stdin()))
    }
}

impl<R> MessageSource for LineSource<R>
where
    R: AsyncBufRead + Unpin + Send,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn poll(&mut self, timeout: Duration) -> SourceEvent {
        loop {
            let read =
                tokio::time::timeout(timeout, self.reader.read_until(b'\n', &mut self.buf)).await;

            match read {
                Err(_) => return SourceEvent::Idle,
                Ok(Err(e)) => return SourceEvent::fatal(format!("read error: {e}")),
                Ok(Ok(0)) if self.buf.is_empty() => return SourceEvent::Closed,
                Ok(Ok(_)) => {
                    let line = self.take_line();
                    if !line.is_empty() {
                        return SourceEvent::Record(line);
                    }
                }
            }
        }
    }

    async fn close(&mut self) -> Result<(), ContractError> {
        debug!(source = %self.name, "LineSource closed");
        Ok(())
    }
}
