//! Background pump for a PTY program's output.

use std::io::{self, Read, Write};
use std::sync::mpsc::{Receiver, TryRecvError, channel};
use std::thread;
use tracing::debug;

/// Collects what the program writes on a reader thread, for the sink to
/// echo between primitives.
pub(super) struct OutputPump {
    rx: Receiver<Vec<u8>>,
    eof: bool,
}

impl OutputPump {
    pub(super) fn start<R: Read + Send + 'static>(mut reader: R) -> Self {
        let (tx, rx) = channel();
        thread::spawn(move || {
            let mut buffer = [0u8; 4096];
            while let Ok(n) = reader.read(&mut buffer) {
                if n == 0 || tx.send(buffer[..n].to_vec()).is_err() {
                    break;
                }
            }
        });
        Self { rx, eof: false }
    }

    /// Write every chunk received so far to `out`. Returns the byte count.
    pub(super) fn drain_into(&mut self, out: &mut impl Write) -> io::Result<usize> {
        let mut written = 0;
        loop {
            match self.rx.try_recv() {
                Ok(chunk) => {
                    out.write_all(&chunk)?;
                    written += chunk.len();
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    if !self.eof {
                        debug!("program output closed");
                        self.eof = true;
                    }
                    break;
                }
            }
        }
        out.flush()?;
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::time::Duration;

    #[test]
    fn test_drains_everything_read() {
        let mut pump = OutputPump::start(Cursor::new(b"$ echo hi\r\nhi\r\n".to_vec()));
        let mut out = Vec::new();
        // The reader thread stops at EOF; wait for it to hand everything over.
        for _ in 0..100 {
            pump.drain_into(&mut out).unwrap();
            if pump.eof {
                break;
            }
            std::thread::sleep(Duration::from_millis(5));
        }
        assert!(pump.eof);
        assert_eq!(out, b"$ echo hi\r\nhi\r\n");
    }
}
