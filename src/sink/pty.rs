//! [`PtySink`]: rehearse a payload against a program running in a pseudo-terminal.
//!
//! Key presses are turned into the bytes a terminal emulator would send for
//! them, so a payload can be tried against a shell without any USB hardware.
//! Pointer primitives have no terminal equivalent and are ignored.

use super::pty_reader::OutputPump;
use super::{Code, InjectionSink, SinkError};
use crate::keymap::{KeyCode, key_to_char};
use anyhow::{Context, Result};
use async_trait::async_trait;
use portable_pty::{Child, CommandBuilder, MasterPty, PtySize};
use std::io::{self, Write};
use std::time::Duration;
use tracing::debug;

const CTRL_BITS: u8 = 0x01 | 0x10;
const SHIFT_BITS: u8 = 0x02 | 0x20;
const ALT_BITS: u8 = 0x04 | 0x40;
const GUI_BITS: u8 = 0x08 | 0x80;

/// Manages a program running inside a PTY
struct PtySession {
    #[allow(dead_code)]
    master: Box<dyn MasterPty + Send>,
    child: Box<dyn Child + Send + Sync>,
    writer: Box<dyn Write + Send>,
}

impl PtySession {
    fn spawn(command: &str, args: &[String]) -> Result<(Self, Box<dyn io::Read + Send>)> {
        let pty_system = portable_pty::native_pty_system();
        let pair = pty_system
            .openpty(PtySize {
                rows: 24,
                cols: 80,
                pixel_width: 0,
                pixel_height: 0,
            })
            .context("Failed to open PTY")?;

        let mut cmd = CommandBuilder::new(command);
        for arg in args {
            cmd.arg(arg);
        }

        let child = pair
            .slave
            .spawn_command(cmd)
            .context("Failed to spawn command")?;
        let writer = pair
            .master
            .take_writer()
            .context("Failed to get PTY writer")?;
        let reader = pair
            .master
            .try_clone_reader()
            .context("Failed to get PTY reader")?;

        Ok((
            PtySession {
                master: pair.master,
                child,
                writer,
            },
            reader,
        ))
    }

    fn write(&mut self, data: &[u8]) -> io::Result<()> {
        self.writer.write_all(data)?;
        self.writer.flush()
    }

    fn is_running(&mut self) -> bool {
        self.child.try_wait().ok().flatten().is_none()
    }
}

/// Types into a program's terminal instead of a USB host.
pub struct PtySink {
    session: PtySession,
    output: OutputPump,
    modifiers: u8,
}

impl PtySink {
    /// Spawn `command` in a PTY. Its output is echoed to stdout.
    pub fn spawn(command: &str, args: &[String]) -> Result<Self> {
        let (session, reader) = PtySession::spawn(command, args)?;
        Ok(Self {
            session,
            output: OutputPump::start(reader),
            modifiers: 0,
        })
    }

    /// Copy whatever the program has written so far to stdout.
    pub fn flush_output(&mut self) -> io::Result<()> {
        self.output.drain_into(&mut io::stdout().lock())?;
        Ok(())
    }

    fn held(&self, bits: u8) -> bool {
        self.modifiers & bits != 0
    }
}

/// The bytes a terminal sends for `key` with the given modifiers held.
fn key_bytes(key: KeyCode, shift: bool, ctrl: bool, alt: bool) -> Option<Vec<u8>> {
    let base: Vec<u8> = match key {
        KeyCode::ENTER => b"\r".to_vec(),
        KeyCode::TAB => b"\t".to_vec(),
        KeyCode::BACKSPACE => vec![0x7f],
        KeyCode::ESCAPE => vec![0x1b],
        KeyCode::UP_ARROW => b"\x1b[A".to_vec(),
        KeyCode::DOWN_ARROW => b"\x1b[B".to_vec(),
        KeyCode::RIGHT_ARROW => b"\x1b[C".to_vec(),
        KeyCode::LEFT_ARROW => b"\x1b[D".to_vec(),
        KeyCode::HOME => b"\x1b[H".to_vec(),
        KeyCode::END => b"\x1b[F".to_vec(),
        KeyCode::INSERT => b"\x1b[2~".to_vec(),
        KeyCode::DELETE => b"\x1b[3~".to_vec(),
        KeyCode::PAGE_UP => b"\x1b[5~".to_vec(),
        KeyCode::PAGE_DOWN => b"\x1b[6~".to_vec(),
        _ => {
            let ch = key_to_char(key, shift)?;
            if ctrl && ch.is_ascii_alphabetic() {
                vec![ch.to_ascii_uppercase() as u8 - b'@']
            } else {
                ch.to_string().into_bytes()
            }
        }
    };

    if alt {
        let mut prefixed = vec![0x1b];
        prefixed.extend(base);
        Some(prefixed)
    } else {
        Some(base)
    }
}

fn closed(err: io::Error) -> SinkError {
    if err.kind() == io::ErrorKind::BrokenPipe {
        SinkError::Closed
    } else {
        SinkError::Io(err)
    }
}

#[async_trait(?Send)]
impl InjectionSink for PtySink {
    async fn press(&mut self, code: Code) -> Result<(), SinkError> {
        let Code::Key(key) = code else {
            debug!(%code, "pointer button ignored by terminal");
            return Ok(());
        };
        if let Some(bit) = key.modifier_bit() {
            self.modifiers |= bit;
            return Ok(());
        }
        if self.held(GUI_BITS) {
            debug!(%key, "GUI shortcut has no terminal equivalent");
            return Ok(());
        }
        if !self.session.is_running() {
            return Err(SinkError::Closed);
        }
        match key_bytes(
            key,
            self.held(SHIFT_BITS),
            self.held(CTRL_BITS),
            self.held(ALT_BITS),
        ) {
            Some(bytes) => self.session.write(&bytes).map_err(closed),
            None => {
                debug!(%key, "key has no terminal encoding");
                Ok(())
            }
        }
    }

    async fn release(&mut self, code: Code) -> Result<(), SinkError> {
        if let Code::Key(key) = code {
            if let Some(bit) = key.modifier_bit() {
                self.modifiers &= !bit;
            }
        }
        Ok(())
    }

    async fn move_by(&mut self, dx: i32, dy: i32) -> Result<(), SinkError> {
        debug!(dx, dy, "pointer move ignored by terminal");
        Ok(())
    }

    async fn sleep(&mut self, duration: Duration) -> Result<(), SinkError> {
        tokio::time::sleep(duration).await;
        self.flush_output()?;
        Ok(())
    }

    async fn release_all(&mut self) -> Result<(), SinkError> {
        self.modifiers = 0;
        Ok(())
    }
}
