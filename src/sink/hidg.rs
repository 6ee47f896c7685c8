//! [`HidGadgetSink`]: writes boot-protocol HID reports to Linux USB gadget devices.
//!
//! The keyboard function (usually `/dev/hidg0`) takes 8-byte reports:
//! modifier bitmask, a reserved byte, then six key slots. The mouse function
//! (usually `/dev/hidg1`) takes 4-byte reports: buttons, dx, dy, wheel.

use super::{Code, InjectionSink, MouseButton, SinkError};
use crate::keymap::KeyCode;
use async_trait::async_trait;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::time::Duration;
use tracing::debug;

const KEY_SLOTS: usize = 6;

/// Injects through the gadget device files, keeping the held-key state
/// needed to build each report.
pub struct HidGadgetSink {
    keyboard: File,
    mouse: Option<File>,
    modifiers: u8,
    keys: [u8; KEY_SLOTS],
    buttons: u8,
}

impl HidGadgetSink {
    /// Open the keyboard device and, if given, the mouse device for writing.
    pub fn open(keyboard: impl AsRef<Path>, mouse: Option<&Path>) -> io::Result<Self> {
        let keyboard = OpenOptions::new().write(true).open(keyboard)?;
        let mouse = match mouse {
            Some(path) => Some(OpenOptions::new().write(true).open(path)?),
            None => None,
        };
        Ok(Self::from_files(keyboard, mouse))
    }

    pub fn from_files(keyboard: File, mouse: Option<File>) -> Self {
        Self {
            keyboard,
            mouse,
            modifiers: 0,
            keys: [0; KEY_SLOTS],
            buttons: 0,
        }
    }

    fn keyboard_report(&self) -> [u8; 8] {
        let mut report = [0u8; 8];
        report[0] = self.modifiers;
        report[2..].copy_from_slice(&self.keys);
        report
    }

    fn send_keyboard(&mut self) -> Result<(), SinkError> {
        let report = self.keyboard_report();
        debug!(?report, "keyboard report");
        self.keyboard.write_all(&report)?;
        self.keyboard.flush()?;
        Ok(())
    }

    fn send_mouse(&mut self, dx: i8, dy: i8) -> Result<(), SinkError> {
        let buttons = self.buttons;
        let mouse = self
            .mouse
            .as_mut()
            .ok_or_else(|| SinkError::NotReady("no mouse device configured".into()))?;
        let report = [buttons, dx as u8, dy as u8, 0];
        debug!(?report, "mouse report");
        mouse.write_all(&report)?;
        mouse.flush()?;
        Ok(())
    }

    fn hold_key(&mut self, key: KeyCode) -> Result<(), SinkError> {
        if let Some(bit) = key.modifier_bit() {
            self.modifiers |= bit;
            return Ok(());
        }
        if self.keys.contains(&key.0) {
            return Ok(());
        }
        let slot = self
            .keys
            .iter_mut()
            .find(|slot| **slot == 0)
            .ok_or_else(|| SinkError::NotReady(format!("more than {KEY_SLOTS} keys held")))?;
        *slot = key.0;
        Ok(())
    }

    fn drop_key(&mut self, key: KeyCode) {
        if let Some(bit) = key.modifier_bit() {
            self.modifiers &= !bit;
            return;
        }
        for slot in self.keys.iter_mut().filter(|slot| **slot == key.0) {
            *slot = 0;
        }
    }

    fn set_button(&mut self, button: MouseButton, held: bool) {
        if held {
            self.buttons |= button.bit();
        } else {
            self.buttons &= !button.bit();
        }
    }
}

/// Split an offset into steps that each fit a report byte.
fn split_axis(mut remaining: i32) -> impl Iterator<Item = i8> {
    std::iter::from_fn(move || {
        if remaining == 0 {
            return None;
        }
        let step = remaining.clamp(-127, 127);
        remaining -= step;
        Some(step as i8)
    })
}

#[async_trait(?Send)]
impl InjectionSink for HidGadgetSink {
    async fn press(&mut self, code: Code) -> Result<(), SinkError> {
        match code {
            Code::Key(key) => {
                self.hold_key(key)?;
                self.send_keyboard()
            }
            Code::Mouse(button) => {
                self.set_button(button, true);
                self.send_mouse(0, 0)
            }
        }
    }

    async fn release(&mut self, code: Code) -> Result<(), SinkError> {
        match code {
            Code::Key(key) => {
                self.drop_key(key);
                self.send_keyboard()
            }
            Code::Mouse(button) => {
                self.set_button(button, false);
                self.send_mouse(0, 0)
            }
        }
    }

    async fn move_by(&mut self, dx: i32, dy: i32) -> Result<(), SinkError> {
        let mut xs = split_axis(dx);
        let mut ys = split_axis(dy);
        loop {
            match (xs.next(), ys.next()) {
                (None, None) => return Ok(()),
                (x, y) => self.send_mouse(x.unwrap_or(0), y.unwrap_or(0))?,
            }
        }
    }

    async fn sleep(&mut self, duration: Duration) -> Result<(), SinkError> {
        tokio::time::sleep(duration).await;
        Ok(())
    }

    async fn release_all(&mut self) -> Result<(), SinkError> {
        self.modifiers = 0;
        self.keys = [0; KEY_SLOTS];
        self.buttons = 0;
        self.send_keyboard()?;
        if self.mouse.is_some() {
            self.send_mouse(0, 0)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn gadget() -> (HidGadgetSink, NamedTempFile, NamedTempFile) {
        let kbd = NamedTempFile::new().unwrap();
        let mouse = NamedTempFile::new().unwrap();
        let sink = HidGadgetSink::open(kbd.path(), Some(mouse.path())).unwrap();
        (sink, kbd, mouse)
    }

    #[tokio::test]
    async fn test_ctrl_l_reports() {
        let (mut sink, kbd, _mouse) = gadget();
        sink.press(KeyCode::LEFT_CONTROL.into()).await.unwrap();
        sink.press(KeyCode::L.into()).await.unwrap();
        sink.release(KeyCode::L.into()).await.unwrap();
        sink.release(KeyCode::LEFT_CONTROL.into()).await.unwrap();

        let written = std::fs::read(kbd.path()).unwrap();
        assert_eq!(
            written,
            [
                [0x01, 0, 0, 0, 0, 0, 0, 0],
                [0x01, 0, 0x0F, 0, 0, 0, 0, 0],
                [0x01, 0, 0, 0, 0, 0, 0, 0],
                [0x00, 0, 0, 0, 0, 0, 0, 0],
            ]
            .concat()
        );
    }

    #[tokio::test]
    async fn test_seventh_key_not_ready() {
        let (mut sink, _kbd, _mouse) = gadget();
        for usage in 0x04..0x0A {
            sink.press(KeyCode(usage).into()).await.unwrap();
        }
        let err = sink.press(KeyCode(0x0A).into()).await.unwrap_err();
        assert!(matches!(err, SinkError::NotReady(_)));
    }

    #[tokio::test]
    async fn test_large_move_is_split() {
        let (mut sink, _kbd, mouse) = gadget();
        sink.move_by(300, -10).await.unwrap();
        let written = std::fs::read(mouse.path()).unwrap();
        assert_eq!(
            written,
            vec![0, 127, (-10i8) as u8, 0, 0, 127, 0, 0, 0, 46, 0, 0]
        );
    }

    #[tokio::test]
    async fn test_mouse_button_without_device() {
        let kbd = NamedTempFile::new().unwrap();
        let mut sink = HidGadgetSink::open(kbd.path(), None).unwrap();
        let err = sink.press(MouseButton::Left.into()).await.unwrap_err();
        assert!(matches!(err, SinkError::NotReady(_)));
    }

    #[tokio::test]
    async fn test_release_all_clears_held_state() {
        let (mut sink, kbd, mouse) = gadget();
        sink.press(KeyCode::LEFT_SHIFT.into()).await.unwrap();
        for usage in 0x04..0x0A {
            sink.press(KeyCode(usage).into()).await.unwrap();
        }
        sink.press(MouseButton::Left.into()).await.unwrap();
        sink.release_all().await.unwrap();

        let keyboard = std::fs::read(kbd.path()).unwrap();
        assert_eq!(keyboard[keyboard.len() - 8..], [0; 8]);
        let mouse = std::fs::read(mouse.path()).unwrap();
        assert_eq!(mouse, [1, 0, 0, 0, 0, 0, 0, 0]);

        // All six slots are free again.
        sink.press(KeyCode(0x0A).into()).await.unwrap();
        let keyboard = std::fs::read(kbd.path()).unwrap();
        assert_eq!(keyboard[keyboard.len() - 8..], [0, 0, 0x0A, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_split_axis() {
        assert_eq!(split_axis(0).count(), 0);
        assert_eq!(split_axis(-200).collect::<Vec<_>>(), vec![-127, -73]);
    }
}
