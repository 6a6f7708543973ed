use super::OutputSink;
use crate::controls::Command;
use anyhow::{anyhow, Result};
use image::RgbImage;
use minifb::{Key, KeyRepeat, Window, WindowOptions};

const PROFILE_KEYS: [Key; 9] = [
    Key::Key1,
    Key::Key2,
    Key::Key3,
    Key::Key4,
    Key::Key5,
    Key::Key6,
    Key::Key7,
    Key::Key8,
    Key::Key9,
];

/// Preview window. Also the operator's control surface:
/// `1`-`9` select a profile, `C` clears, `Escape` quits.
pub struct WindowOutput {
    window: Window,
    title: String,
    buffer: Vec<u32>,
    width: u32,
    height: u32,
}

impl WindowOutput {
    pub fn new(title: &str, width: u32, height: u32, fps: u32) -> Result<Self> {
        tracing::info!("Opening preview window ({}x{})", width, height);

        let mut window = Window::new(
            title,
            width as usize,
            height as usize,
            WindowOptions {
                resize: true,
                ..WindowOptions::default()
            },
        )
        .map_err(|e| anyhow!("Failed to create window: {}", e))?;
        window.set_target_fps(fps.max(1) as usize);

        Ok(Self {
            window,
            title: title.to_string(),
            buffer: vec![0; (width * height) as usize],
            width,
            height,
        })
    }
}

/// Map one key press to a command
fn key_command(key: Key) -> Option<Command> {
    match key {
        Key::Escape => Some(Command::Quit),
        Key::C => Some(Command::Clear),
        other => PROFILE_KEYS
            .iter()
            .position(|k| *k == other)
            .map(Command::SelectIndex),
    }
}

impl OutputSink for WindowOutput {
    fn write_frame(&mut self, frame: &RgbImage) -> Result<()> {
        let (width, height) = frame.dimensions();
        self.width = width;
        self.height = height;
        self.buffer.resize((width * height) as usize, 0);

        // RGB8 -> 0x00RRGGBB
        for (dst, pixel) in self.buffer.iter_mut().zip(frame.pixels()) {
            let [r, g, b] = pixel.0;
            *dst = ((r as u32) << 16) | ((g as u32) << 8) | b as u32;
        }

        self.window
            .update_with_buffer(&self.buffer, width as usize, height as usize)
            .map_err(|e| anyhow!("Window update failed: {}", e))
    }

    fn resolution(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn poll_commands(&mut self) -> Vec<Command> {
        self.window
            .get_keys_pressed(KeyRepeat::No)
            .into_iter()
            .filter_map(key_command)
            .collect()
    }

    fn show_status(&mut self, status: &str) {
        self.window.set_title(&format!("{} - {}", self.title, status));
    }

    fn is_open(&self) -> bool {
        self.window.is_open()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_map_to_commands() {
        assert_eq!(key_command(Key::Escape), Some(Command::Quit));
        assert_eq!(key_command(Key::C), Some(Command::Clear));
        assert_eq!(key_command(Key::Key1), Some(Command::SelectIndex(0)));
        assert_eq!(key_command(Key::Key4), Some(Command::SelectIndex(3)));
        assert_eq!(key_command(Key::Space), None);
    }
}
