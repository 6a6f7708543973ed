use crossbeam_channel::{unbounded, Receiver};
use std::io::BufRead;
use std::thread;

/// Operator input, applied by the pipeline between ticks
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Switch to the named profile (clears the canvas)
    SelectProfile(String),
    /// Switch to the profile at this registry position (clears the canvas)
    SelectIndex(usize),
    /// Clear the canvas
    Clear,
    /// Stop the pipeline
    Quit,
}

impl Command {
    /// Parse one line of operator input
    ///
    /// `clear`, `quit`/`exit`, a 1-based profile number, or a profile name.
    /// Blank lines yield `None`.
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        let command = match line.to_ascii_lowercase().as_str() {
            "clear" | "c" => Self::Clear,
            "quit" | "exit" | "q" => Self::Quit,
            other => match other.parse::<usize>() {
                Ok(n) if n > 0 => Self::SelectIndex(n - 1),
                _ => Self::SelectProfile(line.to_string()),
            },
        };
        Some(command)
    }
}

/// Read commands from stdin on a background thread
///
/// The pipeline drains the returned channel at tick boundaries, so commands
/// never interleave with a detect/feed pair. The thread ends at EOF.
pub fn spawn_stdin_reader() -> Receiver<Command> {
    let (tx, rx) = unbounded();

    let spawned = thread::Builder::new()
        .name("stdin-commands".into())
        .spawn(move || {
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                let line = match line {
                    Ok(line) => line,
                    Err(e) => {
                        tracing::warn!("Stopped reading stdin commands: {}", e);
                        break;
                    }
                };
                let Some(command) = Command::parse(&line) else {
                    continue;
                };
                tracing::debug!("stdin command: {:?}", command);
                if tx.send(command).is_err() {
                    break;
                }
            }
        });

    if let Err(e) = spawned {
        tracing::warn!("Could not start stdin command reader: {}", e);
    }

    rx
}
