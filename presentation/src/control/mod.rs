//! Interactive run control from stdin
//!
//! While a consultation runs, typed lines pause, resume or stop it. Input
//! is read on a dedicated thread since blocking stdin reads cannot be
//! cancelled and would otherwise hold up runtime shutdown.

use consilium_application::PauseHandle;
use std::io::BufRead;
use std::thread::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// A command typed during a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlCommand {
    Pause,
    Resume,
    Toggle,
    Quit,
}

impl ControlCommand {
    pub fn parse(line: &str) -> Option<Self> {
        match line.trim().to_lowercase().as_str() {
            "p" | "pause" => Some(ControlCommand::Pause),
            "r" | "resume" => Some(ControlCommand::Resume),
            "" | "t" | "toggle" => Some(ControlCommand::Toggle),
            "q" | "quit" | "stop" => Some(ControlCommand::Quit),
            _ => None,
        }
    }
}

/// Feeds control commands into a running consultation
pub struct RunControl {
    pause: PauseHandle,
    cancel: CancellationToken,
}

impl RunControl {
    pub fn new(pause: PauseHandle, cancel: CancellationToken) -> Self {
        Self { pause, cancel }
    }

    pub fn apply(&self, command: ControlCommand) {
        match command {
            ControlCommand::Pause => self.pause.pause(),
            ControlCommand::Resume => self.pause.resume(),
            ControlCommand::Toggle => self.pause.toggle(),
            ControlCommand::Quit => self.cancel.cancel(),
        }
    }

    /// Read commands until input ends, `quit` is typed, or the run is cancelled
    pub fn listen<R: BufRead>(self, reader: R) {
        for line in reader.lines() {
            if self.cancel.is_cancelled() {
                break;
            }
            let Ok(line) = line else { break };
            match ControlCommand::parse(&line) {
                Some(command) => {
                    self.apply(command);
                    if command == ControlCommand::Quit {
                        break;
                    }
                }
                None => debug!("Ignoring control input: {}", line.trim()),
            }
        }
    }

    /// Listen on the process's stdin in a background thread
    pub fn spawn_stdin(self) -> JoinHandle<()> {
        std::thread::spawn(move || self.listen(std::io::stdin().lock()))
    }
}
