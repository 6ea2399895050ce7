//! Callback contract between the machine and its front end
//!
//! The machine decides when text, pictures, music, hints and persistence are
//! needed. A `Host` decides how. Output failures are fatal to the session;
//! save and load failures are reported back to the game script instead.

use crate::hints::Hint;
use thiserror::Error;

/// Result of a blocking one-character read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyInput {
    Char(u8),
    /// The player asked to take back the last turn
    Undo,
    /// A new game is being loaded; the pending instruction must not complete
    Abort,
}

/// Picture requested by the game
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PictureRef {
    Number(u32),
    /// Named picture of the windowed releases
    Name(String),
}

/// Core trait for front ends driving a game
pub trait Host {
    /// Append one filtered character to the transcript
    fn output_char(&mut self, c: u8) -> Result<(), HostError>;

    /// Deliver buffered output before a blocking read
    fn flush_output(&mut self) -> Result<(), HostError>;

    /// Block for one input byte. `allow_undo` tells the host an undo
    /// request would be honoured at this point.
    fn read_char(&mut self, allow_undo: bool) -> Result<KeyInput, HostError>;

    /// One character of the status line (versions before 4)
    fn status_char(&mut self, c: u8) -> Result<(), HostError>;

    /// Show a picture. Number 0 with mode 0 clears the picture area.
    fn show_picture(&mut self, _picture: PictureRef, _mode: u8) -> Result<(), HostError> {
        Ok(())
    }

    /// Start the named piece of music, or stop playback with `None`
    fn play_music(&mut self, _name: Option<&str>) -> Result<(), HostError> {
        Ok(())
    }

    /// Present hints natively. Returning false falls back to the text menu.
    fn show_hints(&mut self, _hints: &[Hint]) -> bool {
        false
    }

    /// Persist a raw blob. `name` is given by older games, newer ones
    /// leave the choice to the host.
    fn save(&mut self, name: Option<&str>, data: &[u8]) -> Result<(), HostError>;

    /// Fill `buffer` from a previously saved blob
    fn load(&mut self, name: Option<&str>, buffer: &mut [u8]) -> Result<(), HostError>;

    /// The session has hit an unrecoverable error
    fn fatal(&mut self, message: &str);
}

/// Host error type
#[derive(Error, Debug)]
pub enum HostError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Failed(String),
}

impl HostError {
    pub fn new(message: impl Into<String>) -> Self {
        HostError::Failed(message.into())
    }
}
