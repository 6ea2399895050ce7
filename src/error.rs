//! Error type shared by the loader, the instruction core and the host glue
//!
//! Everything in here is fatal from the game's point of view: once one of
//! these escapes `Interpreter::step` the machine is stopped. Recoverable
//! conditions (failed save, undo without history, empty lookups) are
//! reported through registers and return values instead.

use crate::host::HostError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EmuError {
    /// Opcode outside the subset the game compiler emits
    #[error("unimplemented instruction {what} (opcode {opcode:04x}) at {pc:06x}")]
    Unimplemented {
        pc: u32,
        opcode: u16,
        what: &'static str,
    },
    /// Address requested from a register operand, or an unused mode 7 slot
    #[error("illegal addressing mode for {what} at {pc:06x}")]
    IllegalAddressing { pc: u32, what: &'static str },
    /// Access beyond the end of the memory arena or a bank
    #[error("outside memory experience: {addr:08x} (size {len:x})")]
    MemoryOutOfRange { addr: u32, len: usize },
    #[error("invalid register {0}")]
    InvalidRegister(usize),
    /// The game file could not be parsed
    #[error("bad game image: {0}")]
    BadImage(String),
    /// A routine needed a bank this image does not carry
    #[error("game image has no {0} bank")]
    MissingBank(&'static str),
    /// The host callback reported a failure it could not recover from
    #[error("host error: {0}")]
    Host(#[from] HostError),
    #[error("invalid config: {0}")]
    Config(#[from] toml::de::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<EmuError> for String {
    fn from(error: EmuError) -> String {
        error.to_string()
    }
}
