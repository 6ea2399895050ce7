use std::fmt::Display;
use std::fmt::Error;
use std::fmt::Formatter;

use crate::error::EmuError;
use crate::memory::read_u32_be;

/// `MaSc`
pub const MAGIC: u32 = 0x4d61_5363;
pub const HEADER_SIZE: usize = 42;

/// Engine generation recorded in the image header. Each step adds or
/// changes a handful of behaviours consulted at fixed decision points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Version {
    /// The Pawn
    V0,
    /// The Guild of Thieves
    V1,
    /// Jinxter
    V2,
    /// Corruption, Fish!, Myth
    V3,
    /// Magnetic Windows releases
    V4,
}

impl Version {
    pub fn from_byte(b: u8) -> Result<Version, EmuError> {
        match b {
            0 => Ok(Version::V0),
            1 => Ok(Version::V1),
            2 => Ok(Version::V2),
            3 => Ok(Version::V3),
            4 => Ok(Version::V4),
            other => Err(EmuError::BadImage(format!("unknown version {other}"))),
        }
    }

    pub fn number(self) -> u8 {
        self as u8
    }
}

pub struct Header {
    pub version: Version,
    pub code_size: u32,
    pub string_size: u32,
    pub string2_size: u32,
    pub dict_size: u32,
    pub decode_offset: u32,
    pub undo_size: u32,
    pub undo_pc: u32,
}

impl Header {
    pub fn new(bytes: &[u8]) -> Result<Header, EmuError> {
        let field = |offset: usize| {
            read_u32_be(bytes, offset)
                .ok_or_else(|| EmuError::BadImage("file too small for header".to_string()))
        };
        if bytes.len() < HEADER_SIZE {
            return Err(EmuError::BadImage("file too small for header".to_string()));
        }
        if field(0)? != MAGIC {
            return Err(EmuError::BadImage("missing MaSc signature".to_string()));
        }
        let size = field(8)?;
        if size != HEADER_SIZE as u32 {
            return Err(EmuError::BadImage(format!("unexpected header size {size}")));
        }
        Ok(Header {
            version: Version::from_byte(bytes[13])?,
            code_size: field(14)?,
            string_size: field(18)?,
            string2_size: field(22)?,
            dict_size: field(26)?,
            decode_offset: field(30)?,
            undo_size: field(34)?,
            undo_pc: field(38)?,
        })
    }

    /// Size of the memory arena: at least 64 KiB before version 4
    pub fn mem_size(&self) -> usize {
        if self.version < Version::V4 && self.code_size < 0x10000 {
            0x10000
        } else {
            self.code_size as usize
        }
    }

    /// Bytes covered by restart. Never zero.
    pub fn effective_undo_size(&self) -> usize {
        if self.undo_size == 0 {
            8
        } else {
            self.undo_size as usize
        }
    }

    pub fn has_dictionary(&self) -> bool {
        self.dict_size != 0
    }
}

impl Display for Header {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        write!(
            f,
            "
Engine version:           {}
Code size:                {:#07x}
String bank 1 size:       {:#07x}
String bank 2 size:       {:#07x}
Dictionary size:          {:#07x}
Decode table offset:      {:#07x}
Undo size:                {:#07x}
Undo PC:                  {:#07x}
",
            self.version.number(),
            self.code_size,
            self.string_size,
            self.string2_size,
            self.dict_size,
            self.decode_offset,
            self.undo_size,
            self.undo_pc,
        )
    }
}
