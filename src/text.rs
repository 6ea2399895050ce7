//! String decompression and the output character filter
//!
//! Game text is stored as a bit stream walked through a binary decode tree
//! (the decode table). Decoded characters go through `OutputFilter`, which
//! capitalises sentence starts, collapses doubled blanks and applies the
//! version-specific escape characters before anything reaches the host.

use crate::error::EmuError;
use crate::header::Version;
use crate::host::Host;
use crate::interpreter::Interpreter;
use bitvec::prelude::*;
use log::trace;

/// A character leaving the filter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Emit {
    Text(u8),
    Status(u8),
}

/// Register-dependent inputs to the filter
#[derive(Debug, Clone, Copy)]
pub struct CharMode {
    pub version: Version,
    /// D3.b non-zero: characters go to the status line
    pub status: bool,
    /// D2.b non-zero: `@` prints nothing instead of a plural `s`
    pub suppress_plural: bool,
}

/// Filter state that survives between characters
#[derive(Debug, Clone, Default)]
pub struct OutputFilter {
    /// Capitalise the next letter
    big: bool,
    /// The previous character ended a clause, a letter needs a space first
    period: bool,
    /// Swallow the character after a `|` (versions 0-2)
    pipe: bool,
    /// Last character delivered to the transcript
    pub(crate) last: u8,
}

impl OutputFilter {
    pub fn last(&self) -> u8 {
        self.last
    }

    pub fn filter(&mut self, c: u8, mode: CharMode, out: &mut Vec<Emit>) {
        if c == 0xff {
            self.big = true;
            return;
        }
        let mut c = c & 0x7f;
        if mode.status {
            if c == b'_' || c == b'@' {
                c = b' ';
            }
            if mode.version < Version::V4 {
                out.push(Emit::Status(c.to_ascii_uppercase()));
            }
            return;
        }
        if c == b'^' {
            c = b'\n';
        }
        if c == b'@' {
            if mode.suppress_plural {
                return;
            }
            c = b's';
        }
        if mode.version < Version::V3 && c == b'~' {
            self.last = b'~';
            c = b'\n';
        }
        if c.is_ascii_alphabetic() {
            if self.big {
                c = c.to_ascii_uppercase();
                self.big = false;
            }
            if self.period {
                self.filter(b' ', mode, out);
            }
        }
        self.period = false;
        if mode.version == Version::V4 && c == b' ' && self.last == b'\n' {
            return;
        }
        match c {
            b'.' | b'?' | b'!' | b'\n' => self.big = true,
            b'"' => self.big = false,
            _ => {}
        }
        if (c == b' ' || c == b'\n') && c == self.last {
            return;
        }
        if mode.version < Version::V3 {
            if self.pipe {
                self.pipe = false;
                return;
            }
            if c == b'|' {
                self.pipe = true;
                return;
            }
        } else if c == b'~' {
            c = b'\n';
            if self.last != b'\n' {
                self.filter(b'\n', mode, out);
            }
        }
        self.last = c;
        if c == b'_' {
            c = b' ';
        }
        if matches!(c, b'.' | b',' | b';' | b':' | b'!' | b'?') {
            self.period = true;
        }
        out.push(Emit::Text(c));
    }
}

/// Bit position inside the string banks where an interrupted string resumes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StringCursor {
    pub bit: usize,
}

/// Walk the decode tree from `cursor` until a leaf (a value >= 0x80) is
/// reached, returning the character with the leaf marker removed.
pub fn decode_char(strings: &[u8], table: usize, cursor: &mut StringCursor) -> Result<u8, EmuError> {
    let bits = strings.view_bits::<Lsb0>();
    let out_of_range = |what: &str| EmuError::BadImage(format!("{what} runs past the string banks"));
    let mut c: u8 = 0;
    while c < 0x80 {
        let bit = bits
            .get(cursor.bit)
            .map(|b| *b)
            .ok_or_else(|| out_of_range("string data"))?;
        let node = table + c as usize + if bit { 0x80 } else { 0 };
        c = *strings.get(node).ok_or_else(|| out_of_range("decode table"))?;
        cursor.bit += 1;
    }
    Ok(c & 0x7f)
}

/// Start of string `number`. The table after the decode tree holds the
/// offsets; strings numbered from the split point on live in bank 2.
pub fn string_start(strings: &[u8], table: usize, bank1_size: u32, number: u16) -> Result<StringCursor, EmuError> {
    let word = |offset: usize| -> Result<u32, EmuError> {
        strings
            .get(offset..offset + 2)
            .map(|b| u16::from_be_bytes([b[0], b[1]]) as u32)
            .ok_or_else(|| EmuError::BadImage(format!("string index {number} outside decode table")))
    };
    if number == 0 {
        return Ok(StringCursor::default());
    }
    let mut offset = word(table + 0x100 + 2 * number as usize)?;
    let split = word(table + 0x100)?;
    if split != 0 && number as u32 >= split {
        offset += bank1_size;
    }
    Ok(StringCursor {
        bit: offset as usize * 8,
    })
}

impl<H: Host> Interpreter<H> {
    fn char_mode(&self) -> CharMode {
        CharMode {
            version: self.vm.version(),
            status: self.vm.regs.db(3) != 0,
            suppress_plural: self.vm.regs.db(2) != 0,
        }
    }

    /// Send one game character through the output filter to the host
    pub fn char_out(&mut self, c: u8) -> Result<(), EmuError> {
        let mode = self.char_mode();
        let mut emitted = Vec::with_capacity(2);
        self.vm.output.filter(c, mode, &mut emitted);
        for emit in emitted {
            match emit {
                Emit::Text(c) => self.host.output_char(c)?,
                Emit::Status(c) => self.host.status_char(c)?,
            }
        }
        Ok(())
    }

    /// Print string D0.w, or with C set continue the previous one after a
    /// page break. C is left set when the string was interrupted.
    pub fn write_string(&mut self) -> Result<(), EmuError> {
        let table = self.vm.game.decode_offset();
        let mut cursor = if self.vm.flags.carry {
            self.vm.string_cursor
        } else {
            let number = self.vm.regs.dw(0);
            trace!("write_string {number}");
            string_start(&self.vm.game.strings, table, self.vm.game.string_size(), number)?
        };
        let c = loop {
            let c = decode_char(&self.vm.game.strings, table, &mut cursor)?;
            // 0x40 after a space is a page break, not a plural
            if c == 0 || (c == 0x40 && self.vm.output.last == b' ') {
                break c;
            }
            self.char_out(c)?;
        };
        self.vm.flags.carry = c != 0;
        if c != 0 {
            self.vm.string_cursor = cursor;
        }
        Ok(())
    }
}
