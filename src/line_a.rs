/// Line-A service calls (0xA0xx)
///
/// These are the engine's system calls: keyboard input, text output,
/// dictionary and property helpers, pictures, save/load and restart. The
/// second opcode byte selects the service; values below the services a
/// version knows fall back to a single key read.
use crate::error::EmuError;
use crate::header::Version;
use crate::host::{Host, KeyInput, PictureRef};
use crate::instruction::Opcode;
use crate::interpreter::{Interpreter, UNDO_FAIL, UNDO_OK};
use crate::memory::Addr;
use crate::opcode_tables::{line_a_name, LINE_A_BASE};
use log::{debug, warn};

/// Longest line accepted by the line input service
pub const LINE_BUFFER_SIZE: u32 = 256;

pub const NO_HINTS: &str = "[Hints are not available.]\n";
pub const NOT_SUPPORTED: &str = "[This function is not supported.]\n";

/// Request kinds of the A0DF window call
const REQUEST_PICTURE: u8 = 7;
const REQUEST_WINDOW: u8 = 10;
const REQUEST_MUSIC: u8 = 13;
const WINDOW_HINTS: u8 = 4;

impl<H: Host> Interpreter<H> {
    /// 0xA0
    pub(crate) fn execute_line_a(&mut self, op: Opcode) -> Result<(), EmuError> {
        let version = self.vm.version();
        let b = op.byte2;
        if b < LINE_A_BASE || (version < Version::V4 && b < 0xe4) || (version < Version::V2 && b < 0xed) {
            return self.read_key();
        }
        debug!("line-a {:02x} {}", b, line_a_name(b));
        match b {
            0xdd | 0xe0 | 0xe2 | 0xef => {}
            0xde => self.vm.regs.set_db(1, 1),
            0xdf => self.window_request()?,
            0xe1 => self.read_line()?,
            0xe3 => {
                if self.vm.regs.d(1) == 0 && (version < Version::V4 || self.vm.regs.d(6) == 0) {
                    self.host.show_picture(PictureRef::Number(0), 0)?;
                }
            }
            0xe4 => {
                self.vm.regs.set_aw(7, self.vm.regs.aw(7).wrapping_add(4));
                self.vm.pc = self.vm.pop()?;
            }
            0xe5 | 0xe6 => {
                self.vm.pc = self.vm.pop()?;
                self.vm.flags.zero = b == 0xe5;
            }
            0xe7 => self.vm.flags.zero = true,
            0xe8 => self.vm.flags.zero = false,
            0xe9 => self.vm.copy_dict_word()?,
            0xea => self.print_dict_word()?,
            0xeb => self.vm.poke_dict()?,
            0xec => self.vm.peek_dict()?,
            0xed => self.vm.stop(),
            0xee => self.restart()?,
            0xf0 => {
                let picture = PictureRef::Number(self.vm.regs.db(0) as u32);
                self.host.show_picture(picture, self.vm.regs.db(1))?;
            }
            0xf1 => {
                let mut ptr = self.vm.regs.aw(1);
                for _ in 0..self.vm.regs.dw(0) {
                    ptr = self.vm.skip_c_string(ptr)?;
                }
                self.vm.regs.set_aw(1, ptr);
            }
            0xf2 => self.vm.find_owned_object()?,
            0xf3 => self.char_out(self.vm.regs.db(1))?,
            0xf4 => self.save_game()?,
            0xf5 => self.load_game()?,
            0xf6 => {
                let limit = match self.vm.regs.db(1) {
                    0 => 1,
                    n => n as u32,
                };
                let value = self.vm.rng.next_value() % limit;
                self.vm.regs.set_dw(1, value as u16);
            }
            0xf7 => {
                let t = self.vm.rng.next_value() as u16;
                self.vm.regs.set_db(0, t.wrapping_add(t >> 8) as u8);
            }
            0xf8 => self.write_string()?,
            0xf9 => self.vm.next_inventory_item()?,
            0xfa => self.vm.scan_properties()?,
            0xfb => self.vm.skip_dict_words()?,
            0xfc => self.vm.skip_dict_and_strings()?,
            0xfd => self.vm.set_property_tables(),
            0xfe => self.vm.find_property()?,
            0xff => {
                self.vm.dict_lookup()?;
            }
            _ => return self.read_key(),
        }
        Ok(())
    }

    /// Wait for one key into D1. The undo key rolls back a turn instead.
    fn read_key(&mut self) -> Result<(), EmuError> {
        self.host.flush_output()?;
        self.vm.rng.next_value();
        match self.host.read_char(true)? {
            KeyInput::Abort => debug!("read_key aborted"),
            KeyInput::Char(c) => self.vm.regs.set_d(1, c as u32),
            KeyInput::Undo => {
                if self.undo()? {
                    self.output_text(UNDO_OK)?;
                } else {
                    warn!("undo requested with no history");
                    self.output_text(UNDO_FAIL)?;
                    self.vm.regs.set_d(1, b'\n' as u32);
                }
            }
        }
        Ok(())
    }

    /// A0E1: read a line to (A1). A1 ends on the last stored character,
    /// D1.w is 1 for an empty or overlong line.
    fn read_line(&mut self) -> Result<(), EmuError> {
        self.host.flush_output()?;
        self.vm.rng.next_value();
        let start = self.vm.regs.a(1);
        let mut len: u32 = 0;
        loop {
            let c = match self.host.read_char(true)? {
                KeyInput::Abort => {
                    debug!("read_line aborted after {len} characters");
                    return Ok(());
                }
                KeyInput::Char(c) => {
                    self.vm.write8(start.wrapping_add(len), c)?;
                    len += 1;
                    c
                }
                KeyInput::Undo => {
                    if self.undo()? {
                        self.output_text(UNDO_OK)?;
                        self.host.output_char(b'\n')?;
                        return Ok(());
                    }
                    warn!("undo requested with no history");
                    self.output_text(UNDO_FAIL)?;
                    self.vm.write8(start, b'\n')?;
                    len = 1;
                    self.output_text("\n>")?;
                    b'\n'
                }
            };
            if c == b'\n' || len >= LINE_BUFFER_SIZE {
                break;
            }
        }
        self.vm.regs.set_a(1, start.wrapping_add(len).wrapping_sub(1));
        let status = if len != LINE_BUFFER_SIZE && len != 1 { 0 } else { 1 };
        self.vm.regs.set_dw(1, status);
        Ok(())
    }

    /// A0DF: picture, window and music requests of the windowed releases.
    /// A1 points at a record whose third byte is the request kind.
    fn window_request(&mut self) -> Result<(), EmuError> {
        let record = self.vm.regs.a(1);
        let kind = self.vm.read8(record.wrapping_add(2))?;
        let arg = record.wrapping_add(3);
        match kind {
            REQUEST_PICTURE => {
                let name = self.c_string_at(arg)?;
                self.host.show_picture(PictureRef::Name(name), 2)?;
            }
            REQUEST_WINDOW => match self.vm.read8(arg)? {
                WINDOW_HINTS => self.open_hints()?,
                0..=3 => {
                    warn!("unsupported window request");
                    self.output_text(NOT_SUPPORTED)?;
                }
                other => debug!("ignoring window {other}"),
            },
            REQUEST_MUSIC => {
                if self.vm.read8(arg)? == 0 {
                    self.host.play_music(None)?;
                } else {
                    let name = self.c_string_at(arg)?;
                    self.host.play_music(Some(&name))?;
                }
            }
            other => debug!("ignoring window request kind {other}"),
        }
        Ok(())
    }

    fn open_hints(&mut self) -> Result<(), EmuError> {
        let shown = match &self.hints {
            Some(hints) => self.host.show_hints(hints),
            None => {
                self.output_text(NO_HINTS)?;
                return Ok(());
            }
        };
        if !shown {
            self.show_hints_text(0)?;
        }
        Ok(())
    }

    /// A0EA: print the dictionary entry at A1 with D3 temporarily set to D1
    fn print_dict_word(&mut self) -> Result<(), EmuError> {
        let mut ptr = self.vm.regs.aw(1);
        let saved = self.vm.regs.db(3);
        self.vm.regs.set_db(3, self.vm.regs.db(1));
        loop {
            let c = match self.vm.game.dictionary.as_deref() {
                Some(dict) => *dict.get(ptr as usize).ok_or(EmuError::MemoryOutOfRange {
                    addr: ptr as u32,
                    len: 1,
                })?,
                None => return Err(EmuError::MissingBank("dictionary")),
            };
            ptr = ptr.wrapping_add(1);
            self.char_out(c)?;
            if c >= 0x80 {
                break;
            }
        }
        self.vm.regs.set_aw(1, ptr);
        self.vm.regs.set_db(3, saved);
        Ok(())
    }

    fn c_string_at(&self, addr: u32) -> Result<String, EmuError> {
        let bytes = self.vm.game.memory.c_string(Addr(addr))?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// File name for save/load: versions before 4 pass one at A0
    fn persistence_name(&self) -> Result<Option<String>, EmuError> {
        if self.vm.version() < Version::V4 {
            Ok(Some(self.c_string_at(self.vm.regs.aw(0) as u32)?))
        } else {
            Ok(None)
        }
    }

    /// A0F4: save D1.w bytes from A1, status in D7.b
    fn save_game(&mut self) -> Result<(), EmuError> {
        let name = self.persistence_name()?;
        let addr = Addr(self.vm.regs.aw(1) as u32);
        let len = self.vm.regs.dw(1) as usize;
        let data = self.vm.game.memory.slice(addr, len)?;
        let status = match self.host.save(name.as_deref(), data) {
            Ok(()) => 0,
            Err(e) => {
                warn!("save failed: {e}");
                1
            }
        };
        self.vm.regs.set_db(7, status);
        Ok(())
    }

    /// A0F5: load D1.w bytes to A1, status in D7.b
    fn load_game(&mut self) -> Result<(), EmuError> {
        let name = self.persistence_name()?;
        let addr = Addr(self.vm.regs.aw(1) as u32);
        let len = self.vm.regs.dw(1) as usize;
        let buffer = self.vm.game.memory.slice_mut(addr, len)?;
        let status = match self.host.load(name.as_deref(), buffer) {
            Ok(()) => 0,
            Err(e) => {
                warn!("load failed: {e}");
                1
            }
        };
        self.vm.regs.set_db(7, status);
        Ok(())
    }
}
