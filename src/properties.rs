//! Object property records
//!
//! Every object owns a 14-byte record in a table whose base the game
//! installs with A0FD. These helpers interpret the records in place:
//!
//! ```text
//! +5   bit 0: described
//! +6   object flags (0xcc: worn, body part, room, hidden)
//! +8   parent object (word)
//! +12  adjective / ownership word, low 14 bits
//! ```

use crate::error::EmuError;
use crate::header::Version;
use crate::vm::VM;
use log::debug;

/// Size of one property record
pub const PROPERTY_SIZE: u16 = 14;

/// Base pointers installed by the game at startup
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PropertyTables {
    /// First property record
    pub properties: u16,
    /// Routine entered by Line-F opcodes outside the shortcut table
    pub fl_sub: u16,
    /// Line-F shortcut table, indexed downwards
    pub fl_tab: u16,
    pub fl_size: u16,
    /// Overflow index for object numbers above `fp_size`
    pub fp_tab: u16,
    pub fp_size: u16,
}

impl VM {
    /// A0FD: take the table pointers from A0, A3, A5, A6, D6 and D7.
    /// Older versions only know the leading entries.
    pub fn set_property_tables(&mut self) {
        let version = self.version();
        let regs = &self.regs;
        let t = &mut self.tables;
        t.properties = regs.aw(0);
        if version > Version::V0 {
            t.fl_sub = regs.aw(3);
        }
        if version > Version::V1 {
            t.fl_tab = regs.aw(5);
            t.fl_size = regs.dw(7).wrapping_add(1);
        }
        if version > Version::V2 {
            t.fp_tab = regs.aw(6);
            t.fp_size = regs.dw(6);
        }
        debug!("property tables {:04x?}", self.tables);
    }

    /// A0FE: A0 = address of the property record of object D0.w
    pub fn find_property(&mut self) -> Result<(), EmuError> {
        let t = self.tables;
        let object = self.regs.dw(0) & 0x3fff;
        let index = if self.version() > Version::V2 && object > t.fp_size {
            let slot = (t.fp_size.wrapping_sub(object) ^ 0xffff) << 1;
            self.read16(t.fp_tab.wrapping_add(slot) as u32)?
        } else {
            if self.version() < Version::V2 {
                self.regs.set_d(0, self.regs.d(0) & 0x7fff);
            } else {
                self.regs.set_dw(0, self.regs.dw(0) & 0x7fff);
            }
            self.regs.dw(0)
        };
        let record = (index & 0x3fff) as u32 * PROPERTY_SIZE as u32 + t.properties as u32;
        self.regs.set_a(0, record);
        Ok(())
    }

    /// A0F2: walk back from object D2.w towards D4.w looking for a record
    /// with an owner. C reports whether the walk stopped early.
    pub fn find_owned_object(&mut self) -> Result<(), EmuError> {
        self.flags.carry = false;
        self.regs.set_dw(0, self.regs.dw(2));
        self.find_property()?;
        let mut ptr = self.regs.aw(0);
        while self.regs.dw(2) > 0 {
            if self.read16(ptr.wrapping_add(12) as u32)? & 0x3fff != 0 {
                self.flags.carry = true;
                break;
            }
            if self.regs.dw(2) == self.regs.dw(4) & 0x7fff {
                self.flags.carry = true;
                break;
            }
            ptr = ptr.wrapping_sub(PROPERTY_SIZE);
            self.regs.set_dw(2, self.regs.dw(2).wrapping_sub(1));
        }
        Ok(())
    }

    /// A0F9: scan down from object D0.w for the next item carried by the
    /// player, following parents through containers. Z is set when one was
    /// found; D0.w is left one above the object examined last.
    pub fn next_inventory_item(&mut self) -> Result<(), EmuError> {
        self.flags.zero = false;
        let mut object = self.regs.dw(0);
        loop {
            self.regs.set_dw(0, object);
            loop {
                self.find_property()?;
                let record = self.regs.aw(0) as u32;
                if self.read8(record + 5)? & 1 != 0 {
                    break;
                }
                let flags = self.read8(record + 6)?;
                let parent = self.read16(record + 8)?;
                if flags == 0 {
                    if parent == 0 {
                        self.flags.zero = true;
                    }
                    break;
                }
                if flags & 0xcc != 0 {
                    break;
                }
                if parent == 0 {
                    self.flags.zero = true;
                    break;
                }
                self.regs.set_dw(0, parent);
            }
            object = object.wrapping_sub(1);
            if self.flags.zero || object == 0 {
                break;
            }
        }
        self.regs.set_dw(0, object.wrapping_add(1));
        Ok(())
    }

    /// A0FA: step A0 through consecutive records, counting D3.w up to D4.w,
    /// until one matches D2 (the 14-bit word when D5.b is set, else the
    /// first byte). C is set on a match.
    pub fn scan_properties(&mut self) -> Result<(), EmuError> {
        let mut ptr = self.regs.aw(0);
        loop {
            let matched = if self.regs.db(5) != 0 {
                self.read16(ptr as u32)? & 0x3fff == self.regs.dw(2)
            } else {
                self.read8(ptr as u32)? == self.regs.db(2)
            };
            if self.regs.dw(3) == self.regs.dw(4) {
                self.flags.carry = false;
                self.regs.set_aw(0, ptr);
            } else {
                self.regs.set_dw(3, self.regs.dw(3).wrapping_add(1));
                ptr = ptr.wrapping_add(PROPERTY_SIZE);
                if matched {
                    self.flags.carry = true;
                    self.regs.set_aw(0, ptr);
                }
            }
            if matched || self.regs.dw(3) == self.regs.dw(4) {
                break;
            }
        }
        Ok(())
    }
}
