//! Effective address resolution
//!
//! `resolve` turns a mode/register pair into an operand, applying the
//! side effects of the mode (post-increment, pre-decrement, extension word
//! fetches). Register operands have no address: LEA, PEA, JMP and JSR reject
//! them.

use crate::error::EmuError;
use crate::registers::Size;
use crate::vm::VM;
use log::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
    /// Register slot 0-15
    Register(usize),
    /// Memory at an effective address
    Memory(u32),
    /// Constant produced by the decoder itself (quick values, NOT mask)
    Value(u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ea {
    pub operand: Operand,
    pub size: Size,
    /// Addressing mode the operand came from
    pub mode: u8,
}

impl Ea {
    pub fn register(index: usize, size: Size) -> Ea {
        Ea {
            operand: Operand::Register(index),
            size,
            mode: if index < 8 { 0 } else { 1 },
        }
    }

    pub fn value(value: u32, size: Size) -> Ea {
        Ea {
            operand: Operand::Value(value),
            size,
            mode: 7,
        }
    }

    pub fn memory(addr: u32, size: Size) -> Ea {
        Ea {
            operand: Operand::Memory(addr),
            size,
            mode: 2,
        }
    }

    /// Same location, different width
    pub fn with_size(self, size: Size) -> Ea {
        Ea { size, ..self }
    }

    pub fn address(&self) -> Option<u32> {
        match self.operand {
            Operand::Memory(addr) => Some(addr),
            _ => None,
        }
    }

    pub fn is_address_register(&self) -> bool {
        self.mode == 1
    }
}

impl VM {
    /// Decode the size bits (7-6) of an effective-address field
    pub fn field_size(&self, field: u8) -> Result<Size, EmuError> {
        Size::from_bits(field >> 6).ok_or(EmuError::IllegalAddressing {
            pc: self.current_instruction_pc,
            what: "size field",
        })
    }

    /// Resolve the mode (bits 5-3) and register (bits 2-0) of `field`
    pub fn resolve_field(&mut self, field: u8, size: Size) -> Result<Ea, EmuError> {
        self.resolve((field >> 3) & 7, field & 7, size)
    }

    pub fn resolve(&mut self, mode: u8, reg: u8, size: Size) -> Result<Ea, EmuError> {
        let reg = reg as usize & 7;
        let memory = |addr: u32| Ea {
            operand: Operand::Memory(addr),
            size,
            mode,
        };
        let ea = match mode {
            0 => Ea::register(reg, size),
            1 => Ea::register(8 + reg, size),
            2 => memory(self.regs.a(reg)),
            3 => {
                let addr = self.regs.a(reg);
                self.regs.set_a(reg, addr.wrapping_add(size.bytes()));
                memory(addr)
            }
            4 => {
                let addr = self.regs.a(reg).wrapping_sub(size.bytes());
                self.regs.set_a(reg, addr);
                memory(addr)
            }
            5 => {
                let disp = self.fetch_extension()? as i16 as i32 as u32;
                memory(self.regs.a(reg).wrapping_add(disp))
            }
            6 => {
                let ext = self.fetch_extension()?;
                let base = self.regs.a(reg);
                memory(base.wrapping_add(self.indexed_offset(ext)?))
            }
            _ => self.resolve_special(reg as u8, size)?,
        };
        trace!("ea mode {mode} reg {reg} -> {:?}", ea.operand);
        Ok(ea)
    }

    /// Index register plus 8-bit displacement from a brief extension word
    fn indexed_offset(&self, ext: u16) -> Result<u32, EmuError> {
        let [hi, lo] = ext.to_be_bytes();
        let index_reg = (hi >> 4) as usize;
        let index = if hi & 0x08 != 0 {
            self.regs.read(index_reg, Size::Long)?
        } else {
            Size::Word.sign_extend(self.regs.read(index_reg, Size::Word)?)
        };
        Ok(index.wrapping_add(lo as i8 as i32 as u32))
    }

    fn resolve_special(&mut self, reg: u8, size: Size) -> Result<Ea, EmuError> {
        let pc = self.pc;
        let addr = match reg {
            // absolute short, not sign extended
            0 => self.fetch_extension()? as u32,
            1 => {
                let addr = self.read32(pc)?;
                self.pc = pc.wrapping_add(4);
                addr
            }
            2 => {
                let disp = self.fetch_extension()? as i16 as i32 as u32;
                pc.wrapping_add(disp)
            }
            3 => {
                let ext = self.fetch_extension()?;
                pc.wrapping_add(self.indexed_offset(ext)?)
            }
            4 => return Ok(self.immediate(size)),
            _ => {
                return Err(EmuError::IllegalAddressing {
                    pc: self.current_instruction_pc,
                    what: "mode 7 register 5-7",
                })
            }
        };
        Ok(Ea {
            operand: Operand::Memory(addr),
            size,
            mode: 7,
        })
    }

    /// Immediate data inline at the PC. A byte immediate lives in the low
    /// half of its extension word.
    pub fn immediate(&mut self, size: Size) -> Ea {
        let pc = self.pc;
        let addr = if size == Size::Byte { pc.wrapping_add(1) } else { pc };
        self.pc = pc.wrapping_add(if size == Size::Long { 4 } else { 2 });
        Ea {
            operand: Operand::Memory(addr),
            size,
            mode: 7,
        }
    }

    /// Address yielded by an operand, fatal for registers and constants
    pub fn require_address(&self, ea: &Ea, what: &'static str) -> Result<u32, EmuError> {
        ea.address().ok_or(EmuError::IllegalAddressing {
            pc: self.current_instruction_pc,
            what,
        })
    }

    pub fn read_ea(&self, ea: &Ea) -> Result<u32, EmuError> {
        match ea.operand {
            Operand::Register(index) => self.regs.read(index, ea.size),
            Operand::Memory(addr) => self.read_sized(addr, ea.size),
            Operand::Value(value) => Ok(value & ea.size.mask()),
        }
    }

    pub fn write_ea(&mut self, ea: &Ea, value: u32) -> Result<(), EmuError> {
        match ea.operand {
            Operand::Register(index) => self.regs.write(index, ea.size, value),
            Operand::Memory(addr) => self.write_sized(addr, ea.size, value),
            Operand::Value(_) => Err(EmuError::IllegalAddressing {
                pc: self.current_instruction_pc,
                what: "write to constant",
            }),
        }
    }
}
