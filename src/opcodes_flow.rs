/// Control flow: branches, subroutine calls, Scc/DBcc and Line-F shortcuts
use crate::error::EmuError;
use crate::header::Version;
use crate::host::Host;
use crate::instruction::Opcode;
use crate::interpreter::Interpreter;
use crate::registers::Size;
use log::{debug, trace};

impl<H: Host> Interpreter<H> {
    /// 0x50-0x5F: Scc and DBcc, otherwise ADDQ/SUBQ
    pub(crate) fn execute_quick(&mut self, op: Opcode) -> Result<(), EmuError> {
        if op.byte2 & 0xc0 != 0xc0 {
            return self.quick_arith(op);
        }
        let ea = self.vm.resolve_field(op.byte2 & 0x3f, Size::Byte)?;
        let taken = self.vm.flags.condition(op.condition());
        if ea.is_address_register() {
            // DBcc: the address-register mode field names a data register
            if taken {
                self.vm.pc = self.vm.pc.wrapping_add(2);
                return Ok(());
            }
            let reg = op.lower_reg();
            let count = self.vm.regs.dw(reg).wrapping_sub(1);
            self.vm.regs.set_dw(reg, count);
            if count != 0xffff {
                self.vm.branch(0)
            } else {
                self.vm.pc = self.vm.pc.wrapping_add(2);
                Ok(())
            }
        } else {
            self.vm.write_ea(&ea, if taken { 0xff } else { 0 })
        }
    }

    /// 0x60/0x61: BRA and BSR
    pub(crate) fn execute_bra_bsr(&mut self, op: Opcode) -> Result<(), EmuError> {
        if op.byte1 == 0x61 {
            self.push_return(op)?;
        } else if op.byte2 == 0xfe {
            // branch to self: the game has finished
            debug!("BRA.S * at {:06x}, stopping", op.pc);
            self.host.flush_output()?;
            self.vm.stop();
        }
        self.vm.branch(op.byte2)
    }

    /// 0x62-0x6F
    pub(crate) fn execute_bcc(&mut self, op: Opcode) -> Result<(), EmuError> {
        if self.vm.flags.condition(op.condition()) {
            self.vm.branch(op.byte2)
        } else {
            if op.byte2 == 0 {
                self.vm.pc = self.vm.pc.wrapping_add(2);
            }
            Ok(())
        }
    }

    /// Return address past a possible word displacement
    fn push_return(&mut self, op: Opcode) -> Result<(), EmuError> {
        let ret = if op.byte2 == 0 {
            self.vm.pc.wrapping_add(2)
        } else {
            self.vm.pc
        };
        self.vm.push(ret)
    }

    pub(crate) fn execute_rts(&mut self) -> Result<(), EmuError> {
        self.vm.pc = self.vm.pop()?;
        Ok(())
    }

    /// 0xA4: BSR without the BRA variant
    pub(crate) fn execute_short_bsr(&mut self, op: Opcode) -> Result<(), EmuError> {
        self.push_return(op)?;
        self.vm.branch(op.byte2)
    }

    /// 0xA6: TST
    pub(crate) fn execute_short_tst(&mut self, op: Opcode) -> Result<(), EmuError> {
        if op.byte2 & 0xc0 == 0xc0 {
            return Err(self.unimplemented(op, "LINE_A #$6C0-#$6FF"));
        }
        let size = self.vm.field_size(op.byte2)?;
        let src = self.vm.resolve_field(op.byte2, size)?;
        let value = self.vm.read_ea(&src)?;
        self.vm.flags.carry = false;
        self.vm.flags.overflow = false;
        self.vm.flags.set_nz(value, size);
        Ok(())
    }

    /// 0x4E: RTS, NOP, JMP, JSR
    pub(crate) fn execute_jump_group(&mut self, op: Opcode) -> Result<(), EmuError> {
        match op.byte2 {
            0x75 => self.execute_rts(),
            0x71 => Ok(()),
            b if b & 0xc0 == 0xc0 => {
                let ea = self.vm.resolve_field(b, Size::Long)?;
                self.vm.pc = self.vm.require_address(&ea, "JMP")?;
                Ok(())
            }
            b if b & 0xc0 == 0x80 => {
                let ea = self.vm.resolve_field(b, Size::Long)?;
                let target = self.vm.require_address(&ea, "JSR")?;
                self.vm.push(self.vm.pc)?;
                trace!("jsr {target:06x}");
                self.vm.pc = target;
                Ok(())
            }
            _ => Err(self.unimplemented(op, "0x4EXX")),
        }
    }

    /// 0xF0-0xFF: compact calls through the tables set up by A0FD
    pub(crate) fn execute_line_f(&mut self, op: Opcode) -> Result<(), EmuError> {
        match self.vm.version() {
            Version::V0 => {
                let c = self.vm.regs.db(1);
                self.char_out(c)
            }
            Version::V1 => {
                self.vm.push(self.vm.pc)?;
                self.vm.pc = self.vm.tables.fl_sub as u32;
                Ok(())
            }
            _ => {
                let tables = self.vm.tables;
                let index = (((op.byte1 & 7) as u16) << 8) | op.byte2 as u16;
                if index >= tables.fl_size {
                    if op.byte1 & 8 == 0 {
                        self.vm.push(self.vm.pc)?;
                    }
                    let entry = u16::from_be_bytes([op.byte1, op.byte2]) | 0x0800;
                    let ptr = tables.fl_tab.wrapping_add((entry ^ 0xffff).wrapping_mul(2));
                    let offset = self.vm.read16(ptr as u32)? as i16;
                    self.vm.pc = (ptr as u32).wrapping_add(offset as i32 as u32);
                    trace!("line-f {:04x} via {ptr:04x} -> {:06x}", op.word(), self.vm.pc);
                } else {
                    self.vm.push(self.vm.pc)?;
                    self.vm.pc = tables.fl_sub as u32;
                }
                Ok(())
            }
        }
    }
}
