use crate::error::EmuError;
use crate::hints::Hint;
use crate::host::{Host, PictureRef};
use crate::instruction::Opcode;
use crate::opcode_tables::OpGroup;
use crate::registers::Size;
use crate::vm::VM;
use log::{debug, error, info, trace};

/// Player-visible messages of the undo key
pub const UNDO_OK: &str = "\n[Previous turn undone.]";
pub const UNDO_FAIL: &str = "\n[You can't \"undo\" what hasn't been done!]";

/// The main interpreter: a machine plus the host it talks to
pub struct Interpreter<H: Host> {
    /// The VM state
    pub vm: VM,
    /// Front end receiving output and supplying input
    pub host: H,
    /// Hint tree for the hints window, if one was loaded
    pub hints: Option<Vec<Hint>>,
}

impl<H: Host> Interpreter<H> {
    /// Create a new interpreter
    pub fn new(vm: VM, host: H) -> Self {
        Interpreter {
            vm,
            host,
            hints: None,
        }
    }

    pub fn set_hints(&mut self, hints: Vec<Hint>) {
        debug!("{} hint nodes attached", hints.len());
        self.hints = Some(hints);
    }

    /// Execute exactly one instruction. Returns whether the machine is still
    /// running. A fatal error stops the machine, is reported to the host once
    /// and handed back to the caller.
    pub fn step(&mut self) -> Result<bool, EmuError> {
        if !self.vm.running {
            return Ok(false);
        }
        match self.execute_next() {
            Ok(()) => Ok(self.vm.running),
            Err(e) => {
                error!("{e}");
                self.vm.running = false;
                self.host.fatal(&e.to_string());
                Err(e)
            }
        }
    }

    fn execute_next(&mut self) -> Result<(), EmuError> {
        if self.vm.pc == self.vm.game.header.undo_pc {
            self.vm.save_undo();
        }
        self.vm.instruction_count = self.vm.instruction_count.wrapping_add(1);
        self.vm.current_instruction_pc = self.vm.pc;
        let op = self.vm.fetch()?;
        trace!("{op}");
        self.execute(op)
    }

    /// Dispatch one fetched opcode to its group handler
    pub fn execute(&mut self, op: Opcode) -> Result<(), EmuError> {
        match op.group() {
            OpGroup::Immediate => self.execute_immediate(op),
            OpGroup::MoveByte => self.execute_move(op, Size::Byte),
            OpGroup::MoveWord => self.execute_move(op, Size::Word),
            OpGroup::MoveLong => self.execute_move(op, Size::Long),
            OpGroup::Misc => self.execute_misc(op),
            OpGroup::QuickScc => self.execute_quick(op),
            OpGroup::BraBsr => self.execute_bra_bsr(op),
            OpGroup::Bcc => self.execute_bcc(op),
            OpGroup::Moveq => self.execute_moveq(op),
            OpGroup::OrDiv => self.execute_or_group(op),
            OpGroup::Sub => self.execute_add_sub_group(op, true),
            OpGroup::LineA => self.execute_line_a(op),
            OpGroup::Rts => self.execute_rts(),
            OpGroup::Bsr => self.execute_short_bsr(op),
            OpGroup::Tst => self.execute_short_tst(op),
            OpGroup::MovemStore => self.movem_store(op),
            OpGroup::MovemLoad => self.movem_load(op),
            OpGroup::CmpEor => self.execute_cmp_eor_group(op),
            OpGroup::AndExg => self.execute_and_exg_group(op),
            OpGroup::Add => self.execute_add_sub_group(op, false),
            OpGroup::Shift => self.execute_shift(op),
            OpGroup::LineF => self.execute_line_f(op),
        }
    }

    /// Run until the machine stops or `max_instructions` have executed
    pub fn run_with_limit(&mut self, max_instructions: Option<u64>) -> Result<(), EmuError> {
        info!("Starting interpreter at pc {:06x}", self.vm.pc);
        let mut executed: u64 = 0;
        while self.step()? {
            executed += 1;
            if let Some(max) = max_instructions {
                if executed >= max {
                    info!("Instruction limit of {max} reached");
                    break;
                }
            }
        }
        self.host.flush_output()?;
        info!("Interpreter stopped after {executed} instructions");
        Ok(())
    }

    pub fn run(&mut self) -> Result<(), EmuError> {
        self.run_with_limit(None)
    }

    /// Flush pending output and roll back one turn
    pub fn undo(&mut self) -> Result<bool, EmuError> {
        self.host.flush_output()?;
        Ok(self.vm.restore_undo())
    }

    /// Restart from the pristine image and clear the picture
    pub fn restart(&mut self) -> Result<(), EmuError> {
        self.vm.restart();
        self.host.show_picture(PictureRef::Number(0), 0)?;
        Ok(())
    }

    /// Send text straight to the host, bypassing the output filter
    pub fn output_text(&mut self, text: &str) -> Result<(), EmuError> {
        for b in text.bytes() {
            self.host.output_char(b)?;
        }
        Ok(())
    }

    pub(crate) fn unimplemented(&self, op: Opcode, what: &'static str) -> EmuError {
        EmuError::Unimplemented {
            pc: op.pc,
            opcode: op.word(),
            what,
        }
    }
}
