//! Two-slot undo history
//!
//! A snapshot is taken every time execution reaches the turn-boundary PC.
//! Slot 0 holds the older snapshot, slot 1 the newest. Restoring always goes
//! back to the older one, i.e. to the start of the previous turn, because the
//! newest snapshot was taken at the start of the turn being undone.
//! Condition flags are not part of a snapshot.

use crate::registers::Registers;
use log::debug;

#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub memory: Vec<u8>,
    pub regs: Registers,
    pub instruction_count: u32,
    pub pc: u32,
}

#[derive(Debug, Clone, Default)]
pub struct UndoRing {
    slots: [Snapshot; 2],
    valid: [bool; 2],
}

impl UndoRing {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn save(&mut self, memory: &[u8], regs: &Registers, instruction_count: u32, pc: u32) {
        self.slots.swap(0, 1);
        let newest = &mut self.slots[1];
        newest.memory.clear();
        newest.memory.extend_from_slice(memory);
        newest.regs = regs.clone();
        newest.instruction_count = instruction_count;
        newest.pc = pc;
        self.valid[0] = self.valid[1];
        self.valid[1] = true;
        debug!("undo: snapshot at pc {pc:06x}, count {instruction_count}");
    }

    /// True when a restore would succeed
    pub fn has_history(&self) -> bool {
        self.valid[0]
    }

    /// Hand out the older snapshot and consume both slots, so a second undo
    /// needs another turn boundary first.
    pub fn take_previous(&mut self) -> Option<&Snapshot> {
        if !self.valid[0] {
            return None;
        }
        self.valid = [false, false];
        Some(&self.slots[0])
    }

    pub fn clear(&mut self) {
        self.valid = [false, false];
    }
}
