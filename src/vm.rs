use crate::error::EmuError;
use crate::flags::Flags;
use crate::header::{Header, Version, HEADER_SIZE};
use crate::instruction::Opcode;
use crate::memory::{Addr, Memory};
use crate::msrand::MsRand;
use crate::properties::PropertyTables;
use crate::registers::{Registers, Size, SP};
use crate::text::{OutputFilter, StringCursor};
use crate::undo::UndoRing;
use log::{debug, info};
use std::fmt::Write;

/// Initial stack pointer, two below the top of a 64 KiB segment
pub const INITIAL_SP: u32 = 0xfffe;

/// Represents a loaded game image with owned memory and banks
pub struct Game {
    /// The parsed header
    pub header: Header,
    /// Code and data, the only region reachable through addressing modes
    pub memory: Memory,
    /// String bank 1 followed by string bank 2
    pub strings: Vec<u8>,
    /// Separate dictionary bank, if the image has one
    pub dictionary: Option<Vec<u8>>,
    /// Pristine copy of the first `undo_size` bytes for fast restarts
    restart_image: Vec<u8>,
}

fn take<'a>(bytes: &'a [u8], offset: &mut usize, len: u32, what: &str) -> Result<&'a [u8], EmuError> {
    let start = *offset;
    let end = start
        .checked_add(len as usize)
        .ok_or_else(|| EmuError::BadImage(format!("{what} size overflows")))?;
    let slice = bytes
        .get(start..end)
        .ok_or_else(|| EmuError::BadImage(format!("file truncated in {what}")))?;
    *offset = end;
    Ok(slice)
}

impl Game {
    /// Create a new game from the bytes of a `.mag` file
    pub fn from_memory(bytes: Vec<u8>) -> Result<Self, EmuError> {
        let header = Header::new(&bytes)?;
        let mut offset = HEADER_SIZE;

        let code = take(&bytes, &mut offset, header.code_size, "code")?;
        let mut image = vec![0u8; header.mem_size()];
        image[..code.len()].copy_from_slice(code);

        let mut strings = take(&bytes, &mut offset, header.string_size, "string bank 1")?.to_vec();
        strings.extend_from_slice(take(&bytes, &mut offset, header.string2_size, "string bank 2")?);

        let dictionary = if header.has_dictionary() {
            Some(take(&bytes, &mut offset, header.dict_size, "dictionary")?.to_vec())
        } else {
            None
        };

        if header.decode_offset as usize >= strings.len() {
            return Err(EmuError::BadImage(format!(
                "decode table at {:#x} outside string banks",
                header.decode_offset
            )));
        }
        let undo_size = header.effective_undo_size();
        if undo_size > image.len() {
            return Err(EmuError::BadImage(format!(
                "undo size {undo_size:#x} larger than memory"
            )));
        }
        let restart_image = image[..undo_size].to_vec();
        let wrap16 = header.version < Version::V4 && image.len() == 0x10000;

        info!(
            "Loaded game: version {}, {} bytes of memory, {} bytes of strings{}",
            header.version.number(),
            image.len(),
            strings.len(),
            if dictionary.is_some() { ", separate dictionary" } else { "" }
        );

        Ok(Game {
            header,
            memory: Memory::new(image, wrap16),
            strings,
            dictionary,
            restart_image,
        })
    }

    pub fn version(&self) -> Version {
        self.header.version
    }

    /// Index of the decode table inside `strings`
    pub fn decode_offset(&self) -> usize {
        self.header.decode_offset as usize
    }

    pub fn string_size(&self) -> u32 {
        self.header.string_size
    }

    pub fn restart_image(&self) -> &[u8] {
        &self.restart_image
    }
}

/// The 68000-subset machine state
pub struct VM {
    /// The game being executed
    pub game: Game,
    /// D0-D7 and A0-A7
    pub regs: Registers,
    pub flags: Flags,
    /// Program counter, the next byte to fetch
    pub pc: u32,
    /// Address of the instruction being executed
    pub current_instruction_pc: u32,
    pub instruction_count: u32,
    pub running: bool,
    pub rng: MsRand,
    pub undo: UndoRing,
    /// Base pointers installed by the A0FD service
    pub tables: PropertyTables,
    /// Set by ADDQ/SUBQ to an address register; suppresses N/Z/V updates
    /// from version 3 on. Persists until the next ADD/SUB group opcode.
    pub(crate) quick_flag: bool,
    pub(crate) output: OutputFilter,
    pub(crate) string_cursor: StringCursor,
}

impl VM {
    /// Create a new VM instance with the given game
    pub fn new(game: Game) -> Self {
        VM::with_rng(game, MsRand::new_uniform())
    }

    pub fn with_rng(game: Game, rng: MsRand) -> Self {
        let mut vm = VM {
            game,
            regs: Registers::new(),
            flags: Flags::default(),
            pc: 0,
            current_instruction_pc: 0,
            instruction_count: 0,
            running: true,
            rng,
            undo: UndoRing::new(),
            tables: PropertyTables::default(),
            quick_flag: false,
            output: OutputFilter::default(),
            string_cursor: StringCursor::default(),
        };
        vm.reset_registers();
        vm
    }

    pub fn version(&self) -> Version {
        self.game.header.version
    }

    /// Registers, PC, flags and counter as they are right after loading
    pub fn reset_registers(&mut self) {
        self.regs.clear();
        self.regs.set_a(7, INITIAL_SP);
        self.pc = 0;
        self.flags.clear();
        self.instruction_count = 0;
        self.running = true;
    }

    pub fn read8(&self, addr: u32) -> Result<u8, EmuError> {
        self.game.memory.read8(Addr(addr))
    }

    pub fn read16(&self, addr: u32) -> Result<u16, EmuError> {
        self.game.memory.read16(Addr(addr))
    }

    pub fn read32(&self, addr: u32) -> Result<u32, EmuError> {
        self.game.memory.read32(Addr(addr))
    }

    pub fn write8(&mut self, addr: u32, value: u8) -> Result<(), EmuError> {
        self.game.memory.write8(Addr(addr), value)
    }

    pub fn write16(&mut self, addr: u32, value: u16) -> Result<(), EmuError> {
        self.game.memory.write16(Addr(addr), value)
    }

    pub fn write32(&mut self, addr: u32, value: u32) -> Result<(), EmuError> {
        self.game.memory.write32(Addr(addr), value)
    }

    /// Read a value of the given size from memory
    pub fn read_sized(&self, addr: u32, size: Size) -> Result<u32, EmuError> {
        match size {
            Size::Byte => self.read8(addr).map(u32::from),
            Size::Word => self.read16(addr).map(u32::from),
            Size::Long => self.read32(addr),
        }
    }

    pub fn write_sized(&mut self, addr: u32, size: Size, value: u32) -> Result<(), EmuError> {
        match size {
            Size::Byte => self.write8(addr, value as u8),
            Size::Word => self.write16(addr, value as u16),
            Size::Long => self.write32(addr, value),
        }
    }

    /// Fetch the next opcode word and advance the PC past it
    pub fn fetch(&mut self) -> Result<Opcode, EmuError> {
        let pc = self.pc;
        let byte1 = self.read8(pc)?;
        let byte2 = self.read8(pc.wrapping_add(1))?;
        self.pc = pc.wrapping_add(2);
        Ok(Opcode { pc, byte1, byte2 })
    }

    /// Read an extension word at the PC and advance past it
    pub fn fetch_extension(&mut self) -> Result<u16, EmuError> {
        let word = self.read16(self.pc)?;
        self.pc = self.pc.wrapping_add(2);
        Ok(word)
    }

    /// Push a long onto the A7 stack
    pub fn push(&mut self, value: u32) -> Result<(), EmuError> {
        let sp = self.regs.a(7).wrapping_sub(4);
        self.regs.write(SP, Size::Long, sp)?;
        self.write32(sp, value)
    }

    /// Pop a long from the A7 stack
    pub fn pop(&mut self) -> Result<u32, EmuError> {
        let sp = self.regs.a(7);
        let value = self.read32(sp)?;
        self.regs.write(SP, Size::Long, sp.wrapping_add(4))?;
        Ok(value)
    }

    /// Relative branch. A zero displacement byte means a 16-bit displacement
    /// follows, measured from that extension word.
    pub fn branch(&mut self, displacement: u8) -> Result<(), EmuError> {
        if displacement == 0 {
            let word = self.read16(self.pc)? as i16;
            self.pc = self.pc.wrapping_add(word as i32 as u32);
        } else {
            self.pc = self.pc.wrapping_add(displacement as i8 as i32 as u32);
        }
        Ok(())
    }

    pub fn save_undo(&mut self) {
        self.undo.save(
            self.game.memory.bytes(),
            &self.regs,
            self.instruction_count,
            self.pc,
        );
    }

    /// Roll back to the start of the previous turn. Flags keep their
    /// current values. Returns false when there is no history.
    pub fn restore_undo(&mut self) -> bool {
        let Some(snapshot) = self.undo.take_previous() else {
            debug!("undo: no history");
            return false;
        };
        let memory = self.game.memory.bytes_mut();
        let len = snapshot.memory.len().min(memory.len());
        memory[..len].copy_from_slice(&snapshot.memory[..len]);
        self.regs = snapshot.regs.clone();
        self.instruction_count = snapshot.instruction_count;
        self.pc = snapshot.pc;
        debug!("undo: restored pc {:06x}", self.pc);
        true
    }

    /// Reload the restart image, forget undo history and reset registers
    pub fn restart(&mut self) {
        let image = self.game.restart_image.clone();
        self.game.memory.bytes_mut()[..image.len()].copy_from_slice(&image);
        self.undo.clear();
        self.reset_registers();
        info!("Game restarted");
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn count(&self) -> u32 {
        self.instruction_count
    }

    pub fn is_magwin(&self) -> bool {
        self.version() == Version::V4
    }

    /// Register dump in the format of the engine's status report
    pub fn status(&self) -> String {
        let mut out = String::from("D0:");
        for n in 0..8 {
            let _ = write!(out, " {:08x}", self.regs.d(n));
        }
        out.push_str("\nA0:");
        for n in 0..8 {
            let _ = write!(out, " {:08x}", self.regs.a(n));
        }
        let _ = write!(
            out,
            "\nPC={:05x} ZCNV={} - {} instructions",
            self.pc,
            self.flags.zcnv(),
            self.instruction_count
        );
        out
    }
}
