//! Builders for synthetic game images used by the unit tests

use crate::header::{HEADER_SIZE, MAGIC};
use crate::host_headless::HeadlessHost;
use crate::interpreter::Interpreter;
use crate::msrand::MsRand;
use crate::vm::{Game, VM};

/// Assembles a `.mag` file from its sections
pub struct ImageBuilder {
    version: u8,
    code: Vec<u8>,
    strings1: Vec<u8>,
    strings2: Vec<u8>,
    dictionary: Vec<u8>,
    decode_offset: u32,
    undo_size: u32,
    undo_pc: u32,
}

impl ImageBuilder {
    pub fn new(version: u8) -> Self {
        ImageBuilder {
            version,
            code: Vec::new(),
            strings1: vec![0; 0x200],
            strings2: Vec::new(),
            dictionary: Vec::new(),
            decode_offset: 0,
            undo_size: 0x100,
            undo_pc: 0xffff_fff0,
        }
    }

    pub fn code(mut self, code: &[u8]) -> Self {
        self.code = code.to_vec();
        self
    }

    pub fn strings(mut self, bank1: &[u8], bank2: &[u8]) -> Self {
        self.strings1 = bank1.to_vec();
        self.strings2 = bank2.to_vec();
        self
    }

    pub fn dictionary(mut self, dictionary: &[u8]) -> Self {
        self.dictionary = dictionary.to_vec();
        self
    }

    pub fn decode_offset(mut self, offset: u32) -> Self {
        self.decode_offset = offset;
        self
    }

    pub fn undo(mut self, size: u32, pc: u32) -> Self {
        self.undo_size = size;
        self.undo_pc = pc;
        self
    }

    pub fn build(self) -> Vec<u8> {
        let mut out = Vec::with_capacity(HEADER_SIZE + self.code.len());
        out.extend_from_slice(&MAGIC.to_be_bytes());
        out.extend_from_slice(&[0; 4]);
        out.extend_from_slice(&(HEADER_SIZE as u32).to_be_bytes());
        out.push(0);
        out.push(self.version);
        for field in [
            self.code.len() as u32,
            self.strings1.len() as u32,
            self.strings2.len() as u32,
            self.dictionary.len() as u32,
            self.decode_offset,
            self.undo_size,
            self.undo_pc,
        ] {
            out.extend_from_slice(&field.to_be_bytes());
        }
        out.extend_from_slice(&self.code);
        out.extend_from_slice(&self.strings1);
        out.extend_from_slice(&self.strings2);
        out.extend_from_slice(&self.dictionary);
        out
    }
}

/// VM with `code` loaded at address 0 and a fixed random seed.
/// Version 4 images get a full 64 KiB of memory.
pub fn vm_with_code(version: u8, code: &[u8]) -> VM {
    vm_from_image(ImageBuilder::new(version).code(&padded(version, code)).build())
}

pub fn vm_from_image(image: Vec<u8>) -> VM {
    let game = Game::from_memory(image).unwrap();
    VM::with_rng(game, MsRand::new_predictable(1234))
}

pub fn interpreter_with_code(version: u8, code: &[u8]) -> Interpreter<HeadlessHost> {
    Interpreter::new(vm_with_code(version, code), HeadlessHost::new())
}

pub fn interpreter_from_image(image: Vec<u8>) -> Interpreter<HeadlessHost> {
    Interpreter::new(vm_from_image(image), HeadlessHost::new())
}

fn padded(version: u8, code: &[u8]) -> Vec<u8> {
    let mut code = code.to_vec();
    if version >= 4 && code.len() < 0x10000 {
        code.resize(0x10000, 0);
    }
    code
}
