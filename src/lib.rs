pub mod config;
pub mod dictionary;
pub mod ea;
pub mod error;
pub mod flags;
pub mod header;
pub mod hints;
pub mod host;
pub mod host_headless;
pub mod host_terminal;
pub mod instruction;
pub mod interpreter;
pub mod line_a;
pub mod memory;
pub mod msrand;
pub mod opcode_tables;
pub mod opcodes_bits;
pub mod opcodes_flow;
pub mod opcodes_math;
pub mod opcodes_memory;
pub mod opcodes_shift;
pub mod properties;
pub mod registers;
pub mod text;
pub mod undo;
pub mod vm;

#[cfg(test)]
pub(crate) mod test_utils;

#[cfg(test)]
mod dictionary_tests;
#[cfg(test)]
mod flow_tests;
#[cfg(test)]
mod math_tests;
