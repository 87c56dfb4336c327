//! An emulator for the LS-8, a tiny 8-bit register machine.
//!
//! Programs are text files with one binary literal per line (see [`loader`]). A [`Machine`]
//! owns memory, registers and flags exclusively and executes one instruction per
//! [`Machine::step`].

pub mod address_constants;
pub mod alu;
pub mod console;
pub mod dumper;
pub mod error;
pub mod loader;
pub mod machine;
pub mod memory;
pub mod opcodes;
pub mod processor;

pub use console::{Console, Output};
pub use error::{ExecutionError, Fault, LoadError};
pub use machine::{Machine, MachineConfig, Outcome, State};

pub type Byte = u8;
pub type Address = u16;

pub const fn static_assert(condition: bool) {
    assert!(condition);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Register(pub u8);

impl From<u8> for Register {
    fn from(value: u8) -> Self {
        Self(value)
    }
}
