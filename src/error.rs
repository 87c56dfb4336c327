use crate::{Address, Byte};
use thiserror::Error;

/// Everything that can stop a running machine.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum Fault {
    #[error("memory address {address:#06x} is out of range")]
    OutOfRange { address: Address },
    #[error("register index {index} is out of range")]
    RegisterIndex { index: u8 },
    #[error("division by zero")]
    DivisionByZero,
    #[error("unsupported opcode {opcode:#010b}")]
    UnsupportedOpcode { opcode: Byte },
    #[error("stack overflow")]
    StackOverflow,
    #[error("stack underflow")]
    StackUnderflow,
}

/// A fault together with the address of the instruction that raised it.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
#[error("{fault} at pc {pc:#04x}")]
pub struct ExecutionError {
    pub fault: Fault,
    pub pc: Address,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("line {line}: `{content}` is not an 8-digit binary literal")]
    Format { line: usize, content: String },
    #[error("program of {size} bytes does not fit into memory")]
    ProgramTooLarge { size: usize },
    #[error("cannot load a program after execution has started")]
    AlreadyStarted,
    #[error("could not read program: {0}")]
    Io(#[from] std::io::Error),
}
