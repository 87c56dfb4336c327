use crate::{memory::Memory, static_assert, Address, Byte};

pub const ENTRY_POINT: Address = 0x00;
/// Initial value of the stack pointer. The stack grows downwards from here.
pub const STACK_TOP: Byte = 0xF4;

const _: () = static_assert((STACK_TOP as usize) < Memory::SIZE);
