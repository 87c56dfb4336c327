#![allow(non_upper_case_globals)]

use crate::address_constants::STACK_TOP;
use crate::alu::{self, AluOperation, AluResult, AluSupport};
use crate::console::{Console, Output};
use crate::error::Fault;
use crate::memory::Memory;
use crate::opcodes::{Instruction, Opcode};
use crate::{Address, Byte, Register};
use bitflags::bitflags;
use int_enum::IntEnum;

bitflags! {
    /// Outcome of the most recent `CMP`. All bits are clear until the first comparison.
    #[derive(Default)]
    pub struct Flag: Byte {
        const Equal = 0b1 << 0;
        const GreaterThan = 0b1 << 1;
        const LessThan = 0b1 << 2;
    }
}

impl Flag {
    /// Unsigned comparison, sets exactly one bit.
    pub fn compare(lhs: Byte, rhs: Byte) -> Self {
        match lhs.cmp(&rhs) {
            std::cmp::Ordering::Less => Self::LessThan,
            std::cmp::Ordering::Equal => Self::Equal,
            std::cmp::Ordering::Greater => Self::GreaterThan,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Registers([Byte; Processor::NUM_REGISTERS]);

impl Registers {
    fn new() -> Self {
        let mut registers = [0; Processor::NUM_REGISTERS];
        registers[Processor::STACK_POINTER.0 as usize] = STACK_TOP;
        Self(registers)
    }

    fn index_of(register: Register) -> Result<usize, Fault> {
        let index = register.0 as usize;
        if index < Processor::NUM_REGISTERS {
            Ok(index)
        } else {
            Err(Fault::RegisterIndex { index: register.0 })
        }
    }

    pub fn get(&self, register: Register) -> Result<Byte, Fault> {
        Ok(self.0[Self::index_of(register)?])
    }

    /// Stores `value` modulo 256.
    pub fn set(&mut self, register: Register, value: impl Into<i64>) -> Result<(), Fault> {
        let index = Self::index_of(register)?;
        let value: i64 = value.into();
        self.0[index] = value.rem_euclid(1 << Byte::BITS) as Byte;
        Ok(())
    }

    pub fn as_array(&self) -> [Byte; Processor::NUM_REGISTERS] {
        self.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tick {
    Running,
    Halted,
}

/// What a handler wants to happen to the program counter.
enum Flow {
    Continue,
    Jump(Address),
    Halt,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct Operands {
    a: Byte,
    b: Byte,
}

pub struct Processor {
    registers: Registers,
    flags: Flag,
    program_counter: Address,
    alu_support: AluSupport,
}

impl Processor {
    pub const NUM_REGISTERS: usize = 8;
    pub const STACK_POINTER: Register = Register((Self::NUM_REGISTERS - 1) as _);
    pub const MAX_OPERANDS: usize = 3;

    pub fn new(alu_support: AluSupport) -> Self {
        Self {
            registers: Registers::new(),
            flags: Flag::empty(),
            program_counter: crate::address_constants::ENTRY_POINT,
            alu_support,
        }
    }

    pub fn registers(&self) -> &Registers {
        &self.registers
    }

    pub fn flags(&self) -> Flag {
        self.flags
    }

    pub fn program_counter(&self) -> Address {
        self.program_counter
    }

    pub fn stack_pointer(&self) -> Byte {
        self.registers.0[Self::STACK_POINTER.0 as usize]
    }

    pub fn stack_push(&mut self, memory: &mut Memory, value: Byte) -> Result<(), Fault> {
        let stack_pointer = self
            .stack_pointer()
            .checked_sub(1)
            .ok_or(Fault::StackOverflow)?;
        memory.write(stack_pointer as Address, value)?;
        self.registers.set(Self::STACK_POINTER, stack_pointer)
    }

    pub fn stack_pop(&mut self, memory: &Memory) -> Result<Byte, Fault> {
        let stack_pointer = self.stack_pointer();
        if stack_pointer >= STACK_TOP {
            return Err(Fault::StackUnderflow);
        }
        let value = memory.read(stack_pointer as Address)?;
        self.registers.set(Self::STACK_POINTER, stack_pointer + 1)?;
        Ok(value)
    }

    fn advance_program_counter(&mut self, opcode: Opcode) {
        self.program_counter = self.next_instruction_address(opcode);
    }

    fn next_instruction_address(&self, opcode: Opcode) -> Address {
        self.program_counter + opcode.length() as Address
    }

    fn address_in(&self, register: Byte) -> Result<Address, Fault> {
        Ok(self.registers.get(register.into())? as Address)
    }

    fn fetch_operands(&self, memory: &Memory, opcode: Opcode) -> Result<Operands, Fault> {
        let mut operands = [0; Self::MAX_OPERANDS];
        for (offset, operand) in operands
            .iter_mut()
            .take(opcode.operand_count as usize)
            .enumerate()
        {
            *operand = memory.read(self.program_counter + 1 + offset as Address)?;
        }
        Ok(Operands {
            a: operands[0],
            b: operands[1],
        })
    }

    /// Fetches, decodes and executes the instruction at the program counter.
    ///
    /// On error the program counter still points at the faulting instruction.
    pub fn make_tick(&mut self, memory: &mut Memory, console: &mut Console) -> Result<Tick, Fault> {
        let opcode_byte = memory.read(self.program_counter)?;
        let opcode = Opcode::decode(opcode_byte);
        let operands = self.fetch_operands(memory, opcode)?;
        let unsupported = Fault::UnsupportedOpcode {
            opcode: opcode_byte,
        };
        let instruction = Instruction::try_from(opcode_byte)?;

        let flow = if opcode.is_alu {
            let operation =
                AluOperation::from_int(opcode.instruction_id).map_err(|_| unsupported)?;
            if !self.alu_support.supports(operation) {
                return Err(unsupported);
            }
            self.execute_alu(operation, operands)?
        } else {
            self.execute(instruction, opcode, operands, memory, console)?
        };

        match flow {
            Flow::Continue => {
                debug_assert!(!opcode.sets_pc);
                self.advance_program_counter(opcode);
            }
            Flow::Jump(target) => {
                debug_assert!(opcode.sets_pc);
                self.program_counter = target;
            }
            Flow::Halt => return Ok(Tick::Halted),
        }
        Ok(Tick::Running)
    }

    fn execute_alu(&mut self, operation: AluOperation, operands: Operands) -> Result<Flow, Fault> {
        let target = Register(operands.a);
        let lhs = self.registers.get(target)?;
        let rhs = match operation.operand_count() {
            1 => 0,
            _ => self.registers.get(operands.b.into())?,
        };
        match alu::execute(operation, lhs, rhs)? {
            AluResult::Value(value) => self.registers.set(target, value)?,
            AluResult::Comparison(flags) => self.flags = flags,
        }
        Ok(Flow::Continue)
    }

    fn execute(
        &mut self,
        instruction: Instruction,
        opcode: Opcode,
        operands: Operands,
        memory: &mut Memory,
        console: &mut Console,
    ) -> Result<Flow, Fault> {
        use Instruction::*;
        let Operands { a, b } = operands;
        let next = self.next_instruction_address(opcode);
        let flow = match instruction {
            NoOp => Flow::Continue,
            Halt => Flow::Halt,
            LoadImmediate => {
                self.registers.set(a.into(), b)?;
                Flow::Continue
            }
            Load => {
                let value = memory.read(self.address_in(b)?)?;
                self.registers.set(a.into(), value)?;
                Flow::Continue
            }
            Store => {
                let address = self.address_in(a)?;
                memory.write(address, self.registers.get(b.into())?)?;
                Flow::Continue
            }
            PrintNumber => {
                console.print(Output::Decimal(self.registers.get(a.into())?));
                Flow::Continue
            }
            PrintCharacter => {
                console.print(Output::Character(self.registers.get(a.into())?));
                Flow::Continue
            }
            Push => {
                let value = self.registers.get(a.into())?;
                self.stack_push(memory, value)?;
                Flow::Continue
            }
            Pop => {
                let value = self.stack_pop(memory)?;
                self.registers.set(a.into(), value)?;
                Flow::Continue
            }
            Call => {
                let target = self.address_in(a)?;
                let return_address =
                    Byte::try_from(next).map_err(|_| Fault::OutOfRange { address: next })?;
                self.stack_push(memory, return_address)?;
                Flow::Jump(target)
            }
            Return => Flow::Jump(self.stack_pop(memory)? as Address),
            Jump => Flow::Jump(self.address_in(a)?),
            JumpIfEqual => self.jump_if(self.flags.contains(Flag::Equal), a, next)?,
            JumpIfNotEqual => self.jump_if(!self.flags.contains(Flag::Equal), a, next)?,
            JumpIfGreaterThan => self.jump_if(self.flags.contains(Flag::GreaterThan), a, next)?,
            JumpIfLessThan => self.jump_if(self.flags.contains(Flag::LessThan), a, next)?,
            JumpIfLessThanOrEqual => {
                self.jump_if(self.flags.intersects(Flag::LessThan | Flag::Equal), a, next)?
            }
            JumpIfGreaterThanOrEqual => {
                self.jump_if(self.flags.intersects(Flag::GreaterThan | Flag::Equal), a, next)?
            }
            Add | Subtract | Multiply | Divide | Modulo | Increment | Decrement | Compare | And
            | Not | Or | Xor | ShiftLeft | ShiftRight => {
                unreachable!("ALU instructions are routed through execute_alu")
            }
        };
        Ok(flow)
    }

    fn jump_if(&self, condition: bool, register: Byte, next: Address) -> Result<Flow, Fault> {
        if condition {
            Ok(Flow::Jump(self.address_in(register)?))
        } else {
            Ok(Flow::Jump(next))
        }
    }
}
