use std::fmt;

use crate::address_constants::ENTRY_POINT;
use crate::alu::AluSupport;
use crate::console::Console;
use crate::dumper::{Snapshot, Status};
use crate::error::{ExecutionError, LoadError};
use crate::memory::Memory;
use crate::opcodes::Opcode;
use crate::processor::{Flag, Processor, Registers, Tick};
use crate::{Address, Byte};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MachineConfig {
    /// Stop [`Machine::run`] after this many executed instructions.
    pub max_cycles: Option<u64>,
    /// Emit a [`TraceRecord`] on the `ls8::trace` target before every instruction.
    pub trace: bool,
    pub alu: AluSupport,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum State {
    Ready,
    Running,
    Halted,
    Faulted(ExecutionError),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Halted,
    CycleLimitReached,
}

/// Machine state right before an instruction executes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TraceRecord {
    pub program_counter: Address,
    pub opcode: Byte,
    pub operands: [Option<Byte>; 2],
    pub registers: [Byte; Processor::NUM_REGISTERS],
}

impl fmt::Display for TraceRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TRACE: {:02X} | {:02X}", self.program_counter, self.opcode)?;
        for operand in self.operands {
            match operand {
                Some(operand) => write!(f, " {operand:02X}")?,
                None => write!(f, " --")?,
            }
        }
        write!(f, " |")?;
        for register in self.registers {
            write!(f, " {register:02X}")?;
        }
        Ok(())
    }
}

pub struct Machine {
    memory: Memory,
    processor: Processor,
    console: Console,
    config: MachineConfig,
    state: State,
    cycles: u64,
}

impl Machine {
    pub fn new() -> Self {
        Self::with_config(MachineConfig::default(), Console::stdout())
    }

    pub fn with_config(config: MachineConfig, console: Console) -> Self {
        Self {
            memory: Memory::new(),
            processor: Processor::new(config.alu),
            console,
            config,
            state: State::Ready,
            cycles: 0,
        }
    }

    /// Copies `program` into memory starting at address 0.
    pub fn load(&mut self, program: &[Byte]) -> Result<(), LoadError> {
        if self.state != State::Ready {
            return Err(LoadError::AlreadyStarted);
        }
        let too_large = LoadError::ProgramTooLarge {
            size: program.len(),
        };
        if program.len() > Memory::SIZE {
            return Err(too_large);
        }
        self.memory
            .write_slice(ENTRY_POINT, program)
            .map_err(|_| too_large)?;
        tracing::debug!(bytes = program.len(), "program loaded");
        Ok(())
    }

    pub fn step(&mut self) -> Result<Tick, ExecutionError> {
        match self.state {
            State::Halted => return Ok(Tick::Halted),
            State::Faulted(error) => return Err(error),
            State::Ready | State::Running => {}
        }
        self.state = State::Running;
        if self.config.trace {
            if let Some(record) = self.trace_record() {
                tracing::trace!(target: "ls8::trace", "{record}");
            }
        }

        let pc = self.processor.program_counter();
        self.cycles += 1;
        match self.processor.make_tick(&mut self.memory, &mut self.console) {
            Ok(Tick::Running) => Ok(Tick::Running),
            Ok(Tick::Halted) => {
                self.state = State::Halted;
                tracing::debug!(cycles = self.cycles, pc, "halted");
                Ok(Tick::Halted)
            }
            Err(fault) => {
                let error = ExecutionError { fault, pc };
                self.state = State::Faulted(error);
                tracing::debug!(%error, cycles = self.cycles, "machine faulted");
                Err(error)
            }
        }
    }

    /// Steps until the machine halts, faults or exhausts `max_cycles`.
    pub fn run(&mut self) -> Result<Outcome, ExecutionError> {
        loop {
            if self.state == State::Halted {
                return Ok(Outcome::Halted);
            }
            if matches!(self.config.max_cycles, Some(max_cycles) if self.cycles >= max_cycles) {
                return Ok(Outcome::CycleLimitReached);
            }
            self.step()?;
        }
    }

    #[must_use]
    pub fn is_halted(&self) -> bool {
        self.state == State::Halted
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    pub fn registers(&self) -> &Registers {
        self.processor.registers()
    }

    pub fn flags(&self) -> Flag {
        self.processor.flags()
    }

    pub fn program_counter(&self) -> Address {
        self.processor.program_counter()
    }

    /// Reads the instruction at the program counter without faulting. Returns `None` when the
    /// program counter itself is outside of memory.
    pub fn trace_record(&self) -> Option<TraceRecord> {
        let program_counter = self.processor.program_counter();
        let opcode = self.memory.read(program_counter).ok()?;
        let operand_count = Opcode::decode(opcode).operand_count as usize;
        let mut operands = [None; 2];
        for (offset, operand) in operands.iter_mut().take(operand_count).enumerate() {
            *operand = self
                .memory
                .read(program_counter + 1 + offset as Address)
                .ok();
        }
        Some(TraceRecord {
            program_counter,
            opcode,
            operands,
            registers: self.processor.registers().as_array(),
        })
    }

    pub fn snapshot(&self) -> Snapshot {
        let (status, fault) = match self.state {
            State::Ready => (Status::Ready, None),
            State::Running => (Status::Running, None),
            State::Halted => (Status::Halted, None),
            State::Faulted(error) => (Status::Faulted, Some(error.to_string())),
        };
        Snapshot {
            status,
            cycles: self.cycles,
            program_counter: self.processor.program_counter(),
            flags: self.processor.flags().bits(),
            registers: self.processor.registers().as_array().to_vec(),
            memory: self.memory.as_slice().to_vec(),
            fault,
        }
    }
}

impl Default for Machine {
    fn default() -> Self {
        Self::new()
    }
}
