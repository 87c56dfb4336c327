use crate::error::Fault;
use crate::Byte;
#[cfg(test)]
use strum::EnumIter;

/// Structural decode of an opcode byte laid out as `AABCDDDD`.
///
/// `AA` is the number of operand bytes following the opcode, `B` marks ALU operations,
/// `C` marks instructions that set the program counter themselves and `DDDD` is the
/// instruction identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Opcode {
    pub operand_count: u8,
    pub sets_pc: bool,
    pub is_alu: bool,
    pub instruction_id: u8,
}

impl Opcode {
    const OPERAND_COUNT_SHIFT: u32 = 6;
    const ALU_BIT: Byte = 0b1 << 5;
    const SETS_PC_BIT: Byte = 0b1 << 4;
    const INSTRUCTION_ID_MASK: Byte = 0b1111;

    pub const fn decode(byte: Byte) -> Self {
        Self {
            operand_count: byte >> Self::OPERAND_COUNT_SHIFT,
            sets_pc: byte & Self::SETS_PC_BIT != 0,
            is_alu: byte & Self::ALU_BIT != 0,
            instruction_id: byte & Self::INSTRUCTION_ID_MASK,
        }
    }

    /// Encoded length of the whole instruction in bytes.
    pub const fn length(self) -> u8 {
        self.operand_count + 1
    }
}

macro_rules! instructions {
    ( $({
        $identifier:ident,
        $mnemonic:literal,
        $code:literal,
        $comment:literal
    },)+ ) => {
        /// ## Instructions
        /// | Opcode       | Mnemonic | Meaning |
        /// |--------------|----------|---------|
        $(
            #[doc = concat!(" | `", stringify!($code), "` | `", $mnemonic, "` | ", $comment, " |")]
        )+
        #[repr(u8)]
        #[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
        #[cfg_attr(test, derive(EnumIter))]
        pub enum Instruction {
            $(
                $identifier = $code,
            )+
        }

        impl Instruction {
            pub const fn mnemonic(self) -> &'static str {
                match self {
                    $(
                        Self::$identifier => $mnemonic,
                    )+
                }
            }
        }

        impl TryFrom<Byte> for Instruction {
            type Error = Fault;

            fn try_from(opcode: Byte) -> Result<Self, Self::Error> {
                match opcode {
                    $(
                        $code => Ok(Self::$identifier),
                    )+
                    _ => Err(Fault::UnsupportedOpcode { opcode }),
                }
            }
        }

        impl From<Instruction> for Byte {
            fn from(instruction: Instruction) -> Self {
                instruction as Byte
            }
        }
    };
}

instructions!(
    // housekeeping
    { NoOp, "NOP", 0b0000_0000, "does nothing" },
    { Halt, "HLT", 0b0000_0001, "halt the machine" },

    // data movement
    { LoadImmediate, "LDI", 0b1000_0010, "store the literal operand B in register A" },
    { Load, "LD", 0b1000_0011, "load the memory cell addressed by register B into register A" },
    { Store, "ST", 0b1000_0100, "store register B into the memory cell addressed by register A" },

    // output
    { PrintNumber, "PRN", 0b0100_0111, "print the value of register A as a decimal number" },
    { PrintCharacter, "PRA", 0b0100_1000, "print the value of register A as an ASCII character" },

    // stack
    { Push, "PUSH", 0b0100_0101, "push register A onto the stack" },
    { Pop, "POP", 0b0100_0110, "pop the top of the stack into register A" },
    { Call, "CALL", 0b0101_0000, "push the address of the next instruction and jump to register A" },
    { Return, "RET", 0b0001_0001, "pop the return address into the program counter" },

    // jumps
    { Jump, "JMP", 0b0101_0100, "jump to the address in register A" },
    { JumpIfEqual, "JEQ", 0b0101_0101, "jump to register A if the equal flag is set" },
    { JumpIfNotEqual, "JNE", 0b0101_0110, "jump to register A if the equal flag is clear" },
    { JumpIfGreaterThan, "JGT", 0b0101_0111, "jump to register A if the greater-than flag is set" },
    { JumpIfLessThan, "JLT", 0b0101_1000, "jump to register A if the less-than flag is set" },
    { JumpIfLessThanOrEqual, "JLE", 0b0101_1001, "jump to register A if the less-than or equal flag is set" },
    { JumpIfGreaterThanOrEqual, "JGE", 0b0101_1010, "jump to register A if the greater-than or equal flag is set" },

    // arithmetic
    { Add, "ADD", 0b1010_0000, "A = A + B" },
    { Subtract, "SUB", 0b1010_0001, "A = A - B" },
    { Multiply, "MUL", 0b1010_0010, "A = A * B" },
    { Divide, "DIV", 0b1010_0011, "A = A / B, faults if B is zero" },
    { Modulo, "MOD", 0b1010_0100, "A = A % B, faults if B is zero" },
    { Increment, "INC", 0b0110_0101, "A = A + 1" },
    { Decrement, "DEC", 0b0110_0110, "A = A - 1" },

    // comparison
    { Compare, "CMP", 0b1010_0111, "compare A with B and set exactly one of the equal, greater-than and less-than flags" },

    // bitwise
    { And, "AND", 0b1010_1000, "A = A & B" },
    { Not, "NOT", 0b0110_1001, "A = !A" },
    { Or, "OR", 0b1010_1010, "A = A | B" },
    { Xor, "XOR", 0b1010_1011, "A = A ^ B" },
    { ShiftLeft, "SHL", 0b1010_1100, "A = A << (B % 8)" },
    { ShiftRight, "SHR", 0b1010_1101, "A = A >> (B % 8)" },
);

impl Instruction {
    pub fn opcode(self) -> Opcode {
        Opcode::decode(self.into())
    }
}

impl std::fmt::Display for Instruction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.mnemonic())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::alu::AluOperation;
    use int_enum::IntEnum;
    use strum::IntoEnumIterator;

    #[test]
    fn ensure_no_duplicate_opcodes() {
        for (i, outer) in Instruction::iter().enumerate() {
            for (j, inner) in Instruction::iter().enumerate() {
                if i == j {
                    continue;
                }
                assert_ne!(Byte::from(outer), Byte::from(inner));
            }
        }
    }

    #[test]
    fn decode_splits_the_opcode_fields() {
        let opcode = Opcode::decode(0b1010_0010);
        assert_eq!(
            opcode,
            Opcode {
                operand_count: 2,
                sets_pc: false,
                is_alu: true,
                instruction_id: 0b0010,
            }
        );
        assert_eq!(opcode.length(), 3);

        let opcode = Opcode::decode(0b0101_0000);
        assert_eq!(opcode.operand_count, 1);
        assert!(opcode.sets_pc);
        assert!(!opcode.is_alu);
        assert_eq!(opcode.instruction_id, 0);
    }

    #[test]
    fn every_byte_is_decodable() {
        for byte in 0..=Byte::MAX {
            let opcode = Opcode::decode(byte);
            assert!(opcode.operand_count <= 3);
            assert!(opcode.instruction_id <= 0b1111);
        }
    }

    #[test]
    fn only_control_transfers_set_the_program_counter() {
        use Instruction::*;
        for instruction in Instruction::iter() {
            let expected = matches!(
                instruction,
                Call | Return
                    | Jump
                    | JumpIfEqual
                    | JumpIfNotEqual
                    | JumpIfGreaterThan
                    | JumpIfLessThan
                    | JumpIfLessThanOrEqual
                    | JumpIfGreaterThanOrEqual
            );
            assert_eq!(instruction.opcode().sets_pc, expected, "{instruction}");
        }
    }

    #[test]
    fn alu_instructions_map_onto_alu_operations() {
        for instruction in Instruction::iter().filter(|i| i.opcode().is_alu) {
            let operation = AluOperation::from_int(instruction.opcode().instruction_id)
                .expect("every ALU instruction id has an operation");
            assert_eq!(
                operation.operand_count(),
                instruction.opcode().operand_count,
                "{instruction}"
            );
        }
    }

    #[test]
    fn unregistered_bytes_are_rejected() {
        // IRET and INT are decodable but not part of the instruction table
        for opcode in [0b0001_0011, 0b0101_0010, 0xFF] {
            assert_eq!(
                Instruction::try_from(opcode),
                Err(Fault::UnsupportedOpcode { opcode })
            );
        }
    }

    #[test]
    fn instruction_bytes_convert_both_ways() {
        for instruction in Instruction::iter() {
            assert_eq!(Instruction::try_from(Byte::from(instruction)), Ok(instruction));
        }
        assert_eq!(Instruction::try_from(0b1010_0010), Ok(Instruction::Multiply));
        assert_eq!(Byte::from(Instruction::Halt), 0b0000_0001);
    }

    #[test]
    fn registered_bytes_match_the_instruction_table() {
        let registered = (0..=Byte::MAX)
            .filter(|&byte| Instruction::try_from(byte).is_ok())
            .count();
        assert_eq!(registered, Instruction::iter().count());
    }
}
