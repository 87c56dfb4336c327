use crate::{error::Fault, processor::Flag, Byte};
use int_enum::IntEnum;

/// ALU operations, keyed by the instruction id of an opcode with the ALU bit set.
#[repr(u8)]
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, IntEnum)]
pub enum AluOperation {
    Add = 0x0,
    Subtract = 0x1,
    Multiply = 0x2,
    Divide = 0x3,
    Modulo = 0x4,
    Increment = 0x5,
    Decrement = 0x6,
    Compare = 0x7,
    And = 0x8,
    Not = 0x9,
    Or = 0xA,
    Xor = 0xB,
    ShiftLeft = 0xC,
    ShiftRight = 0xD,
}

impl AluOperation {
    pub fn operand_count(self) -> u8 {
        match self {
            Self::Increment | Self::Decrement | Self::Not => 1,
            _ => 2,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AluResult {
    /// Written back into the first operand register.
    Value(Byte),
    /// Replaces the flags register.
    Comparison(Flag),
}

/// Which ALU operations a machine accepts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum AluSupport {
    #[default]
    Full,
    /// Everything except `DIV`, `INC` and `DEC`.
    Core,
}

impl AluSupport {
    pub fn supports(self, operation: AluOperation) -> bool {
        match self {
            Self::Full => true,
            Self::Core => !matches!(
                operation,
                AluOperation::Divide | AluOperation::Increment | AluOperation::Decrement
            ),
        }
    }
}

/// Computes `operation` on two register values with 8-bit wraparound.
///
/// Unary operations ignore `rhs`.
pub fn execute(operation: AluOperation, lhs: Byte, rhs: Byte) -> Result<AluResult, Fault> {
    use AluOperation::*;
    let value = match operation {
        Add => lhs.wrapping_add(rhs),
        Subtract => lhs.wrapping_sub(rhs),
        Multiply => lhs.wrapping_mul(rhs),
        Divide => lhs.checked_div(rhs).ok_or(Fault::DivisionByZero)?,
        Modulo => lhs.checked_rem(rhs).ok_or(Fault::DivisionByZero)?,
        Increment => lhs.wrapping_add(1),
        Decrement => lhs.wrapping_sub(1),
        Compare => return Ok(AluResult::Comparison(Flag::compare(lhs, rhs))),
        And => lhs & rhs,
        Not => !lhs,
        Or => lhs | rhs,
        Xor => lhs ^ rhs,
        ShiftLeft => lhs << (rhs % Byte::BITS as Byte),
        ShiftRight => lhs >> (rhs % Byte::BITS as Byte),
    };
    Ok(AluResult::Value(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn value(operation: AluOperation, lhs: Byte, rhs: Byte) -> Byte {
        match execute(operation, lhs, rhs) {
            Ok(AluResult::Value(value)) => value,
            other => panic!("expected a value, got {other:?}"),
        }
    }

    #[test]
    fn add_wraps_around() {
        assert_eq!(value(AluOperation::Add, 255, 2), 1);
        assert_eq!(value(AluOperation::Add, 10, 12), 22);
    }

    #[test]
    fn subtract_wraps_around() {
        assert_eq!(value(AluOperation::Subtract, 10, 8), 2);
        assert_eq!(value(AluOperation::Subtract, 10, 12), 254);
    }

    #[test]
    fn multiply_keeps_the_low_byte() {
        assert_eq!(value(AluOperation::Multiply, 8, 9), 72);
        assert_eq!(value(AluOperation::Multiply, 16, 17), 16);
    }

    #[test]
    fn divide_and_modulo() {
        assert_eq!(value(AluOperation::Divide, 72, 8), 9);
        assert_eq!(value(AluOperation::Divide, 7, 2), 3);
        assert_eq!(value(AluOperation::Modulo, 7, 2), 1);
    }

    #[test]
    fn division_by_zero_faults() {
        assert_eq!(
            execute(AluOperation::Divide, 42, 0),
            Err(Fault::DivisionByZero)
        );
        assert_eq!(
            execute(AluOperation::Modulo, 42, 0),
            Err(Fault::DivisionByZero)
        );
    }

    #[test]
    fn increment_and_decrement_wrap_around() {
        assert_eq!(value(AluOperation::Increment, 255, 0), 0);
        assert_eq!(value(AluOperation::Decrement, 0, 0), 255);
    }

    #[test]
    fn bitwise_operations() {
        assert_eq!(value(AluOperation::And, 0b1100, 0b1010), 0b1000);
        assert_eq!(value(AluOperation::Or, 0b1100, 0b1010), 0b1110);
        assert_eq!(value(AluOperation::Xor, 0b1100, 0b1010), 0b0110);
        assert_eq!(value(AluOperation::Not, 0b1111_0000, 0), 0b0000_1111);
    }

    #[test]
    fn shifts_use_the_second_operand_modulo_eight() {
        assert_eq!(value(AluOperation::ShiftLeft, 0b0000_0001, 3), 0b0000_1000);
        assert_eq!(value(AluOperation::ShiftRight, 0b1000_0000, 7), 0b0000_0001);
        assert_eq!(value(AluOperation::ShiftLeft, 0b0000_0001, 9), 0b0000_0010);
        assert_eq!(value(AluOperation::ShiftRight, 0b1000_0000, 8), 0b1000_0000);
        assert_eq!(value(AluOperation::ShiftLeft, 0b1100_0000, 1), 0b1000_0000);
    }

    #[test]
    fn compare_produces_flags() {
        assert_eq!(
            execute(AluOperation::Compare, 3, 3),
            Ok(AluResult::Comparison(Flag::Equal))
        );
        assert_eq!(
            execute(AluOperation::Compare, 4, 3),
            Ok(AluResult::Comparison(Flag::GreaterThan))
        );
        assert_eq!(
            execute(AluOperation::Compare, 3, 4),
            Ok(AluResult::Comparison(Flag::LessThan))
        );
    }

    #[test]
    fn core_support_excludes_divide_increment_and_decrement() {
        assert!(AluSupport::Core.supports(AluOperation::Multiply));
        assert!(AluSupport::Core.supports(AluOperation::Compare));
        assert!(!AluSupport::Core.supports(AluOperation::Divide));
        assert!(!AluSupport::Core.supports(AluOperation::Increment));
        assert!(!AluSupport::Core.supports(AluOperation::Decrement));
        assert!(AluSupport::Full.supports(AluOperation::Divide));
    }

    proptest! {
        #[test]
        fn add_matches_modular_arithmetic(lhs in any::<u8>(), rhs in any::<u8>()) {
            prop_assert_eq!(value(AluOperation::Add, lhs, rhs) as u16, (lhs as u16 + rhs as u16) % 256);
        }

        #[test]
        fn nonzero_division_never_faults(lhs in any::<u8>(), rhs in 1u8..=u8::MAX) {
            prop_assert_eq!(value(AluOperation::Divide, lhs, rhs), lhs / rhs);
            prop_assert_eq!(value(AluOperation::Modulo, lhs, rhs), lhs % rhs);
        }

        #[test]
        fn shifts_never_overflow(lhs in any::<u8>(), rhs in any::<u8>()) {
            prop_assert!(execute(AluOperation::ShiftLeft, lhs, rhs).is_ok());
            prop_assert!(execute(AluOperation::ShiftRight, lhs, rhs).is_ok());
        }
    }
}
