use crate::opcode::{OPCODE_COUNT, Opcode};
use crate::parser::Variant;

/// What a cell operation does when it overflows its 8 bits.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OverflowRule {
    /// Wrap in two's complement.
    Wrap,
    /// Halt the run with an arithmetic fault.
    Fault,
}

/// The effect of one opcode, as resolved by the policy table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Behavior {
    /// Output the current cell and stop.
    Halt,
    MoveLeft,
    MoveRight,
    /// Add `delta` to the current cell.
    Adjust { delta: i8, on_overflow: OverflowRule },
    /// Divide the current cell by two.
    Halve,
    /// Multiply the current cell by two.
    Double { on_overflow: OverflowRule },
    /// Store the next random byte into the current cell.
    FillRandom,
    /// Jump past the partner repeat when the skip condition holds.
    Skip,
    /// Jump back behind the partner skip while the cell is nonzero.
    Repeat,
}

const fn behavior_table(on_overflow: OverflowRule) -> [Behavior; OPCODE_COUNT] {
    use Behavior::*;
    // Indexed by opcode nibble.
    [
        Halt,                                      // Output
        MoveLeft,                                  // Left
        MoveRight,                                 // Right
        Halve,                                     // Divide
        Adjust { delta: -2, on_overflow },         // DecrementTwo
        Adjust { delta: -1, on_overflow },         // DecrementOne
        FillRandom,                                // Input
        Adjust { delta: 1, on_overflow },          // IncrementOne
        Adjust { delta: 2, on_overflow },          // IncrementTwo
        Double { on_overflow },                    // Multiply
        Repeat,                                    // RepeatOne
        Repeat,                                    // RepeatTwo
        Repeat,                                    // RepeatThree
        Skip,                                      // SkipOne
        Skip,                                      // SkipTwo
        Skip,                                      // SkipThree
    ]
}

/// Per-run arithmetic policy: the opcode behavior table plus the
/// signed/unsigned cell primitives.
///
/// The table is resolved once per run and is the only place dialect
/// semantics could diverge; the dispatch loop never branches on the
/// variant. Both dialects currently resolve to the same table, since they
/// differ only in syntax. A dialect that remaps an opcode changes it here.
pub struct Policy {
    signed: bool,
    table: [Behavior; OPCODE_COUNT],
}

impl Policy {
    pub fn new(variant: Variant, signed: bool, strict: bool) -> Self {
        let on_overflow = if strict {
            OverflowRule::Fault
        } else {
            OverflowRule::Wrap
        };
        let table = match variant {
            Variant::Original => behavior_table(on_overflow),
            Variant::Modern => behavior_table(on_overflow),
        };
        Self { signed, table }
    }

    pub fn behavior(&self, op: Opcode) -> Behavior {
        self.table[op.nibble() as usize]
    }

    pub fn signed(&self) -> bool {
        self.signed
    }

    /// Add `delta` to `value`, wrapping at 8 bits. Returns the wrapped
    /// result and whether the true result left the cell's range (unsigned
    /// `0..=255` or signed `-128..=127`).
    pub fn adjust(&self, value: u8, delta: i8) -> (u8, bool) {
        if self.signed {
            let (next, overflowed) = (value as i8).overflowing_add(delta);
            (next as u8, overflowed)
        } else {
            value.overflowing_add_signed(delta)
        }
    }

    /// Divide `value` by two: logical shift unsigned, arithmetic shift
    /// signed. Never overflows.
    pub fn halve(&self, value: u8) -> u8 {
        if self.signed {
            ((value as i8) >> 1) as u8
        } else {
            value >> 1
        }
    }

    /// Multiply `value` by two. The stored bits are a plain left shift in
    /// both modes; only the overflow condition differs.
    pub fn double(&self, value: u8) -> (u8, bool) {
        if self.signed {
            let (next, overflowed) = (value as i8).overflowing_mul(2);
            (next as u8, overflowed)
        } else {
            (value << 1, value & 0x80 != 0)
        }
    }

    /// A skip is taken on a zero cell, or a negative one in signed mode.
    pub fn skip_taken(&self, value: u8) -> bool {
        value == 0 || (self.signed && (value as i8) < 0)
    }

    /// A repeat is taken on any nonzero cell.
    pub fn repeat_taken(&self, value: u8) -> bool {
        value != 0
    }

    /// The cell value as the configured mode reads it.
    pub fn render(&self, value: u8) -> i16 {
        if self.signed {
            (value as i8) as i16
        } else {
            value as i16
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unsigned() -> Policy {
        Policy::new(Variant::Modern, false, false)
    }

    fn signed() -> Policy {
        Policy::new(Variant::Modern, true, false)
    }

    #[test]
    fn test_adjust_wraps_unsigned() {
        assert_eq!(unsigned().adjust(0, -1), (255, true));
        assert_eq!(unsigned().adjust(255, 1), (0, true));
        assert_eq!(unsigned().adjust(254, 2), (0, true));
        assert_eq!(unsigned().adjust(10, 2), (12, false));
    }

    #[test]
    fn test_adjust_wraps_signed() {
        // 127 + 1 wraps to -128 in two's complement.
        assert_eq!(signed().adjust(127, 1), (128, true));
        assert_eq!(signed().adjust(128, -1), (127, true));
        // 0 - 1 is a plain -1 in signed mode, not an overflow.
        assert_eq!(signed().adjust(0, -1), (255, false));
    }

    #[test]
    fn test_halve_logical_vs_arithmetic() {
        // 254 unsigned halves to 127; as signed -2 it halves to -1.
        assert_eq!(unsigned().halve(254), 127);
        assert_eq!(signed().halve(254), 255);
        assert_eq!(unsigned().halve(6), 3);
        assert_eq!(signed().halve(6), 3);
    }

    #[test]
    fn test_double() {
        assert_eq!(unsigned().double(3), (6, false));
        assert_eq!(unsigned().double(128), (0, true));
        assert_eq!(unsigned().double(192), (128, true));
        // -64 doubles to -128 without signed overflow.
        assert_eq!(signed().double(192), (128, false));
        assert_eq!(signed().double(64), (128, true));
    }

    #[test]
    fn test_skip_condition() {
        assert!(unsigned().skip_taken(0));
        assert!(!unsigned().skip_taken(255));
        assert!(signed().skip_taken(0));
        // Negative cells skip in signed mode only.
        assert!(signed().skip_taken(255));
        assert!(!signed().skip_taken(1));
    }

    #[test]
    fn test_repeat_condition() {
        assert!(!unsigned().repeat_taken(0));
        assert!(unsigned().repeat_taken(255));
        assert!(signed().repeat_taken(255));
    }

    #[test]
    fn test_render() {
        assert_eq!(unsigned().render(255), 255);
        assert_eq!(signed().render(255), -1);
        assert_eq!(signed().render(127), 127);
    }

    #[test]
    fn test_strict_swaps_overflow_rule() {
        let strict = Policy::new(Variant::Modern, false, true);
        match strict.behavior(Opcode::IncrementOne) {
            Behavior::Adjust { delta: 1, on_overflow } => {
                assert_eq!(on_overflow, OverflowRule::Fault);
            }
            other => panic!("unexpected behavior {other:?}"),
        }
        match unsigned().behavior(Opcode::IncrementOne) {
            Behavior::Adjust { on_overflow, .. } => {
                assert_eq!(on_overflow, OverflowRule::Wrap);
            }
            other => panic!("unexpected behavior {other:?}"),
        }
    }

    #[test]
    fn test_dialects_share_runtime_table() {
        let original = Policy::new(Variant::Original, false, false);
        let modern = unsigned();
        for n in 0..OPCODE_COUNT as u8 {
            let op = Opcode::from_nibble(n);
            assert_eq!(original.behavior(op), modern.behavior(op));
        }
    }
}
