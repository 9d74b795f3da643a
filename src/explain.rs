use crate::opcode::nibble_position;
use crate::program::Program;

/// Narrate a program without executing it: one line per instruction, in
/// program order. Loop bodies are described once, never unrolled; this is
/// a static walk that touches no tape, no random stream and no clock.
///
/// Each line is the instruction's bytecode position, its token and its
/// description, e.g. `0l+ increment`.
pub fn explain(program: &Program) -> Vec<String> {
    program
        .ops()
        .iter()
        .enumerate()
        .map(|(i, op)| format!("{}{} {}", nibble_position(i), op.token(), op.description()))
        .collect()
}
