use thiserror::Error;

use crate::opcode::Opcode;
use crate::program::Program;

/// Which syntax the parser accepts.
///
/// The dialects differ only here: run-time semantics are shared (see the
/// policy table in `arith`).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Variant {
    /// Classic brainfuck syntax: only `. < > - , + [ ]` are meaningful,
    /// everything else is a comment, and loops nest at most three deep.
    Original,
    /// The full token set; loops pair by marker; unknown punctuation is
    /// rejected.
    #[default]
    Modern,
}

/// A program rejected before execution. Positions are the 1-based line and
/// column of the offending character.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum SyntaxError {
    #[error("unexpected character {found} at line {line}, column {column}")]
    UnexpectedCharacter { found: char, line: usize, column: usize },
    #[error("unmatched parenthesis at line {line}, column {column}")]
    UnmatchedParenthesis { line: usize, column: usize },
    #[error("maximum nesting depth of 3 exceeded at line {line}, column {column}")]
    NestingTooDeep { line: usize, column: usize },
    #[error("open parentheses at the end of input")]
    UnclosedParentheses,
    #[error("missing skipping parentheses for {marker}")]
    MissingSkip { marker: u8 },
    #[error("missing repeating parentheses for {marker}")]
    MissingRepeat { marker: u8 },
}

/// Compile source text into a [`Program`].
///
/// Pure: same text and variant, same result. All control-flow validation
/// happens here, so the interpreter never re-checks loop structure; the
/// returned program carries resolved jump targets.
pub fn parse(source: &str, variant: Variant) -> Result<Program, SyntaxError> {
    let mut ops = Vec::new();
    // Replacement characters (bytes that never decoded) are dropped before
    // tokenization, so collation pairs up across them.
    let mut chars = source
        .chars()
        .filter(|&c| c != char::REPLACEMENT_CHARACTER)
        .peekable();
    let mut line = 1usize;
    let mut column = 0usize;
    // Original-dialect bracket nesting, which doubles as the marker.
    let mut depth = 0u8;

    while let Some(curr) = chars.next() {
        if !curr.is_control() {
            column += 1;
        }

        match curr {
            '\r' => {
                // A carriage return swallows one following line feed.
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                line += 1;
                column = 0;
            }
            '\n' => {
                line += 1;
                column = 0;
            }

            '.' => ops.push(Opcode::Output),
            '<' => ops.push(Opcode::Left),
            '>' => ops.push(Opcode::Right),
            ',' => ops.push(Opcode::Input),

            '/' if variant == Variant::Modern => ops.push(Opcode::Divide),
            '*' if variant == Variant::Modern => ops.push(Opcode::Multiply),

            '-' => {
                // Pairs collate into a single double-step opcode.
                if chars.peek() == Some(&'-') {
                    chars.next();
                    column += 1;
                    ops.push(Opcode::DecrementTwo);
                } else {
                    ops.push(Opcode::DecrementOne);
                }
            }
            '+' => {
                if chars.peek() == Some(&'+') {
                    chars.next();
                    column += 1;
                    ops.push(Opcode::IncrementTwo);
                } else {
                    ops.push(Opcode::IncrementOne);
                }
            }

            '[' => match variant {
                Variant::Original => {
                    let op = match depth {
                        0 => Opcode::SkipOne,
                        1 => Opcode::SkipTwo,
                        2 => Opcode::SkipThree,
                        _ => return Err(SyntaxError::NestingTooDeep { line, column }),
                    };
                    depth += 1;
                    ops.push(op);
                }
                Variant::Modern => ops.push(Opcode::SkipOne),
            },
            ']' => match variant {
                Variant::Original => {
                    let op = match depth {
                        1 => Opcode::RepeatOne,
                        2 => Opcode::RepeatTwo,
                        3 => Opcode::RepeatThree,
                        _ => return Err(SyntaxError::UnmatchedParenthesis { line, column }),
                    };
                    depth -= 1;
                    ops.push(op);
                }
                Variant::Modern => ops.push(Opcode::RepeatOne),
            },

            '(' if variant == Variant::Modern => ops.push(Opcode::SkipTwo),
            ')' if variant == Variant::Modern => ops.push(Opcode::RepeatTwo),
            '{' if variant == Variant::Modern => ops.push(Opcode::SkipThree),
            '}' if variant == Variant::Modern => ops.push(Opcode::RepeatThree),

            _ => {
                // Letters, digits and whitespace are comments in both
                // dialects; the modern dialect rejects stray punctuation.
                if variant == Variant::Modern && curr.is_ascii_punctuation() {
                    return Err(SyntaxError::UnexpectedCharacter {
                        found: curr,
                        line,
                        column,
                    });
                }
            }
        }
    }

    match variant {
        Variant::Original => {
            if depth != 0 {
                return Err(SyntaxError::UnclosedParentheses);
            }
        }
        Variant::Modern => check_markers(&ops)?,
    }

    Ok(Program::new(ops))
}

#[derive(Clone, Copy, PartialEq)]
enum LoopState {
    Unseen,
    Open,
    Closed,
}

/// Modern-dialect balance check: every repeat needs a preceding skip with
/// its marker, and every opened marker must be closed by the end.
fn check_markers(ops: &[Opcode]) -> Result<(), SyntaxError> {
    let mut markers = [LoopState::Unseen; 3];

    for op in ops {
        let slot = match op.marker() {
            0 => continue,
            m => &mut markers[m as usize - 1],
        };
        if op.is_skip() {
            *slot = LoopState::Open;
        } else if *slot == LoopState::Unseen {
            return Err(SyntaxError::MissingSkip { marker: op.marker() });
        } else {
            *slot = LoopState::Closed;
        }
    }

    for (i, state) in markers.iter().enumerate() {
        if *state == LoopState::Open {
            return Err(SyntaxError::MissingRepeat { marker: i as u8 + 1 });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use Opcode::*;

    fn ops(source: &str, variant: Variant) -> Vec<Opcode> {
        parse(source, variant).unwrap().ops().to_vec()
    }

    #[test]
    fn test_parse_table() {
        // (input, variant, expect ok, expected opcodes)
        let table: &[(&str, Variant, bool, &[Opcode])] = &[
            ("", Variant::Modern, true, &[]),
            ("", Variant::Original, true, &[]),
            ("#", Variant::Modern, false, &[]),
            ("#", Variant::Original, true, &[]),
            ("+", Variant::Modern, true, &[IncrementOne]),
            ("+", Variant::Original, true, &[IncrementOne]),
            ("++", Variant::Modern, true, &[IncrementTwo]),
            ("++", Variant::Original, true, &[IncrementTwo]),
            ("+++", Variant::Modern, true, &[IncrementTwo, IncrementOne]),
            ("-", Variant::Modern, true, &[DecrementOne]),
            ("--", Variant::Modern, true, &[DecrementTwo]),
            ("---", Variant::Modern, true, &[DecrementTwo, DecrementOne]),
        ];
        for (num, (input, variant, ok, expected)) in table.iter().enumerate() {
            let result = parse(input, *variant);
            match result {
                Ok(program) => {
                    assert!(*ok, "parse succeeded unexpectedly in subtest {num}");
                    assert_eq!(program.ops(), *expected, "wrong opcodes in subtest {num}");
                }
                Err(err) => assert!(!*ok, "parse failed in subtest {num}: {err}"),
            }
        }
    }

    #[test]
    fn test_comments_ignored() {
        assert_eq!(ops("a b\tc1+", Variant::Modern), vec![IncrementOne]);
        assert_eq!(ops("a b\tc1+", Variant::Original), vec![IncrementOne]);
    }

    #[test]
    fn test_original_ignores_modern_tokens() {
        assert_eq!(ops("/*(){}", Variant::Original), vec![]);
        assert_eq!(
            ops("/*", Variant::Modern),
            vec![Divide, Multiply]
        );
    }

    #[test]
    fn test_modern_marker_tokens() {
        assert_eq!(
            ops("[](){}", Variant::Modern),
            vec![SkipOne, RepeatOne, SkipTwo, RepeatTwo, SkipThree, RepeatThree]
        );
    }

    #[test]
    fn test_original_depth_selects_marker() {
        assert_eq!(
            ops("[[[]]]", Variant::Original),
            vec![SkipOne, SkipTwo, SkipThree, RepeatThree, RepeatTwo, RepeatOne]
        );
    }

    #[test]
    fn test_original_nesting_limit() {
        assert_eq!(
            parse("[[[[", Variant::Original),
            Err(SyntaxError::NestingTooDeep { line: 1, column: 4 })
        );
    }

    #[test]
    fn test_original_unmatched_close() {
        assert_eq!(
            parse("]", Variant::Original),
            Err(SyntaxError::UnmatchedParenthesis { line: 1, column: 1 })
        );
    }

    #[test]
    fn test_original_unclosed_at_end() {
        assert_eq!(
            parse("[+", Variant::Original),
            Err(SyntaxError::UnclosedParentheses)
        );
    }

    #[test]
    fn test_modern_missing_skip() {
        assert_eq!(
            parse(")", Variant::Modern),
            Err(SyntaxError::MissingSkip { marker: 2 })
        );
    }

    #[test]
    fn test_modern_missing_repeat() {
        assert_eq!(
            parse("{+", Variant::Modern),
            Err(SyntaxError::MissingRepeat { marker: 3 })
        );
    }

    #[test]
    fn test_modern_repeat_after_closed_loop_is_accepted() {
        // A second repeat for an already-closed marker reuses its skip.
        assert_eq!(
            ops("[]]", Variant::Modern),
            vec![SkipOne, RepeatOne, RepeatOne]
        );
    }

    #[test]
    fn test_error_position_counts_lines() {
        assert_eq!(
            parse("+\n#", Variant::Modern),
            Err(SyntaxError::UnexpectedCharacter { found: '#', line: 2, column: 1 })
        );
    }

    #[test]
    fn test_crlf_counts_one_line() {
        assert_eq!(
            parse("+\r\n+\r\n..#", Variant::Modern),
            Err(SyntaxError::UnexpectedCharacter { found: '#', line: 3, column: 3 })
        );
    }

    #[test]
    fn test_bare_carriage_return_counts_a_line() {
        assert_eq!(
            parse("+\r#", Variant::Modern),
            Err(SyntaxError::UnexpectedCharacter { found: '#', line: 2, column: 1 })
        );
    }

    #[test]
    fn test_collation_stops_at_newline() {
        assert_eq!(ops("+\n+", Variant::Modern), vec![IncrementOne, IncrementOne]);
    }

    #[test]
    fn test_error_messages() {
        let err = parse("#", Variant::Modern).unwrap_err();
        assert_eq!(
            err.to_string(),
            "unexpected character # at line 1, column 1"
        );
        let err = parse("]", Variant::Modern).unwrap_err();
        assert_eq!(err.to_string(), "missing skipping parentheses for 1");
    }

    #[test]
    fn test_replacement_character_skipped() {
        assert_eq!(ops("+\u{FFFD}+", Variant::Modern), vec![IncrementTwo]);
    }
}
