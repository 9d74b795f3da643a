use std::fmt;
use std::num::NonZeroUsize;
use std::time::{Duration, Instant};

use thiserror::Error;

use crate::arith::{Behavior, OverflowRule, Policy};
use crate::opcode::nibble_position;
use crate::parser::Variant;
use crate::program::Program;
use crate::rng::RngStream;
use crate::tape::Tape;

/// The wall clock is sampled once per this many steps, bounding timeout
/// overhead without letting a runaway loop drift far past its budget.
const TIMEOUT_CHECK_INTERVAL: u64 = 1024;

const DEFAULT_MEMORY: NonZeroUsize = NonZeroUsize::new(5).unwrap();

/// Immutable per-run parameters. Built once per invocation and never
/// mutated during execution.
#[derive(Clone, Debug)]
pub struct RunConfig {
    /// Tape capacity in cells.
    pub memory: NonZeroUsize,
    /// Seed for the random-input stream.
    pub seed: u64,
    /// Wall-clock budget for the run.
    pub timeout: Duration,
    pub variant: Variant,
    /// Read cells as signed bytes.
    pub signed: bool,
    /// Fault on arithmetic overflow instead of wrapping.
    pub strict: bool,
    /// Append a state line to the output after every step.
    pub trace: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            memory: DEFAULT_MEMORY,
            seed: 0,
            timeout: Duration::from_secs(1),
            variant: Variant::Modern,
            signed: false,
            strict: false,
            trace: false,
        }
    }
}

/// A fatal run error. The position is the offending instruction's
/// bytecode position (see [`nibble_position`]).
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum Fault {
    #[error("pointer moved to {target} outside the {capacity}-cell tape at instruction {position}")]
    OutOfBounds {
        position: String,
        target: isize,
        capacity: usize,
    },
    #[error("arithmetic overflow at instruction {position}")]
    Overflow { position: String },
}

/// How a run ended. Timing out is terminal but not an error; a fault is.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Status {
    /// The program stopped itself or ran off the end.
    Completed,
    Fault(Fault),
    TimedOut,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Status::Completed => write!(f, "completed"),
            Status::Fault(fault) => write!(f, "fault: {fault}"),
            Status::TimedOut => write!(f, "timed out"),
        }
    }
}

/// Everything a run produces. Output is buffered during execution and
/// returned as a value; nothing is streamed.
#[derive(Clone, Debug)]
pub struct RunOutcome {
    pub status: Status,
    /// Ordered output lines: the value emitted by the stop instruction,
    /// preceded by per-step state lines when tracing.
    pub output: Vec<String>,
    /// Executed instruction count.
    pub steps: u64,
    /// State line for the last executed instruction, `<pos>: <tape>`.
    pub state: String,
    /// The tape as the run left it.
    pub tape: Tape,
}

/// Execute `program` to completion, fault or timeout.
///
/// Every run constructs a fresh tape, random stream and instruction
/// pointer; nothing is shared between invocations.
pub fn run(program: &Program, config: &RunConfig) -> RunOutcome {
    let policy = Policy::new(config.variant, config.signed, config.strict);
    let mut tape = Tape::new(config.memory);
    let mut rng = RngStream::seed(config.seed);
    let mut output = Vec::new();
    let mut ip = 0usize;
    let mut last = 0usize;
    let mut steps = 0u64;
    let started = Instant::now();

    let status = loop {
        if ip >= program.len() {
            break Status::Completed;
        }
        if steps % TIMEOUT_CHECK_INTERVAL == 0 && started.elapsed() >= config.timeout {
            break Status::TimedOut;
        }

        last = ip;
        let op = program.op(ip);
        let mut next = ip + 1;
        let mut halted = false;

        match policy.behavior(op) {
            Behavior::Halt => {
                output.push(policy.render(tape.get()).to_string());
                halted = true;
            }
            Behavior::MoveLeft => {
                if let Err(bounds) = tape.shift(-1) {
                    break Status::Fault(Fault::OutOfBounds {
                        position: nibble_position(ip),
                        target: bounds.target,
                        capacity: bounds.capacity,
                    });
                }
            }
            Behavior::MoveRight => {
                if let Err(bounds) = tape.shift(1) {
                    break Status::Fault(Fault::OutOfBounds {
                        position: nibble_position(ip),
                        target: bounds.target,
                        capacity: bounds.capacity,
                    });
                }
            }
            Behavior::Adjust { delta, on_overflow } => {
                let (value, overflowed) = policy.adjust(tape.get(), delta);
                if overflowed && on_overflow == OverflowRule::Fault {
                    break Status::Fault(Fault::Overflow {
                        position: nibble_position(ip),
                    });
                }
                tape.set(value);
            }
            Behavior::Halve => {
                let value = policy.halve(tape.get());
                tape.set(value);
            }
            Behavior::Double { on_overflow } => {
                let (value, overflowed) = policy.double(tape.get());
                if overflowed && on_overflow == OverflowRule::Fault {
                    break Status::Fault(Fault::Overflow {
                        position: nibble_position(ip),
                    });
                }
                tape.set(value);
            }
            Behavior::FillRandom => {
                tape.set(rng.next_byte());
            }
            Behavior::Skip => {
                if policy.skip_taken(tape.get()) {
                    next = program.target(ip) + 1;
                }
            }
            Behavior::Repeat => {
                if policy.repeat_taken(tape.get()) {
                    next = program.target(ip) + 1;
                }
            }
        }

        steps += 1;
        if config.trace {
            output.push(format!(
                "{} {}: {}",
                nibble_position(last),
                op.description(),
                tape.render(config.signed)
            ));
        }
        if halted {
            break Status::Completed;
        }
        ip = next;
    };

    RunOutcome {
        status,
        output,
        steps,
        state: format!("{}: {}", nibble_position(last), tape.render(config.signed)),
        tape,
    }
}
