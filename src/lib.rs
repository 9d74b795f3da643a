pub mod opcode;
pub mod parser;
pub mod program;
pub mod tape;
pub mod arith;
pub mod rng;
pub mod exec;
pub mod explain;
pub mod help;
