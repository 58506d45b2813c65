//! # Intcode Virtual Machine
//!
//! This crate contains the Intcode interpreter. A program goes through 3 stages
//! to be executed:
//!
//! 1. [`parser`] -- program text to cells. Optional, any `&[i64]` will do.
//! 2. [`opcode`] -- decode full opcode cells into instructions and parameter modes.
//! 3. [`runner`] -- execute instructions against [`vm`] state, pausing on
//!    output or input if asked to.
//!
//! # Example
//! Opcode list can be found in [`OpcodeKind`] enum.
//!
//! ```
//! # use intcode_base::{parser::*, runner::*, vm::*};
//! #
//! // Reads a number and outputs 1 if it is equal to 8, 0 otherwise.
//! let program = parse_program("3,9,8,9,10,9,4,9,99,-1,8", ',').unwrap();
//!
//! let mut ic = Machine::load(&program, 64).unwrap();
//! assert_eq!(ic.run(8), Ok(Status::Halted));
//! assert_eq!(ic.output(), &[1]);
//!
//! // Same program, this time feeding the input on demand.
//! let config = MachineConfig::new().capacity(64).pause_on_input(true);
//! let mut ic = Machine::with_config(&program, config).unwrap();
//!
//! assert_eq!(ic.run(()), Ok(Status::Paused));
//! assert!(ic.awaiting_input());
//! assert_eq!(ic.resume(7), Ok(Status::Halted));
//! assert_eq!(ic.output(), &[0]);
//! ```
//!
//! # Instruction set
//!
//! Memory is a fixed number of signed 64-bit cells, zero-initialized past the
//! program. Every cell address an instruction touches must be inside it.
//!
//! ## Full opcode
//!
//! `ABCDE`: `DE` is the opcode, `C`, `B`, `A` are the modes of the 1st, 2nd and
//! 3rd parameter. Missing mode digits are 0.
//!
//! | Mode | Name      | Read parameter `p`          | Write target `p`       |
//! |------|-----------|-----------------------------|------------------------|
//! | 0    | position  | `mem[p]`                    | `mem[p]`               |
//! | 1    | immediate | `p`                         | *invalid*              |
//! | 2    | relative  | `mem[rb + p]`               | `mem[rb + p]`          |
//!
//! ## Instructions
//!
//! | Code | Name   | Parameters   | Effect                       | Width |
//! |------|--------|--------------|------------------------------|-------|
//! | 1    | `add`  | a, b, dst    | `dst = a + b`                | 4     |
//! | 2    | `mul`  | a, b, dst    | `dst = a * b`                | 4     |
//! | 3    | `in`   | dst          | `dst = input`                | 2     |
//! | 4    | `out`  | a            | output `a`                   | 2     |
//! | 5    | `jnz`  | a, target    | jump to `target` if `a != 0` | 3[^1] |
//! | 6    | `jz`   | a, target    | jump to `target` if `a == 0` | 3[^1] |
//! | 7    | `lt`   | a, b, dst    | `dst = a < b`                | 4     |
//! | 8    | `eq`   | a, b, dst    | `dst = a == b`               | 4     |
//! | 9    | `arb`  | a            | `rb = rb + a`                | 2     |
//! | 99   | `halt` |              | stop                         | 1     |
//!
//! [^1]: only when the jump is not taken
//!
//! Arithmetic wraps around on overflow.

#![cfg_attr(feature = "no-std", no_std)]
extern crate alloc;

/// Prints a line to stderr when built with the `trace` feature, expands to
/// nothing otherwise.
macro_rules! trace {
    ($($t:tt)*) => {
        #[cfg(all(feature = "trace", not(feature = "no-std")))]
        eprintln!($($t)*);
    };
}

// doc imports
#[allow(unused_imports)]
use opcode::OpcodeKind;

pub mod error;
pub mod opcode;
pub mod parser;
pub mod runner;
pub mod vm;
