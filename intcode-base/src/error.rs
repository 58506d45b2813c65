//! Errors raised while loading or executing a program.
//!
//! None of them is recoverable: the machine halts on the first one and
//! reports where it stopped.

use thiserror::Error;

/// What went wrong. See [`MachineError`] for the location.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum ErrorKind {
    /// Program does not fit into the allocated memory.
    #[error("program of {len} cells does not fit into {capacity} cells of memory")]
    Capacity { len: usize, capacity: usize },
    /// Low two digits of the cell are not in the opcode table.
    #[error("unknown opcode {0}")]
    UnknownOpcode(i64),
    /// Mode digit is not 0, 1 or 2, or a write target is in immediate mode.
    /// `param` counts from 1.
    #[error("invalid mode {mode} for parameter {param}")]
    InvalidMode { mode: i64, param: usize },
    /// Resolved address (read, write or jump target) is outside of memory.
    #[error("address {0} out of range")]
    AddressOutOfRange(i64),
    /// Input instruction ran with an empty queue and pausing for input is off.
    #[error("input exhausted")]
    InputExhausted,
}

/// Error with the instruction pointer and the raw opcode cell at the point of failure.
///
/// ```
/// # use intcode_base::error::{ErrorKind, MachineError};
/// let err = MachineError { kind: ErrorKind::UnknownOpcode(42), pointer: 4, opcode: 42 };
/// assert_eq!(err.to_string(), "unknown opcode 42 @ 4 (opcode 42)");
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
#[error("{kind} @ {pointer} (opcode {opcode})")]
pub struct MachineError {
    pub kind: ErrorKind,
    pub pointer: usize,
    pub opcode: i64,
}
