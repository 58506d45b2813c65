//! Opcode table and full opcode decoding.
//!
//! A full opcode is one memory cell. The low two decimal digits select the
//! instruction, every digit above them is the [`Mode`] of one parameter, the
//! lowest of them belonging to the first parameter:
//!
//! ```text
//!  1002  ->  mul, modes [position, immediate, position]
//!  ||└┴─ opcode 02
//!  |└─── 1st parameter: 0 (position)
//!  └──── 2nd parameter: 1 (immediate), 3rd one is absent so it is 0
//! ```
//!
//! Decoding is done with integer arithmetic only.

use core::fmt;
use alloc::vec::Vec;

use crate::error::ErrorKind;

/// Generates the closed opcode enum together with its static tables.
///
/// Each variant is declared as `Name = code => ("mnemonic", params)`, with an
/// optional trailing `write` marking instructions whose last parameter is a
/// write target.
///
/// ```ignore
/// impl_opcodes! {
///     pub enum Foo {
///         Bar = 1 => ("bar", 3, write), // params_count() == 3, writes() == true
///         Baz = 2 => ("baz", 0),        // params_count() == 0, writes() == false
///     }
/// }
/// ```
macro_rules! impl_opcodes {
    (@write) => { false };
    (@write write) => { true };
    ($(#[$m:meta])* $v:vis enum $name:ident { $($(#[doc = $vm:expr])* $var:ident = $code:literal => ($mnemonic:literal, $params:literal $(, $write:ident)?)),* $(,)? }) => {
        $(#[$m])*
        $v enum $name {$(
            $(#[doc = $vm])* $var = $code,
        )*}

        impl $name {
            /// Array of all variants.
            pub const VARIANTS: &[$name] = &[$(Self::$var, )*];

            /// Assembly mnemonic.
            pub const fn name(self) -> &'static str {
                match self {$(
                    Self::$var => $mnemonic,
                )*}
            }

            /// Number of parameters following the opcode cell.
            pub const fn params_count(self) -> usize {
                match self {$(
                    Self::$var => $params,
                )*}
            }

            /// Returns `true` if the last parameter is a write target.
            pub const fn writes(self) -> bool {
                match self {$(
                    Self::$var => impl_opcodes!(@write $($write)?),
                )*}
            }
        }
    };
}

impl_opcodes! {
    /// Intcode instruction set.
    #[derive(Clone, Copy, PartialEq, Eq, Debug)]
    #[repr(u8)]
    pub enum OpcodeKind {
        /// `dst <- a + b`
        Add = 1 => ("add", 3, write),
        /// `dst <- a * b`
        Mul = 2 => ("mul", 3, write),
        /// `dst <- next input value`
        Input = 3 => ("in", 1, write),
        /// Append `a` to the output log.
        Output = 4 => ("out", 1),
        /// Jump to `target` if `a != 0`
        JumpIfTrue = 5 => ("jnz", 2),
        /// Jump to `target` if `a == 0`
        JumpIfFalse = 6 => ("jz", 2),
        /// `dst <- a < b`
        LessThan = 7 => ("lt", 3, write),
        /// `dst <- a == b`
        Equals = 8 => ("eq", 3, write),
        /// `relative base <- relative base + a`
        AdjustBase = 9 => ("arb", 1),
        /// Stop execution
        Halt = 99 => ("halt", 0),
    }
}

impl OpcodeKind {
    /// Try get opcode kind by its two-digit code.
    #[inline(always)]
    pub fn from_raw(opcode: i64) -> Option<Self> {
        Self::VARIANTS
            .iter()
            .find(|p| p.as_raw() == opcode)
            .copied()
    }
    /// Returns the two-digit code.
    #[inline(always)]
    pub fn as_raw(self) -> i64 {
        self as u8 as i64
    }

    /// Cells occupied by the instruction, opcode cell included.
    #[inline(always)]
    pub fn width(self) -> usize {
        self.params_count() + 1
    }
}

/// Parameter mode.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Mode {
    /// Parameter is an address.
    #[default]
    Position,
    /// Parameter is the value itself. Never valid for a write target.
    Immediate,
    /// Parameter is an address offset from the relative base.
    Relative,
}

impl Mode {
    pub const fn from_digit(digit: i64) -> Option<Self> {
        match digit {
            0 => Some(Self::Position),
            1 => Some(Self::Immediate),
            2 => Some(Self::Relative),
            _ => None,
        }
    }
}

/// Splits a full opcode cell into its kind and parameter modes.
///
/// Modes are decoded only for the parameters the instruction takes; digits
/// above them are ignored. Unused slots stay [`Mode::Position`].
///
/// ```
/// # use intcode_base::opcode::{decode, Mode, OpcodeKind};
/// assert_eq!(
///     decode(1002),
///     Ok((OpcodeKind::Mul, [Mode::Position, Mode::Immediate, Mode::Position])),
/// );
/// ```
pub fn decode(cell: i64) -> Result<(OpcodeKind, [Mode; 3]), ErrorKind> {
    if cell < 0 {
        return Err(ErrorKind::UnknownOpcode(cell));
    }
    let Some(kind) = OpcodeKind::from_raw(cell % 100) else {
        return Err(ErrorKind::UnknownOpcode(cell));
    };

    let count = kind.params_count();
    let mut modes = [Mode::Position; 3];
    let mut rest = cell / 100;
    for (idx, mode) in modes.iter_mut().take(count).enumerate() {
        let digit = rest % 10;
        *mode = Mode::from_digit(digit).ok_or(ErrorKind::InvalidMode {
            mode: digit,
            param: idx + 1,
        })?;
        rest /= 10;
    }

    if kind.writes() && modes[count - 1] == Mode::Immediate {
        return Err(ErrorKind::InvalidMode {
            mode: 1,
            param: count,
        });
    }

    Ok((kind, modes))
}

/// Decoded instruction with its raw (unresolved) parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Instruction {
    pub kind: OpcodeKind,
    pub modes: [Mode; 3],
    pub params: [i64; 3],
}

impl Instruction {
    /// Decodes the instruction starting at `pointer`.
    ///
    /// Fails with [`ErrorKind::AddressOutOfRange`] if the opcode cell or any of
    /// its parameters lies past the end of `cells`.
    pub fn fetch(cells: &[i64], pointer: usize) -> Result<Self, ErrorKind> {
        let cell = |at: usize| {
            cells
                .get(at)
                .copied()
                .ok_or(ErrorKind::AddressOutOfRange(at as i64))
        };

        let (kind, modes) = decode(cell(pointer)?)?;
        let mut params = [0; 3];
        for (idx, param) in params.iter_mut().take(kind.params_count()).enumerate() {
            *param = cell(pointer + 1 + idx)?;
        }

        Ok(Self {
            kind,
            modes,
            params,
        })
    }

    /// `(mode, raw parameter)` pairs actually used by the instruction.
    pub fn operands(&self) -> impl Iterator<Item = (Mode, i64)> {
        self.modes
            .into_iter()
            .zip(self.params)
            .take(self.kind.params_count())
    }

    #[inline(always)]
    pub fn width(&self) -> usize {
        self.kind.width()
    }
}

/// Position parameters are printed as `[addr]`, relative ones as `[rb+off]`,
/// immediate ones as a bare number.
impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.kind.name())?;
        for (idx, (mode, param)) in self.operands().enumerate() {
            let sep = if idx == 0 { " " } else { ", " };
            match mode {
                Mode::Position => write!(f, "{sep}[{param}]")?,
                Mode::Immediate => write!(f, "{sep}{param}")?,
                Mode::Relative => write!(f, "{sep}[rb{param:+}]")?,
            }
        }
        Ok(())
    }
}

/// Linear sweep over `cells` from `start`.
///
/// Every decoded instruction is reported at its address and skipped as a
/// whole. A cell that does not decode is reported with its error and skipped
/// alone, so data mixed into code does not stop the listing.
pub fn disassemble(cells: &[i64], start: usize) -> Vec<(usize, Result<Instruction, ErrorKind>)> {
    let mut listing = Vec::new();
    let mut pos = start;

    while pos < cells.len() {
        let instr = Instruction::fetch(cells, pos);
        let step = instr.as_ref().map_or(1, Instruction::width);
        listing.push((pos, instr));
        pos += step;
    }

    listing
}

#[cfg(test)]
#[rustfmt::skip]
mod tests {
    use alloc::{string::ToString, vec};
    use super::*;

    use Mode::{Immediate as I, Position as P, Relative as R};

    #[test]
    fn opcode_table() {
        for kind in OpcodeKind::VARIANTS {
            assert_eq!(OpcodeKind::from_raw(kind.as_raw()), Some(*kind));
            assert_eq!(kind.width(), kind.params_count() + 1);
        }
        assert_eq!(OpcodeKind::from_raw(0), None);
        assert_eq!(OpcodeKind::from_raw(10), None);
        assert_eq!(OpcodeKind::Halt.width(), 1);
        assert!(OpcodeKind::Input.writes());
        assert!(!OpcodeKind::Output.writes());
    }

    #[test]
    fn decoding() {
        let expected: &[(i64, Result<(OpcodeKind, [Mode; 3]), ErrorKind>)] = &[
            (1,     Ok((OpcodeKind::Add,        [P, P, P]))),
            (1002,  Ok((OpcodeKind::Mul,        [P, I, P]))),
            (1101,  Ok((OpcodeKind::Add,        [I, I, P]))),
            (21101, Ok((OpcodeKind::Add,        [I, I, R]))),
            (203,   Ok((OpcodeKind::Input,      [R, P, P]))),
            (104,   Ok((OpcodeKind::Output,     [I, P, P]))),
            (1105,  Ok((OpcodeKind::JumpIfTrue, [I, I, P]))),
            (109,   Ok((OpcodeKind::AdjustBase, [I, P, P]))),
            (99,    Ok((OpcodeKind::Halt,       [P, P, P]))),
            // digits above the used parameters are ignored
            (1099,  Ok((OpcodeKind::Halt,       [P, P, P]))),
            (90004, Ok((OpcodeKind::Output,     [P, P, P]))),

            (0,     Err(ErrorKind::UnknownOpcode(0))),
            (42,    Err(ErrorKind::UnknownOpcode(42))),
            (1010,  Err(ErrorKind::UnknownOpcode(1010))),
            (-1,    Err(ErrorKind::UnknownOpcode(-1))),
            (301,   Err(ErrorKind::InvalidMode { mode: 3, param: 1 })),
            (9005,  Err(ErrorKind::InvalidMode { mode: 9, param: 2 })),
            (103,   Err(ErrorKind::InvalidMode { mode: 1, param: 1 })),
            (11101, Err(ErrorKind::InvalidMode { mode: 1, param: 3 })),
            (11107, Err(ErrorKind::InvalidMode { mode: 1, param: 3 })),
        ];

        for (idx, (cell, result)) in expected.iter().enumerate() {
            assert_eq!(&decode(*cell), result, "Testing line #{idx}: {cell}");
        }
    }

    #[test]
    fn fetching() {
        let cells = [1101, 4, 5, 6, 99];
        assert_eq!(
            Instruction::fetch(&cells, 0),
            Ok(Instruction { kind: OpcodeKind::Add, modes: [I, I, P], params: [4, 5, 6] }),
        );
        assert_eq!(
            Instruction::fetch(&cells, 4),
            Ok(Instruction { kind: OpcodeKind::Halt, modes: [P, P, P], params: [0, 0, 0] }),
        );
        // parameters cut off by the end of memory
        assert_eq!(Instruction::fetch(&cells[..3], 0), Err(ErrorKind::AddressOutOfRange(3)));
        assert_eq!(Instruction::fetch(&cells, 5), Err(ErrorKind::AddressOutOfRange(5)));
    }

    #[test]
    fn display() {
        let expected = [
            (&[1101, 4, 5, 6][..], "add 4, 5, [6]"),
            (&[2, 0, 0, 0][..],    "mul [0], [0], [0]"),
            (&[203, -3][..],       "in [rb-3]"),
            (&[204, 7][..],        "out [rb+7]"),
            (&[1105, 1, 4][..],    "jnz 1, 4"),
            (&[109, 19][..],       "arb 19"),
            (&[99][..],            "halt"),
        ];

        for (cells, text) in expected {
            assert_eq!(Instruction::fetch(cells, 0).unwrap().to_string(), text);
        }
    }

    #[test]
    fn disassembly() {
        let listing = disassemble(&[1101, 4, 5, 6, 42, 104, 9, 99], 0);
        let addrs: Vec<usize> = listing.iter().map(|(addr, _)| *addr).collect();

        assert_eq!(addrs, vec![0, 4, 5, 7]);
        assert_eq!(listing[1].1, Err(ErrorKind::UnknownOpcode(42)));
        assert_eq!(listing[3].1.map(|i| i.kind), Ok(OpcodeKind::Halt));

        let listing = disassemble(&[1101, 4, 5, 6, 99], 4);
        assert_eq!(listing.len(), 1);
    }
}
