//! Pausable Intcode runner.
//!
//! [`Machine`] owns all interpreter state and is driven by the caller through
//! [`Machine::run`] / [`Machine::resume`], or one instruction at a time with
//! [`Machine::step`]. See the [`Machine`] docs for the pause protocol.

use core::fmt;
use alloc::{string::String, vec::Vec};

use crate::{
    error::{ErrorKind, MachineError},
    opcode::{Instruction, Mode, OpcodeKind},
    vm::{Input, Memory, Status},
};

/// Memory size used when none is given.
pub const DEFAULT_CAPACITY: usize = 1_000_000;

/// Machine construction options.
///
/// ```
/// # use intcode_base::runner::MachineConfig;
/// let config = MachineConfig::new()
///     .capacity(64)
///     .pause_on_output(true)
///     .name("amp-a");
/// assert_eq!(config.capacity, 64);
/// assert!(!config.pause_on_input);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MachineConfig {
    /// Memory size in cells.
    pub capacity: usize,
    /// Pause after every executed output instruction.
    pub pause_on_output: bool,
    /// Pause instead of failing when input is needed but the queue is empty.
    pub pause_on_input: bool,
    pub name: Option<String>,
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            pause_on_output: false,
            pause_on_input: false,
            name: None,
        }
    }
}

impl MachineConfig {
    pub fn new() -> Self {
        Default::default()
    }
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }
    pub fn pause_on_output(mut self, v: bool) -> Self {
        self.pause_on_output = v;
        self
    }
    pub fn pause_on_input(mut self, v: bool) -> Self {
        self.pause_on_input = v;
        self
    }
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// Result of a single [`Machine::step`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Signal {
    /// Instruction executed, nothing to report
    Continue,
    /// Value appended to the output log
    Output(i64),
    /// Input queue empty, machine paused before the input instruction
    AwaitingInput,
    /// Halt executed, or machine was already halted
    Halted,
}

/// Operands of one instruction after mode resolution.
///
/// `values` holds the read operands in parameter order. `target` is the
/// already bounds-checked write address and is meaningful only when the
/// instruction writes.
#[derive(Clone, Copy, Debug, Default)]
struct Operands {
    values: [i64; 3],
    target: i64,
}

/// Intcode machine.
///
/// # Pause protocol
///
/// [`Machine::run`] replaces the input queue and executes until the machine
/// pauses or halts. With [`MachineConfig::pause_on_output`] every output
/// instruction pauses the machine right after its value is logged, so the
/// caller regains control once per produced value. With
/// [`MachineConfig::pause_on_input`] an input instruction that finds the
/// queue empty pauses *before* executing; the next run re-executes it.
///
/// Calling [`Machine::run`], [`Machine::resume`] or [`Machine::step`] on a
/// halted machine does nothing and reports [`Status::Halted`]. Any error also
/// halts the machine, leaving memory and pointer as they were before the
/// failing instruction.
///
/// ```
/// # use intcode_base::{runner::*, vm::Status};
/// // out 1; out 2; halt
/// let config = MachineConfig::new().capacity(16).pause_on_output(true);
/// let mut ic = Machine::with_config(&[104, 1, 104, 2, 99], config).unwrap();
///
/// assert_eq!(ic.run(()), Ok(Status::Paused));
/// assert_eq!(ic.output(), &[1]);
/// assert_eq!(ic.resume(()), Ok(Status::Paused));
/// assert_eq!(ic.output(), &[1, 2]);
/// assert_eq!(ic.resume(()), Ok(Status::Halted));
/// ```
#[derive(Clone, Debug)]
pub struct Machine {
    memory: Memory,
    pointer: usize,
    relative_base: i64,
    input: Input,
    output: Vec<i64>,
    status: Status,
    awaiting_input: bool,
    config: MachineConfig,
}

impl Machine {
    /// Loads `program` into `capacity` cells of memory with default options.
    pub fn load(program: &[i64], capacity: usize) -> Result<Self, MachineError> {
        Self::with_config(program, MachineConfig::new().capacity(capacity))
    }

    pub fn with_config(program: &[i64], config: MachineConfig) -> Result<Self, MachineError> {
        let mut machine = Self {
            memory: Memory::new(config.capacity),
            pointer: 0,
            relative_base: 0,
            input: Input::new(),
            output: Vec::new(),
            status: Status::Running,
            awaiting_input: false,
            config,
        };
        machine.reload(program)?;
        Ok(machine)
    }

    /// Loads a new program into this machine keeping its options. Resets
    /// pointer, relative base, queues and status.
    ///
    /// Fails with [`ErrorKind::Capacity`], leaving the machine as it was,
    /// if `program` does not fit into memory.
    pub fn reload(&mut self, program: &[i64]) -> Result<(), MachineError> {
        if self.memory.load(program).is_none() {
            return Err(MachineError {
                kind: ErrorKind::Capacity {
                    len: program.len(),
                    capacity: self.memory.capacity(),
                },
                pointer: 0,
                opcode: program.first().copied().unwrap_or(0),
            });
        }

        self.pointer = 0;
        self.relative_base = 0;
        self.input = Input::new();
        self.output.clear();
        self.status = Status::Running;
        self.awaiting_input = false;
        Ok(())
    }

    /// Replaces the input queue and executes until the machine pauses or halts.
    pub fn run(&mut self, input: impl Into<Input>) -> Result<Status, MachineError> {
        if self.status == Status::Halted {
            return Ok(Status::Halted);
        }

        self.input = input.into();
        self.status = Status::Running;
        self.awaiting_input = false;

        while self.status == Status::Running {
            self.step()?;
        }
        Ok(self.status)
    }

    /// Continues a paused machine with fresh input. Same as [`Machine::run`].
    #[inline(always)]
    pub fn resume(&mut self, input: impl Into<Input>) -> Result<Status, MachineError> {
        self.run(input)
    }

    /// Executes exactly one instruction using the current input queue.
    ///
    /// A paused machine is set running again first.
    pub fn step(&mut self) -> Result<Signal, MachineError> {
        if self.status == Status::Halted {
            return Ok(Signal::Halted);
        }
        self.status = Status::Running;
        self.awaiting_input = false;

        let result = Instruction::fetch(self.memory.as_slice(), self.pointer)
            .and_then(|instr| self.execute(instr));

        result.map_err(|kind| self.fault(kind))
    }

    fn fault(&mut self, kind: ErrorKind) -> MachineError {
        self.status = Status::Halted;
        MachineError {
            kind,
            pointer: self.pointer,
            opcode: self.memory.read(self.pointer as i64).unwrap_or(0),
        }
    }

    /// Resolves the parameters of `instr`.
    ///
    /// Read parameters are dereferenced according to their mode. The write
    /// target (last parameter of a writing instruction) is *not* dereferenced:
    /// position mode uses the parameter itself as the address, relative mode
    /// adds the relative base to it, immediate mode is invalid. Every address,
    /// target included, is checked here so nothing is written on failure.
    fn resolve_operands(&self, instr: &Instruction) -> Result<Operands, ErrorKind> {
        let count = instr.kind.params_count();
        let writes = instr.kind.writes();
        let reads = if writes { count - 1 } else { count };
        let mut ops = Operands::default();

        for (idx, (mode, param)) in instr.operands().take(reads).enumerate() {
            ops.values[idx] = match mode {
                Mode::Position => self.deref(param)?,
                Mode::Immediate => param,
                Mode::Relative => self.deref(self.relative_base.wrapping_add(param))?,
            };
        }

        if writes {
            let (mode, param) = (instr.modes[count - 1], instr.params[count - 1]);
            let addr = match mode {
                Mode::Position => param,
                Mode::Relative => self.relative_base.wrapping_add(param),
                Mode::Immediate => {
                    return Err(ErrorKind::InvalidMode {
                        mode: 1,
                        param: count,
                    })
                }
            };
            if self.memory.index(addr).is_none() {
                return Err(ErrorKind::AddressOutOfRange(addr));
            }
            ops.target = addr;
        }

        Ok(ops)
    }

    fn deref(&self, addr: i64) -> Result<i64, ErrorKind> {
        self.memory
            .read(addr)
            .ok_or(ErrorKind::AddressOutOfRange(addr))
    }

    fn store(&mut self, addr: i64, v: i64) -> Result<(), ErrorKind> {
        self.memory
            .write(addr, v)
            .ok_or(ErrorKind::AddressOutOfRange(addr))
    }

    fn execute(&mut self, instr: Instruction) -> Result<Signal, ErrorKind> {
        trace!(
            "{}: {:>5} rb={:<5} {instr}",
            self, self.pointer, self.relative_base
        );

        let Operands {
            values: [a, b, _],
            target,
        } = self.resolve_operands(&instr)?;
        let mut next = self.pointer + instr.width();

        let signal = match instr.kind {
            OpcodeKind::Add => {
                self.store(target, a.wrapping_add(b))?;
                Signal::Continue
            }
            OpcodeKind::Mul => {
                self.store(target, a.wrapping_mul(b))?;
                Signal::Continue
            }
            OpcodeKind::Input => {
                let Some(v) = self.input.pop() else {
                    if !self.config.pause_on_input {
                        return Err(ErrorKind::InputExhausted);
                    }
                    self.status = Status::Paused;
                    self.awaiting_input = true;
                    return Ok(Signal::AwaitingInput);
                };
                self.store(target, v)?;
                Signal::Continue
            }
            OpcodeKind::Output => {
                self.output.push(a);
                if self.config.pause_on_output {
                    self.status = Status::Paused;
                }
                Signal::Output(a)
            }
            OpcodeKind::JumpIfTrue | OpcodeKind::JumpIfFalse => {
                let jump = match instr.kind {
                    OpcodeKind::JumpIfTrue => a != 0,
                    OpcodeKind::JumpIfFalse => a == 0,

                    _ => unreachable!(),
                };
                if jump {
                    next = self
                        .memory
                        .index(b)
                        .ok_or(ErrorKind::AddressOutOfRange(b))?;
                }
                Signal::Continue
            }
            OpcodeKind::LessThan => {
                self.store(target, (a < b) as i64)?;
                Signal::Continue
            }
            OpcodeKind::Equals => {
                self.store(target, (a == b) as i64)?;
                Signal::Continue
            }
            OpcodeKind::AdjustBase => {
                self.relative_base = self.relative_base.wrapping_add(a);
                Signal::Continue
            }
            OpcodeKind::Halt => {
                self.status = Status::Halted;
                Signal::Halted
            }
        };

        self.pointer = next;
        Ok(signal)
    }

    /// Unconsumed values of the input queue, leaving it empty.
    pub fn take_pending_input(&mut self) -> Input {
        core::mem::take(&mut self.input)
    }

    /// Everything produced since load.
    pub fn output(&self) -> &[i64] {
        &self.output
    }
    pub fn last_output(&self) -> Option<i64> {
        self.output.last().copied()
    }

    pub fn memory(&self) -> &[i64] {
        self.memory.as_slice()
    }
    /// Reads a memory cell, [`None`] if `addr` is out of range.
    pub fn read(&self, addr: i64) -> Option<i64> {
        self.memory.read(addr)
    }

    pub fn pointer(&self) -> usize {
        self.pointer
    }
    pub fn relative_base(&self) -> i64 {
        self.relative_base
    }
    pub fn status(&self) -> Status {
        self.status
    }
    /// Returns `true` if the machine is paused on an input instruction.
    pub fn awaiting_input(&self) -> bool {
        self.status == Status::Paused && self.awaiting_input
    }
    pub fn config(&self) -> &MachineConfig {
        &self.config
    }
    pub fn name(&self) -> Option<&str> {
        self.config.name.as_deref()
    }
}

impl fmt::Display for Machine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "<IC({name})>"),
            None => write!(f, "<IC>"),
        }
    }
}
