//! Machine state pieces: memory, pending input and run status.

use alloc::{collections::VecDeque, vec, vec::Vec};

/// Fixed-capacity, zero-initialized memory.
///
/// Addresses are signed because they come straight out of memory cells;
/// anything outside `[0, capacity)` is rejected with [`None`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Memory {
    cells: Vec<i64>,
}

impl Memory {
    pub fn new(capacity: usize) -> Self {
        Self {
            cells: vec![0; capacity],
        }
    }

    /// Copies `program` to address 0 and zero-fills the rest. Returns [`None`]
    /// (memory untouched) if the program is larger than the capacity.
    pub fn load(&mut self, program: &[i64]) -> Option<()> {
        if program.len() > self.cells.len() {
            return None;
        }
        let (head, tail) = self.cells.split_at_mut(program.len());
        head.copy_from_slice(program);
        tail.fill(0);
        Some(())
    }

    pub fn capacity(&self) -> usize {
        self.cells.len()
    }

    /// Converts `addr` to an index if it is inside memory.
    pub fn index(&self, addr: i64) -> Option<usize> {
        usize::try_from(addr).ok().filter(|&idx| idx < self.cells.len())
    }

    pub fn read(&self, addr: i64) -> Option<i64> {
        self.index(addr).map(|idx| self.cells[idx])
    }

    pub fn write(&mut self, addr: i64, v: i64) -> Option<()> {
        let idx = self.index(addr)?;
        self.cells[idx] = v;
        Some(())
    }

    pub fn as_slice(&self) -> &[i64] {
        &self.cells
    }
}

/// Pending input queue, consumed front to back by the input instruction.
///
/// Built from whatever the caller has at hand:
///
/// ```
/// # use intcode_base::vm::Input;
/// assert_eq!(Input::from(5).len(), 1);
/// assert_eq!(Input::from([1, 2, 3]).len(), 3);
/// assert_eq!(Input::from(vec![1, 2]).len(), 2);
/// assert_eq!(Input::from(None).len(), 0);
/// assert!(Input::from(()).is_empty());
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Input(VecDeque<i64>);

impl Input {
    pub fn new() -> Self {
        Default::default()
    }

    /// Takes the next value.
    pub fn pop(&mut self) -> Option<i64> {
        self.0.pop_front()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &i64> {
        self.0.iter()
    }
}

impl From<i64> for Input {
    fn from(v: i64) -> Self {
        Self(VecDeque::from([v]))
    }
}
impl From<Option<i64>> for Input {
    fn from(v: Option<i64>) -> Self {
        v.into_iter().collect()
    }
}
impl From<()> for Input {
    fn from(_: ()) -> Self {
        Self::new()
    }
}
impl From<Vec<i64>> for Input {
    fn from(v: Vec<i64>) -> Self {
        Self(v.into())
    }
}
impl From<&[i64]> for Input {
    fn from(v: &[i64]) -> Self {
        v.iter().copied().collect()
    }
}
impl<const N: usize> From<[i64; N]> for Input {
    fn from(v: [i64; N]) -> Self {
        Self(v.into())
    }
}

impl FromIterator<i64> for Input {
    fn from_iter<T: IntoIterator<Item = i64>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}
impl Extend<i64> for Input {
    fn extend<T: IntoIterator<Item = i64>>(&mut self, iter: T) {
        self.0.extend(iter)
    }
}

/// Run status of a machine.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Status {
    /// Loaded or executing.
    #[default]
    Running,
    /// Suspended after an output or while waiting for input. Resumable.
    Paused,
    /// Halt instruction executed or an error occurred. Final.
    Halted,
}
