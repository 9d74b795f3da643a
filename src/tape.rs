use std::num::NonZeroUsize;

use thiserror::Error;

/// A pointer move that would leave the tape. Escaping the tape is a fatal
/// run fault, never a silent wrap or clamp.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("pointer moved to {target} outside the {capacity}-cell tape")]
pub struct OutOfBounds {
    /// The index the move would have landed on.
    pub target: isize,
    pub capacity: usize,
}

/// The machine's sole mutable memory: a fixed-length array of 8-bit cells
/// and a pointer. Capacity is fixed at construction; cells start at zero.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tape {
    cells: Vec<u8>,
    pointer: usize,
}

impl Tape {
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            cells: vec![0; capacity.get()],
            pointer: 0,
        }
    }

    /// Move the pointer by `distance` cells, failing if it would leave
    /// `[0, capacity)`. The pointer is unchanged on failure.
    pub fn shift(&mut self, distance: isize) -> Result<(), OutOfBounds> {
        let target = self.pointer as isize + distance;
        if target < 0 || target >= self.cells.len() as isize {
            return Err(OutOfBounds {
                target,
                capacity: self.cells.len(),
            });
        }
        self.pointer = target as usize;
        Ok(())
    }

    pub fn get(&self) -> u8 {
        self.cells[self.pointer]
    }

    pub fn set(&mut self, value: u8) {
        self.cells[self.pointer] = value;
    }

    pub fn pointer(&self) -> usize {
        self.pointer
    }

    pub fn cells(&self) -> &[u8] {
        &self.cells
    }

    /// Render the machine state as `(pointer)[c0,c1,…]`, with cells shown
    /// as signed or unsigned bytes.
    pub fn render(&self, signed: bool) -> String {
        let mut out = format!("({})[", self.pointer);
        for (i, &cell) in self.cells.iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            if signed {
                out.push_str(&(cell as i8).to_string());
            } else {
                out.push_str(&cell.to_string());
            }
        }
        out.push(']');
        out
    }
}
