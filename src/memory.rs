/// Growable, zero-fill-on-demand Intcode memory.
///
/// Memory is an index-addressed sequence of signed 64-bit cells, created as a
/// deep copy of a program image. Reads beyond the current length yield 0
/// without growing anything; writes beyond the current length zero-fill up to
/// the target cell first. The length only ever grows.
///
/// Negative addresses never reach this type: the execution engine rejects
/// them as addressing errors before indexing, so the API here is
/// `usize`-addressed and infallible.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Memory {
    cells: Vec<i64>,
}

impl Memory {
    /// Create memory from a program image. The image is copied; the caller's
    /// buffer is never aliased or mutated.
    pub fn new(image: &[i64]) -> Self {
        Self {
            cells: image.to_vec(),
        }
    }

    /// Read the cell at `addr`. Addresses at or beyond the current length
    /// read as 0.
    pub fn read(&self, addr: usize) -> i64 {
        self.cells.get(addr).copied().unwrap_or(0)
    }

    /// Write `value` to `addr`, zero-filling any gap between the current end
    /// of memory and the target cell.
    pub fn write(&mut self, addr: usize, value: i64) {
        if addr >= self.cells.len() {
            self.cells.resize(addr + 1, 0);
        }
        self.cells[addr] = value;
    }

    /// Current number of allocated cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// True when no cells are allocated (an empty program image before any
    /// write).
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// The allocated cells as a slice.
    pub fn as_slice(&self) -> &[i64] {
        &self.cells
    }
}
