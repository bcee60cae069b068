use crate::error::{Error, Result};

/// Sinusoidal drive on node 1: offset 0, amplitude 100, frequency 1.
pub const SOURCE_LINE: &str = "V1 1 0 SINE(0 100 1)";
pub const TRAN_LINE: &str = ".tran 0 3 0 0.001";
pub const END_LINE: &str = ".end";

/// Series resistance between neighbouring nodes.
pub const CHAIN_OHMS: u32 = 1;
/// Resistance from each node to ground.
pub const LEAK_OHMS: u32 = 1000;

/// Resistor ladder with `size` nodes driven by a sine source.
///
/// Node `i` connects to node `i + 1` through a chain resistor `R<i>` and to
/// ground through a leak resistor `R<i + size>`, for `i` in `1..size`. The
/// offset keeps the two identifier families disjoint.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LadderNetlist {
    size: usize,
}

impl LadderNetlist {
    pub fn new(size: usize) -> Result<Self> {
        if size < 2 {
            return Err(Error::InvalidSize(size));
        }
        Ok(Self { size })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn file_name(&self) -> String {
        format!("netlist{}.cir", self.size)
    }

    /// `R<i> <i> <i+1> 1`
    pub fn chain_line(&self, i: usize) -> String {
        format!("R{} {} {} {}", i, i, i + 1, CHAIN_OHMS)
    }

    /// `R<i+size> <i> 0 1000`
    pub fn leak_line(&self, i: usize) -> String {
        format!("R{} {} 0 {}", i + self.size, i, LEAK_OHMS)
    }

    pub fn lines(&self) -> Vec<String> {
        let mut lines = Vec::with_capacity(2 * self.size + 2);

        lines.push(format!("*{}", self.size));
        lines.push(SOURCE_LINE.to_string());
        for i in 1..self.size {
            lines.push(self.chain_line(i));
            lines.push(self.leak_line(i));
        }
        lines.push(TRAN_LINE.to_string());
        lines.push(END_LINE.to_string());

        lines
    }

    /// Netlist text, every line newline-terminated.
    pub fn render(&self) -> String {
        let mut text = String::new();
        for line in self.lines() {
            text.push_str(&line);
            text.push('\n');
        }
        text
    }
}
