use std::fmt;

use crate::error::VmError;

/// Largest number of arguments any opcode takes.
pub const MAX_ARITY: usize = 3;

/// Addressing mode for a single instruction argument.
///
/// Decoded from one decimal digit of the instruction word; never persisted
/// beyond the instruction being executed.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ParamMode {
    /// The argument cell holds an address; the operand is the cell at that
    /// address.
    Position,
    /// The argument cell holds the operand itself. Never valid as a write
    /// target.
    Immediate,
    /// Like Position, with the VM's relative base added to the address.
    Relative,
}

impl ParamMode {
    fn from_digit(digit: i64, word: i64, ip: usize) -> Result<Self, VmError> {
        match digit {
            0 => Ok(ParamMode::Position),
            1 => Ok(ParamMode::Immediate),
            2 => Ok(ParamMode::Relative),
            _ => Err(VmError::UnknownParamMode { digit, word, ip }),
        }
    }
}

/// The Intcode instruction set.
///
/// The opcode number is the low two decimal digits of the instruction word.
/// Arity is fixed per opcode; the dispatch table is this enum plus a pure
/// match in the execution engine, with no mutable global state.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Opcode {
    Add,
    Multiply,
    Input,
    Output,
    JumpIfTrue,
    JumpIfFalse,
    LessThan,
    Equals,
    AdjustRelBase,
    Halt,
}

impl Opcode {
    fn from_word(word: i64, ip: usize) -> Result<Self, VmError> {
        // Negative words have a non-positive remainder and never match.
        match word % 100 {
            1 => Ok(Opcode::Add),
            2 => Ok(Opcode::Multiply),
            3 => Ok(Opcode::Input),
            4 => Ok(Opcode::Output),
            5 => Ok(Opcode::JumpIfTrue),
            6 => Ok(Opcode::JumpIfFalse),
            7 => Ok(Opcode::LessThan),
            8 => Ok(Opcode::Equals),
            9 => Ok(Opcode::AdjustRelBase),
            99 => Ok(Opcode::Halt),
            _ => Err(VmError::UnknownOpcode { word, ip }),
        }
    }

    /// Number of argument cells following the instruction word.
    pub const fn arity(self) -> usize {
        match self {
            Opcode::Add | Opcode::Multiply | Opcode::LessThan | Opcode::Equals => 3,
            Opcode::JumpIfTrue | Opcode::JumpIfFalse => 2,
            Opcode::Input | Opcode::Output | Opcode::AdjustRelBase => 1,
            Opcode::Halt => 0,
        }
    }

    /// Mnemonic used in diagnostics and disassembly.
    pub const fn name(self) -> &'static str {
        match self {
            Opcode::Add => "add",
            Opcode::Multiply => "multiply",
            Opcode::Input => "input",
            Opcode::Output => "output",
            Opcode::JumpIfTrue => "jump-if-true",
            Opcode::JumpIfFalse => "jump-if-false",
            Opcode::LessThan => "less-than",
            Opcode::Equals => "equals",
            Opcode::AdjustRelBase => "adjust-relbase",
            Opcode::Halt => "halt",
        }
    }
}

/// A decoded instruction word: the opcode plus one mode per argument.
///
/// Mode slots beyond the opcode's arity stay `Position` and are never read.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Instruction {
    pub opcode: Opcode,
    pub modes: [ParamMode; MAX_ARITY],
}

/// Decode the instruction word at `ip`.
///
/// `opcode = word mod 100`; the remaining quotient yields one mode digit per
/// declared argument, least-significant digit first. Digits above the
/// opcode's arity are ignored, matching the reference behavior.
pub fn decode(word: i64, ip: usize) -> Result<Instruction, VmError> {
    let opcode = Opcode::from_word(word, ip)?;
    let mut modes = [ParamMode::Position; MAX_ARITY];
    let mut digits = word / 100;
    for slot in modes.iter_mut().take(opcode.arity()) {
        *slot = ParamMode::from_digit(digits % 10, word, ip)?;
        digits /= 10;
    }
    Ok(Instruction { opcode, modes })
}

/// Pretty-print a best-effort disassembly of a program image.
///
/// Decoding restarts after every instruction boundary; words that do not
/// decode are shown as data and skipped one cell at a time. Operands are
/// prefixed by mode: `@` position, `#` immediate, `~` relative.
pub fn disassemble(image: &[i64]) -> String {
    use std::fmt::Write;

    let mut out = String::new();
    let mut ip = 0;
    while ip < image.len() {
        match decode(image[ip], ip) {
            Ok(instr) => {
                let _ = write!(out, "{ip:04}: {}", instr.opcode.name());
                for i in 0..instr.opcode.arity() {
                    let cell = image.get(ip + 1 + i).copied().unwrap_or(0);
                    let _ = write!(out, " {}", Operand(instr.modes[i], cell));
                }
                let _ = writeln!(out);
                ip += instr.opcode.arity() + 1;
            }
            Err(_) => {
                let _ = writeln!(out, "{ip:04}: {} (data)", image[ip]);
                ip += 1;
            }
        }
    }
    out
}

struct Operand(ParamMode, i64);

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            ParamMode::Position => write!(f, "@{}", self.1),
            ParamMode::Immediate => write!(f, "#{}", self.1),
            ParamMode::Relative => write!(f, "~{}", self.1),
        }
    }
}
