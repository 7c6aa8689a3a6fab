//! The Intcode execution engine: a fetch/decode/execute loop over growable
//! integer memory, with a program counter, a relative-base register, and a
//! suspend-on-output contract that returns control to the host after every
//! produced value.

use crate::decode::{Instruction, Opcode, ParamMode, decode};
use crate::error::VmError;
use crate::memory::Memory;
use crate::ports::{InputPort, OutputPort};

/// Result of a successful `run_to_output` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// An `output` instruction executed. The value has already been emitted
    /// to the output port and `ip` has advanced past the instruction, so the
    /// next call resumes correctly.
    Suspended(i64),
    /// Opcode 99 executed. Terminal.
    Halted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Status {
    Running,
    Halted,
    Failed(VmError),
}

/// A single Intcode machine: memory, program counter, relative base, and the
/// two host-supplied ports.
///
/// Construction deep-copies the program image, so the caller's buffer is
/// never mutated by execution. [`Vm::fork`] is the only way to duplicate a
/// machine; afterwards the two instances share nothing.
pub struct Vm<I, O> {
    memory: Memory,
    ip: usize,
    relbase: i64,
    status: Status,
    input: I,
    output: O,
    trace: bool,
}

impl<I: InputPort, O: OutputPort> Vm<I, O> {
    pub fn new(image: &[i64], input: I, output: O) -> Self {
        Self {
            memory: Memory::new(image),
            ip: 0,
            relbase: 0,
            status: Status::Running,
            input,
            output,
            trace: false,
        }
    }

    /// Print each decoded instruction to stderr as it executes.
    pub fn set_trace(&mut self, trace: bool) {
        self.trace = trace;
    }

    /// Execute instructions until the next output, halt, or failure.
    ///
    /// Hosts call this repeatedly: consume the value on
    /// [`RunState::Suspended`], stop on [`RunState::Halted`], abort on `Err`.
    /// Halted and failed machines latch; repeat calls return the terminal
    /// result again without decoding anything.
    pub fn run_to_output(&mut self) -> Result<RunState, VmError> {
        match &self.status {
            Status::Running => {}
            Status::Halted => return Ok(RunState::Halted),
            Status::Failed(e) => return Err(e.clone()),
        }
        loop {
            if self.ip >= self.memory.len() {
                // Memory may have grown since construction; this compares
                // against the current length.
                let err = VmError::MissingHalt {
                    ip: self.ip,
                    len: self.memory.len(),
                };
                return Err(self.fail(err));
            }
            let word = self.memory.read(self.ip);
            let instr = match decode(word, self.ip) {
                Ok(instr) => instr,
                Err(e) => return Err(self.fail(e)),
            };
            if self.trace {
                self.trace_instruction(&instr);
            }
            match self.execute(&instr) {
                Ok(Some(state)) => return Ok(state),
                Ok(None) => {}
                Err(e) => return Err(self.fail(e)),
            }
        }
    }

    /// Drive `run_to_output` until the program halts. Produced values reach
    /// the output port as usual.
    pub fn run_to_halt(&mut self) -> Result<(), VmError> {
        loop {
            match self.run_to_output()? {
                RunState::Suspended(_) => continue,
                RunState::Halted => return Ok(()),
            }
        }
    }

    /// Fork this machine: deep-copy memory, copy ip/relbase, attach fresh
    /// ports. The original and the fork are fully independent afterwards.
    pub fn fork<I2: InputPort, O2: OutputPort>(&self, input: I2, output: O2) -> Vm<I2, O2> {
        Vm {
            memory: self.memory.clone(),
            ip: self.ip,
            relbase: self.relbase,
            status: self.status.clone(),
            input,
            output,
            trace: self.trace,
        }
    }

    pub fn ip(&self) -> usize {
        self.ip
    }

    pub fn relbase(&self) -> i64 {
        self.relbase
    }

    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    pub fn output(&self) -> &O {
        &self.output
    }

    pub fn into_ports(self) -> (I, O) {
        (self.input, self.output)
    }

    fn fail(&mut self, err: VmError) -> VmError {
        self.status = Status::Failed(err.clone());
        err
    }

    /// Execute one decoded instruction. `Some(state)` means control returns
    /// to the host; `None` means the loop continues. Every instruction
    /// either fully commits its effect or fails before mutating.
    fn execute(&mut self, instr: &Instruction) -> Result<Option<RunState>, VmError> {
        match instr.opcode {
            Opcode::Add => {
                let a = self.operand(instr, 1)?;
                let b = self.operand(instr, 2)?;
                let dst = self.write_target(instr, 3)?;
                self.memory.write(dst, a.wrapping_add(b));
                self.ip += 4;
            }
            Opcode::Multiply => {
                let a = self.operand(instr, 1)?;
                let b = self.operand(instr, 2)?;
                let dst = self.write_target(instr, 3)?;
                self.memory.write(dst, a.wrapping_mul(b));
                self.ip += 4;
            }
            Opcode::Input => {
                let dst = self.write_target(instr, 1)?;
                let value = self.input.next().map_err(|e| VmError::Input {
                    ip: self.ip,
                    reason: e.0,
                })?;
                self.memory.write(dst, value);
                self.ip += 2;
            }
            Opcode::Output => {
                let value = self.operand(instr, 1)?;
                self.output.emit(value);
                self.ip += 2;
                return Ok(Some(RunState::Suspended(value)));
            }
            Opcode::JumpIfTrue => {
                if self.operand(instr, 1)? != 0 {
                    let target = self.operand(instr, 2)?;
                    self.ip = self.address(target)?;
                } else {
                    self.ip += 3;
                }
            }
            Opcode::JumpIfFalse => {
                if self.operand(instr, 1)? == 0 {
                    let target = self.operand(instr, 2)?;
                    self.ip = self.address(target)?;
                } else {
                    self.ip += 3;
                }
            }
            Opcode::LessThan => {
                let a = self.operand(instr, 1)?;
                let b = self.operand(instr, 2)?;
                let dst = self.write_target(instr, 3)?;
                self.memory.write(dst, (a < b) as i64);
                self.ip += 4;
            }
            Opcode::Equals => {
                let a = self.operand(instr, 1)?;
                let b = self.operand(instr, 2)?;
                let dst = self.write_target(instr, 3)?;
                self.memory.write(dst, (a == b) as i64);
                self.ip += 4;
            }
            Opcode::AdjustRelBase => {
                let delta = self.operand(instr, 1)?;
                self.relbase = self.relbase.wrapping_add(delta);
                self.ip += 2;
            }
            Opcode::Halt => {
                self.status = Status::Halted;
                return Ok(Some(RunState::Halted));
            }
        }
        Ok(None)
    }

    /// Resolve the i-th argument (1-based) for reading under its mode.
    fn operand(&self, instr: &Instruction, i: usize) -> Result<i64, VmError> {
        let raw = self.memory.read(self.ip + i);
        match instr.modes[i - 1] {
            ParamMode::Position => Ok(self.memory.read(self.address(raw)?)),
            ParamMode::Immediate => Ok(raw),
            ParamMode::Relative => {
                let addr = self.address(raw.wrapping_add(self.relbase))?;
                Ok(self.memory.read(addr))
            }
        }
    }

    /// Resolve the i-th argument (1-based) to an absolute write address.
    /// Immediate mode is never a valid write target.
    fn write_target(&self, instr: &Instruction, i: usize) -> Result<usize, VmError> {
        let raw = self.memory.read(self.ip + i);
        match instr.modes[i - 1] {
            ParamMode::Position => self.address(raw),
            ParamMode::Relative => self.address(raw.wrapping_add(self.relbase)),
            ParamMode::Immediate => Err(VmError::ImmediateWriteTarget {
                opcode: instr.opcode.name(),
                ip: self.ip,
            }),
        }
    }

    fn address(&self, raw: i64) -> Result<usize, VmError> {
        usize::try_from(raw).map_err(|_| VmError::NegativeAddress {
            addr: raw,
            ip: self.ip,
        })
    }

    fn trace_instruction(&self, instr: &Instruction) {
        let end = (self.ip + instr.opcode.arity() + 1).min(self.memory.len());
        eprintln!(
            "ip={} relbase={} {} {:?}",
            self.ip,
            self.relbase,
            instr.opcode.name(),
            &self.memory.as_slice()[self.ip + 1..end],
        );
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::ports::{CollectOutput, ScriptedInput};
    use proptest::prelude::*;

    fn single_output(image: &[i64], inputs: &[i64]) -> i64 {
        let mut vm = Vm::new(
            image,
            ScriptedInput::new(inputs.iter().copied()),
            CollectOutput::new(),
        );
        match vm.run_to_output() {
            Ok(RunState::Suspended(v)) => v,
            other => panic!("expected one output, got {other:?}"),
        }
    }

    proptest! {
        #[test]
        fn add_matches_wrapping_add(a in any::<i64>(), b in any::<i64>()) {
            let image = [1101, a, b, 7, 4, 7, 99, 0];
            prop_assert_eq!(single_output(&image, &[]), a.wrapping_add(b));
        }

        #[test]
        fn multiply_matches_wrapping_mul(a in any::<i64>(), b in any::<i64>()) {
            let image = [1102, a, b, 7, 4, 7, 99, 0];
            prop_assert_eq!(single_output(&image, &[]), a.wrapping_mul(b));
        }

        #[test]
        fn less_than_matches_native_comparison(a in any::<i64>(), b in any::<i64>()) {
            let image = [1107, a, b, 7, 4, 7, 99, 0];
            prop_assert_eq!(single_output(&image, &[]), (a < b) as i64);
        }

        #[test]
        fn equals_matches_native_comparison(a in any::<i64>(), b in any::<i64>()) {
            let image = [1108, a, b, 7, 4, 7, 99, 0];
            prop_assert_eq!(single_output(&image, &[]), (a == b) as i64);
        }

        #[test]
        fn jump_if_true_selects_branch(c in any::<i64>()) {
            let image = [1105, c, 7, 104, 0, 99, 0, 104, 1, 99];
            prop_assert_eq!(single_output(&image, &[]), (c != 0) as i64);
        }

        #[test]
        fn echo_round_trips_any_input(v in any::<i64>()) {
            let image = [3, 5, 4, 5, 99, 0];
            prop_assert_eq!(single_output(&image, &[v]), v);
        }
    }
}
