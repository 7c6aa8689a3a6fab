use thiserror::Error;

/// Errors that abort VM execution.
///
/// All of these are terminal: once `run_to_output` returns one of them the
/// machine latches into a failed state and decodes nothing further. Each
/// variant carries the instruction pointer at the point of failure so hosts
/// can report and terminate.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VmError {
    /// The low two digits of the instruction word name no opcode.
    #[error("unknown opcode in word {word} at ip {ip}")]
    UnknownOpcode { word: i64, ip: usize },
    /// A parameter-mode digit was something other than 0, 1, or 2.
    #[error("unknown parameter mode {digit} in word {word} at ip {ip}")]
    UnknownParamMode { word: i64, digit: i64, ip: usize },
    /// A write target resolved through immediate mode.
    #[error("{opcode} at ip {ip} uses an immediate-mode write target")]
    ImmediateWriteTarget { opcode: &'static str, ip: usize },
    /// An address resolved to a negative value.
    #[error("negative address {addr} resolved at ip {ip}")]
    NegativeAddress { addr: i64, ip: usize },
    /// The instruction pointer ran past the end of memory without a halt.
    #[error("no halt before end of memory (ip {ip}, memory length {len})")]
    MissingHalt { ip: usize, len: usize },
    /// The input port failed to produce a value.
    #[error("input port failed at ip {ip}: {reason}")]
    Input { ip: usize, reason: String },
}
