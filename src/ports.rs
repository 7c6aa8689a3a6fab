//! The VM's only interface to the outside world: a blocking input source and
//! an output sink.
//!
//! Hosts plug in anything from scripted value queues to interactive prompts;
//! the engine calls the ports synchronously and imposes no timeout or
//! cancellation semantics of its own.

use std::collections::VecDeque;

use thiserror::Error;

/// Failure raised by an [`InputPort`]. The VM surfaces it as
/// [`VmError::Input`](crate::error::VmError::Input) with the failing ip.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct InputError(pub String);

/// Blocking source of input values for opcode 3.
pub trait InputPort {
    fn next(&mut self) -> Result<i64, InputError>;
}

/// Sink for values produced by opcode 4.
pub trait OutputPort {
    fn emit(&mut self, value: i64);
}

impl<F> InputPort for F
where
    F: FnMut() -> Result<i64, InputError>,
{
    fn next(&mut self) -> Result<i64, InputError> {
        self()
    }
}

impl<F> OutputPort for F
where
    F: FnMut(i64),
{
    fn emit(&mut self, value: i64) {
        self(value)
    }
}

/// Feeds a fixed sequence of values in order; fails once exhausted.
#[derive(Debug, Clone, Default)]
pub struct ScriptedInput {
    values: VecDeque<i64>,
    consumed: usize,
}

impl ScriptedInput {
    pub fn new(values: impl IntoIterator<Item = i64>) -> Self {
        Self {
            values: values.into_iter().collect(),
            consumed: 0,
        }
    }
}

impl InputPort for ScriptedInput {
    fn next(&mut self) -> Result<i64, InputError> {
        match self.values.pop_front() {
            Some(v) => {
                self.consumed += 1;
                Ok(v)
            }
            None => Err(InputError(format!(
                "input script exhausted after {} values",
                self.consumed
            ))),
        }
    }
}

/// Always returns the same value.
#[derive(Debug, Clone, Copy)]
pub struct ConstantInput(pub i64);

impl InputPort for ConstantInput {
    fn next(&mut self) -> Result<i64, InputError> {
        Ok(self.0)
    }
}

/// Returns `first` once, then defers to the inner port. Used by hosts that
/// seed a program with a setting before switching to a live source.
#[derive(Debug, Clone)]
pub struct PrefixedInput<I> {
    first: Option<i64>,
    rest: I,
}

impl<I> PrefixedInput<I> {
    pub fn new(first: i64, rest: I) -> Self {
        Self {
            first: Some(first),
            rest,
        }
    }
}

impl<I: InputPort> InputPort for PrefixedInput<I> {
    fn next(&mut self) -> Result<i64, InputError> {
        match self.first.take() {
            Some(v) => Ok(v),
            None => self.rest.next(),
        }
    }
}

/// Gathers every emitted value in order.
#[derive(Debug, Clone, Default)]
pub struct CollectOutput {
    pub values: Vec<i64>,
}

impl CollectOutput {
    pub fn new() -> Self {
        Self::default()
    }
}

impl OutputPort for CollectOutput {
    fn emit(&mut self, value: i64) {
        self.values.push(value);
    }
}

/// Keeps only the most recent emitted value.
#[derive(Debug, Clone, Copy, Default)]
pub struct LastOutput(pub Option<i64>);

impl OutputPort for LastOutput {
    fn emit(&mut self, value: i64) {
        self.0 = Some(value);
    }
}
