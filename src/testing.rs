//! Test doubles shared by the unit tests.

use crate::external::{Captured, ExecResult, Invocation, ProcessRunner};
use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::io;

/// Scripted result for one invocation of a program.
#[derive(Debug, Clone)]
pub(crate) enum Outcome {
    Exit { code: i32, stderr: String },
    Missing,
}

/// Records every invocation; programs succeed unless an outcome was queued.
#[derive(Default)]
pub(crate) struct FakeRunner {
    queued: RefCell<HashMap<String, VecDeque<Option<Outcome>>>>,
    calls: RefCell<Vec<Invocation>>,
}

impl FakeRunner {
    /// Queue `outcome` for the next not-yet-scripted call of `program`.
    pub(crate) fn with_outcome(self, program: &str, outcome: Outcome) -> Self {
        self.push(program, Some(outcome));
        self
    }

    /// Let the next not-yet-scripted call of `program` succeed.
    pub(crate) fn with_success(self, program: &str) -> Self {
        self.push(program, None);
        self
    }

    fn push(&self, program: &str, outcome: Option<Outcome>) {
        self.queued
            .borrow_mut()
            .entry(program.to_string())
            .or_default()
            .push_back(outcome);
    }

    pub(crate) fn calls(&self) -> Vec<Invocation> {
        self.calls.borrow().clone()
    }

    pub(crate) fn programs(&self) -> Vec<String> {
        self.calls
            .borrow()
            .iter()
            .map(|c| c.program.to_string_lossy().into_owned())
            .collect()
    }
}

impl ProcessRunner for FakeRunner {
    fn invoke(&self, invocation: &Invocation) -> ExecResult {
        self.calls.borrow_mut().push(invocation.clone());
        let program = invocation.program.to_string_lossy().into_owned();
        let outcome = self
            .queued
            .borrow_mut()
            .get_mut(&program)
            .and_then(VecDeque::pop_front)
            .flatten();
        match outcome {
            None => ExecResult::Success(Captured::default()),
            Some(Outcome::Exit { code, stderr }) => ExecResult::NonZeroExit {
                code,
                captured: Captured {
                    stdout: String::new(),
                    stderr,
                },
            },
            Some(Outcome::Missing) => ExecResult::LaunchFailure(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{program} not found in PATH"),
            )),
        }
    }
}
