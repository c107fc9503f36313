// ffstuff-core/src/external/mocks.rs

// --- Scripted launcher (for testing) ---

use super::{InvocationRequest, InvocationResult, ProcessLauncher};
use crate::error::{CoreResult, launch_error};
use std::cell::RefCell;
use std::io;

/// Scripted response for requests mentioning a pattern.
enum Scripted {
    Result(InvocationResult),
    LaunchError(io::ErrorKind),
}

struct Expectation {
    arg_pattern: String,
    response: Scripted,
}

/// Launcher that records every request and answers from a script.
///
/// Responses are chosen by the first registered pattern contained in any
/// argument of the request and are reused for every matching request.
/// Unmatched requests succeed with empty output.
#[derive(Default)]
pub struct FakeLauncher {
    expectations: RefCell<Vec<Expectation>>,
    received: RefCell<Vec<InvocationRequest>>,
}

impl FakeLauncher {
    pub fn new() -> Self {
        Default::default()
    }

    /// Answers matching requests with `result`.
    pub fn respond(&self, arg_pattern: &str, result: InvocationResult) -> &Self {
        self.expectations.borrow_mut().push(Expectation {
            arg_pattern: arg_pattern.to_string(),
            response: Scripted::Result(result),
        });
        self
    }

    /// Answers matching requests with a successful run emitting `stderr`.
    pub fn respond_with_stderr(&self, arg_pattern: &str, stderr: &str) -> &Self {
        self.respond(arg_pattern, InvocationResult::with_stderr(stderr))
    }

    /// Answers matching requests with a non-zero exit.
    pub fn respond_with_failure(&self, arg_pattern: &str, code: i32, stderr: &str) -> &Self {
        self.respond(arg_pattern, InvocationResult::failed(code, stderr))
    }

    /// Fails to launch matching requests, as the OS would.
    pub fn fail_launch(&self, arg_pattern: &str, kind: io::ErrorKind) -> &Self {
        self.expectations.borrow_mut().push(Expectation {
            arg_pattern: arg_pattern.to_string(),
            response: Scripted::LaunchError(kind),
        });
        self
    }

    pub fn received(&self) -> Vec<InvocationRequest> {
        self.received.borrow().clone()
    }

    pub fn call_count(&self) -> usize {
        self.received.borrow().len()
    }

    /// Number of recorded requests mentioning `pattern`.
    pub fn calls_mentioning(&self, pattern: &str) -> usize {
        self.received
            .borrow()
            .iter()
            .filter(|request| request.mentions(pattern))
            .count()
    }
}

impl ProcessLauncher for FakeLauncher {
    fn launch(&self, request: &InvocationRequest) -> CoreResult<InvocationResult> {
        self.received.borrow_mut().push(request.clone());

        let expectations = self.expectations.borrow();
        let matched = expectations
            .iter()
            .find(|exp| request.mentions(&exp.arg_pattern));

        match matched.map(|exp| (&exp.arg_pattern, &exp.response)) {
            Some((pattern, Scripted::Result(result))) => {
                log::debug!("FakeLauncher: matched pattern '{}'", pattern);
                Ok(result.clone())
            }
            Some((pattern, Scripted::LaunchError(kind))) => {
                log::debug!("FakeLauncher: simulating launch error for '{}'", pattern);
                Err(launch_error(
                    &request.tool().to_string(),
                    io::Error::from(*kind),
                ))
            }
            None => Ok(InvocationResult::with_stderr("")),
        }
    }
}

impl std::fmt::Debug for FakeLauncher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FakeLauncher")
            .field("expectations", &self.expectations.borrow().len())
            .field("received", &self.received.borrow().len())
            .finish()
    }
}
