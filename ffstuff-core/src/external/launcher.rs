// ============================================================================
// ffstuff-core/src/external/launcher.rs
// ============================================================================
//
// PROCESS LAUNCHER: Spawning the external tool
//
// `ProcessLauncher` is the seam between argument assembly and the operating
// system. `SystemLauncher` spawns a real process, drains both pipes on reader
// threads and polls the child until it exits. No timeout is applied.
//
// While it runs, the child is held in a `ProcessRegistry` so a termination
// handler on another thread can kill it before the caller exits.

use super::{InvocationRequest, InvocationResult};
use crate::error::{CoreResult, launch_error};

use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::io::{self, BufRead, BufReader, Read};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Interval between exit checks of a running child.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Something that can run an [`InvocationRequest`] to completion.
pub trait ProcessLauncher {
    /// Spawns the tool, waits for it and returns its exit code and captured output.
    ///
    /// A non-zero exit is not an error at this level; only a failed launch is.
    fn launch(&self, request: &InvocationRequest) -> CoreResult<InvocationResult>;
}

impl<L: ProcessLauncher + ?Sized> ProcessLauncher for &L {
    fn launch(&self, request: &InvocationRequest) -> CoreResult<InvocationResult> {
        (**self).launch(request)
    }
}

// ============================================================================
// RUNNING PROCESS REGISTRY
// ============================================================================

/// Children currently being waited on, keyed by process id.
///
/// Once closed by [`ProcessRegistry::terminate_all`], children registered
/// later are killed as soon as they are spawned.
#[derive(Debug, Default)]
pub struct ProcessRegistry {
    children: Mutex<HashMap<u32, Child>>,
    closed: AtomicBool,
}

static GLOBAL_REGISTRY: Lazy<Arc<ProcessRegistry>> = Lazy::new(Default::default);

impl ProcessRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The registry used by [`SystemLauncher::new`].
    pub fn global() -> Arc<ProcessRegistry> {
        Arc::clone(&GLOBAL_REGISTRY)
    }

    /// Number of children currently registered.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Kills and reaps every registered child. Returns how many were running.
    ///
    /// Launches waiting on a terminated child report it as killed by a signal.
    pub fn terminate_all(&self) -> usize {
        let mut children = self.lock();
        self.closed.store(true, Ordering::SeqCst);
        let count = children.len();
        for (pid, child) in children.iter_mut() {
            log::warn!("Terminating external process {}", pid);
            let _ = child.kill();
            let _ = child.wait();
        }
        count
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<u32, Child>> {
        // A poisoned map still holds valid children.
        self.children.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn register(&self, mut child: Child) -> u32 {
        let pid = child.id();
        let mut children = self.lock();
        if self.closed.load(Ordering::SeqCst) {
            log::warn!("Terminating external process {} started after shutdown", pid);
            let _ = child.kill();
        }
        children.insert(pid, child);
        pid
    }

    /// Polls `pid` until it exits, then removes it.
    fn wait(&self, pid: u32) -> io::Result<ExitStatus> {
        loop {
            {
                let mut children = self.lock();
                let child = children
                    .get_mut(&pid)
                    .ok_or_else(|| io::Error::other(format!("process {pid} is not registered")))?;
                if let Some(status) = child.try_wait()? {
                    children.remove(&pid);
                    return Ok(status);
                }
            }
            thread::sleep(POLL_INTERVAL);
        }
    }

    /// Kills and reaps `pid` if it is still registered.
    fn discard(&self, pid: u32) {
        if let Some(mut child) = self.lock().remove(&pid) {
            log::warn!("Terminating external process {}", pid);
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

/// Kills every tool started by a [`SystemLauncher`] using the global registry.
///
/// Meant for termination handlers; returns how many processes were running.
pub fn terminate_running_tools() -> usize {
    GLOBAL_REGISTRY.terminate_all()
}

// ============================================================================
// SYSTEM LAUNCHER
// ============================================================================

/// Launches real operating system processes via `std::process::Command`.
#[derive(Debug, Clone)]
pub struct SystemLauncher {
    registry: Arc<ProcessRegistry>,
}

impl Default for SystemLauncher {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemLauncher {
    /// A launcher registering its children in the global registry.
    pub fn new() -> Self {
        Self::with_registry(ProcessRegistry::global())
    }

    pub fn with_registry(registry: Arc<ProcessRegistry>) -> Self {
        Self { registry }
    }
}

impl ProcessLauncher for SystemLauncher {
    fn launch(&self, request: &InvocationRequest) -> CoreResult<InvocationResult> {
        let tool = request.tool().to_string();

        let mut child = Command::new(request.tool().as_os_str())
            .args(request.args())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                log::error!("Failed to launch '{}': {}", tool, e);
                launch_error(&tool, e)
            })?;

        let stdout_handle = child.stdout.take().map(drain_stdout);
        let stderr_handle = child.stderr.take().map(drain_stderr);

        let guard = ChildGuard {
            registry: &self.registry,
            pid: self.registry.register(child),
        };
        let status = self.registry.wait(guard.pid)?;

        let stdout = join_reader(stdout_handle);
        let stderr = join_reader(stderr_handle);
        log::debug!("'{}' exited with {}", tool, status);

        Ok(InvocationResult {
            code: status.code(),
            stdout,
            stderr,
        })
    }
}

/// Kills and reaps the child if the launch unwinds before it exits.
struct ChildGuard<'a> {
    registry: &'a ProcessRegistry,
    pid: u32,
}

impl Drop for ChildGuard<'_> {
    fn drop(&mut self) {
        self.registry.discard(self.pid);
    }
}

fn drain_stdout<R: Read + Send + 'static>(mut reader: R) -> JoinHandle<String> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = reader.read_to_end(&mut buf);
        String::from_utf8_lossy(&buf).into_owned()
    })
}

fn drain_stderr<R: Read + Send + 'static>(reader: R) -> JoinHandle<String> {
    thread::spawn(move || {
        let mut reader = BufReader::new(reader);
        let mut captured = Vec::new();
        let mut line = Vec::new();
        loop {
            line.clear();
            match reader.read_until(b'\n', &mut line) {
                Ok(0) | Err(_) => break,
                Ok(_) => {
                    log::trace!("ffmpeg: {}", String::from_utf8_lossy(&line).trim_end());
                    captured.extend_from_slice(&line);
                }
            }
        }
        String::from_utf8_lossy(&captured).into_owned()
    })
}

fn join_reader(handle: Option<JoinHandle<String>>) -> String {
    handle
        .and_then(|h| h.join().ok())
        .unwrap_or_default()
}
