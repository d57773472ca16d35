//! Running external programs
//!
//! Every program Tusk starts (browser, image viewer, editor, ...) is described
//! by a [`LaunchRequest`]. A request runs either in the background, detached
//! from the terminal and concurrently with the UI, or in the foreground, where
//! the child owns the terminal and the UI has to step aside until it exits.
//!
//! Stepping aside is the UI's business and is expressed through [`Suspend`].
//! Foreground requests are only ever run through `&mut` access to the
//! suspender, so two of them can never hold the terminal at once.

use std::process::{Command, Stdio};

use crate::error::{Error, Result};

/// How a request interacts with the terminal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchMode {
    /// Detached from the terminal, fire and forget
    Background,
    /// Owns the terminal until it exits
    Foreground,
}

impl LaunchMode {
    /// Foreground for terminal programs, background otherwise
    pub const fn from_terminal(terminal: bool) -> Self {
        if terminal {
            Self::Foreground
        } else {
            Self::Background
        }
    }
}

/// One invocation of an external program
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchRequest {
    /// Program name or path
    pub program: String,
    /// Arguments, in order
    pub args: Vec<String>,
    /// Terminal ownership
    pub mode: LaunchMode,
}

impl LaunchRequest {
    /// Build a request from a program, its fixed arguments and trailing arguments
    pub fn new(
        program: &str,
        fixed: &[String],
        trailing: impl IntoIterator<Item = String>,
        mode: LaunchMode,
    ) -> Self {
        let mut args = fixed.to_vec();
        args.extend(trailing);
        Self {
            program: program.to_string(),
            args,
            mode,
        }
    }

    /// Whether this request needs the terminal
    pub fn is_foreground(&self) -> bool {
        self.mode == LaunchMode::Foreground
    }
}

/// Split a configured command line like `mpv --fs` into program and arguments
pub fn split_command(line: &str) -> Result<(String, Vec<String>)> {
    let mut parts = line.split_whitespace().map(String::from);
    let program = parts
        .next()
        .ok_or_else(|| Error::Config("Empty command".to_string()))?;
    Ok((program, parts.collect()))
}

/// The UI side of a foreground launch.
///
/// `suspend` must stop drawing and reading input, give the real terminal back
/// to the user, run `f`, and then take the terminal back, whatever `f`
/// returned.
pub trait Suspend {
    /// Run `f` while the UI is suspended
    fn suspend<R>(&mut self, f: impl FnOnce() -> R) -> Result<R>;
}

/// Suspender for when no UI owns the terminal (plain CLI use)
#[derive(Debug, Default, Clone, Copy)]
pub struct NoTui;

impl Suspend for NoTui {
    fn suspend<R>(&mut self, f: impl FnOnce() -> R) -> Result<R> {
        Ok(f())
    }
}

/// Something that can carry out launch requests
pub trait Launcher {
    /// Start a request without waiting for it. Failures are not reported.
    fn run_background(&mut self, request: &LaunchRequest);

    /// Run a request to completion with exclusive use of the terminal
    fn run_foreground(&mut self, request: &LaunchRequest) -> Result<()>;
}

/// Launches real processes, suspending `ui` for foreground ones
pub struct ProcessRunner<'a, S: Suspend> {
    ui: &'a mut S,
}

impl<'a, S: Suspend> ProcessRunner<'a, S> {
    /// Create a runner bound to a UI
    pub const fn new(ui: &'a mut S) -> Self {
        Self { ui }
    }
}

impl<S: Suspend> Launcher for ProcessRunner<'_, S> {
    fn run_background(&mut self, request: &LaunchRequest) {
        tracing::debug!("Starting {} {:?} in background", request.program, request.args);

        let child = Command::new(&request.program)
            .args(&request.args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn();
        let mut child = match child {
            Ok(child) => child,
            Err(e) => {
                tracing::warn!("Failed to launch {}: {e}", request.program);
                return;
            }
        };

        // One waiter thread per child so it gets reaped. A viewer that never
        // exits keeps its thread parked, nothing else.
        let program = request.program.clone();
        let spawned = std::thread::Builder::new()
            .name(format!("launch-{program}"))
            .spawn(move || match child.wait() {
                Ok(status) if !status.success() => {
                    tracing::debug!("{program} exited with {status}");
                }
                Ok(_) => {}
                Err(e) => tracing::warn!("Failed to wait for {program}: {e}"),
            });
        if let Err(e) = spawned {
            tracing::warn!("Could not start waiter thread: {e}");
        }
    }

    fn run_foreground(&mut self, request: &LaunchRequest) -> Result<()> {
        tracing::debug!("Running {} {:?} in terminal", request.program, request.args);

        let status = self.ui.suspend(|| {
            Command::new(&request.program)
                .args(&request.args)
                .stdin(Stdio::inherit())
                .stdout(Stdio::inherit())
                .stderr(Stdio::inherit())
                .status()
        })?;

        let status = status.map_err(|source| Error::Launch {
            program: request.program.clone(),
            source,
        })?;
        if !status.success() {
            return Err(Error::Exited {
                program: request.program.clone(),
                status,
            });
        }
        Ok(())
    }
}

/// Carry out a batch of requests.
///
/// All background requests are started first, so a slow viewer never holds
/// up the terminal programs. Foreground requests then run one at a time, in
/// the order given. The first foreground failure stops the sequence and is
/// returned.
pub fn execute<L: Launcher>(launcher: &mut L, requests: &[LaunchRequest]) -> Result<()> {
    for request in requests.iter().filter(|r| !r.is_foreground()) {
        launcher.run_background(request);
    }
    for request in requests.iter().filter(|r| r.is_foreground()) {
        launcher.run_foreground(request)?;
    }
    Ok(())
}
