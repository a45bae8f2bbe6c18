//! Blocking subprocess execution for compiler and linker invocations

use std::collections::HashMap;
use std::ffi::{OsStr, OsString};
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};

use anyhow::{Context, Result};

use crate::error::{hints, BuildError};

/// One external command line: a program plus its arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Program name or path
    pub program: OsString,

    /// Arguments in order
    pub args: Vec<OsString>,
}

impl Invocation {
    /// Create an invocation with no arguments
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Append one argument
    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    /// Append several arguments
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args
            .extend(args.into_iter().map(|a| a.as_ref().to_os_string()));
        self
    }

    /// Program followed by arguments, lossily converted to strings
    pub fn to_argv(&self) -> Vec<String> {
        std::iter::once(&self.program)
            .chain(self.args.iter())
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for word in self.to_argv() {
            if !first {
                f.write_str(" ")?;
            }
            first = false;
            if word.is_empty() || word.contains(char::is_whitespace) {
                write!(f, "\"{}\"", word)?;
            } else {
                f.write_str(&word)?;
            }
        }
        Ok(())
    }
}

/// Exit status of a finished external process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolStatus {
    code: Option<i32>,
}

impl ToolStatus {
    /// Status for a process that exited with `code`
    pub fn from_code(code: i32) -> Self {
        Self { code: Some(code) }
    }

    /// Status for a process killed before it could exit
    pub fn terminated() -> Self {
        Self { code: None }
    }

    /// Whether the process exited with code 0
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// Exit code, if the process exited normally
    pub fn code(&self) -> Option<i32> {
        self.code
    }
}

impl From<ExitStatus> for ToolStatus {
    fn from(status: ExitStatus) -> Self {
        match status.code() {
            Some(code) => Self::from_code(code),
            None => Self::terminated(),
        }
    }
}

impl fmt::Display for ToolStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(code) => write!(f, "exit code {}", code),
            None => write!(f, "terminated by signal"),
        }
    }
}

/// Runs compiler and linker invocations to completion
///
/// Each call blocks until the external process exits.
pub trait Toolchain {
    fn run(&mut self, invocation: &Invocation) -> Result<ToolStatus>;
}

/// [`Toolchain`] that spawns real processes from the project root with
/// inherited stdio, so compiler diagnostics reach the terminal unchanged.
#[derive(Debug)]
pub struct ProcessToolchain {
    root: PathBuf,
    resolved: HashMap<OsString, PathBuf>,
}

impl ProcessToolchain {
    /// Create a toolchain that runs programs from `root`
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            resolved: HashMap::new(),
        }
    }

    /// Find `program` on PATH (or relative to the project root), once per program
    fn locate(&mut self, program: &OsStr) -> Result<PathBuf> {
        if let Some(path) = self.resolved.get(program) {
            return Ok(path.clone());
        }

        let path = which::which_in(program, std::env::var_os("PATH"), &self.root).map_err(|_| {
            let tool = program.to_string_lossy();
            BuildError::missing_tool(tool.as_ref(), "compiling and linking", hints::compiler(&tool))
        })?;

        self.resolved.insert(program.to_os_string(), path.clone());
        Ok(path)
    }
}

impl Toolchain for ProcessToolchain {
    fn run(&mut self, invocation: &Invocation) -> Result<ToolStatus> {
        let program = self.locate(&invocation.program)?;

        let status = Command::new(&program)
            .args(&invocation.args)
            .current_dir(&self.root)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .with_context(|| format!("Failed to execute {}", program.display()))?;

        Ok(status.into())
    }
}
