//! Subprocess execution for git and the Gradle wrapper.
//!
//! Commands run in a fixed working directory. Both output streams are
//! echoed line-by-line to the bot's own stdout/stderr while being buffered,
//! so CI logs show progress and failures still carry the full output.

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use console::style;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;

use crate::error::Result;

/// Captured result of a successful command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecOutput {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

/// A command that exited with a non-zero status
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecError {
    pub command: Vec<String>,
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl ExecError {
    /// Combined stdout and stderr, or `None` when both are blank
    pub fn log(&self) -> Option<String> {
        let log = [self.stdout.as_str(), self.stderr.as_str()]
            .iter()
            .filter(|s| !s.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join("\n");
        let log = log.trim();
        (!log.is_empty()).then(|| log.to_string())
    }
}

impl fmt::Display for ExecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Failed to execute command: $ {}", self.command.join(" "))?;
        write!(f, "Exit code: {}", self.exit_code)?;
        if let Some(log) = self.log() {
            write!(f, "\n\nOutput:\n{}", log)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExecError {}

#[derive(Debug, Clone, Copy)]
enum Sink {
    Stdout,
    Stderr,
}

/// Runs external commands in a working directory
#[derive(Debug, Clone)]
pub struct Shell {
    workdir: PathBuf,
    echo: bool,
}

impl Shell {
    pub fn new(workdir: impl Into<PathBuf>) -> Self {
        Shell {
            workdir: workdir.into(),
            echo: true,
        }
    }

    /// Stop echoing commands and their output
    pub fn quiet(mut self) -> Self {
        self.echo = false;
        self
    }

    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    /// Run `program` with `args` and wait for it to exit.
    ///
    /// stdout and stderr are drained concurrently and both drains finish
    /// before the exit status is inspected. The child is killed if the
    /// returned future is dropped before completion.
    ///
    /// # Returns
    /// * `Ok(ExecOutput)` - The process exited with code 0
    /// * `Err(BotError::Exec)` - Non-zero exit, with the captured output
    /// * `Err(BotError::Io)` - The process could not be spawned
    pub async fn run<I, S>(&self, program: &str, args: I) -> Result<ExecOutput>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let args: Vec<String> = args.into_iter().map(|a| a.as_ref().to_string()).collect();
        let mut command_line = Vec::with_capacity(args.len() + 1);
        command_line.push(program.to_string());
        command_line.extend(args.iter().cloned());

        if self.echo {
            println!("{}", style(command_line.join(" ")).cyan());
        }

        let mut child = Command::new(program)
            .args(&args)
            .current_dir(&self.workdir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| std::io::Error::other("stdout was not captured"))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| std::io::Error::other("stderr was not captured"))?;

        let (status, stdout, stderr) = tokio::try_join!(
            child.wait(),
            drain(stdout, self.echo.then_some(Sink::Stdout)),
            drain(stderr, self.echo.then_some(Sink::Stderr)),
        )?;

        let exit_code = status.code().unwrap_or(-1);
        if exit_code != 0 {
            return Err(ExecError {
                command: command_line,
                exit_code,
                stdout,
                stderr,
            }
            .into());
        }

        Ok(ExecOutput {
            exit_code,
            stdout,
            stderr,
        })
    }
}

/// Echo and capture `reader` line by line.
///
/// Invalid UTF-8 is replaced with U+FFFD rather than failing the command.
async fn drain<R>(reader: R, sink: Option<Sink>) -> std::io::Result<String>
where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();
    let mut captured = Vec::new();
    while reader.read_until(b'\n', &mut buf).await? > 0 {
        if buf.last() == Some(&b'\n') {
            buf.pop();
            if buf.last() == Some(&b'\r') {
                buf.pop();
            }
        }
        let line = String::from_utf8_lossy(&buf).into_owned();
        match sink {
            Some(Sink::Stdout) => println!("{}", line),
            Some(Sink::Stderr) => eprintln!("{}", line),
            None => {}
        }
        captured.push(line);
        buf.clear();
    }
    Ok(captured.join("\n"))
}
