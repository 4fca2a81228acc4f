use ddmin_core::{Classifier, Outcome};
use regex::bytes::Regex;
use std::io::{self, Write};
use std::process::{Command, Stdio};
use std::thread;
use std::time::Duration;
use tracing::debug;
use wait_timeout::ChildExt;

/// Element a file is split into before minimization.
pub trait Token: Sized {
    /// Reassembles a candidate into the bytes handed to the oracle.
    fn render(parts: &[Self]) -> Vec<u8>;
}

impl Token for u8 {
    fn render(parts: &[Self]) -> Vec<u8> {
        parts.to_vec()
    }
}

impl Token for char {
    fn render(parts: &[Self]) -> Vec<u8> {
        parts.iter().collect::<String>().into_bytes()
    }
}

impl Token for String {
    fn render(parts: &[Self]) -> Vec<u8> {
        parts.concat().into_bytes()
    }
}

/// Splits text into lines, each keeping its terminator, so rendering the
/// full list reproduces the text exactly.
pub fn split_lines(text: &str) -> Vec<String> {
    text.split_inclusive('\n').map(str::to_string).collect()
}

#[derive(Debug)]
pub enum Oracle {
    /// Fails when the pattern matches the candidate.
    Pattern(Regex),
    /// Pipes the candidate to `sh -c <script>`; a non-zero exit fails, a
    /// timeout is unresolved.
    Command {
        script: String,
        timeout: Option<Duration>,
    },
}

impl Oracle {
    pub fn pattern(pattern: &str) -> Result<Self, regex::Error> {
        Regex::new(pattern).map(Oracle::Pattern)
    }

    pub fn command(script: impl Into<String>, timeout: Option<Duration>) -> Self {
        Oracle::Command {
            script: script.into(),
            timeout,
        }
    }

    fn run_command(script: &str, timeout: Option<Duration>, data: &[u8]) -> io::Result<Outcome> {
        let mut child = Command::new("sh")
            .arg("-c")
            .arg(script)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;

        // Feed stdin from a separate thread so the timeout starts right away
        // even when the child never drains the pipe.
        let writer = child.stdin.take().map(|mut stdin| {
            let data = data.to_vec();
            thread::spawn(move || match stdin.write_all(&data) {
                Err(err) if err.kind() == io::ErrorKind::BrokenPipe => Ok(()),
                other => other,
            })
        });

        let status = match timeout {
            Some(timeout) => match child.wait_timeout(timeout)? {
                Some(status) => status,
                None => {
                    child.kill().ok();
                    let _ = child.wait();
                    // The writer unblocks once the pipe closes; a grandchild
                    // may still hold it, so it is left detached.
                    drop(writer);
                    debug!(timeout_ms = timeout.as_millis() as u64, "command timed out");
                    return Ok(Outcome::Unresolved);
                }
            },
            None => child.wait()?,
        };

        if let Some(writer) = writer {
            writer
                .join()
                .map_err(|_| io::Error::new(io::ErrorKind::Other, "stdin writer panicked"))??;
        }

        Ok(if status.success() {
            Outcome::Pass
        } else {
            Outcome::Fail
        })
    }
}

impl<T> Classifier<T> for Oracle
where
    T: Token,
{
    type Error = io::Error;

    fn classify(&mut self, input: &[T]) -> io::Result<Outcome> {
        let data = T::render(input);
        match self {
            Oracle::Pattern(regex) => Ok(if regex.is_match(&data) {
                Outcome::Fail
            } else {
                Outcome::Pass
            }),
            Oracle::Command { script, timeout } => Self::run_command(script, *timeout, &data),
        }
    }
}
