//! Standard-stream and child-process transports.

use std::io::{Stdin, Stdout};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

use crate::error::{Result, TransportError};
use crate::reader::{LineConfig, LineReader};
use crate::writer::StreamWriter;

/// This process's stdin as a line source and stdout as a sink.
pub fn stdio(config: LineConfig) -> (LineReader<Stdin>, StreamWriter<Stdout>) {
    (
        LineReader::with_config(std::io::stdin(), config),
        StreamWriter::new(std::io::stdout()),
    )
}

/// A spawned child process whose stdout is read as lines and whose stdin
/// receives frames.
///
/// Stderr is inherited. Dropping `sink` closes the child's stdin.
pub struct ChildPipes {
    pub child: Child,
    pub source: LineReader<ChildStdout>,
    pub sink: StreamWriter<ChildStdin>,
}

impl ChildPipes {
    /// Spawn `command` with piped stdin/stdout.
    pub fn spawn(command: &mut Command, config: LineConfig) -> Result<Self> {
        let program = command.get_program().to_string_lossy().into_owned();
        let mut child = command
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .spawn()
            .map_err(|source| TransportError::Spawn {
                program: program.clone(),
                source,
            })?;

        let (Some(stdin), Some(stdout)) = (child.stdin.take(), child.stdout.take()) else {
            let _ = child.kill();
            let _ = child.wait();
            return Err(TransportError::Io(std::io::Error::other(format!(
                "{program} spawned without piped stdio"
            ))));
        };

        tracing::debug!(program = %program, pid = child.id(), "spawned child transport");

        Ok(Self {
            child,
            source: LineReader::with_config(stdout, config),
            sink: StreamWriter::new(stdin),
        })
    }

    /// Split into the child handle, its line source, and its sink.
    pub fn into_parts(self) -> (Child, LineReader<ChildStdout>, StreamWriter<ChildStdin>) {
        (self.child, self.source, self.sink)
    }
}
