//! Scripted in-memory runner for tests.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use super::traits::{CommandError, CommandOutput, CommandRunner, Invocation};

pub const READY_STDOUT: &str = "db:5432 - accepting connections\n";
pub const NO_RESPONSE_STDOUT: &str = "db:5432 - no response\n";

#[derive(Debug, Clone)]
pub enum Scripted {
    Output(CommandOutput),
    /// Write these bytes to the file named by `-f`, then exit 0
    WriteArtifact(String),
    SpawnError,
}

impl Scripted {
    pub fn ready() -> Self {
        Scripted::Output(CommandOutput::exited(0, READY_STDOUT, ""))
    }

    pub fn no_response() -> Self {
        Scripted::Output(CommandOutput::exited(2, NO_RESPONSE_STDOUT, ""))
    }

    pub fn ok() -> Self {
        Scripted::Output(CommandOutput::exited(0, "", ""))
    }

    pub fn fail(stderr: &str) -> Self {
        Scripted::Output(CommandOutput::exited(1, "", stderr))
    }
}

/// Replies per program from a queue; the last reply repeats once the queue is drained
#[derive(Debug, Default)]
pub struct ScriptedRunner {
    replies: Mutex<HashMap<String, VecDeque<Scripted>>>,
    calls: Mutex<Vec<Invocation>>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(self, program: &str, reply: Scripted) -> Self {
        self.replies.lock().unwrap()
            .entry(program.to_string())
            .or_default()
            .push_back(reply);
        self
    }

    pub fn on_each<I>(mut self, program: &str, replies: I) -> Self
    where
        I: IntoIterator<Item = Scripted>,
    {
        for reply in replies {
            self = self.on(program, reply);
        }
        self
    }

    pub fn calls(&self) -> Vec<Invocation> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, program: &str) -> usize {
        self.calls.lock().unwrap()
            .iter()
            .filter(|c| c.program == program)
            .count()
    }

    fn next_reply(&self, program: &str) -> Option<Scripted> {
        let mut replies = self.replies.lock().unwrap();
        let queue = replies.get_mut(program)?;
        if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        }
    }
}

impl CommandRunner for ScriptedRunner {
    async fn run(&self, invocation: &Invocation) -> Result<CommandOutput, CommandError> {
        self.calls.lock().unwrap().push(invocation.clone());

        let spawn_error = || CommandError::Spawn {
            program: invocation.program.clone(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not scripted"),
        };

        match self.next_reply(&invocation.program) {
            Some(Scripted::Output(output)) => Ok(output),
            Some(Scripted::WriteArtifact(contents)) => {
                let path = invocation.flag_value("-f").ok_or_else(spawn_error)?;
                std::fs::write(path, contents).map_err(|source| CommandError::Spawn {
                    program: invocation.program.clone(),
                    source,
                })?;
                Ok(CommandOutput::exited(0, "", ""))
            }
            Some(Scripted::SpawnError) | None => Err(spawn_error()),
        }
    }
}
