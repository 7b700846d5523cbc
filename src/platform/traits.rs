use std::fmt;
use std::future::Future;
use thiserror::Error;

/// One child-process invocation: program, arguments and a private environment overlay
#[derive(Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    /// Set on the child only, on top of the inherited environment
    pub env: Vec<(String, String)>,
    /// Capture stdout instead of passing it through to ours
    pub capture_stdout: bool,
}

impl Invocation {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            env: Vec::new(),
            capture_stdout: false,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    pub fn capture_stdout(mut self) -> Self {
        self.capture_stdout = true;
        self
    }

    pub fn env_value(&self, key: &str) -> Option<&str> {
        self.env.iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Value following `flag` in the argument list
    pub fn flag_value(&self, flag: &str) -> Option<&str> {
        self.args.iter()
            .position(|a| a == flag)
            .and_then(|i| self.args.get(i + 1))
            .map(String::as_str)
    }

    /// Printable command line. Safe to log: secrets only ever live in `env`.
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

// Env values are never printed
impl fmt::Debug for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let env_keys: Vec<&str> = self.env.iter().map(|(k, _)| k.as_str()).collect();
        f.debug_struct("Invocation")
            .field("program", &self.program)
            .field("args", &self.args)
            .field("env", &env_keys)
            .field("capture_stdout", &self.capture_stdout)
            .finish()
    }
}

/// What a child process left behind once it exited
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub success: bool,
    /// None when terminated by a signal
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn exited(code: i32, stdout: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self {
            success: code == 0,
            code: Some(code),
            stdout: stdout.into(),
            stderr: stderr.into(),
        }
    }

    pub fn status_text(&self) -> String {
        match self.code {
            Some(code) => format!("exit code {}", code),
            None => "termination by signal".to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("failed to start `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{program}` failed with {status}: {detail}")]
    Failed {
        program: String,
        status: String,
        detail: String,
    },
}

impl CommandError {
    pub fn failed(program: &str, output: &CommandOutput) -> Self {
        let stderr = output.stderr.trim();
        let detail = if stderr.is_empty() {
            "no error output".to_string()
        } else {
            stderr.to_string()
        };

        CommandError::Failed {
            program: program.to_string(),
            status: output.status_text(),
            detail,
        }
    }
}

/// Child process execution abstraction
pub trait CommandRunner {
    /// Run to completion. Only a failure to start or wait is an `Err`; a non-zero exit is reported in the output.
    fn run(&self, invocation: &Invocation) -> impl Future<Output=Result<CommandOutput, CommandError>> + Send;
}

/// Run and turn a non-zero exit into `CommandError::Failed`
pub async fn run_checked<R>(runner: &R, invocation: &Invocation) -> Result<CommandOutput, CommandError>
where
    R: CommandRunner + Sync,
{
    let output = runner.run(invocation).await?;

    if !output.success {
        return Err(CommandError::failed(&invocation.program, &output));
    }

    Ok(output)
}
