use std::path::Path;

use crate::config::{ConnectionTarget, ToolPaths};
use crate::platform::Invocation;

/// Password channel understood by libpq tools
pub const PASSWORD_ENV: &str = "PGPASSWORD";

fn connection_args(invocation: Invocation, target: &ConnectionTarget) -> Invocation {
    let invocation = invocation.args(["-h", target.host.as_str()]);
    match target.port {
        Some(port) => invocation.args(["-p".to_string(), port.to_string()]),
        None => invocation,
    }
}

fn authenticated(invocation: Invocation, target: &ConnectionTarget) -> Invocation {
    invocation
        .args(["-U", target.user.as_str(), "-d", target.dbname.as_str()])
        .env(PASSWORD_ENV, target.password.as_str())
}

/// `pg_isready -h HOST [-p PORT]`
pub fn readiness_probe(tools: &ToolPaths, target: &ConnectionTarget) -> Invocation {
    connection_args(Invocation::new(&tools.pg_isready), target).capture_stdout()
}

/// `pg_dump -h HOST [-p PORT] -U USER -d DB -f ARTIFACT -w`
pub fn dump(tools: &ToolPaths, source: &ConnectionTarget, artifact: &Path) -> Invocation {
    let invocation = connection_args(Invocation::new(&tools.pg_dump), source);
    authenticated(invocation, source)
        .args(["-f".to_string(), artifact.to_string_lossy().into_owned()])
        // never prompt for a password
        .arg("-w")
}

/// `psql -h HOST [-p PORT] -U USER -d DB -a -f ARTIFACT`
pub fn load(tools: &ToolPaths, destination: &ConnectionTarget, artifact: &Path) -> Invocation {
    let invocation = connection_args(Invocation::new(&tools.psql), destination);
    authenticated(invocation, destination)
        // echo all input
        .arg("-a")
        .args(["-f".to_string(), artifact.to_string_lossy().into_owned()])
}
