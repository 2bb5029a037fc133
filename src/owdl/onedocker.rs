//! OneDocker launch command

use std::fmt;

use owdl_model::OwdlState;

/// Runner used when the config does not name one
pub const DEFAULT_RUNNER: &str = "onedocker-runner";

/// `<runner> <package> [--version=<v>] [--timeout=<t>] --exe_args="<args>"`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OneDockerCommand {
    pub runner: String,
    pub package_name: String,
    pub version: Option<String>,
    pub timeout: Option<u32>,
    pub exe_args: String,
}

impl OneDockerCommand {
    /// Command for one container of `state`
    pub fn for_state(runner: &str, state: &OwdlState, exe_args: &str) -> Self {
        Self {
            runner: runner.to_string(),
            package_name: state.package_name.clone(),
            version: state.version.clone(),
            timeout: state.timeout,
            exe_args: exe_args.to_string(),
        }
    }

    /// One command per `CmdArgsList` entry, in order
    pub fn for_each_container(runner: &str, state: &OwdlState) -> Vec<String> {
        state
            .cmd_args_list
            .iter()
            .map(|args| Self::for_state(runner, state, args).to_string())
            .collect()
    }
}

impl fmt::Display for OneDockerCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.runner, self.package_name)?;
        if let Some(ref version) = self.version {
            write!(f, " --version={}", version)?;
        }
        if let Some(timeout) = self.timeout {
            write!(f, " --timeout={}", timeout)?;
        }
        write!(f, " --exe_args=\"{}\"", escape_double_quoted(&self.exe_args))
    }
}

/// Escape for a POSIX double-quoted string
fn escape_double_quoted(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '"' | '\\' | '$' | '`') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
