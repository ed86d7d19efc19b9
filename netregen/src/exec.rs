//! External command invocation for checkers and service reloads.

use std::process::Command;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExecError {
    #[error("no command configured")]
    Empty,
    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },
    #[error("{program} exited with {code}: {stderr}")]
    Failed {
        program: String,
        code: String,
        stderr: String,
    },
}

/// Run a command and capture its output. Any non-zero exit is an error
/// carrying the exit code and captured stderr.
pub fn check_output(argv: &[String]) -> Result<String, ExecError> {
    let (program, args) = argv.split_first().ok_or(ExecError::Empty)?;
    let output = Command::new(program)
        .args(args)
        .output()
        .map_err(|source| ExecError::Spawn {
            program: program.clone(),
            source,
        })?;

    if !output.status.success() {
        let code = output
            .status
            .code()
            .map_or_else(|| "signal".to_string(), |c| c.to_string());
        return Err(ExecError::Failed {
            program: program.clone(),
            code,
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// [`check_output`] with extra arguments appended to a configured command.
pub fn check_output_with(argv: &[String], extra: &[&str]) -> Result<String, ExecError> {
    let mut full = argv.to_vec();
    full.extend(extra.iter().map(|s| s.to_string()));
    check_output(&full)
}
