use std::io;
use std::path::PathBuf;
use std::process::{Command, ExitStatus, Output};

use thiserror::Error;

/// Failure of an external command-line tool.
///
/// Distinguishes a tool that is not installed from one that ran and
/// failed, so the caller can report which one it was.
#[derive(Error, Debug)]
pub enum ToolError {
    #[error("{program} not found; is it installed and on PATH?")]
    NotFound { program: String },
    #[error("{program} exited with {status}: {stderr}")]
    Failed {
        program: String,
        status: ExitStatus,
        stderr: String,
    },
    #[error("{program} reported success but did not produce {path}")]
    MissingOutput { program: String, path: PathBuf },
    #[error("failed to run {program}: {source}")]
    Io {
        program: String,
        #[source]
        source: io::Error,
    },
}

/// Runs `command` to completion, capturing its output.
///
/// A non-zero exit status is an error; stdout is only handed back when the
/// tool succeeded.
pub fn run_tool(command: &mut Command) -> Result<Output, ToolError> {
    let program = command.get_program().to_string_lossy().into_owned();
    log::debug!("Running {program} {:?}", command.get_args().collect::<Vec<_>>());

    let output = command.output().map_err(|source| {
        if source.kind() == io::ErrorKind::NotFound {
            ToolError::NotFound {
                program: program.clone(),
            }
        } else {
            ToolError::Io {
                program: program.clone(),
                source,
            }
        }
    })?;

    if !output.status.success() {
        return Err(ToolError::Failed {
            program,
            status: output.status,
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    Ok(output)
}
