//! Shell scripts standing in for external command-line tools in tests.

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

/// Writes an executable `sh` script named `name` into `dir`.
pub fn fake_tool(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

/// A tool that copies its arguments, space separated, to stdout.
pub fn echo_args_tool(dir: &Path, name: &str) -> PathBuf {
    fake_tool(dir, name, r#"printf '%s' "$*""#)
}

/// A tool that writes its arguments to the file named by its last argument.
pub fn write_last_arg_tool(dir: &Path, name: &str) -> PathBuf {
    fake_tool(
        dir,
        name,
        r#"for last; do :; done
printf '%s' "$*" > "$last""#,
    )
}

/// A tool that prints `message` to stderr and exits with `code`.
pub fn failing_tool(dir: &Path, name: &str, message: &str, code: i32) -> PathBuf {
    fake_tool(dir, name, &format!("echo '{message}' >&2\nexit {code}"))
}
