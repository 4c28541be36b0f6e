use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::Path;
use std::process::Command;

use crate::shared::constants::{VIRTUAL_DISPLAY_PROGRAM, WKHTMLTOIMAGE_PROGRAM};
use crate::shared::external_tool::{run_tool, ToolError};
use crate::text::domain::rasterizer::Rasterizer;

/// Host-dependent options for `wkhtmltoimage`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RasterizerConfig {
    /// Pass `--quiet`.
    pub quiet: bool,
    /// Run under `xvfb-run -a` so the renderer has a display to talk to.
    pub virtual_display: bool,
}

impl RasterizerConfig {
    /// Options for the platform this binary was built for.
    pub fn for_host() -> Self {
        Self::for_os(std::env::consts::OS)
    }

    /// Linux hosts get a virtual display; every other host runs the tool
    /// directly.
    pub fn for_os(os: &str) -> Self {
        Self {
            quiet: true,
            virtual_display: os == "linux",
        }
    }
}

/// Rasterizes HTML documents with `wkhtmltoimage`.
pub struct WkhtmlRasterizer {
    program: OsString,
    display_wrapper: OsString,
    config: RasterizerConfig,
}

impl WkhtmlRasterizer {
    pub fn new(
        program: impl Into<OsString>,
        display_wrapper: impl Into<OsString>,
        config: RasterizerConfig,
    ) -> Self {
        Self {
            program: program.into(),
            display_wrapper: display_wrapper.into(),
            config,
        }
    }

    fn command(&self, markup: &Path, output: &Path) -> Command {
        let mut command = if self.config.virtual_display {
            let mut wrapped = Command::new(&self.display_wrapper);
            wrapped.arg("-a").arg(&self.program);
            wrapped
        } else {
            Command::new(&self.program)
        };
        if self.config.quiet {
            command.arg("--quiet");
        }
        command.arg(markup).arg(output);
        command
    }
}

impl Default for WkhtmlRasterizer {
    fn default() -> Self {
        Self::new(
            WKHTMLTOIMAGE_PROGRAM,
            VIRTUAL_DISPLAY_PROGRAM,
            RasterizerConfig::for_host(),
        )
    }
}

impl Rasterizer for WkhtmlRasterizer {
    fn rasterize(&self, markup: &Path, output: &Path) -> Result<(), Box<dyn std::error::Error>> {
        // An earlier image at `output` must not pass for this run's result.
        match fs::remove_file(output) {
            Ok(()) => log::debug!("Replacing {}", output.display()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(format!("Failed to remove {}: {e}", output.display()).into()),
        }
        run_tool(&mut self.command(markup, output))?;
        if !output.is_file() {
            return Err(ToolError::MissingOutput {
                program: self.program.to_string_lossy().into_owned(),
                path: output.to_path_buf(),
            }
            .into());
        }
        Ok(())
    }
}
