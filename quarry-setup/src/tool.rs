use std::process::Command;

use thiserror::Error;
use tracing::debug;

/// Name of the catalog server's management CLI.
const CATALOG_CLI: &str = "ckan";

/// Errors raised while driving the catalog CLI.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("failed to spawn `{command}`: {source}")]
    Spawn {
        command: String,
        source: std::io::Error,
    },

    #[error("`{command}` exited with {status}: {stderr}")]
    Failed {
        command: String,
        status: std::process::ExitStatus,
        stderr: String,
    },
}

/// Wrapper around the catalog management CLI, bound to one INI file.
pub struct ConfigTool {
    ini: String,
}

impl ConfigTool {
    pub fn new(ini: &str) -> Self {
        Self {
            ini: ini.to_owned(),
        }
    }

    /// Writes one option into the INI file via `config-tool`.
    pub fn set_option(
        &self,
        name: &str,
        value: &str,
        section: Option<&str>,
    ) -> Result<(), ToolError> {
        let mut command = Command::new(CATALOG_CLI);
        command.arg("config-tool").arg(&self.ini);
        if let Some(section) = section {
            command.args(["--section", section]);
        }
        command.arg(format!("{name} = {value}"));

        debug!(option = name, "writing catalog option");
        run(command).map(drop)
    }

    /// Runs a catalog CLI subcommand against the INI file and returns its
    /// standard output.
    pub fn exec(&self, args: &[&str]) -> Result<String, ToolError> {
        let mut command = Command::new(CATALOG_CLI);
        command.arg(format!("--config={}", self.ini));
        command.args(args);

        run(command)
    }
}

fn run(mut command: Command) -> Result<String, ToolError> {
    let rendered = render(&command);

    let output = command.output().map_err(|source| ToolError::Spawn {
        command: rendered.clone(),
        source,
    })?;

    if !output.status.success() {
        return Err(ToolError::Failed {
            command: rendered,
            status: output.status,
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

fn render(command: &Command) -> String {
    let mut rendered = command.get_program().to_string_lossy().into_owned();
    for arg in command.get_args() {
        rendered.push(' ');
        rendered.push_str(&arg.to_string_lossy());
    }

    rendered
}
