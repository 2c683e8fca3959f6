//! Command dispatch: one handler per subcommand

use std::io;
use std::path::Path;

use clap::CommandFactory;
use clap_complete::{generate, Shell};
use tracing::{debug, instrument};

use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::{global_config_path, Settings};
use crate::domain::ConfigSection;
use crate::infrastructure::codec::DocumentFormat;
use crate::infrastructure::di::ServiceContainer;
use crate::tree_traits::TreeNodeConvert;

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let settings = Settings::load(cli.config.as_deref())?;
    let container = ServiceContainer::new(settings);

    match &cli.command {
        Some(Commands::Get { file, key }) => cmd_get(&container, file, key),
        Some(Commands::Convert { file, to }) => cmd_convert(&container, file, *to),
        Some(Commands::Tree { file }) => cmd_tree(&container, file),
        Some(Commands::Config { command }) => cmd_config(&container, command),
        Some(Commands::Completion { shell }) => cmd_completion(*shell),
        None => Ok(()),
    }
}

fn load(container: &ServiceContainer, file: &Path) -> CliResult<ConfigSection> {
    let binder = container.binder();
    Ok(binder.load_file(container.fs.as_ref(), file)?)
}

/// Format a document is read in: extension first, then settings.
fn format_of(container: &ServiceContainer, file: &Path) -> DocumentFormat {
    DocumentFormat::from_path(file).unwrap_or(container.settings.format)
}

#[instrument(level = "debug", skip(container))]
fn cmd_get(container: &ServiceContainer, file: &Path, key: &str) -> CliResult<()> {
    let section = load(container, file)?;
    let node = section
        .get_node_deep(key)
        .ok_or_else(|| CliError::NotFound {
            key: key.to_string(),
            file: file.display().to_string(),
        })?;
    debug!("cmd_get: key={} kind={}", key, node.kind_name());

    if node.is_mapping() {
        let text = format_of(container, file).codec().emit(&node)?;
        output::info(text.trim_end());
    } else {
        output::info(&node);
    }
    Ok(())
}

#[instrument(level = "debug", skip(container))]
fn cmd_convert(container: &ServiceContainer, file: &Path, to: DocumentFormat) -> CliResult<()> {
    let section = load(container, file)?;
    let text = to.codec().emit(&section.to_node())?;
    output::info(text.trim_end());
    Ok(())
}

#[instrument(level = "debug", skip(container))]
fn cmd_tree(container: &ServiceContainer, file: &Path) -> CliResult<()> {
    let section = load(container, file)?;
    output::header(&file.display());
    output::info(&section.to_tree_string());
    Ok(())
}

fn cmd_config(container: &ServiceContainer, command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            output::header("Effective settings");
            output::info(container.settings.to_toml()?.trim_end());
        }
        ConfigCommands::Path => match global_config_path() {
            Some(path) => {
                let marker = if path.exists() { "" } else { " (not found)" };
                output::action("Global", &format!("{}{}", path.display(), marker));
            }
            None => output::warning("no config directory available on this platform"),
        },
        ConfigCommands::Template => output::info(Settings::template().trim_end()),
    }
    Ok(())
}

fn cmd_completion(shell: Shell) -> CliResult<()> {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn container() -> ServiceContainer {
        ServiceContainer::new(Settings::default())
    }

    #[test]
    fn given_missing_key_when_get_then_not_found() {
        let dir = TempDir::new().expect("tempdir");
        let file = dir.path().join("app.yaml");
        fs::write(&file, "server:\n  port: 8080\n").expect("write");

        let err = cmd_get(&container(), &file, "server.host").unwrap_err();
        assert!(matches!(err, CliError::NotFound { .. }));
        assert_eq!(err.exit_code(), crate::exitcode::DATAERR);
    }

    #[test]
    fn given_present_key_when_get_then_ok() {
        let dir = TempDir::new().expect("tempdir");
        let file = dir.path().join("app.toml");
        fs::write(&file, "[server]\nport = 8080\n").expect("write");

        assert!(cmd_get(&container(), &file, "server").is_ok());
        assert!(cmd_get(&container(), &file, "server.port").is_ok());
    }

    #[test]
    fn given_unknown_extension_when_format_of_then_settings_format() {
        let settings = Settings {
            format: DocumentFormat::Toml,
            strict_scalars: false,
        };
        let container = ServiceContainer::new(settings);
        assert_eq!(
            format_of(&container, Path::new("app.conf")),
            DocumentFormat::Toml
        );
    }
}
