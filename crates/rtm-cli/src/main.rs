use std::io;
use std::process::ExitCode;

use clap::{CommandFactory, Parser};
use clap_complete::generate;
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use rtm_core::plugin::{PluginInfo, PluginRegistry, UpdateOutcome};
use rtm_core::{install, Config, ErrorKind, Result, RtmError};

mod args;
use args::{Cli, Commands, PluginAction, Shell};

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    let quiet = cli.quiet;
    let result = match cli.command {
        Some(Commands::Completions { shell }) => {
            handle_completions(shell);
            Ok(())
        }
        Some(command) => Config::load(cli.data_dir).and_then(|config| run(command, config, quiet)),
        None => {
            Cli::command().print_help().ok();
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", "[ERROR]".red().bold(), e);
            ExitCode::from(e.exit_code() as u8)
        }
    }
}

/// `RUST_LOG` wins; otherwise `-v` enables debug diagnostics
fn init_tracing(verbose: bool, quiet: bool) {
    let default = if quiet {
        "off"
    } else if verbose {
        "rtm_core=debug,rtm_cli=debug"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn run(command: Commands, config: Config, quiet: bool) -> Result<()> {
    match command {
        Commands::Plugin { action } => handle_plugin(action, config, quiet),
        Commands::List { plugin } => handle_list(config, &plugin),
        Commands::Where { plugin, version } => handle_where(config, &plugin, &version),
        Commands::Uninstall { plugin, version } => {
            handle_uninstall(config, &plugin, &version, quiet)
        }
        Commands::Info => handle_info(config),
        // Handled before the config is loaded
        Commands::Completions { .. } => Ok(()),
    }
}

fn handle_completions(shell: Shell) {
    let mut cmd = Cli::command();
    let shell = match shell {
        Shell::Bash => clap_complete::Shell::Bash,
        Shell::Zsh => clap_complete::Shell::Zsh,
        Shell::Fish => clap_complete::Shell::Fish,
        Shell::PowerShell => clap_complete::Shell::PowerShell,
        Shell::Elvish => clap_complete::Shell::Elvish,
    };
    generate(shell, &mut cmd, "rtm", &mut io::stdout());
}

fn handle_plugin(action: PluginAction, config: Config, quiet: bool) -> Result<()> {
    let registry = PluginRegistry::new(config);

    match action {
        PluginAction::Add { name, git_url } => match registry.add(&name, git_url.as_deref()) {
            Ok(plugin) => {
                if !quiet {
                    println!("{} {}", "Added:".green(), plugin.dir().display());
                }
            }
            // Adding twice is not a failure
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                if !quiet {
                    println!("{} {}", "[SKIP]".yellow(), e);
                }
            }
            Err(e) => return Err(e),
        },
        PluginAction::List { urls, refs, json } => {
            let plugins = registry.list(urls, refs)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&plugins)?);
                return Ok(());
            }

            if plugins.is_empty() {
                if !quiet {
                    println!("No plugins installed.");
                    println!();
                    println!("Add one with: rtm plugin add <name> [<git-url>]");
                }
                return Ok(());
            }

            for plugin in &plugins {
                println!("{}", format_plugin_row(plugin));
            }
        }
        PluginAction::Remove { name } => {
            registry.remove(&name)?;
            if !quiet {
                println!("{} {}", "Removed:".red(), name);
            }
        }
        PluginAction::Update { name, git_ref, all } => {
            if all {
                for outcome in registry.update_all()? {
                    print_update_outcome(&outcome, quiet);
                }
            } else if let Some(name) = name {
                let revision = registry.update(&name, git_ref.as_deref())?;
                if !quiet {
                    println!("{} {} to ref {}", "Updated:".green(), name, revision);
                }
            }
        }
    }

    Ok(())
}

fn format_plugin_row(plugin: &PluginInfo) -> String {
    let mut columns = vec![plugin.name.cyan().to_string()];
    if let Some(url) = &plugin.url {
        columns.push(url.clone());
    }
    if let Some(git_ref) = &plugin.git_ref {
        columns.push(git_ref.dimmed().to_string());
    }
    columns.join("\t")
}

fn print_update_outcome(outcome: &UpdateOutcome, quiet: bool) {
    match &outcome.result {
        Ok(_) if quiet => {}
        Ok(revision) => {
            println!(
                "{} {} to ref {}",
                "Updated:".green(),
                outcome.name,
                revision
            );
        }
        Err(e) => {
            eprintln!(
                "{} failed to update {}: {}",
                "[ERROR]".red().bold(),
                outcome.name,
                e
            );
        }
    }
}

fn handle_list(config: Config, plugin_name: &str) -> Result<()> {
    let registry = PluginRegistry::new(config);
    let plugin = registry.existing(plugin_name)?;

    let versions = install::installed(registry.config(), &plugin)?;
    if versions.is_empty() {
        eprintln!("  No versions installed");
        return Ok(());
    }

    for version in versions {
        println!("  {}", version);
    }
    Ok(())
}

fn handle_where(config: Config, plugin_name: &str, version: &str) -> Result<()> {
    let registry = PluginRegistry::new(config);
    let plugin = registry.existing(plugin_name)?;
    install::validate_version(version)?;

    if !install::is_installed(registry.config(), &plugin, version) {
        return Err(RtmError::VersionNotInstalled {
            plugin: plugin_name.to_string(),
            version: version.to_string(),
        });
    }

    let path = install::install_path(registry.config(), &plugin, version);
    println!("{}", path.display());
    Ok(())
}

fn handle_uninstall(config: Config, plugin_name: &str, version: &str, quiet: bool) -> Result<()> {
    let registry = PluginRegistry::new(config);
    let plugin = registry.existing(plugin_name)?;

    install::uninstall(registry.config(), &plugin, version)?;
    if !quiet {
        println!("{} {} {}", "Uninstalled:".red(), plugin_name, version);
    }
    Ok(())
}

fn handle_info(config: Config) -> Result<()> {
    println!();
    println!("{}", "rtm".cyan().bold());
    println!("Version: {}", env!("CARGO_PKG_VERSION"));
    println!("Data dir: {}", config.data_dir.display());
    println!("Config file: {}", config.config_file.display());
    println!();

    println!("{}", "Settings:".cyan().bold());
    for (key, value) in config.list() {
        println!("  {} = {}", key, value);
    }
    println!();

    let registry = PluginRegistry::new(config);
    let plugins = registry.list(true, false)?;
    println!("{}", "Plugins:".cyan().bold());
    if plugins.is_empty() {
        println!("  (none)");
    }
    for plugin in &plugins {
        println!("  {}", format_plugin_row(plugin));
    }
    println!();

    Ok(())
}
