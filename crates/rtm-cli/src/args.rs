use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "rtm")]
#[command(about = "The multiple runtime version manager")]
#[command(version)]
pub struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Quiet output (errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Data directory (default: $RTM_DATA_DIR or ~/.rtm)
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage plugins
    Plugin {
        #[command(subcommand)]
        action: PluginAction,
    },

    /// List installed versions of a plugin
    List {
        /// Plugin name
        plugin: String,
    },

    /// Show the install path of a version
    Where {
        /// Plugin name
        plugin: String,

        /// Version
        version: String,
    },

    /// Remove an installed version
    Uninstall {
        /// Plugin name
        plugin: String,

        /// Version
        version: String,
    },

    /// Show data directory, settings and plugins
    Info,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum PluginAction {
    /// Add a plugin from a git URL (or the plugin repository by name)
    Add {
        /// Plugin name
        name: String,

        /// Git URL (default: looked up in the plugin repository)
        git_url: Option<String>,
    },

    /// List added plugins
    List {
        /// Show repository URLs
        #[arg(long)]
        urls: bool,

        /// Show checked out refs
        #[arg(long)]
        refs: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Remove a plugin and all of its installed versions
    Remove {
        /// Plugin name
        name: String,
    },

    /// Update a plugin to the latest commit or a given git ref
    Update {
        /// Plugin name
        #[arg(required_unless_present = "all", conflicts_with = "all")]
        name: Option<String>,

        /// Git ref to check out (default: remote default branch)
        #[arg(conflicts_with = "all")]
        git_ref: Option<String>,

        /// Update all added plugins
        #[arg(long)]
        all: bool,
    },
}
