//! Command-line interface definition.
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

/// Top-level CLI entry point for the dotfiles manager.
#[derive(Parser, Debug)]
#[command(
    name = "dotts",
    about = "Keep a dotfiles directory in sync, with dependency, plugin, env and machine registries",
    version
)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Options shared by every subcommand.
    #[command(flatten)]
    pub global: GlobalOpts,
}

/// Options shared across all subcommands.
#[derive(Parser, Debug, Clone, Default)]
pub struct GlobalOpts {
    /// Override dotfiles root directory (default: $XDG_CONFIG_HOME or ~/.config)
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Initialise the dotfiles directory as a repository
    Init,
    /// Pull from the remote when the working tree has local changes
    Sync(SyncOpts),
    /// Show working tree state and divergence from the remote
    Status,
    /// Import a JSON file of name -> method pairs into the dependency registry
    Dependency {
        /// Path to the JSON file
        path: PathBuf,
    },
    /// Manage the dependency registry
    Dependencies {
        /// What to do with the registry.
        #[command(subcommand)]
        action: MethodAction,
    },
    /// Manage the plugin registry
    Plugins {
        /// What to do with the registry.
        #[command(subcommand)]
        action: MethodAction,
    },
    /// Manage the environment variable registry
    Env {
        /// What to do with the registry.
        #[command(subcommand)]
        action: EnvAction,
    },
    /// Manage the machine registry
    Machines {
        /// What to do with the registry.
        #[command(subcommand)]
        action: MachineAction,
    },
    /// Commit local changes and push them to the remote
    Push(PushOpts),
    /// Print a shell completion script
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
    /// Print version information
    Version,
}

impl Command {
    /// Name used for this command's log file.
    #[must_use]
    pub const fn log_name(&self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::Sync(_) => "sync",
            Self::Status => "status",
            Self::Dependency { .. } | Self::Dependencies { .. } => "dependencies",
            Self::Plugins { .. } => "plugins",
            Self::Env { .. } => "env",
            Self::Machines { .. } => "machines",
            Self::Push(_) => "push",
            Self::Completions { .. } => "completions",
            Self::Version => "version",
        }
    }
}

/// Options for the `sync` subcommand.
#[derive(Parser, Debug, Clone, Default)]
pub struct SyncOpts {
    /// Preview what would be pulled without pulling
    #[arg(short = 'd', long)]
    pub dry_run: bool,
}

/// Options for the `push` subcommand.
#[derive(Parser, Debug, Clone, Default)]
pub struct PushOpts {
    /// Commit message (default: `commit_message` from .dottsrc)
    #[arg(short, long)]
    pub message: Option<String>,
}

/// Actions on a `name -> method` registry.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum MethodAction {
    /// Add an entry, replacing any existing one with the same name
    Add {
        /// Entry name
        name: String,
        /// Installation method
        method: String,
    },
    /// Change the method of an existing entry
    #[command(alias = "modify")]
    Mod {
        /// Entry name
        name: String,
        /// New installation method
        method: String,
    },
    /// Remove an entry
    #[command(alias = "rm")]
    Remove {
        /// Entry name
        name: String,
    },
    /// List all entries
    #[command(alias = "ls")]
    List,
}

/// Actions on the environment variable registry.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum EnvAction {
    /// Set a variable, replacing any existing value
    Add {
        /// Variable name
        name: String,
        /// Variable value
        value: String,
    },
    /// Change the value of an existing variable
    #[command(alias = "modify")]
    Mod {
        /// Variable name
        name: String,
        /// New value
        value: String,
    },
    /// Remove a variable
    #[command(alias = "rm")]
    Remove {
        /// Variable name
        name: String,
    },
    /// List all variables
    #[command(alias = "ls")]
    List,
}

/// Actions on the machine registry.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum MachineAction {
    /// Register a machine; fails if the name is already registered
    Add {
        /// Machine name
        name: String,
    },
    /// Unregister a machine
    #[command(alias = "rm")]
    Remove {
        /// Machine name
        name: String,
    },
    /// List registered machines
    #[command(alias = "ls")]
    List,
}

#[cfg(test)]
#[allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::indexing_slicing,
    clippy::panic
)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_init() {
        let cli = Cli::parse_from(["dotts", "init"]);
        assert!(matches!(cli.command, Command::Init));
    }

    #[test]
    fn parse_sync_defaults() {
        let cli = Cli::parse_from(["dotts", "sync"]);
        assert!(matches!(cli.command, Command::Sync(SyncOpts { dry_run: false })));
    }

    #[test]
    fn parse_sync_dry_run() {
        let cli = Cli::parse_from(["dotts", "sync", "--dry-run"]);
        assert!(matches!(cli.command, Command::Sync(SyncOpts { dry_run: true })));
    }

    #[test]
    fn parse_sync_dry_run_short() {
        let cli = Cli::parse_from(["dotts", "sync", "-d"]);
        assert!(matches!(cli.command, Command::Sync(SyncOpts { dry_run: true })));
    }

    #[test]
    fn parse_status() {
        let cli = Cli::parse_from(["dotts", "status"]);
        assert!(matches!(cli.command, Command::Status));
    }

    #[test]
    fn parse_dependency_import() {
        let cli = Cli::parse_from(["dotts", "dependency", "deps.json"]);
        assert!(
            matches!(&cli.command, Command::Dependency { path } if path == &PathBuf::from("deps.json"))
        );
    }

    #[test]
    fn parse_dependencies_add() {
        let cli = Cli::parse_from(["dotts", "dependencies", "add", "neovim", "brew"]);
        let Command::Dependencies { action } = cli.command else {
            panic!("expected dependencies command");
        };
        assert_eq!(
            action,
            MethodAction::Add {
                name: "neovim".to_string(),
                method: "brew".to_string()
            }
        );
    }

    #[test]
    fn parse_dependencies_mod_and_alias() {
        for verb in ["mod", "modify"] {
            let cli = Cli::parse_from(["dotts", "dependencies", verb, "neovim", "apt"]);
            assert!(
                matches!(
                    &cli.command,
                    Command::Dependencies { action: MethodAction::Mod { method, .. } } if method == "apt"
                ),
                "{verb}"
            );
        }
    }

    #[test]
    fn parse_plugins_remove_alias() {
        let cli = Cli::parse_from(["dotts", "plugins", "rm", "fzf"]);
        assert!(matches!(
            cli.command,
            Command::Plugins {
                action: MethodAction::Remove { .. }
            }
        ));
    }

    #[test]
    fn parse_env_list() {
        let cli = Cli::parse_from(["dotts", "env", "list"]);
        assert!(matches!(
            cli.command,
            Command::Env {
                action: EnvAction::List
            }
        ));
    }

    #[test]
    fn parse_machines_add() {
        let cli = Cli::parse_from(["dotts", "machines", "add", "laptop"]);
        let Command::Machines { action } = cli.command else {
            panic!("expected machines command");
        };
        assert_eq!(
            action,
            MachineAction::Add {
                name: "laptop".to_string()
            }
        );
    }

    #[test]
    fn machines_have_no_mod() {
        assert!(Cli::try_parse_from(["dotts", "machines", "mod", "laptop"]).is_err());
    }

    #[test]
    fn add_requires_method() {
        assert!(Cli::try_parse_from(["dotts", "dependencies", "add", "neovim"]).is_err());
    }

    #[test]
    fn parse_push_message() {
        let cli = Cli::parse_from(["dotts", "push", "-m", "nvim: add lsp"]);
        let Command::Push(opts) = cli.command else {
            panic!("expected push command");
        };
        assert_eq!(opts.message.as_deref(), Some("nvim: add lsp"));
    }

    #[test]
    fn parse_completions() {
        let cli = Cli::parse_from(["dotts", "completions", "zsh"]);
        assert!(matches!(cli.command, Command::Completions { shell: Shell::Zsh }));
    }

    #[test]
    fn parse_version() {
        let cli = Cli::parse_from(["dotts", "version"]);
        assert!(matches!(cli.command, Command::Version));
    }

    #[test]
    fn parse_verbose() {
        let cli = Cli::parse_from(["dotts", "-v", "status"]);
        assert!(cli.verbose);
    }

    #[test]
    fn parse_verbose_after_subcommand() {
        let cli = Cli::parse_from(["dotts", "status", "--verbose"]);
        assert!(cli.verbose);
    }

    #[test]
    fn parse_root_override() {
        let cli = Cli::parse_from(["dotts", "--root", "/tmp/dotfiles", "status"]);
        assert_eq!(cli.global.root, Some(PathBuf::from("/tmp/dotfiles")));
    }

    #[test]
    fn log_names() {
        let cli = Cli::parse_from(["dotts", "dependency", "deps.json"]);
        assert_eq!(cli.command.log_name(), "dependencies");
        let cli = Cli::parse_from(["dotts", "env", "list"]);
        assert_eq!(cli.command.log_name(), "env");
    }
}
