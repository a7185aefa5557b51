//! `dotts` command-line entry point.
use anyhow::Result;
use clap::Parser;

use dotts::cli::{Cli, Command};
use dotts::commands;
use dotts::logging::{self, Logger};
use dotts::registry::{MachineRegistry, MethodRegistry};

fn main() -> Result<()> {
    let _ = enable_ansi_support::enable_ansi_support();
    let args = Cli::parse();

    match args.command {
        Command::Completions { shell } => return commands::completions::run(shell),
        Command::Version => return commands::version::run(),
        _ => {}
    }

    let command = args.command.log_name();
    logging::init_subscriber(args.verbose, command);
    let log = Logger::new(command);
    if let Some(path) = log.log_path() {
        log.debug(&format!("log file: {}", path.display()));
    }

    let result = match args.command {
        Command::Init => commands::init::run(&args.global, &log),
        Command::Sync(opts) => commands::sync::run(&args.global, &opts, &log),
        Command::Status => commands::status::run(&args.global, &log),
        Command::Dependency { path } => commands::registry::import(&args.global, &path, &log),
        Command::Dependencies { action } => commands::registry::run(
            &args.global,
            MethodRegistry::dependencies,
            action.into(),
            &log,
        ),
        Command::Plugins { action } => {
            commands::registry::run(&args.global, MethodRegistry::plugins, action.into(), &log)
        }
        Command::Env { action } => {
            commands::registry::run(&args.global, MethodRegistry::env_vars, action.into(), &log)
        }
        Command::Machines { action } => commands::registry::run(
            &args.global,
            MachineRegistry::machines,
            action.into(),
            &log,
        ),
        Command::Push(opts) => commands::push::run(&args.global, &opts, &log),
        Command::Completions { .. } | Command::Version => Ok(()),
    };

    if let Err(e) = &result {
        log.debug(&format!("{command} failed: {e:#}"));
    }
    result
}
