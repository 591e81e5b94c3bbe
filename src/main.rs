//! # Command Line Interface
//!
//! Dispatch commands to `commands` module.

use env_logger;
#[cfg(windows)]
use colored;
use veritap::commands;
mod cli;

fn main() -> Result<(),Box<dyn std::error::Error>>
{
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).unwrap();

    let main_cmd = cli::build_cli();
    let matches = main_cmd.get_matches();

    // Completions

    if let Some(cmd) = matches.subcommand_matches("completions") {
        return commands::completions::generate(cli::build_cli(),cmd);
    }

    // Patch a design

    if let Some(cmd) = matches.subcommand_matches("insert") {
        return commands::insert::insert(cmd);
    }

    // Audit annotations

    if let Some(cmd) = matches.subcommand_matches("scan") {
        return commands::scan::scan(cmd);
    }

    // Verify a sequence patch file

    if let Some(cmd) = matches.subcommand_matches("check-seq") {
        return commands::seqcheck::check(cmd);
    }

    log::error!("No subcommand was found, try `veritap --help`");
    return Err(Box::new(commands::CommandError::InvalidCommand));
}
