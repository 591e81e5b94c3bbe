//! ## Sequence File Verification
//!
//! Parses a sequence patch file and prints the tree.

use colored::Colorize;
use log::error;
use crate::commands::CommandError;
use crate::seq;
use crate::STDRESULT;

const RCH: &str = "unreachable was reached";

pub fn check(cmd: &clap::ArgMatches) -> STDRESULT {
    let path = cmd.get_one::<String>("file").expect(RCH);
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(_) => {
            error!("sequence file `{}` could not be read",path);
            return Err(Box::new(CommandError::FileNotFound));
        }
    };
    match seq::parse(&text) {
        Ok(list) => {
            print!("{}",list);
            eprintln!("\u{2713} {} ({} sequence(s))","Passing".green(),list.sequences.len());
            Ok(())
        },
        Err(e) => {
            eprintln!("\u{2717} {}",e.to_string().red());
            Err(Box::new(e))
        }
    }
}
