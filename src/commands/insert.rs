//! ## Insertion Run
//!
//! Drives the whole pipeline in `patch` and writes the output files.
//! All transformation happens before the first write, so a failing
//! run never leaves a partial file set behind.

use colored::Colorize;
use log::info;
use crate::patch::{self,InsertOptions};
use crate::STDRESULT;

const RCH: &str = "unreachable was reached";

pub fn insert(cmd: &clap::ArgMatches) -> STDRESULT {
    let filelist = cmd.get_one::<String>("filelist").expect(RCH);
    let top = cmd.get_one::<String>("top").expect(RCH);
    let mut opts = InsertOptions::new(top);
    opts.observe_port = cmd.get_one::<String>("observe-port").expect(RCH).clone();
    opts.control_in = cmd.get_one::<String>("control-in").expect(RCH).clone();
    opts.control_out = cmd.get_one::<String>("control-out").expect(RCH).clone();
    opts.suffix = cmd.get_one::<String>("suffix").expect(RCH).clone();
    let outputs = patch::run(filelist,&opts)?;
    if outputs.is_empty() {
        eprintln!("\u{2713} {}","nothing to do, no file modified".green());
        return Ok(());
    }
    for out in &outputs {
        std::fs::write(&out.path,&out.text)?;
        info!("wrote {}",out.path.display());
    }
    eprintln!("\u{2713} {} {}",outputs.len().to_string().green(),"file(s) patched".green());
    Ok(())
}
