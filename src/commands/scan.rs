//! ## Annotation Audit
//!
//! Runs the pragma scan and the classifier without touching any tree,
//! then prints the tap inventory per module.  Lets an operator check
//! what an insertion run would instrument.

use colored::Colorize;
use crate::patch::{self,classify,index,pragma};
use crate::STDRESULT;

const RCH: &str = "unreachable was reached";

pub fn scan(cmd: &clap::ArgMatches) -> STDRESULT {
    let filelist = cmd.get_one::<String>("filelist").expect(RCH);
    let files = patch::read_filelist(filelist)?;
    let pragmas = pragma::scan_files(&files)?;
    let design = index::build(&files)?;
    let maps = classify::classify(&design,&pragmas)?;
    let mut observe_count = 0;
    let mut control_count = 0;
    for module in design.module_names() {
        let m = match maps.get(&module) {
            Some(m) if !m.is_empty() => m,
            _ => continue
        };
        let file = design.file_of(&module).expect(RCH);
        println!("{} ({})",module.bold(),file.display());
        for (name,range) in &m.observe {
            println!("    {}  {} [{}:{}]","observe".cyan(),name,range.msb,range.lsb);
            observe_count += 1;
        }
        for (name,spec) in &m.control {
            println!("    {}  {} [{}:{}] kind {}","control".magenta(),
                name,spec.range.msb,spec.range.lsb,spec.kind);
            control_count += 1;
        }
    }
    match observe_count + control_count {
        0 => eprintln!("\u{2713} {}","no taps requested".green()),
        _ => eprintln!("\u{2713} {} observe, {} control",
            observe_count.to_string().green(),control_count.to_string().green())
    }
    Ok(())
}
