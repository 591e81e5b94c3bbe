//! Correlate pragma lines with the declarations that sit on them.
//!
//! A pre-order walk of every module definition: ANSI header ports
//! first, then body declarations.  A declaration is classified when
//! its line number has an entry in its file's pragma table.  When a
//! line declares several signals the pragma applies to each of them.
//! When the same signal is declared both as a port and in the body,
//! the port form is canonical and the body form is skipped.

use std::collections::{HashMap,HashSet};
use std::path::PathBuf;
use log::{debug,warn};
use super::{Design,Error,InsertOptions,PragmaMap,SignalMaps};
use crate::vlog::{Direction,Item,ModuleDef,Net,Port};
use crate::DYNERR;

/// Classify every module in the design.  Returns one `SignalMaps` per
/// module name; modules without pragmas get empty maps.
pub fn classify(design: &Design,
                pragmas: &HashMap<PathBuf,PragmaMap>) -> Result<HashMap<String,SignalMaps>,DYNERR> {
    let mut result: HashMap<String,SignalMaps> = HashMap::new();
    let mut consumed: HashMap<PathBuf,HashSet<usize>> = HashMap::new();
    for file in &design.files {
        let table = match pragmas.get(&file.path) {
            Some(t) => t,
            None => continue
        };
        let used = consumed.entry(file.path.clone()).or_default();
        for module in &file.ast.modules {
            let maps = classify_module(module,table,used)?;
            if !maps.is_empty() {
                debug!("module `{}`: {} observed, {} controlled",
                    module.name,maps.observe.len(),maps.control.len());
            }
            result.insert(module.name.clone(),maps);
        }
    }
    // pragma lines no declaration consumed are warnings, not errors
    for file in &design.files {
        if let Some(table) = pragmas.get(&file.path) {
            let used = consumed.get(&file.path).cloned().unwrap_or_default();
            let mut orphans: Vec<usize> = table.keys().filter(|l| !used.contains(*l)).cloned().collect();
            orphans.sort();
            for line in orphans {
                warn!("{} line {}: pragma does not sit on a recognized declaration, ignored",
                    file.path.display(),line);
            }
        }
    }
    Ok(result)
}

fn classify_module(module: &ModuleDef,
                   table: &PragmaMap,
                   consumed: &mut HashSet<usize>) -> Result<SignalMaps,DYNERR> {
    let mut maps = SignalMaps::default();
    for port in &module.ports {
        if let Port::Decl(net) = port {
            take_net(module,net,table,consumed,&mut maps)?;
        }
    }
    for item in &module.items {
        if let Item::Decl(decl) = item {
            for net in &decl.nets {
                take_net(module,net,table,consumed,&mut maps)?;
            }
        }
    }
    Ok(maps)
}

fn take_net(module: &ModuleDef,
            net: &Net,
            table: &PragmaMap,
            consumed: &mut HashSet<usize>,
            maps: &mut SignalMaps) -> Result<(),DYNERR> {
    let line = match table.get(&net.lineno) {
        Some(l) => l,
        None => return Ok(())
    };
    consumed.insert(net.lineno);
    if net.dir==Some(Direction::Inout) {
        return Err(Box::new(Error::UnsupportedSignalForm {
            module: module.name.clone(),
            signal: net.name.clone(),
            what: "inout ports cannot carry taps".to_string()
        }));
    }
    // port form is canonical, a body re-declaration adds nothing
    if maps.observed(&net.name).is_some() || maps.controlled(&net.name).is_some() {
        return Ok(());
    }
    if let Some(range) = &line.observe {
        maps.observe.push((net.name.clone(),*range));
    }
    if let Some(spec) = &line.control {
        maps.control.push((net.name.clone(),spec.clone()));
    }
    Ok(())
}

/// Reject classified names that collide with the names the rewrite
/// will mint.  Runs before any tree is touched.
pub fn check_reserved(maps: &HashMap<String,SignalMaps>,opts: &InsertOptions) -> Result<(),DYNERR> {
    let prefixes = [opts.observe_port.as_str(),opts.control_in.as_str(),opts.control_out.as_str()];
    let suffixes = ["_controlled","_int","_inst"];
    for (module,m) in maps {
        let names = m.observe.iter().map(|(n,_)| n)
            .chain(m.control.iter().map(|(n,_)| n));
        for name in names {
            let clash = prefixes.iter().any(|p| name.starts_with(p))
                || suffixes.iter().any(|s| name.ends_with(s));
            if clash {
                return Err(Box::new(Error::ReservedName {
                    module: module.clone(),
                    signal: name.clone()
                }));
            }
        }
    }
    Ok(())
}
