//! Line-oriented scan for `#pragma` annotation lines.
//!
//! This pass never touches the parser: it reads the raw text of each
//! file and records, per 1-based line number, what the line asks for.
//! Recognized directives on a single line are `observe A:B` and
//! `control <kind> A:B`, in either order.  Anything else after
//! `#pragma` fails the run.

use std::collections::HashMap;
use std::path::PathBuf;
use log::{debug,trace};
use super::{BitRange,ControlSpec,Error,PragmaLine,PragmaMap};
use crate::DYNERR;

const MARKER: &str = "#pragma";

/// Scan every file in the list.  Files with no pragmas map to an
/// empty table.
pub fn scan_files(files: &[PathBuf]) -> Result<HashMap<PathBuf,PragmaMap>,DYNERR> {
    let mut result = HashMap::new();
    for path in files {
        let text = std::fs::read_to_string(path)
            .map_err(|_| Error::MissingFile(path.display().to_string()))?;
        let map = scan_text(&path.display().to_string(),&text)?;
        debug!("{}: {} pragma line(s)",path.display(),map.len());
        result.insert(path.clone(),map);
    }
    Ok(result)
}

/// Scan one file's text.  `file` is used only for error context.
pub fn scan_text(file: &str,text: &str) -> Result<PragmaMap,Error> {
    let mut map = PragmaMap::new();
    for (i,line) in text.lines().enumerate() {
        let lineno = i+1;
        let rest = match line.find(MARKER) {
            Some(pos) => &line[pos+MARKER.len()..],
            None => continue
        };
        let parsed = parse_directives(file,lineno,rest)?;
        trace!("{} line {}: {:?}",file,lineno,parsed);
        map.insert(lineno,parsed);
    }
    Ok(map)
}

fn parse_directives(file: &str,lineno: usize,rest: &str) -> Result<PragmaLine,Error> {
    let toks: Vec<&str> = rest.split_whitespace().collect();
    let malformed = |token: &str| Error::MalformedPragma {
        file: file.to_string(),
        line: lineno,
        token: token.to_string()
    };
    let mut observe: Option<BitRange> = None;
    let mut control: Option<ControlSpec> = None;
    let mut i = 0;
    while i < toks.len() {
        match toks[i] {
            "observe" => {
                if observe.is_some() {
                    return Err(malformed("observe"));
                }
                let range = toks.get(i+1).ok_or_else(|| malformed("observe"))?;
                observe = Some(parse_range(file,lineno,range)?);
                i += 2;
            },
            "control" => {
                if control.is_some() {
                    return Err(malformed("control"));
                }
                let kind = toks.get(i+1).ok_or_else(|| malformed("control"))?;
                let range = toks.get(i+2).ok_or_else(|| malformed("control"))?;
                control = Some(ControlSpec {
                    kind: kind.to_string(),
                    range: parse_range(file,lineno,range)?
                });
                i += 3;
            },
            other => return Err(malformed(other))
        }
    }
    if observe.is_none() && control.is_none() {
        return Err(malformed(MARKER));
    }
    Ok(PragmaLine { observe, control })
}

/// `A:B` as two non-negative decimals with `A >= B`.
fn parse_range(file: &str,lineno: usize,token: &str) -> Result<BitRange,Error> {
    let malformed = || Error::MalformedPragma {
        file: file.to_string(),
        line: lineno,
        token: token.to_string()
    };
    let (a,b) = token.split_once(':').ok_or_else(malformed)?;
    let msb = u32::from_str_radix(a,10).map_err(|_| malformed())?;
    let lsb = u32::from_str_radix(b,10).map_err(|_| malformed())?;
    if msb < lsb {
        return Err(malformed());
    }
    Ok(BitRange { msb, lsb })
}
