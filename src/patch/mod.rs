//! # Tap Insertion Engine
//!
//! The transformation pipeline behind `veritap insert`.  Stages, in
//! order: `pragma` scans annotation lines, `index` parses the file set
//! and builds the module and hierarchy indices, `classify` correlates
//! pragmas with declarations, `rewrite` splits each controlled signal
//! into a driver/load pair inside its module, and `plumb` composes the
//! side-channel widths up the instance tree and adds the external
//! ports.  The run either transforms the whole file set or fails with
//! no output written.

pub mod pragma;
pub mod index;
pub mod classify;
pub mod rewrite;
pub mod plumb;
#[cfg(test)]
mod pragma_test;
#[cfg(test)]
mod classify_test;

use std::collections::HashMap;
use std::path::{Path,PathBuf};
use thiserror::Error;
use log::info;
use crate::vlog;
use crate::DYNERR;

#[derive(Error,Debug)]
pub enum Error {
    #[error("malformed pragma in {file} line {line}: `{token}`")]
    MalformedPragma { file: String, line: usize, token: String },
    #[error("filelist entry `{0}` does not exist")]
    MissingFile(String),
    #[error("module `{module}` is defined more than once, second definition in {file}")]
    DuplicateModule { module: String, file: String },
    #[error("recursive instantiation: {path}")]
    HierarchyCycle { path: String },
    #[error("unsupported declaration form for `{signal}` in module `{module}`: {what}")]
    UnsupportedSignalForm { module: String, signal: String, what: String },
    #[error("signal `{signal}` in module `{module}` collides with the instrumentation namespace")]
    ReservedName { module: String, signal: String },
    #[error("top module `{0}` is not defined in the file set")]
    MissingTop(String)
}

/// Inclusive `[msb:lsb]` bit range, `msb >= lsb`.
#[derive(Clone,Copy,Debug,PartialEq)]
pub struct BitRange {
    pub msb: u32,
    pub lsb: u32
}

impl BitRange {
    pub fn width(&self) -> u32 {
        self.msb - self.lsb + 1
    }
}

/// Control request carried by a pragma: the kind tag is opaque here,
/// it is preserved for logs and for the off-chip routing unit.
#[derive(Clone,Debug,PartialEq)]
pub struct ControlSpec {
    pub kind: String,
    pub range: BitRange
}

/// What one annotated line asks for; at least one side is present.
#[derive(Clone,Debug)]
pub struct PragmaLine {
    pub observe: Option<BitRange>,
    pub control: Option<ControlSpec>
}

/// Per-file pragma scan result: 1-based line number to request.
pub type PragmaMap = HashMap<usize,PragmaLine>;

/// Per-module classification result.  Order is classification order
/// (pre-order over the module tree) and fixes tap bit packing.
#[derive(Clone,Debug,Default)]
pub struct SignalMaps {
    pub observe: Vec<(String,BitRange)>,
    pub control: Vec<(String,ControlSpec)>
}

impl SignalMaps {
    pub fn is_empty(&self) -> bool {
        self.observe.is_empty() && self.control.is_empty()
    }
    pub fn observed(&self,name: &str) -> Option<&BitRange> {
        self.observe.iter().find(|(n,_)| n==name).map(|(_,r)| r)
    }
    pub fn controlled(&self,name: &str) -> Option<&ControlSpec> {
        self.control.iter().find(|(n,_)| n==name).map(|(_,c)| c)
    }
}

/// Side-channel widths of one module.  Internal widths come from the
/// intra-module rewrite, aggregates add the instantiated children.
#[derive(Clone,Copy,Debug,Default,PartialEq)]
pub struct ModuleWidths {
    pub internal_obs: u32,
    pub internal_ctl: u32,
    pub aggregate_obs: u32,
    pub aggregate_ctl: u32
}

/// Configured identifiers and output naming for one insertion run.
#[derive(Clone,Debug)]
pub struct InsertOptions {
    pub top: String,
    pub observe_port: String,
    pub control_in: String,
    pub control_out: String,
    pub suffix: String
}

impl InsertOptions {
    pub fn new(top: &str) -> Self {
        Self {
            top: top.to_string(),
            observe_port: "observe_port".to_string(),
            control_in: "control_in".to_string(),
            control_out: "control_out".to_string(),
            suffix: "_patch".to_string()
        }
    }
}

/// One parsed source file of the design.
pub struct SourceFile {
    pub path: PathBuf,
    pub ast: vlog::Source
}

/// The whole design: file-wise trees plus the module name index.
pub struct Design {
    pub files: Vec<SourceFile>,
    index: HashMap<String,(usize,usize)>
}

impl Design {
    pub fn module(&self,name: &str) -> Option<&vlog::ModuleDef> {
        self.index.get(name).map(|(f,m)| &self.files[*f].ast.modules[*m])
    }
    pub fn module_mut(&mut self,name: &str) -> Option<&mut vlog::ModuleDef> {
        match self.index.get(name) {
            Some((f,m)) => Some(&mut self.files[*f].ast.modules[*m]),
            None => None
        }
    }
    pub fn file_of(&self,name: &str) -> Option<&Path> {
        self.index.get(name).map(|(f,_)| self.files[*f].path.as_path())
    }
    pub fn module_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.index.keys().cloned().collect();
        names.sort();
        names
    }
}

/// One output file, rendered but not yet written.
pub struct PatchOutput {
    pub path: PathBuf,
    pub text: String
}

/// Read a filelist: one path per line, blanks ignored.
pub fn read_filelist(path: &str) -> Result<Vec<PathBuf>,DYNERR> {
    let text = std::fs::read_to_string(path)
        .map_err(|_| Error::MissingFile(path.to_string()))?;
    let mut files = Vec::new();
    for line in text.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let p = PathBuf::from(trimmed);
        if !p.exists() {
            return Err(Box::new(Error::MissingFile(trimmed.to_string())));
        }
        files.push(p);
    }
    Ok(files)
}

/// Output path for a transformed source file: `<stem><suffix>.<ext>`
/// alongside the input.
pub fn patched_path(input: &Path,suffix: &str) -> PathBuf {
    let stem = input.file_stem().and_then(|s| s.to_str()).unwrap_or("out");
    let named = match input.extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("{}{}.{}",stem,suffix,ext),
        None => format!("{}{}",stem,suffix)
    };
    input.with_file_name(named)
}

/// Run the whole pipeline over a filelist and return the rendered
/// outputs.  Nothing is written here; the caller decides where the
/// text goes, so a failing run leaves no partial files behind.
pub fn run(filelist: &str,opts: &InsertOptions) -> Result<Vec<PatchOutput>,DYNERR> {
    let files = read_filelist(filelist)?;
    let pragmas = pragma::scan_files(&files)?;
    let mut design = index::build(&files)?;
    let maps = classify::classify(&design,&pragmas)?;
    classify::check_reserved(&maps,opts)?;
    if maps.values().all(|m| m.is_empty()) {
        info!("no pragmas anywhere in the file set, nothing to do");
        return Ok(Vec::new());
    }
    let tree = index::instance_tree(&design,&opts.top)?;
    plumb::instrument(&mut design,&tree,&maps,opts)?;
    let mut outputs = Vec::new();
    for file in &design.files {
        outputs.push(PatchOutput {
            path: patched_path(&file.path,&opts.suffix),
            text: vlog::emit::source(&file.ast)
        });
    }
    Ok(outputs)
}
