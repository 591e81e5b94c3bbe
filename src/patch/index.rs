//! File-set indices: parse every file once, map module names to their
//! definitions, and build the instantiation tree under the top module.

use std::collections::{HashMap,HashSet};
use std::path::PathBuf;
use log::{debug,error};
use super::{Design,Error,SourceFile};
use crate::vlog::{self,Item};
use crate::DYNERR;

/// Parse each file exactly once and build the module name index.
/// A module name defined twice anywhere in the set is fatal.
pub fn build(files: &[PathBuf]) -> Result<Design,DYNERR> {
    let mut sources: Vec<(PathBuf,String)> = Vec::new();
    for path in files {
        let text = std::fs::read_to_string(path)
            .map_err(|_| Error::MissingFile(path.display().to_string()))?;
        sources.push((path.clone(),text));
    }
    build_from_text(&sources)
}

/// Index already-loaded sources.  The paths are carried through for
/// error context and output naming only.
pub fn build_from_text(sources: &[(PathBuf,String)]) -> Result<Design,DYNERR> {
    let mut parsed: Vec<SourceFile> = Vec::new();
    let mut index: HashMap<String,(usize,usize)> = HashMap::new();
    for (f,(path,text)) in sources.iter().enumerate() {
        let ast = match vlog::parser::parse(text) {
            Ok(ast) => ast,
            Err(e) => {
                error!("{}: {}",path.display(),e);
                return Err(Box::new(e));
            }
        };
        for (m,module) in ast.modules.iter().enumerate() {
            if index.contains_key(&module.name) {
                return Err(Box::new(Error::DuplicateModule {
                    module: module.name.clone(),
                    file: path.display().to_string()
                }));
            }
            debug!("module `{}` defined in {}",module.name,path.display());
            index.insert(module.name.clone(),(f,m));
        }
        parsed.push(SourceFile { path: path.clone(), ast });
    }
    Ok(Design { files: parsed, index })
}

/// One node of the instantiation tree.  The root carries the
/// conventional instance name `TOP`.
#[derive(Clone,Debug)]
pub struct InstanceTree {
    pub instance: String,
    pub module: String,
    pub children: Vec<InstanceTree>
}

/// Build the tree rooted at `top` by walking instance lists.
/// Instances of modules not defined in the file set are black boxes
/// and are left out of the tree.  Recursive instantiation is fatal.
pub fn instance_tree(design: &Design,top: &str) -> Result<InstanceTree,DYNERR> {
    if design.module(top).is_none() {
        return Err(Box::new(Error::MissingTop(top.to_string())));
    }
    let mut path: Vec<String> = vec![top.to_string()];
    let children = descend(design,top,&mut path)?;
    Ok(InstanceTree {
        instance: "TOP".to_string(),
        module: top.to_string(),
        children
    })
}

fn descend(design: &Design,module: &str,path: &mut Vec<String>) -> Result<Vec<InstanceTree>,DYNERR> {
    let def = design.module(module).expect("caller guarantees the module exists");
    let mut children = Vec::new();
    for item in &def.items {
        if let Item::Instances(list) = item {
            if design.module(&list.module).is_none() {
                debug!("`{}` instantiates undefined module `{}`, treating as black box",module,list.module);
                continue;
            }
            for inst in &list.instances {
                if path.contains(&list.module) {
                    let mut cycle = path.clone();
                    cycle.push(list.module.clone());
                    return Err(Box::new(Error::HierarchyCycle { path: cycle.join(" -> ") }));
                }
                path.push(list.module.clone());
                let grand = descend(design,&list.module,path)?;
                path.pop();
                children.push(InstanceTree {
                    instance: inst.name.clone(),
                    module: list.module.clone(),
                    children: grand
                });
            }
        }
    }
    Ok(children)
}

/// Unique module names in children-first order.  A module instantiated
/// several times appears once, at its first completion point.
pub fn post_order(tree: &InstanceTree) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut order: Vec<String> = Vec::new();
    fn walk(node: &InstanceTree,seen: &mut HashSet<String>,order: &mut Vec<String>) {
        for child in &node.children {
            walk(child,seen,order);
        }
        if seen.insert(node.module.clone()) {
            order.push(node.module.clone());
        }
    }
    walk(tree,&mut seen,&mut order);
    order
}
