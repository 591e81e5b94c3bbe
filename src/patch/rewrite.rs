//! Intra-module rewrite: split every controlled signal into a
//! driver/load pair and emit the tap assignments that route the pair
//! through the module's side-channel buses.
//!
//! The rewrite is keyed on the declaration form of the signal.  For an
//! input port the external value keeps the original name and the loads
//! move to the `_controlled` companion; for every other form the
//! drivers move to the companion and the original name carries the
//! substituted value to its loads.  Observation always taps the
//! driver-side wire, so the operator sees the value the logic
//! produced, not the value the routing unit substituted.  A control
//! range narrower than the declared width only diverts the selected
//! bits; the rest pass through the split unchanged.

use std::collections::HashMap;
use log::info;
use super::{BitRange,Design,Error,InsertOptions,SignalMaps};
use crate::vlog::{Assign,Decl,Direction,Expr,Item,ModuleDef,Net,NetKind,Port,PortArg,Stmt,Width};
use crate::DYNERR;

const COMPANION_SUFFIX: &str = "_controlled";
const INTERNAL_SUFFIX: &str = "_int";

/// The five declaration forms a controlled signal may take.
#[derive(Clone,Copy,Debug,PartialEq)]
enum SignalForm {
    InputWire,
    OutputWire,
    OutputReg,
    InternalReg,
    InternalWire
}

/// Port directions of every module, snapshotted before mutation so
/// instance connections can be renamed by role.
pub struct PortDirs {
    map: HashMap<String,(Vec<String>,HashMap<String,Direction>)>
}

impl PortDirs {
    /// No module information; every instance connection reads.
    pub fn empty() -> Self {
        Self { map: HashMap::new() }
    }
    pub fn of(design: &Design) -> Self {
        let mut map = HashMap::new();
        for file in &design.files {
            for module in &file.ast.modules {
                let order: Vec<String> = module.ports.iter().map(|p| p.name().to_string()).collect();
                let mut dirs = HashMap::new();
                for p in &module.ports {
                    if let Some(dir) = module.port_direction(p.name()) {
                        dirs.insert(p.name().to_string(),dir);
                    }
                }
                map.insert(module.name.clone(),(order,dirs));
            }
        }
        Self { map }
    }
    pub fn dir(&self,module: &str,formal: &str) -> Option<Direction> {
        self.map.get(module).and_then(|(_,dirs)| dirs.get(formal).copied())
    }
    pub fn formal_at(&self,module: &str,position: usize) -> Option<&str> {
        self.map.get(module).and_then(|(order,_)| order.get(position).map(|s| s.as_str()))
    }
}

/// What the rewrite leaves behind for the hierarchy pass.
#[derive(Clone,Debug,Default)]
pub struct RewriteResult {
    /// wires feeding the side-channel input bus, in packing order
    pub driver_list: Vec<(String,BitRange)>,
    /// wires driven from the side-channel output bus, in packing order
    pub load_list: Vec<(String,BitRange)>,
    pub internal_obs: u32,
    pub internal_ctl: u32
}

/// Rewrite one module in place.  A module with empty maps is returned
/// unchanged with zero widths.
pub fn apply(module: &mut ModuleDef,
             maps: &SignalMaps,
             opts: &InsertOptions,
             dirs: &PortDirs) -> Result<RewriteResult,DYNERR> {
    let mut result = RewriteResult::default();
    if maps.is_empty() {
        return Ok(result);
    }
    // driver-side wire per controlled signal, consulted by observation
    let mut driver_side: HashMap<String,String> = HashMap::new();
    let mut new_decls: Vec<Item> = Vec::new();
    let mut taps: Vec<Item> = Vec::new();

    for (name,spec) in &maps.control {
        let form = signal_form(module,name)?;
        let width = declared_width(module,name);
        let companion = format!("{}{}",name,COMPANION_SUFFIX);
        info!("module `{}`: control tap kind `{}` on `{}` [{}:{}] ({:?})",
            module.name,spec.kind,name,spec.range.msb,spec.range.lsb,form);
        let companion_kind = match form {
            SignalForm::OutputReg | SignalForm::InternalReg => NetKind::Reg,
            _ => NetKind::Wire
        };
        module.items.push(Item::Decl(Decl {
            lineno: 0,
            nets: vec![Net {
                dir: None,
                kind: Some(companion_kind),
                width: width.clone(),
                name: companion.clone(),
                lineno: 0
            }]
        }));
        let outside = uncovered_slices(&width,&spec.range);
        match form {
            SignalForm::InputWire => {
                rename_loads(module,name,&companion,dirs);
                result.driver_list.push((name.clone(),spec.range));
                result.load_list.push((companion.clone(),spec.range));
                driver_side.insert(name.clone(),name.clone());
                // bits the pragma leaves alone still reach the loads
                for (hi,lo) in &outside {
                    taps.push(pass_assign(&companion,name,*hi,*lo));
                }
            },
            SignalForm::OutputReg | SignalForm::InternalReg => {
                retag_as_wire(module,name);
                rename_drivers(module,name,&companion,dirs);
                result.driver_list.push((companion.clone(),spec.range));
                result.load_list.push((name.clone(),spec.range));
                driver_side.insert(name.clone(),companion.clone());
                for (hi,lo) in &outside {
                    taps.push(pass_assign(name,&companion,*hi,*lo));
                }
            },
            SignalForm::OutputWire | SignalForm::InternalWire => {
                rename_drivers(module,name,&companion,dirs);
                result.driver_list.push((companion.clone(),spec.range));
                result.load_list.push((name.clone(),spec.range));
                driver_side.insert(name.clone(),companion.clone());
                for (hi,lo) in &outside {
                    taps.push(pass_assign(name,&companion,*hi,*lo));
                }
            }
        }
        result.internal_ctl += spec.range.width();
    }

    // side-channel buses and control taps, packed densely from bit 0
    if result.internal_ctl > 0 {
        let ctl_in = format!("{}{}",opts.control_in,INTERNAL_SUFFIX);
        let ctl_out = format!("{}{}",opts.control_out,INTERNAL_SUFFIX);
        new_decls.push(bus_decl(&ctl_in,result.internal_ctl));
        new_decls.push(bus_decl(&ctl_out,result.internal_ctl));
        let mut slot = 0;
        for (wire,range) in &result.driver_list {
            taps.push(Item::Assign(Assign {
                lineno: 0,
                lhs: Expr::slice(&ctl_in,slot+range.width()-1,slot),
                rhs: signal_slice(module,wire,range)
            }));
            slot += range.width();
        }
        slot = 0;
        for (wire,range) in &result.load_list {
            taps.push(Item::Assign(Assign {
                lineno: 0,
                lhs: signal_slice(module,wire,range),
                rhs: Expr::slice(&ctl_out,slot+range.width()-1,slot)
            }));
            slot += range.width();
        }
    }

    // observation taps the driver-side wire of a controlled signal
    for (_,range) in &maps.observe {
        result.internal_obs += range.width();
    }
    if result.internal_obs > 0 {
        let obs = format!("{}{}",opts.observe_port,INTERNAL_SUFFIX);
        new_decls.push(bus_decl(&obs,result.internal_obs));
        let mut slot = 0;
        for (name,range) in &maps.observe {
            let target = driver_side.get(name).cloned().unwrap_or_else(|| name.clone());
            info!("module `{}`: observe tap on `{}` [{}:{}]",
                module.name,target,range.msb,range.lsb);
            taps.push(Item::Assign(Assign {
                lineno: 0,
                lhs: Expr::slice(&obs,slot+range.width()-1,slot),
                rhs: signal_slice(module,&target,range)
            }));
            slot += range.width();
        }
    }

    module.items.append(&mut new_decls);
    module.items.append(&mut taps);
    Ok(result)
}

fn bus_decl(name: &str,width: u32) -> Item {
    Item::Decl(Decl {
        lineno: 0,
        nets: vec![Net {
            dir: None,
            kind: Some(NetKind::Wire),
            width: Some(Width::of(width-1,0)),
            name: name.to_string(),
            lineno: 0
        }]
    })
}

/// Bits of the declared range the pragma range does not cover, as
/// up to two `(msb,lsb)` slices.  Empty for a scalar or when the
/// declared bounds are not plain constants.
fn uncovered_slices(width: &Option<Width>,range: &BitRange) -> Vec<(u32,u32)> {
    let (decl_msb,decl_lsb) = match width {
        Some(w) => match (const_u32(&w.msb),const_u32(&w.lsb)) {
            (Some(m),Some(l)) => (m,l),
            _ => return Vec::new()
        },
        None => return Vec::new()
    };
    let mut slices = Vec::new();
    if decl_msb > range.msb {
        slices.push((decl_msb,range.msb+1));
    }
    if range.lsb > decl_lsb {
        slices.push((range.lsb-1,decl_lsb));
    }
    slices
}

fn const_u32(e: &Expr) -> Option<u32> {
    match e {
        Expr::IntConst(text) => u32::from_str_radix(text,10).ok(),
        _ => None
    }
}

fn pass_assign(dst: &str,src: &str,msb: u32,lsb: u32) -> Item {
    Item::Assign(Assign {
        lineno: 0,
        lhs: Expr::slice(dst,msb,lsb),
        rhs: Expr::slice(src,msb,lsb)
    })
}

/// Slice of a named signal over a pragma range.  A scalar signal with
/// a `0:0` range is referenced plainly since part-selecting a scalar
/// is not legal.
fn signal_slice(module: &ModuleDef,name: &str,range: &BitRange) -> Expr {
    if declared_width(module,name).is_none() && range.msb==0 && range.lsb==0 {
        return Expr::ident(name);
    }
    Expr::slice(name,range.msb,range.lsb)
}

/// Resolve the declaration form of a signal, merging the header port
/// entry with any body declarations (classic style splits direction
/// and net class over two lines).
fn signal_form(module: &ModuleDef,name: &str) -> Result<SignalForm,DYNERR> {
    let mut dir: Option<Direction> = None;
    let mut kind: Option<NetKind> = None;
    let mut found = false;
    for_each_net(module,name,|net| {
        found = true;
        if dir.is_none() {
            dir = net.dir;
        }
        if kind.is_none() {
            kind = net.kind;
        }
    });
    if module.ports.iter().any(|p| p.name()==name) && dir.is_none() {
        dir = module.port_direction(name);
    }
    let unsupported = |what: &str| Box::new(Error::UnsupportedSignalForm {
        module: module.name.clone(),
        signal: name.to_string(),
        what: what.to_string()
    });
    if !found {
        return Err(unsupported("no declaration found"));
    }
    match (dir,kind) {
        (Some(Direction::Input),None) | (Some(Direction::Input),Some(NetKind::Wire)) => Ok(SignalForm::InputWire),
        (Some(Direction::Input),Some(NetKind::Reg)) => Err(unsupported("an input cannot be a reg")),
        (Some(Direction::Output),None) | (Some(Direction::Output),Some(NetKind::Wire)) => Ok(SignalForm::OutputWire),
        (Some(Direction::Output),Some(NetKind::Reg)) => Ok(SignalForm::OutputReg),
        (Some(Direction::Inout),_) => Err(unsupported("inout ports cannot carry taps")),
        (None,Some(NetKind::Reg)) => Ok(SignalForm::InternalReg),
        (None,Some(NetKind::Wire)) => Ok(SignalForm::InternalWire),
        (None,None) => Err(unsupported("no declaration found"))
    }
}

fn declared_width(module: &ModuleDef,name: &str) -> Option<Width> {
    let mut width: Option<Width> = None;
    for_each_net(module,name,|net| {
        if width.is_none() {
            width = net.width.clone();
        }
    });
    width
}

fn for_each_net<F: FnMut(&Net)>(module: &ModuleDef,name: &str,mut f: F) {
    for port in &module.ports {
        if let Port::Decl(net) = port {
            if net.name==name {
                f(net);
            }
        }
    }
    for item in &module.items {
        if let Item::Decl(decl) = item {
            for net in &decl.nets {
                if net.name==name {
                    f(net);
                }
            }
        }
    }
}

/// Turn every `reg` declaration of `name` into an explicit `wire`,
/// splitting multi-name declaration lines so siblings keep their
/// class.  Covers both the ANSI header entry and body declarations.
fn retag_as_wire(module: &mut ModuleDef,name: &str) {
    for port in module.ports.iter_mut() {
        if let Port::Decl(net) = port {
            if net.name==name && net.kind==Some(NetKind::Reg) {
                net.kind = Some(NetKind::Wire);
            }
        }
    }
    let mut i = 0;
    while i < module.items.len() {
        let split = match &mut module.items[i] {
            Item::Decl(decl) => {
                let hit = decl.nets.iter().any(|n| n.name==name && n.kind==Some(NetKind::Reg));
                if hit && decl.nets.len()==1 {
                    decl.nets[0].kind = Some(NetKind::Wire);
                    None
                } else if hit {
                    let pos = decl.nets.iter().position(|n| n.name==name).expect("just found it");
                    let mut net = decl.nets.remove(pos);
                    net.kind = Some(NetKind::Wire);
                    Some(Item::Decl(Decl { lineno: net.lineno, nets: vec![net] }))
                } else {
                    None
                }
            },
            _ => None
        };
        if let Some(item) = split {
            module.items.insert(i+1,item);
            i += 1;
        }
        i += 1;
    }
}

/// Rename the writing occurrences of `from`: assignment targets of
/// continuous and procedural assignments, and instance connections
/// bound to child outputs.  Select indices inside a target are
/// reading occurrences and are left alone.
pub fn rename_drivers(module: &mut ModuleDef,from: &str,to: &str,dirs: &PortDirs) {
    for item in module.items.iter_mut() {
        match item {
            Item::Assign(a) => rename_lvalue(&mut a.lhs,from,to),
            Item::Always(a) => rename_drivers_stmt(&mut a.body,from,to),
            Item::Initial(s) => rename_drivers_stmt(s,from,to),
            Item::Instances(list) => {
                for inst in list.instances.iter_mut() {
                    for (pos,arg) in inst.ports.iter_mut().enumerate() {
                        if arg_direction(dirs,&list.module,arg,pos)==Some(Direction::Output) {
                            if let Some(actual) = &mut arg.actual {
                                rename_lvalue(actual,from,to);
                            }
                        }
                    }
                }
            },
            Item::Decl(_) => {}
        }
    }
}

fn arg_direction(dirs: &PortDirs,module: &str,arg: &PortArg,pos: usize) -> Option<Direction> {
    match &arg.formal {
        Some(f) => dirs.dir(module,f),
        None => match dirs.formal_at(module,pos) {
            Some(f) => {
                let f = f.to_string();
                dirs.dir(module,&f)
            },
            None => None
        }
    }
}

fn rename_drivers_stmt(stmt: &mut Stmt,from: &str,to: &str) {
    match stmt {
        Stmt::Block(stmts) => {
            for s in stmts {
                rename_drivers_stmt(s,from,to);
            }
        },
        Stmt::Blocking(a) | Stmt::Nonblocking(a) => rename_lvalue(&mut a.lhs,from,to),
        Stmt::If { then_s, else_s, .. } => {
            rename_drivers_stmt(then_s,from,to);
            if let Some(e) = else_s {
                rename_drivers_stmt(e,from,to);
            }
        },
        Stmt::Case { arms, .. } => {
            for arm in arms {
                rename_drivers_stmt(&mut arm.body,from,to);
            }
        },
        Stmt::Null => {}
    }
}

/// Rename only the target base names; never descend into index
/// expressions, those are loads.
fn rename_lvalue(e: &mut Expr,from: &str,to: &str) {
    match e {
        Expr::Ident(name) if *name==from => *name = to.to_string(),
        Expr::Partselect { base, .. } | Expr::BitSelect { base, .. } if *base==from => {
            *base = to.to_string();
        },
        Expr::Concat(parts) => {
            for p in parts {
                rename_lvalue(p,from,to);
            }
        },
        _ => {}
    }
}

/// Rename the reading occurrences of `from`: right-hand sides,
/// conditions, case subjects and labels, sensitivity lists, select
/// indices inside assignment targets, and instance connections bound
/// to child inputs.  A connection whose direction cannot be resolved
/// is treated as a read.
pub fn rename_loads(module: &mut ModuleDef,from: &str,to: &str,dirs: &PortDirs) {
    for item in module.items.iter_mut() {
        match item {
            Item::Assign(a) => {
                rename_rvalue(&mut a.rhs,from,to);
                rename_lvalue_indices(&mut a.lhs,from,to);
            },
            Item::Always(a) => {
                if let Some(sens) = &mut a.sens {
                    for s in sens.iter_mut() {
                        rename_rvalue(&mut s.expr,from,to);
                    }
                }
                rename_loads_stmt(&mut a.body,from,to);
            },
            Item::Initial(s) => rename_loads_stmt(s,from,to),
            Item::Instances(list) => {
                for inst in list.instances.iter_mut() {
                    for (pos,arg) in inst.ports.iter_mut().enumerate() {
                        if arg_direction(dirs,&list.module,arg,pos)==Some(Direction::Output) {
                            continue;
                        }
                        if let Some(actual) = &mut arg.actual {
                            rename_rvalue(actual,from,to);
                        }
                    }
                }
            },
            Item::Decl(_) => {}
        }
    }
}

fn rename_loads_stmt(stmt: &mut Stmt,from: &str,to: &str) {
    match stmt {
        Stmt::Block(stmts) => {
            for s in stmts {
                rename_loads_stmt(s,from,to);
            }
        },
        Stmt::Blocking(a) | Stmt::Nonblocking(a) => {
            rename_rvalue(&mut a.rhs,from,to);
            rename_lvalue_indices(&mut a.lhs,from,to);
        },
        Stmt::If { cond, then_s, else_s, .. } => {
            rename_rvalue(cond,from,to);
            rename_loads_stmt(then_s,from,to);
            if let Some(e) = else_s {
                rename_loads_stmt(e,from,to);
            }
        },
        Stmt::Case { subject, arms, .. } => {
            rename_rvalue(subject,from,to);
            for arm in arms {
                for label in arm.labels.iter_mut() {
                    rename_rvalue(label,from,to);
                }
                rename_loads_stmt(&mut arm.body,from,to);
            }
        },
        Stmt::Null => {}
    }
}

/// Rename every identifier occurrence in a reading context.
fn rename_rvalue(e: &mut Expr,from: &str,to: &str) {
    match e {
        Expr::Ident(name) if *name==from => *name = to.to_string(),
        Expr::Ident(_) | Expr::IntConst(_) => {},
        Expr::Partselect { base, msb, lsb } => {
            if *base==from {
                *base = to.to_string();
            }
            rename_rvalue(msb,from,to);
            rename_rvalue(lsb,from,to);
        },
        Expr::BitSelect { base, index } => {
            if *base==from {
                *base = to.to_string();
            }
            rename_rvalue(index,from,to);
        },
        Expr::Concat(parts) => {
            for p in parts {
                rename_rvalue(p,from,to);
            }
        },
        Expr::Unary { arg, .. } => rename_rvalue(arg,from,to),
        Expr::Binary { lhs, rhs, .. } => {
            rename_rvalue(lhs,from,to);
            rename_rvalue(rhs,from,to);
        },
        Expr::Cond { cond, then_e, else_e } => {
            rename_rvalue(cond,from,to);
            rename_rvalue(then_e,from,to);
            rename_rvalue(else_e,from,to);
        }
    }
}

/// The select indices inside an assignment target read their operands
/// even though the base writes.
fn rename_lvalue_indices(e: &mut Expr,from: &str,to: &str) {
    match e {
        Expr::Partselect { msb, lsb, .. } => {
            rename_rvalue(msb,from,to);
            rename_rvalue(lsb,from,to);
        },
        Expr::BitSelect { index, .. } => rename_rvalue(index,from,to),
        Expr::Concat(parts) => {
            for p in parts {
                rename_lvalue_indices(p,from,to);
            }
        },
        _ => {}
    }
}
