//! Hierarchy pass: compose side-channel widths bottom-up and connect
//! every instrumented child instance to its parent.
//!
//! Runs post-order over the instance tree so a child's aggregate
//! widths exist before any parent consults them.  A module
//! instantiated several times is rewritten exactly once; the per-
//! instance work (port arguments, slices of the collector buses)
//! repeats for each instance.  In every generated concatenation the
//! module's own taps occupy the high bits ahead of the instance
//! collector bus; that ordering is what the off-chip units decode.

use std::collections::HashMap;
use log::{debug,warn};
use super::index::{self,InstanceTree};
use super::rewrite::{self,PortDirs};
use super::{Design,InsertOptions,ModuleWidths,SignalMaps};
use crate::vlog::{Assign,Decl,Direction,Expr,Item,ModuleDef,Net,NetKind,Port,PortArg,Width};
use crate::DYNERR;

const INTERNAL_SUFFIX: &str = "_int";
const INSTANCE_SUFFIX: &str = "_inst";

/// Rewrite and plumb every module reachable from the tree root.
/// Returns the width table keyed by module name.
pub fn instrument(design: &mut Design,
                  tree: &InstanceTree,
                  maps: &HashMap<String,SignalMaps>,
                  opts: &InsertOptions) -> Result<HashMap<String,ModuleWidths>,DYNERR> {
    let dirs = PortDirs::of(design);
    let order = index::post_order(tree);
    let mut widths: HashMap<String,ModuleWidths> = HashMap::new();
    let empty = SignalMaps::default();
    for name in &order {
        let m = maps.get(name).unwrap_or(&empty);
        let module = design.module_mut(name).expect("post-order only yields defined modules");
        let rr = rewrite::apply(module,m,opts,&dirs)?;
        let (inst_obs,inst_ctl) = plumb_instances(module,&widths,&dirs,opts);
        let agg = ModuleWidths {
            internal_obs: rr.internal_obs,
            internal_ctl: rr.internal_ctl,
            aggregate_obs: rr.internal_obs + inst_obs,
            aggregate_ctl: rr.internal_ctl + inst_ctl
        };
        collect_channels(module,&agg,inst_obs,inst_ctl,opts);
        add_external_ports(module,&agg,opts);
        debug!("module `{}`: obs {}+{} ctl {}+{}",
            name,rr.internal_obs,inst_obs,rr.internal_ctl,inst_ctl);
        widths.insert(name.clone(),agg);
    }
    for (name,m) in maps {
        if !m.is_empty() && !order.contains(name) {
            warn!("module `{}` carries pragmas but is not reachable from `{}`, left untouched",
                name,opts.top);
        }
    }
    Ok(widths)
}

/// Walk the child instances in declaration order, declare the
/// collector buses, and connect each instrumented child to its slice.
/// Returns the summed child widths `(instance_obs, instance_ctl)`.
fn plumb_instances(module: &mut ModuleDef,
                   widths: &HashMap<String,ModuleWidths>,
                   dirs: &PortDirs,
                   opts: &InsertOptions) -> (u32,u32) {
    let mut inst_obs = 0;
    let mut inst_ctl = 0;
    for item in &module.items {
        if let Item::Instances(list) = item {
            if let Some(w) = widths.get(&list.module) {
                inst_obs += w.aggregate_obs * list.instances.len() as u32;
                inst_ctl += w.aggregate_ctl * list.instances.len() as u32;
            }
        }
    }
    if inst_obs==0 && inst_ctl==0 {
        return (0,0);
    }
    let obs_bus = format!("{}{}",opts.observe_port,INSTANCE_SUFFIX);
    let ctl_in_bus = format!("{}{}",opts.control_in,INSTANCE_SUFFIX);
    let ctl_out_bus = format!("{}{}",opts.control_out,INSTANCE_SUFFIX);
    let mut decls: Vec<Item> = Vec::new();
    if inst_obs > 0 {
        decls.push(bus_decl(&obs_bus,inst_obs));
    }
    if inst_ctl > 0 {
        decls.push(bus_decl(&ctl_in_bus,inst_ctl));
        decls.push(bus_decl(&ctl_out_bus,inst_ctl));
    }
    let mut obs_ofs = 0;
    let mut ctl_ofs = 0;
    for item in module.items.iter_mut() {
        if let Item::Instances(list) = item {
            let w = match widths.get(&list.module) {
                Some(w) => *w,
                None => continue
            };
            for inst in list.instances.iter_mut() {
                if w.aggregate_obs==0 && w.aggregate_ctl==0 {
                    continue;
                }
                name_positional_args(&list.module,inst,dirs);
                if w.aggregate_obs > 0 {
                    inst.ports.push(PortArg {
                        formal: Some(opts.observe_port.clone()),
                        actual: Some(Expr::slice(&obs_bus,obs_ofs+w.aggregate_obs-1,obs_ofs))
                    });
                    obs_ofs += w.aggregate_obs;
                }
                if w.aggregate_ctl > 0 {
                    inst.ports.push(PortArg {
                        formal: Some(opts.control_in.clone()),
                        actual: Some(Expr::slice(&ctl_in_bus,ctl_ofs+w.aggregate_ctl-1,ctl_ofs))
                    });
                    inst.ports.push(PortArg {
                        formal: Some(opts.control_out.clone()),
                        actual: Some(Expr::slice(&ctl_out_bus,ctl_ofs+w.aggregate_ctl-1,ctl_ofs))
                    });
                    ctl_ofs += w.aggregate_ctl;
                }
            }
        }
    }
    module.items.append(&mut decls);
    (inst_obs,inst_ctl)
}

/// Appending a named connection to a positional list would mix the
/// two styles, so positional instances are converted first using the
/// child's declared port order.
fn name_positional_args(child: &str,inst: &mut crate::vlog::Instance,dirs: &PortDirs) {
    if inst.ports.iter().all(|p| p.formal.is_some()) {
        return;
    }
    for (pos,arg) in inst.ports.iter_mut().enumerate() {
        if arg.formal.is_none() {
            match dirs.formal_at(child,pos) {
                Some(f) => arg.formal = Some(f.to_string()),
                None => warn!("instance `{}` has more connections than `{}` has ports",inst.name,child)
            }
        }
    }
}

/// Tie the internal and instance sides of each channel to the
/// external ports, following which of the two sides exist.
fn collect_channels(module: &mut ModuleDef,
                    agg: &ModuleWidths,
                    inst_obs: u32,
                    inst_ctl: u32,
                    opts: &InsertOptions) {
    let join = |port: &str| (format!("{}{}",port,INTERNAL_SUFFIX),format!("{}{}",port,INSTANCE_SUFFIX));
    // observation flows outward
    let (obs_int,obs_inst) = join(&opts.observe_port);
    match (agg.internal_obs>0,inst_obs>0) {
        (true,true) => push_assign(module,Expr::ident(&opts.observe_port),
            Expr::Concat(vec![Expr::ident(&obs_int),Expr::ident(&obs_inst)])),
        (true,false) => push_assign(module,Expr::ident(&opts.observe_port),Expr::ident(&obs_int)),
        (false,true) => push_assign(module,Expr::ident(&opts.observe_port),Expr::ident(&obs_inst)),
        (false,false) => {}
    }
    // control sampling flows outward, substitution flows inward
    let (in_int,in_inst) = join(&opts.control_in);
    let (out_int,out_inst) = join(&opts.control_out);
    match (agg.internal_ctl>0,inst_ctl>0) {
        (true,true) => {
            push_assign(module,Expr::ident(&opts.control_in),
                Expr::Concat(vec![Expr::ident(&in_int),Expr::ident(&in_inst)]));
            push_assign(module,
                Expr::Concat(vec![Expr::ident(&out_int),Expr::ident(&out_inst)]),
                Expr::ident(&opts.control_out));
        },
        (true,false) => {
            push_assign(module,Expr::ident(&opts.control_in),Expr::ident(&in_int));
            push_assign(module,Expr::ident(&out_int),Expr::ident(&opts.control_out));
        },
        (false,true) => {
            push_assign(module,Expr::ident(&opts.control_in),Expr::ident(&in_inst));
            push_assign(module,Expr::ident(&out_inst),Expr::ident(&opts.control_out));
        },
        (false,false) => {}
    }
}

fn push_assign(module: &mut ModuleDef,lhs: Expr,rhs: Expr) {
    module.items.push(Item::Assign(Assign { lineno: 0, lhs, rhs }));
}

/// Give the module its external side-channel ports, sized to the
/// aggregates.  Nothing is added when the module is untouched.
fn add_external_ports(module: &mut ModuleDef,agg: &ModuleWidths,opts: &InsertOptions) {
    if agg.aggregate_obs > 0 {
        append_port(module,&opts.observe_port,Direction::Output,agg.aggregate_obs);
    }
    if agg.aggregate_ctl > 0 {
        append_port(module,&opts.control_in,Direction::Output,agg.aggregate_ctl);
        append_port(module,&opts.control_out,Direction::Input,agg.aggregate_ctl);
    }
}

fn append_port(module: &mut ModuleDef,name: &str,dir: Direction,width: u32) {
    let classic = !module.ports.is_empty() && module.ports.iter().all(|p| matches!(p,Port::Named(_)));
    let net = Net {
        dir: Some(dir),
        kind: None,
        width: Some(Width::of(width-1,0)),
        name: name.to_string(),
        lineno: 0
    };
    if classic {
        module.ports.push(Port::Named(name.to_string()));
        module.items.push(Item::Decl(Decl { lineno: 0, nets: vec![net] }));
    } else {
        module.ports.push(Port::Decl(net));
    }
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
