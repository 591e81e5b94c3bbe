//! Pretty-printer for the Verilog subset.
//!
//! Output is accepted by the parser in this crate, so emit-then-parse
//! preserves the tree up to whitespace and comments.

use super::*;
use std::fmt::Write;

const TAB: &str = "    ";

/// Render a whole source file.
pub fn source(src: &Source) -> String {
    let mut out = String::new();
    for (i,m) in src.modules.iter().enumerate() {
        if i>0 {
            out += "\n";
        }
        out += &module(m);
    }
    out
}

pub fn module(m: &ModuleDef) -> String {
    let mut out = String::new();
    let ansi = m.ports.iter().any(|p| matches!(p,Port::Decl(_)));
    if m.ports.is_empty() {
        writeln!(out,"module {};",m.name).expect("unreachable");
    } else if ansi {
        writeln!(out,"module {}(",m.name).expect("unreachable");
        for (i,p) in m.ports.iter().enumerate() {
            let sep = match i+1==m.ports.len() { true => "", false => "," };
            match p {
                Port::Decl(net) => writeln!(out,"{}{}{}",TAB,net_text(net),sep).expect("unreachable"),
                Port::Named(name) => writeln!(out,"{}{}{}",TAB,name,sep).expect("unreachable")
            }
        }
        writeln!(out,");").expect("unreachable");
    } else {
        let names: Vec<&str> = m.ports.iter().map(|p| p.name()).collect();
        writeln!(out,"module {}({});",m.name,names.join(", ")).expect("unreachable");
    }
    for it in &m.items {
        out += &item(it,1);
    }
    out += "endmodule\n";
    out
}

fn indent(level: usize) -> String {
    TAB.repeat(level)
}

fn item(it: &Item,level: usize) -> String {
    let mut out = String::new();
    let ind = indent(level);
    match it {
        Item::Decl(decl) => {
            // one line per declaration, names grouped as declared
            let names: Vec<&str> = decl.nets.iter().map(|n| n.name.as_str()).collect();
            let head = net_head(&decl.nets[0]);
            writeln!(out,"{}{} {};",ind,head,names.join(", ")).expect("unreachable");
        },
        Item::Assign(a) => {
            writeln!(out,"{}assign {} = {};",ind,expr(&a.lhs),expr(&a.rhs)).expect("unreachable");
        },
        Item::Always(a) => {
            let sens = match &a.sens {
                None => "*".to_string(),
                Some(items) => {
                    let parts: Vec<String> = items.iter().map(|s| sens_text(s)).collect();
                    format!("({})",parts.join(" or "))
                }
            };
            writeln!(out,"{}always @{}",ind,sens).expect("unreachable");
            out += &stmt(&a.body,level+1);
        },
        Item::Initial(s) => {
            writeln!(out,"{}initial",ind).expect("unreachable");
            out += &stmt(s,level+1);
        },
        Item::Instances(list) => {
            for inst in &list.instances {
                writeln!(out,"{}{} {} (",ind,list.module,inst.name).expect("unreachable");
                for (i,arg) in inst.ports.iter().enumerate() {
                    let sep = match i+1==inst.ports.len() { true => "", false => "," };
                    let actual = match &arg.actual {
                        Some(e) => expr(e),
                        None => String::new()
                    };
                    match &arg.formal {
                        Some(f) => writeln!(out,"{}.{}({}){}",indent(level+1),f,actual,sep).expect("unreachable"),
                        None => writeln!(out,"{}{}{}",indent(level+1),actual,sep).expect("unreachable")
                    }
                }
                writeln!(out,"{});",ind).expect("unreachable");
            }
        }
    }
    out
}

fn stmt(s: &Stmt,level: usize) -> String {
    let mut out = String::new();
    let ind = indent(level);
    match s {
        Stmt::Block(stmts) => {
            writeln!(out,"{}begin",ind).expect("unreachable");
            for inner in stmts {
                out += &stmt(inner,level+1);
            }
            writeln!(out,"{}end",ind).expect("unreachable");
        },
        Stmt::Blocking(a) => {
            writeln!(out,"{}{} = {};",ind,expr(&a.lhs),expr(&a.rhs)).expect("unreachable");
        },
        Stmt::Nonblocking(a) => {
            writeln!(out,"{}{} <= {};",ind,expr(&a.lhs),expr(&a.rhs)).expect("unreachable");
        },
        Stmt::If { cond, then_s, else_s, .. } => {
            writeln!(out,"{}if ({})",ind,expr(cond)).expect("unreachable");
            out += &stmt(then_s,level+1);
            if let Some(e) = else_s {
                writeln!(out,"{}else",ind).expect("unreachable");
                out += &stmt(e,level+1);
            }
        },
        Stmt::Case { subject, arms, .. } => {
            writeln!(out,"{}case ({})",ind,expr(subject)).expect("unreachable");
            for arm in arms {
                match arm.labels.is_empty() {
                    true => writeln!(out,"{}default:",indent(level+1)).expect("unreachable"),
                    false => {
                        let labels: Vec<String> = arm.labels.iter().map(|l| expr(l)).collect();
                        writeln!(out,"{}{}:",indent(level+1),labels.join(", ")).expect("unreachable")
                    }
                }
                out += &stmt(&arm.body,level+2);
            }
            writeln!(out,"{}endcase",ind).expect("unreachable");
        },
        Stmt::Null => {
            writeln!(out,"{};",ind).expect("unreachable");
        }
    }
    out
}

fn sens_text(s: &SensItem) -> String {
    match s.edge {
        Edge::Level => expr(&s.expr),
        Edge::Pos => format!("posedge {}",expr(&s.expr)),
        Edge::Neg => format!("negedge {}",expr(&s.expr))
    }
}

/// Declaration keywords and range, without the name list.
fn net_head(net: &Net) -> String {
    let mut head = String::new();
    if let Some(dir) = net.dir {
        head += match dir {
            Direction::Input => "input",
            Direction::Output => "output",
            Direction::Inout => "inout"
        };
    }
    if let Some(kind) = net.kind {
        if !head.is_empty() {
            head += " ";
        }
        head += match kind {
            NetKind::Wire => "wire",
            NetKind::Reg => "reg"
        };
    }
    if let Some(w) = &net.width {
        head += &format!(" {}",width_text(w));
    }
    head
}

/// Full single-net declaration text, used for ANSI header ports.
fn net_text(net: &Net) -> String {
    format!("{} {}",net_head(net),net.name)
}

pub fn width_text(w: &Width) -> String {
    format!("[{}:{}]",expr(&w.msb),expr(&w.lsb))
}

pub fn expr(e: &Expr) -> String {
    match e {
        Expr::Ident(name) => name.clone(),
        Expr::IntConst(text) => text.clone(),
        Expr::Partselect { base, msb, lsb } => format!("{}[{}:{}]",base,expr(msb),expr(lsb)),
        Expr::BitSelect { base, index } => format!("{}[{}]",base,expr(index)),
        Expr::Concat(parts) => {
            let inner: Vec<String> = parts.iter().map(|p| expr(p)).collect();
            format!("{{{}}}",inner.join(", "))
        },
        Expr::Unary { op, arg } => format!("{}{}",op,grouped(arg)),
        Expr::Binary { op, lhs, rhs } => format!("{} {} {}",grouped(lhs),op,grouped(rhs)),
        Expr::Cond { cond, then_e, else_e } => {
            format!("{} ? {} : {}",grouped(cond),grouped(then_e),grouped(else_e))
        }
    }
}

/// Compound operands are parenthesized rather than relying on
/// precedence, so the printed form reparses to the same tree.
fn grouped(e: &Expr) -> String {
    match e {
        Expr::Binary {..} | Expr::Cond {..} => format!("({})",expr(e)),
        _ => expr(e)
    }
}
