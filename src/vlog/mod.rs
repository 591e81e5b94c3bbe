//! # Verilog Front-End
//!
//! A self-contained front-end for the RTL subset the patcher operates on.
//! `lexer` and `parser` turn source text into the tree types defined here,
//! `emit` turns a (possibly mutated) tree back into source text.
//!
//! The subset covers module definitions with ANSI or classic port lists,
//! wire/reg/input/output/inout declarations, continuous assignments,
//! always/initial blocks with begin/end, if/else and case statements,
//! and module instantiations with named or positional connections.
//! Generate blocks, parameters, and hierarchical references are not
//! accepted.

pub mod lexer;
pub mod parser;
pub mod emit;
#[cfg(test)]
mod parser_test;

use thiserror::Error;

#[derive(Error,Debug)]
pub enum Error {
    #[error("syntax error at line {line}: {what}")]
    Syntax { line: usize, what: String },
    #[error("unsupported construct at line {line}: {what}")]
    Unsupported { line: usize, what: String }
}

/// Root of a parsed source file, the iterable of module definitions.
#[derive(Clone,Debug)]
pub struct Source {
    pub modules: Vec<ModuleDef>
}

#[derive(Clone,Debug)]
pub struct ModuleDef {
    pub name: String,
    pub lineno: usize,
    pub ports: Vec<Port>,
    pub items: Vec<Item>
}

/// A port list entry.  Classic style gives just the name, directions
/// coming from declarations in the body.  ANSI style carries the full
/// declaration in the header.
#[derive(Clone,Debug)]
pub enum Port {
    Named(String),
    Decl(Net)
}

impl Port {
    pub fn name(&self) -> &str {
        match self {
            Port::Named(n) => n,
            Port::Decl(net) => &net.name
        }
    }
}

#[derive(Clone,Copy,Debug,PartialEq)]
pub enum Direction {
    Input,
    Output,
    Inout
}

#[derive(Clone,Copy,Debug,PartialEq)]
pub enum NetKind {
    Wire,
    Reg
}

/// One declared signal.  `dir` is present for port declarations,
/// `kind` is present when wire/reg was written out (a bare input or
/// output is an implicit wire).
#[derive(Clone,Debug)]
pub struct Net {
    pub dir: Option<Direction>,
    pub kind: Option<NetKind>,
    pub width: Option<Width>,
    pub name: String,
    pub lineno: usize
}

/// An inclusive `[msb:lsb]` range in a declaration or part-select.
#[derive(Clone,Debug)]
pub struct Width {
    pub msb: Expr,
    pub lsb: Expr
}

impl Width {
    /// Constant range `[msb:lsb]` from integers.
    pub fn of(msb: u32,lsb: u32) -> Self {
        Self {
            msb: Expr::IntConst(msb.to_string()),
            lsb: Expr::IntConst(lsb.to_string())
        }
    }
}

/// One statement or declaration in a module body.
#[derive(Clone,Debug)]
pub enum Item {
    Decl(Decl),
    Assign(Assign),
    Always(Always),
    Initial(Stmt),
    Instances(InstanceList)
}

/// A declaration line; `wire a, b;` yields one `Decl` with two nets.
#[derive(Clone,Debug)]
pub struct Decl {
    pub lineno: usize,
    pub nets: Vec<Net>
}

/// Continuous assignment, also reused as the payload of procedural
/// blocking/non-blocking substitutions.
#[derive(Clone,Debug)]
pub struct Assign {
    pub lineno: usize,
    pub lhs: Expr,
    pub rhs: Expr
}

#[derive(Clone,Copy,Debug,PartialEq)]
pub enum Edge {
    Level,
    Pos,
    Neg
}

#[derive(Clone,Debug)]
pub struct SensItem {
    pub edge: Edge,
    pub expr: Expr
}

/// `always @(...)` block; `sens` of `None` means `@(*)`.
#[derive(Clone,Debug)]
pub struct Always {
    pub lineno: usize,
    pub sens: Option<Vec<SensItem>>,
    pub body: Stmt
}

#[derive(Clone,Debug)]
pub enum Stmt {
    Block(Vec<Stmt>),
    Blocking(Assign),
    Nonblocking(Assign),
    If {
        lineno: usize,
        cond: Expr,
        then_s: Box<Stmt>,
        else_s: Option<Box<Stmt>>
    },
    Case {
        lineno: usize,
        subject: Expr,
        arms: Vec<CaseArm>
    },
    Null
}

/// One arm of a case statement; empty `labels` is the default arm.
#[derive(Clone,Debug)]
pub struct CaseArm {
    pub labels: Vec<Expr>,
    pub body: Stmt
}

/// `child u0 (...), u1 (...);`
#[derive(Clone,Debug)]
pub struct InstanceList {
    pub lineno: usize,
    pub module: String,
    pub instances: Vec<Instance>
}

#[derive(Clone,Debug)]
pub struct Instance {
    pub lineno: usize,
    pub name: String,
    pub ports: Vec<PortArg>
}

/// A port connection.  `formal` is `None` for positional style,
/// `actual` is `None` for an explicitly unconnected `.x()`.
#[derive(Clone,Debug)]
pub struct PortArg {
    pub formal: Option<String>,
    pub actual: Option<Expr>
}

#[derive(Clone,Debug)]
pub enum Expr {
    Ident(String),
    IntConst(String),
    Partselect {
        base: String,
        msb: Box<Expr>,
        lsb: Box<Expr>
    },
    BitSelect {
        base: String,
        index: Box<Expr>
    },
    Concat(Vec<Expr>),
    Unary {
        op: &'static str,
        arg: Box<Expr>
    },
    Binary {
        op: &'static str,
        lhs: Box<Expr>,
        rhs: Box<Expr>
    },
    Cond {
        cond: Box<Expr>,
        then_e: Box<Expr>,
        else_e: Box<Expr>
    }
}

impl Expr {
    pub fn ident(name: &str) -> Self {
        Expr::Ident(name.to_string())
    }
    /// Part-select `base[msb:lsb]` with constant bounds.
    pub fn slice(base: &str,msb: u32,lsb: u32) -> Self {
        Expr::Partselect {
            base: base.to_string(),
            msb: Box::new(Expr::IntConst(msb.to_string())),
            lsb: Box::new(Expr::IntConst(lsb.to_string()))
        }
    }
}

impl ModuleDef {
    /// Find the header port entry for `name`, if any.
    pub fn port(&self,name: &str) -> Option<&Port> {
        self.ports.iter().find(|p| p.name()==name)
    }
    /// Direction of the named port, searching the ANSI header first and
    /// falling back to body declarations for classic style.
    pub fn port_direction(&self,name: &str) -> Option<Direction> {
        for p in &self.ports {
            if let Port::Decl(net) = p {
                if net.name==name {
                    return net.dir;
                }
            }
        }
        if self.ports.iter().any(|p| p.name()==name) {
            for item in &self.items {
                if let Item::Decl(decl) = item {
                    for net in &decl.nets {
                        if net.name==name {
                            return net.dir;
                        }
                    }
                }
            }
        }
        None
    }
}
