//! Recursive descent parser for the Verilog subset.
//!
//! Produces the tree types in the parent module.  Every declaration,
//! port, and statement node carries the 1-based line number of the
//! token that introduced it.

use super::lexer::{self,Kind,Token};
use super::*;

pub struct Parser {
    toks: Vec<Token>,
    pos: usize
}

/// Parse a whole source file into its module definitions.
pub fn parse(src: &str) -> Result<Source,Error> {
    let toks = lexer::scan(src)?;
    let mut p = Parser { toks, pos: 0 };
    let mut modules = Vec::new();
    while !p.at_eof() {
        modules.push(p.module()?);
    }
    Ok(Source { modules })
}

impl Parser {
    fn peek(&self) -> &Token {
        &self.toks[self.pos]
    }
    fn next(&mut self) -> Token {
        let t = self.toks[self.pos].clone();
        if self.pos+1 < self.toks.len() {
            self.pos += 1;
        }
        t
    }
    fn at_eof(&self) -> bool {
        self.peek().kind==Kind::Eof
    }
    fn at(&self,text: &str) -> bool {
        let t = self.peek();
        (t.kind==Kind::Punct || t.kind==Kind::Keyword) && t.text==text
    }
    fn eat(&mut self,text: &str) -> bool {
        if self.at(text) {
            self.next();
            return true;
        }
        false
    }
    fn expect(&mut self,text: &str) -> Result<Token,Error> {
        if self.at(text) {
            return Ok(self.next());
        }
        let t = self.peek();
        Err(Error::Syntax { line: t.line, what: format!("expected `{}`, found `{}`",text,t.text) })
    }
    fn ident(&mut self) -> Result<Token,Error> {
        if self.peek().kind==Kind::Ident {
            return Ok(self.next());
        }
        let t = self.peek();
        Err(Error::Syntax { line: t.line, what: format!("expected identifier, found `{}`",t.text) })
    }

    fn module(&mut self) -> Result<ModuleDef,Error> {
        let kw = self.expect("module")?;
        let name = self.ident()?;
        let mut ports = Vec::new();
        if self.eat("(") {
            if !self.at(")") {
                ports = self.portlist()?;
            }
            self.expect(")")?;
        }
        self.expect(";")?;
        let mut items = Vec::new();
        while !self.at("endmodule") {
            if self.at_eof() {
                return Err(Error::Syntax { line: kw.line, what: format!("module `{}` is never closed",name.text) });
            }
            items.push(self.item()?);
        }
        self.expect("endmodule")?;
        Ok(ModuleDef { name: name.text, lineno: kw.line, ports, items })
    }

    fn portlist(&mut self) -> Result<Vec<Port>,Error> {
        let mut ports = Vec::new();
        loop {
            if self.at("input") || self.at("output") || self.at("inout") {
                let dir = self.direction()?;
                let kind = self.net_kind();
                let width = self.maybe_width()?;
                let name = self.ident()?;
                ports.push(Port::Decl(Net { dir: Some(dir), kind, width, name: name.text, lineno: name.line }));
            } else {
                let name = self.ident()?;
                ports.push(Port::Named(name.text));
            }
            if !self.eat(",") {
                break;
            }
        }
        Ok(ports)
    }

    fn direction(&mut self) -> Result<Direction,Error> {
        let t = self.next();
        match t.text.as_str() {
            "input" => Ok(Direction::Input),
            "output" => Ok(Direction::Output),
            "inout" => Ok(Direction::Inout),
            _ => Err(Error::Syntax { line: t.line, what: format!("expected port direction, found `{}`",t.text) })
        }
    }

    fn net_kind(&mut self) -> Option<NetKind> {
        if self.eat("wire") {
            return Some(NetKind::Wire);
        }
        if self.eat("reg") {
            return Some(NetKind::Reg);
        }
        None
    }

    fn maybe_width(&mut self) -> Result<Option<Width>,Error> {
        if !self.eat("[") {
            return Ok(None);
        }
        let msb = self.expr()?;
        self.expect(":")?;
        let lsb = self.expr()?;
        self.expect("]")?;
        Ok(Some(Width { msb, lsb }))
    }

    fn item(&mut self) -> Result<Item,Error> {
        let t = self.peek().clone();
        match (t.kind,t.text.as_str()) {
            (Kind::Keyword,"input") | (Kind::Keyword,"output") | (Kind::Keyword,"inout") |
            (Kind::Keyword,"wire") | (Kind::Keyword,"reg") => Ok(Item::Decl(self.decl()?)),
            (Kind::Keyword,"assign") => {
                self.next();
                let lhs = self.lvalue()?;
                self.expect("=")?;
                let rhs = self.expr()?;
                self.expect(";")?;
                Ok(Item::Assign(Assign { lineno: t.line, lhs, rhs }))
            },
            (Kind::Keyword,"always") => Ok(Item::Always(self.always()?)),
            (Kind::Keyword,"initial") => {
                self.next();
                Ok(Item::Initial(self.stmt()?))
            },
            (Kind::Ident,_) => Ok(Item::Instances(self.instance_list()?)),
            _ => Err(Error::Unsupported { line: t.line, what: format!("`{}` at module scope",t.text) })
        }
    }

    fn decl(&mut self) -> Result<Decl,Error> {
        let lineno = self.peek().line;
        let dir = match self.at("input") || self.at("output") || self.at("inout") {
            true => Some(self.direction()?),
            false => None
        };
        let kind = self.net_kind();
        if dir.is_none() && kind.is_none() {
            let t = self.peek();
            return Err(Error::Syntax { line: t.line, what: format!("expected declaration, found `{}`",t.text) });
        }
        let width = self.maybe_width()?;
        let mut nets = Vec::new();
        loop {
            let name = self.ident()?;
            nets.push(Net { dir, kind, width: width.clone(), name: name.text, lineno: name.line });
            if !self.eat(",") {
                break;
            }
        }
        self.expect(";")?;
        Ok(Decl { lineno, nets })
    }

    fn always(&mut self) -> Result<Always,Error> {
        let kw = self.expect("always")?;
        self.expect("@")?;
        let sens = self.sens_list()?;
        let body = self.stmt()?;
        Ok(Always { lineno: kw.line, sens, body })
    }

    fn sens_list(&mut self) -> Result<Option<Vec<SensItem>>,Error> {
        if self.eat("*") {
            return Ok(None);
        }
        self.expect("(")?;
        if self.eat("*") {
            self.expect(")")?;
            return Ok(None);
        }
        let mut items = Vec::new();
        loop {
            let edge = match self.peek().text.as_str() {
                "posedge" => { self.next(); Edge::Pos },
                "negedge" => { self.next(); Edge::Neg },
                _ => Edge::Level
            };
            let expr = self.expr()?;
            items.push(SensItem { edge, expr });
            if !(self.eat("or") || self.eat(",")) {
                break;
            }
        }
        self.expect(")")?;
        Ok(Some(items))
    }

    fn stmt(&mut self) -> Result<Stmt,Error> {
        let t = self.peek().clone();
        if self.eat("begin") {
            let mut stmts = Vec::new();
            while !self.at("end") {
                if self.at_eof() {
                    return Err(Error::Syntax { line: t.line, what: "begin block is never closed".to_string() });
                }
                stmts.push(self.stmt()?);
            }
            self.expect("end")?;
            return Ok(Stmt::Block(stmts));
        }
        if self.eat("if") {
            self.expect("(")?;
            let cond = self.expr()?;
            self.expect(")")?;
            let then_s = Box::new(self.stmt()?);
            let else_s = match self.eat("else") {
                true => Some(Box::new(self.stmt()?)),
                false => None
            };
            return Ok(Stmt::If { lineno: t.line, cond, then_s, else_s });
        }
        if self.eat("case") {
            self.expect("(")?;
            let subject = self.expr()?;
            self.expect(")")?;
            let mut arms = Vec::new();
            while !self.at("endcase") {
                if self.at_eof() {
                    return Err(Error::Syntax { line: t.line, what: "case is never closed".to_string() });
                }
                arms.push(self.case_arm()?);
            }
            self.expect("endcase")?;
            return Ok(Stmt::Case { lineno: t.line, subject, arms });
        }
        if self.eat(";") {
            return Ok(Stmt::Null);
        }
        // blocking or non-blocking substitution
        let lhs = self.lvalue()?;
        if self.eat("<=") {
            let rhs = self.expr()?;
            self.expect(";")?;
            return Ok(Stmt::Nonblocking(Assign { lineno: t.line, lhs, rhs }));
        }
        self.expect("=")?;
        let rhs = self.expr()?;
        self.expect(";")?;
        Ok(Stmt::Blocking(Assign { lineno: t.line, lhs, rhs }))
    }

    fn case_arm(&mut self) -> Result<CaseArm,Error> {
        if self.eat("default") {
            self.eat(":");
            let body = self.stmt()?;
            return Ok(CaseArm { labels: Vec::new(), body });
        }
        let mut labels = vec![self.expr()?];
        while self.eat(",") {
            labels.push(self.expr()?);
        }
        self.expect(":")?;
        let body = self.stmt()?;
        Ok(CaseArm { labels, body })
    }

    fn instance_list(&mut self) -> Result<InstanceList,Error> {
        let module = self.ident()?;
        let mut instances = Vec::new();
        loop {
            let name = self.ident()?;
            self.expect("(")?;
            let mut ports = Vec::new();
            if !self.at(")") {
                ports = self.port_args()?;
            }
            self.expect(")")?;
            instances.push(Instance { lineno: name.line, name: name.text, ports });
            if !self.eat(",") {
                break;
            }
        }
        self.expect(";")?;
        Ok(InstanceList { lineno: module.line, module: module.text, instances })
    }

    fn port_args(&mut self) -> Result<Vec<PortArg>,Error> {
        let mut args = Vec::new();
        loop {
            if self.eat(".") {
                let formal = self.ident()?;
                self.expect("(")?;
                let actual = match self.at(")") {
                    true => None,
                    false => Some(self.expr()?)
                };
                self.expect(")")?;
                args.push(PortArg { formal: Some(formal.text), actual });
            } else {
                args.push(PortArg { formal: None, actual: Some(self.expr()?) });
            }
            if !self.eat(",") {
                break;
            }
        }
        Ok(args)
    }

    /// Assignment targets: an identifier with optional select, or a
    /// concatenation of such.
    fn lvalue(&mut self) -> Result<Expr,Error> {
        if self.eat("{") {
            let mut parts = vec![self.lvalue()?];
            while self.eat(",") {
                parts.push(self.lvalue()?);
            }
            self.expect("}")?;
            return Ok(Expr::Concat(parts));
        }
        let name = self.ident()?;
        self.selected(name.text)
    }

    /// Attach an optional bit- or part-select to an identifier.
    fn selected(&mut self,base: String) -> Result<Expr,Error> {
        if !self.eat("[") {
            return Ok(Expr::Ident(base));
        }
        let first = self.expr()?;
        if self.eat(":") {
            let lsb = self.expr()?;
            self.expect("]")?;
            return Ok(Expr::Partselect { base, msb: Box::new(first), lsb: Box::new(lsb) });
        }
        self.expect("]")?;
        Ok(Expr::BitSelect { base, index: Box::new(first) })
    }

    // expression parsing, lowest precedence first

    fn expr(&mut self) -> Result<Expr,Error> {
        let cond = self.lor()?;
        if !self.eat("?") {
            return Ok(cond);
        }
        let then_e = self.expr()?;
        self.expect(":")?;
        let else_e = self.expr()?;
        Ok(Expr::Cond { cond: Box::new(cond), then_e: Box::new(then_e), else_e: Box::new(else_e) })
    }

    fn binary_level(&mut self,ops: &[&'static str],
                    next: fn(&mut Self) -> Result<Expr,Error>) -> Result<Expr,Error> {
        let mut lhs = next(self)?;
        loop {
            let mut matched = None;
            for op in ops {
                if self.at(op) {
                    matched = Some(*op);
                    break;
                }
            }
            match matched {
                Some(op) => {
                    self.next();
                    let rhs = next(self)?;
                    lhs = Expr::Binary { op, lhs: Box::new(lhs), rhs: Box::new(rhs) };
                },
                None => return Ok(lhs)
            }
        }
    }

    fn lor(&mut self) -> Result<Expr,Error> {
        self.binary_level(&["||"],Self::land)
    }
    fn land(&mut self) -> Result<Expr,Error> {
        self.binary_level(&["&&"],Self::bor)
    }
    fn bor(&mut self) -> Result<Expr,Error> {
        self.binary_level(&["|"],Self::bxor)
    }
    fn bxor(&mut self) -> Result<Expr,Error> {
        self.binary_level(&["^","~^","^~"],Self::band)
    }
    fn band(&mut self) -> Result<Expr,Error> {
        self.binary_level(&["&"],Self::equality)
    }
    fn equality(&mut self) -> Result<Expr,Error> {
        self.binary_level(&["===","!==","==","!="],Self::relational)
    }
    fn relational(&mut self) -> Result<Expr,Error> {
        self.binary_level(&["<=",">=","<",">"],Self::shift)
    }
    fn shift(&mut self) -> Result<Expr,Error> {
        self.binary_level(&["<<<",">>>","<<",">>"],Self::additive)
    }
    fn additive(&mut self) -> Result<Expr,Error> {
        self.binary_level(&["+","-"],Self::multiplicative)
    }
    fn multiplicative(&mut self) -> Result<Expr,Error> {
        self.binary_level(&["*","/","%"],Self::unary)
    }

    fn unary(&mut self) -> Result<Expr,Error> {
        const UNARY_OPS: [&str;11] = ["!","~","~&","~|","~^","^~","&","|","^","+","-"];
        for op in UNARY_OPS {
            if self.at(op) {
                self.next();
                let arg = self.unary()?;
                return Ok(Expr::Unary { op, arg: Box::new(arg) });
            }
        }
        self.primary()
    }

    fn primary(&mut self) -> Result<Expr,Error> {
        let t = self.peek().clone();
        if t.kind==Kind::Number {
            self.next();
            return Ok(Expr::IntConst(t.text));
        }
        if self.eat("(") {
            let inner = self.expr()?;
            self.expect(")")?;
            return Ok(inner);
        }
        if self.eat("{") {
            let mut parts = vec![self.expr()?];
            while self.eat(",") {
                parts.push(self.expr()?);
            }
            self.expect("}")?;
            return Ok(Expr::Concat(parts));
        }
        if t.kind==Kind::Ident {
            self.next();
            return self.selected(t.text);
        }
        Err(Error::Syntax { line: t.line, what: format!("expected expression, found `{}`",t.text) })
    }
}
