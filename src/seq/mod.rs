//! # Sequence Patch Files
//!
//! A small match-sequence description consumed by the off-chip
//! manipulation unit.  A file holds named sequences of patterns, each
//! pattern comparing a part-selected hierarchical signal against a
//! sized binary constant:
//!
//! ```text
//! s0 {
//!   (TOP.a[1:0] == 2'b00)
//!   (TOP.u1.inter[3:0] > 4'b0010)
//! }
//! ```
//!
//! The grammar is disjoint from the insertion flow; `veritap
//! check-seq` parses a file and prints the tree so an operator can
//! validate a patch program before loading it.

#[cfg(test)]
mod parse_test;

use std::fmt;
use regex::Regex;
use thiserror::Error;

#[derive(Error,Debug)]
pub enum Error {
    #[error("sequence syntax error at line {line}: {what}")]
    SequenceSyntax { line: usize, what: String },
    #[error("width mismatch at line {line}: `{var}` selects {var_width} bit(s) but the constant carries {const_width}")]
    WidthMismatch { line: usize, var: String, var_width: u32, const_width: u32 }
}

/// Sized binary constant, e.g. `2'b00`.
#[derive(Clone,Debug,PartialEq)]
pub struct Const {
    pub width: u32,
    pub bits: String
}

impl fmt::Display for Const {
    fn fmt(&self,f: &mut fmt::Formatter) -> fmt::Result {
        write!(f,"{}'b{}",self.width,self.bits)
    }
}

/// Part-selected signal, possibly hierarchical: `TOP.u1.sig[3:0]`.
#[derive(Clone,Debug,PartialEq)]
pub struct Variable {
    pub name: String,
    pub msb: u32,
    pub lsb: u32
}

impl Variable {
    pub fn width(&self) -> u32 {
        self.msb - self.lsb + 1
    }
}

impl fmt::Display for Variable {
    fn fmt(&self,f: &mut fmt::Formatter) -> fmt::Result {
        write!(f,"{}[{}:{}]",self.name,self.msb,self.lsb)
    }
}

#[derive(Clone,Copy,Debug,PartialEq)]
pub enum Comparison {
    Eq,
    Lt,
    Gt
}

impl Comparison {
    fn as_str(&self) -> &'static str {
        match self {
            Comparison::Eq => "==",
            Comparison::Lt => "<",
            Comparison::Gt => ">"
        }
    }
}

#[derive(Clone,Debug,PartialEq)]
pub struct Pattern {
    pub lhs: Variable,
    pub op: Comparison,
    pub rhs: Const
}

impl fmt::Display for Pattern {
    fn fmt(&self,f: &mut fmt::Formatter) -> fmt::Result {
        write!(f,"({} {} {})",self.lhs,self.op.as_str(),self.rhs)
    }
}

#[derive(Clone,Debug,PartialEq)]
pub struct Sequence {
    pub name: String,
    pub patterns: Vec<Pattern>
}

#[derive(Clone,Debug,Default,PartialEq)]
pub struct SequenceList {
    pub sequences: Vec<Sequence>
}

impl fmt::Display for SequenceList {
    fn fmt(&self,f: &mut fmt::Formatter) -> fmt::Result {
        for seq in &self.sequences {
            writeln!(f,"{} {{",seq.name)?;
            for pat in &seq.patterns {
                writeln!(f,"  {}",pat)?;
            }
            writeln!(f,"}}")?;
        }
        Ok(())
    }
}

#[derive(Clone,Debug,PartialEq)]
enum Tok {
    Open,
    Close,
    LParen,
    RParen,
    Cmp(Comparison),
    Word(String)
}

fn tokenize(text: &str) -> Result<Vec<(Tok,usize)>,Error> {
    let mut toks = Vec::new();
    let mut line = 1;
    let mut chars = text.chars().peekable();
    while let Some(&c) = chars.peek() {
        match c {
            '\n' => { line += 1; chars.next(); },
            c if c.is_whitespace() => { chars.next(); },
            '{' => { toks.push((Tok::Open,line)); chars.next(); },
            '}' => { toks.push((Tok::Close,line)); chars.next(); },
            '(' => { toks.push((Tok::LParen,line)); chars.next(); },
            ')' => { toks.push((Tok::RParen,line)); chars.next(); },
            '<' => { toks.push((Tok::Cmp(Comparison::Lt),line)); chars.next(); },
            '>' => { toks.push((Tok::Cmp(Comparison::Gt),line)); chars.next(); },
            '=' => {
                chars.next();
                match chars.peek() {
                    Some('=') => { toks.push((Tok::Cmp(Comparison::Eq),line)); chars.next(); },
                    _ => return Err(Error::SequenceSyntax { line, what: "lone `=`".to_string() })
                }
            },
            c if c.is_ascii_alphanumeric() || c=='_' => {
                let mut word = String::new();
                while let Some(&w) = chars.peek() {
                    if w.is_ascii_alphanumeric() || "_.'[]:".contains(w) {
                        word.push(w);
                        chars.next();
                    } else {
                        break;
                    }
                }
                toks.push((Tok::Word(word),line));
            },
            other => return Err(Error::SequenceSyntax { line, what: format!("unexpected character `{}`",other) })
        }
    }
    Ok(toks)
}

/// Parse a whole sequence file.
pub fn parse(text: &str) -> Result<SequenceList,Error> {
    let var_patt = Regex::new(r"^(?P<name>[a-zA-Z_][a-zA-Z_0-9]*(?:\.[a-zA-Z_][a-zA-Z_0-9]*)*)\[(?P<msb>\d+):(?P<lsb>\d+)\]$").expect("unreachable");
    let const_patt = Regex::new(r"^(?P<width>\d+)'[bB](?P<bits>[01]+)$").expect("unreachable");
    let name_patt = Regex::new(r"^[a-zA-Z_][a-zA-Z_0-9]*$").expect("unreachable");
    let toks = tokenize(text)?;
    let mut list = SequenceList::default();
    let mut i = 0;
    while i < toks.len() {
        let (name,line) = match &toks[i] {
            (Tok::Word(w),line) if name_patt.is_match(w) => (w.clone(),*line),
            (_,line) => return Err(Error::SequenceSyntax { line: *line, what: "expected a sequence name".to_string() })
        };
        i += 1;
        match toks.get(i) {
            Some((Tok::Open,_)) => i += 1,
            _ => return Err(Error::SequenceSyntax { line, what: format!("sequence `{}` must open with `{{`",name) })
        }
        let mut patterns = Vec::new();
        loop {
            match toks.get(i) {
                Some((Tok::Close,_)) => { i += 1; break; },
                Some((Tok::LParen,_)) => i += 1,
                Some((_,line)) => return Err(Error::SequenceSyntax { line: *line, what: "pattern must open with `(`".to_string() }),
                None => return Err(Error::SequenceSyntax { line, what: format!("sequence `{}` is never closed",name) })
            }
            let (lhs,var_line) = match toks.get(i) {
                Some((Tok::Word(w),line)) => match var_patt.captures(w) {
                    Some(caps) => {
                        let msb = caps["msb"].parse::<u32>().map_err(|_| Error::SequenceSyntax { line: *line, what: "part-select out of range".to_string() })?;
                        let lsb = caps["lsb"].parse::<u32>().map_err(|_| Error::SequenceSyntax { line: *line, what: "part-select out of range".to_string() })?;
                        if msb < lsb {
                            return Err(Error::SequenceSyntax { line: *line, what: format!("reversed part-select on `{}`",&caps["name"]) });
                        }
                        (Variable { name: caps["name"].to_string(), msb, lsb },*line)
                    },
                    None => return Err(Error::SequenceSyntax { line: *line, what: format!("`{}` is not a part-selected signal",w) })
                },
                Some((_,line)) => return Err(Error::SequenceSyntax { line: *line, what: "expected a signal".to_string() }),
                None => return Err(Error::SequenceSyntax { line, what: "file ends inside a pattern".to_string() })
            };
            i += 1;
            let op = match toks.get(i) {
                Some((Tok::Cmp(op),_)) => *op,
                Some((_,line)) => return Err(Error::SequenceSyntax { line: *line, what: "expected `==`, `<`, or `>`".to_string() }),
                None => return Err(Error::SequenceSyntax { line: var_line, what: "file ends inside a pattern".to_string() })
            };
            i += 1;
            let rhs = match toks.get(i) {
                Some((Tok::Word(w),line)) => match const_patt.captures(w) {
                    Some(caps) => {
                        let width = caps["width"].parse::<u32>().map_err(|_| Error::SequenceSyntax { line: *line, what: "constant width out of range".to_string() })?;
                        let bits = caps["bits"].to_string();
                        if width as usize != bits.len() {
                            return Err(Error::SequenceSyntax { line: *line, what: format!("`{}` carries {} digit(s) for width {}",w,bits.len(),width) });
                        }
                        Const { width, bits }
                    },
                    None => return Err(Error::SequenceSyntax { line: *line, what: format!("`{}` is not a sized binary constant",w) })
                },
                Some((_,line)) => return Err(Error::SequenceSyntax { line: *line, what: "expected a sized binary constant".to_string() }),
                None => return Err(Error::SequenceSyntax { line: var_line, what: "file ends inside a pattern".to_string() })
            };
            if rhs.width != lhs.width() {
                return Err(Error::WidthMismatch {
                    line: var_line,
                    var: lhs.to_string(),
                    var_width: lhs.width(),
                    const_width: rhs.width
                });
            }
            i += 1;
            match toks.get(i) {
                Some((Tok::RParen,_)) => i += 1,
                Some((_,line)) => return Err(Error::SequenceSyntax { line: *line, what: "pattern must close with `)`".to_string() }),
                None => return Err(Error::SequenceSyntax { line: var_line, what: "file ends inside a pattern".to_string() })
            }
            patterns.push(Pattern { lhs, op, rhs });
        }
        list.sequences.push(Sequence { name, patterns });
    }
    Ok(list)
}
