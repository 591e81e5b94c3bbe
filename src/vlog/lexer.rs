//! Scanner for the Verilog subset.
//!
//! Comments are consumed here, so `#pragma` directives (which live in
//! comments) never reach the parser; the pragma scanner is a separate
//! line-oriented pass over the raw text.

use super::Error;

#[derive(Clone,Copy,Debug,PartialEq)]
pub enum Kind {
    Ident,
    Keyword,
    Number,
    Punct,
    Eof
}

#[derive(Clone,Debug)]
pub struct Token {
    pub kind: Kind,
    pub text: String,
    pub line: usize
}

const KEYWORDS: [&str;18] = [
    "module","endmodule","input","output","inout","wire","reg",
    "assign","always","initial","begin","end","if","else",
    "case","endcase","default","or"
];

// longest match first
const PUNCTS: [&str;41] = [
    "===","!==","<<<",">>>",
    "==","!=","<=",">=","&&","||","<<",">>","~&","~|","~^","^~",
    "(",")","[","]","{","}",":",";",",",".","@","?",
    "=","<",">","+","-","!","~","&","|","^","%","*","/"
];

/// Tokenize a whole source file.  The returned stream ends with a
/// single `Eof` token carrying the final line number.
pub fn scan(src: &str) -> Result<Vec<Token>,Error> {
    let chars: Vec<char> = src.chars().collect();
    let mut toks: Vec<Token> = Vec::new();
    let mut line = 1;
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if c=='\n' {
            line += 1;
            i += 1;
            continue;
        }
        if c.is_whitespace() {
            i += 1;
            continue;
        }
        // line comment
        if c=='/' && i+1<chars.len() && chars[i+1]=='/' {
            while i<chars.len() && chars[i]!='\n' {
                i += 1;
            }
            continue;
        }
        // block comment, line count still advances
        if c=='/' && i+1<chars.len() && chars[i+1]=='*' {
            i += 2;
            loop {
                if i+1>=chars.len() {
                    return Err(Error::Syntax { line, what: "unterminated block comment".to_string() });
                }
                if chars[i]=='*' && chars[i+1]=='/' {
                    i += 2;
                    break;
                }
                if chars[i]=='\n' {
                    line += 1;
                }
                i += 1;
            }
            continue;
        }
        if c.is_ascii_alphabetic() || c=='_' {
            let start = i;
            while i<chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i]=='_' || chars[i]=='$') {
                i += 1;
            }
            let text: String = chars[start..i].iter().collect();
            let kind = match KEYWORDS.contains(&text.as_str()) {
                true => Kind::Keyword,
                false => Kind::Ident
            };
            toks.push(Token { kind, text, line });
            continue;
        }
        if c.is_ascii_digit() || c=='\'' {
            toks.push(scan_number(&chars,&mut i,line)?);
            continue;
        }
        if let Some(p) = match_punct(&chars,i) {
            toks.push(Token { kind: Kind::Punct, text: p.to_string(), line });
            i += p.len();
            continue;
        }
        return Err(Error::Syntax { line, what: format!("unexpected character `{}`",c) });
    }
    toks.push(Token { kind: Kind::Eof, text: String::new(), line });
    Ok(toks)
}

/// Decimal integer, optionally followed by a based constant body, e.g.
/// `13`, `4'b0101`, `8'hff`, `'d3`.  The whole constant is one token.
fn scan_number(chars: &Vec<char>,i: &mut usize,line: usize) -> Result<Token,Error> {
    let start = *i;
    while *i<chars.len() && (chars[*i].is_ascii_digit() || chars[*i]=='_') {
        *i += 1;
    }
    if *i<chars.len() && chars[*i]=='\'' {
        if *i+1>=chars.len() || !"bBdDhHoO".contains(chars[*i+1]) {
            return Err(Error::Syntax { line, what: "malformed based constant".to_string() });
        }
        *i += 2;
        let body_start = *i;
        while *i<chars.len() && (chars[*i].is_ascii_alphanumeric() || chars[*i]=='_' || chars[*i]=='?') {
            *i += 1;
        }
        if *i==body_start {
            return Err(Error::Syntax { line, what: "based constant has no digits".to_string() });
        }
    }
    let text: String = chars[start..*i].iter().collect();
    Ok(Token { kind: Kind::Number, text, line })
}

fn match_punct(chars: &Vec<char>,i: usize) -> Option<&'static str> {
    for p in PUNCTS.iter() {
        let n = p.len();
        if i+n<=chars.len() && chars[i..i+n].iter().collect::<String>()==**p {
            return Some(p);
        }
    }
    None
}
