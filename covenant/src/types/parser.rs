//! Parser for structural type names such as `ArrayRef[Int]` or `Int | Str`.

use std::fmt;

/// A parsed type name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeExpr {
    /// A plain name, looked up in the registry.
    Named(String),
    /// A parameterized container, e.g. `ArrayRef[Int]`.
    Parameterized {
        /// The container name.
        base: String,
        /// The element type.
        param: Box<TypeExpr>,
    },
    /// Any of several alternatives.
    Union(Vec<TypeExpr>),
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(name) => f.write_str(name),
            Self::Parameterized { base, param } => write!(f, "{base}[{param}]"),
            Self::Union(members) => {
                for (i, member) in members.iter().enumerate() {
                    if i > 0 {
                        f.write_str("|")?;
                    }
                    write!(f, "{member}")?;
                }
                Ok(())
            }
        }
    }
}

/// Parses a type name.
pub fn parse(input: &str) -> Result<TypeExpr, String> {
    let mut parser = Parser {
        chars: input.char_indices().peekable(),
        input,
    };
    let expr = parser.union()?;
    parser.skip_ws();
    if let Some(&(pos, c)) = parser.chars.peek() {
        return Err(format!("unexpected '{c}' at offset {pos}"));
    }
    Ok(expr)
}

struct Parser<'a> {
    chars: std::iter::Peekable<std::str::CharIndices<'a>>,
    input: &'a str,
}

impl Parser<'_> {
    fn skip_ws(&mut self) {
        while self.chars.peek().is_some_and(|&(_, c)| c.is_whitespace()) {
            self.chars.next();
        }
    }

    fn eat(&mut self, expected: char) -> bool {
        self.skip_ws();
        if self.chars.peek().is_some_and(|&(_, c)| c == expected) {
            self.chars.next();
            return true;
        }
        false
    }

    fn union(&mut self) -> Result<TypeExpr, String> {
        let mut members = vec![self.term()?];
        while self.eat('|') {
            members.push(self.term()?);
        }
        if members.len() == 1 {
            return Ok(members.remove(0));
        }
        Ok(TypeExpr::Union(members))
    }

    fn term(&mut self) -> Result<TypeExpr, String> {
        let name = self.ident()?;
        if self.eat('[') {
            let param = self.union()?;
            if !self.eat(']') {
                return Err(format!("missing ']' after parameter of '{name}'"));
            }
            return Ok(TypeExpr::Parameterized {
                base: name,
                param: Box::new(param),
            });
        }
        Ok(TypeExpr::Named(name))
    }

    fn ident(&mut self) -> Result<String, String> {
        self.skip_ws();
        let start = match self.chars.peek() {
            Some(&(pos, c)) if c.is_ascii_alphabetic() || c == '_' => pos,
            Some(&(pos, c)) => return Err(format!("unexpected '{c}' at offset {pos}")),
            None => return Err("unexpected end of type name".to_string()),
        };
        let mut end = start;
        while let Some(&(pos, c)) = self.chars.peek() {
            if c.is_ascii_alphanumeric() || c == '_' || c == ':' {
                end = pos + c.len_utf8();
                self.chars.next();
            } else {
                break;
            }
        }
        Ok(self.input[start..end].to_string())
    }
}
