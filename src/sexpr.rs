// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//    http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! A minimal s-expression reader for the CLI (§4.I of the design):
//! parses `(head arg arg ...)` nested-list text into a [`Node`] tree
//! via the node's public constructors. This is a convenience reader
//! for driving the compiler from the command line, not a surface
//! language front-end — it has no types, no ABI, no statements.

use std::fmt;

use crate::ir::Node;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError(pub String);

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "parse error: {}", self.0)
    }
}
impl std::error::Error for ParseError {}

/// Parse a single top-level s-expression from `input`.
pub fn parse(input: &str) -> Result<Node, ParseError> {
    let tokens = tokenize(input);
    let mut pos = 0;
    let node = parse_expr(&tokens, &mut pos)?;
    if pos != tokens.len() {
        return Err(ParseError("trailing input after expression".to_string()));
    }
    Ok(node)
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    LParen,
    RParen,
    Atom(String),
}

fn tokenize(input: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();
    while let Some(&c) = chars.peek() {
        match c {
            '(' => {
                tokens.push(Token::LParen);
                chars.next();
            }
            ')' => {
                tokens.push(Token::RParen);
                chars.next();
            }
            c if c.is_whitespace() => {
                chars.next();
            }
            ';' => {
                for c in chars.by_ref() {
                    if c == '\n' {
                        break;
                    }
                }
            }
            _ => {
                let mut atom = String::new();
                while let Some(&c) = chars.peek() {
                    if c.is_whitespace() || c == '(' || c == ')' || c == ';' {
                        break;
                    }
                    atom.push(c);
                    chars.next();
                }
                tokens.push(Token::Atom(atom));
            }
        }
    }
    tokens
}

fn parse_expr(tokens: &[Token], pos: &mut usize) -> Result<Node, ParseError> {
    match tokens.get(*pos) {
        Some(Token::LParen) => {
            *pos += 1;
            let head = match tokens.get(*pos) {
                Some(Token::Atom(s)) => s.clone(),
                _ => return Err(ParseError("expected an atom after `(`".to_string())),
            };
            *pos += 1;
            let mut args = Vec::new();
            loop {
                match tokens.get(*pos) {
                    Some(Token::RParen) => {
                        *pos += 1;
                        break;
                    }
                    Some(_) => args.push(parse_expr(tokens, pos)?),
                    None => return Err(ParseError("unexpected end of input, missing `)`".to_string())),
                }
            }
            Node::new(&head, args).map_err(|e| ParseError(e.to_string()))
        }
        Some(Token::Atom(s)) => {
            *pos += 1;
            if let Ok(v) = s.parse::<i128>() {
                Ok(Node::literal(v))
            } else {
                Node::new(s, Vec::new()).map_err(|e| ParseError(e.to_string()))
            }
        }
        Some(Token::RParen) => Err(ParseError("unexpected `)`".to_string())),
        None => Err(ParseError("unexpected end of input".to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_bare_literal() {
        use crate::util::Literal;

        let n = parse("42").unwrap();
        assert_eq!(n.as_literal(), Some(Literal::from_i128(42)));
    }

    #[test]
    fn parses_a_nested_form() {
        let n = parse("(with x 5 (add x x))").unwrap();
        assert_eq!(n.valency(), 1);
    }

    #[test]
    fn rejects_unbalanced_parens() {
        assert!(parse("(add 1 2").is_err());
    }
}
