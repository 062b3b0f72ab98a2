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

//! The LLL tree: a tagged-variant IR where every node's valency (net
//! stack effect, 0 or 1) is computed once at construction and never
//! recomputed. A node can only be built through [`Node::new`] and its
//! convenience constructors, so a tree satisfying this module's checks
//! is the only kind of tree the rest of the crate ever sees.

use std::fmt;

use ruint::aliases::U256;

use crate::error::MalformedIR;
use crate::opcode;
use crate::util::Literal;

/// One of the special forms recognised by the compiler, distinct
/// from real/pseudo opcodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Form {
    If,
    With,
    Repeat,
    Seq,
    Pass,
    Break,
    Lll,
}

impl Form {
    fn from_str(s: &str) -> Option<Form> {
        match s {
            "if" => Some(Form::If),
            "with" => Some(Form::With),
            "repeat" => Some(Form::Repeat),
            "seq" => Some(Form::Seq),
            "pass" => Some(Form::Pass),
            "break" => Some(Form::Break),
            "lll" => Some(Form::Lll),
            _ => None,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Form::If => "if",
            Form::With => "with",
            Form::Repeat => "repeat",
            Form::Seq => "seq",
            Form::Pass => "pass",
            Form::Break => "break",
            Form::Lll => "lll",
        }
    }
}

/// A validated LLL tree node. The `typ`/`annotation` fields are
/// opaque payload from the front-end; the core never interprets them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    kind: Kind,
    valency: u8,
    typ: Option<String>,
    annotation: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Kind {
    Literal(Literal),
    Op(String, Vec<Node>),
    Builtin(Form, Vec<Node>),
    Var(String),
}

impl Node {
    /// Construct an integer literal node from an `i128`. Valency is
    /// always 1.
    pub fn literal(value: i128) -> Node {
        Node { kind: Kind::Literal(Literal::from_i128(value)), valency: 1, typ: None, annotation: None }
    }

    /// Construct an integer literal node directly from sign and
    /// magnitude, for values outside `i128`'s range (e.g. the
    /// original front-end's `2**160`-scale constants). Valency is
    /// always 1; range is validated later, during lowering.
    pub fn literal_from_parts(negative: bool, magnitude: U256) -> Node {
        Node { kind: Kind::Literal(Literal::from_parts(negative, magnitude)), valency: 1, typ: None, annotation: None }
    }

    /// Construct a bare variable reference. Valency is always 1;
    /// whether it resolves against an enclosing `with` is checked
    /// during lowering, not here (the binding environment doesn't
    /// exist yet at construction time).
    pub fn var(name: impl Into<String>) -> Node {
        Node { kind: Kind::Var(name.into()), valency: 1, typ: None, annotation: None }
    }

    /// Construct a node from a symbolic name and its arguments,
    /// dispatching to an opcode, a special form, or a variable
    /// reference per §3 of the node's validity rules.
    pub fn new(value: &str, args: Vec<Node>) -> Result<Node, MalformedIR> {
        let upper = value.to_uppercase();
        if opcode::is_opcode(&upper) {
            return Self::op(upper, args);
        }
        if let Some(form) = Form::from_str(value) {
            return Self::builtin(form, args);
        }
        if !args.is_empty() {
            return Err(MalformedIR(format!(
                "`{value}` is not an opcode or special form but was given {} arguments",
                args.len()
            )));
        }
        Ok(Node::var(value))
    }

    fn op(name: String, args: Vec<Node>) -> Result<Node, MalformedIR> {
        let info = opcode::lookup(&name).expect("caller already checked is_opcode");
        if args.len() != info.arity {
            return Err(MalformedIR(format!(
                "`{name}` expects {} argument(s), got {}",
                info.arity,
                args.len()
            )));
        }
        for a in &args {
            if a.valency != 1 {
                return Err(MalformedIR(format!(
                    "argument to `{name}` has valency {}, expected 1",
                    a.valency
                )));
            }
        }
        Ok(Node {
            kind: Kind::Op(name, args),
            valency: info.valency,
            typ: None,
            annotation: None,
        })
    }

    fn builtin(form: Form, args: Vec<Node>) -> Result<Node, MalformedIR> {
        let valency = match form {
            Form::If => Self::check_if(&args)?,
            Form::With => Self::check_with(&args)?,
            Form::Repeat => Self::check_repeat(&args)?,
            Form::Seq => args.last().map(|n| n.valency).unwrap_or(0),
            Form::Pass => {
                if !args.is_empty() {
                    return Err(MalformedIR("`pass` takes no arguments".into()));
                }
                0
            }
            Form::Break => {
                if !args.is_empty() {
                    return Err(MalformedIR("`break` takes no arguments".into()));
                }
                0
            }
            Form::Lll => {
                if args.len() != 2 {
                    return Err(MalformedIR("`lll` expects exactly 2 arguments".into()));
                }
                if args[1].valency != 1 {
                    return Err(MalformedIR("`lll`'s destination argument must have valency 1".into()));
                }
                1
            }
        };
        Ok(Node { kind: Kind::Builtin(form, args), valency, typ: None, annotation: None })
    }

    fn check_if(args: &[Node]) -> Result<u8, MalformedIR> {
        match args.len() {
            2 => {
                if args[0].valency != 1 {
                    return Err(MalformedIR("`if` test must have valency 1".into()));
                }
                if args[1].valency != 0 {
                    return Err(MalformedIR("2-arm `if` body must have valency 0".into()));
                }
                Ok(0)
            }
            3 => {
                if args[0].valency != 1 {
                    return Err(MalformedIR("`if` test must have valency 1".into()));
                }
                if args[1].valency != args[2].valency {
                    return Err(MalformedIR("`if` arms must have matching valency".into()));
                }
                Ok(args[1].valency)
            }
            n => Err(MalformedIR(format!("`if` must have 2 or 3 arguments, got {n}"))),
        }
    }

    fn check_with(args: &[Node]) -> Result<u8, MalformedIR> {
        if args.len() != 3 {
            return Err(MalformedIR(format!("`with` expects exactly 3 arguments, got {}", args.len())));
        }
        if !matches!(&args[0].kind, Kind::Var(_)) {
            return Err(MalformedIR("first argument to `with` must be a variable name".into()));
        }
        if args[1].valency != 1 {
            return Err(MalformedIR("`with`'s init expression must have valency 1".into()));
        }
        Ok(args[2].valency)
    }

    fn check_repeat(args: &[Node]) -> Result<u8, MalformedIR> {
        if args.len() != 4 {
            return Err(MalformedIR(format!(
                "`repeat` expects exactly 4 arguments (memloc, start, count, body), got {}",
                args.len()
            )));
        }
        if args[0].valency != 1 {
            return Err(MalformedIR("`repeat`'s memory-location argument must have valency 1".into()));
        }
        if args[1].valency != 1 {
            return Err(MalformedIR("`repeat`'s start argument must have valency 1".into()));
        }
        match &args[2].kind {
            Kind::Literal(n) if n.is_positive() => {}
            _ => return Err(MalformedIR("`repeat`'s count must be a positive integer literal".into())),
        }
        if args[3].valency != 0 {
            return Err(MalformedIR("`repeat`'s body must have valency 0".into()));
        }
        Ok(0)
    }

    /// Attach front-end-supplied, opaque type/annotation payload.
    pub fn with_meta(mut self, typ: Option<String>, annotation: Option<String>) -> Node {
        self.typ = typ;
        self.annotation = annotation;
        self
    }

    pub fn valency(&self) -> u8 {
        self.valency
    }

    pub fn typ(&self) -> Option<&str> {
        self.typ.as_deref()
    }

    pub fn annotation(&self) -> Option<&str> {
        self.annotation.as_deref()
    }

    pub fn as_literal(&self) -> Option<Literal> {
        match &self.kind {
            Kind::Literal(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_var(&self) -> Option<&str> {
        match &self.kind {
            Kind::Var(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_op(&self) -> Option<(&str, &[Node])> {
        match &self.kind {
            Kind::Op(name, args) => Some((name.as_str(), args.as_slice())),
            _ => None,
        }
    }

    pub fn as_builtin(&self) -> Option<(Form, &[Node])> {
        match &self.kind {
            Kind::Builtin(form, args) => Some((*form, args.as_slice())),
            _ => None,
        }
    }

    /// Render as a Lisp-like s-expression, for diagnostics.
    pub fn pretty(&self) -> String {
        match &self.kind {
            Kind::Literal(v) => v.to_string(),
            Kind::Var(s) => s.clone(),
            Kind::Op(name, args) => Self::pretty_list(name, args),
            Kind::Builtin(form, args) => Self::pretty_list(form.name(), args),
        }
    }

    fn pretty_list(head: &str, args: &[Node]) -> String {
        if args.is_empty() {
            format!("({head})")
        } else {
            let parts: Vec<String> = args.iter().map(Node::pretty).collect();
            format!("({head} {})", parts.join(" "))
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.pretty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_has_valency_one() {
        assert_eq!(Node::literal(42).valency(), 1);
    }

    #[test]
    fn add_requires_two_valency_one_args() {
        let n = Node::new("add", vec![Node::literal(1), Node::literal(2)]).unwrap();
        assert_eq!(n.valency(), 1);
        assert!(Node::new("add", vec![Node::literal(1)]).is_err());
    }

    #[test]
    fn if_two_arm_requires_zero_valency_body() {
        let seq = Node::new("seq", vec![]).unwrap();
        let n = Node::new("if", vec![Node::literal(1), seq]).unwrap();
        assert_eq!(n.valency(), 0);
    }

    #[test]
    fn if_three_arm_requires_matching_valency() {
        let err = Node::new(
            "if",
            vec![Node::literal(1), Node::literal(2), Node::new("seq", vec![]).unwrap()],
        );
        assert!(err.is_err());
        let ok = Node::new("if", vec![Node::literal(1), Node::literal(2), Node::literal(3)]).unwrap();
        assert_eq!(ok.valency(), 1);
    }

    #[test]
    fn with_requires_variable_first_argument() {
        let bad = Node::new("with", vec![Node::literal(1), Node::literal(2), Node::literal(3)]);
        assert!(bad.is_err());
        let good = Node::new(
            "with",
            vec![Node::var("x"), Node::literal(5), Node::new("add", vec![Node::var("x"), Node::var("x")]).unwrap()],
        )
        .unwrap();
        assert_eq!(good.valency(), 1);
    }

    #[test]
    fn repeat_takes_four_args_with_positive_literal_count() {
        let body = Node::new("pass", vec![]).unwrap();
        let n = Node::new("repeat", vec![Node::literal(0), Node::literal(0), Node::literal(3), body]).unwrap();
        assert_eq!(n.valency(), 0);

        let bad_count = Node::new(
            "repeat",
            vec![Node::literal(0), Node::literal(0), Node::var("n"), Node::new("pass", vec![]).unwrap()],
        );
        assert!(bad_count.is_err());
    }

    #[test]
    fn unknown_name_with_arguments_is_malformed() {
        assert!(Node::new("not_a_thing", vec![Node::literal(1)]).is_err());
    }

    #[test]
    fn pretty_printer_renders_sexpr() {
        let n = Node::new("add", vec![Node::literal(1), Node::literal(2)]).unwrap();
        assert_eq!(n.pretty(), "(ADD 1 2)");
    }
}
