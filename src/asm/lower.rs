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

//! Lowering: turns a validated [`Node`] tree into a flat sequence of
//! [`Item`]s with symbolic labels, tracking stack height and bound
//! variables as it goes.
//!
//! `clamp`/`clamplt`/`clamp_nonzero` abort via a jump to `PC` followed
//! by whatever isn't a `JUMPDEST` there — the VM is expected to treat
//! a jump to a non-`JUMPDEST` address as a fatal abort. A future
//! target revision that handles such jumps differently would need
//! this lowering revisited; no such revision is in scope here.

use std::collections::HashMap;

use log::trace;

use crate::asm::item::Item;
use crate::asm::symbol::SymbolGenerator;
use crate::error::LowerError;
use crate::ir::node::{Form, Node};
use crate::opcode;
use crate::util::{check_range, encode_literal, Literal};

/// Binding environment threaded through lowering.
#[derive(Debug, Clone, Default)]
pub struct Env {
    withargs: HashMap<String, u32>,
    break_dest: Option<(String, u32)>,
}

impl Env {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Lower `node` under `env` at stack height `height`, using `gen` to
/// mint any symbols required.
pub fn lower(node: &Node, env: &Env, height: u32, gen: &SymbolGenerator) -> Result<Vec<Item>, LowerError> {
    trace!("lower height={height} node={}", node.pretty());
    if let Some(v) = node.as_literal() {
        return lower_literal(&v);
    }
    if let Some(name) = node.as_var() {
        return lower_var(name, env, height);
    }
    if let Some((name, args)) = node.as_op() {
        if opcode::is_pseudo(name) {
            return lower_pseudo(name, args, env, height, gen);
        }
        return lower_op(name, args, env, height, gen);
    }
    let (form, args) = node
        .as_builtin()
        .expect("a Node is always a literal, var, op, or builtin");
    match form {
        Form::Pass => Ok(Vec::new()),
        Form::If if args.len() == 2 => lower_if2(&args[0], &args[1], env, height, gen),
        Form::If => lower_if3(&args[0], &args[1], &args[2], env, height, gen),
        Form::With => lower_with(&args[0], &args[1], &args[2], env, height, gen),
        Form::Repeat => lower_repeat(&args[0], &args[1], &args[2], &args[3], env, height, gen),
        Form::Break => lower_break(env, height),
        Form::Seq => lower_seq(args, env, height, gen),
        Form::Lll => lower_lll(&args[0], &args[1], env, height, gen),
    }
}

fn lower_op(name: &str, args: &[Node], env: &Env, height: u32, gen: &SymbolGenerator) -> Result<Vec<Item>, LowerError> {
    let mut o = Vec::new();
    for (i, c) in args.iter().rev().enumerate() {
        o.extend(lower(c, env, height + i as u32, gen)?);
    }
    o.push(Item::op(name));
    Ok(o)
}

fn lower_literal(value: &Literal) -> Result<Vec<Item>, LowerError> {
    check_range(value)?;
    let bytes = encode_literal(value)?;
    let mut o = Vec::with_capacity(1 + bytes.len());
    o.push(Item::Push(bytes.len() as u8));
    o.extend(bytes.into_iter().map(Item::Byte));
    Ok(o)
}

fn lower_var(name: &str, env: &Env, height: u32) -> Result<Vec<Item>, LowerError> {
    let bound = env.withargs.get(name).ok_or_else(|| LowerError::UnknownLLLForm(name.to_string()))?;
    let depth = height - bound;
    if depth > 16 {
        return Err(LowerError::WithDepthExceeded { name: name.to_string(), depth: depth as usize });
    }
    Ok(vec![Item::Dup(depth as u8)])
}

fn lower_if2(test: &Node, body: &Node, env: &Env, height: u32, gen: &SymbolGenerator) -> Result<Vec<Item>, LowerError> {
    let mut o = lower(test, env, height, gen)?;
    let end = gen.fresh();
    o.push(Item::op("ISZERO"));
    o.push(Item::Symbol(end.clone()));
    o.push(Item::op("JUMPI"));
    o.extend(lower(body, env, height, gen)?);
    o.push(Item::Symbol(end));
    o.push(Item::op("JUMPDEST"));
    Ok(o)
}

fn lower_if3(
    test: &Node,
    then_arm: &Node,
    else_arm: &Node,
    env: &Env,
    height: u32,
    gen: &SymbolGenerator,
) -> Result<Vec<Item>, LowerError> {
    let mut o = lower(test, env, height, gen)?;
    let mid = gen.fresh();
    let end = gen.fresh();
    o.push(Item::op("ISZERO"));
    o.push(Item::Symbol(mid.clone()));
    o.push(Item::op("JUMPI"));
    o.extend(lower(then_arm, env, height, gen)?);
    o.push(Item::Symbol(end.clone()));
    o.push(Item::op("JUMP"));
    o.push(Item::Symbol(mid));
    o.push(Item::op("JUMPDEST"));
    o.extend(lower(else_arm, env, height, gen)?);
    o.push(Item::Symbol(end));
    o.push(Item::op("JUMPDEST"));
    Ok(o)
}

fn lower_with(
    name_node: &Node,
    init: &Node,
    body: &Node,
    env: &Env,
    height: u32,
    gen: &SymbolGenerator,
) -> Result<Vec<Item>, LowerError> {
    let name = name_node.as_var().expect("node construction guarantees `with`'s first arg is a variable").to_string();
    let mut o = lower(init, env, height, gen)?;
    let mut inner = env.clone();
    inner.withargs.insert(name, height);
    o.extend(lower(body, &inner, height + 1, gen)?);
    Ok(o)
}

/// `repeat <memloc> <start> <count> <body>` — see this module's doc
/// comment and the crate's DESIGN.md for why this 4-arg convention
/// was chosen over the original's inconsistent 3-arg lowering.
fn lower_repeat(
    memloc: &Node,
    start: &Node,
    count: &Node,
    body: &Node,
    env: &Env,
    height: u32,
    gen: &SymbolGenerator,
) -> Result<Vec<Item>, LowerError> {
    let count_value = count.as_literal().expect("node construction guarantees a literal count");
    let start_sym = gen.fresh();
    let end_sym = gen.fresh();

    let mut o = lower_literal(&count_value)?;
    o.extend(lower(memloc, env, height + 1, gen)?);
    o.extend(lower(start, env, height + 2, gen)?);
    o.push(Item::op("DUP2"));
    o.push(Item::op("MSTORE"));
    o.push(Item::Symbol(start_sym.clone()));
    o.push(Item::op("JUMPDEST"));

    let mut body_env = env.clone();
    body_env.break_dest = Some((end_sym.clone(), height + 2));
    o.extend(lower(body, &body_env, height + 2, gen)?);

    o.push(Item::op("DUP1"));
    o.push(Item::op("MLOAD"));
    o.push(Item::Push(1));
    o.push(Item::Byte(1));
    o.push(Item::op("ADD"));
    o.push(Item::op("DUP1"));
    o.push(Item::op("DUP3"));
    o.push(Item::op("MSTORE"));
    o.push(Item::op("DUP3"));
    o.push(Item::op("EQ"));
    o.push(Item::op("ISZERO"));
    o.push(Item::Symbol(start_sym));
    o.push(Item::op("JUMPI"));
    o.push(Item::Symbol(end_sym));
    o.push(Item::op("JUMPDEST"));
    o.push(Item::op("POP"));
    o.push(Item::op("POP"));
    Ok(o)
}

fn lower_break(env: &Env, height: u32) -> Result<Vec<Item>, LowerError> {
    let (dest, break_height) = env.break_dest.clone().ok_or(LowerError::BreakOutsideLoop)?;
    let mut o = Vec::new();
    for _ in 0..(height - break_height) {
        o.push(Item::op("POP"));
    }
    o.push(Item::Symbol(dest));
    o.push(Item::op("JUMP"));
    Ok(o)
}

fn lower_seq(args: &[Node], env: &Env, height: u32, gen: &SymbolGenerator) -> Result<Vec<Item>, LowerError> {
    let mut o = Vec::new();
    for a in args {
        o.extend(lower(a, env, height, gen)?);
    }
    Ok(o)
}

fn lower_lll(inner: &Node, dest: &Node, env: &Env, height: u32, gen: &SymbolGenerator) -> Result<Vec<Item>, LowerError> {
    let begin = gen.fresh();
    let end = gen.fresh();
    let mut o = Vec::new();
    o.push(Item::Symbol(end.clone()));
    o.push(Item::op("JUMP"));
    o.push(Item::Symbol(begin.clone()));
    o.push(Item::Blank);
    let inner_items = lower(inner, &Env::new(), 0, gen)?;
    o.push(Item::Sub(inner_items));
    o.push(Item::Symbol(end.clone()));
    o.push(Item::op("JUMPDEST"));
    o.push(Item::Symbol(begin.clone()));
    o.push(Item::Symbol(end.clone()));
    o.push(Item::op("SUB"));
    o.push(Item::Symbol(begin.clone()));
    o.extend(lower(dest, env, height, gen)?);
    o.push(Item::op("CODECOPY"));
    o.push(Item::Symbol(begin));
    o.push(Item::Symbol(end));
    o.push(Item::op("SUB"));
    Ok(o)
}

fn lower_pseudo(name: &str, args: &[Node], env: &Env, height: u32, gen: &SymbolGenerator) -> Result<Vec<Item>, LowerError> {
    match name {
        "CLAMPLT" => {
            let mut o = lower(&args[0], env, height, gen)?;
            o.extend(lower(&args[1], env, height + 1, gen)?);
            o.push(Item::op("DUP2"));
            o.push(Item::op("LT"));
            o.push(Item::op("ISZERO"));
            o.push(Item::op("PC"));
            o.push(Item::op("JUMPI"));
            Ok(o)
        }
        "CLAMP" => {
            let mut o = lower(&args[0], env, height, gen)?;
            o.extend(lower(&args[1], env, height, gen)?);
            o.push(Item::op("DUP1"));
            o.extend(lower(&args[2], env, height + 2, gen)?);
            o.push(Item::op("SWAP1"));
            o.push(Item::op("GT"));
            o.push(Item::op("PC"));
            o.push(Item::op("JUMPI"));
            o.push(Item::op("DUP1"));
            o.push(Item::op("SWAP2"));
            o.push(Item::op("LT"));
            o.push(Item::op("PC"));
            o.push(Item::op("JUMPI"));
            Ok(o)
        }
        "CLAMP_NONZERO" => {
            let mut o = lower(&args[0], env, height, gen)?;
            o.push(Item::op("DUP1"));
            o.push(Item::op("ISZERO"));
            o.push(Item::op("PC"));
            o.push(Item::op("JUMPI"));
            Ok(o)
        }
        _ => Err(LowerError::UnknownLLLForm(name.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items_to_mnemonics(items: &[Item]) -> Vec<String> {
        items
            .iter()
            .map(|i| match i {
                Item::Op(n) => n.clone(),
                Item::Byte(b) => format!("#{b}"),
                Item::Push(k) => format!("PUSH{k}"),
                Item::Dup(k) => format!("DUP{k}"),
                Item::Swap(k) => format!("SWAP{k}"),
                Item::Symbol(s) => s.clone(),
                Item::Blank => "BLANK".to_string(),
                Item::Sub(_) => "SUB_ASM".to_string(),
            })
            .collect()
    }

    #[test]
    fn literal_lowers_to_push_and_byte() {
        let gen = SymbolGenerator::new();
        let items = lower(&Node::literal(0x2a), &Env::new(), 0, &gen).unwrap();
        assert_eq!(items_to_mnemonics(&items), vec!["PUSH1", "#42"]);
    }

    #[test]
    fn with_binds_and_dup_reaches_it() {
        let gen = SymbolGenerator::new();
        let body = Node::new("add", vec![Node::var("x"), Node::var("x")]).unwrap();
        let node = Node::new("with", vec![Node::var("x"), Node::literal(5), body]).unwrap();
        let items = lower(&node, &Env::new(), 0, &gen).unwrap();
        assert_eq!(items_to_mnemonics(&items), vec!["PUSH1", "#5", "DUP1", "DUP2", "ADD"]);
    }

    #[test]
    fn break_outside_loop_is_an_error() {
        let gen = SymbolGenerator::new();
        let node = Node::new("break", vec![]).unwrap();
        assert!(matches!(lower(&node, &Env::new(), 0, &gen), Err(LowerError::BreakOutsideLoop)));
    }

    #[test]
    fn clamp_nonzero_lowering() {
        let gen = SymbolGenerator::new();
        let node = Node::new("clamp_nonzero", vec![Node::literal(7)]).unwrap();
        let items = lower(&node, &Env::new(), 0, &gen).unwrap();
        assert_eq!(
            items_to_mnemonics(&items),
            vec!["PUSH1", "#7", "DUP1", "ISZERO", "PC", "JUMPI"]
        );
    }

    #[test]
    fn if_two_arm_uses_one_symbol_twice() {
        let gen = SymbolGenerator::new();
        let node = Node::new("if", vec![Node::literal(1), Node::new("seq", vec![]).unwrap()]).unwrap();
        let items = lower(&node, &Env::new(), 0, &gen).unwrap();
        let symbols: Vec<&String> = items
            .iter()
            .filter_map(|i| if let Item::Symbol(s) = i { Some(s) } else { None })
            .collect();
        assert_eq!(symbols.len(), 2);
        assert_eq!(symbols[0], symbols[1]);
    }

    #[test]
    fn literal_past_the_negative_bound_is_rejected_during_lowering() {
        use ruint::aliases::U256;

        let gen = SymbolGenerator::new();
        // -(2^255 + 1), one past the documented lower bound.
        let magnitude = (U256::from(1u8) << 255) + U256::from(1u8);
        let node = Node::literal_from_parts(true, magnitude);
        assert!(matches!(lower(&node, &Env::new(), 0, &gen), Err(LowerError::LiteralOutOfRange(_))));
    }
}
