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

//! Static gas estimation: a pure recursive walk over an LLL tree
//! producing a non-negative upper bound. `depth` here is a *notional*
//! stack depth used only to cost `break`'s POP sequence; it must never
//! be confused with the true stack height tracked during lowering.

use crate::error::GasEstimateUnknown;
use crate::ir::node::{Form, Node};
use crate::opcode;

const POP_GAS: u64 = 2;

/// Estimate the gas cost of executing `node`, starting at notional
/// depth 0.
pub fn estimate(node: &Node) -> Result<u64, GasEstimateUnknown> {
    estimate_at(node, 0)
}

fn estimate_at(node: &Node, depth: u64) -> Result<u64, GasEstimateUnknown> {
    if node.as_literal().is_some() {
        return Ok(3);
    }
    if node.as_var().is_some() {
        return Ok(3);
    }
    if let Some((name, args)) = node.as_op() {
        if opcode::is_pseudo(name) {
            return estimate_pseudo(name, args);
        }
        let info = opcode::lookup(name).expect("node construction already validated this opcode");
        let mut total: u64 = info.gas;
        for (i, c) in args.iter().rev().enumerate() {
            total += estimate_at(c, depth + i as u64)?;
        }
        if name == "CALL" && args.get(2).and_then(Node::as_literal).map(|v| !v.is_zero()).unwrap_or(false) {
            total += 34000;
        }
        if name == "SSTORE" && args.get(1).and_then(Node::as_literal).map(|v| !v.is_zero()).unwrap_or(false) {
            total += 15000;
        }
        return Ok(total);
    }
    let (form, args) = node
        .as_builtin()
        .ok_or_else(|| GasEstimateUnknown(node.pretty()))?;
    match form {
        Form::If => match args.len() {
            2 => Ok(estimate_at(&args[0], depth + 1)? + estimate_at(&args[1], depth + 1)? + 30),
            3 => {
                let then_cost = estimate_at(&args[1], depth + 1)?;
                let else_cost = estimate_at(&args[2], depth + 1)?;
                Ok(estimate_at(&args[0], depth + 1)? + then_cost.max(else_cost) + 30)
            }
            _ => Err(GasEstimateUnknown(node.pretty())),
        },
        // Fixed the original's out-of-bounds `with` indices (it read
        // args[1]/args[3] against a 3-arg form): init is args[1], body
        // is args[2].
        Form::With => Ok(estimate_at(&args[1], depth + 1)? + estimate_at(&args[2], depth + 1)? + 20),
        Form::Repeat => {
            let count = args[2]
                .as_literal()
                .and_then(|lit| lit.to_u64())
                .ok_or_else(|| GasEstimateUnknown(node.pretty()))?;
            let body_cost = estimate_at(&args[3], depth + 1)?;
            Ok((body_cost + 50) * count + 30)
        }
        Form::Seq => {
            let mut total = 0u64;
            for c in args {
                total += estimate_at(c, depth + 1)?;
            }
            Ok(total)
        }
        Form::Pass => Ok(0),
        Form::Break => Ok(20 + POP_GAS * depth),
        // The original estimator has no `lll` case and falls through
        // to its catch-all `raise`; match that rather than fabricate
        // a number for a form it never classified.
        Form::Lll => Err(GasEstimateUnknown(node.pretty())),
    }
}

/// Gas formula for the three pseudo-opcodes, grounded on the original
/// compiler's `clamp`/`clamplt`/`clamp_nonzero` cases: fixed surcharge
/// plus the children's own cost, each at notional depth 1.
fn estimate_pseudo(name: &str, args: &[Node]) -> Result<u64, GasEstimateUnknown> {
    match name {
        "CLAMP" => {
            let a = estimate_at(&args[0], 1)?;
            let b = estimate_at(&args[1], 1)?;
            let c = estimate_at(&args[2], 1)?;
            Ok(a + b + c + 50)
        }
        "CLAMPLT" => Ok(estimate_at(&args[0], 1)? + estimate_at(&args[1], 1)? + 30),
        "CLAMP_NONZERO" => Ok(estimate_at(&args[0], 1)? + 20),
        _ => Err(GasEstimateUnknown(name.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_costs_three() {
        assert_eq!(estimate(&Node::literal(1)).unwrap(), 3);
    }

    #[test]
    fn pass_costs_zero() {
        assert_eq!(estimate(&Node::new("pass", vec![]).unwrap()).unwrap(), 0);
    }

    #[test]
    fn add_sums_children_plus_base_gas() {
        let n = Node::new("add", vec![Node::literal(1), Node::literal(2)]).unwrap();
        assert_eq!(estimate(&n).unwrap(), 3 + 3 + 3);
    }

    #[test]
    fn repeat_multiplies_body_cost_by_count() {
        let body = Node::new("pass", vec![]).unwrap();
        let n = Node::new("repeat", vec![Node::literal(0), Node::literal(0), Node::literal(3), body]).unwrap();
        assert_eq!(estimate(&n).unwrap(), (0 + 50) * 3 + 30);
    }

    #[test]
    fn with_uses_init_and_body_not_original_buggy_indices() {
        let body = Node::new("add", vec![Node::var("x"), Node::var("x")]).unwrap();
        let n = Node::new("with", vec![Node::var("x"), Node::literal(5), body]).unwrap();
        // init (literal 5) = 3, body (add var var) = 3 (ADD) + 3 + 3, plus 20.
        assert_eq!(estimate(&n).unwrap(), 3 + (3 + 3 + 3) + 20);
    }

    #[test]
    fn lll_has_no_gas_estimate() {
        let n = Node::new("lll", vec![Node::literal(0), Node::literal(0)]).unwrap();
        assert!(estimate(&n).is_err());
    }
}
