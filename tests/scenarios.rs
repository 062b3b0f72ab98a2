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

//! End-to-end scenarios against fixed, hand-computed bytecode.

use lllc::{sexpr, Compiler};

fn compile(src: &str) -> Vec<u8> {
    let node = sexpr::parse(src).unwrap();
    Compiler::new().compile(&node).unwrap()
}

#[test]
fn s1_literal() {
    assert_eq!(compile("42"), vec![0x60, 0x2a]);
}

#[test]
fn s2_seq_of_literals() {
    assert_eq!(compile("(seq 1 2)"), vec![0x60, 0x01, 0x60, 0x02]);
}

#[test]
fn s3_if_two_arm() {
    // PUSH1 1; ISZERO; PUSH2 end; JUMPI; JUMPDEST (end lands right after)
    let bytes = compile("(if 1 (seq))");
    assert_eq!(bytes, vec![0x60, 0x01, 0x15, 0x61, 0x00, 0x07, 0x57, 0x5b]);
}

#[test]
fn s4_with_two_uses_of_bound_variable() {
    assert_eq!(compile("(with x 5 (add x x))"), vec![0x60, 0x05, 0x80, 0x81, 0x01]);
}

#[test]
fn s5_repeat() {
    let bytes = compile("(repeat 0 0 3 (pass))");
    // PUSH1 3; PUSH1 0; PUSH1 0; DUP2; MSTORE; JUMPDEST; ...epilogue...
    assert_eq!(&bytes[0..5], &[0x60, 0x03, 0x60, 0x00, 0x60]);
    assert_eq!(bytes[5], 0x00); // start value byte
    assert_eq!(bytes[6], 0x81); // DUP2
    assert_eq!(bytes[7], 0x52); // MSTORE
    assert_eq!(bytes[8], 0x5b); // JUMPDEST (loop head)
}

#[test]
fn s6_clamp_nonzero() {
    assert_eq!(compile("(clamp_nonzero 7)"), vec![0x60, 0x07, 0x80, 0x15, 0x58, 0x57]);
}

#[test]
fn gas_estimate_is_available_for_a_simple_program() {
    let node = sexpr::parse("(add 1 2)").unwrap();
    let gas = Compiler::new().estimate_gas(&node).unwrap();
    assert_eq!(gas, 3 + 3 + 3);
}

#[test]
fn break_outside_a_loop_is_rejected() {
    let node = sexpr::parse("(break)").unwrap();
    assert!(Compiler::new().compile(&node).is_err());
}

#[test]
fn malformed_with_is_rejected_at_parse_time() {
    assert!(sexpr::parse("(with 1 2 3)").is_err());
}
