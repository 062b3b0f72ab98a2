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

//! Ties the pipeline stages together: construct an IR tree, estimate
//! its gas, lower it to assembly, and assemble the result into
//! bytecode.

use log::{debug, trace};

use crate::asm::{self, Env, SymbolGenerator};
use crate::error::CompileError;
use crate::ir::{gas, Node};

/// Drives one compilation: owns the symbol generator so repeated
/// calls against the same `Compiler` never mint colliding labels.
#[derive(Debug, Default)]
pub struct Compiler {
    symbols: SymbolGenerator,
}

impl Compiler {
    pub fn new() -> Self {
        Self { symbols: SymbolGenerator::new() }
    }

    /// Estimate the static gas cost of `node`.
    pub fn estimate_gas(&self, node: &Node) -> Result<u64, CompileError> {
        Ok(gas::estimate(node)?)
    }

    /// Lower `node` to a flat assembly listing.
    pub fn to_assembly(&self, node: &Node) -> Result<Vec<asm::Item>, CompileError> {
        trace!("lowering {}", node.pretty());
        let items = asm::lower(node, &Env::new(), 0, &self.symbols)?;
        debug!("lowered to {} item(s)", items.len());
        Ok(items)
    }

    /// Lower and assemble `node` directly to bytecode.
    pub fn compile(&self, node: &Node) -> Result<Vec<u8>, CompileError> {
        let items = self.to_assembly(node)?;
        debug!("assembling {} item(s)", items.len());
        let bytes = asm::assemble(&items)?;
        debug!("assembled to {} byte(s)", bytes.len());
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compiles_a_literal_to_a_single_push() {
        let compiler = Compiler::new();
        let bytes = compiler.compile(&Node::literal(0x2a)).unwrap();
        assert_eq!(bytes, vec![0x60, 0x2a]);
    }

    #[test]
    fn compiles_seq_of_two_literals() {
        let compiler = Compiler::new();
        let node = Node::new("seq", vec![Node::literal(1), Node::literal(2)]).unwrap();
        let bytes = compiler.compile(&node).unwrap();
        assert_eq!(bytes, vec![0x60, 0x01, 0x60, 0x02]);
    }

    #[test]
    fn compiles_clamp_nonzero() {
        let compiler = Compiler::new();
        let node = Node::new("clamp_nonzero", vec![Node::literal(7)]).unwrap();
        let bytes = compiler.compile(&node).unwrap();
        assert_eq!(bytes, vec![0x60, 0x07, 0x80, 0x15, 0x58, 0x57]);
    }
}
