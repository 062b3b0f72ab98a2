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

//! Flat assembly items produced by lowering and consumed by the
//! two-pass assembler. Unlike a decoded `Instruction`, an `Item` may
//! still refer to an unresolved symbolic label.

/// One element of a flattened assembly sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Item {
    /// A real opcode mnemonic, e.g. `ADD`, `JUMPDEST`.
    Op(String),
    /// A single inline byte, following a `PUSHk`.
    Byte(u8),
    /// `PUSHk` for k in 1..=32.
    Push(u8),
    /// `DUPk` for k in 1..=16.
    Dup(u8),
    /// `SWAPk` for k in 1..=16.
    Swap(u8),
    /// A symbolic label, either at a use site (expands to `PUSH2
    /// hi lo`) or a definition site (immediately followed by
    /// `JumpDest` or `Blank`, contributing zero bytes).
    Symbol(String),
    /// Contributes zero bytes; marks a definition site together with
    /// a preceding `Symbol`, used by `lll`'s inlined sub-assembly.
    Blank,
    /// A nested assembly, assembled independently and inlined
    /// verbatim at this position (the `lll` form's inner code body).
    Sub(Vec<Item>),
}

impl Item {
    pub fn op(name: impl Into<String>) -> Item {
        Item::Op(name.into())
    }
}
