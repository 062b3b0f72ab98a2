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

//! Two-pass bytecode assembler: a layout pass computes a symbol to
//! byte-offset map, then an emission pass produces the final bytes.
//! Offsets are always encoded as `PUSH2` (two bytes), so — unlike an
//! assembler whose symbol width varies with the total code size —
//! this needs no fixpoint iteration between the two passes.

use std::collections::HashMap;

use log::debug;

use crate::asm::item::Item;
use crate::error::AssemblerError;
use crate::opcode;

fn is_definition_site(items: &[Item], i: usize) -> bool {
    matches!(items.get(i + 1), Some(Item::Op(op)) if op == "JUMPDEST") || matches!(items.get(i + 1), Some(Item::Blank))
}

/// Assemble a flat (possibly nested) item sequence into bytecode.
pub fn assemble(items: &[Item]) -> Result<Vec<u8>, AssemblerError> {
    let mut offsets = HashMap::new();
    let mut sub_bytes: Vec<Vec<u8>> = Vec::new();
    let mut pos = 0;
    layout(items, &mut pos, &mut offsets, &mut sub_bytes)?;
    debug!("layout pass: {} items, {} bytes", items.len(), pos);
    let mut sub_iter = sub_bytes.into_iter();
    let bytes = emit(items, &offsets, &mut sub_iter)?;
    debug!("emission pass complete: {} bytes", bytes.len());
    Ok(bytes)
}

fn layout(
    items: &[Item],
    pos: &mut usize,
    offsets: &mut HashMap<String, usize>,
    sub_bytes: &mut Vec<Vec<u8>>,
) -> Result<(), AssemblerError> {
    for (i, item) in items.iter().enumerate() {
        match item {
            Item::Symbol(s) => {
                if is_definition_site(items, i) {
                    offsets.insert(s.clone(), *pos);
                } else {
                    *pos += 3;
                }
            }
            Item::Blank => {}
            Item::Sub(inner) => {
                let bytes = assemble(inner)?;
                *pos += bytes.len();
                sub_bytes.push(bytes);
            }
            Item::Op(_) | Item::Byte(_) | Item::Push(_) | Item::Dup(_) | Item::Swap(_) => {
                *pos += 1;
            }
        }
    }
    Ok(())
}

fn emit(
    items: &[Item],
    offsets: &HashMap<String, usize>,
    sub_bytes: &mut impl Iterator<Item = Vec<u8>>,
) -> Result<Vec<u8>, AssemblerError> {
    let mut out = Vec::new();
    for (i, item) in items.iter().enumerate() {
        match item {
            Item::Symbol(s) => {
                if !is_definition_site(items, i) {
                    let off = *offsets
                        .get(s)
                        .ok_or_else(|| AssemblerError::UnknownItem(format!("undefined symbol `{s}`")))?;
                    out.push(opcode::PUSH_OFFSET + 2);
                    out.push((off / 256) as u8);
                    out.push((off % 256) as u8);
                }
            }
            Item::Blank => {}
            Item::Byte(b) => out.push(*b),
            Item::Op(name) => {
                let info = opcode::lookup(name)
                    .ok_or_else(|| AssemblerError::UnknownItem(format!("unknown opcode `{name}`")))?;
                out.push(info.byte);
            }
            Item::Push(k) => out.push(opcode::PUSH_OFFSET + k),
            Item::Dup(k) => out.push(opcode::DUP_OFFSET + k),
            Item::Swap(k) => out.push(opcode::SWAP_OFFSET + k),
            Item::Sub(_) => {
                let bytes = sub_bytes
                    .next()
                    .ok_or_else(|| AssemblerError::UnknownItem("sub-assembly bytes exhausted".to_string()))?;
                out.extend(bytes);
            }
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_push_assembles_to_two_bytes() {
        let items = vec![Item::Push(1), Item::Byte(0x2a)];
        assert_eq!(assemble(&items).unwrap(), vec![0x60, 0x2a]);
    }

    #[test]
    fn symbol_resolves_to_its_definition_offset() {
        let items = vec![
            Item::Symbol("end".to_string()),
            Item::op("JUMP"),
            Item::Symbol("end".to_string()),
            Item::op("JUMPDEST"),
        ];
        let bytes = assemble(&items).unwrap();
        // PUSH2 0x00 0x03, JUMP, JUMPDEST
        assert_eq!(bytes, vec![0x61, 0x00, 0x03, 0x56, 0x5b]);
    }

    #[test]
    fn dangling_symbol_is_an_error() {
        let items = vec![Item::Symbol("nope".to_string()), Item::op("JUMP")];
        assert!(assemble(&items).is_err());
    }

    #[test]
    fn nested_sub_assembly_is_inlined() {
        let items = vec![Item::Sub(vec![Item::Push(1), Item::Byte(1)]), Item::op("STOP")];
        assert_eq!(assemble(&items).unwrap(), vec![0x60, 0x01, 0x00]);
    }
}
