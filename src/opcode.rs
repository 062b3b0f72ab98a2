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

//! The opcode table: every real EVM mnemonic plus the three
//! pseudo-opcodes (`CLAMP`, `CLAMPLT`, `CLAMP_NONZERO`), each mapped
//! to its byte value, arity, net stack effect ("valency", 0 or 1)
//! and base gas cost. Pseudo-opcodes carry a placeholder byte: they
//! are validated like opcodes but are never emitted directly (see
//! `asm::lower`).

/// One row of the opcode table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpInfo {
    pub byte: u8,
    pub arity: usize,
    pub valency: u8,
    pub gas: u64,
}

impl OpInfo {
    const fn new(byte: u8, arity: usize, valency: u8, gas: u64) -> Self {
        Self { byte, arity, valency, gas }
    }
}

/// Placeholder byte for pseudo-opcodes; never emitted by the assembler.
const PSEUDO_BYTE: u8 = 0x00;

pub const PUSH_OFFSET: u8 = 0x5f;
pub const DUP_OFFSET: u8 = 0x7f;
pub const SWAP_OFFSET: u8 = 0x8f;
pub const LOG_BASE: u8 = 0xa0;

macro_rules! table {
    ($($name:expr => $info:expr),* $(,)?) => {
        &[$(($name, $info)),*]
    };
}

/// The static opcode table. Looked up by uppercase mnemonic.
static TABLE: &[(&str, OpInfo)] = table! {
    "STOP" => OpInfo::new(0x00, 0, 0, 0),
    "ADD" => OpInfo::new(0x01, 2, 1, 3),
    "MUL" => OpInfo::new(0x02, 2, 1, 5),
    "SUB" => OpInfo::new(0x03, 2, 1, 3),
    "DIV" => OpInfo::new(0x04, 2, 1, 5),
    "SDIV" => OpInfo::new(0x05, 2, 1, 5),
    "MOD" => OpInfo::new(0x06, 2, 1, 5),
    "SMOD" => OpInfo::new(0x07, 2, 1, 5),
    "ADDMOD" => OpInfo::new(0x08, 3, 1, 8),
    "MULMOD" => OpInfo::new(0x09, 3, 1, 8),
    "EXP" => OpInfo::new(0x0a, 2, 1, 10),
    "SIGNEXTEND" => OpInfo::new(0x0b, 2, 1, 5),
    "LT" => OpInfo::new(0x10, 2, 1, 3),
    "GT" => OpInfo::new(0x11, 2, 1, 3),
    "SLT" => OpInfo::new(0x12, 2, 1, 3),
    "SGT" => OpInfo::new(0x13, 2, 1, 3),
    "EQ" => OpInfo::new(0x14, 2, 1, 3),
    "ISZERO" => OpInfo::new(0x15, 1, 1, 3),
    "AND" => OpInfo::new(0x16, 2, 1, 3),
    "OR" => OpInfo::new(0x17, 2, 1, 3),
    "XOR" => OpInfo::new(0x18, 2, 1, 3),
    "NOT" => OpInfo::new(0x19, 1, 1, 3),
    "BYTE" => OpInfo::new(0x1a, 2, 1, 3),
    "SHL" => OpInfo::new(0x1b, 2, 1, 3),
    "SHR" => OpInfo::new(0x1c, 2, 1, 3),
    "SAR" => OpInfo::new(0x1d, 2, 1, 3),
    "KECCAK256" => OpInfo::new(0x20, 2, 1, 30),
    "SHA3" => OpInfo::new(0x20, 2, 1, 30),
    "ADDRESS" => OpInfo::new(0x30, 0, 1, 2),
    "BALANCE" => OpInfo::new(0x31, 1, 1, 100),
    "ORIGIN" => OpInfo::new(0x32, 0, 1, 2),
    "CALLER" => OpInfo::new(0x33, 0, 1, 2),
    "CALLVALUE" => OpInfo::new(0x34, 0, 1, 2),
    "CALLDATALOAD" => OpInfo::new(0x35, 1, 1, 3),
    "CALLDATASIZE" => OpInfo::new(0x36, 0, 1, 2),
    "CALLDATACOPY" => OpInfo::new(0x37, 3, 0, 3),
    "CODESIZE" => OpInfo::new(0x38, 0, 1, 2),
    "CODECOPY" => OpInfo::new(0x39, 3, 0, 3),
    "GASPRICE" => OpInfo::new(0x3a, 0, 1, 2),
    "EXTCODESIZE" => OpInfo::new(0x3b, 1, 1, 100),
    "EXTCODECOPY" => OpInfo::new(0x3c, 4, 0, 100),
    "RETURNDATASIZE" => OpInfo::new(0x3d, 0, 1, 2),
    "RETURNDATACOPY" => OpInfo::new(0x3e, 3, 0, 3),
    "EXTCODEHASH" => OpInfo::new(0x3f, 1, 1, 100),
    "BLOCKHASH" => OpInfo::new(0x40, 1, 1, 20),
    "COINBASE" => OpInfo::new(0x41, 0, 1, 2),
    "TIMESTAMP" => OpInfo::new(0x42, 0, 1, 2),
    "NUMBER" => OpInfo::new(0x43, 0, 1, 2),
    "DIFFICULTY" => OpInfo::new(0x44, 0, 1, 2),
    "GASLIMIT" => OpInfo::new(0x45, 0, 1, 2),
    "CHAINID" => OpInfo::new(0x46, 0, 1, 2),
    "SELFBALANCE" => OpInfo::new(0x47, 0, 1, 5),
    "POP" => OpInfo::new(0x50, 1, 0, 2),
    "MLOAD" => OpInfo::new(0x51, 1, 1, 3),
    "MSTORE" => OpInfo::new(0x52, 2, 0, 3),
    "MSTORE8" => OpInfo::new(0x53, 2, 0, 3),
    "SLOAD" => OpInfo::new(0x54, 1, 1, 100),
    "SSTORE" => OpInfo::new(0x55, 2, 0, 100),
    "JUMP" => OpInfo::new(0x56, 1, 0, 8),
    "JUMPI" => OpInfo::new(0x57, 2, 0, 10),
    "PC" => OpInfo::new(0x58, 0, 1, 2),
    "MSIZE" => OpInfo::new(0x59, 0, 1, 2),
    "GAS" => OpInfo::new(0x5a, 0, 1, 2),
    "JUMPDEST" => OpInfo::new(0x5b, 0, 0, 1),
    "CREATE" => OpInfo::new(0xf0, 3, 1, 32000),
    "CALL" => OpInfo::new(0xf1, 7, 1, 40),
    "CALLCODE" => OpInfo::new(0xf2, 7, 1, 40),
    "RETURN" => OpInfo::new(0xf3, 2, 0, 0),
    "DELEGATECALL" => OpInfo::new(0xf4, 6, 1, 40),
    "CREATE2" => OpInfo::new(0xf5, 4, 1, 32000),
    "STATICCALL" => OpInfo::new(0xfa, 6, 1, 40),
    "REVERT" => OpInfo::new(0xfd, 2, 0, 0),
    "INVALID" => OpInfo::new(0xfe, 0, 0, 0),
    "SELFDESTRUCT" => OpInfo::new(0xff, 1, 0, 5000),
    // Pseudo-opcodes: validated like opcodes, lowered by `asm::lower`.
    "CLAMP" => OpInfo::new(PSEUDO_BYTE, 3, 1, 0),
    "CLAMPLT" => OpInfo::new(PSEUDO_BYTE, 2, 1, 0),
    "CLAMP_NONZERO" => OpInfo::new(PSEUDO_BYTE, 1, 1, 0),
};

/// Look up an uppercase mnemonic in the static table.
pub fn lookup(name: &str) -> Option<OpInfo> {
    if let Some(info) = push_info(name) {
        return Some(info);
    }
    if let Some(info) = dup_info(name) {
        return Some(info);
    }
    if let Some(info) = swap_info(name) {
        return Some(info);
    }
    if let Some(info) = log_info(name) {
        return Some(info);
    }
    TABLE.iter().find(|(n, _)| *n == name).map(|(_, i)| *i)
}

/// True if `name` (already uppercased) names an opcode or pseudo-opcode.
pub fn is_opcode(name: &str) -> bool {
    lookup(name).is_some()
}

/// True if `name` names one of the three pseudo-opcodes.
pub fn is_pseudo(name: &str) -> bool {
    matches!(name, "CLAMP" | "CLAMPLT" | "CLAMP_NONZERO")
}

fn parametric_suffix<'a>(name: &'a str, prefix: &str) -> Option<&'a str> {
    name.strip_prefix(prefix).filter(|s| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()))
}

fn push_info(name: &str) -> Option<OpInfo> {
    let k: u32 = parametric_suffix(name, "PUSH")?.parse().ok()?;
    if !(1..=32).contains(&k) {
        return None;
    }
    Some(OpInfo::new(PUSH_OFFSET + k as u8, 0, 1, 3))
}

fn dup_info(name: &str) -> Option<OpInfo> {
    let k: u32 = parametric_suffix(name, "DUP")?.parse().ok()?;
    if !(1..=16).contains(&k) {
        return None;
    }
    Some(OpInfo::new(DUP_OFFSET + k as u8, k as usize, 1, 3))
}

fn swap_info(name: &str) -> Option<OpInfo> {
    let k: u32 = parametric_suffix(name, "SWAP")?.parse().ok()?;
    if !(1..=16).contains(&k) {
        return None;
    }
    Some(OpInfo::new(SWAP_OFFSET + k as u8, (k + 1) as usize, 0, 3))
}

fn log_info(name: &str) -> Option<OpInfo> {
    let k: u32 = parametric_suffix(name, "LOG")?.parse().ok()?;
    if k > 4 {
        return None;
    }
    Some(OpInfo::new(LOG_BASE + k as u8, 2 + k as usize, 0, 375))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_has_arity_two_valency_one() {
        let info = lookup("ADD").unwrap();
        assert_eq!(info.arity, 2);
        assert_eq!(info.valency, 1);
    }

    #[test]
    fn push_family_is_parametric() {
        assert_eq!(lookup("PUSH1").unwrap().byte, 0x60);
        assert_eq!(lookup("PUSH32").unwrap().byte, 0x7f);
        assert!(lookup("PUSH33").is_none());
        assert!(lookup("PUSH0X").is_none());
    }

    #[test]
    fn dup_and_swap_ranges() {
        assert_eq!(lookup("DUP1").unwrap().byte, 0x80);
        assert_eq!(lookup("DUP16").unwrap().byte, 0x8f);
        assert!(lookup("DUP17").is_none());
        assert_eq!(lookup("SWAP1").unwrap().byte, 0x90);
        assert_eq!(lookup("SWAP16").unwrap().byte, 0x9f);
    }

    #[test]
    fn pseudo_opcodes_are_recognised_but_not_emittable() {
        assert!(is_pseudo("CLAMP"));
        assert!(is_pseudo("CLAMPLT"));
        assert!(is_pseudo("CLAMP_NONZERO"));
        assert!(!is_pseudo("ADD"));
        let info = lookup("CLAMP").unwrap();
        assert_eq!(info.arity, 3);
        assert_eq!(info.valency, 1);
    }

    #[test]
    fn unknown_name_is_none() {
        assert!(lookup("BOGUS").is_none());
    }
}
