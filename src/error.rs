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

//! Error taxonomy for the compiler. Each pipeline stage has its own
//! error type; `CompileError` aggregates them so a caller driving the
//! whole pipeline (construct, estimate gas, lower, assemble) has one
//! `Result` type to propagate with `?`.

use std::fmt;

/// Node construction failed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedIR(pub String);

impl fmt::Display for MalformedIR {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "malformed IR: {}", self.0)
    }
}
impl std::error::Error for MalformedIR {}

/// Gas estimation encountered a form it cannot classify.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GasEstimateUnknown(pub String);

impl fmt::Display for GasEstimateUnknown {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "gas estimate failed: {}", self.0)
    }
}
impl std::error::Error for GasEstimateUnknown {}

/// Errors that can arise while lowering an IR tree to assembly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LowerError {
    /// A variable reference is bound more than 16 stack slots below
    /// its use site, beyond what `DUPk` can reach.
    WithDepthExceeded { name: String, depth: usize },
    /// An integer literal lies outside `[-2^255, 2^256)`.
    LiteralOutOfRange(String),
    /// `break` occurred with no enclosing `repeat`.
    BreakOutsideLoop,
    /// A node value matched no known opcode or special form.
    UnknownLLLForm(String),
}

impl fmt::Display for LowerError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            LowerError::WithDepthExceeded { name, depth } => {
                write!(f, "with statement too deep: `{name}` is {depth} slots down")
            }
            LowerError::LiteralOutOfRange(v) => write!(f, "literal out of range: {v}"),
            LowerError::BreakOutsideLoop => write!(f, "break outside of a loop"),
            LowerError::UnknownLLLForm(s) => write!(f, "unrecognised LLL form: {s}"),
        }
    }
}
impl std::error::Error for LowerError {}

/// Errors raised by the two-pass bytecode assembler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssemblerError {
    /// An assembly item did not resolve to any emittable byte
    /// sequence (including an operand symbol with no definition site).
    UnknownItem(String),
}

impl fmt::Display for AssemblerError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AssemblerError::UnknownItem(s) => write!(f, "assembler: unresolvable item: {s}"),
        }
    }
}
impl std::error::Error for AssemblerError {}

/// Crate-wide error aggregating every pipeline stage's error type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    MalformedIR(MalformedIR),
    GasEstimateUnknown(GasEstimateUnknown),
    Lower(LowerError),
    Assembler(AssemblerError),
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CompileError::MalformedIR(e) => write!(f, "{e}"),
            CompileError::GasEstimateUnknown(e) => write!(f, "{e}"),
            CompileError::Lower(e) => write!(f, "{e}"),
            CompileError::Assembler(e) => write!(f, "{e}"),
        }
    }
}
impl std::error::Error for CompileError {}

impl From<MalformedIR> for CompileError {
    fn from(e: MalformedIR) -> Self {
        CompileError::MalformedIR(e)
    }
}
impl From<GasEstimateUnknown> for CompileError {
    fn from(e: GasEstimateUnknown) -> Self {
        CompileError::GasEstimateUnknown(e)
    }
}
impl From<LowerError> for CompileError {
    fn from(e: LowerError) -> Self {
        CompileError::Lower(e)
    }
}
impl From<AssemblerError> for CompileError {
    fn from(e: AssemblerError) -> Self {
        CompileError::Assembler(e)
    }
}
