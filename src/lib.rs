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

/// Lowering an LLL tree to flat assembly, and assembling that
/// assembly into bytecode.
pub mod asm;
/// Ties the pipeline stages together into a single `Compiler` entry
/// point.
pub mod compiler;
/// The crate-wide error hierarchy.
pub mod error;
/// The LLL tree and static gas estimation over it.
pub mod ir;
/// The opcode table: name to byte/arity/valency/gas.
pub mod opcode;
/// A minimal s-expression reader for driving the compiler from text.
pub mod sexpr;
/// Miscellaneous helpers: hex conversion, 256-bit literal encoding.
pub mod util;

pub use compiler::Compiler;
pub use error::CompileError;
pub use ir::Node;
