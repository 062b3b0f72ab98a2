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

//! Process-unique symbol generation. Symbols need only be unique
//! within one compilation, but the counter is atomic so that multiple
//! compilations can run concurrently without colliding.

use std::sync::atomic::{AtomicUsize, Ordering};

/// Mints process-unique `_sym_<n>` labels.
#[derive(Debug, Default)]
pub struct SymbolGenerator {
    next: AtomicUsize,
}

impl SymbolGenerator {
    pub fn new() -> Self {
        Self { next: AtomicUsize::new(1) }
    }

    /// Mint a fresh symbol, distinct from every symbol previously
    /// minted by this generator.
    pub fn fresh(&self) -> String {
        let n = self.next.fetch_add(1, Ordering::Relaxed);
        format!("_sym_{n}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbols_are_distinct_and_increasing() {
        let gen = SymbolGenerator::new();
        let a = gen.fresh();
        let b = gen.fresh();
        assert_ne!(a, b);
        assert_eq!(a, "_sym_1");
        assert_eq!(b, "_sym_2");
    }
}
