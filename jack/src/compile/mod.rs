//! Parsing fused with code generation.
mod compiler;
mod symbol;
mod trace;

pub use self::{
    compiler::{CompiledClass, Compiler, SubroutineKind},
    symbol::{Symbol, SymbolKind, SymbolScope, SymbolTable},
    trace::{Nonterminal, ParseTrace},
};
