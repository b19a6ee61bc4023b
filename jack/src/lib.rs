mod compile;
mod conf;
pub mod constants;
mod emit;
mod error;
pub mod ir;
pub mod lex;

pub use self::{
    compile::{
        CompiledClass, Compiler, Nonterminal, ParseTrace, SubroutineKind, Symbol, SymbolKind,
        SymbolScope, SymbolTable,
    },
    emit::{code_to_string, write_code, Emitter},
};

/// Version of the compiler, from the crate manifest.
pub const IMPL_VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod prelude {
    pub use super::{
        compile::{CompiledClass, Compiler},
        conf::JackConf,
        error::{JackError, JackResult, SymbolError, SyntaxError},
        ir::{Command, Instr, Segment},
        lex::Lexer,
    };
}

use self::prelude::*;

/// Compile the source of one Jack class to VM code.
pub fn compile(source_code: &str) -> JackResult<CompiledClass> {
    compile_with(source_code, JackConf::default())
}

pub fn compile_with(source_code: &str, conf: JackConf) -> JackResult<CompiledClass> {
    Compiler::with_conf(Lexer::new(source_code), conf).compile_class()
}
