//! Instruction emitter.
use smol_str::SmolStr;
use std::fmt::{self, Write as FmtWrite};

use crate::ir::{Command, Instr, Segment};

/// Append-only sink for generated instructions.
///
/// Every method appends exactly one instruction. Names and counts
/// are taken as given; checking them is the compiler's job.
#[derive(Debug, Default)]
pub struct Emitter {
    code: Vec<Instr>,
}

impl Emitter {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn push(&mut self, segment: Segment, index: u16) {
        self.emit(Instr::Push(segment, index))
    }

    #[inline]
    pub fn pop(&mut self, segment: Segment, index: u16) {
        self.emit(Instr::Pop(segment, index))
    }

    #[inline]
    pub fn arithmetic(&mut self, command: Command) {
        self.emit(Instr::Arithmetic(command))
    }

    pub fn label(&mut self, name: impl Into<SmolStr>) {
        self.emit(Instr::Label(name.into()))
    }

    pub fn goto(&mut self, name: impl Into<SmolStr>) {
        self.emit(Instr::Goto(name.into()))
    }

    pub fn if_goto(&mut self, name: impl Into<SmolStr>) {
        self.emit(Instr::IfGoto(name.into()))
    }

    pub fn call(&mut self, name: impl Into<SmolStr>, n_args: u16) {
        self.emit(Instr::Call(name.into(), n_args))
    }

    pub fn function(&mut self, name: impl Into<SmolStr>, n_locals: u16) {
        self.emit(Instr::Function(name.into(), n_locals))
    }

    #[inline]
    pub fn ret(&mut self) {
        self.emit(Instr::Return)
    }

    #[inline]
    fn emit(&mut self, instr: Instr) {
        self.code.push(instr)
    }

    /// Instructions emitted so far.
    pub fn code(&self) -> &[Instr] {
        &self.code
    }

    pub fn into_code(self) -> Vec<Instr> {
        self.code
    }
}

/// Write instructions one per line, in `.vm` file format.
pub fn write_code<W: FmtWrite>(w: &mut W, code: &[Instr]) -> fmt::Result {
    for instr in code {
        writeln!(w, "{instr}")?;
    }
    Ok(())
}

/// Render instructions to `.vm` file text.
pub fn code_to_string(code: &[Instr]) -> String {
    let mut buf = String::new();
    // Writing into a String can't fail.
    let _ = write_code(&mut buf, code);
    buf
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_emit_appends_in_order() {
        let mut emit = Emitter::new();
        emit.function("Main.main", 0);
        emit.push(Segment::Const, 0);
        emit.arithmetic(Command::Not);
        emit.if_goto("IF_TRUE0");
        emit.goto("IF_FALSE0");
        emit.label("IF_TRUE0");
        emit.call("Output.printInt", 1);
        emit.pop(Segment::Temp, 0);
        emit.label("IF_FALSE0");
        emit.push(Segment::Const, 0);
        emit.ret();

        assert_eq!(emit.code().len(), 11);
        assert_eq!(
            code_to_string(emit.code()),
            concat!(
                "function Main.main 0\n",
                "push constant 0\n",
                "not\n",
                "if-goto IF_TRUE0\n",
                "goto IF_FALSE0\n",
                "label IF_TRUE0\n",
                "call Output.printInt 1\n",
                "pop temp 0\n",
                "label IF_FALSE0\n",
                "push constant 0\n",
                "return\n",
            )
        );
    }
}
