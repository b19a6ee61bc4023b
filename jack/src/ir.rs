//! Stack machine instructions.
//!
//! This is a structured representation of the VM code the compiler
//! produces. Rendering an instruction with [`Display`](fmt::Display)
//! gives its line in a `.vm` file.
use smol_str::SmolStr;
use std::fmt;

/// Addressing space for `push` and `pop`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Segment {
    Const,
    Argument,
    Local,
    Static,
    This,
    That,
    Pointer,
    Temp,
}

impl Segment {
    #[rustfmt::skip]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Const    => "constant",
            Self::Argument => "argument",
            Self::Local    => "local",
            Self::Static   => "static",
            Self::This     => "this",
            Self::That     => "that",
            Self::Pointer  => "pointer",
            Self::Temp     => "temp",
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Arithmetic and logical operations on the top of the stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    Add,
    Sub,
    Neg,
    Eq,
    Gt,
    Lt,
    And,
    Or,
    Not,
}

impl Command {
    #[rustfmt::skip]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Sub => "sub",
            Self::Neg => "neg",
            Self::Eq  => "eq",
            Self::Gt  => "gt",
            Self::Lt  => "lt",
            Self::And => "and",
            Self::Or  => "or",
            Self::Not => "not",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instr {
    /// push segment index
    ///
    /// Push the value at `segment[index]` onto the stack.
    Push(Segment, u16),
    /// pop segment index
    ///
    /// Pop the top of the stack into `segment[index]`.
    Pop(Segment, u16),
    /// add, sub, neg, eq, gt, lt, and, or, not
    Arithmetic(Command),
    /// label name
    Label(SmolStr),
    /// goto name
    Goto(SmolStr),
    /// if-goto name
    ///
    /// Pop the top of the stack and jump when it's not zero.
    IfGoto(SmolStr),
    /// call name nArgs
    ///
    /// Arguments must already be on the stack.
    Call(SmolStr, u16),
    /// function name nLocals
    ///
    /// Entry point of a subroutine, with the size of its local frame.
    Function(SmolStr, u16),
    /// return
    Return,
}

impl fmt::Display for Instr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Push(segment, index) => write!(f, "push {segment} {index}"),
            Self::Pop(segment, index) => write!(f, "pop {segment} {index}"),
            Self::Arithmetic(command) => write!(f, "{command}"),
            Self::Label(name) => write!(f, "label {name}"),
            Self::Goto(name) => write!(f, "goto {name}"),
            Self::IfGoto(name) => write!(f, "if-goto {name}"),
            Self::Call(name, n_args) => write!(f, "call {name} {n_args}"),
            Self::Function(name, n_locals) => write!(f, "function {name} {n_locals}"),
            Self::Return => write!(f, "return"),
        }
    }
}
