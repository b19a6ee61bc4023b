//! Parse trace.
//!
//! Records which grammar rules the compiler walked through, and every
//! token it consumed along the way, in the element format of the
//! nand2tetris syntax analyser:
//!
//! ```text
//! <letStatement>
//! <keyword> let </keyword>
//! <identifier> x </identifier>
//! <symbol> = </symbol>
//! <expression>
//! <term>
//! <integerConstant> 1 </integerConstant>
//! </term>
//! </expression>
//! <symbol> ; </symbol>
//! </letStatement>
//! ```
use std::fmt;

use crate::lex::Token;

/// Grammar rules that show up in the trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nonterminal {
    Class,
    ClassVarDec,
    SubroutineDec,
    ParameterList,
    SubroutineBody,
    VarDec,
    Statements,
    LetStatement,
    IfStatement,
    WhileStatement,
    DoStatement,
    ReturnStatement,
    Expression,
    Term,
    ExpressionList,
}

impl Nonterminal {
    #[rustfmt::skip]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Class           => "class",
            Self::ClassVarDec     => "classVarDec",
            Self::SubroutineDec   => "subroutineDec",
            Self::ParameterList   => "parameterList",
            Self::SubroutineBody  => "subroutineBody",
            Self::VarDec          => "varDec",
            Self::Statements      => "statements",
            Self::LetStatement    => "letStatement",
            Self::IfStatement     => "ifStatement",
            Self::WhileStatement  => "whileStatement",
            Self::DoStatement     => "doStatement",
            Self::ReturnStatement => "returnStatement",
            Self::Expression      => "expression",
            Self::Term            => "term",
            Self::ExpressionList  => "expressionList",
        }
    }
}

impl fmt::Display for Nonterminal {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Default)]
pub struct ParseTrace {
    buf: String,
}

impl ParseTrace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&mut self, rule: Nonterminal) {
        self.buf.push('<');
        self.buf.push_str(rule.as_str());
        self.buf.push_str(">\n");
    }

    pub fn close(&mut self, rule: Nonterminal) {
        self.buf.push_str("</");
        self.buf.push_str(rule.as_str());
        self.buf.push_str(">\n");
    }

    pub fn token(&mut self, token: &Token) {
        if let Some(tag) = token.kind.tag() {
            self.buf.push('<');
            self.buf.push_str(tag);
            self.buf.push_str("> ");
            push_escaped(&mut self.buf, &token.lexeme);
            self.buf.push_str(" </");
            self.buf.push_str(tag);
            self.buf.push_str(">\n");
        }
    }

    pub fn as_str(&self) -> &str {
        &self.buf
    }

    pub fn into_string(self) -> String {
        self.buf
    }
}

fn push_escaped(buf: &mut String, text: &str) {
    for c in text.chars() {
        match c {
            '<' => buf.push_str("&lt;"),
            '>' => buf.push_str("&gt;"),
            '&' => buf.push_str("&amp;"),
            '"' => buf.push_str("&quot;"),
            c => buf.push(c),
        }
    }
}
