//! Result and errors.
use smol_str::SmolStr;
use std::fmt::{self, Display, Formatter};

use crate::{
    compile::SymbolKind,
    lex::{Span, Token, TokenKind},
};

pub type JackResult<T> = std::result::Result<T, JackError>;

#[derive(Debug, PartialEq, Eq)]
pub enum JackError {
    /// Token did not fit the grammar at its position.
    Syntax(SyntaxError),
    /// Declaration or reference the symbol table could not satisfy.
    Semantic { line: u32, error: SymbolError },
}

impl JackError {
    /// Source line the error was raised at.
    pub fn line(&self) -> u32 {
        match self {
            Self::Syntax(err) => err.line,
            Self::Semantic { line, .. } => *line,
        }
    }
}

impl Display for JackError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Syntax(err) => Display::fmt(err, f),
            Self::Semantic { line, error } => write!(f, "[line {line}] Error: {error}"),
        }
    }
}

impl std::error::Error for JackError {}

impl From<SyntaxError> for JackError {
    fn from(err: SyntaxError) -> Self {
        JackError::Syntax(err)
    }
}

/// Unexpected token encountered by the parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    pub line: u32,
    /// Offending lexeme, or `None` when the parser ran into the end of the source.
    pub lexeme: Option<SmolStr>,
    pub message: String,
    /// Offending source line with the token underlined.
    pub excerpt: Option<String>,
}

impl SyntaxError {
    pub fn new(token: &Token, message: impl ToString) -> Self {
        let lexeme = match token.kind {
            TokenKind::EOF => None,
            _ => Some(token.lexeme.clone()),
        };

        Self {
            line: token.line,
            lexeme,
            message: message.to_string(),
            excerpt: None,
        }
    }

    /// Attach the source line surrounding the token.
    pub fn with_source(mut self, source_code: &str, span: Span) -> Self {
        let (line, line_span) = span.surrounding_line(source_code);

        let offset = (span.index.saturating_sub(line_span.index) as usize).min(line.len());
        let column = line
            .get(..offset)
            .map(|prefix| prefix.chars().count())
            .unwrap_or(0);
        let width = span.fragment(source_code).chars().count().max(1);

        self.excerpt = Some(format!(
            "{line}\n{:column$}{:^<width$}",
            "",
            "",
            column = column,
            width = width
        ));
        self
    }
}

impl Display for SyntaxError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match &self.lexeme {
            Some(lexeme) => write!(f, "[line {}] Error at '{}': {}", self.line, lexeme, self.message)?,
            None => write!(f, "[line {}] Error at end: {}", self.line, self.message)?,
        }

        if let Some(excerpt) = &self.excerpt {
            write!(f, "\n{excerpt}")?;
        }

        Ok(())
    }
}

impl std::error::Error for SyntaxError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SymbolError {
    /// Name declared twice in the same scope.
    Duplicate(SmolStr),
    /// Symbol indices of one kind ran past what the VM can address.
    Overflow(SymbolKind),
}

impl Display for SymbolError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Duplicate(name) => write!(f, "symbol '{name}' is already defined in this scope"),
            Self::Overflow(kind) => write!(
                f,
                "too many {kind} variables, at most {} are addressable",
                u16::MAX
            ),
        }
    }
}

impl std::error::Error for SymbolError {}
