//! Lexical analysis and token buffering.
mod cursor;
mod lexer;
mod token_stream;
mod tokens;

pub use self::{
    lexer::{Lexer, LexerIter},
    token_stream::TokenStream,
    tokens::{Keyword, Span, Token, TokenKind},
};

/// Lex the whole source into a list of tokens, ending with [`TokenKind::EOF`].
pub fn tokenize(source_code: &str) -> Vec<Token> {
    Lexer::new(source_code).into_iter().collect()
}
