//! Peekable token stream.
use std::iter::Peekable;

use crate::error::{JackError, JackResult, SyntaxError};

use super::{Lexer, Span, Token, TokenKind};

type TokenIter<'a> = Box<dyn Iterator<Item = Token> + 'a>;

/// Buffered stream of tokens with one token of look ahead.
///
/// Tokens are lazily lexed. Peeking or consuming the next token
/// triggers the internal lexer. Once the underlying tokens are
/// exhausted the stream keeps yielding an end-of-file token.
pub struct TokenStream<'a> {
    tokens: Peekable<TokenIter<'a>>,
    /// Keep reference to the source so errors can
    /// quote the offending line.
    original: Option<&'a str>,
    /// Token handed out when the underlying iterator runs dry.
    eof: Token,
}

impl<'a> TokenStream<'a> {
    pub fn new(lexer: Lexer<'a>) -> Self {
        let original = lexer.source_code();
        let mut stream = Self::from_tokens(lexer);
        stream.original = Some(original);
        stream
    }

    /// Stream over tokens produced by something other than the [`Lexer`].
    pub fn from_tokens<I>(tokens: I) -> Self
    where
        I: IntoIterator<Item = Token>,
        I::IntoIter: 'a,
    {
        let iter: TokenIter<'a> = Box::new(tokens.into_iter());
        Self {
            tokens: iter.peekable(),
            original: None,
            eof: Token::eof(Span::default(), 1),
        }
    }

    pub fn source_code(&self) -> Option<&'a str> {
        self.original
    }

    /// Consumes the current token regardless of kind.
    pub fn next_token(&mut self) -> Token {
        let token = match self.tokens.next() {
            Some(token) => token,
            None => self.eof.clone(),
        };

        if token.kind == TokenKind::EOF {
            self.eof = token.clone();
        } else {
            // Any end-of-file we have to make up sits just after the last real token.
            self.eof = Token::eof(Span::new(token.span.end(), 0), token.line);
        }

        token
    }

    /// Return the current token without advancing the cursor.
    #[inline]
    pub fn peek(&mut self) -> &Token {
        match self.tokens.peek() {
            Some(token) => token,
            None => &self.eof,
        }
    }

    /// Return the current token kind without advancing the cursor.
    #[inline]
    pub fn peek_kind(&mut self) -> TokenKind {
        self.peek().kind
    }

    #[inline]
    pub fn peek_is(&mut self, token_kind: TokenKind) -> bool {
        self.peek_kind() == token_kind
    }

    /// Return the current token and advance the cursor.
    ///
    /// # Errors
    ///
    /// Returns a [`SyntaxError`] if the token kind doesn't match. The cursor
    /// is not advanced in that case.
    pub fn consume(&mut self, token_kind: TokenKind) -> JackResult<Token> {
        self.consume_any(&[token_kind])
    }

    /// Return the current token and advance the cursor, if the token
    /// is any of the given kinds.
    pub fn consume_any(&mut self, token_kinds: &[TokenKind]) -> JackResult<Token> {
        let kind = self.peek_kind();

        if token_kinds.contains(&kind) {
            Ok(self.next_token())
        } else {
            let message = expected_message(token_kinds);
            let token = self.peek().clone();
            Err(self.error(&token, message))
        }
    }

    /// Build a syntax error for the given token, quoting the source
    /// when it is available.
    #[inline(never)]
    #[cold]
    pub fn error(&self, token: &Token, message: impl ToString) -> JackError {
        let err = SyntaxError::new(token, message);
        match self.original {
            Some(source_code) => err.with_source(source_code, token.span).into(),
            None => err.into(),
        }
    }
}

fn expected_message(token_kinds: &[TokenKind]) -> String {
    match token_kinds {
        [] => "unexpected token".to_string(),
        [kind] => format!("expected {kind}"),
        kinds => {
            let kind_names = kinds
                .iter()
                .map(|kind| kind.to_string())
                .collect::<Vec<_>>();
            format!("expected one of: {}", kind_names.join(", "))
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::lex::Keyword;
    use TokenKind as TK;

    #[test]
    fn test_consume_any() {
        let mut stream = TokenStream::new(Lexer::new("let x;"));

        let token = stream
            .consume_any(&[TK::Keyword(Keyword::Do), TK::Keyword(Keyword::Let)])
            .unwrap();
        assert_eq!(token.kind, TK::Keyword(Keyword::Let));
        assert_eq!(token.lexeme, "let");

        let err = stream.consume(TK::Semicolon).unwrap_err();
        assert_eq!(err.to_string(), "[line 1] Error at 'x': expected ';'\nlet x;\n    ^");
        // cursor did not move
        assert!(stream.peek_is(TK::Ident));
    }

    #[test]
    fn test_eof_forever() {
        let mut stream = TokenStream::new(Lexer::new("x"));
        assert_eq!(stream.next_token().kind, TK::Ident);
        for _ in 0..3 {
            assert_eq!(stream.peek_kind(), TK::EOF);
            assert_eq!(stream.next_token().kind, TK::EOF);
        }
    }

    #[test]
    fn test_from_tokens_without_eof() {
        let mut stream = TokenStream::from_tokens(vec![
            Token::new(TK::Ident, "a", 1),
            Token::new(TK::Ident, "b", 2),
        ]);
        assert_eq!(stream.consume(TK::Ident).unwrap().lexeme, "a");
        assert!(stream.consume(TK::Comma).is_err());
        assert_eq!(stream.next_token().lexeme, "b");

        let eof = stream.next_token();
        assert_eq!(eof.kind, TK::EOF);
        assert_eq!(eof.line, 2);

        let err = stream.consume(TK::Semicolon).unwrap_err();
        assert_eq!(err.to_string(), "[line 2] Error at end: expected ';'");
    }

    #[test]
    fn test_expected_message() {
        assert_eq!(
            expected_message(&[TK::Keyword(Keyword::Int), TK::Ident]),
            "expected one of: 'int', identifier"
        );
    }
}
