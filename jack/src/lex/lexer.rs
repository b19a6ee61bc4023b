//! Lexical analysis
use smol_str::SmolStr;

use super::{
    cursor::{Cursor, EOF_CHAR},
    tokens::{Keyword, Span, Token, TokenKind},
};

pub struct Lexer<'a> {
    /// Character scanner
    cursor: Cursor<'a>,
    /// Keep reference to the source so the parser can
    /// slice fragments from it.
    original: &'a str,
    /// Start absolute byte position of the current token
    /// in the source.
    start_pos: u32,
    /// Line where the current token starts.
    start_line: u32,
}

impl<'a> Lexer<'a> {
    pub fn new(source_code: &'a str) -> Self {
        let mut cursor = Cursor::new(source_code);

        // Initial state of the cursor is a non-existant EOF char,
        // but the initial state of the lexer should be a valid
        // token starting character.
        //
        // Prime the cursor for the first iteration.
        cursor.next();

        let start_pos = cursor.offset();
        let start_line = cursor.line();

        Self {
            cursor,
            original: source_code,
            start_pos,
            start_line,
        }
    }

    /// Original source code that was passed in during construction.
    pub fn source_code(&self) -> &'a str {
        self.original
    }

    /// Scan the source characters and construct the next token.
    ///
    /// ## Implementation
    ///
    /// Each iteration starts with the assumption that the internal cursor
    /// is pointing to the start of the remaining source to be consumed,
    /// and must leave the cursor at the start of the next token's text.
    pub fn next_token(&mut self) -> Token {
        use TokenKind as TK;

        self.erase_trivia();

        self.start_token();

        match self.cursor.current() {
            '{' => self.make_token(TK::LeftBrace),
            '}' => self.make_token(TK::RightBrace),
            '(' => self.make_token(TK::LeftParen),
            ')' => self.make_token(TK::RightParen),
            '[' => self.make_token(TK::LeftBracket),
            ']' => self.make_token(TK::RightBracket),
            ',' => self.make_token(TK::Comma),
            ';' => self.make_token(TK::Semicolon),
            '.' => self.make_token(TK::Dot),
            '+' => self.make_token(TK::Plus),
            '-' => self.make_token(TK::Minus),
            '*' => self.make_token(TK::Star),
            '/' => self.make_token(TK::Slash),
            '&' => self.make_token(TK::Ampersand),
            '|' => self.make_token(TK::Pipe),
            '<' => self.make_token(TK::Less),
            '>' => self.make_token(TK::Greater),
            '=' => self.make_token(TK::Eq),
            '~' => self.make_token(TK::Tilde),
            '"' => self.consume_string(),
            '_' | 'a'..='z' | 'A'..='Z' => self.consume_ident(),
            '0'..='9' => self.consume_number(),

            // Source may contain null characters before its actual end.
            EOF_CHAR if self.cursor.at_end() => self.make_eof(),
            _ => self.make_token(TK::Unknown),
        }
    }

    /// Create a span using the starting position of the current token,
    /// and the current offset of the cursor.
    fn make_span(&mut self) -> Span {
        let start = self.start_pos;
        let end = self.cursor.peek_offset();

        // start and end can be equal, and a token can have 0 size.
        debug_assert!(end >= start);
        let size = end - start;

        Span { index: start, size }
    }

    fn fragment(&mut self) -> &'a str {
        let original = self.original;
        self.make_span().fragment(original)
    }

    /// Primes the lexer to consume the next token.
    fn start_token(&mut self) {
        self.start_pos = self.cursor.offset();
        self.start_line = self.cursor.line();
    }

    /// Build a token, using the source text from the position
    /// stored by [`start_token`](struct.Lexer.html#fn-start_token) to the
    /// current cursor position.
    ///
    /// Also prepare the cursor for the next iteration.
    fn make_token(&mut self, kind: TokenKind) -> Token {
        let lexeme = SmolStr::new(self.fragment());
        self.make_token_with(kind, lexeme)
    }

    fn make_token_with(&mut self, kind: TokenKind, lexeme: SmolStr) -> Token {
        let token = Token {
            span: self.make_span(),
            kind,
            line: self.start_line,
            lexeme,
        };

        // Position the cursor to the starting character for the
        // next token, so the lexer's internal state is primed
        // for the next iteration.
        self.cursor.next();
        debug_assert_eq!(self.cursor.offset(), token.span.end());

        token
    }

    fn make_eof(&self) -> Token {
        Token::eof(Span::new(self.start_pos, 0), self.start_line)
    }
}

/// Specialised tokens.
impl<'a> Lexer<'a> {
    /// Skip whitespace and comments until the start of a token,
    /// or the end of the source.
    fn erase_trivia(&mut self) {
        loop {
            while is_whitespace(self.cursor.current()) {
                self.cursor.next();
            }

            match (self.cursor.current(), self.cursor.peek()) {
                ('/', '/') => self.erase_line_comment(),
                ('/', '*') => self.erase_block_comment(),
                _ => break,
            }
        }
    }

    /// Erase comment line up to, but not including, the trailing newline.
    fn erase_line_comment(&mut self) {
        while !is_newline(self.cursor.current()) && !self.cursor.at_end() {
            self.cursor.next();
        }
    }

    /// Erase a `/* */` or `/** */` comment, including the closing marker.
    ///
    /// An unterminated comment runs to the end of the source.
    fn erase_block_comment(&mut self) {
        debug_assert_eq!(self.cursor.current(), '/');

        // Step onto the opening star so it can't be mistaken
        // for the first character of the closing marker.
        self.cursor.next();

        loop {
            self.cursor.next();

            if self.cursor.at_end() {
                return;
            }

            if self.cursor.current() == '*' && self.cursor.peek() == '/' {
                self.cursor.next();
                self.cursor.next();
                return;
            }
        }
    }

    /// Make an identifier or keyword token.
    fn consume_ident(&mut self) -> Token {
        debug_assert!(is_letter(self.cursor.current()));

        while is_letter_or_digit(self.cursor.peek()) {
            self.cursor.next();
        }

        let token_kind = match Keyword::parse(self.fragment()) {
            Some(keyword) => TokenKind::Keyword(keyword),
            None => TokenKind::Ident,
        };

        self.make_token(token_kind)
    }

    /// Make a number literal token.
    ///
    /// Range checking is left to the parser.
    fn consume_number(&mut self) -> Token {
        debug_assert!(is_digit(self.cursor.current()));

        while is_digit(self.cursor.peek()) {
            self.cursor.next();
        }

        self.make_token(TokenKind::Number)
    }

    /// Make a string literal token.
    ///
    /// Strings may not span lines. When the closing quote is missing
    /// the text up to the end of the line becomes an unknown token.
    fn consume_string(&mut self) -> Token {
        debug_assert_eq!(self.cursor.current(), '"');

        loop {
            match self.cursor.peek() {
                '"' => {
                    self.cursor.next();
                    break;
                }
                '\n' | '\r' => return self.make_token(TokenKind::Unknown),
                EOF_CHAR if self.cursor.peek_offset() >= self.original.len() as u32 => {
                    return self.make_token(TokenKind::Unknown)
                }
                _ => {
                    self.cursor.next();
                }
            }
        }

        let fragment = self.fragment();
        let content = SmolStr::new(&fragment[1..fragment.len() - 1]);
        self.make_token_with(TokenKind::String, content)
    }
}

/// Test whether the character is considered whitespace
/// that should be ignored by the parser later.
fn is_whitespace(c: char) -> bool {
    matches!(
        c,
        '\u{0020}' // space
            | '\u{0009}' // tab
            | '\u{000A}' // line feed
            | '\u{000D}' // carriage return
            | '\u{00A0}' // no-break space
            | '\u{FEFF}' // zero width no-break space
    )
}

fn is_newline(c: char) -> bool {
    matches!(c, '\r' | '\n')
}

#[allow(clippy::manual_is_ascii_check)] // consistency with other functions
fn is_digit(c: char) -> bool {
    matches!(c, '0'..='9')
}

fn is_letter(c: char) -> bool {
    matches!(c, 'a'..='z' | 'A'..='Z' | '_')
}

fn is_letter_or_digit(c: char) -> bool {
    is_letter(c) || is_digit(c)
}

impl<'a> IntoIterator for Lexer<'a> {
    type Item = Token;
    type IntoIter = LexerIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        LexerIter {
            lexer: self,
            done: false,
        }
    }
}

/// Convenience iterator that wraps the lexer.
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct LexerIter<'a> {
    // Track end so an EOF token is emitted once.
    done: bool,
    lexer: Lexer<'a>,
}

impl<'a> Iterator for LexerIter<'a> {
    type Item = Token;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let token = self.lexer.next_token();
        if token.kind == TokenKind::EOF {
            self.done = true;
        }
        Some(token)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use TokenKind as TK;

    fn kinds(source: &str) -> Vec<TokenKind> {
        Lexer::new(source).into_iter().map(|token| token.kind).collect()
    }

    #[test]
    fn test_lex_let() {
        let tokens = Lexer::new("let x = 42;").into_iter().collect::<Vec<_>>();

        let lexemes = tokens.iter().map(|t| t.lexeme.as_str()).collect::<Vec<_>>();
        assert_eq!(lexemes, vec!["let", "x", "=", "42", ";", ""]);

        assert_eq!(tokens[0].kind, TK::Keyword(Keyword::Let));
        assert_eq!(tokens[1].kind, TK::Ident);
        assert_eq!(tokens[3].kind, TK::Number);
        assert_eq!(tokens[3].span, Span::new(8, 2));
        assert_eq!(tokens[5].kind, TK::EOF);
    }

    #[test]
    fn test_lex_symbols() {
        assert_eq!(
            kinds("{}()[],;.+-*/&|<>=~"),
            vec![
                TK::LeftBrace,
                TK::RightBrace,
                TK::LeftParen,
                TK::RightParen,
                TK::LeftBracket,
                TK::RightBracket,
                TK::Comma,
                TK::Semicolon,
                TK::Dot,
                TK::Plus,
                TK::Minus,
                TK::Star,
                TK::Slash,
                TK::Ampersand,
                TK::Pipe,
                TK::Less,
                TK::Greater,
                TK::Eq,
                TK::Tilde,
                TK::EOF,
            ]
        );
    }

    #[test]
    fn test_lex_comments() {
        let source = concat!(
            "// line comment\n",
            "/** doc\n",
            " * comment */\n",
            "do /* inline */ x;\n",
            "a / b",
        );
        assert_eq!(
            kinds(source),
            vec![
                TK::Keyword(Keyword::Do),
                TK::Ident,
                TK::Semicolon,
                TK::Ident,
                TK::Slash,
                TK::Ident,
                TK::EOF,
            ]
        );
    }

    #[test]
    fn test_lex_lines() {
        let tokens = Lexer::new("class\r\n  Main\n\n{ /* \n */ }")
            .into_iter()
            .collect::<Vec<_>>();
        let lines = tokens.iter().map(|t| t.line).collect::<Vec<_>>();
        assert_eq!(lines, vec![1, 2, 4, 5, 5]);
    }

    #[test]
    fn test_lex_string() {
        let tokens = Lexer::new("\"OLA mundo\" x").into_iter().collect::<Vec<_>>();
        assert_eq!(tokens[0].kind, TK::String);
        assert_eq!(tokens[0].lexeme, "OLA mundo");
        assert_eq!(tokens[0].span, Span::new(0, 11));
        assert_eq!(tokens[1].kind, TK::Ident);
        assert_eq!(tokens[1].lexeme, "x");
    }

    #[test]
    fn test_lex_empty_string() {
        let tokens = Lexer::new("\"\";").into_iter().collect::<Vec<_>>();
        assert_eq!(tokens[0].kind, TK::String);
        assert_eq!(tokens[0].lexeme, "");
        assert_eq!(tokens[1].kind, TK::Semicolon);
    }

    #[test]
    fn test_lex_unterminated_string() {
        assert_eq!(kinds("\"abc\nx"), vec![TK::Unknown, TK::Ident, TK::EOF]);
        assert_eq!(kinds("\"abc"), vec![TK::Unknown, TK::EOF]);
    }

    #[test]
    fn test_lex_keywords_and_idents() {
        assert_eq!(
            kinds("while whileLoop _x1 this"),
            vec![
                TK::Keyword(Keyword::While),
                TK::Ident,
                TK::Ident,
                TK::Keyword(Keyword::This),
                TK::EOF,
            ]
        );
    }

    #[test]
    fn test_lex_unknown() {
        assert_eq!(kinds("x # y"), vec![TK::Ident, TK::Unknown, TK::Ident, TK::EOF]);
    }

    #[test]
    fn test_lex_empty() {
        assert_eq!(kinds(""), vec![TK::EOF]);
        assert_eq!(kinds("   // nothing"), vec![TK::EOF]);
    }
}
