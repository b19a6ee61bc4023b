//! Tokens
use smol_str::SmolStr;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub span: Span,
    pub kind: TokenKind,
    /// Line in the source where the token starts, counting from 1.
    pub line: u32,
    /// Source text of the token.
    ///
    /// String constants are stored without their surrounding quotes.
    pub lexeme: SmolStr,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: impl Into<SmolStr>, line: u32) -> Self {
        Self {
            span: Span::default(),
            kind,
            line,
            lexeme: lexeme.into(),
        }
    }

    /// End-of-file marker positioned at the given span.
    pub fn eof(span: Span, line: u32) -> Self {
        Self {
            span,
            kind: TokenKind::EOF,
            line,
            lexeme: SmolStr::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[rustfmt::skip]
pub enum TokenKind {
    // Symbols
    LeftBrace,    // {
    RightBrace,   // }
    LeftParen,    // (
    RightParen,   // )
    LeftBracket,  // [
    RightBracket, // ]
    Comma,        // ,
    Semicolon,    // ;
    Dot,          // .

    // ------------------------------------------------------------------------
    // Operators
    Plus,         // +
    Minus,        // -
    Star,         // *
    Slash,        // /
    Ampersand,    // &
    Pipe,         // |
    Less,         // <
    Greater,      // >
    Eq,           // =
    Tilde,        // ~

    // ------------------------------------------------------------------------
    // Complex
    Ident,
    /// Reserved identifiers
    Keyword(Keyword),
    /// Integer literal
    Number,
    /// String literal
    String,

    // ------------------------------------------------------------------------
    // Special
    /// Character outside the language, or an unterminated string.
    Unknown,
    /// End-of-file
    EOF,
}

impl TokenKind {
    /// Element name used when the token is written to a parse trace.
    ///
    /// Returns `None` for kinds that never appear in a well formed program.
    pub fn tag(&self) -> Option<&'static str> {
        use TokenKind as TK;
        match self {
            TK::Keyword(_) => Some("keyword"),
            TK::Ident => Some("identifier"),
            TK::Number => Some("integerConstant"),
            TK::String => Some("stringConstant"),
            TK::Unknown | TK::EOF => None,
            _ => Some("symbol"),
        }
    }
}

impl fmt::Display for TokenKind {
    #[rustfmt::skip]
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use TokenKind as TK;
        match self {
            TK::LeftBrace    => write!(f, "'{{'"),
            TK::RightBrace   => write!(f, "'}}'"),
            TK::LeftParen    => write!(f, "'('"),
            TK::RightParen   => write!(f, "')'"),
            TK::LeftBracket  => write!(f, "'['"),
            TK::RightBracket => write!(f, "']'"),
            TK::Comma        => write!(f, "','"),
            TK::Semicolon    => write!(f, "';'"),
            TK::Dot          => write!(f, "'.'"),
            TK::Plus         => write!(f, "'+'"),
            TK::Minus        => write!(f, "'-'"),
            TK::Star         => write!(f, "'*'"),
            TK::Slash        => write!(f, "'/'"),
            TK::Ampersand    => write!(f, "'&'"),
            TK::Pipe         => write!(f, "'|'"),
            TK::Less         => write!(f, "'<'"),
            TK::Greater      => write!(f, "'>'"),
            TK::Eq           => write!(f, "'='"),
            TK::Tilde        => write!(f, "'~'"),
            TK::Ident        => write!(f, "identifier"),
            TK::Keyword(kw)  => write!(f, "'{kw}'"),
            TK::Number       => write!(f, "integer constant"),
            TK::String       => write!(f, "string constant"),
            TK::Unknown      => write!(f, "unknown token"),
            TK::EOF          => write!(f, "end of file"),
        }
    }
}

/// Reserved keywords.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
#[rustfmt::skip]
pub enum Keyword {
    // ------------------------------------------------------------------------
    // Declarations
    Class,        // class
    Constructor,  // constructor
    Function,     // function
    Method,       // method
    Field,        // field
    Static,       // static
    Var,          // var

    // ------------------------------------------------------------------------
    // Types
    Int,          // int
    Char,         // char
    Boolean,      // boolean
    Void,         // void

    // ------------------------------------------------------------------------
    // Constants
    True,         // true
    False,        // false
    Null,         // null
    This,         // this

    // ------------------------------------------------------------------------
    // Statements
    Let,          // let
    Do,           // do
    If,           // if
    Else,         // else
    While,        // while
    Return,       // return
}

impl Keyword {
    #[rustfmt::skip]
    pub fn parse(text: impl AsRef<str>) -> Option<Self> {
        match text.as_ref() {
            "class"       => Some(Self::Class),
            "constructor" => Some(Self::Constructor),
            "function"    => Some(Self::Function),
            "method"      => Some(Self::Method),
            "field"       => Some(Self::Field),
            "static"      => Some(Self::Static),
            "var"         => Some(Self::Var),
            // ----------------------------------------------------------------
            "int"         => Some(Self::Int),
            "char"        => Some(Self::Char),
            "boolean"     => Some(Self::Boolean),
            "void"        => Some(Self::Void),
            // ----------------------------------------------------------------
            "true"        => Some(Self::True),
            "false"       => Some(Self::False),
            "null"        => Some(Self::Null),
            "this"        => Some(Self::This),
            // ----------------------------------------------------------------
            "let"         => Some(Self::Let),
            "do"          => Some(Self::Do),
            "if"          => Some(Self::If),
            "else"        => Some(Self::Else),
            "while"       => Some(Self::While),
            "return"      => Some(Self::Return),
            // ----------------------------------------------------------------
            _ => None,
        }
    }

    #[rustfmt::skip]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Class       => "class",
            Self::Constructor => "constructor",
            Self::Function    => "function",
            Self::Method      => "method",
            Self::Field       => "field",
            Self::Static      => "static",
            Self::Var         => "var",
            Self::Int         => "int",
            Self::Char        => "char",
            Self::Boolean     => "boolean",
            Self::Void        => "void",
            Self::True        => "true",
            Self::False       => "false",
            Self::Null        => "null",
            Self::This        => "this",
            Self::Let         => "let",
            Self::Do          => "do",
            Self::If          => "if",
            Self::Else        => "else",
            Self::While       => "while",
            Self::Return      => "return",
        }
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Default, PartialEq, Eq, Clone, Copy)]
pub struct Span {
    pub index: u32,
    pub size: u32,
}

impl Span {
    pub fn new(index: u32, size: u32) -> Self {
        Self { index, size }
    }

    #[inline]
    pub fn fragment<'a>(&self, text: &'a str) -> &'a str {
        &text[(self.index as usize)..(self.index as usize + self.size as usize)]
    }

    /// Ending index of the span, exclusive.
    #[inline]
    pub fn end(&self) -> u32 {
        self.index + self.size
    }

    /// The full line of source text containing the start of the span,
    /// without its line terminator.
    pub fn surrounding_line<'a>(&self, text: &'a str) -> (&'a str, Span) {
        let index = (self.index as usize).min(text.len());

        let start = text[..index].rfind('\n').map(|i| i + 1).unwrap_or(0);
        let end = text[index..]
            .find('\n')
            .map(|i| index + i)
            .unwrap_or(text.len());
        let line = text[start..end].trim_end_matches('\r');

        let line_span = Span {
            index: start as u32,
            size: line.len() as u32,
        };

        (line, line_span)
    }
}
