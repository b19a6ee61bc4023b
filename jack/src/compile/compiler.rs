//! Single pass compiler.
//!
//! Each grammar rule is a method that consumes its tokens and emits
//! the VM code for them on the spot. There is no syntax tree; symbol
//! declarations go straight into the [`SymbolTable`] and expressions
//! are reduced to stack code as soon as their terms are read.
use log::{debug, trace, warn};
use smol_str::SmolStr;

use super::{
    symbol::{Symbol, SymbolKind, SymbolTable},
    trace::{Nonterminal as NT, ParseTrace},
};
use crate::{
    conf::JackConf,
    constants::*,
    emit::{code_to_string, Emitter},
    error::{JackError, JackResult},
    ir::{Command, Instr, Segment},
    lex::{Keyword as KW, Lexer, Token, TokenKind as TK, TokenStream},
};

/// `int`, `char`, `boolean` or a class name.
const TYPE_KINDS: &[TK] = &[
    TK::Keyword(KW::Int),
    TK::Keyword(KW::Char),
    TK::Keyword(KW::Boolean),
    TK::Ident,
];

/// Return type of a subroutine may also be `void`.
const RETURN_TYPE_KINDS: &[TK] = &[
    TK::Keyword(KW::Void),
    TK::Keyword(KW::Int),
    TK::Keyword(KW::Char),
    TK::Keyword(KW::Boolean),
    TK::Ident,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubroutineKind {
    Constructor,
    Function,
    Method,
}

/// Code a binary operator compiles to, once both operands are on the stack.
enum BinaryOp {
    Arithmetic(Command),
    Call(&'static str),
}

#[rustfmt::skip]
fn binary_op(kind: TK) -> Option<BinaryOp> {
    match kind {
        TK::Plus      => Some(BinaryOp::Arithmetic(Command::Add)),
        TK::Minus     => Some(BinaryOp::Arithmetic(Command::Sub)),
        TK::Less      => Some(BinaryOp::Arithmetic(Command::Lt)),
        TK::Greater   => Some(BinaryOp::Arithmetic(Command::Gt)),
        TK::Eq        => Some(BinaryOp::Arithmetic(Command::Eq)),
        TK::Ampersand => Some(BinaryOp::Arithmetic(Command::And)),
        TK::Pipe      => Some(BinaryOp::Arithmetic(Command::Or)),
        TK::Star      => Some(BinaryOp::Call(MATH_MULTIPLY)),
        TK::Slash     => Some(BinaryOp::Call(MATH_DIVIDE)),
        _ => None,
    }
}

/// `Class.member`
fn qualified(class_name: &str, member: &str) -> SmolStr {
    SmolStr::from(format!("{class_name}.{member}"))
}

/// Result of compiling one class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledClass {
    pub name: SmolStr,
    pub code: Vec<Instr>,
    /// Parse trace, when enabled in the [`JackConf`].
    pub trace: Option<String>,
}

impl CompiledClass {
    /// Generated code in `.vm` file format.
    pub fn vm_text(&self) -> String {
        code_to_string(&self.code)
    }
}

pub struct Compiler<'a> {
    tokens: TokenStream<'a>,
    symbols: SymbolTable,
    emit: Emitter,
    trace: Option<ParseTrace>,
    /// Name of the class being compiled. Empty until a class
    /// declaration is parsed.
    class_name: SmolStr,
    /// Counters for unique labels, reset for every subroutine.
    if_label: u32,
    while_label: u32,
}

impl<'a> Compiler<'a> {
    pub fn new(lexer: Lexer<'a>) -> Self {
        Self::with_conf(lexer, JackConf::default())
    }

    pub fn with_conf(lexer: Lexer<'a>, conf: JackConf) -> Self {
        Self::from_stream(TokenStream::new(lexer), conf)
    }

    pub fn from_stream(tokens: TokenStream<'a>, conf: JackConf) -> Self {
        Self {
            tokens,
            symbols: SymbolTable::new(),
            emit: Emitter::new(),
            trace: if conf.trace { Some(ParseTrace::new()) } else { None },
            class_name: SmolStr::default(),
            if_label: 0,
            while_label: 0,
        }
    }

    /// Compile the one class the source holds.
    ///
    /// Nothing but the end of the source may follow the class.
    pub fn compile_class(mut self) -> JackResult<CompiledClass> {
        self.parse_class()?;
        self.tokens.consume(TK::EOF)?;
        Ok(self.finish())
    }

    pub fn finish(self) -> CompiledClass {
        CompiledClass {
            name: self.class_name,
            code: self.emit.into_code(),
            trace: self.trace.map(ParseTrace::into_string),
        }
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    /// Instructions emitted so far.
    pub fn code(&self) -> &[Instr] {
        self.emit.code()
    }

    /// Instructions emitted so far, in `.vm` file format.
    pub fn vm_output(&self) -> String {
        code_to_string(self.emit.code())
    }

    pub fn trace_output(&self) -> Option<&str> {
        self.trace.as_ref().map(ParseTrace::as_str)
    }

    /// Access to the symbol table, for compiling statements
    /// against declarations made up front.
    pub fn symbols_mut(&mut self) -> &mut SymbolTable {
        &mut self.symbols
    }
}

/// Token helpers.
impl<'a> Compiler<'a> {
    /// Consume a token of one of the given kinds, recording it in the trace.
    fn expect(&mut self, kinds: &[TK]) -> JackResult<Token> {
        let token = self.tokens.consume_any(kinds)?;
        if let Some(trace) = self.trace.as_mut() {
            trace.token(&token);
        }
        Ok(token)
    }

    #[inline]
    fn expect_one(&mut self, kind: TK) -> JackResult<Token> {
        self.expect(&[kind])
    }

    /// Consume the next token only when it's of the given kind.
    fn accept(&mut self, kind: TK) -> JackResult<bool> {
        if self.tokens.peek_is(kind) {
            self.expect_one(kind)?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    #[inline(never)]
    #[cold]
    fn unexpected(&mut self, message: &str) -> JackError {
        let token = self.tokens.peek().clone();
        self.tokens.error(&token, message)
    }

    #[inline]
    fn open(&mut self, rule: NT) {
        if let Some(trace) = self.trace.as_mut() {
            trace.open(rule);
        }
    }

    #[inline]
    fn close(&mut self, rule: NT) {
        if let Some(trace) = self.trace.as_mut() {
            trace.close(rule);
        }
    }
}

/// Symbol helpers.
impl<'a> Compiler<'a> {
    fn define(&mut self, name: &Token, ty: &SmolStr, kind: SymbolKind) -> JackResult<()> {
        self.symbols
            .define(name.lexeme.clone(), ty.clone(), kind)
            .map(|_| ())
            .map_err(|error| JackError::Semantic {
                line: name.line,
                error,
            })
    }

    /// Look up an identifier that is used as a variable.
    ///
    /// A name found in neither scope can't be addressed. It is reported,
    /// and compiles as the null reference so the walk carries on.
    fn resolve_var(&self, name: &Token) -> Option<Symbol> {
        let symbol = self.symbols.resolve(&name.lexeme).cloned();
        if symbol.is_none() {
            warn!(
                "[line {}] unresolved variable '{}' in class '{}'",
                name.line, name.lexeme, self.class_name
            );
        }
        symbol
    }

    /// Push the variable's value, or null when it's unresolved.
    fn push_var(&mut self, symbol: Option<&Symbol>) {
        match symbol {
            Some(symbol) => self.emit.push(symbol.segment(), symbol.index),
            None => self.emit.push(Segment::Const, 0),
        }
    }

    /// Pop the top of the stack into the variable, or discard it when
    /// the variable is unresolved.
    fn pop_var(&mut self, symbol: Option<&Symbol>) {
        match symbol {
            Some(symbol) => self.emit.pop(symbol.segment(), symbol.index),
            None => self.emit.pop(Segment::Temp, TEMP_SCRATCH),
        }
    }
}

/// Program structure.
impl<'a> Compiler<'a> {
    /// 'class' className '{' classVarDec* subroutineDec* '}'
    pub fn parse_class(&mut self) -> JackResult<()> {
        self.open(NT::Class);
        self.expect_one(TK::Keyword(KW::Class))?;
        let name = self.expect_one(TK::Ident)?;

        self.class_name = name.lexeme;
        self.symbols.start_class();
        debug!("compiling class {}", self.class_name);

        self.expect_one(TK::LeftBrace)?;

        while matches!(
            self.tokens.peek_kind(),
            TK::Keyword(KW::Static | KW::Field)
        ) {
            self.parse_class_var_dec()?;
        }

        while matches!(
            self.tokens.peek_kind(),
            TK::Keyword(KW::Constructor | KW::Function | KW::Method)
        ) {
            self.parse_subroutine_dec()?;
        }

        self.expect_one(TK::RightBrace)?;
        self.close(NT::Class);

        debug!(
            "compiled class {} into {} instructions",
            self.class_name,
            self.emit.code().len()
        );

        Ok(())
    }

    /// ('static' | 'field') type varName (',' varName)* ';'
    pub fn parse_class_var_dec(&mut self) -> JackResult<()> {
        self.open(NT::ClassVarDec);

        let kind = match self
            .expect(&[TK::Keyword(KW::Field), TK::Keyword(KW::Static)])?
            .kind
        {
            TK::Keyword(KW::Static) => SymbolKind::Static,
            _ => SymbolKind::Field,
        };
        self.parse_var_names(kind)?;

        self.close(NT::ClassVarDec);
        Ok(())
    }

    /// 'var' type varName (',' varName)* ';'
    fn parse_var_dec(&mut self) -> JackResult<()> {
        self.open(NT::VarDec);

        self.expect_one(TK::Keyword(KW::Var))?;
        self.parse_var_names(SymbolKind::Var)?;

        self.close(NT::VarDec);
        Ok(())
    }

    /// type varName (',' varName)* ';'
    fn parse_var_names(&mut self, kind: SymbolKind) -> JackResult<()> {
        let ty = self.expect(TYPE_KINDS)?.lexeme;

        loop {
            let name = self.expect_one(TK::Ident)?;
            self.define(&name, &ty, kind)?;

            if !self.accept(TK::Comma)? {
                break;
            }
        }

        self.expect_one(TK::Semicolon)?;
        Ok(())
    }

    /// ('constructor' | 'function' | 'method') ('void' | type) subroutineName
    /// '(' parameterList ')' subroutineBody
    pub fn parse_subroutine_dec(&mut self) -> JackResult<()> {
        self.open(NT::SubroutineDec);

        self.if_label = 0;
        self.while_label = 0;

        let kind = match self
            .expect(&[
                TK::Keyword(KW::Constructor),
                TK::Keyword(KW::Function),
                TK::Keyword(KW::Method),
            ])?
            .kind
        {
            TK::Keyword(KW::Constructor) => SubroutineKind::Constructor,
            TK::Keyword(KW::Method) => SubroutineKind::Method,
            _ => SubroutineKind::Function,
        };

        // Receiver goes in before the parameters, taking argument 0.
        match kind {
            SubroutineKind::Method => {
                let class_name = self.class_name.clone();
                self.symbols.start_subroutine(Some(class_name.as_str()));
            }
            SubroutineKind::Constructor | SubroutineKind::Function => {
                self.symbols.start_subroutine(None);
            }
        }

        self.expect(RETURN_TYPE_KINDS)?;
        let name = self.expect_one(TK::Ident)?;
        let function_name = qualified(&self.class_name, &name.lexeme);

        self.expect_one(TK::LeftParen)?;
        self.parse_parameter_list()?;
        self.expect_one(TK::RightParen)?;
        self.parse_subroutine_body(function_name, kind)?;

        self.close(NT::SubroutineDec);
        Ok(())
    }

    /// ((type varName) (',' type varName)*)?
    fn parse_parameter_list(&mut self) -> JackResult<()> {
        self.open(NT::ParameterList);

        if !self.tokens.peek_is(TK::RightParen) {
            loop {
                let ty = self.expect(TYPE_KINDS)?.lexeme;
                let name = self.expect_one(TK::Ident)?;
                self.define(&name, &ty, SymbolKind::Arg)?;

                if !self.accept(TK::Comma)? {
                    break;
                }
            }
        }

        self.close(NT::ParameterList);
        Ok(())
    }

    /// '{' varDec* statements '}'
    fn parse_subroutine_body(&mut self, name: SmolStr, kind: SubroutineKind) -> JackResult<()> {
        self.open(NT::SubroutineBody);
        self.expect_one(TK::LeftBrace)?;

        while self.tokens.peek_is(TK::Keyword(KW::Var)) {
            self.parse_var_dec()?;
        }

        // The VM needs the frame size up front.
        let n_locals = self.symbols.count_of(SymbolKind::Var);
        trace!("{kind:?} {name} with {n_locals} locals");
        self.emit.function(name, n_locals);

        match kind {
            SubroutineKind::Constructor => {
                let n_fields = self.symbols.count_of(SymbolKind::Field);
                self.emit.push(Segment::Const, n_fields);
                self.emit.call(MEMORY_ALLOC, 1);
                self.emit.pop(Segment::Pointer, POINTER_THIS);
            }
            SubroutineKind::Method => {
                self.emit.push(Segment::Argument, 0);
                self.emit.pop(Segment::Pointer, POINTER_THIS);
            }
            SubroutineKind::Function => {}
        }

        self.parse_statements()?;

        self.expect_one(TK::RightBrace)?;
        self.close(NT::SubroutineBody);
        Ok(())
    }
}

/// Statements.
impl<'a> Compiler<'a> {
    /// statement*
    pub fn parse_statements(&mut self) -> JackResult<()> {
        self.open(NT::Statements);

        while matches!(
            self.tokens.peek_kind(),
            TK::Keyword(KW::Let | KW::If | KW::While | KW::Do | KW::Return)
        ) {
            self.parse_statement()?;
        }

        self.close(NT::Statements);
        Ok(())
    }

    /// letStatement | ifStatement | whileStatement | doStatement | returnStatement
    pub fn parse_statement(&mut self) -> JackResult<()> {
        match self.tokens.peek_kind() {
            TK::Keyword(KW::Let) => self.parse_let(),
            TK::Keyword(KW::If) => self.parse_if(),
            TK::Keyword(KW::While) => self.parse_while(),
            TK::Keyword(KW::Do) => self.parse_do(),
            TK::Keyword(KW::Return) => self.parse_return(),
            _ => Err(self.unexpected("expected a statement")),
        }
    }

    /// 'let' varName ('[' expression ']')? '=' expression ';'
    pub fn parse_let(&mut self) -> JackResult<()> {
        self.open(NT::LetStatement);

        self.expect_one(TK::Keyword(KW::Let))?;
        let name = self.expect_one(TK::Ident)?;
        let target = self.resolve_var(&name);

        // The element address is computed before the right-hand side,
        // which may itself move `pointer 1`.
        let indexed = self.accept(TK::LeftBracket)?;
        if indexed {
            self.parse_expression()?;
            self.expect_one(TK::RightBracket)?;
            self.push_var(target.as_ref());
            self.emit.arithmetic(Command::Add);
        }

        self.expect_one(TK::Eq)?;
        self.parse_expression()?;
        self.expect_one(TK::Semicolon)?;

        if indexed {
            self.emit.pop(Segment::Temp, TEMP_SCRATCH);
            self.emit.pop(Segment::Pointer, POINTER_THAT);
            self.emit.push(Segment::Temp, TEMP_SCRATCH);
            self.emit.pop(Segment::That, 0);
        } else {
            self.pop_var(target.as_ref());
        }

        self.close(NT::LetStatement);
        Ok(())
    }

    /// 'if' '(' expression ')' '{' statements '}' ('else' '{' statements '}')?
    pub fn parse_if(&mut self) -> JackResult<()> {
        self.open(NT::IfStatement);

        self.expect_one(TK::Keyword(KW::If))?;

        let id = self.if_label;
        self.if_label += 1;
        let label_true = format!("{IF_TRUE}{id}");
        let label_false = format!("{IF_FALSE}{id}");
        let label_end = format!("{IF_END}{id}");

        self.expect_one(TK::LeftParen)?;
        self.parse_expression()?;
        self.expect_one(TK::RightParen)?;

        self.emit.if_goto(label_true.as_str());
        self.emit.goto(label_false.as_str());
        self.emit.label(label_true);

        self.expect_one(TK::LeftBrace)?;
        self.parse_statements()?;
        self.expect_one(TK::RightBrace)?;

        if self.accept(TK::Keyword(KW::Else))? {
            self.emit.goto(label_end.as_str());
            self.emit.label(label_false);

            self.expect_one(TK::LeftBrace)?;
            self.parse_statements()?;
            self.expect_one(TK::RightBrace)?;

            self.emit.label(label_end);
        } else {
            self.emit.label(label_false);
        }

        self.close(NT::IfStatement);
        Ok(())
    }

    /// 'while' '(' expression ')' '{' statements '}'
    pub fn parse_while(&mut self) -> JackResult<()> {
        self.open(NT::WhileStatement);

        self.expect_one(TK::Keyword(KW::While))?;

        let id = self.while_label;
        self.while_label += 1;
        let label_exp = format!("{WHILE_EXP}{id}");
        let label_end = format!("{WHILE_END}{id}");

        self.emit.label(label_exp.as_str());

        self.expect_one(TK::LeftParen)?;
        self.parse_expression()?;
        self.expect_one(TK::RightParen)?;

        self.emit.arithmetic(Command::Not);
        self.emit.if_goto(label_end.as_str());

        self.expect_one(TK::LeftBrace)?;
        self.parse_statements()?;
        self.expect_one(TK::RightBrace)?;

        self.emit.goto(label_exp);
        self.emit.label(label_end);

        self.close(NT::WhileStatement);
        Ok(())
    }

    /// 'do' subroutineCall ';'
    pub fn parse_do(&mut self) -> JackResult<()> {
        self.open(NT::DoStatement);

        self.expect_one(TK::Keyword(KW::Do))?;
        let ident = self.expect_one(TK::Ident)?;
        self.parse_subroutine_call(ident)?;
        self.expect_one(TK::Semicolon)?;

        // Every subroutine returns something.
        self.emit.pop(Segment::Temp, TEMP_SCRATCH);

        self.close(NT::DoStatement);
        Ok(())
    }

    /// 'return' expression? ';'
    pub fn parse_return(&mut self) -> JackResult<()> {
        self.open(NT::ReturnStatement);

        self.expect_one(TK::Keyword(KW::Return))?;
        if self.tokens.peek_is(TK::Semicolon) {
            self.emit.push(Segment::Const, 0);
        } else {
            self.parse_expression()?;
        }
        self.expect_one(TK::Semicolon)?;

        self.emit.ret();

        self.close(NT::ReturnStatement);
        Ok(())
    }
}

/// Expressions.
impl<'a> Compiler<'a> {
    /// term (op term)*
    ///
    /// Operators have no precedence, they're applied left to right.
    pub fn parse_expression(&mut self) -> JackResult<()> {
        self.open(NT::Expression);

        self.parse_term()?;
        loop {
            let kind = self.tokens.peek_kind();
            let op = match binary_op(kind) {
                Some(op) => op,
                None => break,
            };

            self.expect_one(kind)?;
            self.parse_term()?;

            match op {
                BinaryOp::Arithmetic(command) => self.emit.arithmetic(command),
                BinaryOp::Call(name) => self.emit.call(name, 2),
            }
        }

        self.close(NT::Expression);
        Ok(())
    }

    /// integerConstant | stringConstant | keywordConstant | varName
    /// | varName '[' expression ']' | subroutineCall | '(' expression ')'
    /// | unaryOp term
    pub fn parse_term(&mut self) -> JackResult<()> {
        self.open(NT::Term);

        match self.tokens.peek_kind() {
            TK::Number => {
                let token = self.expect_one(TK::Number)?;
                let value = self.int_constant(&token)?;
                self.emit.push(Segment::Const, value);
            }
            TK::String => {
                let token = self.expect_one(TK::String)?;
                self.emit_string(&token)?;
            }
            TK::Keyword(KW::True) => {
                self.expect_one(TK::Keyword(KW::True))?;
                // All bits set.
                self.emit.push(Segment::Const, 0);
                self.emit.arithmetic(Command::Not);
            }
            TK::Keyword(KW::False | KW::Null) => {
                self.expect(&[TK::Keyword(KW::False), TK::Keyword(KW::Null)])?;
                self.emit.push(Segment::Const, 0);
            }
            TK::Keyword(KW::This) => {
                self.expect_one(TK::Keyword(KW::This))?;
                self.emit.push(Segment::Pointer, POINTER_THIS);
            }
            TK::Ident => {
                let ident = self.expect_one(TK::Ident)?;
                match self.tokens.peek_kind() {
                    TK::LeftParen | TK::Dot => self.parse_subroutine_call(ident)?,
                    TK::LeftBracket => {
                        let array = self.resolve_var(&ident);

                        self.expect_one(TK::LeftBracket)?;
                        self.parse_expression()?;
                        self.expect_one(TK::RightBracket)?;

                        self.push_var(array.as_ref());
                        self.emit.arithmetic(Command::Add);
                        self.emit.pop(Segment::Pointer, POINTER_THAT);
                        self.emit.push(Segment::That, 0);
                    }
                    _ => {
                        let symbol = self.resolve_var(&ident);
                        self.push_var(symbol.as_ref());
                    }
                }
            }
            TK::LeftParen => {
                self.expect_one(TK::LeftParen)?;
                self.parse_expression()?;
                self.expect_one(TK::RightParen)?;
            }
            TK::Minus | TK::Tilde => {
                let op = self.expect(&[TK::Minus, TK::Tilde])?;
                self.parse_term()?;
                match op.kind {
                    TK::Minus => self.emit.arithmetic(Command::Neg),
                    _ => self.emit.arithmetic(Command::Not),
                }
            }
            _ => return Err(self.unexpected("expected a term")),
        }

        self.close(NT::Term);
        Ok(())
    }

    /// subroutineName '(' expressionList ')'
    /// | (className | varName) '.' subroutineName '(' expressionList ')'
    ///
    /// The leading identifier has already been consumed by the caller.
    fn parse_subroutine_call(&mut self, ident: Token) -> JackResult<()> {
        let separator = self.expect(&[TK::LeftParen, TK::Dot])?;

        // Number of implicit receiver arguments.
        let (function_name, receiver) = match separator.kind {
            TK::LeftParen => {
                // Method on the current object.
                self.emit.push(Segment::Pointer, POINTER_THIS);
                (qualified(&self.class_name, &ident.lexeme), 1)
            }
            _ => {
                let member = self.expect_one(TK::Ident)?;
                self.expect_one(TK::LeftParen)?;

                match self.symbols.resolve(&ident.lexeme) {
                    // Method on an object variable.
                    Some(symbol) => {
                        self.emit.push(symbol.segment(), symbol.index);
                        (qualified(&symbol.ty, &member.lexeme), 1)
                    }
                    // Function or constructor of another class.
                    None => (qualified(&ident.lexeme, &member.lexeme), 0),
                }
            }
        };

        let n_args = self.parse_expression_list()?;
        self.expect_one(TK::RightParen)?;

        self.emit.call(function_name, receiver + n_args);
        Ok(())
    }

    /// (expression (',' expression)*)?
    pub fn parse_expression_list(&mut self) -> JackResult<u16> {
        self.open(NT::ExpressionList);

        let mut count = 0;
        if !self.tokens.peek_is(TK::RightParen) {
            self.parse_expression()?;
            count += 1;

            while self.accept(TK::Comma)? {
                self.parse_expression()?;
                count += 1;
            }
        }

        self.close(NT::ExpressionList);
        Ok(count)
    }

    fn int_constant(&self, token: &Token) -> JackResult<u16> {
        token
            .lexeme
            .parse::<u16>()
            .ok()
            .filter(|value| *value <= MAX_INT)
            .ok_or_else(|| {
                self.tokens
                    .error(token, format!("integer constant must be in range 0..={MAX_INT}"))
            })
    }

    /// Build the string at runtime, one character at a time.
    fn emit_string(&mut self, token: &Token) -> JackResult<()> {
        let chars = token
            .lexeme
            .chars()
            .map(|c| u16::try_from(u32::from(c)).ok().filter(|code| *code <= MAX_INT))
            .collect::<Option<Vec<u16>>>()
            .filter(|chars| chars.len() <= MAX_INT as usize)
            .ok_or_else(|| self.tokens.error(token, "unsupported string constant"))?;

        self.emit.push(Segment::Const, chars.len() as u16);
        self.emit.call(STRING_NEW, 1);

        for code in chars {
            self.emit.push(Segment::Const, code);
            self.emit.call(STRING_APPEND_CHAR, 2);
        }

        Ok(())
    }
}
