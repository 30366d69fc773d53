use std::fmt;
use std::mem;

use crate::ast::{BinOp, Expr, Token, TokenKind};
use crate::lexer::{Checkpoint, LexError, Lexer, Position};
use crate::value::Value;

/// Feature flags controlling which reference forms the parser accepts.
///
/// Member names after `.` and bare-name object keys are not references and
/// are always accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParserConfig {
    /// Accept bare identifiers (`user`) as variable references.
    pub allow_names: bool,
    /// Accept `$`-prefixed identifiers (`$user`) as variable references.
    pub allow_variables: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        ParserConfig {
            allow_names: true,
            allow_variables: true,
        }
    }
}

/// Errors produced while parsing.
///
/// Every syntax error carries the 1-based (line, column) of the offending
/// token; end-of-input errors report the stream-end position.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseError {
    /// Tokenization failure
    Lex(LexError),

    /// A token that does not fit the grammar at this point
    Unexpected {
        expected: &'static str,
        found: String,
        position: Position,
    },

    /// Assignment to something other than a name or `$`-variable
    InvalidAssignTarget { position: Position },

    /// A bare-name reference while [`ParserConfig::allow_names`] is off
    NameNotAllowed { name: String, position: Position },

    /// A `$`-variable reference while [`ParserConfig::allow_variables`] is off
    VariableNotAllowed { name: String, position: Position },

    /// A second `rewind` without an intervening read
    DoubleRewind,

    /// A missing or invalid `${...}` hole, located at its opening `${`
    Interpolation { message: String, position: Position },
}

impl ParseError {
    /// The source position of the error, when it has one.
    pub fn position(&self) -> Option<Position> {
        match self {
            ParseError::Lex(e) => Some(e.position()),
            ParseError::Unexpected { position, .. }
            | ParseError::InvalidAssignTarget { position }
            | ParseError::NameNotAllowed { position, .. }
            | ParseError::VariableNotAllowed { position, .. }
            | ParseError::Interpolation { position, .. } => Some(*position),
            ParseError::DoubleRewind => None,
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::Lex(e) => write!(f, "{}", e),
            ParseError::Unexpected {
                expected,
                found,
                position,
            } => write!(
                f,
                "Syntax error at {}: expected {}, found {}",
                position, expected, found
            ),
            ParseError::InvalidAssignTarget { position } => write!(
                f,
                "Invalid assignment target at {}: only names and $variables can be assigned",
                position
            ),
            ParseError::NameNotAllowed { name, position } => write!(
                f,
                "Bare name references are disabled: '{}' at {}",
                name, position
            ),
            ParseError::VariableNotAllowed { name, position } => write!(
                f,
                "Variable references are disabled: '{}' at {}",
                name, position
            ),
            ParseError::DoubleRewind => {
                write!(f, "rewind() called twice without an intervening read")
            }
            ParseError::Interpolation { message, position } => {
                write!(f, "Invalid interpolation at {}: {}", position, message)
            }
        }
    }
}

impl std::error::Error for ParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ParseError::Lex(e) => Some(e),
            _ => None,
        }
    }
}

impl From<LexError> for ParseError {
    fn from(e: LexError) -> Self {
        ParseError::Lex(e)
    }
}

/// At most one pending rewind; armed by a top-level read, spent by
/// [`Parser::rewind`].
enum RewindState {
    Clean,
    Armed(Checkpoint),
}

/// Precedence-climbing parser over a [`Lexer`].
///
/// Reads one operand, then (operator, operand) pairs into a flat sequence
/// until a token cannot continue the expression (it is pushed back for an
/// enclosing grammar), then folds the sequence into a tree by repeatedly
/// splitting at the lowest-binding operator present. Every level is strictly
/// left-associative.
///
/// A parser instance is not reentrant; use one per logical parse.
///
/// # Examples
///
/// ```
/// use sorrel_lang::{Parser, Value};
///
/// let expr = Parser::new("1 + 2 * 3").parse().unwrap();
/// assert_eq!(expr.evaluate(None).unwrap(), Value::Integer(7));
/// ```
pub struct Parser {
    lexer: Lexer,
    config: ParserConfig,
    rewind: RewindState,
}

impl Parser {
    pub fn new(input: &str) -> Self {
        Parser::with_config(input, ParserConfig::default())
    }

    pub fn with_config(input: &str, config: ParserConfig) -> Self {
        Parser::from_lexer(Lexer::new(input), config)
    }

    /// Build on an existing lexer, e.g. one positioned inside surrounding
    /// text.
    pub fn from_lexer(lexer: Lexer, config: ParserConfig) -> Self {
        Parser {
            lexer,
            config,
            rewind: RewindState::Clean,
        }
    }

    /// Parse exactly one expression followed by end of input.
    pub fn parse(&mut self) -> Result<Expr, ParseError> {
        let expr = self.parse_expression()?;
        self.expect(TokenKind::Eof, "end of input")?;
        Ok(expr)
    }

    /// Parse one expression, leaving the stream at the first token that
    /// cannot continue it.
    ///
    /// Repeatable, so a sequence of expressions embedded in surrounding text
    /// can be read off one stream. Each call re-arms the one-shot
    /// [`rewind`](Parser::rewind).
    pub fn parse_expression(&mut self) -> Result<Expr, ParseError> {
        self.rewind = RewindState::Armed(self.lexer.checkpoint());
        self.read_expression()
    }

    /// Restore the cursor to the position immediately before the last
    /// top-level read.
    ///
    /// Available exactly once per read, whether the read succeeded or
    /// failed; a second consecutive call is an error. This is what lets a
    /// caller speculatively try the expression grammar and fall back to
    /// another grammar without consuming input.
    pub fn rewind(&mut self) -> Result<(), ParseError> {
        match mem::replace(&mut self.rewind, RewindState::Clean) {
            RewindState::Armed(checkpoint) => {
                self.lexer.restore(checkpoint);
                Ok(())
            }
            RewindState::Clean => Err(ParseError::DoubleRewind),
        }
    }

    /// Chars consumed from the input, pushback-aware. Lets an embedding
    /// grammar (string interpolation) resume scanning after a hole.
    pub(crate) fn consumed(&self) -> usize {
        self.lexer.consumed()
    }

    fn next_token(&mut self) -> Result<Token, ParseError> {
        Ok(self.lexer.next_token()?)
    }

    /// Peek at the next token's kind without consuming it.
    fn check(&mut self, kind: TokenKind) -> Result<bool, ParseError> {
        let token = self.next_token()?;
        let matched = token.kind == kind;
        self.lexer.push_back(token);
        Ok(matched)
    }

    pub(crate) fn expect(
        &mut self,
        kind: TokenKind,
        expected: &'static str,
    ) -> Result<Token, ParseError> {
        let token = self.next_token()?;
        if token.kind == kind {
            Ok(token)
        } else {
            Err(ParseError::Unexpected {
                expected,
                found: token.describe(),
                position: token.position,
            })
        }
    }

    fn read_expression(&mut self) -> Result<Expr, ParseError> {
        let mut operands = vec![self.parse_operand()?];
        let mut operators: Vec<Token> = Vec::new();
        loop {
            let token = self.next_token()?;
            if token.kind == TokenKind::Assign || binop_for(token.kind).is_some() {
                operators.push(token);
                operands.push(self.parse_operand()?);
            } else {
                // Not ours; leave it for the enclosing grammar.
                self.lexer.push_back(token);
                break;
            }
        }
        fold(operands, operators)
    }

    /// One operand plus its postfix `.member` / `[index]` chain.
    fn parse_operand(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.parse_primary()?;
        loop {
            let token = self.next_token()?;
            match token.kind {
                TokenKind::Dot => {
                    let member = self.parse_member()?;
                    expr = Expr::Dot {
                        object: Box::new(expr),
                        member: Box::new(member),
                    };
                }
                TokenKind::LBracket => {
                    let index = self.read_expression()?;
                    self.expect(TokenKind::RBracket, "']'")?;
                    expr = Expr::Index {
                        object: Box::new(expr),
                        index: Box::new(index),
                    };
                }
                _ => {
                    self.lexer.push_back(token);
                    break;
                }
            }
        }
        Ok(expr)
    }

    fn parse_member(&mut self) -> Result<Expr, ParseError> {
        let token = self.next_token()?;
        if token.kind == TokenKind::Name {
            // A bare name after '.' is the member name itself, not a
            // reference; config gating does not apply.
            Ok(Expr::Name(token.text))
        } else {
            self.lexer.push_back(token);
            self.parse_primary()
        }
    }

    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        let token = self.next_token()?;
        match token.kind {
            TokenKind::String | TokenKind::Number | TokenKind::Boolean | TokenKind::Null => {
                Ok(Expr::Literal(
                    token.value.expect("literal token carries a value"),
                ))
            }
            TokenKind::Name => {
                if !self.config.allow_names {
                    return Err(ParseError::NameNotAllowed {
                        name: token.text,
                        position: token.position,
                    });
                }
                Ok(Expr::Name(token.text))
            }
            TokenKind::Variable => {
                if !self.config.allow_variables {
                    return Err(ParseError::VariableNotAllowed {
                        name: token.text,
                        position: token.position,
                    });
                }
                Ok(Expr::Variable(token.text[1..].to_string()))
            }
            TokenKind::Not => Ok(Expr::Not(Box::new(self.parse_operand()?))),
            TokenKind::Minus => {
                // Unary minus folds into the adjacent numeric literal at
                // parse time; there is no runtime negation node.
                let number = self.expect(TokenKind::Number, "a number")?;
                Ok(Expr::Literal(negate_number(
                    number.value.expect("number token carries a value"),
                )))
            }
            TokenKind::LParen => {
                let inner = self.read_expression()?;
                self.expect(TokenKind::RParen, "')'")?;
                Ok(Expr::Group(Box::new(inner)))
            }
            TokenKind::LBracket => self.parse_array_literal(),
            TokenKind::LBrace => self.parse_object_literal(),
            _ => Err(ParseError::Unexpected {
                expected: "an expression",
                found: token.describe(),
                position: token.position,
            }),
        }
    }

    fn parse_array_literal(&mut self) -> Result<Expr, ParseError> {
        let mut elements = vec![];

        while !self.check(TokenKind::RBracket)? {
            elements.push(self.read_expression()?);

            if !self.check(TokenKind::RBracket)? {
                self.expect(TokenKind::Comma, "',' or ']'")?;
            }
        }

        self.expect(TokenKind::RBracket, "']'")?;
        Ok(Expr::Array(elements))
    }

    fn parse_object_literal(&mut self) -> Result<Expr, ParseError> {
        let mut pairs = vec![];

        while !self.check(TokenKind::RBrace)? {
            let key = self.parse_object_key()?;
            self.expect(TokenKind::Colon, "':'")?;
            let value = self.read_expression()?;
            pairs.push((key, value));

            if !self.check(TokenKind::RBrace)? {
                self.expect(TokenKind::Comma, "',' or '}'")?;
            }
        }

        self.expect(TokenKind::RBrace, "'}'")?;
        Ok(Expr::Object(pairs))
    }

    fn parse_object_key(&mut self) -> Result<Expr, ParseError> {
        let token = self.next_token()?;
        if token.kind == TokenKind::Name {
            // Bare-name keys are literal member names, not lookups.
            Ok(Expr::Name(token.text))
        } else {
            self.lexer.push_back(token);
            self.read_expression()
        }
    }
}

/// Fold a flat operand/operator sequence into a tree: split at the
/// rightmost operator of the lowest precedence level present and recurse
/// into both halves.
fn fold(mut operands: Vec<Expr>, mut operators: Vec<Token>) -> Result<Expr, ParseError> {
    if operators.is_empty() {
        debug_assert_eq!(operands.len(), 1);
        return Ok(operands.pop().expect("one operand per fold step"));
    }

    let mut split = 0;
    let mut lowest = u8::MAX;
    for (i, token) in operators.iter().enumerate() {
        let p = precedence_of(token.kind);
        if p <= lowest {
            lowest = p;
            split = i;
        }
    }

    let right_operands = operands.split_off(split + 1);
    let right_operators = operators.split_off(split + 1);
    let op_token = operators.pop().expect("operator at the split point");

    let left = fold(operands, operators)?;
    let right = fold(right_operands, right_operators)?;

    match op_token.kind {
        TokenKind::Assign => match left {
            Expr::Name(_) | Expr::Variable(_) => Ok(Expr::Assign {
                target: Box::new(left),
                value: Box::new(right),
            }),
            _ => Err(ParseError::InvalidAssignTarget {
                position: op_token.position,
            }),
        },
        kind => {
            let op = binop_for(kind).expect("operator token in fold table");
            Ok(Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            })
        }
    }
}

fn binop_for(kind: TokenKind) -> Option<BinOp> {
    match kind {
        TokenKind::Or => Some(BinOp::Or),
        TokenKind::And => Some(BinOp::And),
        TokenKind::In => Some(BinOp::In),
        TokenKind::Eq => Some(BinOp::Eq),
        TokenKind::Ne => Some(BinOp::Ne),
        TokenKind::StrictEq => Some(BinOp::StrictEq),
        TokenKind::StrictNe => Some(BinOp::StrictNe),
        TokenKind::Lt => Some(BinOp::Lt),
        TokenKind::Le => Some(BinOp::Le),
        TokenKind::Gt => Some(BinOp::Gt),
        TokenKind::Ge => Some(BinOp::Ge),
        TokenKind::Plus => Some(BinOp::Add),
        TokenKind::Minus => Some(BinOp::Subtract),
        TokenKind::Star => Some(BinOp::Multiply),
        TokenKind::Slash => Some(BinOp::Divide),
        _ => None,
    }
}

fn precedence_of(kind: TokenKind) -> u8 {
    match kind {
        TokenKind::Assign => 0,
        kind => binop_for(kind)
            .expect("operator token in fold table")
            .precedence(),
    }
}

fn negate_number(value: Value) -> Value {
    match value {
        Value::Integer(n) => Value::normalize_long(-(n as i64)),
        Value::Long(n) => match n.checked_neg() {
            Some(m) => Value::normalize_long(m),
            None => Value::Float(-(n as f64)),
        },
        Value::Float(n) => Value::Float(-n),
        _ => unreachable!("number tokens are numeric"),
    }
}
