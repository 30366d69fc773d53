//! String interpolation: literal text with `${expr}` holes.
//!
//! The template grammar is not token-based. Raw text is scanned left to
//! right; `\` escapes the next character with the same table string literals
//! use, and `$` opens a hole only when immediately followed by `{`. Each
//! hole is handed to an embedded [`Parser`] which must produce exactly one
//! expression followed by `}`.
//!
//! # Examples
//!
//! ```
//! use sorrel_lang::{parse_template, Value, Variables};
//!
//! let template = parse_template("Hello ${name}!").unwrap();
//! let mut vars = Variables::new();
//! vars.insert("name".to_string(), Value::String("World".to_string()));
//! assert_eq!(
//!     template.evaluate(Some(&mut vars)).unwrap(),
//!     Value::String("Hello World!".to_string())
//! );
//! ```

use crate::ast::{Expr, Segment, TokenKind};
use crate::lexer::{Lexer, LexError, Position, unescape};
use crate::parser::{ParseError, Parser, ParserConfig};

/// Parse interpolated text into an [`Expr::Template`].
pub fn parse_template(input: &str) -> Result<Expr, ParseError> {
    parse_template_with_config(input, ParserConfig::default())
}

/// Parse interpolated text, with the given config applied to every hole.
pub fn parse_template_with_config(
    input: &str,
    config: ParserConfig,
) -> Result<Expr, ParseError> {
    let chars: Vec<char> = input.chars().collect();
    let mut segments: Vec<Segment> = Vec::new();
    let mut text = String::new();
    let mut position = Position::start();
    let mut i = 0;

    while i < chars.len() {
        match chars[i] {
            '\\' => match chars.get(i + 1) {
                Some(&escaped) => {
                    text.push(unescape(escaped));
                    step(&mut position, '\\');
                    step(&mut position, escaped);
                    i += 2;
                }
                // A trailing lone backslash escapes nothing.
                None => {
                    return Err(ParseError::Lex(LexError::UnexpectedChar {
                        ch: '\\',
                        position,
                    }));
                }
            },
            '$' if chars.get(i + 1) == Some(&'{') => {
                let hole = position;
                step(&mut position, '$');
                step(&mut position, '{');
                i += 2;

                if !text.is_empty() {
                    segments.push(Segment::Text(std::mem::take(&mut text)));
                }

                let rest: String = chars[i..].iter().collect();
                let mut parser = Parser::from_lexer(Lexer::with_start(&rest, position), config);
                let expr = parser
                    .parse_expression()
                    .map_err(|e| at_hole(hole, e))?;
                parser
                    .expect(TokenKind::RBrace, "'}'")
                    .map_err(|e| at_hole(hole, e))?;

                let consumed = parser.consumed();
                for &ch in &chars[i..i + consumed] {
                    step(&mut position, ch);
                }
                i += consumed;

                segments.push(Segment::Hole(expr));
            }
            ch => {
                // '$' not followed by '{' is literal.
                text.push(ch);
                step(&mut position, ch);
                i += 1;
            }
        }
    }

    if !text.is_empty() {
        segments.push(Segment::Text(text));
    }
    Ok(Expr::Template(segments))
}

/// Relocate a hole's parse failure to the opening `${`.
fn at_hole(position: Position, inner: ParseError) -> ParseError {
    ParseError::Interpolation {
        message: inner.to_string(),
        position,
    }
}

fn step(position: &mut Position, ch: char) {
    position.offset += 1;
    if ch == '\n' {
        position.line += 1;
        position.column = 1;
    } else {
        position.column += 1;
    }
}
