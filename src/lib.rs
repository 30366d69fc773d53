pub mod ast;
#[cfg(feature = "cli")]
pub mod cli;
pub mod evaluator;
pub mod lexer;
pub mod output;
pub mod parser;
pub mod template;
pub mod value;

pub use ast::{BinOp, Expr, Segment, Token, TokenKind};
pub use evaluator::{EvalError, Evaluator, Variables};
pub use lexer::{LexError, Lexer, Position};
pub use output::{json_to_value, to_json, to_json_pretty, value_to_json};
pub use parser::{ParseError, Parser, ParserConfig};
pub use template::parse_template;
pub use value::Value;
