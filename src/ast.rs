//! # Abstract Syntax Tree
//!
//! The AST for the sorrel expression language: a closed set of node kinds
//! built once by the parser and walked by the evaluator.
//!
//! ## Architecture Overview
//!
//! The AST module is organized into focused submodules:
//!
//! - **[tokens]** - Lexical tokens produced by the lexer
//! - **[expressions]** - Expression nodes (literals, references, operations,
//!   access chains, literals, interpolation templates)
//! - **[operators]** - Binary operators with their precedence table
//!
//! ## Quick Start
//!
//! ```
//! use sorrel_lang::{Parser, Value, Variables};
//!
//! let expr = Parser::new("price * 2").parse().unwrap();
//! let mut vars = Variables::new();
//! vars.insert("price".to_string(), Value::Integer(21));
//! assert_eq!(expr.evaluate(Some(&mut vars)).unwrap(), Value::Integer(42));
//! ```
//!
//! ## Core Concepts
//!
//! ### Precedence
//!
//! Lowest to highest binding: assignment, `||`, `&&`, `in`, the equality
//! family (`== != === !==`), the relational family (`< <= >= >`), additive
//! (`+ -`), multiplicative (`* /`). Every level is strictly
//! left-associative. Unary `!`, unary minus (folded into numeric literals),
//! grouping, and array/object literals belong to the operand grammar, as do
//! postfix `.member` and `[index]` chains.
//!
//! ### References
//!
//! Bare names (`user`) and `$`-variables (`$user`) read the same
//! caller-supplied environment; either form can be disabled via
//! [`ParserConfig`](crate::parser::ParserConfig). A missing key reads null,
//! never an error. Assignment (`x = expr`) writes through to the
//! environment and yields the assigned value.
//!
//! ### Interpolation
//!
//! `${expr}` holes inside literal text are parsed by
//! [`parse_template`](crate::template::parse_template) into an
//! [`Expr::Template`] whose evaluation concatenates text and rendered hole
//! values.

pub mod expressions;
pub mod operators;
pub mod tokens;

pub use expressions::{Expr, Segment};
pub use operators::BinOp;
pub use tokens::{Token, TokenKind};
