use std::collections::BTreeSet;
use std::fmt;

use crate::ast::BinOp;
use crate::evaluator::{EvalError, Evaluator, Variables};
use crate::value::Value;

/// Abstract Syntax Tree node representing a parsed expression.
///
/// The variant set is closed: every construct of the language is one of
/// these. Each node owns its children outright; trees are built once by the
/// parser and never mutated afterwards except through [`Expr::replace_child`].
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A literal value: string, number, boolean, or null.
    ///
    /// Unary minus is folded into the adjacent numeric literal at parse time,
    /// so `-3` is `Literal(Integer(-3))`, not a runtime negation.
    Literal(Value),

    /// Bare identifier, resolved against the variable environment.
    ///
    /// A missing key, or an absent environment, evaluates to null.
    Name(String),

    /// `$`-prefixed identifier, resolved exactly like [`Expr::Name`].
    ///
    /// The stored name has no `$`; `$user` and `user` read the same
    /// environment key.
    Variable(String),

    /// Logical negation (`!expr`)
    Not(Box<Expr>),

    /// Binary operation (arithmetic, comparison, logical, membership)
    Binary {
        op: BinOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },

    /// Member access (`expr.name`)
    ///
    /// A bare-name member is the member name itself, not a lookup; any other
    /// member expression is evaluated and coerced to a key.
    ///
    /// ```text
    /// user.address
    /// user.("addr" + "ess")
    /// ```
    Dot {
        object: Box<Expr>,
        member: Box<Expr>,
    },

    /// Index access (`expr[index]`) on strings, arrays, and objects
    Index {
        object: Box<Expr>,
        index: Box<Expr>,
    },

    /// Assignment (`target = value`)
    ///
    /// The target is a [`Expr::Name`] or [`Expr::Variable`]; the parser
    /// rejects anything else. Evaluates to the assigned value.
    Assign {
        target: Box<Expr>,
        value: Box<Expr>,
    },

    /// Array literal
    ///
    /// ```text
    /// [1, "two", x]
    /// ```
    Array(Vec<Expr>),

    /// Object literal, pairs in source order
    ///
    /// Bare-name keys are literal member names; other key expressions are
    /// evaluated and coerced to strings. Later duplicates overwrite earlier
    /// ones, insertion order is otherwise preserved.
    ///
    /// ```text
    /// {name: "Ada", "year of birth": 1815}
    /// ```
    Object(Vec<(Expr, Expr)>),

    /// Parenthesized expression
    ///
    /// Transparent to evaluation, but kept as a node so rendering reproduces
    /// the parentheses.
    Group(Box<Expr>),

    /// String interpolation: literal text with `${expr}` holes
    ///
    /// Produced by [`parse_template`](crate::template::parse_template), never
    /// by the plain expression grammar.
    Template(Vec<Segment>),
}

/// One piece of a [`Expr::Template`]: literal text or an embedded expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    Text(String),
    Hole(Expr),
}

impl Expr {
    /// Evaluate against a variable environment.
    ///
    /// `None` is a legal environment: every reference reads null and
    /// assignments are dropped.
    ///
    /// # Examples
    ///
    /// ```
    /// use sorrel_lang::{Parser, Value, Variables};
    ///
    /// let expr = Parser::new("x + 1").parse().unwrap();
    /// let mut vars = Variables::new();
    /// vars.insert("x".to_string(), Value::Integer(41));
    /// assert_eq!(expr.evaluate(Some(&mut vars)).unwrap(), Value::Integer(42));
    /// ```
    pub fn evaluate(&self, variables: Option<&mut Variables>) -> Result<Value, EvalError> {
        Evaluator::new(variables).eval(self)
    }

    /// Direct children, left to right. Object literals contribute key and
    /// value alternately; templates contribute their hole expressions.
    pub fn children(&self) -> Vec<&Expr> {
        match self {
            Expr::Literal(_) | Expr::Name(_) | Expr::Variable(_) => vec![],
            Expr::Not(e) | Expr::Group(e) => vec![e.as_ref()],
            Expr::Binary { left, right, .. } => vec![left.as_ref(), right.as_ref()],
            Expr::Dot { object, member } => vec![object.as_ref(), member.as_ref()],
            Expr::Index { object, index } => vec![object.as_ref(), index.as_ref()],
            Expr::Assign { target, value } => vec![target.as_ref(), value.as_ref()],
            Expr::Array(items) => items.iter().collect(),
            Expr::Object(pairs) => pairs.iter().flat_map(|(k, v)| [k, v]).collect(),
            Expr::Template(segments) => segments
                .iter()
                .filter_map(|s| match s {
                    Segment::Hole(e) => Some(e),
                    Segment::Text(_) => None,
                })
                .collect(),
        }
    }

    fn children_mut(&mut self) -> Vec<&mut Expr> {
        match self {
            Expr::Literal(_) | Expr::Name(_) | Expr::Variable(_) => vec![],
            Expr::Not(e) | Expr::Group(e) => vec![e.as_mut()],
            Expr::Binary { left, right, .. } => vec![left.as_mut(), right.as_mut()],
            Expr::Dot { object, member } => vec![object.as_mut(), member.as_mut()],
            Expr::Index { object, index } => vec![object.as_mut(), index.as_mut()],
            Expr::Assign { target, value } => vec![target.as_mut(), value.as_mut()],
            Expr::Array(items) => items.iter_mut().collect(),
            Expr::Object(pairs) => pairs.iter_mut().flat_map(|(k, v)| [k, v]).collect(),
            Expr::Template(segments) => segments
                .iter_mut()
                .filter_map(|s| match s {
                    Segment::Hole(e) => Some(e),
                    Segment::Text(_) => None,
                })
                .collect(),
        }
    }

    /// Overwrite the child at a [`children`](Expr::children) index in place.
    ///
    /// # Panics
    ///
    /// Panics when `index` is out of range; that is a caller bug, not an
    /// input error.
    pub fn replace_child(&mut self, index: usize, new: Expr) {
        match self.children_mut().into_iter().nth(index) {
            Some(slot) => *slot = new,
            None => panic!("child index {} out of range", index),
        }
    }

    /// All nodes of the subtree in pre-order, starting with `self`.
    pub fn descendants(&self) -> Vec<&Expr> {
        let mut out = Vec::new();
        self.walk(&mut out);
        out
    }

    fn walk<'a>(&'a self, out: &mut Vec<&'a Expr>) {
        out.push(self);
        for child in self.children() {
            child.walk(out);
        }
    }

    /// The free variables this expression reads or writes.
    ///
    /// Bare-name object keys and bare-name `.member` accesses are member
    /// names, not lookups, and are excluded. Assignment targets count.
    pub fn variable_names(&self) -> BTreeSet<String> {
        let mut names = BTreeSet::new();
        self.collect_variable_names(&mut names);
        names
    }

    fn collect_variable_names(&self, names: &mut BTreeSet<String>) {
        match self {
            Expr::Name(n) | Expr::Variable(n) => {
                names.insert(n.clone());
            }
            Expr::Dot { object, member } => {
                object.collect_variable_names(names);
                if !matches!(member.as_ref(), Expr::Name(_)) {
                    member.collect_variable_names(names);
                }
            }
            Expr::Object(pairs) => {
                for (key, value) in pairs {
                    if !matches!(key, Expr::Name(_)) {
                        key.collect_variable_names(names);
                    }
                    value.collect_variable_names(names);
                }
            }
            _ => {
                for child in self.children() {
                    child.collect_variable_names(names);
                }
            }
        }
    }

    /// Render as re-parseable source.
    ///
    /// Unlike the `Display` rendering, string literals and template text are
    /// re-escaped, so `parse(expr.to_code())` reproduces the tree. No
    /// parentheses are invented; [`Expr::Group`] nodes carry their own.
    pub fn to_code(&self) -> String {
        let mut out = String::new();
        self.render(&mut out, true);
        out
    }

    fn render(&self, out: &mut String, code: bool) {
        match self {
            Expr::Literal(Value::String(s)) => {
                out.push('"');
                if code {
                    escape_string_literal(s, out);
                } else {
                    out.push_str(s);
                }
                out.push('"');
            }
            Expr::Literal(v) => out.push_str(&v.as_string()),
            Expr::Name(n) => out.push_str(n),
            Expr::Variable(n) => {
                out.push('$');
                out.push_str(n);
            }
            Expr::Not(e) => {
                out.push('!');
                e.render(out, code);
            }
            Expr::Binary { op, left, right } => {
                left.render(out, code);
                out.push(' ');
                out.push_str(op.symbol());
                out.push(' ');
                right.render(out, code);
            }
            Expr::Dot { object, member } => {
                object.render(out, code);
                out.push('.');
                member.render(out, code);
            }
            Expr::Index { object, index } => {
                object.render(out, code);
                out.push('[');
                index.render(out, code);
                out.push(']');
            }
            Expr::Assign { target, value } => {
                target.render(out, code);
                out.push_str(" = ");
                value.render(out, code);
            }
            Expr::Array(items) => {
                out.push('[');
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    item.render(out, code);
                }
                out.push(']');
            }
            Expr::Object(pairs) => {
                out.push('{');
                for (i, (key, value)) in pairs.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    key.render(out, code);
                    out.push_str(": ");
                    value.render(out, code);
                }
                out.push('}');
            }
            Expr::Group(e) => {
                out.push('(');
                e.render(out, code);
                out.push(')');
            }
            Expr::Template(segments) => {
                for segment in segments {
                    match segment {
                        Segment::Text(text) => {
                            if code {
                                escape_template_text(text, out);
                            } else {
                                out.push_str(text);
                            }
                        }
                        Segment::Hole(e) => {
                            out.push_str("${");
                            e.render(out, code);
                            out.push('}');
                        }
                    }
                }
            }
        }
    }
}

/// Diagnostic infix rendering. String contents are not re-escaped; use
/// [`Expr::to_code`] for output that re-parses.
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        self.render(&mut out, false);
        f.write_str(&out)
    }
}

fn escape_string_literal(s: &str, out: &mut String) {
    for ch in s.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            ch => out.push(ch),
        }
    }
}

fn escape_template_text(s: &str, out: &mut String) {
    let chars: Vec<char> = s.chars().collect();
    for (i, ch) in chars.iter().enumerate() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '$' if chars.get(i + 1) == Some(&'{') => out.push_str("\\$"),
            ch => out.push(*ch),
        }
    }
}
