/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    // Logical
    /// Logical OR (`||`), short-circuiting
    Or,
    /// Logical AND (`&&`), short-circuiting
    And,

    // Membership
    /// Membership test (`in`)
    In,

    // Equality
    /// Loose equality (`==`)
    Eq,
    /// Loose inequality (`!=`)
    Ne,
    /// Strict equality (`===`)
    StrictEq,
    /// Strict inequality (`!==`)
    StrictNe,

    // Relational
    /// Less than (`<`)
    Lt,
    /// Less than or equal (`<=`)
    Le,
    /// Greater than (`>`)
    Gt,
    /// Greater than or equal (`>=`)
    Ge,

    // Arithmetic
    /// Addition, concatenation, or map union (`+`)
    Add,
    /// Subtraction or element/key removal (`-`)
    Subtract,
    /// Multiplication (`*`)
    Multiply,
    /// Division (`/`)
    Divide,
}

impl BinOp {
    /// Binding strength, higher binds tighter. Assignment sits below all of
    /// these at level 0; the parser's fold splits at the lowest level present.
    pub fn precedence(self) -> u8 {
        match self {
            BinOp::Or => 1,
            BinOp::And => 2,
            BinOp::In => 3,
            BinOp::Eq | BinOp::Ne | BinOp::StrictEq | BinOp::StrictNe => 4,
            BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge => 5,
            BinOp::Add | BinOp::Subtract => 6,
            BinOp::Multiply | BinOp::Divide => 7,
        }
    }

    /// The operator's source symbol.
    pub fn symbol(self) -> &'static str {
        match self {
            BinOp::Or => "||",
            BinOp::And => "&&",
            BinOp::In => "in",
            BinOp::Eq => "==",
            BinOp::Ne => "!=",
            BinOp::StrictEq => "===",
            BinOp::StrictNe => "!==",
            BinOp::Lt => "<",
            BinOp::Le => "<=",
            BinOp::Gt => ">",
            BinOp::Ge => ">=",
            BinOp::Add => "+",
            BinOp::Subtract => "-",
            BinOp::Multiply => "*",
            BinOp::Divide => "/",
        }
    }
}
