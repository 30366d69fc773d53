use std::cmp::Ordering;
use std::collections::HashMap;

use indexmap::IndexMap;

use crate::ast::{BinOp, Expr, Segment};
use crate::value::Value;

/// The variable environment expressions read from and assign into.
///
/// Lookup order is irrelevant, so a plain hash map; missing keys read as
/// null rather than erroring.
pub type Variables = HashMap<String, Value>;

/// Errors that can occur during expression evaluation.
#[derive(Debug, Clone)]
pub enum EvalError {
    /// Wrong operand type for an operator
    TypeError(String),

    /// Out-of-range string/array index
    AccessError(String),

    /// Integral division by zero (float division follows IEEE instead)
    DivisionByZero,

    /// A string that had to coerce to a number and didn't parse as one
    NumberFormat(String),
}

impl std::fmt::Display for EvalError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EvalError::TypeError(msg) => write!(f, "Type error: {}", msg),
            EvalError::AccessError(msg) => write!(f, "Access error: {}", msg),
            EvalError::DivisionByZero => write!(f, "Division by zero"),
            EvalError::NumberFormat(s) => write!(f, "Not a number: '{}'", s),
        }
    }
}

impl std::error::Error for EvalError {}

/// The tree-walking evaluator.
///
/// Holds the caller-supplied environment for the duration of one evaluation.
/// `None` is a legal environment: references read null and assignments are
/// dropped. Assignments executed before a failure stay in the environment;
/// there is no rollback.
///
/// # Examples
///
/// ```
/// use sorrel_lang::{Evaluator, Parser, Value, Variables};
///
/// let expr = Parser::new("x = 2 + 3").parse().unwrap();
///
/// let mut vars = Variables::new();
/// let result = Evaluator::new(Some(&mut vars)).eval(&expr).unwrap();
/// assert_eq!(result, Value::Integer(5));
/// assert_eq!(vars.get("x"), Some(&Value::Integer(5)));
/// ```
pub struct Evaluator<'a> {
    variables: Option<&'a mut Variables>,
}

impl<'a> Evaluator<'a> {
    pub fn new(variables: Option<&'a mut Variables>) -> Self {
        Evaluator { variables }
    }

    /// Evaluate one expression tree to a [`Value`].
    pub fn eval(&mut self, expr: &Expr) -> Result<Value, EvalError> {
        match expr {
            Expr::Literal(v) => Ok(v.clone()),
            Expr::Name(name) | Expr::Variable(name) => Ok(self.lookup(name)),
            Expr::Not(e) => Ok(Value::Boolean(!self.eval(e)?.as_boolean())),
            Expr::Binary { op, left, right } => match op {
                // Short-circuit: the right side only runs when it decides the
                // result, and the result is always a normalized boolean.
                BinOp::And => {
                    if !self.eval(left)?.as_boolean() {
                        return Ok(Value::Boolean(false));
                    }
                    Ok(Value::Boolean(self.eval(right)?.as_boolean()))
                }
                BinOp::Or => {
                    if self.eval(left)?.as_boolean() {
                        return Ok(Value::Boolean(true));
                    }
                    Ok(Value::Boolean(self.eval(right)?.as_boolean()))
                }
                _ => {
                    let left = self.eval(left)?;
                    let right = self.eval(right)?;
                    apply_binop(*op, &left, &right)
                }
            },
            Expr::Dot { object, member } => {
                let object = self.eval(object)?;
                let key = match member.as_ref() {
                    // A bare name after '.' is the member name itself.
                    Expr::Name(n) => n.clone(),
                    other => self.eval(other)?.as_map_key()?,
                };
                match object {
                    Value::Object(map) => Ok(map.get(&key).cloned().unwrap_or(Value::Null)),
                    v => Err(EvalError::TypeError(format!(
                        "Cannot access member '{}' of {}",
                        key,
                        v.type_name()
                    ))),
                }
            }
            Expr::Index { object, index } => {
                let object = self.eval(object)?;
                let index = self.eval(index)?;
                index_value(&object, &index)
            }
            Expr::Assign { target, value } => {
                let name = match target.as_ref() {
                    Expr::Name(n) | Expr::Variable(n) => n.clone(),
                    _ => unreachable!("parser only accepts name targets"),
                };
                let value = self.eval(value)?;
                if let Some(vars) = self.variables.as_deref_mut() {
                    vars.insert(name, value.clone());
                }
                Ok(value)
            }
            Expr::Array(items) => {
                let mut arr = Vec::with_capacity(items.len());
                for item in items {
                    arr.push(self.eval(item)?);
                }
                Ok(Value::Array(arr))
            }
            Expr::Object(pairs) => {
                let mut map = IndexMap::new();
                for (key_expr, value_expr) in pairs {
                    let key = match key_expr {
                        Expr::Name(n) => n.clone(),
                        other => self.eval(other)?.as_map_key()?,
                    };
                    let value = self.eval(value_expr)?;
                    map.insert(key, value);
                }
                Ok(Value::Object(map))
            }
            Expr::Group(e) => self.eval(e),
            Expr::Template(segments) => {
                let mut out = String::new();
                for segment in segments {
                    match segment {
                        Segment::Text(text) => out.push_str(text),
                        Segment::Hole(e) => out.push_str(&self.eval(e)?.as_string()),
                    }
                }
                Ok(Value::String(out))
            }
        }
    }

    fn lookup(&self, name: &str) -> Value {
        match &self.variables {
            Some(vars) => vars.get(name).cloned().unwrap_or(Value::Null),
            None => Value::Null,
        }
    }
}

fn apply_binop(op: BinOp, left: &Value, right: &Value) -> Result<Value, EvalError> {
    match op {
        BinOp::Add => apply_add(left, right),
        BinOp::Subtract => apply_subtract(left, right),
        BinOp::Multiply => {
            reject_non_scalar("multiply", left, right)?;
            arithmetic(left, right, i64::checked_mul, |a, b| a * b)
        }
        BinOp::Divide => apply_divide(left, right),
        BinOp::Eq => Ok(Value::Boolean(left.is_equal(right))),
        BinOp::Ne => Ok(Value::Boolean(!left.is_equal(right))),
        BinOp::StrictEq => Ok(Value::Boolean(left.is_strict_equal(right))),
        BinOp::StrictNe => Ok(Value::Boolean(!left.is_strict_equal(right))),
        BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge => apply_relational(op, left, right),
        BinOp::In => apply_in(left, right),
        BinOp::And | BinOp::Or => {
            unreachable!("short-circuit operators are evaluated before their operands")
        }
    }
}

/// `+` over the full value model: object union (right side wins), array
/// concatenation with scalar promotion, string concatenation, numeric add.
fn apply_add(left: &Value, right: &Value) -> Result<Value, EvalError> {
    match (left, right) {
        (Value::Object(a), Value::Object(b)) => {
            let mut merged = a.clone();
            for (k, v) in b {
                merged.insert(k.clone(), v.clone());
            }
            Ok(Value::Object(merged))
        }
        (Value::Array(_), _) | (_, Value::Array(_)) => {
            let mut items = to_elements(left);
            items.extend(to_elements(right));
            Ok(Value::Array(items))
        }
        (Value::String(_), _) | (_, Value::String(_)) => Ok(Value::String(format!(
            "{}{}",
            left.as_string(),
            right.as_string()
        ))),
        _ => arithmetic(left, right, i64::checked_add, |a, b| a + b),
    }
}

/// `-`: key removal from objects, loose-equality element removal from
/// arrays, numeric subtract otherwise.
fn apply_subtract(left: &Value, right: &Value) -> Result<Value, EvalError> {
    match (left, right) {
        (Value::Object(map), Value::Array(keys)) => {
            let mut out = map.clone();
            for key in keys {
                out.shift_remove(&key.as_map_key()?);
            }
            Ok(Value::Object(out))
        }
        (Value::Object(map), key) => {
            let mut out = map.clone();
            out.shift_remove(&key.as_map_key()?);
            Ok(Value::Object(out))
        }
        (Value::Array(items), _) => {
            let remove = to_elements(right);
            Ok(Value::Array(
                items
                    .iter()
                    .filter(|item| !remove.iter().any(|r| item.is_equal(r)))
                    .cloned()
                    .collect(),
            ))
        }
        _ => arithmetic(left, right, i64::checked_sub, |a, b| a - b),
    }
}

/// Multiplication and division accept only null, booleans, and numbers;
/// strings do not coerce here the way they do in `+`/`-` and comparisons.
fn reject_non_scalar(verb: &str, left: &Value, right: &Value) -> Result<(), EvalError> {
    if [left, right]
        .iter()
        .any(|v| matches!(v, Value::String(_) | Value::Array(_) | Value::Object(_)))
    {
        return Err(EvalError::TypeError(format!(
            "Cannot {} {} and {}",
            verb,
            left.type_name(),
            right.type_name()
        )));
    }
    Ok(())
}

/// `/`: exact integer division stays integral, everything else is float.
fn apply_divide(left: &Value, right: &Value) -> Result<Value, EvalError> {
    reject_non_scalar("divide", left, right)?;
    let a = left.as_number()?;
    let b = right.as_number()?;
    if let (Some(x), Some(y)) = (a.as_integral(), b.as_integral()) {
        if y == 0 {
            return Err(EvalError::DivisionByZero);
        }
        // i64::MIN / -1 overflows; that quotient goes to float too.
        if let (Some(0), Some(q)) = (x.checked_rem(y), x.checked_div(y)) {
            return Ok(Value::normalize_long(q));
        }
        return Ok(Value::Float(x as f64 / y as f64));
    }
    Ok(Value::Float(float_of(&a) / float_of(&b)))
}

fn apply_relational(op: BinOp, left: &Value, right: &Value) -> Result<Value, EvalError> {
    let ordering: Option<Ordering> =
        if matches!(left, Value::String(_)) || matches!(right, Value::String(_)) {
            Some(left.as_string().cmp(&right.as_string()))
        } else {
            let a = left.as_number()?;
            let b = right.as_number()?;
            match (a.as_integral(), b.as_integral()) {
                (Some(x), Some(y)) => Some(x.cmp(&y)),
                // None when a NaN is involved; every relation is then false.
                _ => float_of(&a).partial_cmp(&float_of(&b)),
            }
        };
    let result = match ordering {
        Some(ord) => match op {
            BinOp::Lt => ord.is_lt(),
            BinOp::Le => ord.is_le(),
            BinOp::Gt => ord.is_gt(),
            BinOp::Ge => ord.is_ge(),
            _ => unreachable!("relational dispatch covers exactly four operators"),
        },
        None => false,
    };
    Ok(Value::Boolean(result))
}

fn apply_in(left: &Value, right: &Value) -> Result<Value, EvalError> {
    match right {
        Value::Array(items) => Ok(Value::Boolean(
            items.iter().any(|item| left.is_equal(item)),
        )),
        Value::Object(map) => Ok(Value::Boolean(map.contains_key(&left.as_string()))),
        v => Err(EvalError::TypeError(format!(
            "Right side of 'in' must be array or object, got {}",
            v.type_name()
        ))),
    }
}

/// Shared numeric path for `+ - *`: integer math in 64 bits, narrowed back
/// down afterwards; overflow and any float operand go to 64-bit float.
fn arithmetic(
    left: &Value,
    right: &Value,
    checked: fn(i64, i64) -> Option<i64>,
    float: fn(f64, f64) -> f64,
) -> Result<Value, EvalError> {
    let a = left.as_number()?;
    let b = right.as_number()?;
    match (a.as_integral(), b.as_integral()) {
        (Some(x), Some(y)) => match checked(x, y) {
            Some(n) => Ok(Value::normalize_long(n)),
            None => Ok(Value::Float(float(x as f64, y as f64))),
        },
        _ => Ok(Value::Float(float(float_of(&a), float_of(&b)))),
    }
}

fn index_value(object: &Value, index: &Value) -> Result<Value, EvalError> {
    match object {
        Value::String(s) => {
            let i = integral_index(index, "String")?;
            match usize::try_from(i).ok().and_then(|i| s.chars().nth(i)) {
                Some(ch) => Ok(Value::String(ch.to_string())),
                None => Err(EvalError::AccessError(format!(
                    "String index {} out of range (length {})",
                    index.as_string(),
                    s.chars().count()
                ))),
            }
        }
        Value::Array(items) => {
            let i = integral_index(index, "Array")?;
            match usize::try_from(i).ok().and_then(|i| items.get(i)) {
                Some(v) => Ok(v.clone()),
                None => Err(EvalError::AccessError(format!(
                    "Array index {} out of range (length {})",
                    index.as_string(),
                    items.len()
                ))),
            }
        }
        // Indexing an object is member access with the same
        // missing-key-is-null contract as '.'.
        Value::Object(map) => {
            let key = index.as_map_key()?;
            Ok(map.get(&key).cloned().unwrap_or(Value::Null))
        }
        v => Err(EvalError::TypeError(format!(
            "Cannot index {}",
            v.type_name()
        ))),
    }
}

fn integral_index(index: &Value, target: &str) -> Result<i64, EvalError> {
    index.as_integral().ok_or_else(|| {
        EvalError::TypeError(format!(
            "{} index must be an integer, got {}",
            target,
            index.type_name()
        ))
    })
}

fn to_elements(v: &Value) -> Vec<Value> {
    match v {
        Value::Array(items) => items.clone(),
        other => vec![other.clone()],
    }
}

fn float_of(v: &Value) -> f64 {
    v.as_float().expect("as_number yields a numeric value")
}
