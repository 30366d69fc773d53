use std::fmt;
use std::sync::LazyLock;

use indexmap::IndexMap;
use regex::Regex;

use crate::evaluator::EvalError;

/// A dynamically-typed runtime value.
///
/// This type represents all JSON shapes with a three-way split of the number
/// type: integers are kept in the narrowest width that represents them exactly
/// (32-bit, then 64-bit), and any fractional or exponent form is a 64-bit
/// float. Objects preserve insertion order.
///
/// Values are immutable: every operator in the language builds new values.
///
/// # Examples
///
/// ```
/// use sorrel_lang::Value;
/// use indexmap::IndexMap;
///
/// // Scalar values
/// let null = Value::Null;
/// let boolean = Value::Boolean(true);
/// let integer = Value::Integer(42);
/// let long = Value::Long(9_999_999_999);
/// let float = Value::Float(3.14);
/// let string = Value::String("hello".to_string());
///
/// // Collections
/// let array = Value::Array(vec![Value::Integer(1), Value::Integer(2)]);
///
/// let mut obj = IndexMap::new();
/// obj.insert("key".to_string(), Value::String("value".to_string()));
/// let object = Value::Object(obj);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// JSON null
    Null,

    /// JSON boolean (true/false)
    Boolean(bool),

    /// Integer fitting 32 bits
    Integer(i32),

    /// Integer needing 64 bits
    Long(i64),

    /// Floating-point number
    Float(f64),

    /// UTF-8 string
    String(String),

    /// Array of values (homogeneous or heterogeneous)
    Array(Vec<Value>),

    /// Object with string keys, insertion order preserved
    Object(IndexMap<String, Value>),
}

/// Matches strings that coerce to an integer rather than a float.
static INTEGER_SHAPE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^-?[0-9]+$").unwrap());

impl Value {
    /// Narrow a 64-bit integer to `Integer` when it fits, `Long` otherwise.
    pub fn normalize_long(n: i64) -> Value {
        match i32::try_from(n) {
            Ok(i) => Value::Integer(i),
            Err(_) => Value::Long(n),
        }
    }

    /// Returns a human-readable type name for diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Boolean(_) => "boolean",
            Value::Integer(_) | Value::Long(_) => "integer",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        }
    }

    /// True for the three numeric variants.
    pub fn is_number(&self) -> bool {
        matches!(self, Value::Integer(_) | Value::Long(_) | Value::Float(_))
    }

    /// The value as an `i64`, for the two integral variants only.
    ///
    /// `Float` is never integral here, even for whole values like `3.0`:
    /// integer-ness is a property of the type, not of the stored value.
    pub fn as_integral(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n as i64),
            Value::Long(n) => Some(*n),
            _ => None,
        }
    }

    /// Get as float (numeric variants only)
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Integer(n) => Some(*n as f64),
            Value::Long(n) => Some(*n as f64),
            Value::Float(n) => Some(*n),
            _ => None,
        }
    }

    /// Coerce to a number.
    ///
    /// - `null` → `0`
    /// - numbers → themselves
    /// - strings of the shape `-?[0-9]+` → integer (narrowed); any other
    ///   string → float, and a string that parses as neither is an error
    /// - booleans → `1` / `0`
    /// - arrays and objects → error
    pub fn as_number(&self) -> Result<Value, EvalError> {
        match self {
            Value::Null => Ok(Value::Integer(0)),
            Value::Boolean(b) => Ok(Value::Integer(if *b { 1 } else { 0 })),
            Value::Integer(_) | Value::Long(_) | Value::Float(_) => Ok(self.clone()),
            Value::String(s) => {
                if INTEGER_SHAPE.is_match(s) {
                    match s.parse::<i64>() {
                        Ok(n) => Ok(Value::normalize_long(n)),
                        // More digits than an i64 holds; fall back to float.
                        Err(_) => parse_float(s),
                    }
                } else {
                    parse_float(s)
                }
            }
            Value::Array(_) | Value::Object(_) => Err(EvalError::TypeError(format!(
                "Cannot convert {} to a number",
                self.type_name()
            ))),
        }
    }

    /// Coerce to a boolean: null is false, strings and collections are true
    /// when non-empty, numbers when nonzero.
    pub fn as_boolean(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Boolean(b) => *b,
            Value::Integer(n) => *n != 0,
            Value::Long(n) => *n != 0,
            Value::Float(n) => *n != 0.0,
            Value::String(s) => !s.is_empty(),
            Value::Array(arr) => !arr.is_empty(),
            Value::Object(obj) => !obj.is_empty(),
        }
    }

    /// Render to text: strings verbatim, numbers and booleans in their source
    /// form, arrays and objects as compact JSON. Floats keep a decimal point
    /// so they re-read as floats.
    pub fn as_string(&self) -> String {
        match self {
            Value::Null => "null".to_string(),
            Value::Boolean(b) => b.to_string(),
            Value::Integer(n) => n.to_string(),
            Value::Long(n) => n.to_string(),
            Value::Float(n) => format_float(*n),
            Value::String(s) => s.clone(),
            Value::Array(_) | Value::Object(_) => crate::output::to_json(self),
        }
    }

    /// Coerce to an object key. Only strings and numbers qualify.
    pub fn as_map_key(&self) -> Result<String, EvalError> {
        match self {
            Value::String(s) => Ok(s.clone()),
            Value::Integer(_) | Value::Long(_) | Value::Float(_) => Ok(self.as_string()),
            _ => Err(EvalError::TypeError(format!(
                "Cannot use {} as an object key",
                self.type_name()
            ))),
        }
    }

    /// Loose equality with cross-type coercion.
    ///
    /// Checked in order: null (equal only to null), boolean (both sides
    /// coerced), object (recursive, key sets must match), array (a non-array
    /// side is promoted to a one-element array), number (both sides coerced;
    /// a string that fails numeric coercion compares unequal instead of
    /// erroring), and finally string against string.
    pub fn is_equal(&self, other: &Value) -> bool {
        if matches!(self, Value::Null) || matches!(other, Value::Null) {
            return matches!(self, Value::Null) && matches!(other, Value::Null);
        }
        if matches!(self, Value::Boolean(_)) || matches!(other, Value::Boolean(_)) {
            return self.as_boolean() == other.as_boolean();
        }
        if matches!(self, Value::Object(_)) || matches!(other, Value::Object(_)) {
            let (Value::Object(a), Value::Object(b)) = (self, other) else {
                return false;
            };
            return a.len() == b.len()
                && a.iter().all(|(k, v)| b.get(k).is_some_and(|w| v.is_equal(w)));
        }
        if matches!(self, Value::Array(_)) || matches!(other, Value::Array(_)) {
            let a = as_element_slice(self);
            let b = as_element_slice(other);
            return a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.is_equal(y));
        }
        if self.is_number() || other.is_number() {
            let (Ok(a), Ok(b)) = (self.as_number(), other.as_number()) else {
                return false;
            };
            return match (a.as_integral(), b.as_integral()) {
                (Some(x), Some(y)) => x == y,
                _ => a.as_float() == b.as_float(),
            };
        }
        match (self, other) {
            (Value::String(a), Value::String(b)) => a == b,
            _ => unreachable!("all non-string shapes handled above"),
        }
    }

    /// Strict equality: both sides must have the same dynamic type.
    ///
    /// The three numeric widths count as one type (width is an artifact of
    /// normalization, not a distinction the language exposes). No promotion
    /// between strings and numbers, nor between scalars and arrays.
    pub fn is_strict_equal(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.is_strict_equal(y))
            }
            (Value::Object(a), Value::Object(b)) => {
                a.len() == b.len()
                    && a.iter()
                        .all(|(k, v)| b.get(k).is_some_and(|w| v.is_strict_equal(w)))
            }
            (a, b) if a.is_number() && b.is_number() => {
                match (a.as_integral(), b.as_integral()) {
                    (Some(x), Some(y)) => x == y,
                    _ => a.as_float() == b.as_float(),
                }
            }
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_string())
    }
}

fn parse_float(s: &str) -> Result<Value, EvalError> {
    s.parse::<f64>()
        .map(Value::Float)
        .map_err(|_| EvalError::NumberFormat(s.to_string()))
}

fn as_element_slice(v: &Value) -> &[Value] {
    match v {
        Value::Array(arr) => arr.as_slice(),
        other => std::slice::from_ref(other),
    }
}

/// Render a float so that it re-reads as a float: whole values keep a
/// trailing `.0` instead of collapsing to integer form.
pub(crate) fn format_float(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 {
        format!("{:.1}", n)
    } else {
        n.to_string()
    }
}
