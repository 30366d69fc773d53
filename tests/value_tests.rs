// tests/value_tests.rs

use indexmap::IndexMap;
use sorrel_lang::Value;

fn object(pairs: Vec<(&str, Value)>) -> Value {
    let mut map = IndexMap::new();
    for (k, v) in pairs {
        map.insert(k.to_string(), v);
    }
    Value::Object(map)
}

fn array(values: Vec<Value>) -> Value {
    Value::Array(values)
}

// ============================================================================
// Numeric coercion and normalization
// ============================================================================

#[test]
fn test_as_number_null_and_booleans() {
    assert_eq!(Value::Null.as_number().unwrap(), Value::Integer(0));
    assert_eq!(Value::Boolean(true).as_number().unwrap(), Value::Integer(1));
    assert_eq!(Value::Boolean(false).as_number().unwrap(), Value::Integer(0));
}

#[test]
fn test_as_number_strings() {
    let test_cases = vec![
        ("3", Value::Integer(3)),
        ("-7", Value::Integer(-7)),
        // Wide integers stay integral, just 64-bit
        ("9999999999", Value::Long(9999999999)),
        // A fractional form is a float even when whole
        ("3.0", Value::Float(3.0)),
        ("2.5", Value::Float(2.5)),
        ("1e3", Value::Float(1000.0)),
        ("-0.5", Value::Float(-0.5)),
    ];

    for (input, expected) in test_cases {
        assert_eq!(
            Value::String(input.to_string()).as_number().unwrap(),
            expected,
            "Failed for input: {}",
            input
        );
    }
}

#[test]
fn test_as_number_failures() {
    assert!(Value::String("abc".to_string()).as_number().is_err());
    assert!(Value::String("".to_string()).as_number().is_err());
    assert!(array(vec![]).as_number().is_err());
    assert!(object(vec![]).as_number().is_err());
}

#[test]
fn test_normalize_long() {
    assert_eq!(Value::normalize_long(0), Value::Integer(0));
    assert_eq!(
        Value::normalize_long(i32::MAX as i64),
        Value::Integer(i32::MAX)
    );
    assert_eq!(
        Value::normalize_long(i32::MIN as i64),
        Value::Integer(i32::MIN)
    );
    assert_eq!(
        Value::normalize_long(i32::MAX as i64 + 1),
        Value::Long(i32::MAX as i64 + 1)
    );
    assert_eq!(
        Value::normalize_long(i32::MIN as i64 - 1),
        Value::Long(i32::MIN as i64 - 1)
    );
}

// ============================================================================
// Boolean coercion
// ============================================================================

#[test]
fn test_as_boolean() {
    let test_cases = vec![
        (Value::Null, false),
        (Value::Boolean(true), true),
        (Value::Boolean(false), false),
        (Value::Integer(0), false),
        (Value::Integer(-1), true),
        (Value::Long(0), false),
        (Value::Long(7), true),
        (Value::Float(0.0), false),
        (Value::Float(0.1), true),
        (Value::String("".to_string()), false),
        (Value::String("x".to_string()), true),
        // A non-empty string is true regardless of content
        (Value::String("false".to_string()), true),
        (array(vec![]), false),
        (array(vec![Value::Null]), true),
        (object(vec![]), false),
        (object(vec![("a", Value::Null)]), true),
    ];

    for (value, expected) in test_cases {
        assert_eq!(value.as_boolean(), expected, "Failed for: {:?}", value);
    }
}

// ============================================================================
// Rendering
// ============================================================================

#[test]
fn test_as_string() {
    assert_eq!(Value::Null.as_string(), "null");
    assert_eq!(Value::Boolean(true).as_string(), "true");
    assert_eq!(Value::Integer(42).as_string(), "42");
    // Whole floats keep their decimal point
    assert_eq!(Value::Float(3.0).as_string(), "3.0");
    assert_eq!(Value::Float(2.5).as_string(), "2.5");
    assert_eq!(Value::String("raw".to_string()).as_string(), "raw");
    assert_eq!(
        array(vec![Value::Integer(1), Value::String("a".to_string())]).as_string(),
        r#"[1,"a"]"#
    );
    assert_eq!(
        object(vec![("b", Value::Integer(2)), ("a", Value::Integer(1))]).as_string(),
        r#"{"b":2,"a":1}"#
    );
}

#[test]
fn test_as_map_key() {
    assert_eq!(
        Value::String("k".to_string()).as_map_key().unwrap(),
        "k"
    );
    assert_eq!(Value::Integer(3).as_map_key().unwrap(), "3");
    assert_eq!(Value::Float(1.5).as_map_key().unwrap(), "1.5");
    assert!(Value::Boolean(true).as_map_key().is_err());
    assert!(Value::Null.as_map_key().is_err());
    assert!(array(vec![]).as_map_key().is_err());
}

// ============================================================================
// Loose equality
// ============================================================================

#[test]
fn test_is_equal_null() {
    assert!(Value::Null.is_equal(&Value::Null));
    assert!(!Value::Null.is_equal(&Value::String("".to_string())));
    assert!(!Value::Null.is_equal(&Value::Integer(0)));
    assert!(!Value::Boolean(false).is_equal(&Value::Null));
}

#[test]
fn test_is_equal_booleans_coerce() {
    assert!(Value::Boolean(true).is_equal(&Value::Integer(1)));
    assert!(Value::Boolean(true).is_equal(&Value::String("yes".to_string())));
    assert!(Value::Boolean(false).is_equal(&Value::String("".to_string())));
    assert!(!Value::Boolean(false).is_equal(&Value::Integer(2)));
}

#[test]
fn test_is_equal_numbers_and_strings() {
    assert!(Value::String("1".to_string()).is_equal(&Value::Integer(1)));
    assert!(Value::Integer(1).is_equal(&Value::String("1".to_string())));
    assert!(Value::String("1.0".to_string()).is_equal(&Value::Integer(1)));
    assert!(Value::Integer(1).is_equal(&Value::Float(1.0)));
    // A string that fails numeric coercion compares unequal, it does not error
    assert!(!Value::String("abc".to_string()).is_equal(&Value::Integer(1)));
    // Both strings compare as text
    assert!(!Value::String("2".to_string()).is_equal(&Value::String("2.0".to_string())));
    assert!(Value::String("a".to_string()).is_equal(&Value::String("a".to_string())));
}

#[test]
fn test_is_equal_arrays_promote_scalars() {
    assert!(array(vec![Value::Integer(1)]).is_equal(&Value::Integer(1)));
    assert!(Value::Integer(1).is_equal(&array(vec![Value::Integer(1)])));
    assert!(array(vec![Value::Integer(1), Value::Integer(2)])
        .is_equal(&array(vec![Value::String("1".to_string()), Value::Integer(2)])));
    assert!(!array(vec![Value::Integer(1)]).is_equal(&array(vec![])));
}

#[test]
fn test_is_equal_objects_recursive() {
    let a = object(vec![("x", Value::Integer(1)), ("y", array(vec![Value::Integer(2)]))]);
    let b = object(vec![
        ("y", array(vec![Value::String("2".to_string())])),
        ("x", Value::String("1".to_string())),
    ]);
    // Key order irrelevant, values compared loosely
    assert!(a.is_equal(&b));

    let missing = object(vec![("x", Value::Integer(1))]);
    assert!(!a.is_equal(&missing));
    // An object never equals a non-object
    assert!(!a.is_equal(&array(vec![a.clone()])));
}

// ============================================================================
// Strict equality
// ============================================================================

#[test]
fn test_is_strict_equal() {
    assert!(!Value::String("1".to_string()).is_strict_equal(&Value::Integer(1)));
    assert!(Value::Integer(1).is_strict_equal(&Value::Integer(1)));
    // Widths are interchangeable within the number type
    assert!(Value::Integer(1).is_strict_equal(&Value::Long(1)));
    assert!(Value::Integer(1).is_strict_equal(&Value::Float(1.0)));
    assert!(!Value::Boolean(true).is_strict_equal(&Value::Integer(1)));
    assert!(!Value::Integer(1).is_strict_equal(&array(vec![Value::Integer(1)])));
    assert!(Value::Null.is_strict_equal(&Value::Null));
}

#[test]
fn test_is_strict_equal_collections() {
    let nums = array(vec![Value::Integer(1), Value::Integer(2)]);
    assert!(nums.is_strict_equal(&array(vec![Value::Integer(1), Value::Integer(2)])));
    assert!(!nums.is_strict_equal(&array(vec![Value::String("1".to_string()), Value::Integer(2)])));

    let a = object(vec![("x", Value::Integer(1))]);
    assert!(a.is_strict_equal(&object(vec![("x", Value::Integer(1))])));
    assert!(!a.is_strict_equal(&object(vec![("x", Value::String("1".to_string()))])));
    assert!(!a.is_strict_equal(&object(vec![])));
}

// ============================================================================
// Type names
// ============================================================================

#[test]
fn test_type_names() {
    assert_eq!(Value::Null.type_name(), "null");
    assert_eq!(Value::Integer(1).type_name(), "integer");
    assert_eq!(Value::Long(1).type_name(), "integer");
    assert_eq!(Value::Float(1.0).type_name(), "float");
    assert_eq!(Value::String(String::new()).type_name(), "string");
    assert_eq!(array(vec![]).type_name(), "array");
    assert_eq!(object(vec![]).type_name(), "object");
}
