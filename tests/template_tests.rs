// tests/template_tests.rs

use sorrel_lang::ast::{Expr, Segment};
use sorrel_lang::parser::ParseError;
use sorrel_lang::{Value, Variables, parse_template};

fn render(template: &str, vars: &mut Variables) -> Result<String, String> {
    let expr = parse_template(template).map_err(|e| e.to_string())?;
    let value = expr.evaluate(Some(vars)).map_err(|e| e.to_string())?;
    Ok(value.as_string())
}

fn variables(pairs: Vec<(&str, Value)>) -> Variables {
    pairs
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
}

// ============================================================================
// Basic interpolation
// ============================================================================

#[test]
fn test_hello_world() {
    let mut vars = variables(vec![("name", Value::String("World".into()))]);
    assert_eq!(
        render("Hello ${name}!", &mut vars).unwrap(),
        "Hello World!"
    );
}

#[test]
fn test_text_only_template() {
    let mut vars = Variables::new();
    assert_eq!(render("no holes here", &mut vars).unwrap(), "no holes here");
    assert_eq!(render("", &mut vars).unwrap(), "");
}

#[test]
fn test_hole_only_template() {
    let mut vars = variables(vec![("x", Value::Integer(7))]);
    assert_eq!(render("${x}", &mut vars).unwrap(), "7");
}

#[test]
fn test_multiple_holes_in_order() {
    let mut vars = variables(vec![
        ("a", Value::Integer(1)),
        ("b", Value::Integer(2)),
    ]);
    assert_eq!(render("${a}-${b}-${a}", &mut vars).unwrap(), "1-2-1");
}

#[test]
fn test_expression_holes() {
    let mut vars = variables(vec![
        ("a", Value::Integer(2)),
        ("b", Value::Integer(3)),
    ]);
    assert_eq!(render("sum: ${a + b * 2}", &mut vars).unwrap(), "sum: 8");
}

#[test]
fn test_hole_with_braces_inside() {
    // An object literal's '}' does not close the hole
    let mut vars = Variables::new();
    assert_eq!(render("${ {a: 1}.a }", &mut vars).unwrap(), "1");
}

// ============================================================================
// Hole rendering
// ============================================================================

#[test]
fn test_values_render_via_their_string_form() {
    let mut vars = variables(vec![
        ("n", Value::Null),
        ("f", Value::Float(2.0)),
        ("b", Value::Boolean(true)),
        ("arr", Value::Array(vec![Value::Integer(1), Value::Integer(2)])),
    ]);
    assert_eq!(
        render("${n} ${f} ${b} ${arr}", &mut vars).unwrap(),
        "null 2.0 true [1,2]"
    );
}

// ============================================================================
// Escapes and literal dollars
// ============================================================================

#[test]
fn test_dollar_without_brace_is_literal() {
    let mut vars = Variables::new();
    assert_eq!(render("$5 or $x or $", &mut vars).unwrap(), "$5 or $x or $");
}

#[test]
fn test_escaped_dollar_suppresses_hole() {
    let mut vars = variables(vec![("x", Value::Integer(1))]);
    assert_eq!(render(r"\${x}", &mut vars).unwrap(), "${x}");
}

#[test]
fn test_escape_table() {
    let mut vars = Variables::new();
    assert_eq!(render(r"a\nb", &mut vars).unwrap(), "a\nb");
    assert_eq!(render(r"a\tb", &mut vars).unwrap(), "a\tb");
    // Unknown escapes pass the character through
    assert_eq!(render(r"a\qb", &mut vars).unwrap(), "aqb");
    assert_eq!(render(r"a\\b", &mut vars).unwrap(), r"a\b");
}

#[test]
fn test_trailing_backslash_is_an_error() {
    assert!(parse_template("oops\\").is_err());
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn test_unterminated_hole_error_at_opening() {
    let err = parse_template("total: ${price").unwrap_err();
    match err {
        ParseError::Interpolation { position, .. } => {
            assert_eq!((position.line, position.column), (1, 8));
            assert_eq!(position.offset, 7);
        }
        other => panic!("Expected interpolation error, got {:?}", other),
    }
}

#[test]
fn test_empty_hole_is_an_error() {
    assert!(matches!(
        parse_template("${}").unwrap_err(),
        ParseError::Interpolation { .. }
    ));
}

#[test]
fn test_invalid_hole_expression() {
    assert!(matches!(
        parse_template("${1 +}").unwrap_err(),
        ParseError::Interpolation { .. }
    ));
}

#[test]
fn test_hole_position_tracks_newlines() {
    let err = parse_template("line one\nmore ${").unwrap_err();
    match err {
        ParseError::Interpolation { position, .. } => {
            assert_eq!((position.line, position.column), (2, 6));
        }
        other => panic!("Expected interpolation error, got {:?}", other),
    }
}

// ============================================================================
// Structure and round-trips
// ============================================================================

#[test]
fn test_segment_structure() {
    let expr = parse_template("a ${x} b").unwrap();
    match expr {
        Expr::Template(segments) => {
            assert_eq!(segments.len(), 3);
            assert_eq!(segments[0], Segment::Text("a ".to_string()));
            assert!(matches!(segments[1], Segment::Hole(Expr::Name(ref n)) if n == "x"));
            assert_eq!(segments[2], Segment::Text(" b".to_string()));
        }
        other => panic!("Expected template, got {:?}", other),
    }
}

#[test]
fn test_to_code_round_trip() {
    let sources = vec![
        "Hello ${name}!",
        r"literal \${kept} and ${used}",
        "${a + b} and ${list[0]}",
        r"back\\slash",
    ];

    for source in sources {
        let code = parse_template(source).unwrap().to_code();
        let reparsed = parse_template(&code).unwrap();
        assert_eq!(
            reparsed.to_code(),
            code,
            "Round trip failed for source: {}",
            source
        );
    }
}

#[test]
fn test_display_renders_holes_from_their_expressions() {
    let expr = parse_template("v: ${a + 1}").unwrap();
    assert_eq!(expr.to_string(), "v: ${a + 1}");
    assert_eq!(expr.to_code(), "v: ${a + 1}");
}

// ============================================================================
// Environment interaction
// ============================================================================

#[test]
fn test_holes_share_the_environment() {
    let mut vars = Variables::new();
    assert_eq!(render("${x = 5}${x + 1}", &mut vars).unwrap(), "56");
    assert_eq!(vars.get("x"), Some(&Value::Integer(5)));
}

#[test]
fn test_template_against_null_environment() {
    let expr = parse_template("x is ${x}").unwrap();
    assert_eq!(
        expr.evaluate(None).unwrap(),
        Value::String("x is null".to_string())
    );
}
