//! Parse, evaluate, and render expressions against JSON variables

use super::CliError;
use crate::output::{json_to_value, value_to_json};
use crate::{Parser, Value, Variables, parse_template};

use indexmap::IndexMap;

/// Options for the eval command
#[derive(Debug, Clone, Default)]
pub struct EvalOptions {
    /// The expression to evaluate
    pub expr: String,
    /// JSON object providing the variable environment
    pub vars: Option<String>,
    /// Only validate syntax, don't evaluate
    pub syntax_only: bool,
    /// Include the final environment in the outcome (assignments persist)
    pub show_vars: bool,
}

/// Result of an eval operation
#[derive(Debug)]
pub enum EvalOutcome {
    /// Syntax validation passed
    SyntaxValid,
    /// Expression evaluated successfully
    Success {
        result: serde_json::Value,
        /// The final environment, when requested
        vars: Option<serde_json::Value>,
    },
}

/// Options for the render command
#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    /// The `${...}` template to interpolate
    pub template: String,
    /// JSON object providing the variable environment
    pub vars: Option<String>,
}

/// Parse one expression and, unless `syntax_only`, evaluate it.
pub fn execute_eval(options: &EvalOptions) -> Result<EvalOutcome, CliError> {
    let mut parser = Parser::new(&options.expr);

    if options.syntax_only {
        parser.parse()?;
        return Ok(EvalOutcome::SyntaxValid);
    }

    let expr = parser.parse()?;
    let mut vars = parse_vars(options.vars.as_deref())?;
    let result = expr.evaluate(Some(&mut vars))?;

    let final_vars = options.show_vars.then(|| {
        let map: IndexMap<String, Value> = vars.into_iter().collect();
        value_to_json(Value::Object(map))
    });

    Ok(EvalOutcome::Success {
        result: value_to_json(result),
        vars: final_vars,
    })
}

/// Interpolate a template and return the resulting text.
pub fn execute_render(options: &RenderOptions) -> Result<String, CliError> {
    let template = parse_template(&options.template)?;
    let mut vars = parse_vars(options.vars.as_deref())?;
    let result = template.evaluate(Some(&mut vars))?;
    Ok(result.as_string())
}

fn parse_vars(input: Option<&str>) -> Result<Variables, CliError> {
    let Some(input) = input else {
        return Ok(Variables::new());
    };
    let json: serde_json::Value = serde_json::from_str(input).map_err(CliError::Json)?;
    match json_to_value(json) {
        Value::Object(map) => Ok(map.into_iter().collect()),
        other => Err(CliError::VarsNotObject(other.type_name())),
    }
}
