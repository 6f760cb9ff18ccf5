use rhai::{Dynamic, Engine};

/// Calculator backend. The expression string assembled by the UI is handed
/// to the `rhai` engine in expression-only mode; there is deliberately no
/// parsing, precedence or numeric handling of our own.
#[derive(Debug, Clone, PartialEq)]
pub enum CalcError {
    EmptyExpression,
    Eval(String),
}

impl std::fmt::Display for CalcError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CalcError::EmptyExpression => write!(f, "empty expression"),
            CalcError::Eval(message) => write!(f, "eval error: {message}"),
        }
    }
}

impl std::error::Error for CalcError {}

pub fn evaluate(expression: &str) -> Result<String, CalcError> {
    let expression = expression.trim();
    if expression.is_empty() {
        return Err(CalcError::EmptyExpression);
    }

    let engine = Engine::new();
    let result: Dynamic = engine
        .eval_expression(expression)
        .map_err(|err| CalcError::Eval(err.to_string()))?;
    Ok(result.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evaluates_basic_arithmetic() {
        assert_eq!(evaluate("1 + 2 * 3").unwrap(), "7");
        assert_eq!(evaluate("10 - 4").unwrap(), "6");
        assert_eq!(evaluate("2.5 * 2").unwrap(), "5.0");
    }

    #[test]
    fn chained_results_can_be_fed_back_in() {
        // The UI replaces the entry with the previous total and appends.
        let total = evaluate("6 * 7").unwrap();
        assert_eq!(evaluate(&format!("{total} + 8")).unwrap(), "50");
    }

    #[test]
    fn empty_and_whitespace_expressions_are_rejected() {
        assert_eq!(evaluate(""), Err(CalcError::EmptyExpression));
        assert_eq!(evaluate("   "), Err(CalcError::EmptyExpression));
    }

    #[test]
    fn malformed_expressions_surface_an_eval_error() {
        assert!(matches!(evaluate("1 +"), Err(CalcError::Eval(_))));
        assert!(matches!(evaluate("(2 * 3"), Err(CalcError::Eval(_))));
    }

    #[test]
    fn statements_are_rejected_in_expression_mode() {
        assert!(matches!(
            evaluate("let x = 1; x + 1"),
            Err(CalcError::Eval(_))
        ));
    }
}
