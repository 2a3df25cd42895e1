use crate::domain::{
    Assertion, AssertionKind, AssertionResult, AssertionValue, HttpResponse, Operator,
};

const PASSED_MESSAGE: &str = "Assertion passed";

/// Evaluates every enabled assertion, in order, against one response.
#[must_use]
pub fn evaluate_all(assertions: &[Assertion], response: &HttpResponse) -> Vec<AssertionResult> {
    assertions
        .iter()
        .filter(|assertion| assertion.enabled)
        .map(|assertion| evaluate(assertion, response))
        .collect()
}

/// Checks one assertion against a response.
///
/// Pure: the same inputs always give the same result. Anything the
/// evaluator cannot interpret (unknown type or operator, a non-numeric
/// operand for a numeric comparison) fails rather than passes.
#[must_use]
pub fn evaluate(assertion: &Assertion, response: &HttpResponse) -> AssertionResult {
    let actual = match extract_actual(assertion, response) {
        Ok(actual) => actual,
        Err(message) => return outcome(assertion, None, Err(message)),
    };

    let verdict = match assertion.kind {
        AssertionKind::BodyContains => body_contains(&assertion.operator, &actual, &assertion.value),
        AssertionKind::StatusCode | AssertionKind::ResponseTime | AssertionKind::Header => {
            compare(&actual, &assertion.operator, &assertion.value)
        }
        AssertionKind::Unsupported(_) => Err(format!(
            "Unsupported assertion type '{}'",
            assertion.kind
        )),
    };
    outcome(assertion, Some(actual), verdict)
}

fn extract_actual(
    assertion: &Assertion,
    response: &HttpResponse,
) -> Result<AssertionValue, String> {
    match &assertion.kind {
        AssertionKind::StatusCode => Ok(AssertionValue::Integer(i64::from(response.status_code))),
        AssertionKind::ResponseTime => Ok(AssertionValue::Integer(
            i64::try_from(response.duration.as_millis()).unwrap_or(i64::MAX),
        )),
        AssertionKind::BodyContains => Ok(AssertionValue::Text(response.body.clone())),
        AssertionKind::Header => {
            let name = assertion.property.trim();
            if name.is_empty() {
                return Err("Header assertion needs a header name in 'property'".to_owned());
            }
            response
                .header(name)
                .map(|value| AssertionValue::Text(value.to_owned()))
                .ok_or_else(|| format!("Header '{}' not present in response", name))
        }
        AssertionKind::Unsupported(name) => Err(format!("Unsupported assertion type '{}'", name)),
    }
}

/// Body assertions test for the substring. `contains`/`equals` require it,
/// `not_contains`/`not_equals` forbid it; ordering operators are rejected.
fn body_contains(
    operator: &Operator,
    body: &AssertionValue,
    expected: &AssertionValue,
) -> Result<bool, String> {
    let found = body.to_string().contains(&expected.to_string());
    match operator {
        Operator::Contains | Operator::Equals => Ok(found),
        Operator::NotContains | Operator::NotEquals => Ok(!found),
        Operator::GreaterThan | Operator::LessThan => Err(format!(
            "Operator '{}' does not apply to body_contains",
            operator
        )),
        Operator::Unsupported(name) => Err(format!("Unsupported operator '{}'", name)),
    }
}

fn compare(
    actual: &AssertionValue,
    operator: &Operator,
    expected: &AssertionValue,
) -> Result<bool, String> {
    match operator {
        Operator::Equals => Ok(actual.matches(expected)),
        Operator::NotEquals => Ok(!actual.matches(expected)),
        Operator::GreaterThan | Operator::LessThan => {
            if expected.as_number().is_none() {
                return Err(format!(
                    "Operator '{}' needs a numeric expected value, got '{}'",
                    operator, expected
                ));
            }
            let ordering = actual.numeric_cmp(expected).ok_or_else(|| {
                format!(
                    "Operator '{}' needs a numeric actual value, got '{}'",
                    operator, actual
                )
            })?;
            Ok(match operator {
                Operator::GreaterThan => ordering.is_gt(),
                Operator::LessThan => ordering.is_lt(),
                Operator::Equals
                | Operator::NotEquals
                | Operator::Contains
                | Operator::NotContains
                | Operator::Unsupported(_) => false,
            })
        }
        Operator::Contains => Ok(actual.to_string().contains(&expected.to_string())),
        Operator::NotContains => Ok(!actual.to_string().contains(&expected.to_string())),
        Operator::Unsupported(name) => Err(format!("Unsupported operator '{}'", name)),
    }
}

fn outcome(
    assertion: &Assertion,
    actual: Option<AssertionValue>,
    verdict: Result<bool, String>,
) -> AssertionResult {
    let (passed, message) = match verdict {
        Ok(true) => (true, PASSED_MESSAGE.to_owned()),
        Ok(false) => (
            false,
            format!(
                "Assertion failed: expected {} {} {}, got {}",
                assertion.kind,
                assertion.operator,
                assertion.value,
                actual
                    .as_ref()
                    .map_or_else(|| "nothing".to_owned(), abbreviate)
            ),
        ),
        Err(message) => (false, message),
    };

    AssertionResult {
        assertion: assertion.clone(),
        passed,
        message,
        actual,
        expected: assertion.value.clone(),
    }
}

fn abbreviate(value: &AssertionValue) -> String {
    const MAX_CHARS: usize = 120;
    let text = value.to_string();
    if text.chars().count() <= MAX_CHARS {
        return text;
    }
    let mut short: String = text.chars().take(MAX_CHARS).collect();
    short.push_str("...");
    short
}
