//! Run parameter resolution
//!
//! Substitutes `${NAME}` and `$NAME` environment tokens in parameter values.
//! The literal value is preserved; the substituted form is recorded as the
//! parameter's resolved value.

use regex::{NoExpand, Regex};
use std::collections::HashMap;
use strand_core::domain::run::RunParameter;

/// Resolve environment tokens in the given parameters.
///
/// Both `${NAME}` and bare `$NAME` forms are replaced, where a bare token
/// ends at the first non-identifier character or the end of the value. Only
/// names present in `env_vars` are substituted; unknown tokens are left
/// untouched. With an empty environment or parameter list the input is
/// returned unchanged.
pub fn resolve_parameters(
    mut parameters: Vec<RunParameter>,
    env_vars: &HashMap<String, String>,
) -> Vec<RunParameter> {
    if parameters.is_empty() || env_vars.is_empty() {
        return parameters;
    }

    let patterns: Vec<(Regex, &str)> = env_vars
        .iter()
        .filter_map(|(name, value)| {
            let escaped = regex::escape(name);
            let pattern = format!(r"\$\{{{escaped}\}}|\${escaped}\b");
            Regex::new(&pattern).ok().map(|re| (re, value.as_str()))
        })
        .collect();

    for parameter in &mut parameters {
        let mut resolved = parameter.value.clone();
        for (re, value) in &patterns {
            // NoExpand keeps `$` in the substituted value literal
            resolved = re.replace_all(&resolved, NoExpand(value)).into_owned();
        }
        parameter.resolved_value = Some(resolved);
    }

    parameters
}

#[cfg(test)]
mod tests {
    use super::*;

    const PARAM_NAME: &str = "param-1";
    const ENV_VAR_NAME: &str = "TEST_ENV";
    const ENV_VAR_VALUE: &str = "value";

    fn env_vars() -> HashMap<String, String> {
        let mut env = HashMap::new();
        env.insert(ENV_VAR_NAME.to_string(), ENV_VAR_VALUE.to_string());
        env
    }

    fn resolve_single(value: &str, env: &HashMap<String, String>) -> RunParameter {
        let params = vec![RunParameter::new(PARAM_NAME, value)];
        let mut resolved = resolve_parameters(params, env);
        resolved.pop().unwrap()
    }

    fn check_resolved(param_value: &str, expected: &str) {
        let param = resolve_single(param_value, &env_vars());
        assert_eq!(param.value, param_value);
        assert_eq!(param.resolved_value.as_deref(), Some(expected));
    }

    #[test]
    fn test_empty_parameters_stay_empty() {
        let resolved = resolve_parameters(vec![], &env_vars());
        assert!(resolved.is_empty());
    }

    #[test]
    fn test_empty_env_returns_input_unchanged() {
        let params = vec![RunParameter::new(PARAM_NAME, "test/$TEST_ENV/")];
        let resolved = resolve_parameters(params.clone(), &HashMap::new());
        assert_eq!(resolved, params);
        assert_eq!(resolved[0].effective_value(), resolved[0].value);
    }

    #[test]
    fn test_value_without_tokens_resolves_to_itself() {
        let param = resolve_single("plain-value", &env_vars());
        assert_eq!(param.value, "plain-value");
        assert_eq!(param.resolved_value.as_deref(), Some("plain-value"));
    }

    #[test]
    fn test_braced_token() {
        check_resolved("test/${TEST_ENV}", "test/value");
    }

    #[test]
    fn test_bare_token_at_end_of_line() {
        check_resolved("test/$TEST_ENV", "test/value");
    }

    #[test]
    fn test_bare_token_in_middle_of_line() {
        check_resolved("test/$TEST_ENV/", "test/value/");
    }

    #[test]
    fn test_several_tokens_in_one_value() {
        check_resolved(
            "test/$TEST_ENV/${TEST_ENV}/$TEST_ENV/",
            "test/value/value/value/",
        );
    }

    #[test]
    fn test_longer_identifier_is_not_a_token_match() {
        check_resolved("test/$TEST_ENVX/", "test/$TEST_ENVX/");
    }

    #[test]
    fn test_unknown_token_left_untouched() {
        check_resolved("test/$OTHER_ENV/", "test/$OTHER_ENV/");
    }

    #[test]
    fn test_dollar_in_replacement_value_stays_literal() {
        let mut env = HashMap::new();
        env.insert("PRICE".to_string(), "$5".to_string());

        let param = resolve_single("cost/$PRICE/", &env);
        assert_eq!(param.resolved_value.as_deref(), Some("cost/$5/"));
    }

    #[test]
    fn test_multiple_env_vars() {
        let mut env = env_vars();
        env.insert("RUN_ID".to_string(), "42".to_string());

        let param = resolve_single("out/$RUN_ID/${TEST_ENV}", &env);
        assert_eq!(param.resolved_value.as_deref(), Some("out/42/value"));
    }
}
