use regex::Regex;
use std::collections::HashMap;
use std::env;
use std::sync::OnceLock;

fn env_ref_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("static regex"))
}

/// Expand environment variables in a string using ${VAR_NAME} syntax.
/// Unset variables are left in place.
pub fn expand_env_var_in_string(value: &str) -> String {
    env_ref_pattern()
        .replace_all(value, |cap: &regex::Captures| {
            env::var(&cap[1]).unwrap_or_else(|_| cap[0].to_string())
        })
        .into_owned()
}

pub fn expand_env_vars(env: &HashMap<String, String>) -> HashMap<String, String> {
    env.iter()
        .map(|(key, value)| (key.clone(), expand_env_var_in_string(value)))
        .collect()
}

/// Parse the usual truthy spellings accepted in environment variables.
pub fn parse_bool_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_known_and_unknown_vars() {
        env::set_var("SD_AGENT_TEST_EXPAND", "models");
        let expanded = expand_env_var_in_string("${SD_AGENT_TEST_EXPAND}/sir/${SD_AGENT_TEST_UNSET_VAR}");
        assert_eq!(expanded, "models/sir/${SD_AGENT_TEST_UNSET_VAR}");
    }

    #[test]
    fn test_parse_bool_flag() {
        assert_eq!(parse_bool_flag("Yes"), Some(true));
        assert_eq!(parse_bool_flag("0"), Some(false));
        assert_eq!(parse_bool_flag("maybe"), None);
    }
}
