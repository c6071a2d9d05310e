use std::sync::LazyLock;

use regex::{Captures, Regex};

/// `{{ env.VAR }}` or `{{ env.VAR | default("fallback") }}`
static PLACEHOLDER: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r#"\{\{\s*([A-Za-z0-9_.]+)\s*(?:\|\s*default\("([^"]*)"\)\s*)?\}\}"#).ok()
});

/// Expand environment placeholders in raw TOML text
///
/// Comment lines (first non-blank character `#`) are copied untouched so
/// documented-but-disabled settings do not require their variables.
pub fn expand_env(input: &str) -> anyhow::Result<String> {
    let Some(placeholder) = PLACEHOLDER.as_ref() else {
        anyhow::bail!("placeholder pattern failed to compile");
    };

    let mut output = String::with_capacity(input.len());

    for line in input.split_inclusive('\n') {
        if line.trim_start().starts_with('#') || !line.contains("{{") {
            output.push_str(line);
            continue;
        }

        let mut failure = None;
        let expanded = placeholder.replace_all(line, |caps: &Captures<'_>| {
            resolve(caps).unwrap_or_else(|e| {
                failure.get_or_insert(e);
                String::new()
            })
        });

        if let Some(e) = failure {
            return Err(e);
        }
        output.push_str(&expanded);
    }

    Ok(output)
}

/// Value for one placeholder match
fn resolve(caps: &Captures<'_>) -> anyhow::Result<String> {
    let key = &caps[1];
    let Some(var_name) = key.strip_prefix("env.").filter(|name| !name.contains('.')) else {
        anyhow::bail!("only variables scoped with 'env.' are supported: `{key}`");
    };

    match (std::env::var(var_name), caps.get(2)) {
        (Ok(value), _) => Ok(value),
        (Err(_), Some(default)) => Ok(default.as_str().to_owned()),
        (Err(_), None) => anyhow::bail!("environment variable not found: `{var_name}`"),
    }
}
