//! Secret reference resolution.

/// Resolves a `secret_ref` to the credential value.
///
/// `${NAME}` reads the environment variable `NAME`; an unset variable
/// yields an empty credential and a warning. Any other string is used as a
/// literal secret. `None` yields an empty credential.
#[must_use]
pub fn resolve_secret(secret_ref: Option<&str>) -> String {
    let Some(reference) = secret_ref else {
        return String::new();
    };

    match env_reference(reference) {
        Some(var) => std::env::var(var).unwrap_or_else(|_| {
            tracing::warn!(env_var = var, "secret reference is not set, sending empty credential");
            String::new()
        }),
        None => reference.to_string(),
    }
}

fn env_reference(reference: &str) -> Option<&str> {
    reference
        .strip_prefix("${")
        .and_then(|rest| rest.strip_suffix('}'))
        .filter(|var| !var.is_empty())
}
