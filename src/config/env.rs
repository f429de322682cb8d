use tracing::debug;

/// Resolve a config value. A value starting with '$' names an environment
/// variable; an unset variable leaves the literal in place.
pub fn resolve_env_reference(value: &str) -> String {
    if let Some(var_name) = value.strip_prefix('$') {
        match std::env::var(var_name) {
            Ok(resolved) => {
                debug!(var = %var_name, "Resolved config value from environment");
                resolved
            }
            Err(_) => {
                debug!(var = %var_name, "Environment variable not set, using literal");
                value.to_string()
            }
        }
    } else {
        value.to_string()
    }
}

/// Walk a YAML document and resolve every `$VAR` string in place.
pub fn resolve_env_references(value: &mut serde_yaml::Value) {
    match value {
        serde_yaml::Value::String(s) if s.starts_with('$') => {
            *s = resolve_env_reference(s);
        }
        serde_yaml::Value::Mapping(map) => {
            for (_, v) in map.iter_mut() {
                resolve_env_references(v);
            }
        }
        serde_yaml::Value::Sequence(seq) => {
            for v in seq.iter_mut() {
                resolve_env_references(v);
            }
        }
        _ => {}
    }
}
