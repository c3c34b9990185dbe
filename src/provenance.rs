//! Provenance string builders for the persisted container's group-scoped
//! `environment` and `parameters` attributes.

use serde::Serialize;
use serde_json::json;

/// Describes the software environment that produced a tree sequence:
/// crate version, Rust target triple, and host OS. Mirrors the fields the
/// original implementation records via its own environment encoder.
#[derive(Serialize)]
pub struct Environment {
    pub library_version: String,
    pub target_triple: String,
    pub os: String,
}

impl Environment {
    pub fn current() -> Self {
        Environment {
            library_version: env!("CARGO_PKG_VERSION").to_string(),
            target_triple: std::env::consts::ARCH.to_string(),
            os: std::env::consts::OS.to_string(),
        }
    }

    pub fn to_json_string(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// Records the parameters used to construct or mutate a tree sequence, for
/// the `parameters` group attribute. `extra` holds any component-specific
/// fields (mutation rate and seed, sample size, etc).
pub fn parameters_json(command: &str, extra: serde_json::Value) -> String {
    json!({
        "command": command,
        "parameters": extra,
    })
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn environment_round_trips_as_json() {
        let env = Environment::current();
        let s = env.to_json_string();
        let v: serde_json::Value = serde_json::from_str(&s).unwrap();
        assert!(v.get("library_version").is_some());
    }

    #[test]
    fn parameters_json_embeds_command_and_fields() {
        let s = parameters_json("generate_mutations", json!({"rate": 1.5, "seed": 42}));
        let v: serde_json::Value = serde_json::from_str(&s).unwrap();
        assert_eq!(v["command"], "generate_mutations");
        assert_eq!(v["parameters"]["seed"], 42);
    }
}
