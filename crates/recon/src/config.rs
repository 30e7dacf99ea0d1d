use std::collections::HashSet;

use serde::Deserialize;

use crate::error::ReconError;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// File layout of a proof run. Every field has a default, so an empty TOML
/// document is a valid config.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProofConfig {
    #[serde(default)]
    pub inputs: InputConfig,
    #[serde(default)]
    pub outputs: OutputConfig,
}

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

/// Ledger file names, relative to the data directory.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InputConfig {
    #[serde(default = "default_ledger_a")]
    pub ledger_a: String,
    #[serde(default = "default_ledger_b")]
    pub ledger_b: String,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            ledger_a: default_ledger_a(),
            ledger_b: default_ledger_b(),
        }
    }
}

fn default_ledger_a() -> String {
    "ledger_A.csv".into()
}

fn default_ledger_b() -> String {
    "ledger_B.csv".into()
}

// ---------------------------------------------------------------------------
// Outputs
// ---------------------------------------------------------------------------

/// Artifact file names, relative to the output directory.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    #[serde(default = "default_full_result")]
    pub full_result: String,
    #[serde(default = "default_reduced_result")]
    pub reduced_result: String,
    #[serde(default = "default_reduced_a")]
    pub reduced_a: String,
    #[serde(default = "default_reduced_b")]
    pub reduced_b: String,
    #[serde(default = "default_manifest")]
    pub manifest: String,
    #[serde(default = "default_report")]
    pub report: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            full_result: default_full_result(),
            reduced_result: default_reduced_result(),
            reduced_a: default_reduced_a(),
            reduced_b: default_reduced_b(),
            manifest: default_manifest(),
            report: default_report(),
        }
    }
}

fn default_full_result() -> String {
    "full_recon_result.json".into()
}

fn default_reduced_result() -> String {
    "reduced_recon_result.json".into()
}

fn default_reduced_a() -> String {
    "reduced_A.csv".into()
}

fn default_reduced_b() -> String {
    "reduced_B.csv".into()
}

fn default_manifest() -> String {
    "sha256_manifest.txt".into()
}

fn default_report() -> String {
    "equivalence_report.txt".into()
}

impl OutputConfig {
    fn named(&self) -> [(&'static str, &str); 6] {
        [
            ("full_result", self.full_result.as_str()),
            ("reduced_result", self.reduced_result.as_str()),
            ("reduced_a", self.reduced_a.as_str()),
            ("reduced_b", self.reduced_b.as_str()),
            ("manifest", self.manifest.as_str()),
            ("report", self.report.as_str()),
        ]
    }
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl ProofConfig {
    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let config: ProofConfig =
            toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        let inputs = [
            ("ledger_a", &self.inputs.ledger_a),
            ("ledger_b", &self.inputs.ledger_b),
        ];
        let outputs = self.outputs.named();

        for (name, value) in inputs.iter().map(|(n, v)| (*n, v.as_str())).chain(outputs) {
            if value.trim().is_empty() {
                return Err(ReconError::ConfigValidation(format!("{name} must not be empty")));
            }
        }

        if self.inputs.ledger_a == self.inputs.ledger_b {
            return Err(ReconError::ConfigValidation(format!(
                "ledger_a and ledger_b both point at '{}'",
                self.inputs.ledger_a
            )));
        }

        // Two artifacts sharing a name would overwrite each other.
        let mut seen = HashSet::new();
        for (name, value) in outputs {
            if !seen.insert(value) {
                return Err(ReconError::ConfigValidation(format!(
                    "output '{name}' reuses file name '{value}'"
                )));
            }
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let config = ProofConfig::from_toml("").unwrap();
        assert_eq!(config, ProofConfig::default());
        assert_eq!(config.inputs.ledger_a, "ledger_A.csv");
        assert_eq!(config.outputs.full_result, "full_recon_result.json");
        assert_eq!(config.outputs.report, "equivalence_report.txt");
    }

    #[test]
    fn partial_override() {
        let config = ProofConfig::from_toml(
            r#"
[inputs]
ledger_b = "bank.csv"

[outputs]
manifest = "MANIFEST.sha256"
"#,
        )
        .unwrap();
        assert_eq!(config.inputs.ledger_a, "ledger_A.csv");
        assert_eq!(config.inputs.ledger_b, "bank.csv");
        assert_eq!(config.outputs.manifest, "MANIFEST.sha256");
        assert_eq!(config.outputs.reduced_a, "reduced_A.csv");
    }

    #[test]
    fn reject_unknown_field() {
        let err = ProofConfig::from_toml("[inputs]\nledger_c = \"x.csv\"\n").unwrap_err();
        assert!(err.to_string().starts_with("config parse error"));
    }

    #[test]
    fn reject_same_ledger_twice() {
        let err = ProofConfig::from_toml(
            "[inputs]\nledger_a = \"same.csv\"\nledger_b = \"same.csv\"\n",
        )
        .unwrap_err();
        assert!(err.to_string().contains("both point at 'same.csv'"));
    }

    #[test]
    fn reject_colliding_outputs() {
        let err = ProofConfig::from_toml(
            "[outputs]\nfull_result = \"r.json\"\nreduced_result = \"r.json\"\n",
        )
        .unwrap_err();
        assert!(err.to_string().contains("reduced_result"));
    }

    #[test]
    fn reject_empty_name() {
        let err = ProofConfig::from_toml("[outputs]\nreport = \"  \"\n").unwrap_err();
        assert!(err.to_string().contains("report must not be empty"));
    }
}
