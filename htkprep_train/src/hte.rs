//! Reader for HTE experiment config files (`set KEY = value` lines).

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::warn;

pub const DNN_STRUCTURE: &str = "DNNSTRUCTURE";
pub const FEATURE_TYPE: &str = "FEATURETYPE";
pub const FEATURE_DIM: &str = "FEATUREDIM";
pub const CONTEXT_SHIFT: &str = "CONTEXTSHIFT";
pub const HIDDEN_ACTIVATION: &str = "HIDDENACTIVATION";
pub const OUTPUT_ACTIVATION: &str = "OUTPUTACTIVATION";

const DEFAULTS: [(&str, &str); 6] = [
    (DNN_STRUCTURE, "720X1000X3000"),
    (FEATURE_TYPE, "<FBANK_D_Z>"),
    (FEATURE_DIM, "80"),
    (CONTEXT_SHIFT, "-4,-3,-2,-1,0,1,2,3,4"),
    (HIDDEN_ACTIVATION, "SIGMOID"),
    (OUTPUT_ACTIVATION, "SOFTMAX"),
];

/// Key/value settings, iterated in sorted key order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HteConfig {
    entries: BTreeMap<String, String>,
}

impl Default for HteConfig {
    fn default() -> Self {
        Self {
            entries: DEFAULTS
                .iter()
                .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
                .collect(),
        }
    }
}

impl HteConfig {
    /// Defaults overridden by every well-formed assignment in `text`.
    pub fn parse(text: &str) -> Self {
        let mut config = Self::default();
        for raw in text.lines() {
            let Some(line) = normalize(raw) else {
                continue;
            };
            let mut fields = line.split('=');
            match (fields.next(), fields.next(), fields.next()) {
                (Some(key), Some(value), None) => config.set(key, value),
                _ => warn!("ignore illegal config {line}"),
            }
        }
        config
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read HTE config: {}", path.display()))?;
        Ok(Self::parse(&text))
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Keys are case-insensitive and stored upper-cased.
    pub fn set(&mut self, key: &str, value: &str) {
        self.entries.insert(key.to_uppercase(), value.to_owned());
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Shell-ish cleanup of one config line; `None` when nothing is left.
fn normalize(raw: &str) -> Option<String> {
    let line = raw.replace('\t', " ");
    let mut line = line.split('#').next().unwrap_or_default().to_owned();
    while line.contains("  ") {
        line = line.replace("  ", " ");
    }

    // one space off the front, or failing that off the back
    let line = match line.strip_prefix(' ') {
        Some(rest) => rest,
        None => line.strip_suffix(' ').unwrap_or(&line),
    };
    if line.is_empty() {
        return None;
    }
    let line = line.strip_prefix("set ").unwrap_or(line);
    Some(line.replace(" = ", "="))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_present() {
        let config = HteConfig::default();
        assert_eq!(config.get(DNN_STRUCTURE), Some("720X1000X3000"));
        assert_eq!(config.get(FEATURE_DIM), Some("80"));
        let keys: Vec<&str> = config.iter().map(|(k, _)| k).collect();
        assert_eq!(
            keys,
            [
                CONTEXT_SHIFT,
                DNN_STRUCTURE,
                FEATURE_DIM,
                FEATURE_TYPE,
                HIDDEN_ACTIVATION,
                OUTPUT_ACTIVATION
            ]
        );
    }

    #[test]
    fn parses_set_lines() {
        let text = "\
#!/bin/tcsh
# comment only
set FEATUREDIM = 39   # trailing comment
set\tdnnstructure=351X500X120
\tset HIDDENACTIVATION = relu
set NUMEPOCHS = 10
";
        let config = HteConfig::parse(text);
        assert_eq!(config.get(FEATURE_DIM), Some("39"));
        assert_eq!(config.get(DNN_STRUCTURE), Some("351X500X120"));
        assert_eq!(config.get(HIDDEN_ACTIVATION), Some("relu"));
        assert_eq!(config.get("NUMEPOCHS"), Some("10"));
        assert_eq!(config.get(OUTPUT_ACTIVATION), Some("SOFTMAX"));
    }

    #[test]
    fn illegal_lines_are_skipped() {
        let config = HteConfig::parse("set A = 1 = 2\njust words\nset B=2\n");
        assert_eq!(config.get("A"), None);
        assert_eq!(config.get("JUST WORDS"), None);
        assert_eq!(config.get("B"), Some("2"));
    }

    #[test]
    fn later_assignments_win() {
        let config = HteConfig::parse("set FEATUREDIM=13\nset FEATUREDIM=26\n");
        assert_eq!(config.get(FEATURE_DIM), Some("26"));
    }

    #[test]
    fn normalize_strips_one_side_only() {
        assert_eq!(normalize("  set X = 1 ").as_deref(), Some("X=1 "));
        assert_eq!(normalize("set X=1 ").as_deref(), Some("X=1"));
        assert_eq!(normalize("   # nothing"), None);
    }
}
