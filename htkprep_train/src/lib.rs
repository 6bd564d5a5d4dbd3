pub mod hte;
pub mod model;

use anyhow::{Context, Result};
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tracing::info;

pub use hte::HteConfig;
pub use model::{Activation, DnnSpec, Layer, write_mmf};

#[derive(Debug, Clone, Serialize)]
pub struct InitDnnSummary {
    /// Every config entry after defaults and overrides, sorted by key.
    pub config: Vec<(String, String)>,
    pub feature_type: String,
    pub layers: Vec<Layer>,
    pub output_path: PathBuf,
}

/// Write a zero-initialised DNN for the HTE config at `config_path`.
/// `structure` replaces the config's `DNNSTRUCTURE` when given.
pub fn generate_init_dnn(
    config_path: &Path,
    structure: Option<&str>,
    output_path: &Path,
) -> Result<InitDnnSummary> {
    let mut config = HteConfig::from_file(config_path)?;
    if let Some(structure) = structure {
        config.set(hte::DNN_STRUCTURE, structure);
    }
    for (key, value) in config.iter() {
        info!("{key}\t= {value}");
    }

    let spec = DnnSpec::from_config(&config)
        .with_context(|| format!("invalid DNN config: {}", config_path.display()))?;

    if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory: {}", parent.display()))?;
    }
    let file = File::create(output_path)
        .with_context(|| format!("failed to create model file: {}", output_path.display()))?;
    write_mmf(&spec, BufWriter::new(file))
        .with_context(|| format!("failed to write model file: {}", output_path.display()))?;
    info!("Wrote: {}", output_path.display());

    Ok(InitDnnSummary {
        config: config
            .iter()
            .map(|(k, v)| (k.to_owned(), v.to_owned()))
            .collect(),
        feature_type: spec.feature_type,
        layers: spec.layers,
        output_path: output_path.to_path_buf(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generates_from_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("HTE");
        std::fs::write(
            &config,
            "set FEATURETYPE = MFCC_0_D_A\nset FEATUREDIM = 39\nset CONTEXTSHIFT = -1,0,1\n",
        )
        .unwrap();
        let output = dir.path().join("models/MMF");

        let summary = generate_init_dnn(&config, Some("117X8X4"), &output).unwrap();
        assert_eq!(summary.feature_type, "<MFCC_0_D_A>");
        assert_eq!(summary.layers.len(), 2);
        assert!(summary
            .config
            .contains(&("DNNSTRUCTURE".to_owned(), "117X8X4".to_owned())));

        let text = std::fs::read_to_string(&output).unwrap();
        assert!(text.starts_with("~o\n<STREAMINFO> 1 39\n<VECSIZE> 39<NULLD><MFCC_0_D_A><DIAGC>\n"));
        assert!(text.contains("<MATRIX> 8 117\n"));
        assert!(text.contains("<ACTIVATION> \"SIGMOID\"\n"));
        assert!(text.ends_with("<ENDANN>\n"));
    }

    #[test]
    fn missing_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = generate_init_dnn(&dir.path().join("nope"), None, &dir.path().join("MMF"))
            .unwrap_err();
        assert!(format!("{err:#}").contains("failed to read HTE config"));
    }

    #[test]
    fn bad_structure_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("HTE");
        std::fs::write(&config, "").unwrap();
        let output = dir.path().join("MMF");
        assert!(generate_init_dnn(&config, Some("720"), &output).is_err());
        assert!(!output.exists());
    }
}
