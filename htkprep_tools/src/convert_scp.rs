//! Rewrite extended SCP lists: rename targets, re-root directories, switch
//! to side-level keys or HCopy-style source/target pairs.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::path::Path;
use tracing::{debug, info, warn};

use htkprep_core::mask::Mask;
use htkprep_core::scp;

use crate::lines::{read_lines, write_lines};

pub const DEFAULT_SIDE_MASK: &str = "%%%%%%%%%%%%????????????????%%%_*";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvertOptions {
    /// Key entries by conversation side instead of by utterance.
    pub side: bool,
    pub side_mask: String,
    /// Sort the output lines.
    pub reorder: bool,
    /// Emit `source target` pairs for HCopy.
    pub hcopy: bool,
    /// Mask deriving the output sub-directory from the source directory.
    pub dir_mask: String,
    /// Name targets after their key and rebase frame ranges to zero.
    pub update: bool,
    pub out_base: String,
    /// Emit bare paths instead of `name=path`.
    pub no_ext: bool,
    pub data_ext: String,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            side: false,
            side_mask: DEFAULT_SIDE_MASK.to_owned(),
            reorder: false,
            hcopy: false,
            dir_mask: String::new(),
            update: false,
            out_base: String::new(),
            no_ext: false,
            data_ext: String::new(),
        }
    }
}

impl ConvertOptions {
    /// Resolve option interactions before a run.
    pub fn normalized(mut self) -> Self {
        if self.hcopy {
            if self.side && self.update {
                warn!("target side names will be changed in HCopy style scp");
            } else if !self.side && !self.update {
                self.update = true;
                warn!("for segment level HCopy, target file names are the segment names");
            }
        }
        if let Some(ext) = self.data_ext.strip_prefix('.') {
            self.data_ext = ext.to_owned();
        }
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConvertSummary {
    pub input_lines: usize,
    /// Lines whose key had already been seen.
    pub duplicates: usize,
    pub output_lines: usize,
}

/// Convert SCP lines in memory. Options are normalized first.
pub fn convert_lines<S: AsRef<str>>(
    lines: &[S],
    options: &ConvertOptions,
) -> Result<(Vec<String>, ConvertSummary)> {
    let options = options.clone().normalized();
    let side_mask = Mask::new(options.side_mask.as_str());
    let dir_mask = Mask::new(options.dir_mask.as_str());
    let mut summary = ConvertSummary::default();

    // first occurrence of a key wins, keys keep input order
    let mut keys: Vec<String> = Vec::new();
    let mut sources: HashMap<String, String> = HashMap::new();
    for (lineno, raw) in lines.iter().enumerate() {
        let line: &str = raw.as_ref();
        if line.trim().is_empty() {
            debug!("skipping blank line {}", lineno + 1);
            continue;
        }
        summary.input_lines += 1;

        let mut key = scp::utterance_id(line).to_owned();
        if options.side {
            key = side_mask
                .apply(&key)
                .with_context(|| format!("side mask on line {}", lineno + 1))?;
        }
        match sources.entry(key) {
            Entry::Occupied(_) => summary.duplicates += 1,
            Entry::Vacant(slot) => {
                keys.push(slot.key().clone());
                let source = if options.side {
                    scp::strip_range(line)
                } else {
                    line
                };
                slot.insert(source.to_owned());
            }
        }
    }

    let out_base = scp::ensure_trailing_sep(&options.out_base);
    let mut output = Vec::with_capacity(keys.len());
    for key in &keys {
        let source = &sources[key];
        let line = convert_one(key, source, &options, &dir_mask, &out_base)
            .with_context(|| format!("converting `{source}`"))?;
        output.push(line);
    }

    if options.reorder {
        output.sort();
    }
    summary.output_lines = output.len();
    Ok((output, summary))
}

fn convert_one(
    key: &str,
    source: &str,
    options: &ConvertOptions,
    dir_mask: &Mask,
    out_base: &str,
) -> Result<String> {
    let source_dir = scp::ensure_trailing_sep(scp::dir_name(scp::physical_path(source)));
    let sub_dir = scp::ensure_trailing_sep(&dir_mask.apply(&source_dir)?);

    let mut target = if out_base.is_empty() {
        format!("{source_dir}{sub_dir}")
    } else {
        format!("{out_base}{sub_dir}")
    };
    if options.update {
        target.push_str(key);
    } else {
        target.push_str(scp::strip_range(scp::base_name(source)));
    }

    let line = if options.hcopy {
        format!("{source} {target}")
    } else {
        if options.update {
            target.push_str(&scp::rebase_range_field(source)?);
        } else if let (false, Some(range)) = (options.side, scp::range_field(source)) {
            target.push('[');
            target.push_str(range);
        }
        if options.no_ext {
            target
        } else {
            format!("{key}={target}")
        }
    };

    if options.data_ext.is_empty() {
        Ok(line)
    } else {
        Ok(scp::replace_data_ext(&line, &options.data_ext, !options.no_ext))
    }
}

/// Convert `input` into `output`.
pub fn convert_file(input: &Path, output: &Path, options: &ConvertOptions) -> Result<ConvertSummary> {
    let lines = read_lines(input)?;
    let (converted, summary) = convert_lines(&lines, options)?;
    write_lines(output, &converted)?;

    info!("Wrote: {}", output.display());
    info!("Entries: {}", summary.output_lines);
    if summary.duplicates > 0 {
        info!("Merged (duplicate key): {}", summary.duplicates);
    }
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    const LINES: [&str; 3] = [
        "spk1_u1=/corpus/fbk/spk1_u1.plp[100,250]",
        "spk1_u2=/corpus/fbk/spk1_u2.plp[0,80]",
        "spk2_u1=/corpus/fbk/spk2_u1.plp[40,41]",
    ];

    fn run(options: ConvertOptions) -> Vec<String> {
        convert_lines(&LINES, &options).unwrap().0
    }

    #[test]
    fn defaults_reproduce_input() {
        assert_eq!(run(ConvertOptions::default()), LINES);
    }

    #[test]
    fn update_renames_and_rebases() {
        let out = run(ConvertOptions {
            update: true,
            ..Default::default()
        });
        assert_eq!(out[0], "spk1_u1=/corpus/fbk/spk1_u1[000000,000150]");
        assert_eq!(out[2], "spk2_u1=/corpus/fbk/spk2_u1[000000,000001]");
    }

    #[test]
    fn out_base_and_dir_mask() {
        let out = run(ConvertOptions {
            out_base: "/out".into(),
            dir_mask: "?%%%%%%*".into(),
            data_ext: ".fea".into(),
            update: true,
            ..Default::default()
        });
        assert_eq!(out[0], "spk1_u1.fea=/out/corpus/spk1_u1.fea[000000,000150]");
    }

    #[test]
    fn reverse_dir_mask_keeps_traversal_order() {
        let out = run(ConvertOptions {
            out_base: "/out/".into(),
            dir_mask: "*/%%%/".into(),
            no_ext: true,
            ..Default::default()
        });
        assert_eq!(out[1], "/out/kbf/spk1_u2.plp[0,80]");
    }

    #[test]
    fn hcopy_forces_segment_names() {
        let out = run(ConvertOptions {
            hcopy: true,
            out_base: "/feats".into(),
            ..Default::default()
        });
        assert_eq!(
            out[0],
            "spk1_u1=/corpus/fbk/spk1_u1.plp[100,250] /feats/spk1_u1"
        );
    }

    #[test]
    fn side_mode_merges_by_mask() {
        let (out, summary) = convert_lines(
            &LINES,
            &ConvertOptions {
                side: true,
                side_mask: "%%%%*".into(),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(
            out,
            ["spk1=/corpus/fbk/spk1_u1.plp", "spk2=/corpus/fbk/spk2_u1.plp"]
        );
        assert_eq!(
            summary,
            ConvertSummary {
                input_lines: 3,
                duplicates: 1,
                output_lines: 2
            }
        );
    }

    #[test]
    fn reorder_sorts_output() {
        let lines = ["b=/x/b.plp", "a=/x/a.plp"];
        let options = ConvertOptions {
            reorder: true,
            ..Default::default()
        };
        let (out, _) = convert_lines(&lines, &options).unwrap();
        assert_eq!(out, ["a=/x/a.plp", "b=/x/b.plp"]);
    }

    #[test]
    fn side_mask_mismatch_aborts() {
        let options = ConvertOptions {
            side: true,
            side_mask: "spk3%*".into(),
            ..Default::default()
        };
        assert!(convert_lines(&LINES, &options).is_err());
    }

    #[test]
    fn normalization() {
        let options = ConvertOptions {
            hcopy: true,
            data_ext: ".plp".into(),
            ..Default::default()
        }
        .normalized();
        assert!(options.update);
        assert_eq!(options.data_ext, "plp");

        let side = ConvertOptions {
            hcopy: true,
            side: true,
            ..Default::default()
        }
        .normalized();
        assert!(!side.update);
    }

    #[test]
    fn round_trip_through_files() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.scp");
        let output = dir.path().join("nested/out.scp");
        std::fs::write(&input, LINES.join("\n") + "\n\n").unwrap();

        let summary = convert_file(&input, &output, &ConvertOptions::default()).unwrap();
        assert_eq!(summary.output_lines, 3);
        let written = std::fs::read_to_string(&output).unwrap();
        assert_eq!(written, LINES.join("\n") + "\n");
    }
}
