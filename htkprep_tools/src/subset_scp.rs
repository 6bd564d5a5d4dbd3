use anyhow::{Context, Result, bail};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::info;

use htkprep_core::mask::Mask;
use htkprep_core::scp;

use crate::lines::{read_lines, write_lines};

pub const DEFAULT_SPEAKER_MASK: &str = "%%%%%%*";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubsetOptions {
    /// Select whole speakers rather than utterances within each speaker.
    pub speaker: bool,
    pub speaker_mask: String,
    /// Pick at random instead of taking the first entries.
    pub random: bool,
    /// Fraction to keep, in `(0, 1]`.
    pub percent: f64,
    /// Sort the output lines.
    pub order: bool,
    /// Seed for random selection; entropy when unset.
    pub seed: Option<u64>,
}

impl Default for SubsetOptions {
    fn default() -> Self {
        Self {
            speaker: false,
            speaker_mask: DEFAULT_SPEAKER_MASK.to_owned(),
            random: false,
            percent: 0.1,
            order: false,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SubsetSummary {
    pub input_lines: usize,
    pub speakers: usize,
    pub selected_speakers: usize,
    pub output_lines: usize,
}

/// Lines grouped by speaker, both in first-seen order.
struct SpeakerGroups {
    speakers: Vec<(String, Vec<String>)>,
}

impl SpeakerGroups {
    fn build<S: AsRef<str>>(lines: &[S], mask: &Mask) -> Result<Self> {
        let mut speakers: Vec<(String, Vec<String>)> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();
        for (lineno, raw) in lines.iter().enumerate() {
            let line: &str = raw.as_ref();
            if line.trim().is_empty() {
                continue;
            }
            let speaker = mask
                .apply(scp::logical_name(line))
                .with_context(|| format!("speaker mask on line {}", lineno + 1))?;
            let slot = *index.entry(speaker.clone()).or_insert_with(|| {
                speakers.push((speaker, Vec::new()));
                speakers.len() - 1
            });
            speakers[slot].1.push(line.to_owned());
        }
        Ok(Self { speakers })
    }
}

/// Keep `floor(count * percent)` indices, optionally shuffled first, in
/// ascending order.
fn select_indices(count: usize, percent: f64, rng: Option<&mut StdRng>) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..count).collect();
    if let Some(rng) = rng {
        indices.shuffle(rng);
    }
    indices.truncate((count as f64 * percent) as usize);
    indices.sort_unstable();
    indices
}

pub fn subset_lines<S: AsRef<str>>(
    lines: &[S],
    options: &SubsetOptions,
) -> Result<(Vec<String>, SubsetSummary)> {
    if !(options.percent > 0.0 && options.percent <= 1.0) {
        bail!("percent should be set between 0.0 and 1.0, got {}", options.percent);
    }

    let mask = Mask::new(options.speaker_mask.as_str());
    let groups = SpeakerGroups::build(lines, &mask)?;
    let mut rng = options.random.then(|| match options.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    });

    let mut summary = SubsetSummary {
        input_lines: groups.speakers.iter().map(|(_, l)| l.len()).sum(),
        speakers: groups.speakers.len(),
        ..Default::default()
    };

    let mut output = Vec::new();
    if options.speaker {
        let chosen = select_indices(groups.speakers.len(), options.percent, rng.as_mut());
        summary.selected_speakers = chosen.len();
        for idx in chosen {
            output.extend(groups.speakers[idx].1.iter().cloned());
        }
    } else {
        for (_, utterances) in &groups.speakers {
            let chosen = select_indices(utterances.len(), options.percent, rng.as_mut());
            if !chosen.is_empty() {
                summary.selected_speakers += 1;
            }
            output.extend(chosen.into_iter().map(|idx| utterances[idx].clone()));
        }
    }

    if options.order {
        output.sort();
    }
    summary.output_lines = output.len();
    Ok((output, summary))
}

pub fn subset_file(input: &Path, output: &Path, options: &SubsetOptions) -> Result<SubsetSummary> {
    let lines = read_lines(input)?;
    let (selected, summary) = subset_lines(&lines, options)?;
    write_lines(output, &selected)?;

    info!("Wrote: {}", output.display());
    info!(
        "Kept: {} of {} lines ({} of {} speakers)",
        summary.output_lines, summary.input_lines, summary.selected_speakers, summary.speakers
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corpus() -> Vec<String> {
        let mut lines = Vec::new();
        for spk in ["spk001", "spk002", "spk003"] {
            for utt in ["a", "b", "c", "d"] {
                lines.push(format!("{spk}_{utt}=/data/{spk}/{spk}_{utt}.plp[0,100]"));
            }
        }
        lines
    }

    #[test]
    fn utterance_mode_takes_leading_fraction_per_speaker() {
        let options = SubsetOptions {
            percent: 0.5,
            ..Default::default()
        };
        let (out, summary) = subset_lines(&corpus(), &options).unwrap();
        let names: Vec<&str> = out.iter().map(|l| scp::logical_name(l)).collect();
        assert_eq!(
            names,
            ["spk001_a", "spk001_b", "spk002_a", "spk002_b", "spk003_a", "spk003_b"]
        );
        assert_eq!(summary.speakers, 3);
        assert_eq!(summary.input_lines, 12);
        assert_eq!(summary.output_lines, 6);
    }

    #[test]
    fn speaker_mode_floors_the_count() {
        let options = SubsetOptions {
            speaker: true,
            percent: 0.5,
            ..Default::default()
        };
        let (out, summary) = subset_lines(&corpus(), &options).unwrap();
        assert_eq!(summary.selected_speakers, 1);
        assert_eq!(out, corpus()[..4]);
    }

    #[test]
    fn small_fraction_can_select_nothing() {
        let (out, _) = subset_lines(&corpus(), &SubsetOptions::default()).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn seeded_random_selection_is_reproducible_and_ordered() {
        let options = SubsetOptions {
            random: true,
            percent: 0.75,
            seed: Some(7),
            ..Default::default()
        };
        let all = corpus();
        let (first, _) = subset_lines(&all, &options).unwrap();
        let (second, _) = subset_lines(&all, &options).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 9);

        // selections keep input order
        let positions: Vec<usize> = first
            .iter()
            .map(|l| all.iter().position(|a| a == l).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn percent_out_of_range() {
        for percent in [0.0, -0.5, 1.5, f64::NAN] {
            let options = SubsetOptions {
                percent,
                ..Default::default()
            };
            assert!(subset_lines(&corpus(), &options).is_err(), "{percent}");
        }
    }

    #[test]
    fn order_sorts_output() {
        let lines = ["zed001_x=/z.plp", "abc001_y=/a.plp", "zed001_a=/y.plp"];
        let options = SubsetOptions {
            percent: 1.0,
            order: true,
            ..Default::default()
        };
        let (out, _) = subset_lines(&lines, &options).unwrap();
        assert_eq!(out, ["abc001_y=/a.plp", "zed001_a=/y.plp", "zed001_x=/z.plp"]);
    }

    #[test]
    fn short_names_fail_the_mask() {
        let lines = ["ab=/x.plp"];
        let options = SubsetOptions {
            percent: 1.0,
            ..Default::default()
        };
        assert!(subset_lines(&lines, &options).is_err());
    }
}
