//! Initial feed-forward DNN definition in HTK MMF text form.
//!
//! All weights and biases are zero; activation parameters take their
//! conventional starting values. Layer ids are `in` for the input features,
//! `2..` for hidden layers and `out` for the last one.

use anyhow::{Context, Result, anyhow, bail};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::{self, Write};
use std::str::FromStr;
use tracing::warn;

use htkprep_core::text::format_exp;

use crate::hte::{self, HteConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Activation {
    Affine,
    Hermite,
    Linear,
    Relu,
    Prelu,
    ParmRelu,
    Sigmoid,
    LhucSigmoid,
    PSigmoid,
    ParmSigmoid,
    SoftRelu,
    Softmax,
    Tanh,
}

impl Activation {
    pub const ALL: [Activation; 13] = [
        Activation::Affine,
        Activation::Hermite,
        Activation::Linear,
        Activation::Relu,
        Activation::Prelu,
        Activation::ParmRelu,
        Activation::Sigmoid,
        Activation::LhucSigmoid,
        Activation::PSigmoid,
        Activation::ParmSigmoid,
        Activation::SoftRelu,
        Activation::Softmax,
        Activation::Tanh,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Activation::Affine => "AFFINE",
            Activation::Hermite => "HERMITE",
            Activation::Linear => "LINEAR",
            Activation::Relu => "RELU",
            Activation::Prelu => "PRELU",
            Activation::ParmRelu => "PARMRELU",
            Activation::Sigmoid => "SIGMOID",
            Activation::LhucSigmoid => "LHUCSIGMOID",
            Activation::PSigmoid => "PSIGMOID",
            Activation::ParmSigmoid => "PARMSIGMOID",
            Activation::SoftRelu => "SOFTRELU",
            Activation::Softmax => "SOFTMAX",
            Activation::Tanh => "TANH",
        }
    }

    /// Initial values of the activation's trainable parameters.
    pub fn parameters(self) -> &'static [f64] {
        match self {
            Activation::Affine => &[1.0, 0.0],
            Activation::Hermite => &[0.0; 10],
            Activation::Prelu | Activation::LhucSigmoid | Activation::PSigmoid => &[1.0],
            Activation::ParmRelu => &[1.0, 0.25],
            Activation::ParmSigmoid => &[1.0, 1.0, 0.0],
            Activation::Linear
            | Activation::Relu
            | Activation::Sigmoid
            | Activation::SoftRelu
            | Activation::Softmax
            | Activation::Tanh => &[],
        }
    }
}

impl FromStr for Activation {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let upper = s.to_uppercase();
        Activation::ALL
            .into_iter()
            .find(|a| a.name() == upper)
            .ok_or_else(|| anyhow!("unknown activation function: {s}"))
    }
}

impl fmt::Display for Activation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Layer {
    pub nodes: usize,
    pub input_dim: usize,
    pub activation: Activation,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DnnSpec {
    /// Feature kind wrapped in angle brackets, e.g. `<FBANK_D_Z>`.
    pub feature_type: String,
    pub feature_dim: usize,
    pub context_shift: Vec<String>,
    pub layers: Vec<Layer>,
}

fn required<'a>(config: &'a HteConfig, key: &str) -> Result<&'a str> {
    config
        .get(key)
        .ok_or_else(|| anyhow!("missing config entry {key}"))
}

fn wrap(left: &str, word: &str, right: &str) -> String {
    let mut out = String::new();
    if !word.starts_with(left) {
        out.push_str(left);
    }
    out.push_str(word);
    if !word.ends_with(right) {
        out.push_str(right);
    }
    out
}

impl DnnSpec {
    pub fn from_config(config: &HteConfig) -> Result<Self> {
        let feature_type = wrap("<", required(config, hte::FEATURE_TYPE)?, ">");
        let feature_dim: usize = required(config, hte::FEATURE_DIM)?
            .trim()
            .parse()
            .context("FEATUREDIM is not a number")?;
        let context_shift: Vec<String> = required(config, hte::CONTEXT_SHIFT)?
            .split(',')
            .map(str::to_owned)
            .collect();
        let hidden: Activation = required(config, hte::HIDDEN_ACTIVATION)?.parse()?;
        let output: Activation = required(config, hte::OUTPUT_ACTIVATION)?.parse()?;

        let structure = required(config, hte::DNN_STRUCTURE)?;
        let dims = structure
            .split('X')
            .map(|d| d.trim().parse::<usize>())
            .collect::<Result<Vec<_>, _>>()
            .with_context(|| format!("invalid DNN structure: {structure}"))?;
        if dims.len() < 2 {
            bail!("DNN structure {structure} needs at least an input and an output size");
        }

        let mut layers: Vec<Layer> = dims
            .windows(2)
            .map(|pair| Layer {
                nodes: pair[1],
                input_dim: pair[0],
                activation: hidden,
            })
            .collect();
        if let Some(last) = layers.last_mut() {
            last.activation = output;
        }

        let input_dim = feature_dim * context_shift.len();
        if layers[0].input_dim != input_dim {
            layers[0].input_dim = input_dim;
            warn!("unmatched input dimension, reset to {input_dim}");
        }

        Ok(Self {
            feature_type,
            feature_dim,
            context_shift,
            layers,
        })
    }

    /// `position` is a layer index; -1 stands for the input features.
    fn layer_id(&self, position: isize) -> String {
        if position == self.layers.len() as isize - 1 {
            "out".to_owned()
        } else if position < 0 {
            "in".to_owned()
        } else {
            (position + 2).to_string()
        }
    }
}

fn write_vector<W: Write>(out: &mut W, len: usize, value: f64) -> io::Result<()> {
    let cell = format!(" {}", format_exp(value));
    for _ in 0..len {
        out.write_all(cell.as_bytes())?;
    }
    writeln!(out)
}

/// Write the model definition for `spec`.
pub fn write_mmf<W: Write>(spec: &DnnSpec, mut out: W) -> io::Result<()> {
    let dim = spec.feature_dim;

    writeln!(out, "~o")?;
    writeln!(out, "<STREAMINFO> 1 {dim}")?;
    writeln!(out, "<VECSIZE> {dim}<NULLD>{}<DIAGC>", spec.feature_type)?;

    // ~V: biases and activation parameters
    for (idx, layer) in spec.layers.iter().enumerate() {
        let id = spec.layer_id(idx as isize);
        writeln!(out, "~V \"layer{id}_bias\"")?;
        writeln!(out, "<VECTOR> {}", layer.nodes)?;
        write_vector(&mut out, layer.nodes, 0.0)?;
        for (pidx, value) in layer.activation.parameters().iter().enumerate() {
            writeln!(out, "~V \"layer{id}_actparam{}\"", pidx + 1)?;
            writeln!(out, "<VECTOR> {}", layer.nodes)?;
            write_vector(&mut out, layer.nodes, *value)?;
        }
    }

    // ~M: weights
    for (idx, layer) in spec.layers.iter().enumerate() {
        let id = spec.layer_id(idx as isize);
        writeln!(out, "~M \"layer{id}_weight\"")?;
        writeln!(out, "<MATRIX> {} {}", layer.nodes, layer.input_dim)?;
        for _ in 0..layer.nodes {
            write_vector(&mut out, layer.input_dim, 0.0)?;
        }
    }

    // ~F: what each layer reads
    for (idx, layer) in spec.layers.iter().enumerate() {
        let source = spec.layer_id(idx as isize - 1);
        writeln!(out, "~F \"layer{source}_feamix\"")?;
        writeln!(out, "<NUMFEATURES> 1 {}", layer.input_dim)?;
        if idx == 0 {
            writeln!(out, "<FEATURE> 1 {dim}")?;
            writeln!(out, "<SOURCE>")?;
            writeln!(out, "{}", spec.feature_type)?;
            writeln!(out, "<CONTEXTSHIFT> {}", spec.context_shift.len())?;
            for shift in &spec.context_shift {
                write!(out, " {shift}")?;
            }
            writeln!(out)?;
        } else {
            writeln!(out, "<FEATURE> 1 {}", layer.input_dim)?;
            writeln!(out, "<SOURCE>")?;
            writeln!(out, "~L \"layer{source}\"")?;
            writeln!(out, "<CONTEXTSHIFT> 1")?;
            writeln!(out, " 0")?;
        }
    }

    // ~L: layers
    for (idx, layer) in spec.layers.iter().enumerate() {
        let id = spec.layer_id(idx as isize);
        let source = spec.layer_id(idx as isize - 1);
        let parameters = layer.activation.parameters();
        writeln!(out, "~L \"layer{id}\"")?;
        writeln!(out, "<BEGINLAYER>")?;
        writeln!(out, "<LAYERKIND> \"PERCEPTRON\"")?;
        writeln!(out, "<INPUTFEATURE>")?;
        writeln!(out, "~F \"layer{source}_feamix\"")?;
        writeln!(out, "<WEIGHT>")?;
        writeln!(out, "~M \"layer{id}_weight\"")?;
        writeln!(out, "<BIAS>")?;
        writeln!(out, "~V \"layer{id}_bias\"")?;
        writeln!(out, "<ACTIVATION> \"{}\"", layer.activation)?;
        if !parameters.is_empty() {
            writeln!(out, "<NUMPARAMETERS> {}", parameters.len())?;
        }
        for pidx in 1..=parameters.len() {
            writeln!(out, "<PARAMETER> {pidx}")?;
            writeln!(out, "~V \"layer{id}_actparam{pidx}\"")?;
        }
        writeln!(out, "<ENDLAYER>")?;
    }

    // ~N: the network
    writeln!(out, "~N \"DNN1\"")?;
    writeln!(out, "<BEGINANN>")?;
    writeln!(out, "<NUMLAYERS> {}", spec.layers.len() + 1)?;
    for idx in 0..spec.layers.len() {
        writeln!(out, "<LAYER> {}", idx + 2)?;
        writeln!(out, "~L \"layer{}\"", spec.layer_id(idx as isize))?;
    }
    writeln!(out, "<ENDANN>")?;
    out.flush()
}
