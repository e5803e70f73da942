//! Linear-chain sequence taggers (structured perceptron and CRF).
//!
//! Both model families score a label sequence as the sum of feature weights
//! plus label transition weights, and decode with Viterbi. They differ in
//! where feature templates come from: CRF models carry their own templates
//! (CRF++ syntax, e.g. `U01:%x[-1,0]/%x[0,0]`), perceptron models use the
//! fixed templates of their task.
//!
//! Models are stored as JSON:
//!
//! ```json
//! {
//!   "labels": ["B", "M", "E", "S"],
//!   "templates": ["U0:%x[0,0]"],
//!   "transitions": [[0, 0, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0]],
//!   "weights": { "U0:中": [1.0, 0.0, 0.0, 0.0] }
//! }
//! ```

use std::sync::LazyLock;

use ahash::AHashMap;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{HansegError, Result};

static CELL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"%x\[(-?\d+),(\d+)\]").expect("valid template pattern"));

/// Serialized form of a tagging model.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct LinearModel {
    /// Output labels.
    pub labels: Vec<String>,

    /// Feature templates; empty for perceptron models.
    #[serde(default)]
    pub templates: Vec<String>,

    /// `transitions[from][to]`; empty means all zero.
    #[serde(default)]
    pub transitions: Vec<Vec<f32>>,

    /// Feature string to per-label weights.
    pub weights: AHashMap<String, Vec<f32>>,
}

impl LinearModel {
    /// Parse a JSON model.
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Serialize to JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

#[derive(Clone, Debug, PartialEq)]
enum TemplatePart {
    Literal(String),
    Cell { row: isize, column: usize },
}

/// A compiled CRF++ style unigram feature template.
#[derive(Clone, Debug, PartialEq)]
pub struct FeatureTemplate {
    raw: String,
    parts: Vec<TemplatePart>,
}

impl FeatureTemplate {
    /// Compile a template such as `U02:%x[-1,0]/%x[0,0]`.
    pub fn parse(raw: &str) -> Result<Self> {
        let mut parts = Vec::new();
        let mut last = 0;
        for captures in CELL_PATTERN.captures_iter(raw) {
            let Some(whole) = captures.get(0) else {
                continue;
            };
            if whole.start() > last {
                parts.push(TemplatePart::Literal(raw[last..whole.start()].to_string()));
            }
            let row = captures[1]
                .parse::<isize>()
                .map_err(|_| HansegError::parse(format!("template '{raw}': bad row offset")))?;
            let column = captures[2]
                .parse::<usize>()
                .map_err(|_| HansegError::parse(format!("template '{raw}': bad column")))?;
            parts.push(TemplatePart::Cell { row, column });
            last = whole.end();
        }
        if last < raw.len() {
            parts.push(TemplatePart::Literal(raw[last..].to_string()));
        }
        if !parts.iter().any(|p| matches!(p, TemplatePart::Cell { .. })) {
            return Err(HansegError::parse(format!(
                "template '{raw}' references no cell"
            )));
        }
        Ok(FeatureTemplate {
            raw: raw.to_string(),
            parts,
        })
    }

    /// The template source.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Instantiate the template at row `index`.
    ///
    /// Rows before the sequence read as `_B-n`, rows after it as `_B+n`,
    /// missing columns as the empty string.
    pub fn expand(&self, rows: &[Vec<&str>], index: usize) -> String {
        let mut feature = String::new();
        for part in &self.parts {
            match part {
                TemplatePart::Literal(text) => feature.push_str(text),
                TemplatePart::Cell { row, column } => {
                    let target = index as isize + row;
                    if target < 0 {
                        feature.push_str(&format!("_B{target}"));
                    } else if target as usize >= rows.len() {
                        feature.push_str(&format!("_B+{}", target as usize - rows.len() + 1));
                    } else if let Some(cell) = rows[target as usize].get(*column) {
                        feature.push_str(cell);
                    }
                }
            }
        }
        feature
    }
}

/// A tagging model ready for decoding.
#[derive(Clone, Debug)]
pub struct TaggingModel {
    labels: Vec<String>,
    templates: Vec<FeatureTemplate>,
    transitions: Vec<Vec<f32>>,
    weights: AHashMap<String, Vec<f32>>,
}

impl TaggingModel {
    /// Validate `model` and compile its templates.
    ///
    /// `default_templates` are used when the model carries none; CRF loaders
    /// pass an empty slice so that a model without templates is rejected.
    /// Label-bigram templates (`B...`) are skipped, transitions come from the
    /// matrix.
    pub fn compile(model: LinearModel, default_templates: &[&str]) -> Result<Self> {
        let label_count = model.labels.len();
        if label_count == 0 {
            return Err(HansegError::parse("model has no labels"));
        }
        for (feature, weights) in &model.weights {
            if weights.len() != label_count {
                return Err(HansegError::parse(format!(
                    "feature '{feature}' has {} weights, expected {label_count}",
                    weights.len()
                )));
            }
        }

        let transitions = if model.transitions.is_empty() {
            vec![vec![0.0; label_count]; label_count]
        } else {
            if model.transitions.len() != label_count
                || model.transitions.iter().any(|row| row.len() != label_count)
            {
                return Err(HansegError::parse(format!(
                    "transition matrix must be {label_count}x{label_count}"
                )));
            }
            model.transitions
        };

        let sources: Vec<&str> = if model.templates.is_empty() {
            default_templates.to_vec()
        } else {
            model.templates.iter().map(String::as_str).collect()
        };
        let templates = sources
            .into_iter()
            .filter(|t| !t.starts_with('B'))
            .map(FeatureTemplate::parse)
            .collect::<Result<Vec<_>>>()?;
        if templates.is_empty() {
            return Err(HansegError::parse("model has no feature templates"));
        }

        Ok(TaggingModel {
            labels: model.labels,
            templates,
            transitions,
            weights: model.weights,
        })
    }

    /// Output labels.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Index of `label`.
    pub fn label_index(&self, label: &str) -> Option<usize> {
        self.labels.iter().position(|l| l == label)
    }

    /// Compiled templates.
    pub fn templates(&self) -> &[FeatureTemplate] {
        &self.templates
    }

    /// Number of weighted features.
    pub fn feature_count(&self) -> usize {
        self.weights.len()
    }

    fn emissions(&self, rows: &[Vec<&str>], index: usize) -> Vec<f32> {
        let mut scores = vec![0.0f32; self.labels.len()];
        for template in &self.templates {
            let feature = template.expand(rows, index);
            if let Some(weights) = self.weights.get(&feature) {
                for (score, weight) in scores.iter_mut().zip(weights) {
                    *score += weight;
                }
            }
        }
        scores
    }

    /// Best label index for every row.
    pub fn tag(&self, rows: &[Vec<&str>]) -> Vec<usize> {
        if rows.is_empty() {
            return Vec::new();
        }
        let label_count = self.labels.len();
        let mut scores = self.emissions(rows, 0);
        let mut back: Vec<Vec<usize>> = Vec::with_capacity(rows.len());
        back.push(vec![0; label_count]);

        for index in 1..rows.len() {
            let emissions = self.emissions(rows, index);
            let mut next = vec![f32::NEG_INFINITY; label_count];
            let mut pointers = vec![0usize; label_count];
            for to in 0..label_count {
                for from in 0..label_count {
                    let candidate = scores[from] + self.transitions[from][to];
                    if candidate > next[to] {
                        next[to] = candidate;
                        pointers[to] = from;
                    }
                }
                next[to] += emissions[to];
            }
            scores = next;
            back.push(pointers);
        }

        let mut best = 0;
        for label in 1..label_count {
            if scores[label] > scores[best] {
                best = label;
            }
        }
        let mut path = vec![0usize; rows.len()];
        path[rows.len() - 1] = best;
        for index in (1..rows.len()).rev() {
            best = back[index][best];
            path[index - 1] = best;
        }
        path
    }

    /// Best label for every row.
    pub fn tag_labels(&self, rows: &[Vec<&str>]) -> Vec<&str> {
        self.tag(rows)
            .into_iter()
            .map(|i| self.labels[i].as_str())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(chars: &str) -> Vec<String> {
        chars.chars().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_template_expand() {
        let template = FeatureTemplate::parse("U02:%x[-1,0]/%x[0,0]").unwrap();
        let owned = rows("中国");
        let table: Vec<Vec<&str>> = owned.iter().map(|c| vec![c.as_str()]).collect();

        assert_eq!(template.expand(&table, 0), "U02:_B-1/中");
        assert_eq!(template.expand(&table, 1), "U02:中/国");

        let next = FeatureTemplate::parse("U03:%x[1,0]").unwrap();
        assert_eq!(next.expand(&table, 1), "U03:_B+1");
    }

    #[test]
    fn test_template_without_cell_is_rejected() {
        assert!(FeatureTemplate::parse("U00:constant").is_err());
    }

    #[test]
    fn test_compile_validates_weights() {
        let mut model = LinearModel {
            labels: vec!["B".into(), "E".into()],
            ..Default::default()
        };
        model.weights.insert("U0:中".into(), vec![1.0]);
        assert!(TaggingModel::compile(model, &["U0:%x[0,0]"]).is_err());
    }

    #[test]
    fn test_compile_requires_templates() {
        let model = LinearModel {
            labels: vec!["O".into()],
            ..Default::default()
        };
        assert!(TaggingModel::compile(model, &[]).is_err());
    }

    #[test]
    fn test_viterbi_uses_transitions() {
        // Emissions prefer S everywhere, but S->S is forbidden.
        let model = LinearModel {
            labels: vec!["B".into(), "E".into(), "S".into()],
            templates: vec!["U0:%x[0,0]".into()],
            transitions: vec![
                vec![-100.0, 0.0, -100.0],
                vec![0.0, -100.0, 0.0],
                vec![0.0, -100.0, -100.0],
            ],
            weights: [
                ("U0:中".to_string(), vec![1.0, 0.0, 2.0]),
                ("U0:国".to_string(), vec![0.0, 1.0, 2.0]),
            ]
            .into_iter()
            .collect(),
        };
        let model = TaggingModel::compile(model, &[]).unwrap();
        let owned = rows("中国");
        let table: Vec<Vec<&str>> = owned.iter().map(|c| vec![c.as_str()]).collect();

        assert_eq!(model.tag_labels(&table), vec!["B", "E"]);
    }

    #[test]
    fn test_json_round_trip_keeps_templates() {
        let json = r#"{"labels":["O"],"templates":["U0:%x[0,0]","B"],"weights":{}}"#;
        let model = TaggingModel::compile(LinearModel::from_json(json).unwrap(), &[]).unwrap();
        assert_eq!(model.templates().len(), 1);
        assert_eq!(model.tag(&[]), Vec::<usize>::new());
    }
}
