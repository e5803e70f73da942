//! Choosing the stages of a composite engine from the models that loaded.
//!
//! The segmentation model of a composite is mandatory. For the CRF
//! composite the part-of-speech and named entity models are optional: each
//! one is attempted through the registry and its outcome recorded as an
//! [`Availability`], so that a model that was never configured is never
//! mistaken for one that failed to load. The named entity tagger reads
//! part-of-speech labels, so it is only used when the part-of-speech model
//! is available.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use log::{info, warn};
use serde::Serialize;

use crate::configuration::ModelPaths;
use crate::error::Result;
use crate::isolation::Grant;
use crate::model::{ModelKey, ModelKind, ModelRegistry, TaggingModel};
use crate::segment::lexical::{CompositeLevel, CompositeModels};

/// Outcome of asking for one optional model.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Availability {
    /// No path was configured for the model.
    NotConfigured,
    /// Not attempted because a model it depends on is unavailable.
    Skipped,
    /// Loading was attempted and failed.
    Failed {
        /// Why the model could not be loaded.
        reason: String,
    },
    /// The model is loaded.
    Loaded,
}

impl Availability {
    /// Whether the model is loaded.
    pub fn is_loaded(&self) -> bool {
        matches!(self, Availability::Loaded)
    }

    /// Whether loading was attempted and failed.
    pub fn is_failed(&self) -> bool {
        matches!(self, Availability::Failed { .. })
    }
}

impl fmt::Display for Availability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Availability::NotConfigured => f.write_str("not configured"),
            Availability::Skipped => f.write_str("skipped"),
            Availability::Failed { reason } => write!(f, "failed: {reason}"),
            Availability::Loaded => f.write_str("loaded"),
        }
    }
}

/// The stages a composite runs and why.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Resolution {
    /// Stages the engine runs.
    pub level: CompositeLevel,
    /// Outcome for the part-of-speech model.
    pub pos: Availability,
    /// Outcome for the named entity model.
    pub ner: Availability,
}

impl Resolution {
    /// Whether any optional model failed to load.
    pub fn degraded(&self) -> bool {
        self.pos.is_failed() || self.ner.is_failed()
    }
}

/// Models and resolution of a CRF composite.
#[derive(Clone, Debug)]
pub struct ResolvedComposite {
    /// Models the engine is built from.
    pub models: CompositeModels,
    /// How the stages were chosen.
    pub resolution: Resolution,
}

/// The stages that can run given which optional models are available.
///
/// # Examples
///
/// ```
/// use hanseg::factory::resolver::choose_level;
/// use hanseg::segment::lexical::CompositeLevel;
///
/// assert_eq!(choose_level(true, true), CompositeLevel::Full);
/// assert_eq!(choose_level(true, false), CompositeLevel::SegmenterPos);
/// assert_eq!(choose_level(false, true), CompositeLevel::Segmenter);
/// ```
pub fn choose_level(pos_available: bool, ner_available: bool) -> CompositeLevel {
    match (pos_available, ner_available) {
        (false, _) => CompositeLevel::Segmenter,
        (true, false) => CompositeLevel::SegmenterPos,
        (true, true) => CompositeLevel::Full,
    }
}

/// Attempt an optional tagger.
///
/// Load failures degrade; isolation violations never do.
fn attempt(
    kind: ModelKind,
    path: Option<&Path>,
    grant: &Grant,
    registry: &ModelRegistry,
) -> Result<(Availability, Option<Arc<TaggingModel>>)> {
    let Some(path) = path else {
        return Ok((Availability::NotConfigured, None));
    };
    match registry.tagger(&ModelKey::new(kind, path), grant) {
        Ok(model) => Ok((Availability::Loaded, Some(model))),
        Err(err) if err.is_isolation_violation() => Err(err),
        Err(err) => {
            warn!("Optional model {kind} unavailable: {err}");
            Ok((
                Availability::Failed {
                    reason: err.to_string(),
                },
                None,
            ))
        }
    }
}

/// Load the CRF models and decide which stages to run.
///
/// A missing segmentation model fails with
/// [`HansegError::ModelUnavailable`](crate::error::HansegError::ModelUnavailable).
pub fn resolve_crf(
    paths: &ModelPaths,
    grant: &Grant,
    registry: &ModelRegistry,
) -> Result<ResolvedComposite> {
    let segmenter = registry.tagger(&ModelKey::new(ModelKind::CrfCws, &paths.crf_cws), grant)?;

    let (pos, tagger) = attempt(ModelKind::CrfPos, paths.crf_pos.as_deref(), grant, registry)?;
    let (ner, recognizer) = if pos.is_loaded() {
        attempt(ModelKind::CrfNer, paths.crf_ner.as_deref(), grant, registry)?
    } else if paths.crf_ner.is_some() {
        (Availability::Skipped, None)
    } else {
        (Availability::NotConfigured, None)
    };

    let level = choose_level(pos.is_loaded(), ner.is_loaded());
    let resolution = Resolution { level, pos, ner };
    if resolution.degraded() {
        warn!(
            "CRF composite degraded to {level} (pos: {}, ner: {})",
            resolution.pos, resolution.ner
        );
    } else {
        info!("CRF composite runs {level}");
    }

    Ok(ResolvedComposite {
        models: CompositeModels {
            segmenter,
            tagger,
            recognizer,
        },
        resolution,
    })
}

/// Load the perceptron models; all three are mandatory.
pub fn resolve_perceptron(
    paths: &ModelPaths,
    grant: &Grant,
    registry: &ModelRegistry,
) -> Result<CompositeModels> {
    let load = |kind, path: &Path| registry.tagger(&ModelKey::new(kind, path), grant);
    Ok(CompositeModels {
        segmenter: load(ModelKind::PerceptronCws, &paths.perceptron_cws)?,
        tagger: Some(load(ModelKind::PerceptronPos, &paths.perceptron_pos)?),
        recognizer: Some(load(ModelKind::PerceptronNer, &paths.perceptron_ner)?),
    })
}
