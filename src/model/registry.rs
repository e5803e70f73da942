//! Process-wide cache of loaded models.
//!
//! Every [`ModelKey`] owns one slot holding a `OnceLock`. The first caller
//! for a key runs the construction; concurrent callers for the same key
//! block on that single in-flight construction, and callers for other keys
//! only ever contend on the short map lookup that finds their slot. The
//! outcome, success or failure, is published once and never replaced: a
//! model that failed to load stays unavailable for the life of the process
//! and its files are not read again.
//!
//! Access is checked against the caller's [`Grant`] on every request,
//! before the slot is consulted. A slot only ever records the outcome of an
//! actual load, so one caller's grant never decides what another caller
//! may see.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, LazyLock, OnceLock};
use std::thread;
use std::time::{Duration, Instant};

use ahash::AHashMap;
use crossbeam_channel::RecvTimeoutError;
use log::{debug, info, warn};
use parking_lot::RwLock;

use crate::error::{HansegError, Result};
use crate::isolation::{Grant, run_isolated};
use crate::model::{
    BigramTable, Lexicon, ModelHandle, ModelKey, StopWords, TaggingModel, loader,
};

static GLOBAL: LazyLock<Arc<ModelRegistry>> = LazyLock::new(|| Arc::new(ModelRegistry::new()));

/// Why a model could not be loaded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModelFailure {
    /// The model that failed.
    pub model: String,
    /// Root cause.
    pub reason: String,
}

impl ModelFailure {
    fn from_error(key: &ModelKey, err: &HansegError) -> Self {
        ModelFailure {
            model: key.to_string(),
            reason: err.root().to_string(),
        }
    }

    /// The error handed to callers asking for this model.
    pub fn to_error(&self) -> HansegError {
        HansegError::model_unavailable(&self.model, &self.reason)
    }
}

impl fmt::Display for ModelFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.model, self.reason)
    }
}

/// Observable state of one model.
#[derive(Clone, Debug)]
pub enum ModelState {
    /// Nobody has asked for the model yet, or its construction is in flight.
    NotAttempted,
    /// Construction failed; the failure is permanent.
    Unavailable(ModelFailure),
    /// The model is loaded.
    Loaded(ModelHandle),
}

impl ModelState {
    /// Whether the model is loaded.
    pub fn is_loaded(&self) -> bool {
        matches!(self, ModelState::Loaded(_))
    }

    /// Whether the model failed to load.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, ModelState::Unavailable(_))
    }
}

type Outcome = std::result::Result<ModelHandle, ModelFailure>;

#[derive(Debug, Default)]
struct ModelSlot {
    cell: OnceLock<Outcome>,
    attempts: AtomicUsize,
}

/// Lazily constructed, shared models keyed by [`ModelKey`].
///
/// # Examples
///
/// ```
/// use hanseg::isolation::Grant;
/// use hanseg::model::{ModelKey, ModelKind, ModelRegistry};
///
/// let dir = tempfile::tempdir().unwrap();
/// let path = dir.path().join("stopwords.txt");
/// std::fs::write(&path, "的\n了\n").unwrap();
///
/// let registry = ModelRegistry::new();
/// let grant = Grant::new([dir.path()]);
/// let key = ModelKey::new(ModelKind::StopWords, &path);
///
/// let first = registry.get_or_build(&key, &grant).unwrap();
/// let second = registry.get_or_build(&key, &grant).unwrap();
/// assert!(first.ptr_eq(&second));
/// assert_eq!(registry.attempts(&key), 1);
/// ```
#[derive(Debug, Default)]
pub struct ModelRegistry {
    slots: RwLock<AHashMap<ModelKey, Arc<ModelSlot>>>,
}

impl ModelRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The registry shared by every factory in the process.
    pub fn global() -> Arc<ModelRegistry> {
        Arc::clone(&GLOBAL)
    }

    fn slot(&self, key: &ModelKey) -> Arc<ModelSlot> {
        if let Some(slot) = self.slots.read().get(key) {
            return Arc::clone(slot);
        }
        let mut slots = self.slots.write();
        Arc::clone(slots.entry(key.clone()).or_default())
    }

    fn existing_slot(&self, key: &ModelKey) -> Option<Arc<ModelSlot>> {
        self.slots.read().get(key).cloned()
    }

    /// Current state of `key`.
    pub fn state(&self, key: &ModelKey) -> ModelState {
        match self.existing_slot(key).and_then(|slot| slot.cell.get().cloned()) {
            None => ModelState::NotAttempted,
            Some(Ok(handle)) => ModelState::Loaded(handle),
            Some(Err(failure)) => ModelState::Unavailable(failure),
        }
    }

    /// How many times construction of `key` has run (0 or 1).
    pub fn attempts(&self, key: &ModelKey) -> usize {
        self.existing_slot(key)
            .map(|slot| slot.attempts.load(Ordering::Acquire))
            .unwrap_or(0)
    }

    /// Number of keys that have been requested.
    pub fn len(&self) -> usize {
        self.slots.read().len()
    }

    /// Whether no model has been requested yet.
    pub fn is_empty(&self) -> bool {
        self.slots.read().is_empty()
    }

    /// Load `key` with the default loader, reading only below `grant`.
    ///
    /// A key outside `grant` is an isolation violation for this caller,
    /// whether or not the model is already loaded.
    pub fn get_or_build(&self, key: &ModelKey, grant: &Grant) -> Result<ModelHandle> {
        admit(key, grant)?;
        self.get_or_build_with(key, |key| {
            run_isolated(key.kind().label(), grant, |scope| loader::load(key, scope))
        })
    }

    /// Load `key` with a custom constructor.
    ///
    /// `build` runs at most once per key for the life of the registry.
    pub fn get_or_build_with<F>(&self, key: &ModelKey, build: F) -> Result<ModelHandle>
    where
        F: FnOnce(&ModelKey) -> Result<ModelHandle>,
    {
        let slot = self.slot(key);
        let outcome = slot.cell.get_or_init(|| {
            slot.attempts.fetch_add(1, Ordering::AcqRel);
            let started = Instant::now();
            match build(key) {
                Ok(handle) => {
                    info!("Model {key} loaded in {:?}", started.elapsed());
                    Ok(handle)
                }
                Err(err) => {
                    warn!("Model {key} is unavailable: {err}");
                    Err(ModelFailure::from_error(key, &err))
                }
            }
        });
        outcome.clone().map_err(|failure| failure.to_error())
    }

    /// Like [`ModelRegistry::get_or_build`], but give up waiting after
    /// `timeout`.
    ///
    /// Expiry only affects this caller: construction continues on a
    /// background thread and its outcome is published as usual.
    pub fn get_or_build_timeout(
        self: &Arc<Self>,
        key: &ModelKey,
        grant: &Grant,
        timeout: Duration,
    ) -> Result<ModelHandle> {
        admit(key, grant)?;
        let grant = grant.clone();
        self.get_or_build_timeout_with(key, timeout, move |key| {
            run_isolated(key.kind().label(), &grant, |scope| loader::load(key, scope))
        })
    }

    /// Like [`ModelRegistry::get_or_build_with`], with a bounded wait.
    pub fn get_or_build_timeout_with<F>(
        self: &Arc<Self>,
        key: &ModelKey,
        timeout: Duration,
        build: F,
    ) -> Result<ModelHandle>
    where
        F: FnOnce(&ModelKey) -> Result<ModelHandle> + Send + 'static,
    {
        if let Some(outcome) = self.existing_slot(key).and_then(|slot| slot.cell.get().cloned()) {
            return outcome.map_err(|failure| failure.to_error());
        }

        let (sender, receiver) = crossbeam_channel::bounded(1);
        let registry = Arc::clone(self);
        let owned_key = key.clone();
        thread::Builder::new()
            .name(format!("hanseg-load-{}", key.kind()))
            .spawn(move || {
                let result = registry.get_or_build_with(&owned_key, build);
                // The caller may have stopped waiting.
                let _ = sender.send(result);
            })?;

        match receiver.recv_timeout(timeout) {
            Ok(result) => result,
            Err(RecvTimeoutError::Timeout) => {
                debug!("Gave up waiting for {key} after {timeout:?}");
                Err(HansegError::model_unavailable(
                    key.to_string(),
                    format!("not loaded within {timeout:?}"),
                ))
            }
            Err(RecvTimeoutError::Disconnected) => Err(HansegError::model_unavailable(
                key.to_string(),
                "loader thread exited without a result",
            )),
        }
    }

    /// Load a core or custom dictionary.
    pub fn lexicon(&self, key: &ModelKey, grant: &Grant) -> Result<Arc<Lexicon>> {
        let handle = self.get_or_build(key, grant)?;
        handle
            .as_lexicon()
            .cloned()
            .ok_or_else(|| mismatch(key, &handle))
    }

    /// Load a bigram table.
    pub fn bigram(&self, key: &ModelKey, grant: &Grant) -> Result<Arc<BigramTable>> {
        let handle = self.get_or_build(key, grant)?;
        handle
            .as_bigram()
            .cloned()
            .ok_or_else(|| mismatch(key, &handle))
    }

    /// Load a stop word list.
    pub fn stop_words(&self, key: &ModelKey, grant: &Grant) -> Result<Arc<StopWords>> {
        let handle = self.get_or_build(key, grant)?;
        handle
            .as_stop_words()
            .cloned()
            .ok_or_else(|| mismatch(key, &handle))
    }

    /// Load a tagging model.
    pub fn tagger(&self, key: &ModelKey, grant: &Grant) -> Result<Arc<TaggingModel>> {
        let handle = self.get_or_build(key, grant)?;
        handle
            .as_tagger()
            .cloned()
            .ok_or_else(|| mismatch(key, &handle))
    }
}

fn admit(key: &ModelKey, grant: &Grant) -> Result<()> {
    if grant.permits(key.path()) {
        Ok(())
    } else {
        debug!("Refused {key}: outside the grant");
        Err(HansegError::isolation_violation(
            key.to_string(),
            format!("read {}", key.path().display()),
        ))
    }
}

fn mismatch(key: &ModelKey, handle: &ModelHandle) -> HansegError {
    HansegError::model_unavailable(
        key.to_string(),
        format!("registered as {}", handle.variant()),
    )
}
