//! Scoped execution of engine and model construction.
//!
//! Constructing an engine is the only step that touches the file system and
//! allocates large model tables. [`run_isolated`] runs that step with an
//! [`IsolationScope`], the only handle loaders use to read files. The scope
//! permits reads below the directories listed in its [`Grant`] and rejects
//! everything else with [`HansegError::IsolationViolation`].
//!
//! Whatever goes wrong inside the closure (a rejected read, an I/O failure,
//! corrupt data, a panic) comes back wrapped in
//! [`HansegError::Construction`] naming the subject, so a failure is always
//! attributable to one strategy or model.
//!
//! # Examples
//!
//! ```
//! use hanseg::isolation::{Grant, run_isolated};
//!
//! let dir = tempfile::tempdir().unwrap();
//! std::fs::write(dir.path().join("stopwords.txt"), "的\n了\n").unwrap();
//!
//! let grant = Grant::new([dir.path()]);
//! let text = run_isolated("stop_words", &grant, |scope| {
//!     scope.read_to_string(dir.path().join("stopwords.txt"))
//! })
//! .unwrap();
//! assert_eq!(text.lines().count(), 2);
//!
//! let err = run_isolated("stop_words", &grant, |scope| scope.read_to_string("/etc/hostname"))
//!     .unwrap_err();
//! assert!(err.is_isolation_violation());
//! ```

use std::any::Any;
use std::fs::File;
use std::io::{BufReader, Read};
use std::panic::{self, AssertUnwindSafe};
use std::path::{Component, Path, PathBuf};
use std::time::Instant;

use log::debug;

use crate::error::{HansegError, Result};

/// Directories that may be read during construction.
#[derive(Clone, Debug, Default)]
pub struct Grant {
    roots: Vec<GrantedRoot>,
}

#[derive(Clone, Debug)]
struct GrantedRoot {
    lexical: PathBuf,
    canonical: Option<PathBuf>,
}

impl Grant {
    /// Grant read access below each of `roots`.
    pub fn new<I, P>(roots: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let roots = roots
            .into_iter()
            .map(|root| {
                let root = root.as_ref();
                GrantedRoot {
                    lexical: normalize(root),
                    canonical: root.canonicalize().ok(),
                }
            })
            .collect();
        Grant { roots }
    }

    /// A grant that permits nothing.
    pub fn none() -> Self {
        Grant::default()
    }

    /// Whether `path` lies below a granted root.
    ///
    /// Both the lexical path and, when it exists, its canonical form (with
    /// symlinks resolved) must stay inside the grant.
    pub fn permits<P: AsRef<Path>>(&self, path: P) -> bool {
        let path = path.as_ref();
        let lexical = normalize(path);
        if !self.roots.iter().any(|r| lexical.starts_with(&r.lexical)) {
            return false;
        }
        match path.canonicalize() {
            Ok(canonical) => self.roots.iter().any(|r| {
                r.canonical
                    .as_ref()
                    .map(|c| canonical.starts_with(c))
                    .unwrap_or_else(|| canonical.starts_with(&r.lexical))
            }),
            Err(_) => true,
        }
    }
}

/// Resolve `.` and `..` without touching the file system.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// The capability handed to code running under [`run_isolated`].
#[derive(Debug)]
pub struct IsolationScope<'a> {
    subject: &'a str,
    grant: &'a Grant,
}

impl<'a> IsolationScope<'a> {
    /// Name of the strategy or model being constructed.
    pub fn subject(&self) -> &str {
        self.subject
    }

    /// The grant this scope enforces.
    pub fn grant(&self) -> &Grant {
        self.grant
    }

    /// Check that `path` may be read, returning it unchanged.
    pub fn check_read<P: AsRef<Path>>(&self, path: P) -> Result<PathBuf> {
        let path = path.as_ref();
        if self.grant.permits(path) {
            Ok(path.to_path_buf())
        } else {
            Err(HansegError::isolation_violation(
                self.subject,
                format!("read {}", path.display()),
            ))
        }
    }

    /// Open a granted file for buffered reading.
    pub fn open<P: AsRef<Path>>(&self, path: P) -> Result<BufReader<File>> {
        let path = self.check_read(path)?;
        Ok(BufReader::new(File::open(path)?))
    }

    /// Read a granted file into a string.
    pub fn read_to_string<P: AsRef<Path>>(&self, path: P) -> Result<String> {
        let mut reader = self.open(path)?;
        let mut text = String::new();
        reader.read_to_string(&mut text)?;
        Ok(text)
    }
}

/// Run `constructor` with a scope limited to `grant`.
///
/// Errors and panics are wrapped in [`HansegError::Construction`] naming
/// `subject`.
pub fn run_isolated<T, F>(subject: &str, grant: &Grant, constructor: F) -> Result<T>
where
    F: FnOnce(&IsolationScope<'_>) -> Result<T>,
{
    let scope = IsolationScope { subject, grant };
    let started = Instant::now();
    debug!("Constructing '{subject}' in isolated scope");

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| constructor(&scope)));
    let result = match outcome {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(err)) => Err(HansegError::construction(subject, err)),
        Err(payload) => Err(HansegError::construction(
            subject,
            HansegError::other(format!("panicked: {}", panic_message(payload.as_ref()))),
        )),
    };

    debug!(
        "Construction of '{subject}' finished in {:?} ({})",
        started.elapsed(),
        if result.is_ok() { "ok" } else { "failed" }
    );
    result
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
