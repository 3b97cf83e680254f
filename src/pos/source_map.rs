use crate::error::SourceError;
use crate::pos::SourceId;

crate::context_slot! {
    /// The registry for the active compilation run.
    CurrentSourceFileMap: SourceFileMap
}

/// The per-run registry mapping source file paths to [`SourceId`]s.
///
/// Append-only: paths are never removed or renumbered, so an id stays valid
/// for as long as the registry that issued it. The registry trusts callers to
/// canonicalize paths before registration and performs no normalization or
/// deduplication of its own.
///
/// Most callers use the ambient interface ([`scope`][Self::scope],
/// [`add_source`][Self::add_source], …); the instance methods exist for code
/// that prefers to pass the registry around explicitly.
#[derive(Debug, Clone, Default)]
pub struct SourceFileMap {
    sources: Vec<String>,
}

impl SourceFileMap {
    pub fn new() -> Self {
        SourceFileMap { sources: Vec::new() }
    }

    /// Appends `path` and returns its fresh id.
    ///
    /// Registering the same path twice yields two distinct ids; reverse
    /// lookup finds the first.
    pub fn add(&mut self, path: impl Into<String>) -> SourceId {
        let id = SourceId::from_index(self.sources.len());
        self.sources.push(path.into());
        id
    }

    /// Checked lookup of the path behind `id`.
    ///
    /// Fails on the invalid id and on ids issued by a different registry, so
    /// a misused handle surfaces as a caught defect rather than a bogus path.
    pub fn path(&self, id: SourceId) -> Result<&str, SourceError> {
        id.index()
            .and_then(|index| self.sources.get(index))
            .map(|path| path.as_str())
            .ok_or(SourceError::UnknownSource(id))
    }

    /// Reverse lookup by exact string match.
    ///
    /// A linear scan in registration order, first match wins; returns
    /// [`SourceId::INVALID`] on a miss. A miss is a normal outcome, not an
    /// error — the caller decides what it means.
    pub fn id_of(&self, path: &str) -> SourceId {
        match self.sources.iter().position(|known| known == path) {
            Some(index) => SourceId::from_index(index),
            None => SourceId::INVALID,
        }
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

impl SourceFileMap {
    /// Runs `f` with a fresh, empty registry as this thread's ambient map.
    ///
    /// This bounds the registry's lifetime to one compilation run; call it
    /// again to reuse the process for another run. Concurrent compilations
    /// belong on separate threads, where each gets an independent registry.
    pub fn scope<R>(f: impl FnOnce() -> R) -> R {
        CurrentSourceFileMap::scope(SourceFileMap::new(), f)
    }

    /// Registers `path` in the ambient registry. See [`SourceFileMap::add`].
    ///
    /// # Panics
    /// Panics if no registry scope is active.
    pub fn add_source(path: impl Into<String>) -> SourceId {
        CurrentSourceFileMap::with_mut(|map| map.add(path))
    }

    /// Checked path lookup in the ambient registry.
    /// See [`SourceFileMap::path`].
    pub fn get_source(id: SourceId) -> Result<String, SourceError> {
        if !CurrentSourceFileMap::is_set() {
            return Err(SourceError::NoSourceMap);
        }
        CurrentSourceFileMap::with(|map| map.path(id).map(String::from))
    }

    /// Reverse lookup in the ambient registry. See [`SourceFileMap::id_of`].
    ///
    /// # Panics
    /// Panics if no registry scope is active.
    pub fn get_source_id(path: &str) -> SourceId {
        CurrentSourceFileMap::with(|map| map.id_of(path))
    }
}
