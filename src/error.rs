use crate::pos::SourceId;

/// Failures from checked registry lookups.
///
/// Only lookups that can legitimately miss report through this type. Misuse
/// of the ambient slots themselves (reading or writing with no scope active)
/// is a programmer defect and panics instead.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    /// No source file map scope is active on this thread.
    #[error("no source file map is active")]
    NoSourceMap,
    /// The id is invalid, or was issued by a different registry.
    #[error("{0:?} is not registered in the active source file map")]
    UnknownSource(SourceId),
}
