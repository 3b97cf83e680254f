//! Source location tracking for the Torque compiler front end.
//!
//! The parser registers each input file once in the [`SourceFileMap`] and gets
//! back a [`SourceId`], a cheap copyable handle it makes the
//! [`CurrentSourceFile`]. As it scans tokens it updates the
//! [`CurrentSourcePosition`]; newly built AST nodes stamp themselves with that
//! position (see [`Sp`]), and diagnostics later render a node's position as
//! `path:line:column` by asking the registry for the path.

pub use error::SourceError;
pub mod error;

pub use pos::{
    CurrentSourceFile, CurrentSourcePosition, LineAndColumn, SourceFileMap, SourceId,
    SourcePosition, Sp,
};
pub mod pos;

pub mod context;
