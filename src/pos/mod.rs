//! Source code locations.

pub use position::{
    CurrentSourceFile, CurrentSourcePosition, LineAndColumn, SourceId, SourcePosition, Sp,
};
mod position;

pub use source_map::SourceFileMap;
mod source_map;
