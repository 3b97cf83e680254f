use std::fmt;
use std::num::NonZeroU32;

use crate::pos::SourceFileMap;

/// Identifies a file registered in the [`SourceFileMap`].
///
/// Comparisons and hashing work purely on the registry index, never on the
/// path string, so positions can be sorted and deduplicated in O(1) per
/// comparison. Ordering between valid ids is registration order; the invalid
/// id sorts before every valid id.
///
/// The only ways to obtain a valid id are a registration or lookup on the
/// registry, or copying an existing id.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SourceId(Option<NonZeroU32>);

impl SourceId {
    /// The id of no file, used for generated code and failed lookups.
    pub const INVALID: SourceId = SourceId(None);

    pub fn is_valid(self) -> bool {
        self.0.is_some()
    }

    // The index is stored shifted by one so that the niche covers zero and
    // `Option<SourceId>`-like layouts stay pointer-free.
    pub(crate) fn from_index(index: usize) -> SourceId {
        SourceId(NonZeroU32::new(index as u32 + 1))
    }

    pub(crate) fn index(self) -> Option<usize> {
        self.0.map(|raw| raw.get() as usize - 1)
    }
}

impl fmt::Debug for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.index() {
            Some(index) => write!(f, "SourceId({})", index),
            None => write!(f, "SourceId(invalid)"),
        }
    }
}

/// A cursor position within a file. Both coordinates are zero-based.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LineAndColumn {
    pub line: i32,
    pub column: i32,
}

impl LineAndColumn {
    /// The sentinel for "no position". Must never reach a registry lookup.
    pub const INVALID: LineAndColumn = LineAndColumn { line: -1, column: -1 };

    pub fn is_valid(self) -> bool {
        self.line >= 0 && self.column >= 0
    }
}

/// Renders 1-based `line:column`; the stored coordinates stay zero-based.
impl fmt::Display for LineAndColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line + 1, self.column + 1)
    }
}

/// A half-open range `[start, end)` within one registered file.
///
/// The end column is exclusive. Well-formedness (`start` not ordered after
/// `end`) is a caller-maintained invariant: construction performs no
/// validation, and containment queries on a malformed range have no defined
/// meaning.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SourcePosition {
    pub source: SourceId,
    pub start: LineAndColumn,
    pub end: LineAndColumn,
}

impl SourcePosition {
    /// A position referring to no file at all.
    pub const INVALID: SourcePosition = SourcePosition {
        source: SourceId::INVALID,
        start: LineAndColumn::INVALID,
        end: LineAndColumn::INVALID,
    };

    pub fn is_valid(self) -> bool {
        self.source.is_valid() && self.start.is_valid() && self.end.is_valid()
    }

    /// True iff `self` and `other` start on the same line of the same file,
    /// ignoring columns on both ends.
    ///
    /// Diagnostics use this to treat a whole line as one error context, so
    /// sub-line column differences don't produce duplicate reports.
    pub fn starts_on_same_line(&self, other: &SourcePosition) -> bool {
        self.source == other.source && self.start.line == other.start.line
    }

    /// True iff `point` falls within `[start, end)`.
    ///
    /// Decided by line first: a point on a line strictly between `start` and
    /// `end` is inside regardless of column. On the start line the start
    /// column is inclusive; on the end line the end column is exclusive, so
    /// adjacent ranges can meet at a boundary column without both claiming it.
    pub fn contains(&self, point: LineAndColumn) -> bool {
        if point.line < self.start.line || point.line > self.end.line {
            return false;
        }
        if point.line == self.start.line && point.column < self.start.column {
            return false;
        }
        if point.line == self.end.line && point.column >= self.end.column {
            return false;
        }
        true
    }

    /// Key for ordering diagnostics: file first, then start line, then start
    /// column. `SourcePosition` itself deliberately defines no total order.
    pub fn sort_key(&self) -> (SourceId, i32, i32) {
        (self.source, self.start.line, self.start.column)
    }
}

/// Renders `path:line:column` with 1-based line and column.
///
/// The path comes from the ambient [`SourceFileMap`]. With no registry in
/// scope, or a source id the active registry does not know, the path renders
/// as `<unknown>` so the defect is visible in the diagnostic instead of
/// aborting mid-report.
impl fmt::Display for SourcePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match SourceFileMap::get_source(self.source) {
            Ok(path) => write!(f, "{}:{}", path, self.start),
            Err(_) => write!(f, "<unknown>:{}", self.start),
        }
    }
}

crate::context_slot! {
    /// The file the parser is currently reading.
    pub CurrentSourceFile: SourceId
}

crate::context_slot! {
    /// The position of the token currently being processed.
    ///
    /// The parser advances this with `set` as it scans; newly built AST nodes
    /// stamp themselves with it via [`Sp::here`].
    pub CurrentSourcePosition: SourcePosition
}

/// Helper to wrap a value in [`Sp`].
///
/// * `sp!(pos => value)` uses the given position.
/// * `sp!(value)` uses [`SourcePosition::INVALID`], for generated code that
///   has no source location.
#[macro_export]
macro_rules! sp {
    ($pos:expr => $expr:expr) => { $crate::Sp { pos: $pos, value: $expr } };
    ($expr:expr) => { $crate::Sp { pos: $crate::SourcePosition::INVALID, value: $expr } };
}

/// A value stamped with the source position it came from.
///
/// This type generally tries to behave like `T`: it derefs, and the position
/// takes no part in comparisons or hashes, so stamped nodes can live in
/// ordinary sets and maps keyed by their content.
#[derive(Copy, Clone, Default)]
pub struct Sp<T: ?Sized> {
    pub pos: SourcePosition,
    pub value: T,
}

impl<T> Sp<T> {
    /// Stamps `value` with the ambient [`CurrentSourcePosition`].
    ///
    /// # Panics
    /// Panics if no `CurrentSourcePosition` scope is active.
    pub fn here(value: T) -> Sp<T> {
        sp!(CurrentSourcePosition::current() => value)
    }

    /// Transform the value in some way while keeping the same position.
    pub fn sp_map<B>(self, func: impl FnOnce(T) -> B) -> Sp<B> {
        sp!(self.pos => func(self.value))
    }
}

impl<T: ?Sized + fmt::Debug> fmt::Debug for Sp<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sp!({:?} => ", self.pos)?;
        fmt::Debug::fmt(&self.value, f)?;
        write!(f, ")")
    }
}

impl<T: ?Sized + Eq> Eq for Sp<T> {}

impl<T: ?Sized + PartialEq> PartialEq for Sp<T> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl<T: ?Sized + PartialEq> PartialEq<T> for Sp<T> {
    fn eq(&self, other: &T) -> bool {
        self.value == *other
    }
}

impl<T: ?Sized + std::hash::Hash> std::hash::Hash for Sp<T> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.value.hash(state);
    }
}

impl<T: ?Sized> std::ops::Deref for Sp<T> {
    type Target = T;
    fn deref(&self) -> &T {
        &self.value
    }
}

impl<T: ?Sized> std::ops::DerefMut for Sp<T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.value
    }
}

impl<T: ?Sized + fmt::Display> fmt::Display for Sp<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", &self.value)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn lc(line: i32, column: i32) -> LineAndColumn {
        LineAndColumn { line, column }
    }

    fn range(start: (i32, i32), end: (i32, i32)) -> SourcePosition {
        SourcePosition {
            source: SourceId::INVALID,
            start: lc(start.0, start.1),
            end: lc(end.0, end.1),
        }
    }

    #[test]
    fn contains_single_line() {
        let pos = range((2, 5), (2, 10));
        assert!(pos.contains(lc(2, 5)));
        assert!(pos.contains(lc(2, 9)));
        assert!(!pos.contains(lc(2, 10))); // end column exclusive
        assert!(!pos.contains(lc(2, 4)));
        assert!(!pos.contains(lc(1, 7)));
        assert!(!pos.contains(lc(3, 0)));
    }

    #[test]
    fn contains_multi_line() {
        let pos = range((1, 5), (3, 2));
        assert!(pos.contains(lc(2, 0))); // strictly between, any column
        assert!(pos.contains(lc(2, 9999)));
        assert!(pos.contains(lc(1, 5)));
        assert!(!pos.contains(lc(1, 0))); // before start column on start line
        assert!(pos.contains(lc(3, 1)));
        assert!(!pos.contains(lc(3, 2))); // end column exclusive
        assert!(!pos.contains(lc(0, 9)));
        assert!(!pos.contains(lc(4, 0)));
    }

    #[test]
    fn same_start_line_ignores_columns() {
        SourceFileMap::scope(|| {
            let a = SourceFileMap::add_source("a.torque");
            let b = SourceFileMap::add_source("b.torque");

            let mut x = range((4, 2), (4, 9));
            let mut y = range((4, 7), (5, 0));
            x.source = a;
            y.source = a;
            assert!(x.starts_on_same_line(&y));
            assert!(y.starts_on_same_line(&x));

            y.source = b;
            assert!(!x.starts_on_same_line(&y)); // same line, different file

            y.source = a;
            y.start.line = 5;
            assert!(!x.starts_on_same_line(&y));
        });
    }

    #[test]
    fn display_is_one_based() {
        SourceFileMap::scope(|| {
            let id = SourceFileMap::add_source("a.torque");
            let pos = SourcePosition { source: id, start: lc(0, 0), end: lc(0, 5) };
            assert_eq!(pos.to_string(), "a.torque:1:1");

            let pos = SourcePosition { source: id, start: lc(12, 3), end: lc(12, 8) };
            assert_eq!(pos.to_string(), "a.torque:13:4");
        });
    }

    #[test]
    fn display_degrades_without_registry() {
        let pos = range((0, 0), (0, 1));
        assert_eq!(pos.to_string(), "<unknown>:1:1");
    }

    #[test]
    fn id_ordering_is_registration_order() {
        SourceFileMap::scope(|| {
            let a = SourceFileMap::add_source("z.torque");
            let b = SourceFileMap::add_source("a.torque");
            // registration order, not lexical path order
            assert!(a < b);
            assert!(SourceId::INVALID < a);
        });
    }

    #[test]
    fn invalid_sentinels() {
        assert!(!SourceId::INVALID.is_valid());
        assert_eq!(LineAndColumn::INVALID, lc(-1, -1));
        assert!(!LineAndColumn::INVALID.is_valid());
        assert!(lc(0, 0).is_valid());
        assert!(!SourcePosition::INVALID.is_valid());
        assert_eq!(format!("{:?}", SourceId::INVALID), "SourceId(invalid)");
    }

    #[test]
    fn sp_behaves_like_its_value() {
        let a: Sp<i32> = sp!(range((1, 0), (1, 4)) => 10);
        let b: Sp<i32> = sp!(10);
        assert_eq!(a, b); // position takes no part in equality
        assert_eq!(a, 10);
        assert_eq!(*a + 1, 11);
    }

    #[test]
    fn here_stamps_the_current_position() {
        let pos = range((7, 0), (7, 3));
        CurrentSourcePosition::scope(pos, || {
            let node = Sp::here("macro");
            assert_eq!(node.pos, pos);
            assert_eq!(*node, "macro");
        });
    }

    #[test]
    fn sort_key_orders_by_file_then_start() {
        SourceFileMap::scope(|| {
            let a = SourceFileMap::add_source("a.torque");
            let b = SourceFileMap::add_source("b.torque");

            let mut diags = vec![
                SourcePosition { source: b, start: lc(0, 0), end: lc(0, 1) },
                SourcePosition { source: a, start: lc(3, 9), end: lc(3, 12) },
                SourcePosition { source: a, start: lc(3, 1), end: lc(3, 4) },
                SourcePosition { source: a, start: lc(1, 5), end: lc(2, 0) },
            ];
            diags.sort_by_key(|pos| pos.sort_key());

            let starts: Vec<_> = diags.iter().map(|pos| (pos.source, pos.start)).collect();
            assert_eq!(starts, vec![
                (a, lc(1, 5)),
                (a, lc(3, 1)),
                (a, lc(3, 9)),
                (b, lc(0, 0)),
            ]);
        });
    }
}
