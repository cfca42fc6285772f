//! The common finding type every detector emits, before the Report
//! Builder canonicalizes and deduplicates them into [`crate::report::Ring`]s.

use std::collections::BTreeSet;

/// Which sub-detector produced a [`RawRing`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PatternType {
    Cycle,
    Smurfing,
    Shell,
}

impl PatternType {
    pub fn as_str(self) -> &'static str {
        match self {
            PatternType::Cycle => "cycle",
            PatternType::Smurfing => "smurfing",
            PatternType::Shell => "shell",
        }
    }
}

/// One finding from a single detector.
///
/// `members` is ordered per the detector's own semantics (rotation-
/// canonical for cycles, DFS path order for shell chains, hub-first for
/// smurfing). Every member of a given `RawRing` shares the same `label`:
/// one label applies per pattern occurrence, not per member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRing {
    pub members: Vec<String>,
    pub pattern_type: PatternType,
    pub label: String,
}

impl RawRing {
    /// Canonical identity used for cross-detector dedup in the Report
    /// Builder: for cycles this is the (already rotation-normalized)
    /// ordered tuple; for smurfing/shell it's the unordered member set
    /// plus the pattern type.
    pub fn identity(&self) -> RingIdentity {
        match self.pattern_type {
            PatternType::Cycle => RingIdentity::Ordered(self.members.clone()),
            PatternType::Smurfing | PatternType::Shell => RingIdentity::Unordered(
                self.pattern_type,
                self.members.iter().cloned().collect(),
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RingIdentity {
    Ordered(Vec<String>),
    Unordered(PatternType, BTreeSet<String>),
}
