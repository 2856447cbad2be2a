/// Marker substring identifying consolidatable "scanning" status lines.
///
/// Consecutive lines carrying this marker overwrite each other instead of
/// appending, which bounds log growth during long enumeration phases.
pub const SCANNING_MARKER: &str = "(scanning...)";

/// An ordered log of formatted status lines with dedup and consolidation.
///
/// Each job kind owns its own pane; the last-entry comparison state is never
/// shared between the download and search logs.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LogPane {
    entries: Vec<String>,
}

impl LogPane {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn last(&self) -> Option<&str> {
        self.entries.last().map(String::as_str)
    }

    /// Screens `candidate` against the last emitted entry and merges it.
    ///
    /// Returns true when the pane content changed. Re-pushing an identical
    /// candidate is a no-op, so overlapping polls cannot duplicate lines.
    pub fn push(&mut self, candidate: &str) -> bool {
        let formatted = format!("> {candidate}");
        if let Some(last) = self.entries.last_mut() {
            if *last == formatted {
                return false;
            }
            if last.contains(SCANNING_MARKER) && formatted.contains(SCANNING_MARKER) {
                // Same scanning category: consolidate in place.
                *last = formatted;
                return true;
            }
        }
        self.entries.push(formatted);
        true
    }

    /// Rebuilds the pane from a full authoritative line sequence, folding
    /// every line through the same rules as [`LogPane::push`].
    ///
    /// Returns true when the resulting content differs from the current one,
    /// so reprocessing an identical snapshot reports no change.
    pub fn rebuild<'a>(&mut self, lines: impl IntoIterator<Item = &'a str>) -> bool {
        let mut next = Self::new();
        for line in lines {
            next.push(line);
        }
        if next == *self {
            return false;
        }
        *self = next;
        true
    }
}
