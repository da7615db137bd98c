//! Single-slot history of the last add or remove.

use wayplan_core::Stop;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UndoKind {
    Add,
    Remove,
}

/// Snapshot of one undo-eligible mutation.
#[derive(Debug, Clone)]
pub struct UndoEntry {
    pub kind: UndoKind,
    pub stop: Stop,
    /// Index the stop occupied (Remove) or was inserted at (Add).
    pub index: usize,
}

/// Holds at most one [`UndoEntry`]; recording replaces whatever was there.
#[derive(Debug, Default)]
pub struct UndoLedger {
    slot: Option<UndoEntry>,
}

impl UndoLedger {
    /// Records a mutation, discarding any previously retained entry.
    pub fn record(&mut self, kind: UndoKind, stop: Stop, index: usize) {
        self.slot = Some(UndoEntry { kind, stop, index });
    }

    /// Takes the retained entry, leaving the ledger empty.
    pub fn take(&mut self) -> Option<UndoEntry> {
        self.slot.take()
    }

    pub fn clear(&mut self) {
        self.slot = None;
    }

    #[must_use]
    pub fn peek(&self) -> Option<&UndoEntry> {
        self.slot.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_record_replaces_first() {
        let mut ledger = UndoLedger::default();
        ledger.record(UndoKind::Add, Stop::new("a", 0.0, 0.0), 0);
        ledger.record(UndoKind::Remove, Stop::new("b", 1.0, 1.0), 3);

        let entry = ledger.take().unwrap();
        assert_eq!(entry.kind, UndoKind::Remove);
        assert_eq!(entry.stop.name, "b");
        assert_eq!(entry.index, 3);
    }

    #[test]
    fn take_empties_the_slot() {
        let mut ledger = UndoLedger::default();
        ledger.record(UndoKind::Add, Stop::new("a", 0.0, 0.0), 0);
        assert!(ledger.take().is_some());
        assert!(ledger.take().is_none());
    }
}
