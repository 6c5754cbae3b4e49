//! Cell identity and the per-family mark-and-sweep registry.

use std::collections::HashSet;

/// The (PCI, frequency-channel) pair identifying one radio cell within a
/// network family. Correlating cells across update cycles happens on this
/// pair alone, even when the PCI was decoded from hex on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CellId {
    pub pci: i32,
    pub freq: i32,
}

/// Whether a cell is the primary serving cell or a carrier-aggregation
/// secondary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CellRole {
    #[default]
    Primary,
    Secondary,
}

/// A record a [`CellTable`] can track by identity.
pub trait Tracked {
    fn new(id: CellId) -> Self;
    fn id(&self) -> CellId;
}

/// Keyed collection of cells for exactly one network family.
///
/// Every lookup or upsert marks the identity as seen for the current cycle;
/// [`CellTable::sweep_orphans`] then drops whatever was not touched since
/// the previous sweep and resets the marker set. Call it exactly once per
/// update cycle, after all lookups and upserts — a cell that vanished from
/// the raw sample is gone from the table right after the sweep, without the
/// caller ever diffing old against new state.
///
/// Insertion order is preserved, so iteration yields the primary cell first
/// when the update policies insert it first.
#[derive(Debug, Default)]
pub struct CellTable<C> {
    cells: Vec<C>,
    seen: HashSet<CellId>,
}

impl<C: Tracked> CellTable<C> {
    /// Look up a cell by identity, marking it seen when found. A read that
    /// decides not to change anything still protects the record from the
    /// next sweep.
    pub fn get_mut(&mut self, id: CellId) -> Option<&mut C> {
        let found = self.cells.iter_mut().find(|c| c.id() == id);
        if found.is_some() {
            self.seen.insert(id);
        }
        found
    }

    /// Find-or-create the record for `id`, marking it seen either way.
    /// A record created here persists across cycles as the same entity,
    /// accumulating metric history, until a sweep orphans it.
    pub fn entry(&mut self, id: CellId) -> &mut C {
        self.seen.insert(id);
        let pos = match self.cells.iter().position(|c| c.id() == id) {
            Some(pos) => pos,
            None => {
                self.cells.push(C::new(id));
                self.cells.len() - 1
            }
        };
        &mut self.cells[pos]
    }

    /// Insert `cell`, replacing any record with the same identity.
    pub fn upsert(&mut self, cell: C) {
        self.seen.insert(cell.id());
        match self.cells.iter().position(|c| c.id() == cell.id()) {
            Some(pos) => self.cells[pos] = cell,
            None => self.cells.push(cell),
        }
    }

    /// Drop every record not seen since the previous sweep and clear the
    /// marker set for the next cycle.
    pub fn sweep_orphans(&mut self) {
        let seen = std::mem::take(&mut self.seen);
        self.cells.retain(|c| seen.contains(&c.id()));
    }

    /// Drop all records. The marker set is left alone; a sweep normally
    /// follows within the same cycle.
    pub fn clear(&mut self) {
        self.cells.clear();
    }

    pub fn iter(&self) -> std::slice::Iter<'_, C> {
        self.cells.iter()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}
