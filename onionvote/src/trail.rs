use std::mem;

/// The paddings and ballot snapshots a voter recorded while preparing its
/// ballot, consumed last-recorded-first as the layers are peeled.
///
/// Both sequences are fully recorded by `prepare_ballot` and never grow
/// afterwards. Consumption only moves a depth cursor down, so the remaining
/// depth tells exactly which round the run is in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VerificationTrail {
    paddings: Vec<Vec<u8>>,
    snapshots: Vec<Vec<u8>>,
    padding_depth: usize,
    snapshot_depth: usize,
}

impl VerificationTrail {
    /// An empty trail sized for a roster of `voters` members
    pub fn with_capacity(voters: usize) -> Self {
        VerificationTrail {
            paddings: Vec::with_capacity(voters + 1),
            snapshots: Vec::with_capacity(2 * voters),
            padding_depth: 0,
            snapshot_depth: 0,
        }
    }

    pub(crate) fn record_padding(&mut self, padding: Vec<u8>) {
        self.paddings.truncate(self.padding_depth);
        self.paddings.push(padding);
        self.padding_depth = self.paddings.len();
    }

    pub(crate) fn record_snapshot(&mut self, snapshot: Vec<u8>) {
        self.snapshots.truncate(self.snapshot_depth);
        self.snapshots.push(snapshot);
        self.snapshot_depth = self.snapshots.len();
    }

    /// Number of paddings not yet consumed
    pub fn padding_depth(&self) -> usize {
        self.padding_depth
    }

    /// Number of snapshots not yet consumed
    pub fn snapshot_depth(&self) -> usize {
        self.snapshot_depth
    }

    /// The most recently recorded padding that has not been consumed
    pub fn peek_padding(&self) -> Option<&[u8]> {
        self.padding_depth
            .checked_sub(1)
            .map(|top| self.paddings[top].as_slice())
    }

    /// The most recently recorded snapshot that has not been consumed
    pub fn peek_snapshot(&self) -> Option<&[u8]> {
        self.snapshot_depth
            .checked_sub(1)
            .map(|top| self.snapshots[top].as_slice())
    }

    pub(crate) fn pop_padding(&mut self) -> Option<Vec<u8>> {
        self.padding_depth = self.padding_depth.checked_sub(1)?;
        Some(mem::take(&mut self.paddings[self.padding_depth]))
    }

    pub(crate) fn pop_snapshot(&mut self) -> Option<Vec<u8>> {
        self.snapshot_depth = self.snapshot_depth.checked_sub(1)?;
        Some(mem::take(&mut self.snapshots[self.snapshot_depth]))
    }

    /// Whether the trail sits at exactly the given depths
    pub fn is_at(&self, padding_depth: usize, snapshot_depth: usize) -> bool {
        self.padding_depth == padding_depth && self.snapshot_depth == snapshot_depth
    }
}
