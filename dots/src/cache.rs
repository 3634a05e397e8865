use std::fmt;

use crate::snapshot::BoardSnapshot;

/// Generation counter for the session. Requests carry the epoch current at issue time; a reset
/// advances it so late replies to earlier requests can be recognized and dropped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SessionEpoch(u64);

impl SessionEpoch {
    fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

impl fmt::Display for SessionEpoch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "epoch {}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaleEpoch {
    pub current: SessionEpoch,
    pub received: SessionEpoch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Replaced {
    /// The grid dimensions differ from the previous snapshot (or there was none).
    pub dims_changed: bool,
}

#[derive(Debug, Default)]
pub struct BoardCache {
    snapshot: Option<BoardSnapshot>,
    epoch: SessionEpoch,
}

impl BoardCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> Option<&BoardSnapshot> {
        self.snapshot.as_ref()
    }

    pub fn epoch(&self) -> SessionEpoch {
        self.epoch
    }

    /// Starts a new generation; replies tagged with any earlier epoch become stale. The current
    /// snapshot stays visible until the new generation delivers one.
    pub fn advance_epoch(&mut self) -> SessionEpoch {
        self.epoch = self.epoch.next();
        self.epoch
    }

    pub fn is_current(&self, epoch: SessionEpoch) -> bool {
        epoch == self.epoch
    }

    /// Swaps in `snapshot` wholesale if it was requested in the current epoch.
    pub fn replace(
        &mut self,
        epoch: SessionEpoch,
        snapshot: BoardSnapshot,
    ) -> Result<Replaced, StaleEpoch> {
        if !self.is_current(epoch) {
            return Err(StaleEpoch {
                current: self.epoch,
                received: epoch,
            });
        }
        let dims_changed = self
            .snapshot
            .as_ref()
            .is_none_or(|old| old.dims() != snapshot.dims());
        self.snapshot = Some(snapshot);
        Ok(Replaced { dims_changed })
    }
}
