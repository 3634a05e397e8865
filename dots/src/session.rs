//! Input router and sync state machine for one board.
//!
//! `BoardSession` is owned by the window loop and is the only writer of the board cache. Pointer
//! events update the hovered edge and may produce move tickets; completions coming back from the
//! sync worker install new snapshots or report rejections. The session never mutates a snapshot:
//! an accepted move is shown only once the authority's post-move snapshot arrives.

use engine::graphics::Renderer2d;

use crate::cache::{BoardCache, SessionEpoch};
use crate::config::LayoutConfig;
use crate::geometry::{BoardGeometry, Edge};
use crate::projection::Projection;
use crate::render::{draw_banner, render_board};
use crate::snapshot::BoardSnapshot;
use crate::sync::{Completion, SyncError, SyncReply, SyncRequest, Ticket};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Waiting for the first snapshot of the current epoch.
    Loading,
    InProgress,
    GameOver,
    /// Load or reset failed; the session cannot continue.
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedMove {
    pub edge: Edge,
    pub reason: String,
}

#[derive(Debug)]
pub enum SessionUpdate {
    /// Nothing visible changed.
    Ignored,
    /// A new snapshot is installed. `resized` means the surface size changed too.
    Snapshot { resized: bool },
    /// The reset was acknowledged; this load must be submitted next.
    FollowUp(Ticket),
    MoveRejected(RejectedMove),
    Failed(SyncError),
}

#[derive(Debug)]
pub struct BoardSession {
    layout: LayoutConfig,
    cache: BoardCache,
    hovered: Option<Edge>,
    pending_move: Option<Edge>,
    rejected: Option<RejectedMove>,
    phase: SessionPhase,
}

impl BoardSession {
    pub fn new(layout: LayoutConfig) -> Self {
        Self {
            layout,
            cache: BoardCache::new(),
            hovered: None,
            pending_move: None,
            rejected: None,
            phase: SessionPhase::Loading,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn epoch(&self) -> SessionEpoch {
        self.cache.epoch()
    }

    pub fn snapshot(&self) -> Option<&BoardSnapshot> {
        self.cache.snapshot()
    }

    pub fn hovered(&self) -> Option<Edge> {
        self.hovered
    }

    pub fn pending_move(&self) -> Option<Edge> {
        self.pending_move
    }

    pub fn rejected(&self) -> Option<&RejectedMove> {
        self.rejected.as_ref()
    }

    pub fn layout(&self) -> LayoutConfig {
        self.layout
    }

    pub fn geometry(&self) -> Option<BoardGeometry> {
        self.snapshot()
            .map(|snapshot| BoardGeometry::for_snapshot(self.layout, snapshot))
    }

    pub fn projection(&self) -> Option<Projection> {
        self.snapshot().map(Projection::from_snapshot)
    }

    fn ticket(&self, request: SyncRequest) -> Ticket {
        Ticket {
            epoch: self.cache.epoch(),
            request,
        }
    }

    pub fn begin_load(&mut self) -> Ticket {
        self.phase = SessionPhase::Loading;
        self.ticket(SyncRequest::Load)
    }

    /// Starts a new epoch: hover, pending move and rejection are dropped and late replies from
    /// before the reset will be ignored. The old board stays visible until the reload lands.
    pub fn begin_reset(&mut self) -> Ticket {
        let epoch = self.cache.advance_epoch();
        tracing::info!(%epoch, "resetting game");
        self.hovered = None;
        self.pending_move = None;
        self.rejected = None;
        self.phase = SessionPhase::Loading;
        self.ticket(SyncRequest::Reset)
    }

    /// Returns `true` when the hovered edge changed and the board needs a redraw.
    pub fn pointer_moved(&mut self, x: f32, y: f32) -> bool {
        let Some(snapshot) = self.cache.snapshot() else {
            return false;
        };
        let hit = BoardGeometry::for_snapshot(self.layout, snapshot)
            .nearest_unclaimed_edge(x, y, snapshot);
        if hit == self.hovered {
            return false;
        }
        tracing::trace!(?hit, "hover changed");
        self.hovered = hit;
        true
    }

    pub fn pointer_left(&mut self) -> bool {
        self.hovered.take().is_some()
    }

    /// Translates a click into a move ticket, or `None` when the click is a no-op.
    pub fn clicked(&mut self, x: f32, y: f32) -> Option<Ticket> {
        let Some(snapshot) = self.cache.snapshot() else {
            tracing::debug!("click ignored: no board yet");
            return None;
        };
        self.rejected = None;

        if snapshot.is_game_over() {
            tracing::debug!("click ignored: game over");
            return None;
        }
        if self.phase != SessionPhase::InProgress {
            tracing::debug!(phase = ?self.phase, "click ignored: board not live");
            return None;
        }
        if let Some(pending) = self.pending_move {
            tracing::debug!(%pending, "click ignored: move in flight");
            return None;
        }

        let edge = BoardGeometry::for_snapshot(self.layout, snapshot)
            .nearest_unclaimed_edge(x, y, snapshot)?;
        tracing::info!(%edge, "submitting move");
        self.pending_move = Some(edge);
        Some(self.ticket(SyncRequest::SubmitMove(edge)))
    }

    pub fn complete(&mut self, completion: Completion) -> SessionUpdate {
        let epoch = completion.epoch;
        if !self.cache.is_current(epoch) {
            tracing::warn!(
                received = %epoch,
                current = %self.cache.epoch(),
                "discarding stale sync reply"
            );
            return SessionUpdate::Ignored;
        }

        match completion.reply {
            SyncReply::Loaded(Ok(snapshot)) => {
                tracing::info!(
                    rows = snapshot.dims().rows,
                    cols = snapshot.dims().cols,
                    "board loaded"
                );
                self.install(epoch, snapshot)
            }
            SyncReply::Reset(Ok(())) => {
                tracing::info!("reset acknowledged, reloading");
                SessionUpdate::FollowUp(self.begin_load())
            }
            SyncReply::Loaded(Err(err)) | SyncReply::Reset(Err(err)) => {
                tracing::error!(error = %err, "board sync failed");
                self.phase = SessionPhase::Failed;
                self.pending_move = None;
                SessionUpdate::Failed(err)
            }
            SyncReply::Moved {
                edge,
                result: Ok(snapshot),
            } => {
                self.pending_move = None;
                tracing::info!(
                    %edge,
                    completed = snapshot.completed_boxes().len(),
                    "move accepted"
                );
                self.install(epoch, snapshot)
            }
            SyncReply::Moved {
                edge,
                result: Err(err),
            } => {
                self.pending_move = None;
                let rejected = RejectedMove {
                    edge,
                    reason: err.reason(),
                };
                tracing::warn!(%edge, reason = %rejected.reason, "move rejected");
                self.rejected = Some(rejected.clone());
                SessionUpdate::MoveRejected(rejected)
            }
        }
    }

    fn install(&mut self, epoch: SessionEpoch, snapshot: BoardSnapshot) -> SessionUpdate {
        let game_over = snapshot.is_game_over();
        match self.cache.replace(epoch, snapshot) {
            Ok(replaced) => {
                self.hovered = None;
                self.rejected = None;
                self.phase = if game_over {
                    SessionPhase::GameOver
                } else {
                    SessionPhase::InProgress
                };
                SessionUpdate::Snapshot {
                    resized: replaced.dims_changed,
                }
            }
            Err(stale) => {
                tracing::warn!(?stale, "discarding stale snapshot");
                SessionUpdate::Ignored
            }
        }
    }

    /// Full redraw of the board; does nothing until the first snapshot arrives.
    pub fn render(&self, gfx: &mut dyn Renderer2d) {
        let Some(snapshot) = self.cache.snapshot() else {
            return;
        };
        let geometry = BoardGeometry::for_snapshot(self.layout, snapshot);
        let rejected = self.rejected.as_ref().map(|r| r.edge);
        render_board(gfx, &geometry, snapshot, self.hovered, rejected);

        if self.phase == SessionPhase::GameOver {
            if let Some(banner) = Projection::from_snapshot(snapshot).banner() {
                draw_banner(gfx, &banner);
            }
        }
    }
}
