//! Single-writer simulation engine.
//!
//! The engine is always in one of three phases. Generating and playing are
//! mutually exclusive: a request to start either while the engine is busy is
//! ignored and returns `None`. The phase is claimed with a compare-and-swap
//! before any lock is taken, so a rejected request never blocks.

use crate::board::Board;
use crate::playback::{self, PlaybackHandle};
use crate::simulation::{Simulation, TickReport};
use cubelife_core::{
    BoardConfig, CellState, Coord, Error, PlaybackConfig, Result, RunId, Stats,
};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnginePhase {
    Idle,
    Generating,
    Playing,
}

impl EnginePhase {
    fn as_u8(self) -> u8 {
        match self {
            EnginePhase::Idle => 0,
            EnginePhase::Generating => 1,
            EnginePhase::Playing => 2,
        }
    }

    fn from_u8(value: u8) -> Self {
        match value {
            0 => EnginePhase::Idle,
            1 => EnginePhase::Generating,
            2 => EnginePhase::Playing,
            other => unreachable!("phase is only stored via as_u8, got {}", other),
        }
    }
}

struct EngineInner {
    phase: AtomicU8,
    world: Mutex<Option<Simulation>>,
    active_run: Mutex<Option<ActiveRun>>,
}

#[derive(Clone)]
struct ActiveRun {
    cancel: CancellationToken,
    /// Closes once the run's phase guard has been dropped
    finished: watch::Receiver<()>,
}

/// Returns the engine to `Idle` when dropped.
struct PhaseGuard {
    inner: Arc<EngineInner>,
    // Dropped after `Drop::drop` has stored `Idle`, waking anyone in `stop`
    finished: Option<watch::Sender<()>>,
}

impl Drop for PhaseGuard {
    fn drop(&mut self) {
        self.inner.active_run.lock().take();
        self.inner
            .phase
            .store(EnginePhase::Idle.as_u8(), Ordering::Release);
    }
}

/// Cloneable handle to a shared simulation.
#[derive(Clone)]
pub struct SimulationEngine {
    inner: Arc<EngineInner>,
}

impl Default for SimulationEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulationEngine {
    /// Create an idle engine with no board.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(EngineInner {
                phase: AtomicU8::new(EnginePhase::Idle.as_u8()),
                world: Mutex::new(None),
                active_run: Mutex::new(None),
            }),
        }
    }

    pub fn phase(&self) -> EnginePhase {
        EnginePhase::from_u8(self.inner.phase.load(Ordering::Acquire))
    }

    fn try_enter(&self, phase: EnginePhase) -> Option<PhaseGuard> {
        self.inner
            .phase
            .compare_exchange(
                EnginePhase::Idle.as_u8(),
                phase.as_u8(),
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .ok()
            .map(|_| PhaseGuard {
                inner: self.inner.clone(),
                finished: None,
            })
    }

    /// Replace the board with a freshly seeded one and return its initial stats.
    ///
    /// Returns `None` without touching the board if the engine is busy.
    pub fn generate(&self, config: &BoardConfig) -> Option<Stats> {
        self.generate_with(config, |_, _| {})
    }

    /// Like [`SimulationEngine::generate`], calling `on_cell` for every cell as
    /// it is seeded. The engine stays in `Generating` for the whole call.
    #[instrument(skip(self, config, on_cell))]
    pub fn generate_with<F>(&self, config: &BoardConfig, on_cell: F) -> Option<Stats>
    where
        F: FnMut(Coord, CellState),
    {
        let Some(_guard) = self.try_enter(EnginePhase::Generating) else {
            debug!(phase = ?self.phase(), "Generate ignored, engine busy");
            return None;
        };

        let sim = Simulation::generate_with(config, on_cell);
        let stats = sim.stats();
        *self.inner.world.lock() = Some(sim);
        Some(stats)
    }

    /// Run a single tick outside of playback.
    ///
    /// Returns `Ok(None)` if the engine is busy.
    pub fn step_once(&self) -> Result<Option<TickReport>> {
        let Some(_guard) = self.try_enter(EnginePhase::Playing) else {
            debug!(phase = ?self.phase(), "Step ignored, engine busy");
            return Ok(None);
        };

        let mut world = self.inner.world.lock();
        let sim = world.as_mut().ok_or_else(no_board)?;
        sim.step().map(Some)
    }

    /// Start playing `config.tick_count` ticks on a tokio task.
    ///
    /// Must be called from within a tokio runtime. Returns `Ok(None)` if the
    /// engine is busy, and an error if the tick duration is invalid or no
    /// board has been generated.
    #[instrument(skip(self), fields(tick_count = config.tick_count))]
    pub fn play(&self, config: &PlaybackConfig) -> Result<Option<PlaybackHandle>> {
        let tick_duration = config.tick_duration()?;

        let Some(mut guard) = self.try_enter(EnginePhase::Playing) else {
            debug!(phase = ?self.phase(), "Play ignored, engine busy");
            return Ok(None);
        };

        if self.inner.world.lock().is_none() {
            return Err(no_board());
        }

        let run_id = RunId::new();
        let cancel = CancellationToken::new();
        let (finished_tx, finished) = watch::channel(());
        guard.finished = Some(finished_tx);
        *self.inner.active_run.lock() = Some(ActiveRun {
            cancel: cancel.clone(),
            finished,
        });

        let (tx, rx) = mpsc::unbounded_channel();
        let inner = self.inner.clone();
        let task_cancel = cancel.clone();
        let tick_count = u64::from(config.tick_count);

        let task = tokio::spawn(async move {
            let _guard = guard;
            playback::drive(run_id, tick_count, tick_duration, task_cancel, tx, || {
                let mut world = inner.world.lock();
                world.as_mut().ok_or_else(no_board)?.step()
            })
            .await
        });

        Ok(Some(PlaybackHandle::new(run_id, rx, cancel, task)))
    }

    /// Stop the current playback, if any, at the next tick boundary and wait
    /// for it to end. The engine is `Idle` once this returns.
    ///
    /// Returns true if a run was stopped.
    pub async fn stop(&self) -> bool {
        let run = self.inner.active_run.lock().clone();
        let Some(mut run) = run else {
            return false;
        };

        run.cancel.cancel();
        while run.finished.changed().await.is_ok() {}
        true
    }

    /// Stats from the most recent generation or tick
    pub fn stats(&self) -> Option<Stats> {
        self.inner.world.lock().as_ref().map(|sim| sim.stats())
    }

    /// Copy of the current board
    pub fn board(&self) -> Option<Board> {
        self.inner.world.lock().as_ref().map(|sim| sim.board().clone())
    }

    /// Ticks run on the current board
    pub fn tick(&self) -> u64 {
        self.inner.world.lock().as_ref().map_or(0, |sim| sim.tick())
    }
}

fn no_board() -> Error {
    Error::InvalidState("no board has been generated".to_string())
}
