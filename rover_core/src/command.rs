//! Operator command queue shared between input-edge producers and the
//! calibration drain.
//!
//! The queue is a single `AtomicU32` holding one saturating 8-bit pending
//! counter per command kind. Producers add with a compare-and-swap loop, the
//! consumer takes everything with one `swap(0)`. No lock is involved, so an
//! edge handler can push from an interrupt thread while the control loop is
//! mid-sample.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use rover_traits::{InputEdges, InputId};

use crate::error::Result;
use crate::hw_error::map_hal;

/// Calibration intents an operator can queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    ResetTrim,
    TrimLeftUp,
    TrimRightUp,
}

impl Command {
    /// Drain order: only the first kind present is acted on per take.
    pub const PRIORITY: [Command; 3] = [
        Command::ResetTrim,
        Command::TrimRightUp,
        Command::TrimLeftUp,
    ];

    const fn shift(self) -> u32 {
        match self {
            Command::ResetTrim => 0,
            Command::TrimLeftUp => 8,
            Command::TrimRightUp => 16,
        }
    }
}

/// Snapshot of queued commands. The all-zero value is the empty queue.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PendingCommands(u32);

impl PendingCommands {
    pub const NONE: PendingCommands = PendingCommands(0);

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// How many times `cmd` was queued (saturates at 255).
    pub fn count(self, cmd: Command) -> u8 {
        ((self.0 >> cmd.shift()) & 0xFF) as u8
    }

    pub fn contains(self, cmd: Command) -> bool {
        self.count(cmd) > 0
    }

    /// Highest-priority command present, with its queued count.
    pub fn highest(self) -> Option<(Command, u8)> {
        Command::PRIORITY
            .into_iter()
            .map(|c| (c, self.count(c)))
            .find(|(_, n)| *n > 0)
    }

    #[must_use]
    pub fn with(self, cmd: Command) -> Self {
        let n = self.count(cmd);
        if n == u8::MAX {
            return self;
        }
        PendingCommands(self.0 + (1 << cmd.shift()))
    }
}

#[derive(Debug, Default)]
pub struct CommandQueue {
    pending: AtomicU32,
}

impl CommandQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue one command. Lock-free and constant time; safe from any thread.
    pub fn push(&self, cmd: Command) {
        // The closure never returns None, so this cannot fail.
        let _ = self
            .pending
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |v| {
                Some(PendingCommands(v).with(cmd).0)
            });
    }

    pub fn is_empty(&self) -> bool {
        self.pending.load(Ordering::Acquire) == 0
    }

    pub fn snapshot(&self) -> PendingCommands {
        PendingCommands(self.pending.load(Ordering::Acquire))
    }

    /// Atomically take everything queued so far, leaving the queue empty.
    pub fn take(&self) -> PendingCommands {
        PendingCommands(self.pending.swap(0, Ordering::AcqRel))
    }
}

/// Register one edge handler per bound input; each handler only pushes its
/// command into `queue`.
pub fn bind_inputs(
    inputs: &mut dyn InputEdges,
    queue: &Arc<CommandQueue>,
    bindings: &[(InputId, Command)],
) -> Result<()> {
    for &(input, cmd) in bindings {
        let q = Arc::clone(queue);
        inputs
            .on_edge(input, Box::new(move || q.push(cmd)))
            .map_err(|e| eyre::Report::new(map_hal(&e)).wrap_err(format!("bind {input:?}")))?;
        tracing::debug!(?input, ?cmd, "input bound");
    }
    Ok(())
}
