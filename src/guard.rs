//! Delayed transitions and the in-flight flag.
//!
//! Each timer runs as a small tokio task that sleeps and then reports back
//! through a channel, so the owner handles every firing on its own event
//! loop. At most one timer per [`TimerKind`] is pending; arming a kind again
//! aborts the previous task and bumps its generation, so a firing that was
//! already queued is recognised as stale and dropped by [`TransitionGuard::accept`].

use log::trace;
use std::time::Duration;
use tokio::{sync::mpsc::UnboundedSender, task::AbortHandle};
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
    /// Moves `Loading` to `Playing` after the dwell time.
    Forward,
    /// Forces recovery if `Loading` never ends.
    Watchdog,
    /// Delays the continue action after a keypress.
    Debounce,
}

impl TimerKind {
    const ALL: [TimerKind; 3] = [TimerKind::Forward, TimerKind::Watchdog, TimerKind::Debounce];

    fn slot(self) -> usize {
        match self {
            TimerKind::Forward => 0,
            TimerKind::Watchdog => 1,
            TimerKind::Debounce => 2,
        }
    }
}

/// A timer that went off, as delivered on the channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fired {
    pub kind: TimerKind,
    generation: u64,
}

#[derive(Debug)]
struct Pending {
    generation: u64,
    handle: AbortHandle,
}

#[derive(Debug)]
pub struct TransitionGuard {
    fired_tx: UnboundedSender<Fired>,
    cancellation_token: CancellationToken,
    pending: [Option<Pending>; 3],
    next_generation: u64,
    transitioning: bool,
    alive: bool,
}

impl TransitionGuard {
    pub fn new(fired_tx: UnboundedSender<Fired>) -> Self {
        Self {
            fired_tx,
            cancellation_token: CancellationToken::new(),
            pending: Default::default(),
            next_generation: 0,
            transitioning: false,
            alive: true,
        }
    }

    pub fn is_transitioning(&self) -> bool {
        self.transitioning
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    /// Claims the in-flight flag. Returns false if a transition is already
    /// running or the guard has been torn down.
    pub fn try_begin(&mut self) -> bool {
        if !self.alive || self.transitioning {
            return false;
        }
        self.transitioning = true;
        true
    }

    pub fn finish(&mut self) {
        self.transitioning = false;
    }

    /// Schedules `kind` to fire after `after`, replacing any pending timer of
    /// the same kind. Must be called from within a tokio runtime.
    pub fn arm(&mut self, kind: TimerKind, after: Duration) {
        if !self.alive {
            return;
        }
        self.cancel(kind);
        let generation = self.next_generation;
        self.next_generation += 1;

        let fired = Fired { kind, generation };
        let fired_tx = self.fired_tx.clone();
        let cancellation_token = self.cancellation_token.clone();
        let task = tokio::spawn(async move {
            tokio::select! {
                _ = cancellation_token.cancelled() => {}
                _ = tokio::time::sleep(after) => {
                    let _unused = fired_tx.send(fired);
                }
            }
        });
        trace!("armed {kind:?} #{generation} for {after:?}");
        self.pending[kind.slot()] = Some(Pending {
            generation,
            handle: task.abort_handle(),
        });
    }

    pub fn cancel(&mut self, kind: TimerKind) {
        if let Some(pending) = self.pending[kind.slot()].take() {
            pending.handle.abort();
        }
    }

    #[cfg(test)]
    pub fn is_armed(&self, kind: TimerKind) -> bool {
        self.pending[kind.slot()].is_some()
    }

    /// Consumes a firing. Returns true only if the guard is alive and `fired`
    /// is the currently pending timer of its kind.
    pub fn accept(&mut self, fired: Fired) -> bool {
        if !self.alive {
            return false;
        }
        let slot = &mut self.pending[fired.kind.slot()];
        match slot {
            Some(pending) if pending.generation == fired.generation => {
                *slot = None;
                true
            }
            _ => {
                trace!("dropping stale {:?} #{}", fired.kind, fired.generation);
                false
            }
        }
    }

    /// Cancels everything; later firings and transitions are refused.
    pub fn teardown(&mut self) {
        self.alive = false;
        self.transitioning = false;
        for kind in TimerKind::ALL {
            self.cancel(kind);
        }
        self.cancellation_token.cancel();
    }
}

impl Drop for TransitionGuard {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::{
        sync::mpsc::{self, UnboundedReceiver},
        time::{self, Instant},
    };

    fn guard() -> (TransitionGuard, UnboundedReceiver<Fired>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (TransitionGuard::new(tx), rx)
    }

    fn assert_elapsed(start: Instant, millis: u64) {
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(millis), "{elapsed:?}");
        assert!(elapsed < Duration::from_millis(millis + 2), "{elapsed:?}");
    }

    async fn nothing_fires(rx: &mut UnboundedReceiver<Fired>) -> bool {
        time::timeout(Duration::from_secs(60), rx.recv())
            .await
            .is_err()
    }

    #[test]
    fn test_in_flight_flag() {
        let (mut guard, _rx) = guard();
        assert!(!guard.is_transitioning());
        assert!(guard.try_begin());
        assert!(guard.is_transitioning());
        assert!(!guard.try_begin());
        guard.finish();
        assert!(guard.try_begin());

        guard.teardown();
        assert!(!guard.is_transitioning());
        assert!(!guard.try_begin());
    }

    #[tokio::test(start_paused = true)]
    async fn test_fires_after_delay() {
        let (mut guard, mut rx) = guard();
        let start = Instant::now();
        guard.arm(TimerKind::Forward, Duration::from_millis(400));
        assert!(guard.is_armed(TimerKind::Forward));

        let fired = rx.recv().await.unwrap();
        assert_eq!(fired.kind, TimerKind::Forward);
        assert_elapsed(start, 400);
        assert!(guard.accept(fired));
        assert!(!guard.is_armed(TimerKind::Forward));
        // a second delivery of the same firing is not accepted
        assert!(!guard.accept(fired));
    }

    #[tokio::test(start_paused = true)]
    async fn test_rearm_replaces_pending() {
        let (mut guard, mut rx) = guard();
        let start = Instant::now();
        guard.arm(TimerKind::Debounce, Duration::from_millis(30));
        time::advance(Duration::from_millis(20)).await;
        guard.arm(TimerKind::Debounce, Duration::from_millis(30));

        let fired = rx.recv().await.unwrap();
        assert_elapsed(start, 50);
        assert!(guard.accept(fired));
        assert!(nothing_fires(&mut rx).await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_firing_rejected() {
        let (mut guard, mut rx) = guard();
        guard.arm(TimerKind::Forward, Duration::from_millis(10));
        let stale = rx.recv().await.unwrap();

        // re-armed before the first firing was handled
        guard.arm(TimerKind::Forward, Duration::from_millis(10));
        assert!(!guard.accept(stale));
        assert!(guard.is_armed(TimerKind::Forward));

        let fresh = rx.recv().await.unwrap();
        assert!(guard.accept(fresh));
    }

    #[tokio::test(start_paused = true)]
    async fn test_kinds_are_independent() {
        let (mut guard, mut rx) = guard();
        guard.arm(TimerKind::Forward, Duration::from_millis(500));
        guard.arm(TimerKind::Watchdog, Duration::from_millis(3000));

        let first = rx.recv().await.unwrap();
        assert_eq!(first.kind, TimerKind::Forward);
        assert!(guard.accept(first));
        guard.cancel(TimerKind::Watchdog);
        assert!(nothing_fires(&mut rx).await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_teardown_cancels_everything() {
        let (mut guard, mut rx) = guard();
        guard.arm(TimerKind::Forward, Duration::from_millis(500));
        guard.arm(TimerKind::Watchdog, Duration::from_millis(3000));
        guard.arm(TimerKind::Debounce, Duration::from_millis(30));
        guard.teardown();

        assert!(TimerKind::ALL.iter().all(|&kind| !guard.is_armed(kind)));
        assert!(nothing_fires(&mut rx).await);

        guard.arm(TimerKind::Forward, Duration::from_millis(1));
        assert!(!guard.is_armed(TimerKind::Forward));
    }

    #[tokio::test(start_paused = true)]
    async fn test_firing_after_teardown_is_ignored() {
        let (mut guard, mut rx) = guard();
        guard.arm(TimerKind::Forward, Duration::from_millis(5));
        let fired = rx.recv().await.unwrap();
        guard.teardown();
        assert!(!guard.accept(fired));
    }
}
