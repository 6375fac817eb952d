//! Typed-out reveal of a completed resume.
//!
//! The text is already final before a reveal starts; this module only paces
//! its disclosure, one character per tick. Cosmetic, never content-affecting:
//! the observable value at completion equals the final text exactly, and every
//! intermediate value is a prefix of it.

use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

/// Default cadence: one character every 30 ms.
pub const DEFAULT_TICK: Duration = Duration::from_millis(30);

/// Owns at most one in-flight reveal task. Starting a new reveal supersedes
/// the previous one; two reveals never interleave.
pub struct RevealScheduler {
    tick: Duration,
    current: Option<CancellationToken>,
}

impl RevealScheduler {
    pub fn new(tick: Duration) -> Self {
        Self {
            tick,
            current: None,
        }
    }

    /// Begins revealing `final_text` from an empty prefix. Any reveal already
    /// in progress is cancelled before the new task is spawned.
    ///
    /// The returned receiver observes the growing prefix; it holds the last
    /// value after the task completes or is cancelled. An empty `final_text`
    /// completes with no ticks.
    pub fn start(&mut self, final_text: &str) -> watch::Receiver<String> {
        self.cancel();

        let (tx, rx) = watch::channel(String::new());
        let cancel = CancellationToken::new();
        self.current = Some(cancel.clone());

        tokio::spawn(run_reveal(final_text.to_owned(), tx, self.tick, cancel));

        rx
    }

    /// Stops ticking. The revealed prefix keeps its current value.
    pub fn cancel(&mut self) {
        if let Some(cancel) = self.current.take() {
            cancel.cancel();
        }
    }
}

impl Drop for RevealScheduler {
    // An uncancelled timer task would outlive its session.
    fn drop(&mut self) {
        self.cancel();
    }
}

async fn run_reveal(
    final_text: String,
    tx: watch::Sender<String>,
    tick: Duration,
    cancel: CancellationToken,
) {
    let mut timer = interval(tick);
    timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first interval tick completes immediately; swallow it so each
    // character lands one full tick after the previous.
    timer.tick().await;

    for ch in final_text.chars() {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => return,
            _ = timer.tick() => {
                tx.send_modify(|prefix| prefix.push(ch));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use tokio::task::yield_now;
    use tokio::time::advance;

    use super::*;

    // With the paused test clock, advancing past a tick deadline and yielding
    // lets the reveal task observe the tick deterministically.
    async fn step(ms: u64) {
        advance(Duration::from_millis(ms)).await;
        yield_now().await;
        yield_now().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_reveal_runs_to_completion_with_prefix_invariant() {
        let final_text = "## Résumé\nJohn";
        let mut scheduler = RevealScheduler::new(DEFAULT_TICK);
        let mut rx = scheduler.start(final_text);

        while rx.changed().await.is_ok() {
            let prefix = rx.borrow().clone();
            assert!(
                final_text.starts_with(&prefix),
                "observed value {prefix:?} is not a prefix of the final text"
            );
        }

        assert_eq!(*rx.borrow(), final_text);
    }

    #[tokio::test(start_paused = true)]
    async fn test_one_character_per_tick() {
        let mut scheduler = RevealScheduler::new(DEFAULT_TICK);
        let rx = scheduler.start("abc");

        yield_now().await;
        assert_eq!(*rx.borrow(), "");

        step(30).await;
        assert_eq!(*rx.borrow(), "a");

        step(30).await;
        assert_eq!(*rx.borrow(), "ab");

        step(30).await;
        assert_eq!(*rx.borrow(), "abc");
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_text_completes_without_ticks() {
        let before = tokio::time::Instant::now();
        let mut scheduler = RevealScheduler::new(DEFAULT_TICK);
        let mut rx = scheduler.start("");

        while rx.changed().await.is_ok() {}

        assert_eq!(*rx.borrow(), "");
        assert_eq!(tokio::time::Instant::now(), before);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_freezes_the_prefix() {
        let mut scheduler = RevealScheduler::new(DEFAULT_TICK);
        let rx = scheduler.start("abcdef");

        yield_now().await;
        step(30).await;
        step(30).await;
        assert_eq!(*rx.borrow(), "ab");

        scheduler.cancel();
        step(300).await;

        assert_eq!(*rx.borrow(), "ab");
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_supersedes_without_interleaving() {
        let mut scheduler = RevealScheduler::new(DEFAULT_TICK);
        let first = scheduler.start("AAAA");

        yield_now().await;
        step(30).await;
        step(30).await;
        let frozen = first.borrow().clone();
        assert_eq!(frozen, "AA");

        let mut second = scheduler.start("BBBB");
        while second.changed().await.is_ok() {
            assert!(
                !second.borrow().contains('A'),
                "superseded reveal leaked into the new one"
            );
        }

        assert_eq!(*second.borrow(), "BBBB");
        assert_eq!(*first.borrow(), frozen);
    }
}
