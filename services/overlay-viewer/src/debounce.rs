//! Viewport debouncing.
//!
//! Pan and zoom produce a burst of intermediate viewports. Only the last one
//! of a burst is released, once no newer tick arrived for the quiet period,
//! and only if it differs from the previously released viewport.

use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Instant;

use overlay_common::ViewportWindow;

#[derive(Debug)]
pub struct ViewportDebouncer {
    quiet: Duration,
    pending: Option<(ViewportWindow, Instant)>,
    last_released: Option<ViewportWindow>,
}

impl ViewportDebouncer {
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            pending: None,
            last_released: None,
        }
    }

    pub fn from_millis(ms: u64) -> Self {
        Self::new(Duration::from_millis(ms))
    }

    pub fn quiet_period(&self) -> Duration {
        self.quiet
    }

    /// Record a viewport tick at `now`, replacing any pending one.
    pub fn push(&mut self, viewport: ViewportWindow, now: Instant) {
        self.pending = Some((viewport, now));
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Release the pending viewport if it has been quiet long enough.
    pub fn poll(&mut self, now: Instant) -> Option<ViewportWindow> {
        let (_, at) = self.pending?;
        if now.duration_since(at) < self.quiet {
            return None;
        }
        self.release()
    }

    /// Release the pending viewport regardless of the quiet period.
    pub fn flush(&mut self) -> Option<ViewportWindow> {
        self.release()
    }

    fn release(&mut self) -> Option<ViewportWindow> {
        let (viewport, _) = self.pending.take()?;
        if self.last_released == Some(viewport) {
            return None;
        }
        self.last_released = Some(viewport);
        Some(viewport)
    }

    /// Wait for the next settled viewport from a stream of ticks.
    ///
    /// Returns `None` once the channel is closed and nothing is left to release.
    pub async fn next_settled(
        &mut self,
        ticks: &mut mpsc::Receiver<ViewportWindow>,
    ) -> Option<ViewportWindow> {
        loop {
            let Some((_, at)) = self.pending else {
                let viewport = ticks.recv().await?;
                self.push(viewport, Instant::now());
                continue;
            };

            tokio::select! {
                tick = ticks.recv() => match tick {
                    Some(viewport) => self.push(viewport, Instant::now()),
                    None => return self.flush(),
                },
                _ = tokio::time::sleep_until(at + self.quiet) => {
                    if let Some(viewport) = self.poll(Instant::now()) {
                        return Some(viewport);
                    }
                }
            }
        }
    }
}
