//! Start-rate limiting for provider lookups.

use std::time::Duration;
use tokio::time::Instant;

/// Spaces lookup starts at least `delay` apart.
///
/// The first call to [`wait_turn`](Self::wait_turn) returns immediately.
#[derive(Debug)]
pub struct LookupPacer {
    delay: Duration,
    next_start: Option<Instant>,
}

impl LookupPacer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            next_start: None,
        }
    }

    pub async fn wait_turn(&mut self) {
        if let Some(at) = self.next_start {
            tokio::time::sleep_until(at).await;
        }
        self.next_start = Some(Instant::now() + self.delay);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn spaces_consecutive_turns() {
        let mut pacer = LookupPacer::new(Duration::from_millis(250));
        let start = Instant::now();

        pacer.wait_turn().await;
        assert_eq!(start.elapsed(), Duration::ZERO);

        pacer.wait_turn().await;
        pacer.wait_turn().await;
        assert!(start.elapsed() >= Duration::from_millis(500));
    }

    #[tokio::test(start_paused = true)]
    async fn time_spent_elsewhere_counts_toward_the_delay() {
        let mut pacer = LookupPacer::new(Duration::from_millis(100));
        pacer.wait_turn().await;

        tokio::time::sleep(Duration::from_millis(150)).await;
        let before = Instant::now();
        pacer.wait_turn().await;
        assert_eq!(before.elapsed(), Duration::ZERO);
    }
}
