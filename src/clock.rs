use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use tokio::time::{sleep, Duration};
use tokio_util::sync::CancellationToken;

/// Source of "now" in the zone every event comparison happens in.
pub trait Clock: Send + Sync + 'static {
    fn now(&self) -> DateTime<Tz>;
}

#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    zone: Tz,
}

impl SystemClock {
    pub fn new(zone: Tz) -> Self {
        Self { zone }
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Tz> {
        Utc::now().with_timezone(&self.zone)
    }
}

/// Sleeps for `duration` unless `cancel` fires first.
///
/// Returns `false` when the sleep was cut short by cancellation.
pub async fn nap(cancel: &CancellationToken, duration: Duration) -> bool {
    tokio::select! {
        () = cancel.cancelled() => false,
        () = sleep(duration) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn nap_runs_to_completion() {
        let cancel = CancellationToken::new();
        assert!(nap(&cancel, Duration::from_secs(30)).await);
    }

    #[tokio::test(start_paused = true)]
    async fn nap_stops_on_cancellation() {
        let cancel = CancellationToken::new();

        let trigger = cancel.clone();
        tokio::spawn(async move {
            sleep(Duration::from_secs(1)).await;
            trigger.cancel();
        });

        let started = tokio::time::Instant::now();
        assert!(!nap(&cancel, Duration::from_secs(30)).await);
        assert!(started.elapsed() < Duration::from_secs(30));
    }

    #[test]
    fn system_clock_reports_the_configured_zone() {
        let clock = SystemClock::new(chrono_tz::America::Denver);
        assert_eq!(clock.now().timezone(), chrono_tz::America::Denver);
    }
}
