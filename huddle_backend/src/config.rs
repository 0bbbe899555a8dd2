use std::env;
use std::time::Duration;

use tokio::time::sleep;

/// Simulated round-trip latency for each class of service operation.
///
/// The services sleep for the relevant duration *before* touching their
/// collection, so a dropped call never leaves a half-applied mutation.
/// `Latency::zero()` collapses every delay for tests.
#[derive(Debug, Clone)]
pub struct Latency {
    /// Listing a whole collection.
    pub list: Duration,
    /// Fetching a single record by identifier.
    pub fetch: Duration,
    /// Creating a record.
    pub create: Duration,
    /// Patching a record.
    pub update: Duration,
    /// Removing a record.
    pub delete: Duration,
    /// Flipping membership in a set (likes).
    pub toggle: Duration,
    /// Appending to an owned sequence (comments, attendees).
    pub append: Duration,
    /// Chat sends, tuned faster than other writes so the room feels live.
    pub send: Duration,
    /// Acknowledgements (read receipts).
    pub ack: Duration,
    /// Filtered listings (upcoming/past events, member activity windows).
    pub filter: Duration,
    /// Counting queries.
    pub count: Duration,
    /// Substring searches.
    pub search: Duration,
    /// Reading the static badge catalog.
    pub catalog: Duration,
}

impl Default for Latency {
    fn default() -> Self {
        Self {
            list: Duration::from_millis(300),
            fetch: Duration::from_millis(200),
            create: Duration::from_millis(400),
            update: Duration::from_millis(350),
            delete: Duration::from_millis(250),
            toggle: Duration::from_millis(200),
            append: Duration::from_millis(300),
            send: Duration::from_millis(200),
            ack: Duration::from_millis(150),
            filter: Duration::from_millis(250),
            count: Duration::from_millis(100),
            search: Duration::from_millis(300),
            catalog: Duration::from_millis(100),
        }
    }
}

impl Latency {
    /// No artificial delay at all.
    pub fn zero() -> Self {
        Self {
            list: Duration::ZERO,
            fetch: Duration::ZERO,
            create: Duration::ZERO,
            update: Duration::ZERO,
            delete: Duration::ZERO,
            toggle: Duration::ZERO,
            append: Duration::ZERO,
            send: Duration::ZERO,
            ack: Duration::ZERO,
            filter: Duration::ZERO,
            count: Duration::ZERO,
            search: Duration::ZERO,
            catalog: Duration::ZERO,
        }
    }

    /// Reads `HUDDLE_LATENCY_SCALE` (percent, default 100) and scales the
    /// default profile by it. `HUDDLE_LATENCY_SCALE=0` disables delays.
    pub fn from_env() -> Self {
        let scale = env::var("HUDDLE_LATENCY_SCALE")
            .ok()
            .and_then(|raw| raw.parse::<u32>().ok())
            .unwrap_or(100);
        Self::default().scaled(scale)
    }

    pub fn scaled(self, percent: u32) -> Self {
        let apply = |d: Duration| d * percent / 100;
        Self {
            list: apply(self.list),
            fetch: apply(self.fetch),
            create: apply(self.create),
            update: apply(self.update),
            delete: apply(self.delete),
            toggle: apply(self.toggle),
            append: apply(self.append),
            send: apply(self.send),
            ack: apply(self.ack),
            filter: apply(self.filter),
            count: apply(self.count),
            search: apply(self.search),
            catalog: apply(self.catalog),
        }
    }
}

/// Suspends the caller for the given simulated round-trip.
pub async fn delay(duration: Duration) {
    if !duration.is_zero() {
        sleep(duration).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_zero_disables_every_delay() {
        let latency = Latency::default().scaled(0);
        assert_eq!(latency.create, Duration::ZERO);
        assert_eq!(latency.list, Duration::ZERO);
    }

    #[test]
    fn test_scale_is_proportional() {
        let latency = Latency::default().scaled(50);
        assert_eq!(latency.create, Duration::from_millis(200));
        assert_eq!(latency.ack, Duration::from_millis(75));
    }
}
