//! Simulated round-trip latency.
//!
//! Every directory operation pauses before touching storage so that callers
//! see the same loading behaviour they would against a remote service. The
//! pause is a [`Latency`] implementation injected into the directory, which
//! lets tests swap in [`NoLatency`].

use std::time::Duration;

use async_trait::async_trait;
use tracing::trace;

/// The directory operations, for latency lookup and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Aggregate counts.
    Stats,
    /// Filtered donor listing.
    ListDonors,
    /// Donor registration.
    CreateDonor,
    /// Single donor lookup.
    GetDonor,
    /// Donor patch.
    UpdateDonor,
    /// Contact-form submission.
    SendMessage,
    /// Message listing.
    ListMessages,
    /// Single message removal.
    DeleteMessage,
    /// Message log wipe.
    ClearMessages,
}

impl Operation {
    /// Unscaled delay for this operation.
    #[must_use]
    pub const fn base_delay(self) -> Duration {
        match self {
            Self::GetDonor | Self::DeleteMessage | Self::ClearMessages => {
                Duration::from_millis(150)
            }
            Self::Stats | Self::ListMessages => Duration::from_millis(200),
            Self::ListDonors => Duration::from_millis(250),
            Self::CreateDonor | Self::UpdateDonor | Self::SendMessage => {
                Duration::from_millis(300)
            }
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Stats => "stats",
            Self::ListDonors => "list_donors",
            Self::CreateDonor => "create_donor",
            Self::GetDonor => "get_donor",
            Self::UpdateDonor => "update_donor",
            Self::SendMessage => "send_message",
            Self::ListMessages => "list_messages",
            Self::DeleteMessage => "delete_message",
            Self::ClearMessages => "clear_messages",
        };
        f.write_str(name)
    }
}

/// A pause taken before each directory operation.
#[async_trait]
pub trait Latency: Send + Sync {
    /// Wait as long as `operation` should take.
    async fn pause(&self, operation: Operation);
}

/// Sleeps on the tokio timer for a scaled per-operation delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulatedLatency {
    scale_percent: u32,
}

impl SimulatedLatency {
    /// Create a latency policy scaled to `scale_percent` of the base delays.
    #[must_use]
    pub const fn new(scale_percent: u32) -> Self {
        Self { scale_percent }
    }

    /// The delay this policy applies to `operation`.
    #[must_use]
    pub fn delay_for(&self, operation: Operation) -> Duration {
        operation.base_delay() * self.scale_percent / 100
    }
}

impl Default for SimulatedLatency {
    fn default() -> Self {
        Self::new(100)
    }
}

#[async_trait]
impl Latency for SimulatedLatency {
    async fn pause(&self, operation: Operation) {
        let delay = self.delay_for(operation);
        if delay.is_zero() {
            return;
        }
        trace!(%operation, ?delay, "Simulating latency");
        tokio::time::sleep(delay).await;
    }
}

/// Returns immediately.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct NoLatency;

#[async_trait]
impl Latency for NoLatency {
    async fn pause(&self, _operation: Operation) {}
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use super::*;

    #[test]
    fn test_base_delays() {
        assert_eq!(Operation::Stats.base_delay(), Duration::from_millis(200));
        assert_eq!(Operation::ListDonors.base_delay(), Duration::from_millis(250));
        assert_eq!(Operation::CreateDonor.base_delay(), Duration::from_millis(300));
        assert_eq!(Operation::GetDonor.base_delay(), Duration::from_millis(150));
        assert_eq!(Operation::ClearMessages.base_delay(), Duration::from_millis(150));
    }

    #[test]
    fn test_delay_scaling() {
        let half = SimulatedLatency::new(50);
        assert_eq!(half.delay_for(Operation::UpdateDonor), Duration::from_millis(150));

        let off = SimulatedLatency::new(0);
        assert!(off.delay_for(Operation::SendMessage).is_zero());

        assert_eq!(
            SimulatedLatency::default().delay_for(Operation::ListMessages),
            Duration::from_millis(200)
        );
    }

    #[test]
    fn test_operation_display() {
        assert_eq!(Operation::DeleteMessage.to_string(), "delete_message");
        assert_eq!(Operation::Stats.to_string(), "stats");
    }

    #[tokio::test]
    async fn test_simulated_latency_sleeps() {
        let latency = SimulatedLatency::new(10);
        let started = Instant::now();
        latency.pause(Operation::GetDonor).await;
        assert!(started.elapsed() >= Duration::from_millis(15));
    }

    #[tokio::test]
    async fn test_no_latency_returns() {
        NoLatency.pause(Operation::CreateDonor).await;
    }
}
