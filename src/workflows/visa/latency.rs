use std::time::Duration;

/// Artificial delay awaited before each store operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SimulatedLatency(Duration);

impl SimulatedLatency {
    pub const NONE: Self = Self(Duration::ZERO);

    pub fn new(delay: Duration) -> Self {
        Self(delay)
    }

    pub fn from_millis(millis: u64) -> Self {
        Self(Duration::from_millis(millis))
    }

    pub fn delay(&self) -> Duration {
        self.0
    }

    pub async fn pause(&self) {
        if !self.0.is_zero() {
            tokio::time::sleep(self.0).await;
        }
    }
}
