// Layer clock derived from genesis time

use chrono::{DateTime, Utc};
use meshgate_core::domain::LayerId;
use meshgate_core::error::{AppError, Result};
use meshgate_core::port::{ClockInfo, TimeProvider};
use std::sync::Arc;
use std::time::Duration;

/// Wall-clock layer counter
///
/// Layer 0 starts at genesis; before genesis the clock stays at layer 0.
pub struct LayerClock {
    genesis: DateTime<Utc>,
    layer_duration: Duration,
    layers_per_epoch: u64,
    time_provider: Arc<dyn TimeProvider>,
}

impl LayerClock {
    pub fn new(
        genesis: DateTime<Utc>,
        layer_duration: Duration,
        layers_per_epoch: u64,
        time_provider: Arc<dyn TimeProvider>,
    ) -> Result<Self> {
        if layer_duration.as_millis() == 0 {
            return Err(AppError::InvalidArgument(
                "layer duration must be at least one millisecond".to_string(),
            ));
        }
        Ok(Self {
            genesis,
            layer_duration,
            layers_per_epoch,
            time_provider,
        })
    }
}

impl ClockInfo for LayerClock {
    fn current_layer(&self) -> LayerId {
        let elapsed_ms = self.time_provider.now_millis() - self.genesis.timestamp_millis();
        if elapsed_ms <= 0 {
            return LayerId(0);
        }
        LayerId(elapsed_ms as u64 / self.layer_duration.as_millis() as u64)
    }

    fn genesis_time(&self) -> DateTime<Utc> {
        self.genesis
    }

    fn layer_duration(&self) -> Duration {
        self.layer_duration
    }

    fn layers_per_epoch(&self) -> u64 {
        self.layers_per_epoch
    }
}
