// Local smeshing activation

use async_trait::async_trait;
use meshgate_core::domain::{Address, SmesherId};
use meshgate_core::error::{AppError, Result};
use meshgate_core::port::SmeshingControl;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::info;

#[derive(Default)]
struct SmeshingState {
    /// Coinbase used by the next start
    coinbase: Address,
    /// Coinbase of the running session
    active: Option<Address>,
}

/// In-process smeshing switch with a random node identity
pub struct LocalSmeshing {
    id: SmesherId,
    state: Mutex<SmeshingState>,
}

impl LocalSmeshing {
    pub fn new(id: SmesherId, coinbase: Address) -> Self {
        Self {
            id,
            state: Mutex::new(SmeshingState {
                coinbase,
                active: None,
            }),
        }
    }

    /// New identity derived from a random UUID
    pub fn with_random_identity(coinbase: Address) -> Self {
        let id = SmesherId::new(uuid::Uuid::new_v4().as_bytes().to_vec());
        Self::new(id, coinbase)
    }

    /// Coinbase of the running session, if any
    pub fn active_coinbase(&self) -> Option<Address> {
        self.lock().active
    }

    fn lock(&self) -> MutexGuard<'_, SmeshingState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl SmeshingControl for LocalSmeshing {
    fn is_smeshing(&self) -> bool {
        self.lock().active.is_some()
    }

    async fn start_smeshing(&self, coinbase: Address) -> Result<()> {
        let mut state = self.lock();
        if state.active.is_some() {
            return Err(AppError::AlreadyRunning("smeshing already started".to_string()));
        }
        state.coinbase = coinbase;
        state.active = Some(coinbase);
        info!(coinbase = %coinbase, smesher = %self.id.to_hex(), "Smeshing started");
        Ok(())
    }

    async fn stop_smeshing(&self) -> Result<()> {
        let mut state = self.lock();
        if state.active.take().is_none() {
            return Err(AppError::NotRunning("smeshing not started".to_string()));
        }
        info!("Smeshing stopped");
        Ok(())
    }

    fn smesher_id(&self) -> SmesherId {
        self.id.clone()
    }

    fn coinbase(&self) -> Address {
        self.lock().coinbase
    }

    fn set_coinbase(&self, coinbase: Address) {
        self.lock().coinbase = coinbase;
    }
}
