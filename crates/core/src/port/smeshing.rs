// Smeshing Activation Port

use crate::domain::{Address, SmesherId};
use crate::error::Result;
use async_trait::async_trait;

/// Control over the smeshing (proof-of-space participation) process
#[async_trait]
pub trait SmeshingControl: Send + Sync {
    fn is_smeshing(&self) -> bool;

    /// Begin smeshing with rewards going to `coinbase`
    ///
    /// # Errors
    /// - AppError::AlreadyRunning if smeshing is already active
    async fn start_smeshing(&self, coinbase: Address) -> Result<()>;

    /// # Errors
    /// - AppError::NotRunning if smeshing is not active
    async fn stop_smeshing(&self) -> Result<()>;

    fn smesher_id(&self) -> SmesherId;

    fn coinbase(&self) -> Address;

    /// Takes effect on the next start; a running session keeps its address
    fn set_coinbase(&self, coinbase: Address);
}

pub mod mocks {
    use super::*;
    use crate::error::AppError;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MockState {
        smeshing: bool,
        coinbase: Address,
        active_coinbase: Option<Address>,
    }

    pub struct MockSmeshing {
        id: SmesherId,
        state: Mutex<MockState>,
    }

    impl MockSmeshing {
        pub fn new(id: SmesherId) -> Self {
            Self {
                id,
                state: Mutex::new(MockState::default()),
            }
        }

        /// Coinbase the running session was started with
        pub fn active_coinbase(&self) -> Option<Address> {
            self.state.lock().unwrap().active_coinbase
        }
    }

    #[async_trait]
    impl SmeshingControl for MockSmeshing {
        fn is_smeshing(&self) -> bool {
            self.state.lock().unwrap().smeshing
        }

        async fn start_smeshing(&self, coinbase: Address) -> Result<()> {
            let mut state = self.state.lock().unwrap();
            if state.smeshing {
                return Err(AppError::AlreadyRunning("smeshing already started".into()));
            }
            state.smeshing = true;
            state.coinbase = coinbase;
            state.active_coinbase = Some(coinbase);
            Ok(())
        }

        async fn stop_smeshing(&self) -> Result<()> {
            let mut state = self.state.lock().unwrap();
            if !state.smeshing {
                return Err(AppError::NotRunning("smeshing not started".into()));
            }
            state.smeshing = false;
            state.active_coinbase = None;
            Ok(())
        }

        fn smesher_id(&self) -> SmesherId {
            self.id.clone()
        }

        fn coinbase(&self) -> Address {
            self.state.lock().unwrap().coinbase
        }

        fn set_coinbase(&self, coinbase: Address) {
            self.state.lock().unwrap().coinbase = coinbase;
        }
    }
}
