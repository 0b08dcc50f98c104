//! Gateway harness shared by the end-to-end tests
//!
//! Serves every service on an RPC transport and a JSON gateway, both bound
//! to ephemeral ports, with mock node subsystems and a caller-chosen PoST
//! backend.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use meshgate_api_rpc::{BuildInfo, RpcServer, RunningServer, ServiceRegistry, Subsystems};
use meshgate_core::application::{resolve, shutdown_channel, PostSetupController, ShutdownSender};
use meshgate_core::config::ApiConfig;
use meshgate_core::domain::{SmesherId, Transport};
use meshgate_core::port::mesh::mocks::{MockClock, MockLedger};
use meshgate_core::port::network::mocks::MockNetwork;
use meshgate_core::port::process::mocks::MockProcessControl;
use meshgate_core::port::smeshing::mocks::MockSmeshing;
use meshgate_core::port::sync::mocks::MockSyncer;
use meshgate_core::port::{PostBackend, ProcessControl, SmeshingControl, SyncControl};
use meshgate_sdk::MeshgateClient;

pub const STEP: Duration = Duration::from_secs(5);

pub struct TestGateway {
    pub server: RunningServer,
    pub post: Arc<PostSetupController>,
    pub process: Arc<MockProcessControl>,
    pub syncer: Arc<MockSyncer>,
    shutdown: ShutdownSender,
}

impl TestGateway {
    pub async fn start(backend: Arc<dyn PostBackend>) -> Self {
        let activation = resolve(&ApiConfig {
            services: vec!["node".into(), "mesh".into(), "smesher".into()],
            rpc_server: true,
            rpc_port: 0,
            json_server: true,
            json_port: 0,
            ..Default::default()
        })
        .unwrap();

        let (shutdown, token) = shutdown_channel();
        let post = Arc::new(PostSetupController::new(backend));
        let process = Arc::new(MockProcessControl::default());
        let syncer = Arc::new(MockSyncer::new(true));
        let smeshing: Arc<dyn SmeshingControl> =
            Arc::new(MockSmeshing::new(SmesherId::new(vec![0xde, 0xad])));

        let subsystems = Subsystems {
            network: Some(Arc::new(MockNetwork::new(3))),
            syncer: Some(syncer.clone() as Arc<dyn SyncControl>),
            ledger: Some(Arc::new(MockLedger::new(100, 98))),
            clock: Some(Arc::new(MockClock::new(101))),
            process: Some(process.clone() as Arc<dyn ProcessControl>),
            smeshing: Some(smeshing),
            post: Some(post.clone()),
        };

        let module = ServiceRegistry::build(&activation, &subsystems, BuildInfo::default(), token)
            .unwrap()
            .into_module()
            .unwrap();
        let server = RpcServer::new(&activation).start(module).await.unwrap();

        Self {
            server,
            post,
            process,
            syncer,
            shutdown,
        }
    }

    pub fn ws_url(&self) -> String {
        format!("ws://{}", self.server.local_addr(Transport::Rpc).unwrap())
    }

    pub fn gateway_url(&self) -> String {
        format!("http://{}", self.server.local_addr(Transport::Json).unwrap())
    }

    pub async fn client(&self) -> MeshgateClient {
        MeshgateClient::connect(self.ws_url()).await.unwrap()
    }

    /// Flip the shutdown signal without stopping the transports
    pub fn signal_shutdown(&self) {
        self.shutdown.shutdown();
    }

    pub async fn stop(self) {
        self.shutdown.shutdown();
        self.server.stop().await;
    }
}

pub fn post_options(data_dir: &str, data_size: u64) -> meshgate_sdk::PostOptions {
    meshgate_sdk::PostOptions {
        data_dir: data_dir.to_string(),
        data_size,
        append: false,
        throttle: false,
        compute_provider_id: 0,
    }
}

/// Poll `check` until it holds or the step timeout elapses
pub async fn eventually(mut check: impl FnMut() -> bool) -> bool {
    let deadline = tokio::time::Instant::now() + STEP;
    while tokio::time::Instant::now() < deadline {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    check()
}
