//! Shared fixtures: a scratch monorepo, recording fakes for the external collaborators and a
//! mock JSON-RPC endpoint.

#![allow(dead_code)]

use std::{
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use axum::{Json, Router, http::StatusCode, routing::post};
use devnet_up_deploy::{
    CommandRunner, ContainerBackend, DevnetSettings, Invocation, ProcessEnv, ServiceGroup,
    ServiceName,
};
use serde_json::{Value, json};
use tempdir::TempDir;
use tokio::net::TcpListener;

/// Initialize tracing for tests (idempotent).
pub fn init_test_tracing() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init()
        .ok();
}

pub const INIT_HOLDER: &str = "0x04d63aBCd2b9b1baa327f2Dda0f873F197ccd186";
pub const INIT_HOLDER_PRV: &str =
    "59ba8068eb256d520179e903f43dacf6d8d57d72bd306e1bd603fdb8c8da10e8";
pub const BATCH_INBOX: &str = "0xff00000000000000000000000000000000000714";
pub const BLOCK_TAG: &str = "0x10";
pub const BLOCK_TIMESTAMP: &str = "0x6543";

/// Deploy-config template, with formatting the materializer would not produce itself.
pub const DEPLOY_CONFIG_TEMPLATE: &str =
    "{\"l1ChainID\": 900,\n\t\"l2ChainID\": 901,   \"l2BlockTime\": 2,\n\"finalSystemOwner\": \"0x0\"}\n";

/// Deployment artifacts written by the fake contract deployer.
pub const DEPLOYED_CONTRACTS: [(&str, &str); 5] = [
    (
        "Proxy__OVM_L1CrossDomainMessenger",
        "0xAAA0000000000000000000000000000000000001",
    ),
    ("OptimismPortalProxy", "0xBBB0000000000000000000000000000000000002"),
    ("L2OutputOracleProxy", "0xCCC0000000000000000000000000000000000003"),
    (
        "Proxy__OVM_L1StandardBridge",
        "0xDDD0000000000000000000000000000000000004",
    ),
    ("ProxyAdmin", "0xEEE0000000000000000000000000000000000005"),
];

/// A monorepo checkout with just the files the bring-up reads.
pub struct TestMonorepo {
    pub dir: TempDir,
}

impl TestMonorepo {
    pub fn new() -> Self {
        let dir = TempDir::new("devnet-monorepo").unwrap();
        let root = dir.path();

        let deploy_config_dir = root.join("packages/contracts-bedrock/deploy-config");
        std::fs::create_dir_all(&deploy_config_dir).unwrap();
        std::fs::write(deploy_config_dir.join("devnetL1.json"), DEPLOY_CONFIG_TEMPLATE).unwrap();
        std::fs::create_dir_all(root.join("op-node")).unwrap();
        std::fs::create_dir_all(root.join("ops-bedrock")).unwrap();
        std::fs::write(
            root.join("ops-bedrock/l1.env"),
            format!("BSC_CHAIN_ID=714\nINIT_HOLDER={INIT_HOLDER}\nINIT_HOLDER_PRV={INIT_HOLDER_PRV}\n"),
        )
        .unwrap();

        Self { dir }
    }

    pub fn root(&self) -> PathBuf {
        self.dir.path().canonicalize().unwrap()
    }

    pub fn devnet_file(&self, name: &str) -> PathBuf {
        self.root().join(".devnet").join(name)
    }

    pub fn deploy_config(&self) -> PathBuf {
        self.root()
            .join("packages/contracts-bedrock/deploy-config/devnetL1.json")
    }
}

/// Command runner that records every invocation and fakes the outputs of the real tools.
#[derive(Clone, Default)]
pub struct FakeRunner {
    pub invocations: Arc<Mutex<Vec<Invocation>>>,
    /// Deploy-config contents as seen by each collaborator, in invocation order.
    pub config_snapshots: Arc<Mutex<Vec<Value>>>,
    /// Program whose invocation fails.
    pub fail_program: Option<String>,
}

impl FakeRunner {
    pub fn failing(program: &str) -> Self {
        Self {
            fail_program: Some(program.to_string()),
            ..Default::default()
        }
    }

    pub fn invocations(&self) -> Vec<Invocation> {
        self.invocations.lock().unwrap().clone()
    }

    pub fn count(&self, program: &str) -> usize {
        self.invocations()
            .iter()
            .filter(|invocation| invocation.program == program)
            .count()
    }

    fn snapshot(&self, path: &Path) {
        let content = std::fs::read_to_string(path).unwrap();
        self.config_snapshots
            .lock()
            .unwrap()
            .push(serde_json::from_str(&content).unwrap());
    }

    fn fake_genesis(&self, invocation: &Invocation) {
        if let Some(path) = invocation.flag_value("--deploy-config") {
            self.snapshot(Path::new(path));
        }

        for flag in ["--outfile.l1", "--outfile.l2"] {
            if let Some(path) = invocation.flag_value(flag) {
                std::fs::write(path, r#"{"config": {}, "alloc": {}}"#).unwrap();
            }
        }

        if let Some(path) = invocation.flag_value("--outfile.rollup") {
            std::fs::write(
                path,
                json!({ "batch_inbox_address": BATCH_INBOX, "l2_chain_id": 901 }).to_string(),
            )
            .unwrap();
        }
    }

    fn fake_deployment(&self, invocation: &Invocation) {
        self.snapshot(&invocation.cwd.join("deploy-config/devnetL1.json"));

        let deployment_dir = invocation.cwd.join("deployments/devnetL1");
        std::fs::create_dir_all(&deployment_dir).unwrap();
        std::fs::write(deployment_dir.join(".chainId"), "714").unwrap();

        for (name, address) in DEPLOYED_CONTRACTS {
            std::fs::write(
                deployment_dir.join(format!("{name}.json")),
                json!({ "address": address, "abi": [] }).to_string(),
            )
            .unwrap();
        }
    }
}

impl CommandRunner for FakeRunner {
    async fn run(&self, invocation: &Invocation) -> anyhow::Result<()> {
        self.invocations.lock().unwrap().push(invocation.clone());

        if self.fail_program.as_deref() == Some(invocation.program.as_str()) {
            anyhow::bail!("`{}` exited with exit status: 1", invocation.command_line());
        }

        match invocation.program.as_str() {
            "go" => self.fake_genesis(invocation),
            "yarn" => self.fake_deployment(invocation),
            _ => {}
        }

        Ok(())
    }
}

/// Container backend that records the groups it is asked to start.
#[derive(Clone, Default)]
pub struct FakeBackend {
    pub groups: Arc<Mutex<Vec<ServiceGroup>>>,
}

impl FakeBackend {
    pub fn groups(&self) -> Vec<ServiceGroup> {
        self.groups.lock().unwrap().clone()
    }

    pub fn launches(&self) -> Vec<Vec<ServiceName>> {
        self.groups()
            .iter()
            .map(|group| group.services().to_vec())
            .collect()
    }
}

impl ContainerBackend for FakeBackend {
    async fn up(&self, group: &ServiceGroup) -> anyhow::Result<()> {
        self.groups.lock().unwrap().push(group.clone());
        Ok(())
    }
}

pub fn test_env() -> ProcessEnv {
    [("PATH", "/usr/bin:/bin"), ("HOME", "/home/devnet")]
        .into_iter()
        .collect()
}

/// Settings with short probe intervals.
pub fn fast_settings() -> DevnetSettings {
    DevnetSettings {
        tcp_max_attempts: 3,
        tcp_retry_interval_ms: 20,
        http_retry_interval_ms: 20,
        ..Default::default()
    }
}

/// Listener accepting TCP connections on a random local port.
pub async fn open_port() -> (TcpListener, u16) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    (listener, port)
}

/// A local port nothing listens on.
pub async fn closed_port() -> u16 {
    let (listener, port) = open_port().await;
    drop(listener);
    port
}

/// Spawn a JSON-RPC endpoint answering `eth_blockNumber` and `eth_getBlockByNumber`.
///
/// Calls to `failing_method` get a `503`.
pub async fn spawn_mock_rpc(failing_method: Option<&'static str>) -> String {
    let app = Router::new().route(
        "/",
        post(move |Json(request): Json<Value>| async move {
            let method = request["method"].as_str().unwrap_or_default().to_string();
            assert_eq!(request["id"], 74);

            if failing_method == Some(method.as_str()) {
                return (StatusCode::SERVICE_UNAVAILABLE, Json(json!({})));
            }

            let result = match method.as_str() {
                "eth_blockNumber" => json!(BLOCK_TAG),
                "eth_getBlockByNumber" => {
                    assert_eq!(request["params"], json!([BLOCK_TAG, false]));
                    json!({ "number": BLOCK_TAG, "timestamp": BLOCK_TIMESTAMP })
                }
                _ => Value::Null,
            };

            (
                StatusCode::OK,
                Json(json!({ "jsonrpc": "2.0", "id": 74, "result": result })),
            )
        }),
    );

    let (listener, port) = open_port().await;
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://127.0.0.1:{port}")
}
