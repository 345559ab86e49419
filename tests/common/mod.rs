//! Shared utilities for integration testing.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use clustercheck::config::CheckConfig;
use clustercheck::http::HttpServer;
use clustercheck::lifecycle::Shutdown;
use clustercheck::session::{ClusterSession, Credentials, SessionConnector, SessionError};
use tokio::net::TcpListener;

/// Scripted node answers shared by every session the connector opens.
#[derive(Default)]
pub struct FakeNode {
    pub status: HashMap<String, String>,
    pub variables: HashMap<String, String>,
    pub lookups: Mutex<Vec<String>>,
    pub opened: AtomicU32,
    pub closed: AtomicU32,
}

impl FakeNode {
    pub fn new(local_state: &str, cluster_status: &str, read_only: &str) -> Arc<Self> {
        let mut node = Self::default();
        node.status.insert("wsrep_local_state".into(), local_state.into());
        node.status.insert("wsrep_cluster_status".into(), cluster_status.into());
        node.variables.insert("read_only".into(), read_only.into());
        Arc::new(node)
    }

    #[allow(dead_code)]
    pub fn looked_up(&self, name: &str) -> bool {
        self.lookups.lock().unwrap().iter().any(|n| n == name)
    }
}

struct FakeSession {
    node: Arc<FakeNode>,
}

#[async_trait]
impl ClusterSession for FakeSession {
    async fn status_variable(&self, name: &str) -> Result<String, SessionError> {
        self.node.lookups.lock().unwrap().push(name.to_string());
        self.node
            .status
            .get(name)
            .cloned()
            .ok_or_else(|| SessionError::VariableMissing(name.into()))
    }

    async fn config_variable(&self, name: &str) -> Result<String, SessionError> {
        self.node.lookups.lock().unwrap().push(name.to_string());
        self.node
            .variables
            .get(name)
            .cloned()
            .ok_or_else(|| SessionError::VariableMissing(name.into()))
    }

    async fn ping(&self) -> Result<(), SessionError> {
        Ok(())
    }

    async fn close(&self) -> Result<(), SessionError> {
        self.node.closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

pub struct FakeConnector {
    node: Arc<FakeNode>,
}

impl FakeConnector {
    pub fn new(node: Arc<FakeNode>) -> Arc<Self> {
        Arc::new(Self { node })
    }
}

impl SessionConnector for FakeConnector {
    fn open(
        &self,
        _host: &str,
        _credentials: &Credentials,
    ) -> Result<Box<dyn ClusterSession>, SessionError> {
        self.node.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeSession {
            node: self.node.clone(),
        }))
    }
}

/// Config with short retry timings, pointed at `db_host`.
pub fn test_config(db_host: &str) -> CheckConfig {
    let mut config = CheckConfig::default();
    config.listener.bind_address = "127.0.0.1:0".into();
    config.database.host = db_host.to_string();
    config.probe.connect_timeout_ms = 500;
    config.probe.connect_backoff_ms = 10;
    config.probe.ping_backoff_ms = 10;
    config
}

/// A listening socket standing in for the database port.
pub async fn start_db_port() -> (TcpListener, String) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap().to_string();
    (listener, addr)
}

/// An address nothing listens on.
#[allow(dead_code)]
pub async fn closed_port() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap().to_string();
    drop(listener);
    addr
}

/// Start the check server; returns its address and the shutdown handle.
pub async fn start_server(
    config: CheckConfig,
    connector: Arc<dyn SessionConnector>,
) -> (SocketAddr, Shutdown) {
    let listener = TcpListener::bind(&config.listener.bind_address).await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config, connector);
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    (addr, shutdown)
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
