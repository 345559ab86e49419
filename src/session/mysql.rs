//! MySQL / Galera session backed by `mysql_async`.

use async_trait::async_trait;
use mysql_async::{prelude::*, Opts, OptsBuilder, Pool, PoolConstraints, PoolOpts};

use super::{parse_target, ClusterSession, Credentials, SessionConnector, SessionError};

const STATUS_QUERY: &str =
    "SELECT VARIABLE_VALUE FROM performance_schema.global_status WHERE VARIABLE_NAME = ?";
const VARIABLES_QUERY: &str =
    "SELECT VARIABLE_VALUE FROM performance_schema.global_variables WHERE VARIABLE_NAME = ?";

/// Which global namespace a variable lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VariableKind {
    Status,
    Config,
}

impl VariableKind {
    fn table_query(self) -> &'static str {
        match self {
            VariableKind::Status => STATUS_QUERY,
            VariableKind::Config => VARIABLES_QUERY,
        }
    }

    fn show_keyword(self) -> &'static str {
        match self {
            VariableKind::Status => "STATUS",
            VariableKind::Config => "VARIABLES",
        }
    }
}

/// `SHOW GLOBAL ...` lookup used when `performance_schema` has no answer
/// (e.g. `performance_schema=OFF`).
///
/// `SHOW` cannot bind parameters, so only plain lowercase identifiers are
/// ever inlined.
fn show_query(kind: VariableKind, name: &str) -> Option<String> {
    let plain = !name.is_empty()
        && name
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'_');

    plain.then(|| {
        format!(
            "SHOW GLOBAL {} WHERE Variable_name = '{}'",
            kind.show_keyword(),
            name
        )
    })
}

/// Schema selected by the check session.
const CHECK_DATABASE: &str = "mysql";

/// Opens [`MySqlSession`]s.
#[derive(Debug, Clone, Default)]
pub struct MySqlConnector;

impl MySqlConnector {
    pub fn new() -> Self {
        Self
    }
}

impl SessionConnector for MySqlConnector {
    fn open(
        &self,
        host: &str,
        credentials: &Credentials,
    ) -> Result<Box<dyn ClusterSession>, SessionError> {
        let (hostname, port) = parse_target(host)?;

        // A single connection, dialed lazily on first use.
        let constraints = PoolConstraints::new(0, 1)
            .ok_or_else(|| SessionError::Unavailable("invalid pool constraints".into()))?;
        let pool_opts = PoolOpts::default()
            .with_constraints(constraints)
            .with_reset_connection(false);

        let password = Some(credentials.password.clone()).filter(|p| !p.is_empty());
        let opts: Opts = OptsBuilder::default()
            .ip_or_hostname(hostname)
            .tcp_port(port)
            .user(Some(credentials.user.clone()))
            .pass(password)
            .db_name(Some(CHECK_DATABASE))
            .pool_opts(pool_opts)
            .into();

        tracing::debug!(host = %host, user = %credentials.user, "Opening MySQL session");

        Ok(Box::new(MySqlSession {
            pool: Pool::new(opts),
        }))
    }
}

/// A check session holding at most one live connection.
pub struct MySqlSession {
    pool: Pool,
}

impl MySqlSession {
    async fn lookup(&self, kind: VariableKind, name: &str) -> Result<String, SessionError> {
        let mut conn = self.pool.get_conn().await?;

        let value: Option<String> = match conn.exec_first(kind.table_query(), (name,)).await {
            Ok(value) => value,
            Err(mysql_async::Error::Server(e)) => {
                tracing::debug!(variable = name, error = %e, "performance_schema lookup failed");
                None
            }
            Err(e) => return Err(e.into()),
        };
        if let Some(value) = value {
            return Ok(value);
        }

        let Some(query) = show_query(kind, name) else {
            return Err(SessionError::VariableMissing(name.to_string()));
        };
        tracing::debug!(variable = name, "Falling back to SHOW GLOBAL {}", kind.show_keyword());

        let row: Option<(String, String)> = conn.query_first(query).await?;
        row.map(|(_, value)| value)
            .ok_or_else(|| SessionError::VariableMissing(name.to_string()))
    }
}

#[async_trait]
impl ClusterSession for MySqlSession {
    async fn status_variable(&self, name: &str) -> Result<String, SessionError> {
        self.lookup(VariableKind::Status, name).await
    }

    async fn config_variable(&self, name: &str) -> Result<String, SessionError> {
        self.lookup(VariableKind::Config, name).await
    }

    async fn ping(&self) -> Result<(), SessionError> {
        let mut conn = self.pool.get_conn().await?;
        conn.ping().await?;
        Ok(())
    }

    async fn close(&self) -> Result<(), SessionError> {
        self.pool.clone().disconnect().await?;
        Ok(())
    }
}
