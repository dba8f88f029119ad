//! Statement execution against a remote D1 database.
//!
//! Write-oriented: the executor checks the envelope's `success` flag and
//! nothing else. No rows are read back.

use crate::cloudflare::{CloudflareApi, StatementRequest};
use crate::errors::{Error, Result};
use sea_orm::{Statement, Value};
use tracing::{debug, instrument};

impl TryFrom<Statement> for StatementRequest {
    type Error = Error;

    /// Converts a statement built by sea-orm into `?` SQL plus positional parameters.
    ///
    /// Only string values are supported; every column of the remote schema is text.
    fn try_from(statement: Statement) -> Result<Self> {
        let params = statement
            .values
            .map(|values| values.0)
            .unwrap_or_default()
            .into_iter()
            .map(param_from_value)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            sql: statement.sql,
            params,
        })
    }
}

fn param_from_value(value: Value) -> Result<String> {
    match value {
        Value::String(Some(s)) => Ok(*s),
        other => Err(Error::UnsupportedParameter {
            value: format!("{other:?}"),
        }),
    }
}

/// Runs one statement against the database identified by `database_id`.
///
/// # Errors
/// Returns [`Error::Statement`] carrying the SQL text when the identifier is
/// empty, the request cannot be delivered or decoded, or the envelope reports
/// `success: false`.
#[instrument(skip(api, statement), fields(sql = %statement.sql))]
pub async fn execute<A>(api: &A, database_id: &str, statement: &StatementRequest) -> Result<()>
where
    A: CloudflareApi + ?Sized,
{
    let fail = |source: Error| Error::Statement {
        sql: statement.sql.clone(),
        source: Box::new(source),
    };

    if database_id.is_empty() {
        return Err(fail(Error::NotFound {
            resource: "database identifier".to_string(),
        }));
    }

    api.query(database_id, statement)
        .await
        .and_then(|envelope| envelope.check("query"))
        .map_err(fail)?;
    debug!("Statement executed");
    Ok(())
}
