//! Startup provisioning - make sure the D1 database (and optionally an R2
//! bucket) exists before the bot starts handling interactions.
//!
//! Provisioning runs once, sequentially, at process start. It is not safe to
//! run concurrently for the same name: two racing callers can both create a
//! database.

use crate::cloudflare::types::BUCKET_NOT_FOUND_CODE;
use crate::cloudflare::{ApiEnvelope, CloudflareApi, R2Bucket, StatementRequest};
use crate::core::statement;
use crate::entities::Message;
use crate::errors::{Error, ProvisionStage, Result};
use sea_orm::{DbBackend, Schema};
use tracing::{info, instrument};

/// Builds the `CREATE TABLE IF NOT EXISTS` statement for the message table.
#[must_use]
pub fn create_message_table_statement() -> StatementRequest {
    let backend = DbBackend::Sqlite;
    let mut table = Schema::new(backend).create_table_from_entity(Message);
    table.if_not_exists();
    StatementRequest::new(backend.build(&table).sql)
}

/// Looks up `name` in the account's database list and returns its identifier.
///
/// A match without an identifier counts as missing.
async fn find_database_id<A>(api: &A, name: &str) -> Result<Option<String>>
where
    A: CloudflareApi + ?Sized,
{
    let envelope = api.list_databases().await?.check("list databases")?;
    Ok(envelope
        .result
        .unwrap_or_default()
        .into_iter()
        .find(|db| db.name == name)
        .map(|db| db.uuid)
        .filter(|id| !id.is_empty()))
}

/// Ensures a D1 database called `name` exists and returns its identifier.
///
/// An existing database is returned as-is without touching its schema. A
/// missing one is created, looked up again (the create response is not
/// trusted to carry the identifier) and given the message table.
///
/// # Errors
/// Returns [`Error::Provision`] tagged with the stage that failed.
#[instrument(skip(api))]
pub async fn ensure_database<A>(api: &A, name: &str) -> Result<String>
where
    A: CloudflareApi + ?Sized,
{
    if let Some(id) = find_database_id(api, name)
        .await
        .map_err(|e| Error::provision(ProvisionStage::List, e))?
    {
        info!(database_id = %id, "Using existing D1 database");
        return Ok(id);
    }

    info!("D1 database not found, creating it");
    api.create_database(name)
        .await
        .and_then(|envelope| envelope.check("create database"))
        .map_err(|e| Error::provision(ProvisionStage::Create, e))?;

    let id = find_database_id(api, name)
        .await
        .and_then(|found| {
            found.ok_or_else(|| Error::NotFound {
                resource: format!("database '{name}' after creation"),
            })
        })
        .map_err(|e| Error::provision(ProvisionStage::Verify, e))?;

    statement::execute(api, &id, &create_message_table_statement())
        .await
        .map_err(|e| Error::provision(ProvisionStage::Schema, e))?;

    info!(database_id = %id, "Created D1 database and message table");
    Ok(id)
}

/// Interprets a bucket lookup: `Ok(true)` if it exists, `Ok(false)` if
/// Cloudflare answered with the "no such bucket" code, an error otherwise.
pub fn bucket_presence(envelope: ApiEnvelope<R2Bucket>) -> Result<bool> {
    if envelope.success {
        return Ok(true);
    }
    if envelope.has_error_code(BUCKET_NOT_FOUND_CODE) {
        return Ok(false);
    }
    Err(Error::ApiFailure {
        operation: "get bucket",
        errors: envelope.errors,
    })
}

/// Ensures an R2 bucket called `name` exists, creating it if necessary.
///
/// # Errors
/// Returns [`Error::Provision`] if the lookup fails for any reason other than
/// "not found", or if creation fails.
#[instrument(skip(api))]
pub async fn ensure_bucket<A>(api: &A, name: &str) -> Result<()>
where
    A: CloudflareApi + ?Sized,
{
    let exists = api
        .get_bucket(name)
        .await
        .and_then(bucket_presence)
        .map_err(|e| Error::provision(ProvisionStage::List, e))?;
    if exists {
        info!("Using existing R2 bucket");
        return Ok(());
    }

    info!("R2 bucket not found, creating it");
    api.create_bucket(name)
        .await
        .and_then(|envelope| envelope.check("create bucket"))
        .map_err(|e| Error::provision(ProvisionStage::Create, e))?;
    info!("Created R2 bucket");
    Ok(())
}
