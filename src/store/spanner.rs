use anyhow::{Context, Result};
use async_trait::async_trait;
use gcloud_gax::grpc::Status;
use gcloud_googleapis::spanner::admin::database::v1::{
    GetDatabaseDdlRequest, UpdateDatabaseDdlRequest,
};
use gcloud_spanner::admin::client::Client as AdminClient;
use gcloud_spanner::admin::AdminClientConfig;
use gcloud_spanner::client::{Client, ClientConfig, Error as SpannerError};
use gcloud_spanner::key::Key;
use gcloud_spanner::mutation::{delete, insert_or_update};
use gcloud_spanner::statement::Statement;
use std::fmt::Display;
use std::sync::Arc;

use super::{KvStore, StoreError};
use crate::config::SpannerConfig;
use crate::models::{DeleteItemOutput, GetItemOutput, PutItemOutput, Record};

const CLIENT_ERROR_CODE: &str = "SpannerClientError";

/// Key-value store backed by a single Spanner table
///
/// Rows hold the primary key in `id` and the full record as JSON in `data`.
#[derive(Clone)]
pub struct SpannerStore {
    inner: Arc<Client>,
    table: String,
}

impl SpannerStore {
    /// Connect to the configured database
    ///
    /// The gcloud-spanner library picks up SPANNER_EMULATOR_HOST on its own
    /// and connects to the emulator when it is set. With auto-provisioning
    /// enabled the table is created first if it does not exist.
    pub async fn from_config(config: &SpannerConfig, table: &str) -> Result<Self> {
        let database_path = config.database_path();

        if config.auto_provision {
            ensure_table_exists(&database_path, table).await?;
        }

        match &config.emulator_host {
            Some(host) => tracing::info!("Connecting to Spanner emulator at: {}", host),
            None => tracing::info!("Connecting to production Spanner"),
        }

        let client = Client::new(&database_path, ClientConfig::default())
            .await
            .context("Failed to create Spanner client")?;

        tracing::info!(
            "Successfully connected to Spanner database: {} (table: {})",
            database_path,
            table
        );

        Ok(Self {
            inner: Arc::new(client),
            table: table.to_string(),
        })
    }
}

#[async_trait]
impl KvStore for SpannerStore {
    async fn get(&self, key: &str) -> Result<GetItemOutput, StoreError> {
        // Table names are restricted to identifier characters at config time
        let sql = format!("SELECT data FROM `{}` WHERE id = @id", self.table);
        let mut statement = Statement::new(&sql);
        statement.add_param("id", &key.to_string());

        let mut tx = self.inner
            .single()
            .await
            .map_err(|e| spanner_error("Failed to create read transaction", e))?;

        let mut result_set = tx
            .query(statement)
            .await
            .map_err(|status| status_error("Failed to query item", &status))?;

        let row = result_set
            .next()
            .await
            .map_err(|status| status_error("Failed to read item row", &status))?;

        let Some(row) = row else {
            tracing::debug!("Item not found with id: {}", key);
            return Ok(GetItemOutput::default());
        };

        let data: String = row
            .column_by_name("data")
            .map_err(|e| client_error("Failed to read data column", e))?;
        let item: Record = serde_json::from_str(&data)
            .map_err(|e| client_error("Stored item is not a JSON object", e))?;

        tracing::debug!("Read item with id: {}", key);
        Ok(GetItemOutput { item: Some(item) })
    }

    async fn put(&self, key: &str, record: Record) -> Result<PutItemOutput, StoreError> {
        let id = key.to_string();
        let data = serde_json::to_string(&record)
            .map_err(|e| client_error("Failed to serialize item", e))?;

        let mutation = insert_or_update(&self.table, &["id", "data"], &[&id, &data]);

        self.inner
            .apply(vec![mutation])
            .await
            .map_err(|e| spanner_error("Failed to put item", e))?;

        tracing::debug!("Put item with id: {}", key);
        Ok(PutItemOutput::default())
    }

    async fn delete(&self, key: &str) -> Result<DeleteItemOutput, StoreError> {
        let id = key.to_string();
        let mutation = delete(&self.table, Key::new(&id));

        // Spanner treats deleting an absent row as a no-op
        self.inner
            .apply(vec![mutation])
            .await
            .map_err(|e| spanner_error("Failed to delete item", e))?;

        tracing::debug!("Deleted item with id: {}", key);
        Ok(DeleteItemOutput::default())
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        let statement = Statement::new("SELECT 1");

        let mut tx = self.inner
            .single()
            .await
            .map_err(|e| spanner_error("Failed to create health check transaction", e))?;

        let mut result_set = tx
            .query(statement)
            .await
            .map_err(|status| status_error("Failed to execute health check query", &status))?;

        match result_set.next().await {
            Ok(Some(_)) => {
                tracing::debug!("Health check query succeeded");
                Ok(())
            }
            Ok(None) => Err(StoreError::new(
                CLIENT_ERROR_CODE,
                "Health check query returned no results",
            )),
            Err(status) => Err(status_error("Failed to read health check result", &status)),
        }
    }
}

fn status_error(context: &str, status: &Status) -> StoreError {
    StoreError::new(
        format!("{:?}", status.code()),
        format!("{}: {}", context, status.message()),
    )
}

/// Keep the gRPC code when the client error carries one
fn spanner_error(context: &str, err: SpannerError) -> StoreError {
    match err {
        SpannerError::GRPC(status) => status_error(context, &status),
        other => client_error(context, other),
    }
}

fn client_error(context: &str, err: impl Display) -> StoreError {
    StoreError::new(CLIENT_ERROR_CODE, format!("{}: {}", context, err))
}

fn create_table_ddl(table: &str) -> String {
    format!(
        r#"
CREATE TABLE `{}` (
    id STRING(MAX) NOT NULL,
    data JSON NOT NULL,
) PRIMARY KEY (id)
"#,
        table
    )
    .trim()
    .to_string()
}

fn ddl_declares_table(statements: &[String], table: &str) -> bool {
    let plain = format!("CREATE TABLE {} ", table);
    let quoted = format!("CREATE TABLE `{}`", table);
    statements
        .iter()
        .any(|stmt| stmt.contains(&plain) || stmt.contains(&quoted))
}

/// Create the item table if the database does not declare it yet
async fn ensure_table_exists(database_path: &str, table: &str) -> Result<()> {
    let admin_client = AdminClient::new(AdminClientConfig::default())
        .await
        .context("Failed to create Spanner admin client")?;

    let get_ddl_request = GetDatabaseDdlRequest {
        database: database_path.to_string(),
    };

    let ddl_response = admin_client
        .database()
        .get_database_ddl(get_ddl_request, None)
        .await
        .context("Failed to get database DDL")?;

    if ddl_declares_table(&ddl_response.into_inner().statements, table) {
        tracing::info!("Table '{}' already exists", table);
        return Ok(());
    }

    tracing::info!("Table '{}' not found, creating...", table);

    let update_request = UpdateDatabaseDdlRequest {
        database: database_path.to_string(),
        statements: vec![create_table_ddl(table)],
        operation_id: String::new(),
        proto_descriptors: vec![],
        throughput_mode: false,
    };

    let mut operation = admin_client
        .database()
        .update_database_ddl(update_request, None)
        .await
        .context("Failed to start table creation")?;

    operation
        .wait(None)
        .await
        .context("Failed to create table")?;

    tracing::info!("Table '{}' created successfully", table);
    Ok(())
}
