use async_trait::async_trait;
use aws_config::timeout::TimeoutConfig;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_dynamodb::error::DisplayErrorContext;
use aws_sdk_dynamodb::types::{AttributeValue, ReturnValue};
use aws_sdk_dynamodb::Client;
use serde_dynamo::{from_item, to_attribute_value, to_item};
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

use super::table::{record_key, Attributes, PutMode, StorageError, Table};

type Item = HashMap<String, AttributeValue>;

fn backend_error<E>(operation: &'static str, err: E) -> StorageError
where
    E: std::error::Error,
{
    StorageError::Backend {
        operation,
        message: DisplayErrorContext(err).to_string(),
    }
}

/// A `SET` update with its placeholder maps
#[derive(Debug, PartialEq)]
pub(crate) struct UpdateExpression {
    pub expression: String,
    pub names: HashMap<String, String>,
    pub values: HashMap<String, AttributeValue>,
}

/// Build `SET #f0 = :v0, ...` for every change except the key field.
///
/// Field names always go through placeholders so reserved words such as
/// `name` and `count` stay legal. `#key` names the key for the
/// `attribute_exists` condition.
pub(crate) fn update_expression(
    key_name: &str,
    key: &str,
    changes: Attributes,
) -> Result<UpdateExpression, StorageError> {
    let mut assignments = Vec::with_capacity(changes.len());
    let mut names = HashMap::from([("#key".to_string(), key_name.to_string())]);
    let mut values = HashMap::new();

    for (field, value) in changes {
        if field == key_name {
            continue;
        }
        let index = assignments.len();
        assignments.push(format!("#f{index} = :v{index}"));
        names.insert(format!("#f{index}"), field);
        values.insert(format!(":v{index}"), to_attribute_value(value)?);
    }

    if assignments.is_empty() {
        return Err(StorageError::EmptyUpdate(key.to_string()));
    }

    Ok(UpdateExpression {
        expression: format!("SET {}", assignments.join(", ")),
        names,
        values,
    })
}

/// DynamoDB-backed table with a single string partition key
#[derive(Debug, Clone)]
pub struct DynamoTable {
    client: Client,
    table_name: String,
    key_name: String,
}

impl DynamoTable {
    pub fn new(client: Client, table_name: impl Into<String>, key_name: impl Into<String>) -> Self {
        Self {
            client,
            table_name: table_name.into(),
            key_name: key_name.into(),
        }
    }

    /// Build a client for `region`, optionally against a local endpoint
    /// such as LocalStack or DynamoDB Local.
    pub async fn connect(
        region: &str,
        endpoint_url: Option<&str>,
        table_name: impl Into<String>,
        key_name: impl Into<String>,
    ) -> Self {
        let timeout_config = TimeoutConfig::builder()
            .connect_timeout(Duration::from_secs(3))
            .operation_timeout(Duration::from_secs(30))
            .build();

        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(region.to_string()))
            .timeout_config(timeout_config);

        if let Some(url) = endpoint_url {
            loader = loader.endpoint_url(url);
        }

        let sdk_config = loader.load().await;
        Self::new(Client::new(&sdk_config), table_name, key_name)
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    fn key_value(key: &str) -> AttributeValue {
        AttributeValue::S(key.to_string())
    }
}

#[async_trait]
impl Table for DynamoTable {
    fn key_name(&self) -> &str {
        &self.key_name
    }

    async fn scan(&self) -> Result<Vec<Attributes>, StorageError> {
        debug!(table = %self.table_name, "Scan");

        let mut records = Vec::new();
        let mut exclusive_start_key: Option<Item> = None;

        loop {
            let output = self
                .client
                .scan()
                .table_name(&self.table_name)
                .set_exclusive_start_key(exclusive_start_key.take())
                .send()
                .await
                .map_err(|e| backend_error("Scan", e))?;

            for item in output.items.unwrap_or_default() {
                records.push(from_item(item)?);
            }

            match output.last_evaluated_key {
                Some(key) if !key.is_empty() => exclusive_start_key = Some(key),
                _ => break,
            }
        }

        Ok(records)
    }

    async fn get(&self, key: &str) -> Result<Option<Attributes>, StorageError> {
        debug!(table = %self.table_name, key, "GetItem");

        let output = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .key(&self.key_name, Self::key_value(key))
            .send()
            .await
            .map_err(|e| backend_error("GetItem", e))?;

        match output.item {
            Some(item) => Ok(Some(from_item(item)?)),
            None => Ok(None),
        }
    }

    async fn put(&self, record: Attributes, mode: PutMode) -> Result<(), StorageError> {
        let key = record_key(&record, &self.key_name)?;
        debug!(table = %self.table_name, key = %key, ?mode, "PutItem");

        let item: Item = to_item(&record)?;
        let mut builder = self
            .client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(item));

        if mode == PutMode::CreateOnly {
            builder = builder
                .condition_expression("attribute_not_exists(#key)")
                .expression_attribute_names("#key", &self.key_name);
        }

        match builder.send().await {
            Ok(_) => Ok(()),
            Err(e)
                if e.as_service_error()
                    .map(|se| se.is_conditional_check_failed_exception())
                    .unwrap_or(false) =>
            {
                Err(StorageError::AlreadyExists(key))
            }
            Err(e) => Err(backend_error("PutItem", e)),
        }
    }

    async fn update(&self, key: &str, changes: Attributes) -> Result<Attributes, StorageError> {
        debug!(table = %self.table_name, key, fields = changes.len(), "UpdateItem");

        let update = update_expression(&self.key_name, key, changes)?;

        let result = self
            .client
            .update_item()
            .table_name(&self.table_name)
            .key(&self.key_name, Self::key_value(key))
            .condition_expression("attribute_exists(#key)")
            .update_expression(update.expression)
            .set_expression_attribute_names(Some(update.names))
            .set_expression_attribute_values(Some(update.values))
            .return_values(ReturnValue::AllNew)
            .send()
            .await;

        match result {
            Ok(output) => Ok(from_item(output.attributes.unwrap_or_default())?),
            Err(e)
                if e.as_service_error()
                    .map(|se| se.is_conditional_check_failed_exception())
                    .unwrap_or(false) =>
            {
                Err(StorageError::NotFound(key.to_string()))
            }
            Err(e) => Err(backend_error("UpdateItem", e)),
        }
    }

    async fn delete(&self, key: &str) -> Result<Option<Attributes>, StorageError> {
        debug!(table = %self.table_name, key, "DeleteItem");

        let output = self
            .client
            .delete_item()
            .table_name(&self.table_name)
            .key(&self.key_name, Self::key_value(key))
            .return_values(ReturnValue::AllOld)
            .send()
            .await
            .map_err(|e| backend_error("DeleteItem", e))?;

        match output.attributes {
            Some(item) if !item.is_empty() => Ok(Some(from_item(item)?)),
            _ => Ok(None),
        }
    }

    async fn health_check(&self) -> Result<(), StorageError> {
        self.client
            .describe_table()
            .table_name(&self.table_name)
            .send()
            .await
            .map_err(|e| backend_error("DescribeTable", e))?;
        Ok(())
    }
}
