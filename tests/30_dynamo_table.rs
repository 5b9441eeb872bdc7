/// DynamoDB table backend tests
///
/// Run against DynamoDB Local (or LocalStack) through DYNAMODB_ENDPOINT_URL,
/// e.g. `docker run -p 8000:8000 amazon/dynamodb-local` and
/// `DYNAMODB_ENDPOINT_URL=http://localhost:8000`. Skipped when unset.
/// Each test creates and drops its own table.
use std::sync::Arc;

use anyhow::Result;
use aws_sdk_dynamodb::config::{BehaviorVersion, Credentials, Region};
use aws_sdk_dynamodb::types::{
    AttributeDefinition, BillingMode, KeySchemaElement, KeyType, ScalarAttributeType,
};
use aws_sdk_dynamodb::Client;
use serde_json::{json, Value};

use items_api::database::models::{Item, ItemPatch, ITEM_KEY};
use items_api::database::{Attributes, DynamoTable, PutMode, Repository, StorageError, Table};

struct LocalTable {
    client: Client,
    name: String,
    table: Arc<DynamoTable>,
}

impl LocalTable {
    /// `None` when no local endpoint is configured
    async fn create() -> Result<Option<Self>> {
        let Ok(endpoint) = std::env::var("DYNAMODB_ENDPOINT_URL") else {
            eprintln!("DYNAMODB_ENDPOINT_URL not set; skipping DynamoDB test");
            return Ok(None);
        };

        let config = aws_sdk_dynamodb::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new("us-east-1"))
            .endpoint_url(endpoint)
            .credentials_provider(Credentials::new("local", "local", None, None, "tests"))
            .build();
        let client = Client::from_conf(config);

        let name = format!("items_test_{}", uuid::Uuid::new_v4().simple());
        client
            .create_table()
            .table_name(&name)
            .attribute_definitions(
                AttributeDefinition::builder()
                    .attribute_name(ITEM_KEY)
                    .attribute_type(ScalarAttributeType::S)
                    .build()?,
            )
            .key_schema(
                KeySchemaElement::builder()
                    .attribute_name(ITEM_KEY)
                    .key_type(KeyType::Hash)
                    .build()?,
            )
            .billing_mode(BillingMode::PayPerRequest)
            .send()
            .await?;

        let table = Arc::new(DynamoTable::new(client.clone(), &name, ITEM_KEY));
        Ok(Some(Self { client, name, table }))
    }

    fn repository(&self) -> Repository<Item> {
        Repository::new(self.table.clone())
    }

    async fn drop_table(self) -> Result<()> {
        self.client.delete_table().table_name(&self.name).send().await?;
        Ok(())
    }
}

fn record(value: Value) -> Attributes {
    value.as_object().cloned().expect("object")
}

fn item(id: &str, name: &str, count: i64) -> Item {
    Item {
        item_id: id.to_string(),
        name: name.to_string(),
        count,
    }
}

#[tokio::test]
async fn test_conditional_put_maps_to_already_exists() -> Result<()> {
    let Some(local) = LocalTable::create().await? else {
        return Ok(());
    };
    let repo = local.repository();

    repo.insert_new(&item("a1", "first", 1)).await?;
    let err = repo.insert_new(&item("a1", "second", 2)).await.unwrap_err();
    assert!(matches!(err, StorageError::AlreadyExists(ref k) if k == "a1"));
    assert_eq!(repo.get_by_key("a1").await?, Some(item("a1", "first", 1)));

    // Upsert overwrites
    repo.insert_or_replace(&item("a1", "second", 2)).await?;
    assert_eq!(repo.get_by_key("a1").await?, Some(item("a1", "second", 2)));

    local.drop_table().await
}

#[tokio::test]
async fn test_partial_update_sets_reserved_word_fields() -> Result<()> {
    let Some(local) = LocalTable::create().await? else {
        return Ok(());
    };
    let repo = local.repository();
    repo.insert_or_replace(&item("w1", "widget", 3)).await?;

    let merged = repo
        .partial_update(&ItemPatch {
            item_id: "w1".to_string(),
            name: Some("gadget".to_string()),
            count: Some(7),
        })
        .await?;
    assert_eq!(merged, item("w1", "gadget", 7));

    let merged = repo
        .partial_update(&ItemPatch {
            item_id: "w1".to_string(),
            name: None,
            count: Some(9),
        })
        .await?;
    assert_eq!(merged, item("w1", "gadget", 9));

    local.drop_table().await
}

#[tokio::test]
async fn test_update_of_missing_key_is_not_found() -> Result<()> {
    let Some(local) = LocalTable::create().await? else {
        return Ok(());
    };

    let err = local
        .table
        .update("ghost", record(json!({"count": 1})))
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::NotFound(ref k) if k == "ghost"));

    // The conditional update must not have created a partial record
    assert_eq!(local.table.get("ghost").await?, None);

    local.drop_table().await
}

#[tokio::test]
async fn test_delete_returns_prior_value() -> Result<()> {
    let Some(local) = LocalTable::create().await? else {
        return Ok(());
    };
    let repo = local.repository();
    repo.insert_or_replace(&item("d1", "gone", 2)).await?;

    assert_eq!(repo.delete("d1").await?, Some(item("d1", "gone", 2)));
    assert_eq!(repo.delete("d1").await?, None);
    assert_eq!(repo.get_by_key("d1").await?, None);

    local.drop_table().await
}

#[tokio::test]
async fn test_scan_follows_last_evaluated_key() -> Result<()> {
    let Some(local) = LocalTable::create().await? else {
        return Ok(());
    };

    // 12 x ~100KB exceeds the 1MB scan page
    let filler = "x".repeat(100_000);
    for i in 0..12 {
        let attributes = record(json!({"itemId": format!("big-{i:02}"), "name": filler, "count": i}));
        local.table.put(attributes, PutMode::Upsert).await?;
    }

    let mut ids: Vec<String> = local
        .repository()
        .list()
        .await?
        .into_iter()
        .map(|item| item.item_id)
        .collect();
    ids.sort();

    let expected: Vec<String> = (0..12).map(|i| format!("big-{i:02}")).collect();
    assert_eq!(ids, expected);

    local.drop_table().await
}

#[tokio::test]
async fn test_health_check_reports_missing_table() -> Result<()> {
    let Some(local) = LocalTable::create().await? else {
        return Ok(());
    };

    local.table.health_check().await?;

    let missing = DynamoTable::new(local.client.clone(), "items_test_missing", ITEM_KEY);
    let err = missing.health_check().await.unwrap_err();
    assert!(matches!(err, StorageError::Backend { operation: "DescribeTable", .. }));

    local.drop_table().await
}
