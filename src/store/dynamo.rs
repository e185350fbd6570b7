// src/store/dynamo.rs
//! DynamoDB-backed news store.

use std::time::Duration;

use aws_sdk_dynamodb::config::timeout::TimeoutConfig;
use aws_sdk_dynamodb::error::{DisplayErrorContext, SdkError};
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client;
use tracing::debug;

use super::{key_item, NewsStore, QueryPage, RangeQuery, ScanOrder, StoreError};

const KEY_CONDITION: &str = "category = :category";
const CATEGORY_PLACEHOLDER: &str = ":category";

/// Connection settings for the news table.
#[derive(Debug, Clone)]
pub struct DynamoSettings {
    pub table_name: String,
    /// Overrides the region resolved from the environment/profile.
    pub region: Option<String>,
    /// Endpoint override, e.g. DynamoDB Local.
    pub endpoint: Option<String>,
    /// Upper bound for one Query call, retries included.
    pub timeout_ms: Option<u64>,
}

#[derive(Clone)]
pub struct DynamoNewsStore {
    client: Client,
    table_name: String,
}

impl std::fmt::Debug for DynamoNewsStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DynamoNewsStore")
            .field("table_name", &self.table_name)
            .finish()
    }
}

impl DynamoNewsStore {
    /// Build a client on top of the shared SDK config. Fails when no region
    /// can be resolved, since every request would fail later anyway.
    pub fn new(
        sdk_config: &aws_config::SdkConfig,
        settings: DynamoSettings,
    ) -> anyhow::Result<Self> {
        let mut builder = aws_sdk_dynamodb::config::Builder::from(sdk_config);

        if let Some(region) = settings.region {
            builder = builder.region(aws_sdk_dynamodb::config::Region::new(region));
        }
        if let Some(endpoint) = settings.endpoint {
            builder = builder.endpoint_url(endpoint);
        }
        if let Some(timeout_ms) = settings.timeout_ms {
            let timeouts = TimeoutConfig::builder()
                .operation_timeout(Duration::from_millis(timeout_ms))
                .build();
            builder = builder.timeout_config(timeouts);
        }

        let conf = builder.build();
        if conf.region().is_none() {
            anyhow::bail!(
                "no AWS region configured for table `{}` (set AWS_REGION or NEWS_STORE_REGION)",
                settings.table_name
            );
        }

        Ok(Self::from_client(Client::from_conf(conf), settings.table_name))
    }

    pub fn from_client(client: Client, table_name: String) -> Self {
        Self { client, table_name }
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }
}

#[async_trait::async_trait]
impl NewsStore for DynamoNewsStore {
    async fn query(&self, query: &RangeQuery) -> Result<QueryPage, StoreError> {
        let limit = i32::try_from(query.limit).unwrap_or(i32::MAX);

        debug!(
            table = %self.table_name,
            partition = %query.partition,
            limit,
            resumed = query.exclusive_start_key.is_some(),
            "dynamodb query"
        );

        let output = self
            .client
            .query()
            .table_name(&self.table_name)
            .key_condition_expression(KEY_CONDITION)
            .expression_attribute_values(
                CATEGORY_PLACEHOLDER,
                AttributeValue::S(query.partition.clone()),
            )
            .limit(limit)
            .scan_index_forward(query.order == ScanOrder::Ascending)
            .set_exclusive_start_key(query.exclusive_start_key.as_ref().map(key_item))
            .send()
            .await
            .map_err(|err| match &err {
                SdkError::ServiceError(_) => {
                    StoreError::Rejected(DisplayErrorContext(&err).to_string())
                }
                _ => StoreError::Unavailable(DisplayErrorContext(&err).to_string()),
            })?;

        Ok(QueryPage {
            items: output.items().to_vec(),
            last_evaluated_key: output.last_evaluated_key().cloned(),
        })
    }

    fn name(&self) -> &'static str {
        "dynamodb"
    }
}
