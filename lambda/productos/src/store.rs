use async_trait::async_trait;
use aws_sdk_dynamodb::types::{AttributeValue, ReturnValue};
use aws_sdk_dynamodb::Client;

use crate::error::StoreError;
use crate::model::{Item, Patch, ID_FIELD};

/// Shared by concurrent invocations.
#[async_trait]
pub(crate) trait ProductStore: Send + Sync {
    /// Full replace.
    async fn put(&self, item: Item) -> Result<(), StoreError>;

    async fn scan(&self) -> Result<Vec<Item>, StoreError>;

    async fn update_attributes(&self, patch: &Patch) -> Result<(), StoreError>;

    /// Returns the prior item.
    async fn delete(&self, id: &str) -> Result<Option<Item>, StoreError>;
}

pub(crate) struct DynamoStore {
    client: Client,
    table_name: String,
}

impl DynamoStore {
    pub(crate) fn new(client: Client, table_name: String) -> Self {
        DynamoStore { client, table_name }
    }
}

#[async_trait]
impl ProductStore for DynamoStore {
    async fn put(&self, item: Item) -> Result<(), StoreError> {
        self.client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(item))
            .send()
            .await
            .map_err(aws_sdk_dynamodb::Error::from)?;
        Ok(())
    }

    async fn scan(&self) -> Result<Vec<Item>, StoreError> {
        let items = self
            .client
            .scan()
            .table_name(&self.table_name)
            .into_paginator()
            .items()
            .send()
            .try_collect()
            .await
            .map_err(aws_sdk_dynamodb::Error::from)?;
        Ok(items)
    }

    async fn update_attributes(&self, patch: &Patch) -> Result<(), StoreError> {
        let mut request = self
            .client
            .update_item()
            .table_name(&self.table_name)
            .key(ID_FIELD, AttributeValue::S(patch.id.clone()))
            .update_expression(patch.expression());
        for clause in &patch.clauses {
            request = request
                .expression_attribute_names(&clause.name_placeholder, &clause.attribute)
                .expression_attribute_values(&clause.value_placeholder, clause.value.clone());
        }
        request.send().await.map_err(aws_sdk_dynamodb::Error::from)?;
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<Option<Item>, StoreError> {
        let output = self
            .client
            .delete_item()
            .table_name(&self.table_name)
            .key(ID_FIELD, AttributeValue::S(id.to_string()))
            .return_values(ReturnValue::AllOld)
            .send()
            .await
            .map_err(aws_sdk_dynamodb::Error::from)?;
        Ok(output.attributes.filter(|old| !old.is_empty()))
    }
}
