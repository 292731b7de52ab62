use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use wingrox_types::{
    CounterField, NewPost, NewProduct, NewSegment, Post, Product, Resource, Segment,
};

use crate::catalogue::{plan, Action, OperationSpec};
use crate::error::ClientError;
use crate::fallback::{CallArgs, EndpointStats, FallbackClient, FallbackResponse};
use crate::retry::{with_retry, RetryPolicy};
use crate::types::ClientConfig;

/// Typed SDK over the operation catalogue. Every call goes through the
/// fallback client and the retry layer.
pub struct WingroxClient {
    config: ClientConfig,
    fallback: FallbackClient,
    retry: RetryPolicy,
}

impl WingroxClient {
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        config.validate()?;
        let fallback = FallbackClient::new(Duration::from_millis(config.timeout_ms))?;
        let retry = RetryPolicy::from(&config.retry);
        Ok(Self { config, fallback, retry })
    }

    pub fn from_env() -> Result<Self, ClientError> {
        Self::new(ClientConfig::from_env()?)
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn stats(&self) -> &EndpointStats {
        self.fallback.stats()
    }

    /// Plan and run one catalogue operation.
    pub async fn call(&self, spec: OperationSpec, args: CallArgs) -> Result<FallbackResponse, ClientError> {
        let operation = plan(spec, &self.config)?;
        let response = with_retry(&self.retry, operation.idempotency(), || {
            self.fallback.execute(&operation, &args)
        })
        .await?;
        Ok(response)
    }

    async fn call_typed<T: DeserializeOwned>(
        &self,
        spec: OperationSpec,
        args: CallArgs,
    ) -> Result<T, ClientError> {
        let response = self.call(spec, args).await?;
        serde_json::from_value(response.data)
            .map_err(|e| ClientError::Decode { operation: spec.name(), message: e.to_string() })
    }

    fn encode<B: Serialize>(spec: OperationSpec, body: &B) -> Result<Value, ClientError> {
        serde_json::to_value(body)
            .map_err(|e| ClientError::Encode { operation: spec.name(), message: e.to_string() })
    }

    /// List records, with any list query parameters (`segmentId`, `sort`, `limit`, ...).
    pub async fn list<R: Resource>(&self, query: &[(&str, &str)]) -> Result<Vec<R>, ClientError> {
        let args = query.iter().fold(CallArgs::new(), |args, (k, v)| args.with_query(*k, *v));
        self.call_typed(OperationSpec::new(R::KIND, Action::List), args).await
    }

    pub async fn get<R: Resource>(&self, id: &str) -> Result<R, ClientError> {
        let args = CallArgs::new().with_param("id", id);
        self.call_typed(OperationSpec::new(R::KIND, Action::Get), args).await
    }

    pub async fn create<R: Resource, B: Serialize>(&self, body: &B) -> Result<R, ClientError> {
        let spec = OperationSpec::new(R::KIND, Action::Create);
        let args = CallArgs::new().with_body(Self::encode(spec, body)?);
        self.call_typed(spec, args).await
    }

    pub async fn update<R: Resource, B: Serialize>(&self, id: &str, changes: &B) -> Result<R, ClientError> {
        let spec = OperationSpec::new(R::KIND, Action::Update);
        let args = CallArgs::new().with_param("id", id).with_body(Self::encode(spec, changes)?);
        self.call_typed(spec, args).await
    }

    pub async fn increment<R: Resource>(&self, id: &str, field: CounterField) -> Result<R, ClientError> {
        let args = CallArgs::new().with_param("id", id);
        self.call_typed(OperationSpec::new(R::KIND, Action::Increment(field)), args).await
    }

    /// Soft delete; returns the now inactive record.
    pub async fn delete<R: Resource>(&self, id: &str) -> Result<R, ClientError> {
        let args = CallArgs::new().with_param("id", id);
        self.call_typed(OperationSpec::new(R::KIND, Action::Delete), args).await
    }

    pub async fn posts_in_segment(&self, segment_id: &str) -> Result<Vec<Post>, ClientError> {
        self.list(&[("segmentId", segment_id)]).await
    }

    pub async fn create_post(&self, post: &NewPost) -> Result<Post, ClientError> {
        self.create(post).await
    }

    pub async fn like_post(&self, id: &str) -> Result<Post, ClientError> {
        self.increment(id, CounterField::Likes).await
    }

    pub async fn bookmark_post(&self, id: &str) -> Result<Post, ClientError> {
        self.increment(id, CounterField::Bookmarks).await
    }

    pub async fn create_segment(&self, segment: &NewSegment) -> Result<Segment, ClientError> {
        self.create(segment).await
    }

    pub async fn create_product(&self, product: &NewProduct) -> Result<Product, ClientError> {
        self.create(product).await
    }
}
