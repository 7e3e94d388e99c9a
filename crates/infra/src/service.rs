//! Service-scoped view of a shared [`RestClient`]
//!
//! Each cloud service addresses its resources under a fixed path prefix
//! that embeds the application id. A [`ServiceClient`] binds that prefix once
//! so callers pass only the resource suffix.

use std::sync::Arc;

use agora_rest_common::Context;
use agora_rest_domain::Result;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::http::{decode_response, BaseResponse, RestClient, ServiceResponse};

/// A [`RestClient`] bound to one service's path prefix.
#[derive(Debug, Clone)]
pub struct ServiceClient {
    client: Arc<RestClient>,
    prefix: String,
}

impl ServiceClient {
    /// Bind `client` to an arbitrary prefix (no trailing slash).
    pub fn new(client: Arc<RestClient>, prefix: impl Into<String>) -> Self {
        let mut prefix = prefix.into();
        while prefix.ends_with('/') {
            prefix.pop();
        }
        Self { client, prefix }
    }

    /// `/v1/apps/<app id>/cloud_recording`
    pub fn cloud_recording(client: Arc<RestClient>) -> Self {
        let prefix = format!("/v1/apps/{}/cloud_recording", client.app_id());
        Self::new(client, prefix)
    }

    /// `/v1/projects/<app id>/rtsc/cloud-transcoder`
    pub fn cloud_transcoder(client: Arc<RestClient>) -> Self {
        let prefix = format!("/v1/projects/{}/rtsc/cloud-transcoder", client.app_id());
        Self::new(client, prefix)
    }

    /// `/api/conversational-ai-agent/v2/projects/<app id>`
    pub fn conversational_ai(client: Arc<RestClient>) -> Self {
        let prefix = format!("/api/conversational-ai-agent/v2/projects/{}", client.app_id());
        Self::new(client, prefix)
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn client(&self) -> &Arc<RestClient> {
        &self.client
    }

    /// Prefix + `path`.
    pub fn path(&self, path: &str) -> String {
        format!("{}{path}", self.prefix)
    }

    /// Raw call under this service's prefix.
    pub async fn do_rest<B>(
        &self,
        ctx: &Context,
        path: &str,
        method: Method,
        body: &B,
    ) -> Result<BaseResponse>
    where
        B: Serialize + ?Sized,
    {
        self.client.do_rest(ctx, &self.path(path), method, body).await
    }

    /// Call and decode: success body as `Resp`, business errors in
    /// [`ServiceResponse::error`], anything else as a gateway error.
    pub async fn call<Req, Resp>(
        &self,
        ctx: &Context,
        path: &str,
        method: Method,
        body: &Req,
    ) -> Result<ServiceResponse<Resp>>
    where
        Req: Serialize + ?Sized,
        Resp: DeserializeOwned,
    {
        let response = self.do_rest(ctx, path, method, body).await?;
        decode_response(response)
    }
}
