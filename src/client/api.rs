//! Shared request surface of the public and authenticated clients.

use crate::types::{FormPart, RequestConfig, Response};
use crate::Result;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// One logical HTTP call plus the usual verb shorthands.
#[async_trait]
pub trait ApiClient: Send + Sync {
    /// Perform the call and return the response or a normalized error.
    async fn request(&self, config: RequestConfig) -> Result<Response>;

    async fn get(&self, url: &str) -> Result<Response> {
        self.request(RequestConfig::get(url)).await
    }

    /// GET and decode the JSON body.
    async fn get_json<T>(&self, url: &str) -> Result<T>
    where
        T: DeserializeOwned + Send,
    {
        self.get(url).await?.json()
    }

    async fn post_json<B>(&self, url: &str, body: &B) -> Result<Response>
    where
        B: Serialize + Sync + ?Sized,
    {
        self.request(RequestConfig::post(url).json(body)).await
    }

    async fn put_json<B>(&self, url: &str, body: &B) -> Result<Response>
    where
        B: Serialize + Sync + ?Sized,
    {
        self.request(RequestConfig::put(url).json(body)).await
    }

    async fn patch_json<B>(&self, url: &str, body: &B) -> Result<Response>
    where
        B: Serialize + Sync + ?Sized,
    {
        self.request(RequestConfig::patch(url).json(body)).await
    }

    /// Multipart POST, e.g. product images from the admin dashboard.
    async fn post_form(&self, url: &str, parts: Vec<FormPart>) -> Result<Response> {
        self.request(RequestConfig::post(url).form(parts)).await
    }

    async fn put_form(&self, url: &str, parts: Vec<FormPart>) -> Result<Response> {
        self.request(RequestConfig::put(url).form(parts)).await
    }

    async fn delete(&self, url: &str) -> Result<Response> {
        self.request(RequestConfig::delete(url)).await
    }
}
