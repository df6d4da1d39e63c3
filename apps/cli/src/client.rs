use anyhow::{bail, Context, Result};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::json;
use shared::dto::{
    CatalogStats, CreateProductRequest, MessageResponse, ProductResponse, SearchHit,
};
use std::path::Path;

/// Thin typed wrapper over the inventory HTTP API.
pub struct ApiClient {
    http: Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: &str, token: Option<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authed(&self, req: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    async fn parse<T: DeserializeOwned>(res: Response) -> Result<T> {
        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            let message = serde_json::from_str::<serde_json::Value>(&body)
                .ok()
                .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(str::to_string))
                .unwrap_or(body);
            bail!("API returned {}: {}", status, message);
        }
        res.json().await.context("Unexpected response from the API")
    }

    async fn send<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T> {
        let res = req
            .send()
            .await
            .with_context(|| format!("Failed to reach {}", self.base_url))?;
        Self::parse(res).await
    }

    pub async fn list_products(
        &self,
        skip: usize,
        limit: usize,
        category: Option<&str>,
    ) -> Result<Vec<ProductResponse>> {
        let mut query = vec![("skip", skip.to_string()), ("limit", limit.to_string())];
        if let Some(c) = category {
            query.push(("category", c.to_string()));
        }
        self.send(self.http.get(self.url("/products")).query(&query))
            .await
    }

    pub async fn get_product(&self, id: i32) -> Result<ProductResponse> {
        self.send(self.http.get(self.url(&format!("/products/{}", id))))
            .await
    }

    pub async fn create_text_only(&self, req: &CreateProductRequest) -> Result<ProductResponse> {
        self.send(self.authed(self.http.post(self.url("/products/text-only")).json(req)))
            .await
    }

    pub async fn create_with_image(
        &self,
        req: &CreateProductRequest,
        image: &Path,
    ) -> Result<ProductResponse> {
        let mut form = Form::new()
            .text("name", req.name.clone())
            .text("description", req.description.clone());
        if let Some(c) = &req.category {
            form = form.text("category", c.clone());
        }
        if let Some(p) = req.price {
            form = form.text("price", p.to_string());
        }
        form = form.part("image", image_part(image).await?);

        self.send(self.authed(self.http.post(self.url("/products/multipart")).multipart(form)))
            .await
    }

    pub async fn delete_product(&self, id: i32) -> Result<MessageResponse> {
        self.send(self.authed(self.http.delete(self.url(&format!("/products/{}", id)))))
            .await
    }

    pub async fn search_text(&self, query: &str, top_k: usize) -> Result<Vec<SearchHit>> {
        let body = json!({ "query": query, "top_k": top_k });
        self.send(self.authed(self.http.post(self.url("/search/text")).json(&body)))
            .await
    }

    pub async fn search_similar(
        &self,
        product_id: i32,
        top_k: usize,
        use_multimodal: bool,
    ) -> Result<Vec<SearchHit>> {
        let body = json!({
            "product_id": product_id,
            "top_k": top_k,
            "use_multimodal": use_multimodal,
        });
        self.send(self.authed(self.http.post(self.url("/search/similar")).json(&body)))
            .await
    }

    pub async fn search_image(&self, image: &Path, top_k: usize) -> Result<Vec<SearchHit>> {
        let form = Form::new()
            .text("top_k", top_k.to_string())
            .part("image", image_part(image).await?);
        self.send(self.authed(self.http.post(self.url("/search/image")).multipart(form)))
            .await
    }

    pub async fn search_multimodal(
        &self,
        image: &Path,
        query: &str,
        top_k: usize,
    ) -> Result<Vec<SearchHit>> {
        let form = Form::new()
            .text("query", query.to_string())
            .text("top_k", top_k.to_string())
            .part("image", image_part(image).await?);
        self.send(self.authed(self.http.post(self.url("/search/multimodal")).multipart(form)))
            .await
    }

    pub async fn stats(&self) -> Result<CatalogStats> {
        self.send(self.authed(self.http.get(self.url("/stats"))))
            .await
    }
}

async fn image_part(path: &Path) -> Result<Part> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());
    Ok(Part::bytes(bytes).file_name(file_name))
}
