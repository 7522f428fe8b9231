//! Notion HTTP client
//!
//! Implements [`RemoteStore`] over the public REST API. Only the handful of
//! endpoints the publisher needs are covered. HTTP 429 becomes
//! [`ApiError::RateLimited`]; any other non-success status becomes
//! [`ApiError::RemoteApiError`] carrying the API's error message.

use super::{ChildrenPage, RemoteBlock, RemoteBlockKind, RemoteStore};
use crate::error::ApiError;
use crate::markdown::block::TableRow;
use crate::markdown::{Block, HeadingLevel, RichText};
use crate::types::PageId;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Response, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

pub const DEFAULT_API_BASE_URL: &str = "https://api.notion.com";
pub const DEFAULT_API_VERSION: &str = "2022-06-28";

/// REST client for the Notion API.
#[derive(Debug, Clone)]
pub struct NotionClient {
    http: reqwest::Client,
    base_url: String,
}

impl NotionClient {
    pub fn new(token: &str, base_url: &str, api_version: &str) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|_| ApiError::ConfigError("Token is not a valid header value".to_string()))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);
        headers.insert(
            "Notion-Version",
            HeaderValue::from_str(api_version).map_err(|_| {
                ApiError::ConfigError(format!("Invalid API version {:?}", api_version))
            })?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/v1/{}", self.base_url, path)
    }
}

#[async_trait]
impl RemoteStore for NotionClient {
    async fn create_page(&self, parent_id: &str, title: &str) -> Result<PageId, ApiError> {
        let body = json!({
            "parent": { "page_id": parent_id },
            "properties": title_property(title),
        });
        let response = self.http.post(self.url("pages")).json(&body).send().await?;
        let created: CreatedPage = check(response).await?.json().await?;
        debug!(page_id = %created.id, parent_id, "Created page");
        Ok(created.id)
    }

    async fn update_page_title(&self, page_id: &str, title: &str) -> Result<(), ApiError> {
        let body = json!({ "properties": title_property(title) });
        let response = self
            .http
            .patch(self.url(&format!("pages/{}", page_id)))
            .json(&body)
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }

    async fn list_children(
        &self,
        block_id: &str,
        cursor: Option<&str>,
        page_size: usize,
    ) -> Result<ChildrenPage, ApiError> {
        let mut query = vec![("page_size", page_size.to_string())];
        if let Some(cursor) = cursor {
            query.push(("start_cursor", cursor.to_string()));
        }
        let response = self
            .http
            .get(self.url(&format!("blocks/{}/children", block_id)))
            .query(&query)
            .send()
            .await?;
        let listing: ListResponse = check(response).await?.json().await?;
        Ok(listing.into_children_page())
    }

    async fn append_blocks(
        &self,
        block_id: &str,
        blocks: &[Block],
    ) -> Result<Vec<PageId>, ApiError> {
        let children: Vec<Value> = blocks.iter().map(block_to_json).collect();
        let response = self
            .http
            .patch(self.url(&format!("blocks/{}/children", block_id)))
            .json(&json!({ "children": children }))
            .send()
            .await?;
        let appended: AppendResponse = check(response).await?.json().await?;
        Ok(appended.results.into_iter().map(|block| block.id).collect())
    }

    async fn delete_block(&self, block_id: &str) -> Result<(), ApiError> {
        let response = self
            .http
            .delete(self.url(&format!("blocks/{}", block_id)))
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }
}

/// Map a response status onto the error model.
async fn check(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&body)
        .map(|e| e.message)
        .unwrap_or(body);
    Err(status_error(status, message))
}

fn status_error(status: StatusCode, message: String) -> ApiError {
    if status == StatusCode::TOO_MANY_REQUESTS {
        ApiError::RateLimited(message)
    } else {
        ApiError::RemoteApiError {
            status: status.as_u16(),
            message,
        }
    }
}

fn title_property(title: &str) -> Value {
    json!({
        "title": {
            "title": [{ "type": "text", "text": { "content": title } }]
        }
    })
}

/// API type name of a block.
pub fn block_type(block: &Block) -> &'static str {
    match block {
        Block::Heading {
            level: HeadingLevel::H1,
            ..
        } => "heading_1",
        Block::Heading {
            level: HeadingLevel::H2,
            ..
        } => "heading_2",
        Block::Heading {
            level: HeadingLevel::H3,
            ..
        } => "heading_3",
        Block::Paragraph { .. } => "paragraph",
        Block::BulletedItem { .. } => "bulleted_list_item",
        Block::NumberedItem { .. } => "numbered_list_item",
        Block::Code { .. } => "code",
        Block::Quote { .. } => "quote",
        Block::Divider => "divider",
        Block::Table { .. } => "table",
        Block::TableRow { .. } => "table_row",
    }
}

fn rich_text_json(spans: &[RichText]) -> Value {
    spans
        .iter()
        .map(|span| {
            json!({
                "type": "text",
                "text": {
                    "content": span.text,
                    "link": span.link.as_ref().map(|url| json!({ "url": url })),
                },
                "annotations": {
                    "bold": span.emphasis.bold,
                    "italic": span.emphasis.italic,
                    "strikethrough": span.emphasis.strikethrough,
                    "underline": false,
                    "code": span.emphasis.code,
                    "color": "default",
                },
            })
        })
        .collect()
}

fn table_row_json(row: &TableRow) -> Value {
    let cells: Vec<Value> = row.iter().map(|cell| rich_text_json(cell)).collect();
    json!({ "cells": cells })
}

/// Request body of a block.
pub fn block_to_json(block: &Block) -> Value {
    let kind = block_type(block);
    let payload = match block {
        Block::Code {
            language,
            rich_text,
        } => json!({ "rich_text": rich_text_json(rich_text), "language": language }),
        Block::Divider => json!({}),
        Block::Table {
            width,
            has_header,
            rows,
        } => {
            let children: Vec<Value> = rows
                .iter()
                .map(|row| {
                    json!({
                        "object": "block",
                        "type": "table_row",
                        "table_row": table_row_json(row),
                    })
                })
                .collect();
            json!({
                "table_width": width,
                "has_column_header": has_header,
                "has_row_header": false,
                "children": children,
            })
        }
        Block::TableRow { cells } => table_row_json(cells),
        other => json!({ "rich_text": rich_text_json(other.rich_text()) }),
    };

    let mut object = serde_json::Map::new();
    object.insert("object".to_string(), json!("block"));
    object.insert("type".to_string(), json!(kind));
    object.insert(kind.to_string(), payload);
    Value::Object(object)
}

#[derive(Debug, Deserialize)]
struct CreatedPage {
    id: String,
}

#[derive(Debug, Deserialize)]
struct AppendResponse {
    results: Vec<CreatedPage>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

#[derive(Debug, Deserialize)]
struct ListResponse {
    results: Vec<RawBlock>,
    #[serde(default)]
    has_more: bool,
    next_cursor: Option<String>,
}

impl ListResponse {
    fn into_children_page(self) -> ChildrenPage {
        ChildrenPage {
            items: self.results.into_iter().map(RawBlock::into_remote).collect(),
            next_cursor: self.next_cursor.filter(|_| self.has_more),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawBlock {
    id: String,
    #[serde(rename = "type")]
    kind: String,
    child_page: Option<RawChildPage>,
    paragraph: Option<RawParagraph>,
}

#[derive(Debug, Deserialize)]
struct RawChildPage {
    title: String,
}

#[derive(Debug, Deserialize)]
struct RawParagraph {
    #[serde(default)]
    rich_text: Vec<RawRichText>,
}

#[derive(Debug, Deserialize)]
struct RawRichText {
    #[serde(default)]
    plain_text: String,
}

impl RawBlock {
    fn into_remote(self) -> RemoteBlock {
        let kind = match (self.kind.as_str(), self.child_page, self.paragraph) {
            ("child_page", Some(page), _) => RemoteBlockKind::ChildPage { title: page.title },
            ("paragraph", _, Some(paragraph)) => RemoteBlockKind::Paragraph {
                text: paragraph
                    .rich_text
                    .into_iter()
                    .map(|span| span.plain_text)
                    .collect(),
            },
            _ => RemoteBlockKind::Other { kind: self.kind },
        };
        RemoteBlock { id: self.id, kind }
    }
}
