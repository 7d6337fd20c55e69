// src/api.rs
//
// Client for the comment service. Failures never reach the caller: they are
// logged and turned into "no comments" / "not saved".

use crate::comment::{parse_comment_list, CommentRecord, RecordDefaults};
use crate::error::OverlayError;
use crate::utils::resource_url;
use gloo_net::http::Request;
use serde_json::Value;

pub async fn fetch_comments(comments_url: &str, image_id: &str, defaults: &RecordDefaults) -> Vec<CommentRecord> {
    match try_fetch_comments(comments_url, image_id, defaults).await {
        Ok(comments) => {
            log::info!("Loaded {} comment(s) for {}", comments.len(), image_id);
            comments
        }
        Err(e) => {
            log::error!("GET comments for {} failed: {}", image_id, e);
            Vec::new()
        }
    }
}

pub async fn save_comment(comments_url: &str, record: &CommentRecord, defaults: &RecordDefaults) -> Option<CommentRecord> {
    match try_save_comment(comments_url, record, defaults).await {
        Ok(saved) => Some(saved),
        Err(e) => {
            log::error!("POST comment for {} failed: {}", record.image_id, e);
            None
        }
    }
}

async fn try_fetch_comments(
    comments_url: &str,
    image_id: &str,
    defaults: &RecordDefaults,
) -> Result<Vec<CommentRecord>, OverlayError> {
    let url = resource_url(comments_url);
    let resp = Request::get(&url)
        .query([("imageId", image_id)])
        .send()
        .await?;
    if !resp.ok() {
        return Err(OverlayError::Status {
            url,
            status: resp.status(),
        });
    }
    let data: Value = resp.json().await?;
    Ok(parse_comment_list(&data, defaults))
}

async fn try_save_comment(
    comments_url: &str,
    record: &CommentRecord,
    defaults: &RecordDefaults,
) -> Result<CommentRecord, OverlayError> {
    let url = resource_url(comments_url);
    let body = record.clone().clamped();
    log::debug!("Saving comment: {:?}", body);

    let resp = Request::post(&url).json(&body)?.send().await?;
    if !resp.ok() {
        return Err(OverlayError::Status {
            url,
            status: resp.status(),
        });
    }
    let data: Value = resp.json().await?;
    Ok(CommentRecord::from_value(&data, defaults)?)
}
