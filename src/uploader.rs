//! 解析バックエンドへのアップロード
//!
//! `POST <backend_url>/analyze-face` にマルチパートで送信する:
//! - `center`: 画像（image/jpeg）
//! - `name`, `age`, `gender`, `skinType`: 記録用テキスト
//!
//! 2xxのJSONはそのまま `AnalysisReport` になる。再試行はしない

use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use skin_intake_common::{
    ANALYZE_PATH, AnalysisReport, IMAGE_FIELD, IMAGE_MIME, ImageReference, UploadRequest,
    decode_data_url, local_path,
};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::Result;

const FAILURE_HEADLINE: &str = "Analysis failed. Please try again.";

/// アップロード失敗
///
/// Display は通知文（1行目は共通の見出し）
#[derive(Error, Debug)]
pub enum UploadError {
    /// 2xx以外の応答
    #[error("{h}\nServer error: {status} - {body}", h = FAILURE_HEADLINE)]
    Server { status: u16, body: String },

    /// 応答なし（接続失敗・タイムアウト）
    #[error("{h}\nNo response from backend. Check backend URL, port, or CORS.", h = FAILURE_HEADLINE)]
    NoResponse(String),

    /// 2xxだがJSONとして読めない
    #[error("{h}\nError: malformed response: {0}", h = FAILURE_HEADLINE)]
    MalformedResponse(String),

    /// リクエスト組み立て・応答処理中のその他のエラー
    #[error("{h}\nError: {0}", h = FAILURE_HEADLINE)]
    Unexpected(String),
}

impl UploadError {
    fn from_send(error: reqwest::Error) -> Self {
        if error.is_builder() {
            UploadError::Unexpected(error.to_string())
        } else {
            UploadError::NoResponse(error.to_string())
        }
    }

    /// 応答ヘッダ受信後の本文読み込み失敗（タイムアウトは応答なし扱い）
    fn from_body(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            UploadError::NoResponse(error.to_string())
        } else {
            UploadError::Unexpected(format!("failed to read response body: {}", error))
        }
    }

    /// 診断用の詳細（通知文には出さないもの）
    pub fn detail(&self) -> &str {
        match self {
            UploadError::Server { body, .. } => body,
            UploadError::NoResponse(detail)
            | UploadError::MalformedResponse(detail)
            | UploadError::Unexpected(detail) => detail,
        }
    }
}

/// 解析バックエンド
#[async_trait]
pub trait AnalysisBackend: Send + Sync {
    async fn analyze(&self, request: &UploadRequest) -> std::result::Result<AnalysisReport, UploadError>;
}

/// reqwestによる本番実装
pub struct HttpBackend {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpBackend {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint_url(base_url),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(
            &config.backend_url(),
            Duration::from_secs(config.timeout_seconds.max(1)),
        )
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl AnalysisBackend for HttpBackend {
    async fn analyze(&self, request: &UploadRequest) -> std::result::Result<AnalysisReport, UploadError> {
        let form = build_form(request).await?;

        info!("POST {}", self.endpoint);
        let response = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                warn!("analysis request failed: {}", e);
                UploadError::from_send(e)
            })?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(UploadError::from_body)?;
        debug!("backend responded {} ({} bytes)", status, body.len());

        if !status.is_success() {
            return Err(UploadError::Server {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&body).into_owned(),
            });
        }

        AnalysisReport::from_slice(&body).map_err(|e| UploadError::MalformedResponse(e.to_string()))
    }
}

/// `<base>/analyze-face`
pub fn endpoint_url(base_url: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), ANALYZE_PATH)
}

/// 画像のバイト列を取得
///
/// Data URLは展開、ファイル参照は読み込み
pub async fn read_image_bytes(reference: &ImageReference) -> std::result::Result<Vec<u8>, UploadError> {
    match reference {
        ImageReference::DataUrl(data_url) => decode_data_url(data_url)
            .map(|decoded| decoded.bytes)
            .map_err(|e| UploadError::Unexpected(e.to_string())),
        ImageReference::File(reference) => {
            let path = local_path(reference);
            tokio::fs::read(path)
                .await
                .map_err(|e| UploadError::Unexpected(format!("failed to read {}: {}", path, e)))
        }
    }
}

/// マルチパートフォームを組み立てる
pub async fn build_form(request: &UploadRequest) -> std::result::Result<Form, UploadError> {
    let bytes = read_image_bytes(&request.selection.reference).await?;
    let file_name = request.file_name();
    debug!("image part: {} ({} bytes)", file_name, bytes.len());

    let image = Part::bytes(bytes)
        .file_name(file_name)
        .mime_str(IMAGE_MIME)
        .map_err(|e| UploadError::Unexpected(e.to_string()))?;

    let form = request
        .text_fields()
        .into_iter()
        .fold(Form::new().part(IMAGE_FIELD, image), |form, (name, value)| {
            form.text(name, value)
        });

    Ok(form)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_url() {
        assert_eq!(endpoint_url("http://13.203.35.161"), "http://13.203.35.161/analyze-face");
        assert_eq!(endpoint_url("http://localhost:8000/"), "http://localhost:8000/analyze-face");
    }

    #[test]
    fn test_server_error_notice() {
        let err = UploadError::Server {
            status: 500,
            body: r#"{"error":"model unavailable"}"#.into(),
        };
        let notice = err.to_string();
        assert!(notice.starts_with("Analysis failed. Please try again.\n"));
        assert!(notice.contains("Server error: 500 - {\"error\":\"model unavailable\"}"));
    }

    #[test]
    fn test_no_response_notice() {
        let err = UploadError::NoResponse("connection refused".into());
        assert!(err.to_string().contains("No response from backend"));
        assert!(!err.to_string().contains("connection refused"));
        assert_eq!(err.detail(), "connection refused");
    }

    #[test]
    fn test_unexpected_notice() {
        let err = UploadError::Unexpected("failed to read /tmp/x.jpg".into());
        assert_eq!(
            err.to_string(),
            "Analysis failed. Please try again.\nError: failed to read /tmp/x.jpg"
        );
    }

    #[test]
    fn test_malformed_response_notice() {
        let err = UploadError::MalformedResponse("expected value at line 1".into());
        assert_eq!(
            err.to_string(),
            "Analysis failed. Please try again.\nError: malformed response: expected value at line 1"
        );
    }
}
