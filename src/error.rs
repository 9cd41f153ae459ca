use thiserror::Error;

use crate::source::Capability;

#[derive(Error, Debug)]
pub enum IntakeError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("{}", .0.denied_notice())]
    PermissionDenied(Capability),

    #[error("画像が見つかりません: {0}")]
    ImageNotFound(String),

    #[error("対応していない画像形式です: {0}（.jpg / .png のみ）")]
    UnsupportedImage(String),

    #[error("撮影できません: {0}")]
    Capture(String),

    #[error("ウィザードが完了していません（現在: {0}）")]
    Incomplete(String),

    #[error("入力エラー: {0}")]
    Prompt(String),

    #[error(transparent)]
    Upload(#[from] crate::uploader::UploadError),

    #[error("HTTPクライアントエラー: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Common(#[from] skin_intake_common::Error),
}

impl IntakeError {
    /// ユーザーに通知するだけで続行できるエラーか
    pub fn is_notice(&self) -> bool {
        match self {
            IntakeError::PermissionDenied(_)
            | IntakeError::ImageNotFound(_)
            | IntakeError::UnsupportedImage(_)
            | IntakeError::Capture(_)
            | IntakeError::Upload(_) => true,
            IntakeError::Common(e) => e.is_validation(),
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, IntakeError>;
