//! エラー型定義

use thiserror::Error;

use crate::wizard::{Phase, WizardAction};

/// 入力チェックエラー（ローカルで回復、通知のみ）
///
/// Display はそのままユーザー向け通知文になる
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please upload or take a photo first.")]
    NoPhotoSelected,

    #[error("Please enter your name.")]
    MissingName,

    #[error("Please enter your age.")]
    MissingAge,

    #[error("Please select your gender.")]
    MissingGender,

    #[error("Please select your skin type.")]
    MissingSkinType,

    #[error("Please select or capture an image.")]
    MissingImage,
}

/// 共通エラー型
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Action `{action}` is not available in phase `{phase}`")]
    InvalidTransition { phase: Phase, action: WizardAction },

    #[error("An analysis request is already in progress")]
    Busy,

    #[error("Invalid data URL: {0}")]
    DataUrl(String),

    #[error("Unknown value: {0}")]
    UnknownValue(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// 入力チェックエラーかどうか
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation(_))
    }
}

/// Result型エイリアス
pub type Result<T> = std::result::Result<T, Error>;
