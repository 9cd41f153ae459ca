//! Skin Intake Common Library
//!
//! 画面側（CLI・対話ウィザード）から共有される型とウィザード状態機械。
//! IOは持たない（写真の取得・HTTP送信は呼び出し側）

pub mod error;
pub mod payload;
pub mod summary;
pub mod types;
pub mod wizard;

pub use error::{Error, Result, ValidationError};
pub use payload::{
    ANALYZE_PATH, DEFAULT_FILE_NAME, IMAGE_FIELD, IMAGE_MIME, UploadRequest, decode_data_url,
    encode_data_url, local_path, upload_file_name,
};
pub use summary::SummaryReport;
pub use types::{AnalysisReport, Gender, ImageReference, ImageSelection, IntakeForm, SkinType, SourceKind};
pub use wizard::{
    CameraMode, IntakeWizard, Phase, Platform, RECOMMENDATION_NOTICE, WizardAction, WizardState,
    validate_submission,
};
