//! 3ステップの受付ウィザード
//!
//! 写真選択（ステップ1、モーダル）→ 入力フォーム（ステップ2）→ 結果表示（ステップ3）。
//! IOは持たない。写真の取得とアップロードは呼び出し側が行い、
//! 結果だけをこの状態機械に渡す。
//!
//! 遷移:
//! - Intro --start--> ModalUpload（選択済みなら ModalPreview）
//! - ModalUpload --select_image--> ModalPreview
//! - ModalUpload --open_camera--> ModalCamera（Web）/ そのまま（ネイティブ撮影へ）
//! - ModalCamera --capture_frame--> ModalPreview, --cancel_camera--> ModalUpload
//! - ModalPreview --clear_image--> ModalUpload, --next--> Form
//! - モーダル各状態 / Form --back--> Intro
//! - Form --begin_submit/complete_submit--> Summary

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{Error, Result, ValidationError};
use crate::payload::UploadRequest;
use crate::types::{AnalysisReport, Gender, ImageSelection, IntakeForm, SkinType, SourceKind};

/// 「Recommendation」ボタンの応答（機能は未提供）
pub const RECOMMENDATION_NOTICE: &str = "Recommendation clicked";

/// 実行プラットフォーム
///
/// カメラの扱いだけが異なる（Webはページ内撮影、ネイティブはOSのカメラ）
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    #[default]
    Native,
    Web,
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "native" | "mobile" => Ok(Platform::Native),
            "web" | "browser" => Ok(Platform::Web),
            _ => Err(format!("Unknown platform: {}. Use native or web", s)),
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Platform::Native => write!(f, "native"),
            Platform::Web => write!(f, "web"),
        }
    }
}

/// ウィザードの状態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Phase {
    /// ステップ1の案内画面
    Intro,
    /// 写真選択モーダル（アップロード / カメラ）
    ModalUpload,
    /// 写真選択モーダル（プレビュー）
    ModalPreview,
    /// 写真選択モーダル（ページ内カメラ）
    ModalCamera,
    /// ステップ2の入力フォーム
    Form,
    /// ステップ3の結果表示
    Summary,
}

impl Phase {
    pub fn step(&self) -> u8 {
        match self {
            Phase::Intro | Phase::ModalUpload | Phase::ModalPreview | Phase::ModalCamera => 1,
            Phase::Form => 2,
            Phase::Summary => 3,
        }
    }

    pub fn is_modal(&self) -> bool {
        matches!(self, Phase::ModalUpload | Phase::ModalPreview | Phase::ModalCamera)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Intro => "intro",
            Phase::ModalUpload => "upload modal",
            Phase::ModalPreview => "preview modal",
            Phase::ModalCamera => "camera modal",
            Phase::Form => "form",
            Phase::Summary => "summary",
        };
        f.write_str(name)
    }
}

/// ユーザー操作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardAction {
    Start,
    SelectImage,
    OpenCamera,
    CaptureFrame,
    CancelCamera,
    ClearImage,
    Back,
    Next,
    EditForm,
    Submit,
    Recommend,
}

impl WizardAction {
    /// 操作できる状態
    pub fn allowed_phases(&self) -> &'static [Phase] {
        match self {
            WizardAction::Start => &[Phase::Intro],
            WizardAction::SelectImage | WizardAction::OpenCamera => &[Phase::ModalUpload],
            WizardAction::CaptureFrame | WizardAction::CancelCamera => &[Phase::ModalCamera],
            WizardAction::ClearImage => &[Phase::ModalPreview],
            WizardAction::Back => &[
                Phase::ModalUpload,
                Phase::ModalPreview,
                Phase::ModalCamera,
                Phase::Form,
            ],
            WizardAction::Next => &[Phase::ModalUpload, Phase::ModalPreview],
            WizardAction::EditForm | WizardAction::Submit => &[Phase::Form],
            WizardAction::Recommend => &[Phase::Summary],
        }
    }
}

impl fmt::Display for WizardAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WizardAction::Start => "start",
            WizardAction::SelectImage => "select image",
            WizardAction::OpenCamera => "open camera",
            WizardAction::CaptureFrame => "capture",
            WizardAction::CancelCamera => "cancel camera",
            WizardAction::ClearImage => "clear image",
            WizardAction::Back => "back",
            WizardAction::Next => "next",
            WizardAction::EditForm => "edit form",
            WizardAction::Submit => "submit",
            WizardAction::Recommend => "recommendation",
        };
        f.write_str(name)
    }
}

/// 表示側が参照する状態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WizardState {
    pub step: u8,
    pub modal_open: bool,
}

/// `open_camera` の結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraMode {
    /// ページ内カメラを表示した（ModalCamera）。`capture_frame` を待つ
    Inline,
    /// 状態は変えない。呼び出し側がOSのカメラで撮影し `select_image` する
    Native,
}

/// 送信前チェック
///
/// 名前 → 年齢 → 性別 → 肌タイプ → 写真の順で、最初の不足を返す
pub fn validate_submission(
    form: &IntakeForm,
    selection: Option<&ImageSelection>,
) -> std::result::Result<(), ValidationError> {
    if form.name.trim().is_empty() {
        return Err(ValidationError::MissingName);
    }
    if form.age.trim().is_empty() {
        return Err(ValidationError::MissingAge);
    }
    if form.gender.is_none() {
        return Err(ValidationError::MissingGender);
    }
    if form.skin_type.is_none() {
        return Err(ValidationError::MissingSkinType);
    }
    if selection.is_none() {
        return Err(ValidationError::MissingImage);
    }
    Ok(())
}

/// ウィザード本体
///
/// 状態はすべてこの構造体が持ち、生成から破棄まで永続化しない
#[derive(Debug, Clone)]
pub struct IntakeWizard {
    phase: Phase,
    platform: Platform,
    form: IntakeForm,
    selection: Option<ImageSelection>,
    result: Option<AnalysisReport>,
    loading: bool,
}

impl IntakeWizard {
    pub fn new(platform: Platform) -> Self {
        Self {
            phase: Phase::Intro,
            platform,
            form: IntakeForm::default(),
            selection: None,
            result: None,
            loading: false,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn step(&self) -> u8 {
        self.phase.step()
    }

    pub fn modal_open(&self) -> bool {
        self.phase.is_modal()
    }

    pub fn state(&self) -> WizardState {
        WizardState {
            step: self.step(),
            modal_open: self.modal_open(),
        }
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    pub fn form(&self) -> &IntakeForm {
        &self.form
    }

    pub fn selection(&self) -> Option<&ImageSelection> {
        self.selection.as_ref()
    }

    pub fn result(&self) -> Option<&AnalysisReport> {
        self.result.as_ref()
    }

    /// アップロード中か（この間は送信ボタン無効）
    pub fn loading(&self) -> bool {
        self.loading
    }

    /// 写真選択モーダルを開く
    pub fn start(&mut self) -> Result<()> {
        self.check(WizardAction::Start)?;
        let next = if self.selection.is_some() {
            Phase::ModalPreview
        } else {
            Phase::ModalUpload
        };
        self.transition(next);
        Ok(())
    }

    /// ギャラリーまたはネイティブカメラで取得した写真を設定
    ///
    /// 以前の選択は破棄される
    pub fn select_image(&mut self, selection: ImageSelection) -> Result<()> {
        self.check(WizardAction::SelectImage)?;
        self.replace_selection(selection);
        self.transition(Phase::ModalPreview);
        Ok(())
    }

    /// カメラボタン
    pub fn open_camera(&mut self) -> Result<CameraMode> {
        self.check(WizardAction::OpenCamera)?;
        match self.platform {
            Platform::Web => {
                self.transition(Phase::ModalCamera);
                Ok(CameraMode::Inline)
            }
            Platform::Native => Ok(CameraMode::Native),
        }
    }

    /// ページ内カメラで撮影したフレームを設定
    pub fn capture_frame(&mut self, selection: ImageSelection) -> Result<()> {
        self.check(WizardAction::CaptureFrame)?;
        if selection.source != SourceKind::InlineCapture {
            warn!("capture_frame called with a {} selection", selection.source);
        }
        self.replace_selection(selection);
        self.transition(Phase::ModalPreview);
        Ok(())
    }

    pub fn cancel_camera(&mut self) -> Result<()> {
        self.check(WizardAction::CancelCamera)?;
        self.transition(Phase::ModalUpload);
        Ok(())
    }

    /// プレビューの × ボタン
    pub fn clear_image(&mut self) -> Result<()> {
        self.check(WizardAction::ClearImage)?;
        if let Some(previous) = self.selection.take() {
            debug!("selection cleared: {}", previous.describe());
        }
        self.transition(Phase::ModalUpload);
        Ok(())
    }

    /// 戻る
    ///
    /// モーダルは閉じるだけ（選択は残る）。フォームからはステップ1へ
    pub fn back(&mut self) -> Result<()> {
        self.check(WizardAction::Back)?;
        self.transition(Phase::Intro);
        Ok(())
    }

    /// モーダルの「次へ」
    pub fn next(&mut self) -> Result<()> {
        self.check(WizardAction::Next)?;
        if self.selection.is_none() {
            return Err(ValidationError::NoPhotoSelected.into());
        }
        self.transition(Phase::Form);
        Ok(())
    }

    pub fn set_name(&mut self, name: impl Into<String>) -> Result<()> {
        self.check(WizardAction::EditForm)?;
        self.form.name = name.into();
        Ok(())
    }

    pub fn set_age(&mut self, age: impl Into<String>) -> Result<()> {
        self.check(WizardAction::EditForm)?;
        self.form.age = age.into();
        Ok(())
    }

    pub fn set_gender(&mut self, gender: Gender) -> Result<()> {
        self.check(WizardAction::EditForm)?;
        self.form.gender = Some(gender);
        Ok(())
    }

    pub fn set_skin_type(&mut self, skin_type: SkinType) -> Result<()> {
        self.check(WizardAction::EditForm)?;
        self.form.skin_type = Some(skin_type);
        Ok(())
    }

    /// 送信開始
    ///
    /// - アップロード中なら何もせず `Ok(None)`
    /// - 入力不足なら最初の不足項目のエラー（状態は変えない）
    /// - それ以外は loading を立て、送信内容を返す
    pub fn begin_submit(&mut self) -> Result<Option<UploadRequest>> {
        if self.loading {
            debug!("submit ignored: upload already in flight");
            return Ok(None);
        }
        self.check(WizardAction::Submit)?;
        validate_submission(&self.form, self.selection.as_ref())?;

        let selection = match &self.selection {
            Some(selection) => selection.clone(),
            None => return Err(ValidationError::MissingImage.into()),
        };

        self.loading = true;
        self.result = None;
        info!("submitting intake for analysis ({})", selection.describe());

        Ok(Some(UploadRequest {
            form: self.form.clone(),
            selection,
        }))
    }

    /// 送信成功: 結果を保持してステップ3へ
    pub fn complete_submit(&mut self, report: AnalysisReport) -> Result<()> {
        if !self.loading {
            return Err(Error::InvalidTransition {
                phase: self.phase,
                action: WizardAction::Submit,
            });
        }
        self.loading = false;
        self.result = Some(report);
        self.transition(Phase::Summary);
        Ok(())
    }

    /// 送信失敗: loading を下ろしてフォームに留まる（入力は保持）
    pub fn fail_submit(&mut self) {
        if self.loading {
            warn!("analysis upload failed, staying on step {}", self.step());
        }
        self.loading = false;
    }

    /// 「Recommendation」ボタン（何もしない）
    pub fn recommend(&self) -> Result<&'static str> {
        self.check(WizardAction::Recommend)?;
        Ok(RECOMMENDATION_NOTICE)
    }

    /// 現在の状態で操作できるか（アップロード中は常に不可）
    pub fn check(&self, action: WizardAction) -> Result<()> {
        if self.loading {
            return Err(Error::Busy);
        }
        if action.allowed_phases().contains(&self.phase) {
            Ok(())
        } else {
            Err(Error::InvalidTransition {
                phase: self.phase,
                action,
            })
        }
    }

    fn replace_selection(&mut self, selection: ImageSelection) {
        debug!("selection set: {}", selection.describe());
        if let Some(previous) = self.selection.replace(selection) {
            debug!("previous selection discarded: {}", previous.describe());
        }
    }

    fn transition(&mut self, next: Phase) {
        debug!("wizard: {} -> {}", self.phase, next);
        self.phase = next;
    }
}

impl Default for IntakeWizard {
    fn default() -> Self {
        Self::new(Platform::default())
    }
}
