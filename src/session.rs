//! ウィザードと外部機能（権限・写真取得・解析バックエンド）をつなぐ
//!
//! 状態遷移は `IntakeWizard` が決め、ここは取得・送信の結果を渡すだけ

use std::sync::Arc;

use skin_intake_common::{
    CameraMode, IntakeWizard, Platform, SourceKind, SummaryReport, WizardAction,
};
use tracing::{info, warn};

use crate::error::{IntakeError, Result};
use crate::source::{ImageSource, PermissionProvider, discard_capture};
use crate::uploader::AnalysisBackend;

/// 写真取得の結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcquireOutcome {
    /// 選択され、プレビューに進んだ
    Selected,
    /// キャンセル（状態は変わらない）
    Cancelled,
    /// ページ内カメラを開いた（撮影待ち）
    CameraOpened,
}

/// 送信の結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// ステップ3へ進んだ
    Completed,
    /// アップロード中のため無視された
    Ignored,
}

pub struct IntakeSession {
    wizard: IntakeWizard,
    backend: Arc<dyn AnalysisBackend>,
    permissions: Arc<dyn PermissionProvider>,
}

impl IntakeSession {
    pub fn new(
        platform: Platform,
        backend: Arc<dyn AnalysisBackend>,
        permissions: Arc<dyn PermissionProvider>,
    ) -> Self {
        Self {
            wizard: IntakeWizard::new(platform),
            backend,
            permissions,
        }
    }

    pub fn wizard(&self) -> &IntakeWizard {
        &self.wizard
    }

    /// 画面操作（start / back / next / フォーム入力など）はウィザードを直接使う
    pub fn wizard_mut(&mut self) -> &mut IntakeWizard {
        &mut self.wizard
    }

    /// 写真を取得してウィザードに渡す
    ///
    /// 状態チェック → 権限確認 → 取得の順。拒否・キャンセル時は状態を変えない
    pub async fn acquire(&mut self, source: &dyn ImageSource) -> Result<AcquireOutcome> {
        let action = match source.kind() {
            SourceKind::InlineCapture => WizardAction::CaptureFrame,
            SourceKind::Gallery | SourceKind::NativeCamera => WizardAction::SelectImage,
        };
        self.wizard.check(action)?;

        let capability = source.capability();
        if !self.permissions.request(capability).await {
            warn!("{} permission denied", capability);
            return Err(IntakeError::PermissionDenied(capability));
        }

        let Some(selection) = source.acquire().await? else {
            info!("{} acquisition cancelled", source.kind());
            return Ok(AcquireOutcome::Cancelled);
        };

        let previous = self.wizard.selection().cloned();
        match action {
            WizardAction::CaptureFrame => self.wizard.capture_frame(selection)?,
            _ => self.wizard.select_image(selection)?,
        }
        if let Some(previous) = previous {
            if self.wizard.selection() != Some(&previous) {
                discard_capture(&previous).await;
            }
        }
        Ok(AcquireOutcome::Selected)
    }

    /// プレビューの写真を破棄して選び直す（撮影ファイルは削除）
    pub async fn clear_image(&mut self) -> Result<()> {
        let previous = self.wizard.selection().cloned();
        self.wizard.clear_image()?;
        if let Some(previous) = previous {
            discard_capture(&previous).await;
        }
        Ok(())
    }

    /// カメラボタン
    ///
    /// Webはページ内カメラを開くだけ。ネイティブは `native` で即撮影する
    pub async fn open_camera(&mut self, native: &dyn ImageSource) -> Result<AcquireOutcome> {
        match self.wizard.open_camera()? {
            CameraMode::Inline => Ok(AcquireOutcome::CameraOpened),
            CameraMode::Native => self.acquire(native).await,
        }
    }

    /// 送信（Analyze Skin ボタン）
    ///
    /// 失敗時はフォームに留まり、入力はそのまま。再送信はユーザー操作で行う
    pub async fn submit(&mut self) -> Result<SubmitOutcome> {
        let Some(request) = self.wizard.begin_submit()? else {
            return Ok(SubmitOutcome::Ignored);
        };

        match self.backend.analyze(&request).await {
            Ok(report) => {
                self.wizard.complete_submit(report)?;
                info!("analysis complete");
                Ok(SubmitOutcome::Completed)
            }
            Err(e) => {
                self.wizard.fail_submit();
                warn!("analysis failed: {}", e.detail());
                Err(e.into())
            }
        }
    }

    pub fn summary(&self) -> Option<SummaryReport> {
        SummaryReport::from_wizard(&self.wizard)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::StaticPermissions;
    use crate::uploader::UploadError;
    use async_trait::async_trait;
    use serde_json::json;
    use skin_intake_common::{
        AnalysisReport, Gender, ImageReference, ImageSelection, Phase, SkinType, UploadRequest,
    };
    use std::sync::Mutex;

    use crate::source::Capability;

    struct StubBackend {
        response: Mutex<Option<std::result::Result<AnalysisReport, UploadError>>>,
        calls: Mutex<Vec<UploadRequest>>,
    }

    impl StubBackend {
        fn ok(value: serde_json::Value) -> Arc<Self> {
            Arc::new(Self {
                response: Mutex::new(Some(Ok(AnalysisReport::from(value)))),
                calls: Mutex::new(Vec::new()),
            })
        }

        fn failing(error: UploadError) -> Arc<Self> {
            Arc::new(Self {
                response: Mutex::new(Some(Err(error))),
                calls: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl AnalysisBackend for StubBackend {
        async fn analyze(
            &self,
            request: &UploadRequest,
        ) -> std::result::Result<AnalysisReport, UploadError> {
            self.calls.lock().unwrap().push(request.clone());
            self.response
                .lock()
                .unwrap()
                .take()
                .unwrap_or_else(|| Err(UploadError::Unexpected("called twice".into())))
        }
    }

    struct StubSource {
        kind: SourceKind,
        reference: Option<String>,
    }

    #[async_trait]
    impl ImageSource for StubSource {
        fn kind(&self) -> SourceKind {
            self.kind
        }

        fn capability(&self) -> Capability {
            match self.kind {
                SourceKind::Gallery => Capability::MediaLibrary,
                _ => Capability::Camera,
            }
        }

        async fn acquire(&self) -> Result<Option<ImageSelection>> {
            Ok(self
                .reference
                .as_deref()
                .map(|r| ImageSelection::new(ImageReference::parse(r), self.kind)))
        }
    }

    /// 撮影済みファイルを返すネイティブカメラ
    struct CapturedFile(String);

    #[async_trait]
    impl ImageSource for CapturedFile {
        fn kind(&self) -> SourceKind {
            SourceKind::NativeCamera
        }

        fn capability(&self) -> Capability {
            Capability::Camera
        }

        async fn acquire(&self) -> Result<Option<ImageSelection>> {
            Ok(Some(ImageSelection::new(
                ImageReference::File(self.0.clone()),
                SourceKind::NativeCamera,
            )))
        }
    }

    fn gallery(reference: Option<&str>) -> StubSource {
        StubSource { kind: SourceKind::Gallery, reference: reference.map(str::to_string) }
    }

    fn session(platform: Platform, backend: Arc<StubBackend>) -> IntakeSession {
        IntakeSession::new(platform, backend, Arc::new(StaticPermissions::granted()))
    }

    async fn filled_form(session: &mut IntakeSession) {
        session.wizard_mut().start().unwrap();
        session.acquire(&gallery(Some("file:///tmp/face.jpg"))).await.unwrap();
        session.wizard_mut().next().unwrap();
        let wizard = session.wizard_mut();
        wizard.set_name("Jane").unwrap();
        wizard.set_age("30").unwrap();
        wizard.set_gender(Gender::Female).unwrap();
        wizard.set_skin_type(SkinType::Oily).unwrap();
    }

    #[tokio::test]
    async fn test_acquire_moves_to_preview() {
        let mut session = session(Platform::Native, StubBackend::ok(json!({})));
        session.wizard_mut().start().unwrap();

        let outcome = session.acquire(&gallery(Some("/photos/face.jpg"))).await.unwrap();
        assert_eq!(outcome, AcquireOutcome::Selected);
        assert_eq!(session.wizard().phase(), Phase::ModalPreview);
    }

    #[tokio::test]
    async fn test_cancelled_acquire_keeps_state() {
        let mut session = session(Platform::Native, StubBackend::ok(json!({})));
        session.wizard_mut().start().unwrap();

        let outcome = session.acquire(&gallery(None)).await.unwrap();
        assert_eq!(outcome, AcquireOutcome::Cancelled);
        assert_eq!(session.wizard().phase(), Phase::ModalUpload);
        assert!(session.wizard().selection().is_none());
    }

    #[tokio::test]
    async fn test_permission_denied_keeps_state() {
        let mut session = IntakeSession::new(
            Platform::Native,
            StubBackend::ok(json!({})),
            Arc::new(StaticPermissions::denied()),
        );
        session.wizard_mut().start().unwrap();

        let err = session.acquire(&gallery(Some("/photos/face.jpg"))).await.unwrap_err();
        assert!(err.is_notice());
        assert_eq!(err.to_string(), "Permission to access gallery is required!");
        assert_eq!(session.wizard().phase(), Phase::ModalUpload);
        assert!(session.wizard().selection().is_none());
    }

    #[tokio::test]
    async fn test_acquire_outside_upload_rejected() {
        let mut session = session(Platform::Native, StubBackend::ok(json!({})));
        let err = session.acquire(&gallery(Some("/photos/face.jpg"))).await.unwrap_err();
        assert!(!err.is_notice());
        assert_eq!(session.wizard().phase(), Phase::Intro);
    }

    #[tokio::test]
    async fn test_web_camera_opens_inline() {
        let mut session = session(Platform::Web, StubBackend::ok(json!({})));
        session.wizard_mut().start().unwrap();

        let native = StubSource { kind: SourceKind::NativeCamera, reference: Some("/tmp/x.jpg".into()) };
        let outcome = session.open_camera(&native).await.unwrap();
        assert_eq!(outcome, AcquireOutcome::CameraOpened);
        assert_eq!(session.wizard().phase(), Phase::ModalCamera);

        let frame = StubSource {
            kind: SourceKind::InlineCapture,
            reference: Some("data:image/jpeg;base64,/9j/AA==".into()),
        };
        session.acquire(&frame).await.unwrap();
        assert_eq!(session.wizard().phase(), Phase::ModalPreview);
        assert!(session.wizard().selection().unwrap().reference.is_inline());
    }

    #[tokio::test]
    async fn test_native_camera_captures_immediately() {
        let mut session = session(Platform::Native, StubBackend::ok(json!({})));
        session.wizard_mut().start().unwrap();

        let native = StubSource { kind: SourceKind::NativeCamera, reference: Some("/tmp/x.jpg".into()) };
        let outcome = session.open_camera(&native).await.unwrap();
        assert_eq!(outcome, AcquireOutcome::Selected);
        assert_eq!(session.wizard().phase(), Phase::ModalPreview);
    }

    #[tokio::test]
    async fn test_clear_image_removes_capture() {
        let dir = tempfile::tempdir().unwrap();
        let captured = dir.path().join("capture-1.jpg");
        std::fs::write(&captured, b"jpeg").unwrap();

        let mut session = session(Platform::Native, StubBackend::ok(json!({})));
        session.wizard_mut().start().unwrap();
        session
            .open_camera(&CapturedFile(captured.display().to_string()))
            .await
            .unwrap();
        assert_eq!(session.wizard().phase(), Phase::ModalPreview);

        session.clear_image().await.unwrap();
        assert_eq!(session.wizard().phase(), Phase::ModalUpload);
        assert!(session.wizard().selection().is_none());
        assert!(!captured.exists());
    }

    #[tokio::test]
    async fn test_clear_image_keeps_gallery_file() {
        let dir = tempfile::tempdir().unwrap();
        let picked = dir.path().join("face.jpg");
        std::fs::write(&picked, b"jpeg").unwrap();

        let mut session = session(Platform::Native, StubBackend::ok(json!({})));
        session.wizard_mut().start().unwrap();
        session.acquire(&gallery(Some(&picked.display().to_string()))).await.unwrap();

        session.clear_image().await.unwrap();
        assert!(picked.exists());
    }

    #[tokio::test]
    async fn test_submit_success() {
        let backend = StubBackend::ok(json!({"score": 82}));
        let mut session = session(Platform::Native, backend.clone());
        filled_form(&mut session).await;

        let outcome = session.submit().await.unwrap();
        assert_eq!(outcome, SubmitOutcome::Completed);
        assert_eq!(session.wizard().step(), 3);
        assert!(!session.wizard().loading());

        let calls = backend.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].form.name, "Jane");
        assert_eq!(calls[0].file_name(), "face.jpg");

        let summary = session.summary().unwrap();
        assert_eq!(summary.name, "Jane");
        assert_eq!(summary.skin_type, "oily");
    }

    #[tokio::test]
    async fn test_submit_failure_stays_on_form() {
        let backend = StubBackend::failing(UploadError::Server {
            status: 500,
            body: "{\"error\":\"model unavailable\"}".into(),
        });
        let mut session = session(Platform::Native, backend);
        filled_form(&mut session).await;

        let err = session.submit().await.unwrap_err();
        assert!(err.is_notice());
        assert!(err.to_string().contains("500"));
        assert_eq!(session.wizard().step(), 2);
        assert!(!session.wizard().loading());
        assert_eq!(session.wizard().form().name, "Jane");
        assert!(session.summary().is_none());
    }

    #[tokio::test]
    async fn test_submit_validation_does_not_call_backend() {
        let backend = StubBackend::ok(json!({}));
        let mut session = session(Platform::Native, backend.clone());
        session.wizard_mut().start().unwrap();
        session.acquire(&gallery(Some("/photos/face.jpg"))).await.unwrap();
        session.wizard_mut().next().unwrap();

        let err = session.submit().await.unwrap_err();
        assert_eq!(err.to_string(), "Please enter your name.");
        assert!(backend.calls.lock().unwrap().is_empty());
    }
}
