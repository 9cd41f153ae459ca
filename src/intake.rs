//! 非対話の一括解析（`skin-intake analyze`）
//!
//! 対話ウィザードと同じ遷移を順番にたどる:
//! start → 写真取得 → next → 入力 → submit

use std::path::PathBuf;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use skin_intake_common::{Gender, SkinType, SummaryReport};

use crate::error::{IntakeError, Result};
use crate::session::{AcquireOutcome, IntakeSession};
use crate::source::{CANCELLED_NOTICE, GallerySource, InlineCaptureSource, NativeCameraSource};

/// 写真の指定方法
#[derive(Debug, Clone)]
pub enum PhotoInput {
    Gallery(PathBuf),
    InlineFrame(PathBuf),
    Camera,
    None,
}

#[derive(Debug, Clone)]
pub struct AnalyzeInput {
    pub photo: PhotoInput,
    pub name: String,
    pub age: String,
    pub gender: Option<Gender>,
    pub skin_type: Option<SkinType>,
}

/// 解析中のスピナー
pub fn analyzing_spinner() -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message("Analyzing skin...");
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

/// ステップ1: 写真を取得してフォームへ進む
pub async fn acquire_photo(
    session: &mut IntakeSession,
    photo: &PhotoInput,
    camera_template: Option<Vec<String>>,
) -> Result<()> {
    session.wizard_mut().start()?;

    let outcome = match photo {
        PhotoInput::Gallery(path) => {
            let source = GallerySource::fixed(path.display().to_string());
            session.acquire(&source).await?
        }
        PhotoInput::InlineFrame(path) => {
            let native = NativeCameraSource::new(camera_template);
            match session.open_camera(&native).await? {
                AcquireOutcome::CameraOpened => {
                    session.acquire(&InlineCaptureSource::from_file(path)).await?
                }
                other => other,
            }
        }
        PhotoInput::Camera => {
            let native = NativeCameraSource::new(camera_template.clone());
            match session.open_camera(&native).await? {
                AcquireOutcome::CameraOpened => {
                    session
                        .acquire(&InlineCaptureSource::from_command(camera_template))
                        .await?
                }
                other => other,
            }
        }
        PhotoInput::None => AcquireOutcome::Cancelled,
    };

    if outcome == AcquireOutcome::Cancelled && !matches!(photo, PhotoInput::None) {
        eprintln!("{}", CANCELLED_NOTICE);
    }

    // 写真が無ければここで「Please upload or take a photo first.」
    session.wizard_mut().next()?;
    Ok(())
}

/// 一括解析を実行してレポートを返す
pub async fn run_analyze(
    session: &mut IntakeSession,
    input: AnalyzeInput,
    camera_template: Option<Vec<String>>,
) -> Result<SummaryReport> {
    acquire_photo(session, &input.photo, camera_template).await?;

    let wizard = session.wizard_mut();
    wizard.set_name(input.name)?;
    wizard.set_age(input.age)?;
    if let Some(gender) = input.gender {
        wizard.set_gender(gender)?;
    }
    if let Some(skin_type) = input.skin_type {
        wizard.set_skin_type(skin_type)?;
    }

    let spinner = analyzing_spinner();
    let result = session.submit().await;
    spinner.finish_and_clear();
    result?;

    session
        .summary()
        .ok_or_else(|| IntakeError::Incomplete(session.wizard().phase().to_string()))
}
