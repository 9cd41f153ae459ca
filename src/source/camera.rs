//! カメラ撮影
//!
//! - NativeCameraSource: OSのカメラ（撮影コマンド）でファイルに保存し、そのパスを返す
//! - InlineCaptureSource: Webカメラのスクリーンショット相当。フレームをData URLで返す

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use skin_intake_common::{
    IMAGE_MIME, ImageReference, ImageSelection, SourceKind, encode_data_url, local_path,
};
use tokio::process::Command;
use tracing::{debug, info};

use super::gallery::validate_image_file;
use super::{Capability, ImageSource};
use crate::config::expand_camera_command;
use crate::error::{IntakeError, Result};

/// 撮影コマンドを実行して `output` に保存
///
/// コマンドが成功してもファイルが無ければキャンセル扱い（`Ok(false)`）
pub async fn capture_to_file(template: &[String], output: &Path) -> Result<bool> {
    let argv = expand_camera_command(template, output);
    let (program, args) = argv
        .split_first()
        .ok_or_else(|| IntakeError::Capture("撮影コマンドが空です".into()))?;

    debug!("camera command: {:?}", argv);
    let result = Command::new(program)
        .args(args)
        .output()
        .await
        .map_err(|e| IntakeError::Capture(format!("{} を実行できません: {}", program, e)))?;

    if !result.status.success() {
        let stderr = String::from_utf8_lossy(&result.stderr);
        return Err(IntakeError::Capture(format!(
            "{} failed (code {:?}): {}",
            program,
            result.status.code(),
            stderr.trim()
        )));
    }

    Ok(output.is_file())
}

fn capture_dir() -> Result<PathBuf> {
    let dir = std::env::temp_dir().join("skin-intake");
    std::fs::create_dir_all(&dir)
        .map_err(|e| IntakeError::Capture(format!("{} を作成できません: {}", dir.display(), e)))?;
    Ok(dir)
}

/// 撮影したフレームを読み込む
async fn read_frame(path: &Path) -> Result<Vec<u8>> {
    tokio::fs::read(path)
        .await
        .map_err(|e| IntakeError::Capture(format!("{} を読み込めません: {}", path.display(), e)))
}

/// ネイティブカメラの撮影ファイルを削除（選び直し・クリア時）
///
/// ギャラリーやData URLの選択は対象外
pub async fn discard_capture(selection: &ImageSelection) {
    if selection.source != SourceKind::NativeCamera {
        return;
    }
    if let ImageReference::File(reference) = &selection.reference {
        let path = local_path(reference);
        match tokio::fs::remove_file(path).await {
            Ok(()) => debug!("removed capture {}", path),
            Err(e) => debug!("capture {} not removed: {}", path, e),
        }
    }
}

fn capture_path(dir: &Path) -> PathBuf {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    dir.join(format!("capture-{}.jpg", millis))
}

fn require_template(template: &Option<Vec<String>>) -> Result<&[String]> {
    template
        .as_deref()
        .filter(|t| !t.is_empty())
        .ok_or_else(|| {
            IntakeError::Capture(
                "カメラコマンドが設定されていません（config.json の camera_command）".into(),
            )
        })
}

/// OSのカメラで撮影
pub struct NativeCameraSource {
    template: Option<Vec<String>>,
    output_dir: Option<PathBuf>,
}

impl NativeCameraSource {
    pub fn new(template: Option<Vec<String>>) -> Self {
        Self {
            template,
            output_dir: None,
        }
    }

    /// 保存先（省略時は一時ディレクトリ）
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }
}

#[async_trait]
impl ImageSource for NativeCameraSource {
    fn kind(&self) -> SourceKind {
        SourceKind::NativeCamera
    }

    fn capability(&self) -> Capability {
        Capability::Camera
    }

    async fn acquire(&self) -> Result<Option<ImageSelection>> {
        let template = require_template(&self.template)?;
        let dir = match &self.output_dir {
            Some(dir) => dir.clone(),
            None => capture_dir()?,
        };
        let output = capture_path(&dir);

        if !capture_to_file(template, &output).await? {
            return Ok(None);
        }

        let path = match validate_image_file(&output) {
            Ok(path) => path,
            Err(e) => {
                tokio::fs::remove_file(&output).await.ok();
                return Err(e);
            }
        };
        info!("captured {}", path.display());
        Ok(Some(ImageSelection::new(
            ImageReference::File(path.display().to_string().replace('\\', "/")),
            SourceKind::NativeCamera,
        )))
    }
}

enum Frame {
    Command(Option<Vec<String>>),
    File(PathBuf),
}

/// ページ内カメラ（フレームをData URLにする）
pub struct InlineCaptureSource {
    frame: Frame,
}

impl InlineCaptureSource {
    /// 撮影コマンドでフレームを取得
    pub fn from_command(template: Option<Vec<String>>) -> Self {
        Self {
            frame: Frame::Command(template),
        }
    }

    /// 保存済みのフレーム（画像ファイル、またはData URLを書いたテキスト）
    pub fn from_file(path: impl Into<PathBuf>) -> Self {
        Self {
            frame: Frame::File(path.into()),
        }
    }

    async fn grab(&self) -> Result<Option<Vec<u8>>> {
        match &self.frame {
            Frame::File(path) => {
                if !path.is_file() {
                    return Err(IntakeError::ImageNotFound(path.display().to_string()));
                }
                Ok(Some(read_frame(path).await?))
            }
            Frame::Command(template) => {
                let template = require_template(template)?;
                let output = capture_path(&capture_dir()?);
                if !capture_to_file(template, &output).await? {
                    return Ok(None);
                }
                let bytes = read_frame(&output).await;
                tokio::fs::remove_file(&output).await.ok();
                Ok(Some(bytes?))
            }
        }
    }
}

#[async_trait]
impl ImageSource for InlineCaptureSource {
    fn kind(&self) -> SourceKind {
        SourceKind::InlineCapture
    }

    fn capability(&self) -> Capability {
        Capability::Camera
    }

    async fn acquire(&self) -> Result<Option<ImageSelection>> {
        let Some(bytes) = self.grab().await? else {
            return Ok(None);
        };
        if bytes.is_empty() {
            return Ok(None);
        }

        Ok(Some(ImageSelection::new(
            ImageReference::DataUrl(frame_to_data_url(&bytes)?),
            SourceKind::InlineCapture,
        )))
    }
}

/// フレームをData URLに変換（既にData URLのテキストならそのまま）
fn frame_to_data_url(bytes: &[u8]) -> Result<String> {
    if bytes.starts_with(b"data:") {
        let text = String::from_utf8_lossy(bytes).trim().to_string();
        skin_intake_common::decode_data_url(&text)
            .map_err(|e| IntakeError::UnsupportedImage(format!("frame: {}", e)))?;
        return Ok(text);
    }

    let mime = match image::guess_format(bytes) {
        Ok(image::ImageFormat::Jpeg) => IMAGE_MIME,
        Ok(image::ImageFormat::Png) => "image/png",
        Ok(other) => {
            return Err(IntakeError::UnsupportedImage(format!("{:?} frame", other)));
        }
        Err(e) => return Err(IntakeError::UnsupportedImage(e.to_string())),
    };
    Ok(encode_data_url(mime, bytes))
}
