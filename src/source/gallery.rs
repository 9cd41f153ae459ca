use std::path::{Path, PathBuf};

use async_trait::async_trait;
use dialoguer::Input;
use skin_intake_common::{ImageReference, ImageSelection, SourceKind, local_path};
use tracing::debug;

use super::{Capability, ImageSource};
use crate::error::{IntakeError, Result};

/// 対応形式: .jpg, .png
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

/// 拡張子が対応形式か（大文字小文字は区別しない）
pub fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy())
        .is_some_and(|ext| IMAGE_EXTENSIONS.iter().any(|e| e.eq_ignore_ascii_case(&ext)))
}

enum Picker {
    Fixed(String),
    Prompt,
}

/// ギャラリー（ローカルファイル）から選ぶ
pub struct GallerySource {
    picker: Picker,
}

impl GallerySource {
    /// 指定済みのパス（`file://` URIも可）
    pub fn fixed(reference: impl Into<String>) -> Self {
        Self {
            picker: Picker::Fixed(reference.into()),
        }
    }

    /// 端末でパスを入力（空入力でキャンセル）
    pub fn prompt() -> Self {
        Self {
            picker: Picker::Prompt,
        }
    }

    async fn pick(&self) -> Result<Option<String>> {
        match &self.picker {
            Picker::Fixed(reference) => Ok(Some(reference.clone())),
            Picker::Prompt => {
                let answer = tokio::task::spawn_blocking(|| {
                    Input::<String>::new()
                        .with_prompt("Photo path (.jpg / .png, empty to cancel)")
                        .allow_empty(true)
                        .interact_text()
                })
                .await
                .map_err(|e| IntakeError::Prompt(e.to_string()))?
                .map_err(|e| IntakeError::Prompt(e.to_string()))?;

                let answer = answer.trim().trim_matches('"').to_string();
                Ok((!answer.is_empty()).then_some(answer))
            }
        }
    }
}

#[async_trait]
impl ImageSource for GallerySource {
    fn kind(&self) -> SourceKind {
        SourceKind::Gallery
    }

    fn capability(&self) -> Capability {
        Capability::MediaLibrary
    }

    async fn acquire(&self) -> Result<Option<ImageSelection>> {
        let Some(reference) = self.pick().await? else {
            return Ok(None);
        };

        let path = validate_image_file(Path::new(local_path(&reference)))?;
        Ok(Some(ImageSelection::new(
            ImageReference::File(path.display().to_string().replace('\\', "/")),
            SourceKind::Gallery,
        )))
    }
}

/// 存在・拡張子・画像ヘッダを確認し、絶対パスを返す
pub(crate) fn validate_image_file(path: &Path) -> Result<PathBuf> {
    if !path.is_file() {
        return Err(IntakeError::ImageNotFound(path.display().to_string()));
    }
    if !is_supported_image(path) {
        return Err(IntakeError::UnsupportedImage(path.display().to_string()));
    }

    let (width, height) = image::image_dimensions(path)
        .map_err(|e| IntakeError::UnsupportedImage(format!("{} ({})", path.display(), e)))?;
    debug!("picked {} ({}x{})", path.display(), width, height);

    std::fs::canonicalize(path)
        .map_err(|e| IntakeError::ImageNotFound(format!("{} ({})", path.display(), e)))
}
