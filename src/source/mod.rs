//! 写真の取得元
//!
//! ギャラリー / ネイティブカメラ / ページ内カメラを共通の `ImageSource` で扱う。
//! どれも取得前に権限を確認する（`PermissionProvider`）

mod camera;
mod gallery;
mod permission;

pub use camera::{InlineCaptureSource, NativeCameraSource, capture_to_file, discard_capture};
pub use gallery::{GallerySource, IMAGE_EXTENSIONS, is_supported_image};
pub use permission::{PermissionProvider, PromptPermissions, StaticPermissions};

use std::fmt;

use async_trait::async_trait;
use skin_intake_common::{ImageSelection, SourceKind};

use crate::error::Result;

/// 取得がキャンセルされたときの通知
pub const CANCELLED_NOTICE: &str = "No photo selected.";

/// OSの権限
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    Camera,
    MediaLibrary,
}

impl Capability {
    /// 拒否されたときの通知
    pub fn denied_notice(&self) -> &'static str {
        match self {
            Capability::Camera => "Permission to access camera is required!",
            Capability::MediaLibrary => "Permission to access gallery is required!",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Capability::Camera => write!(f, "camera"),
            Capability::MediaLibrary => write!(f, "gallery"),
        }
    }
}

/// 写真の取得元
#[async_trait]
pub trait ImageSource: Send + Sync {
    fn kind(&self) -> SourceKind;

    /// 取得前に要求する権限
    fn capability(&self) -> Capability;

    /// 写真を取得する。キャンセルは `Ok(None)`
    async fn acquire(&self) -> Result<Option<ImageSelection>>;
}
