use std::sync::Mutex;

use async_trait::async_trait;
use dialoguer::Confirm;
use tracing::{debug, warn};

use super::Capability;

/// OSの権限ダイアログ
#[async_trait]
pub trait PermissionProvider: Send + Sync {
    /// 許可されれば true
    async fn request(&self, capability: Capability) -> bool;
}

/// 固定の許可設定（非対話実行・テスト用）
#[derive(Debug, Clone, Copy)]
pub struct StaticPermissions {
    pub camera: bool,
    pub media_library: bool,
}

impl StaticPermissions {
    pub fn granted() -> Self {
        Self {
            camera: true,
            media_library: true,
        }
    }

    pub fn denied() -> Self {
        Self {
            camera: false,
            media_library: false,
        }
    }
}

#[async_trait]
impl PermissionProvider for StaticPermissions {
    async fn request(&self, capability: Capability) -> bool {
        match capability {
            Capability::Camera => self.camera,
            Capability::MediaLibrary => self.media_library,
        }
    }
}

/// 端末で確認する（許可は記憶する）
#[derive(Debug, Default)]
pub struct PromptPermissions {
    granted: Mutex<Vec<Capability>>,
}

impl PromptPermissions {
    pub fn new() -> Self {
        Self::default()
    }

    fn is_granted(&self, capability: Capability) -> bool {
        self.granted
            .lock()
            .map(|granted| granted.contains(&capability))
            .unwrap_or(false)
    }

    fn remember(&self, capability: Capability) {
        if let Ok(mut granted) = self.granted.lock() {
            granted.push(capability);
        }
    }
}

#[async_trait]
impl PermissionProvider for PromptPermissions {
    async fn request(&self, capability: Capability) -> bool {
        if self.is_granted(capability) {
            return true;
        }

        let prompt = format!("Allow access to the {}?", capability);
        let answer = tokio::task::spawn_blocking(move || {
            Confirm::new().with_prompt(prompt).default(true).interact()
        })
        .await;

        match answer {
            Ok(Ok(true)) => {
                debug!("{} permission granted", capability);
                self.remember(capability);
                true
            }
            Ok(Ok(false)) => false,
            Ok(Err(e)) => {
                warn!("permission prompt failed: {}", e);
                false
            }
            Err(e) => {
                warn!("permission prompt task failed: {}", e);
                false
            }
        }
    }
}
