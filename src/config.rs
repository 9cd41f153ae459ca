use crate::error::{IntakeError, Result};
use serde::{Deserialize, Serialize};
use skin_intake_common::Platform;
use std::path::PathBuf;

/// 送信先の既定値
pub const DEFAULT_BACKEND_URL: &str = "http://13.203.35.161";

/// 環境変数（設定ファイルより優先）
pub const BACKEND_URL_ENV: &str = "SKIN_INTAKE_BACKEND_URL";

/// 撮影コマンドの出力先プレースホルダ
pub const OUTPUT_PLACEHOLDER: &str = "{output}";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub backend_url: String,
    pub timeout_seconds: u64,
    pub platform: Platform,
    /// 撮影コマンド（例: `["fswebcam", "--no-banner", "{output}"]`）
    pub camera_command: Option<Vec<String>>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_config()
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default_config())
        }
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| IntakeError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("skin-intake").join("config.json"))
    }

    fn default_config() -> Self {
        Self {
            backend_url: DEFAULT_BACKEND_URL.into(),
            timeout_seconds: 30,
            platform: Platform::Native,
            camera_command: None,
        }
    }

    /// 送信先（環境変数を優先）
    pub fn backend_url(&self) -> String {
        match std::env::var(BACKEND_URL_ENV) {
            Ok(url) if !url.trim().is_empty() => url.trim().to_string(),
            _ => self.backend_url.clone(),
        }
    }

    pub fn set_backend_url(&mut self, url: String) -> Result<()> {
        validate_backend_url(&url)?;
        self.backend_url = url.trim_end_matches('/').to_string();
        self.save()
    }

    pub fn set_platform(&mut self, platform: Platform) -> Result<()> {
        self.platform = platform;
        self.save()
    }

    /// 撮影コマンドのテンプレート（空は未設定扱い）
    pub fn camera_template(&self) -> Option<Vec<String>> {
        self.camera_command.clone().filter(|c| !c.is_empty())
    }
}

/// `{output}` を出力先パスに置換
pub fn expand_camera_command(template: &[String], output: &std::path::Path) -> Vec<String> {
    let output = output.display().to_string();
    template
        .iter()
        .map(|arg| arg.replace(OUTPUT_PLACEHOLDER, &output))
        .collect()
}

pub fn validate_backend_url(url: &str) -> Result<()> {
    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(())
    } else {
        Err(IntakeError::Config(format!(
            "送信先URLは http:// または https:// で始めてください: {}",
            url
        )))
    }
}
