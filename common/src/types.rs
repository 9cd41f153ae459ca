//! 入力フォーム・画像選択・解析結果の型定義
//!
//! CLIとWeb(WASM)で共有される型:
//! - IntakeForm: ステップ2の入力項目
//! - ImageSelection: ステップ1で選ばれた写真
//! - AnalysisReport: バックエンドの解析結果（不透明なJSON）

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// 性別
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub const ALL: [Gender; 3] = [Gender::Male, Gender::Female, Gender::Other];

    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
            Gender::Other => "Other",
        }
    }
}

impl FromStr for Gender {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "male" | "m" => Ok(Gender::Male),
            "female" | "f" => Ok(Gender::Female),
            "other" | "o" => Ok(Gender::Other),
            _ => Err(Error::UnknownValue(format!(
                "gender `{}` (use male, female, or other)",
                s
            ))),
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 肌タイプ
///
/// 送信値は小文字（`combination` など）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkinType {
    Combination,
    Dry,
    Normal,
    Oily,
    Sensitive,
}

impl SkinType {
    pub const ALL: [SkinType; 5] = [
        SkinType::Combination,
        SkinType::Dry,
        SkinType::Normal,
        SkinType::Oily,
        SkinType::Sensitive,
    ];

    /// 送信値
    pub fn as_str(&self) -> &'static str {
        match self {
            SkinType::Combination => "combination",
            SkinType::Dry => "dry",
            SkinType::Normal => "normal",
            SkinType::Oily => "oily",
            SkinType::Sensitive => "sensitive",
        }
    }

    /// 選択肢の表示名
    pub fn label(&self) -> &'static str {
        match self {
            SkinType::Combination => "Combination (both oily and dry skin)",
            SkinType::Dry => "Dry",
            SkinType::Normal => "Normal",
            SkinType::Oily => "Oily",
            SkinType::Sensitive => "Sensitive",
        }
    }
}

impl FromStr for SkinType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "combination" => Ok(SkinType::Combination),
            "dry" => Ok(SkinType::Dry),
            "normal" => Ok(SkinType::Normal),
            "oily" => Ok(SkinType::Oily),
            "sensitive" => Ok(SkinType::Sensitive),
            _ => Err(Error::UnknownValue(format!(
                "skin type `{}` (use combination, dry, normal, oily, or sensitive)",
                s
            ))),
        }
    }
}

impl fmt::Display for SkinType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// ステップ2の入力項目
///
/// 入力中はチェックしない。送信時に `IntakeWizard` が順番に検証する
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IntakeForm {
    pub name: String,
    /// 数字のテキスト（数値変換はしない）
    pub age: String,
    pub gender: Option<Gender>,
    pub skin_type: Option<SkinType>,
}

impl IntakeForm {
    /// マルチパートの `gender` 値（未選択は空文字）
    pub fn gender_value(&self) -> &'static str {
        self.gender.map(|g| g.as_str()).unwrap_or("")
    }

    /// マルチパートの `skinType` 値（未選択は空文字）
    pub fn skin_type_value(&self) -> &'static str {
        self.skin_type.map(|s| s.as_str()).unwrap_or("")
    }
}

/// 写真の取得元
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SourceKind {
    Gallery,
    NativeCamera,
    InlineCapture,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::Gallery => write!(f, "gallery"),
            SourceKind::NativeCamera => write!(f, "camera"),
            SourceKind::InlineCapture => write!(f, "inline capture"),
        }
    }
}

/// 写真の参照
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum ImageReference {
    /// ローカルファイルのパスまたは `file://` URI
    File(String),
    /// `data:image/jpeg;base64,...` 形式のData URL
    DataUrl(String),
}

impl ImageReference {
    /// `data:` で始まればData URL、それ以外はファイル参照
    pub fn parse(reference: impl Into<String>) -> Self {
        let reference = reference.into();
        if reference.starts_with("data:") {
            ImageReference::DataUrl(reference)
        } else {
            ImageReference::File(reference)
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ImageReference::File(s) | ImageReference::DataUrl(s) => s,
        }
    }

    pub fn is_inline(&self) -> bool {
        matches!(self, ImageReference::DataUrl(_))
    }
}

/// 選択中の写真（常に0枚か1枚）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageSelection {
    pub reference: ImageReference,
    pub source: SourceKind,
}

impl ImageSelection {
    pub fn new(reference: ImageReference, source: SourceKind) -> Self {
        Self { reference, source }
    }

    /// ログ表示用（Data URLは長いので省略）
    pub fn describe(&self) -> String {
        match &self.reference {
            ImageReference::File(path) => format!("{} ({})", path, self.source),
            ImageReference::DataUrl(url) => {
                format!("inline image, {} chars ({})", url.len(), self.source)
            }
        }
    }
}

/// バックエンドの解析結果
///
/// 中身は解釈せずそのまま表示する
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnalysisReport(pub serde_json::Value);

impl AnalysisReport {
    pub fn from_slice(body: &[u8]) -> Result<Self, Error> {
        Ok(Self(serde_json::from_slice(body)?))
    }

    pub fn value(&self) -> &serde_json::Value {
        &self.0
    }

    /// `JSON.stringify(x, null, 2)` 相当の整形
    pub fn to_pretty_string(&self) -> String {
        serde_json::to_string_pretty(&self.0).unwrap_or_else(|_| self.0.to_string())
    }
}

impl From<serde_json::Value> for AnalysisReport {
    fn from(value: serde_json::Value) -> Self {
        Self(value)
    }
}
