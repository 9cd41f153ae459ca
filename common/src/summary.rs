//! ステップ3の結果レポート

use std::fmt;

use serde::Serialize;

use crate::types::{AnalysisReport, IntakeForm};
use crate::wizard::{IntakeWizard, Phase};

const NO_REPORT: &str = "No report.";

/// 個人情報 + 解析結果
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryReport {
    pub name: String,
    pub skin_type: String,
    pub age: String,
    pub gender: String,
    pub analysis: Option<AnalysisReport>,
}

impl SummaryReport {
    pub fn new(form: &IntakeForm, analysis: Option<&AnalysisReport>) -> Self {
        Self {
            name: form.name.clone(),
            skin_type: form.skin_type_value().to_string(),
            age: form.age.clone(),
            gender: form.gender_value().to_string(),
            analysis: analysis.cloned(),
        }
    }

    /// ステップ3にいるときだけ作成
    pub fn from_wizard(wizard: &IntakeWizard) -> Option<Self> {
        (wizard.phase() == Phase::Summary).then(|| Self::new(wizard.form(), wizard.result()))
    }

    /// 解析結果の表示テキスト（2スペースインデントのJSON）
    pub fn analysis_text(&self) -> String {
        self.analysis
            .as_ref()
            .map(|report| report.to_pretty_string())
            .unwrap_or_else(|| NO_REPORT.to_string())
    }
}

impl fmt::Display for SummaryReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Summary Report")?;
        writeln!(f)?;
        writeln!(f, "Your Personal Information")?;
        writeln!(f, "  Name: {}", self.name)?;
        writeln!(f, "  Skin Type: {}", self.skin_type)?;
        writeln!(f, "  Age: {}", self.age)?;
        writeln!(f, "  Gender: {}", self.gender)?;
        writeln!(f)?;
        writeln!(f, "Backend Analysis Report")?;
        write!(f, "{}", self.analysis_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Gender, SkinType};
    use serde_json::json;

    fn jane() -> IntakeForm {
        IntakeForm {
            name: "Jane".into(),
            age: "30".into(),
            gender: Some(Gender::Female),
            skin_type: Some(SkinType::Oily),
        }
    }

    #[test]
    fn test_summary_lines() {
        let report = AnalysisReport(json!({"score": 82, "notes": "balanced"}));
        let summary = SummaryReport::new(&jane(), Some(&report));
        let text = summary.to_string();

        assert!(text.contains("Name: Jane"));
        assert!(text.contains("Age: 30"));
        assert!(text.contains("Gender: Female"));
        assert!(text.contains("Skin Type: oily"));
        assert!(text.contains("\"score\": 82"));
    }

    #[test]
    fn test_summary_without_report() {
        let summary = SummaryReport::new(&jane(), None);
        assert_eq!(summary.analysis_text(), "No report.");
    }

    #[test]
    fn test_from_wizard_outside_summary() {
        let wizard = IntakeWizard::default();
        assert!(SummaryReport::from_wizard(&wizard).is_none());
    }
}
