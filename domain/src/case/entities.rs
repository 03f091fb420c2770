//! Case entities
//!
//! The [`Case`] is the shared subject of a consultation. [`LinkedCase`]s are
//! read-only summaries of earlier consultations attached for context.

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};

/// Processing state of an attached image analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FindingStatus {
    #[default]
    Queued,
    Success,
    Error,
}

/// Result of analysing one attached image
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageFinding {
    pub id: String,
    pub name: String,
    pub result: String,
    pub status: FindingStatus,
    pub error: String,
}

impl ImageFinding {
    pub fn success(name: impl Into<String>, result: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            result: result.into(),
            status: FindingStatus::Success,
            ..Default::default()
        }
    }
}

/// Summarize successful image findings, one line per image.
///
/// Numbering follows the position in the full list so that failed images
/// still leave a gap the reader can notice.
pub fn summarize_image_findings(findings: &[ImageFinding]) -> String {
    findings
        .iter()
        .enumerate()
        .filter(|(_, f)| f.status == FindingStatus::Success && !f.result.is_empty())
        .map(|(idx, f)| {
            if f.name.is_empty() {
                format!("Image {}: {}", idx + 1, f.result)
            } else {
                format!("Image {} ({}): {}", idx + 1, f.name, f.result)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// The patient case under discussion (Entity)
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Case {
    pub name: String,
    pub gender: String,
    pub age: Option<u32>,
    pub past_history: String,
    pub current_problem: String,
    /// Text summary of image analysis, fed into prompts
    pub image_summary: String,
    pub image_findings: Vec<ImageFinding>,
}

impl Case {
    pub fn new(name: impl Into<String>, current_problem: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            current_problem: current_problem.into(),
            ..Default::default()
        }
    }

    /// A session can only start once the case names a patient and a problem.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.name.trim().is_empty() {
            return Err(DomainError::MissingPatientName);
        }
        if self.current_problem.trim().is_empty() {
            return Err(DomainError::MissingProblem);
        }
        Ok(())
    }

    /// Replace the image findings and refresh the image summary.
    ///
    /// A manually entered summary is kept when no finding has succeeded.
    pub fn set_image_findings(&mut self, findings: Vec<ImageFinding>) {
        let summary = summarize_image_findings(&findings);
        if !summary.is_empty() {
            self.image_summary = summary;
        }
        self.image_findings = findings;
    }

    /// Author label for patient-authored history entries
    pub fn patient_label(&self) -> String {
        if self.name.trim().is_empty() {
            "Patient".to_string()
        } else {
            format!("Patient ({})", self.name.trim())
        }
    }
}

/// Summary of an earlier consultation attached as context (read-only)
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkedCase {
    pub id: String,
    pub source_id: String,
    pub consultation_name: String,
    pub patient_name: String,
    pub patient_gender: String,
    pub patient_age: Option<u32>,
    pub past_history: String,
    pub current_problem: String,
    pub image_summary: String,
    pub final_summary: String,
    pub finished_at: String,
}

/// Fill in identifiers and display names missing from linked cases.
pub fn normalize_linked_cases(list: Vec<LinkedCase>) -> Vec<LinkedCase> {
    list.into_iter()
        .enumerate()
        .map(|(idx, mut item)| {
            if item.id.is_empty() {
                item.id = if item.source_id.is_empty() {
                    format!("linked-{}", idx)
                } else {
                    item.source_id.clone()
                };
            }
            if item.source_id.is_empty() {
                item.source_id = item.id.clone();
            }
            if item.consultation_name.is_empty() {
                item.consultation_name = format!("Linked consultation {}", idx + 1);
            }
            item
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_requires_name_and_problem() {
        assert_eq!(
            Case::new("", "cough").validate(),
            Err(DomainError::MissingPatientName)
        );
        assert_eq!(
            Case::new("Li Lei", "  ").validate(),
            Err(DomainError::MissingProblem)
        );
        assert!(Case::new("Li Lei", "cough").validate().is_ok());
    }

    #[test]
    fn test_image_summary_only_successful() {
        let mut failed = ImageFinding::success("ct.png", "");
        failed.status = FindingStatus::Error;
        let findings = vec![
            ImageFinding::success("xray.png", "Right lower lobe opacity"),
            failed,
            ImageFinding::success("", "Normal ECG"),
        ];
        assert_eq!(
            summarize_image_findings(&findings),
            "Image 1 (xray.png): Right lower lobe opacity\nImage 3: Normal ECG"
        );
    }

    #[test]
    fn test_set_image_findings_keeps_manual_summary() {
        let mut case = Case::new("Li Lei", "cough");
        case.image_summary = "manual note".to_string();
        case.set_image_findings(vec![ImageFinding::default()]);
        assert_eq!(case.image_summary, "manual note");
        assert_eq!(case.image_findings.len(), 1);

        case.set_image_findings(vec![ImageFinding::success("a", "b")]);
        assert_eq!(case.image_summary, "Image 1 (a): b");
    }

    #[test]
    fn test_patient_label() {
        assert_eq!(Case::default().patient_label(), "Patient");
        assert_eq!(Case::new("Li Lei", "x").patient_label(), "Patient (Li Lei)");
    }

    #[test]
    fn test_normalize_linked_cases() {
        let list = normalize_linked_cases(vec![
            LinkedCase::default(),
            LinkedCase {
                source_id: "c-42".to_string(),
                ..Default::default()
            },
        ]);
        assert_eq!(list[0].id, "linked-0");
        assert_eq!(list[0].source_id, "linked-0");
        assert_eq!(list[0].consultation_name, "Linked consultation 1");
        assert_eq!(list[1].id, "c-42");
        assert_eq!(list[1].consultation_name, "Linked consultation 2");
    }
}
