//! Case files passed to `consilium consult`
//!
//! A case file carries the patient record and, optionally, linked
//! consultations, opening patient messages, pinned knowledge and a panel
//! that replaces the configured one.
//!
//! ```toml
//! consultation_name = "Ward 3 review"
//! knowledge = ["doc-1"]
//!
//! [patient]
//! name = "Li Lei"
//! age = 42
//! current_problem = "Fever and productive cough for three days"
//!
//! [[linked_cases]]
//! consultation_name = "Admission 2024"
//! final_summary = "Asthma, well controlled"
//! ```

use anyhow::{Context, Result};
use consilium_domain::{Agent, Case, ConfigIssue, LinkedCase};
use consilium_infrastructure::{FileAgentConfig, FileConfig};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CaseFile {
    pub consultation_name: String,
    #[serde(alias = "patient")]
    pub case: Case,
    pub linked_cases: Vec<LinkedCase>,
    /// Copy the first linked case's patient details into the case
    pub sync_patient_info: bool,
    pub patient_messages: Vec<String>,
    /// Knowledge document ids retrieval is restricted to
    pub knowledge: Vec<String>,
    pub agents: Vec<FileAgentConfig>,
}

impl CaseFile {
    /// Read a case file; `.json` files are parsed as JSON, anything else as TOML
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read case file {}", path.display()))?;
        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        if is_json {
            serde_json::from_str(&raw).with_context(|| format!("Invalid JSON in {}", path.display()))
        } else {
            toml::from_str(&raw).with_context(|| format!("Invalid TOML in {}", path.display()))
        }
    }

    /// The panel declared in the case file, with any issues found building it
    pub fn panel(&self) -> (Vec<Agent>, Vec<ConfigIssue>) {
        let config = FileConfig {
            agents: self.agents.clone(),
            ..Default::default()
        };
        (config.build_agents(), config.validate())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write(suffix: &str, content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_toml_case() {
        let file = write(
            ".toml",
            r#"
consultation_name = "Ward 3 review"
knowledge = ["doc-1"]
patient_messages = ["The cough is worse at night"]

[patient]
name = "Li Lei"
gender = "male"
age = 42
current_problem = "Fever and cough"

[[linked_cases]]
consultation_name = "Admission 2024"
final_summary = "Asthma"

[[agents]]
id = "doc-a"
name = "Dr Alpha"
provider = "openai"
model = "gpt-4o"
"#,
        );

        let case_file = CaseFile::load(file.path()).unwrap();
        assert_eq!(case_file.consultation_name, "Ward 3 review");
        assert_eq!(case_file.case.name, "Li Lei");
        assert_eq!(case_file.case.age, Some(42));
        assert_eq!(case_file.linked_cases.len(), 1);
        assert_eq!(case_file.knowledge, vec!["doc-1"]);
        assert_eq!(case_file.patient_messages.len(), 1);

        let (panel, issues) = case_file.panel();
        assert_eq!(panel.len(), 1);
        assert!(issues.is_empty());
    }

    #[test]
    fn test_load_json_case() {
        let file = write(
            ".json",
            r#"{"case": {"name": "Han Meimei", "current_problem": "Headache"}, "sync_patient_info": true}"#,
        );
        let case_file = CaseFile::load(file.path()).unwrap();
        assert_eq!(case_file.case.current_problem, "Headache");
        assert!(case_file.sync_patient_info);
        assert!(case_file.panel().0.is_empty());
    }

    #[test]
    fn test_invalid_case_file() {
        let file = write(".toml", "patient = 3");
        let err = CaseFile::load(file.path()).unwrap_err();
        assert!(err.to_string().contains("Invalid TOML"));

        assert!(CaseFile::load(Path::new("/nonexistent/case.toml")).is_err());
    }
}
