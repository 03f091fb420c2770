//! Console output formatter for consultation results

use crate::output::report::ConsultationReport;
use colored::Colorize;
use consilium_domain::{ConfigIssue, Entry, KnowledgeDocument, RetrievedEntry, Severity, SummaryStatus};

/// Formats consultation results and knowledge listings for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Format the complete consultation: case, transcript, votes and summary
    pub fn format(report: &ConsultationReport) -> String {
        let mut output = String::new();

        output.push_str(&Self::header(Self::title(report)));
        output.push('\n');

        output.push_str(&format!("{} {}\n", "Patient:".cyan().bold(), Self::patient_line(report)));
        output.push_str(&format!(
            "{} {}\n\n",
            "Problem:".cyan().bold(),
            report.case.current_problem.trim()
        ));

        if !report.linked_cases.is_empty() {
            output.push_str(&format!("{}\n", "Linked consultations:".cyan().bold()));
            for linked in &report.linked_cases {
                output.push_str(&format!("  * {}\n", linked.consultation_name));
            }
            output.push('\n');
        }

        output.push_str(&format!(
            "{} {}\n",
            "Panel:".cyan().bold(),
            report
                .agents
                .iter()
                .map(|a| format!("{} ({})", a.name, a.provider.model))
                .collect::<Vec<_>>()
                .join(", ")
        ));

        output.push_str(&Self::section_header("Discussion"));
        for entry in &report.history {
            output.push_str(&Self::format_entry(entry));
        }

        output.push_str(&Self::section_header("Outcome"));
        output.push_str(&format!("Rounds: {}\n", report.rounds));
        match &report.finish_reason {
            Some(reason) => output.push_str(&format!("{}\n", reason.message().green())),
            None => output.push_str(&format!("{}\n", "Consultation was cancelled.".yellow())),
        }
        let survivors: Vec<&str> = report.survivors().map(|a| a.name.as_str()).collect();
        if !survivors.is_empty() {
            output.push_str(&format!("Remaining: {}\n", survivors.join(", ")));
        }

        output.push_str(&Self::section_header("Final Summary"));
        output.push_str(&Self::format_summary_body(report));

        output.push_str(&Self::footer());

        output
    }

    /// Format as JSON
    pub fn format_json(report: &ConsultationReport) -> String {
        serde_json::to_string_pretty(report).unwrap_or_else(|_| "{}".to_string())
    }

    /// Format the final summary only (concise output)
    pub fn format_summary_only(report: &ConsultationReport) -> String {
        let mut output = String::new();

        output.push_str(&format!("{}\n\n", format!("=== {} ===", Self::title(report)).cyan().bold()));
        output.push_str(&format!("{} {}\n\n", "Patient:".bold(), Self::patient_line(report)));
        output.push_str(&Self::format_summary_body(report));

        output
    }

    /// Render one history entry
    pub fn format_entry(entry: &Entry) -> String {
        match entry {
            Entry::System { content } => format!("{} {}\n", "·".dimmed(), content.dimmed()),
            Entry::Patient { author, content } => {
                format!("\n{}\n{}\n", format!("── {} ──", author).cyan().bold(), content)
            }
            Entry::Doctor {
                doctor_name, content, ..
            } => format!("\n{}\n{}\n", format!("── {} ──", doctor_name).yellow().bold(), content),
            Entry::VoteDetail(vote) => format!(
                "  {} {} -> {}: {}\n",
                "vote".magenta(),
                vote.voter_name,
                vote.target_name.bold(),
                vote.reason
            ),
            Entry::VoteResult { content } => format!("{}\n", content.green().bold()),
        }
    }

    /// Render a document listing
    pub fn format_documents(docs: &[&KnowledgeDocument]) -> String {
        if docs.is_empty() {
            return format!("{}\n", "No documents.".dimmed());
        }

        let mut output = String::new();
        for doc in docs {
            output.push_str(&format!("{} {}\n", doc.id.dimmed(), doc.title.bold()));
            let mut meta = vec![format!("collection: {}", doc.collection_key())];
            if !doc.tags.is_empty() {
                meta.push(format!("tags: {}", doc.tags.join(", ")));
            }
            meta.push(format!("updated: {}", doc.updated_at.format("%Y-%m-%d %H:%M")));
            output.push_str(&format!("    {}\n", meta.join("  ")));
        }
        output
    }

    /// Render retrieval results with their scores
    pub fn format_retrieved(entries: &[RetrievedEntry]) -> String {
        if entries.is_empty() {
            return format!("{}\n", "No matching knowledge.".dimmed());
        }

        let mut output = String::new();
        for (idx, entry) in entries.iter().enumerate() {
            let score = entry
                .score
                .map(|s| format!("{:.3}", s))
                .unwrap_or_else(|| "-".to_string());
            output.push_str(&format!(
                "{}. {} [{}]\n",
                idx + 1,
                entry.title.bold(),
                score.cyan()
            ));
            output.push_str(&Self::indent(entry.content.trim(), "   "));
            output.push('\n');
        }
        output
    }

    /// Render a provider's model labels
    pub fn format_models(provider: &str, labels: &[String]) -> String {
        let mut output = format!("{} {}\n", "Models for".cyan().bold(), provider.bold());
        if labels.is_empty() {
            output.push_str(&format!("  {}\n", "(none)".dimmed()));
        }
        for label in labels {
            output.push_str(&format!("  * {}\n", label));
        }
        output
    }

    /// Render a configuration issue as a single line
    pub fn format_issue(issue: &ConfigIssue) -> String {
        match issue.severity {
            Severity::Error => format!("{} {}", "error:".red().bold(), issue.message),
            Severity::Warning => format!("{} {}", "warning:".yellow().bold(), issue.message),
        }
    }

    fn format_summary_body(report: &ConsultationReport) -> String {
        let summary = &report.summary;
        match summary.status {
            SummaryStatus::Ready => format!(
                "{}\n\n{}\n",
                format!("Written by: {}", summary.agent_name).yellow().bold(),
                summary.content
            ),
            SummaryStatus::Error => format!("{}\n", summary.content.red()),
            SummaryStatus::Pending | SummaryStatus::Idle => {
                format!("{}\n", "No final summary was produced.".dimmed())
            }
        }
    }

    fn title(report: &ConsultationReport) -> &str {
        if report.consultation_name.trim().is_empty() {
            "Consultation"
        } else {
            report.consultation_name.trim()
        }
    }

    fn patient_line(report: &ConsultationReport) -> String {
        let case = &report.case;
        let mut parts = vec![case.name.trim().to_string()];
        if !case.gender.trim().is_empty() {
            parts.push(case.gender.trim().to_string());
        }
        if let Some(age) = case.age {
            parts.push(format!("{} years", age));
        }
        parts.join(", ")
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn footer() -> String {
        format!("\n{}\n", "=".repeat(60).cyan())
    }

    /// Indent a multi-line string
    pub fn indent(text: &str, prefix: &str) -> String {
        text.lines()
            .map(|line| format!("{}{}", prefix, line))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use consilium_domain::{
        Agent, Case, ConfigIssueCode, FinalSummary, FinishReason, Provider, ProviderConfig,
        RawDocument, VoteRecord,
    };

    fn report() -> ConsultationReport {
        let alpha = Agent::new("doc-a", "Dr Alpha", ProviderConfig::new(Provider::OpenAi, "gpt-4o"));
        let mut beta = Agent::new("doc-b", "Dr Beta", ProviderConfig::new(Provider::Gemini, "gemini-pro"));
        beta.eliminate();

        let mut case = Case::new("Li Lei", "Fever and cough for three days");
        case.gender = "male".to_string();
        case.age = Some(42);

        ConsultationReport {
            consultation_name: "Ward 3 review".to_string(),
            case,
            linked_cases: Vec::new(),
            agents: vec![alpha.clone(), beta],
            rounds: 1,
            finish_reason: Some(FinishReason::SoleSurvivor {
                agent_id: "doc-a".to_string(),
                agent_name: "Dr Alpha".to_string(),
            }),
            history: vec![
                Entry::system("Round 1 of the consultation started"),
                Entry::doctor("doc-a", "Dr Alpha", "Community-acquired pneumonia."),
                Entry::VoteDetail(VoteRecord {
                    round: 1,
                    voter_id: "doc-a".to_string(),
                    voter_name: "Dr Alpha".to_string(),
                    target_id: "doc-b".to_string(),
                    target_name: "Dr Beta".to_string(),
                    reason: "ignored the chest film".to_string(),
                }),
            ],
            summary: FinalSummary::ready(&alpha, "Diagnosis: pneumonia.", "prompt"),
        }
    }

    #[test]
    fn test_full_format_contains_sections() {
        let output = ConsoleFormatter::format(&report());
        assert!(output.contains("Ward 3 review"));
        assert!(output.contains("Li Lei, male, 42 years"));
        assert!(output.contains("Community-acquired pneumonia."));
        assert!(output.contains("ignored the chest film"));
        assert!(output.contains("adopting the answer of Dr Alpha"));
        assert!(output.contains("Remaining: Dr Alpha"));
        assert!(output.contains("Diagnosis: pneumonia."));
    }

    #[test]
    fn test_summary_only_skips_transcript() {
        let output = ConsoleFormatter::format_summary_only(&report());
        assert!(output.contains("Diagnosis: pneumonia."));
        assert!(!output.contains("Community-acquired pneumonia."));
    }

    #[test]
    fn test_cancelled_report() {
        let mut report = report();
        report.finish_reason = None;
        report.summary = FinalSummary::default();
        let output = ConsoleFormatter::format(&report);
        assert!(output.contains("cancelled"));
        assert!(output.contains("No final summary was produced."));
    }

    #[test]
    fn test_json_format() {
        let json: serde_json::Value =
            serde_json::from_str(&ConsoleFormatter::format_json(&report())).unwrap();
        assert_eq!(json["consultation_name"], "Ward 3 review");
        assert_eq!(json["history"][1]["type"], "doctor");
        assert_eq!(json["summary"]["status"], "ready");
        assert_eq!(json["agents"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_format_documents_and_retrieved() {
        let doc = RawDocument::new("Pneumonia guideline", "Chest imaging first.")
            .with_tags(vec!["lung".to_string()])
            .normalize();
        let listing = ConsoleFormatter::format_documents(&[&doc]);
        assert!(listing.contains("Pneumonia guideline"));
        assert!(listing.contains("tags: lung"));
        assert!(ConsoleFormatter::format_documents(&[]).contains("No documents."));

        let entries = vec![RetrievedEntry {
            id: "chunk-1".to_string(),
            doc_id: doc.id.clone(),
            title: doc.title.clone(),
            content: "Chest imaging first.".to_string(),
            score: Some(0.8125),
        }];
        let output = ConsoleFormatter::format_retrieved(&entries);
        assert!(output.contains("1. "));
        assert!(output.contains("0.812") || output.contains("0.813"));
        assert!(output.contains("   Chest imaging first."));
    }

    #[test]
    fn test_format_models_and_issue() {
        let output = ConsoleFormatter::format_models("openai", &["gpt-4o".to_string()]);
        assert!(output.contains("  * gpt-4o"));
        assert!(ConsoleFormatter::format_models("gemini", &[]).contains("(none)"));

        let issue = ConfigIssue::error(
            ConfigIssueCode::DuplicateAgentId { id: "a".to_string() },
            "agents: id 'a' is used more than once",
        );
        assert!(ConsoleFormatter::format_issue(&issue).contains("used more than once"));
    }

    #[test]
    fn test_indent() {
        assert_eq!(ConsoleFormatter::indent("a\nb", "  "), "  a\n  b");
    }
}
