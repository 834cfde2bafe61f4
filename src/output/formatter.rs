//! Console and JSON rendering of reports

use crate::config::{OutputConfig, OutputFormat};
use crate::error::Result;
use crate::input::catalog::RoleResolution;
use crate::llm::generator::Explanation;
use crate::output::report::*;
use crate::processing::analyzer::{GapAnalysis, JobMatchReport, RoleLearningPlan};
use crate::processing::learning_path::LearningPath;
use crate::processing::retrieval::{QuestionAnswer, RagExplanation};
use crate::processing::scorer::{MatchResult, Suitability};
use colored::{Color, Colorize};
use std::path::Path;

const RULE_WIDTH: usize = 70;

pub trait OutputFormatter {
    fn format_report(&self, envelope: &ReportEnvelope) -> Result<String>;
    fn supports_format(&self) -> OutputFormat;
}

/// Human readable console output
pub struct ConsoleFormatter {
    use_colors: bool,
    detailed: bool,
    display_cap: usize,
}

/// Structured output for scripting
pub struct JsonFormatter {
    pretty: bool,
}

pub struct ReportGenerator {
    console_formatter: ConsoleFormatter,
    json_formatter: JsonFormatter,
}

impl ConsoleFormatter {
    pub fn new(use_colors: bool, detailed: bool, display_cap: usize) -> Self {
        Self {
            use_colors,
            detailed,
            display_cap,
        }
    }

    fn colorize(&self, text: &str, color: Color) -> String {
        if self.use_colors {
            text.color(color).to_string()
        } else {
            text.to_string()
        }
    }

    fn format_banner(&self, title: &str) -> String {
        let rule = "=".repeat(RULE_WIDTH);
        let title = if self.use_colors {
            title.bold().to_string()
        } else {
            title.to_string()
        };
        format!("{}\n{}\n{}\n", rule, title, rule)
    }

    fn format_header(&self, title: &str) -> String {
        if self.use_colors {
            format!("\n{}\n", title.color(Color::Blue).bold())
        } else {
            format!("\n{}\n", title)
        }
    }

    fn format_suitability_badge(&self, suitability: Suitability) -> String {
        let color = match suitability {
            Suitability::Excellent => Color::Green,
            Suitability::Good => Color::BrightGreen,
            Suitability::Moderate => Color::Yellow,
            Suitability::Challenging => Color::Red,
        };
        let badge = format!("[{}]", suitability.to_string().to_uppercase());
        self.colorize(&badge, color)
    }

    fn format_skill_lists(&self, result: &MatchResult) -> String {
        let mut output = String::new();

        output.push_str(&self.format_header(&format!(
            "Skills matched ({}/{})",
            result.matched_skills.len(),
            result.total_required
        )));
        if result.matched_skills.is_empty() {
            output.push_str("  None\n");
        }
        for skill in &result.matched_skills {
            output.push_str(&format!("  {} {}\n", self.colorize("✓", Color::Green), skill));
        }

        output.push_str(&self.format_header(&format!("Skills missing ({})", result.missing_skills.len())));
        if result.missing_skills.is_empty() {
            output.push_str("  None\n");
        }
        let shown = if self.detailed {
            &result.missing_skills[..]
        } else {
            result.display_missing(self.display_cap)
        };
        for skill in shown {
            output.push_str(&format!("  {} {}\n", self.colorize("✗", Color::Red), skill));
        }
        if shown.len() < result.missing_skills.len() {
            output.push_str(&format!("  ... and {} more\n", result.missing_skills.len() - shown.len()));
        }

        output
    }

    fn format_learning_path(&self, path: &LearningPath) -> String {
        let mut output = self.format_header(&format!("Learning path ({} weeks)", path.total_weeks));
        if path.is_empty() {
            output.push_str("  Nothing to learn for this role\n");
            return output;
        }

        for step in &path.steps {
            output.push_str(&format!(
                "  Week {:>2}-{:<3} {} [{}]\n",
                step.start_week, step.end_week, step.skill, step.difficulty
            ));
            if self.detailed {
                for resource in &step.resources {
                    output.push_str(&format!("      - {}\n", resource));
                }
            }
        }
        output
    }

    fn format_resolution(&self, role: &str, resolution: &RoleResolution) -> String {
        match resolution {
            RoleResolution::Fallback { suggestion: Some(name) } => self.colorize(
                &format!("Unknown role '{}', using general skills. Did you mean '{}'?\n", role, name),
                Color::Yellow,
            ),
            RoleResolution::Fallback { suggestion: None } => self.colorize(
                &format!("Unknown role '{}', using general skills.\n", role),
                Color::Yellow,
            ),
            _ => String::new(),
        }
    }

    fn format_explanation(&self, explanation: &Explanation) -> String {
        let label = if explanation.is_generated() {
            "Explanation"
        } else {
            "Explanation (templated)"
        };
        let mut output = self.format_header(label);
        output.push_str(explanation.text());
        output.push('\n');
        output
    }

    fn format_gap(&self, analysis: &GapAnalysis) -> String {
        let mut output = self.format_banner("SKILL GAP ANALYSIS REPORT");
        output.push_str(&format!("Candidate: {}\n", analysis.candidate.name));
        if let Some(role) = &analysis.candidate.current_role {
            output.push_str(&format!("Current Role: {}\n", role));
        }
        output.push_str(&format!(
            "Experience: {} years ({})\n",
            analysis.candidate.experience_years, analysis.experience_level
        ));
        output.push_str(&format!("Target Role: {}\n", analysis.target_role));
        output.push_str(&self.format_resolution(&analysis.target_role, &analysis.role_resolution));
        output.push_str(&format!(
            "Match: {:.2}% {}\n",
            analysis.match_result.match_percentage,
            self.format_suitability_badge(analysis.match_result.suitability)
        ));
        output.push_str(&format!("Job Fit: {:.2} ({})\n", analysis.job_fit, analysis.readiness));

        output.push_str(&self.format_skill_lists(&analysis.match_result));

        if self.detailed && !analysis.prioritized_missing.is_empty() {
            output.push_str(&self.format_header("Priorities"));
            for priority in &analysis.prioritized_missing {
                output.push_str(&format!(
                    "  {:<8} {} ({:.2})\n",
                    priority.priority, priority.skill, priority.importance
                ));
            }
        }

        output.push_str(&self.format_learning_path(&analysis.learning_path));
        output.push_str(&format!("\nProcessing time: {}ms\n", analysis.processing_time_ms));
        output
    }

    fn format_plan(&self, plan: &RoleLearningPlan) -> String {
        let mut output = self.format_banner("LEARNING PATH");
        output.push_str(&format!("Candidate: {}\n", plan.candidate_name));
        output.push_str(&format!("Target Role: {}\n", plan.target_role));
        output.push_str(&self.format_resolution(&plan.target_role, &plan.role_resolution));
        output.push_str(&self.format_learning_path(&plan.learning_path));
        output
    }

    fn format_job_match(&self, report: &JobMatchReport) -> String {
        let result = &report.match_result;
        let mut output = self.format_banner("JOB MATCH REPORT");
        output.push_str(&format!("Candidate: {}\n", report.candidate_name));
        output.push_str(&format!("Target Role: {}\n", report.target_role));
        output.push_str(&format!(
            "Match: {:.2}% {}\n",
            result.match_percentage,
            self.format_suitability_badge(result.suitability)
        ));

        let domain = &result.domain;
        let describe = |d: &Option<String>| d.clone().unwrap_or_else(|| "unknown".to_string());
        if domain.is_mismatch() {
            output.push_str(&self.colorize(
                &format!(
                    "Domain: {} vs {} (-{}%)\n",
                    describe(&domain.candidate_domain),
                    describe(&domain.requirement_domain),
                    domain.penalty
                ),
                Color::Yellow,
            ));
        } else {
            output.push_str(&format!("Domain: {}\n", describe(&domain.requirement_domain)));
        }

        output.push_str(&self.format_skill_lists(result));

        output.push_str(&self.format_header("Improvement areas"));
        for area in &report.improvement_areas {
            output.push_str(&format!("  - {}\n", area));
        }
        output.push_str(&self.format_header("Learning plan"));
        for step in &report.learning_plan {
            output.push_str(&format!("  {}\n", step));
        }

        output.push_str(&self.format_explanation(&report.explanation));
        output.push_str(&format!("\nProcessing time: {}ms\n", report.processing_time_ms));
        output
    }

    fn format_comparison(&self, report: &ComparisonReport) -> String {
        let mut output = self.format_banner(&format!("CANDIDATE COMPARISON: {}", report.target_role));
        if report.rows.is_empty() {
            output.push_str("No candidates could be analyzed\n");
            return output;
        }

        output.push_str(&format!(
            "{:<5} {:<24} {:>8} {:>9}  {:<12} {}\n",
            "Rank", "Candidate", "Job Fit", "Match %", "Suitability", "Missing"
        ));
        for row in &report.rows {
            output.push_str(&format!(
                "{:<5} {:<24} {:>8.2} {:>9.2}  {:<12} {}\n",
                row.rank, row.candidate_name, row.job_fit, row.match_percentage, row.suitability, row.missing_count
            ));
        }
        output
    }

    fn format_retrieval(&self, rag: &RagExplanation) -> String {
        let mut output = self.format_banner(&format!("RETRIEVAL-GROUNDED GAP: {}", rag.target_role));

        output.push_str(&self.format_header(&format!("Retrieved jobs ({})", rag.retrieved.len())));
        for hit in &rag.retrieved {
            output.push_str(&format!(
                "  #{:<4} {:<30} distance {:.4}\n",
                hit.position, hit.record.job_title, hit.distance
            ));
        }

        if let Some(result) = &rag.match_result {
            output.push_str(&self.format_skill_lists(result));
        }
        output.push_str(&self.format_explanation(&rag.explanation));
        output
    }

    fn format_neighbors(&self, report: &NeighborReport) -> String {
        let mut output = self.format_banner("NEAREST JOB DESCRIPTIONS");
        output.push_str(&format!("Query: {}\n", report.query));
        output.push_str(&format!("Found {} of top-{}\n", report.records.len(), report.k));

        for hit in &report.records {
            output.push_str(&format!(
                "\n#{} {} ({}) distance {:.4}\n",
                hit.position, hit.record.job_title, hit.record.industry, hit.distance
            ));
            output.push_str(&format!("  Skills: {}\n", hit.record.skills_required.join(", ")));
            if self.detailed {
                output.push_str(&format!("  {}\n", hit.record.description));
            }
        }
        output
    }

    fn format_answer(&self, answer: &QuestionAnswer) -> String {
        let mut output = self.format_banner("QUESTION");
        output.push_str(&format!("{}\n", answer.question));

        output.push_str(&self.format_header(&format!("Context ({} jobs)", answer.context.len())));
        for hit in &answer.context {
            if self.detailed {
                output.push_str(&hit.record.context_block());
                output.push('\n');
            } else {
                output.push_str(&format!("  {} ({})\n", hit.record.job_title, hit.record.industry));
            }
        }

        output.push_str(&self.format_header("Answer"));
        match &answer.answer {
            Some(text) => output.push_str(&format!("{}\n", text)),
            None => output.push_str(&self.colorize("No generator available; showing retrieved context only.\n", Color::Yellow)),
        }
        output
    }

    fn format_job_fit(&self, summary: &JobFitSummary) -> String {
        let mut output = self.format_banner("JOB FIT SCORES");
        output.push_str(&format!(
            "{} candidates x {} jobs written to {}\n",
            summary.candidates,
            summary.jobs,
            summary.output_path.display()
        ));

        if !summary.top_rows.is_empty() {
            output.push_str(&self.format_header("Best fits"));
            for row in &summary.top_rows {
                output.push_str(&format!("  {:.2}  {} -> {}\n", row.job_fit, row.candidate_name, row.job_title));
            }
        }
        output
    }

    fn format_index(&self, summary: &IndexSummary) -> String {
        let manifest = &summary.manifest;
        let mut output = self.format_banner("VECTOR INDEX");
        output.push_str(&format!("Directory: {}\n", summary.index_dir.display()));
        output.push_str(&format!("Generation: {}\n", manifest.generation));
        output.push_str(&format!("Records: {}\n", manifest.count));
        output.push_str(&format!("Dimension: {}\n", manifest.dimension));
        output.push_str(&format!("Model: {}\n", manifest.model_name));
        output.push_str(&format!(
            "Created: {}\n",
            manifest.created_at.format("%Y-%m-%d %H:%M:%S UTC")
        ));
        output.push_str(&format!("Generations on disk: {}\n", summary.generations.len()));
        output
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format_report(&self, envelope: &ReportEnvelope) -> Result<String> {
        let output = match &envelope.report {
            Report::Gap(analysis) => self.format_gap(analysis),
            Report::LearningPath(plan) => self.format_plan(plan),
            Report::JobMatch(report) => self.format_job_match(report),
            Report::Comparison(report) => self.format_comparison(report),
            Report::Neighbors(report) => self.format_neighbors(report),
            Report::Retrieval(rag) => self.format_retrieval(rag),
            Report::Answer(answer) => self.format_answer(answer),
            Report::JobFit(summary) => self.format_job_fit(summary),
            Report::Index(summary) => self.format_index(summary),
        };
        Ok(output)
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Console
    }
}

impl JsonFormatter {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_report(&self, envelope: &ReportEnvelope) -> Result<String> {
        if self.pretty {
            Ok(serde_json::to_string_pretty(envelope)?)
        } else {
            Ok(serde_json::to_string(envelope)?)
        }
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Json
    }
}

impl ReportGenerator {
    pub fn new() -> Self {
        Self {
            console_formatter: ConsoleFormatter::new(true, false, 5),
            json_formatter: JsonFormatter::new(true),
        }
    }

    pub fn with_options(use_colors: bool, detailed: bool, display_cap: usize, pretty_json: bool) -> Self {
        Self {
            console_formatter: ConsoleFormatter::new(use_colors, detailed, display_cap),
            json_formatter: JsonFormatter::new(pretty_json),
        }
    }

    pub fn from_config(config: &OutputConfig, detailed: bool, display_cap: usize) -> Self {
        Self::with_options(config.color_output, detailed, display_cap, true)
    }

    pub fn generate_report(&self, envelope: &ReportEnvelope, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Console => self.console_formatter.format_report(envelope),
            OutputFormat::Json => self.json_formatter.format_report(envelope),
        }
    }
}

impl Default for ReportGenerator {
    fn default() -> Self {
        Self::new()
    }
}

pub fn save_report_to_file(content: &str, file_path: &Path) -> Result<()> {
    use std::fs;
    if let Some(parent) = file_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(file_path, content)?;
    log::info!("Report saved to {}", file_path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::learning_path::build_learning_path;
    use crate::processing::scorer::DomainAssessment;

    fn plain() -> ConsoleFormatter {
        ConsoleFormatter::new(false, false, 2)
    }

    fn result(matched: &[&str], missing: &[&str]) -> MatchResult {
        MatchResult {
            matched_skills: matched.iter().map(|s| s.to_string()).collect(),
            missing_skills: missing.iter().map(|s| s.to_string()).collect(),
            total_required: matched.len() + missing.len(),
            match_percentage: 50.0,
            suitability: Suitability::Moderate,
            domain: DomainAssessment::default(),
        }
    }

    #[test]
    fn test_skill_lists_marks_and_cap() {
        let output = plain().format_skill_lists(&result(&["Python"], &["Docker", "AWS", "Go"]));

        assert!(output.contains("Skills matched (1/4)"));
        assert!(output.contains("  ✓ Python"));
        assert!(output.contains("  ✗ Docker"));
        assert!(output.contains("  ✗ AWS"));
        assert!(!output.contains("✗ Go"));
        assert!(output.contains("... and 1 more"));
    }

    #[test]
    fn test_learning_path_rendering() {
        let path = build_learning_path(&["Docker", "AWS"]);
        let output = plain().format_learning_path(&path);

        assert!(output.contains("Learning path (9 weeks)"));
        assert!(output.contains("Week  1-5   Docker [Beginner]"));
        assert!(output.contains("Week  5-9   AWS [Beginner]"));
    }

    #[test]
    fn test_comparison_table_and_json() {
        let envelope = ReportEnvelope::new(Report::Comparison(ComparisonReport {
            target_role: "Data Analyst".to_string(),
            rows: vec![ComparisonRow {
                rank: 1,
                candidate_name: "Alice".to_string(),
                job_fit: 0.57,
                match_percentage: 57.14,
                suitability: Suitability::Moderate,
                readiness: crate::processing::job_fit::ReadinessLevel::ModeratelyQualified,
                missing_count: 3,
            }],
        }));

        let generator = ReportGenerator::with_options(false, false, 5, false);
        let console = generator.generate_report(&envelope, OutputFormat::Console).unwrap();
        assert!(console.contains("CANDIDATE COMPARISON: Data Analyst"));
        assert!(console.contains("Alice"));
        assert!(console.contains("57.14"));

        let json = generator.generate_report(&envelope, OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["report"]["rows"][0]["candidate_name"], "Alice");
    }

    #[test]
    fn test_save_report_creates_parent() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("reports").join("gap.txt");
        save_report_to_file("hello", &path).unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap(), "hello");
    }
}
