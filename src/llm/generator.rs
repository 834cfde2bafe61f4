//! Text generation boundary and explanation selection

use crate::config::GenerationConfig;
use crate::error::{Result, SkillBridgeError};
use crate::processing::scorer::MatchResult;
use serde::{Deserialize, Serialize};
use std::io::{self, Write};
use std::process::{Command, Stdio};
use std::thread;
use std::time::Instant;

/// Prompt in, text out. Implementations may be slow or fail; callers degrade
/// to a templated explanation.
pub trait TextGenerator: Send + Sync {
    fn generate(&self, prompt: &str) -> Result<String>;

    fn name(&self) -> &str;
}

/// Runs an external program with the prompt on stdin and reads the answer from stdout
#[derive(Debug, Clone)]
pub struct CommandGenerator {
    program: String,
    args: Vec<String>,
}

impl CommandGenerator {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    pub fn from_config(config: &GenerationConfig) -> Option<Self> {
        let command = config.command.as_ref()?;
        let (program, args) = command.split_first()?;
        if program.trim().is_empty() {
            return None;
        }
        Some(Self::new(program.clone(), args.to_vec()))
    }
}

impl TextGenerator for CommandGenerator {
    fn generate(&self, prompt: &str) -> Result<String> {
        let start_time = Instant::now();

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| SkillBridgeError::Generation(format!("Failed to start '{}': {}", self.program, e)))?;

        // Prompt goes in on its own thread while stdout and stderr are drained here
        let writer = child.stdin.take().map(|mut stdin| {
            let prompt = prompt.as_bytes().to_vec();
            thread::spawn(move || stdin.write_all(&prompt))
        });

        let output = child
            .wait_with_output()
            .map_err(|e| SkillBridgeError::Generation(format!("Generator did not finish: {}", e)))?;

        if let Some(writer) = writer {
            let sent = writer
                .join()
                .map_err(|_| SkillBridgeError::Generation("Prompt writer panicked".to_string()))?;
            match sent {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {
                    log::debug!("'{}' closed stdin before reading the full prompt", self.program)
                }
                Err(e) => return Err(SkillBridgeError::Generation(format!("Failed to send prompt: {}", e))),
            }
        }

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SkillBridgeError::Generation(format!(
                "'{}' exited with {}: {}",
                self.program,
                output.status,
                stderr.trim()
            )));
        }

        let text = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if text.is_empty() {
            return Err(SkillBridgeError::Generation(format!("'{}' produced no output", self.program)));
        }

        log::debug!("Generated {} chars in {:.2?}", text.len(), start_time.elapsed());
        Ok(text)
    }

    fn name(&self) -> &str {
        &self.program
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source", content = "text", rename_all = "lowercase")]
pub enum Explanation {
    Generated(String),
    Templated(String),
}

impl Explanation {
    pub fn text(&self) -> &str {
        match self {
            Explanation::Generated(text) | Explanation::Templated(text) => text,
        }
    }

    pub fn is_generated(&self) -> bool {
        matches!(self, Explanation::Generated(_))
    }
}

/// Use generated text when there is some, otherwise the tier template
pub fn select_explanation(generated: Option<String>, result: &MatchResult) -> Explanation {
    match generated.map(|text| text.trim().to_string()).filter(|text| !text.is_empty()) {
        Some(text) => Explanation::Generated(text),
        None => Explanation::Templated(templated_explanation(result)),
    }
}

/// Ask the generator, logging and swallowing its failure
pub fn explain(generator: Option<&dyn TextGenerator>, prompt: &str, result: &MatchResult) -> Explanation {
    let generated = generator.and_then(|generator| match generator.generate(prompt) {
        Ok(text) => Some(text),
        Err(e) => {
            log::warn!("Generator '{}' unavailable, using templated explanation: {}", generator.name(), e);
            None
        }
    });
    select_explanation(generated, result)
}

pub fn templated_explanation(result: &MatchResult) -> String {
    let matched = result.matched_skills.len();
    let total = result.total_required;
    let tier = result.suitability;
    let first_matched = result.matched_skills.iter().take(2).cloned().collect::<Vec<_>>().join(", ");
    let first_missing = result.missing_skills.iter().take(3).cloned().collect::<Vec<_>>().join(", ");

    if result.match_percentage >= 80.0 {
        format!(
            "{} fit! You have {}/{} required skills. Consider deepening expertise in {}.",
            tier, matched, total, first_matched
        )
    } else if result.match_percentage >= 60.0 {
        format!(
            "{} fit. You have {}/{} required skills. Priority: Learn {}.",
            tier, matched, total, first_missing
        )
    } else if result.match_percentage >= 40.0 {
        format!(
            "{} fit. With focused effort, you can bridge the gap. Critical gaps: {}.",
            tier, first_missing
        )
    } else {
        format!(
            "{} fit. This is a significant career shift. Build foundation in: {}. Timeline: 6-12 months.",
            tier, first_missing
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::scorer::{DomainAssessment, Suitability};

    fn result(matched: &[&str], missing: &[&str], percentage: f64) -> MatchResult {
        MatchResult {
            matched_skills: matched.iter().map(|s| s.to_string()).collect(),
            missing_skills: missing.iter().map(|s| s.to_string()).collect(),
            total_required: matched.len() + missing.len(),
            match_percentage: percentage,
            suitability: Suitability::from_percentage(percentage),
            domain: DomainAssessment::default(),
        }
    }

    struct FailingGenerator;

    impl TextGenerator for FailingGenerator {
        fn generate(&self, _prompt: &str) -> Result<String> {
            Err(SkillBridgeError::Generation("offline".to_string()))
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    struct EchoGenerator;

    impl TextGenerator for EchoGenerator {
        fn generate(&self, prompt: &str) -> Result<String> {
            Ok(format!("echo: {}", prompt))
        }

        fn name(&self) -> &str {
            "echo"
        }
    }

    #[test]
    fn test_templates_by_tier() {
        let excellent = result(&["Python", "SQL", "Docker", "AWS"], &["Go"], 80.0);
        assert_eq!(
            templated_explanation(&excellent),
            "Excellent fit! You have 4/5 required skills. Consider deepening expertise in Python, SQL."
        );

        let good = result(&["Python", "SQL", "Docker"], &["Go", "Rust"], 60.0);
        assert_eq!(
            templated_explanation(&good),
            "Good fit. You have 3/5 required skills. Priority: Learn Go, Rust."
        );

        let moderate = result(&["Python", "SQL"], &["NumPy", "Docker"], 50.0);
        assert_eq!(
            templated_explanation(&moderate),
            "Moderate fit. With focused effort, you can bridge the gap. Critical gaps: NumPy, Docker."
        );

        let challenging = result(&[], &["A", "B", "C", "D"], 0.0);
        assert_eq!(
            templated_explanation(&challenging),
            "Challenging fit. This is a significant career shift. Build foundation in: A, B, C. Timeline: 6-12 months."
        );
    }

    #[test]
    fn test_select_explanation() {
        let r = result(&["Python"], &["SQL"], 50.0);
        assert!(select_explanation(Some("Looks promising.".to_string()), &r).is_generated());
        assert!(!select_explanation(Some("   ".to_string()), &r).is_generated());
        assert!(!select_explanation(None, &r).is_generated());
    }

    #[test]
    fn test_explain_falls_back_on_failure() {
        let r = result(&["Python"], &["SQL"], 50.0);

        let fallback = explain(Some(&FailingGenerator), "prompt", &r);
        assert_eq!(fallback, Explanation::Templated(templated_explanation(&r)));

        let generated = explain(Some(&EchoGenerator), "prompt", &r);
        assert_eq!(generated, Explanation::Generated("echo: prompt".to_string()));

        assert!(!explain(None, "prompt", &r).is_generated());
    }

    #[test]
    fn test_command_generator_from_config() {
        assert!(CommandGenerator::from_config(&GenerationConfig { command: None }).is_none());
        assert!(CommandGenerator::from_config(&GenerationConfig { command: Some(vec![]) }).is_none());

        let generator = CommandGenerator::from_config(&GenerationConfig {
            command: Some(vec!["ollama".to_string(), "run".to_string(), "phi3".to_string()]),
        })
        .unwrap();
        assert_eq!(generator.name(), "ollama");
    }

    #[cfg(unix)]
    #[test]
    fn test_command_generator_round_trip() {
        let generator = CommandGenerator::new("cat", Vec::new());
        assert_eq!(generator.generate("hello prompt\n").unwrap(), "hello prompt");

        let failing = CommandGenerator::new("false", Vec::new());
        assert!(matches!(failing.generate("x"), Err(SkillBridgeError::Generation(_))));

        let ignores_stdin = CommandGenerator::new("echo", vec!["fixed answer".to_string()]);
        assert_eq!(ignores_stdin.generate(&"y".repeat(1 << 20)).unwrap(), "fixed answer");
    }

    #[cfg(unix)]
    #[test]
    fn test_command_generator_streams_large_prompt() {
        let prompt = "x".repeat(1 << 20);
        let generator = CommandGenerator::new("cat", Vec::new());

        let text = generator.generate(&prompt).unwrap();
        assert_eq!(text.len(), prompt.len());
    }
}
