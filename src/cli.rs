//! CLI interface for skill bridge

use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "skill-bridge")]
#[command(about = "Skill gap analysis and retrieval-grounded job matching")]
#[command(long_about = "Compare candidate skills with role requirements using fuzzy matching, domain detection and a vector index of job descriptions")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

/// Who is being analysed
#[derive(Args, Debug, Clone)]
pub struct CandidateArgs {
    /// Candidate name
    #[arg(short, long, default_value = "Candidate")]
    pub name: String,

    /// Comma-separated skills, e.g. "Python, SQL, Docker"
    #[arg(short, long)]
    pub skills: String,

    /// Years of professional experience
    #[arg(short, long, default_value_t = 0)]
    pub experience: u32,

    /// Current job title
    #[arg(long)]
    pub current_role: Option<String>,
}

/// How results are presented
#[derive(Args, Debug, Clone)]
pub struct OutputArgs {
    /// Output format: console, json (defaults to the configured format)
    #[arg(short, long)]
    pub output: Option<String>,

    /// Show every missing skill and learning resource
    #[arg(short, long)]
    pub detailed: bool,

    /// Save output to file
    #[arg(long)]
    pub save: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyze the skill gap towards a catalog role
    Gap {
        #[command(flatten)]
        candidate: CandidateArgs,

        /// Target role name
        #[arg(short, long)]
        role: String,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Match a candidate against a job using free texts for domain detection
    Match {
        #[command(flatten)]
        candidate: CandidateArgs,

        /// Target role name
        #[arg(short, long)]
        role: String,

        /// Comma-separated required skills; the catalog role is used otherwise
        #[arg(long)]
        required: Option<String>,

        /// Candidate background text
        #[arg(long, conflicts_with = "candidate_file")]
        candidate_text: Option<String>,

        /// Resume file (TXT, MD)
        #[arg(long)]
        candidate_file: Option<PathBuf>,

        /// Job description text
        #[arg(long, conflicts_with = "job_file")]
        job_text: Option<String>,

        /// Job description file (TXT, MD)
        #[arg(long)]
        job_file: Option<PathBuf>,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Build a learning path towards a catalog role
    Path {
        #[command(flatten)]
        candidate: CandidateArgs,

        /// Target role name
        #[arg(short, long)]
        role: String,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Rank candidates from a resume CSV for one role
    Compare {
        /// Resume CSV (candidate_name, skills, ...)
        #[arg(long)]
        resumes: PathBuf,

        /// Target role name
        #[arg(short, long)]
        role: String,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Vector index management
    Index {
        #[command(subcommand)]
        action: IndexAction,
    },

    /// Show the job descriptions nearest to a query
    Retrieve {
        /// Free text query
        #[arg(short, long, conflicts_with = "skills")]
        query: Option<String>,

        /// Comma-separated skills used as the query
        #[arg(short, long)]
        skills: Option<String>,

        /// Number of records to retrieve
        #[arg(short = 'k', long)]
        top_k: Option<usize>,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Explain a skill gap using the nearest job descriptions as requirements
    Explain {
        /// Comma-separated candidate skills
        #[arg(short, long)]
        skills: String,

        /// Target role text to retrieve for
        #[arg(short, long)]
        role: String,

        /// Number of records to retrieve
        #[arg(short = 'k', long)]
        top_k: Option<usize>,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Ask a career question answered from retrieved job descriptions
    Ask {
        /// The question
        question: String,

        /// Number of records to retrieve
        #[arg(short = 'k', long)]
        top_k: Option<usize>,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Score every candidate against every job and write a CSV
    JobFit {
        /// Resume CSV (candidate_name, skills, ...)
        #[arg(long)]
        resumes: PathBuf,

        /// Job description CSV
        #[arg(long)]
        jobs: PathBuf,

        /// Destination CSV
        #[arg(long, default_value = "job_fit_scores.csv")]
        out: PathBuf,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Show configuration
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Subcommand)]
pub enum IndexAction {
    /// Embed a job description CSV and persist a new index generation
    Build {
        /// Job description CSV
        #[arg(long)]
        jobs: PathBuf,
    },

    /// Show the current index generation
    Info {
        #[command(flatten)]
        output: OutputArgs,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Reset configuration to defaults
    Reset,
}

/// Parse and validate output format
pub fn parse_output_format(format: &str) -> Result<crate::config::OutputFormat, String> {
    match format.to_lowercase().as_str() {
        "console" => Ok(crate::config::OutputFormat::Console),
        "json" => Ok(crate::config::OutputFormat::Json),
        _ => Err(format!("Invalid output format: {}. Supported: console, json", format)),
    }
}

/// Validate file extension
pub fn validate_file_extension(path: &Path, allowed_extensions: &[&str]) -> Result<(), String> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) => {
            if allowed_extensions.contains(&ext.to_lowercase().as_str()) {
                Ok(())
            } else {
                Err(format!(
                    "Unsupported file extension: .{}. Allowed: {}",
                    ext,
                    allowed_extensions.join(", ")
                ))
            }
        }
        None => Err("File has no extension".to_string()),
    }
}
