//! skill-bridge: skill gap analysis and retrieval-grounded job matching

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info, warn};
use skill_bridge::cli::{self, CandidateArgs, Cli, Commands, ConfigAction, IndexAction, OutputArgs};
use skill_bridge::config::Config;
use skill_bridge::error::{Result, SkillBridgeError};
use skill_bridge::input::corpus::{load_job_records, load_profiles};
use skill_bridge::input::{InputManager, RoleCatalog};
use skill_bridge::llm::{CommandGenerator, TextGenerator};
use skill_bridge::output::report::{ComparisonReport, IndexSummary, JobFitSummary, NeighborReport};
use skill_bridge::output::{save_report_to_file, Report, ReportEnvelope, ReportGenerator};
use skill_bridge::processing::analyzer::{AnalysisEngine, JobMatchRequest};
use skill_bridge::processing::embeddings::{self, Embedder};
use skill_bridge::processing::index_store::{IndexStore, SharedIndex};
use skill_bridge::processing::job_fit::{compute_job_fit, write_job_fit_csv};
use skill_bridge::processing::normalizer::split_skill_list;
use skill_bridge::processing::profile::CandidateProfile;
use skill_bridge::processing::retrieval::ContextRetriever;
use skill_bridge::processing::scorer::SkillGapScorer;
use skill_bridge::processing::vector_index::VectorIndex;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;

/// Rows listed in the job fit summary
const JOB_FIT_TOP_ROWS: usize = 10;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let config_path = cli.config.clone().unwrap_or_else(Config::config_path);
    let config = match Config::load_from(&config_path) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = run_command(cli.command, config, config_path).await {
        error!("Command failed: {}", e);
        process::exit(1);
    }
}

async fn run_command(command: Commands, config: Config, config_path: PathBuf) -> Result<()> {
    match command {
        Commands::Gap { candidate, role, output } => {
            let engine = analysis_engine(&config)?;
            let analysis = engine.analyze_gap(&profile_from_args(&candidate), &role)?;
            emit(&config, &output, Report::Gap(analysis))
        }

        Commands::Path { candidate, role, output } => {
            let engine = analysis_engine(&config)?;
            let plan = engine.plan_learning_path(&profile_from_args(&candidate), &role)?;
            emit(&config, &output, Report::LearningPath(plan))
        }

        Commands::Match {
            candidate,
            role,
            required,
            candidate_text,
            candidate_file,
            job_text,
            job_file,
            output,
        } => {
            for path in candidate_file.iter().chain(job_file.iter()) {
                cli::validate_file_extension(path, &["txt", "md"]).map_err(SkillBridgeError::InvalidInput)?;
            }

            let mut input_manager = InputManager::new();
            let candidate_text = input_manager
                .text_or_file(candidate_text.as_deref(), candidate_file.as_deref(), "candidate background")
                .await?;
            let requirement_text = input_manager
                .text_or_file(job_text.as_deref(), job_file.as_deref(), "job description")
                .await?;

            let request = JobMatchRequest {
                candidate_name: candidate.name.clone(),
                current_role: candidate
                    .current_role
                    .clone()
                    .unwrap_or_else(|| "Not specified".to_string()),
                experience_years: candidate.experience,
                candidate_skills: split_skill_list(&candidate.skills),
                candidate_text,
                target_role: role,
                required_skills: required.as_deref().map(split_skill_list),
                requirement_text,
            };

            let engine = analysis_engine(&config)?;
            let report = engine.job_match(&request)?;
            emit(&config, &output, Report::JobMatch(report))
        }

        Commands::Compare { resumes, role, output } => {
            let profiles = load_profiles(&resumes)?;
            let engine = analysis_engine(&config)?;
            let analyses = engine.compare_candidates(&profiles, &role);
            emit(
                &config,
                &output,
                Report::Comparison(ComparisonReport::from_analyses(&role, &analyses)),
            )
        }

        Commands::Index { action } => match action {
            IndexAction::Build { jobs } => build_index(&config, jobs).await,
            IndexAction::Info { output } => {
                let store = index_store(&config);
                let summary = IndexSummary {
                    index_dir: store.root().to_path_buf(),
                    manifest: store.info()?,
                    generations: store.generations()?,
                };
                emit(&config, &output, Report::Index(summary))
            }
        },

        Commands::Retrieve {
            query,
            skills,
            top_k,
            output,
        } => {
            let k = top_k.unwrap_or(config.retrieval.top_k);
            let retriever = open_retriever(&config)?;

            let (query, records) = match (query, skills) {
                (Some(query), _) => {
                    let records = retriever.retrieve_for_text(&query, k)?;
                    (query, records)
                }
                (None, Some(skills)) => {
                    let skills = split_skill_list(&skills);
                    let records = retriever.retrieve_for_skills(&skills, k)?;
                    (skills.join(" "), records)
                }
                (None, None) => {
                    return Err(SkillBridgeError::InvalidInput(
                        "Provide --query or --skills to retrieve".to_string(),
                    ))
                }
            };

            emit(&config, &output, Report::Neighbors(NeighborReport { query, k, records }))
        }

        Commands::Explain {
            skills,
            role,
            top_k,
            output,
        } => {
            let k = top_k.unwrap_or(config.retrieval.top_k);
            let skills = split_skill_list(&skills);
            if skills.is_empty() {
                return Err(SkillBridgeError::InvalidInput("Candidate must have at least one skill".to_string()));
            }

            let retriever = open_retriever(&config)?;
            let rag = retriever.explain_with_context(&skills, &role, k)?;
            emit(&config, &output, Report::Retrieval(rag))
        }

        Commands::Ask { question, top_k, output } => {
            let k = top_k.unwrap_or(config.retrieval.top_k);
            let retriever = open_retriever(&config)?;
            let answer = retriever.answer_question(&question, k)?;
            emit(&config, &output, Report::Answer(answer))
        }

        Commands::JobFit {
            resumes,
            jobs,
            out,
            output,
        } => {
            let profiles = load_profiles(&resumes)?;
            let records = load_job_records(&jobs)?;

            let rows = compute_job_fit(&profiles, &records);
            write_job_fit_csv(&rows, &out)?;

            let summary = JobFitSummary::new(out, profiles.len(), records.len(), &rows, JOB_FIT_TOP_ROWS);
            emit(&config, &output, Report::JobFit(summary))
        }

        Commands::Config { action } => match action {
            Some(ConfigAction::Show) | None => {
                let content = toml::to_string_pretty(&config)
                    .map_err(|e| SkillBridgeError::Configuration(format!("Failed to serialize config: {}", e)))?;
                println!("# {}\n", config_path.display());
                println!("{}", content);
                Ok(())
            }
            Some(ConfigAction::Reset) => {
                Config::default().save_to(&config_path)?;
                println!("Configuration reset to defaults: {}", config_path.display());
                Ok(())
            }
        },
    }
}

fn profile_from_args(candidate: &CandidateArgs) -> CandidateProfile {
    let skills = split_skill_list(&candidate.skills);
    let profile = CandidateProfile::new(candidate.name.clone(), &skills, candidate.experience);
    match &candidate.current_role {
        Some(role) => profile.with_current_role(role.clone()),
        None => profile,
    }
}

fn build_scorer(config: &Config) -> Result<(Arc<RoleCatalog>, Arc<SkillGapScorer>)> {
    let catalog = Arc::new(RoleCatalog::from_config(&config.matching)?);
    let detector = Arc::new(catalog.domain_detector()?);
    let scorer = Arc::new(SkillGapScorer::new(
        detector,
        config.matching.fuzzy_threshold,
        config.matching.domain_penalty,
    ));
    Ok((catalog, scorer))
}

fn build_generator(config: &Config) -> Option<Arc<dyn TextGenerator>> {
    let generator = CommandGenerator::from_config(&config.generation)?;
    info!("Explanations will be generated with '{}'", generator.name());
    Some(Arc::new(generator))
}

fn analysis_engine(config: &Config) -> Result<AnalysisEngine> {
    let (catalog, scorer) = build_scorer(config)?;
    Ok(AnalysisEngine::new(
        catalog,
        scorer,
        build_generator(config),
        config.matching.display_cap,
        config.matching.learning_path_cap,
    ))
}

fn index_store(config: &Config) -> IndexStore {
    IndexStore::new(&config.retrieval.index_dir, config.retrieval.keep_generations)
}

fn open_retriever(config: &Config) -> Result<ContextRetriever> {
    let store = index_store(config);
    let shared = Arc::new(SharedIndex::new());
    shared.load_from(&store)?;

    let embedder = embeddings::from_config(config)?;
    let index = shared.get()?;
    if index.model_name() != embedder.model_name() {
        warn!(
            "Index was built with '{}' but queries use '{}'; rebuild the index if results look off",
            index.model_name(),
            embedder.model_name()
        );
    }

    let (_, scorer) = build_scorer(config)?;
    Ok(ContextRetriever::new(shared, embedder, scorer, build_generator(config)))
}

async fn build_index(config: &Config, jobs: PathBuf) -> Result<()> {
    let records = load_job_records(&jobs)?;

    let embedder: Arc<dyn Embedder> = embeddings::from_config(config)?;
    let batch_size = config.models.batch_size;

    let progress = ProgressBar::new(records.len() as u64);
    progress.set_style(
        ProgressStyle::with_template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} embedded")
            .map_err(|e| SkillBridgeError::Processing(format!("Invalid progress template: {}", e)))?
            .progress_chars("=> "),
    );

    let task_progress = progress.clone();
    let index = tokio::task::spawn_blocking(move || {
        VectorIndex::build_with_progress(records, embedder.as_ref(), batch_size, |done| {
            task_progress.set_position(done as u64)
        })
    })
    .await
    .map_err(|e| SkillBridgeError::Processing(format!("Index build task failed: {}", e)))??;
    progress.finish_and_clear();

    let store = index_store(config);
    let manifest = store.save(&index)?;
    let summary = IndexSummary {
        index_dir: store.root().to_path_buf(),
        manifest,
        generations: store.generations()?,
    };

    let output = OutputArgs {
        output: None,
        detailed: false,
        save: None,
    };
    emit(config, &output, Report::Index(summary))
}

fn emit(config: &Config, output: &OutputArgs, report: Report) -> Result<()> {
    let format = match &output.output {
        Some(format) => cli::parse_output_format(format).map_err(SkillBridgeError::InvalidInput)?,
        None => config.output.format,
    };

    let generator = ReportGenerator::from_config(&config.output, output.detailed, config.matching.display_cap);
    let content = generator.generate_report(&ReportEnvelope::new(report), format)?;

    match &output.save {
        Some(path) => save_report_to_file(&content, path),
        None => {
            println!("{}", content);
            Ok(())
        }
    }
}
