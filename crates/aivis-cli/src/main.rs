use std::path::PathBuf;
use std::sync::Arc;

use aivis_core::{load_company_profile, AppConfig, CompanyProfile};
use aivis_providers::ProviderGateway;
use aivis_visibility::{generate_questions, run_analysis, AnalysisSettings};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "aivis-cli")]
#[command(about = "AI visibility analysis command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run a full analysis and print the report as JSON.
    Analyze {
        #[command(flatten)]
        profile: ProfileArgs,
        /// Number of questions to generate (overrides `AIVIS_QUESTION_COUNT`).
        #[arg(long)]
        questions: Option<usize>,
        /// Score with the keyword heuristic only.
        #[arg(long)]
        heuristic_only: bool,
    },
    /// Generate and print the customer questions without asking providers.
    Questions {
        #[command(flatten)]
        profile: ProfileArgs,
        #[arg(long)]
        count: Option<usize>,
    },
}

/// Company profile from a YAML/JSON file or inline flags.
#[derive(Debug, Args)]
struct ProfileArgs {
    /// Path to a company profile file.
    #[arg(long, conflicts_with = "name")]
    profile: Option<PathBuf>,
    #[arg(long, required_unless_present = "profile")]
    name: Option<String>,
    #[arg(long, default_value = "")]
    description: String,
    /// Service offered; repeat for several.
    #[arg(long = "service")]
    services: Vec<String>,
    #[arg(long)]
    website: Option<String>,
    /// Target language such as `en` or `de`; region tags like `de-DE` reduce
    /// to the language. Repeat for several.
    #[arg(long = "locale")]
    locales: Vec<String>,
}

impl ProfileArgs {
    fn into_profile(self) -> anyhow::Result<CompanyProfile> {
        if let Some(path) = self.profile {
            return Ok(load_company_profile(&path)?);
        }

        Ok(CompanyProfile {
            name: self.name.unwrap_or_default(),
            description: self.description,
            services: self.services,
            website: self.website,
            target_locales: self.locales,
        })
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = aivis_core::load_app_config()?;
    init_tracing(&config)?;

    let gateway = Arc::new(ProviderGateway::new(&config.providers)?);

    match cli.command {
        Commands::Analyze {
            profile,
            questions,
            heuristic_only,
        } => {
            let profile = profile.into_profile()?;
            let settings = analysis_settings(&config, questions, heuristic_only);
            let report = run_analysis(gateway, &settings, &profile).await?;
            tracing::info!(
                company = %report.company.name,
                insights = report.insights.len(),
                "analysis complete"
            );
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::Questions { profile, count } => {
            let company = profile.into_profile()?.normalized()?;
            let questions = generate_questions(
                gateway.as_ref(),
                &company,
                count.unwrap_or(config.question_count),
            )
            .await;
            println!("{}", serde_json::to_string_pretty(&questions)?);
        }
    }

    Ok(())
}

/// Logs go to stderr so stdout stays machine-readable.
fn init_tracing(config: &AppConfig) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

fn analysis_settings(
    config: &AppConfig,
    question_count: Option<usize>,
    heuristic_only: bool,
) -> AnalysisSettings {
    let mut settings = AnalysisSettings::from(config);
    if let Some(count) = question_count {
        settings.question_count = count;
    }
    if heuristic_only {
        settings.scoring.enabled = false;
    }
    settings
}
