//! Financial Health CLI
//!
//! Terminal front end for the Financial Health assessment:
//! - Take the survey (as a guest or logged in) and view results
//! - Log in with an emailed code and keep guest results
//! - Manage PDPL consent
//! - Download or email reports
//! - Admin analytics and exports

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use finhealth::auth::{migrate_guest_data, AuthError, AuthStore, MigrationOutcome, OtpLogin};
use finhealth::client::{BackendClient, BackendConfig, ClientError, EmailReportRequest};
use finhealth::clinic::{ClinicSubmission, FinancialClinicProfile, FinancialClinicSession};
use finhealth::config::{generate_default_config, Config};
use finhealth::consent::ConsentManager;
use finhealth::localization::{
    ContentKey, ContentLoader, ContentType, Language, LocalizationContext,
};
use finhealth::scoring::{
    get_pillar_display_data, history_series, CustomerProfile, parse_pillar_score, pillar_histogram,
    PillarDisplayData, PillarScore, ScoreCalculation,
};
use finhealth::storage::{keys, LocalStorage};
use finhealth::survey::{Navigation, Question, SurveyFlow};

#[derive(Parser)]
#[command(name = "finhealth")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "UAE Financial Health assessment")]
#[command(long_about = "Take the Financial Health assessment, review your pillar scores and reports,\nand manage consent and admin analytics from the terminal.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: searched in the usual locations)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table", global = true)]
    pub format: OutputFormat,

    /// Show debug logs
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Take the Financial Health survey
    Survey {
        /// One step per pillar instead of fixed-size steps
        #[arg(long)]
        by_pillar: bool,
        /// Questions per step
        #[arg(long, default_value = "5")]
        per_step: usize,
        /// Discard saved progress and start over
        #[arg(long)]
        restart: bool,
        /// Customer profile as JSON
        #[arg(long)]
        profile: Option<PathBuf>,
    },

    /// Take the company-branded Financial Clinic assessment
    Clinic {
        /// Company link slug
        #[arg(long)]
        company: Option<String>,
        /// Clinic profile as JSON (name and email are asked for otherwise)
        #[arg(long)]
        profile: Option<PathBuf>,
        /// Also save the PDF report here
        #[arg(long)]
        pdf: Option<PathBuf>,
    },

    /// Show the latest results
    Results {
        /// Show the Financial Clinic result instead of the survey score
        #[arg(long)]
        clinic: bool,
    },

    /// Show score history (requires login)
    History,

    /// Log in with a code sent by email
    Login {
        /// Email address (asked for otherwise)
        #[arg(long)]
        email: Option<String>,
    },

    /// Log out
    Logout,

    /// Attach guest results to the logged-in account
    Migrate,

    /// Show or change the interface language
    Language {
        /// Language code: en or ar
        code: Option<String>,
    },

    /// Manage PDPL consent
    Consent {
        #[command(subcommand)]
        command: ConsentCommand,
    },

    /// Download or email a report
    Report {
        #[command(subcommand)]
        command: ReportCommand,
    },

    /// Inspect localized content
    Content {
        #[command(subcommand)]
        command: ContentCommand,
    },

    /// Admin analytics
    Admin {
        #[command(subcommand)]
        command: AdminCommand,
    },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum ConsentCommand {
    /// Agree to data processing
    Grant {
        /// Also agree to profiling
        #[arg(long)]
        profiling: bool,
    },
    /// Show the stored consent
    Status {
        /// Also ask the backend
        #[arg(long)]
        remote: bool,
    },
    /// Withdraw consent
    Revoke,
}

#[derive(Subcommand)]
pub enum ReportCommand {
    /// Save the PDF report
    Pdf {
        /// Result id (default: latest result)
        #[arg(long)]
        id: Option<i64>,
        /// Output file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Have the report emailed
    Email {
        /// Result id (default: latest result)
        #[arg(long)]
        id: Option<i64>,
        /// Recipient (default: logged-in email)
        #[arg(long)]
        to: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum ContentCommand {
    /// Show content of a type
    Show {
        /// ui, question, recommendation, pillar or email
        content_type: String,
        /// Only this content id
        #[arg(long)]
        id: Option<String>,
        /// Language (default: current language)
        #[arg(long)]
        lang: Option<String>,
    },
    /// Fetch all content types in both languages
    Preload,
}

#[derive(Subcommand)]
pub enum AdminCommand {
    /// Log in as admin
    Login {
        #[arg(long)]
        username: String,
    },
    /// Forget the admin token
    Logout,
    /// Headline numbers
    Overview,
    /// Distribution of pillar percentages
    Histogram {
        /// Bucket width in percentage points
        #[arg(long, default_value = "10")]
        bucket_width: u32,
    },
    /// Export submissions as CSV
    Export {
        /// Maximum rows
        #[arg(long, default_value = "1000")]
        limit: usize,
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Everything a command needs
struct App {
    config: Config,
    storage: LocalStorage,
    backend: BackendClient,
    auth: AuthStore,
    i18n: LocalizationContext,
    format: OutputFormat,
}

impl App {
    fn new(config: Config, format: OutputFormat) -> Result<Self> {
        let storage = config
            .storage
            .open()
            .context("Failed to open local storage")?;
        let backend = BackendClient::new(config.backend.client_config())?;

        // The loader retries content fetches itself
        let content_client = BackendClient::new(BackendConfig {
            max_retries: 1,
            ..config.backend.client_config()
        })?;
        let loader = Arc::new(ContentLoader::new(
            Arc::new(content_client),
            config.content.loader_config(),
        ));

        Ok(Self {
            auth: AuthStore::new(storage.clone()),
            i18n: LocalizationContext::new(loader, storage.clone()),
            config,
            storage,
            backend,
            format,
        })
    }

    /// Load UI strings; bundled strings are used when this fails
    async fn load_strings(&self) {
        if let Err(e) = self.i18n.initialize().await {
            tracing::warn!(error = %e, "Using bundled strings");
        }
    }

    fn language(&self) -> Language {
        self.i18n.language()
    }

    /// Client for the logged-in user, or a guest client
    fn client(&self) -> BackendClient {
        self.auth
            .user_client(&self.backend)
            .unwrap_or_else(|| self.backend.clone())
    }

    fn require_user(&self) -> Result<BackendClient> {
        self.auth
            .user_client(&self.backend)
            .ok_or_else(|| anyhow!("Not logged in. Run: finhealth-cli login"))
    }

    fn require_admin(&self) -> Result<BackendClient> {
        self.auth
            .admin_client(&self.backend)
            .ok_or_else(|| anyhow!("No admin session. Run: finhealth-cli admin login --username <name>"))
    }

    fn consent(&self) -> ConsentManager {
        ConsentManager::new(self.storage.clone(), Arc::new(self.backend.clone()))
    }

    fn print_json<T: serde::Serialize>(&self, value: &T) -> Result<()> {
        println!("{}", serde_json::to_string_pretty(value)?);
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Commands::Config { output } = &cli.command {
        return write_default_config(output.as_deref());
    }

    let mut config = match &cli.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    };

    config.logging.level = if cli.verbose { "debug" } else { "warn" }.to_string();
    config.logging.init("finhealth")?;

    let app = App::new(config, cli.format)?;

    match cli.command {
        Commands::Survey {
            by_pillar,
            per_step,
            restart,
            profile,
        } => run_survey(&app, by_pillar, per_step, restart, profile.as_deref()).await,
        Commands::Clinic {
            company,
            profile,
            pdf,
        } => run_clinic(&app, company, profile.as_deref(), pdf.as_deref()).await,
        Commands::Results { clinic } => {
            app.load_strings().await;
            show_results(&app, clinic)
        }
        Commands::History => show_history(&app).await,
        Commands::Login { email } => login(&app, email).await,
        Commands::Logout => {
            app.auth.logout()?;
            println!("Logged out");
            Ok(())
        }
        Commands::Migrate => migrate(&app).await,
        Commands::Language { code } => language(&app, code).await,
        Commands::Consent { command } => consent(&app, command).await,
        Commands::Report { command } => report(&app, command).await,
        Commands::Content { command } => content(&app, command).await,
        Commands::Admin { command } => admin(&app, command).await,
        Commands::Config { .. } => Ok(()),
    }
}

fn write_default_config(output: Option<&Path>) -> Result<()> {
    let config = generate_default_config();

    match output {
        Some(path) => {
            // Create parent directory if needed
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, &config)?;
            println!("Config written to {:?}", path);
        }
        None => {
            print!("{}", config);
        }
    }
    Ok(())
}

// ============================================
// Survey
// ============================================

async fn run_survey(
    app: &App,
    by_pillar: bool,
    per_step: usize,
    restart: bool,
    profile: Option<&Path>,
) -> Result<()> {
    app.load_strings().await;

    let consent = app.consent();
    if !consent.has_required_consent() {
        println!("{}", app.i18n.t("consent.required"));
        println!("Run: finhealth-cli consent grant");
        return Ok(());
    }

    let profile = profile.map(read_json::<CustomerProfile>).transpose()?;
    let questions = app.backend.get_questions(app.language()).await?;
    let mut flow = if by_pillar {
        SurveyFlow::by_pillar(questions)?
    } else {
        SurveyFlow::new(questions, per_step)?
    };

    if restart {
        SurveyFlow::clear_progress(&app.storage, keys::SURVEY_PROGRESS)?;
    } else if flow.load_progress(&app.storage, keys::SURVEY_PROGRESS) {
        println!("Resuming saved progress ({:.0}% done)", flow.progress());
    }

    if !answer_steps(app, &mut flow, keys::SURVEY_PROGRESS)? {
        println!("{}", app.i18n.t("survey.saved"));
        return Ok(());
    }

    let submission = flow.submission(profile, app.language(), Some(consent.session_id()?))?;
    let result = app.client().submit_survey(&submission).await?;

    app.storage.set_json(keys::CURRENT_SCORE, &result)?;
    SurveyFlow::clear_progress(&app.storage, keys::SURVEY_PROGRESS)?;

    print_score(app, &result)?;
    if result.is_guest() {
        println!();
        println!("{}", app.i18n.t("results.register_prompt"));
    }
    Ok(())
}

/// Walk the steps interactively, saving under `progress_key`; returns false
/// if the user quit early
fn answer_steps(app: &App, flow: &mut SurveyFlow, progress_key: &str) -> Result<bool> {
    loop {
        let step = (flow.current_step() + 1).to_string();
        let total = flow.total_steps().to_string();
        println!();
        println!(
            "== {} ==",
            app.i18n
                .t_with("survey.progress", &[("current", &step), ("total", &total)])
        );

        let questions: Vec<Question> = flow.current_questions().to_vec();
        let mut go_back = false;

        'questions: for question in &questions {
            println!();
            println!("{}", question.text);
            for option in &question.options {
                let marker = if flow.answer_for(&question.id) == Some(option.value) {
                    "*"
                } else {
                    " "
                };
                println!("  {}{}) {}", marker, option.value, option.label);
            }

            loop {
                let input = prompt("> ")?;
                match input.as_str() {
                    "q" => {
                        flow.save_progress(&app.storage, progress_key)?;
                        return Ok(false);
                    }
                    "b" => {
                        go_back = true;
                        break 'questions;
                    }
                    "" if flow.answer_for(&question.id).is_some() || !question.required => break,
                    _ => match input.parse::<i32>() {
                        Ok(value) => match flow.answer(&question.id, value) {
                            Ok(()) => break,
                            Err(e) => println!("{}", e),
                        },
                        Err(_) => println!("Enter an option number, b to go back or q to quit"),
                    },
                }
            }
        }

        flow.save_progress(&app.storage, progress_key)?;

        if go_back {
            if !flow.back() {
                println!("Already at the first step");
            }
            continue;
        }

        match flow.next() {
            Ok(Navigation::Moved(_)) => continue,
            Ok(Navigation::ReadyToSubmit) => return Ok(true),
            Err(_) => println!("{}", app.i18n.t("survey.answer_all")),
        }
    }
}

async fn run_clinic(
    app: &App,
    company: Option<String>,
    profile: Option<&Path>,
    pdf: Option<&Path>,
) -> Result<()> {
    app.load_strings().await;

    let profile: FinancialClinicProfile = match profile {
        Some(path) => read_json(path)?,
        None => FinancialClinicProfile {
            name: prompt("Name: ")?,
            email: prompt(&format!("{}: ", app.i18n.t("auth.email_label")))?,
            company: company.clone(),
            ..Default::default()
        },
    };

    let questions = app.backend.clinic_questions(app.language()).await?;
    let mut flow = SurveyFlow::by_pillar(questions)?;
    if flow.load_progress(&app.storage, keys::CLINIC_PROGRESS) {
        println!("Resuming saved progress ({:.0}% done)", flow.progress());
    }
    if !answer_steps(app, &mut flow, keys::CLINIC_PROGRESS)? {
        println!("{}", app.i18n.t("survey.saved"));
        return Ok(());
    }

    let submission = ClinicSubmission {
        answers: flow.answers().clone(),
        profile: profile.clone(),
        language: app.language(),
        company_url: company,
    };
    let result = app.backend.submit_clinic(&submission).await?;
    SurveyFlow::clear_progress(&app.storage, keys::CLINIC_PROGRESS)?;

    let session = FinancialClinicSession::new(app.storage.clone());
    session.save(&result, &profile)?;

    if let Some(path) = pdf {
        let bytes = app
            .backend
            .clinic_report_pdf(&submission, app.language())
            .await?;
        std::fs::write(path, bytes)?;
        println!("Report saved to {:?}", path);
    }

    show_results(app, true)
}

fn show_results(app: &App, clinic: bool) -> Result<()> {
    if clinic {
        let Some((result, profile)) = FinancialClinicSession::new(app.storage.clone()).load() else {
            println!("{}", app.i18n.t("results.none"));
            return Ok(());
        };

        if app.format == OutputFormat::Json {
            return app.print_json(&result);
        }

        println!("{} ({})", app.i18n.t("results.title"), profile.name);
        println!("Total: {:.0} - {}", result.total_score, result.status_band);
        println!();
        print_pillars(app, &result.display_data());

        let insights = result.prioritized_insights();
        if !insights.is_empty() {
            println!();
            println!("Insights:");
            for insight in insights {
                println!("  [{}] {}", insight.category, insight.text);
            }
        }
        if !result.products.is_empty() {
            println!();
            println!("Suggested products:");
            for product in &result.products {
                println!("  - {}", product.name);
            }
        }
        return Ok(());
    }

    match app.storage.get_json::<ScoreCalculation>(keys::CURRENT_SCORE) {
        Some(result) => print_score(app, &result),
        None => {
            println!("{}", app.i18n.t("results.none"));
            Ok(())
        }
    }
}

fn print_score(app: &App, result: &ScoreCalculation) -> Result<()> {
    if app.format == OutputFormat::Json {
        return app.print_json(result);
    }

    println!();
    println!("{}", app.i18n.t("results.title"));
    let overall = format!("{:.0}", result.overall_percentage());
    println!("{}", app.i18n.t_with("results.overall", &[("score", &overall)]));
    println!();

    let pillars: Vec<PillarDisplayData> = result
        .pillar_scores
        .iter()
        .map(get_pillar_display_data)
        .collect();
    print_pillars(app, &pillars);

    if !result.advice.is_empty() {
        println!();
        for advice in &result.advice {
            println!("  - {}", advice);
        }
    }
    Ok(())
}

fn print_pillars(app: &App, pillars: &[PillarDisplayData]) {
    println!("{:<28} {:>6}  {}", "Pillar", "Score", "");
    println!("{}", "-".repeat(60));
    for pillar in pillars {
        println!(
            "{:<28} {:>5}%  {} {}",
            pillar.display_name,
            pillar.rounded_percentage,
            bar(pillar.percentage, 20),
            app.i18n.t(pillar.interpretation.translation_key())
        );
    }
}

fn bar(percentage: f64, width: usize) -> String {
    let filled = ((percentage / 100.0) * width as f64).round() as usize;
    format!("{}{}", "#".repeat(filled.min(width)), ".".repeat(width - filled.min(width)))
}

async fn show_history(app: &App) -> Result<()> {
    let client = app.require_user()?;
    let results = client.survey_history().await?;
    let series = history_series(&results);

    if app.format == OutputFormat::Json {
        return app.print_json(&series);
    }

    if results.is_empty() {
        println!("{}", app.i18n.t("results.none"));
        return Ok(());
    }

    println!("{:<28} {:>7} {:>8} {:>8}", "Series", "Points", "Latest", "Trend");
    println!("{}", "-".repeat(55));
    for s in &series {
        let latest = s
            .points
            .last()
            .map(|p| format!("{:.0}%", p.percentage))
            .unwrap_or_else(|| "-".to_string());
        let trend = s
            .trend()
            .map(|t| format!("{:+.0}", t))
            .unwrap_or_else(|| "-".to_string());
        println!("{:<28} {:>7} {:>8} {:>8}", s.display_name, s.points.len(), latest, trend);
    }
    Ok(())
}

// ============================================
// Auth
// ============================================

async fn login(app: &App, email: Option<String>) -> Result<()> {
    app.load_strings().await;

    let mut flow = OtpLogin::new(
        Arc::new(app.backend.clone()),
        app.config.auth.otp_config(),
        app.language(),
    );

    let mut email = email;
    request_code(app, &mut flow, email.take()).await?;

    let session = loop {
        if let Some(remaining) = flow.remaining() {
            let minutes = (remaining.as_secs() / 60).to_string();
            let seconds = format!("{:02}", remaining.as_secs() % 60);
            println!(
                "{}",
                app.i18n.t_with(
                    "auth.code_expires_in",
                    &[("minutes", &minutes), ("seconds", &seconds)]
                )
            );
        }

        let input = prompt(&format!(
            "{} (r = {}, b = back): ",
            app.i18n.t("auth.code_label"),
            app.i18n.t("auth.resend")
        ))?;

        match input.as_str() {
            "r" => match flow.resend().await {
                Ok(()) => println!("Code sent again"),
                Err(AuthError::ResendCooldown { seconds }) => {
                    let seconds = seconds.to_string();
                    println!("{}", app.i18n.t_with("auth.resend_in", &[("seconds", &seconds)]));
                }
                Err(e) => return Err(e.into()),
            },
            "b" => {
                flow.back_to_email();
                request_code(app, &mut flow, None).await?;
            }
            code => match flow.verify(code).await {
                Ok(session) => break session,
                Err(AuthError::InvalidCode(_)) => println!("{}", app.i18n.t("auth.invalid_code")),
                Err(AuthError::CodeExpired) => println!("Code expired, type r for a new one"),
                Err(AuthError::Client(ClientError::ApiError { message, .. })) => {
                    println!("{}", message)
                }
                Err(AuthError::Client(ClientError::Unauthorized)) => {
                    println!("Incorrect code")
                }
                Err(e) => return Err(e.into()),
            },
        }
    };

    app.auth.save_session(&session)?;
    println!("Logged in as {}", session.email);

    let client = app.backend.with_token(session.access_token);
    match migrate_guest_data(&client, &app.storage).await {
        Ok(MigrationOutcome::Migrated { results }) => {
            println!("Saved {} guest result(s) to your account", results)
        }
        Ok(MigrationOutcome::NothingToMigrate) => {}
        Err(e) => {
            println!("Could not save guest results yet: {}", e);
            println!("Run: finhealth-cli migrate");
        }
    }
    Ok(())
}

/// Ask for an email until the backend accepts a code request
async fn request_code(app: &App, flow: &mut OtpLogin, mut email: Option<String>) -> Result<()> {
    loop {
        let address = match email.take() {
            Some(address) => address,
            None => prompt(&format!("{}: ", app.i18n.t("auth.email_label")))?,
        };

        match flow.request_code(&address).await {
            Ok(()) => {
                let sent_to = flow.email().unwrap_or_default().to_string();
                println!("{}", app.i18n.t_with("auth.code_sent", &[("email", &sent_to)]));
                return Ok(());
            }
            Err(AuthError::InvalidEmail(_)) => println!("{}", app.i18n.t("auth.invalid_email")),
            Err(e) => return Err(e.into()),
        }
    }
}

async fn migrate(app: &App) -> Result<()> {
    let client = app.require_user()?;
    match migrate_guest_data(&client, &app.storage).await? {
        MigrationOutcome::Migrated { results } => {
            println!("Saved {} guest result(s) to your account", results)
        }
        MigrationOutcome::NothingToMigrate => println!("No guest results to save"),
    }
    Ok(())
}

async fn language(app: &App, code: Option<String>) -> Result<()> {
    match code {
        Some(code) => {
            let language: Language = code.parse()?;
            let origin = app.i18n.set_language(language).await?;
            tracing::debug!(?origin, "Strings loaded");
            println!(
                "Language set to {} ({})",
                language.native_name(),
                app.i18n.direction().as_str()
            );
        }
        None => {
            let language = app.language();
            println!("{} ({})", language.native_name(), language.code());
        }
    }
    Ok(())
}

// ============================================
// Consent
// ============================================

async fn consent(app: &App, command: ConsentCommand) -> Result<()> {
    let manager = app.consent();

    match command {
        ConsentCommand::Grant { profiling } => {
            app.load_strings().await;
            println!("{}", app.i18n.t("consent.title"));
            println!("  [x] {}", app.i18n.t("consent.data_processing"));
            println!(
                "  [{}] {}",
                if profiling { "x" } else { " " },
                app.i18n.t("consent.profiling")
            );

            let outcome = manager.grant(profiling, true, app.language()).await?;
            if outcome.synced {
                println!("Consent recorded");
            } else {
                println!("Consent saved locally; the server could not be reached");
            }
        }
        ConsentCommand::Status { remote } => {
            let local = manager.current();
            if app.format == OutputFormat::Json && !remote {
                return app.print_json(&local);
            }

            match &local {
                Some(c) => println!(
                    "Data processing: {}  Profiling: {}  Given: {}  Session: {}",
                    yes_no(c.data_processing),
                    yes_no(c.profiling),
                    c.timestamp.format("%Y-%m-%d"),
                    c.session_id
                ),
                None => println!("No valid consent on this device"),
            }

            if remote {
                match manager.remote_status().await? {
                    Some(c) => println!(
                        "Server: data processing {}, profiling {}",
                        yes_no(c.data_processing),
                        yes_no(c.profiling)
                    ),
                    None => println!("Server: no consent recorded"),
                }
            }
        }
        ConsentCommand::Revoke => {
            if manager.revoke().await? {
                println!("Consent withdrawn");
            } else {
                println!("Consent removed locally; the server could not be reached");
            }
        }
    }
    Ok(())
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}

// ============================================
// Reports
// ============================================

fn latest_result_id(app: &App, id: Option<i64>) -> Result<i64> {
    id.or_else(|| {
        app.storage
            .get_json::<ScoreCalculation>(keys::CURRENT_SCORE)
            .map(|r| r.id)
    })
    .ok_or_else(|| anyhow!("No result to report on; pass --id or take the survey first"))
}

async fn report(app: &App, command: ReportCommand) -> Result<()> {
    let client = app.client();

    match command {
        ReportCommand::Pdf { id, output } => {
            let id = latest_result_id(app, id)?;
            let bytes = client.download_report_pdf(id, app.language()).await?;
            let path = output
                .unwrap_or_else(|| PathBuf::from(format!("financial-health-report-{}.pdf", id)));
            std::fs::write(&path, bytes)?;
            println!("Report saved to {:?}", path);
        }
        ReportCommand::Email { id, to } => {
            let id = latest_result_id(app, id)?;
            let email = to
                .or_else(|| app.auth.session().map(|s| s.email))
                .ok_or_else(|| anyhow!("Pass --to or log in first"))?;

            app.load_strings().await;
            let request = EmailReportRequest {
                email: email.clone(),
                language: app.language(),
            };
            let response = client.email_report(id, &request).await?;
            if response.sent {
                println!("{}", app.i18n.t_with("report.email_sent", &[("email", &email)]));
            } else {
                bail!("Report was not sent: {}", response.message);
            }
        }
    }
    Ok(())
}

// ============================================
// Content
// ============================================

async fn content(app: &App, command: ContentCommand) -> Result<()> {
    let loader = app.i18n.loader();

    match command {
        ContentCommand::Show {
            content_type,
            id,
            lang,
        } => {
            let content_type: ContentType = content_type.parse()?;
            let language = match lang {
                Some(code) => code.parse()?,
                None => app.language(),
            };

            if let Some(id) = id {
                let item = loader
                    .get_content(content_type, &id, language)
                    .await?
                    .ok_or_else(|| anyhow!("No {} content '{}' in {}", content_type, id, language))?;
                return app.print_json(&item);
            }

            let loaded = loader.load_content_by_type(content_type, language).await?;
            if app.format == OutputFormat::Json {
                return app.print_json(&*loaded.items);
            }

            println!("{} items ({:?})", loaded.items.len(), loaded.origin);
            for item in loaded.items.iter() {
                println!("{:<32} {}", item.content_id, item.text);
            }
        }
        ContentCommand::Preload => {
            let keys: Vec<ContentKey> = Language::ALL
                .into_iter()
                .flat_map(|language| {
                    ContentType::ALL
                        .into_iter()
                        .map(move |content_type| ContentKey::new(content_type, language))
                })
                .collect();

            let report = loader.preload(&keys).await;
            if app.format == OutputFormat::Json {
                return app.print_json(&report);
            }

            println!("Loaded:   {}", report.loaded.len());
            println!("Fallback: {}", report.fallback.len());
            println!("Failed:   {}", report.failed.len());
            for key in &report.failed {
                println!("  {}", key);
            }
        }
    }
    Ok(())
}

// ============================================
// Admin
// ============================================

async fn admin(app: &App, command: AdminCommand) -> Result<()> {
    match command {
        AdminCommand::Login { username } => {
            let password = prompt("Password: ")?;
            let response = app.backend.admin_login(&username, &password).await?;
            app.auth.save_admin_token(&response.access_token)?;
            println!("Admin session saved");
        }
        AdminCommand::Logout => {
            app.auth.clear_admin_token()?;
            println!("Admin session removed");
        }
        AdminCommand::Overview => {
            let overview = app.require_admin()?.admin_overview().await?;
            if app.format == OutputFormat::Json {
                return app.print_json(&overview);
            }
            println!("Submissions:        {}", overview.total_submissions);
            println!("  guest:            {}", overview.guest_submissions);
            println!("  last 30 days:     {}", overview.submissions_last_30_days);
            println!("Registered users:   {}", overview.registered_users);
            println!("Average score:      {:.1}", overview.average_score);
        }
        AdminCommand::Histogram { bucket_width } => {
            let rows = app.require_admin()?.admin_pillar_scores().await?;
            let scores: Vec<PillarScore> = rows.iter().filter_map(parse_pillar_score).collect();
            let unparsed = rows.len() - scores.len();
            let histograms = pillar_histogram(&scores, bucket_width);

            if app.format == OutputFormat::Json {
                return app.print_json(&histograms);
            }

            for histogram in &histograms {
                println!();
                println!(
                    "{} (n={}, mean {:.1}%)",
                    histogram.display_name, histogram.total, histogram.mean
                );
                let peak = histogram.buckets.iter().map(|b| b.count).max().unwrap_or(0);
                for bucket in &histogram.buckets {
                    let share = if peak == 0 {
                        0.0
                    } else {
                        bucket.count as f64 * 100.0 / peak as f64
                    };
                    println!(
                        "  {:>3}-{:<3} {:>5} {}",
                        bucket.start,
                        bucket.end,
                        bucket.count,
                        bar(share, 30)
                    );
                }
            }
            if unparsed > 0 {
                println!();
                println!("{} row(s) without a usable score were skipped", unparsed);
            }
        }
        AdminCommand::Export { limit, output } => {
            let rows = app.require_admin()?.admin_submissions(limit).await?;

            let count = rows.len();
            match &output {
                Some(path) => {
                    let mut writer = csv::Writer::from_path(path)?;
                    for row in &rows {
                        writer.serialize(row)?;
                    }
                    writer.flush()?;
                    println!("Exported {} submissions to {:?}", count, path);
                }
                None => {
                    let mut writer = csv::Writer::from_writer(std::io::stdout());
                    for row in &rows {
                        writer.serialize(row)?;
                    }
                    writer.flush()?;
                }
            }
        }
    }
    Ok(())
}

// ============================================
// Helpers
// ============================================

fn prompt(label: &str) -> Result<String> {
    print!("{}", label);
    std::io::stdout().flush()?;

    let mut line = String::new();
    if std::io::stdin().lock().read_line(&mut line)? == 0 {
        bail!("Input closed");
    }
    Ok(line.trim().to_string())
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let text = std::fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))?;
    serde_json::from_str(&text).with_context(|| format!("Invalid JSON in {:?}", path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses() {
        let cli = Cli::try_parse_from(["finhealth", "survey", "--by-pillar"]).unwrap();
        assert!(matches!(cli.command, Commands::Survey { by_pillar: true, .. }));

        let cli = Cli::try_parse_from(["finhealth", "--format", "json", "admin", "histogram"]).unwrap();
        assert!(cli.format == OutputFormat::Json);
        assert!(matches!(
            cli.command,
            Commands::Admin {
                command: AdminCommand::Histogram { bucket_width: 10 }
            }
        ));

        assert!(Cli::try_parse_from(["finhealth", "consent", "grant", "--profiling"]).is_ok());
        assert!(Cli::try_parse_from(["finhealth", "report", "pdf", "--id", "12"]).is_ok());
    }

    #[test]
    fn test_bar() {
        assert_eq!(bar(50.0, 10), "#####.....");
        assert_eq!(bar(100.0, 4), "####");
        assert_eq!(bar(0.0, 4), "....");
    }
}
