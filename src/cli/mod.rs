//! Depscreen CLI Module
//!
//! Command-line interface for training the screening model, assessing
//! individual survey responses and batch-scoring datasets.

use clap::{Args, Parser, Subcommand};
use colored::*;
use polars::prelude::*;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::error::Result;
use crate::inference::{Assessment, ScoringEngine};
use crate::schema::{Department, FeatureRecord, Reason, TARGET_COLUMN};
use crate::training::{ForestParams, ParamGrid, Trainer, TrainingConfig};

/// Artifact path used when none is given
pub const DEFAULT_MODEL_PATH: &str = "dependency_model.json";

/// Survey dataset path used when none is given
pub const DEFAULT_DATA_PATH: &str = "chatgpt_dependency_dataset.csv";

// ─── Styling helpers ───────────────────────────────────────────────────────────

const W: usize = 58; // box inner width

fn dim(s: &str) -> ColoredString   { s.truecolor(100, 100, 100) }
fn accent(s: &str) -> ColoredString { s.truecolor(120, 170, 255) }
fn muted(s: &str) -> ColoredString  { s.truecolor(140, 140, 140) }
fn ok(s: &str) -> ColoredString     { s.truecolor(100, 210, 120) }
fn warn(s: &str) -> ColoredString   { s.truecolor(235, 160, 80) }

fn line_box_top()    { println!("  {}", dim("┌─────────────────────────────────────────────────────────┐")); }
fn line_box_bottom() { println!("  {}", dim("└─────────────────────────────────────────────────────────┘")); }

fn line_box(content: &str) {
    let visible_len = strip_ansi(content).chars().count();
    let pad = if visible_len < W { W - visible_len } else { 0 };
    println!("  {}  {}{} {}", dim("│"), content, " ".repeat(pad), dim("│"));
}

fn line_box_center(content: &str) {
    let visible_len = strip_ansi(content).chars().count();
    let total_pad = if visible_len < W { W - visible_len } else { 0 };
    let left = total_pad / 2;
    let right = total_pad - left;
    println!("  {}  {}{}{} {}", dim("│"), " ".repeat(left), content, " ".repeat(right), dim("│"));
}

fn line_box_empty() { line_box(""); }

fn strip_ansi(s: &str) -> String {
    let mut out = String::new();
    let mut in_escape = false;
    for c in s.chars() {
        if c == '\x1b' { in_escape = true; continue; }
        if in_escape { if c == 'm' { in_escape = false; } continue; }
        out.push(c);
    }
    out
}

fn kv(key: &str, val: &str) -> String {
    format!("{} {}", muted(key), val.white())
}

fn step_ok(msg: &str) {
    println!("  {} {}", ok("✓"), msg);
}

fn step_run(msg: &str) {
    print!("  {} {}... ", accent("›"), msg);
}

fn step_done(detail: &str) {
    println!("{} {}", ok("done"), dim(detail));
}

fn section(title: &str) {
    println!();
    println!("  {}", title.white().bold());
    println!("  {}", dim(&"─".repeat(56)));
}

// ─── CLI definition ────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "depscreen")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "ChatGPT dependency screening for engineering students")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Survey answers supplied on the command line
#[derive(Args, Debug)]
pub struct RecordArgs {
    /// ChatGPT sessions per week (0-50)
    #[arg(long, default_value_t = 3)]
    pub usage: u32,

    /// Average minutes per session (0-300)
    #[arg(long, default_value_t = 30)]
    pub duration: u32,

    /// Attempts before asking ChatGPT (0-20)
    #[arg(long, default_value_t = 2)]
    pub attempts: u32,

    /// Confidence in solving alone (1-5)
    #[arg(long, default_value_t = 3)]
    pub confidence: u8,

    /// Peer usage influence (1-5)
    #[arg(long, default_value_t = 3)]
    pub peer_influence: u8,

    /// Main reason for using ChatGPT (No idea, Save time, Better answers)
    #[arg(long, default_value = "No idea")]
    pub reason: String,

    /// CGPA (0.0-10.0)
    #[arg(long, default_value_t = 7.5)]
    pub cgpa: f64,

    /// Department (MECH, EXTC, COMPUTER, IT, ELECTRICAL, CIVIL)
    #[arg(long, default_value = "MECH")]
    pub department: String,

    /// Has used AI tools other than ChatGPT
    #[arg(long)]
    pub other_ai_tools: bool,

    /// Prefers ChatGPT over Google search
    #[arg(long)]
    pub prefer_over_google: bool,
}

impl RecordArgs {
    pub fn to_record(&self) -> Result<FeatureRecord> {
        Ok(FeatureRecord {
            chatgpt_usage_frequency_per_week: self.usage,
            average_duration_per_session_minutes: self.duration,
            attempt_before_chatgpt: self.attempts,
            confidence_in_solving_alone: self.confidence,
            peer_usage_influence: self.peer_influence,
            reason_for_using_chatgpt: self.reason.parse()?,
            cgpa: self.cgpa,
            department: self.department.parse()?,
            used_other_ai_tools: self.other_ai_tools as u8,
            chatgpt_preferred_over_google: self.prefer_over_google as u8,
        })
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Train the screening model on a survey dataset
    Train {
        /// Input survey CSV
        #[arg(short, long, default_value = DEFAULT_DATA_PATH)]
        data: PathBuf,

        /// Output model artifact
        #[arg(short, long, default_value = DEFAULT_MODEL_PATH)]
        output: PathBuf,

        /// Fraction of rows held out for evaluation
        #[arg(long, default_value_t = 0.2)]
        test_split: f64,

        /// Random seed for the split and the forest
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Number of trees in the forest
        #[arg(long, default_value_t = 100)]
        trees: usize,

        /// Maximum tree depth (unlimited when omitted)
        #[arg(long)]
        max_depth: Option<usize>,

        /// Grid-search hyperparameters before the final fit
        #[arg(long)]
        tune: bool,

        /// Cross-validation folds used by --tune
        #[arg(long, default_value_t = 5)]
        cv_folds: usize,
    },

    /// Assess one survey response given as flags
    Assess {
        /// Trained model artifact
        #[arg(short, long, default_value = DEFAULT_MODEL_PATH)]
        model: PathBuf,

        #[command(flatten)]
        record: RecordArgs,

        /// Print the feature importance chart
        #[arg(long)]
        chart: bool,
    },

    /// Score every row of a survey CSV
    Predict {
        /// Trained model artifact
        #[arg(short, long, default_value = DEFAULT_MODEL_PATH)]
        model: PathBuf,

        /// Input data file
        #[arg(short, long)]
        data: PathBuf,

        /// Output CSV with verdict and probability columns
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show survey dataset information
    Info {
        /// Input data file
        #[arg(short, long)]
        data: PathBuf,
    },
}

// ─── Data loading ──────────────────────────────────────────────────────────────

pub fn load_data(path: &PathBuf) -> anyhow::Result<DataFrame> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

    let df = match ext {
        "csv" => CsvReadOptions::default()
            .with_infer_schema_length(Some(1000))
            .with_has_header(true)
            .try_into_reader_with_file_path(Some(path.clone()))?
            .finish()?,
        _ => anyhow::bail!("Unsupported file format: {} (expected csv)", ext),
    };

    Ok(df)
}

// ─── Commands ──────────────────────────────────────────────────────────────────

#[allow(clippy::too_many_arguments)]
pub fn cmd_train(
    data_path: &PathBuf,
    output: &PathBuf,
    test_split: f64,
    seed: u64,
    trees: usize,
    max_depth: Option<usize>,
    tune: bool,
    cv_folds: usize,
) -> anyhow::Result<()> {
    section("Train");

    step_run("Loading data");
    let start = Instant::now();
    let df = load_data(data_path)?;
    step_done(&format!("{} rows × {} cols in {:?}", df.height(), df.width(), start.elapsed()));

    let mut config = TrainingConfig::new()
        .with_test_split(test_split)
        .with_random_state(seed)
        .with_params(ForestParams {
            n_estimators: trees,
            max_depth,
            ..ForestParams::default()
        });
    if tune {
        config = config.with_tuning(ParamGrid::default()).with_cv_folds(cv_folds);
    }

    step_run(&format!("Training {}", "random forest".cyan()));
    let start = Instant::now();
    let outcome = Trainer::new(config).train(&df)?;
    step_done(&format!("{:?}", start.elapsed()));

    if let Some(tuning) = &outcome.report.tuning {
        let best = tuning.best_params();
        println!(
            "  {} {} {}",
            ok("best"),
            format!(
                "{} trees, depth {}",
                best.n_estimators,
                best.max_depth.map_or("unlimited".to_string(), |d| d.to_string())
            )
            .white()
            .bold(),
            muted(&format!("mean F1: {:.4}", tuning.best_score())),
        );
    }

    println!();
    println!("  {:<16} {}", muted("Accuracy"), format!("{:.4}", outcome.report.metrics.accuracy).white().bold());
    println!("  {:<16} {}", muted("Precision"), format!("{:.4}", outcome.report.metrics.precision).white());
    println!("  {:<16} {}", muted("Recall"), format!("{:.4}", outcome.report.metrics.recall).white());
    println!("  {:<16} {}", muted("F1"), format!("{:.4}", outcome.report.metrics.f1_score).white());
    println!();

    for line in outcome.report.metrics.classification_report().lines() {
        println!("  {}", line);
    }

    render_importance_chart(&outcome.model.feature_importances()?);

    println!();
    outcome.model.save(output)?;
    step_ok(&format!("artifact written → {}", output.display()));
    println!();

    Ok(())
}

pub fn cmd_assess(model_path: &PathBuf, record: &FeatureRecord, chart: bool) -> anyhow::Result<()> {
    let engine = ScoringEngine::load(model_path)?;
    let assessment = engine.assess(record)?;

    render_assessment(&assessment);
    if chart {
        render_importance_chart(&engine.feature_importances()?);
    }
    println!();

    Ok(())
}

pub fn cmd_predict(
    model_path: &PathBuf,
    data_path: &PathBuf,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    section("Predict");

    step_run("Loading model");
    let engine = ScoringEngine::load(model_path)?;
    step_done(&format!("{} trees", engine.model().forest().n_trees()));

    step_run("Loading data");
    let df = load_data(data_path)?;
    step_done(&format!("{} rows × {} cols", df.height(), df.width()));

    step_run("Scoring");
    let start = Instant::now();
    let labels = engine.model().predict(&df)?;
    let probabilities = engine.model().dependent_probability(&df)?;
    step_done(&format!("{:?}", start.elapsed()));

    let n_dependent = labels.iter().filter(|l| l.is_dependent()).count();
    println!();
    println!("  {:<16} {}", muted("Dependent"), n_dependent);
    println!("  {:<16} {}", muted("Not dependent"), labels.len() - n_dependent);

    if let Some(path) = output {
        let mut out = df.clone();
        let preds: Vec<i64> = labels.iter().map(|l| l.is_dependent() as i64).collect();
        out.with_column(Series::new("chatgpt_dependence_pred".into(), preds))?;
        out.with_column(Series::new("dependent_probability".into(), probabilities))?;

        println!();
        step_run(&format!("Saving → {}", path.display()));
        let mut file = std::fs::File::create(path)?;
        CsvWriter::new(&mut file).finish(&mut out)?;
        step_done(&format!("{} rows", out.height()));
    }

    println!();
    Ok(())
}

pub fn cmd_info(data_path: &PathBuf) -> anyhow::Result<()> {
    section("Data Info");

    let df = load_data(data_path)?;

    println!("  {:<12} {}", muted("File"), data_path.display());
    println!("  {:<12} {}", muted("Rows"), df.height());
    println!("  {:<12} {}", muted("Columns"), df.width());
    println!("  {:<12} {:.2} MB", muted("Memory"), df.estimated_size() as f64 / 1024.0 / 1024.0);
    println!();

    println!("  {:<38} {:<12} {:>6} {:>8}", muted("Column"), muted("Type"), muted("Nulls"), muted("Unique"));
    println!("  {}", dim(&"─".repeat(68)));

    for col in df.get_columns() {
        println!(
            "  {:<38} {:<12} {:>6} {:>8}",
            col.name(),
            format!("{:?}", col.dtype()).truecolor(140, 140, 140),
            col.null_count(),
            col.n_unique().unwrap_or(0)
        );
    }

    if let Ok(target) = df.column(TARGET_COLUMN) {
        if let Ok(cast) = target.cast(&DataType::Float64) {
            if let Ok(ca) = cast.f64() {
                let dependent = ca.into_iter().flatten().filter(|&v| v == 1.0).count();
                println!();
                println!("  {:<16} {}", muted("Dependent"), dependent);
                println!("  {:<16} {}", muted("Not dependent"), df.height() - dependent);
            }
        }
    }

    println!();
    Ok(())
}

// ─── Assessment rendering ──────────────────────────────────────────────────────

fn render_assessment(assessment: &Assessment) {
    let verdict = if assessment.label.is_dependent() {
        format!("{}", warn("Dependent").bold())
    } else {
        format!("{}", ok("Not dependent").bold())
    };

    println!();
    line_box_top();
    line_box_empty();
    line_box_center(&verdict);
    line_box_center(&format!(
        "{}",
        dim(&format!("dependent probability {:.2}", assessment.probability))
    ));
    line_box_empty();
    line_box_bottom();

    if !assessment.tips.is_empty() {
        section("Tips");
        for tip in &assessment.tips {
            println!("  {} {}", accent("›"), tip.message());
        }
    }

    section("Guidance");
    for item in &assessment.guidance {
        println!("  {} {}", muted("·"), item);
    }
}

fn render_importance_chart(importances: &[(String, f64)]) {
    section("Feature Importance");

    let max = importances.first().map(|(_, v)| *v).unwrap_or(0.0);
    for (name, value) in importances {
        let width = if max > 0.0 {
            ((value / max) * 30.0).round() as usize
        } else {
            0
        };
        println!(
            "  {:<38} {} {}",
            name,
            accent(&"█".repeat(width)),
            muted(&format!("{:.4}", value))
        );
    }
}

// ─── Interactive mode ──────────────────────────────────────────────────────────

fn print_banner() {
    println!();
    println!();
    println!("       {}", "╺┳┓┏━╸┏━┓┏━┓┏━╸┏━┓┏━╸┏━╸┏┓╻".truecolor(120, 170, 255));
    println!("       {}", " ┃┃┣╸ ┣━┛┗━┓┃  ┣┳┛┣╸ ┣╸ ┃┗┫".truecolor(100, 150, 240));
    println!("       {}", "╺┻┛┗━╸╹  ┗━┛┗━╸╹┗╸┗━╸┗━╸╹ ╹".truecolor(80, 130, 220));
    println!();
    println!("       {}", dim(&format!("ChatGPT Dependency Screening  ·  v{}  ·  rust", env!("CARGO_PKG_VERSION"))));
    println!();
}

fn survey_theme() -> dialoguer::theme::ColorfulTheme {
    use dialoguer::theme::ColorfulTheme;

    ColorfulTheme {
        active_item_prefix: dialoguer::console::style("  ›".to_string()).for_stderr().cyan(),
        active_item_style: dialoguer::console::Style::new().for_stderr().white().bold(),
        inactive_item_prefix: dialoguer::console::style("   ".to_string()).for_stderr(),
        inactive_item_style: dialoguer::console::Style::new().for_stderr().color256(245),
        prompt_prefix: dialoguer::console::style("  ?".to_string()).for_stderr().color256(111),
        prompt_style: dialoguer::console::Style::new().for_stderr().white().bold(),
        ..ColorfulTheme::default()
    }
}

fn prompt_record(theme: &dialoguer::theme::ColorfulTheme) -> anyhow::Result<FeatureRecord> {
    use dialoguer::{Confirm, Input, Select};

    let usage: u32 = Input::with_theme(theme)
        .with_prompt("ChatGPT sessions per week (0-50)")
        .default(3)
        .validate_with(|v: &u32| if *v <= 50 { Ok(()) } else { Err("expected 0-50") })
        .interact_text()?;

    let duration: u32 = Input::with_theme(theme)
        .with_prompt("Average minutes per session (0-300)")
        .default(30)
        .validate_with(|v: &u32| if *v <= 300 { Ok(()) } else { Err("expected 0-300") })
        .interact_text()?;

    let attempts: u32 = Input::with_theme(theme)
        .with_prompt("Attempts before asking ChatGPT (0-20)")
        .default(2)
        .validate_with(|v: &u32| if *v <= 20 { Ok(()) } else { Err("expected 0-20") })
        .interact_text()?;

    let confidence: u8 = Input::with_theme(theme)
        .with_prompt("Confidence in solving alone (1-5)")
        .default(3)
        .validate_with(|v: &u8| if (1..=5).contains(v) { Ok(()) } else { Err("expected 1-5") })
        .interact_text()?;

    let peer: u8 = Input::with_theme(theme)
        .with_prompt("Peer usage influence (1-5)")
        .default(3)
        .validate_with(|v: &u8| if (1..=5).contains(v) { Ok(()) } else { Err("expected 1-5") })
        .interact_text()?;

    let reason_items: Vec<&str> = Reason::ALL.iter().map(|r| r.as_str()).collect();
    let reason_idx = Select::with_theme(theme)
        .with_prompt("Main reason for using ChatGPT")
        .items(&reason_items)
        .default(0)
        .interact()?;

    let cgpa: f64 = Input::with_theme(theme)
        .with_prompt("CGPA (0.0-10.0)")
        .default(7.5)
        .validate_with(|v: &f64| {
            if v.is_finite() && (0.0..=10.0).contains(v) {
                Ok(())
            } else {
                Err("expected 0.0-10.0")
            }
        })
        .interact_text()?;

    let department_items: Vec<&str> = Department::ALL.iter().map(|d| d.as_str()).collect();
    let department_idx = Select::with_theme(theme)
        .with_prompt("Department")
        .items(&department_items)
        .default(0)
        .interact()?;

    let other_ai = Confirm::with_theme(theme)
        .with_prompt("Used AI tools other than ChatGPT")
        .default(false)
        .interact()?;

    let prefers = Confirm::with_theme(theme)
        .with_prompt("Prefer ChatGPT over Google search")
        .default(false)
        .interact()?;

    Ok(FeatureRecord {
        chatgpt_usage_frequency_per_week: usage,
        average_duration_per_session_minutes: duration,
        attempt_before_chatgpt: attempts,
        confidence_in_solving_alone: confidence,
        peer_usage_influence: peer,
        reason_for_using_chatgpt: Reason::ALL[reason_idx],
        cgpa,
        department: Department::ALL[department_idx],
        used_other_ai_tools: other_ai as u8,
        chatgpt_preferred_over_google: prefers as u8,
    })
}

pub fn cmd_interactive(model_path: &Path) -> anyhow::Result<()> {
    use dialoguer::Confirm;

    print_banner();

    if !model_path.exists() {
        println!("  {}", dim(&format!("run `depscreen train --data {}` first", DEFAULT_DATA_PATH)));
        println!();
        anyhow::bail!("no model artifact at {}", model_path.display());
    }

    step_run("Loading model");
    let engine = ScoringEngine::load(model_path)?;
    let metadata = engine.model().metadata();
    step_done(&format!("{} trees", engine.model().forest().n_trees()));

    println!();
    println!("  {}", kv("Artifact ", &model_path.display().to_string()));
    println!("  {}", kv("Trained  ", &metadata.trained_at.format("%Y-%m-%d %H:%M UTC").to_string()));
    println!("  {}", kv("Test F1  ", &format!("{:.4}", metadata.test_f1)));

    let theme = survey_theme();

    loop {
        section("Survey");
        let record = prompt_record(&theme)?;
        let assessment = engine.assess(&record)?;
        render_assessment(&assessment);

        println!();
        if Confirm::with_theme(&theme)
            .with_prompt("Show feature importance chart")
            .default(false)
            .interact()?
        {
            render_importance_chart(&engine.feature_importances()?);
        }

        println!();
        if !Confirm::with_theme(&theme)
            .with_prompt("Assess another response")
            .default(true)
            .interact()?
        {
            println!();
            println!("  {}", dim("goodbye"));
            println!();
            break;
        }
    }

    Ok(())
}
