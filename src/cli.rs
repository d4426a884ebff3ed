use std::{
    io::Write,
    path::PathBuf,
    sync::Arc,
    time::Duration,
};

use anyhow::{anyhow, bail, Context, Result};
use chrono::Utc;
use clap::{builder::BoolishValueParser, ArgAction, Args, Parser, Subcommand};
use serde::Serialize;
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::broadcast::error::RecvError,
};

use crate::{
    detection::{DetectionEngine, DetectionResult, FixedDetectionEngine, RandomDetectionEngine, RawWeights},
    export::write_export,
    input::{describe_path, file::validate, read_text, Extraction, SourceKind, ValidationError},
    optimize::{OptimizationResult, TextOptimizer, TextStats},
    readiness::can_optimize,
    settings::{DEFAULT_SETTINGS_FILE, ENV_EXPORT_DIR, ENV_OPTIMIZE_URL},
    verdict::Verdict,
    workflow::{
        parse_line, state::MSG_EXTRACTION_UNSUPPORTED, CommandAction, Event, SessionEvent,
        SessionSnapshot, WorkflowController, WorkflowState, COMMANDS,
    },
    AppState,
};

const ENABLE_LOGS: bool = true;

use crate::log_warn;

const ENV_DEBUG: &str = "PAPERCHECK_DEBUG";
const FILE_READ_TIMEOUT: Duration = Duration::from_secs(10);
/// Added on top of the configured maximum detection latency.
const DETECTION_GRACE: Duration = Duration::from_secs(10);

#[derive(Parser, Debug)]
#[command(
    name = "papercheck",
    about = "Check whether a text reads as AI-generated and rewrite it to sound human",
    version
)]
pub struct Cli {
    /// Settings file (created by `config --save`)
    #[arg(long, global = true, default_value = DEFAULT_SETTINGS_FILE)]
    pub config: PathBuf,

    /// Base URL of the optimization service
    #[arg(long, global = true, env = ENV_OPTIMIZE_URL)]
    pub optimize_url: Option<String>,

    /// Directory that downloads are written to
    #[arg(long, global = true, env = ENV_EXPORT_DIR)]
    pub export_dir: Option<PathBuf>,

    /// Debug-level logging
    #[arg(
        long,
        global = true,
        env = ENV_DEBUG,
        action = ArgAction::SetTrue,
        value_parser = BoolishValueParser::new()
    )]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Score a text and print the result with its verdict
    Detect {
        #[command(flatten)]
        input: InputArgs,

        /// Use fixed raw weights `human,machine,humanized,polished` instead of random ones
        #[arg(long, value_parser = parse_weights)]
        fixed_weights: Option<RawWeights>,
    },
    /// Send a text to the optimization service
    Optimize {
        #[command(flatten)]
        input: InputArgs,

        /// Also write the optimized text to the export directory
        #[arg(long)]
        export: bool,
    },
    /// Interactive session driven by the command table
    Session,
    /// List the session commands
    Commands,
    /// Check that the optimization service is up
    Health,
    /// Print the effective settings
    Config {
        /// Write them to the settings file
        #[arg(long)]
        save: bool,
    },
}

#[derive(Args, Debug, Clone)]
#[group(required = true, multiple = false)]
pub struct InputArgs {
    /// Text to analyse
    #[arg(long)]
    pub text: Option<String>,

    /// File to analyse (.txt, .doc, .docx, .pdf)
    #[arg(long)]
    pub file: Option<PathBuf>,
}

fn parse_weights(raw: &str) -> Result<RawWeights, String> {
    let values = raw
        .split(',')
        .map(|part| part.trim().parse::<f64>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|err| format!("invalid weight: {err}"))?;

    match values.as_slice() {
        [human, machine, humanized, polished] => {
            Ok(RawWeights::new(*human, *machine, *humanized, *polished))
        }
        _ => Err(format!("expected 4 comma-separated weights, got {}", values.len())),
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DetectionReport<'a> {
    result: &'a DetectionResult,
    verdict: &'a Verdict,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct OptimizationReport<'a> {
    #[serde(flatten)]
    result: &'a OptimizationResult,
    input_stats: TextStats,
    output_stats: TextStats,
}

pub async fn execute(cli: Cli, state: AppState) -> Result<()> {
    match cli.command {
        Command::Detect {
            input,
            fixed_weights,
        } => detect(&state, &input, fixed_weights).await,
        Command::Optimize { input, export } => optimize(&state, &input, export).await,
        Command::Session => session(&state).await,
        Command::Commands => {
            print_commands();
            Ok(())
        }
        Command::Health => {
            let status = state.optimizer.check_health().await?;
            println!("{}", serde_json::to_string_pretty(&status)?);
            Ok(())
        }
        Command::Config { save } => {
            println!("{}", serde_json::to_string_pretty(&state.settings.current())?);
            if save {
                state.settings.save()?;
                if let Some(path) = state.settings.path() {
                    eprintln!("Saved settings to {}", path.display());
                }
            }
            Ok(())
        }
    }
}

fn random_engine(state: &AppState) -> Arc<dyn DetectionEngine> {
    Arc::new(RandomDetectionEngine::new(state.settings.current().detection))
}

fn latest_message(snapshot: &SessionSnapshot) -> String {
    snapshot
        .notifications
        .last()
        .map(|notification| notification.message.clone())
        .unwrap_or_else(|| format!("workflow stopped in {}", snapshot.state().as_str()))
}

async fn load_input(workflow: &WorkflowController, input: &InputArgs) -> Result<()> {
    match (&input.text, &input.file) {
        (Some(text), _) => {
            workflow.dispatch(Event::EditText(text.clone())).await?;
        }
        (None, Some(path)) => {
            workflow.dispatch(Event::SwitchTab(SourceKind::File)).await?;
            let (descriptor, handle) = describe_path(path)?;
            let snapshot = workflow
                .dispatch(Event::AttachFile { descriptor, handle })
                .await?;
            if snapshot.session.input.attached_file().is_none() {
                bail!(latest_message(&snapshot));
            }
            workflow
                .wait_for(FILE_READ_TIMEOUT, |snapshot| {
                    !matches!(
                        snapshot.session.input.attached_file().map(|f| &f.extraction),
                        Some(Extraction::Pending)
                    )
                })
                .await?;
        }
        (None, None) => bail!("pass --text or --file"),
    }
    Ok(())
}

async fn detect(state: &AppState, input: &InputArgs, fixed: Option<RawWeights>) -> Result<()> {
    let engine: Arc<dyn DetectionEngine> = match fixed {
        Some(weights) => Arc::new(FixedDetectionEngine::new(weights)),
        None => random_engine(state),
    };
    let workflow = state.workflow(engine);
    load_input(&workflow, input).await?;

    let submitted = workflow.dispatch(Event::SubmitDetection).await?;
    if submitted.state() != WorkflowState::Detecting {
        bail!(latest_message(&submitted));
    }

    let max_latency = Duration::from_millis(state.settings.current().detection.max_latency_ms);
    let snapshot = workflow.wait_until_idle(max_latency + DETECTION_GRACE).await?;
    match (&snapshot.session.detection, &snapshot.verdict) {
        (Some(result), Some(verdict)) if snapshot.state() == WorkflowState::Results => {
            let report = DetectionReport { result, verdict };
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }
        _ => bail!(latest_message(&snapshot)),
    }
}

async fn optimize(state: &AppState, input: &InputArgs, export: bool) -> Result<()> {
    let raw = match (&input.text, &input.file) {
        (Some(text), _) => text.clone(),
        (None, Some(path)) => {
            let (descriptor, handle) = describe_path(path)?;
            validate(&descriptor)?;
            if !descriptor.is_plain_text() {
                bail!(MSG_EXTRACTION_UNSUPPORTED);
            }
            read_text(&handle).await?
        }
        (None, None) => bail!("pass --text or --file"),
    };

    let text = raw.trim();
    if !can_optimize(text) {
        return Err(ValidationError::TextTooShort.into());
    }

    let result = state
        .optimizer
        .optimize(text)
        .await
        .map_err(|err| anyhow!(err.user_message()))?;

    let report = OptimizationReport {
        result: &result,
        input_stats: TextStats::of(text),
        output_stats: TextStats::of(&result.optimized_text),
    };
    println!("{}", serde_json::to_string_pretty(&report)?);

    if export {
        let dir = state.settings.current().export_dir;
        let path = write_export(&dir, &result.optimized_text, Utc::now()).await?;
        eprintln!("Download started: {}", path.display());
    }
    Ok(())
}

fn print_commands() {
    for entry in COMMANDS {
        println!("  {:<28} {}", entry.usage, entry.summary);
    }
}

fn print_event(workflow: &WorkflowController, event: &SessionEvent) {
    match event {
        SessionEvent::StateChanged { to, .. } => {
            println!("-> {}", to.as_str());
            let snapshot = workflow.snapshot();
            match to {
                WorkflowState::Results => {
                    if let (Some(result), Some(verdict)) =
                        (&snapshot.session.detection, &snapshot.verdict)
                    {
                        println!(
                            "AI probability {}% ({}): {}",
                            result.ai_probability, verdict.label, verdict.headline
                        );
                        println!(
                            "human {} / machine {} / humanized {} / polished {}",
                            result.human_score,
                            result.machine_score,
                            result.humanized_score,
                            result.polished_score
                        );
                        for suggestion in verdict.suggestions {
                            match suggestion.title {
                                Some(title) => println!("  - {}: {}", title, suggestion.text),
                                None => println!("  - {}", suggestion.text),
                            }
                        }
                    }
                }
                WorkflowState::Optimized => {
                    if let (Some(result), Some(stats)) =
                        (&snapshot.session.optimization, snapshot.optimized_stats)
                    {
                        println!("{}", result.optimized_text);
                        println!("({} chars, {} words)", stats.char_count, stats.word_count);
                        for improvement in &result.improvements {
                            println!("  + {improvement}");
                        }
                    }
                }
                _ => {}
            }
        }
        SessionEvent::NotificationPosted(notification) => {
            println!(
                "[{}] {} ({})",
                notification.level.as_str(),
                notification.message,
                notification.id
            );
        }
        SessionEvent::ClipboardRequested { text } => {
            println!("--- optimized text ---\n{text}\n---");
            // A terminal has no clipboard to write to.
            let outcome = Err("no clipboard in a terminal session".to_string());
            if let Err(err) = workflow.send(Event::ClipboardResult(outcome)) {
                log_warn!("could not report clipboard outcome: {err:#}");
            }
        }
        SessionEvent::NotificationDismissed { .. } | SessionEvent::FileExported { .. } => {}
    }
}

fn print_input(snapshot: &SessionSnapshot) {
    if let Some(file) = snapshot.session.input.attached_file() {
        println!("attached {}", file.descriptor.display_label());
    }
}

async fn session(state: &AppState) -> Result<()> {
    let workflow = state.workflow(random_engine(state));

    let mut events = workflow.subscribe();
    let printer_handle = workflow.clone();
    let printer = tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => print_event(&printer_handle, &event),
                Err(RecvError::Lagged(skipped)) => {
                    log_warn!("session printer skipped {} events", skipped);
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    println!("papercheck session, type `help` for commands");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("[{}]> ", workflow.snapshot().state().as_str());
        std::io::stdout().flush().context("Failed to flush stdout")?;

        let Some(line) = lines.next_line().await.context("Failed to read stdin")? else {
            break;
        };

        match parse_line(&line) {
            Ok(None) => {}
            Ok(Some(CommandAction::Dispatch(event))) => {
                let snapshot = workflow.dispatch(event).await?;
                print_input(&snapshot);
            }
            Ok(Some(CommandAction::Dismiss(id))) => workflow.dismiss_notification(id)?,
            Ok(Some(CommandAction::Show)) => {
                println!("{}", serde_json::to_string_pretty(&workflow.snapshot())?);
            }
            Ok(Some(CommandAction::Help)) => print_commands(),
            Ok(Some(CommandAction::Quit)) => break,
            Err(err) => eprintln!("{err:#}"),
        }
    }

    printer.abort();
    Ok(())
}
