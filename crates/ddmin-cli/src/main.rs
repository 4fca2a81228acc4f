mod oracle;

use anyhow::{anyhow, Context, Result};
use chrono::{SecondsFormat, Utc};
use clap::{ArgGroup, Args, Parser, Subcommand, ValueEnum};
use ddmin_core::{
    evaluate_parallel, BudgetError, Budgeted, ClassifierExt, DeltaDebugMinimizer, Evaluation,
    FuzzConfig, Fuzzer, MinimizeError, MinimizeStats, Minimized, Minimizer,
};
use oracle::{split_lines, Oracle, Token};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fs;
use std::hash::Hash;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "ddmin")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    #[arg(long, value_enum, default_value = "json", global = true)]
    format: OutputFormat,

    #[arg(long, global = true)]
    output: Option<PathBuf>,

    #[arg(long, default_value_t = 0, global = true)]
    seed: u64,

    /// Tracing filter used when RUST_LOG is unset.
    #[arg(long, default_value = "warn", global = true)]
    log_level: String,
}

#[derive(Subcommand)]
enum Command {
    /// Shrink a failing input file.
    Minimize(MinimizeArgs),
    /// Print random sample strings.
    Fuzz(FuzzArgs),
    /// Report average and maximum sample length.
    Evaluate(EvaluateArgs),
}

#[derive(Args)]
#[command(group(
    ArgGroup::new("oracle")
        .required(true)
        .args(["pattern", "command"])
))]
struct MinimizeArgs {
    /// Input fails when this regex matches it.
    #[arg(long)]
    pattern: Option<String>,

    /// Input fails when `sh -c <command>` exits non-zero with the input on stdin.
    #[arg(long)]
    command: Option<String>,

    #[arg(long, value_enum, default_value = "char")]
    unit: Unit,

    /// Per-test limit for --command; a test that runs over is unresolved.
    #[arg(long)]
    timeout_ms: Option<u64>,

    #[arg(long)]
    max_tests: Option<u64>,

    #[arg(long)]
    cache: bool,

    /// Also write the minimized input here.
    #[arg(long)]
    save: Option<PathBuf>,

    file: PathBuf,
}

#[derive(Args)]
struct FuzzOptions {
    #[arg(long, default_value_t = 100)]
    max_length: usize,

    #[arg(long, default_value_t = 32)]
    char_start: u32,

    #[arg(long, default_value_t = 32)]
    char_range: u32,
}

impl FuzzOptions {
    fn config(&self) -> FuzzConfig {
        FuzzConfig {
            max_length: self.max_length,
            char_start: self.char_start,
            char_range: self.char_range,
        }
    }
}

#[derive(Args)]
struct FuzzArgs {
    #[command(flatten)]
    fuzz: FuzzOptions,

    #[arg(long, default_value_t = 10)]
    count: usize,
}

#[derive(Args)]
struct EvaluateArgs {
    #[command(flatten)]
    fuzz: FuzzOptions,

    #[arg(long, default_value_t = 100)]
    tries: usize,

    #[arg(long, default_value_t = 1)]
    jobs: usize,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Json,
    Text,
}

#[derive(Clone, Copy, ValueEnum)]
enum Unit {
    Byte,
    Char,
    Line,
}

impl Unit {
    fn as_str(&self) -> &'static str {
        match self {
            Unit::Byte => "byte",
            Unit::Char => "char",
            Unit::Line => "line",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
enum Status {
    Ok,
    PreconditionFailed,
    BudgetExhausted,
}

impl Status {
    fn exit_code(&self) -> i32 {
        match self {
            Status::Ok => 0,
            Status::PreconditionFailed => 1,
            Status::BudgetExhausted => 4,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Status::Ok => "ok",
            Status::PreconditionFailed => "precondition_failed",
            Status::BudgetExhausted => "budget_exhausted",
        }
    }
}

#[derive(Serialize)]
struct ResultJson {
    schema_version: String,
    tool: ToolInfo,
    invocation: Invocation,
    inputs: Vec<InputInfo>,
    status: Status,
    exit_code: i32,
    started_at: String,
    finished_at: String,
    duration_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    minimize: Option<MinimizeReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    samples: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    evaluation: Option<Evaluation>,
}

#[derive(Serialize)]
struct ToolInfo {
    name: String,
    version: String,
    git_sha: String,
}

#[derive(Serialize)]
struct Invocation {
    command: String,
    args: Vec<String>,
    format: String,
    seed: u64,
}

#[derive(Serialize)]
struct InputInfo {
    path: String,
    sha256: String,
}

#[derive(Serialize)]
struct MinimizeReport {
    unit: String,
    /// Lossy UTF-8 rendering; `minimized_hex` carries the exact bytes.
    minimized: String,
    minimized_hex: String,
    stats: MinimizeStats,
    #[serde(skip_serializing_if = "Option::is_none")]
    cache: Option<CacheStats>,
}

#[derive(Serialize)]
struct CacheStats {
    hits: u64,
    misses: u64,
}

struct Execution {
    status: Status,
    reason: Option<String>,
    inputs: Vec<InputInfo>,
    invocation: Invocation,
    minimize: Option<MinimizeReport>,
    samples: Option<Vec<String>>,
    evaluation: Option<Evaluation>,
}

type MinimizeResult<T> = Result<Minimized<T>, MinimizeError<BudgetError<io::Error>>>;

struct MinimizeRun<T> {
    result: MinimizeResult<T>,
    cache: Option<CacheStats>,
}

fn main() {
    let cli = Cli::parse();
    let exit_code = match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("tool error: {err:#}");
            2
        }
    };
    std::process::exit(exit_code);
}

fn init_tracing(level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .context("parse log filter")?;
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(io::stderr))
        .try_init()
        .map_err(|err| anyhow!("initialize tracing: {err}"))
}

fn run(cli: Cli) -> Result<i32> {
    init_tracing(&cli.log_level)?;
    let started_at = Utc::now();
    let timer = Instant::now();

    let execution = execute(&cli)?;

    let finished_at = Utc::now();
    let duration_ms = timer.elapsed().as_millis() as u64;
    let exit_code = execution.status.exit_code();

    let result = ResultJson {
        schema_version: "0.1".to_string(),
        tool: ToolInfo {
            name: "ddmin".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            git_sha: std::env::var("DDMIN_GIT_SHA").unwrap_or_else(|_| "UNKNOWN".to_string()),
        },
        invocation: execution.invocation,
        inputs: execution.inputs,
        status: execution.status,
        exit_code,
        started_at: started_at.to_rfc3339_opts(SecondsFormat::Secs, true),
        finished_at: finished_at.to_rfc3339_opts(SecondsFormat::Secs, true),
        duration_ms,
        reason: execution.reason,
        minimize: execution.minimize,
        samples: execution.samples,
        evaluation: execution.evaluation,
    };

    match cli.format {
        OutputFormat::Json => emit_json(&result, cli.output.as_deref()),
        OutputFormat::Text => emit_text(&result, cli.output.as_deref()),
    }?;

    Ok(exit_code)
}

fn execute(cli: &Cli) -> Result<Execution> {
    let format = match cli.format {
        OutputFormat::Json => "json".to_string(),
        OutputFormat::Text => "text".to_string(),
    };

    match &cli.command {
        Command::Minimize(args) => {
            let data = fs::read(&args.file)
                .with_context(|| format!("read {}", args.file.display()))?;
            let inputs = vec![InputInfo {
                path: args.file.to_string_lossy().to_string(),
                sha256: sha256_hex(&data),
            }];

            let (status, reason, report) = match args.unit {
                Unit::Byte => report_minimize(minimize_tokens(data, args)?, args)?,
                Unit::Char => {
                    let text = String::from_utf8(data)
                        .with_context(|| format!("{} is not UTF-8", args.file.display()))?;
                    report_minimize(minimize_tokens(text.chars().collect(), args)?, args)?
                }
                Unit::Line => {
                    let text = String::from_utf8(data)
                        .with_context(|| format!("{} is not UTF-8", args.file.display()))?;
                    report_minimize(minimize_tokens(split_lines(&text), args)?, args)?
                }
            };

            Ok(Execution {
                status,
                reason,
                inputs,
                invocation: Invocation {
                    command: "minimize".to_string(),
                    args: vec![args.file.to_string_lossy().to_string()],
                    format,
                    seed: cli.seed,
                },
                minimize: report,
                samples: None,
                evaluation: None,
            })
        }
        Command::Fuzz(args) => {
            let samples = Fuzzer::new(args.fuzz.config(), cli.seed)
                .take(args.count)
                .collect::<Result<Vec<_>, _>>()
                .context("generate samples")?;
            Ok(Execution {
                status: Status::Ok,
                reason: None,
                inputs: Vec::new(),
                invocation: Invocation {
                    command: "fuzz".to_string(),
                    args: vec![args.count.to_string()],
                    format,
                    seed: cli.seed,
                },
                minimize: None,
                samples: Some(samples),
                evaluation: None,
            })
        }
        Command::Evaluate(args) => {
            let evaluation =
                evaluate_parallel(&args.fuzz.config(), cli.seed, args.tries, args.jobs)
                    .context("evaluate samples")?;
            info!(
                tries = args.tries,
                jobs = args.jobs,
                max_length = evaluation.max_length,
                "evaluation finished"
            );
            Ok(Execution {
                status: Status::Ok,
                reason: None,
                inputs: Vec::new(),
                invocation: Invocation {
                    command: "evaluate".to_string(),
                    args: vec![args.tries.to_string()],
                    format,
                    seed: cli.seed,
                },
                minimize: None,
                samples: None,
                evaluation: Some(evaluation),
            })
        }
    }
}

fn build_oracle(args: &MinimizeArgs) -> Result<Oracle> {
    match (&args.pattern, &args.command) {
        (Some(pattern), _) => {
            Oracle::pattern(pattern).with_context(|| format!("invalid pattern {pattern:?}"))
        }
        (None, Some(command)) => Ok(Oracle::command(
            command.clone(),
            args.timeout_ms.map(Duration::from_millis),
        )),
        (None, None) => Err(anyhow!("one of --pattern or --command is required")),
    }
}

fn minimize_tokens<T>(input: Vec<T>, args: &MinimizeArgs) -> Result<MinimizeRun<T>>
where
    T: Token + Clone + Eq + Hash,
{
    let budgeted = Budgeted::new(build_oracle(args)?, args.max_tests.unwrap_or(u64::MAX));

    if args.cache {
        let mut classifier = budgeted.cached();
        let result = DeltaDebugMinimizer.minimize(input, &mut classifier);
        return Ok(MinimizeRun {
            result,
            cache: Some(CacheStats {
                hits: classifier.hits(),
                misses: classifier.misses(),
            }),
        });
    }

    let mut classifier = budgeted;
    Ok(MinimizeRun {
        result: DeltaDebugMinimizer.minimize(input, &mut classifier),
        cache: None,
    })
}

fn report_minimize<T>(
    run: MinimizeRun<T>,
    args: &MinimizeArgs,
) -> Result<(Status, Option<String>, Option<MinimizeReport>)>
where
    T: Token,
{
    match run.result {
        Ok(minimized) => {
            let bytes = T::render(&minimized.input);
            if let Some(path) = &args.save {
                write_atomic(path, &bytes)?;
            }
            Ok((
                Status::Ok,
                None,
                Some(MinimizeReport {
                    unit: args.unit.as_str().to_string(),
                    minimized: String::from_utf8_lossy(&bytes).into_owned(),
                    minimized_hex: hex::encode(&bytes),
                    stats: minimized.stats,
                    cache: run.cache,
                }),
            ))
        }
        Err(MinimizeError::Precondition(violation)) => Ok((
            Status::PreconditionFailed,
            Some(violation.to_string()),
            None,
        )),
        Err(MinimizeError::Classifier(err @ BudgetError::Exhausted { .. })) => {
            Ok((Status::BudgetExhausted, Some(err.to_string()), None))
        }
        Err(MinimizeError::Classifier(BudgetError::Inner(err))) => {
            Err(err).context("run classifier command")
        }
    }
}

fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

fn emit_json(result: &ResultJson, output: Option<&Path>) -> Result<()> {
    let payload = serde_json::to_string_pretty(result).context("serialize result json")?;
    if let Some(path) = output {
        write_atomic(path, payload.as_bytes())?;
        return Ok(());
    }

    println!("{payload}");
    Ok(())
}

fn emit_text(result: &ResultJson, output: Option<&Path>) -> Result<()> {
    let mut summary = format!(
        "status={} exit_code={}",
        result.status.label(),
        result.exit_code
    );
    if let Some(report) = &result.minimize {
        summary.push_str(&format!(
            " len={}->{} tests={}",
            report.stats.original_len, report.stats.minimized_len, report.stats.tests
        ));
    }
    if let Some(evaluation) = &result.evaluation {
        summary.push_str(&format!(
            " average_length={} max_length={}",
            evaluation.average_length, evaluation.max_length
        ));
    }
    if let Some(reason) = &result.reason {
        summary.push_str(&format!(" reason={reason:?}"));
    }
    for sample in result.samples.iter().flatten() {
        summary.push('\n');
        summary.push_str(sample);
    }

    if let Some(path) = output {
        write_atomic(path, summary.as_bytes())?;
        return Ok(());
    }
    println!("{summary}");
    Ok(())
}

fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let tmp_path = path.with_extension("tmp");
    fs::write(&tmp_path, contents).with_context(|| format!("write {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path).with_context(|| format!("rename {}", path.display()))?;
    Ok(())
}
