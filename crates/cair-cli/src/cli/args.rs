use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use cair_server::LogFormat;

#[derive(Parser)]
#[command(
    name = "cair",
    version,
    about = "Constitutional AI Router: judge, bridge and enhance services"
)]
pub struct Cli {
    /// YAML config file (defaults, then file, then CAIR_* env, then flags)
    #[arg(long, global = true, env = "CAIR_CONFIG")]
    pub config: Option<PathBuf>,

    #[arg(long, global = true, value_enum, default_value_t = LogFormatArg::Text, env = "CAIR_LOG_FORMAT")]
    pub log_format: LogFormatArg,

    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the judge service (scores queries)
    Judge(JudgeArgs),
    /// Run the bridge service (validation with fallback)
    Bridge(BridgeArgs),
    /// Run the enhance service (validate, scan, fix, file access)
    Enhance(EnhanceArgs),
    /// Manage judge weight files
    Weights(WeightsArgs),
    /// Score one query offline and print the decision as JSON
    Route(RouteArgs),
    /// Print the constitution rules as JSON
    Constitution,
    Version,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormatArg {
    Text,
    Json,
}

impl From<LogFormatArg> for LogFormat {
    fn from(arg: LogFormatArg) -> Self {
        match arg {
            LogFormatArg::Text => LogFormat::Text,
            LogFormatArg::Json => LogFormat::Json,
        }
    }
}

#[derive(Parser, Debug, Clone)]
pub struct JudgeArgs {
    #[arg(long, env = "CAIR_BIND_HOST")]
    pub host: Option<String>,

    #[arg(long, env = "CAIR_JUDGE_PORT")]
    pub port: Option<u16>,

    /// Weights file (cair-judge-v1 JSON)
    #[arg(long, env = "CAIR_JUDGE_WEIGHTS")]
    pub weights: Option<PathBuf>,

    /// External encoder endpoint; the built-in hashing embedder is used when unset
    #[arg(long, env = "CAIR_EMBEDDER_URL")]
    pub embedder_url: Option<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct BridgeArgs {
    #[arg(long, env = "CAIR_BIND_HOST")]
    pub host: Option<String>,

    #[arg(long, env = "CAIR_BRIDGE_PORT")]
    pub port: Option<u16>,

    #[arg(long, env = "CAIR_JUDGE_URL")]
    pub judge_url: Option<String>,

    /// Deadline for the judge call, in seconds
    #[arg(long)]
    pub timeout_secs: Option<u64>,
}

#[derive(Parser, Debug, Clone)]
pub struct EnhanceArgs {
    #[arg(long, env = "CAIR_BIND_HOST")]
    pub host: Option<String>,

    #[arg(long, env = "CAIR_ENHANCE_PORT")]
    pub port: Option<u16>,

    #[arg(long, env = "CAIR_BRIDGE_URL")]
    pub bridge_url: Option<String>,

    /// Default workspace root for /api/file (defaults to the working directory)
    #[arg(long, env = "CAIR_WORKSPACE")]
    pub workspace: Option<PathBuf>,

    /// Deadline for the bridge call, in seconds
    #[arg(long)]
    pub timeout_secs: Option<u64>,
}

#[derive(Parser, Debug)]
pub struct WeightsArgs {
    #[command(subcommand)]
    pub cmd: WeightsSub,
}

#[derive(Subcommand, Debug)]
pub enum WeightsSub {
    /// Write a freshly initialised weights file
    Init(WeightsInitArgs),
    /// Validate a weights file and print its fingerprint
    Info(WeightsInfoArgs),
}

#[derive(Parser, Debug, Clone)]
pub struct WeightsInitArgs {
    #[arg(long, default_value = "models/judge.json")]
    pub out: PathBuf,

    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Overwrite an existing file
    #[arg(long)]
    pub force: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct WeightsInfoArgs {
    pub path: PathBuf,
}

#[derive(Parser, Debug, Clone)]
pub struct RouteArgs {
    /// Query text
    pub text: String,

    #[arg(long, env = "CAIR_JUDGE_WEIGHTS")]
    pub weights: Option<PathBuf>,
}
