//! `cair route`: run the full pipeline in-process, no services involved.

use std::path::Path;

use cair_core::{Decision, Judge, JudgeModel, Pipeline, Query};
use serde_json::json;
use tracing::error;

use super::config;
use crate::cli::args::RouteArgs;
use crate::exit_codes::{COMMAND_FAILED, CONFIG_ERROR, SUCCESS};

pub async fn run(config_path: Option<&Path>, args: RouteArgs) -> anyhow::Result<i32> {
    let cfg = config::load(config_path)?;
    let weights = args.weights.unwrap_or(cfg.judge.weights);

    let model = match JudgeModel::load(&weights) {
        Ok(model) => model,
        Err(e) => {
            error!(weights = %weights.display(), error = %e, "judge not ready");
            return Ok(CONFIG_ERROR);
        }
    };
    let fingerprint = model.fingerprint().to_string();
    let pipeline = Pipeline::with_judge(Judge::new(model));

    let query = match Query::new(args.text, None, None) {
        Ok(q) => q,
        Err(e) => {
            eprintln!("{}", e);
            return Ok(COMMAND_FAILED);
        }
    };
    let assessment = pipeline.assess(&query).await?;
    let decision = Decision::from_judge(assessment.score);

    println!(
        "{}",
        serde_json::to_string_pretty(&json!({
            "decision": decision,
            "model": fingerprint,
        }))?
    );
    Ok(SUCCESS)
}
