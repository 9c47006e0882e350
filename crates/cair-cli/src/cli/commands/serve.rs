//! `cair judge|bridge|enhance`: load config, build state, bind, serve.
//!
//! State is fully built before the port is bound, so a judge without weights
//! never accepts a connection.

use std::path::Path;

use axum::Router;
use cair_server::{bind, bridge, enhance, judge, CairConfig, ServeError};
use tracing::error;

use super::config;
use crate::cli::args::{BridgeArgs, EnhanceArgs, JudgeArgs};
use crate::exit_codes::{BIND_FAILED, COMMAND_FAILED, CONFIG_ERROR, SUCCESS};

pub async fn judge(config_path: Option<&Path>, args: JudgeArgs) -> anyhow::Result<i32> {
    let mut cfg = config::load(config_path)?;
    config::apply_judge(&mut cfg, args);
    cfg.validate()?;

    let state = match judge::JudgeState::from_config(&cfg.judge) {
        Ok(state) => state,
        Err(e) => {
            error!(error = %e, kind = %e.kind(), "judge not ready");
            return Ok(CONFIG_ERROR);
        }
    };
    run(judge::SERVICE, &cfg, cfg.judge.port, judge::router(state)).await
}

pub async fn bridge(config_path: Option<&Path>, args: BridgeArgs) -> anyhow::Result<i32> {
    let mut cfg = config::load(config_path)?;
    config::apply_bridge(&mut cfg, args);
    cfg.validate()?;

    let state = bridge::Bridge::from_config(&cfg.bridge)?;
    run(bridge::SERVICE, &cfg, cfg.bridge.port, bridge::router(state)).await
}

pub async fn enhance(config_path: Option<&Path>, args: EnhanceArgs) -> anyhow::Result<i32> {
    let mut cfg = config::load(config_path)?;
    config::apply_enhance(&mut cfg, args);
    cfg.validate()?;

    let state = enhance::EnhanceState::from_config(&cfg.enhance)?;
    run(enhance::SERVICE, &cfg, cfg.enhance.port, enhance::router(state)).await
}

async fn run(service: &'static str, cfg: &CairConfig, port: u16, app: Router) -> anyhow::Result<i32> {
    let listener = match bind(&cfg.bind_host, port).await {
        Ok(listener) => listener,
        Err(e @ ServeError::Bind { .. }) => {
            error!(service, error = %e, "bind failed");
            return Ok(BIND_FAILED);
        }
        Err(e) => return Err(e.into()),
    };

    match cair_server::serve(service, listener, app).await {
        Ok(()) => Ok(SUCCESS),
        Err(e) => {
            error!(service, error = %e, "server stopped");
            Ok(COMMAND_FAILED)
        }
    }
}
