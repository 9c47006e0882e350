use std::path::Path;

use anyhow::Context;
use cair_server::CairConfig;

use crate::cli::args::{BridgeArgs, EnhanceArgs, JudgeArgs};

/// Defaults, then the YAML file, then `CAIR_*` variables.
pub fn load(path: Option<&Path>) -> anyhow::Result<CairConfig> {
    CairConfig::load(path).with_context(|| match path {
        Some(p) => format!("failed to load config {}", p.display()),
        None => "failed to load config from environment".to_string(),
    })
}

pub fn apply_judge(cfg: &mut CairConfig, args: JudgeArgs) {
    if let Some(host) = args.host {
        cfg.bind_host = host;
    }
    if let Some(port) = args.port {
        cfg.judge.port = port;
    }
    if let Some(weights) = args.weights {
        cfg.judge.weights = weights;
    }
    if let Some(url) = args.embedder_url {
        cfg.judge.embedder_url = Some(url).filter(|u| !u.is_empty());
    }
}

pub fn apply_bridge(cfg: &mut CairConfig, args: BridgeArgs) {
    if let Some(host) = args.host {
        cfg.bind_host = host;
    }
    if let Some(port) = args.port {
        cfg.bridge.port = port;
    }
    if let Some(url) = args.judge_url {
        cfg.bridge.judge_url = url;
    }
    if let Some(secs) = args.timeout_secs {
        cfg.bridge.timeout_secs = secs;
    }
}

pub fn apply_enhance(cfg: &mut CairConfig, args: EnhanceArgs) {
    if let Some(host) = args.host {
        cfg.bind_host = host;
    }
    if let Some(port) = args.port {
        cfg.enhance.port = port;
    }
    if let Some(url) = args.bridge_url {
        cfg.enhance.bridge_url = url;
    }
    if let Some(ws) = args.workspace {
        cfg.enhance.workspace = Some(ws);
    }
    if let Some(secs) = args.timeout_secs {
        cfg.enhance.timeout_secs = secs;
    }
}
