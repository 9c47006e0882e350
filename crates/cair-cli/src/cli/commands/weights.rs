use anyhow::Context;
use cair_core::{JudgeModel, WeightsFile};
use serde_json::json;
use tracing::info;

use crate::cli::args::{WeightsInfoArgs, WeightsInitArgs};
use crate::exit_codes::{COMMAND_FAILED, CONFIG_ERROR, SUCCESS};

pub fn init(args: WeightsInitArgs) -> anyhow::Result<i32> {
    if args.out.exists() && !args.force {
        eprintln!(
            "refusing to overwrite {} (pass --force)",
            args.out.display()
        );
        return Ok(COMMAND_FAILED);
    }

    let file = WeightsFile::seeded(args.seed);
    file.write(&args.out)
        .with_context(|| format!("failed to write {}", args.out.display()))?;
    // Fingerprint as loaded back from disk.
    let model = JudgeModel::load(&args.out)
        .with_context(|| format!("failed to reload {}", args.out.display()))?;
    info!(path = %args.out.display(), seed = args.seed, "weights written");

    println!(
        "{}",
        serde_json::to_string_pretty(&json!({
            "path": args.out.display().to_string(),
            "seed": args.seed,
            "fingerprint": model.fingerprint(),
        }))?
    );
    Ok(SUCCESS)
}

pub fn info(args: WeightsInfoArgs) -> anyhow::Result<i32> {
    let file = match WeightsFile::read(&args.path) {
        Ok(file) => file,
        Err(e) => {
            eprintln!("{}", e);
            return Ok(CONFIG_ERROR);
        }
    };
    let shapes: Vec<[usize; 2]> = file.layers.iter().map(|l| [l.inputs, l.outputs]).collect();
    let format = file.format.clone();
    let model = match JudgeModel::from_file(file) {
        Ok(model) => model,
        Err(reason) => {
            eprintln!("invalid weights {}: {}", args.path.display(), reason);
            return Ok(CONFIG_ERROR);
        }
    };

    println!(
        "{}",
        serde_json::to_string_pretty(&json!({
            "path": args.path.display().to_string(),
            "format": format,
            "layers": shapes,
            "fingerprint": model.fingerprint(),
        }))?
    );
    Ok(SUCCESS)
}
