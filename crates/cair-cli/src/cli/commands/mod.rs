use super::args::*;
use crate::exit_codes::SUCCESS;

pub mod config;
pub mod route;
pub mod serve;
pub mod weights;

pub async fn dispatch(cli: Cli) -> anyhow::Result<i32> {
    let config_path = cli.config.as_deref();
    match cli.cmd {
        Command::Judge(args) => serve::judge(config_path, args).await,
        Command::Bridge(args) => serve::bridge(config_path, args).await,
        Command::Enhance(args) => serve::enhance(config_path, args).await,
        Command::Weights(args) => match args.cmd {
            WeightsSub::Init(init_args) => weights::init(init_args),
            WeightsSub::Info(info_args) => weights::info(info_args),
        },
        Command::Route(args) => route::run(config_path, args).await,
        Command::Constitution => {
            let rules = cair_core::Constitution::default();
            println!("{}", serde_json::to_string_pretty(&rules)?);
            Ok(SUCCESS)
        }
        Command::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            Ok(SUCCESS)
        }
    }
}
