use anyhow::Context;
use clap::error::ErrorKind;
use clap::Parser;
use envconfig::Envconfig;

use sinkguard::collaborators::local::LocalCollaborator;
use sinkguard::collaborators::StderrConsole;
use sinkguard::config::Config;
use sinkguard::logging::init_logger;
use sinkguard::pipeline::{Pipeline, PipelineSettings};

#[derive(Parser)]
#[command(
    name = "sinkguard",
    about = "Process one user's data through the classification-aware pipeline"
)]
struct Cli {
    /// User to process. Exactly one non-empty id is accepted.
    #[arg(num_args = 0.., allow_hyphen_values = true, trailing_var_arg = true)]
    user_ids: Vec<String>,
}

/// What the command line asked for.
enum Invocation {
    Args(Vec<String>),
    /// clap refused the command line; carries the raw argument count.
    Malformed(usize),
}

fn parse_invocation<I, T>(argv: I) -> Invocation
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString>,
{
    let argv: Vec<std::ffi::OsString> = argv.into_iter().map(Into::into).collect();
    match Cli::try_parse_from(&argv) {
        Ok(cli) => Invocation::Args(cli.user_ids),
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => e.exit(),
        Err(_) => Invocation::Malformed(argv.len().saturating_sub(1)),
    }
}

fn main() -> anyhow::Result<()> {
    let invocation = parse_invocation(std::env::args_os());
    let config = Config::init_from_env().context("invalid PIPELINE_* environment")?;

    init_logger(config.log_level());

    let collab = LocalCollaborator::open(&config.fixture, &config.event_log, &config.outbox_dir)
        .with_context(|| format!("failed to load fixture {}", config.fixture.display()))?;
    let settings = PipelineSettings::from_config(&config);
    let console = StderrConsole;

    let pipeline = Pipeline::new(&collab, &console, &settings);
    let report = match invocation {
        Invocation::Args(args) => pipeline.run_for_args(&args),
        Invocation::Malformed(arg_count) => pipeline.reject_invocation(arg_count),
    };

    log::info!(
        "[run={}] EXIT state={} status={:?}",
        report.run_id,
        report.state,
        report.status
    );

    if !report.succeeded() {
        std::process::exit(1);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args_of(argv: &[&str]) -> Vec<String> {
        match parse_invocation(argv.iter().copied()) {
            Invocation::Args(args) => args,
            Invocation::Malformed(count) => panic!("command line refused ({} args)", count),
        }
    }

    #[test]
    fn test_dash_prefixed_user_id_reaches_pipeline() {
        assert_eq!(args_of(&["sinkguard", "-u1"]), vec!["-u1"]);
    }

    #[test]
    fn test_every_argument_is_kept() {
        assert_eq!(args_of(&["sinkguard", "u1", "--extra"]), vec!["u1", "--extra"]);
        assert_eq!(args_of(&["sinkguard", ""]), vec![""]);
        assert!(args_of(&["sinkguard"]).is_empty());
    }

    #[test]
    fn test_cli_accepts_hyphen_values() {
        let cli = Cli::try_parse_from(["sinkguard", "-u1"]).expect("parses");
        assert_eq!(cli.user_ids, vec!["-u1"]);
    }
}
