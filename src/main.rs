use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use bookalign::cli::Cli;
use bookalign::config::Config;
use bookalign::manifest::{CutSetReader, CutSetWriter};
use bookalign::pipeline::PipelineController;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.quiet {
        "warn"
    } else {
        match cli.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let mut config = Config::load_or_default(cli.config.as_deref())
        .context("loading configuration")?;
    cli.apply_to(&mut config);
    config.validate().context("validating configuration")?;

    info!(
        "matching {} -> {} (batch_size={}, min={}s, max={}s, max_error_rate={})",
        cli.manifest_in.display(),
        cli.manifest_out.display(),
        config.batch_size,
        config.split.min_duration,
        config.split.max_duration,
        config.split.max_error_rate,
    );

    let reader = CutSetReader::open(&cli.manifest_in).context("opening input manifest")?;
    let mut writer = CutSetWriter::create(&cli.manifest_out).context("creating output manifest")?;

    let controller = PipelineController::new(config)?;
    let summary = controller.run(reader, &mut writer)?;

    info!(
        "done: {} cuts read, {} segments written",
        summary.cuts_read, summary.segments_written
    );
    Ok(())
}
