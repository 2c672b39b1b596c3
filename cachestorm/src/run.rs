use anyhow::Context as _;

use cachestorm_core::runner::run_workload;
use cachestorm_core::{SeededRngFactory, capture_or_default, diff_snapshots};

use crate::backend;
use crate::cli::RunArgs;
use crate::config_file::{ConfigFile, load_config_file, resolve_settings};
use crate::exit_codes::ExitCode;
use crate::output;
use crate::report::{RunReport, write_report};
use crate::run_error::RunError;

pub async fn run(args: RunArgs) -> Result<ExitCode, RunError> {
    let file = match &args.config {
        Some(path) => load_config_file(path)
            .await
            .map_err(RunError::InvalidInput)?,
        None => ConfigFile::default(),
    };
    let settings = resolve_settings(&args, file).map_err(RunError::InvalidInput)?;

    // Reject before touching the target.
    settings.run.validate()?;

    let backend = backend::connect(&settings).await?;
    let out = output::formatter(args.output);
    out.print_header(&backend.display, &settings);

    let before = capture_or_default(backend.metrics.as_ref(), "before").await;

    let summary = run_workload(
        &settings.run,
        backend.cache.clone(),
        &SeededRngFactory::new(settings.run.seed),
        out.progress(),
    )
    .await?;

    let after = capture_or_default(backend.metrics.as_ref(), "after").await;
    let delta = diff_snapshots(&before, &after);

    let report = RunReport::new(
        backend.display.clone(),
        settings.run.clone(),
        summary,
        before,
        after,
        delta,
    );

    out.print_summary(&report)
        .context("failed to print summary")
        .map_err(RunError::RuntimeError)?;

    if let Some(path) = &args.report {
        write_report(path, &report)
            .await
            .map_err(RunError::RuntimeError)?;
    }

    Ok(ExitCode::Success)
}
