use anyhow::{Context, Result};
use clap::Parser;
use img_shrink::cli::{Args, Commands, ReportFormat};
use img_shrink::{
    logger, run_batch, BatchConfig, BatchSummary, NativeCodec, OptimizationProfile, ProfileName,
};
use log::warn;
use std::process::{self, ExitCode};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

fn main() -> Result<ExitCode> {
    let args = Args::parse();
    logger::init(args.quiet, args.verbose);

    match args.command {
        Commands::Profiles => {
            show_profiles();
            Ok(ExitCode::SUCCESS)
        }
        Commands::Optimize {
            inputs,
            profile,
            no_backup,
            overwrite_backup,
            dry_run,
            jobs,
            report,
            fail_on_error,
        } => {
            let preset = OptimizationProfile::preset(profile);
            let mut config = BatchConfig::new(inputs, preset);
            config.backup = config.profile.backup && !no_backup;
            config.overwrite_backup = overwrite_backup;
            config.dry_run = dry_run;
            config.jobs = jobs;
            config.show_progress = !args.quiet;

            let abort = Arc::new(AtomicBool::new(false));
            install_abort_handler(Arc::clone(&abort));

            let summary = run_batch(&config, &NativeCodec, &abort)
                .with_context(|| format!("{} run failed", profile))?;
            print_summary(&summary, report)?;

            if summary.aborted || (fail_on_error && summary.failed > 0) {
                Ok(ExitCode::FAILURE)
            } else {
                Ok(ExitCode::SUCCESS)
            }
        }
    }
}

/// First Ctrl+C lets in-flight files finish; a second one exits immediately.
fn install_abort_handler(abort: Arc<AtomicBool>) {
    let res = ctrlc::set_handler(move || {
        if abort
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::Relaxed)
            .is_ok()
        {
            eprintln!("\n⚠️  Stopping after the current file(s); press Ctrl+C again to quit now.");
        } else {
            process::exit(1);
        }
    });
    if let Err(e) = res {
        warn!("⚠️  Could not install Ctrl+C handler: {}", e);
    }
}

fn print_summary(summary: &BatchSummary, format: ReportFormat) -> Result<()> {
    match format {
        ReportFormat::Text => println!("\n{}", summary.render_text()),
        ReportFormat::Json => {
            let json = summary.to_json().context("could not serialize the report")?;
            println!("{}", json);
        }
    }
    Ok(())
}

fn show_profiles() {
    println!("📋 Available profiles:\n");
    for name in ProfileName::all() {
        println!("{}\n", OptimizationProfile::preset(name).describe());
    }
}
