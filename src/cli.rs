use crate::profile::ProfileName;
use clap::{ArgAction, Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(
    name = "img-shrink",
    about = "Batch image optimizer that only keeps results that are smaller",
    long_about = "img-shrink re-encodes the JPEG and PNG assets of a site in place. \
                  It picks encoder settings from a named profile, skips files that are already small, \
                  converts other formats (and optionally PNGs) to WebP, and never writes a file \
                  that would end up larger than the original.",
    version,
    after_help = "EXAMPLES:\n  \
    img-shrink optimize -i public/images\n  \
    img-shrink optimize -i public/images -p standard --jobs 4\n  \
    img-shrink optimize -i hero.png -i \"public/team/*.jpg\" -p aggressive --no-backup\n  \
    img-shrink optimize -i public -p aggressive --dry-run --report json\n  \
    img-shrink profiles"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(
        short = 'q',
        long,
        global = true,
        help = "Only print warnings, errors and the summary"
    )]
    pub quiet: bool,

    #[arg(
        short = 'v',
        long,
        global = true,
        help = "Print debug output",
        long_help = "Print debug output, including why a PNG fell back from WebP. \
                     RUST_LOG overrides both --quiet and --verbose."
    )]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(
        about = "Optimize images in place",
        long_about = "Run every input through size check, eligibility filter, re-encode and commit. \
                      Directories are listed one level deep; explicit files and glob patterns are \
                      processed in the order given."
    )]
    Optimize {
        #[arg(
            short = 'i',
            long = "input",
            value_name = "PATH",
            required = true,
            num_args = 1..,
            help = "Image file, directory or glob pattern (repeatable)",
            long_help = "Image file, directory or glob pattern. Can be given several times. \
                         Directories are not descended into. Missing paths are reported \
                         and skipped."
        )]
        inputs: Vec<String>,

        #[arg(
            short = 'p',
            long,
            value_enum,
            default_value_t = ProfileName::Conservative,
            help = "Optimization profile"
        )]
        profile: ProfileName,

        #[arg(
            long,
            help = "Do not write <file>.backup copies, even if the profile asks for them"
        )]
        no_backup: bool,

        #[arg(
            long,
            value_name = "BOOL",
            default_value_t = true,
            action = ArgAction::Set,
            help = "Replace an existing <file>.backup (default: true)",
            long_help = "Whether a backup left by an earlier run is replaced. \
                         With false, the first backup ever taken is preserved."
        )]
        overwrite_backup: bool,

        #[arg(
            short = 'n',
            long,
            help = "Compute everything but write nothing"
        )]
        dry_run: bool,

        #[arg(
            short = 'j',
            long,
            default_value_t = 1,
            help = "Number of files processed in parallel (0 = one per CPU)",
            long_help = "Number of files processed at the same time. \
                         1 (the default) processes files strictly one after another."
        )]
        jobs: usize,

        #[arg(
            short = 'r',
            long,
            value_enum,
            default_value_t = ReportFormat::Text,
            help = "Summary format"
        )]
        report: ReportFormat,

        #[arg(
            long,
            help = "Exit with status 1 if any file failed"
        )]
        fail_on_error: bool,
    },

    #[command(about = "List the built-in profiles and their settings")]
    Profiles,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    Text,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_optimize_defaults() {
        let args = Args::try_parse_from(["img-shrink", "optimize", "-i", "public"]).unwrap();
        match args.command {
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
                assert_eq!(inputs, vec!["public"]);
                assert_eq!(profile, ProfileName::Conservative);
                assert!(!no_backup);
                assert!(overwrite_backup);
                assert!(!dry_run);
                assert_eq!(jobs, 1);
                assert_eq!(report, ReportFormat::Text);
                assert!(!fail_on_error);
            }
            Commands::Profiles => panic!("expected optimize"),
        }
        assert!(!args.quiet);
    }

    #[test]
    fn test_optimize_all_flags() {
        let args = Args::try_parse_from([
            "img-shrink",
            "optimize",
            "-i",
            "a.png",
            "--input",
            "b.jpg",
            "--profile",
            "aggressive",
            "--no-backup",
            "--overwrite-backup",
            "false",
            "--dry-run",
            "--jobs",
            "4",
            "--report",
            "json",
            "--fail-on-error",
            "--quiet",
        ])
        .unwrap();

        assert!(args.quiet);
        match args.command {
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
                assert_eq!(inputs, vec!["a.png", "b.jpg"]);
                assert_eq!(profile, ProfileName::Aggressive);
                assert!(no_backup);
                assert!(!overwrite_backup);
                assert!(dry_run);
                assert_eq!(jobs, 4);
                assert_eq!(report, ReportFormat::Json);
                assert!(fail_on_error);
            }
            Commands::Profiles => panic!("expected optimize"),
        }
    }

    #[test]
    fn test_optimize_requires_input() {
        assert!(Args::try_parse_from(["img-shrink", "optimize"]).is_err());
        assert!(Args::try_parse_from(["img-shrink", "optimize", "-i", "x", "-p", "extreme"]).is_err());
    }
}
