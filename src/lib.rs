pub mod batch;
pub mod cli;
pub mod commit;
pub mod constants;
pub mod eligibility;
pub mod error;
pub mod formats;
pub mod inspect;
pub mod logger;
pub mod profile;
pub mod report;
pub mod transform;
pub mod utils;

pub use batch::{collect_inputs, process_file, run_batch, BatchConfig, BatchInput};
pub use commit::{commit, write_atomic, CommitOptions, CommitOutcome, Committed};
pub use eligibility::{check_eligibility, Eligibility, SkipReason};
pub use error::{OptimizeError, Result};
pub use formats::{backup_path_for, output_path_for, SourceFormat, TargetFormat};
pub use inspect::{inspect_size, FileSize};
pub use profile::{
    ExtensionPolicy, JpegOptions, OptimizationProfile, PngOptions, ProfileName, Thresholds,
    WebpOptions,
};
pub use report::{BatchSummary, Conversion, OptimizationResult, Outcome, SkipCounts};
pub use transform::{transform, Codec, NativeCodec, Transformed};
