use img_shrink::constants::BYTES_PER_MB;
use img_shrink::eligibility::{check_eligibility, Eligibility, SkipReason};
use img_shrink::formats::{backup_path_for, output_path_for, TargetFormat};
use img_shrink::inspect::FileSize;
use img_shrink::profile::{OptimizationProfile, ProfileName};
use img_shrink::report::{BatchSummary, OptimizationResult, Outcome};
use img_shrink::utils::{reduction_percent, round2};
use proptest::prelude::*;
use std::path::Path;
use std::time::Duration;

fn any_profile() -> impl Strategy<Value = OptimizationProfile> {
    prop::sample::select(ProfileName::all().to_vec()).prop_map(OptimizationProfile::preset)
}

proptest! {
    #[test]
    fn reduction_is_positive_exactly_when_smaller(
        original in 1u64..=50_000_000u64,
        optimized in 0u64..=50_000_000u64
    ) {
        let pct = reduction_percent(original, optimized);
        if optimized < original {
            prop_assert!(pct >= 0.0);
        } else {
            prop_assert!(pct <= 0.0);
        }
        prop_assert!(pct <= 100.0);
        // one decimal place
        prop_assert!(((pct * 10.0).round() - pct * 10.0).abs() < 1e-6 * (1.0 + pct.abs()));
    }

    #[test]
    fn unsupported_extensions_skip_under_strict_policy(
        stem in "[a-zA-Z0-9_ -]{1,12}",
        ext in prop::sample::select(&["gif", "bmp", "tiff", "svg", "txt", "webp"]),
        bytes in 0u64..=20_000_000u64
    ) {
        let path = format!("{}.{}", stem, ext);
        let decision = check_eligibility(
            Path::new(&path),
            FileSize { bytes },
            &OptimizationProfile::conservative(),
        );
        prop_assert!(matches!(decision, Eligibility::Skip(SkipReason::UnsupportedFormat(_))));
    }

    #[test]
    fn jpeg_threshold_is_strict(bytes in 0u64..=4_000_000u64) {
        let decision = check_eligibility(
            Path::new("photo.jpg"),
            FileSize { bytes },
            &OptimizationProfile::conservative(),
        );
        let below = round2(bytes as f64 / BYTES_PER_MB) < 0.8;
        prop_assert_eq!(matches!(decision, Eligibility::Skip(_)), below);
    }

    #[test]
    fn eligibility_never_rejects_jpeg_or_png_by_extension(
        profile in any_profile(),
        ext in prop::sample::select(&["jpg", "JPG", "jpeg", "Jpeg", "png", "PNG"]),
        bytes in 0u64..=20_000_000u64
    ) {
        let path = format!("image.{}", ext);
        let decision = check_eligibility(Path::new(&path), FileSize { bytes }, &profile);
        prop_assert!(!matches!(decision, Eligibility::Skip(SkipReason::UnsupportedFormat(_))));
    }

    #[test]
    fn conversion_changes_only_the_extension(
        stem in "[a-zA-Z0-9_+ -]{1,16}",
        target in prop::sample::select(vec![TargetFormat::Jpeg, TargetFormat::Png, TargetFormat::WebP])
    ) {
        let input = format!("/site/public/{}.png", stem);
        let output = output_path_for(Path::new(&input), target);

        prop_assert_eq!(output.parent(), Path::new(&input).parent());
        prop_assert_eq!(output.file_stem(), Path::new(&input).file_stem());
        if target == TargetFormat::Png {
            prop_assert_eq!(output.as_path(), Path::new(&input));
        } else {
            prop_assert_eq!(output.extension().and_then(|e| e.to_str()), Some(target.extension()));
        }
    }

    #[test]
    fn backup_path_is_a_sibling(stem in "[a-zA-Z0-9_ -]{1,16}") {
        let input = format!("/site/{}.jpg", stem);
        let backup = backup_path_for(Path::new(&input));
        prop_assert_eq!(backup.parent(), Path::new(&input).parent());
        prop_assert!(backup.to_string_lossy().ends_with(".jpg.backup"));
    }

    #[test]
    fn summary_totals_only_count_commits(
        sizes in prop::collection::vec((1u64..=10_000_000u64, 0u64..=10_000_000u64), 0..20)
    ) {
        let results: Vec<OptimizationResult> = sizes
            .iter()
            .enumerate()
            .map(|(i, &(original, optimized))| {
                let path = format!("{}.jpg", i).into();
                if optimized < original {
                    OptimizationResult::committed(path, original, optimized, TargetFormat::Jpeg)
                } else {
                    OptimizationResult::no_improvement(path, original, optimized, TargetFormat::Jpeg)
                }
            })
            .collect();

        let summary = BatchSummary::from_results(
            ProfileName::Standard,
            results,
            false,
            false,
            Duration::ZERO,
        );

        let committed: Vec<_> = sizes.iter().filter(|(o, n)| n < o).collect();
        prop_assert_eq!(summary.committed, committed.len());
        prop_assert_eq!(summary.committed + summary.skipped.no_improvement, sizes.len());
        prop_assert_eq!(
            summary.total_original_bytes,
            committed.iter().map(|(o, _)| *o).sum::<u64>()
        );
        prop_assert!(summary.total_optimized_bytes <= summary.total_original_bytes);
        let committed_shrank = summary
            .results
            .iter()
            .all(|r| r.outcome != Outcome::Committed || r.optimized_size < r.original_size);
        prop_assert!(committed_shrank);
    }
}
