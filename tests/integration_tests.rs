mod common;

use assert_cmd::Command;
use assert_fs::prelude::*;
use assert_fs::TempDir;
use predicates::prelude::*;
use std::fs;

fn img_shrink() -> Command {
    Command::cargo_bin("img-shrink").unwrap()
}

fn json_report(cmd: &mut Command) -> serde_json::Value {
    let output = cmd.output().unwrap();
    assert!(output.status.success(), "{:?}", output);
    serde_json::from_slice(&output.stdout).unwrap()
}

#[test]
fn test_cli_help() {
    img_shrink().arg("--help").assert().success();
}

#[test]
fn test_optimize_help() {
    img_shrink()
        .args(["optimize", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--overwrite-backup"));
}

#[test]
fn test_profiles_lists_every_preset() {
    img_shrink()
        .arg("profiles")
        .assert()
        .success()
        .stdout(predicate::str::contains("conservative:"))
        .stdout(predicate::str::contains("standard:"))
        .stdout(predicate::str::contains("aggressive:"))
        .stdout(predicate::str::contains("skip JPEG < 0.8MB"));
}

#[test]
fn test_optimize_missing_args() {
    img_shrink().arg("optimize").assert().failure().code(2);
}

#[test]
fn test_optimize_unknown_profile() {
    img_shrink()
        .args(["optimize", "-i", ".", "--profile", "extreme"])
        .assert()
        .failure()
        .code(2);
}

#[test]
fn test_optimize_nonexistent_input_is_config_error() {
    img_shrink()
        .args(["optimize", "-i", "definitely/not/here.png"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("No usable input paths"));
}

#[test]
fn test_conservative_leaves_small_files_alone() {
    let temp = TempDir::new().unwrap();
    let png = temp.child("icon.png");
    common::write_noise_png(png.path());
    let before = fs::read(png.path()).unwrap();

    img_shrink()
        .args(["optimize", "-i", temp.path().to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Committed: 0"))
        .stdout(predicate::str::contains("already small 1"));

    assert_eq!(fs::read(png.path()).unwrap(), before);
    temp.child("icon.png.backup").assert(predicate::path::missing());
}

#[test]
fn test_aggressive_converts_and_backs_up() {
    let temp = TempDir::new().unwrap();
    let png = temp.child("hero.png");
    common::write_noise_png(png.path());
    let before = fs::read(png.path()).unwrap();

    img_shrink()
        .args([
            "optimize",
            "-i",
            temp.path().to_str().unwrap(),
            "--profile",
            "aggressive",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Conversions"))
        .stdout(predicate::str::contains("hero.webp"));

    temp.child("hero.webp").assert(predicate::path::is_file());
    assert_eq!(fs::read(png.path()).unwrap(), before);
    assert_eq!(fs::read(temp.child("hero.png.backup").path()).unwrap(), before);
}

#[test]
fn test_no_backup_flag_overrides_profile() {
    let temp = TempDir::new().unwrap();
    let jpg = temp.child("photo.jpg");
    common::write_noise_jpeg(jpg.path());
    let before = fs::read(jpg.path()).unwrap();

    img_shrink()
        .args([
            "optimize",
            "-i",
            jpg.path().to_str().unwrap(),
            "-p",
            "aggressive",
            "--no-backup",
        ])
        .assert()
        .success();

    assert!(fs::read(jpg.path()).unwrap().len() < before.len());
    temp.child("photo.jpg.backup")
        .assert(predicate::path::missing());
}

#[test]
fn test_existing_backup_preserved_when_asked() {
    let temp = TempDir::new().unwrap();
    let jpg = temp.child("photo.jpg");
    common::write_noise_jpeg(jpg.path());
    let backup = temp.child("photo.jpg.backup");
    backup.write_str("from an earlier run").unwrap();

    img_shrink()
        .args([
            "optimize",
            "-i",
            jpg.path().to_str().unwrap(),
            "-p",
            "aggressive",
            "--overwrite-backup",
            "false",
        ])
        .assert()
        .success();

    backup.assert("from an earlier run");
}

#[test]
fn test_dry_run_json_report() {
    let temp = TempDir::new().unwrap();
    let png = temp.child("a.png");
    common::write_noise_png(png.path());
    let jpg = temp.child("b.jpg");
    common::write_noise_jpeg(jpg.path());
    let png_before = fs::read(png.path()).unwrap();
    let jpg_before = fs::read(jpg.path()).unwrap();

    let report = json_report(img_shrink().args([
        "optimize",
        "-i",
        temp.path().to_str().unwrap(),
        "-p",
        "aggressive",
        "--dry-run",
        "--report",
        "json",
    ]));

    assert_eq!(report["dry_run"], true);
    assert_eq!(report["committed"], 2);
    assert_eq!(report["results"][0]["outcome"], "committed");
    assert_eq!(report["results"][0]["target"], "webp");
    assert!(report["results"][0]["new_path"]
        .as_str()
        .unwrap()
        .ends_with("a.webp"));

    assert_eq!(fs::read(png.path()).unwrap(), png_before);
    assert_eq!(fs::read(jpg.path()).unwrap(), jpg_before);
    temp.child("a.webp").assert(predicate::path::missing());
    temp.child("a.png.backup").assert(predicate::path::missing());
}

#[test]
fn test_missing_and_unsupported_inputs_are_skips() {
    let temp = TempDir::new().unwrap();
    let gif = temp.child("anim.gif");
    common::write_gif(gif.path());
    let missing = temp.child("gone.jpg");

    let report = json_report(img_shrink().args([
        "optimize",
        "-i",
        gif.path().to_str().unwrap(),
        "-i",
        missing.path().to_str().unwrap(),
        "--report",
        "json",
    ]));

    assert_eq!(report["attempted"], 2);
    assert_eq!(report["skipped"]["unsupported"], 1);
    assert_eq!(report["skipped"]["missing"], 1);
    assert_eq!(report["results"][1]["outcome"], "skipped-missing");
}

#[test]
fn test_failed_file_only_fails_the_run_when_asked() {
    let temp = TempDir::new().unwrap();
    let corrupt = temp.child("broken.png");
    common::write_corrupt_png(corrupt.path());
    let good = temp.child("fine.png");
    common::write_loose_png(good.path());
    let dir = temp.path().to_str().unwrap();

    img_shrink()
        .args(["optimize", "-i", dir, "-p", "standard", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Failed: 1"))
        .stdout(predicate::str::contains("Committed: 1"));

    img_shrink()
        .args([
            "optimize",
            "-i",
            dir,
            "-p",
            "standard",
            "--dry-run",
            "--fail-on-error",
        ])
        .assert()
        .failure()
        .code(1);
}

#[test]
fn test_parallel_run_matches_sequential() {
    let temp = TempDir::new().unwrap();
    for i in 0..4 {
        common::write_noise_png(temp.child(format!("n{}.png", i)).path());
    }
    common::write_loose_png(temp.child("g.png").path());
    let dir = temp.path().to_str().unwrap();

    let sequential = json_report(img_shrink().args([
        "optimize", "-i", dir, "-p", "standard", "--dry-run", "--report", "json",
    ]));
    let parallel = json_report(img_shrink().args([
        "optimize", "-i", dir, "-p", "standard", "--dry-run", "--report", "json", "--jobs",
        "3",
    ]));

    assert_eq!(sequential["results"], parallel["results"]);
    assert_eq!(
        sequential["total_optimized_bytes"],
        parallel["total_optimized_bytes"]
    );
}
