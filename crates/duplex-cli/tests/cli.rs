use assert_cmd::Command;
use predicates::prelude::*;
use std::path::{Path, PathBuf};

fn write_png(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
    let path = dir.join(name);
    image::RgbImage::from_pixel(width, height, image::Rgb([20, 90, 160]))
        .save(&path)
        .unwrap();
    path
}

fn duplex() -> Command {
    Command::cargo_bin("duplex").unwrap()
}

#[test]
fn help_lists_subcommands() {
    duplex()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("export"))
        .stdout(predicate::str::contains("stats"))
        .stdout(predicate::str::contains("plan"))
        .stdout(predicate::str::contains("init-config"));
}

#[test]
fn init_config_writes_defaults_once() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("settings.json");

    duplex()
        .arg("init-config")
        .arg(&config)
        .assert()
        .success();
    let json = std::fs::read_to_string(&config).unwrap();
    assert!(json.contains("\"margin_cm\": 1.0"));
    assert!(json.contains("\"mirror_backs\": true"));

    duplex()
        .arg("init-config")
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));
}

#[test]
fn stats_counts_blank_backs_and_auto_mirrors() {
    let dir = tempfile::tempdir().unwrap();
    let images: Vec<PathBuf> = ["a.png", "b.png", "c.png"]
        .iter()
        .map(|name| write_png(dir.path(), name, 20, 10))
        .collect();

    duplex()
        .arg("stats")
        .args(&images)
        .assert()
        .success()
        .stdout(predicate::str::contains("Pairs: 2"))
        .stdout(predicate::str::contains("Output pages: 4"))
        .stdout(predicate::str::contains("Blank backs: 1"))
        .stdout(predicate::str::contains("Auto-mirrored backs: 1"));

    duplex()
        .arg("stats")
        .args(&images)
        .args(["--no-mirror-backs", "--mirror", "2:front:h", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"auto_mirrored_backs\": 0"))
        .stdout(predicate::str::contains("\"explicit_mirrors\": 1"));
}

#[test]
fn export_both_formats() {
    let dir = tempfile::tempdir().unwrap();
    let images: Vec<PathBuf> = ["a.png", "b.png", "c.png", "d.png"]
        .iter()
        .map(|name| write_png(dir.path(), name, 40, 30))
        .collect();
    let stem = dir.path().join("pairs");

    duplex()
        .arg("export")
        .args(&images)
        .args(["--format", "both", "--no-open", "--move", "2:1"])
        .arg("--output-stem")
        .arg(&stem)
        .assert()
        .success()
        .stdout(predicate::str::contains("Exported 4 pages (4 images)"))
        .stdout(predicate::str::contains("[PDF]"))
        .stdout(predicate::str::contains("[DOCX]"));

    let pdf = std::fs::read(dir.path().join("pairs.pdf")).unwrap();
    assert!(pdf.starts_with(b"%PDF"));
    let docx = std::fs::read(dir.path().join("pairs.docx")).unwrap();
    assert!(docx.starts_with(b"PK"));
}

#[test]
fn export_reports_unloadable_images() {
    let dir = tempfile::tempdir().unwrap();
    let good = write_png(dir.path(), "good.png", 10, 10);
    let missing = dir.path().join("missing.png");
    let output = dir.path().join("out.pdf");

    duplex()
        .arg("export")
        .arg(&missing)
        .arg(&good)
        .arg("-o")
        .arg(&output)
        .arg("--no-open")
        .assert()
        .success()
        .stdout(predicate::str::contains("Exported 2 pages (1 images)"))
        .stdout(predicate::str::contains(
            "1 image(s) could not be loaded and were left blank (pairs 1)",
        ));
    assert!(output.exists());
}

#[test]
fn export_rejects_out_of_range_edit() {
    let dir = tempfile::tempdir().unwrap();
    let image = write_png(dir.path(), "a.png", 10, 10);
    let output = dir.path().join("out.pdf");

    duplex()
        .arg("export")
        .arg(&image)
        .args(["--delete", "5", "--no-open", "-o"])
        .arg(&output)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Cannot apply --delete 5"));
    assert!(!output.exists());
}

#[test]
fn export_rejects_unknown_extension() {
    let dir = tempfile::tempdir().unwrap();
    let image = write_png(dir.path(), "a.png", 10, 10);

    duplex()
        .arg("export")
        .arg(&image)
        .arg("-o")
        .arg(dir.path().join("out.txt"))
        .arg("--no-open")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Cannot tell the format"));
}

#[test]
fn invalid_mirror_edit_is_a_usage_error() {
    duplex()
        .args(["stats", "a.png", "--mirror", "1:top:h"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown side"));
}

#[test]
fn no_images_is_an_error() {
    duplex()
        .args(["stats", "notes.txt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No images to process"));
}

#[test]
fn plan_lists_pages_with_blank_back() {
    let dir = tempfile::tempdir().unwrap();
    let image = write_png(dir.path(), "a.png", 72, 36);

    duplex()
        .arg("plan")
        .arg(&image)
        .args(["--no-scale", "--no-trim"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2 pages, 21.00 x 29.70 cm"))
        .stdout(predicate::str::contains("2.54 x 1.27 cm"))
        .stdout(predicate::str::contains("Page 2: pair 1 back: blank"));
}
