use std::fs;

use assert_cmd::Command;

fn phptac() -> Command {
    Command::cargo_bin("phptac").expect("phptac binary not built")
}

#[test]
fn batch_writes_listings_next_to_input_dir() {
    let tmp = tempfile::tempdir().unwrap();
    let src = tmp.path().join("site");
    fs::create_dir_all(src.join("lib")).unwrap();
    fs::write(src.join("index.php"), "<?php echo f(1);").unwrap();
    fs::write(src.join("lib/broken.php"), "<?php if (").unwrap();

    let output = phptac().arg("batch").arg(&src).arg("--json").output().unwrap();
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("\"status\": \"ok\""), "{}", stdout);
    assert!(stdout.contains("\"status\": \"parse_error\""), "{}", stdout);

    let listing = fs::read_to_string(tmp.path().join("site_TAC/index.php")).unwrap();
    assert_eq!(listing, "<?php\nt0 = f(1);\necho t0;\n?>");
    let failed = fs::read_to_string(tmp.path().join("site_TAC/lib/broken.php")).unwrap();
    assert!(failed.starts_with("Parse Error:"));
}

#[test]
fn batch_on_missing_dir_fails() {
    let tmp = tempfile::tempdir().unwrap();
    phptac().arg("batch").arg(tmp.path().join("missing")).assert().failure();
}

#[test]
fn lower_prints_listing_to_stdout() {
    let tmp = tempfile::tempdir().unwrap();
    let file = tmp.path().join("a.php");
    fs::write(&file, "<?php switch ($x) { case 1: echo 1; case 2: echo 2; }").unwrap();

    let output = phptac().arg("lower").arg(&file).output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.matches("break;").count(), 2);

    let output = phptac().arg("lower").arg("--fallthrough").arg(&file).output().unwrap();
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.matches("break;").count(), 0);
}

#[test]
fn lower_writes_output_file() {
    let tmp = tempfile::tempdir().unwrap();
    let file = tmp.path().join("a.php");
    let out = tmp.path().join("a.tac");
    fs::write(&file, "<?php $a = g();").unwrap();

    phptac().arg("lower").arg(&file).arg("-o").arg(&out).assert().success();
    assert_eq!(fs::read_to_string(out).unwrap(), "t0 = g();\n$a = t0;");
}

#[test]
fn ast_rejects_invalid_php() {
    let tmp = tempfile::tempdir().unwrap();
    let file = tmp.path().join("bad.php");
    fs::write(&file, "<?php function (").unwrap();

    let output = phptac().arg("ast").arg(&file).output().unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("PHPTAC | ERROR"));
}

#[test]
fn lower_json_lists_instructions_and_labels() {
    let tmp = tempfile::tempdir().unwrap();
    let file = tmp.path().join("loop.php");
    fs::write(&file, "<?php do { $i++; } while ($i < 3);").unwrap();

    let output = phptac().arg("lower").arg("--json").arg(&file).output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("\"if ($i < 3) goto L0;\""), "{}", stdout);
    assert!(stdout.contains("\"L0_end\""), "{}", stdout);
}

#[test]
fn lower_reports_runaway_nesting_without_crashing() {
    let tmp = tempfile::tempdir().unwrap();
    let file = tmp.path().join("deep.php");
    let src = format!("<?php {}echo 1;{}", "if ($a) { ".repeat(1000), " }".repeat(1000));
    fs::write(&file, src).unwrap();

    let output = phptac().arg("lower").arg(&file).output().unwrap();
    assert!(!output.status.success());
    assert!(output.status.code().is_some(), "killed by a signal");
    assert!(String::from_utf8_lossy(&output.stderr).contains("PHPTAC | ERROR"));
}
