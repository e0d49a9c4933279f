use std::fs;
use std::path::Path;

use phptac_core::batch::{convert_directory_with, find_php_files};
use phptac_core::{convert_directory, BatchOptions, FileStatus, LowerOptions};
use tempfile::TempDir;

fn write(path: &Path, text: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, text).unwrap();
}

fn sample_tree() -> (TempDir, std::path::PathBuf) {
    let tmp = tempfile::tempdir().expect("failed to create tempdir");
    let src = tmp.path().join("src");
    write(&src.join("good.php"), "<?php $r = f($a);");
    write(&src.join("nested/deep.php"), "<?php while ($a) { $a--; }");
    write(&src.join("bad.php"), "<?php $a = ;");
    write(&src.join("notes.txt"), "not php");
    (tmp, src)
}

#[test]
fn only_php_files_are_picked_up() {
    let (_tmp, src) = sample_tree();
    let files = find_php_files(&src).unwrap();
    let names: Vec<String> = files
        .iter()
        .map(|p| p.strip_prefix(&src).unwrap().to_string_lossy().replace('\\', "/"))
        .collect();
    assert_eq!(names, vec!["bad.php", "good.php", "nested/deep.php"]);
}

#[test]
fn batch_mirrors_tree_and_keeps_going_after_errors() {
    let (tmp, src) = sample_tree();
    let report = convert_directory(&src, &BatchOptions::default()).expect("batch run failed");

    let out = tmp.path().join("src_TAC");
    assert_eq!(report.output_root, out);
    assert_eq!(report.total(), 3);
    assert_eq!(report.succeeded(), 2);
    assert_eq!(report.count(FileStatus::ParseError), 1);

    let good = fs::read_to_string(out.join("good.php")).unwrap();
    assert_eq!(good, "<?php\nt0 = f($a);\n$r = t0;\n?>");

    let deep = fs::read_to_string(out.join("nested/deep.php")).unwrap();
    assert!(deep.starts_with("<?php\nL0:\n"));
    assert!(deep.ends_with("L0_end:\n?>"));

    let bad = fs::read_to_string(out.join("bad.php")).unwrap();
    assert!(bad.starts_with("Parse Error: Syntax error"), "{}", bad);
    assert!(!out.join("notes.txt").exists());

    let entry = report.file(&src.join("bad.php")).expect("bad.php is reported");
    assert_eq!(entry.status, FileStatus::ParseError);
}

#[test]
fn unwrapped_output_and_options_reach_every_file() {
    let tmp = tempfile::tempdir().unwrap();
    let src = tmp.path().join("app");
    write(&src.join("s.php"), "<?php switch ($x) { case 1: echo 1; case 2: echo 2; }");

    let options = BatchOptions {
        wrap_php_tags: false,
        output_suffix: "_out".into(),
        jobs: 2,
        lower: LowerOptions { switch_fallthrough: true, ..LowerOptions::default() },
    };
    let seen = std::sync::atomic::AtomicUsize::new(0);
    let report = convert_directory_with(&src, &options, |_| {
        seen.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
    })
    .unwrap();

    assert_eq!(seen.into_inner(), 1);
    assert_eq!(report.failed(), 0);
    let text = fs::read_to_string(tmp.path().join("app_out/s.php")).unwrap();
    assert_eq!(text, "switch ($x) {\ncase 1:\necho 1;\ncase 2:\necho 2;\n}");
}

#[test]
fn missing_directory_is_an_error() {
    let tmp = tempfile::tempdir().unwrap();
    let err = convert_directory(&tmp.path().join("nope"), &BatchOptions::default()).unwrap_err();
    assert!(err.contains("not a directory"));
}

#[test]
fn runaway_nesting_fails_one_file_and_spares_the_rest() {
    let tmp = tempfile::tempdir().unwrap();
    let src = tmp.path().join("src");
    let mut deep = String::from("<?php\n");
    for _ in 0..1000 {
        deep.push_str("if ($a) {\n");
    }
    deep.push_str("echo 1;\n");
    for _ in 0..1000 {
        deep.push_str("}\n");
    }
    write(&src.join("a_ok.php"), "<?php echo 1;");
    write(&src.join("b_deep.php"), &deep);

    let report = convert_directory(&src, &BatchOptions::default()).expect("batch run failed");
    assert_eq!(report.total(), 2);
    assert_eq!(report.succeeded(), 1);

    let entry = report.file(&src.join("b_deep.php")).expect("b_deep.php is reported");
    assert_eq!(entry.status, FileStatus::ParseError);
    let text = fs::read_to_string(tmp.path().join("src_TAC/b_deep.php")).unwrap();
    assert!(text.starts_with("Parse Error:"), "{}", text);

    let ok = report.file(&src.join("a_ok.php")).expect("a_ok.php is reported");
    assert_eq!(ok.status, FileStatus::Ok);
}
