use phptac_core::{ast, ir, LowerOptions, Script};

const SAMPLE: &str = r#"<?php
switch ($x) {
    case 1:
        echo 'a';
    case 2:
        echo 'b';
        break;
    default:
        echo 'c';
}
"#;

fn lower_with(src: &str, options: &LowerOptions) -> Vec<String> {
    let script = Script::from_source("switch.php", src);
    let ast = ast::generate_ast_from_source(&script).expect("failed to parse sample");
    ir::lower_ast_to_tac(&ast, options).expect("failed to lower sample").lines()
}

#[test]
fn cases_get_an_implicit_break_by_default() {
    let lines = lower_with(SAMPLE, &LowerOptions::default());
    assert_eq!(
        lines,
        vec![
            "switch ($x) {",
            "case 1:",
            "echo 'a';",
            "break;",
            "case 2:",
            "echo 'b';",
            "break;",
            "break;",
            "default:",
            "echo 'c';",
            "break;",
            "}",
        ]
    );
}

#[test]
fn fallthrough_option_keeps_php_semantics() {
    let options = LowerOptions { switch_fallthrough: true, ..LowerOptions::default() };
    let lines = lower_with(SAMPLE, &options);
    assert_eq!(
        lines,
        vec![
            "switch ($x) {",
            "case 1:",
            "echo 'a';",
            "case 2:",
            "echo 'b';",
            "break;",
            "default:",
            "echo 'c';",
            "}",
        ]
    );
}

#[test]
fn case_test_effects_precede_the_label() {
    let lines = lower_with("<?php switch (kind()) { case limit(): echo 1; }", &LowerOptions::default());
    assert_eq!(
        lines,
        vec!["t0 = kind();", "switch (t0) {", "t1 = limit();", "case t1:", "echo 1;", "break;", "}"]
    );
}

#[test]
fn continue_two_inside_switch_targets_the_loop() {
    let lines = lower_with(
        "<?php while ($a) { switch ($x) { case 1: continue 2; } }",
        &LowerOptions::default(),
    );
    let case = lines.iter().position(|l| l == "case 1:").unwrap();
    assert_eq!(lines[case + 1], "goto L0;");

    let lines = lower_with(
        "<?php while ($a) { switch ($x) { case 1: continue; } }",
        &LowerOptions::default(),
    );
    let case = lines.iter().position(|l| l == "case 1:").unwrap();
    assert_eq!(lines[case + 1], "break;");
}
