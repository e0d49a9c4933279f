use phptac_core::{ast, ir, LowerOptions, Script};

fn lower(src: &str) -> Vec<String> {
    let script = Script::from_source("loop.php", src);
    let ast = ast::generate_ast_from_source(&script).expect("failed to parse sample");
    ir::lower_ast_to_tac(&ast, &LowerOptions::default())
        .expect("failed to lower sample")
        .lines()
}

#[test]
fn while_repeats_condition_at_the_tail() {
    let lines = lower("<?php while (more($i)) { $i++; }");
    assert_eq!(
        lines,
        vec![
            "L0:",
            "t0 = more($i);",
            "if (t0) goto L1;",
            "goto L0_end;",
            "L1:",
            "$i++;",
            "t0 = more($i);",
            "if (t0) goto L1;",
            "goto L0_end;",
            "L0_end:",
        ]
    );
}

#[test]
fn do_while_tests_after_the_body() {
    let lines = lower("<?php do { $i++; } while ($i < 3);");
    assert_eq!(lines, vec!["L0:", "$i++;", "L1:", "if ($i < 3) goto L0;", "L0_end:"]);
}

#[test]
fn for_chains_comma_conditions_through_intermediate_label() {
    let lines = lower("<?php for ($i = 0; $a, $b; $i++) { echo $i; }");
    assert_eq!(
        lines,
        vec![
            "$i = 0;",
            "L0:",
            "if ($a) goto L3_end;",
            "goto L0_end;",
            "L3_end:",
            "if ($b) goto L1;",
            "goto L0_end;",
            "L1:",
            "echo $i;",
            "L2:",
            "$i++;",
            "goto L0;",
            "L0_end:",
        ]
    );
}

#[test]
fn for_without_condition_falls_into_body() {
    let lines = lower("<?php for (;;) { break; }");
    assert_eq!(lines, vec!["L0:", "L1:", "goto L0_end;", "L2:", "goto L0;", "L0_end:"]);
}

#[test]
fn foreach_tests_iterator_before_and_after_body() {
    let lines = lower("<?php foreach ($arr as $k => $v) { echo $v; }");
    assert_eq!(
        lines,
        vec![
            "foreach ($arr as $k => $v) goto L0;",
            "goto L0_end;",
            "L0:",
            "echo $v;",
            "L1:",
            "foreach ($arr as $k => $v) goto L0;",
            "L0_end:",
        ]
    );
}

#[test]
fn foreach_by_reference_keeps_ampersand() {
    let lines = lower("<?php foreach ($arr as &$v) { $v = 0; }");
    assert_eq!(lines[0], "foreach ($arr as &$v) goto L0;");
}

#[test]
fn break_and_continue_target_enclosing_loop() {
    let lines = lower("<?php while ($a) { if ($b) { break; } continue; }");
    // while: L0 / L0_end, body L1; if: L2 / L2_end
    assert!(lines.contains(&"goto L0_end;".to_string()));
    let after_if = lines.iter().position(|l| l == "L2_end:").unwrap();
    assert_eq!(lines[after_if + 1], "goto L0;");
    let then_start = lines.iter().position(|l| l == "L2:").unwrap();
    assert_eq!(lines[then_start + 1], "goto L0_end;");
}

#[test]
fn break_with_level_leaves_outer_loop() {
    let lines = lower("<?php foreach ($xs as $x) { while ($a) { break 2; } }");
    // foreach: L0 / L0_end, next L1; while: L2 / L2_end, body L3
    let body = lines.iter().position(|l| l == "L3:").unwrap();
    assert_eq!(lines[body + 1], "goto L0_end;");
}

#[test]
fn continue_in_do_while_goes_to_condition() {
    let lines = lower("<?php do { continue; } while ($a);");
    assert_eq!(lines, vec!["L0:", "goto L1;", "L1:", "if ($a) goto L0;", "L0_end:"]);
}

#[test]
fn break_outside_loop_stays_textual() {
    let lines = lower("<?php break; continue 2;");
    assert_eq!(lines, vec!["break;", "continue 2;"]);
}
