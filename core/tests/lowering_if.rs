use std::collections::HashSet;

use phptac_core::{ast, ir, Listing, LowerOptions, Script};

fn listing(src: &str) -> Listing {
    let script = Script::from_source("if.php", src);
    let ast = ast::generate_ast_from_source(&script).expect("failed to parse sample");
    ir::lower_ast_to_tac(&ast, &LowerOptions::default()).expect("failed to lower sample")
}

fn assert_well_formed(listing: &Listing) {
    let labels = listing.labels();
    let defined: HashSet<&str> = labels.iter().copied().collect();
    assert_eq!(defined.len(), labels.len(), "label defined twice:\n{}", listing);
    for target in listing.jump_targets() {
        assert!(defined.contains(target), "jump to undefined label {}:\n{}", target, listing);
    }
}

#[test]
fn if_without_else_jumps_to_end() {
    let out = listing("<?php if ($a) { echo 1; }");
    assert_eq!(
        out.lines(),
        vec!["if ($a) goto L0;", "goto L0_end;", "L0:", "echo 1;", "goto L0_end;", "L0_end:"]
    );
}

#[test]
fn if_else_orders_then_before_else() {
    let out = listing("<?php if ($a > 1) { echo 1; } else { echo 2; }");
    assert_eq!(
        out.lines(),
        vec![
            "if ($a > 1) goto L0;",
            "goto L1;",
            "L0:",
            "echo 1;",
            "goto L0_end;",
            "L1:",
            "echo 2;",
            "goto L0_end;",
            "L0_end:",
        ]
    );
    assert_well_formed(&out);
}

#[test]
fn condition_effects_come_before_the_test() {
    let out = listing("<?php if (check($a)) { return; }");
    let lines = out.lines();
    assert_eq!(lines[0], "t0 = check($a);");
    assert_eq!(lines[1], "if (t0) goto L0;");
    assert!(lines.contains(&"return;".to_string()));
}

#[test]
fn nested_ifs_get_distinct_labels() {
    let out = listing(
        "<?php
        if ($a) {
            if ($b) { echo 1; } else { echo 2; }
        } elseif ($c) {
            echo 3;
        } else {
            if ($d) { echo 4; }
        }",
    );
    assert_well_formed(&out);
    let text = out.render();
    assert!(text.contains("if ($b) goto"));
    assert!(text.contains("if ($c) goto"));
    assert!(text.contains("if ($d) goto"));
    // three labels for each if with an else, two for the last one
    assert_eq!(out.labels().len(), 11);
}

#[test]
fn single_statement_branches_are_lowered() {
    let out = listing("<?php if ($a) echo 'yes'; else echo 'no';");
    let lines = out.lines();
    assert!(lines.contains(&"echo 'yes';".to_string()));
    assert!(lines.contains(&"echo 'no';".to_string()));
    assert_well_formed(&out);
}
