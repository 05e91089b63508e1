//! Call-map and reporting facade scenarios.

use fortran_flow::{data_flow_json, gen_call_map, show_data_flow, unit_report};

use crate::support::*;

#[test]
fn call_map_collects_calls_and_function_references() {
    // main calls foo and references bar(...); foo calls nothing.
    let pf = file(vec![
        main_unit(
            "main",
            vec![
                call_stmt("foo", Some(vec![var("a")])),
                assign(var("y"), fn_call("bar", vec![var("a")])),
            ],
        ),
        subroutine("foo", &["a"], vec![]),
    ]);

    let cm = gen_call_map(&pf);
    assert_eq!(cm["main"], name_set(&["foo", "bar"]));
    assert_eq!(cm["foo"], name_set(&[]));
    assert_eq!(cm.len(), 2);
}

fn analyzed_file() -> fortran_flow::ast::ProgramFile<Anno> {
    // One unit with a loop-shaped graph so every relation is non-trivial.
    let gr = graph(
        vec![
            (0, vec![labeled(assign(var("x"), int("0")), 1)]),
            (1, vec![labeled(assign(var("x"), var("x")), 2)]),
            (2, vec![labeled(print_of("x"), 3)]),
        ],
        &[(0, 1), (1, 1), (1, 2)],
    );
    let mut pu = main_unit("main", vec![call_stmt("helper", None)]);
    attach_graph(&mut pu, gr);
    file(vec![pu, subroutine("helper", &[], vec![])])
}

#[test]
fn report_lists_every_relation_in_order() {
    let pf = analyzed_file();
    let report = show_data_flow(&pf);

    assert!(report.starts_with("== main =="));
    let relations = [
        "callMap:",
        "postOrder:",
        "revPostOrder:",
        "revPreOrder:",
        "dominators:",
        "iDominators:",
        "lva:",
        "rd:",
        "backEdges:",
        "topsort:",
        "scc:",
        "loopNodes:",
        "duMap:",
        "udMap:",
        "flowsTo:",
    ];
    let mut at = 0;
    for rel in relations {
        let pos = report[at..]
            .find(rel)
            .unwrap_or_else(|| panic!("relation {rel} missing or out of order"));
        at += pos;
    }

    // The self-loop shows up where it should.
    assert!(report.contains("backEdges:\n  1 -> 1"));
    assert!(report.contains("loopNodes: [{1}]"));
}

#[test]
fn report_is_deterministic() {
    let pf = analyzed_file();
    assert_eq!(show_data_flow(&pf), show_data_flow(&pf));
    assert_eq!(
        data_flow_json(&pf).to_string(),
        data_flow_json(&pf).to_string()
    );
}

#[test]
fn units_without_graphs_are_skipped_in_bulk_but_loud_alone() {
    let pf = file(vec![subroutine("bare", &[], vec![])]);
    assert!(show_data_flow(&pf).is_empty());

    let cm = gen_call_map(&pf);
    let err = unit_report(&pf.program_units[0], &cm).unwrap_err();
    assert!(err.to_string().contains("no basic-block graph"));
}

#[test]
fn failed_units_appear_in_both_facades() {
    // Two AST-blocks sharing a label: analysis fails, and both facades
    // must still surface the unit, carrying the error.
    let gr = graph(
        vec![(
            0,
            vec![
                labeled(assign(var("x"), int("1")), 7),
                labeled(assign(var("y"), int("2")), 7),
            ],
        )],
        &[],
    );
    let mut pu = main_unit("broken", vec![]);
    attach_graph(&mut pu, gr);
    let pf = file(vec![pu]);

    let text = show_data_flow(&pf);
    assert!(text.starts_with("== broken =="));
    assert!(text.contains("error: duplicate instruction label 7"));

    let json = data_flow_json(&pf);
    assert_eq!(json["units"][0]["name"], "broken");
    assert_eq!(
        json["units"][0]["error"],
        "duplicate instruction label 7"
    );
}

#[test]
fn json_twin_mirrors_the_text_report() {
    let pf = analyzed_file();
    let json = data_flow_json(&pf);

    assert_eq!(json["units"][0]["name"], "main");
    assert_eq!(json["callMap"]["main"][0], "helper");
    assert_eq!(json["units"][0]["backEdges"]["1"], 1);
    assert_eq!(json["units"][0]["rd"]["2"]["in"][0], 2);
    assert!(json["units"][0]["lva"].is_object());
}
