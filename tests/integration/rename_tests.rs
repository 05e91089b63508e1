//! End-to-end renaming scenarios.

use fortran_flow::ast::types::Annotated;
use fortran_flow::ast::visit::exprs_in_blocks;
use fortran_flow::{init_analysis, rename, strip_analysis};

use crate::support::*;

fn body_var_names(pu: &fortran_flow::ast::ProgramUnit<Anno>) -> Vec<String> {
    let mut exprs = Vec::new();
    exprs_in_blocks(pu.body(), &mut exprs);
    exprs.iter().filter_map(|e| e.source_var().cloned()).collect()
}

#[test]
fn trivial_rename() {
    // subroutine foo(x)
    //   x = x + 1
    // end
    let pf = file(vec![subroutine(
        "foo",
        &["x"],
        vec![assign(var("x"), add(var("x"), int("1")))],
    )]);
    let (pf, _) = rename(init_analysis(strip_analysis(pf)));

    let pu = &pf.program_units[0];
    assert_eq!(pu.anno().unique_name.as_deref(), Some("__foo1"));

    // Every occurrence of x, argument list included, is rewritten.
    let body = body_var_names(pu);
    assert_eq!(body, vec!["__foo1_x2", "__foo1_x2"]);
    let arg = pu.args().unwrap()[0].source_var().cloned().unwrap();
    assert_eq!(arg, "__foo1_x2");
}

#[test]
fn sibling_locals_are_collision_free() {
    // Two sibling subroutines each declaring a local i.
    let mk = |name: &str| {
        subroutine(
            name,
            &[],
            vec![declaration(&["i"]), assign(var("i"), int("0"))],
        )
    };
    let pf = file(vec![mk("foo"), mk("bar")]);
    let (pf, _) = rename(init_analysis(strip_analysis(pf)));

    let foo_i = &body_var_names(&pf.program_units[0])[0];
    let bar_i = &body_var_names(&pf.program_units[1])[0];
    assert_ne!(foo_i, bar_i, "sibling locals must not share a unique name");
    // Each body is internally consistent.
    assert_eq!(body_var_names(&pf.program_units[0]), vec![foo_i.clone(); 2]);
    assert_eq!(body_var_names(&pf.program_units[1]), vec![bar_i.clone(); 2]);
}

#[test]
fn rename_is_idempotent_end_to_end() {
    let pf = file(vec![
        subroutine(
            "foo",
            &["x"],
            vec![declaration(&["t"]), assign(var("t"), var("x"))],
        ),
        main_unit("main", vec![call_stmt("foo", Some(vec![var("y")]))]),
    ]);
    let (once, _) = rename(init_analysis(strip_analysis(pf)));
    let (twice, _) = rename(once.clone());
    assert_eq!(twice, once);
}

#[test]
fn scope_state_is_balanced_after_rename() {
    let pf = file(vec![
        subroutine("a", &["p"], vec![assign(var("p"), int("1"))]),
        subroutine("b", &[], vec![declaration(&["q"])]),
    ]);
    let (_, state) = rename(init_analysis(strip_analysis(pf)));
    assert_eq!(state.scope_stack, vec!["_".to_string()]);
    assert_eq!(state.env_stack.len(), 1);
    assert!(state.env_stack[0].is_empty());
}

#[test]
fn unique_names_are_injective_across_the_file() {
    let pf = file(vec![
        subroutine("s1", &["v"], vec![declaration(&["v"]), declaration(&["w"])]),
        subroutine("s2", &["v", "w"], vec![declaration(&["u"])]),
    ]);
    let (pf, _) = rename(init_analysis(strip_analysis(pf)));

    let mut seen = std::collections::HashSet::new();
    for pu in &pf.program_units {
        let unit = pu.anno().unique_name.clone().unwrap();
        assert!(seen.insert(unit), "unit names must be unique");
        let mut exprs = Vec::new();
        exprs_in_blocks(pu.body(), &mut exprs);
        if let Some(args) = pu.args() {
            exprs.extend(args.iter());
        }
        let mut bindings = std::collections::HashSet::new();
        for e in exprs {
            if let Some(u) = e.anno().unique_name.clone() {
                bindings.insert(u);
            }
        }
        for u in bindings {
            assert!(seen.insert(u), "binding unique names must not collide");
        }
    }
}

#[test]
fn annotation_round_trip_survives_renaming_setup() {
    let pf = file(vec![subroutine(
        "foo",
        &["x"],
        vec![assign(var("x"), int("1"))],
    )]);
    let plain = strip_analysis(pf);
    assert_eq!(strip_analysis(init_analysis(plain.clone())), plain);
}
