//! Presentation facade for the derived relations.
//!
//! [`show_data_flow`] renders every analyzed program unit as text;
//! [`data_flow_json`] is its JSON twin. Output is deterministic: relations
//! appear in a fixed order and every set or map is sorted before rendering.
//! Units are independent, so their sections are computed in parallel and
//! emitted in source order.

use rayon::prelude::*;
use rustc_hash::FxHashSet;
use serde_json::json;
use std::fmt::Write as _;

use crate::ast::annotation::{pu_name, Analysis};
use crate::ast::types::{Name, ProgramFile, ProgramUnit};
use crate::ast::Annotated;
use crate::callgraph::{gen_call_map, CallMap};
use crate::cfg::graph::{
    dominators, idominators, post_order, rev_post_order, rev_pre_order, scc, topsort,
};
use crate::cfg::types::BBGr;
use crate::dataflow::live_variables::{live_variables, LiveVariables};
use crate::dataflow::loops::{back_edges, loop_nodes, BackEdgeMap};
use crate::dataflow::reaching_definitions::{
    def_map, du_map, flows_to, reaching_definitions, ud_map, DUMap, FlowsGraph,
    ReachingDefinitions, UDMap,
};
use crate::error::{AnalysisError, Result};

/// Every derived relation for one program unit, computed in one pass.
struct UnitDataFlow {
    name: Name,
    post_order: Vec<usize>,
    rev_post_order: Vec<usize>,
    rev_pre_order: Vec<usize>,
    dominators: crate::cfg::graph::DomMap,
    idominators: crate::cfg::graph::IDomMap,
    lva: LiveVariables,
    rd: ReachingDefinitions,
    back_edges: BackEdgeMap,
    topsort: Vec<usize>,
    scc: Vec<Vec<usize>>,
    loop_nodes: Vec<FxHashSet<usize>>,
    du: DUMap,
    ud: UDMap,
    flows: FlowsGraph,
}

fn analyze_unit<A>(name: Name, gr: &BBGr<A>) -> Result<UnitDataFlow> {
    let bm = gr.block_map()?;
    let dm = def_map(&bm);
    let rd = reaching_definitions(gr, &dm);
    let du = du_map(gr, &bm, &dm, &rd);
    let ud = ud_map(&du);
    let flows = flows_to(&bm, &du);
    Ok(UnitDataFlow {
        name,
        post_order: post_order(gr),
        rev_post_order: rev_post_order(gr),
        rev_pre_order: rev_pre_order(gr),
        dominators: dominators(gr),
        idominators: idominators(gr),
        lva: live_variables(gr),
        rd,
        back_edges: back_edges(gr),
        topsort: topsort(gr),
        scc: scc(gr),
        loop_nodes: loop_nodes(gr),
        du,
        ud,
        flows,
    })
}

/// Program units carrying a basic-block graph, in source order, nested
/// procedures after their parent.
fn analyzable_units<A>(pf: &ProgramFile<Analysis<A>>) -> Vec<&ProgramUnit<Analysis<A>>> {
    fn walk<'a, A>(pu: &'a ProgramUnit<Analysis<A>>, out: &mut Vec<&'a ProgramUnit<Analysis<A>>>) {
        if pu.anno().b_blocks.is_some() {
            out.push(pu);
        }
        for sp in pu.subprograms() {
            walk(sp, out);
        }
    }
    let mut out = Vec::new();
    for pu in &pf.program_units {
        walk(pu, &mut out);
    }
    out
}

/// Render the dataflow report for every analyzed unit in the file.
///
/// Units without a basic-block graph are silently skipped; use
/// [`unit_report`] for the loud single-unit variant.
pub fn show_data_flow<A: Sync>(pf: &ProgramFile<Analysis<A>>) -> String {
    let call_map = gen_call_map(pf);
    let units = analyzable_units(pf);
    let sections: Vec<String> = units
        .par_iter()
        .map(|pu| {
            // block_map errors only on duplicate labels, which the
            // partitioner rules out; render the message instead of hiding
            // the unit entirely.
            unit_section(pu, &call_map).unwrap_or_else(|e| format!("== {} ==\nerror: {e}\n", pu_name(pu)))
        })
        .collect();
    sections.join("\n")
}

/// Render the report for a single program unit.
///
/// # Errors
///
/// [`AnalysisError::MissingBasicBlocks`] when the unit has not been through
/// the basic-block pass.
pub fn unit_report<A>(pu: &ProgramUnit<Analysis<A>>, call_map: &CallMap) -> Result<String> {
    if pu.anno().b_blocks.is_none() {
        return Err(AnalysisError::MissingBasicBlocks { unit: pu_name(pu) });
    }
    unit_section(pu, call_map)
}

fn unit_section<A>(pu: &ProgramUnit<Analysis<A>>, call_map: &CallMap) -> Result<String> {
    let gr = pu
        .anno()
        .b_blocks
        .as_deref()
        .ok_or_else(|| AnalysisError::MissingBasicBlocks { unit: pu_name(pu) })?;
    let dataflow = analyze_unit(pu_name(pu), gr)?;

    let mut s = String::new();
    let _ = writeln!(s, "== {} ==", dataflow.name);
    let _ = writeln!(s, "callMap:");
    for unit in sorted_keys(call_map) {
        let _ = writeln!(s, "  {} -> {}", unit, fmt_name_set(&call_map[unit]));
    }
    let _ = writeln!(s, "postOrder: {:?}", dataflow.post_order);
    let _ = writeln!(s, "revPostOrder: {:?}", dataflow.rev_post_order);
    let _ = writeln!(s, "revPreOrder: {:?}", dataflow.rev_pre_order);

    let _ = writeln!(s, "dominators:");
    for n in sorted_keys(&dataflow.dominators) {
        let _ = writeln!(s, "  {} -> {}", n, fmt_label_set(&dataflow.dominators[n]));
    }
    let _ = writeln!(s, "iDominators:");
    for n in sorted_keys(&dataflow.idominators) {
        let _ = writeln!(s, "  {} -> {}", n, dataflow.idominators[n]);
    }

    let _ = writeln!(s, "lva:");
    for n in sorted_keys(&dataflow.lva.live_in) {
        let _ = writeln!(
            s,
            "  {}: in={} out={}",
            n,
            fmt_name_set(&dataflow.lva.live_in[n]),
            fmt_name_set(&dataflow.lva.live_out[n]),
        );
    }
    let _ = writeln!(s, "rd:");
    for n in sorted_keys(&dataflow.rd.reach_in) {
        let _ = writeln!(
            s,
            "  {}: in={} out={}",
            n,
            fmt_label_set(&dataflow.rd.reach_in[n]),
            fmt_label_set(&dataflow.rd.reach_out[n]),
        );
    }

    let _ = writeln!(s, "backEdges:");
    for n in sorted_keys(&dataflow.back_edges) {
        let _ = writeln!(s, "  {} -> {}", n, dataflow.back_edges[n]);
    }
    let _ = writeln!(s, "topsort: {:?}", dataflow.topsort);
    let _ = writeln!(s, "scc: {:?}", dataflow.scc);
    let _ = writeln!(
        s,
        "loopNodes: [{}]",
        dataflow
            .loop_nodes
            .iter()
            .map(fmt_label_set)
            .collect::<Vec<_>>()
            .join(", ")
    );

    let _ = writeln!(s, "duMap:");
    for l in sorted_keys(&dataflow.du) {
        let _ = writeln!(s, "  {} -> {}", l, fmt_label_set(&dataflow.du[l]));
    }
    let _ = writeln!(s, "udMap:");
    for l in sorted_keys(&dataflow.ud) {
        let _ = writeln!(s, "  {} -> {}", l, fmt_label_set(&dataflow.ud[l]));
    }
    let _ = writeln!(s, "flowsTo:");
    for l in sorted_keys(&dataflow.flows.edges) {
        let _ = writeln!(s, "  {} -> {}", l, fmt_label_set(&dataflow.flows.edges[l]));
    }
    Ok(s)
}

/// JSON twin of [`show_data_flow`]. Sets become sorted arrays so the output
/// is byte-stable.
pub fn data_flow_json<A: Sync>(pf: &ProgramFile<Analysis<A>>) -> serde_json::Value {
    let call_map = gen_call_map(pf);
    let units = analyzable_units(pf);
    let sections: Vec<serde_json::Value> = units
        .par_iter()
        .filter_map(|pu| {
            let gr = pu.anno().b_blocks.as_deref()?;
            // Mirror the text facade: a unit that fails to analyze still
            // gets an entry, carrying the error instead of its relations.
            Some(match analyze_unit(pu_name(pu), gr) {
                Ok(dataflow) => unit_json(&dataflow),
                Err(e) => json!({
                    "name": pu_name(pu),
                    "error": e.to_string(),
                }),
            })
        })
        .collect();
    json!({
        "callMap": sorted_keys(&call_map)
            .into_iter()
            .map(|k| (k.clone(), json!(sorted_names(&call_map[k]))))
            .collect::<serde_json::Map<_, _>>(),
        "units": sections,
    })
}

fn unit_json(dataflow: &UnitDataFlow) -> serde_json::Value {
    json!({
        "name": dataflow.name,
        "postOrder": dataflow.post_order,
        "revPostOrder": dataflow.rev_post_order,
        "revPreOrder": dataflow.rev_pre_order,
        "dominators": usize_map_json(&dataflow.dominators, |s| json!(sorted_labels(s))),
        "iDominators": usize_map_json(&dataflow.idominators, |&d| json!(d)),
        "lva": in_out_json(&dataflow.lva.live_in, &dataflow.lva.live_out, |s| {
            json!(sorted_names(s))
        }),
        "rd": in_out_json(&dataflow.rd.reach_in, &dataflow.rd.reach_out, |s| {
            json!(sorted_labels(s))
        }),
        "backEdges": usize_map_json(&dataflow.back_edges, |&t| json!(t)),
        "topsort": dataflow.topsort,
        "scc": dataflow.scc,
        "loopNodes": dataflow.loop_nodes.iter().map(|s| json!(sorted_labels(s))).collect::<Vec<_>>(),
        "duMap": usize_map_json(&dataflow.du, |s| json!(sorted_labels(s))),
        "udMap": usize_map_json(&dataflow.ud, |s| json!(sorted_labels(s))),
        "flowsTo": usize_map_json(&dataflow.flows.edges, |s| json!(sorted_labels(s))),
    })
}

// =============================================================================
// Formatting helpers
// =============================================================================

fn sorted_keys<K: Ord, V>(map: &rustc_hash::FxHashMap<K, V>) -> Vec<&K> {
    let mut keys: Vec<&K> = map.keys().collect();
    keys.sort();
    keys
}

fn fmt_label_set(s: &FxHashSet<usize>) -> String {
    let labels = sorted_labels(s);
    let inner = labels
        .iter()
        .map(usize::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    format!("{{{inner}}}")
}

fn fmt_name_set(s: &FxHashSet<Name>) -> String {
    format!("{{{}}}", sorted_names(s).join(", "))
}

fn sorted_labels(s: &FxHashSet<usize>) -> Vec<usize> {
    let mut v: Vec<usize> = s.iter().copied().collect();
    v.sort_unstable();
    v
}

fn sorted_names(s: &FxHashSet<Name>) -> Vec<String> {
    let mut v: Vec<String> = s.iter().cloned().collect();
    v.sort();
    v
}

fn usize_map_json<V>(
    map: &rustc_hash::FxHashMap<usize, V>,
    f: impl Fn(&V) -> serde_json::Value,
) -> serde_json::Map<String, serde_json::Value> {
    let mut keys: Vec<usize> = map.keys().copied().collect();
    keys.sort_unstable();
    keys.into_iter()
        .map(|k| (k.to_string(), f(&map[&k])))
        .collect()
}

fn in_out_json<V>(
    ins: &rustc_hash::FxHashMap<usize, V>,
    outs: &rustc_hash::FxHashMap<usize, V>,
    f: impl Fn(&V) -> serde_json::Value,
) -> serde_json::Map<String, serde_json::Value> {
    let mut keys: Vec<usize> = ins.keys().copied().collect();
    keys.sort_unstable();
    keys.into_iter()
        .map(|n| {
            let out = outs.get(&n).map(&f).unwrap_or_else(|| json!([]));
            (n.to_string(), json!({"in": f(&ins[&n]), "out": out}))
        })
        .collect()
}
