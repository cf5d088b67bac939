//! `states.rs` for the generated crate.
//!
//! Each `STATES` element becomes an enum of its states and a constant table
//! of transitions, one entry per row. Cells that name elements or hold
//! expressions are carried as text; the generated runtime decides how to
//! evaluate them.

use rustc_hash::FxHashSet;
use tebnf_codec::render::{type_name, SourceWriter};
use tebnf_ir::{
    pascal_case, snake_case, Condition, ElementKind, ElementTable, NodeId, RowOutput, StateRow,
    SubElementRole, SyntaxTree, Target, TokenId, TokenList,
};

/// Source of `states.rs`, or `None` when the grammar has no state tables.
#[tracing::instrument(level = "debug", skip_all)]
pub fn render_states(tree: &SyntaxTree, elements: &ElementTable, tokens: &TokenList) -> Option<String> {
    let tables: Vec<NodeId> = elements
        .iter()
        .filter(|&id| tree.element(id).is_some_and(|e| e.kind == ElementKind::StateTable))
        .collect();
    if tables.is_empty() {
        return None;
    }

    let mut w = SourceWriter::new();
    w.writeln("//! State tables generated by tebnfc.");
    w.newline();
    write_transition_struct(&mut w);
    let cells = Cells { tree, tokens };
    for table in tables {
        w.newline();
        write_table(&mut w, &cells, table);
    }
    Some(w.take_output())
}

fn write_transition_struct(w: &mut SourceWriter) {
    w.writeln("/// One row of a state table.");
    w.writeln("#[derive(Clone, Copy, Debug, PartialEq, Eq)]");
    w.block("pub struct Transition<S> {", "}", |w| {
        w.writeln("pub state: S,");
        w.writeln("/// Condition selecting the row; empty when the row always applies.");
        w.writeln("pub condition: &'static str,");
        w.writeln("pub input: Option<&'static str>,");
        w.writeln("pub next: Option<S>,");
        w.writeln("pub output: Option<&'static str>,");
        w.writeln("pub output_method: Option<&'static str>,");
    });
}

fn write_table(w: &mut SourceWriter, cells: &Cells<'_>, table: NodeId) {
    let name = &cells.tree[table].name;
    let rows = rows(cells.tree, table);
    let enum_name = format!("{}State", type_name(name));

    let mut seen = FxHashSet::default();
    let mut states = Vec::new();
    let declared = rows.iter().map(|r| r.state.as_str());
    let targets = rows.iter().filter_map(|r| r.next_state.as_deref());
    for state in declared.chain(targets) {
        let variant = pascal_case(state);
        if seen.insert(variant.clone()) {
            states.push(variant);
        }
    }
    tracing::trace!(table = %name, rows = rows.len(), states = states.len(), "state table");

    w.writeln(&format!("/// States of `{name}`."));
    w.writeln("#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]");
    w.block(&format!("pub enum {enum_name} {{"), "}", |w| {
        for state in &states {
            w.writeln(&format!("{state},"));
        }
    });
    w.newline();

    let const_name = format!("{}_TRANSITIONS", snake_case(name).to_ascii_uppercase());
    w.block(
        &format!("pub const {const_name}: &[Transition<{enum_name}>] = &["),
        "];",
        |w| {
            for row in &rows {
                w.block("Transition {", "},", |w| {
                    w.writeln(&format!("state: {enum_name}::{},", pascal_case(&row.state)));
                    w.writeln(&format!("condition: {:?},", cells.condition(&row.condition)));
                    w.writeln(&format!("input: {},", optional(row.input_method.map(|t| cells.target(t)))));
                    let next = row
                        .next_state
                        .as_deref()
                        .map(|s| format!("{enum_name}::{}", pascal_case(s)));
                    w.writeln(&format!("next: {},", next.map_or_else(|| "None".to_owned(), |n| format!("Some({n})"))));
                    w.writeln(&format!("output: {},", optional(row.output.as_ref().map(|o| cells.output(o)))));
                    let method = row.output_method.map(|id| cells.tree[id].name.clone());
                    w.writeln(&format!("output_method: {},", optional(method)));
                });
            }
        },
    );
}

fn rows(tree: &SyntaxTree, table: NodeId) -> Vec<&StateRow> {
    tree[table]
        .children
        .iter()
        .filter_map(|&id| match &tree.sub_element(id)?.role {
            SubElementRole::StateRow(row) => Some(row),
            _ => None,
        })
        .collect()
}

fn optional(text: Option<String>) -> String {
    text.map_or_else(|| "None".to_owned(), |t| format!("Some({t:?})"))
}

/// Text of the cells in a row.
struct Cells<'a> {
    tree: &'a SyntaxTree,
    tokens: &'a TokenList,
}

impl Cells<'_> {
    fn target(&self, target: Target) -> String {
        match target {
            Target::Element(e) => self.tree[e].name.clone(),
            Target::Member { element, member } => {
                format!("{}.{}", self.tree[element].name, self.tree[member].name)
            }
        }
    }

    fn rpn(&self, ids: &[TokenId]) -> String {
        let texts: Vec<&str> = ids.iter().map(|&id| self.tokens[id].text.as_str()).collect();
        texts.join(" ")
    }

    fn condition(&self, condition: &Condition) -> String {
        match condition {
            Condition::Always => String::new(),
            Condition::Match(target) => self.target(*target),
            Condition::Expr(rpn) => self.rpn(rpn),
        }
    }

    fn output(&self, output: &RowOutput) -> String {
        match output {
            RowOutput::Target(target) => self.target(*target),
            RowOutput::Expr(rpn) => self.rpn(rpn),
            RowOutput::Actions { call, args } => {
                let args: Vec<&str> = args.iter().map(|&id| self.tokens[id].text.as_str()).collect();
                format!("{}({})", self.tree[*call].name, args.join(", "))
            }
        }
    }
}
