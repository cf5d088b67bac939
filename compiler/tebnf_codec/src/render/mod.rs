//! Rust source for codec plans.
//!
//! Each grammar element becomes a struct with `marshal`, `unmarshal`,
//! `total_size` and `matches`, written against the [`wire`](crate::wire)
//! primitives so the generated code and the interpreter agree byte for byte.
//! An alias becomes a type alias of its target.

mod types;
mod writer;

use rustc_hash::FxHashSet;

pub use types::{field_ident, module_name, type_name};
pub use writer::SourceWriter;

use crate::{CodecPlan, Count, DynamicTerm, FieldPlan, MatchExpr, Op, PlanSet};
use types::{byte_slice, elem_type, float_type, int_type, rust_type};

/// Source of the module holding `plan`'s codec.
#[tracing::instrument(level = "trace", skip_all, fields(element = %plan.element))]
pub fn render_element(plan: &CodecPlan) -> String {
    let mut w = SourceWriter::new();
    let name = type_name(&plan.element);
    w.writeln(&format!("//! Codec for `{}`, generated by tebnfc.", plan.element));
    w.newline();

    if let Some(target) = &plan.alias_of {
        w.writeln(&format!("pub type {name} = crate::{};", type_name(target)));
        return w.take_output();
    }

    if uses_wire_fns(plan) {
        w.writeln("use tebnf_codec::wire::{self, Reader, WireError};");
    } else {
        w.writeln("use tebnf_codec::wire::{Reader, WireError};");
    }
    let mut callees = FxHashSet::default();
    for field in &plan.fields {
        for op in &field.ops {
            if let Op::Call { element } = op {
                if *element != plan.element && callees.insert(element.as_str()) {
                    w.writeln(&format!("use crate::{};", type_name(element)));
                }
            }
        }
    }
    w.newline();

    w.writeln("#[derive(Clone, Debug, Default, PartialEq)]");
    w.block(&format!("pub struct {name} {{"), "}", |w| {
        for field in plan.stored_fields() {
            if let Some(ty) = field.value_op().and_then(rust_type) {
                w.writeln(&format!("pub {}: {ty},", field_ident(&field.name)));
            }
        }
    });
    w.newline();

    w.block(&format!("impl {name} {{"), "}", |w| {
        if !plan.actions.is_empty() {
            w.writeln("/// Static-variable updates in RPN, applied after a successful unmarshal.");
            let lines: Vec<String> = plan
                .actions
                .iter()
                .map(|line| format!("{:?}", line.join(" ")))
                .collect();
            w.writeln(&format!("pub const ACTIONS: &[&str] = &[{}];", lines.join(", ")));
            w.newline();
        }

        w.writeln("/// Bytes this value occupies when marshalled.");
        w.block("pub fn total_size(&self) -> usize {", "}", |w| {
            w.writeln(&total_size_expr(plan));
        });
        w.newline();

        w.block(
            "pub fn marshal(&self, out: &mut Vec<u8>) -> Result<(), WireError> {",
            "}",
            |w| {
                for field in &plan.fields {
                    marshal_field(w, field);
                }
                w.writeln("Ok(())");
            },
        );
        w.newline();

        w.block(
            "pub fn unmarshal(r: &mut Reader<'_>) -> Result<Self, WireError> {",
            "}",
            |w| {
                let sized_by_total = plan.fields.iter().flat_map(|f| &f.ops).any(|op| {
                    matches!(op, Op::ResizeRemaining { size_symbol: Some(_) })
                });
                if sized_by_total {
                    w.writeln("let start = r.position();");
                }
                for field in &plan.fields {
                    unmarshal_field(w, field);
                }
                let names: Vec<String> = plan
                    .stored_fields()
                    .map(|f| field_ident(&f.name))
                    .collect();
                w.writeln(&format!("Ok(Self {{ {} }})", names.join(", ")));
            },
        );
        w.newline();

        w.writeln("/// Whether `input` holds this element's literals at their fixed offsets.");
        w.block("pub fn matches(input: &[u8]) -> bool {", "}", |w| {
            w.writeln(&match_expr(&plan.predicate));
        });
    });
    w.take_output()
}

/// The crate root: one module per element plus `extra` modules.
pub fn render_lib(plans: &PlanSet, extra: &[&str]) -> String {
    let mut w = SourceWriter::new();
    w.writeln("//! Codecs generated by tebnfc.");
    w.newline();
    for plan in plans.iter() {
        w.writeln(&format!("pub mod {};", module_name(&plan.element)));
    }
    for module in extra {
        w.writeln(&format!("pub mod {module};"));
    }
    w.newline();
    for plan in plans.iter() {
        w.writeln(&format!(
            "pub use {}::{};",
            module_name(&plan.element),
            type_name(&plan.element)
        ));
    }
    w.take_output()
}

fn uses_wire_fns(plan: &CodecPlan) -> bool {
    plan.marshal.iter().any(|step| match &step.op {
        Op::Int { .. } | Op::Float { .. } | Op::NumericString { .. } | Op::DiffBytes { .. } => true,
        Op::Vector { elem, .. } => !elem.is_byte(),
        _ => false,
    })
}

fn total_size_expr(plan: &CodecPlan) -> String {
    let total = &plan.total_size;
    let mut parts = Vec::new();
    if total.constant > 0 || total.dynamic.is_empty() {
        parts.push(total.constant.to_string());
    }
    for term in &total.dynamic {
        parts.push(match term {
            DynamicTerm::FieldLen {
                field,
                element_size: 1,
            } => format!("self.{}.len()", field_ident(field)),
            DynamicTerm::FieldLen {
                field,
                element_size,
            } => format!("self.{}.len() * {element_size}", field_ident(field)),
            DynamicTerm::Call { field, .. } => format!("self.{}.total_size()", field_ident(field)),
            DynamicTerm::SizeSymbol(symbol) => {
                format!("usize::try_from(self.{}).unwrap_or_default()", field_ident(symbol))
            }
        });
    }
    parts.join(" + ")
}

fn marshal_field(w: &mut SourceWriter, field: &FieldPlan) {
    let this = format!("self.{}", field_ident(&field.name));
    for op in &field.ops {
        match op {
            Op::Int { bytes, .. } => {
                w.writeln(&format!("wire::write_int(out, i128::from({this}), {bytes});"));
            }
            Op::Float { bytes } => {
                w.writeln(&format!("wire::write_float(out, f64::from({this}), {bytes});"));
            }
            Op::Bytes { .. } => w.writeln(&format!("out.extend_from_slice(&{this});")),
            Op::Vector { elem, .. } if elem.is_byte() => {
                w.writeln(&format!("out.extend_from_slice(&{this});"));
            }
            Op::Vector { elem, .. } => w.block(&format!("for v in &{this} {{"), "}", |w| {
                if elem.float {
                    w.writeln(&format!("wire::write_float(out, f64::from(*v), {});", elem.bytes));
                } else {
                    w.writeln(&format!("wire::write_int(out, i128::from(*v), {});", elem.bytes));
                }
            }),
            Op::NumericString { width, float: true } => {
                w.writeln(&format!("wire::write_numeric_float(out, {this}, {width})?;"));
            }
            Op::NumericString { width, float: false } => {
                w.writeln(&format!("wire::write_numeric(out, i128::from({this}), {width})?;"));
            }
            Op::Literal { bytes } => {
                w.writeln(&format!("out.extend_from_slice({});", byte_slice(bytes)));
            }
            Op::Choice { alternatives } => {
                let first = alternatives.first().map_or(&[][..], Vec::as_slice);
                w.block(&format!("if {this}.is_empty() {{"), "} else {", |w| {
                    w.writeln(&format!("out.extend_from_slice({});", byte_slice(first)));
                });
                w.indent();
                w.writeln(&format!("out.extend_from_slice(&{this});"));
                w.dedent();
                w.writeln("}");
            }
            Op::Call { .. } => w.writeln(&format!("{this}.marshal(out)?;")),
            Op::DiffBytes { len } => w.writeln(&format!("wire::write_zeros(out, {len});")),
            Op::ResizeTo { .. } | Op::ResizeRemaining { .. } => {}
        }
    }
}

fn unmarshal_field(w: &mut SourceWriter, field: &FieldPlan) {
    let var = field_ident(&field.name);
    let count_var = format!("{}_count", var.trim_start_matches("r#"));
    for (i, op) in field.ops.iter().enumerate() {
        match op {
            Op::Int { bytes, signed } => {
                let ty = int_type(*bytes, *signed);
                w.writeln(&format!("let {var} = r.int({bytes}, {signed})? as {ty};"));
            }
            Op::Float { bytes } => match float_type(*bytes).bytes() {
                4 => w.writeln(&format!("let {var} = r.float({bytes})? as f32;")),
                _ => w.writeln(&format!("let {var} = r.float({bytes})?;")),
            },
            Op::Bytes { len } => w.writeln(&format!("let {var} = r.bytes({len})?;")),
            Op::ResizeTo { bound_field } => w.writeln(&format!(
                "let {count_var} = usize::try_from({}).unwrap_or_default();",
                field_ident(bound_field)
            )),
            Op::ResizeRemaining { size_symbol } => {
                let elem_bytes = field.ops[i + 1..]
                    .iter()
                    .find_map(|op| match op {
                        Op::Vector { elem, .. } => Some(elem.bytes),
                        _ => None,
                    })
                    .unwrap_or(1);
                let left = match size_symbol {
                    Some(symbol) => format!(
                        "usize::try_from({}).unwrap_or_default().saturating_sub(r.position() - start)",
                        field_ident(symbol)
                    ),
                    None => "r.remaining()".to_owned(),
                };
                if elem_bytes == 1 {
                    w.writeln(&format!("let {count_var} = {left};"));
                } else {
                    w.writeln(&format!("let {count_var} = {left} / {elem_bytes};"));
                }
            }
            Op::Vector { elem, count } => {
                let n = match count {
                    Count::Fixed(n) => n.to_string(),
                    Count::Dynamic => count_var.clone(),
                };
                if elem.is_byte() {
                    w.writeln(&format!("let {var} = r.bytes({n})?;"));
                } else {
                    let read = if elem.float {
                        format!("r.float({})", elem.bytes)
                    } else {
                        format!("r.int({}, {})", elem.bytes, elem.signed)
                    };
                    w.writeln(&format!(
                        "let {var} = (0..{n}).map(|_| {read}.map(|v| v as {})).collect::<Result<Vec<_>, _>>()?;",
                        elem_type(*elem)
                    ));
                }
            }
            Op::NumericString { width, float: true } => {
                w.writeln(&format!("let {var} = r.numeric_float({width})?;"));
            }
            Op::NumericString { width, float: false } => {
                w.writeln(&format!("let {var} = r.numeric({width})? as i64;"));
            }
            Op::Literal { bytes } => w.writeln(&format!("r.expect({})?;", byte_slice(bytes))),
            Op::Choice { alternatives } => {
                let options: Vec<String> = alternatives
                    .iter()
                    .map(|a| format!("{}[..]", byte_slice(a)))
                    .collect();
                w.writeln(&format!("let {var} = r.choose(&[{}])?;", options.join(", ")));
            }
            Op::Call { element } => {
                w.writeln(&format!("let {var} = {}::unmarshal(r)?;", type_name(element)));
            }
            Op::DiffBytes { len } => w.writeln(&format!("r.skip({len})?;")),
        }
    }
}

fn match_expr(expr: &MatchExpr) -> String {
    match expr {
        MatchExpr::Always | MatchExpr::Compare { offset: None, .. } => "true".to_owned(),
        MatchExpr::Compare {
            offset: Some(offset),
            bytes,
            ..
        } => format!(
            "input.get({offset}..{}) == Some({}[..])",
            offset + bytes.len(),
            byte_slice(bytes)
        ),
        MatchExpr::And(parts) => join(parts, " && "),
        MatchExpr::Or(parts) => join(parts, " || "),
    }
}

/// `&&` drops checks that always pass; `||` is always true if one does.
fn join(parts: &[MatchExpr], op: &str) -> String {
    let checks: Vec<String> = parts.iter().map(match_expr).collect();
    if op == " || " && checks.iter().any(|check| check == "true") {
        return "true".to_owned();
    }
    let checks: Vec<String> = checks.into_iter().filter(|check| check != "true").collect();
    match checks.len() {
        0 => "true".to_owned(),
        1 => checks.concat(),
        _ => format!("({})", checks.join(op)),
    }
}

#[cfg(test)]
mod tests;
