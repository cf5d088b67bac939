//! Plan interpreter.
//!
//! Runs a [`CodecPlan`] directly against a [`Record`], with the same byte
//! layout the rendered Rust code produces. Nested calls go back through the
//! [`PlanSet`], following aliases.

use rustc_hash::FxHashMap;
use tebnf_stack::ensure_sufficient_stack;

use crate::wire::{self, Reader, WireError};
use crate::{CodecPlan, Count, DynamicTerm, Elem, MatchExpr, Op, PlanSet, Step};

/// A field value.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Int(i128),
    Float(f64),
    /// Raw bytes: bitsets, `BYTE` vectors and matched literal choices.
    Bytes(Vec<u8>),
    List(Vec<Value>),
    Record(Record),
}

impl Value {
    pub fn as_int(&self) -> Option<i128> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(*v),
            #[allow(clippy::cast_precision_loss)]
            Value::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    /// Element count of a bytes or list value.
    pub fn len(&self) -> Option<usize> {
        match self {
            Value::Bytes(b) => Some(b.len()),
            Value::List(items) => Some(items.len()),
            _ => None,
        }
    }
}

impl From<i128> for Value {
    fn from(v: i128) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(v)
    }
}

impl From<Record> for Value {
    fn from(v: Record) -> Self {
        Value::Record(v)
    }
}

/// Field values of one element, keyed by field name.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Record {
    fields: FxHashMap<String, Value>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ExecError {
    #[error(transparent)]
    Wire(#[from] WireError),
    #[error("`{element}` has no value for `{field}`")]
    MissingField { element: String, field: String },
    #[error("`{field}` holds the wrong kind of value")]
    WrongValue { field: String },
    #[error("`{field}` holds {actual} element(s), {expected} expected")]
    LengthMismatch {
        field: String,
        expected: usize,
        actual: usize,
    },
    #[error("no codec for `{0}`")]
    UnknownElement(String),
    #[error("`{0}` is smaller than the bytes before it")]
    NegativeRemaining(String),
}

/// Size pending for the next vector read.
#[derive(Copy, Clone, Debug)]
enum Resize {
    Count(usize),
    Bytes(usize),
}

/// Interpreter over a set of plans.
#[derive(Copy, Clone, Debug)]
pub struct Codec<'p> {
    plans: &'p PlanSet,
}

impl<'p> Codec<'p> {
    pub fn new(plans: &'p PlanSet) -> Self {
        Codec { plans }
    }

    fn plan(&self, element: &str) -> Result<&'p CodecPlan, ExecError> {
        self.plans
            .resolve(element)
            .ok_or_else(|| ExecError::UnknownElement(element.to_owned()))
    }

    pub fn marshal(&self, element: &str, record: &Record) -> Result<Vec<u8>, ExecError> {
        let mut out = Vec::new();
        self.write(element, record, &mut out)?;
        Ok(out)
    }

    pub fn unmarshal(&self, element: &str, input: &[u8]) -> Result<Record, ExecError> {
        let mut reader = Reader::new(input);
        self.read(element, &mut reader)
    }

    /// Whether `input` passes every literal compare at a known offset.
    pub fn matches(&self, element: &str, input: &[u8]) -> Result<bool, ExecError> {
        Ok(eval(&self.plan(element)?.predicate, input))
    }

    /// Bytes `record` occupies when marshalled as `element`.
    pub fn total_size(&self, element: &str, record: &Record) -> Result<usize, ExecError> {
        let plan = self.plan(element)?;
        let mut size = plan.total_size.constant;
        for term in &plan.total_size.dynamic {
            size += match term {
                DynamicTerm::FieldLen {
                    field,
                    element_size,
                } => {
                    let value = lookup(plan, record, field)?;
                    let len = value.len().ok_or_else(|| wrong(field))?;
                    len * element_size
                }
                DynamicTerm::Call { field, element } => match lookup(plan, record, field)? {
                    Value::Record(nested) => {
                        ensure_sufficient_stack(|| self.total_size(element, nested))?
                    }
                    _ => return Err(wrong(field)),
                },
                DynamicTerm::SizeSymbol(symbol) => count(lookup(plan, record, symbol)?, symbol)?,
            };
        }
        Ok(size)
    }

    fn write(&self, element: &str, record: &Record, out: &mut Vec<u8>) -> Result<(), ExecError> {
        let plan = self.plan(element)?;
        ensure_sufficient_stack(|| -> Result<(), ExecError> {
            for step in &plan.marshal {
                self.write_step(plan, step, record, out)?;
            }
            Ok(())
        })
    }

    fn write_step(
        &self,
        plan: &CodecPlan,
        step: &Step,
        record: &Record,
        out: &mut Vec<u8>,
    ) -> Result<(), ExecError> {
        let name = step.field.as_str();
        let value = || lookup(plan, record, name);
        match &step.op {
            Op::Int { bytes, .. } => {
                let v = value()?.as_int().ok_or_else(|| wrong(name))?;
                wire::write_int(out, v, *bytes);
            }
            Op::Float { bytes } => {
                let v = value()?.as_float().ok_or_else(|| wrong(name))?;
                wire::write_float(out, v, *bytes);
            }
            Op::Bytes { len } => match value()? {
                Value::Bytes(b) if b.len() == *len => out.extend_from_slice(b),
                Value::Bytes(b) => return Err(mismatch(name, *len, b.len())),
                _ => return Err(wrong(name)),
            },
            Op::Vector { elem, count: n } => {
                let v = value()?;
                let actual = v.len().ok_or_else(|| wrong(name))?;
                let expected = match n {
                    Count::Fixed(n) => Some(*n),
                    Count::Dynamic => match bound_of(plan, name) {
                        Some(bound) => Some(count(lookup(plan, record, bound)?, bound)?),
                        None => None,
                    },
                };
                if let Some(expected) = expected.filter(|&e| e != actual) {
                    return Err(mismatch(name, expected, actual));
                }
                write_vector(out, v, *elem, name)?;
            }
            Op::NumericString { width, float: true } => {
                let v = value()?.as_float().ok_or_else(|| wrong(name))?;
                wire::write_numeric_float(out, v, *width)?;
            }
            Op::NumericString { width, float: false } => {
                let v = value()?.as_int().ok_or_else(|| wrong(name))?;
                wire::write_numeric(out, v, *width)?;
            }
            Op::Literal { bytes } => out.extend_from_slice(bytes),
            Op::Choice { alternatives } => {
                let chosen = match record.get(name) {
                    Some(Value::Bytes(b)) if alternatives.contains(b) => Some(b),
                    _ => alternatives.first(),
                };
                if let Some(bytes) = chosen {
                    out.extend_from_slice(bytes);
                }
            }
            Op::Call { element } => match value()? {
                Value::Record(nested) => self.write(element, nested, out)?,
                _ => return Err(wrong(name)),
            },
            Op::DiffBytes { len } => wire::write_zeros(out, *len),
            Op::ResizeTo { .. } | Op::ResizeRemaining { .. } => {}
        }
        Ok(())
    }

    fn read(&self, element: &str, r: &mut Reader<'_>) -> Result<Record, ExecError> {
        let plan = self.plan(element)?;
        let start = r.position();
        let mut record = Record::new();
        let mut resize = None;
        ensure_sufficient_stack(|| -> Result<Record, ExecError> {
            for step in &plan.unmarshal {
                let name = step.field.as_str();
                match &step.op {
                    Op::Int { bytes, signed } => record.insert(name, r.int(*bytes, *signed)?),
                    Op::Float { bytes } => record.insert(name, r.float(*bytes)?),
                    Op::Bytes { len } => record.insert(name, r.bytes(*len)?),
                    Op::Vector { elem, count: n } => {
                        let n = match (n, resize.take()) {
                            (Count::Fixed(n), _) => *n,
                            (Count::Dynamic, Some(Resize::Count(n))) => n,
                            (Count::Dynamic, Some(Resize::Bytes(len))) => len / elem.bytes,
                            (Count::Dynamic, None) => r.remaining() / elem.bytes,
                        };
                        record.insert(name, read_vector(r, *elem, n)?);
                    }
                    Op::NumericString { width, float: true } => {
                        record.insert(name, r.numeric_float(*width)?);
                    }
                    Op::NumericString { width, float: false } => {
                        record.insert(name, r.numeric(*width)?);
                    }
                    Op::Literal { bytes } => r.expect(bytes)?,
                    Op::Choice { alternatives } => {
                        let options: Vec<&[u8]> = alternatives.iter().map(Vec::as_slice).collect();
                        record.insert(name, r.choose(&options)?);
                    }
                    Op::Call { element } => {
                        let nested = self.read(element, r)?;
                        record.insert(name, nested);
                    }
                    Op::ResizeTo { bound_field } => {
                        let n = count(lookup(plan, &record, bound_field)?, bound_field)?;
                        resize = Some(Resize::Count(n));
                    }
                    Op::ResizeRemaining {
                        size_symbol: Some(symbol),
                    } => {
                        let total = count(lookup(plan, &record, symbol)?, symbol)?;
                        let used = r.position() - start;
                        let left = total
                            .checked_sub(used)
                            .ok_or_else(|| ExecError::NegativeRemaining(symbol.clone()))?;
                        resize = Some(Resize::Bytes(left));
                    }
                    Op::ResizeRemaining { size_symbol: None } => {
                        resize = Some(Resize::Bytes(r.remaining()));
                    }
                    Op::DiffBytes { len } => r.skip(*len)?,
                }
            }
            Ok(record)
        })
    }
}

fn eval(expr: &MatchExpr, input: &[u8]) -> bool {
    match expr {
        MatchExpr::Always
        | MatchExpr::Compare {
            offset: None, ..
        } => true,
        MatchExpr::Compare {
            offset: Some(offset),
            bytes,
            ..
        } => input.get(*offset..offset + bytes.len()) == Some(bytes.as_slice()),
        MatchExpr::And(parts) => parts.iter().all(|p| eval(p, input)),
        MatchExpr::Or(parts) => parts.iter().any(|p| eval(p, input)),
    }
}

/// The field bounding the vector in `field`, from its resize step.
fn bound_of<'p>(plan: &'p CodecPlan, field: &str) -> Option<&'p str> {
    plan.unmarshal.iter().find_map(|step| match &step.op {
        Op::ResizeTo { bound_field } if step.field == field => Some(bound_field.as_str()),
        _ => None,
    })
}

fn lookup<'r>(plan: &CodecPlan, record: &'r Record, field: &str) -> Result<&'r Value, ExecError> {
    record.get(field).ok_or_else(|| ExecError::MissingField {
        element: plan.element.clone(),
        field: field.to_owned(),
    })
}

fn count(value: &Value, field: &str) -> Result<usize, ExecError> {
    value
        .as_int()
        .and_then(|v| usize::try_from(v).ok())
        .ok_or_else(|| wrong(field))
}

fn wrong(field: &str) -> ExecError {
    ExecError::WrongValue {
        field: field.to_owned(),
    }
}

fn mismatch(field: &str, expected: usize, actual: usize) -> ExecError {
    ExecError::LengthMismatch {
        field: field.to_owned(),
        expected,
        actual,
    }
}

fn write_vector(out: &mut Vec<u8>, value: &Value, elem: Elem, field: &str) -> Result<(), ExecError> {
    match value {
        Value::Bytes(b) if elem.is_byte() => out.extend_from_slice(b),
        Value::List(items) => {
            for item in items {
                if elem.float {
                    let v = item.as_float().ok_or_else(|| wrong(field))?;
                    wire::write_float(out, v, elem.bytes);
                } else {
                    let v = item.as_int().ok_or_else(|| wrong(field))?;
                    wire::write_int(out, v, elem.bytes);
                }
            }
        }
        _ => return Err(wrong(field)),
    }
    Ok(())
}

fn read_vector(r: &mut Reader<'_>, elem: Elem, n: usize) -> Result<Value, ExecError> {
    if elem.is_byte() {
        return Ok(Value::Bytes(r.bytes(n)?));
    }
    let items = (0..n)
        .map(|_| {
            if elem.float {
                r.float(elem.bytes).map(Value::Float)
            } else {
                r.int(elem.bytes, elem.signed).map(Value::Int)
            }
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Value::List(items))
}

#[cfg(test)]
mod tests;
