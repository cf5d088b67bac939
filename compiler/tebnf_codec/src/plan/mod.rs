//! Codec plans: the synthesized layout of one grammar element.

use std::fmt;

use rustc_hash::FxHashMap;

/// One element of a vector field.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct Elem {
    pub bytes: usize,
    pub signed: bool,
    pub float: bool,
}

impl Elem {
    /// Plain bytes, carried as a byte string.
    pub fn is_byte(self) -> bool {
        self.bytes == 1 && !self.signed && !self.float
    }
}

/// How many elements a vector holds.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Count {
    Fixed(usize),
    /// Set by the resize step that precedes the read.
    Dynamic,
}

/// A single codec operation.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum Op {
    /// Big-endian integer of `bytes` bytes (1..=8).
    Int { bytes: usize, signed: bool },
    /// IEEE float, 4 or 8 bytes.
    Float { bytes: usize },
    /// Raw bytes of a fixed length (bitsets, fixed strings).
    Bytes { len: usize },
    Vector { elem: Elem, count: Count },
    /// A number carried as `width` ASCII characters.
    NumericString { width: usize, float: bool },
    /// Written verbatim; compared when reading.
    Literal { bytes: Vec<u8> },
    /// One of several literals; the one read is kept.
    Choice { alternatives: Vec<Vec<u8>> },
    /// The codec of another element.
    Call { element: String },
    /// Size the next vector from an already-read field (read only).
    ResizeTo { bound_field: String },
    /// Size the next vector from whatever the element has left: the
    /// declared total when `size_symbol` names one, else the input (read
    /// only).
    ResizeRemaining { size_symbol: Option<String> },
    /// Leading bytes of a width over 64 bits: skipped when read, zeroed
    /// when written.
    DiffBytes { len: usize },
}

impl Op {
    /// Bytes this op occupies, when known without the value.
    pub fn fixed_size(&self) -> Option<usize> {
        match self {
            Op::Int { bytes, .. } | Op::Float { bytes } => Some(*bytes),
            Op::Bytes { len } | Op::DiffBytes { len } => Some(*len),
            Op::NumericString { width, .. } => Some(*width),
            Op::Literal { bytes } => Some(bytes.len()),
            Op::Vector {
                elem,
                count: Count::Fixed(n),
            } => Some(elem.bytes * n),
            Op::Choice { alternatives } => {
                let first = alternatives.first().map_or(0, Vec::len);
                alternatives
                    .iter()
                    .all(|a| a.len() == first)
                    .then_some(first)
            }
            Op::ResizeTo { .. } | Op::ResizeRemaining { .. } => Some(0),
            Op::Vector {
                count: Count::Dynamic,
                ..
            }
            | Op::Call { .. } => None,
        }
    }

    /// Resize ops only steer reading.
    pub fn is_resize(&self) -> bool {
        matches!(self, Op::ResizeTo { .. } | Op::ResizeRemaining { .. })
    }

    /// The op leaves a value in the record.
    pub fn stores_value(&self) -> bool {
        !matches!(
            self,
            Op::Literal { .. } | Op::DiffBytes { .. } | Op::ResizeTo { .. } | Op::ResizeRemaining { .. }
        )
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Op::Int { bytes, signed } => {
                write!(f, "{}{}", if *signed { "i" } else { "u" }, bytes * 8)
            }
            Op::Float { bytes } => write!(f, "f{}", bytes * 8),
            Op::Bytes { len } => write!(f, "bytes[{len}]"),
            Op::Vector { elem, count } => {
                let kind = if elem.float { "f" } else if elem.signed { "i" } else { "u" };
                match count {
                    Count::Fixed(n) => write!(f, "[{kind}{}; {n}]", elem.bytes * 8),
                    Count::Dynamic => write!(f, "[{kind}{}]", elem.bytes * 8),
                }
            }
            Op::NumericString { width, float } => {
                write!(f, "{}_str[{width}]", if *float { "float" } else { "int" })
            }
            Op::Literal { bytes } => write!(f, "literal{bytes:02X?}"),
            Op::Choice { alternatives } => write!(f, "choice({})", alternatives.len()),
            Op::Call { element } => write!(f, "call {element}"),
            Op::ResizeTo { bound_field } => write!(f, "resize to {bound_field}"),
            Op::ResizeRemaining { size_symbol: Some(s) } => write!(f, "resize to {s} - offset"),
            Op::ResizeRemaining { size_symbol: None } => f.write_str("resize to remaining input"),
            Op::DiffBytes { len } => write!(f, "skip[{len}]"),
        }
    }
}

/// A field of the element and the ops that carry it.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct FieldPlan {
    pub name: String,
    pub ops: Vec<Op>,
}

impl FieldPlan {
    /// The op that holds the value, if the field stores one.
    pub fn value_op(&self) -> Option<&Op> {
        self.ops.iter().find(|op| op.stores_value())
    }
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Step {
    pub field: String,
    pub op: Op,
}

/// The literal checks a buffer must pass to be this element.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum MatchExpr {
    Always,
    /// `bytes` at `offset`; `None` when a variable-length field comes first,
    /// in which case the compare happens while reading.
    Compare {
        field: String,
        offset: Option<usize>,
        bytes: Vec<u8>,
    },
    And(Vec<MatchExpr>),
    Or(Vec<MatchExpr>),
}

impl MatchExpr {
    /// `And` of `parts`, flattened.
    pub fn all(parts: Vec<MatchExpr>) -> MatchExpr {
        let mut parts: Vec<_> = parts
            .into_iter()
            .filter(|p| *p != MatchExpr::Always)
            .collect();
        match parts.len() {
            0 => MatchExpr::Always,
            1 => parts.remove(0),
            _ => MatchExpr::And(parts),
        }
    }
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum DynamicTerm {
    /// Length of a variable field times its element size.
    FieldLen { field: String, element_size: usize },
    /// Total size of a nested element.
    Call { field: String, element: String },
    /// The element's declared size field.
    SizeSymbol(String),
}

#[derive(Clone, Default, Eq, PartialEq, Hash, Debug)]
pub struct TotalSize {
    pub constant: usize,
    pub dynamic: Vec<DynamicTerm>,
}

impl TotalSize {
    pub fn is_constant(&self) -> bool {
        self.dynamic.is_empty()
    }
}

/// Everything the generated code for one grammar element needs.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct CodecPlan {
    /// `@Name` of the element.
    pub element: String,
    /// `@Name` of the element whose codec this one reuses.
    pub alias_of: Option<String>,
    pub fields: Vec<FieldPlan>,
    pub marshal: Vec<Step>,
    pub unmarshal: Vec<Step>,
    pub predicate: MatchExpr,
    pub total_size: TotalSize,
    /// The open-ended field that absorbs the rest of the element.
    pub trailing_field: Option<String>,
    /// Static-variable lines in RPN, run after a successful unmarshal.
    pub actions: Vec<Vec<String>>,
}

impl CodecPlan {
    pub fn new(element: impl Into<String>) -> Self {
        CodecPlan {
            element: element.into(),
            alias_of: None,
            fields: Vec::new(),
            marshal: Vec::new(),
            unmarshal: Vec::new(),
            predicate: MatchExpr::Always,
            total_size: TotalSize::default(),
            trailing_field: None,
            actions: Vec::new(),
        }
    }

    pub fn field(&self, name: &str) -> Option<&FieldPlan> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Fields that hold a value, in serialization order.
    pub fn stored_fields(&self) -> impl Iterator<Item = &FieldPlan> + '_ {
        self.fields.iter().filter(|f| f.value_op().is_some())
    }
}

/// Plans for every grammar element, keyed by `@Name`.
#[derive(Clone, Default, Debug)]
pub struct PlanSet {
    plans: FxHashMap<String, CodecPlan>,
    order: Vec<String>,
}

impl PlanSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, plan: CodecPlan) {
        if !self.plans.contains_key(&plan.element) {
            self.order.push(plan.element.clone());
        }
        self.plans.insert(plan.element.clone(), plan);
    }

    pub fn get(&self, element: &str) -> Option<&CodecPlan> {
        self.plans.get(element)
    }

    /// Follow `alias_of` to the plan that owns the layout.
    pub fn resolve(&self, element: &str) -> Option<&CodecPlan> {
        let mut plan = self.get(element)?;
        for _ in 0..=self.order.len() {
            match &plan.alias_of {
                Some(target) => plan = self.get(target)?,
                None => return Some(plan),
            }
        }
        None
    }

    /// Plans in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &CodecPlan> + '_ {
        self.order.iter().filter_map(|name| self.plans.get(name))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
