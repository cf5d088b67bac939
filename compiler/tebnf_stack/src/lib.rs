//! Stack growth for recursive compiler stages.
//!
//! Codec synthesis recurses once per nested element and once per inlined
//! member reference. Each of those recursion points runs through
//! [`ensure_sufficient_stack`], which grows the stack on native targets and
//! is a plain call on `wasm32`.

/// Grow when less than this much stack remains.
const RED_ZONE: usize = 128 * 1024;

/// Size of each new stack segment.
const SEGMENT_SIZE: usize = 1024 * 1024;

/// Run `f`, first growing the stack if it is close to exhausted.
///
/// ```text
/// fn walk(tree: &SyntaxTree, node: NodeId) -> usize {
///     ensure_sufficient_stack(|| {
///         1 + tree[node].children.iter().map(|&c| walk(tree, c)).sum::<usize>()
///     })
/// }
/// ```
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, SEGMENT_SIZE, f)
}

#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}

/// Remaining stack in bytes, when the platform can tell.
#[cfg(not(target_arch = "wasm32"))]
pub fn remaining_stack() -> Option<usize> {
    stacker::remaining_stack()
}

#[cfg(target_arch = "wasm32")]
pub fn remaining_stack() -> Option<usize> {
    None
}

#[cfg(test)]
mod tests;
