//! Helpers for slicing payloads into chunks when exercising chunk-boundary
//! behavior in tests and downstream suites.

/// Splits `payload` into up to `parts` chunks of near-equal byte length
/// without breaking UTF-8 code points.
///
/// # Panics
///
/// Panics if `parts` is zero.
#[must_use]
pub fn split_chunks(payload: &str, parts: usize) -> Vec<&str> {
    assert!(parts > 0, "parts must be positive");
    let step = payload.len().div_ceil(parts).max(1);
    let mut chunks = Vec::with_capacity(parts);
    let mut rest = payload;
    while !rest.is_empty() {
        let (head, tail) = rest.split_at(snap_to_boundary(rest, step));
        chunks.push(head);
        rest = tail;
    }
    chunks
}

/// Returns the prefixes of `payload` that the chunks of
/// [`split_chunks`] converge through.
///
/// # Panics
///
/// Panics if `parts` is zero.
#[must_use]
pub fn split_prefixes(payload: &str, parts: usize) -> Vec<&str> {
    let mut end = 0;
    split_chunks(payload, parts)
        .into_iter()
        .map(|chunk| {
            end += chunk.len();
            &payload[..end]
        })
        .collect()
}

/// Moves `cut` forward to the nearest char boundary (or the end).
fn snap_to_boundary(s: &str, cut: usize) -> usize {
    let mut cut = cut.min(s.len());
    while cut < s.len() && !s.is_char_boundary(cut) {
        cut += 1;
    }
    cut
}
