//! Line-sequence similarity and textual diff rendering.
//!
//! Alignment is delegated to `similar`'s Myers implementation with no
//! deadline, so the matched-line count is the length of a longest common
//! subsequence. That makes [`ratio`] symmetric and deterministic for identical
//! inputs.
//!
//! Lines are compared with trailing whitespace removed so that formatting
//! noise from the fetch layer never registers as drift.

use similar::{capture_diff_slices, Algorithm, DiffOp, TextDiff};

/// Lines of unchanged context rendered around each change block in alerts.
pub const DEFAULT_CONTEXT_LINES: usize = 1;

/// Name of the stored side in a rendered diff header.
const OLD_HEADER: &str = "baseline";

/// Name of the freshly fetched side in a rendered diff header.
const NEW_HEADER: &str = "current";

/// Number of lines matched by a minimal alignment of `a` and `b`.
pub fn matched_lines<S: AsRef<str>>(a: &[S], b: &[S]) -> usize {
    let old = normalize(a);
    let new = normalize(b);
    capture_diff_slices(Algorithm::Myers, &old, &new)
        .iter()
        .map(|op| match op {
            DiffOp::Equal { len, .. } => *len,
            _ => 0,
        })
        .sum()
}

/// Similarity of two line sequences in `[0.0, 1.0]`.
///
/// Defined as `2 * M / (len(a) + len(b))` where `M` is the number of lines
/// matched by the alignment. Two empty sequences are identical (`1.0`).
pub fn ratio<S: AsRef<str>>(a: &[S], b: &[S]) -> f64 {
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    2.0 * matched_lines(a, b) as f64 / total as f64
}

/// Render a unified diff of `a` (baseline) against `b` (current).
///
/// Each change block is shown with up to `context_lines` unchanged lines on
/// either side; unchanged regions outside that window are omitted. Within a
/// change block removed lines precede added ones. Returns an empty string
/// when the sequences do not differ.
pub fn render_diff<S: AsRef<str>>(a: &[S], b: &[S], context_lines: usize) -> String {
    let old = normalize(a);
    let new = normalize(b);
    let diff = TextDiff::configure()
        .algorithm(Algorithm::Myers)
        .newline_terminated(false)
        .diff_slices(&old, &new);

    let rendered = diff
        .unified_diff()
        .context_radius(context_lines)
        .header(OLD_HEADER, NEW_HEADER)
        .to_string();
    match rendered.strip_suffix('\n') {
        Some(body) => body.to_string(),
        None => rendered,
    }
}

fn normalize<S: AsRef<str>>(lines: &[S]) -> Vec<&str> {
    lines.iter().map(|l| l.as_ref().trim_end()).collect()
}
