//! Byte-budgeted output trimming.
//!
//! The orchestrator fails a build whose captured output exceeds its own
//! stdout/stderr byte limit, so the builder bounds its result first. The
//! compiler quotes snippets of source code that may contain arbitrary
//! Unicode, so the budget is measured in encoded UTF-8 bytes and the cut
//! never lands inside a code point.

/// Default budget, matching the orchestrator's default output cap.
pub const DEFAULT_MAX_OUTPUT_BYTES: usize = 1_048_576;

/// Appended in place of trimmed text. Space for it is reserved up front so
/// the scan never has to backtrack.
pub const TRUNCATION_WARNING: &str =
    "\nWARNING: Output from jdt-java-builder was too long - truncated\n";

/// Bound `header + stdout + stderr` to `budget` encoded bytes.
///
/// Stderr carries the diagnostics and is kept preferentially: it is scanned
/// code point by code point and cut (with the warning appended) the moment
/// the next code point would not fit. Stdout is prepended in full only if
/// it fits in the remaining headroom, otherwise dropped entirely.
///
/// Pure and total; in the worst case the result is the header plus the
/// warning marker alone.
pub fn trim_to_byte_budget(budget: usize, header: &str, stdout: &str, stderr: &str) -> String {
    let reserved = header.len() + TRUNCATION_WARNING.len();
    let effective = budget as i64 - reserved as i64;

    let mut body = String::new();
    let mut consumed: i64 = 0;
    for ch in stderr.chars() {
        let width = ch.len_utf8() as i64;
        if consumed + width < effective {
            consumed += width;
            body.push(ch);
        } else {
            body.push_str(TRUNCATION_WARNING);
            break;
        }
    }

    // Stderr is the primary signal; stdout only rides along when the whole
    // of it still fits.
    if !stdout.is_empty() && consumed + (stdout.len() as i64) < effective {
        body.insert_str(0, stdout);
    }

    let mut result = String::with_capacity(header.len() + body.len());
    result.push_str(header);
    result.push_str(&body);
    result
}
