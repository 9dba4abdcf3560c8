//! Dominant weather condition selection.

/// Return the most frequent condition in `conditions`.
///
/// Ties go to whichever of the tied conditions appeared first in the input,
/// so the result never depends on hashing or iteration order. Returns `None`
/// for an empty input.
pub fn dominant<S: AsRef<str>>(conditions: &[S]) -> Option<&str> {
    // ---
    // (condition, count) in first-occurrence order
    let mut tally: Vec<(&str, usize)> = Vec::new();
    for condition in conditions {
        let condition = condition.as_ref();
        match tally.iter_mut().find(|(seen, _)| *seen == condition) {
            Some((_, count)) => *count += 1,
            None => tally.push((condition, 1)),
        }
    }

    let mut best: Option<(&str, usize)> = None;
    for (condition, count) in tally {
        if best.is_none_or(|(_, top)| count > top) {
            best = Some((condition, count));
        }
    }
    best.map(|(condition, _)| condition)
}
