//! Actor attribution
//!
//! Kill-stream records put the acting player's gamertag shortly before
//! the event marker. The gap is variable but bounded, so attribution is
//! a nearest-preceding-tag search inside a strict distance window.

use crate::event::EventCandidate;
use crate::gamertag::GamertagOccurrence;

/// Tags closer than this are part of the marker's own record framing,
/// not an attribution. Exclusive.
pub const ACTOR_WINDOW_MIN: usize = 20;

/// Tags further than this belong to some other record. Exclusive.
pub const ACTOR_WINDOW_MAX: usize = 100;

/// Attach the nearest preceding valid gamertag to each candidate.
///
/// Tags from every bit phase participate; offsets line up across
/// phases since a view never moves bytes, only re-reads them.
/// Candidates with nothing in the window keep `actor = None`. Returns
/// the number left unresolved.
pub fn resolve(candidates: &mut [EventCandidate], tags: &[GamertagOccurrence]) -> usize {
    let mut unresolved = 0;
    for candidate in candidates.iter_mut() {
        candidate.actor = nearest_tag(candidate.offset, tags).map(str::to_string);
        if candidate.actor.is_none() {
            unresolved += 1;
        }
    }
    unresolved
}

/// The closest valid tag strictly inside the window before an offset.
pub fn nearest_tag(marker_offset: usize, tags: &[GamertagOccurrence]) -> Option<&str> {
    let mut best: Option<(usize, &GamertagOccurrence)> = None;
    for tag in tags.iter().filter(|t| t.valid) {
        if tag.offset >= marker_offset {
            continue;
        }
        let distance = marker_offset - tag.offset;
        if distance <= ACTOR_WINDOW_MIN || distance >= ACTOR_WINDOW_MAX {
            continue;
        }
        if best.map_or(true, |(best_distance, _)| distance < best_distance) {
            best = Some((distance, tag));
        }
    }
    best.map(|(_, tag)| tag.text.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventKind;
    use crate::gamertag::Utf16Order;

    fn tag(offset: usize, text: &str, valid: bool) -> GamertagOccurrence {
        GamertagOccurrence {
            offset,
            shift: 0,
            text: text.to_string(),
            order: Utf16Order::Le,
            valid,
        }
    }

    fn candidate(offset: usize) -> EventCandidate {
        EventCandidate {
            offset,
            shift: 0,
            kind: EventKind::Kill,
            timestamp_ms: 100_000,
            actor: None,
            weapon_id: None,
            confidence: 0.5,
        }
    }

    #[test]
    fn test_nearest_wins() {
        let tags = vec![tag(10, "Far", true), tag(60, "Near", true)];
        assert_eq!(nearest_tag(100, &tags), Some("Near"));
    }

    #[test]
    fn test_window_is_strict() {
        // Distance exactly 20: too close
        assert_eq!(nearest_tag(100, &[tag(80, "Close", true)]), None);
        // Distance 21: fine
        assert_eq!(nearest_tag(100, &[tag(79, "Ok", true)]), Some("Ok"));
        // Distance 99: fine
        assert_eq!(nearest_tag(160, &[tag(61, "Edge", true)]), Some("Edge"));
        // Distance exactly 100: too far
        assert_eq!(nearest_tag(160, &[tag(60, "Gone", true)]), None);
    }

    #[test]
    fn test_tags_after_marker_ignored() {
        let tags = vec![tag(130, "Behind", true)];
        assert_eq!(nearest_tag(100, &tags), None);
    }

    #[test]
    fn test_invalid_tags_ignored() {
        let tags = vec![tag(60, "B@dName", false), tag(30, "Good", true)];
        assert_eq!(nearest_tag(100, &tags), Some("Good"));
    }

    #[test]
    fn test_resolve_counts_unresolved() {
        let tags = vec![tag(40, "JGtm", true)];
        let mut candidates = vec![candidate(90), candidate(500)];

        let unresolved = resolve(&mut candidates, &tags);
        assert_eq!(unresolved, 1);
        assert_eq!(candidates[0].actor.as_deref(), Some("JGtm"));
        assert_eq!(candidates[1].actor, None);
    }

    #[test]
    fn test_cross_phase_tags_participate() {
        let mut roster_tag = tag(50, "Phased", true);
        roster_tag.shift = 5;
        assert_eq!(nearest_tag(100, &[roster_tag]), Some("Phased"));
    }
}
