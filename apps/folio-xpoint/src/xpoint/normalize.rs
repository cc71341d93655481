//! Path normalization
//!
//! Index keys always carry explicit sibling indices (`/div[1]/p[1]`) while
//! devices may leave out an index of 1 (`/div/p`). Normalizing both sides
//! makes the two spellings compare equal.

use super::types::{is_tag_char, is_tag_start};

/// Shape of one path segment
#[derive(Debug, PartialEq, Eq)]
enum SegmentShape {
    /// `tag`
    Bare,
    /// `tag[N]`
    Indexed,
    /// Anything else; left untouched
    Other,
}

fn segment_shape(segment: &str) -> SegmentShape {
    let (name, bracket) = match segment.find('[') {
        Some(at) => (&segment[..at], Some(&segment[at..])),
        None => (segment, None),
    };

    let mut chars = name.chars();
    let valid_name = chars.next().is_some_and(is_tag_start) && chars.all(is_tag_char);
    if !valid_name {
        return SegmentShape::Other;
    }

    match bracket {
        None => SegmentShape::Bare,
        Some(bracket) => {
            let digits = bracket
                .strip_prefix('[')
                .and_then(|rest| rest.strip_suffix(']'));
            match digits {
                Some(d) if !d.is_empty() && d.bytes().all(|b| b.is_ascii_digit()) => {
                    SegmentShape::Indexed
                }
                _ => SegmentShape::Other,
            }
        }
    }
}

/// Canonicalize a structural path
///
/// Empty segments are dropped, bare tags get `[1]`, everything else passes
/// through unchanged. The result always starts with `/` unless it is empty.
pub fn normalize_path(path: &str) -> String {
    let mut normalized = String::with_capacity(path.len() + 8);
    for segment in path.split('/').filter(|s| !s.is_empty()) {
        normalized.push('/');
        normalized.push_str(segment);
        if segment_shape(segment) == SegmentShape::Bare {
            normalized.push_str("[1]");
        }
    }
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adds_missing_indices() {
        assert_eq!(normalize_path("/body/div/p"), "/body[1]/div[1]/p[1]");
    }

    #[test]
    fn test_keeps_explicit_indices() {
        assert_eq!(normalize_path("/body[1]/div[3]/p[12]"), "/body[1]/div[3]/p[12]");
    }

    #[test]
    fn test_both_spellings_meet() {
        assert_eq!(
            normalize_path("/body/div/p"),
            normalize_path("/body/div[1]/p[1]")
        );
    }

    #[test]
    fn test_idempotent() {
        let once = normalize_path("/body/section/p[4]/span");
        assert_eq!(normalize_path(&once), once);
    }

    #[test]
    fn test_other_segments_pass_through() {
        assert_eq!(normalize_path("/body/text()"), "/body[1]/text()");
        assert_eq!(normalize_path("/body/p[x]"), "/body[1]/p[x]");
        assert_eq!(normalize_path("/body/3d"), "/body[1]/3d");
    }

    #[test]
    fn test_drops_empty_segments() {
        assert_eq!(normalize_path("body//p/"), "/body[1]/p[1]");
        assert_eq!(normalize_path(""), "");
        assert_eq!(normalize_path("/"), "");
    }

    #[test]
    fn test_segment_shapes() {
        assert_eq!(segment_shape("epub:switch"), SegmentShape::Bare);
        assert_eq!(segment_shape("h2[2]"), SegmentShape::Indexed);
        assert_eq!(segment_shape("p[]"), SegmentShape::Other);
        assert_eq!(segment_shape("[1]"), SegmentShape::Other);
    }
}
