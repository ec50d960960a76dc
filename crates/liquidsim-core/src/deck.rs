//! Deck slot geometry
//!
//! Two deck layouts are supported. The OT-2 deck numbers its slots 1-12,
//! left to right, front to back:
//!
//! ```text
//! 10 11 12
//!  7  8  9
//!  4  5  6
//!  1  2  3
//! ```
//!
//! The Flex deck names its slots by row letter (A at the back) and column
//! number (A1..D3, plus staging column 4). Thermocyclers occupy more than
//! one slot; on the OT-2 their location is the span token `span7_8_10_11`.

/// Location token for a thermocycler on the OT-2 deck
pub const OT2_THERMOCYCLER_SPAN: &str = "span7_8_10_11";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    North,
    South,
    East,
    West,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Layout {
    Ot2,
    Flex,
}

/// (layout, row counted from the front, column counted from the left)
fn coordinates(slot: &str) -> Option<(Layout, i32, i32)> {
    if let Ok(n) = slot.parse::<i32>() {
        if (1..=12).contains(&n) {
            return Some((Layout::Ot2, (n - 1) / 3, (n - 1) % 3));
        }
        return None;
    }
    let mut chars = slot.chars();
    let row = chars.next()?;
    let col: i32 = chars.as_str().parse().ok()?;
    if !('A'..='D').contains(&row) || !(1..=4).contains(&col) {
        return None;
    }
    Some((Layout::Flex, 'D' as i32 - row as i32, col - 1))
}

fn slot_name(layout: Layout, row: i32, col: i32) -> Option<String> {
    match layout {
        Layout::Ot2 if (0..4).contains(&row) && (0..3).contains(&col) => {
            Some((row * 3 + col + 1).to_string())
        }
        Layout::Flex if (0..4).contains(&row) && (0..4).contains(&col) => {
            let letter = char::from_u32(('D' as i32 - row) as u32)?;
            Some(format!("{}{}", letter, col + 1))
        }
        _ => None,
    }
}

/// The slot adjacent to `slot` in `direction`, if it exists on the same deck
pub fn neighbor(slot: &str, direction: Direction) -> Option<String> {
    let (layout, row, col) = coordinates(slot)?;
    let (row, col) = match direction {
        Direction::North => (row + 1, col),
        Direction::South => (row - 1, col),
        Direction::East => (row, col + 1),
        Direction::West => (row, col - 1),
    };
    slot_name(layout, row, col)
}

fn is_adjacent_in(a: &str, b: &str, directions: &[Direction]) -> bool {
    directions
        .iter()
        .any(|d| neighbor(a, *d).as_deref() == Some(b))
}

/// `b` is directly east or west of `a`
pub fn is_east_west(a: &str, b: &str) -> bool {
    is_adjacent_in(a, b, &[Direction::East, Direction::West])
}

/// `b` is directly north or south of `a`
pub fn is_north_south(a: &str, b: &str) -> bool {
    is_adjacent_in(a, b, &[Direction::North, Direction::South])
}

/// `b` shares an edge with `a`
pub fn is_adjacent(a: &str, b: &str) -> bool {
    is_east_west(a, b) || is_north_south(a, b)
}

/// Individual deck slots covered by a location token
pub fn covered_slots(slot: &str) -> Vec<String> {
    if slot == OT2_THERMOCYCLER_SPAN {
        return ["7", "8", "10", "11"].iter().map(|s| s.to_string()).collect();
    }
    vec![slot.to_string()]
}

/// Individual slots covered by a thermocycler placed at `slot`
///
/// The Flex thermocycler sits in B1 and reaches back over A1.
pub fn thermocycler_slots(slot: &str) -> Vec<String> {
    if slot == "B1" {
        return vec!["A1".to_string(), "B1".to_string()];
    }
    covered_slots(slot)
}

/// Stable deck ordering used when searching for tips: front-left first
pub fn slot_sort_key(slot: &str) -> (i32, i32, String) {
    match coordinates(slot) {
        Some((_, row, col)) => (row, col, slot.to_string()),
        None => (i32::MAX, i32::MAX, slot.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ot2_neighbors() {
        assert_eq!(neighbor("5", Direction::North).as_deref(), Some("8"));
        assert_eq!(neighbor("5", Direction::South).as_deref(), Some("2"));
        assert_eq!(neighbor("5", Direction::East).as_deref(), Some("6"));
        assert_eq!(neighbor("5", Direction::West).as_deref(), Some("4"));
        assert_eq!(neighbor("3", Direction::East), None);
        assert_eq!(neighbor("1", Direction::South), None);
    }

    #[test]
    fn test_flex_neighbors() {
        assert_eq!(neighbor("B2", Direction::North).as_deref(), Some("A2"));
        assert_eq!(neighbor("B2", Direction::South).as_deref(), Some("C2"));
        assert_eq!(neighbor("D1", Direction::West), None);
    }

    #[test]
    fn test_adjacency_does_not_cross_rows() {
        assert!(is_east_west("4", "5"));
        assert!(!is_east_west("3", "4"));
        assert!(is_north_south("1", "4"));
        assert!(!is_adjacent("1", "5"));
    }

    #[test]
    fn test_span_expands() {
        assert_eq!(covered_slots(OT2_THERMOCYCLER_SPAN).len(), 4);
        assert_eq!(thermocycler_slots("B1"), vec!["A1", "B1"]);
        assert_eq!(covered_slots("5"), vec!["5"]);
    }

    #[test]
    fn test_sort_key_front_left_first() {
        let mut slots = vec!["10", "2", "1", "5"];
        slots.sort_by_key(|s| slot_sort_key(s));
        assert_eq!(slots, vec!["1", "2", "5", "10"]);
    }
}
