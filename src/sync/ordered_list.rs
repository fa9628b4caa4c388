//! Ordered List Helpers
//!
//! Pure operations on a display-ordered list of positioned entities.

use crate::domain::{Entity, Positioned};

/// Index of `id` in display order
pub fn index_of<T: Entity>(items: &[T], id: T::Id) -> Option<usize> {
    items.iter().position(|item| item.id() == id)
}

/// Array move: remove at `from`, reinsert at `to`.
/// Items strictly between shift by one toward the gap.
pub fn move_item<T>(items: &mut Vec<T>, from: usize, to: usize) {
    if from == to || from >= items.len() || to >= items.len() {
        return;
    }
    let item = items.remove(from);
    items.insert(to, item);
}

/// Rewrite positions as 0..n-1 following list order
pub fn densify<T: Positioned>(items: &mut [T]) {
    for (index, item) in items.iter_mut().enumerate() {
        item.set_position(index as i64);
    }
}

/// True when positions are exactly {0, 1, ..., n-1}
pub fn is_dense<T: Positioned>(items: &[T]) -> bool {
    let mut positions: Vec<i64> = items.iter().map(Positioned::position).collect();
    positions.sort_unstable();
    positions.iter().enumerate().all(|(index, p)| *p == index as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ClientLogo;

    fn letters(items: &[char]) -> String {
        items.iter().collect()
    }

    #[test]
    fn test_move_toward_front_shifts_right() {
        let mut items = vec!['A', 'B', 'C', 'D'];
        move_item(&mut items, 3, 1);
        assert_eq!(letters(&items), "ADBC");
    }

    #[test]
    fn test_move_toward_back_shifts_left() {
        let mut items = vec!['A', 'B', 'C', 'D'];
        move_item(&mut items, 0, 2);
        assert_eq!(letters(&items), "BCAD");
    }

    #[test]
    fn test_move_out_of_range_is_ignored() {
        let mut items = vec!['A', 'B'];
        move_item(&mut items, 0, 5);
        move_item(&mut items, 1, 1);
        assert_eq!(letters(&items), "AB");
    }

    #[test]
    fn test_densify_and_is_dense() {
        let mut logos: Vec<ClientLogo> = [4, 9, 9]
            .iter()
            .map(|p| {
                let mut logo = ClientLogo::new("x", "https://x/y.png");
                logo.position = *p;
                logo
            })
            .collect();
        assert!(!is_dense(&logos));

        densify(&mut logos);
        assert!(is_dense(&logos));
        assert_eq!(logos.iter().map(|l| l.position).collect::<Vec<_>>(), vec![0, 1, 2]);
        assert!(is_dense::<ClientLogo>(&[]));
    }
}
