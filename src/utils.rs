use super::client::Identified;
use std::collections::HashSet;

/// Keeps one item per ID: the last one in `items`. Survivors stay in the order of their last
/// occurrence.
pub fn collapse_by_id<T: Identified>(items: Vec<T>) -> Vec<T> {
    let mut seen = HashSet::with_capacity(items.len());

    let mut collapsed: Vec<T> = items
        .into_iter()
        .rev()
        .filter(|item| seen.insert(item.id()))
        .collect();

    collapsed.reverse();
    collapsed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Item(u64, &'static str);

    impl Identified for Item {
        fn id(&self) -> u64 {
            self.0
        }
    }

    #[test]
    fn collapse_keeps_last_copy() {
        let items = vec![Item(1, "a"), Item(2, "b"), Item(1, "c"), Item(3, "d")];

        assert_eq!(
            collapse_by_id(items),
            vec![Item(2, "b"), Item(1, "c"), Item(3, "d")]
        );
    }

    #[test]
    fn collapse_without_duplicates_is_identity() {
        let items = vec![Item(5, "a"), Item(3, "b"), Item(9, "c")];

        assert_eq!(
            collapse_by_id(items),
            vec![Item(5, "a"), Item(3, "b"), Item(9, "c")]
        );
    }

    #[test]
    fn collapse_empty() {
        assert!(collapse_by_id(Vec::<Item>::new()).is_empty());
    }
}
