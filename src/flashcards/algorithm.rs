//! Round-robin review queue
//!
//! Answered cards move to the back of the queue instead of being removed.
//! There is no interval scheduling: every card keeps coming back in turn.
//! With shuffle enabled, everything behind the new head is lightly
//! reshuffled after each answer.

use std::collections::{HashMap, HashSet};

use rand::Rng;

use super::models::Card;

/// Rebuild a queue from persisted card ids.
///
/// Ids no longer in the deck and repeated ids are dropped; deck cards the
/// order does not mention are appended in natural deck order. The result
/// is always a permutation of `cards`.
pub fn reconcile_queue(order: &[String], cards: &[Card]) -> Vec<Card> {
    let by_id: HashMap<&str, &Card> = cards.iter().map(|c| (c.id.as_str(), c)).collect();
    let mut seen: HashSet<&str> = HashSet::with_capacity(cards.len());
    let mut queue = Vec::with_capacity(cards.len());

    for id in order {
        if let Some(card) = by_id.get(id.as_str()) {
            if seen.insert(card.id.as_str()) {
                queue.push((*card).clone());
            }
        }
    }

    for card in cards {
        if seen.insert(card.id.as_str()) {
            queue.push(card.clone());
        }
    }

    queue
}

/// Move the head of the queue to the tail
pub fn rotate(queue: &mut [Card]) {
    if queue.len() > 1 {
        queue.rotate_left(1);
    }
}

/// Partially permute everything behind the head.
///
/// For each position from 1 to the end, swap with a uniformly chosen
/// position in the same range. Queues of two or fewer cards are untouched.
pub fn light_shuffle<R: Rng + ?Sized>(queue: &mut [Card], rng: &mut R) {
    let len = queue.len();
    if len <= 2 {
        return;
    }
    for i in 1..len {
        let j = rng.gen_range(1..len);
        queue.swap(i, j);
    }
}

/// Ids of the queue in order, as persisted
pub fn queue_ids(queue: &[Card]) -> Vec<String> {
    queue.iter().map(|c| c.id.clone()).collect()
}

/// Truncate to at most `max` characters, respecting char boundaries
pub fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn card(id: &str) -> Card {
        Card {
            id: id.to_string(),
            question: format!("Q {}", id),
            answer: format!("A {}", id),
            explanation: String::new(),
        }
    }

    fn ids(queue: &[Card]) -> Vec<&str> {
        queue.iter().map(|c| c.id.as_str()).collect()
    }

    #[test]
    fn test_reconcile_keeps_saved_order() {
        let cards = vec![card("a"), card("b"), card("c")];
        let order = vec!["c".to_string(), "a".to_string(), "b".to_string()];
        assert_eq!(ids(&reconcile_queue(&order, &cards)), vec!["c", "a", "b"]);
    }

    #[test]
    fn test_reconcile_drops_dead_and_appends_new() {
        let cards = vec![card("a"), card("b"), card("d")];
        let order = vec!["b".to_string(), "gone".to_string(), "a".to_string()];
        assert_eq!(ids(&reconcile_queue(&order, &cards)), vec!["b", "a", "d"]);
    }

    #[test]
    fn test_reconcile_drops_duplicates() {
        let cards = vec![card("a"), card("b")];
        let order = vec!["b".to_string(), "b".to_string(), "a".to_string(), "b".to_string()];
        assert_eq!(ids(&reconcile_queue(&order, &cards)), vec!["b", "a"]);
    }

    #[test]
    fn test_reconcile_is_idempotent() {
        let cards = vec![card("a"), card("b"), card("c"), card("d")];
        let order = vec!["d".to_string(), "x".to_string(), "b".to_string()];

        let once = reconcile_queue(&order, &cards);
        let twice = reconcile_queue(&queue_ids(&once), &cards);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_reconcile_empty_order_is_natural_order() {
        let cards = vec![card("a"), card("b")];
        assert_eq!(ids(&reconcile_queue(&[], &cards)), vec!["a", "b"]);
    }

    #[test]
    fn test_rotate_moves_head_to_tail() {
        let mut queue = vec![card("a"), card("b"), card("c")];
        rotate(&mut queue);
        assert_eq!(ids(&queue), vec!["b", "c", "a"]);

        let mut empty: Vec<Card> = Vec::new();
        rotate(&mut empty);
        assert!(empty.is_empty());
    }

    #[test]
    fn test_light_shuffle_keeps_head_and_members() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            let mut queue: Vec<Card> = ["a", "b", "c", "d", "e", "f"].iter().map(|id| card(id)).collect();
            light_shuffle(&mut queue, &mut rng);

            assert_eq!(queue[0].id, "a");
            let mut sorted = ids(&queue);
            sorted.sort();
            assert_eq!(sorted, vec!["a", "b", "c", "d", "e", "f"]);
        }
    }

    #[test]
    fn test_light_shuffle_skips_short_queues() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut queue = vec![card("a"), card("b")];
        light_shuffle(&mut queue, &mut rng);
        assert_eq!(ids(&queue), vec!["a", "b"]);
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("short", 120), "short");
    }
}
