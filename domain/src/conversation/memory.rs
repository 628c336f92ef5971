//! Bounded conversation memory

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Number of exchanges kept when no capacity is configured.
pub const DEFAULT_HISTORY_CAPACITY: usize = 5;

/// One recorded question/answer pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exchange {
    pub question: String,
    pub answer: String,
}

impl Exchange {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
        }
    }
}

/// Capacity-bounded, insertion-ordered log of [`Exchange`]s
///
/// Appends go to the tail; once the capacity is exceeded the oldest entry
/// (the head) is evicted. The length never exceeds the capacity.
///
/// This type is not synchronized. Callers sharing it across tasks wrap it in
/// a mutex so that `append`, `recent` and `clear` are atomic with respect to
/// each other.
#[derive(Debug, Clone)]
pub struct ConversationMemory {
    exchanges: VecDeque<Exchange>,
    capacity: usize,
}

impl ConversationMemory {
    /// Create an empty memory. A capacity of 0 is raised to 1.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            exchanges: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Record an exchange, evicting the oldest one if over capacity.
    pub fn append(&mut self, exchange: Exchange) {
        self.exchanges.push_back(exchange);
        while self.exchanges.len() > self.capacity {
            self.exchanges.pop_front();
        }
    }

    /// The last `n` exchanges in chronological order (oldest first).
    pub fn recent(&self, n: usize) -> Vec<Exchange> {
        let skip = self.exchanges.len().saturating_sub(n);
        self.exchanges.iter().skip(skip).cloned().collect()
    }

    pub fn clear(&mut self) {
        self.exchanges.clear();
    }

    pub fn len(&self) -> usize {
        self.exchanges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exchanges.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn iter(&self) -> impl Iterator<Item = &Exchange> {
        self.exchanges.iter()
    }
}

impl Default for ConversationMemory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exchange(i: usize) -> Exchange {
        Exchange::new(format!("q{}", i), format!("a{}", i))
    }

    #[test]
    fn test_default_capacity() {
        assert_eq!(ConversationMemory::default().capacity(), 5);
    }

    #[test]
    fn test_overflow_evicts_oldest() {
        let mut memory = ConversationMemory::new(3);
        for i in 0..4 {
            memory.append(exchange(i));
        }

        assert_eq!(memory.len(), 3);
        let questions: Vec<_> = memory.iter().map(|e| e.question.as_str()).collect();
        assert_eq!(questions, vec!["q1", "q2", "q3"]);
    }

    #[test]
    fn test_never_exceeds_capacity() {
        let mut memory = ConversationMemory::new(5);
        for i in 0..50 {
            memory.append(exchange(i));
            assert!(memory.len() <= 5);
        }
        assert_eq!(memory.recent(5)[4], exchange(49));
    }

    #[test]
    fn test_recent_is_chronological() {
        let mut memory = ConversationMemory::new(5);
        for i in 0..5 {
            memory.append(exchange(i));
        }

        let recent = memory.recent(3);
        assert_eq!(recent, vec![exchange(2), exchange(3), exchange(4)]);
    }

    #[test]
    fn test_recent_shorter_history() {
        let mut memory = ConversationMemory::new(5);
        memory.append(exchange(0));
        assert_eq!(memory.recent(3), vec![exchange(0)]);
        assert!(memory.recent(0).is_empty());
    }

    #[test]
    fn test_clear_then_recent_is_empty() {
        let mut memory = ConversationMemory::new(5);
        memory.append(exchange(0));
        memory.append(exchange(1));
        memory.clear();

        assert!(memory.is_empty());
        for n in 1..10 {
            assert!(memory.recent(n).is_empty());
        }
    }

    #[test]
    fn test_zero_capacity_is_raised() {
        let mut memory = ConversationMemory::new(0);
        assert_eq!(memory.capacity(), 1);
        memory.append(exchange(0));
        memory.append(exchange(1));
        assert_eq!(memory.recent(5), vec![exchange(1)]);
    }
}
