use crate::error::SearchError;
use crate::node::NodeId;
use rustc_hash::FxHashMap;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// One queued occurrence of a node. The key is captured at insertion and
/// never changes; a node whose priority changes is queued again.
#[derive(Debug, Clone, Copy)]
pub struct FrontierEntry {
    pub node: NodeId,
    pub priority: f64,
    seq: u64,
}

impl PartialEq for FrontierEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for FrontierEntry {}

impl PartialOrd for FrontierEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FrontierEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed so BinaryHeap pops the lowest priority, then the oldest entry.
        other
            .priority
            .total_cmp(&self.priority)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Min-priority queue of nodes with FIFO tie-breaking.
///
/// Duplicate entries for a node are allowed. `contains` is answered from a
/// per-node count of live entries rather than by scanning the heap.
#[derive(Debug, Default)]
pub struct Frontier {
    heap: BinaryHeap<FrontierEntry>,
    live: FxHashMap<NodeId, u32>,
    next_seq: u64,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, node: NodeId, priority: f64) {
        let entry = FrontierEntry {
            node,
            priority,
            seq: self.next_seq,
        };
        self.next_seq += 1;
        self.heap.push(entry);
        *self.live.entry(node).or_insert(0) += 1;
    }

    pub fn extract_min(&mut self) -> Result<FrontierEntry, SearchError> {
        let entry = self.heap.pop().ok_or(SearchError::Empty)?;
        if let Some(count) = self.live.get_mut(&entry.node) {
            *count -= 1;
            if *count == 0 {
                self.live.remove(&entry.node);
            }
        }
        Ok(entry)
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.live.contains_key(&node)
    }

    /// Number of live entries, duplicates included.
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn clear(&mut self) {
        self.heap.clear();
        self.live.clear();
        self.next_seq = 0;
    }

    /// Live entries in the order they would be extracted.
    pub fn ordered(&self) -> Vec<FrontierEntry> {
        let mut entries = self.heap.clone().into_sorted_vec();
        entries.reverse();
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_in_priority_order() {
        let mut frontier = Frontier::new();
        frontier.insert(1, 3.0);
        frontier.insert(2, 1.0);
        frontier.insert(3, 2.0);
        let order: Vec<NodeId> = (0..3)
            .map(|_| frontier.extract_min().unwrap().node)
            .collect();
        assert_eq!(order, vec![2, 3, 1]);
    }

    #[test]
    fn equal_priorities_come_out_first_in_first_out() {
        let mut frontier = Frontier::new();
        for node in [7, 3, 9, 1] {
            frontier.insert(node, 5.0);
        }
        let order: Vec<NodeId> = (0..4)
            .map(|_| frontier.extract_min().unwrap().node)
            .collect();
        assert_eq!(order, vec![7, 3, 9, 1]);
    }

    #[test]
    fn empty_extraction_fails() {
        let mut frontier = Frontier::new();
        assert_eq!(frontier.extract_min().unwrap_err(), SearchError::Empty);
    }

    #[test]
    fn duplicates_keep_membership_until_all_are_extracted() {
        let mut frontier = Frontier::new();
        frontier.insert(4, 10.0);
        frontier.insert(4, 2.0);
        assert_eq!(frontier.len(), 2);
        assert!(frontier.contains(4));

        let first = frontier.extract_min().unwrap();
        assert_eq!((first.node, first.priority), (4, 2.0));
        assert!(frontier.contains(4));

        frontier.extract_min().unwrap();
        assert!(!frontier.contains(4));
        assert!(frontier.is_empty());
    }

    #[test]
    fn ordered_matches_extraction_order() {
        let mut frontier = Frontier::new();
        frontier.insert(1, 2.0);
        frontier.insert(2, 1.0);
        frontier.insert(3, 2.0);
        frontier.insert(4, 0.5);
        let snapshot: Vec<NodeId> = frontier.ordered().iter().map(|e| e.node).collect();
        let mut drained = Vec::new();
        while let Ok(entry) = frontier.extract_min() {
            drained.push(entry.node);
        }
        assert_eq!(snapshot, drained);
        assert_eq!(drained, vec![4, 2, 1, 3]);
    }

    #[test]
    fn clear_resets_tie_breaking() {
        let mut frontier = Frontier::new();
        frontier.insert(1, 0.0);
        frontier.clear();
        assert!(frontier.is_empty());
        assert!(!frontier.contains(1));
        frontier.insert(2, 0.0);
        frontier.insert(3, 0.0);
        assert_eq!(frontier.extract_min().unwrap().node, 2);
    }
}
