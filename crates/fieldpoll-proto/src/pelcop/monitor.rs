use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

/// A video monitor whose sequence (macro) can be switched.
pub trait VideoMonitor: Send + Sync {
    fn mon_num(&self) -> u32;

    /// Start sequence `seq`. Returns `false` if the monitor has no such
    /// sequence.
    fn set_seq_num(&self, seq: u32) -> bool;
}

/// Looks up monitors by number.
pub trait MonitorDirectory: Send + Sync {
    fn find(&self, mon_num: u32) -> Option<Arc<dyn VideoMonitor>>;
}

/// In-memory monitor with a fixed list of sequences.
#[derive(Debug)]
pub struct MemoryMonitor {
    mon_num: u32,
    sequences: Vec<u32>,
    seq_num: Mutex<Option<u32>>,
}

impl MemoryMonitor {
    pub fn new(mon_num: u32, sequences: impl IntoIterator<Item = u32>) -> Self {
        Self {
            mon_num,
            sequences: sequences.into_iter().collect(),
            seq_num: Mutex::new(None),
        }
    }

    /// Sequence currently running, if one was ever selected.
    pub fn seq_num(&self) -> Option<u32> {
        *self.seq_num.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl VideoMonitor for MemoryMonitor {
    fn mon_num(&self) -> u32 {
        self.mon_num
    }

    fn set_seq_num(&self, seq: u32) -> bool {
        if !self.sequences.contains(&seq) {
            return false;
        }
        *self.seq_num.lock().unwrap_or_else(PoisonError::into_inner) = Some(seq);
        true
    }
}

/// A [`MonitorDirectory`] over [`MemoryMonitor`]s.
#[derive(Debug, Default)]
pub struct MonitorSet {
    monitors: HashMap<u32, Arc<MemoryMonitor>>,
}

impl MonitorSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `monitor`, replacing any with the same number.
    pub fn insert(&mut self, monitor: MemoryMonitor) -> Arc<MemoryMonitor> {
        let monitor = Arc::new(monitor);
        self.monitors.insert(monitor.mon_num, Arc::clone(&monitor));
        monitor
    }

    pub fn get(&self, mon_num: u32) -> Option<&Arc<MemoryMonitor>> {
        self.monitors.get(&mon_num)
    }

    pub fn len(&self) -> usize {
        self.monitors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.monitors.is_empty()
    }
}

impl MonitorDirectory for MonitorSet {
    fn find(&self, mon_num: u32) -> Option<Arc<dyn VideoMonitor>> {
        self.monitors
            .get(&mon_num)
            .map(|m| Arc::clone(m) as Arc<dyn VideoMonitor>)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_sequence_is_refused() {
        let mon = MemoryMonitor::new(3, [10, 20]);
        assert!(!mon.set_seq_num(30));
        assert_eq!(mon.seq_num(), None);
        assert!(mon.set_seq_num(20));
        assert_eq!(mon.seq_num(), Some(20));
    }

    #[test]
    fn directory_lookup() {
        let mut set = MonitorSet::new();
        let mon = set.insert(MemoryMonitor::new(12, [1]));
        assert_eq!(set.len(), 1);

        let found = set.find(12).unwrap();
        assert_eq!(found.mon_num(), 12);
        assert!(found.set_seq_num(1));
        assert_eq!(mon.seq_num(), Some(1));
        assert!(set.find(13).is_none());
    }
}
