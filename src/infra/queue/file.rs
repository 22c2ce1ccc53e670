//! File-backed tick queue.
//!
//! Pending ticks are persisted as JSON lines so a restarted worker resumes
//! every tick chain that was alive. Both push and pop only append: a pop
//! writes a tombstone line, and the file is compacted once stale lines
//! outnumber live ticks.

use std::collections::{BinaryHeap, HashMap};
use std::fs::{create_dir_all, rename, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::DueTick;
use crate::core::{CampaignError, ScheduledTick, TickQueue};

/// Stale lines tolerated before a compaction is attempted.
const COMPACT_AFTER: usize = 1024;

fn backend<E: ToString>(e: E) -> CampaignError {
    CampaignError::Backend(e.to_string())
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum Line {
    Tick(ScheduledTick),
    Popped { popped: ScheduledTick },
}

/// File-backed queue using JSON lines for durability.
pub struct FileTickQueue {
    path: PathBuf,
    stream: String,
    max_depth: usize,
    ticks: BinaryHeap<DueTick>,
    stale: usize,
}

impl FileTickQueue {
    /// Open (or create) the queue `stream` under directory `path`.
    pub fn new(
        path: impl AsRef<Path>,
        stream: impl Into<String>,
        max_depth: usize,
    ) -> Result<Self, CampaignError> {
        let path = path.as_ref().to_path_buf();
        create_dir_all(&path).map_err(backend)?;
        let mut queue = Self {
            path,
            stream: stream.into(),
            max_depth,
            ticks: BinaryHeap::new(),
            stale: 0,
        };
        queue.load_from_disk()?;
        Ok(queue)
    }

    /// Highest sequence number on disk, so a restarted scheduler can keep
    /// FIFO order among equal due times.
    pub fn max_seq(&self) -> u64 {
        self.ticks.iter().map(|t| t.0.seq).max().unwrap_or(0)
    }

    fn file_path(&self) -> PathBuf {
        self.path.join(format!("{}.jsonl", self.stream))
    }

    fn load_from_disk(&mut self) -> Result<(), CampaignError> {
        let file_path = self.file_path();
        if !file_path.exists() {
            return Ok(());
        }
        let file = OpenOptions::new()
            .read(true)
            .open(&file_path)
            .map_err(backend)?;

        let mut pushed = Vec::new();
        let mut popped: HashMap<ScheduledTick, usize> = HashMap::new();
        let mut lines = 0;
        for line in BufReader::new(file).lines() {
            let line = line.map_err(backend)?;
            if line.trim().is_empty() {
                continue;
            }
            lines += 1;
            match serde_json::from_str(&line).map_err(backend)? {
                Line::Tick(tick) => pushed.push(tick),
                Line::Popped { popped: tick } => *popped.entry(tick).or_default() += 1,
            }
        }
        for tick in pushed {
            match popped.get_mut(&tick) {
                Some(n) if *n > 0 => *n -= 1,
                _ => self.ticks.push(DueTick(tick)),
            }
        }
        self.stale = lines - self.ticks.len();
        tracing::debug!(
            pending = self.ticks.len(),
            stale = self.stale,
            "tick queue loaded from disk"
        );
        Ok(())
    }

    fn append_to_disk(&self, line: &Line) -> Result<(), CampaignError> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.file_path())
            .map_err(backend)?;
        let line = serde_json::to_string(line).map_err(backend)?;
        writeln!(file, "{line}").map_err(backend)
    }

    /// Rewrite the live ticks into a sibling file and swap it in.
    fn compact(&mut self) -> Result<(), CampaignError> {
        let tmp = self.path.join(format!("{}.jsonl.tmp", self.stream));
        {
            let mut file = OpenOptions::new()
                .create(true)
                .write(true)
                .truncate(true)
                .open(&tmp)
                .map_err(backend)?;
            for tick in &self.ticks {
                let line = serde_json::to_string(&tick.0).map_err(backend)?;
                writeln!(file, "{line}").map_err(backend)?;
            }
            file.sync_all().map_err(backend)?;
        }
        rename(&tmp, self.file_path()).map_err(backend)?;
        self.stale = 0;
        Ok(())
    }
}

impl TickQueue for FileTickQueue {
    fn push(&mut self, tick: ScheduledTick) -> Result<(), CampaignError> {
        if self.len() >= self.max_depth() {
            return Err(CampaignError::QueueFull("max queue depth reached".into()));
        }
        self.append_to_disk(&Line::Tick(tick.clone()))?;
        self.ticks.push(DueTick(tick));
        Ok(())
    }

    fn pop_due(&mut self, now_ms: u64) -> Result<Option<ScheduledTick>, CampaignError> {
        let head = match self.ticks.peek() {
            Some(head) if head.0.due_ms <= now_ms => head.0.clone(),
            _ => return Ok(None),
        };
        // The tick stays queued until its removal is on disk.
        self.append_to_disk(&Line::Popped {
            popped: head.clone(),
        })?;
        self.ticks.pop();
        self.stale += 2;

        if self.stale >= COMPACT_AFTER && self.stale > self.ticks.len() {
            if let Err(e) = self.compact() {
                tracing::warn!(stale = self.stale, "tick queue compaction failed: {}", e);
            }
        }
        Ok(Some(head))
    }

    fn next_due(&self) -> Option<u64> {
        self.ticks.peek().map(|t| t.0.due_ms)
    }

    fn max_depth(&self) -> usize {
        self.max_depth
    }

    fn len(&self) -> usize {
        self.ticks.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn tick(due_ms: u64, seq: u64) -> ScheduledTick {
        ScheduledTick {
            campaign_id: Uuid::new_v4(),
            due_ms,
            seq,
        }
    }

    fn line_count(q: &FileTickQueue) -> usize {
        std::fs::read_to_string(q.file_path())
            .unwrap()
            .lines()
            .filter(|l| !l.trim().is_empty())
            .count()
    }

    #[test]
    fn test_compaction_bounds_file_growth() {
        let dir = std::env::temp_dir().join(format!("campaign-compact-{}", Uuid::new_v4()));
        let mut q = FileTickQueue::new(&dir, "ticks", COMPACT_AFTER * 2).unwrap();
        let keep = tick(u64::MAX, 0);
        q.push(keep.clone()).unwrap();

        for seq in 1..=COMPACT_AFTER as u64 {
            q.push(tick(1, seq)).unwrap();
            assert!(q.pop_due(1).unwrap().is_some());
        }
        assert!(line_count(&q) < COMPACT_AFTER);

        let mut q = FileTickQueue::new(&dir, "ticks", 10).unwrap();
        assert_eq!(q.len(), 1);
        assert_eq!(q.pop_due(u64::MAX).unwrap(), Some(keep));
        let _ = std::fs::remove_dir_all(dir);
    }
}
