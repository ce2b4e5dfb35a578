//! Pomodoro Context - Stats

use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

use super::ParticipantId;

/// 会话统计
///
/// 只由会话的阶段转换逻辑修改，外部只能读取快照
#[derive(Debug, Clone, Default)]
pub struct Stats {
    completed_work: u32,
    focused_secs: u64,
    contributions: HashMap<ParticipantId, u64>,
}

/// 统计快照（只读）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    pub completed_work: u32,
    pub focused_secs: u64,
    pub contributions: BTreeMap<ParticipantId, u64>,
}

impl Stats {
    pub fn new() -> Self {
        Self::default()
    }

    /// 记录一个完整的专注阶段
    pub(crate) fn record_completed_work<'a>(
        &mut self,
        secs: u64,
        present: impl IntoIterator<Item = &'a ParticipantId>,
    ) {
        self.completed_work = self.completed_work.saturating_add(1);
        self.add_focus(secs, present);
    }

    /// 只累计专注时长
    pub(crate) fn add_focus<'a>(
        &mut self,
        secs: u64,
        present: impl IntoIterator<Item = &'a ParticipantId>,
    ) {
        self.focused_secs = self.focused_secs.saturating_add(secs);
        for participant in present {
            let entry = self.contributions.entry(participant.clone()).or_insert(0);
            *entry = entry.saturating_add(secs);
        }
    }

    pub fn completed_work(&self) -> u32 {
        self.completed_work
    }

    pub fn focused_secs(&self) -> u64 {
        self.focused_secs
    }

    pub fn contribution(&self, participant: &ParticipantId) -> u64 {
        self.contributions.get(participant).copied().unwrap_or(0)
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            completed_work: self.completed_work,
            focused_secs: self.focused_secs,
            contributions: self
                .contributions
                .iter()
                .map(|(k, v)| (k.clone(), *v))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_completed_work_credits_participants() {
        let alice = ParticipantId::new("alice").unwrap();
        let bob = ParticipantId::new("bob").unwrap();
        let mut stats = Stats::new();

        stats.record_completed_work(1500, [&alice, &bob]);
        stats.record_completed_work(1500, [&alice]);

        assert_eq!(stats.completed_work(), 2);
        assert_eq!(stats.focused_secs(), 3000);
        assert_eq!(stats.contribution(&alice), 3000);
        assert_eq!(stats.contribution(&bob), 1500);
    }

    #[test]
    fn test_add_focus_does_not_bump_count() {
        let mut stats = Stats::new();
        stats.add_focus(600, []);
        assert_eq!(stats.completed_work(), 0);
        assert_eq!(stats.focused_secs(), 600);

        let snapshot = stats.snapshot();
        assert!(snapshot.contributions.is_empty());
    }
}
