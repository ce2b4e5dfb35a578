//! Pomodoro Context - Aggregate Root

use super::{Completion, ParticipantId, Phase, SessionKind, Settings, SkipCredit, Stats};

/// 番茄钟循环聚合根（不含时钟，只做阶段与统计的簿记）
///
/// 不变量:
/// - cycle_index < settings.cycles
/// - 进入长休息时 cycle_index 归零
#[derive(Debug, Clone)]
pub struct PomodoroCycle {
    settings: Settings,
    phase: Phase,
    cycle_index: u32,
    stats: Stats,
}

/// 一次阶段转换的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseChange {
    pub previous: Phase,
    pub next: Phase,
    /// 新阶段时长（秒）
    pub duration_secs: u64,
    /// 本次转换计入统计的专注秒数
    pub credited_secs: u64,
    pub cycle_index: u32,
}

impl PomodoroCycle {
    /// 从专注阶段开始
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            phase: Phase::Work,
            cycle_index: 0,
            stats: Stats::new(),
        }
    }

    pub fn duration_of(&self, phase: Phase) -> u64 {
        match phase {
            Phase::Work => self.settings.work_secs(),
            Phase::ShortBreak => self.settings.short_break_secs(),
            Phase::LongBreak => self.settings.long_break_secs(),
        }
    }

    /// 结束当前阶段并进入下一阶段
    ///
    /// `elapsed_secs` 只在跳过专注阶段且策略为 `Elapsed` 时使用
    pub fn complete_phase<'a>(
        &mut self,
        completion: Completion,
        elapsed_secs: u64,
        present: impl IntoIterator<Item = &'a ParticipantId>,
    ) -> PhaseChange {
        let previous = self.phase;
        let mut credited_secs = 0;

        let next = match previous {
            Phase::Work => {
                let work_secs = self.settings.work_secs();
                match (completion, self.settings.skip_credit()) {
                    (Completion::Natural, _) | (Completion::Skipped, SkipCredit::Full) => {
                        self.stats.record_completed_work(work_secs, present);
                        credited_secs = work_secs;
                    }
                    (Completion::Skipped, SkipCredit::Elapsed) => {
                        credited_secs = elapsed_secs.min(work_secs);
                        if credited_secs > 0 {
                            self.stats.add_focus(credited_secs, present);
                        }
                    }
                    (Completion::Skipped, SkipCredit::None) => {}
                }

                self.cycle_index += 1;
                if self.cycle_index >= self.settings.cycles() {
                    self.cycle_index = 0;
                    Phase::LongBreak
                } else {
                    Phase::ShortBreak
                }
            }
            Phase::ShortBreak | Phase::LongBreak => Phase::Work,
        };

        self.phase = next;
        PhaseChange {
            previous,
            next,
            duration_secs: self.duration_of(next),
            credited_secs,
            cycle_index: self.cycle_index,
        }
    }

    /// 单次倒计时在当前阶段结束后不再进入下一阶段
    pub fn ends_after_phase(&self) -> bool {
        self.settings.kind() == SessionKind::Countdown
    }

    /// 替换设置，当前阶段不变
    pub fn reconfigure(&mut self, settings: Settings) {
        // 循环次数变小时避免越界
        if self.cycle_index >= settings.cycles() {
            self.cycle_index = settings.cycles() - 1;
        }
        self.settings = settings;
    }

    // Getters
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn cycle_index(&self) -> u32 {
        self.cycle_index
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::pomodoro::{SettingsDraft, DEFAULT_MAX_INTERVAL_SECS};

    fn settings(work: u64, short: u64, long: u64, cycles: u32, skip: SkipCredit) -> Settings {
        SettingsDraft {
            work_secs: work,
            short_break_secs: short,
            long_break_secs: Some(long),
            cycles,
            skip_credit: skip,
            ..Default::default()
        }
        .validate(DEFAULT_MAX_INTERVAL_SECS)
        .unwrap()
    }

    fn no_one() -> Vec<&'static ParticipantId> {
        Vec::new()
    }

    #[test]
    fn test_full_pomodoro_scenario() {
        let mut cycle = PomodoroCycle::new(settings(1500, 300, 1200, 4, SkipCredit::None));
        assert_eq!(cycle.phase(), Phase::Work);
        assert_eq!(cycle.duration_of(cycle.phase()), 1500);

        let change = cycle.complete_phase(Completion::Natural, 1500, no_one());
        assert_eq!(change.next, Phase::ShortBreak);
        assert_eq!(change.duration_secs, 300);
        assert_eq!(cycle.stats().completed_work(), 1);

        // 再完成 3 组 break + work
        for round in 2..=4 {
            let change = cycle.complete_phase(Completion::Natural, 300, no_one());
            assert_eq!(change.next, Phase::Work);
            let change = cycle.complete_phase(Completion::Natural, 1500, no_one());
            if round < 4 {
                assert_eq!(change.next, Phase::ShortBreak);
            } else {
                assert_eq!(change.next, Phase::LongBreak);
                assert_eq!(change.duration_secs, 1200);
            }
        }

        assert_eq!(cycle.cycle_index(), 0);
        assert_eq!(cycle.stats().completed_work(), 4);
        assert_eq!(cycle.stats().focused_secs(), 4 * 1500);
    }

    #[test]
    fn test_long_break_after_cycles_for_various_counts() {
        for cycles in 1..=6 {
            let mut cycle = PomodoroCycle::new(settings(60, 10, 30, cycles, SkipCredit::None));
            for i in 1..=cycles {
                let change = cycle.complete_phase(Completion::Natural, 60, no_one());
                if i == cycles {
                    assert_eq!(change.next, Phase::LongBreak, "cycles = {}", cycles);
                } else {
                    assert_eq!(change.next, Phase::ShortBreak, "cycles = {}", cycles);
                    assert_eq!(cycle.cycle_index(), i);
                }
                cycle.complete_phase(Completion::Natural, 10, no_one());
            }
            assert_eq!(cycle.cycle_index(), 0);
            assert_eq!(cycle.phase(), Phase::Work);
        }
    }

    #[test]
    fn test_skip_credit_policies() {
        let alice = ParticipantId::new("alice").unwrap();

        let mut none = PomodoroCycle::new(settings(1500, 300, 1200, 4, SkipCredit::None));
        let change = none.complete_phase(Completion::Skipped, 700, [&alice]);
        assert_eq!(change.credited_secs, 0);
        assert_eq!(none.stats().focused_secs(), 0);
        assert_eq!(none.cycle_index(), 1);

        let mut elapsed = PomodoroCycle::new(settings(1500, 300, 1200, 4, SkipCredit::Elapsed));
        let change = elapsed.complete_phase(Completion::Skipped, 700, [&alice]);
        assert_eq!(change.credited_secs, 700);
        assert_eq!(elapsed.stats().completed_work(), 0);
        assert_eq!(elapsed.stats().contribution(&alice), 700);

        let mut full = PomodoroCycle::new(settings(1500, 300, 1200, 4, SkipCredit::Full));
        full.complete_phase(Completion::Skipped, 700, [&alice]);
        assert_eq!(full.stats().completed_work(), 1);
        assert_eq!(full.stats().focused_secs(), 1500);
    }

    #[test]
    fn test_skip_break_credits_nothing() {
        let mut cycle = PomodoroCycle::new(settings(1500, 300, 1200, 4, SkipCredit::Full));
        cycle.complete_phase(Completion::Natural, 1500, no_one());
        let change = cycle.complete_phase(Completion::Skipped, 10, no_one());
        assert_eq!(change.next, Phase::Work);
        assert_eq!(change.credited_secs, 0);
        assert_eq!(cycle.stats().completed_work(), 1);
    }

    #[test]
    fn test_countdown_ends_after_single_phase() {
        let pomodoro = PomodoroCycle::new(settings(60, 10, 30, 4, SkipCredit::None));
        assert!(!pomodoro.ends_after_phase());

        let countdown = PomodoroCycle::new(
            SettingsDraft {
                kind: SessionKind::Countdown,
                work_secs: 90,
                ..Default::default()
            }
            .validate(DEFAULT_MAX_INTERVAL_SECS)
            .unwrap(),
        );
        assert!(countdown.ends_after_phase());
        assert_eq!(countdown.duration_of(countdown.phase()), 90);
    }

    #[test]
    fn test_reconfigure_clamps_cycle_index() {
        let mut cycle = PomodoroCycle::new(settings(60, 10, 30, 4, SkipCredit::None));
        for _ in 0..3 {
            cycle.complete_phase(Completion::Natural, 60, no_one());
            cycle.complete_phase(Completion::Natural, 10, no_one());
        }
        assert_eq!(cycle.cycle_index(), 3);

        cycle.reconfigure(settings(60, 10, 30, 2, SkipCredit::None));
        assert_eq!(cycle.cycle_index(), 1);
        let change = cycle.complete_phase(Completion::Natural, 60, no_one());
        assert_eq!(change.next, Phase::LongBreak);
    }
}
