//! Pomodoro Context - Settings
//!
//! 会话设置：创建时校验，之后只能通过 [`Settings::apply`] 整体替换

use serde::{Deserialize, Serialize};

use super::{SessionKind, SettingsError, SkipCredit};

/// 单个阶段的默认上限（4 小时）
pub const DEFAULT_MAX_INTERVAL_SECS: u64 = 4 * 60 * 60;

/// 会话设置
///
/// 不变量:
/// - 所有时长 > 0 且不超过上限
/// - cycles >= 1
///
/// Countdown 会话只使用 work_secs
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Settings {
    kind: SessionKind,
    work_secs: u64,
    short_break_secs: u64,
    long_break_secs: Option<u64>,
    cycles: u32,
    locked: bool,
    auto_mute: bool,
    notify: bool,
    skip_credit: SkipCredit,
}

/// 未校验的设置输入
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SettingsDraft {
    #[serde(default)]
    pub kind: SessionKind,
    pub work_secs: u64,
    pub short_break_secs: u64,
    pub long_break_secs: Option<u64>,
    pub cycles: u32,
    #[serde(default)]
    pub locked: bool,
    #[serde(default)]
    pub auto_mute: bool,
    #[serde(default)]
    pub notify: bool,
    #[serde(default)]
    pub skip_credit: SkipCredit,
}

impl Default for SettingsDraft {
    fn default() -> Self {
        Self {
            kind: SessionKind::Pomodoro,
            work_secs: 25 * 60,
            short_break_secs: 5 * 60,
            long_break_secs: Some(20 * 60),
            cycles: 4,
            locked: false,
            auto_mute: false,
            notify: false,
            skip_credit: SkipCredit::None,
        }
    }
}

impl SettingsDraft {
    /// 校验并生成 Settings
    pub fn validate(self, max_interval_secs: u64) -> Result<Settings, SettingsError> {
        check_duration("work", self.work_secs, max_interval_secs)?;
        check_duration("short_break", self.short_break_secs, max_interval_secs)?;
        if let Some(long_break) = self.long_break_secs {
            check_duration("long_break", long_break, max_interval_secs)?;
        }
        if self.cycles == 0 {
            return Err(SettingsError::NonPositiveCycles);
        }

        Ok(Settings {
            kind: self.kind,
            work_secs: self.work_secs,
            short_break_secs: self.short_break_secs,
            long_break_secs: self.long_break_secs,
            cycles: self.cycles,
            locked: self.locked,
            auto_mute: self.auto_mute,
            notify: self.notify,
            skip_credit: self.skip_credit,
        })
    }
}

fn check_duration(field: &'static str, secs: u64, max: u64) -> Result<(), SettingsError> {
    if secs == 0 {
        return Err(SettingsError::NonPositiveDuration { field });
    }
    if secs > max {
        return Err(SettingsError::DurationTooLong { field, max });
    }
    Ok(())
}

/// 部分更新（未提供的字段沿用当前值）
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SettingsPatch {
    pub kind: Option<SessionKind>,
    pub work_secs: Option<u64>,
    pub short_break_secs: Option<u64>,
    pub long_break_secs: Option<u64>,
    pub cycles: Option<u32>,
    pub locked: Option<bool>,
    pub auto_mute: Option<bool>,
    pub notify: Option<bool>,
    pub skip_credit: Option<SkipCredit>,
}

impl Settings {
    /// 在当前设置上合并 patch 并重新校验
    pub fn apply(&self, patch: SettingsPatch, max_interval_secs: u64) -> Result<Self, SettingsError> {
        SettingsDraft {
            kind: patch.kind.unwrap_or(self.kind),
            work_secs: patch.work_secs.unwrap_or(self.work_secs),
            short_break_secs: patch.short_break_secs.unwrap_or(self.short_break_secs),
            long_break_secs: patch.long_break_secs.or(self.long_break_secs),
            cycles: patch.cycles.unwrap_or(self.cycles),
            locked: patch.locked.unwrap_or(self.locked),
            auto_mute: patch.auto_mute.unwrap_or(self.auto_mute),
            notify: patch.notify.unwrap_or(self.notify),
            skip_credit: patch.skip_credit.unwrap_or(self.skip_credit),
        }
        .validate(max_interval_secs)
    }

    // Getters
    pub fn kind(&self) -> SessionKind {
        self.kind
    }

    pub fn work_secs(&self) -> u64 {
        self.work_secs
    }

    pub fn short_break_secs(&self) -> u64 {
        self.short_break_secs
    }

    /// 未设置长休息时使用短休息时长
    pub fn long_break_secs(&self) -> u64 {
        self.long_break_secs.unwrap_or(self.short_break_secs)
    }

    pub fn cycles(&self) -> u32 {
        self.cycles
    }

    pub fn locked(&self) -> bool {
        self.locked
    }

    pub fn auto_mute(&self) -> bool {
        self.auto_mute
    }

    pub fn notify(&self) -> bool {
        self.notify
    }

    pub fn skip_credit(&self) -> SkipCredit {
        self.skip_credit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(work: u64, short: u64, long: Option<u64>, cycles: u32) -> SettingsDraft {
        SettingsDraft {
            work_secs: work,
            short_break_secs: short,
            long_break_secs: long,
            cycles,
            ..Default::default()
        }
    }

    #[test]
    fn test_valid_settings() {
        let settings = draft(1500, 300, Some(1200), 4)
            .validate(DEFAULT_MAX_INTERVAL_SECS)
            .unwrap();
        assert_eq!(settings.work_secs(), 1500);
        assert_eq!(settings.long_break_secs(), 1200);
        assert_eq!(settings.cycles(), 4);
    }

    #[test]
    fn test_rejects_zero_durations() {
        let err = draft(0, 300, None, 4).validate(DEFAULT_MAX_INTERVAL_SECS).unwrap_err();
        assert_eq!(err, SettingsError::NonPositiveDuration { field: "work" });

        let err = draft(1500, 300, Some(0), 4).validate(DEFAULT_MAX_INTERVAL_SECS).unwrap_err();
        assert_eq!(err, SettingsError::NonPositiveDuration { field: "long_break" });
    }

    #[test]
    fn test_rejects_zero_cycles() {
        let err = draft(1500, 300, None, 0).validate(DEFAULT_MAX_INTERVAL_SECS).unwrap_err();
        assert_eq!(err, SettingsError::NonPositiveCycles);
    }

    #[test]
    fn test_rejects_over_max_interval() {
        let err = draft(3601, 300, None, 4).validate(3600).unwrap_err();
        assert_eq!(err, SettingsError::DurationTooLong { field: "work", max: 3600 });
    }

    #[test]
    fn test_missing_long_break_falls_back_to_short() {
        let settings = draft(1500, 300, None, 4).validate(DEFAULT_MAX_INTERVAL_SECS).unwrap();
        assert_eq!(settings.long_break_secs(), 300);
    }

    #[test]
    fn test_apply_patch_merges_and_revalidates() {
        let settings = draft(1500, 300, Some(1200), 4).validate(DEFAULT_MAX_INTERVAL_SECS).unwrap();

        let patched = settings
            .apply(
                SettingsPatch {
                    work_secs: Some(3000),
                    locked: Some(true),
                    ..Default::default()
                },
                DEFAULT_MAX_INTERVAL_SECS,
            )
            .unwrap();
        assert_eq!(patched.work_secs(), 3000);
        assert_eq!(patched.short_break_secs(), 300);
        assert!(patched.locked());

        let bad = settings.apply(
            SettingsPatch {
                cycles: Some(0),
                ..Default::default()
            },
            DEFAULT_MAX_INTERVAL_SECS,
        );
        assert!(bad.is_err());
        // 原设置保持不变
        assert_eq!(settings.cycles(), 4);
    }
}
