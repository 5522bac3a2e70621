use serde::{Deserialize, Serialize};

/// Number of work phases in one round; the break after the last one is long.
pub const CYCLES_PER_ROUND: u8 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Phase {
    Work,
    ShortBreak,
    LongBreak,
}

impl Phase {
    pub fn is_break(self) -> bool {
        !matches!(self, Phase::Work)
    }

    pub fn label(self) -> &'static str {
        match self {
            Phase::Work => "Work",
            Phase::ShortBreak => "Short Break",
            Phase::LongBreak => "Long Break",
        }
    }
}

/// Nominal length of each phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseDurations {
    /// Work phase length in minutes.
    #[serde(default = "default_work_min")]
    pub work_min: u64,
    #[serde(default = "default_short_break_min")]
    pub short_break_min: u64,
    #[serde(default = "default_long_break_min")]
    pub long_break_min: u64,
}

fn default_work_min() -> u64 {
    25
}
fn default_short_break_min() -> u64 {
    5
}
fn default_long_break_min() -> u64 {
    15
}

impl PhaseDurations {
    pub fn with_long_break(long_break_min: u64) -> Self {
        Self {
            long_break_min,
            ..Self::default()
        }
    }

    pub fn minutes(&self, phase: Phase) -> u64 {
        match phase {
            Phase::Work => self.work_min,
            Phase::ShortBreak => self.short_break_min,
            Phase::LongBreak => self.long_break_min,
        }
    }

    /// Phase length in seconds.
    ///
    /// Uses saturating arithmetic so absurd preferences cannot overflow.
    pub fn secs(&self, phase: Phase) -> u64 {
        self.minutes(phase).saturating_mul(60)
    }
}

impl Default for PhaseDurations {
    fn default() -> Self {
        Self {
            work_min: default_work_min(),
            short_break_min: default_short_break_min(),
            long_break_min: default_long_break_min(),
        }
    }
}

/// Which cycle values a transition row applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CycleGuard {
    Below(u8),
    AtLeast(u8),
    Any,
}

impl CycleGuard {
    fn matches(self, cycle: u8) -> bool {
        match self {
            CycleGuard::Below(n) => cycle < n,
            CycleGuard::AtLeast(n) => cycle >= n,
            CycleGuard::Any => true,
        }
    }
}

/// What a transition does to the cycle counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CycleEffect {
    Increment,
    Reset,
    Keep,
}

impl CycleEffect {
    fn apply(self, cycle: u8) -> u8 {
        match self {
            CycleEffect::Increment => cycle.saturating_add(1),
            CycleEffect::Reset => 1,
            CycleEffect::Keep => cycle,
        }
    }
}

struct Transition {
    from: Phase,
    guard: CycleGuard,
    to: Phase,
    effect: CycleEffect,
}

const TRANSITIONS: [Transition; 4] = [
    Transition {
        from: Phase::Work,
        guard: CycleGuard::Below(CYCLES_PER_ROUND),
        to: Phase::ShortBreak,
        effect: CycleEffect::Increment,
    },
    Transition {
        from: Phase::Work,
        guard: CycleGuard::AtLeast(CYCLES_PER_ROUND),
        to: Phase::LongBreak,
        effect: CycleEffect::Reset,
    },
    Transition {
        from: Phase::ShortBreak,
        guard: CycleGuard::Any,
        to: Phase::Work,
        effect: CycleEffect::Keep,
    },
    Transition {
        from: Phase::LongBreak,
        guard: CycleGuard::Any,
        to: Phase::Work,
        effect: CycleEffect::Keep,
    },
];

/// Phase and cycle that follow completing `phase` at `cycle`.
pub fn next_phase(phase: Phase, cycle: u8) -> (Phase, u8) {
    TRANSITIONS
        .iter()
        .find(|t| t.from == phase && t.guard.matches(cycle))
        .map(|t| (t.to, t.effect.apply(cycle)))
        // Every phase has an `Any` or complementary row, so this is unreachable.
        .unwrap_or((Phase::Work, 1))
}
