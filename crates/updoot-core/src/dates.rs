use crate::types::EpochMillis;
use crate::validation::Language;
use chrono::{DateTime, Utc};

const MINUTE_MS: i64 = 60 * 1000;
const HOUR_MS: i64 = 60 * MINUTE_MS;
const DAY_MS: i64 = 24 * HOUR_MS;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Countdown {
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
}

impl Countdown {
    /// Absolute distance between `now` and `at`; past and future look the same.
    pub fn between(now: DateTime<Utc>, at: EpochMillis) -> Self {
        let diff = now.timestamp_millis().abs_diff(at);
        let (day, hour, minute) = (DAY_MS as u64, HOUR_MS as u64, MINUTE_MS as u64);
        // u64::MAX / DAY_MS fits comfortably in an i64
        Self {
            days: (diff / day) as i64,
            hours: ((diff % day) / hour) as i64,
            minutes: ((diff % hour) / minute) as i64,
        }
    }

    pub fn until(at: EpochMillis) -> Self {
        Self::between(Utc::now(), at)
    }

    /// Largest unit only. Under ten minutes renders as an empty string.
    pub fn short(&self, lang: Language) -> String {
        match lang {
            Language::En if self.days > 0 => format!("{} days", self.days),
            Language::Ko if self.days > 0 => format!("{}일 남음", self.days),
            Language::En if self.hours > 0 => format!("{} hours", self.hours),
            Language::Ko if self.hours > 0 => format!("{} 시간 남음", self.hours),
            Language::En if self.minutes > 10 => format!("{} minutes", self.minutes),
            Language::Ko if self.minutes > 10 => format!("{} 분 남음", self.minutes),
            _ => String::new(),
        }
    }

    pub fn long(&self, lang: Language) -> String {
        match lang {
            Language::En => format!("{}d {}h {}m", self.days, self.hours, self.minutes),
            Language::Ko => format!("{}일 {}시 {}분", self.days, self.hours, self.minutes),
        }
    }
}

pub fn days_left(now: DateTime<Utc>, at: EpochMillis) -> i64 {
    Countdown::between(now, at).days
}
