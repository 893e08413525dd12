use std::ops::RangeInclusive;

use anyhow::anyhow;
use chrono::{Days, Local, NaiveDateTime, Timelike};
use rand::Rng;

use crate::types::{DailyUsageEntry, MockUsageReport};

pub const DAYS: u64 = 7;
pub const DAILY_TOKENS: RangeInclusive<u64> = 10_000..=150_000;
pub const TOKENS_PER_CALL: u64 = 500;
pub const USAGE_LIMIT: u64 = 5_000_000;

const DAILY_RATE: f64 = 0.00003;
const OPUS_RATE: f64 = 0.00002;
const SONNET_RATE: f64 = 0.00001;
const HAIKU_RATE: f64 = 0.000005;
const TOTAL_RATE: f64 = 0.000035;

const WEB_SHARE: f64 = 0.7;
const TERMINAL_SHARE: f64 = 0.3;

pub fn generate_now() -> anyhow::Result<MockUsageReport> {
    generate(&mut rand::thread_rng(), Local::now().naive_local())
}

/// Synthesizes a week of usage ending on `now`'s date.
///
/// Tier costs and the web/terminal split are each derived from the total
/// on their own, so they don't add up to the per-day figures.
pub fn generate<R: Rng>(
    rng: &mut R,
    now: NaiveDateTime,
) -> anyhow::Result<MockUsageReport> {
    let today = now.date();
    let daily_usage = (0..DAYS)
        .rev()
        .map(|days_ago| -> anyhow::Result<DailyUsageEntry> {
            let date = today
                .checked_sub_days(Days::new(days_ago))
                .ok_or_else(|| {
                    anyhow!("Date out of range: {today} minus {days_ago} days")
                })?;
            let tokens = rng.gen_range(DAILY_TOKENS);
            Ok(DailyUsageEntry {
                date: date.format("%Y-%m-%d").to_string(),
                tokens,
                api_calls: tokens / TOKENS_PER_CALL,
                cost: tokens as f64 * DAILY_RATE,
            })
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    let total_tokens: u64 = daily_usage.iter().map(|day| day.tokens).sum();
    let api_calls: u64 = daily_usage.iter().map(|day| day.api_calls).sum();
    let total = total_tokens as f64;

    Ok(MockUsageReport {
        total_tokens,
        api_calls,
        opus_cost: total * OPUS_RATE,
        sonnet_cost: total * SONNET_RATE,
        haiku_cost: total * HAIKU_RATE,
        total_cost: total * TOTAL_RATE,
        web_tokens: (total * WEB_SHARE).floor() as u64,
        terminal_tokens: (total * TERMINAL_SHARE).floor() as u64,
        daily_usage,
        usage_limit: USAGE_LIMIT,
        last_updated: iso_format(now),
    })
}

/// Microsecond precision, with the fraction left out when it's zero.
fn iso_format(time: NaiveDateTime) -> String {
    if time.nanosecond() / 1_000 == 0 {
        time.format("%Y-%m-%dT%H:%M:%S").to_string()
    } else {
        time.format("%Y-%m-%dT%H:%M:%S%.6f").to_string()
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, NaiveDateTime, Timelike};
    use rand::{rngs::StdRng, SeedableRng};

    use super::{generate, DAILY_TOKENS, USAGE_LIMIT};

    fn at(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_micro_opt(13, 5, 9, 42)
            .unwrap()
    }

    #[test]
    fn week_ending_today() {
        let mut rng = StdRng::seed_from_u64(7);
        let report = generate(&mut rng, at(2024, 3, 2)).unwrap();
        let dates: Vec<&str> =
            report.daily_usage.iter().map(|d| d.date.as_str()).collect();
        // Crosses the leap day.
        assert_eq!(
            dates,
            [
                "2024-02-25",
                "2024-02-26",
                "2024-02-27",
                "2024-02-28",
                "2024-02-29",
                "2024-03-01",
                "2024-03-02",
            ]
        );
    }

    #[test]
    fn totals_are_sums_of_days() {
        for seed in 0..50 {
            let mut rng = StdRng::seed_from_u64(seed);
            let report = generate(&mut rng, at(2025, 1, 3)).unwrap();
            assert_eq!(report.daily_usage.len(), 7);
            for day in &report.daily_usage {
                assert!(DAILY_TOKENS.contains(&day.tokens), "{day:?}");
                assert_eq!(day.api_calls, day.tokens / 500);
                let cost = day.tokens as f64 * 0.00003;
                assert!((day.cost - cost).abs() < 1e-9);
            }
            let tokens: u64 =
                report.daily_usage.iter().map(|d| d.tokens).sum();
            let calls: u64 =
                report.daily_usage.iter().map(|d| d.api_calls).sum();
            assert_eq!(report.total_tokens, tokens);
            assert_eq!(report.api_calls, calls);
            assert!(
                report.web_tokens + report.terminal_tokens
                    <= report.total_tokens
            );
            assert_eq!(report.usage_limit, USAGE_LIMIT);
        }
    }

    #[test]
    fn tier_costs_follow_total() {
        let mut rng = StdRng::seed_from_u64(1);
        let report = generate(&mut rng, at(2025, 6, 30)).unwrap();
        let total = report.total_tokens as f64;
        assert!((report.opus_cost - total * 0.00002).abs() < 1e-9);
        assert!((report.sonnet_cost - total * 0.00001).abs() < 1e-9);
        assert!((report.haiku_cost - total * 0.000005).abs() < 1e-9);
        assert!((report.total_cost - total * 0.000035).abs() < 1e-9);
        assert_eq!(report.web_tokens, (total * 0.7).floor() as u64);
        assert_eq!(report.terminal_tokens, (total * 0.3).floor() as u64);
    }

    #[test]
    fn timestamp_format() {
        let mut rng = StdRng::seed_from_u64(1);
        let report = generate(&mut rng, at(2025, 6, 30)).unwrap();
        assert_eq!(report.last_updated, "2025-06-30T13:05:09.000042");
    }

    #[test]
    fn timestamp_without_fraction() {
        let mut rng = StdRng::seed_from_u64(1);
        let now = NaiveDate::from_ymd_opt(2025, 6, 30)
            .unwrap()
            .and_hms_opt(13, 5, 9)
            .unwrap();
        let report = generate(&mut rng, now).unwrap();
        assert_eq!(report.last_updated, "2025-06-30T13:05:09");

        // Sub-microsecond remainder doesn't count.
        let now = now.with_nanosecond(999).unwrap();
        let report = generate(&mut rng, now).unwrap();
        assert_eq!(report.last_updated, "2025-06-30T13:05:09");
    }

    #[test]
    fn date_underflow_is_an_error() {
        let mut rng = StdRng::seed_from_u64(1);
        let now = NaiveDateTime::MIN;
        assert!(generate(&mut rng, now).is_err());
    }

    #[test]
    fn json_shape() {
        let mut rng = StdRng::seed_from_u64(3);
        let report = generate(&mut rng, at(2025, 6, 30)).unwrap();
        let value = serde_json::to_value(&report).unwrap();
        for key in [
            "totalTokens",
            "apiCalls",
            "opusCost",
            "sonnetCost",
            "haikuCost",
            "totalCost",
            "webTokens",
            "terminalTokens",
            "dailyUsage",
            "usageLimit",
            "lastUpdated",
        ] {
            assert!(value.get(key).is_some(), "missing {key}");
        }
        let day = &value["dailyUsage"][0];
        for key in ["date", "tokens", "apiCalls", "cost"] {
            assert!(day.get(key).is_some(), "missing dailyUsage.{key}");
        }
    }
}
