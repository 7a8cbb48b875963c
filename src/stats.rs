use crate::models::{
    ChartPoint, CheckIn, CheckInSummary, Completion, HardHabit, LowDay, PatternTag,
};
use chrono::{Duration, Local, NaiveDate};
use std::collections::HashMap;
use tracing::warn;

pub const LOW_RATE: f64 = 50.0;
pub const HIGH_RATE: f64 = 80.0;
pub const HARD_FAIL_RATIO: f64 = 0.5;
pub const HARD_MIN_SAMPLES: usize = 3;
pub const SUMMARY_DAYS: u32 = 7;

const DEMO_RATES: [f64; 7] = [55.0, 70.0, 45.0, 80.0, 60.0, 75.0, 65.0];

pub fn daily_completion(checkin: &CheckIn) -> Completion {
    let total = checkin.items.len();
    let done = checkin.items.iter().filter(|item| item.done).count();
    let rate = if total == 0 {
        0.0
    } else {
        done as f64 / total as f64 * 100.0
    };
    Completion { done, total, rate }
}

pub fn summarize_checkins(checkins: &[CheckIn], days: u32) -> CheckInSummary {
    summarize_checkins_at(Local::now().date_naive(), checkins, days)
}

pub fn summarize_checkins_at(today: NaiveDate, checkins: &[CheckIn], days: u32) -> CheckInSummary {
    let mut summary = CheckInSummary {
        days,
        count: 0,
        avg_completion_rate: 0.0,
        low_days: Vec::new(),
        hard_habits: Vec::new(),
        patterns: Vec::new(),
    };
    if checkins.is_empty() {
        return summary;
    }

    let cutoff = today - Duration::days(i64::from(days.max(1)) - 1);
    let recent: Vec<&CheckIn> = checkins
        .iter()
        .filter(|checkin| checkin_date(checkin).is_some_and(|date| date >= cutoff))
        .collect();

    if recent.is_empty() {
        summary.patterns.push(PatternTag::NoRecentCheckins);
        return summary;
    }

    let mut rate_sum = 0.0;
    for checkin in &recent {
        let completion = daily_completion(checkin);
        rate_sum += completion.rate;
        if completion.rate < LOW_RATE {
            summary.low_days.push(LowDay {
                date: checkin.date.chars().take(10).collect(),
                done: completion.done,
                total: completion.total,
                rate: round1(completion.rate),
            });
        }
    }
    let avg = rate_sum / recent.len() as f64;

    summary.count = recent.len();
    summary.avg_completion_rate = round1(avg);
    summary.patterns.push(rate_pattern(avg));
    if !summary.low_days.is_empty() {
        summary.patterns.push(PatternTag::LowDays {
            count: summary.low_days.len(),
        });
    }

    summary.hard_habits = hard_habits(&recent);
    if !summary.hard_habits.is_empty() {
        summary.patterns.push(PatternTag::FrequentMisses {
            habits: summary
                .hard_habits
                .iter()
                .map(|habit| format!("{}({}%)", habit.name, habit.fail_rate))
                .collect(),
        });
    }

    summary
}

fn rate_pattern(avg: f64) -> PatternTag {
    if avg < LOW_RATE {
        PatternTag::LowerDifficulty
    } else if avg >= HIGH_RATE {
        PatternTag::MaintainOrRaise
    } else {
        PatternTag::FineTune
    }
}

/// Habits missed at least half the time across at least three samples,
/// most misses first. Ties keep the order in which habits were first missed.
fn hard_habits(recent: &[&CheckIn]) -> Vec<HardHabit> {
    let mut order: Vec<&str> = Vec::new();
    let mut totals: HashMap<&str, usize> = HashMap::new();
    let mut fails: HashMap<&str, usize> = HashMap::new();

    for checkin in recent {
        for item in &checkin.items {
            let name = item.name.as_str();
            *totals.entry(name).or_insert(0) += 1;
            if !item.done {
                let fail = fails.entry(name).or_insert(0);
                if *fail == 0 {
                    order.push(name);
                }
                *fail += 1;
            }
        }
    }

    let mut failing: Vec<(&str, usize)> = order
        .into_iter()
        .filter_map(|name| fails.get(name).map(|fail| (name, *fail)))
        .collect();
    failing.sort_by(|a, b| b.1.cmp(&a.1));

    failing
        .into_iter()
        .filter_map(|(name, fail)| {
            let total = totals.get(name).copied().unwrap_or(1);
            let ratio = fail as f64 / total as f64;
            (ratio >= HARD_FAIL_RATIO && total >= HARD_MIN_SAMPLES).then(|| HardHabit {
                name: name.to_string(),
                fail_rate: round1(ratio * 100.0),
                samples: total,
            })
        })
        .collect()
}

pub fn build_7day_chart(checkins: &[CheckIn]) -> Vec<ChartPoint> {
    build_7day_chart_at(Local::now().date_naive(), checkins)
}

/// Completion rate for each of the last seven days, oldest first. With no
/// check-ins at all a fixed demo series is shown instead.
pub fn build_7day_chart_at(today: NaiveDate, checkins: &[CheckIn]) -> Vec<ChartPoint> {
    let mut by_date: HashMap<NaiveDate, f64> = HashMap::new();
    for checkin in checkins {
        if let Some(date) = checkin_date(checkin) {
            by_date.insert(date, round1(daily_completion(checkin).rate));
        }
    }

    (0..7)
        .rev()
        .enumerate()
        .map(|(idx, offset)| {
            let date = today - Duration::days(offset);
            let fallback = if checkins.is_empty() { DEMO_RATES[idx] } else { 0.0 };
            ChartPoint {
                date: date.format("%m/%d").to_string(),
                rate: by_date.get(&date).copied().unwrap_or(fallback),
            }
        })
        .collect()
}

/// Locally derived guidance passed along with the summary when adjusting.
pub fn auto_adjustment_note(summary: &CheckInSummary) -> String {
    let mut notes = Vec::new();
    let avg = summary.avg_completion_rate;
    if avg < LOW_RATE {
        notes.push("Completion is low: make difficulty, frequency and time slots more realistic");
    } else if avg >= HIGH_RATE {
        notes.push("Completion is high: keep the plan or raise it slightly (e.g. +1 per week)");
    } else {
        notes.push("Completion is moderate: fine-tune the hardest items");
    }
    if !summary.hard_habits.is_empty() {
        notes.push(
            "Break frequently missed habits into easier alternatives or move them to another time slot",
        );
    }
    notes.join("; ")
}

fn checkin_date(checkin: &CheckIn) -> Option<NaiveDate> {
    let raw = checkin.date.trim();
    match raw.get(..10).map(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d")) {
        Some(Ok(date)) => Some(date),
        _ => {
            warn!("skipping check-in with unparseable date {raw:?}");
            None
        }
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CheckInItem;

    fn day(date: NaiveDate, items: &[(&str, bool)]) -> CheckIn {
        CheckIn {
            date: format!("{date}T21:00:00"),
            mood: Some(6),
            items: items
                .iter()
                .map(|(name, done)| CheckInItem {
                    name: name.to_string(),
                    done: *done,
                    note: String::new(),
                })
                .collect(),
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, 5).expect("date")
    }

    #[test]
    fn empty_day_has_zero_rate() {
        let completion = daily_completion(&day(today(), &[]));
        assert_eq!(completion, Completion { done: 0, total: 0, rate: 0.0 });
    }

    #[test]
    fn two_of_three_is_66_7_percent() {
        let checkin = day(today(), &[("walk", true), ("read", true), ("sleep", false)]);
        let completion = daily_completion(&checkin);
        assert_eq!((completion.done, completion.total), (2, 3));
        assert_eq!(round1(completion.rate), 66.7);
    }

    #[test]
    fn low_week_surfaces_lower_difficulty() {
        let checkins: Vec<CheckIn> = (0..5)
            .map(|offset| {
                day(
                    today() - Duration::days(offset),
                    &[("walk", true), ("read", false), ("sleep", false)],
                )
            })
            .collect();

        let summary = summarize_checkins_at(today(), &checkins, 7);
        assert_eq!(summary.count, 5);
        assert_eq!(summary.avg_completion_rate, 33.3);
        assert_eq!(summary.patterns[0], PatternTag::LowerDifficulty);
        assert!(summary.patterns.contains(&PatternTag::LowDays { count: 5 }));
        assert_eq!(summary.hard_habits.len(), 2);
        assert_eq!(summary.hard_habits[0].name, "read");
        assert_eq!(summary.hard_habits[0].fail_rate, 100.0);
        assert_eq!(summary.hard_habits[0].samples, 5);
        assert!(auto_adjustment_note(&summary).contains("low"));
    }

    #[test]
    fn high_week_surfaces_maintain_or_raise() {
        let checkins: Vec<CheckIn> = (0..5)
            .map(|offset| {
                day(
                    today() - Duration::days(offset),
                    &[("walk", true), ("read", true), ("sleep", true)],
                )
            })
            .collect();
        let summary = summarize_checkins_at(today(), &checkins, 7);
        assert_eq!(summary.avg_completion_rate, 100.0);
        assert_eq!(summary.patterns, vec![PatternTag::MaintainOrRaise]);
        assert!(summary.hard_habits.is_empty());
    }

    #[test]
    fn middle_rates_fine_tune() {
        let checkins = vec![day(today(), &[("a", true), ("b", true), ("c", false)])];
        let summary = summarize_checkins_at(today(), &checkins, 7);
        assert_eq!(summary.patterns, vec![PatternTag::FineTune]);
    }

    #[test]
    fn tied_hard_habits_follow_first_miss() {
        let checkins = vec![
            day(today() - Duration::days(2), &[("walk", true), ("read", false)]),
            day(today() - Duration::days(1), &[("walk", false), ("read", false)]),
            day(today(), &[("walk", false), ("read", true)]),
        ];
        let summary = summarize_checkins_at(today(), &checkins, 7);
        let names: Vec<&str> = summary
            .hard_habits
            .iter()
            .map(|habit| habit.name.as_str())
            .collect();
        assert_eq!(names, vec!["read", "walk"]);
    }

    #[test]
    fn hard_habits_need_three_samples() {
        let checkins = vec![
            day(today(), &[("stretch", false)]),
            day(today() - Duration::days(1), &[("stretch", false)]),
        ];
        let summary = summarize_checkins_at(today(), &checkins, 7);
        assert!(summary.hard_habits.is_empty());
    }

    #[test]
    fn old_checkins_fall_outside_window() {
        let checkins = vec![day(today() - Duration::days(10), &[("walk", true)])];
        let summary = summarize_checkins_at(today(), &checkins, 7);
        assert_eq!(summary.count, 0);
        assert_eq!(summary.patterns, vec![PatternTag::NoRecentCheckins]);
    }

    #[test]
    fn no_checkins_means_empty_summary() {
        let summary = summarize_checkins_at(today(), &[], 7);
        assert_eq!(summary.count, 0);
        assert_eq!(summary.avg_completion_rate, 0.0);
        assert!(summary.patterns.is_empty());
    }

    #[test]
    fn chart_uses_demo_series_without_checkins() {
        let chart = build_7day_chart_at(today(), &[]);
        assert_eq!(chart.len(), 7);
        assert_eq!(chart[0].date, "12/30");
        assert_eq!(chart[6].date, "01/05");
        let rates: Vec<f64> = chart.iter().map(|point| point.rate).collect();
        assert_eq!(rates, DEMO_RATES.to_vec());
    }

    #[test]
    fn chart_fills_missing_days_with_zero() {
        let checkins = vec![day(today() - Duration::days(2), &[("a", true), ("b", false)])];
        let chart = build_7day_chart_at(today(), &checkins);
        assert_eq!(chart[4].rate, 50.0);
        assert_eq!(chart[6].rate, 0.0);
        assert_eq!(chart[0].rate, 0.0);
    }

    #[test]
    fn date_only_checkins_are_accepted() {
        let mut checkin = day(today(), &[("a", true)]);
        checkin.date = "2026-01-05".into();
        assert_eq!(checkin_date(&checkin), Some(today()));
        checkin.date = "2026-01-05T08:00:00.123+09:00".into();
        assert_eq!(checkin_date(&checkin), Some(today()));
        checkin.date = "yesterday".into();
        assert_eq!(checkin_date(&checkin), None);
    }
}
