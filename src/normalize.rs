use crate::models::{
    AdjustmentRule, Difficulty, Habit, Plan, Reminder, Schedule, Weekday,
};
use serde_json::Value;

pub const DEFAULT_TIME: &str = "09:00";
pub const DEFAULT_RRULE: &str = "FREQ=DAILY";
pub const DEFAULT_HABIT_NAME: &str = "New habit";
pub const DEFAULT_REMINDER_TITLE: &str = "Reminder";
pub const DEFAULT_FREQUENCY: u8 = 3;
pub const DEFAULT_DAYS: [Weekday; 3] = [Weekday::Mon, Weekday::Wed, Weekday::Fri];

/// Missing or malformed fields fall back to fixed defaults. Normalizing an
/// already normalized plan leaves it unchanged.
pub fn normalize_plan(value: &Value) -> Plan {
    let Some(object) = value.as_object() else {
        return Plan::default();
    };

    Plan {
        summary: string_or(object.get("summary"), ""),
        pain_points: string_list(object.get("pain_points")),
        solutions: string_list(object.get("solutions")),
        new_habits: objects(object.get("new_habits"))
            .map(normalize_habit)
            .collect(),
        reminders: objects(object.get("reminders"))
            .map(normalize_reminder)
            .collect(),
        next_adjustment_rules: objects(object.get("next_adjustment_rules"))
            .filter_map(normalize_rule)
            .collect(),
    }
}

fn normalize_habit(habit: &serde_json::Map<String, Value>) -> Habit {
    let difficulty = habit
        .get("difficulty")
        .and_then(Value::as_str)
        .and_then(Difficulty::parse)
        .unwrap_or_default();

    Habit {
        name: non_empty_or(habit.get("name"), DEFAULT_HABIT_NAME),
        why: string_or(habit.get("why"), ""),
        schedule: normalize_schedule(habit.get("schedule")),
        difficulty,
    }
}

fn normalize_schedule(schedule: Option<&Value>) -> Schedule {
    let Some(schedule) = schedule.and_then(Value::as_object) else {
        return default_schedule();
    };

    let days: Vec<Weekday> = schedule
        .get("days")
        .and_then(Value::as_array)
        .map(|days| {
            days.iter()
                .filter_map(Value::as_str)
                .filter_map(Weekday::from_token)
                .collect()
        })
        .unwrap_or_default();

    Schedule {
        days: if days.is_empty() {
            DEFAULT_DAYS.to_vec()
        } else {
            days
        },
        time: time_or_default(schedule.get("time")),
        frequency_per_week: frequency(schedule.get("frequency_per_week")),
    }
}

fn default_schedule() -> Schedule {
    Schedule {
        days: DEFAULT_DAYS.to_vec(),
        time: DEFAULT_TIME.to_string(),
        frequency_per_week: DEFAULT_FREQUENCY,
    }
}

fn normalize_reminder(reminder: &serde_json::Map<String, Value>) -> Reminder {
    Reminder {
        title: non_empty_or(reminder.get("title"), DEFAULT_REMINDER_TITLE),
        time: time_or_default(reminder.get("time")),
        rrule: rrule_or_default(reminder.get("rrule")),
    }
}

fn normalize_rule(rule: &serde_json::Map<String, Value>) -> Option<AdjustmentRule> {
    let condition = string_or(rule.get("if"), "");
    let action = string_or(rule.get("then"), "");
    if condition.is_empty() && action.is_empty() {
        return None;
    }
    Some(AdjustmentRule { condition, action })
}

/// True for exactly two ASCII digits, a colon, and two ASCII digits.
pub fn is_hhmm(value: &str) -> bool {
    let bytes = value.as_bytes();
    bytes.len() == 5
        && bytes[2] == b':'
        && [0, 1, 3, 4].iter().all(|&i| bytes[i].is_ascii_digit())
}

pub fn time_or_default(value: Option<&Value>) -> String {
    match value.and_then(Value::as_str) {
        Some(time) if is_hhmm(time) => time.to_string(),
        _ => DEFAULT_TIME.to_string(),
    }
}

pub fn rrule_or_default(value: Option<&Value>) -> String {
    match value.and_then(Value::as_str) {
        Some(rrule) if rrule.starts_with("FREQ=") => rrule.to_string(),
        _ => DEFAULT_RRULE.to_string(),
    }
}

fn frequency(value: Option<&Value>) -> u8 {
    value
        .and_then(Value::as_u64)
        .filter(|n| (1..=7).contains(n))
        .map(|n| n as u8)
        .unwrap_or(DEFAULT_FREQUENCY)
}

fn string_or(value: Option<&Value>, default: &str) -> String {
    value
        .and_then(Value::as_str)
        .unwrap_or(default)
        .to_string()
}

fn non_empty_or(value: Option<&Value>, default: &str) -> String {
    match value.and_then(Value::as_str).map(str::trim) {
        Some(text) if !text.is_empty() => text.to_string(),
        _ => default.to_string(),
    }
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn objects(value: Option<&Value>) -> impl Iterator<Item = &serde_json::Map<String, Value>> {
    value
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(Value::as_object)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn renormalize(plan: &Plan) -> Plan {
        normalize_plan(&serde_json::to_value(plan).expect("serialize plan"))
    }

    #[test]
    fn non_object_becomes_empty_plan() {
        assert_eq!(normalize_plan(&json!([1, 2, 3])), Plan::default());
        assert_eq!(normalize_plan(&json!(null)), Plan::default());
        assert_eq!(normalize_plan(&json!("plan")), Plan::default());
    }

    #[test]
    fn missing_lists_default_to_empty() {
        let plan = normalize_plan(&json!({ "summary": "hi", "pain_points": "not a list" }));
        assert_eq!(plan.summary, "hi");
        assert!(plan.pain_points.is_empty());
        assert!(plan.solutions.is_empty());
        assert!(plan.new_habits.is_empty());
        assert!(plan.reminders.is_empty());
        assert!(plan.next_adjustment_rules.is_empty());
    }

    #[test]
    fn habit_fields_are_coerced() {
        let plan = normalize_plan(&json!({
            "new_habits": [
                {
                    "name": "Lights out",
                    "difficulty": "extreme",
                    "schedule": { "days": ["Mon", "Funday", 3, "Sun"], "time": "9pm", "frequency_per_week": 12 }
                },
                { "schedule": "whenever" },
                "not a habit"
            ]
        }));

        assert_eq!(plan.new_habits.len(), 2);
        let first = &plan.new_habits[0];
        assert_eq!(first.name, "Lights out");
        assert_eq!(first.difficulty, Difficulty::Easy);
        assert_eq!(first.schedule.days, vec![Weekday::Mon, Weekday::Sun]);
        assert_eq!(first.schedule.time, "09:00");
        assert_eq!(first.schedule.frequency_per_week, 3);

        let second = &plan.new_habits[1];
        assert_eq!(second.name, DEFAULT_HABIT_NAME);
        assert_eq!(second.schedule, default_schedule());
    }

    #[test]
    fn valid_habit_is_kept_verbatim() {
        let plan = normalize_plan(&json!({
            "new_habits": [{
                "name": "Walk",
                "why": "energy",
                "difficulty": "hard",
                "schedule": { "days": ["Tue", "Thu"], "time": "18:30", "frequency_per_week": 2 }
            }]
        }));
        let habit = &plan.new_habits[0];
        assert_eq!(habit.difficulty, Difficulty::Hard);
        assert_eq!(habit.schedule.days, vec![Weekday::Tue, Weekday::Thu]);
        assert_eq!(habit.schedule.time, "18:30");
        assert_eq!(habit.schedule.frequency_per_week, 2);
    }

    #[test]
    fn empty_day_list_falls_back_to_mon_wed_fri() {
        let plan = normalize_plan(&json!({
            "new_habits": [{ "schedule": { "days": ["Someday"] } }]
        }));
        assert_eq!(plan.new_habits[0].schedule.days, DEFAULT_DAYS.to_vec());
    }

    #[test]
    fn reminder_time_and_rrule_are_defaulted() {
        let plan = normalize_plan(&json!({
            "reminders": [
                { "title": "Stretch", "time": "7:5", "rrule": "DAILY" },
                { "time": "21:30", "rrule": "FREQ=WEEKLY;BYDAY=MO" }
            ]
        }));
        assert_eq!(plan.reminders[0].title, "Stretch");
        assert_eq!(plan.reminders[0].time, "09:00");
        assert_eq!(plan.reminders[0].rrule, "FREQ=DAILY");
        assert_eq!(plan.reminders[1].title, DEFAULT_REMINDER_TITLE);
        assert_eq!(plan.reminders[1].time, "21:30");
        assert_eq!(plan.reminders[1].rrule, "FREQ=WEEKLY;BYDAY=MO");
    }

    #[test]
    fn adjustment_rules_keep_if_then_pairs() {
        let plan = normalize_plan(&json!({
            "next_adjustment_rules": [
                { "if": "rate < 50%", "then": "drop one habit" },
                { "if": 3 },
                { "then": "celebrate" }
            ]
        }));
        assert_eq!(plan.next_adjustment_rules.len(), 2);
        assert_eq!(plan.next_adjustment_rules[0].condition, "rate < 50%");
        assert_eq!(plan.next_adjustment_rules[1].condition, "");
        assert_eq!(plan.next_adjustment_rules[1].action, "celebrate");
    }

    #[test]
    fn hhmm_pattern_is_strict() {
        assert!(is_hhmm("09:00"));
        assert!(is_hhmm("23:59"));
        assert!(!is_hhmm("9:00"));
        assert!(!is_hhmm("09:000"));
        assert!(!is_hhmm("09-00"));
        assert!(!is_hhmm("ab:cd"));
        assert!(!is_hhmm("０9:00"));
    }

    #[test]
    fn normalization_is_idempotent() {
        let inputs = [
            json!({}),
            json!(null),
            json!({
                "summary": 42,
                "pain_points": ["a", 1, null],
                "new_habits": [
                    { "name": "  ", "difficulty": "MID", "schedule": { "days": [], "time": "", "frequency_per_week": -1 } },
                    { "name": "Read", "difficulty": "mid", "schedule": { "days": ["Sat"], "time": "20:00", "frequency_per_week": 7 } }
                ],
                "reminders": [{ "title": null, "time": 900, "rrule": "FREQ=WEEKLY" }, 5],
                "next_adjustment_rules": [{ "if": "", "then": "" }, { "if": "x", "then": "y" }]
            }),
        ];

        for input in inputs {
            let once = normalize_plan(&input);
            assert_eq!(renormalize(&once), once);
            for habit in &once.new_habits {
                assert!(is_hhmm(&habit.schedule.time));
                assert!(!habit.schedule.days.is_empty());
            }
            for reminder in &once.reminders {
                assert!(is_hhmm(&reminder.time));
                assert!(reminder.rrule.starts_with("FREQ="));
            }
        }
    }
}
