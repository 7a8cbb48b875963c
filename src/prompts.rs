use crate::models::{CheckInSummary, Plan, Profile};
use serde_json::{Value, json};

pub const SYSTEM_PROMPT: &str = "You are a lifestyle habit coach. Analyse the user's habits at the \
lifestyle level, without any medical diagnosis, and design a plan made of small, actionable behaviours.

Rules:
- Never diagnose, treat, or prescribe medication.
- Safety first: never recommend excessive exercise, extreme diets, or sleep deprivation.
- Respect the user's available time, preferred difficulty, and priorities; be concrete and realistic.
- Output exactly one JSON object. No code fences, explanations, or extra text.";

/// Shape of the object the model is asked to return.
pub fn schema_guide() -> Value {
    json!({
        "summary": "string",
        "pain_points": ["string"],
        "solutions": ["string"],
        "new_habits": [{
            "name": "string",
            "why": "string",
            "schedule": {
                "days": ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"],
                "time": "HH:MM",
                "frequency_per_week": 3
            },
            "difficulty": "easy|mid|hard"
        }],
        "reminders": [{ "title": "string", "time": "HH:MM", "rrule": "FREQ=DAILY|WEEKLY;..." }],
        "next_adjustment_rules": [{ "if": "string", "then": "string" }]
    })
}

pub fn plan_prompt(profile: &Profile) -> String {
    let payload = json!({
        "domain": profile.domain,
        "habit_to_improve": profile.habit_to_improve,
        "survey": profile,
        "required_json_schema": schema_guide(),
        "instruction": "Structure the user's negative habit as cause hypotheses, then strategies, \
            then an execution plan. Output solutions, new_habits, reminders and \
            next_adjustment_rules as JSON.",
        "tone": "practical coach",
        "constraints": [
            "limit new_habits to 3-5 items",
            "provide 3-5 reminders matching new_habits",
            "difficulty is one of easy/mid/hard",
            "days use Mon..Sun abbreviations",
            "times are 24-hour HH:MM",
        ],
    });
    format!(
        "Create a personalised CareFit plan from the data below. Output one JSON object only.\n\n{payload}"
    )
}

pub fn adjustment_prompt(current: &Plan, summary: &CheckInSummary, note: &str) -> String {
    let payload = json!({
        "current_plan": current,
        "checkin_summary": summary,
        "adjustment_note": note,
        "required_json_schema": schema_guide(),
        "rules": [
            "output one JSON object only",
            "when completion is low, make difficulty, frequency and time slots more realistic",
            "when completion is high, keep the plan or raise it slightly without overdoing it",
            "update reminders to match any change in new_habits",
        ],
    });
    format!(
        "Re-personalise the current plan using the information below. Output one JSON object only.\n\n{payload}"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> Profile {
        Profile {
            domain: "Sleep".into(),
            habit_to_improve: "falling asleep at 3am".into(),
            difficulty_pref: "easy".into(),
            priority: "sustainability".into(),
            available_time_windows: vec!["morning".into()],
            sleep_time: "02-04".into(),
            wake_time: "09-11".into(),
            stress_level: 6,
            schedule_consistency: "irregular".into(),
            energy_level: 4,
            commitment: 7,
            obstacles: vec!["phone".into()],
            notes: String::new(),
        }
    }

    #[test]
    fn plan_prompt_embeds_profile_and_schema() {
        let prompt = plan_prompt(&profile());
        assert!(prompt.contains("falling asleep at 3am"));
        assert!(prompt.contains("required_json_schema"));
        assert!(prompt.contains("frequency_per_week"));
    }

    #[test]
    fn adjustment_prompt_carries_note() {
        let summary = crate::stats::summarize_checkins_at(
            chrono::NaiveDate::from_ymd_opt(2026, 1, 5).expect("date"),
            &[],
            7,
        );
        let prompt = adjustment_prompt(&Plan::default(), &summary, "lower difficulty");
        assert!(prompt.contains("lower difficulty"));
        assert!(prompt.contains("current_plan"));
    }
}
