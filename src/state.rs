use crate::config::Config;
use crate::models::{CheckIn, Plan, PlanHistoryEntry, PlanKind, Profile, Reminder};
use chrono::Local;
use serde::Serialize;
use std::{collections::BTreeSet, sync::Arc};
use tokio::sync::Mutex;

/// Everything one interactive session accumulates. Nothing here outlives
/// the process; a reset swaps in a fresh value.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Session {
    pub profile: Option<Profile>,
    pub plan: Option<Plan>,
    pub plan_history: Vec<PlanHistoryEntry>,
    pub reminders: Vec<Reminder>,
    pub checkins: Vec<CheckIn>,
    pub last_adjustment_note: String,
    pub last_error: String,
    pub excluded_movies: BTreeSet<u64>,
}

impl Session {
    /// Makes `plan` current, records it in the history and seeds the
    /// editable reminder list from it.
    pub fn install_plan(&mut self, plan: Plan, kind: PlanKind) {
        self.plan_history.push(PlanHistoryEntry {
            created_at: Local::now().format("%Y-%m-%dT%H:%M:%S").to_string(),
            kind,
            plan: plan.clone(),
        });
        self.reminders = plan.reminders.clone();
        self.plan = Some(plan);
        self.last_error.clear();
    }
}

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub http: reqwest::Client,
    pub session: Arc<Mutex<Session>>,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .build()?;
        Ok(Self {
            config: Arc::new(config),
            http,
            session: Arc::new(Mutex::new(Session::default())),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Reminder;

    fn plan_with_reminder(title: &str) -> Plan {
        Plan {
            summary: title.into(),
            reminders: vec![Reminder {
                title: title.into(),
                time: "08:00".into(),
                rrule: "FREQ=DAILY".into(),
            }],
            ..Plan::default()
        }
    }

    #[test]
    fn install_plan_appends_history_and_copies_reminders() {
        let mut session = Session {
            last_error: "previous failure".into(),
            ..Session::default()
        };
        session.install_plan(plan_with_reminder("first"), PlanKind::Generated);
        session.reminders.clear();
        session.install_plan(plan_with_reminder("second"), PlanKind::Adjusted);

        assert_eq!(session.plan_history.len(), 2);
        assert_eq!(session.plan_history[0].plan.summary, "first");
        assert_eq!(session.plan_history[1].kind, PlanKind::Adjusted);
        assert_eq!(session.plan.as_ref().map(|plan| plan.summary.as_str()), Some("second"));
        assert_eq!(session.reminders[0].title, "second");
        assert!(session.last_error.is_empty());
    }
}
