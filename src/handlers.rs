use crate::clients::creatures::{Creature, CreatureClient};
use crate::clients::movies::{MovieClient, MovieDetails};
use crate::clients::weather::{CurrentWeather, WeatherClient};
use crate::errors::AppError;
use crate::llm::{self, Generation, OpenAiBackend};
use crate::models::{
    AdjustRequest, CalendarEntry, ChartPoint, CheckIn, CheckInRequest, CheckInResponse, Degraded,
    ExcludeRequest, GenerateRequest, Plan, PlanHistoryEntry, PlanKind, PlanResponse, Profile,
    RecommendRequest, Recommendations, Reminder, SummaryResponse, WeatherQuery,
};
use crate::quiz::{pick_genres, tally};
use crate::reminders::{calendar_preview, validate_reminder};
use crate::rerank::rerank;
use crate::state::{AppState, Session};
use crate::stats::{
    SUMMARY_DAYS, auto_adjustment_note, build_7day_chart, daily_completion, summarize_checkins,
};
use crate::ui::render_index;
use axum::{
    Json,
    extract::{Path, Query, State},
    response::Html,
};
use chrono::Local;
use std::collections::HashSet;
use tracing::{info, warn};

const DEFAULT_RECOMMENDATIONS: usize = 10;

pub async fn index(State(state): State<AppState>) -> Html<String> {
    let session = state.session.lock().await;
    Html(render_index(&session, &state.config.openai_model))
}

pub async fn get_session(State(state): State<AppState>) -> Json<Session> {
    Json(state.session.lock().await.clone())
}

pub async fn reset_session(State(state): State<AppState>) -> Json<Session> {
    let mut session = state.session.lock().await;
    *session = Session::default();
    info!("session reset");
    Json(session.clone())
}

// ---------------------------------------------------------------------------
// Survey + plan
// ---------------------------------------------------------------------------

pub async fn save_profile(
    State(state): State<AppState>,
    Json(payload): Json<Profile>,
) -> Result<Json<Profile>, AppError> {
    let profile = validate_profile(payload)?;
    state.session.lock().await.profile = Some(profile.clone());
    Ok(Json(profile))
}

pub async fn generate_plan(
    State(state): State<AppState>,
    Json(payload): Json<GenerateRequest>,
) -> Result<Json<PlanResponse>, AppError> {
    let profile = state
        .session
        .lock()
        .await
        .profile
        .clone()
        .ok_or_else(|| AppError::bad_request("save the survey before generating a plan"))?;

    let backend = openai_backend(&state, payload.api_key)?;
    let model = payload.model.unwrap_or_else(|| state.config.openai_model.clone());

    let outcome = llm::generate_plan(&backend, &model, &profile).await;
    Ok(Json(apply_generation(&state, outcome, PlanKind::Generated, None).await))
}

pub async fn adjust_plan(
    State(state): State<AppState>,
    Json(payload): Json<AdjustRequest>,
) -> Result<Json<PlanResponse>, AppError> {
    let (current, checkins) = {
        let session = state.session.lock().await;
        let current = session
            .plan
            .clone()
            .ok_or_else(|| AppError::bad_request("generate a plan before adjusting it"))?;
        (current, session.checkins.clone())
    };

    let backend = openai_backend(&state, payload.api_key)?;
    let model = payload.model.unwrap_or_else(|| state.config.openai_model.clone());
    let summary = summarize_checkins(&checkins, SUMMARY_DAYS);
    let note = payload
        .note
        .map(|note| note.trim().to_string())
        .filter(|note| !note.is_empty())
        .unwrap_or_else(|| auto_adjustment_note(&summary));

    let outcome = llm::adjust_plan(&backend, &model, &current, &summary, &note).await;
    Ok(Json(
        apply_generation(&state, outcome, PlanKind::Adjusted, Some(note)).await,
    ))
}

pub async fn plan_history(State(state): State<AppState>) -> Json<Vec<PlanHistoryEntry>> {
    Json(state.session.lock().await.plan_history.clone())
}

async fn apply_generation(
    state: &AppState,
    outcome: Generation<Plan>,
    kind: PlanKind,
    note: Option<String>,
) -> PlanResponse {
    let mut session = state.session.lock().await;
    match outcome {
        Generation::Ready { value, .. } => {
            info!(?kind, habits = value.new_habits.len(), "plan installed");
            session.install_plan(value.clone(), kind);
            if let Some(note) = note {
                session.last_adjustment_note = note;
            }
            PlanResponse {
                plan: Some(value),
                error: None,
            }
        }
        Generation::Absent { diagnostic } => {
            warn!(?kind, "could not generate a plan");
            session.last_error = diagnostic.clone();
            PlanResponse {
                plan: None,
                error: Some(diagnostic),
            }
        }
    }
}

fn openai_backend(state: &AppState, request_key: Option<String>) -> Result<OpenAiBackend, AppError> {
    let key = resolve_key(request_key, state.config.openai_api_key.as_deref(), "OPENAI_API_KEY")?;
    Ok(OpenAiBackend::new(
        state.http.clone(),
        state.config.openai_base_url.clone(),
        key,
    ))
}

/// A key passed with the request wins over the configured one.
fn resolve_key(request_key: Option<String>, configured: Option<&str>, var: &str) -> Result<String, AppError> {
    request_key
        .map(|key| key.trim().to_string())
        .filter(|key| !key.is_empty())
        .or_else(|| configured.map(str::to_string))
        .ok_or_else(|| AppError::missing_credential(var))
}

fn validate_profile(mut profile: Profile) -> Result<Profile, AppError> {
    profile.habit_to_improve = profile.habit_to_improve.trim().to_string();
    profile.domain = profile.domain.trim().to_string();
    profile.notes = profile.notes.trim().to_string();
    if profile.habit_to_improve.is_empty() {
        return Err(AppError::bad_request("habit_to_improve must not be empty"));
    }
    if profile.domain.is_empty() {
        return Err(AppError::bad_request("domain must not be empty"));
    }
    profile.stress_level = profile.stress_level.clamp(1, 10);
    profile.energy_level = profile.energy_level.clamp(1, 10);
    profile.commitment = profile.commitment.clamp(1, 10);
    Ok(profile)
}

// ---------------------------------------------------------------------------
// Reminders
// ---------------------------------------------------------------------------

pub async fn list_reminders(State(state): State<AppState>) -> Json<Vec<Reminder>> {
    Json(state.session.lock().await.reminders.clone())
}

pub async fn add_reminder(
    State(state): State<AppState>,
    Json(payload): Json<Reminder>,
) -> Result<Json<Vec<Reminder>>, AppError> {
    let reminder = validate_reminder(payload)?;
    let mut session = state.session.lock().await;
    session.reminders.push(reminder);
    Ok(Json(session.reminders.clone()))
}

pub async fn update_reminder(
    State(state): State<AppState>,
    Path(index): Path<usize>,
    Json(payload): Json<Reminder>,
) -> Result<Json<Vec<Reminder>>, AppError> {
    let reminder = validate_reminder(payload)?;
    let mut session = state.session.lock().await;
    let slot = session
        .reminders
        .get_mut(index)
        .ok_or_else(|| AppError::not_found(format!("no reminder at index {index}")))?;
    *slot = reminder;
    Ok(Json(session.reminders.clone()))
}

pub async fn delete_reminder(
    State(state): State<AppState>,
    Path(index): Path<usize>,
) -> Result<Json<Vec<Reminder>>, AppError> {
    let mut session = state.session.lock().await;
    if index >= session.reminders.len() {
        return Err(AppError::not_found(format!("no reminder at index {index}")));
    }
    session.reminders.remove(index);
    Ok(Json(session.reminders.clone()))
}

pub async fn reminder_preview(State(state): State<AppState>) -> Json<Vec<CalendarEntry>> {
    Json(calendar_preview(&state.session.lock().await.reminders))
}

// ---------------------------------------------------------------------------
// Check-ins
// ---------------------------------------------------------------------------

pub async fn record_checkin(
    State(state): State<AppState>,
    Json(payload): Json<CheckInRequest>,
) -> Result<Json<CheckInResponse>, AppError> {
    let mut session = state.session.lock().await;
    let has_habits = session
        .plan
        .as_ref()
        .is_some_and(|plan| !plan.new_habits.is_empty());
    if !has_habits {
        return Err(AppError::bad_request(
            "the current plan has no habits to check in against",
        ));
    }
    if payload.items.is_empty() {
        return Err(AppError::bad_request("a check-in needs at least one item"));
    }

    let checkin = CheckIn {
        date: Local::now().format("%Y-%m-%dT%H:%M:%S").to_string(),
        mood: payload.mood.map(|mood| mood.clamp(1, 10)),
        items: payload.items,
    };
    let completion = daily_completion(&checkin);
    info!(done = completion.done, total = completion.total, "check-in recorded");
    session.checkins.push(checkin.clone());

    Ok(Json(CheckInResponse {
        checkin,
        completion,
    }))
}

pub async fn list_checkins(State(state): State<AppState>) -> Json<Vec<CheckIn>> {
    Json(state.session.lock().await.checkins.clone())
}

pub async fn checkin_summary(State(state): State<AppState>) -> Json<SummaryResponse> {
    let session = state.session.lock().await;
    let summary = summarize_checkins(&session.checkins, SUMMARY_DAYS);
    let adjustment_note = auto_adjustment_note(&summary);
    Json(SummaryResponse {
        summary,
        adjustment_note,
    })
}

pub async fn checkin_chart(State(state): State<AppState>) -> Json<Vec<ChartPoint>> {
    Json(build_7day_chart(&state.session.lock().await.checkins))
}

// ---------------------------------------------------------------------------
// Catalog features
// ---------------------------------------------------------------------------

pub async fn recommend_movies(
    State(state): State<AppState>,
    Json(payload): Json<RecommendRequest>,
) -> Result<Json<Degraded<Recommendations>>, AppError> {
    let key = resolve_key(None, state.config.tmdb_api_key.as_deref(), "TMDB_API_KEY")?;
    let scores = tally(&payload.answers);
    let genres = pick_genres(&scores);
    if genres.is_empty() {
        return Err(AppError::bad_request("answer at least one quiz question"));
    }

    let excluded: HashSet<u64> = state
        .session
        .lock()
        .await
        .excluded_movies
        .iter()
        .copied()
        .collect();

    let client = MovieClient::new(state.http.clone(), state.config.tmdb_base_url.clone(), key);
    let genre_ids: Vec<u32> = genres.iter().map(|genre| genre.catalog_id()).collect();
    let page = match client
        .discover_by_genres(&genre_ids, payload.page.unwrap_or(1))
        .await
    {
        Ok(page) => page,
        Err(err) => {
            warn!("movie discovery failed: {err}");
            return Ok(Json(Degraded::warn(format!(
                "could not load movies: {err}"
            ))));
        }
    };

    let mut movies = rerank(
        page.results,
        &genre_ids,
        &excluded,
        payload.weights,
        Local::now().date_naive(),
    );
    movies.truncate(payload.limit.unwrap_or(DEFAULT_RECOMMENDATIONS));

    Ok(Json(Degraded::ok(Recommendations {
        scores,
        genres,
        movies,
    })))
}

pub async fn movie_details(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<Degraded<MovieDetails>>, AppError> {
    let key = resolve_key(None, state.config.tmdb_api_key.as_deref(), "TMDB_API_KEY")?;
    let client = MovieClient::new(state.http.clone(), state.config.tmdb_base_url.clone(), key);
    Ok(Json(match client.details(id).await {
        Ok(details) => Degraded::ok(details),
        Err(err) => {
            warn!(id, "movie details failed: {err}");
            Degraded::warn(format!("could not load movie {id}: {err}"))
        }
    }))
}

pub async fn exclude_movie(
    State(state): State<AppState>,
    Json(payload): Json<ExcludeRequest>,
) -> Json<Vec<u64>> {
    let mut session = state.session.lock().await;
    session.excluded_movies.insert(payload.id);
    Json(session.excluded_movies.iter().copied().collect())
}

pub async fn weather(
    State(state): State<AppState>,
    Query(query): Query<WeatherQuery>,
) -> Result<Json<Degraded<CurrentWeather>>, AppError> {
    let city = query.city.trim();
    if city.is_empty() {
        return Err(AppError::bad_request("city must not be empty"));
    }
    let key = resolve_key(
        None,
        state.config.openweather_api_key.as_deref(),
        "OPENWEATHER_API_KEY",
    )?;
    let client = WeatherClient::new(
        state.http.clone(),
        state.config.openweather_base_url.clone(),
        key,
    );
    Ok(Json(match client.current(city).await {
        Ok(current) => Degraded::ok(current),
        Err(err) => {
            warn!(city, "weather lookup failed: {err}");
            Degraded::warn(format!("weather unavailable for {city}: {err}"))
        }
    }))
}

pub async fn creature(
    State(state): State<AppState>,
    Path(id): Path<u32>,
) -> Json<Degraded<Creature>> {
    let client = CreatureClient::new(state.http.clone(), state.config.pokeapi_base_url.clone());
    Json(match client.by_id(id).await {
        Ok(creature) => Degraded::ok(creature),
        Err(err) => {
            warn!(id, "creature lookup failed: {err}");
            Degraded::warn(format!("creature {id} unavailable: {err}"))
        }
    })
}
