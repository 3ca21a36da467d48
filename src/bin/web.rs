//! Single binary web server: REST API over the in-memory bracket store.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default.
//! Override with env: HOST, PORT, INACTIVITY_HOURS, EVENT_CAPACITY.

use actix_web::{
    delete, get, post, put,
    web::{Data, Json, Path},
    App, HttpResponse, HttpServer, Responder,
};
use chrono::NaiveDate;
use knockout_bracket_web::{
    export_matches_csv, export_tournament_json, round_name, Bracket, BracketEngine, BracketError,
    BroadcastNotifier, MatchPreview, MatchScore, MatchStore, MemoryStore, SeedingPolicy, Tournament,
    TournamentId,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use uuid::Uuid;

type Engine = BracketEngine<MemoryStore, BroadcastNotifier>;

type AppState = Data<Engine>;

/// Settings read from the environment at startup.
struct ServerConfig {
    host: String,
    port: u16,
    /// Tournaments not accessed for this long are removed.
    inactivity_timeout: Duration,
    event_capacity: usize,
}

impl ServerConfig {
    fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env_parse("PORT").unwrap_or(8080);
        let inactivity_hours: u64 = env_parse("INACTIVITY_HOURS").unwrap_or(12);
        let event_capacity = env_parse("EVENT_CAPACITY").unwrap_or(64);
        Self {
            host,
            port,
            inactivity_timeout: Duration::from_secs(inactivity_hours * 3600),
            event_capacity,
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

#[derive(Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

#[derive(Deserialize)]
struct CreateTournamentBody {
    name: String,
    #[serde(default = "default_team_count")]
    team_count: usize,
    #[serde(default)]
    location: String,
    #[serde(default)]
    date: Option<NaiveDate>,
}

fn default_team_count() -> usize {
    8
}

#[derive(Deserialize)]
struct AddTeamBody {
    name: String,
}

#[derive(Deserialize)]
struct GenerateBracketBody {
    #[serde(default)]
    seeding: SeedingPolicy,
}

#[derive(Deserialize)]
struct SelectWinnerBody {
    winner_id: Uuid,
    #[serde(default)]
    score_a: Option<u32>,
    #[serde(default)]
    score_b: Option<u32>,
}

/// Path segment: tournament id (e.g. /api/tournaments/{id})
#[derive(Deserialize)]
struct TournamentPath {
    id: TournamentId,
}

/// Path segments: tournament id and team id
#[derive(Deserialize)]
struct TournamentTeamPath {
    id: TournamentId,
    team_id: Uuid,
}

/// Path segments: tournament id and match id
#[derive(Deserialize)]
struct TournamentMatchPath {
    id: TournamentId,
    match_id: Uuid,
}

/// Bracket plus display helpers for the tie sheet page.
#[derive(Serialize)]
struct BracketResponse {
    #[serde(flatten)]
    bracket: Bracket,
    progress: u8,
    round_names: Vec<String>,
    projected_rounds: Vec<Vec<MatchPreview>>,
}

impl From<Bracket> for BracketResponse {
    fn from(bracket: Bracket) -> Self {
        Self {
            progress: bracket.progress(),
            round_names: (1..=bracket.total_rounds)
                .map(|r| round_name(r, bracket.total_rounds))
                .collect(),
            projected_rounds: bracket.projected_rounds(),
            bracket,
        }
    }
}

fn error_response(e: &BracketError) -> HttpResponse {
    let body = serde_json::json!({ "error": e.to_string() });
    match e {
        BracketError::TournamentNotFound(_) | BracketError::TeamNotFound(_) => {
            HttpResponse::NotFound().json(body)
        }
        BracketError::BracketInProgress
        | BracketError::DuplicateTeamName
        | BracketError::TournamentFull { .. }
        | BracketError::ConcurrentAdvanceConflict { .. } => HttpResponse::Conflict().json(body),
        BracketError::Storage(_) => HttpResponse::InternalServerError().json(body),
        _ => HttpResponse::BadRequest().json(body),
    }
}

fn json_or_error<T: Serialize>(result: Result<T, BracketError>) -> HttpResponse {
    match result {
        Ok(v) => HttpResponse::Ok().json(v),
        Err(e) => error_response(&e),
    }
}

fn file_stem(tournament: &Tournament) -> String {
    tournament.name.split_whitespace().collect::<Vec<_>>().join("_")
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "knockout-bracket-web",
    })
}

/// Create a new tournament (returns it with id).
#[post("/api/tournaments")]
async fn api_create_tournament(state: AppState, body: Json<CreateTournamentBody>) -> HttpResponse {
    let body = body.into_inner();
    let result = Tournament::new(body.name, body.team_count)
        .map(|t| t.with_location(body.location.trim()).with_date(body.date))
        .and_then(|t| state.store().create_tournament(t));
    match result {
        Ok(t) => {
            log::info!("Created tournament {} ({})", t.name, t.id);
            HttpResponse::Created().json(t)
        }
        Err(e) => error_response(&e),
    }
}

#[get("/api/tournaments")]
async fn api_list_tournaments(state: AppState) -> HttpResponse {
    json_or_error(state.store().list_tournaments())
}

/// Get a tournament with its teams (404 if not found).
#[get("/api/tournaments/{id}")]
async fn api_get_tournament(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    json_or_error(state.store().roster(path.id))
}

#[delete("/api/tournaments/{id}")]
async fn api_delete_tournament(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    match state.delete_tournament(path.id) {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({ "id": path.id })),
        Err(e) => error_response(&e),
    }
}

/// Register a team (only before the bracket exists).
#[post("/api/tournaments/{id}/teams")]
async fn api_add_team(state: AppState, path: Path<TournamentPath>, body: Json<AddTeamBody>) -> HttpResponse {
    match state.store().add_team(path.id, body.name.trim()) {
        Ok(team) => HttpResponse::Created().json(team),
        Err(e) => error_response(&e),
    }
}

#[get("/api/tournaments/{id}/teams")]
async fn api_list_teams(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    json_or_error(state.store().load_participants(path.id))
}

/// Remove a team by id (only before the bracket exists).
#[delete("/api/tournaments/{id}/teams/{team_id}")]
async fn api_remove_team(state: AppState, path: Path<TournamentTeamPath>) -> HttpResponse {
    json_or_error(
        state
            .store()
            .remove_team(path.id, path.team_id)
            .and_then(|()| state.store().roster(path.id)),
    )
}

/// Generate the tie sheet: round 1 from the registered teams, replacing any previous bracket.
#[post("/api/tournaments/{id}/bracket")]
async fn api_generate_bracket(
    state: AppState,
    path: Path<TournamentPath>,
    body: Option<Json<GenerateBracketBody>>,
) -> HttpResponse {
    let seeding = body.map(|b| b.seeding).unwrap_or_default();
    json_or_error(
        state
            .generate_bracket(path.id, seeding)
            .and_then(|_| state.bracket(path.id))
            .map(BracketResponse::from),
    )
}

#[get("/api/tournaments/{id}/bracket")]
async fn api_get_bracket(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    json_or_error(state.bracket(path.id).map(BracketResponse::from))
}

/// Reset the tie sheet: delete all matches.
#[delete("/api/tournaments/{id}/bracket")]
async fn api_reset_bracket(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    match state.reset_bracket(path.id) {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({ "message": "Tie sheet reset" })),
        Err(e) => error_response(&e),
    }
}

/// Create a next round that is due (retry path after a failed winner selection).
#[post("/api/tournaments/{id}/bracket/advance")]
async fn api_advance_bracket(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    json_or_error(state.advance(path.id))
}

/// All matches, ordered by round then position.
#[get("/api/tournaments/{id}/matches")]
async fn api_list_matches(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    json_or_error(state.store().load_matches(path.id))
}

/// Select the winner of a scheduled match, optionally with the final score.
#[put("/api/tournaments/{id}/matches/{match_id}/winner")]
async fn api_select_winner(
    state: AppState,
    path: Path<TournamentMatchPath>,
    body: Json<SelectWinnerBody>,
) -> HttpResponse {
    let score = match (body.score_a, body.score_b) {
        (Some(a), Some(b)) => Some(MatchScore::new(a, b)),
        (None, None) => None,
        _ => {
            return HttpResponse::BadRequest()
                .json(serde_json::json!({ "error": "score_a and score_b must be given together" }));
        }
    };
    json_or_error(state.select_winner_with_score(path.id, path.match_id, body.winner_id, score))
}

#[get("/api/tournaments/{id}/export/matches.csv")]
async fn api_export_csv(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    let result = state.store().load_tournament(path.id).and_then(|t| {
        let bracket = state.bracket(path.id)?;
        export_matches_csv(&t, &bracket).map(|csv| (t, csv))
    });
    match result {
        Ok((t, csv)) => HttpResponse::Ok()
            .content_type("text/csv; charset=utf-8")
            .insert_header((
                "Content-Disposition",
                format!("attachment; filename=\"{}_matches.csv\"", file_stem(&t)),
            ))
            .body(csv),
        Err(e) => error_response(&e),
    }
}

#[get("/api/tournaments/{id}/export/tournament.json")]
async fn api_export_json(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    let result = state.store().roster(path.id).and_then(|roster| {
        let bracket = state.bracket(path.id)?;
        export_tournament_json(&roster.tournament, &roster.teams, &bracket)
            .map(|json| (roster.tournament, json))
    });
    match result {
        Ok((t, json)) => HttpResponse::Ok()
            .content_type("application/json")
            .insert_header((
                "Content-Disposition",
                format!("attachment; filename=\"{}_data.json\"", file_stem(&t)),
            ))
            .body(json),
        Err(e) => error_response(&e),
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = ServerConfig::from_env();
    let bind = (config.host.as_str(), config.port);
    log::info!("Starting server at http://{}:{}", bind.0, bind.1);

    let notifier = BroadcastNotifier::new(config.event_capacity);
    let mut events = notifier.subscribe();
    let state = Data::new(BracketEngine::with_notifier(MemoryStore::new(), notifier));

    // Match change feed: stand-in subscriber for real-time clients.
    actix_web::rt::spawn(async move {
        loop {
            match events.recv().await {
                Ok(m) => log::debug!(
                    "Match {} round {} position {} is {}",
                    m.id,
                    m.round,
                    m.position,
                    m.status.as_str()
                ),
                Err(RecvError::Lagged(skipped)) => {
                    log::warn!("Match feed lagged, skipped {} updates", skipped)
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    // Background task: every 30 minutes, remove tournaments inactive past the timeout
    let state_cleanup = state.clone();
    let inactivity_timeout = config.inactivity_timeout;
    actix_web::rt::spawn(async move {
        let mut interval = actix_web::rt::time::interval(Duration::from_secs(30 * 60));
        loop {
            interval.tick().await;
            match state_cleanup.remove_inactive(inactivity_timeout) {
                Ok(removed) if removed.is_empty() => {}
                Ok(removed) => log::info!(
                    "Cleaned up {} inactive tournament(s) (no activity for {:?})",
                    removed.len(),
                    inactivity_timeout
                ),
                Err(e) => log::error!("Cleanup failed: {}", e),
            }
        }
    });

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .service(api_health)
            .service(api_create_tournament)
            .service(api_list_tournaments)
            .service(api_get_tournament)
            .service(api_delete_tournament)
            .service(api_add_team)
            .service(api_list_teams)
            .service(api_remove_team)
            .service(api_generate_bracket)
            .service(api_get_bracket)
            .service(api_reset_bracket)
            .service(api_advance_bracket)
            .service(api_list_matches)
            .service(api_select_winner)
            .service(api_export_csv)
            .service(api_export_json)
    })
    .bind(bind)?
    .run()
    .await
}
