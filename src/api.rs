//! Superficie JSON de la pasarela bajo `/api`.
//!
//! Los handlers son deliberadamente finos: decodifican la entrada, llaman al
//! wrapper del backend que toca, normalizan la forma del resultado y traducen
//! los fallos a la respuesta HTTP de la pasarela.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use futures::{join, try_join};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{error, info, warn};

use crate::{
    app_state::AppState,
    backend::BackendError,
    demo,
    models::{
        ActivityFeedbackView, AiQuestion, BikePayload, ElectricVehiclePayload, FeedbackPayload,
        FeedbackQuery, FeedbackUpdate, FeedbackView, GuidePayload, GuideView, ItineraryParams,
        ItineraryView, NlpQuestion, PublicTransportPayload, QueryResponse, TouristPayload,
        TouristView, TransportUpdate, TransportView, TripRequest,
    },
    normalize::{extract_keyed_rows, normalize_record, normalize_response},
};

/// Error HTTP de la pasarela: código más cuerpo `{"error": ...}`.
type ApiError = (StatusCode, Json<Value>);

const DEFAULT_LIST_LIMIT: u32 = 100;
const TOP_ECO_LIMIT: u32 = 10;

// --- Parámetros de consulta ---

#[derive(Deserialize)]
struct LimitParams {
    limit: Option<u32>,
}

#[derive(Deserialize)]
struct GuideListParams {
    language: Option<String>,
    limit: Option<u32>,
}

#[derive(Deserialize)]
struct AnalyzeParams {
    question: String,
}

#[derive(Deserialize)]
struct SeasonActivityParams {
    season_id: Option<String>,
    limit: Option<u32>,
}

#[derive(Deserialize)]
struct TransportListParams {
    #[serde(rename = "type")]
    kind: Option<String>,
}

// --- Router ---

pub fn create_router(app_state: AppState) -> Router {
    Router::new()
        // Consulta de IA y NLP
        .route("/api/query", post(ai_query_handler))
        .route("/api/ai/test", get(ai_test_handler))
        .route("/api/nlp/query", post(nlp_query_handler))
        .route("/api/nlp/analyze", get(nlp_analyze_handler))
        .route("/api/nlp/examples", get(nlp_examples_handler))
        // Analítica
        .route("/api/analytics/carbon-stats", get(carbon_stats_handler))
        .route("/api/analytics/by-region", get(region_stats_handler))
        .route("/api/analytics/top-eco", get(top_eco_handler))
        .route("/api/analytics/activity-types", get(activity_types_handler))
        .route(
            "/api/analytics/accommodations-stats",
            get(accommodation_stats_handler),
        )
        .route("/api/analytics/difficulty", get(difficulty_handler))
        .route("/api/analytics/dashboard", get(dashboard_handler))
        // Valoraciones
        .route(
            "/api/feedback",
            get(list_feedback_handler).post(create_feedback_handler),
        )
        .route("/api/feedback/activity/*uri", get(activity_feedback_handler))
        .route(
            "/api/feedback/:id",
            get(get_feedback_handler)
                .put(update_feedback_handler)
                .delete(delete_feedback_handler),
        )
        // Turistas y guías
        .route(
            "/api/tourists",
            get(list_tourists_handler).post(create_tourist_handler),
        )
        .route(
            "/api/tourists/:id",
            get(get_tourist_handler)
                .put(update_tourist_handler)
                .delete(delete_tourist_handler),
        )
        .route(
            "/api/guides",
            get(list_guides_handler).post(create_guide_handler),
        )
        .route(
            "/api/guides/:id",
            get(get_guide_handler)
                .put(update_guide_handler)
                .delete(delete_guide_handler),
        )
        // Temporadas
        .route(
            "/api/seasons",
            get(list_seasons_handler).post(create_season_handler),
        )
        .route("/api/seasons/stats/peak-seasons", get(peak_seasons_handler))
        .route("/api/seasons/stats/warmest", get(warmest_seasons_handler))
        .route(
            "/api/seasons/current/activities",
            get(season_activities_handler),
        )
        .route(
            "/api/seasons/:id",
            get(get_season_handler)
                .put(update_season_handler)
                .delete(delete_season_handler),
        )
        // Indicadores de sostenibilidad
        .route(
            "/api/indicators",
            get(list_indicators_handler).post(create_indicator_handler),
        )
        .route(
            "/api/indicators/stats/carbon-leaders",
            get(carbon_leaders_handler),
        )
        .route(
            "/api/indicators/stats/renewable-leaders",
            get(renewable_leaders_handler),
        )
        .route(
            "/api/indicators/stats/water-efficient",
            get(water_efficient_handler),
        )
        .route(
            "/api/indicators/:id",
            get(get_indicator_handler)
                .put(update_indicator_handler)
                .delete(delete_indicator_handler),
        )
        // Transportes
        .route("/api/transports", get(list_transports_handler))
        .route("/api/transports/bike", post(create_bike_handler))
        .route(
            "/api/transports/electric-vehicle",
            post(create_electric_vehicle_handler),
        )
        .route(
            "/api/transports/public-transport",
            post(create_public_transport_handler),
        )
        .route(
            "/api/transports/search/:term",
            get(search_transports_handler),
        )
        .route(
            "/api/transports/filter/zero-emission",
            get(zero_emission_handler),
        )
        .route(
            "/api/transports/stats/cheapest",
            get(cheapest_transports_handler),
        )
        .route(
            "/api/transports/stats/fastest",
            get(fastest_transports_handler),
        )
        .route("/api/transports/stats/eco-score", get(eco_score_handler))
        .route(
            "/api/transports/:id",
            get(get_transport_handler)
                .put(update_transport_handler)
                .delete(delete_transport_handler),
        )
        // Itinerarios y optimizador de carbono
        .route("/api/itineraries/generate", post(generate_itinerary_handler))
        .route("/api/carbon/optimize-trip", post(optimize_trip_handler))
        // Utilidades
        .route("/api/health", get(health_handler))
        .route("/api/shutdown", post(shutdown_handler))
        .with_state(app_state)
}

// --- Handlers: consulta de IA y NLP ---

#[axum::debug_handler]
async fn ai_query_handler(
    State(state): State<AppState>,
    Json(payload): Json<AiQuestion>,
) -> Result<Json<QueryResponse>, ApiError> {
    let body = state
        .backend
        .ai_query(&payload)
        .await
        .map_err(|e| backend_failure("Error en la consulta de IA", e))?;
    Ok(Json(normalize_response(Some(&payload.question), &body)))
}

#[axum::debug_handler]
async fn ai_test_handler(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let body = state
        .backend
        .ai_test()
        .await
        .map_err(|e| backend_failure("Error en la prueba del servicio de IA", e))?;
    Ok(Json(body))
}

#[axum::debug_handler]
async fn nlp_query_handler(
    State(state): State<AppState>,
    Json(payload): Json<NlpQuestion>,
) -> Result<Json<Value>, ApiError> {
    let body = state
        .backend
        .nlp_query(&payload)
        .await
        .map_err(|e| backend_failure("Error en la consulta NLP", e))?;

    // La respuesta NLP lleva metadatos propios (tipo de consulta detectado,
    // filtros, entidades, confianza, SPARQL generado) que se conservan.
    let normalized = normalize_response(Some(&payload.question), &body);
    let mut response = serde_json::to_value(&normalized)
        .unwrap_or_else(|_| json!({"results": [], "count": 0}));
    for key in [
        "question",
        "query_type",
        "filters",
        "entities",
        "confidence",
        "sparql_query",
    ] {
        if let Some(extra) = body.get(key) {
            response[key] = extra.clone();
        }
    }
    Ok(Json(response))
}

#[axum::debug_handler]
async fn nlp_analyze_handler(
    State(state): State<AppState>,
    Query(params): Query<AnalyzeParams>,
) -> Result<Json<Value>, ApiError> {
    let body = state
        .backend
        .nlp_analyze(&params.question)
        .await
        .map_err(|e| backend_failure("Error al analizar la pregunta", e))?;
    Ok(Json(body))
}

#[axum::debug_handler]
async fn nlp_examples_handler(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let body = state
        .backend
        .nlp_examples()
        .await
        .map_err(|e| backend_failure("Error al recuperar los ejemplos NLP", e))?;
    Ok(Json(body))
}

// --- Handlers: analítica ---

#[axum::debug_handler]
async fn carbon_stats_handler(
    State(state): State<AppState>,
) -> Result<Json<QueryResponse>, ApiError> {
    let outcome = state.backend.carbon_stats().await;
    analytics_slice(
        state.config.demo_mode,
        "Error al cargar las estadísticas de carbono",
        outcome,
        "carbon_statistics",
        Some(demo::carbon_stats),
    )
    .map(Json)
}

#[axum::debug_handler]
async fn region_stats_handler(
    State(state): State<AppState>,
) -> Result<Json<QueryResponse>, ApiError> {
    let outcome = state.backend.region_stats().await;
    analytics_slice(
        state.config.demo_mode,
        "Error al cargar las estadísticas por región",
        outcome,
        "regions",
        Some(demo::region_stats),
    )
    .map(Json)
}

#[axum::debug_handler]
async fn top_eco_handler(
    State(state): State<AppState>,
    Query(params): Query<LimitParams>,
) -> Result<Json<QueryResponse>, ApiError> {
    let outcome = state
        .backend
        .top_eco_activities(params.limit.unwrap_or(TOP_ECO_LIMIT))
        .await;
    analytics_slice(
        state.config.demo_mode,
        "Error al cargar el ranking de actividades ecológicas",
        outcome,
        "top_activities",
        Some(demo::top_eco_activities),
    )
    .map(Json)
}

#[axum::debug_handler]
async fn activity_types_handler(
    State(state): State<AppState>,
) -> Result<Json<QueryResponse>, ApiError> {
    let outcome = state.backend.activity_types().await;
    analytics_slice(
        state.config.demo_mode,
        "Error al cargar los tipos de actividad",
        outcome,
        "activity_types",
        Some(demo::activity_types),
    )
    .map(Json)
}

#[axum::debug_handler]
async fn accommodation_stats_handler(
    State(state): State<AppState>,
) -> Result<Json<QueryResponse>, ApiError> {
    let outcome = state.backend.accommodation_stats().await;
    // Los alojamientos no tienen dataset de demostración.
    analytics_slice(
        state.config.demo_mode,
        "Error al cargar las estadísticas de alojamiento",
        outcome,
        "accommodations",
        None,
    )
    .map(Json)
}

#[axum::debug_handler]
async fn difficulty_handler(
    State(state): State<AppState>,
) -> Result<Json<QueryResponse>, ApiError> {
    let outcome = state.backend.difficulty_distribution().await;
    analytics_slice(
        state.config.demo_mode,
        "Error al cargar la distribución por dificultad",
        outcome,
        "by_difficulty",
        Some(demo::difficulty_distribution),
    )
    .map(Json)
}

/// Panel combinado: lanza las seis consultas de analítica en paralelo y monta
/// la respuesta con una rebanada por gráfico.
#[axum::debug_handler]
async fn dashboard_handler(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let backend = &state.backend;

    let dashboard = if state.config.demo_mode {
        // En demo cada rebanada se resuelve por su cuenta: las que fallen o
        // vengan vacías se cubren con su dataset.
        let (carbon, regions, eco, types, accommodations, difficulty) = join!(
            backend.carbon_stats(),
            backend.region_stats(),
            backend.top_eco_activities(TOP_ECO_LIMIT),
            backend.activity_types(),
            backend.accommodation_stats(),
            backend.difficulty_distribution(),
        );
        let demo_mode = true;
        json!({
            "carbon": analytics_slice(demo_mode, "Panel: carbono", carbon, "carbon_statistics", Some(demo::carbon_stats))?,
            "regions": analytics_slice(demo_mode, "Panel: regiones", regions, "regions", Some(demo::region_stats))?,
            "top_eco": analytics_slice(demo_mode, "Panel: ranking ecológico", eco, "top_activities", Some(demo::top_eco_activities))?,
            "activity_types": analytics_slice(demo_mode, "Panel: tipos de actividad", types, "activity_types", Some(demo::activity_types))?,
            // Sin dataset de demostración: un fallo degrada a rebanada vacía.
            "accommodations": analytics_slice(demo_mode, "Panel: alojamientos", accommodations, "accommodations", None)
                .unwrap_or_else(|_| QueryResponse::from_rows(None, Vec::new())),
            "difficulty": analytics_slice(demo_mode, "Panel: dificultad", difficulty, "by_difficulty", Some(demo::difficulty_distribution))?,
        })
    } else {
        let (carbon, regions, eco, types, accommodations, difficulty) = try_join!(
            backend.carbon_stats(),
            backend.region_stats(),
            backend.top_eco_activities(TOP_ECO_LIMIT),
            backend.activity_types(),
            backend.accommodation_stats(),
            backend.difficulty_distribution(),
        )
        .map_err(|e| backend_failure("Error componiendo el panel de analítica", e))?;
        json!({
            "carbon": rows_response(&carbon, "carbon_statistics"),
            "regions": rows_response(&regions, "regions"),
            "top_eco": rows_response(&eco, "top_activities"),
            "activity_types": rows_response(&types, "activity_types"),
            "accommodations": rows_response(&accommodations, "accommodations"),
            "difficulty": rows_response(&difficulty, "by_difficulty"),
        })
    };

    Ok(Json(json!({
        "dashboard": dashboard,
        "timestamp": Utc::now().to_rfc3339(),
    })))
}

// --- Handlers: valoraciones ---

#[axum::debug_handler]
async fn list_feedback_handler(
    State(state): State<AppState>,
    Query(filters): Query<FeedbackQuery>,
) -> Result<Json<Value>, ApiError> {
    let body = state
        .backend
        .list_feedback(&filters)
        .await
        .map_err(|e| backend_failure("Error al listar las valoraciones", e))?;
    Ok(Json(feedback_list_response(&filters, &body)))
}

#[axum::debug_handler]
async fn get_feedback_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<FeedbackView>, ApiError> {
    let body = state
        .backend
        .get_feedback(&id)
        .await
        .map_err(|e| backend_failure("Error al recuperar la valoración", e))?;
    Ok(Json(FeedbackView::from_value(&normalize_record(body))))
}

#[axum::debug_handler]
async fn activity_feedback_handler(
    State(state): State<AppState>,
    Path(uri): Path<String>,
) -> Result<Json<ActivityFeedbackView>, ApiError> {
    let body = state
        .backend
        .activity_feedback(&uri)
        .await
        .map_err(|e| backend_failure("Error al recuperar las valoraciones de la actividad", e))?;
    Ok(Json(ActivityFeedbackView::from_value(&body)))
}

#[axum::debug_handler]
async fn create_feedback_handler(
    State(state): State<AppState>,
    Json(input): Json<Value>,
) -> Result<Json<FeedbackView>, ApiError> {
    let payload = FeedbackPayload::from_input(&input);
    let body = state
        .backend
        .create_feedback(&payload)
        .await
        .map_err(|e| backend_failure("Error al crear la valoración", e))?;
    Ok(Json(FeedbackView::from_value(&normalize_record(body))))
}

#[axum::debug_handler]
async fn update_feedback_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<Value>,
) -> Result<Json<FeedbackView>, ApiError> {
    let update = FeedbackUpdate::from_input(&input);
    let body = state
        .backend
        .update_feedback(&id, &update)
        .await
        .map_err(|e| backend_failure("Error al actualizar la valoración", e))?;
    Ok(Json(FeedbackView::from_value(&normalize_record(body))))
}

#[axum::debug_handler]
async fn delete_feedback_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let body = state
        .backend
        .delete_feedback(&id)
        .await
        .map_err(|e| backend_failure("Error al eliminar la valoración", e))?;
    Ok(Json(body))
}

// --- Handlers: turistas ---

#[axum::debug_handler]
async fn list_tourists_handler(
    State(state): State<AppState>,
    Query(params): Query<LimitParams>,
) -> Result<Json<Value>, ApiError> {
    let body = state
        .backend
        .list_tourists(params.limit.unwrap_or(DEFAULT_LIST_LIMIT))
        .await
        .map_err(|e| backend_failure("Error al listar los turistas", e))?;
    let tourists: Vec<TouristView> = normalized_rows(&body, "tourists")
        .iter()
        .map(TouristView::from_value)
        .collect();
    let count = tourists.len();
    Ok(Json(json!({"tourists": tourists, "count": count})))
}

#[axum::debug_handler]
async fn get_tourist_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<TouristView>, ApiError> {
    let body = state
        .backend
        .get_tourist(&id)
        .await
        .map_err(|e| backend_failure("Error al recuperar el turista", e))?;
    let raw = body.get("tourist").cloned().unwrap_or(body);
    Ok(Json(TouristView::from_value(&normalize_record(raw))))
}

#[axum::debug_handler]
async fn create_tourist_handler(
    State(state): State<AppState>,
    Json(input): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    let payload = TouristPayload::from_input(&input);
    let body = state
        .backend
        .create_tourist(&payload)
        .await
        .map_err(|e| backend_failure("Error al crear el turista", e))?;
    Ok(Json(body))
}

#[axum::debug_handler]
async fn update_tourist_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    let update = TouristPayload::from_input(&input).update_body();
    let body = state
        .backend
        .update_tourist(&id, &update)
        .await
        .map_err(|e| backend_failure("Error al actualizar el turista", e))?;
    Ok(Json(body))
}

#[axum::debug_handler]
async fn delete_tourist_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let body = state
        .backend
        .delete_tourist(&id)
        .await
        .map_err(|e| backend_failure("Error al eliminar el turista", e))?;
    Ok(Json(body))
}

// --- Handlers: guías ---

#[axum::debug_handler]
async fn list_guides_handler(
    State(state): State<AppState>,
    Query(params): Query<GuideListParams>,
) -> Result<Json<Value>, ApiError> {
    let body = state
        .backend
        .list_guides(
            params.language.as_deref(),
            params.limit.unwrap_or(DEFAULT_LIST_LIMIT),
        )
        .await
        .map_err(|e| backend_failure("Error al listar los guías", e))?;
    let guides: Vec<GuideView> = normalized_rows(&body, "guides")
        .iter()
        .map(GuideView::from_value)
        .collect();
    let count = guides.len();
    Ok(Json(json!({"guides": guides, "count": count})))
}

#[axum::debug_handler]
async fn get_guide_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<GuideView>, ApiError> {
    let body = state
        .backend
        .get_guide(&id)
        .await
        .map_err(|e| backend_failure("Error al recuperar el guía", e))?;
    let raw = body.get("guide").cloned().unwrap_or(body);
    Ok(Json(GuideView::from_value(&normalize_record(raw))))
}

#[axum::debug_handler]
async fn create_guide_handler(
    State(state): State<AppState>,
    Json(input): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    let payload = GuidePayload::from_input(&input);
    let body = state
        .backend
        .create_guide(&payload)
        .await
        .map_err(|e| backend_failure("Error al crear el guía", e))?;
    Ok(Json(body))
}

#[axum::debug_handler]
async fn update_guide_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    let update = GuidePayload::from_input(&input).update_body();
    let body = state
        .backend
        .update_guide(&id, &update)
        .await
        .map_err(|e| backend_failure("Error al actualizar el guía", e))?;
    Ok(Json(body))
}

#[axum::debug_handler]
async fn delete_guide_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let body = state
        .backend
        .delete_guide(&id)
        .await
        .map_err(|e| backend_failure("Error al eliminar el guía", e))?;
    Ok(Json(body))
}

// --- Handlers: temporadas ---

#[axum::debug_handler]
async fn list_seasons_handler(
    State(state): State<AppState>,
    Query(params): Query<LimitParams>,
) -> Result<Json<Value>, ApiError> {
    let body = state
        .backend
        .list_seasons(params.limit.unwrap_or(DEFAULT_LIST_LIMIT))
        .await
        .map_err(|e| backend_failure("Error al listar las temporadas", e))?;
    let seasons = normalized_rows(&body, "seasons");
    let count = seasons.len();
    Ok(Json(json!({"seasons": seasons, "count": count})))
}

#[axum::debug_handler]
async fn get_season_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let body = state
        .backend
        .get_season(&id)
        .await
        .map_err(|e| backend_failure("Error al recuperar la temporada", e))?;
    let raw = body.get("season").cloned().unwrap_or(body);
    Ok(Json(normalize_record(raw)))
}

#[axum::debug_handler]
async fn create_season_handler(
    State(state): State<AppState>,
    Json(input): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    let body = state
        .backend
        .create_season(&input)
        .await
        .map_err(|e| backend_failure("Error al crear la temporada", e))?;
    Ok(Json(body))
}

#[axum::debug_handler]
async fn update_season_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    let body = state
        .backend
        .update_season(&id, &input)
        .await
        .map_err(|e| backend_failure("Error al actualizar la temporada", e))?;
    Ok(Json(body))
}

#[axum::debug_handler]
async fn delete_season_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let body = state
        .backend
        .delete_season(&id)
        .await
        .map_err(|e| backend_failure("Error al eliminar la temporada", e))?;
    Ok(Json(body))
}

#[axum::debug_handler]
async fn peak_seasons_handler(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let body = state
        .backend
        .peak_seasons()
        .await
        .map_err(|e| backend_failure("Error al cargar las temporadas punta", e))?;
    let seasons = normalized_rows(&body, "peakSeasons");
    let count = seasons.len();
    Ok(Json(json!({"seasons": seasons, "count": count})))
}

#[axum::debug_handler]
async fn warmest_seasons_handler(
    State(state): State<AppState>,
    Query(params): Query<LimitParams>,
) -> Result<Json<Value>, ApiError> {
    let body = state
        .backend
        .warmest_seasons(params.limit.unwrap_or(5))
        .await
        .map_err(|e| backend_failure("Error al cargar las temporadas más cálidas", e))?;
    let seasons = normalized_rows(&body, "warmestSeasons");
    let count = seasons.len();
    Ok(Json(json!({"seasons": seasons, "count": count})))
}

#[axum::debug_handler]
async fn season_activities_handler(
    State(state): State<AppState>,
    Query(params): Query<SeasonActivityParams>,
) -> Result<Json<Value>, ApiError> {
    let body = state
        .backend
        .season_activities(params.season_id.as_deref(), params.limit.unwrap_or(10))
        .await
        .map_err(|e| backend_failure("Error al cargar las actividades de la temporada", e))?;
    let activities = normalized_rows(&body, "activities");
    let count = activities.len();
    Ok(Json(json!({"activities": activities, "count": count})))
}

// --- Handlers: indicadores de sostenibilidad ---

#[axum::debug_handler]
async fn list_indicators_handler(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let body = state
        .backend
        .list_indicators()
        .await
        .map_err(|e| backend_failure("Error al listar los indicadores", e))?;
    Ok(Json(indicator_list_response(&body)))
}

#[axum::debug_handler]
async fn get_indicator_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let body = state
        .backend
        .get_indicator(&id)
        .await
        .map_err(|e| backend_failure("Error al recuperar el indicador", e))?;
    let raw = body.get("indicator").cloned().unwrap_or(body);
    Ok(Json(normalize_record(raw)))
}

#[axum::debug_handler]
async fn create_indicator_handler(
    State(state): State<AppState>,
    Json(input): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    let body = state
        .backend
        .create_indicator(&input)
        .await
        .map_err(|e| backend_failure("Error al crear el indicador", e))?;
    Ok(Json(body))
}

#[axum::debug_handler]
async fn update_indicator_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    let body = state
        .backend
        .update_indicator(&id, &input)
        .await
        .map_err(|e| backend_failure("Error al actualizar el indicador", e))?;
    Ok(Json(body))
}

#[axum::debug_handler]
async fn delete_indicator_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let body = state
        .backend
        .delete_indicator(&id)
        .await
        .map_err(|e| backend_failure("Error al eliminar el indicador", e))?;
    Ok(Json(body))
}

#[axum::debug_handler]
async fn carbon_leaders_handler(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let body = state
        .backend
        .carbon_leaders()
        .await
        .map_err(|e| backend_failure("Error al cargar los líderes en huella de carbono", e))?;
    Ok(Json(indicator_list_response(&body)))
}

#[axum::debug_handler]
async fn renewable_leaders_handler(
    State(state): State<AppState>,
) -> Result<Json<Value>, ApiError> {
    let body = state
        .backend
        .renewable_leaders()
        .await
        .map_err(|e| backend_failure("Error al cargar los líderes en energía renovable", e))?;
    Ok(Json(indicator_list_response(&body)))
}

#[axum::debug_handler]
async fn water_efficient_handler(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let body = state
        .backend
        .water_efficient()
        .await
        .map_err(|e| backend_failure("Error al cargar los indicadores de eficiencia hídrica", e))?;
    Ok(Json(indicator_list_response(&body)))
}

// --- Handlers: transportes ---

#[axum::debug_handler]
async fn list_transports_handler(
    State(state): State<AppState>,
    Query(params): Query<TransportListParams>,
) -> Result<Json<Value>, ApiError> {
    let body = state
        .backend
        .list_transports(params.kind.as_deref())
        .await
        .map_err(|e| backend_failure("Error al listar los transportes", e))?;
    Ok(Json(transport_list_response(&body)))
}

#[axum::debug_handler]
async fn get_transport_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<TransportView>, ApiError> {
    let body = state
        .backend
        .get_transport(&id)
        .await
        .map_err(|e| backend_failure("Error al recuperar el transporte", e))?;
    let raw = body.get("transport").cloned().unwrap_or(body);
    Ok(Json(TransportView::from_value(&normalize_record(raw))))
}

#[axum::debug_handler]
async fn create_bike_handler(
    State(state): State<AppState>,
    Json(input): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    let payload = BikePayload::from_input(&input);
    let body = state
        .backend
        .create_bike(&payload)
        .await
        .map_err(|e| backend_failure("Error al crear la bicicleta", e))?;
    Ok(Json(body))
}

#[axum::debug_handler]
async fn create_electric_vehicle_handler(
    State(state): State<AppState>,
    Json(input): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    let payload = ElectricVehiclePayload::from_input(&input);
    let body = state
        .backend
        .create_electric_vehicle(&payload)
        .await
        .map_err(|e| backend_failure("Error al crear el vehículo eléctrico", e))?;
    Ok(Json(body))
}

#[axum::debug_handler]
async fn create_public_transport_handler(
    State(state): State<AppState>,
    Json(input): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    let payload = PublicTransportPayload::from_input(&input);
    let body = state
        .backend
        .create_public_transport(&payload)
        .await
        .map_err(|e| backend_failure("Error al crear el transporte público", e))?;
    Ok(Json(body))
}

#[axum::debug_handler]
async fn update_transport_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(update): Json<TransportUpdate>,
) -> Result<Json<Value>, ApiError> {
    let body = state
        .backend
        .update_transport(&id, &update)
        .await
        .map_err(|e| backend_failure("Error al actualizar el transporte", e))?;
    Ok(Json(body))
}

#[axum::debug_handler]
async fn delete_transport_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let body = state
        .backend
        .delete_transport(&id)
        .await
        .map_err(|e| backend_failure("Error al eliminar el transporte", e))?;
    Ok(Json(body))
}

#[axum::debug_handler]
async fn search_transports_handler(
    State(state): State<AppState>,
    Path(term): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let body = state
        .backend
        .search_transports(&term)
        .await
        .map_err(|e| backend_failure("Error en la búsqueda de transportes", e))?;
    Ok(Json(transport_list_response(&body)))
}

#[axum::debug_handler]
async fn zero_emission_handler(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let body = state
        .backend
        .zero_emission_transports()
        .await
        .map_err(|e| backend_failure("Error al filtrar los transportes sin emisiones", e))?;
    Ok(Json(transport_list_response(&body)))
}

#[axum::debug_handler]
async fn cheapest_transports_handler(
    State(state): State<AppState>,
) -> Result<Json<Value>, ApiError> {
    let body = state
        .backend
        .cheapest_transports()
        .await
        .map_err(|e| backend_failure("Error al cargar los transportes más baratos", e))?;
    Ok(Json(transport_list_response(&body)))
}

#[axum::debug_handler]
async fn fastest_transports_handler(
    State(state): State<AppState>,
) -> Result<Json<Value>, ApiError> {
    let body = state
        .backend
        .fastest_transports()
        .await
        .map_err(|e| backend_failure("Error al cargar los transportes más rápidos", e))?;
    Ok(Json(transport_list_response(&body)))
}

#[axum::debug_handler]
async fn eco_score_handler(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let body = state
        .backend
        .eco_score_ranking()
        .await
        .map_err(|e| backend_failure("Error al cargar el ranking ecológico de transportes", e))?;
    Ok(Json(transport_list_response(&body)))
}

// --- Handlers: itinerarios y optimizador ---

#[axum::debug_handler]
async fn generate_itinerary_handler(
    State(state): State<AppState>,
    Json(params): Json<ItineraryParams>,
) -> Result<Json<ItineraryView>, ApiError> {
    let body = state
        .backend
        .generate_itinerary(&params)
        .await
        .map_err(|e| backend_failure("Error al generar el itinerario", e))?;
    Ok(Json(ItineraryView::from_response(&params, body)))
}

#[axum::debug_handler]
async fn optimize_trip_handler(
    State(state): State<AppState>,
    Json(request): Json<TripRequest>,
) -> Result<Json<Value>, ApiError> {
    let body = state
        .backend
        .optimize_trip(&request)
        .await
        .map_err(|e| backend_failure("Error al optimizar el viaje", e))?;
    Ok(Json(body))
}

// --- Handlers: utilidades ---

/// Sonda de salud: informa del origen configurado y de si el backend
/// responde. Devuelve siempre 200 para que la página pueda pintar el estado.
#[axum::debug_handler]
async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    match state.backend.ping().await {
        Ok(_) => Json(json!({
            "status": "ok",
            "backend_url": state.backend.base_url(),
        })),
        Err(err) => {
            error!("Health check del backend fallido: {err}");
            Json(json!({
                "status": "unreachable",
                "backend_url": state.backend.base_url(),
                "error": err.user_message(),
            }))
        }
    }
}

#[axum::debug_handler]
async fn shutdown_handler(State(state): State<AppState>) -> impl IntoResponse {
    info!("Petición de apagado recibida.");
    if let Some(sender) = state.shutdown_sender.lock().unwrap().take() {
        let _ = sender.send(());
    }
    StatusCode::OK
}

// --- Utilidades de forma ---

/// Traduce un fallo del cliente a la respuesta de la pasarela: el código del
/// backend se conserva, un timeout pasa a 504 y el resto a 502.
fn backend_failure(context: &str, err: BackendError) -> ApiError {
    error!("{context}: {err}");
    let status =
        StatusCode::from_u16(err.status().as_u16()).unwrap_or(StatusCode::BAD_GATEWAY);
    (status, Json(json!({"error": err.user_message()})))
}

/// Filas ya normalizadas de un cuerpo con clave de colección conocida.
fn normalized_rows(body: &Value, key: &str) -> Vec<Value> {
    extract_keyed_rows(body, key)
        .into_iter()
        .map(normalize_record)
        .collect()
}

fn rows_response(body: &Value, key: &str) -> QueryResponse {
    QueryResponse::from_rows(None, normalized_rows(body, key))
}

/// Resuelve una rebanada de analítica. Con el modo demo activo, un fallo o un
/// resultado vacío se cubre con el dataset de demostración y la marca `demo`.
fn analytics_slice(
    demo_mode: bool,
    context: &str,
    outcome: Result<Value, BackendError>,
    key: &str,
    fallback: Option<fn() -> Vec<Value>>,
) -> Result<QueryResponse, ApiError> {
    match outcome {
        Ok(body) => {
            let rows = normalized_rows(&body, key);
            if rows.is_empty() && demo_mode {
                if let Some(fallback) = fallback {
                    warn!("{context}: sin filas, se sirve el dataset de demostración");
                    return Ok(QueryResponse::from_rows(None, fallback()).mark_demo());
                }
            }
            Ok(QueryResponse::from_rows(None, rows))
        }
        Err(err) => {
            if demo_mode {
                if let Some(fallback) = fallback {
                    warn!("{context}: {err}, se sirve el dataset de demostración");
                    return Ok(QueryResponse::from_rows(None, fallback()).mark_demo());
                }
            }
            Err(backend_failure(context, err))
        }
    }
}

fn feedback_list_response(filters: &FeedbackQuery, body: &Value) -> Value {
    let limit = filters.limit.unwrap_or(10);
    let offset = filters.offset.unwrap_or(0);
    let rows = body
        .as_array()
        .cloned()
        .or_else(|| body.get("feedbacks").and_then(Value::as_array).cloned());

    match rows {
        Some(rows) => {
            let feedbacks: Vec<FeedbackView> = rows
                .iter()
                .map(|row| FeedbackView::from_value(&normalize_record(row.clone())))
                .collect();
            let total = feedbacks.len();
            let pagination = body.get("pagination").cloned().unwrap_or_else(|| {
                json!({"total": total, "limit": limit, "offset": offset, "has_more": false})
            });
            json!({"feedbacks": feedbacks, "pagination": pagination})
        }
        None => json!({
            "feedbacks": [],
            "pagination": {"total": 0, "limit": limit, "offset": offset, "has_more": false},
        }),
    }
}

fn transport_list_response(body: &Value) -> Value {
    let transports: Vec<TransportView> = normalized_rows(body, "transports")
        .iter()
        .map(TransportView::from_value)
        .collect();
    let count = transports.len();
    json!({"transports": transports, "count": count})
}

fn indicator_list_response(body: &Value) -> Value {
    let indicators = normalized_rows(body, "indicators");
    let count = indicators.len();
    json!({"indicators": indicators, "count": count})
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::http::StatusCode as AxumStatus;
    use axum::routing::{get, post};
    use axum::Router;
    use serde_json::json;

    use crate::backend::BackendClient;
    use crate::config::AppConfig;

    use super::*;

    async fn spawn(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    async fn spawn_gateway(backend_base: &str, demo_mode: bool) -> String {
        let cfg = AppConfig {
            api_base_url: backend_base.to_string(),
            server_addr: "127.0.0.1:0".to_string(),
            demo_mode,
        };
        let state = AppState {
            backend: BackendClient::from_config(&cfg).unwrap(),
            config: cfg,
            shutdown_sender: Arc::new(Mutex::new(None)),
        };
        spawn(create_router(state)).await
    }

    #[tokio::test]
    async fn la_consulta_de_ia_devuelve_la_forma_canonica() {
        let stub = Router::new().route(
            "/ai/ai-query",
            post(|| async {
                Json(json!({
                    "results": {"bindings": [
                        {"activityName": {"value": "Kayaking", "type": "literal"},
                         "ecoScore": {"value": 88, "type": "literal"}}
                    ]}
                }))
            }),
        );
        let backend_base = spawn(stub).await;
        let gateway = spawn_gateway(&backend_base, false).await;

        let response = reqwest::Client::new()
            .post(format!("{gateway}/api/query"))
            .json(&json!({"question": "actividades acuáticas"}))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 200);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["count"], json!(1));
        assert_eq!(
            body["results"],
            json!([{"activityName": "Kayaking", "ecoScore": 88}])
        );
        assert_eq!(body["query"], json!("actividades acuáticas"));
        assert!(body.get("demo").is_none());
    }

    #[tokio::test]
    async fn el_modo_demo_cubre_la_analitica_vacia_o_caida() {
        // carbon-stats responde vacío; by-region ni siquiera existe.
        let stub = Router::new().route(
            "/analytics/carbon-stats",
            get(|| async { Json(json!({"carbon_statistics": []})) }),
        );
        let backend_base = spawn(stub).await;
        let gateway = spawn_gateway(&backend_base, true).await;
        let http = reqwest::Client::new();

        let body: Value = http
            .get(format!("{gateway}/api/analytics/carbon-stats"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body["demo"], json!(true));
        assert_eq!(body["count"], json!(8));

        let body: Value = http
            .get(format!("{gateway}/api/analytics/by-region"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body["demo"], json!(true));
        assert_eq!(body["count"], json!(6));
    }

    #[tokio::test]
    async fn sin_demo_lo_vacio_se_queda_vacio_y_el_fallo_es_error() {
        let stub = Router::new().route(
            "/analytics/carbon-stats",
            get(|| async { Json(json!({"carbon_statistics": []})) }),
        );
        let backend_base = spawn(stub).await;
        let gateway = spawn_gateway(&backend_base, false).await;
        let http = reqwest::Client::new();

        let body: Value = http
            .get(format!("{gateway}/api/analytics/carbon-stats"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body["count"], json!(0));
        assert!(body.get("demo").is_none());

        let response = http
            .get(format!("{gateway}/api/analytics/by-region"))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 404);
        let body: Value = response.json().await.unwrap();
        assert!(body.get("error").is_some());
    }

    #[tokio::test]
    async fn los_errores_del_backend_conservan_codigo_y_detalle() {
        let stub = Router::new().route(
            "/seasons/:id",
            get(|| async {
                (
                    AxumStatus::NOT_FOUND,
                    Json(json!({"detail": "Season not found"})),
                )
            }),
        );
        let backend_base = spawn(stub).await;
        let gateway = spawn_gateway(&backend_base, false).await;

        let response = reqwest::Client::new()
            .get(format!("{gateway}/api/seasons/S-404"))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 404);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["error"], json!("Season not found"));
    }

    #[tokio::test]
    async fn el_listado_de_valoraciones_lleva_paginacion() {
        let stub = Router::new().route(
            "/feedback/",
            get(|| async {
                Json(json!([
                    {"feedback_id": 1, "user_name": "Ana", "rating": 5, "comment": "Genial"},
                    {"feedback_id": 2, "user_name": "Luis", "rating": 3, "comment": "Bien"}
                ]))
            }),
        );
        let backend_base = spawn(stub).await;
        let gateway = spawn_gateway(&backend_base, false).await;

        let body: Value = reqwest::Client::new()
            .get(format!("{gateway}/api/feedback?limit=5"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        let feedbacks = body["feedbacks"].as_array().unwrap();
        assert_eq!(feedbacks.len(), 2);
        assert_eq!(feedbacks[0]["id"], json!(1));
        assert_eq!(body["pagination"]["total"], json!(2));
        assert_eq!(body["pagination"]["limit"], json!(5));
        assert_eq!(body["pagination"]["has_more"], json!(false));
    }

    #[tokio::test]
    async fn el_apagado_dispara_el_canal() {
        let cfg = AppConfig {
            api_base_url: "http://127.0.0.1:1".to_string(),
            server_addr: "127.0.0.1:0".to_string(),
            demo_mode: false,
        };
        let (tx, rx) = tokio::sync::oneshot::channel::<()>();
        let state = AppState {
            backend: BackendClient::from_config(&cfg).unwrap(),
            config: cfg,
            shutdown_sender: Arc::new(Mutex::new(Some(tx))),
        };
        let gateway = spawn(create_router(state)).await;

        let response = reqwest::Client::new()
            .post(format!("{gateway}/api/shutdown"))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 200);
        rx.await.unwrap();
    }
}
