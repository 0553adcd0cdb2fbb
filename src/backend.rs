//! Cliente HTTP del backend REST de la plataforma.
//!
//! Cada grupo de endpoints remotos tiene aquí su wrapper fino; todos comparten
//! la misma base configurable y presupuestos de tiempo por clase de operación
//! (CRUD, agregados de analítica, consultas de lenguaje natural/generación).

use std::time::Duration;

use anyhow::Result;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use url::Url;

use crate::config::AppConfig;
use crate::models::{
    AiQuestion, BikePayload, ElectricVehiclePayload, FeedbackPayload, FeedbackQuery,
    FeedbackUpdate, GuidePayload, ItineraryParams, NlpQuestion, PublicTransportPayload,
    TouristPayload, TransportUpdate, TripRequest,
};

/// Presupuestos de tiempo por clase de operación.
pub const CRUD_TIMEOUT: Duration = Duration::from_secs(10);
pub const ANALYTICS_TIMEOUT: Duration = Duration::from_secs(15);
pub const QUERY_TIMEOUT: Duration = Duration::from_secs(30);

/// Fallos al hablar con el backend, ya clasificados para la capa HTTP.
#[derive(Debug, Error)]
pub enum BackendError {
    /// La petición agotó su presupuesto de tiempo.
    #[error("el backend no respondió a tiempo")]
    Timeout,
    /// Fallo de transporte: conexión rechazada, DNS, corte a mitad de cuerpo.
    #[error("no se pudo contactar con el backend: {0}")]
    Network(String),
    /// El backend contestó con un código de error.
    #[error("el backend devolvió {status}: {}", .detail.as_deref().unwrap_or("sin detalle"))]
    Status {
        status: StatusCode,
        detail: Option<String>,
    },
    /// El cuerpo de la respuesta no era JSON.
    #[error("respuesta del backend ilegible: {0}")]
    Decode(String),
}

impl BackendError {
    fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            BackendError::Timeout
        } else if err.is_decode() {
            BackendError::Decode(err.to_string())
        } else {
            BackendError::Network(err.to_string())
        }
    }

    /// Mensaje para el usuario final, por orden de prioridad: detalle enviado
    /// por el servidor, texto del error de transporte, genérico.
    pub fn user_message(&self) -> String {
        match self {
            BackendError::Status {
                detail: Some(detail),
                ..
            } => detail.clone(),
            BackendError::Status {
                status,
                detail: None,
            } => format!("El backend devolvió el estado {status}"),
            BackendError::Network(message) => message.clone(),
            BackendError::Decode(message) => message.clone(),
            BackendError::Timeout => {
                "La petición al backend agotó el tiempo de espera".to_string()
            }
        }
    }

    /// Código con el que la pasarela reexpone este fallo.
    pub fn status(&self) -> StatusCode {
        match self {
            BackendError::Status { status, .. } => *status,
            BackendError::Timeout => StatusCode::GATEWAY_TIMEOUT,
            _ => StatusCode::BAD_GATEWAY,
        }
    }
}

/// Saca el texto de error de un cuerpo JSON del backend. FastAPI usa
/// `detail`; algunos endpoints antiguos responden `message`.
fn extract_detail(body: &Value) -> Option<String> {
    let field = body.get("detail").or_else(|| body.get("message"))?;
    match field {
        Value::String(text) => Some(text.clone()),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}

/// Cliente del backend. Clonable: todas las copias comparten el pool de
/// conexiones de reqwest.
#[derive(Debug, Clone)]
pub struct BackendClient {
    http: Client,
    base: Url,
}

impl BackendClient {
    pub fn from_config(cfg: &AppConfig) -> Result<Self> {
        // La base debe terminar en "/" para que los joins relativos no pisen
        // un posible prefijo de ruta.
        let mut raw = cfg.api_base_url.trim().to_string();
        if !raw.ends_with('/') {
            raw.push('/');
        }
        let base = Url::parse(&raw)?;
        let http = Client::builder().timeout(QUERY_TIMEOUT).build()?;
        Ok(Self { http, base })
    }

    pub fn base_url(&self) -> &str {
        self.base.as_str()
    }

    fn endpoint(&self, path: &str) -> Result<Url, BackendError> {
        self.base.join(path).map_err(|e| {
            BackendError::Network(format!("ruta de backend inválida ({path}): {e}"))
        })
    }

    /// Ruta con un segmento dinámico final. El segmento se codifica entero,
    /// barras incluidas: los URI de actividad viajan como un único tramo.
    fn endpoint_with(&self, path: &str, segment: &str) -> Result<Url, BackendError> {
        let mut url = self.endpoint(path)?;
        url.path_segments_mut()
            .map_err(|_| BackendError::Network("la URL base no admite rutas".to_string()))?
            .pop_if_empty()
            .push(segment);
        Ok(url)
    }

    /// Envía la petición ya montada y devuelve el cuerpo como JSON. Los
    /// cuerpos vacíos (DELETE, 204) se devuelven como `null`.
    async fn send(&self, request: RequestBuilder) -> Result<Value, BackendError> {
        let response = request.send().await.map_err(BackendError::from_reqwest)?;
        let status = response.status();
        if !status.is_success() {
            let detail = response
                .json::<Value>()
                .await
                .ok()
                .and_then(|body| extract_detail(&body));
            return Err(BackendError::Status { status, detail });
        }
        let bytes = response.bytes().await.map_err(BackendError::from_reqwest)?;
        if bytes.is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_slice(&bytes)
            .map_err(|e| BackendError::Decode(format!("JSON inválido del backend: {e}")))
    }

    async fn get_json(
        &self,
        url: Url,
        params: &[(&str, String)],
        timeout: Duration,
    ) -> Result<Value, BackendError> {
        self.send(self.http.get(url).query(params).timeout(timeout))
            .await
    }

    async fn post_json<B: Serialize + ?Sized>(
        &self,
        url: Url,
        body: &B,
        timeout: Duration,
    ) -> Result<Value, BackendError> {
        self.send(self.http.post(url).json(body).timeout(timeout))
            .await
    }

    async fn put_json<B: Serialize + ?Sized>(
        &self,
        url: Url,
        body: &B,
        timeout: Duration,
    ) -> Result<Value, BackendError> {
        self.send(self.http.put(url).json(body).timeout(timeout))
            .await
    }

    async fn delete_json(&self, url: Url, timeout: Duration) -> Result<Value, BackendError> {
        self.send(self.http.delete(url).timeout(timeout)).await
    }

    // ---------------------------------------------------------------------
    // SALUD
    // ---------------------------------------------------------------------

    /// Sonda de arranque y del endpoint de salud de la pasarela.
    pub async fn ping(&self) -> Result<Value, BackendError> {
        let url = self.endpoint("health")?;
        self.get_json(url, &[], CRUD_TIMEOUT).await
    }

    // ---------------------------------------------------------------------
    // FEEDBACK
    // ---------------------------------------------------------------------

    pub async fn list_feedback(&self, filters: &FeedbackQuery) -> Result<Value, BackendError> {
        let url = self.endpoint("feedback/")?;
        let mut params: Vec<(&str, String)> = Vec::new();
        if let Some(limit) = filters.limit {
            params.push(("limit", limit.to_string()));
        }
        if let Some(offset) = filters.offset {
            params.push(("offset", offset.to_string()));
        }
        if let Some(min_rating) = filters.min_rating {
            params.push(("min_rating", min_rating.to_string()));
        }
        if let Some(max_rating) = filters.max_rating {
            params.push(("max_rating", max_rating.to_string()));
        }
        if let Some(user_name) = &filters.user_name {
            params.push(("user_name", user_name.clone()));
        }
        self.get_json(url, &params, CRUD_TIMEOUT).await
    }

    pub async fn get_feedback(&self, id: &str) -> Result<Value, BackendError> {
        let url = self.endpoint_with("feedback/", id)?;
        self.get_json(url, &[], CRUD_TIMEOUT).await
    }

    pub async fn activity_feedback(&self, activity_uri: &str) -> Result<Value, BackendError> {
        let url = self.endpoint_with("feedback/activity/", activity_uri)?;
        self.get_json(url, &[], CRUD_TIMEOUT).await
    }

    pub async fn create_feedback(&self, payload: &FeedbackPayload) -> Result<Value, BackendError> {
        let url = self.endpoint("feedback/")?;
        self.post_json(url, payload, CRUD_TIMEOUT).await
    }

    pub async fn update_feedback(
        &self,
        id: &str,
        update: &FeedbackUpdate,
    ) -> Result<Value, BackendError> {
        let url = self.endpoint_with("feedback/", id)?;
        self.put_json(url, update, CRUD_TIMEOUT).await
    }

    pub async fn delete_feedback(&self, id: &str) -> Result<Value, BackendError> {
        let url = self.endpoint_with("feedback/", id)?;
        self.delete_json(url, CRUD_TIMEOUT).await
    }

    // ---------------------------------------------------------------------
    // TURISTAS Y GUÍAS
    // ---------------------------------------------------------------------

    pub async fn list_tourists(&self, limit: u32) -> Result<Value, BackendError> {
        let url = self.endpoint("users/")?;
        self.get_json(url, &[("limit", limit.to_string())], CRUD_TIMEOUT)
            .await
    }

    pub async fn get_tourist(&self, id: &str) -> Result<Value, BackendError> {
        let url = self.endpoint_with("users/", id)?;
        self.get_json(url, &[], CRUD_TIMEOUT).await
    }

    pub async fn create_tourist(&self, payload: &TouristPayload) -> Result<Value, BackendError> {
        let url = self.endpoint("users/")?;
        self.post_json(url, payload, CRUD_TIMEOUT).await
    }

    pub async fn update_tourist(&self, id: &str, body: &Value) -> Result<Value, BackendError> {
        let url = self.endpoint_with("users/", id)?;
        self.put_json(url, body, CRUD_TIMEOUT).await
    }

    pub async fn delete_tourist(&self, id: &str) -> Result<Value, BackendError> {
        let url = self.endpoint_with("users/", id)?;
        self.delete_json(url, CRUD_TIMEOUT).await
    }

    pub async fn list_guides(
        &self,
        language: Option<&str>,
        limit: u32,
    ) -> Result<Value, BackendError> {
        let url = self.endpoint("users/guides/")?;
        let mut params = vec![("limit", limit.to_string())];
        if let Some(language) = language {
            params.push(("language", language.to_string()));
        }
        self.get_json(url, &params, CRUD_TIMEOUT).await
    }

    pub async fn get_guide(&self, id: &str) -> Result<Value, BackendError> {
        let url = self.endpoint_with("users/guides/", id)?;
        self.get_json(url, &[], CRUD_TIMEOUT).await
    }

    pub async fn create_guide(&self, payload: &GuidePayload) -> Result<Value, BackendError> {
        let url = self.endpoint("users/guides/")?;
        self.post_json(url, payload, CRUD_TIMEOUT).await
    }

    pub async fn update_guide(&self, id: &str, body: &Value) -> Result<Value, BackendError> {
        let url = self.endpoint_with("users/guides/", id)?;
        self.put_json(url, body, CRUD_TIMEOUT).await
    }

    pub async fn delete_guide(&self, id: &str) -> Result<Value, BackendError> {
        let url = self.endpoint_with("users/guides/", id)?;
        self.delete_json(url, CRUD_TIMEOUT).await
    }

    // ---------------------------------------------------------------------
    // CONSULTAS NLP / IA
    // ---------------------------------------------------------------------

    pub async fn nlp_query(&self, question: &NlpQuestion) -> Result<Value, BackendError> {
        let url = self.endpoint("nlp/query")?;
        self.post_json(url, question, QUERY_TIMEOUT).await
    }

    pub async fn nlp_analyze(&self, question: &str) -> Result<Value, BackendError> {
        let url = self.endpoint("nlp/analyze")?;
        self.get_json(url, &[("question", question.to_string())], QUERY_TIMEOUT)
            .await
    }

    pub async fn nlp_examples(&self) -> Result<Value, BackendError> {
        let url = self.endpoint("nlp/examples")?;
        self.get_json(url, &[], CRUD_TIMEOUT).await
    }

    pub async fn ai_query(&self, question: &AiQuestion) -> Result<Value, BackendError> {
        let url = self.endpoint("ai/ai-query")?;
        self.post_json(url, question, QUERY_TIMEOUT).await
    }

    pub async fn ai_test(&self) -> Result<Value, BackendError> {
        let url = self.endpoint("ai/test")?;
        self.get_json(url, &[], CRUD_TIMEOUT).await
    }

    // ---------------------------------------------------------------------
    // ANALÍTICA
    // ---------------------------------------------------------------------

    pub async fn carbon_stats(&self) -> Result<Value, BackendError> {
        let url = self.endpoint("analytics/carbon-stats")?;
        self.get_json(url, &[], ANALYTICS_TIMEOUT).await
    }

    pub async fn region_stats(&self) -> Result<Value, BackendError> {
        let url = self.endpoint("analytics/by-region")?;
        self.get_json(url, &[], ANALYTICS_TIMEOUT).await
    }

    pub async fn top_eco_activities(&self, limit: u32) -> Result<Value, BackendError> {
        let url = self.endpoint("analytics/top-eco")?;
        self.get_json(url, &[("limit", limit.to_string())], ANALYTICS_TIMEOUT)
            .await
    }

    pub async fn activity_types(&self) -> Result<Value, BackendError> {
        let url = self.endpoint("analytics/activity-types")?;
        self.get_json(url, &[], ANALYTICS_TIMEOUT).await
    }

    pub async fn accommodation_stats(&self) -> Result<Value, BackendError> {
        let url = self.endpoint("analytics/accommodations-stats")?;
        self.get_json(url, &[], ANALYTICS_TIMEOUT).await
    }

    pub async fn difficulty_distribution(&self) -> Result<Value, BackendError> {
        let url = self.endpoint("analytics/difficulty")?;
        self.get_json(url, &[], ANALYTICS_TIMEOUT).await
    }

    // ---------------------------------------------------------------------
    // TEMPORADAS
    // ---------------------------------------------------------------------

    pub async fn list_seasons(&self, limit: u32) -> Result<Value, BackendError> {
        let url = self.endpoint("seasons/")?;
        self.get_json(url, &[("limit", limit.to_string())], CRUD_TIMEOUT)
            .await
    }

    pub async fn get_season(&self, id: &str) -> Result<Value, BackendError> {
        let url = self.endpoint_with("seasons/", id)?;
        self.get_json(url, &[], CRUD_TIMEOUT).await
    }

    pub async fn create_season(&self, body: &Value) -> Result<Value, BackendError> {
        let url = self.endpoint("seasons/")?;
        self.post_json(url, body, CRUD_TIMEOUT).await
    }

    pub async fn update_season(&self, id: &str, body: &Value) -> Result<Value, BackendError> {
        let url = self.endpoint_with("seasons/", id)?;
        self.put_json(url, body, CRUD_TIMEOUT).await
    }

    pub async fn delete_season(&self, id: &str) -> Result<Value, BackendError> {
        let url = self.endpoint_with("seasons/", id)?;
        self.delete_json(url, CRUD_TIMEOUT).await
    }

    pub async fn peak_seasons(&self) -> Result<Value, BackendError> {
        let url = self.endpoint("seasons/stats/peak-seasons")?;
        self.get_json(url, &[], CRUD_TIMEOUT).await
    }

    pub async fn warmest_seasons(&self, limit: u32) -> Result<Value, BackendError> {
        let url = self.endpoint("seasons/stats/warmest")?;
        self.get_json(url, &[("limit", limit.to_string())], CRUD_TIMEOUT)
            .await
    }

    pub async fn season_activities(
        &self,
        season_id: Option<&str>,
        limit: u32,
    ) -> Result<Value, BackendError> {
        let url = self.endpoint("seasons/current/activities")?;
        let mut params = vec![("limit", limit.to_string())];
        if let Some(season_id) = season_id {
            params.push(("season_id", season_id.to_string()));
        }
        self.get_json(url, &params, CRUD_TIMEOUT).await
    }

    // ---------------------------------------------------------------------
    // INDICADORES DE SOSTENIBILIDAD
    // ---------------------------------------------------------------------
    // El backend monta este router con el prefijo duplicado; la ruta
    // "sustainability/sustainability/..." es literal, no un error de aquí.

    pub async fn list_indicators(&self) -> Result<Value, BackendError> {
        let url = self.endpoint("sustainability/sustainability/all")?;
        self.get_json(url, &[], CRUD_TIMEOUT).await
    }

    pub async fn get_indicator(&self, id: &str) -> Result<Value, BackendError> {
        let url = self.endpoint_with("sustainability/sustainability/", id)?;
        self.get_json(url, &[], CRUD_TIMEOUT).await
    }

    pub async fn create_indicator(&self, body: &Value) -> Result<Value, BackendError> {
        let url = self.endpoint("sustainability/sustainability/")?;
        self.post_json(url, body, CRUD_TIMEOUT).await
    }

    pub async fn update_indicator(&self, id: &str, body: &Value) -> Result<Value, BackendError> {
        let url = self.endpoint_with("sustainability/sustainability/", id)?;
        self.put_json(url, body, CRUD_TIMEOUT).await
    }

    pub async fn delete_indicator(&self, id: &str) -> Result<Value, BackendError> {
        let url = self.endpoint_with("sustainability/sustainability/", id)?;
        self.delete_json(url, CRUD_TIMEOUT).await
    }

    pub async fn carbon_leaders(&self) -> Result<Value, BackendError> {
        let url = self.endpoint("sustainability/sustainability/stats/carbon-leaders")?;
        self.get_json(url, &[], CRUD_TIMEOUT).await
    }

    pub async fn renewable_leaders(&self) -> Result<Value, BackendError> {
        let url = self.endpoint("sustainability/sustainability/stats/renewable-leaders")?;
        self.get_json(url, &[], CRUD_TIMEOUT).await
    }

    pub async fn water_efficient(&self) -> Result<Value, BackendError> {
        let url = self.endpoint("sustainability/sustainability/stats/water-efficient")?;
        self.get_json(url, &[], CRUD_TIMEOUT).await
    }

    // ---------------------------------------------------------------------
    // TRANSPORTES
    // ---------------------------------------------------------------------

    pub async fn list_transports(&self, kind: Option<&str>) -> Result<Value, BackendError> {
        let url = self.endpoint("transport/")?;
        let mut params: Vec<(&str, String)> = Vec::new();
        if let Some(kind) = kind {
            params.push(("type", kind.to_string()));
        }
        self.get_json(url, &params, CRUD_TIMEOUT).await
    }

    pub async fn get_transport(&self, id: &str) -> Result<Value, BackendError> {
        let url = self.endpoint_with("transport/", id)?;
        self.get_json(url, &[], CRUD_TIMEOUT).await
    }

    pub async fn create_bike(&self, payload: &BikePayload) -> Result<Value, BackendError> {
        let url = self.endpoint("transport/bike")?;
        self.post_json(url, payload, CRUD_TIMEOUT).await
    }

    pub async fn create_electric_vehicle(
        &self,
        payload: &ElectricVehiclePayload,
    ) -> Result<Value, BackendError> {
        let url = self.endpoint("transport/electric-vehicle")?;
        self.post_json(url, payload, CRUD_TIMEOUT).await
    }

    pub async fn create_public_transport(
        &self,
        payload: &PublicTransportPayload,
    ) -> Result<Value, BackendError> {
        let url = self.endpoint("transport/public-transport")?;
        self.post_json(url, payload, CRUD_TIMEOUT).await
    }

    pub async fn update_transport(
        &self,
        id: &str,
        update: &TransportUpdate,
    ) -> Result<Value, BackendError> {
        let url = self.endpoint_with("transport/", id)?;
        self.put_json(url, update, CRUD_TIMEOUT).await
    }

    pub async fn delete_transport(&self, id: &str) -> Result<Value, BackendError> {
        let url = self.endpoint_with("transport/", id)?;
        self.delete_json(url, CRUD_TIMEOUT).await
    }

    pub async fn search_transports(&self, term: &str) -> Result<Value, BackendError> {
        let url = self.endpoint_with("transport/search/", term)?;
        self.get_json(url, &[], CRUD_TIMEOUT).await
    }

    pub async fn zero_emission_transports(&self) -> Result<Value, BackendError> {
        let url = self.endpoint("transport/filter/zero-emission")?;
        self.get_json(url, &[], CRUD_TIMEOUT).await
    }

    pub async fn cheapest_transports(&self) -> Result<Value, BackendError> {
        let url = self.endpoint("transport/stats/cheapest")?;
        self.get_json(url, &[], CRUD_TIMEOUT).await
    }

    pub async fn fastest_transports(&self) -> Result<Value, BackendError> {
        let url = self.endpoint("transport/stats/fastest")?;
        self.get_json(url, &[], CRUD_TIMEOUT).await
    }

    pub async fn eco_score_ranking(&self) -> Result<Value, BackendError> {
        let url = self.endpoint("transport/stats/eco-score")?;
        self.get_json(url, &[], CRUD_TIMEOUT).await
    }

    // ---------------------------------------------------------------------
    // ITINERARIOS Y OPTIMIZADOR DE CARBONO
    // ---------------------------------------------------------------------

    /// El endpoint de generación recibe los parámetros en la query string de
    /// un POST sin cuerpo; así lo define el backend.
    pub async fn generate_itinerary(
        &self,
        params: &ItineraryParams,
    ) -> Result<Value, BackendError> {
        let url = self.endpoint("itineraries/generate-3day-itinerary")?;
        let pairs = params.query_pairs();
        self.send(self.http.post(url).query(&pairs).timeout(QUERY_TIMEOUT))
            .await
    }

    pub async fn optimize_trip(&self, request: &TripRequest) -> Result<Value, BackendError> {
        let url = self.endpoint("carbon-optimizer/optimize-trip")?;
        self.post_json(url, request, QUERY_TIMEOUT).await
    }
}

#[cfg(test)]
mod tests {
    use axum::extract::Path;
    use axum::http::StatusCode as AxumStatus;
    use axum::response::IntoResponse;
    use axum::routing::{delete, get, post};
    use axum::{Json, Router};
    use serde_json::json;

    use super::*;

    fn client_for(base: &str) -> BackendClient {
        let cfg = AppConfig {
            api_base_url: base.to_string(),
            server_addr: "127.0.0.1:0".to_string(),
            demo_mode: false,
        };
        BackendClient::from_config(&cfg).unwrap()
    }

    async fn spawn_stub(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn extrae_el_detalle_de_un_error_fastapi() {
        let router = Router::new().route(
            "/seasons/:id",
            get(|| async {
                (
                    AxumStatus::NOT_FOUND,
                    Json(json!({"detail": "Season not found"})),
                )
            }),
        );
        let base = spawn_stub(router).await;
        let client = client_for(&base);

        let err = client.get_season("S-404").await.unwrap_err();
        match &err {
            BackendError::Status { status, detail } => {
                assert_eq!(status.as_u16(), 404);
                assert_eq!(detail.as_deref(), Some("Season not found"));
            }
            other => panic!("variante inesperada: {other:?}"),
        }
        assert_eq!(err.user_message(), "Season not found");
        assert_eq!(err.status().as_u16(), 404);
    }

    #[tokio::test]
    async fn acepta_message_como_detalle_alternativo() {
        let router = Router::new().route(
            "/ai/test",
            get(|| async {
                (
                    AxumStatus::INTERNAL_SERVER_ERROR,
                    Json(json!({"message": "modelo no disponible"})),
                )
            }),
        );
        let base = spawn_stub(router).await;
        let client = client_for(&base);

        let err = client.ai_test().await.unwrap_err();
        assert_eq!(err.user_message(), "modelo no disponible");
        assert_eq!(err.status().as_u16(), 500);
    }

    #[tokio::test]
    async fn cuerpo_vacio_se_tolera() {
        let router = Router::new().route(
            "/feedback/:id",
            delete(|| async { AxumStatus::NO_CONTENT.into_response() }),
        );
        let base = spawn_stub(router).await;
        let client = client_for(&base);

        let body = client.delete_feedback("12").await.unwrap();
        assert_eq!(body, Value::Null);
    }

    #[tokio::test]
    async fn reenvia_los_filtros_de_listado() {
        let router = Router::new().route(
            "/feedback/",
            get(|uri: axum::http::Uri| async move {
                Json(json!({"query": uri.query().unwrap_or_default()}))
            }),
        );
        let base = spawn_stub(router).await;
        let client = client_for(&base);

        let filters = FeedbackQuery {
            limit: Some(5),
            min_rating: Some(3),
            user_name: Some("Amina".to_string()),
            ..FeedbackQuery::default()
        };
        let body = client.list_feedback(&filters).await.unwrap();
        let query = body["query"].as_str().unwrap();
        assert!(query.contains("limit=5"));
        assert!(query.contains("min_rating=3"));
        assert!(query.contains("user_name=Amina"));
        assert!(!query.contains("offset"));
    }

    #[tokio::test]
    async fn codifica_el_uri_de_actividad_como_un_segmento() {
        let router = Router::new().route(
            "/feedback/activity/:uri",
            get(|Path(uri): Path<String>| async move { Json(json!({"activity_uri": uri})) }),
        );
        let base = spawn_stub(router).await;
        let client = client_for(&base);

        let body = client
            .activity_feedback("http://ecotour.org/activity/A-7")
            .await
            .unwrap();
        assert_eq!(
            body["activity_uri"],
            json!("http://ecotour.org/activity/A-7")
        );
    }

    #[tokio::test]
    async fn generacion_envia_parametros_en_la_query() {
        let router = Router::new().route(
            "/itineraries/generate-3day-itinerary",
            post(|uri: axum::http::Uri| async move {
                Json(json!({"query": uri.query().unwrap_or_default()}))
            }),
        );
        let base = spawn_stub(router).await;
        let client = client_for(&base);

        let params = ItineraryParams {
            start_date: "2025-11-01".to_string(),
            difficulty: "Easy".to_string(),
            budget_per_night: Some(80.0),
            preferred_season: None,
        };
        let body = client.generate_itinerary(&params).await.unwrap();
        let query = body["query"].as_str().unwrap();
        assert!(query.contains("start_date=2025-11-01"));
        assert!(query.contains("difficulty=Easy"));
        assert!(query.contains("budget_per_night=80"));
        assert!(!query.contains("preferred_season"));
    }

    #[tokio::test]
    async fn fallo_de_conexion_es_error_de_red() {
        // Puerto reservado y liberado: nadie escucha ahí.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = client_for(&format!("http://{addr}"));
        let err = client.ping().await.unwrap_err();
        match err {
            BackendError::Network(_) => {}
            other => panic!("variante inesperada: {other:?}"),
        }
    }

    #[tokio::test]
    async fn un_timeout_se_clasifica_como_tal() {
        let router = Router::new().route(
            "/health",
            get(|| async {
                tokio::time::sleep(Duration::from_millis(500)).await;
                Json(json!({"status": "ok"}))
            }),
        );
        let base = spawn_stub(router).await;

        let http = Client::new();
        let err = http
            .get(format!("{base}/health"))
            .timeout(Duration::from_millis(50))
            .send()
            .await
            .unwrap_err();
        assert!(matches!(
            BackendError::from_reqwest(err),
            BackendError::Timeout
        ));
    }

    #[test]
    fn la_base_siempre_termina_en_barra() {
        let client = client_for("http://localhost:8000");
        assert_eq!(client.base_url(), "http://localhost:8000/");
        let url = client.endpoint("feedback/").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/feedback/");
    }

    #[test]
    fn presupuestos_de_tiempo_por_clase() {
        assert_eq!(CRUD_TIMEOUT, Duration::from_secs(10));
        assert_eq!(ANALYTICS_TIMEOUT, Duration::from_secs(15));
        assert_eq!(QUERY_TIMEOUT, Duration::from_secs(30));
    }
}
