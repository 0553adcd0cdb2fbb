//! Modelos canónicos de la pasarela: respuesta normalizada, vistas de dominio
//! y payloads con los valores por defecto que espera el backend REST.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

// --- Respuesta canónica ---

/// Forma única que devuelve la pasarela para resultados tabulares:
/// `count` siempre coincide con `results.len()`.
#[derive(Debug, Clone, Serialize)]
pub struct QueryResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    pub results: Vec<Value>,
    pub count: usize,
    /// Solo aparece cuando la respuesta se rellenó con datos de demostración.
    #[serde(skip_serializing_if = "is_false")]
    pub demo: bool,
}

impl QueryResponse {
    pub fn from_rows(query: Option<String>, results: Vec<Value>) -> Self {
        Self {
            query,
            count: results.len(),
            results,
            demo: false,
        }
    }

    pub fn mark_demo(mut self) -> Self {
        self.demo = true;
        self
    }
}

fn is_false(flag: &bool) -> bool {
    !flag
}

// --- Lectura tolerante de campos ---
// El backend mezcla números con literales numéricos ("12.5") según la fuente
// SPARQL, así que las vistas aceptan ambas representaciones.

fn text(raw: &Value, key: &str) -> String {
    match raw.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

fn text_or(raw: &Value, key: &str, default: &str) -> String {
    let value = text(raw, key);
    if value.is_empty() {
        default.to_string()
    } else {
        value
    }
}

fn opt_text(raw: &Value, key: &str) -> Option<String> {
    let value = text(raw, key);
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

fn number(raw: &Value, key: &str) -> f64 {
    match raw.get(key) {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    }
}

fn integer(raw: &Value, key: &str) -> i64 {
    match raw.get(key) {
        Some(Value::Number(n)) => n.as_i64().unwrap_or_else(|| {
            n.as_f64().map(|v| v as i64).unwrap_or(0)
        }),
        Some(Value::String(s)) => s
            .trim()
            .parse::<i64>()
            .or_else(|_| s.trim().parse::<f64>().map(|v| v as i64))
            .unwrap_or(0),
        _ => 0,
    }
}

/// Como `integer`, pero un valor ausente, ilegible o cero cae al defecto.
fn integer_or(raw: &Value, key: &str, default: i64) -> i64 {
    match integer(raw, key) {
        0 => default,
        value => value,
    }
}

fn flag(raw: &Value, key: &str) -> bool {
    match raw.get(key) {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().map(|v| v != 0.0).unwrap_or(false),
        Some(Value::String(s)) => {
            matches!(s.trim().to_lowercase().as_str(), "true" | "1" | "yes")
        }
        _ => false,
    }
}

fn last_uri_segment(uri: &str) -> String {
    uri.rsplit('/').next().unwrap_or_default().to_string()
}

// --- Feedback ---

/// Vista de una valoración tal y como la consumen las páginas.
#[derive(Debug, Clone, Serialize)]
pub struct FeedbackView {
    pub id: Value,
    pub activity_uri: String,
    pub user_name: String,
    pub rating: i64,
    pub comment: String,
    pub created_at: String,
    pub updated_at: String,
}

impl FeedbackView {
    pub fn from_value(raw: &Value) -> Self {
        let id = raw
            .get("id")
            .filter(|v| !v.is_null())
            .or_else(|| raw.get("feedback_id"))
            .cloned()
            .unwrap_or(Value::Null);
        let now = Utc::now().to_rfc3339();
        Self {
            id,
            activity_uri: text(raw, "activity_uri"),
            user_name: text(raw, "user_name"),
            rating: integer(raw, "rating"),
            comment: text(raw, "comment"),
            created_at: text_or(raw, "created_at", &now),
            updated_at: text_or(raw, "updated_at", &now),
        }
    }
}

/// Cuerpo de creación/actualización de una valoración.
#[derive(Debug, Clone, Serialize)]
pub struct FeedbackPayload {
    pub activity_uri: String,
    pub user_name: String,
    pub rating: i64,
    pub comment: String,
}

impl FeedbackPayload {
    pub fn from_input(input: &Value) -> Self {
        Self {
            activity_uri: text(input, "activity_uri"),
            user_name: text(input, "user_name"),
            rating: integer(input, "rating"),
            comment: text(input, "comment"),
        }
    }
}

/// Actualización parcial de una valoración: el backend solo admite nota y
/// comentario, y los campos en `None` no viajan.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FeedbackUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl FeedbackUpdate {
    pub fn from_input(input: &Value) -> Self {
        let rating = match integer(input, "rating") {
            0 => None,
            value => Some(value),
        };
        Self {
            rating,
            comment: opt_text(input, "comment"),
        }
    }
}

/// Filtros de listado de valoraciones; se reenvían como query string.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeedbackQuery {
    pub limit: Option<u32>,
    pub offset: Option<u32>,
    pub min_rating: Option<u32>,
    pub max_rating: Option<u32>,
    pub user_name: Option<String>,
}

/// Resumen de valoraciones de una actividad: lista completa, estadísticas y
/// las cinco reseñas más recientes.
#[derive(Debug, Clone, Serialize)]
pub struct ActivityFeedbackView {
    pub activity_uri: String,
    pub feedbacks: Vec<FeedbackView>,
    pub total_reviews: usize,
    pub average_rating: f64,
    pub rating_distribution: Value,
    pub feedback_summary: Value,
    pub recent_reviews: Vec<Value>,
}

impl ActivityFeedbackView {
    pub fn from_value(raw: &Value) -> Self {
        let rows = raw
            .get("feedbacks")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        let feedbacks: Vec<FeedbackView> =
            rows.iter().map(FeedbackView::from_value).collect();
        let stats = raw.get("statistics").cloned().unwrap_or(Value::Null);
        let recent_reviews = feedbacks
            .iter()
            .take(5)
            .map(|fb| {
                json!({
                    "user_name": fb.user_name,
                    "rating": fb.rating,
                    "comment": fb.comment,
                    "created_at": fb.created_at,
                })
            })
            .collect();
        Self {
            activity_uri: text(raw, "activity_uri"),
            total_reviews: feedbacks.len(),
            average_rating: number(&stats, "average_rating"),
            rating_distribution: stats
                .get("rating_distribution")
                .cloned()
                .unwrap_or_else(|| json!({"1": 0, "2": 0, "3": 0, "4": 0, "5": 0})),
            feedback_summary: stats.get("summary").cloned().unwrap_or(Value::Null),
            recent_reviews,
            feedbacks,
        }
    }
}

// --- Turistas y guías ---

#[derive(Debug, Clone, Serialize)]
pub struct TouristView {
    pub id: String,
    pub name: String,
    pub email: String,
    pub nationality: String,
    pub preferences: String,
    #[serde(rename = "registrationDate")]
    pub registration_date: String,
    pub uri: String,
}

impl TouristView {
    pub fn from_value(raw: &Value) -> Self {
        let uri = text(raw, "uri");
        let id = {
            let explicit = text(raw, "tourist_id");
            if explicit.is_empty() {
                last_uri_segment(&uri)
            } else {
                explicit
            }
        };
        Self {
            id,
            name: text(raw, "name"),
            email: text(raw, "email"),
            nationality: text(raw, "nationality"),
            preferences: text(raw, "preferences"),
            registration_date: text(raw, "registrationDate"),
            uri,
        }
    }
}

/// Cuerpo de alta de turista; `tourist_id` en `null` deja que el backend
/// genere el identificador.
#[derive(Debug, Clone, Serialize)]
pub struct TouristPayload {
    pub tourist_id: Option<String>,
    pub name: String,
    pub email: Option<String>,
    pub nationality: Option<String>,
    pub preferences: Option<String>,
}

impl TouristPayload {
    pub fn from_input(input: &Value) -> Self {
        Self {
            tourist_id: opt_text(input, "id"),
            name: text(input, "name"),
            email: opt_text(input, "email"),
            nationality: opt_text(input, "nationality"),
            preferences: opt_text(input, "preferences"),
        }
    }

    /// Cuerpo de actualización: descarta el identificador y los campos vacíos.
    pub fn update_body(&self) -> Value {
        let mut body = Map::new();
        body.insert("name".into(), json!(self.name));
        if let Some(email) = &self.email {
            body.insert("email".into(), json!(email));
        }
        if let Some(nationality) = &self.nationality {
            body.insert("nationality".into(), json!(nationality));
        }
        if let Some(preferences) = &self.preferences {
            body.insert("preferences".into(), json!(preferences));
        }
        Value::Object(body)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GuideView {
    pub id: String,
    pub name: String,
    pub language: String,
    pub certification: String,
    #[serde(rename = "experienceYears")]
    pub experience_years: i64,
    pub uri: String,
}

impl GuideView {
    pub fn from_value(raw: &Value) -> Self {
        let uri = text(raw, "uri");
        let id = {
            let explicit = text(raw, "guide_id");
            if explicit.is_empty() {
                last_uri_segment(&uri)
            } else {
                explicit
            }
        };
        // El backend alterna entre ambas grafías según el endpoint.
        let experience_years = match integer(raw, "experienceYears") {
            0 => integer(raw, "experience_years"),
            value => value,
        };
        Self {
            id,
            name: text(raw, "name"),
            language: text(raw, "language"),
            certification: text(raw, "certification"),
            experience_years,
            uri,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GuidePayload {
    pub guide_id: Option<String>,
    pub name: String,
    pub language: String,
    pub certification: Option<String>,
    pub experience_years: Option<i64>,
}

impl GuidePayload {
    pub fn from_input(input: &Value) -> Self {
        let experience_years = match integer(input, "experienceYears") {
            0 => None,
            value => Some(value),
        };
        Self {
            guide_id: opt_text(input, "id"),
            name: text(input, "name"),
            language: text(input, "language"),
            certification: opt_text(input, "certification"),
            experience_years,
        }
    }

    pub fn update_body(&self) -> Value {
        let mut body = Map::new();
        body.insert("name".into(), json!(self.name));
        body.insert("language".into(), json!(self.language));
        if let Some(certification) = &self.certification {
            body.insert("certification".into(), json!(certification));
        }
        if let Some(years) = self.experience_years {
            body.insert("experience_years".into(), json!(years));
        }
        Value::Object(body)
    }
}

// --- Transportes ---

/// Vista unificada de transporte: campos comunes más los específicos de cada
/// variante (bicicleta, vehículo eléctrico, transporte público), todos con
/// valor por defecto para que las tablas no encuentren huecos.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransportView {
    pub id: String,
    pub transport_name: String,
    pub transport_type: String,
    pub price_per_km: f64,
    pub carbon_emission_per_km: f64,
    pub capacity: i64,
    pub availability: bool,
    pub operating_hours: String,
    pub average_speed: f64,
    pub contact_phone: String,
    pub bike_model: String,
    pub is_electric: bool,
    pub battery_range: f64,
    pub rental_price_per_hour: f64,
    pub frame_size: String,
    pub vehicle_model: String,
    pub vehicle_battery_range: f64,
    pub charging_time: i64,
    pub seating_capacity: i64,
    pub daily_rental_price: f64,
    pub has_air_conditioning: bool,
    pub line_number: String,
    pub route_description: String,
    pub ticket_price: f64,
    pub frequency_minutes: i64,
    pub accessible_for_disabled: bool,
    pub uri: String,
}

impl TransportView {
    pub fn from_value(raw: &Value) -> Self {
        Self {
            id: text(raw, "transportId"),
            transport_name: text(raw, "transportName"),
            transport_type: text(raw, "transportType"),
            price_per_km: number(raw, "pricePerKm"),
            carbon_emission_per_km: number(raw, "carbonEmissionPerKm"),
            capacity: integer(raw, "capacity"),
            availability: flag(raw, "availability"),
            operating_hours: text(raw, "operatingHours"),
            average_speed: number(raw, "averageSpeed"),
            contact_phone: text(raw, "contactPhone"),
            bike_model: text(raw, "bikeModel"),
            is_electric: flag(raw, "isElectric"),
            battery_range: number(raw, "batteryRange"),
            rental_price_per_hour: number(raw, "rentalPricePerHour"),
            frame_size: text(raw, "frameSize"),
            vehicle_model: text(raw, "vehicleModel"),
            vehicle_battery_range: number(raw, "vehicleBatteryRange"),
            charging_time: integer(raw, "chargingTime"),
            seating_capacity: integer(raw, "seatingCapacity"),
            daily_rental_price: number(raw, "dailyRentalPrice"),
            has_air_conditioning: flag(raw, "hasAirConditioning"),
            line_number: text(raw, "lineNumber"),
            route_description: text(raw, "routeDescription"),
            ticket_price: number(raw, "ticketPrice"),
            frequency_minutes: integer(raw, "frequencyMinutes"),
            accessible_for_disabled: flag(raw, "accessibleForDisabled"),
            uri: text(raw, "uri"),
        }
    }
}

/// Alta de bicicleta. Sin `id` del formulario se genera `BIKE-<millis>`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BikePayload {
    pub transport_id: String,
    pub transport_name: String,
    pub transport_type: String,
    pub bike_model: String,
    pub is_electric: bool,
    pub battery_range: f64,
    pub rental_price_per_hour: f64,
    pub price_per_km: f64,
    pub carbon_emission_per_km: f64,
    pub capacity: i64,
    pub availability: bool,
    pub operating_hours: String,
    pub average_speed: f64,
    pub frame_size: String,
    pub contact_phone: String,
}

impl BikePayload {
    pub fn from_input(input: &Value) -> Self {
        Self {
            transport_id: opt_text(input, "id")
                .unwrap_or_else(|| format!("BIKE-{}", Utc::now().timestamp_millis())),
            transport_name: text(input, "transportName"),
            transport_type: text_or(input, "transportType", "City Bike"),
            bike_model: text(input, "bikeModel"),
            is_electric: flag(input, "isElectric"),
            battery_range: number(input, "batteryRange"),
            rental_price_per_hour: number(input, "rentalPricePerHour"),
            price_per_km: number(input, "pricePerKm"),
            carbon_emission_per_km: number(input, "carbonEmissionPerKm"),
            capacity: integer_or(input, "capacity", 1),
            availability: flag(input, "availability"),
            operating_hours: text_or(input, "operatingHours", "24/7"),
            average_speed: number(input, "averageSpeed"),
            frame_size: text_or(input, "frameSize", "M"),
            contact_phone: text(input, "contactPhone"),
        }
    }
}

/// Alta de vehículo eléctrico (`EV-<millis>` si no llega identificador).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ElectricVehiclePayload {
    pub transport_id: String,
    pub transport_name: String,
    pub transport_type: String,
    pub vehicle_model: String,
    pub vehicle_battery_range: f64,
    pub charging_time: i64,
    pub seating_capacity: i64,
    pub daily_rental_price: f64,
    pub price_per_km: f64,
    pub carbon_emission_per_km: f64,
    pub capacity: i64,
    pub availability: bool,
    pub has_air_conditioning: bool,
    pub operating_hours: String,
    pub average_speed: f64,
    pub contact_phone: String,
}

impl ElectricVehiclePayload {
    pub fn from_input(input: &Value) -> Self {
        Self {
            transport_id: opt_text(input, "id")
                .unwrap_or_else(|| format!("EV-{}", Utc::now().timestamp_millis())),
            transport_name: text(input, "transportName"),
            transport_type: text_or(input, "transportType", "Electric Car"),
            vehicle_model: text(input, "vehicleModel"),
            vehicle_battery_range: number(input, "vehicleBatteryRange"),
            charging_time: integer(input, "chargingTime"),
            seating_capacity: integer_or(input, "seatingCapacity", 4),
            daily_rental_price: number(input, "dailyRentalPrice"),
            price_per_km: number(input, "pricePerKm"),
            carbon_emission_per_km: number(input, "carbonEmissionPerKm"),
            capacity: integer_or(input, "capacity", 4),
            availability: flag(input, "availability"),
            has_air_conditioning: flag(input, "hasAirConditioning"),
            operating_hours: text_or(input, "operatingHours", "24/7"),
            average_speed: number(input, "averageSpeed"),
            contact_phone: text(input, "contactPhone"),
        }
    }
}

/// Alta de transporte público (`PT-<millis>` si no llega identificador).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicTransportPayload {
    pub transport_id: String,
    pub transport_name: String,
    pub transport_type: String,
    pub line_number: String,
    pub route_description: String,
    pub ticket_price: f64,
    pub price_per_km: f64,
    pub carbon_emission_per_km: f64,
    pub capacity: i64,
    pub availability: bool,
    pub frequency_minutes: i64,
    pub accessible_for_disabled: bool,
    pub operating_hours: String,
    pub average_speed: f64,
    pub contact_phone: String,
}

impl PublicTransportPayload {
    pub fn from_input(input: &Value) -> Self {
        Self {
            transport_id: opt_text(input, "id")
                .unwrap_or_else(|| format!("PT-{}", Utc::now().timestamp_millis())),
            transport_name: text(input, "transportName"),
            transport_type: text_or(input, "transportType", "Bus"),
            line_number: text(input, "lineNumber"),
            route_description: text(input, "routeDescription"),
            ticket_price: number(input, "ticketPrice"),
            price_per_km: number(input, "pricePerKm"),
            carbon_emission_per_km: number(input, "carbonEmissionPerKm"),
            capacity: integer_or(input, "capacity", 50),
            availability: flag(input, "availability"),
            frequency_minutes: integer_or(input, "frequencyMinutes", 30),
            accessible_for_disabled: flag(input, "accessibleForDisabled"),
            operating_hours: text_or(input, "operatingHours", "06:00-23:00"),
            average_speed: number(input, "averageSpeed"),
            contact_phone: text(input, "contactPhone"),
        }
    }
}

/// Actualización parcial de transporte: los campos en `None` no viajan.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransportUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transport_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub availability: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_per_km: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operating_hours: Option<String>,
}

// --- Consultas NLP / IA ---

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NlpQuestion {
    pub question: String,
    #[serde(default)]
    pub use_advanced_nlp: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiQuestion {
    pub question: String,
}

// --- Itinerarios ---

/// Parámetros de generación; viajan como query string de un POST porque así
/// los define el backend.
#[derive(Debug, Clone, Deserialize)]
pub struct ItineraryParams {
    pub start_date: String,
    #[serde(default = "default_difficulty")]
    pub difficulty: String,
    pub budget_per_night: Option<f64>,
    pub preferred_season: Option<String>,
}

fn default_difficulty() -> String {
    "Moderate".to_string()
}

impl ItineraryParams {
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("start_date", self.start_date.clone()),
            ("difficulty", self.difficulty.clone()),
        ];
        if let Some(budget) = self.budget_per_night {
            pairs.push(("budget_per_night", budget.to_string()));
        }
        if let Some(season) = &self.preferred_season {
            pairs.push(("preferred_season", season.clone()));
        }
        pairs
    }

    /// Resumen legible que encabeza la respuesta de generación.
    pub fn summary(&self) -> String {
        let budget = self
            .budget_per_night
            .map(|b| b.to_string())
            .unwrap_or_else(|| "N/A".to_string());
        let season = self.preferred_season.as_deref().unwrap_or("N/A");
        format!(
            "Itinerary starting {}, Difficulty: {}, Budget: {}/night, Season: {}",
            self.start_date, self.difficulty, budget, season
        )
    }
}

/// Itinerario normalizado. `raw` conserva la respuesta íntegra del backend
/// para la sección de depuración de la página.
#[derive(Debug, Clone, Serialize)]
pub struct ItineraryView {
    pub query: String,
    pub start_date: String,
    pub end_date: Value,
    pub status: String,
    pub total_price: Value,
    pub total_eco_score: Value,
    pub days: Vec<Value>,
    pub recommendations: Vec<Value>,
    pub generation_date: String,
    pub raw: Value,
}

impl ItineraryView {
    pub fn from_response(params: &ItineraryParams, body: Value) -> Self {
        let days = body
            .get("days")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        let recommendations = body
            .get("recommendations")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        Self {
            query: params.summary(),
            start_date: text_or(&body, "start_date", &params.start_date),
            end_date: body.get("end_date").cloned().unwrap_or(Value::Null),
            status: text_or(&body, "status", "success"),
            total_price: body.get("total_price").cloned().unwrap_or(Value::Null),
            total_eco_score: body.get("total_eco_score").cloned().unwrap_or(Value::Null),
            days,
            recommendations,
            generation_date: text_or(&body, "generation_date", &Utc::now().to_rfc3339()),
            raw: body,
        }
    }
}

// --- Optimizador de huella de carbono ---

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TripRequest {
    pub tourist_id: String,
    pub accommodation_id: String,
    pub activity_ids: Vec<String>,
    pub start_date: String,
    pub end_date: String,
    #[serde(default = "default_optimization_mode")]
    pub optimization_mode: String,
}

fn default_optimization_mode() -> String {
    "balanced".to_string()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn feedback_acepta_id_alternativo() {
        let view = FeedbackView::from_value(&json!({"feedback_id": 7, "rating": 4}));
        assert_eq!(view.id, json!(7));
        assert_eq!(view.rating, 4);
        assert!(!view.created_at.is_empty());
    }

    #[test]
    fn actualizacion_de_valoracion_omite_ausentes() {
        let update = FeedbackUpdate::from_input(&json!({"rating": "4"}));
        let body = serde_json::to_value(&update).unwrap();
        assert_eq!(body, json!({"rating": 4}));
    }

    #[test]
    fn turista_sin_id_usa_segmento_de_uri() {
        let view = TouristView::from_value(&json!({
            "name": "Amina",
            "uri": "http://ecotour.org/resource/tourist/T-042"
        }));
        assert_eq!(view.id, "T-042");
        assert_eq!(view.email, "");
    }

    #[test]
    fn guia_acepta_ambas_grafias_de_experiencia() {
        let camel = GuideView::from_value(&json!({"guide_id": "G1", "experienceYears": 6}));
        assert_eq!(camel.experience_years, 6);
        let snake = GuideView::from_value(&json!({"guide_id": "G2", "experience_years": "9"}));
        assert_eq!(snake.experience_years, 9);
    }

    #[test]
    fn payload_de_bici_con_defectos() {
        let payload = BikePayload::from_input(&json!({"transportName": "Verde 01"}));
        assert!(payload.transport_id.starts_with("BIKE-"));
        assert_eq!(payload.transport_type, "City Bike");
        assert_eq!(payload.frame_size, "M");
        assert_eq!(payload.operating_hours, "24/7");
        assert_eq!(payload.capacity, 1);
        assert!(!payload.availability);
    }

    #[test]
    fn payload_de_transporte_publico_con_defectos() {
        let payload = PublicTransportPayload::from_input(&json!({"id": "PT-9"}));
        assert_eq!(payload.transport_id, "PT-9");
        assert_eq!(payload.transport_type, "Bus");
        assert_eq!(payload.capacity, 50);
        assert_eq!(payload.frequency_minutes, 30);
        assert_eq!(payload.operating_hours, "06:00-23:00");
    }

    #[test]
    fn actualizacion_de_transporte_omite_ausentes() {
        let update = TransportUpdate {
            transport_name: Some("Linea 4".to_string()),
            ..TransportUpdate::default()
        };
        let body = serde_json::to_value(&update).unwrap();
        assert_eq!(body, json!({"transportName": "Linea 4"}));
    }

    #[test]
    fn vista_de_transporte_tolera_literales_numericos() {
        let view = TransportView::from_value(&json!({
            "transportId": "BIKE-1",
            "pricePerKm": "2.5",
            "capacity": "12",
            "availability": "true"
        }));
        assert_eq!(view.id, "BIKE-1");
        assert_eq!(view.price_per_km, 2.5);
        assert_eq!(view.capacity, 12);
        assert!(view.availability);
    }

    #[test]
    fn itinerario_con_defectos() {
        let params = ItineraryParams {
            start_date: "2025-11-01".to_string(),
            difficulty: default_difficulty(),
            budget_per_night: None,
            preferred_season: Some("Summer".to_string()),
        };
        let view = ItineraryView::from_response(&params, json!({}));
        assert_eq!(view.status, "success");
        assert_eq!(view.start_date, "2025-11-01");
        assert!(view.days.is_empty());
        assert!(view.query.contains("Budget: N/A/night"));
        assert!(!view.generation_date.is_empty());
    }

    #[test]
    fn trip_request_con_modo_por_defecto() {
        let request: TripRequest = serde_json::from_value(json!({
            "tourist_id": "TOURIST-001",
            "accommodation_id": "ACC-001",
            "activity_ids": ["ACT-001"],
            "start_date": "2025-11-01",
            "end_date": "2025-11-03"
        }))
        .unwrap();
        assert_eq!(request.optimization_mode, "balanced");
    }

    #[test]
    fn la_marca_demo_solo_aparece_activada() {
        let plain = QueryResponse::from_rows(None, vec![json!({"a": 1})]);
        let body = serde_json::to_value(&plain).unwrap();
        assert!(body.get("demo").is_none());

        let demo = QueryResponse::from_rows(None, vec![]).mark_demo();
        let body = serde_json::to_value(&demo).unwrap();
        assert_eq!(body.get("demo"), Some(&json!(true)));
    }

    #[test]
    fn resumen_de_actividad_con_recientes() {
        let raw = json!({
            "activity_uri": "http://ecotour.org/activity/A1",
            "feedbacks": [
                {"id": 1, "user_name": "Ana", "rating": 5, "comment": "Genial"},
                {"id": 2, "user_name": "Luis", "rating": 3, "comment": "Bien"},
                {"id": 3, "user_name": "Sara", "rating": 4, "comment": ""},
                {"id": 4, "user_name": "Omar", "rating": 5, "comment": ""},
                {"id": 5, "user_name": "Iris", "rating": 2, "comment": ""},
                {"id": 6, "user_name": "Leo", "rating": 4, "comment": ""}
            ],
            "statistics": {"average_rating": 3.8}
        });
        let view = ActivityFeedbackView::from_value(&raw);
        assert_eq!(view.total_reviews, 6);
        assert_eq!(view.recent_reviews.len(), 5);
        assert_eq!(view.average_rating, 3.8);
        assert_eq!(view.rating_distribution["3"], json!(0));
    }
}
