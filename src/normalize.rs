//! Normalización de resultados heterogéneos del backend.
//!
//! El backend expone datos procedentes de un triple store (Fuseki), por lo que
//! un mismo campo puede llegar como escalar plano, como binding SPARQL
//! `{value: ..., type: ...}` o como cadena JSON que codifica dicho binding.
//!
//! API pública:
//!   - `extract_rows(&Value)` / `extract_keyed_rows(&Value, &str)`
//!   - `unwrap_value(Value)` / `normalize_record(Value)`
//!   - `normalize_response(Option<&str>, &Value)`

use serde_json::{Map, Value};

use crate::models::QueryResponse;

/// Extrae la lista de filas de un cuerpo de respuesta de forma desconocida.
///
/// Orden de detección (gana la primera forma que encaje):
///   1. `body.results.bindings` (lista de bindings anidada)
///   2. `body.bindings`
///   3. `body.results` cuando ya es una lista
///   4. el propio `body` cuando es una lista
///   5. `body.data` (lista, o un único objeto envuelto en lista unitaria)
///   6. `body` como resultado único envuelto en lista unitaria
///   7. lista vacía
pub fn extract_rows(body: &Value) -> Vec<Value> {
    if let Some(bindings) = body.pointer("/results/bindings").and_then(Value::as_array) {
        return bindings.clone();
    }
    if let Some(bindings) = body.get("bindings").and_then(Value::as_array) {
        return bindings.clone();
    }
    if let Some(results) = body.get("results").and_then(Value::as_array) {
        return results.clone();
    }
    if let Some(list) = body.as_array() {
        return list.clone();
    }
    match body.get("data") {
        Some(Value::Array(list)) => return list.clone(),
        Some(Value::Null) | None => {}
        Some(single) => return vec![single.clone()],
    }
    match body.as_object() {
        Some(map) if !map.is_empty() => vec![body.clone()],
        _ => Vec::new(),
    }
}

/// Variante con clave de dominio: algunos endpoints devuelven la colección
/// bajo su propio nombre (`transports`, `seasons`, `feedbacks`...). Se prueba
/// esa clave primero y después la política general de `extract_rows`.
pub fn extract_keyed_rows(body: &Value, key: &str) -> Vec<Value> {
    if let Some(list) = body.get(key).and_then(Value::as_array) {
        return list.clone();
    }
    extract_rows(body)
}

/// Desenvuelve un valor de campo individual:
///   - `{value: x, ...}` pasa a ser `x`;
///   - una cadena cuyo JSON interno sea un objeto con `value` pasa a ser ese
///     valor anidado (un fallo de parseo conserva la cadena original);
///   - cualquier otro valor, `null` incluido, se conserva tal cual.
pub fn unwrap_value(value: Value) -> Value {
    if let Value::Object(map) = &value {
        if let Some(inner) = map.get("value") {
            return inner.clone();
        }
        return value;
    }
    if let Value::String(text) = &value {
        if let Ok(Value::Object(parsed)) = serde_json::from_str::<Value>(text) {
            if let Some(inner) = parsed.get("value") {
                return inner.clone();
            }
        }
    }
    value
}

/// Aplica `unwrap_value` a todos los campos de una fila. Las filas que no son
/// objetos se devuelven sin tocar.
pub fn normalize_record(row: Value) -> Value {
    match row {
        Value::Object(map) => {
            let normalized: Map<String, Value> = map
                .into_iter()
                .map(|(key, value)| (key, unwrap_value(value)))
                .collect();
            Value::Object(normalized)
        }
        other => other,
    }
}

/// Convierte un cuerpo de respuesta arbitrario en la forma canónica
/// `{results, count}` con todos los campos ya desenvueltos. Transformación
/// pura: no lanza errores ante entradas mal formadas.
pub fn normalize_response(query: Option<&str>, body: &Value) -> QueryResponse {
    let results: Vec<Value> = extract_rows(body)
        .into_iter()
        .map(normalize_record)
        .collect();

    QueryResponse {
        query: query.map(str::to_string),
        count: results.len(),
        results,
        demo: false,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn desenvuelve_binding_sparql() {
        let row = json!({"activityName": {"value": "Kayak", "type": "literal"}});
        assert_eq!(
            normalize_record(row),
            json!({"activityName": "Kayak"})
        );
    }

    #[test]
    fn escalares_planos_sin_cambios() {
        let row = json!({"rating": 4, "name": "Amina", "active": true});
        assert_eq!(normalize_record(row.clone()), row);
    }

    #[test]
    fn cadena_json_con_value_se_desenvuelve() {
        assert_eq!(unwrap_value(json!("{\"value\": 5}")), json!(5));
    }

    #[test]
    fn cadena_invalida_se_conserva() {
        assert_eq!(unwrap_value(json!("hello")), json!("hello"));
    }

    #[test]
    fn cadena_json_sin_value_se_conserva() {
        // "5" parsea como número, no como objeto con `value`: se queda la cadena.
        assert_eq!(unwrap_value(json!("5")), json!("5"));
        assert_eq!(unwrap_value(json!("{\"otro\": 1}")), json!("{\"otro\": 1}"));
    }

    #[test]
    fn null_se_conserva() {
        let row = json!({"email": null, "name": "Karim"});
        assert_eq!(normalize_record(row.clone()), row);
    }

    #[test]
    fn normalizar_dos_veces_es_estable() {
        let body = json!({
            "results": {"bindings": [
                {"a": {"value": 1}, "b": "texto", "c": null}
            ]}
        });
        let once = normalize_response(None, &body);
        let twice = normalize_response(None, &json!({"results": once.results.clone()}));
        assert_eq!(once.results, twice.results);
        assert_eq!(once.count, twice.count);
    }

    #[test]
    fn bindings_anidados_con_recuento() {
        let body = json!({"results": {"bindings": [
            {"a": {"value": 1}},
            {"a": {"value": 2}}
        ]}});
        let response = normalize_response(None, &body);
        assert_eq!(response.results, vec![json!({"a": 1}), json!({"a": 2})]);
        assert_eq!(response.count, 2);
    }

    #[test]
    fn cuerpo_vacio_da_lista_vacia() {
        let response = normalize_response(None, &json!({}));
        assert!(response.results.is_empty());
        assert_eq!(response.count, 0);
    }

    #[test]
    fn precedencia_de_formas() {
        // results.bindings gana a bindings de primer nivel.
        let body = json!({
            "results": {"bindings": [{"x": 1}]},
            "bindings": [{"x": 2}]
        });
        assert_eq!(extract_rows(&body), vec![json!({"x": 1})]);

        // bindings gana a results-lista.
        let body = json!({"bindings": [{"x": 2}], "results": [{"x": 3}]});
        assert_eq!(extract_rows(&body), vec![json!({"x": 2})]);

        // lista de primer nivel.
        assert_eq!(extract_rows(&json!([{"x": 4}])), vec![json!({"x": 4})]);

        // data como objeto único se envuelve.
        assert_eq!(
            extract_rows(&json!({"data": {"x": 5}})),
            vec![json!({"x": 5})]
        );

        // objeto sin forma reconocida: resultado único.
        assert_eq!(
            extract_rows(&json!({"x": 6})),
            vec![json!({"x": 6})]
        );

        // escalares sueltos no producen filas.
        assert!(extract_rows(&json!("texto")).is_empty());
        assert!(extract_rows(&json!(null)).is_empty());
    }

    #[test]
    fn clave_de_dominio_tiene_prioridad() {
        let body = json!({
            "transports": [{"transportId": "BIKE-1"}],
            "results": [{"x": 1}]
        });
        assert_eq!(
            extract_keyed_rows(&body, "transports"),
            vec![json!({"transportId": "BIKE-1"})]
        );
        // Sin la clave, cae en la política general.
        assert_eq!(extract_keyed_rows(&body, "seasons"), vec![json!({"x": 1})]);
    }

    #[test]
    fn query_se_propaga() {
        let body = json!({"results": []});
        let response = normalize_response(Some("actividades fáciles"), &body);
        assert_eq!(response.query.as_deref(), Some("actividades fáciles"));
        assert_eq!(response.count, 0);
    }

    #[test]
    fn filas_no_objeto_pasan_sin_tocar() {
        let body = json!({"results": ["a", 2, null]});
        let response = normalize_response(None, &body);
        assert_eq!(response.results, vec![json!("a"), json!(2), json!(null)]);
        assert_eq!(response.count, 3);
    }
}
