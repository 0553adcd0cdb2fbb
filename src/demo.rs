//! Conjuntos de datos de demostración para el panel de analítica.
//!
//! Solo entran en juego con `DEMO_MODE` activo: sustituyen a una consulta de
//! analítica fallida o vacía para poder enseñar el panel sin un backend
//! poblado. Las filas ya están en forma canónica (escalares planos).

use serde_json::{json, Value};

pub fn carbon_stats() -> Vec<Value> {
    vec![
        json!({"activityName": "Beach Cleanup", "carbonFootprint": 5.2}),
        json!({"activityName": "Nature Walk", "carbonFootprint": 8.5}),
        json!({"activityName": "Kayaking", "carbonFootprint": 12.3}),
        json!({"activityName": "Mountain Biking", "carbonFootprint": 15.7}),
        json!({"activityName": "Rock Climbing", "carbonFootprint": 18.9}),
        json!({"activityName": "Safari Tour", "carbonFootprint": 45.2}),
        json!({"activityName": "Zip Lining", "carbonFootprint": 22.4}),
        json!({"activityName": "Camping", "carbonFootprint": 10.8}),
    ]
}

pub fn region_stats() -> Vec<Value> {
    vec![
        json!({"regionName": "Northern Mountains", "activityCount": 15, "avgCarbon": 18.5}),
        json!({"regionName": "Coastal Areas", "activityCount": 22, "avgCarbon": 12.3}),
        json!({"regionName": "Central Plains", "activityCount": 18, "avgCarbon": 15.7}),
        json!({"regionName": "Southern Beaches", "activityCount": 25, "avgCarbon": 20.4}),
        json!({"regionName": "Eastern Forests", "activityCount": 12, "avgCarbon": 10.8}),
        json!({"regionName": "Western Desert", "activityCount": 8, "avgCarbon": 25.6}),
    ]
}

pub fn top_eco_activities() -> Vec<Value> {
    vec![
        json!({"activityName": "Solar Farm Tour", "ecoScore": 95}),
        json!({"activityName": "Organic Farming", "ecoScore": 92}),
        json!({"activityName": "Beach Cleanup", "ecoScore": 88}),
        json!({"activityName": "Tree Planting", "ecoScore": 85}),
        json!({"activityName": "Wildlife Conservation", "ecoScore": 82}),
        json!({"activityName": "Recycling Workshop", "ecoScore": 78}),
    ]
}

pub fn activity_types() -> Vec<Value> {
    vec![
        json!({"type": "Hiking", "count": 45}),
        json!({"type": "Wildlife Watching", "count": 38}),
        json!({"type": "Water Sports", "count": 32}),
        json!({"type": "Cultural Tours", "count": 28}),
        json!({"type": "Adventure Sports", "count": 22}),
    ]
}

pub fn difficulty_distribution() -> Vec<Value> {
    vec![
        json!({"difficulty": "Easy", "count": 45}),
        json!({"difficulty": "Moderate", "count": 38}),
        json!({"difficulty": "Challenging", "count": 22}),
        json!({"difficulty": "Expert", "count": 12}),
    ]
}

#[cfg(test)]
mod tests {
    use crate::normalize::normalize_record;

    use super::*;

    #[test]
    fn las_filas_ya_estan_normalizadas() {
        let sets = [
            carbon_stats(),
            region_stats(),
            top_eco_activities(),
            activity_types(),
            difficulty_distribution(),
        ];
        for rows in sets {
            assert!(!rows.is_empty());
            for row in rows {
                assert_eq!(normalize_record(row.clone()), row);
            }
        }
    }
}
