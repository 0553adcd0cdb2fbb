//! Carga y gestión de configuración de la aplicación (backend REST + servidor web).

use std::env;
use anyhow::{anyhow, Result};

/// Configuración completa de la aplicación.
#[derive(Clone, Debug)]
pub struct AppConfig {
    /// Origen del backend REST de ecoturismo (FastAPI + Fuseki).
    pub api_base_url: String,
    /// Dirección de escucha del servidor web local.
    pub server_addr: String,
    /// Modo demo: sustituye datos de analítica vacíos o fallidos por
    /// conjuntos de demostración. Desactivado por defecto.
    pub demo_mode: bool,
}

impl AppConfig {
    /// Carga la configuración desde variables de entorno (usando .env si existe).
    pub fn from_env() -> Result<Self> {
        let api_base_url = env::var("ECOTOUR_API_URL")
            .unwrap_or_else(|_| "http://localhost:8000".to_string());

        let server_addr =
            env::var("SERVER_ADDR").unwrap_or_else(|_| "127.0.0.1:3344".to_string());

        let demo_mode = match env::var("DEMO_MODE") {
            Ok(raw) => parse_flag(&raw)
                .ok_or_else(|| anyhow!("Valor no reconocido para DEMO_MODE: {raw}"))?,
            Err(_) => false,
        };

        Ok(Self {
            api_base_url,
            server_addr,
            demo_mode,
        })
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::parse_flag;

    #[test]
    fn flags_reconocidos() {
        assert_eq!(parse_flag("true"), Some(true));
        assert_eq!(parse_flag("1"), Some(true));
        assert_eq!(parse_flag("ON"), Some(true));
        assert_eq!(parse_flag("false"), Some(false));
        assert_eq!(parse_flag(""), Some(false));
        assert_eq!(parse_flag("quizás"), None);
    }
}
