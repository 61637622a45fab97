use serde::Deserialize;
use std::env;

use crate::checkout::EstimatePolicy;

// Главная структура конфигурации - контейнер для всех настроек экрана
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub api: ApiConfig,
    pub pricing: PricingConfig,
    pub circuit_breaker: CircuitBreakerConfig,
}

// Настройки удалённого API
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_seconds: u64,
}

// Настройки ценообразования
#[derive(Debug, Clone, Deserialize)]
pub struct PricingConfig {
    /// Плоская цена для оценочного расчёта, в центах. Нарочно не совпадает
    /// ни с одной реальной базовой ценой.
    pub flat_fallback_price_cents: i64,
    pub estimate_policy: EstimatePolicy,
}

// Настройки Circuit Breaker
#[derive(Debug, Clone, Deserialize)]
pub struct CircuitBreakerConfig {
    pub failure_threshold: u32,
    pub cooldown_seconds: u64,
}

impl Config {
    pub fn from_env() -> Self {
        Config {
            api: ApiConfig {
                base_url: env::var("SEATING_API_BASE_URL")
                    .unwrap_or_else(|_| "http://localhost:8000/api".to_string()),
                timeout_seconds: env::var("SEATING_API_TIMEOUT_SECONDS")
                    .unwrap_or_else(|_| "30".to_string())
                    .parse()
                    .expect("SEATING_API_TIMEOUT_SECONDS must be a valid number"),
            },
            pricing: PricingConfig {
                flat_fallback_price_cents: env::var("FLAT_FALLBACK_PRICE_CENTS")
                    .unwrap_or_else(|_| "1099".to_string())
                    .parse()
                    .expect("FLAT_FALLBACK_PRICE_CENTS must be a valid number"),
                estimate_policy: match env::var("ESTIMATE_POLICY")
                    .unwrap_or_else(|_| "require_authoritative".to_string())
                    .as_str()
                {
                    "allow_estimate" => EstimatePolicy::AllowEstimate,
                    "require_authoritative" => EstimatePolicy::RequireAuthoritative,
                    other => panic!(
                        "ESTIMATE_POLICY must be allow_estimate or require_authoritative, got {}",
                        other
                    ),
                },
            },
            circuit_breaker: CircuitBreakerConfig {
                failure_threshold: env::var("CIRCUIT_BREAKER_FAILURE_THRESHOLD")
                    .unwrap_or_else(|_| "5".to_string())
                    .parse()
                    .expect("CIRCUIT_BREAKER_FAILURE_THRESHOLD must be a valid number"),
                cooldown_seconds: env::var("CIRCUIT_BREAKER_COOLDOWN_SECONDS")
                    .unwrap_or_else(|_| "60".to_string())
                    .parse()
                    .expect("CIRCUIT_BREAKER_COOLDOWN_SECONDS must be a valid number"),
            },
        }
    }

    // Загрузка .env перед чтением окружения (для dev-запусков и тестов)
    pub fn load() -> Self {
        dotenvy::dotenv().ok();
        Self::from_env()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiConfig {
                base_url: "http://localhost:8000/api".to_string(),
                timeout_seconds: 30,
            },
            pricing: PricingConfig {
                flat_fallback_price_cents: 1099,
                estimate_policy: EstimatePolicy::RequireAuthoritative,
            },
            circuit_breaker: CircuitBreakerConfig {
                failure_threshold: 5,
                cooldown_seconds: 60,
            },
        }
    }
}
