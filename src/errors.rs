use thiserror::Error;

/// Ошибки ядра выбора мест. Ни одна из них не фатальна для приложения:
/// всё восстанавливается повторной загрузкой данных или повторным действием
/// пользователя.
#[derive(Debug, Error)]
pub enum SeatingError {
    /// Пользователь попытался перейти к оплате без выбранных мест.
    /// Состояние выбора при этом не меняется.
    #[error("selection is empty - at least one seat is required to proceed")]
    EmptySelection,

    /// Не удалось загрузить схему зала или занятые места.
    /// Сетка мест остаётся неинтерактивной до успешной повторной загрузки.
    #[error("seating data is unavailable: {0}")]
    DataUnavailable(String),

    /// Авторитетный расчёт цены недоступен; вызывающая сторона переходит
    /// на оценочную цену (flat fallback), это не жёсткая ошибка.
    #[error("authoritative price quote is unavailable")]
    QuoteUnavailable,

    /// Политика требует авторитетную цену, а текущая — оценочная.
    #[error("price is an estimate - an authoritative quote is required at checkout")]
    EstimateNotAccepted,

    /// Строковый идентификатор места с границы API не разбирается.
    #[error("invalid seat identifier '{0}'")]
    SeatIdParse(String),

    /// Схема зала от провайдера не проходит валидацию.
    #[error("invalid seating layout: {0}")]
    InvalidLayout(String),

    /// Circuit breaker разомкнут: запросы к API временно блокируются локально.
    #[error("circuit breaker is open - remote API temporarily unavailable")]
    CircuitOpen,

    /// Транспортная ошибка HTTP-клиента.
    #[error("api request failed: {0}")]
    Http(#[from] reqwest::Error),
}
