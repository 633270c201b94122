use ttlpaste_common::StoreError;

/// Resultado visível ao cliente de uma operação do gateway.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("{0}")]
    InvalidRequest(String),
    #[error("backend indisponível: {0}")]
    BackendUnavailable(String),
    #[error("operação no backend falhou: {0}")]
    BackendOperationFailed(String),
    #[error("paste não encontrado")]
    NotFound,
    #[error("paste expirado")]
    Expired,
}

impl From<StoreError> for GatewayError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Unavailable(msg) => GatewayError::BackendUnavailable(msg),
            StoreError::Operation(msg) => GatewayError::BackendOperationFailed(msg),
        }
    }
}
