/// Erros de parsing do protocolo RESP.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("frame incompleto")]
    Incomplete,
    #[error("byte de tipo inválido: {0:#x}")]
    InvalidFrameType(u8),
    #[error("inteiro inválido: {0}")]
    InvalidInteger(String),
    #[error("comprimento de bulk inválido: {0}")]
    InvalidBulkLength(i64),
    #[error("frame excede tamanho máximo ({0} bytes)")]
    FrameTooLarge(usize),
    #[error("encoding inválido: {0}")]
    InvalidEncoding(String),
}

/// Erros de um `Connection`, de qualquer um dos dois lados.
#[derive(Debug, thiserror::Error)]
pub enum ConnectionError {
    /// EOF no meio de um frame, ou antes da resposta de um request.
    #[error("conexão resetada pelo peer")]
    ConnectionReset,
    #[error("I/O: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

/// Frame recebido não forma um comando suportado.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("número errado de argumentos para '{0}'")]
    WrongArity(String),
    #[error("opção inválida para SET: {0}")]
    InvalidSetOption(String),
    #[error("argumento inválido: {0}")]
    InvalidArgument(String),
}

/// Erros vistos por quem consome o backend key-value.
///
/// `Unavailable` cobre tudo que acontece antes de existir uma sessão
/// utilizável (dial, TLS, AUTH, timeout). `Operation` cobre falhas de um
/// comando depois da sessão adquirida.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("backend indisponível: {0}")]
    Unavailable(String),
    #[error("falha na operação do backend: {0}")]
    Operation(String),
}

impl StoreError {
    pub fn unavailable(e: impl std::fmt::Display) -> Self {
        StoreError::Unavailable(e.to_string())
    }

    pub fn operation(e: impl std::fmt::Display) -> Self {
        StoreError::Operation(e.to_string())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
