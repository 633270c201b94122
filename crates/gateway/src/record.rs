use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::GatewayError;

/// Durações aceitas, em minutos: 10 min, 30 min, 1 h, 1 dia, 1 semana.
pub const ALLOWED_EXPIRY_MINUTES: [u32; 5] = [10, 30, 60, 1440, 10080];

pub(crate) const MISSING_FIELDS: &str = "Code, language, title, and expiry time are required";
pub(crate) const INVALID_EXPIRY: &str = "Invalid expiry time. Please choose a valid value.";
pub(crate) const NOT_AN_OBJECT: &str = "Request body must be a JSON object";

/// Documento gravado no backend e devolvido na leitura.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasteRecord {
    pub title: String,
    pub code: String,
    pub language: String,
    pub expiry_time: String,
}

/// Duração pertencente a [`ALLOWED_EXPIRY_MINUTES`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpiryMinutes(u32);

impl ExpiryMinutes {
    pub fn minutes(self) -> u32 {
        self.0
    }

    pub fn ttl_secs(self) -> u64 {
        u64::from(self.0) * 60
    }
}

impl TryFrom<i64> for ExpiryMinutes {
    type Error = GatewayError;

    fn try_from(minutes: i64) -> Result<Self, Self::Error> {
        ALLOWED_EXPIRY_MINUTES
            .iter()
            .copied()
            .find(|&allowed| i64::from(allowed) == minutes)
            .map(ExpiryMinutes)
            .ok_or_else(|| GatewayError::InvalidRequest(INVALID_EXPIRY.into()))
    }
}

/// Pedido de criação já validado.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPaste {
    pub code: String,
    pub language: String,
    pub title: String,
    pub expiry: ExpiryMinutes,
}

impl NewPaste {
    /// Valida o corpo `{code, language, title, expiryTime}`.
    ///
    /// Campo ausente, `null` ou string vazia conta como faltando.
    /// `expiryTime` pode vir como inteiro JSON ou string decimal.
    pub fn from_json(body: &Value) -> Result<Self, GatewayError> {
        let Value::Object(fields) = body else {
            return Err(GatewayError::InvalidRequest(NOT_AN_OBJECT.into()));
        };

        let code = required_text(fields.get("code"))?;
        let language = required_text(fields.get("language"))?;
        let title = required_text(fields.get("title"))?;
        let minutes = expiry_minutes(fields.get("expiryTime"))?;

        Ok(Self {
            code,
            language,
            title,
            expiry: ExpiryMinutes::try_from(minutes)?,
        })
    }
}

fn missing() -> GatewayError {
    GatewayError::InvalidRequest(MISSING_FIELDS.into())
}

fn required_text(value: Option<&Value>) -> Result<String, GatewayError> {
    match value {
        Some(Value::String(s)) if !s.is_empty() => Ok(s.clone()),
        _ => Err(missing()),
    }
}

fn expiry_minutes(value: Option<&Value>) -> Result<i64, GatewayError> {
    let invalid = || GatewayError::InvalidRequest(INVALID_EXPIRY.into());
    match value {
        None | Some(Value::Null) => Err(missing()),
        Some(Value::String(s)) if s.trim().is_empty() => Err(missing()),
        Some(Value::String(s)) => s.trim().parse::<i64>().map_err(|_| invalid()),
        Some(Value::Number(n)) => match n.as_i64() {
            Some(m) => Ok(m),
            None => n
                .as_f64()
                .filter(|f| f.fract() == 0.0 && f.abs() < 1e12)
                .map(|f| f as i64)
                .ok_or_else(invalid),
        },
        Some(_) => Err(invalid()),
    }
}
