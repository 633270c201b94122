use std::fmt;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

use crate::GatewayError;

const SEPARATOR: char = '-';
const KEY_PREFIX: &str = "file:";
const KEY_SUFFIX: &str = ":data";

/// Tudo fora dos caracteres não reservados de RFC 3986 vira `%XX`.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Handle externo de um paste: `<language>-<id>`.
///
/// O parse corta no *primeiro* `-`. Como a chave de storage é montada
/// juntando as duas partes de volta com o mesmo separador, a chave
/// reconstruída é idêntica à gravada mesmo quando a linguagem contém `-`;
/// só a divisão language/id recuperada é que muda nesse caso.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locator {
    pub language: String,
    pub id: String,
}

impl Locator {
    pub fn new(language: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            id: id.into(),
        }
    }

    /// Locator sem separador não pode ter sido emitido por um Create.
    pub fn parse(file_id: &str) -> Result<Self, GatewayError> {
        let (language, id) = file_id
            .split_once(SEPARATOR)
            .ok_or(GatewayError::NotFound)?;
        Ok(Self::new(language, id))
    }

    pub fn storage_key(&self) -> String {
        storage_key(&self.language, &self.id)
    }

    /// Caminho HTTP de leitura do paste. A linguagem é livre (`c#`, `a/b`),
    /// então o locator vai percent-encoded num único segmento.
    pub fn path(&self) -> String {
        format!(
            "/file/{}",
            utf8_percent_encode(&self.to_string(), PATH_SEGMENT)
        )
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{SEPARATOR}{}", self.language, self.id)
    }
}

/// `file:<language>-<id>:data`
pub fn storage_key(language: &str, id: &str) -> String {
    format!("{KEY_PREFIX}{language}{SEPARATOR}{id}{KEY_SUFFIX}")
}
