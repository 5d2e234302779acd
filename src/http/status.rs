//! # Códigos de Estado HTTP
//! src/http/status.rs
//!
//! Códigos de estado que emite el servidor. El conjunto es cerrado:
//!
//! - **2xx**: Éxito (200 OK, 201 Created)
//! - **4xx**: Error del cliente (400 Bad Request, 404 Not Found)

/// Representa los códigos de estado HTTP que soporta nuestro servidor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusCode {
    /// 200 OK - La petición fue exitosa
    #[default]
    Ok = 200,

    /// 201 Created - El archivo fue escrito
    Created = 201,

    /// 400 Bad Request - Request malformado o método no soportado
    BadRequest = 400,

    /// 404 Not Found - Ruta o archivo no encontrado
    NotFound = 404,
}

impl StatusCode {
    /// Convierte el código a su valor numérico
    ///
    /// # Ejemplo
    /// ```
    /// use http_pool_server::http::StatusCode;
    /// assert_eq!(StatusCode::Created.as_u16(), 201);
    /// ```
    pub fn as_u16(&self) -> u16 {
        *self as u16
    }

    /// Retorna el texto de razón (reason phrase) asociado al código
    ///
    /// # Ejemplo
    /// ```
    /// use http_pool_server::http::StatusCode;
    /// assert_eq!(StatusCode::Ok.reason_phrase(), "OK");
    /// assert_eq!(StatusCode::NotFound.reason_phrase(), "Not Found");
    /// ```
    pub fn reason_phrase(&self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::Created => "Created",
            StatusCode::BadRequest => "Bad Request",
            StatusCode::NotFound => "Not Found",
        }
    }

    /// Verifica si el código indica éxito (2xx)
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.as_u16())
    }

    /// Verifica si el código indica error del cliente (4xx)
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.as_u16())
    }
}

impl std::fmt::Display for StatusCode {
    /// Formato: "200 OK"
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.as_u16(), self.reason_phrase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_code_values() {
        assert_eq!(StatusCode::Ok.as_u16(), 200);
        assert_eq!(StatusCode::Created.as_u16(), 201);
        assert_eq!(StatusCode::BadRequest.as_u16(), 400);
        assert_eq!(StatusCode::NotFound.as_u16(), 404);
    }

    #[test]
    fn test_default_is_ok() {
        assert_eq!(StatusCode::default(), StatusCode::Ok);
    }

    #[test]
    fn test_categories() {
        assert!(StatusCode::Ok.is_success());
        assert!(StatusCode::Created.is_success());
        assert!(!StatusCode::NotFound.is_success());
        assert!(StatusCode::BadRequest.is_client_error());
        assert!(!StatusCode::Created.is_client_error());
    }

    #[test]
    fn test_display() {
        assert_eq!(StatusCode::Ok.to_string(), "200 OK");
        assert_eq!(StatusCode::Created.to_string(), "201 Created");
        assert_eq!(StatusCode::NotFound.to_string(), "404 Not Found");
    }
}
