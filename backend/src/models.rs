use serde::Serialize;

/// JSON envelope shared by the API endpoints.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
    pub timestamp: String,
    pub execution_time_ms: Option<u64>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        ApiResponse {
            success: true,
            data: Some(data),
            error: None,
            timestamp: chrono::Utc::now().to_rfc3339(),
            execution_time_ms: None,
        }
    }

    pub fn error(message: &str) -> Self {
        ApiResponse {
            success: false,
            data: None,
            error: Some(message.to_string()),
            timestamp: chrono::Utc::now().to_rfc3339(),
            execution_time_ms: None,
        }
    }

    pub fn with_elapsed(mut self, start: std::time::Instant) -> Self {
        self.execution_time_ms = Some(start.elapsed().as_millis() as u64);
        self
    }
}

#[derive(Debug, Serialize)]
pub struct Health {
    pub status: &'static str,
    pub version: &'static str,
}

impl Health {
    pub fn up() -> Self {
        Health {
            status: "ok",
            version: env!("CARGO_PKG_VERSION"),
        }
    }
}
