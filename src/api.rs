//! API Client Module
//!
//! HTTP communication with the MotoConnect REST backend. Each method issues
//! one request and returns a typed result; no retries, no queueing, no
//! deduplication of concurrent identical calls.

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{info, error, debug, warn};

use crate::auth::decode_token_claims;
use crate::vehicles::{Vehicle, VehicleModel};

const API_VERSION: &str = "v1";
const DEFAULT_PAGE_SIZE: u32 = 10;

const API_URL_ENV: &str = "MOTOCONNECT_API_URL";
const DEFAULT_API_URL: &str = "https://webapp-motoconnect-557884.azurewebsites.net/api";

/// API client for the MotoConnect backend
pub struct ApiClient {
    base_url: String,
    client: reqwest::Client,
}

impl ApiClient {
    /// Create a new API client. The versioned prefix is appended here.
    pub fn new(base_url: &str) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: format!("{}/{}", base_url.trim_end_matches('/'), API_VERSION),
            client,
        }
    }

    /// Create a client from the `MOTOCONNECT_API_URL` environment variable,
    /// falling back to the deployed backend
    pub fn from_env() -> Self {
        let base_url = std::env::var(API_URL_ENV)
            .unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        Self::new(&base_url)
    }

    // Vehicles

    /// Fetch one page of vehicles
    pub async fn list_vehicles(&self, page: PageRequest) -> Result<Page<Vehicle>, ApiError> {
        self.list("/Vehicles", page).await
    }

    /// Register a new vehicle
    pub async fn create_vehicle(&self, vehicle: &NewVehicle) -> Result<Vehicle, ApiError> {
        self.post("/Vehicles", vehicle).await
    }

    pub async fn get_vehicle(&self, id: &str) -> Result<Vehicle, ApiError> {
        self.get(&format!("/Vehicles/{}", id)).await
    }

    pub async fn update_vehicle(&self, id: &str, vehicle: &NewVehicle) -> Result<Vehicle, ApiError> {
        self.put(&format!("/Vehicles/{}", id), vehicle).await
    }

    pub async fn delete_vehicle(&self, id: &str) -> Result<(), ApiError> {
        self.delete(&format!("/Vehicles/{}", id)).await
    }

    // Users

    pub async fn list_users(&self, page: PageRequest) -> Result<Page<User>, ApiError> {
        self.list("/User", page).await
    }

    pub async fn create_user(&self, user: &NewUser) -> Result<User, ApiError> {
        self.post("/User", user).await
    }

    pub async fn get_user(&self, id: &str) -> Result<User, ApiError> {
        self.get(&format!("/User/{}", id)).await
    }

    pub async fn update_user(&self, id: &str, user: &NewUser) -> Result<User, ApiError> {
        self.put(&format!("/User/{}", id), user).await
    }

    pub async fn delete_user(&self, id: &str) -> Result<(), ApiError> {
        self.delete(&format!("/User/{}", id)).await
    }

    // Maintenance histories

    pub async fn list_histories(&self, page: PageRequest) -> Result<Page<MaintenanceHistory>, ApiError> {
        self.list("/Histories", page).await
    }

    pub async fn create_history(&self, history: &MaintenanceHistory) -> Result<MaintenanceHistory, ApiError> {
        self.post("/Histories", history).await
    }

    pub async fn get_history(&self, id: &str) -> Result<MaintenanceHistory, ApiError> {
        self.get(&format!("/Histories/{}", id)).await
    }

    pub async fn update_history(&self, id: &str, history: &MaintenanceHistory) -> Result<MaintenanceHistory, ApiError> {
        self.put(&format!("/Histories/{}", id), history).await
    }

    pub async fn delete_history(&self, id: &str) -> Result<(), ApiError> {
        self.delete(&format!("/Histories/{}", id)).await
    }

    // Auth

    /// Authenticate against `/Auth/login`.
    ///
    /// Never returns an error: every failure class is normalized into a
    /// `LoginOutcome` with `success: false` and a user-facing message. On
    /// success the JWT payload is decoded (without signature verification)
    /// purely to extract display fields.
    pub async fn login(&self, email: &str, password: &str) -> LoginOutcome {
        let url = format!("{}/Auth/login", self.base_url);
        debug!("API Request: POST /Auth/login");

        let response = match self.client
            .post(&url)
            .json(&LoginRequest { email, password })
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                error!("Login request failed: {}", e);
                return LoginOutcome::failure(
                    "Could not reach the server. Check your connection.",
                );
            }
        };

        let status = response.status();
        debug!("API Response: {} /Auth/login", status);

        if status == StatusCode::UNAUTHORIZED {
            let message = response.json::<ServerMessage>().await
                .ok()
                .and_then(|m| m.message)
                .unwrap_or_else(|| "Invalid email or password".to_string());
            return LoginOutcome::failure(&message);
        }

        if !status.is_success() {
            return LoginOutcome::failure("Error connecting to the server");
        }

        let body = match response.json::<LoginResponseBody>().await {
            Ok(body) => body,
            Err(e) => {
                error!("Login response parse failed: {}", e);
                return LoginOutcome::failure("Error connecting to the server");
            }
        };

        let Some(token) = body.token else {
            return LoginOutcome::failure("Error connecting to the server");
        };

        info!("Login succeeded for: {}", email);

        let user = decode_token_claims(&token).map(|claims| LoginUser {
            user_id: claims.sub.clone(),
            name: claims.name.clone(),
            email: if claims.email.is_empty() {
                email.to_string()
            } else {
                claims.email.clone()
            },
            user_type: claims.user_type_code(),
        });

        if user.is_none() {
            warn!("Login token payload could not be decoded");
        }

        LoginOutcome {
            success: true,
            message: "Login successful".to_string(),
            user,
            token: Some(token),
        }
    }

    /// Create a user account, converting a non-2xx into the server's error
    /// string when one is present
    pub async fn register_user(&self, user: &NewUser) -> Result<User, ApiError> {
        self.create_user(user).await.map_err(|e| match e {
            ApiError::Server(msg) if msg.is_empty() => {
                ApiError::Server("Error registering user".to_string())
            }
            other => other,
        })
    }

    // Request plumbing

    async fn list<T: DeserializeOwned>(&self, path: &str, page: PageRequest) -> Result<Page<T>, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("API Request: GET {} (page {}, pageSize {})", path, page.page, page.page_size);

        let response = self.client
            .get(&url)
            .query(&[("page", page.page), ("pageSize", page.page_size)])
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        let status = response.status();
        debug!("API Response: {} {}", status, path);

        if !status.is_success() {
            return Err(self.server_error(response).await);
        }

        let pagination_header = response
            .headers()
            .get("x-pagination")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let items = response.json::<Vec<T>>().await
            .map_err(|e| ApiError::Parse(e.to_string()))?;

        let (total_pages, authoritative) =
            parse_total_pages(pagination_header.as_deref(), items.len(), page.page_size);

        Ok(Page { items, total_pages, authoritative })
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("API Request: GET {}", path);

        let response = self.client
            .get(&url)
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        self.read_json(path, response).await
    }

    async fn post<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("API Request: POST {}", path);

        let response = self.client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        self.read_json(path, response).await
    }

    async fn put<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("API Request: PUT {}", path);

        let response = self.client
            .put(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        self.read_json(path, response).await
    }

    async fn delete(&self, path: &str) -> Result<(), ApiError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("API Request: DELETE {}", path);

        let response = self.client
            .delete(&url)
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        let status = response.status();
        debug!("API Response: {} {}", status, path);

        if !status.is_success() {
            return Err(self.server_error(response).await);
        }

        Ok(())
    }

    async fn read_json<T: DeserializeOwned>(&self, path: &str, response: reqwest::Response) -> Result<T, ApiError> {
        let status = response.status();
        debug!("API Response: {} {}", status, path);

        if !status.is_success() {
            return Err(self.server_error(response).await);
        }

        response.json::<T>().await
            .map_err(|e| ApiError::Parse(e.to_string()))
    }

    async fn server_error(&self, response: reqwest::Response) -> ApiError {
        let status = response.status();
        let message = response.json::<ServerMessage>().await
            .ok()
            .and_then(|m| m.error.or(m.message))
            .unwrap_or_else(|| format!("Status: {}", status));

        error!("API error response: {} ({})", message, status);
        ApiError::Server(message)
    }
}

/// Pagination query parameters, accepted from the frontend with either
/// field omitted
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PageRequest {
    pub page: u32,
    pub page_size: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self { page: 1, page_size: DEFAULT_PAGE_SIZE }
    }
}

/// One fetched page plus what we know about the total.
///
/// `authoritative` is true when the server supplied an `x-pagination`
/// header; otherwise `total_pages` is estimated from this page alone and is
/// only a lower bound.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total_pages: u32,
    pub authoritative: bool,
}

/// Derive the page count from the `x-pagination` header when present,
/// falling back to an estimate from the returned page length
pub fn parse_total_pages(header: Option<&str>, page_len: usize, page_size: u32) -> (u32, bool) {
    if let Some(raw) = header {
        match serde_json::from_str::<PaginationHeader>(raw) {
            Ok(info) => return (info.total_pages.max(1), true),
            Err(e) => warn!("Malformed x-pagination header: {}", e),
        }
    }

    let size = page_size.max(1);
    let estimated = (page_len as u32 + size - 1) / size;
    (estimated.max(1), false)
}

#[derive(Debug, Deserialize)]
struct PaginationHeader {
    #[serde(rename = "TotalPages")]
    total_pages: u32,
}

// Request/Response types

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct LoginResponseBody {
    token: Option<String>,
}

/// Normalized login result handed to the frontend
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginOutcome {
    pub success: bool,
    pub message: String,
    pub user: Option<LoginUser>,
    pub token: Option<String>,
}

impl LoginOutcome {
    fn failure(message: &str) -> Self {
        Self {
            success: false,
            message: message.to_string(),
            user: None,
            token: None,
        }
    }
}

/// Display fields for the logged-in user, decoded from the token payload
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginUser {
    pub user_id: String,
    pub name: String,
    pub email: String,
    pub user_type: i32,
}

/// Vehicle payload for create/update
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewVehicle {
    pub license_plate: String,
    pub vehicle_model: VehicleModel,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(default, rename = "userID", skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub name: String,
    pub email: String,
    #[serde(rename = "type")]
    pub user_type: i32,
}

/// User payload for account creation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default, rename = "type")]
    pub user_type: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaintenanceHistory {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub vehicle_id: String,
    pub description: String,
    pub date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost: Option<f64>,
}

#[derive(Deserialize)]
struct ServerMessage {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// API errors
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Server error: {0}")]
    Server(String),

    #[error("Parse error: {0}")]
    Parse(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_total_pages_is_authoritative() {
        let header = r#"{"TotalPages": 7, "CurrentPage": 2}"#;
        assert_eq!(parse_total_pages(Some(header), 10, 10), (7, true));
    }

    #[test]
    fn missing_header_estimates_from_page_length() {
        assert_eq!(parse_total_pages(None, 10, 10), (1, false));
        assert_eq!(parse_total_pages(None, 3, 10), (1, false));
    }

    #[test]
    fn malformed_header_falls_back_to_estimate() {
        assert_eq!(parse_total_pages(Some("not json"), 10, 10), (1, false));
        assert_eq!(parse_total_pages(Some(r#"{"Other": 3}"#), 10, 10), (1, false));
    }

    #[test]
    fn empty_page_still_reports_one_page() {
        assert_eq!(parse_total_pages(None, 0, 10), (1, false));
    }

    #[test]
    fn page_request_defaults_match_list_screen() {
        let page = PageRequest::default();
        assert_eq!(page.page, 1);
        assert_eq!(page.page_size, 10);
    }

    #[test]
    fn page_request_deserializes_with_omitted_fields() {
        let page: PageRequest = serde_json::from_str(r#"{"page": 3}"#).unwrap();
        assert_eq!(page.page, 3);
        assert_eq!(page.page_size, 10);

        let empty: PageRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(empty.page, 1);

        let full: PageRequest = serde_json::from_str(r#"{"page": 2, "pageSize": 25}"#).unwrap();
        assert_eq!(full.page_size, 25);
    }

    #[test]
    fn from_env_reads_the_override_and_falls_back() {
        std::env::set_var(API_URL_ENV, "http://localhost:3000/api/");
        let client = ApiClient::from_env();
        assert_eq!(client.base_url, "http://localhost:3000/api/v1");

        std::env::remove_var(API_URL_ENV);
        let client = ApiClient::from_env();
        assert_eq!(client.base_url, format!("{}/v1", DEFAULT_API_URL));
    }

    #[test]
    fn base_url_gets_version_prefix() {
        let client = ApiClient::new("https://api.example.com/");
        assert_eq!(client.base_url, "https://api.example.com/v1");
    }

    #[test]
    fn vehicle_payload_uses_wire_names() {
        let vehicle = NewVehicle {
            license_plate: "ABC1234".into(),
            vehicle_model: VehicleModel::Sport,
        };
        let json = serde_json::to_value(&vehicle).unwrap();
        assert_eq!(json["licensePlate"], "ABC1234");
        assert_eq!(json["vehicleModel"], "SPORT");
    }

    #[test]
    fn user_type_serializes_as_type() {
        let user = NewUser {
            name: "Rider".into(),
            email: "rider@fleet.com".into(),
            password: "secret123".into(),
            user_type: 0,
        };
        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["type"], 0);
        assert!(json.get("userType").is_none());
    }
}
