use chrono::NaiveDate;
use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::paths;
use crate::error::{Error, Result};
use crate::state::data::{
    Appointment, AppointmentStatus, AuthResponse, Credentials, Employee, NewAppointment,
    NewMember, NewProduct, Product, Registration, Service, TeamMember,
};

/// Async client for the salon REST API.
///
/// Cheap to clone: every screen keeps its own copy and moves clones into
/// the futures it hands to iced.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();

        ApiClient {
            http: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
        }
    }

    /// Same client, authenticated with `token`
    pub fn with_token(&self, token: Option<String>) -> Self {
        ApiClient {
            http: self.http.clone(),
            base_url: self.base_url.clone(),
            token,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.http.request(method, self.url(path));

        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Send and decode a JSON body
    async fn send<T: DeserializeOwned>(builder: RequestBuilder) -> Result<T> {
        let response = Self::check(builder).await?;
        Ok(response.json::<T>().await?)
    }

    /// Send and ignore the body of a successful response
    async fn send_discard(builder: RequestBuilder) -> Result<()> {
        Self::check(builder).await.map(|_| ())
    }

    async fn check(builder: RequestBuilder) -> Result<reqwest::Response> {
        let response = builder.send().await?;
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let error = Error::from_response(status.as_u16(), &body);
        tracing::debug!("{} -> {}: {}", status, error, body);

        Err(error)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        Self::send(self.request(Method::GET, path)).await
    }

    async fn post<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        Self::send(self.request(Method::POST, path).json(body)).await
    }

    // ---- authentication ----

    pub async fn login(&self, credentials: &Credentials) -> Result<AuthResponse> {
        self.post(paths::LOGIN, credentials).await
    }

    /// Self-registration; returns a token for the new account
    pub async fn register(&self, registration: &Registration) -> Result<AuthResponse> {
        self.post(paths::REGISTER, registration).await
    }

    /// Create a staff account. The token issued for it is not used.
    pub async fn register_member(&self, member: &NewMember) -> Result<()> {
        Self::send_discard(self.request(Method::POST, paths::REGISTER).json(member)).await
    }

    // ---- reference data ----

    pub async fn services(&self) -> Result<Vec<Service>> {
        self.get(paths::SERVICES).await
    }

    pub async fn employees(&self) -> Result<Vec<Employee>> {
        self.get(paths::EMPLOYEES).await
    }

    // ---- appointments ----

    pub async fn appointments(&self) -> Result<Vec<Appointment>> {
        self.get(paths::APPOINTMENTS).await
    }

    /// Non-cancelled appointments starting in the given month
    pub async fn appointments_for_month(&self, year: i32, month: u32) -> Result<Vec<Appointment>> {
        let builder = self
            .request(Method::GET, paths::APPOINTMENTS_BY_MONTH)
            .query(&[("ano", year.to_string()), ("mes", month.to_string())]);

        Self::send(builder).await
    }

    /// Non-cancelled appointments of one professional on one day
    pub async fn appointments_for_day(
        &self,
        date: NaiveDate,
        employee_id: i64,
    ) -> Result<Vec<Appointment>> {
        let builder = self
            .request(Method::GET, paths::APPOINTMENTS_BY_DAY)
            .query(&[
                ("data", date.format("%Y-%m-%d").to_string()),
                ("employee_id", employee_id.to_string()),
            ]);

        Self::send(builder).await
    }

    pub async fn create_appointment(&self, appointment: &NewAppointment) -> Result<Appointment> {
        self.post(paths::APPOINTMENTS, appointment).await
    }

    pub async fn update_appointment_status(
        &self,
        id: i64,
        status: AppointmentStatus,
    ) -> Result<Appointment> {
        let builder = self
            .request(Method::PATCH, &paths::appointment_status(id))
            .query(&[("status", status.as_str())]);

        Self::send(builder).await
    }

    // ---- stock ----

    pub async fn products(&self) -> Result<Vec<Product>> {
        self.get(paths::PRODUCTS).await
    }

    pub async fn create_product(&self, product: &NewProduct) -> Result<Product> {
        self.post(paths::PRODUCTS, product).await
    }

    /// Take `quantity` units out of stock
    pub async fn use_product(&self, id: i64, quantity: i64) -> Result<Product> {
        let builder = self
            .request(Method::POST, &paths::product_usage(id))
            .query(&[("quantidade", quantity)]);

        Self::send(builder).await
    }

    // ---- team ----

    pub async fn users(&self) -> Result<Vec<TeamMember>> {
        self.get(paths::USERS).await
    }

    pub async fn delete_user(&self, id: i64) -> Result<()> {
        Self::send_discard(self.request(Method::DELETE, &paths::user(id))).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_is_normalized() {
        let api = ApiClient::new("http://localhost:8000/");
        assert_eq!(api.base_url(), "http://localhost:8000");
        assert_eq!(api.url(paths::SERVICES), "http://localhost:8000/servicos/");
    }

    #[test]
    fn test_with_token() {
        let api = ApiClient::new("http://localhost:8000");
        assert!(!api.is_authenticated());

        let signed_in = api.with_token(Some("abc".into()));
        assert!(signed_in.is_authenticated());
        assert_eq!(signed_in.base_url(), api.base_url());
    }

    #[test]
    fn test_bearer_header() {
        let api = ApiClient::new("http://localhost:8000").with_token(Some("abc".into()));
        let request = api.request(Method::GET, paths::USERS).build().unwrap();

        assert_eq!(
            request.headers().get(reqwest::header::AUTHORIZATION).unwrap(),
            "Bearer abc"
        );
        assert_eq!(request.url().as_str(), "http://localhost:8000/users");
    }

    #[test]
    fn test_day_query() {
        let api = ApiClient::new("http://localhost:8000");
        let request = api
            .request(Method::GET, paths::APPOINTMENTS_BY_DAY)
            .query(&[("data", "2026-01-20"), ("employee_id", "3")])
            .build()
            .unwrap();

        assert_eq!(request.url().query(), Some("data=2026-01-20&employee_id=3"));
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_network_error() {
        // Port 9 (discard) is closed on any sane test machine
        let api = ApiClient::new("http://127.0.0.1:9");

        let result = api.services().await;

        assert!(matches!(result, Err(Error::Network(_))));
    }
}
