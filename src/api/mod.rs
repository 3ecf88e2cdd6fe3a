/// REST API module
///
/// This module handles:
/// - The typed async client (client.rs)
/// - The backend's endpoint paths, which are fixed by the server

pub mod client;

pub use client::ApiClient;

pub mod paths {
    pub const LOGIN: &str = "/login";
    pub const REGISTER: &str = "/register";

    pub const SERVICES: &str = "/servicos/";
    pub const EMPLOYEES: &str = "/funcionarios/";

    pub const APPOINTMENTS: &str = "/agendamentos/";
    pub const APPOINTMENTS_BY_MONTH: &str = "/agendamentos/mes/";
    pub const APPOINTMENTS_BY_DAY: &str = "/agendamentos/dia/";

    pub const PRODUCTS: &str = "/produtos/";
    pub const USERS: &str = "/users";

    pub fn appointment_status(id: i64) -> String {
        format!("/agendamentos/{}/status", id)
    }

    pub fn product_usage(id: i64) -> String {
        format!("/produtos/{}/uso", id)
    }

    pub fn user(id: i64) -> String {
        format!("/users/{}", id)
    }
}
