/// Shared data structures for the application state
///
/// These structs mirror the JSON the salon backend sends and accepts.
/// The client only ever holds read-only, possibly stale copies.
use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::access::Role;

/// Products below this quantity are flagged as running low
pub const LOW_STOCK_THRESHOLD: i64 = 5;

/// Units offered when registering a product
pub const PRODUCT_UNITS: &[&str] = &["un", "ml", "L", "kg", "cx"];

/// Appointment lifecycle as stored by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AppointmentStatus {
    #[serde(rename = "agendado")]
    Scheduled,
    #[serde(rename = "concluido")]
    Completed,
    #[serde(rename = "cancelado")]
    Cancelled,
}

impl AppointmentStatus {
    /// Value used in query strings
    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Scheduled => "agendado",
            AppointmentStatus::Completed => "concluido",
            AppointmentStatus::Cancelled => "cancelado",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AppointmentStatus::Scheduled => "Scheduled",
            AppointmentStatus::Completed => "Completed",
            AppointmentStatus::Cancelled => "Cancelled",
        }
    }
}

/// A booked appointment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: i64,
    pub client_name: String,
    pub service_id: i64,
    /// Older rows were created before a professional was mandatory
    #[serde(default)]
    pub employee_id: Option<i64>,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub status: AppointmentStatus,
}

/// A service on the salon's menu
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Service {
    pub id: i64,
    pub name: String,
    pub price: f64,
    pub duration_minutes: u32,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_active")]
    pub active: bool,
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - {} ({}min)",
            self.name,
            format_money(self.price),
            self.duration_minutes
        )
    }
}

/// A professional who can be booked
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    pub id: i64,
    pub name: String,
    #[serde(default = "default_commission")]
    pub commission_percent: f64,
}

impl fmt::Display for Employee {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// A stock item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub quantity: i64,
    pub unit: String,
}

impl Product {
    pub fn is_low_stock(&self) -> bool {
        self.quantity < LOW_STOCK_THRESHOLD
    }
}

/// A user account as listed on the team screen
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamMember {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: Role,
}

/// Token issued by `/login` and `/register`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub token_type: String,
    pub user_name: String,
    pub role: Role,
}

#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Self-registration from the login screen (the backend assigns `client`)
#[derive(Debug, Clone, Serialize)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Staff account created from the team screen
#[derive(Debug, Clone, Serialize)]
pub struct NewMember {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewAppointment {
    pub client_name: String,
    pub service_id: i64,
    pub employee_id: i64,
    pub start_time: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewProduct {
    pub name: String,
    pub quantity: i64,
    pub unit: String,
}

impl NewProduct {
    /// A product needs a name and a non-negative starting quantity
    pub fn is_valid(&self) -> bool {
        !self.name.trim().is_empty() && self.quantity >= 0
    }
}

/// Format an amount of money for display
pub fn format_money(amount: f64) -> String {
    format!("R$ {:.2}", amount)
}

fn default_active() -> bool {
    true
}

fn default_commission() -> f64 {
    30.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_appointment_from_backend_json() {
        let json = r#"{
            "id": 7,
            "client_name": "Ana",
            "service_id": 2,
            "employee_id": 3,
            "start_time": "2026-01-20T14:00:00",
            "end_time": "2026-01-20T14:45:00",
            "status": "agendado"
        }"#;

        let appointment: Appointment = serde_json::from_str(json).unwrap();

        assert_eq!(appointment.employee_id, Some(3));
        assert_eq!(appointment.status, AppointmentStatus::Scheduled);
        assert_eq!(
            appointment.start_time,
            NaiveDate::from_ymd_opt(2026, 1, 20)
                .unwrap()
                .and_hms_opt(14, 0, 0)
                .unwrap()
        );
    }

    #[test]
    fn test_appointment_without_employee() {
        let json = r#"{"id":1,"client_name":"Bia","service_id":1,
            "start_time":"2026-01-20T09:00:00","end_time":"2026-01-20T09:30:00",
            "status":"concluido"}"#;

        let appointment: Appointment = serde_json::from_str(json).unwrap();

        assert_eq!(appointment.employee_id, None);
        assert_eq!(appointment.status, AppointmentStatus::Completed);
    }

    #[test]
    fn test_new_appointment_start_time_format() {
        let new = NewAppointment {
            client_name: "Ana".into(),
            service_id: 1,
            employee_id: 3,
            start_time: NaiveDate::from_ymd_opt(2026, 1, 20)
                .unwrap()
                .and_hms_opt(10, 30, 0)
                .unwrap(),
        };

        let json = serde_json::to_value(&new).unwrap();
        assert_eq!(json["start_time"], "2026-01-20T10:30:00");
    }

    #[test]
    fn test_service_defaults_and_label() {
        let service: Service = serde_json::from_str(
            r#"{"id":1,"name":"Haircut","price":45.5,"duration_minutes":30}"#,
        )
        .unwrap();

        assert!(service.active);
        assert_eq!(service.description, None);
        assert_eq!(service.to_string(), "Haircut - R$ 45.50 (30min)");
    }

    #[test]
    fn test_employee_default_commission() {
        let employee: Employee = serde_json::from_str(r#"{"id":3,"name":"Carla"}"#).unwrap();
        assert_eq!(employee.commission_percent, 30.0);
    }

    #[test]
    fn test_low_stock() {
        let mut product = Product {
            id: 1,
            name: "Shampoo".into(),
            quantity: 5,
            unit: "un".into(),
        };
        assert!(!product.is_low_stock());

        product.quantity = 4;
        assert!(product.is_low_stock());
    }

    #[test]
    fn test_new_product_validation() {
        let mut product = NewProduct {
            name: "  ".into(),
            quantity: 3,
            unit: "ml".into(),
        };
        assert!(!product.is_valid());

        product.name = "Conditioner".into();
        assert!(product.is_valid());

        product.quantity = -1;
        assert!(!product.is_valid());
    }
}
