/// Commission summary over completed appointments
use std::collections::HashMap;

use crate::state::data::{Appointment, AppointmentStatus, Employee, Service};

/// Salon-wide totals
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Summary {
    pub revenue: f64,
    pub commissions: f64,
    pub net: f64,
    /// All completed appointments, priced or not
    pub completed: usize,
}

/// What one professional is owed
#[derive(Debug, Clone, PartialEq)]
pub struct Payout {
    pub employee_id: i64,
    pub name: String,
    pub completed: usize,
    pub commission_percent: f64,
    pub amount: f64,
}

fn commission(price: f64, percent: f64) -> f64 {
    price * percent / 100.0
}

fn completed(appointments: &[Appointment]) -> impl Iterator<Item = &Appointment> {
    appointments
        .iter()
        .filter(|a| a.status == AppointmentStatus::Completed)
}

/// Revenue and commissions of completed work.
///
/// An appointment whose service or professional is unknown still counts as
/// completed but contributes no money.
pub fn summarize(
    appointments: &[Appointment],
    services: &[Service],
    employees: &[Employee],
) -> Summary {
    let prices: HashMap<i64, f64> = services.iter().map(|s| (s.id, s.price)).collect();
    let rates: HashMap<i64, f64> = employees
        .iter()
        .map(|e| (e.id, e.commission_percent))
        .collect();

    let mut summary = Summary::default();

    for appointment in completed(appointments) {
        summary.completed += 1;

        let price = prices.get(&appointment.service_id);
        let rate = appointment.employee_id.and_then(|id| rates.get(&id));

        if let (Some(&price), Some(&rate)) = (price, rate) {
            summary.revenue += price;
            summary.commissions += commission(price, rate);
        }
    }

    summary.net = summary.revenue - summary.commissions;
    summary
}

/// One row per professional, in the order the backend listed them
pub fn payouts(
    appointments: &[Appointment],
    services: &[Service],
    employees: &[Employee],
) -> Vec<Payout> {
    let prices: HashMap<i64, f64> = services.iter().map(|s| (s.id, s.price)).collect();

    employees
        .iter()
        .map(|employee| {
            let done: Vec<&Appointment> = completed(appointments)
                .filter(|a| a.employee_id == Some(employee.id))
                .collect();

            let amount = done
                .iter()
                .filter_map(|a| prices.get(&a.service_id))
                .map(|price| commission(*price, employee.commission_percent))
                .sum();

            Payout {
                employee_id: employee.id,
                name: employee.name.clone(),
                completed: done.len(),
                commission_percent: employee.commission_percent,
                amount,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn service(id: i64, price: f64) -> Service {
        Service {
            id,
            name: format!("service {}", id),
            price,
            duration_minutes: 30,
            description: None,
            active: true,
        }
    }

    fn employee(id: i64, commission_percent: f64) -> Employee {
        Employee {
            id,
            name: format!("employee {}", id),
            commission_percent,
        }
    }

    fn appointment(
        id: i64,
        service_id: i64,
        employee_id: Option<i64>,
        status: AppointmentStatus,
    ) -> Appointment {
        let start = NaiveDate::from_ymd_opt(2026, 1, 20)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        Appointment {
            id,
            client_name: "Ana".into(),
            service_id,
            employee_id,
            start_time: start,
            end_time: start,
            status,
        }
    }

    #[test]
    fn test_summary_of_completed_work() {
        let services = vec![service(1, 100.0)];
        let employees = vec![employee(3, 40.0)];
        let appointments = vec![
            appointment(1, 1, Some(3), AppointmentStatus::Completed),
            appointment(2, 1, Some(3), AppointmentStatus::Completed),
            appointment(3, 1, Some(3), AppointmentStatus::Scheduled),
            appointment(4, 1, Some(3), AppointmentStatus::Cancelled),
        ];

        let summary = summarize(&appointments, &services, &employees);

        assert_eq!(summary.completed, 2);
        assert!((summary.revenue - 200.0).abs() < 1e-9);
        assert!((summary.commissions - 80.0).abs() < 1e-9);
        assert!((summary.net - 120.0).abs() < 1e-9);
    }

    #[test]
    fn test_unknown_references_count_but_earn_nothing() {
        let services = vec![service(1, 50.0)];
        let employees = vec![employee(3, 50.0)];
        let appointments = vec![
            appointment(1, 99, Some(3), AppointmentStatus::Completed),
            appointment(2, 1, None, AppointmentStatus::Completed),
            appointment(3, 1, Some(3), AppointmentStatus::Completed),
        ];

        let summary = summarize(&appointments, &services, &employees);

        assert_eq!(summary.completed, 3);
        assert!((summary.revenue - 50.0).abs() < 1e-9);
        assert!((summary.commissions - 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_payouts_per_employee() {
        let services = vec![service(1, 80.0), service(2, 20.0)];
        let employees = vec![employee(3, 50.0), employee(4, 10.0)];
        let appointments = vec![
            appointment(1, 1, Some(3), AppointmentStatus::Completed),
            appointment(2, 2, Some(3), AppointmentStatus::Completed),
            appointment(3, 99, Some(3), AppointmentStatus::Completed),
            appointment(4, 1, Some(4), AppointmentStatus::Scheduled),
        ];

        let rows = payouts(&appointments, &services, &employees);

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].completed, 3);
        assert!((rows[0].amount - 50.0).abs() < 1e-9);
        assert_eq!(rows[1].completed, 0);
        assert_eq!(rows[1].amount, 0.0);
    }

    #[test]
    fn test_empty_inputs() {
        assert_eq!(summarize(&[], &[], &[]), Summary::default());
        assert!(payouts(&[], &[], &[]).is_empty());
    }
}
