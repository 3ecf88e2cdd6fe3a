use iced::widget::{column, container, row, scrollable, text, Column};
use iced::{Alignment, Color, Element, Length, Task};

use super::{card, empty_state, loading, MUTED, SUCCESS, WARNING};
use crate::api::ApiClient;
use crate::error::Error;
use crate::finance::{self, Payout, Summary};
use crate::state::data::{format_money, Appointment, Employee, Service};

const INFO: Color = Color { r: 0.4, g: 0.6, b: 0.95, a: 1.0 };

/// Everything the overview is computed from
type Snapshot = (Vec<Appointment>, Vec<Service>, Vec<Employee>);

/// Revenue and commission overview for admins
pub struct Financial {
    summary: Summary,
    payouts: Vec<Payout>,
    loading: bool,
}

#[derive(Debug, Clone)]
pub enum Message {
    Loaded(Result<Snapshot, Error>),
}

impl Financial {
    /// Fetch appointments, services and professionals together
    pub fn new(api: ApiClient) -> (Self, Task<Message>) {
        let task = Task::perform(
            async move {
                tokio::try_join!(api.appointments(), api.services(), api.employees())
            },
            Message::Loaded,
        );

        (
            Financial {
                summary: Summary::default(),
                payouts: Vec::new(),
                loading: true,
            },
            task,
        )
    }

    /// Recompute the summary and payouts from a fresh snapshot
    pub fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::Loaded(result) => {
                self.loading = false;

                match result {
                    Ok((appointments, services, employees)) => {
                        // Both are derived from the same snapshot
                        self.summary = finance::summarize(&appointments, &services, &employees);
                        self.payouts = finance::payouts(&appointments, &services, &employees);
                        tracing::debug!(
                            "{} completed appointments, revenue {}",
                            self.summary.completed,
                            format_money(self.summary.revenue)
                        );
                    }
                    Err(e) => tracing::error!("could not load financial data: {}", e),
                }
                Task::none()
            }
        }
    }

    /// Summary boxes, then one payout row per professional
    pub fn view(&self) -> Element<Message> {
        if self.loading {
            return card(loading());
        }

        let stats = row![
            stat(
                "Revenue",
                self.summary.revenue,
                format!("{} completed services", self.summary.completed),
                SUCCESS,
            ),
            stat(
                "Commissions",
                self.summary.commissions,
                "Owed to the professionals".to_string(),
                WARNING,
            ),
            stat(
                "Net profit",
                self.summary.net,
                "Kept by the salon".to_string(),
                INFO,
            ),
        ]
        .spacing(16);

        let table: Element<Message> = if self.payouts.is_empty() {
            empty_state("No professionals", "Professionals will show up here")
        } else {
            let header = row![
                text("Professional").width(Length::FillPortion(3)).color(MUTED),
                text("Services done").width(Length::FillPortion(2)).color(MUTED),
                text("Commission").width(Length::FillPortion(2)).color(MUTED),
                text("To receive").width(Length::FillPortion(2)).color(MUTED),
            ]
            .spacing(10);

            let rows = self.payouts.iter().fold(Column::new().spacing(8), |rows, p| {
                rows.push(
                    row![
                        text(&p.name).width(Length::FillPortion(3)),
                        text(p.completed.to_string()).width(Length::FillPortion(2)),
                        text(format!("{}%", p.commission_percent))
                            .width(Length::FillPortion(2))
                            .color(MUTED),
                        text(format_money(p.amount))
                            .width(Length::FillPortion(2))
                            .color(WARNING),
                    ]
                    .spacing(10)
                    .align_y(Alignment::Center),
                )
            });

            column![header, rows].spacing(10).into()
        };

        scrollable(
            column![
                text("Financial overview").size(26),
                stats,
                card(column![text("Commissions by professional").size(20), table].spacing(16)),
            ]
            .spacing(20),
        )
        .into()
    }
}

/// One of the three summary boxes
fn stat<'a>(label: &'a str, amount: f64, detail: String, accent: Color) -> Element<'a, Message> {
    let content = column![
        text(label).color(accent),
        text(format_money(amount)).size(28),
        text(detail).size(13).color(MUTED),
    ]
    .spacing(6);

    container(card(content)).width(Length::FillPortion(1)).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::data::AppointmentStatus;
    use chrono::NaiveDate;

    #[test]
    fn test_loaded_snapshot_fills_summary() {
        let (mut screen, _) = Financial::new(ApiClient::new("http://localhost:8000"));
        assert!(screen.loading);

        let start = NaiveDate::from_ymd_opt(2026, 10, 1)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        let done = |id| Appointment {
            id,
            client_name: "Ana".into(),
            service_id: 1,
            employee_id: Some(5),
            start_time: start,
            end_time: start,
            status: AppointmentStatus::Completed,
        };
        let services = vec![Service {
            id: 1,
            name: "Cut".into(),
            price: 100.0,
            duration_minutes: 30,
            description: None,
            active: true,
        }];
        let employees = vec![Employee {
            id: 5,
            name: "Bia".into(),
            commission_percent: 40.0,
        }];

        let _ = screen.update(Message::Loaded(Ok((vec![done(1), done(2)], services, employees))));

        assert!(!screen.loading);
        assert_eq!(screen.summary.revenue, 200.0);
        assert_eq!(screen.summary.commissions, 80.0);
        assert_eq!(screen.summary.net, 120.0);
        assert_eq!(screen.payouts.len(), 1);
        assert_eq!(screen.payouts[0].amount, 80.0);
    }

    #[test]
    fn test_failed_load_keeps_empty_overview() {
        let (mut screen, _) = Financial::new(ApiClient::new("http://localhost:8000"));
        let _ = screen.update(Message::Loaded(Err(Error::Network("refused".into()))));

        assert!(!screen.loading);
        assert_eq!(screen.summary, Summary::default());
        assert!(screen.payouts.is_empty());
    }
}
