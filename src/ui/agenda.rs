use iced::widget::{button, column, container, horizontal_space, row, scrollable, text, Column};
use iced::{Alignment, Color, Element, Length, Task};

use super::{alert, card, empty_state, loading, DANGER, MUTED, SUCCESS, WARNING};
use crate::api::ApiClient;
use crate::error::Error;
use crate::state::data::{Appointment, AppointmentStatus};
use crate::state::sequence::{RequestSequence, Ticket};

/// Salon-wide list of appointments for staff
pub struct Agenda {
    api: ApiClient,
    appointments: Vec<Appointment>,
    requests: RequestSequence,
    loading: bool,
}

#[derive(Debug, Clone)]
pub enum Message {
    Refresh,
    Loaded(Ticket, Result<Vec<Appointment>, Error>),
    SetStatus(i64, AppointmentStatus),
    StatusUpdated(i64, AppointmentStatus, Result<Appointment, Error>),
}

/// Set the status of appointment `id` in place, returns false if it is not listed
fn apply_status(appointments: &mut [Appointment], id: i64, status: AppointmentStatus) -> bool {
    match appointments.iter_mut().find(|a| a.id == id) {
        Some(appointment) => {
            appointment.status = status;
            true
        }
        None => false,
    }
}

/// Badge color of a status
fn status_color(status: AppointmentStatus) -> Color {
    match status {
        AppointmentStatus::Scheduled => WARNING,
        AppointmentStatus::Completed => SUCCESS,
        AppointmentStatus::Cancelled => DANGER,
    }
}

impl Agenda {
    /// Create the screen and start loading every appointment
    pub fn new(api: ApiClient) -> (Self, Task<Message>) {
        let mut agenda = Agenda {
            api,
            appointments: Vec::new(),
            requests: RequestSequence::new(),
            loading: false,
        };
        let task = agenda.refresh();
        (agenda, task)
    }

    /// Refetch the list; older responses still in flight are ignored
    fn refresh(&mut self) -> Task<Message> {
        let ticket = self.requests.next();
        let api = self.api.clone();
        self.loading = true;

        Task::perform(async move { api.appointments().await }, move |result| {
            Message::Loaded(ticket, result)
        })
    }

    /// Handle list loads and status changes
    pub fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::Refresh => self.refresh(),
            Message::Loaded(ticket, result) => {
                // A newer refresh was started after this one
                if !self.requests.is_current(ticket) {
                    return Task::none();
                }

                self.loading = false;
                match result {
                    Ok(appointments) => {
                        tracing::debug!("agenda holds {} appointments", appointments.len());
                        self.appointments = appointments;
                    }
                    Err(e) => tracing::error!("could not load the agenda: {}", e),
                }
                Task::none()
            }
            Message::SetStatus(id, status) => {
                let api = self.api.clone();
                Task::perform(
                    async move { api.update_appointment_status(id, status).await },
                    move |result| Message::StatusUpdated(id, status, result),
                )
            }
            Message::StatusUpdated(id, status, result) => {
                match result {
                    Ok(_) => {
                        tracing::info!("appointment #{} is now {}", id, status.as_str());
                        // Update the local copy instead of refetching everything
                        apply_status(&mut self.appointments, id, status);
                    }
                    Err(e) => {
                        tracing::error!("could not set #{} to {}: {}", id, status.as_str(), e);
                        alert("Could not reach the server.");
                    }
                }
                Task::none()
            }
        }
    }

    /// Header with refresh, then the appointment table
    pub fn view(&self) -> Element<Message> {
        let header = row![
            column![
                text("Salon agenda").size(26),
                text("Manage the appointments").color(MUTED),
            ]
            .spacing(4),
            horizontal_space(),
            button(text(if self.loading { "Refreshing..." } else { "Refresh" }))
                .on_press(Message::Refresh)
                .style(button::secondary),
        ]
        .align_y(Alignment::Center);

        let body: Element<Message> = if self.loading && self.appointments.is_empty() {
            loading()
        } else if self.appointments.is_empty() {
            empty_state("No appointments", "Appointments will show up here")
        } else {
            let columns = row![
                text("Client").width(Length::FillPortion(3)).color(MUTED),
                text("Start").width(Length::FillPortion(2)).color(MUTED),
                text("End").width(Length::FillPortion(1)).color(MUTED),
                text("Status").width(Length::FillPortion(2)).color(MUTED),
                text("Actions").width(Length::FillPortion(2)).color(MUTED),
            ]
            .spacing(10);

            let rows = self
                .appointments
                .iter()
                .fold(Column::new().spacing(8), |rows, a| rows.push(view_row(a)));

            column![columns, scrollable(rows)].spacing(10).into()
        };

        card(column![header, body].spacing(20))
    }
}

/// Table row; only scheduled appointments get action buttons
fn view_row(appointment: &Appointment) -> Element<Message> {
    let actions: Element<Message> = if appointment.status == AppointmentStatus::Scheduled {
        row![
            button(text("Complete"))
                .on_press(Message::SetStatus(appointment.id, AppointmentStatus::Completed))
                .style(button::success),
            button(text("Cancel"))
                .on_press(Message::SetStatus(appointment.id, AppointmentStatus::Cancelled))
                .style(button::danger),
        ]
        .spacing(6)
        .into()
    } else {
        text("-").color(MUTED).into()
    };

    row![
        text(&appointment.client_name).width(Length::FillPortion(3)),
        text(appointment.start_time.format("%d/%m %H:%M").to_string())
            .width(Length::FillPortion(2)),
        text(appointment.end_time.format("%H:%M").to_string())
            .width(Length::FillPortion(1))
            .color(MUTED),
        container(text(appointment.status.label()).color(status_color(appointment.status)))
            .width(Length::FillPortion(2)),
        container(actions).width(Length::FillPortion(2)),
    ]
    .spacing(10)
    .align_y(Alignment::Center)
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn appointment(id: i64, status: AppointmentStatus) -> Appointment {
        let start = NaiveDate::from_ymd_opt(2026, 10, 20)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        Appointment {
            id,
            client_name: format!("client {}", id),
            service_id: 1,
            employee_id: Some(1),
            start_time: start,
            end_time: start + chrono::Duration::minutes(30),
            status,
        }
    }

    #[test]
    fn test_apply_status_in_place() {
        let mut list = vec![
            appointment(1, AppointmentStatus::Scheduled),
            appointment(2, AppointmentStatus::Scheduled),
        ];

        assert!(apply_status(&mut list, 2, AppointmentStatus::Completed));
        assert_eq!(list[0].status, AppointmentStatus::Scheduled);
        assert_eq!(list[1].status, AppointmentStatus::Completed);

        assert!(!apply_status(&mut list, 9, AppointmentStatus::Cancelled));
    }

    #[test]
    fn test_successful_update_changes_local_copy() {
        let (mut agenda, _) = Agenda::new(ApiClient::new("http://localhost:8000"));
        let list = vec![appointment(7, AppointmentStatus::Scheduled)];
        let _ = agenda.update(Message::Loaded(1, Ok(list.clone())));
        assert!(!agenda.loading);

        let mut cancelled = list[0].clone();
        cancelled.status = AppointmentStatus::Cancelled;
        let _ = agenda.update(Message::StatusUpdated(
            7,
            AppointmentStatus::Cancelled,
            Ok(cancelled),
        ));

        assert_eq!(agenda.appointments[0].status, AppointmentStatus::Cancelled);
    }

    #[test]
    fn test_older_refresh_is_ignored() {
        let (mut agenda, _) = Agenda::new(ApiClient::new("http://localhost:8000"));
        let _ = agenda.update(Message::Refresh);

        let _ = agenda.update(Message::Loaded(
            1,
            Ok(vec![appointment(1, AppointmentStatus::Scheduled)]),
        ));
        assert!(agenda.appointments.is_empty());
        assert!(agenda.loading);

        let _ = agenda.update(Message::Loaded(2, Ok(Vec::new())));
        assert!(!agenda.loading);
    }
}
