use std::collections::BTreeSet;

use chrono::{Local, NaiveDate, NaiveDateTime};
use iced::widget::{
    button, column, container, horizontal_space, pick_list, row, scrollable, text, text_input,
    Column, Row, Space,
};
use iced::{Alignment, Element, Length, Task};

use super::{alert, alert_error, card, DANGER, MUTED, SUCCESS};
use crate::api::ApiClient;
use crate::calendar::{self, Density, MonthCursor, SLOTS, WEEKDAY_HEADERS};
use crate::error::Error;
use crate::state::data::{Appointment, Employee, NewAppointment, Service};
use crate::state::sequence::{RequestSequence, Ticket};

const CELL: f32 = 52.0;

/// Source of the current local time
pub type Clock = Box<dyn Fn() -> NaiveDateTime>;

fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}

/// Calendar booking screen
pub struct Booking {
    api: ApiClient,
    /// Read on every decision, the screen may stay open past midnight
    clock: Clock,
    cursor: MonthCursor,

    services: Vec<Service>,
    employees: Vec<Employee>,
    month_appointments: Vec<Appointment>,
    month_requests: RequestSequence,

    selected_day: Option<NaiveDate>,
    client_name: String,
    service: Option<Service>,
    employee: Option<Employee>,
    slot: Option<&'static str>,

    occupied: BTreeSet<String>,
    slot_requests: RequestSequence,
    loading_slots: bool,
    submitting: bool,
}

#[derive(Debug, Clone)]
pub enum Message {
    ServicesLoaded(Result<Vec<Service>, Error>),
    EmployeesLoaded(Result<Vec<Employee>, Error>),
    MonthLoaded(Ticket, Result<Vec<Appointment>, Error>),
    PreviousMonth,
    NextMonth,
    DaySelected(u32),
    CloseDay,
    ClientNameChanged(String),
    ServiceSelected(Service),
    EmployeeSelected(Employee),
    SlotSelected(&'static str),
    SlotsLoaded(Ticket, Result<Vec<Appointment>, Error>),
    Submit,
    Submitted(Result<Appointment, Error>),
}

/// How a slot button should behave
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotState {
    Free,
    Occupied,
    Past,
}

impl Booking {
    /// Open on the current month, fetching services, professionals and the month's bookings
    pub fn new(api: ApiClient) -> (Self, Task<Message>) {
        Self::with_clock(api, Box::new(local_now))
    }

    /// Open the screen on the current month of `clock`
    pub fn with_clock(api: ApiClient, clock: Clock) -> (Self, Task<Message>) {
        let cursor = MonthCursor::containing(clock().date());

        let mut booking = Booking {
            api,
            clock,
            cursor,
            services: Vec::new(),
            employees: Vec::new(),
            month_appointments: Vec::new(),
            month_requests: RequestSequence::new(),
            selected_day: None,
            client_name: String::new(),
            service: None,
            employee: None,
            slot: None,
            occupied: BTreeSet::new(),
            slot_requests: RequestSequence::new(),
            loading_slots: false,
            submitting: false,
        };

        let services = {
            let api = booking.api.clone();
            Task::perform(async move { api.services().await }, Message::ServicesLoaded)
        };
        let employees = {
            let api = booking.api.clone();
            Task::perform(async move { api.employees().await }, Message::EmployeesLoaded)
        };
        let month = booking.load_month();

        (booking, Task::batch([services, employees, month]))
    }

    /// Current local time from the injected clock
    fn now(&self) -> NaiveDateTime {
        (self.clock)()
    }

    /// Current local date
    fn today(&self) -> NaiveDate {
        self.now().date()
    }

    /// Fetch the appointments of the month under the cursor
    fn load_month(&mut self) -> Task<Message> {
        let ticket = self.month_requests.next();
        let api = self.api.clone();
        let MonthCursor { year, month } = self.cursor;

        Task::perform(
            async move { api.appointments_for_month(year, month).await },
            move |result| Message::MonthLoaded(ticket, result),
        )
    }

    /// Refetch the occupied slots for the chosen day and professional
    fn load_slots(&mut self) -> Task<Message> {
        let (Some(day), Some(employee)) = (self.selected_day, self.employee.as_ref()) else {
            self.slot_requests.invalidate();
            self.loading_slots = false;
            return Task::none();
        };

        let ticket = self.slot_requests.next();
        let api = self.api.clone();
        let employee_id = employee.id;
        self.loading_slots = true;

        Task::perform(
            async move { api.appointments_for_day(day, employee_id).await },
            move |result| Message::SlotsLoaded(ticket, result),
        )
    }

    /// Close the day panel and reset the form
    fn close_day(&mut self) {
        self.selected_day = None;
        self.client_name.clear();
        self.service = None;
        self.employee = None;
        self.slot = None;
        self.occupied.clear();
        self.slot_requests.invalidate();
        self.loading_slots = false;
    }

    /// Handle screen messages; fetches are returned as tasks
    pub fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::ServicesLoaded(result) => {
                match result {
                    Ok(services) => self.services = services,
                    Err(e) => tracing::error!("could not load services: {}", e),
                }
                Task::none()
            }
            Message::EmployeesLoaded(result) => {
                match result {
                    Ok(employees) => self.employees = employees,
                    Err(e) => tracing::error!("could not load professionals: {}", e),
                }
                Task::none()
            }
            Message::MonthLoaded(ticket, result) => {
                if !self.month_requests.is_current(ticket) {
                    tracing::debug!("dropping stale month response #{}", ticket);
                    return Task::none();
                }

                match result {
                    Ok(appointments) => self.month_appointments = appointments,
                    Err(e) => tracing::error!("could not load {}: {}", self.cursor.title(), e),
                }
                Task::none()
            }
            Message::PreviousMonth => {
                self.cursor = self.cursor.previous();
                self.month_appointments.clear();
                self.load_month()
            }
            Message::NextMonth => {
                self.cursor = self.cursor.next();
                self.month_appointments.clear();
                self.load_month()
            }
            Message::DaySelected(day) => {
                let Some(date) = self.cursor.date(day) else {
                    return Task::none();
                };

                if calendar::is_day_in_past(date, self.today()) {
                    return Task::none();
                }

                self.selected_day = Some(date);
                self.slot = None;
                self.occupied.clear();
                self.load_slots()
            }
            Message::CloseDay => {
                self.close_day();
                Task::none()
            }
            Message::ClientNameChanged(name) => {
                self.client_name = name;
                Task::none()
            }
            Message::ServiceSelected(service) => {
                self.service = Some(service);
                Task::none()
            }
            Message::EmployeeSelected(employee) => {
                self.employee = Some(employee);
                self.slot = None;
                self.occupied.clear();
                self.load_slots()
            }
            Message::SlotSelected(slot) => {
                if self.slot_state(slot, self.now()) == SlotState::Free {
                    self.slot = Some(slot);
                }
                Task::none()
            }
            Message::SlotsLoaded(ticket, result) => {
                if !self.slot_requests.is_current(ticket) {
                    tracing::debug!("dropping stale slot response #{}", ticket);
                    return Task::none();
                }

                self.loading_slots = false;

                if let (Some(day), Some(employee)) = (self.selected_day, self.employee.as_ref()) {
                    match result {
                        Ok(appointments) => {
                            self.occupied =
                                calendar::occupied_slots(day, employee.id, &appointments);
                        }
                        Err(e) => tracing::error!("could not load slots for {}: {}", day, e),
                    }
                }
                Task::none()
            }
            Message::Submit => {
                if self.submitting {
                    return Task::none();
                }

                let Some(appointment) = self.new_appointment() else {
                    alert("Please fill in all fields!");
                    return Task::none();
                };

                self.submitting = true;
                let api = self.api.clone();

                Task::perform(
                    async move { api.create_appointment(&appointment).await },
                    Message::Submitted,
                )
            }
            Message::Submitted(result) => {
                self.submitting = false;

                match result {
                    Ok(appointment) => {
                        tracing::info!(
                            "booked #{} for {} at {}",
                            appointment.id,
                            appointment.client_name,
                            appointment.start_time
                        );
                        alert("Appointment booked!");
                        self.close_day();
                        self.load_month()
                    }
                    Err(e) => {
                        alert_error(&e, "Could not book the appointment");
                        Task::none()
                    }
                }
            }
        }
    }

    /// The request to send, if every field of the form is filled in
    fn new_appointment(&self) -> Option<NewAppointment> {
        let client_name = self.client_name.trim();
        if client_name.is_empty() {
            return None;
        }

        let start_time = calendar::slot_start(self.selected_day?, self.slot?)?;

        Some(NewAppointment {
            client_name: client_name.to_string(),
            service_id: self.service.as_ref()?.id,
            employee_id: self.employee.as_ref()?.id,
            start_time,
        })
    }

    /// Classify a slot of the open day at time `now`.
    ///
    /// A day that became past while the panel was open has only past slots.
    fn slot_state(&self, slot: &str, now: NaiveDateTime) -> SlotState {
        let Some(day) = self.selected_day else {
            return SlotState::Past;
        };

        if self.occupied.contains(slot) {
            SlotState::Occupied
        } else if calendar::is_day_in_past(day, now.date())
            || !calendar::is_slot_offerable(slot, &self.occupied, day, now)
        {
            SlotState::Past
        } else {
            SlotState::Free
        }
    }

    /// Calendar card, plus the day panel when a day is open
    pub fn view(&self) -> Element<Message> {
        let mut content = Column::new().spacing(20).push(self.view_calendar());

        if let Some(day) = self.selected_day {
            content = content.push(self.view_day(day));
        }

        scrollable(content.padding(4)).into()
    }

    /// Month navigation, weekday header and the day grid
    fn view_calendar(&self) -> Element<Message> {
        let navigation = row![
            button(text("<")).on_press(Message::PreviousMonth),
            horizontal_space(),
            text(self.cursor.title()).size(22),
            horizontal_space(),
            button(text(">")).on_press(Message::NextMonth),
        ]
        .align_y(Alignment::Center);

        let headers = WEEKDAY_HEADERS.iter().fold(Row::new().spacing(4), |line, name| {
            line.push(
                container(text(*name).size(13).color(MUTED))
                    .width(Length::Fixed(CELL))
                    .center_x(Length::Fixed(CELL)),
            )
        });

        let cells = calendar::month_grid(self.cursor.year, self.cursor.month);
        let grid = cells.chunks(7).fold(Column::new().spacing(4), |grid, week| {
            let line = week
                .iter()
                .fold(Row::new().spacing(4), |line, cell| line.push(self.view_cell(*cell)));
            grid.push(line)
        });

        let legend = row![
            text("●").color(SUCCESS),
            text("Has bookings").size(13).color(MUTED),
            Space::with_width(Length::Fixed(16.0)),
            text("●").color(DANGER),
            text("Busy day").size(13).color(MUTED),
        ]
        .spacing(6)
        .align_y(Alignment::Center);

        card(
            column![
                text("Book an appointment").size(26),
                text("Pick an available date").color(MUTED),
                navigation,
                headers,
                grid,
                legend,
            ]
            .spacing(14),
        )
    }

    /// One grid cell: blank padding, or a day button with its density marker
    fn view_cell(&self, cell: Option<u32>) -> Element<Message> {
        let Some((day, date)) = cell.and_then(|day| self.cursor.date(day).map(|date| (day, date)))
        else {
            return Space::new(Length::Fixed(CELL), Length::Fixed(CELL)).into();
        };

        let today = self.today();
        let past = calendar::is_day_in_past(date, today);
        let density = Density::from_count(calendar::appointments_on_day(
            date,
            &self.month_appointments,
        ));

        let marker: Element<Message> = match density {
            Density::Empty => Space::with_height(Length::Fixed(10.0)).into(),
            Density::Low => text("●").size(10).color(SUCCESS).into(),
            Density::High => text("●").size(10).color(DANGER).into(),
        };

        let label = if past {
            text(day.to_string()).color(MUTED)
        } else {
            text(day.to_string())
        };

        let style = if date == today {
            button::primary
        } else {
            button::secondary
        };

        button(column![label, marker].align_x(Alignment::Center))
            .width(Length::Fixed(CELL))
            .height(Length::Fixed(CELL))
            .style(style)
            .on_press_maybe((!past).then_some(Message::DaySelected(day)))
            .into()
    }

    /// Booking form for the open day
    fn view_day(&self, day: NaiveDate) -> Element<Message> {
        let header = row![
            column![
                text(day.format("%A, %B %-d").to_string()).size(22),
                text("Choose a time and fill in your details").color(MUTED),
            ]
            .spacing(4),
            horizontal_space(),
            button(text("Close")).on_press(Message::CloseDay).style(button::secondary),
        ]
        .align_y(Alignment::Center);

        let mut form = Column::new()
            .spacing(12)
            .push(text("Client name"))
            .push(
                text_input("Your name", &self.client_name)
                    .on_input(Message::ClientNameChanged)
                    .padding(10),
            )
            .push(text("Service"))
            .push(
                pick_list(
                    self.services.as_slice(),
                    self.service.as_ref(),
                    Message::ServiceSelected,
                )
                .placeholder("Select a service...")
                .width(Length::Fill),
            )
            .push(text("Professional"))
            .push(
                pick_list(
                    self.employees.as_slice(),
                    self.employee.as_ref(),
                    Message::EmployeeSelected,
                )
                .placeholder("Choose a professional...")
                .width(Length::Fill),
            );

        if self.employee.is_some() {
            form = form.push(text("Available times")).push(self.view_slots());
        }

        let confirm_label = if self.submitting {
            "Booking..."
        } else {
            "Confirm booking"
        };
        let can_submit = !self.submitting && self.slot.is_some();

        let actions = row![
            button(text("Cancel"))
                .on_press(Message::CloseDay)
                .style(button::secondary)
                .width(Length::FillPortion(1)),
            button(text(confirm_label))
                .on_press_maybe(can_submit.then_some(Message::Submit))
                .width(Length::FillPortion(2)),
        ]
        .spacing(10);

        card(column![header, form, actions].spacing(18))
    }

    /// Four slot buttons per row; only free slots can be picked
    fn view_slots(&self) -> Element<Message> {
        if self.loading_slots {
            return super::loading();
        }

        let now = self.now();

        let grid = SLOTS.chunks(4).fold(Column::new().spacing(8), |grid, chunk| {
            let line = chunk.iter().fold(Row::new().spacing(8), |line, &slot| {
                let state = self.slot_state(slot, now);
                let selected = self.slot == Some(slot);

                let label = match state {
                    SlotState::Occupied => text(format!("{} taken", slot)).color(MUTED),
                    SlotState::Past => text(slot).color(MUTED),
                    SlotState::Free => text(slot),
                };

                let style = if selected {
                    button::primary
                } else {
                    button::secondary
                };

                line.push(
                    button(label)
                        .width(Length::Fill)
                        .style(style)
                        .on_press_maybe(
                            (state == SlotState::Free).then_some(Message::SlotSelected(slot)),
                        ),
                )
            });
            grid.push(line)
        });

        if self.occupied.is_empty() {
            grid.into()
        } else {
            column![
                grid,
                text("Slots marked taken are already booked").size(12).color(MUTED),
            ]
            .spacing(8)
            .into()
        }
    }
}
