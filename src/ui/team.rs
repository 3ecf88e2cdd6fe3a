use iced::widget::{
    button, column, container, horizontal_space, pick_list, row, scrollable, text, text_input,
    Column, Space,
};
use iced::{Alignment, Element, Length, Task};

use super::{alert_error, card, confirm, empty_state, loading, DANGER, MUTED, WARNING};
use crate::api::ApiClient;
use crate::error::Error;
use crate::state::access::Role;
use crate::state::data::{NewMember, TeamMember};
use crate::state::sequence::{RequestSequence, Ticket};
use crate::state::session::initials;

/// Staff management for admins
pub struct Team {
    api: ApiClient,
    members: Vec<TeamMember>,
    requests: RequestSequence,
    loading: bool,
    search: String,

    show_form: bool,
    name: String,
    email: String,
    password: String,
    role: Role,
    form_error: Option<String>,
    saving: bool,
}

#[derive(Debug, Clone)]
pub enum Message {
    Loaded(Ticket, Result<Vec<TeamMember>, Error>),
    SearchChanged(String),
    ToggleForm,
    NameChanged(String),
    EmailChanged(String),
    PasswordChanged(String),
    RoleSelected(Role),
    Submit,
    Registered(Result<(), Error>),
    Delete(i64),
    Deleted(i64, Result<(), Error>),
}

/// Drop client accounts, the team screen only lists staff
pub fn staff_only(users: Vec<TeamMember>) -> Vec<TeamMember> {
    users.into_iter().filter(|u| u.role.is_staff()).collect()
}

/// Case-insensitive match on name or email, an empty term matches everyone
pub fn matches_search(member: &TeamMember, term: &str) -> bool {
    let term = term.trim().to_lowercase();
    member.name.to_lowercase().contains(&term) || member.email.to_lowercase().contains(&term)
}

/// Team size as `(members, professionals, administrators)`
pub fn counts(members: &[TeamMember]) -> (usize, usize, usize) {
    let professionals = members.iter().filter(|m| m.role == Role::Employee).count();
    let admins = members.iter().filter(|m| m.role == Role::Admin).count();
    (members.len(), professionals, admins)
}

impl Team {
    /// Create the screen and start loading users
    pub fn new(api: ApiClient) -> (Self, Task<Message>) {
        let mut team = Team {
            api,
            members: Vec::new(),
            requests: RequestSequence::new(),
            loading: false,
            search: String::new(),
            show_form: false,
            name: String::new(),
            email: String::new(),
            password: String::new(),
            role: Role::Employee,
            form_error: None,
            saving: false,
        };
        let task = team.refresh();
        (team, task)
    }

    /// Refetch all users; clients are filtered out on arrival
    fn refresh(&mut self) -> Task<Message> {
        let ticket = self.requests.next();
        let api = self.api.clone();
        self.loading = true;

        Task::perform(async move { api.users().await }, move |result| {
            Message::Loaded(ticket, result)
        })
    }

    /// Clear the new-member form
    fn reset_form(&mut self) {
        self.name.clear();
        self.email.clear();
        self.password.clear();
        self.role = Role::Employee;
        self.form_error = None;
    }

    /// Members matching the current search
    fn visible(&self) -> Vec<&TeamMember> {
        self.members
            .iter()
            .filter(|m| matches_search(m, &self.search))
            .collect()
    }

    /// Handle list loads, the new-member form and removals
    pub fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::Loaded(ticket, result) => {
                if !self.requests.is_current(ticket) {
                    return Task::none();
                }

                self.loading = false;
                match result {
                    // The users endpoint also returns clients
                    Ok(users) => self.members = staff_only(users),
                    Err(e) => tracing::error!("could not load the team: {}", e),
                }
                Task::none()
            }
            Message::SearchChanged(search) => {
                self.search = search;
                Task::none()
            }
            Message::ToggleForm => {
                self.show_form = !self.show_form;
                self.form_error = None;
                Task::none()
            }
            Message::NameChanged(name) => {
                self.name = name;
                Task::none()
            }
            Message::EmailChanged(email) => {
                self.email = email;
                Task::none()
            }
            Message::PasswordChanged(password) => {
                self.password = password;
                Task::none()
            }
            Message::RoleSelected(role) => {
                self.role = role;
                Task::none()
            }
            Message::Submit => {
                if self.saving {
                    return Task::none();
                }

                let member = NewMember {
                    name: self.name.trim().to_string(),
                    email: self.email.trim().to_string(),
                    password: self.password.clone(),
                    role: self.role,
                };

                // Every field is required, the role always has a value
                if member.name.is_empty() || member.email.is_empty() || member.password.is_empty()
                {
                    self.form_error = Some("Fill in name, email and password.".to_string());
                    return Task::none();
                }

                self.form_error = None;
                self.saving = true;
                let api = self.api.clone();
                Task::perform(
                    async move { api.register_member(&member).await },
                    Message::Registered,
                )
            }
            Message::Registered(result) => {
                self.saving = false;

                match result {
                    Ok(()) => {
                        tracing::info!("registered {} as {}", self.email.trim(), self.role.as_str());
                        self.reset_form();
                        self.show_form = false;
                        self.refresh()
                    }
                    Err(e) => {
                        tracing::error!("could not register team member: {}", e);
                        self.form_error = Some(e.user_message("Could not register"));
                        Task::none()
                    }
                }
            }
            Message::Delete(id) => {
                let Some(member) = self.members.iter().find(|m| m.id == id) else {
                    return Task::none();
                };

                // Removal cannot be undone
                if !confirm(&format!("Remove {} from the team?", member.name)) {
                    return Task::none();
                }

                let api = self.api.clone();
                Task::perform(async move { api.delete_user(id).await }, move |result| {
                    Message::Deleted(id, result)
                })
            }
            Message::Deleted(id, result) => match result {
                Ok(()) => {
                    tracing::info!("removed user #{}", id);
                    self.refresh()
                }
                Err(e) => {
                    alert_error(&e, "Could not remove the team member");
                    Task::none()
                }
            },
        }
    }

    /// Header, optional form, search box, member list and counts
    pub fn view(&self) -> Element<Message> {
        let header = row![
            column![
                text("Team").size(26),
                text("Manage professionals and administrators").color(MUTED),
            ]
            .spacing(4),
            horizontal_space(),
            button(text("New member")).on_press(Message::ToggleForm),
        ]
        .align_y(Alignment::Center);

        let mut content = Column::new().spacing(20).push(header);

        if self.show_form {
            content = content.push(self.view_form());
        }

        content = content.push(
            text_input("Search by name or email...", &self.search)
                .on_input(Message::SearchChanged)
                .padding(10),
        );

        let visible = self.visible();

        let list: Element<Message> = if self.loading && self.members.is_empty() {
            loading()
        } else if visible.is_empty() {
            empty_state(
                "No team members found.",
                "Use \"New member\" to add someone.",
            )
        } else {
            let header = row![
                text("Name").width(Length::FillPortion(3)).color(MUTED),
                text("Email").width(Length::FillPortion(3)).color(MUTED),
                text("Type").width(Length::FillPortion(2)).color(MUTED),
                Space::with_width(Length::Fixed(80.0)),
            ]
            .spacing(10);

            let rows = visible
                .into_iter()
                .fold(Column::new().spacing(8), |rows, m| rows.push(view_member(m)));

            column![header, scrollable(rows)].spacing(10).into()
        };

        card(content.push(list).push(self.view_counts()))
    }

    /// Footer with the size of the whole team, whatever the search
    fn view_counts(&self) -> Element<Message> {
        let (total, professionals, admins) = counts(&self.members);

        row![
            text(format!("{} team members", total)),
            text(format!("{} professionals", professionals)).color(MUTED),
            text(format!("{} administrators", admins)).color(WARNING),
        ]
        .spacing(24)
        .into()
    }

    /// New-member form with its inline error
    fn view_form(&self) -> Element<Message> {
        let mut form = Column::new().spacing(12).push(text("Register a new member").size(20));

        if let Some(error) = &self.form_error {
            form = form.push(text(error).color(DANGER));
        }

        let fields = row![
            text_input("Full name", &self.name)
                .on_input(Message::NameChanged)
                .padding(10),
            text_input("email@example.com", &self.email)
                .on_input(Message::EmailChanged)
                .padding(10),
            text_input("Initial password", &self.password)
                .on_input(Message::PasswordChanged)
                .secure(true)
                .padding(10),
            pick_list(Role::STAFF, Some(self.role), Message::RoleSelected)
                .padding(10)
                .width(Length::Fill),
        ]
        .spacing(12);

        let actions = row![
            button(text(if self.saving { "Registering..." } else { "Register" }))
                .on_press_maybe((!self.saving).then_some(Message::Submit)),
            button(text("Cancel"))
                .on_press(Message::ToggleForm)
                .style(button::secondary),
        ]
        .spacing(12);

        card(form.push(fields).push(actions))
    }
}

/// Row with initials avatar, email, role and remove button
fn view_member(member: &TeamMember) -> Element<Message> {
    let avatar = container(text(initials(&member.name)).size(14))
        .padding(8)
        .style(container::rounded_box);

    let role = if member.role == Role::Admin {
        text(member.role.label()).color(WARNING)
    } else {
        text(member.role.label())
    };

    row![
        row![avatar, text(&member.name)]
            .spacing(10)
            .align_y(Alignment::Center)
            .width(Length::FillPortion(3)),
        text(&member.email).width(Length::FillPortion(3)).color(MUTED),
        container(role).width(Length::FillPortion(2)),
        button(text("Remove"))
            .on_press(Message::Delete(member.id))
            .style(button::danger)
            .width(Length::Fixed(80.0)),
    ]
    .spacing(10)
    .align_y(Alignment::Center)
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member(id: i64, name: &str, email: &str, role: Role) -> TeamMember {
        TeamMember {
            id,
            name: name.into(),
            email: email.into(),
            role,
        }
    }

    fn users() -> Vec<TeamMember> {
        vec![
            member(1, "Ana Souza", "ana@salon.com", Role::Admin),
            member(2, "Carla Dias", "carla@mail.com", Role::Client),
            member(3, "Bruno Lima", "bruno@salon.com", Role::Employee),
        ]
    }

    #[test]
    fn test_clients_are_not_listed() {
        let staff = staff_only(users());
        let ids: Vec<i64> = staff.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn test_counts_by_role() {
        let staff = staff_only(users());
        assert_eq!(counts(&staff), (2, 1, 1));
        assert_eq!(counts(&[]), (0, 0, 0));
    }

    #[test]
    fn test_counts_ignore_search() {
        let (mut team, _) = Team::new(ApiClient::new("http://localhost:8000"));
        let _ = team.update(Message::Loaded(1, Ok(users())));
        let _ = team.update(Message::SearchChanged("nobody".into()));

        assert!(team.visible().is_empty());
        assert_eq!(counts(&team.members), (2, 1, 1));
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let ana = member(1, "Ana Souza", "ana@salon.com", Role::Admin);

        assert!(matches_search(&ana, ""));
        assert!(matches_search(&ana, "SOUZA"));
        assert!(matches_search(&ana, "Salon.Com"));
        assert!(!matches_search(&ana, "bruno"));
    }

    #[test]
    fn test_loaded_users_are_filtered_and_searched() {
        let (mut team, _) = Team::new(ApiClient::new("http://localhost:8000"));
        let _ = team.update(Message::Loaded(1, Ok(users())));
        assert_eq!(team.members.len(), 2);

        let _ = team.update(Message::SearchChanged("bruno".into()));
        let visible = team.visible();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].id, 3);
    }

    #[test]
    fn test_incomplete_form_shows_inline_error() {
        let (mut team, _) = Team::new(ApiClient::new("http://localhost:8000"));
        let _ = team.update(Message::ToggleForm);
        let _ = team.update(Message::NameChanged("Dora".into()));
        let _ = team.update(Message::Submit);

        assert!(team.form_error.is_some());
        assert!(!team.saving);
    }

    #[test]
    fn test_rejected_registration_keeps_form_open() {
        let (mut team, _) = Team::new(ApiClient::new("http://localhost:8000"));
        let _ = team.update(Message::ToggleForm);

        let rejected = Error::Backend {
            status: 400,
            detail: Some("Email already registered".into()),
        };
        let _ = team.update(Message::Registered(Err(rejected)));

        assert!(team.show_form);
        assert_eq!(team.form_error.as_deref(), Some("Email already registered"));
    }
}
