use iced::widget::{button, column, container, text, text_input, Column};
use iced::{Alignment, Element, Length, Task};

use super::{DANGER, MUTED};
use crate::api::ApiClient;
use crate::error::Error;
use crate::state::data::{AuthResponse, Credentials, Registration};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    SignIn,
    Register,
}

/// Sign-in and self-registration form
pub struct Login {
    api: ApiClient,
    mode: Mode,
    name: String,
    email: String,
    password: String,
    error: Option<String>,
    loading: bool,
}

#[derive(Debug, Clone)]
pub enum Message {
    ToggleMode,
    NameChanged(String),
    EmailChanged(String),
    PasswordChanged(String),
    Submit,
    Authenticated(Result<AuthResponse, Error>),
}

/// What the shell should do after a login message
pub enum Action {
    None,
    Run(Task<Message>),
    SignedIn(AuthResponse),
}

impl Login {
    /// Empty sign-in form
    pub fn new(api: ApiClient) -> Self {
        Login {
            api,
            mode: Mode::SignIn,
            name: String::new(),
            email: String::new(),
            password: String::new(),
            error: None,
            loading: false,
        }
    }

    /// Handle form input and the authentication result
    pub fn update(&mut self, message: Message) -> Action {
        match message {
            Message::ToggleMode => {
                self.mode = match self.mode {
                    Mode::SignIn => Mode::Register,
                    Mode::Register => Mode::SignIn,
                };
                self.error = None;
                Action::None
            }
            Message::NameChanged(name) => {
                self.name = name;
                Action::None
            }
            Message::EmailChanged(email) => {
                self.email = email;
                Action::None
            }
            Message::PasswordChanged(password) => {
                self.password = password;
                Action::None
            }
            Message::Submit => {
                // A request is already in flight
                if self.loading {
                    return Action::None;
                }

                self.error = None;
                self.loading = true;

                let api = self.api.clone();
                let task = match self.mode {
                    Mode::SignIn => {
                        let credentials = Credentials {
                            email: self.email.trim().to_string(),
                            password: self.password.clone(),
                        };
                        Task::perform(
                            async move { api.login(&credentials).await },
                            Message::Authenticated,
                        )
                    }
                    Mode::Register => {
                        let registration = Registration {
                            name: self.name.trim().to_string(),
                            email: self.email.trim().to_string(),
                            password: self.password.clone(),
                        };
                        Task::perform(
                            async move { api.register(&registration).await },
                            Message::Authenticated,
                        )
                    }
                };

                Action::Run(task)
            }
            Message::Authenticated(result) => {
                self.loading = false;

                match result {
                    Ok(auth) => {
                        tracing::info!("signed in as {} ({})", auth.user_name, auth.role.as_str());
                        // The password is not kept once it has been used
                        self.password.clear();
                        Action::SignedIn(auth)
                    }
                    Err(e) => {
                        tracing::error!("sign-in failed: {}", e);
                        self.error = Some(e.user_message("Could not connect."));
                        Action::None
                    }
                }
            }
        }
    }

    /// Centered form; the register mode adds a name field
    pub fn view(&self) -> Element<Message> {
        let registering = self.mode == Mode::Register;

        let (title, subtitle) = if registering {
            ("Create account", "Fill in your details to sign up")
        } else {
            ("Welcome back", "Sign in to continue")
        };

        let mut form = Column::new().spacing(12);

        if registering {
            form = form.push(
                text_input("Full name", &self.name)
                    .on_input(Message::NameChanged)
                    .padding(10),
            );
        }

        form = form
            .push(
                text_input("Email", &self.email)
                    .on_input(Message::EmailChanged)
                    .padding(10),
            )
            .push(
                text_input("Password", &self.password)
                    .on_input(Message::PasswordChanged)
                    .on_submit(Message::Submit)
                    .secure(true)
                    .padding(10),
            );

        if let Some(error) = &self.error {
            form = form.push(text(error).color(DANGER));
        }

        let submit_label = match (self.loading, registering) {
            (true, _) => "Please wait...",
            (false, true) => "Sign up",
            (false, false) => "Sign in",
        };

        let toggle_label = if registering {
            "Already have an account? Sign in"
        } else {
            "No account yet? Sign up"
        };

        let content = column![
            text("Salon Desk").size(40),
            text("Salon management").color(MUTED),
            text(title).size(24),
            text(subtitle).color(MUTED),
            form,
            button(text(submit_label))
                .on_press_maybe((!self.loading).then_some(Message::Submit))
                .width(Length::Fill)
                .padding(10),
            button(text(toggle_label))
                .on_press(Message::ToggleMode)
                .style(button::text),
        ]
        .spacing(16)
        .max_width(380.0)
        .align_x(Alignment::Center);

        container(content)
            .width(Length::Fill)
            .height(Length::Fill)
            .center_x(Length::Fill)
            .center_y(Length::Fill)
            .into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::access::Role;

    fn screen() -> Login {
        Login::new(ApiClient::new("http://localhost:8000"))
    }

    #[test]
    fn test_toggle_mode_clears_error() {
        let mut login = screen();
        login.error = Some("Invalid credentials".into());

        let _ = login.update(Message::ToggleMode);
        assert_eq!(login.mode, Mode::Register);
        assert_eq!(login.error, None);

        let _ = login.update(Message::ToggleMode);
        assert_eq!(login.mode, Mode::SignIn);
    }

    #[test]
    fn test_backend_detail_shown_inline() {
        let mut login = screen();
        let _ = login.update(Message::Submit);
        assert!(login.loading);

        let rejected = Error::Backend {
            status: 401,
            detail: Some("Invalid email or password".into()),
        };
        let action = login.update(Message::Authenticated(Err(rejected)));

        assert!(matches!(action, Action::None));
        assert!(!login.loading);
        assert_eq!(login.error.as_deref(), Some("Invalid email or password"));
    }

    #[test]
    fn test_network_failure_shows_fallback() {
        let mut login = screen();
        let _ = login.update(Message::Authenticated(Err(Error::Network(
            "connection refused".into(),
        ))));

        assert_eq!(login.error.as_deref(), Some("Could not connect."));
    }

    #[test]
    fn test_submit_while_loading_does_nothing() {
        let mut login = screen();
        let _ = login.update(Message::EmailChanged("ana@salon.com".into()));

        assert!(matches!(login.update(Message::Submit), Action::Run(_)));
        assert!(matches!(login.update(Message::Submit), Action::None));
        assert!(login.loading);
    }

    #[test]
    fn test_success_signs_in_and_forgets_password() {
        let mut login = screen();
        let _ = login.update(Message::PasswordChanged("secret".into()));
        let _ = login.update(Message::Submit);

        let auth = AuthResponse {
            access_token: "abc".into(),
            token_type: "bearer".into(),
            user_name: "Ana Souza".into(),
            role: Role::Admin,
        };

        match login.update(Message::Authenticated(Ok(auth.clone()))) {
            Action::SignedIn(signed_in) => assert_eq!(signed_in, auth),
            _ => panic!("expected a sign-in"),
        }
        assert!(login.password.is_empty());
        assert!(!login.loading);
    }
}
