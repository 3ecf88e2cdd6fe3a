use iced::widget::{button, column, container, horizontal_space, row, text, Row};
use iced::{Alignment, Element, Length, Task, Theme};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod api;
mod calendar;
mod config;
mod error;
mod finance;
mod state;
mod ui;

use api::ApiClient;
use config::Config;
use state::access::View;
use state::data::AuthResponse;
use state::session::{Session, SessionStore};
use ui::{agenda, booking, financial, login, stock, team};

/// What fills the window below the header
enum Screen {
    Login(login::Login),
    Booking(booking::Booking),
    Agenda(agenda::Agenda),
    Financial(financial::Financial),
    Stock(stock::Stock),
    Team(team::Team),
    /// The signed-in role may not open this view
    Restricted(View),
}

/// Main application state
struct SalonDesk {
    /// Carries the bearer token while signed in
    api: ApiClient,
    /// `None` only if not even an in-memory database could be opened
    store: Option<SessionStore>,
    session: Option<Session>,
    screen: Screen,
}

#[derive(Debug, Clone)]
enum Message {
    Login(login::Message),
    Booking(booking::Message),
    Agenda(agenda::Message),
    Financial(financial::Message),
    Stock(stock::Message),
    Team(team::Message),
    Navigate(View),
    Logout,
}

/// Open the session database, falling back to one that lives only as long
/// as the process
fn open_store(config: &Config) -> Option<SessionStore> {
    let path = config.session_db_path();

    match SessionStore::open(&path) {
        Ok(store) => Some(store),
        Err(e) => {
            tracing::error!(
                "could not open {}: {}, the session will not survive a restart",
                path.display(),
                error::Error::from(e)
            );
            SessionStore::in_memory()
                .map_err(|e| tracing::error!("no session storage at all: {}", e))
                .ok()
        }
    }
}

impl SalonDesk {
    /// Create the application from the loaded configuration
    fn new(config: Config) -> (Self, Task<Message>) {
        let store = open_store(&config);
        Self::with_store(ApiClient::new(config.api_url), store)
    }

    /// Resume a stored session if there is one, otherwise show the login screen
    fn with_store(api: ApiClient, store: Option<SessionStore>) -> (Self, Task<Message>) {
        let session = store.as_ref().and_then(|store| match store.load() {
            Ok(session) => session,
            Err(e) => {
                tracing::warn!("could not read the stored session: {}", e);
                None
            }
        });

        if let Some(path) = store.as_ref().and_then(SessionStore::path) {
            tracing::debug!("session store at {}", path.display());
        }

        let mut desk = SalonDesk {
            api: api.with_token(session.as_ref().map(|s| s.token.clone())),
            store,
            session,
            screen: Screen::Login(login::Login::new(api)),
        };

        tracing::debug!(
            "api at {}, authenticated: {}",
            desk.api.base_url(),
            desk.api.is_authenticated()
        );

        let task = match &desk.session {
            Some(session) => {
                tracing::info!("resuming session of {} ({})", session.user.name, session.role());
                desk.open(View::Booking)
            }
            None => Task::none(),
        };

        (desk, task)
    }

    /// Switch to `view`, starting its initial fetches
    fn open(&mut self, view: View) -> Task<Message> {
        let Some(session) = &self.session else {
            self.screen = Screen::Login(login::Login::new(self.api.clone()));
            return Task::none();
        };

        if !session.role().can_access(view) {
            tracing::warn!("{} may not open {}", session.role().as_str(), view.title());
            self.screen = Screen::Restricted(view);
            return Task::none();
        }

        let api = self.api.clone();

        match view {
            View::Booking => {
                let (screen, task) = booking::Booking::new(api);
                self.screen = Screen::Booking(screen);
                task.map(Message::Booking)
            }
            View::Agenda => {
                let (screen, task) = agenda::Agenda::new(api);
                self.screen = Screen::Agenda(screen);
                task.map(Message::Agenda)
            }
            View::Financial => {
                let (screen, task) = financial::Financial::new(api);
                self.screen = Screen::Financial(screen);
                task.map(Message::Financial)
            }
            View::Stock => {
                let (screen, task) = stock::Stock::new(api);
                self.screen = Screen::Stock(screen);
                task.map(Message::Stock)
            }
            View::Team => {
                let (screen, task) = team::Team::new(api);
                self.screen = Screen::Team(screen);
                task.map(Message::Team)
            }
        }
    }

    /// The view highlighted in the navigation bar
    fn current_view(&self) -> Option<View> {
        match self.screen {
            Screen::Login(_) => None,
            Screen::Booking(_) => Some(View::Booking),
            Screen::Agenda(_) => Some(View::Agenda),
            Screen::Financial(_) => Some(View::Financial),
            Screen::Stock(_) => Some(View::Stock),
            Screen::Team(_) => Some(View::Team),
            Screen::Restricted(view) => Some(view),
        }
    }

    /// Store the new session and go to booking
    fn sign_in(&mut self, auth: AuthResponse) -> Task<Message> {
        let session = Session::new(auth.access_token, auth.user_name, auth.role);

        if let Err(e) = self.persist(&session) {
            tracing::error!("could not store the session: {}", e);
        }

        self.api = self.api.with_token(Some(session.token.clone()));
        self.session = Some(session);
        self.open(View::Booking)
    }

    /// Save the session if there is a store
    fn persist(&self, session: &Session) -> error::Result<()> {
        if let Some(store) = &self.store {
            store.save(session)?;
        }
        Ok(())
    }

    /// Forget the session and return to the login screen
    fn sign_out(&mut self) -> error::Result<()> {
        self.session = None;
        self.api = self.api.with_token(None);
        self.screen = Screen::Login(login::Login::new(self.api.clone()));

        if let Some(store) = &self.store {
            store.clear()?;
        }
        Ok(())
    }

    /// Handle application messages and update state
    fn update(&mut self, message: Message) -> Task<Message> {
        // Screen messages that arrive after the user navigated away are dropped
        match message {
            Message::Login(message) => {
                let Screen::Login(screen) = &mut self.screen else {
                    return stale(message);
                };
                match screen.update(message) {
                    login::Action::None => Task::none(),
                    login::Action::Run(task) => task.map(Message::Login),
                    login::Action::SignedIn(auth) => self.sign_in(auth),
                }
            }
            Message::Booking(message) => match &mut self.screen {
                Screen::Booking(screen) => screen.update(message).map(Message::Booking),
                _ => stale(message),
            },
            Message::Agenda(message) => match &mut self.screen {
                Screen::Agenda(screen) => screen.update(message).map(Message::Agenda),
                _ => stale(message),
            },
            Message::Financial(message) => match &mut self.screen {
                Screen::Financial(screen) => screen.update(message).map(Message::Financial),
                _ => stale(message),
            },
            Message::Stock(message) => match &mut self.screen {
                Screen::Stock(screen) => screen.update(message).map(Message::Stock),
                _ => stale(message),
            },
            Message::Team(message) => match &mut self.screen {
                Screen::Team(screen) => screen.update(message).map(Message::Team),
                _ => stale(message),
            },
            Message::Navigate(view) => self.open(view),
            Message::Logout => {
                tracing::info!("signing out");
                if let Err(e) = self.sign_out() {
                    tracing::error!("could not clear the stored session: {}", e);
                }
                Task::none()
            }
        }
    }

    /// Build the user interface
    fn view(&self) -> Element<Message> {
        let body: Element<Message> = match &self.screen {
            // The login screen has no header or navigation
            Screen::Login(screen) => return screen.view().map(Message::Login),
            Screen::Booking(screen) => screen.view().map(Message::Booking),
            Screen::Agenda(screen) => screen.view().map(Message::Agenda),
            Screen::Financial(screen) => screen.view().map(Message::Financial),
            Screen::Stock(screen) => screen.view().map(Message::Stock),
            Screen::Team(screen) => screen.view().map(Message::Team),
            Screen::Restricted(view) => restricted(*view),
        };

        let content = column![self.view_header(), self.view_navigation(), body]
            .spacing(20)
            .padding(24)
            .max_width(1100.0);

        container(content)
            .width(Length::Fill)
            .height(Length::Fill)
            .center_x(Length::Fill)
            .into()
    }

    /// Avatar, greeting, role and logout
    fn view_header(&self) -> Element<Message> {
        let Some(session) = &self.session else {
            return horizontal_space().into();
        };

        let greeting = if session.user.name.is_empty() {
            "Hello!".to_string()
        } else {
            format!("Hello, {}", session.user.name)
        };

        let avatar = container(text(session.initials()).size(18))
            .padding(12)
            .style(container::rounded_box);

        row![
            avatar,
            column![
                text(greeting).size(20),
                text(session.role().label()).size(13).color(ui::MUTED),
            ]
            .spacing(2),
            horizontal_space(),
            button(text("Log out"))
                .on_press(Message::Logout)
                .style(button::secondary),
        ]
        .spacing(12)
        .align_y(Alignment::Center)
        .into()
    }

    /// One button per view the role may open
    fn view_navigation(&self) -> Element<Message> {
        let Some(session) = &self.session else {
            return horizontal_space().into();
        };

        let current = self.current_view();

        session
            .role()
            .views()
            .into_iter()
            .fold(Row::new().spacing(8), |nav, view| {
                let style = if current == Some(view) {
                    button::primary
                } else {
                    button::text
                };

                nav.push(
                    button(text(view.title()))
                        .on_press(Message::Navigate(view))
                        .style(style),
                )
            })
            .into()
    }

    /// Set the application theme
    fn theme(&self) -> Theme {
        Theme::Dark
    }
}

/// Log and drop a message whose screen is closed
fn stale<M: std::fmt::Debug>(message: M) -> Task<Message> {
    tracing::debug!("dropping message for a closed screen: {:?}", message);
    Task::none()
}

/// Placeholder for a view the role may not open
fn restricted<'a>(view: View) -> Element<'a, Message> {
    ui::card(
        column![
            text("Restricted access").size(24),
            text(format!(
                "{} is available to {} only.",
                view.title(),
                view.audience()
            ))
            .color(ui::MUTED),
        ]
        .spacing(8)
        .align_x(Alignment::Center),
    )
}

fn main() -> iced::Result {
    let config = Config::from_env();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("salon_desk=info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Salon Desk starting, backend at {}", config.api_url);

    iced::application("Salon Desk", SalonDesk::update, SalonDesk::view)
        .theme(SalonDesk::theme)
        .centered()
        .run_with(move || SalonDesk::new(config))
}
