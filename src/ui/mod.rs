/// Screens of the desk and the small helpers they share
///
/// Each screen owns its fetched snapshots and follows the same shape:
/// `new` starts the initial fetches, `update` handles its own messages and
/// returns follow-up tasks, `view` renders.

pub mod agenda;
pub mod booking;
pub mod financial;
pub mod login;
pub mod stock;
pub mod team;

use iced::widget::{container, text};
use iced::{Color, Element, Length};
use rfd::{MessageButtons, MessageDialog, MessageDialogResult, MessageLevel};

use crate::error::Error;

const DIALOG_TITLE: &str = "Salon Desk";

pub const MUTED: Color = Color { r: 0.55, g: 0.55, b: 0.6, a: 1.0 };
pub const SUCCESS: Color = Color { r: 0.3, g: 0.75, b: 0.45, a: 1.0 };
pub const WARNING: Color = Color { r: 0.95, g: 0.7, b: 0.25, a: 1.0 };
pub const DANGER: Color = Color { r: 0.9, g: 0.35, b: 0.35, a: 1.0 };

/// Blocking information dialog
pub fn alert(message: &str) {
    let _ = MessageDialog::new()
        .set_level(MessageLevel::Info)
        .set_title(DIALOG_TITLE)
        .set_description(message)
        .set_buttons(MessageButtons::Ok)
        .show();
}

/// Log a failed request and tell the user, preferring the backend's message
pub fn alert_error(error: &Error, fallback: &str) {
    tracing::error!("{}: {}", fallback, error);

    let _ = MessageDialog::new()
        .set_level(MessageLevel::Error)
        .set_title(DIALOG_TITLE)
        .set_description(error.user_message(fallback))
        .set_buttons(MessageButtons::Ok)
        .show();
}

/// Blocking yes/no question, `false` unless the user said yes
pub fn confirm(question: &str) -> bool {
    let result = MessageDialog::new()
        .set_level(MessageLevel::Warning)
        .set_title(DIALOG_TITLE)
        .set_description(question)
        .set_buttons(MessageButtons::YesNo)
        .show();

    match answer(&result) {
        Some(yes) => yes,
        None => {
            // a yes/no dialog only returns something else when it never showed
            tracing::warn!("confirmation dialog was not shown ({:?}): {}", result, question);
            false
        }
    }
}

/// The user's choice in a yes/no dialog, `None` if there was no choice
fn answer(result: &MessageDialogResult) -> Option<bool> {
    match result {
        MessageDialogResult::Yes => Some(true),
        MessageDialogResult::No => Some(false),
        _ => None,
    }
}

/// Boxed section with the theme's rounded background
pub fn card<'a, M: 'a>(content: impl Into<Element<'a, M>>) -> Element<'a, M> {
    container(content)
        .padding(20)
        .width(Length::Fill)
        .style(container::rounded_box)
        .into()
}

pub fn loading<'a, M: 'a>() -> Element<'a, M> {
    container(text("Loading...").color(MUTED))
        .padding(30)
        .center_x(Length::Fill)
        .into()
}

/// Placeholder for an empty list
pub fn empty_state<'a, M: 'a>(title: &'a str, hint: &'a str) -> Element<'a, M> {
    container(
        iced::widget::column![text(title).size(20), text(hint).color(MUTED)]
            .spacing(6)
            .align_x(iced::Alignment::Center),
    )
    .padding(30)
    .center_x(Length::Fill)
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_yes_confirms() {
        assert_eq!(answer(&MessageDialogResult::Yes), Some(true));
        assert_eq!(answer(&MessageDialogResult::No), Some(false));
    }

    #[test]
    fn test_dialog_that_never_showed_is_not_an_answer() {
        assert_eq!(answer(&MessageDialogResult::Cancel), None);
        assert_eq!(answer(&MessageDialogResult::Ok), None);
    }
}
