pub mod browse;
pub mod config;
pub mod draft;
pub mod github;
pub mod solution;
pub mod ticket;

use crate::error::{AppError, AppResult};
use crate::render::render_session;
use crate::workflow::Coordinator;
use crate::workflow::session::NotificationLevel;

/// Prints the console transcript and queued notifications. The first error
/// notification becomes the command's error.
pub fn report(coordinator: &mut Coordinator) -> AppResult<()> {
    for line in &coordinator.session().console().lines {
        println!("{line}");
    }

    let mut failure = None;
    for note in coordinator.drain_notifications() {
        match note.level {
            NotificationLevel::Success => println!("✔ {}", note.message),
            NotificationLevel::Error => {
                failure.get_or_insert(note.message);
            }
        }
    }

    match failure {
        Some(message) => Err(AppError::Service(message)),
        None => Ok(()),
    }
}

pub fn print_html(coordinator: &Coordinator) {
    let tracker_url = coordinator.settings().tracker_url.as_deref();
    println!("{}", render_session(coordinator.session(), tracker_url));
}
