//! Reminder delivery: a desktop notification plus an alarm sound

pub mod notification;

pub use notification::{DesktopNotifier, NotificationPermission, Notifier};

use thiserror::Error;
use tracing::{debug, warn};

use crate::config::Config;
use crate::reminder::ReminderSink;
use crate::sound::SoundAlarm;
use crate::task::Task;

#[derive(Error, Debug)]
pub enum AlertError {
    #[error("No sound files installed")]
    NoSounds,

    #[error("Sound not found: {0}")]
    SoundNotFound(String),

    #[error("Could not launch {tool}: {source}")]
    ToolMissing {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{tool} failed: {detail}")]
    ToolFailed { tool: String, detail: String },
}

pub trait Alarm {
    fn play(&self) -> Result<(), AlertError>;
}

/// Title and body of the notification for a fired reminder
pub fn reminder_message(task: &Task) -> (String, String) {
    let title = format!("Chronos Reminder: {}", task.text);
    let body = format!(
        "Your {} priority task is due at {}!",
        task.priority,
        task.due_label()
    );
    (title, body)
}

/// Shows the notification and plays the alarm for every fired reminder.
/// Delivery failures are logged; the reminder still counts as fired.
pub struct AlertDispatcher {
    notifier: Box<dyn Notifier>,
    alarm: Box<dyn Alarm>,
}

impl AlertDispatcher {
    pub fn new(notifier: Box<dyn Notifier>, alarm: Box<dyn Alarm>) -> Self {
        Self { notifier, alarm }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            Box::new(DesktopNotifier::new(config.notifications.enabled)),
            Box::new(SoundAlarm::new(config.sound.clone())),
        )
    }

    pub fn request_permission(&mut self) -> NotificationPermission {
        self.notifier.request_permission()
    }
}

impl ReminderSink for AlertDispatcher {
    fn on_reminder_fired(&self, task: &Task) {
        let (title, body) = reminder_message(task);
        debug!("Reminder for task {}: {}", task.id, body);

        if let Err(e) = self.notifier.show(&title, &body) {
            warn!("Failed to show notification: {}", e);
        }
        if let Err(e) = self.alarm.play() {
            match e {
                AlertError::NoSounds => debug!("No alarm sound installed"),
                e => warn!("Failed to play alarm: {}", e),
            }
        }
    }
}
