//! Desktop notifications through the platform's notification tool

use std::process::{Command, Stdio};
use tracing::debug;

use super::AlertError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationPermission {
    Granted,
    Denied,
    Unsupported,
}

pub trait Notifier {
    /// Ask once, up front, whether notifications can be shown
    fn request_permission(&mut self) -> NotificationPermission;

    /// Show a notification. Does nothing unless permission was granted.
    fn show(&self, title: &str, body: &str) -> Result<(), AlertError>;
}

cfg_if::cfg_if! {
    if #[cfg(target_os = "macos")] {
        const NOTIFY_TOOL: Option<&str> = Some("osascript");
    } else if #[cfg(unix)] {
        const NOTIFY_TOOL: Option<&str> = Some("notify-send");
    } else {
        const NOTIFY_TOOL: Option<&str> = None;
    }
}

#[derive(Debug, Clone)]
pub struct DesktopNotifier {
    enabled: bool,
    permission: Option<NotificationPermission>,
}

impl DesktopNotifier {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            permission: None,
        }
    }

    pub fn permission(&self) -> Option<NotificationPermission> {
        self.permission
    }
}

/// Whether the notification tool can be launched at all
fn tool_available(tool: &str) -> bool {
    let check_args: &[&str] = if tool == "osascript" {
        &["-e", "return"]
    } else {
        &["--version"]
    };
    Command::new(tool)
        .args(check_args)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .output()
        .is_ok()
}

/// Quote a string for an AppleScript string literal
fn applescript_quote(s: &str) -> String {
    let escaped = s.replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"{escaped}\"")
}

fn notify_command(tool: &str, title: &str, body: &str) -> Command {
    let mut cmd = Command::new(tool);
    if tool == "osascript" {
        let script = format!(
            "display notification {} with title {}",
            applescript_quote(body),
            applescript_quote(title)
        );
        cmd.args(["-e", script.as_str()]);
    } else {
        cmd.args(["--app-name=Chronos", title, body]);
    }
    cmd
}

impl Notifier for DesktopNotifier {
    fn request_permission(&mut self) -> NotificationPermission {
        if let Some(permission) = self.permission {
            return permission;
        }

        let permission = if !self.enabled {
            NotificationPermission::Denied
        } else {
            match NOTIFY_TOOL {
                Some(tool) if tool_available(tool) => NotificationPermission::Granted,
                _ => NotificationPermission::Unsupported,
            }
        };
        debug!("Notification permission: {:?}", permission);
        self.permission = Some(permission);
        permission
    }

    fn show(&self, title: &str, body: &str) -> Result<(), AlertError> {
        if self.permission != Some(NotificationPermission::Granted) {
            return Ok(());
        }
        let Some(tool) = NOTIFY_TOOL else {
            return Ok(());
        };

        let output = notify_command(tool, title, body)
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .map_err(|source| AlertError::ToolMissing {
                tool: tool.to_string(),
                source,
            })?;

        if output.status.success() {
            Ok(())
        } else {
            Err(AlertError::ToolFailed {
                tool: tool.to_string(),
                detail: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            })
        }
    }
}
