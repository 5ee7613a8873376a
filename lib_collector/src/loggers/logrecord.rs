use serde::{Deserialize, Serialize};
use serde_json::Value;
use static_init::dynamic;

use crate::utils::misc::sys_info::{get_process_info, ProcessInfo, ProcessInfoError};
use crate::utils::misc::utils::current_datetime_rfc9557;

#[dynamic]
/// Statically initialized `ProcessInfo` instance, providing details about the current process.
pub static PROCESSINFO: Result<ProcessInfo, ProcessInfoError> = get_process_info();

/// # Logrecord
///
/// Represents one structured log entry emitted by the collection library.
/// Each record carries enough identity (application, host) that log files
/// gathered from several collector instances can be attributed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Logrecord {
    /// The severity level of the log (0 Silly .. 6 Fatal).
    pub loglevel: i64,
    /// Details about the message content.
    pub message: Message,
    /// Information about the application generating the log.
    pub app: App,
    /// Information about the host where the log originated.
    pub host: Host,
    /// Flexible JSON value for arbitrary tags or additional metadata.
    pub tags: Value,
    /// RFC 9557 formatted timestamp string.
    pub rfc9557: String,
}

impl Default for Logrecord {
    /// Creates a default `Logrecord` stamped with the current UTC datetime
    /// in RFC 9557 format.
    fn default() -> Self {
        Self {
            loglevel: 0,
            message: Message::default(),
            app: App::default(),
            host: Host::default(),
            tags: serde_json::json!([]),
            rfc9557: current_datetime_rfc9557(),
        }
    }
}

/// # Message
///
/// The textual content of a log entry, including its language.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// The language of the message (e.g., "en" for English).
    pub lang: String,
    /// The actual text content of the message.
    pub text: String,
}

impl Default for Message {
    fn default() -> Self {
        Self {
            text: "".to_string(),
            lang: "en".to_string(),
        }
    }
}

/// # App
///
/// The application that generated the log entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct App {
    /// The process ID (PID) of the application.
    pub pid: i64,
    /// The name of the application.
    pub name: String,
}

impl Default for App {
    /// Populates `name` and `pid` from the global process information,
    /// degrading to `"unknown"` when the identity could not be resolved.
    fn default() -> Self {
        let name = PROCESSINFO
            .as_ref()
            .map(|info| info.process_basename.clone())
            .unwrap_or_else(|_| "unknown".to_string());
        Self {
            name,
            pid: std::process::id() as i64,
        }
    }
}

/// # Host
///
/// The host machine where the log originated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Host {
    /// The IP address of the host.
    pub ip: String,
    /// The name of the host.
    pub name: String,
}

impl Default for Host {
    /// Populates `name` and `ip` from the global process information,
    /// degrading to `"unknown"` when the identity could not be resolved.
    fn default() -> Self {
        let (name, ip) = PROCESSINFO
            .as_ref()
            .map(|info| (info.process_host.clone(), info.process_host_ip.clone()))
            .unwrap_or_else(|_| ("unknown".to_string(), "unknown".to_string()));
        Self { name, ip }
    }
}
