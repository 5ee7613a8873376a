use std::path::PathBuf;
use std::{env, fmt};

use serde::{Deserialize, Serialize};

use hostname::get;

use local_ip_address::local_ip;

use thiserror::Error;

#[derive(Debug, Error)]
/// # Process Info Error
///
/// Defines custom error types that can occur while collecting the identity
/// of the running collector process.
pub enum ProcessInfoError {
    /// An I/O error occurred, typically when resolving the executable path.
    #[error("I/O error occurred: {0}")]
    IoError(#[from] std::io::Error),

    /// The host identity (hostname or local IP) could not be determined.
    #[error("Host lookup failed: {0}")]
    HostLookup(String),

    /// An error occurred while accessing environment variables.
    #[error("Environment variable error: {0}")]
    VarError(#[from] env::VarError),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// # Process Information
///
/// Identity of the running collector process and its host. Used to stamp
/// structured log records so that collections from several machines can be
/// told apart when their logs are aggregated.
pub struct ProcessInfo {
    /// The base name of the executable (filename without extension).
    pub process_basename: String,
    /// The directory where the executable is located.
    pub process_location: String,
    /// The process ID (PID) of the current process.
    pub process_pid: i64,
    /// The hostname of the machine running the process.
    pub process_host: String,
    /// The local IP address of the machine running the process.
    pub process_host_ip: String,
}

impl fmt::Display for ProcessInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ProcessInfo
    Basename: {},
    Location: {},
    Pid: {},
    Host: {},
    Host ip: {}
",
            self.process_basename,
            self.process_location,
            self.process_pid,
            self.process_host,
            self.process_host_ip,
        )
    }
}

/// # Get Process Information
///
/// Collects and returns the identity of the current process and its host.
///
/// Executable identity comes from `std::env::current_exe`; host identity
/// from the `hostname` and `local-ip-address` crates. When a lookup cannot
/// be answered (for example no route for local IP inside a container) the
/// corresponding field degrades to `"unknown"` rather than failing the
/// whole identity, so logging keeps working in minimal environments.
pub fn get_process_info() -> Result<ProcessInfo, ProcessInfoError> {
    let current_exec: PathBuf = env::current_exe()?;

    let basename = current_exec
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("unknown")
        .to_string();

    let location = current_exec
        .parent()
        .and_then(|dir| dir.to_str())
        .unwrap_or(".")
        .to_string();

    let pid: i64 = std::process::id() as i64;

    let host_name = match get() {
        Ok(name) => name.to_string_lossy().into_owned(),
        Err(_) => "unknown".to_string(),
    };

    let host_ip = match local_ip() {
        Ok(ip) => ip.to_string(),
        Err(_) => "unknown".to_string(),
    };

    Ok(ProcessInfo {
        process_basename: basename,
        process_location: location,
        process_pid: pid,
        process_host: host_name,
        process_host_ip: host_ip,
    })
}
