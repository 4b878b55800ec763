//! Appender trait for log output destinations

use super::{error::Result, formatter::Formatter, log_event::LogEvent};
use std::fmt;
use std::path::{Component, Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

/// The built-in sink kinds, as named in logger configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SinkKind {
    Console,
    SingleFile,
    RollFile,
    NetworkPush,
    Http,
}

impl SinkKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SinkKind::Console => "StdoutAppender",
            SinkKind::SingleFile => "SingleFileAppender",
            SinkKind::RollFile => "RollFileAppender",
            SinkKind::NetworkPush => "ZMQAppender",
            SinkKind::Http => "HTTPAppender",
        }
    }

    /// Whether a logger should attach its JSON formatter by default
    pub fn prefers_json(&self) -> bool {
        matches!(self, SinkKind::Http)
    }
}

impl fmt::Display for SinkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SinkKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "stdoutappender" | "consoleappender" | "console" | "stdout" => Ok(SinkKind::Console),
            "singlefileappender" | "singlefile" | "file" => Ok(SinkKind::SingleFile),
            "rollfileappender" | "rollfile" | "rolling" => Ok(SinkKind::RollFile),
            "zmqappender" | "networkpushappender" | "push" => Ok(SinkKind::NetworkPush),
            "httpappender" | "http" => Ok(SinkKind::Http),
            _ => Err(format!("Unknown appender kind: '{}'", s)),
        }
    }
}

/// Identity of an appender inside a logger.
///
/// Two appenders with equal ids write to the same destination, so a logger
/// keeps at most one of them.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AppenderId {
    Console,
    SingleFile {
        path: PathBuf,
    },
    RollFile {
        dir: PathBuf,
        prefix: String,
        suffix: String,
    },
    NetworkPush {
        scheme: String,
        host: String,
        port: u16,
    },
    Http {
        host: String,
        port: u16,
    },
    /// User-defined sinks, keyed by a caller-chosen name
    Custom(String),
}

impl AppenderId {
    pub fn single_file(path: impl AsRef<Path>) -> Self {
        AppenderId::SingleFile {
            path: normalize_path(path.as_ref()),
        }
    }

    pub fn roll_file(dir: impl AsRef<Path>, prefix: &str, suffix: &str) -> Self {
        AppenderId::RollFile {
            dir: normalize_path(dir.as_ref()),
            prefix: prefix.to_string(),
            suffix: suffix.to_string(),
        }
    }

    /// Scheme and host compare case-insensitively
    pub fn network_push(scheme: &str, host: &str, port: u16) -> Self {
        AppenderId::NetworkPush {
            scheme: scheme.to_ascii_lowercase(),
            host: host.to_ascii_lowercase(),
            port,
        }
    }

    pub fn http(host: &str, port: u16) -> Self {
        AppenderId::Http {
            host: host.to_ascii_lowercase(),
            port,
        }
    }

    pub fn kind(&self) -> Option<SinkKind> {
        match self {
            AppenderId::Console => Some(SinkKind::Console),
            AppenderId::SingleFile { .. } => Some(SinkKind::SingleFile),
            AppenderId::RollFile { .. } => Some(SinkKind::RollFile),
            AppenderId::NetworkPush { .. } => Some(SinkKind::NetworkPush),
            AppenderId::Http { .. } => Some(SinkKind::Http),
            AppenderId::Custom(_) => None,
        }
    }

    pub fn prefers_json(&self) -> bool {
        self.kind().is_some_and(|kind| kind.prefers_json())
    }
}

impl fmt::Display for AppenderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppenderId::Console => write!(f, "StdoutAppender"),
            AppenderId::SingleFile { path } => write!(f, "SingleFileAppender:{}", path.display()),
            AppenderId::RollFile {
                dir,
                prefix,
                suffix,
            } => write!(
                f,
                "RollFileAppender:{}:{}-{}",
                dir.display(),
                prefix,
                suffix
            ),
            AppenderId::NetworkPush { scheme, host, port } => {
                write!(f, "ZMQAppender:{}://{}:{}", scheme, host, port)
            }
            AppenderId::Http { host, port } => write!(f, "HTTPAppender:{}:{}", host, port),
            AppenderId::Custom(name) => write!(f, "Custom:{}", name),
        }
    }
}

/// Absolute form of `path` with `.` and `..` resolved lexically, so that
/// different spellings of one file share an id. Symlinks are not followed.
fn normalize_path(path: &Path) -> PathBuf {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        match std::env::current_dir() {
            Ok(cwd) => cwd.join(path),
            Err(_) => path.to_path_buf(),
        }
    };

    let mut normalized = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match normalized.components().next_back() {
                Some(Component::Normal(_)) => {
                    normalized.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => normalized.push(component),
            },
            other => normalized.push(other),
        }
    }
    normalized
}

/// A log destination.
///
/// An appender is owned by exactly one logger, which serializes calls to
/// `append` through a per-appender lock.
pub trait Appender: Send {
    /// Stable identity used for deduplication and removal
    fn id(&self) -> &AppenderId;

    /// Render the event and deliver it to the destination
    fn append(&mut self, event: &LogEvent) -> Result<()>;

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }

    fn set_formatter(&mut self, formatter: Arc<Formatter>);

    fn has_formatter(&self) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sink_kind_parse() {
        assert_eq!("StdoutAppender".parse::<SinkKind>(), Ok(SinkKind::Console));
        assert_eq!("rollfileappender".parse::<SinkKind>(), Ok(SinkKind::RollFile));
        assert_eq!("ZMQAppender".parse::<SinkKind>(), Ok(SinkKind::NetworkPush));
        assert_eq!("HTTPAppender".parse::<SinkKind>(), Ok(SinkKind::Http));
        assert!("SyslogAppender".parse::<SinkKind>().is_err());
    }

    #[test]
    fn test_only_http_prefers_json() {
        let http = AppenderId::http("localhost", 8080);
        assert!(http.prefers_json());
        assert!(!AppenderId::Console.prefers_json());
        assert!(!AppenderId::Custom("memory".into()).prefers_json());
    }

    #[test]
    fn test_structured_ids_do_not_collide() {
        // "a-b" + "c" and "a" + "b-c" render alike in a flat string key
        let first = AppenderId::RollFile {
            dir: "logs".into(),
            prefix: "a-b".into(),
            suffix: "c".into(),
        };
        let second = AppenderId::RollFile {
            dir: "logs".into(),
            prefix: "a".into(),
            suffix: "b-c".into(),
        };
        assert_eq!(first.to_string(), second.to_string());
        assert_ne!(first, second);
    }

    #[test]
    fn test_path_spellings_share_an_id() {
        let plain = AppenderId::single_file("app.log");
        assert_eq!(plain, AppenderId::single_file("./app.log"));
        assert_eq!(plain, AppenderId::single_file("logs/../app.log"));
        assert_ne!(plain, AppenderId::single_file("logs/app.log"));

        let AppenderId::SingleFile { path } = plain else {
            panic!("expected a single file id");
        };
        assert!(path.is_absolute());

        assert_eq!(
            AppenderId::roll_file("logs/./rolled", "app-", ".log"),
            AppenderId::roll_file("logs/rolled", "app-", ".log")
        );
    }

    #[test]
    fn test_network_ids_ignore_case() {
        assert_eq!(
            AppenderId::network_push("TCP", "Collector.Local", 5555),
            AppenderId::network_push("tcp", "collector.local", 5555)
        );
        assert_ne!(
            AppenderId::network_push("tcp", "collector", 5555),
            AppenderId::network_push("tcp", "collector", 5556)
        );
        assert_eq!(AppenderId::http("LOCALHOST", 80), AppenderId::http("localhost", 80));
    }
}
