//! Logger configuration documents
//!
//! A configuration file is a JSON document of the form
//! `{"Loggers": [ {...}, ... ]}`, one object per logger, or the same
//! settings as XML elements (see [`ConfigLoader::from_xml`]):
//!
//! ```json
//! {
//!   "Loggers": [
//!     {
//!       "name": "root",
//!       "outPutLevel": 2,
//!       "rawFormatter": "[%p] %m%n",
//!       "appenders": ["StdoutAppender", "RollFileAppender"],
//!       "rollFilePath": "logs",
//!       "filePrefix": "app-",
//!       "fileSubfix": ".log",
//!       "rollFileSize": 8
//!     }
//!   ]
//! }
//! ```
//!
//! ```xml
//! <Loggers>
//!   <Logger>
//!     <name>root</name>
//!     <outPutLevel>2</outPutLevel>
//!     <appenders>StdoutAppender</appenders>
//!     <appenders>RollFileAppender</appenders>
//!     <rollFilePath>logs</rollFilePath>
//!   </Logger>
//! </Loggers>
//! ```

use crate::appenders::{
    ConsoleAppender, Endpoint, HttpAppender, NetworkPushAppender, RollFileAppender,
    SingleFileAppender, DEFAULT_MAX_SIZE_MIB,
};
use crate::core::{
    Appender, AppenderId, LogLevel, LoggerError, Result, SinkKind, DEFAULT_JSON_PATTERN,
    DEFAULT_PATTERN, ROOT_LOGGER,
};
use serde::de::{self, MapAccess, Visitor};
use serde::{Deserialize, Deserializer};
use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Settings for one logger and its appenders
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    #[serde(alias = "loggerName")]
    pub name: String,

    /// Text pattern; the older `rowFormatter` key is accepted too
    #[serde(rename = "rawFormatter", alias = "rowFormatter")]
    pub raw_pattern: String,

    #[serde(rename = "jsonFormatter")]
    pub json_pattern: String,

    /// Sink kind names, e.g. `StdoutAppender` or `RollFileAppender`
    pub appenders: Vec<String>,

    #[serde(rename = "singleFileName")]
    pub single_file_name: String,

    #[serde(rename = "rollFilePath")]
    pub roll_file_path: String,

    #[serde(rename = "filePrefix")]
    pub roll_file_prefix: String,

    #[serde(rename = "fileSubfix", alias = "fileSuffix")]
    pub roll_file_suffix: String,

    /// Roll size limit in MiB
    #[serde(rename = "rollFileSize")]
    pub roll_file_size: u64,

    /// Host of the network push or HTTP sink
    #[serde(rename = "inetAddr")]
    pub host: String,

    pub port: u16,

    /// Async queue capacity; zero selects the default
    #[serde(rename = "bufferSize")]
    pub buffer_size: usize,

    /// Minimum level, numeric `0..=5` or a level name
    #[serde(
        rename = "outPutLevel",
        alias = "outputLevel",
        deserialize_with = "deserialize_level"
    )]
    pub level: LogLevel,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            name: ROOT_LOGGER.to_string(),
            raw_pattern: DEFAULT_PATTERN.to_string(),
            json_pattern: DEFAULT_JSON_PATTERN.to_string(),
            appenders: Vec::new(),
            single_file_name: String::new(),
            roll_file_path: String::new(),
            roll_file_prefix: String::new(),
            roll_file_suffix: String::new(),
            roll_file_size: DEFAULT_MAX_SIZE_MIB,
            host: String::new(),
            port: 0,
            buffer_size: 0,
            level: LogLevel::Trace,
        }
    }
}

impl LoggerConfig {
    /// Build the configured appenders.
    ///
    /// Unknown kinds and appenders missing required settings are reported to
    /// stderr and skipped. A kind listed twice is built once.
    pub fn build_appenders(&self) -> Vec<Box<dyn Appender>> {
        self.build_missing_appenders(|_| false)
    }

    /// Build only the configured appenders for which `is_present` is false.
    ///
    /// Ids are resolved before anything is constructed, so an appender that
    /// is already attached never touches its destination again.
    pub fn build_missing_appenders(
        &self,
        is_present: impl Fn(&AppenderId) -> bool,
    ) -> Vec<Box<dyn Appender>> {
        let mut seen = BTreeSet::new();
        let mut built = Vec::new();

        for name in &self.appenders {
            let resolved = self.sink_kind(name).and_then(|kind| {
                let id = self.appender_id(kind);
                if is_present(&id) || !seen.insert(id) {
                    return Ok(None);
                }
                self.build_appender(kind).map(Some)
            });
            match resolved {
                Ok(Some(appender)) => built.push(appender),
                Ok(None) => {}
                Err(e) => eprintln!(
                    "[LOGGER ERROR] Logger '{}': skipping appender '{}': {}",
                    self.name, name, e
                ),
            }
        }
        built
    }

    /// Id the appender of `kind` gets when built from this configuration
    pub fn appender_id(&self, kind: SinkKind) -> AppenderId {
        match kind {
            SinkKind::Console => AppenderId::Console,
            SinkKind::SingleFile => AppenderId::single_file(&self.single_file_name),
            SinkKind::RollFile => AppenderId::roll_file(
                self.roll_dir(),
                &self.roll_file_prefix,
                &self.roll_file_suffix,
            ),
            SinkKind::NetworkPush => self.push_endpoint().appender_id(),
            SinkKind::Http => AppenderId::http(&self.host, self.port),
        }
    }

    /// Parse a kind name and check the settings that kind needs
    fn sink_kind(&self, name: &str) -> Result<SinkKind> {
        let kind: SinkKind = name
            .parse()
            .map_err(|message: String| LoggerError::config(self.name.as_str(), message))?;

        match kind {
            SinkKind::SingleFile => {
                self.require(!self.single_file_name.is_empty(), "singleFileName")?
            }
            SinkKind::NetworkPush | SinkKind::Http => {
                self.require(!self.host.is_empty() && self.port != 0, "inetAddr and port")?
            }
            SinkKind::Console | SinkKind::RollFile => {}
        }
        Ok(kind)
    }

    fn build_appender(&self, kind: SinkKind) -> Result<Box<dyn Appender>> {
        let appender: Box<dyn Appender> = match kind {
            SinkKind::Console => Box::new(ConsoleAppender::new()),
            SinkKind::SingleFile => Box::new(SingleFileAppender::new(&self.single_file_name)),
            SinkKind::RollFile => Box::new(RollFileAppender::new(
                self.roll_dir(),
                self.roll_file_size,
                self.roll_file_prefix.as_str(),
                self.roll_file_suffix.as_str(),
            )),
            SinkKind::NetworkPush => Box::new(NetworkPushAppender::new(self.push_endpoint())),
            SinkKind::Http => Box::new(HttpAppender::new(self.host.as_str(), self.port)),
        };
        Ok(appender)
    }

    fn roll_dir(&self) -> PathBuf {
        if self.roll_file_path.is_empty() {
            PathBuf::from(".")
        } else {
            PathBuf::from(&self.roll_file_path)
        }
    }

    fn push_endpoint(&self) -> Endpoint {
        Endpoint::tcp(self.host.as_str(), self.port)
    }

    fn require(&self, present: bool, setting: &str) -> Result<()> {
        if present {
            Ok(())
        } else {
            Err(LoggerError::config(
                self.name.as_str(),
                format!("missing {}", setting),
            ))
        }
    }
}

/// Accepts a number `0..=5`, a numeric string or a level name. XML element
/// text may arrive as a map with a single `$text` entry.
struct LevelVisitor;

impl<'de> Visitor<'de> for LevelVisitor {
    type Value = LogLevel;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a level number in 0..=5 or a level name")
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> std::result::Result<LogLevel, E> {
        u8::try_from(value)
            .ok()
            .and_then(LogLevel::from_u8)
            .ok_or_else(|| E::custom(format!("output level {} is not in 0..=5", value)))
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> std::result::Result<LogLevel, E> {
        let value = u64::try_from(value)
            .map_err(|_| E::custom(format!("output level {} is not in 0..=5", value)))?;
        self.visit_u64(value)
    }

    fn visit_str<E: de::Error>(self, value: &str) -> std::result::Result<LogLevel, E> {
        let value = value.trim();
        match value.parse::<u64>() {
            Ok(number) => self.visit_u64(number),
            Err(_) => value.parse().map_err(E::custom),
        }
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> std::result::Result<LogLevel, A::Error> {
        let mut level = None;
        while let Some(key) = map.next_key::<String>()? {
            if key == "$text" {
                let text: String = map.next_value()?;
                level = Some(LevelVisitor.visit_str(&text)?);
            } else {
                map.next_value::<de::IgnoredAny>()?;
            }
        }
        level.ok_or_else(|| de::Error::missing_field("$text"))
    }
}

fn deserialize_level<'de, D>(deserializer: D) -> std::result::Result<LogLevel, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_any(LevelVisitor)
}

#[derive(Deserialize)]
struct ConfigDocument {
    #[serde(rename = "Loggers", alias = "loggers")]
    loggers: Vec<LoggerConfig>,
}

/// `<Loggers><Logger>...</Logger></Loggers>`; the root element name is not checked
#[derive(Deserialize)]
struct XmlConfigDocument {
    #[serde(rename = "Logger", default)]
    loggers: Vec<LoggerConfig>,
}

/// Reads logger configuration documents
pub struct ConfigLoader;

impl ConfigLoader {
    /// Read and parse a configuration file.
    ///
    /// Files ending in `.xml` are read as XML, anything else as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`LoggerError::ConfigNotFound`] if the file does not exist,
    /// [`LoggerError::JsonError`] or [`LoggerError::XmlError`] if it is not a
    /// valid document
    pub fn load(path: impl AsRef<Path>) -> Result<Vec<LoggerConfig>> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                LoggerError::config_not_found(path.display().to_string())
            } else {
                LoggerError::io_operation(
                    "read logger configuration",
                    format!("Failed to read '{}'", path.display()),
                    e,
                )
            }
        })?;

        let is_xml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("xml"));
        if is_xml {
            Self::from_xml(&contents)
        } else {
            Self::from_json(&contents)
        }
    }

    /// Parse a JSON configuration document held in memory
    pub fn from_json(document: &str) -> Result<Vec<LoggerConfig>> {
        let document: ConfigDocument = serde_json::from_str(document)?;
        Ok(document.loggers)
    }

    /// Parse an XML configuration document held in memory.
    ///
    /// Element names match the JSON keys; each appender kind is its own
    /// `<appenders>` element.
    pub fn from_xml(document: &str) -> Result<Vec<LoggerConfig>> {
        let document: XmlConfigDocument = quick_xml::de::from_str(document)?;
        Ok(document.loggers)
    }
}
