//! Configuration: INI file → typed settings.
//!
//! ```ini
//! [MAIN]
//! blacklist = postfix, crond
//! whitelist = httpd
//!
//! [sshd]
//! dow = mon-fri
//! hours = 6-8, 20
//! pre = /usr/local/bin/announce-ssh-restart
//! post = logger sshd restarted
//! ```
//!
//! Every section other than `MAIN` and `DEFAULT` configures the daemon of the
//! same name. Keys are case-insensitive; list values are comma separated.
//! Keys in `[DEFAULT]` apply to every other section that does not set them.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use ini::{Ini, ParseOption, Properties};
use serde::Serialize;
use tracing::{debug, warn};

use super::errors::{DrError, Result};
use crate::platform::linux::{DEFAULT_INSPECTOR, DEFAULT_SERVICE_MANAGER};
use crate::policy::DaemonPolicy;

/// Location used when `--configfile` is absent or points nowhere.
pub const DEFAULT_CONFIG_PATH: &str = "/usr/local/etc/do-restarting.conf";

const MAIN_SECTION: &str = "MAIN";
const DEFAULT_SECTION: &str = "DEFAULT";

/// Full configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Config {
    pub main: MainConfig,
    /// Per-daemon settings keyed by canonical daemon name.
    pub services: BTreeMap<String, ServiceSchedule>,
}

/// `[MAIN]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MainConfig {
    /// Added to the built-in denylist.
    pub blacklist: BTreeSet<String>,
    /// Removed from the denylist after additions.
    pub whitelist: BTreeSet<String>,
    /// Inspector program.
    pub inspector: String,
    /// Service manager program.
    pub service_manager: String,
}

impl Default for MainConfig {
    fn default() -> Self {
        Self {
            blacklist: BTreeSet::new(),
            whitelist: BTreeSet::new(),
            inspector: DEFAULT_INSPECTOR.to_string(),
            service_manager: DEFAULT_SERVICE_MANAGER.to_string(),
        }
    }
}

impl MainConfig {
    /// The run's effective denylist.
    #[must_use]
    pub fn policy(&self) -> DaemonPolicy {
        DaemonPolicy::from_overrides(&self.blacklist, &self.whitelist)
    }
}

/// Per-daemon section. Empty lists mean "not configured".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ServiceSchedule {
    pub dow: Vec<String>,
    pub hours: Vec<String>,
    pub pre: Vec<String>,
    pub post: Vec<String>,
}

impl ServiceSchedule {
    /// Command run before the restart; only the first list element counts.
    #[must_use]
    pub fn pre_command(&self) -> Option<&str> {
        self.pre.first().map(String::as_str)
    }

    /// Command run after a successful restart; only the first list element counts.
    #[must_use]
    pub fn post_command(&self) -> Option<&str> {
        self.post.first().map(String::as_str)
    }
}

impl Config {
    /// Pick the file to read: the requested one if it exists, else the default.
    #[must_use]
    pub fn resolve_path(requested: Option<&Path>) -> PathBuf {
        match requested {
            Some(path) if path.is_file() => path.to_path_buf(),
            Some(path) => {
                warn!(
                    "Configuration file {} not found, using {DEFAULT_CONFIG_PATH}",
                    path.display()
                );
                PathBuf::from(DEFAULT_CONFIG_PATH)
            }
            None => PathBuf::from(DEFAULT_CONFIG_PATH),
        }
    }

    /// Load from `path`. A missing file is an empty configuration.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No configuration file at {}", path.display());
            return Ok(Self::default());
        }
        if !path.is_file() {
            return Err(DrError::InvalidConfig {
                details: format!("{} is not a regular file", path.display()),
            });
        }
        debug!("Using config file: {}", path.display());
        let ini = Ini::load_from_file_opt(path, parse_option()).map_err(|err| match err {
            ini::Error::Io(source) => DrError::io(path, source),
            ini::Error::Parse(parse) => DrError::ConfigParse {
                path: path.to_path_buf(),
                details: parse.to_string(),
            },
        })?;
        Ok(Self::from_ini(&ini))
    }

    /// Parse configuration text.
    pub fn parse_str(text: &str) -> Result<Self> {
        let ini = Ini::load_from_str_opt(text, parse_option()).map_err(|err| DrError::ConfigParse {
            path: PathBuf::from("<string>"),
            details: err.to_string(),
        })?;
        Ok(Self::from_ini(&ini))
    }

    fn from_ini(ini: &Ini) -> Self {
        let mut config = Self::default();
        let defaults = ini.section(Some(DEFAULT_SECTION));

        for (section, props) in ini.iter() {
            let props = Section { own: props, defaults };
            match section {
                None => {}
                Some(name) if name == DEFAULT_SECTION => {}
                Some(name) if name == MAIN_SECTION => {
                    config.main = parse_main(&props);
                }
                Some(name) => {
                    debug!("Reading config section [{name}] ...");
                    let schedule = parse_service(&props);
                    debug!("[{name}] {schedule:?}");
                    config.services.insert(name.to_string(), schedule);
                }
            }
        }

        config
    }

    /// Settings for `daemon`, if it has a section.
    #[must_use]
    pub fn service(&self, daemon: &str) -> Option<&ServiceSchedule> {
        self.services.get(daemon)
    }
}

/// Hook commands are shell text; backslashes and quotes must reach `sh` untouched.
fn parse_option() -> ParseOption {
    ParseOption {
        enabled_quote: false,
        enabled_escape: false,
        ..ParseOption::default()
    }
}

/// A section's own keys, falling back to `[DEFAULT]`.
struct Section<'a> {
    own: &'a Properties,
    defaults: Option<&'a Properties>,
}

impl<'a> Section<'a> {
    fn get(&self, key: &str) -> Option<&'a str> {
        lookup(self.own, key).or_else(|| self.defaults.and_then(|d| lookup(d, key)))
    }
}

fn parse_main(props: &Section<'_>) -> MainConfig {
    let mut main = MainConfig::default();
    if let Some(value) = props.get("blacklist") {
        main.blacklist = split_list(value).into_iter().collect();
    }
    if let Some(value) = props.get("whitelist") {
        main.whitelist = split_list(value).into_iter().collect();
    }
    if let Some(value) = props.get("inspector").map(str::trim).filter(|v| !v.is_empty()) {
        main.inspector = value.to_string();
    }
    if let Some(value) = props
        .get("service_manager")
        .map(str::trim)
        .filter(|v| !v.is_empty())
    {
        main.service_manager = value.to_string();
    }
    main
}

fn parse_service(props: &Section<'_>) -> ServiceSchedule {
    let list = |key: &str| props.get(key).map(split_list).unwrap_or_default();
    ServiceSchedule {
        dow: list("dow"),
        hours: list("hours"),
        pre: list("pre"),
        post: list("post"),
    }
}

fn lookup<'a>(props: &'a Properties, key: &str) -> Option<&'a str> {
    props
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(key))
        .map(|(_, v)| v)
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
