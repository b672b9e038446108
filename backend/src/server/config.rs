//! Server settings loaded via OrthoConfig.
//!
//! Values come from defaults, an optional configuration file, `FIELDCREW_*`
//! environment variables and command-line flags, in increasing precedence.

use ortho_config::OrthoConfig;
use serde::Deserialize;
use thiserror::Error;

use fieldcrew::domain::DEFAULT_WORKING_HOURS;
use fieldcrew::inbound::http::state::PagingSettings;

/// Rejected combinations of settings.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SettingsError {
    /// A page size of zero, or a default above the maximum.
    #[error("page sizes must satisfy 1 <= default ({default}) <= max ({max})")]
    PageSize { default: usize, max: usize },
    /// Negative or non-finite working hours.
    #[error("default working hours must be a finite number, at least 0 (got {0})")]
    WorkingHours(f64),
}

/// Settings for the HTTP server and the services behind it.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "FIELDCREW")]
pub struct ServerSettings {
    /// Interface to bind.
    #[ortho_config(default = "0.0.0.0".to_owned())]
    pub host: String,
    /// Port to bind.
    #[ortho_config(default = 8080)]
    pub port: u16,
    /// Page size used when a list request omits `pageSize`.
    #[ortho_config(default = 10)]
    pub default_page_size: usize,
    /// Largest accepted `pageSize`.
    #[ortho_config(default = 100)]
    pub max_page_size: usize,
    /// Hours seeded into a new job card when the job has no estimate.
    #[ortho_config(default = DEFAULT_WORKING_HOURS)]
    pub default_working_hours: f64,
}

impl ServerSettings {
    /// Socket address the server binds to.
    pub fn bind_addr(&self) -> (&str, u16) {
        (self.host.as_str(), self.port)
    }

    /// Validated list page sizes.
    pub fn paging(&self) -> Result<PagingSettings, SettingsError> {
        let (default, max) = (self.default_page_size, self.max_page_size);
        if default == 0 || default > max {
            return Err(SettingsError::PageSize { default, max });
        }
        Ok(PagingSettings {
            default_page_size: default,
            max_page_size: max,
        })
    }

    /// Validated fallback job card hours.
    pub fn working_hours(&self) -> Result<f64, SettingsError> {
        let hours = self.default_working_hours;
        if hours.is_finite() && hours >= 0.0 {
            Ok(hours)
        } else {
            Err(SettingsError::WorkingHours(hours))
        }
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for server settings parsing.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARS: [&str; 5] = [
        "FIELDCREW_HOST",
        "FIELDCREW_PORT",
        "FIELDCREW_DEFAULT_PAGE_SIZE",
        "FIELDCREW_MAX_PAGE_SIZE",
        "FIELDCREW_DEFAULT_WORKING_HOURS",
    ];

    fn load_from_empty_args() -> ServerSettings {
        ServerSettings::load_from_iter([OsString::from("fieldcrew")]).expect("config should load")
    }

    #[rstest]
    fn default_values_are_used_when_missing() {
        let _guard = lock_env(VARS.map(|name| (name, None::<String>)));

        let settings = load_from_empty_args();
        assert_eq!(settings.bind_addr(), ("0.0.0.0", 8080));
        assert_eq!(settings.paging(), Ok(PagingSettings::default()));
        assert_eq!(settings.working_hours(), Ok(DEFAULT_WORKING_HOURS));
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env([
            ("FIELDCREW_HOST", Some("127.0.0.1".to_owned())),
            ("FIELDCREW_PORT", Some("9090".to_owned())),
            ("FIELDCREW_DEFAULT_PAGE_SIZE", Some("25".to_owned())),
            ("FIELDCREW_MAX_PAGE_SIZE", Some("50".to_owned())),
            ("FIELDCREW_DEFAULT_WORKING_HOURS", Some("6.5".to_owned())),
        ]);

        let settings = load_from_empty_args();
        assert_eq!(settings.bind_addr(), ("127.0.0.1", 9090));
        assert_eq!(
            settings.paging(),
            Ok(PagingSettings {
                default_page_size: 25,
                max_page_size: 50,
            })
        );
        assert_eq!(settings.working_hours(), Ok(6.5));
    }

    #[rstest]
    #[case("0", "100")]
    #[case("50", "20")]
    fn inconsistent_page_sizes_are_rejected(#[case] default: &str, #[case] max: &str) {
        let _guard = lock_env([
            ("FIELDCREW_HOST", None),
            ("FIELDCREW_PORT", None),
            ("FIELDCREW_DEFAULT_PAGE_SIZE", Some(default.to_owned())),
            ("FIELDCREW_MAX_PAGE_SIZE", Some(max.to_owned())),
            ("FIELDCREW_DEFAULT_WORKING_HOURS", None),
        ]);

        let settings = load_from_empty_args();
        assert!(matches!(
            settings.paging(),
            Err(SettingsError::PageSize { .. })
        ));
    }

    #[rstest]
    fn negative_working_hours_are_rejected() {
        let _guard = lock_env([
            ("FIELDCREW_HOST", None),
            ("FIELDCREW_PORT", None),
            ("FIELDCREW_DEFAULT_PAGE_SIZE", None),
            ("FIELDCREW_MAX_PAGE_SIZE", None),
            ("FIELDCREW_DEFAULT_WORKING_HOURS", Some("-2".to_owned())),
        ]);

        let settings = load_from_empty_args();
        assert_eq!(settings.working_hours(), Err(SettingsError::WorkingHours(-2.0)));
    }
}
