use crate::diagnostic::DiagnosticStringSettings;
use crate::error::SettingsError;
use hdl_util::HDL_SETTINGS_FILE_NAME;
use std::path::Path;

/// Builder configuration, usually loaded from a `hdl_dsl.toml` file.
#[derive(Debug, Clone, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DslSettings {
    /// Report signed values used directly as `if_`/`elif` conditions.
    pub warn_signed_condition: bool,
    /// The name of state machines that do not specify one.
    pub fsm_default_name: String,
    /// The domain of state machines that do not specify one.
    pub fsm_default_domain: String,
    /// Include the source location when rendering diagnostics.
    pub diagnostic_footer_location: bool,
}

impl Default for DslSettings {
    fn default() -> Self {
        DslSettings {
            warn_signed_condition: true,
            fsm_default_name: "fsm".to_owned(),
            fsm_default_domain: "sync".to_owned(),
            diagnostic_footer_location: true,
        }
    }
}

impl DslSettings {
    pub fn from_toml(src: &str) -> Result<DslSettings, toml::de::Error> {
        toml::from_str(src)
    }

    pub fn from_path(path: &Path) -> Result<DslSettings, SettingsError> {
        let src = hdl_util::io::read_to_string(path)?;
        log::debug!("loading builder settings from {:?}", path);
        Ok(DslSettings::from_toml(&src)?)
    }

    /// Load the settings file from `dir` if there is one, otherwise use the defaults.
    pub fn from_dir(dir: &Path) -> Result<DslSettings, SettingsError> {
        let path = dir.join(HDL_SETTINGS_FILE_NAME);
        if path.is_file() {
            DslSettings::from_path(&path)
        } else {
            log::debug!("no {} in {:?}, using default settings", HDL_SETTINGS_FILE_NAME, dir);
            Ok(DslSettings::default())
        }
    }

    pub fn diagnostic_string_settings(&self) -> DiagnosticStringSettings {
        DiagnosticStringSettings {
            footer_location: self.diagnostic_footer_location,
        }
    }
}

#[cfg(test)]
mod test {
    use crate::error::SettingsError;
    use crate::settings::DslSettings;
    use std::path::Path;

    #[test]
    fn empty_file_gives_defaults() {
        let settings = DslSettings::from_toml("").unwrap();
        assert!(settings.warn_signed_condition);
        assert_eq!(settings.fsm_default_name, "fsm");
        assert_eq!(settings.fsm_default_domain, "sync");
    }

    #[test]
    fn partial_override() {
        let settings = DslSettings::from_toml("warn_signed_condition = false\nfsm_default_domain = \"fast\"\n").unwrap();
        assert!(!settings.warn_signed_condition);
        assert_eq!(settings.fsm_default_domain, "fast");
        assert_eq!(settings.fsm_default_name, "fsm");
    }

    #[test]
    fn unknown_field_is_rejected() {
        assert!(DslSettings::from_toml("fsm_default_colour = \"red\"").is_err());
    }

    #[test]
    fn missing_dir_file_gives_defaults() {
        let settings = DslSettings::from_dir(Path::new("does/not/exist")).unwrap();
        assert_eq!(settings.fsm_default_name, "fsm");
    }

    #[test]
    fn missing_file_is_io_error() {
        let result = DslSettings::from_path(Path::new("does/not/exist/hdl_dsl.toml"));
        assert!(matches!(result, Err(SettingsError::Io(_))));
    }
}
