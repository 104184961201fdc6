pub mod io;
pub mod swrite;

#[macro_export]
macro_rules! hdl_settings_file_name_macro {
    () => {
        "hdl_dsl.toml"
    };
}

/// The settings file that is looked up in a design directory.
pub const HDL_SETTINGS_FILE_NAME: &str = hdl_settings_file_name_macro!();
