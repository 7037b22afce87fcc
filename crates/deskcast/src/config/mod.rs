mod capture_config;
#[allow(clippy::module_inception)]
mod config;
mod output_config;

pub(crate) use {capture_config::CaptureConfig, config::Config, output_config::OutputConfig};

pub(crate) const DEFAULT_FILE_TYPE: &str = "video/webm";
pub(crate) const DEFAULT_FPS: u32 = 30;
pub(crate) const DEFAULT_SHOW_CURSOR: bool = true;

pub(crate) fn default_file_type() -> String {
    DEFAULT_FILE_TYPE.to_string()
}

pub(crate) fn default_fps() -> u32 {
    DEFAULT_FPS
}

pub(crate) fn default_show_cursor() -> bool {
    DEFAULT_SHOW_CURSOR
}
