pub mod json_file;
pub mod logging;
