pub mod fs;
pub mod i18n;
pub mod time;
