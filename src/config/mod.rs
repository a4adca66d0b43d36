pub mod locale;
pub mod settings;

pub use locale::{system_locale, LocaleTag};
pub use settings::{LanguageSetting, Settings, LANGUAGE_ENV_VAR};
