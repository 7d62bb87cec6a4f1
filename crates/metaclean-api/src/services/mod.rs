pub mod sanitize;

pub use sanitize::SanitizationService;
