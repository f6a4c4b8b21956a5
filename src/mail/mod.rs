pub mod mail_app;
pub mod provider;
