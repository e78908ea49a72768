pub mod credentials;
pub mod endpoints;
pub mod http;
pub mod settings;
