mod auth;
mod cache;
mod credentials;

pub use auth::TokenManager;
pub use cache::AnalysisCache;
pub use credentials::CredentialStore;
