pub mod data_url;
pub mod gemini;
pub mod google_auth;
