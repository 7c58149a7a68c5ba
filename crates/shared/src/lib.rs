pub mod chat;
pub mod usage;

pub mod settings {
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct OAuthCredentials {
        pub access_token: String,
        pub refresh_token: Option<String>,
        pub expires_at: Option<i64>, // Unix timestamp
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct ProviderAuth {
        pub api_key: Option<String>,
        pub oauth: Option<OAuthCredentials>,
    }

    /// User profile for personalization
    #[derive(Debug, Clone, Serialize, Deserialize, Default)]
    pub struct UserProfile {
        pub name: String,
        pub dark_mode: bool,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct AppSettings {
        /// Model used for tutoring responses, e.g. "gemini-3-flash-preview"
        pub gemini_model: String,
        pub gemini_auth: ProviderAuth,
        /// OAuth app registration for the Google sign-in button
        pub google_client_id: Option<String>,
        pub google_client_secret: Option<String>,
        #[serde(default)]
        pub user_profile: UserProfile,
    }

    impl Default for ProviderAuth {
        fn default() -> Self {
            Self {
                api_key: None,
                oauth: None,
            }
        }
    }

    impl Default for AppSettings {
        fn default() -> Self {
            Self {
                gemini_model: "gemini-3-flash-preview".into(),
                gemini_auth: ProviderAuth::default(),
                google_client_id: None,
                google_client_secret: None,
                user_profile: UserProfile::default(),
            }
        }
    }
}
