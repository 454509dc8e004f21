use std::env;
use tracing::warn;

const DEFAULT_STORE_TIMEOUT_SECS: u64 = 5;
const DEFAULT_MAX_CONCURRENT_AVAILABILITY_CHECKS: usize = 5;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub supabase_url: String,
    pub supabase_anon_key: String,
    /// Deadline applied to every single store read. A read that misses it is
    /// treated as a failed lookup, never as an implicit "available".
    pub store_timeout_secs: u64,
    /// Upper bound on in-flight per-doctor availability enumerations.
    pub max_concurrent_availability_checks: usize,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            supabase_url: env::var("SUPABASE_URL")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_URL not set, using empty value");
                    String::new()
                }),
            supabase_anon_key: env::var("SUPABASE_ANON_PUBLIC_KEY")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_ANON_PUBLIC_KEY not set, using empty value");
                    String::new()
                }),
            store_timeout_secs: env::var("STORE_TIMEOUT_SECONDS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_STORE_TIMEOUT_SECS),
            max_concurrent_availability_checks: env::var("MAX_CONCURRENT_AVAILABILITY_CHECKS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_MAX_CONCURRENT_AVAILABILITY_CHECKS),
        };

        if !config.is_configured() {
            warn!("Application not fully configured - missing environment variables");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.supabase_url.is_empty() && !self.supabase_anon_key.is_empty()
    }
}
