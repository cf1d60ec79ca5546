use std::env;
use tracing::warn;

pub const DEFAULT_SLOT_GRANULARITY_MINUTES: u32 = 30;
const MAX_SLOT_GRANULARITY_MINUTES: u32 = 240;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub supabase_service_role_key: String,
    pub supabase_jwt_secret: String,
    pub slot_granularity_minutes: u32,
    pub auto_confirm_appointments: bool,
    pub clinic_utc_offset_minutes: i32,
    pub port: u16,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            supabase_url: String::new(),
            supabase_anon_key: String::new(),
            supabase_service_role_key: String::new(),
            supabase_jwt_secret: String::new(),
            slot_granularity_minutes: DEFAULT_SLOT_GRANULARITY_MINUTES,
            auto_confirm_appointments: false,
            clinic_utc_offset_minutes: 0,
            port: 3000,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

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
            supabase_service_role_key: env::var("SUPABASE_SERVICE_ROLE_KEY")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_SERVICE_ROLE_KEY not set, using empty value");
                    String::new()
                }),
            supabase_jwt_secret: env::var("SUPABASE_JWT_SECRET")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_JWT_SECRET not set, using empty value");
                    String::new()
                }),
            slot_granularity_minutes: parse_var("SLOT_GRANULARITY_MINUTES", defaults.slot_granularity_minutes)
                .filter(|minutes| (1..=MAX_SLOT_GRANULARITY_MINUTES).contains(minutes))
                .unwrap_or_else(|| {
                    warn!("SLOT_GRANULARITY_MINUTES out of range, using {}", DEFAULT_SLOT_GRANULARITY_MINUTES);
                    DEFAULT_SLOT_GRANULARITY_MINUTES
                }),
            auto_confirm_appointments: parse_var("AUTO_CONFIRM_APPOINTMENTS", defaults.auto_confirm_appointments)
                .unwrap_or_else(|| {
                    warn!("AUTO_CONFIRM_APPOINTMENTS is not true/false, using {}", defaults.auto_confirm_appointments);
                    defaults.auto_confirm_appointments
                }),
            clinic_utc_offset_minutes: parse_var("CLINIC_UTC_OFFSET_MINUTES", defaults.clinic_utc_offset_minutes)
                .filter(|minutes| minutes.abs() < 24 * 60)
                .unwrap_or_else(|| {
                    warn!("CLINIC_UTC_OFFSET_MINUTES out of range, using UTC");
                    0
                }),
            port: parse_var("PORT", defaults.port).unwrap_or_else(|| {
                warn!("PORT is not a valid port number, using {}", defaults.port);
                defaults.port
            }),
        };

        if !config.is_configured() {
            warn!("Supabase not fully configured - falling back to the in-memory store");
        }

        config
    }

    /// True when every setting the Supabase-backed store needs is present.
    pub fn is_configured(&self) -> bool {
        !self.supabase_url.is_empty()
            && !self.supabase_anon_key.is_empty()
            && !self.supabase_service_role_key.is_empty()
            && !self.supabase_jwt_secret.is_empty()
    }
}

/// Missing variables yield the default; unparsable ones yield `None` so the
/// caller can warn.
fn parse_var<T: std::str::FromStr>(key: &str, default: T) -> Option<T> {
    match env::var(key) {
        Ok(raw) => raw.trim().parse().ok(),
        Err(_) => Some(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_not_configured() {
        let config = AppConfig::default();
        assert!(!config.is_configured());
        assert_eq!(config.slot_granularity_minutes, 30);
        assert!(!config.auto_confirm_appointments);
    }

    #[test]
    fn test_parse_var_distinguishes_missing_from_malformed() {
        assert_eq!(parse_var("VET_CLINIC_TEST_UNSET_VAR", 3000u16), Some(3000));

        env::set_var("VET_CLINIC_TEST_BAD_PORT", "abc");
        assert_eq!(parse_var("VET_CLINIC_TEST_BAD_PORT", 3000u16), None);

        env::set_var("VET_CLINIC_TEST_BAD_FLAG", "yes");
        assert_eq!(parse_var("VET_CLINIC_TEST_BAD_FLAG", false), None);

        env::set_var("VET_CLINIC_TEST_GOOD_FLAG", " true ");
        assert_eq!(parse_var("VET_CLINIC_TEST_GOOD_FLAG", false), Some(true));
    }

    #[test]
    fn test_fully_populated_config_is_configured() {
        let config = AppConfig {
            supabase_url: "http://localhost:54321".to_string(),
            supabase_anon_key: "anon".to_string(),
            supabase_service_role_key: "service".to_string(),
            supabase_jwt_secret: "secret".to_string(),
            ..AppConfig::default()
        };
        assert!(config.is_configured());
    }
}
