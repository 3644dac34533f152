use std::{net::SocketAddr, path::PathBuf};

use axum::http::HeaderValue;
use env_helpers::get_env_default;
use url::Url;

use crate::entities::plan::{PlanId, PlanPrices};

pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub cors_origin: HeaderValue,
    /// JSON log destination. `LOG_FILE=""` disables file logging.
    pub log_file: Option<PathBuf>,
    /// Legacy student export loaded into the store at startup.
    pub students_seed_path: Option<PathBuf>,
    /// Default look-ahead for the due-students listing.
    pub due_soon_days: u32,
    /// Initials avatar service used when a student has no uploaded avatar.
    pub avatar_base_url: Url,
    pub plan_prices: PlanPrices,
    pub currency: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let bind_addr: SocketAddr =
            get_env_default("BIND_ADDR", SocketAddr::from(([127, 0, 0, 1], 3001)));
        let cors_origin: HeaderValue =
            get_env_default("CORS_ORIGIN", String::from("http://localhost:5173"))
                .parse()
                .expect("CORS_ORIGIN must be a valid header value");
        let log_file: String = get_env_default("LOG_FILE", "app.log".to_string());
        let students_seed_path: Option<PathBuf> = std::env::var("STUDENTS_SEED_PATH")
            .ok()
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from);
        let due_soon_days: u32 = get_env_default("DUE_SOON_DAYS", 7);
        let avatar_base_url: Url = get_env_default(
            "AVATAR_BASE_URL",
            "https://ui-avatars.com/api/".parse().unwrap(),
        );

        let defaults = PlanPrices::default();
        let plan_prices = PlanPrices(PlanId::ALL.map(|id| {
            let idx = id.frequency() as usize - 1;
            get_env_default(price_var(id), defaults.0[idx])
        }));
        let currency: String = get_env_default("CURRENCY", "PEN".to_string());

        Self {
            bind_addr,
            cors_origin,
            log_file: Some(PathBuf::from(log_file)).filter(|p| !p.as_os_str().is_empty()),
            students_seed_path,
            due_soon_days,
            avatar_base_url,
            plan_prices,
            currency,
        }
    }
}

fn price_var(id: PlanId) -> &'static str {
    match id {
        PlanId::OnceAWeek => "PLAN_PRICE_ONCE_A_WEEK_CENTS",
        PlanId::TwiceAWeek => "PLAN_PRICE_TWICE_A_WEEK_CENTS",
        PlanId::ThriceAWeek => "PLAN_PRICE_THRICE_A_WEEK_CENTS",
        PlanId::FourTimesAWeek => "PLAN_PRICE_FOUR_TIMES_A_WEEK_CENTS",
    }
}
