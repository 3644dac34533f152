use serde::{Deserialize, Serialize};

/// Subscription tier, identified by how many sessions per week it includes.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum PlanId {
    #[default]
    OnceAWeek,
    TwiceAWeek,
    ThriceAWeek,
    FourTimesAWeek,
}

impl PlanId {
    pub const ALL: [PlanId; 4] = [
        PlanId::OnceAWeek,
        PlanId::TwiceAWeek,
        PlanId::ThriceAWeek,
        PlanId::FourTimesAWeek,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PlanId::OnceAWeek => "once_a_week",
            PlanId::TwiceAWeek => "twice_a_week",
            PlanId::ThriceAWeek => "thrice_a_week",
            PlanId::FourTimesAWeek => "four_times_a_week",
        }
    }

    /// Sessions per week.
    pub fn frequency(&self) -> u32 {
        match self {
            PlanId::OnceAWeek => 1,
            PlanId::TwiceAWeek => 2,
            PlanId::ThriceAWeek => 3,
            PlanId::FourTimesAWeek => 4,
        }
    }

    /// Classes covered by one monthly payment.
    ///
    /// Kept as its own table even though every tier is currently
    /// `frequency * 4`; billing divides one by the other.
    pub fn monthly_classes(&self) -> u32 {
        match self {
            PlanId::OnceAWeek => 4,
            PlanId::TwiceAWeek => 8,
            PlanId::ThriceAWeek => 12,
            PlanId::FourTimesAWeek => 16,
        }
    }

    /// Lenient parse for codes we don't control: anything unrecognised is
    /// billed as the once-a-week tier. The flag is true when that happened.
    pub fn resolve_code(code: &str) -> (Self, bool) {
        match code.parse() {
            Ok(id) => (id, false),
            Err(_) => (PlanId::default(), true),
        }
    }
}

impl std::fmt::Display for PlanId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for PlanId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "once_a_week" => Ok(PlanId::OnceAWeek),
            "twice_a_week" => Ok(PlanId::TwiceAWeek),
            "thrice_a_week" => Ok(PlanId::ThriceAWeek),
            "four_times_a_week" => Ok(PlanId::FourTimesAWeek),
            _ => Err(format!(
                "Invalid plan: {}. Must be one of once_a_week, twice_a_week, thrice_a_week, four_times_a_week",
                s
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
    pub id: PlanId,
    pub name: String,
    pub price_cents: i64,
    pub currency: String,
    pub frequency: u32,
    pub monthly_classes: u32,
}

/// Monthly prices in cents, indexed like `PlanId::ALL`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanPrices(pub [i64; 4]);

impl Default for PlanPrices {
    fn default() -> Self {
        PlanPrices([13_000, 17_000, 20_000, 23_000])
    }
}

/// The fixed plan table. Built once at startup and shared read-only.
#[derive(Debug, Clone)]
pub struct PlanCatalog {
    plans: [Plan; 4],
}

impl PlanCatalog {
    pub fn new(prices: PlanPrices, currency: &str) -> Self {
        let plans = PlanId::ALL.map(|id| {
            let idx = id.frequency() as usize - 1;
            Plan {
                id,
                name: default_name(id).to_string(),
                price_cents: prices.0[idx],
                currency: currency.to_string(),
                frequency: id.frequency(),
                monthly_classes: id.monthly_classes(),
            }
        });
        Self { plans }
    }

    pub fn get(&self, id: PlanId) -> &Plan {
        &self.plans[id.frequency() as usize - 1]
    }

    pub fn price_cents(&self, id: PlanId) -> i64 {
        self.get(id).price_cents
    }

    pub fn currency(&self) -> &str {
        &self.plans[0].currency
    }

    /// Plans in ascending frequency order.
    pub fn all(&self) -> &[Plan] {
        &self.plans
    }
}

impl Default for PlanCatalog {
    fn default() -> Self {
        PlanCatalog::new(PlanPrices::default(), "PEN")
    }
}

fn default_name(id: PlanId) -> &'static str {
    match id {
        PlanId::OnceAWeek => "1 vez por semana",
        PlanId::TwiceAWeek => "2 veces por semana",
        PlanId::ThriceAWeek => "3 veces por semana",
        PlanId::FourTimesAWeek => "4 veces por semana",
    }
}
