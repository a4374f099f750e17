//! Membership tiers -- Basic/Elite/Premium gating and pricing.

use serde::{Deserialize, Deserializer, Serialize};

/// Membership level. Premium content requires Elite or above.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Tier {
    Basic,
    Elite,
    Premium,
}

impl Tier {
    /// Parse a stored tier string. Unknown values fall back to Basic,
    /// matching how a missing profile row is treated.
    pub fn from_name(name: &str) -> Self {
        match name {
            "Elite" => Tier::Elite,
            "Premium" => Tier::Premium,
            _ => Tier::Basic,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Tier::Basic => "Basic",
            Tier::Elite => "Elite",
            Tier::Premium => "Premium",
        }
    }

    /// Premium videos are playable only on Elite and Premium.
    pub fn can_watch_premium(self) -> bool {
        matches!(self, Tier::Elite | Tier::Premium)
    }

    /// Monthly price in KSH. Basic is free.
    pub fn monthly_price_ksh(self) -> u32 {
        match self {
            Tier::Basic => 0,
            Tier::Elite => 200,
            Tier::Premium => 450,
        }
    }

    /// Advertised per-video earn ceiling in KSH.
    pub fn earn_per_video_ksh(self) -> u32 {
        match self {
            Tier::Basic => 50,
            Tier::Elite => 150,
            Tier::Premium => 200,
        }
    }

    pub fn features(self) -> &'static [&'static str] {
        match self {
            Tier::Basic => &[
                "Access to basic video categories",
                "Earn up to 50 KSH per video",
                "Daily earning limit: 500 KSH",
                "Standard withdrawal processing",
                "Basic customer support",
            ],
            Tier::Elite => &[
                "Access to premium video categories",
                "Earn up to 150 KSH per video",
                "Daily earning limit: 1,000 KSH",
                "Priority withdrawal processing",
                "Priority customer support",
                "Weekly bonus rewards",
            ],
            Tier::Premium => &[
                "Access to all video categories",
                "Earn up to 200 KSH per video",
                "Unlimited daily earnings",
                "Instant withdrawal processing",
                "24/7 premium customer support",
                "Weekly bonus rewards",
                "Exclusive content access",
                "Referral bonus multiplier",
            ],
        }
    }

    pub const ALL: [Tier; 3] = [Tier::Basic, Tier::Elite, Tier::Premium];
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl Default for Tier {
    fn default() -> Self {
        Tier::Basic
    }
}

// Stored rows may carry tier strings we have never heard of; fall back to
// Basic instead of failing the whole profile fetch.
impl<'de> Deserialize<'de> for Tier {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(Tier::from_name(&name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tier_from_name_known() {
        assert_eq!(Tier::from_name("Elite"), Tier::Elite);
        assert_eq!(Tier::from_name("Premium"), Tier::Premium);
        assert_eq!(Tier::from_name("Basic"), Tier::Basic);
    }

    #[test]
    fn tier_from_name_unknown_is_basic() {
        assert_eq!(Tier::from_name("Diamond"), Tier::Basic);
        assert_eq!(Tier::from_name(""), Tier::Basic);
    }

    #[test]
    fn premium_gating() {
        assert!(!Tier::Basic.can_watch_premium());
        assert!(Tier::Elite.can_watch_premium());
        assert!(Tier::Premium.can_watch_premium());
    }
}
