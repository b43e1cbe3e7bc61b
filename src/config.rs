use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};
use chrono::Duration;

use crate::keywords::models::{MentionRange, Tier};

/// Named configuration profile. The two profiles differ in tier split and
/// high-tier mention targets; everything else is shared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    /// 40 / 35 / 25 split, high-tier terms mentioned 3–5 times (default)
    Balanced,
    /// 45 / 35 / 20 split, high-tier terms mentioned 4–6 times
    Aggressive,
}

impl FromStr for Profile {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "balanced" | "" => Ok(Profile::Balanced),
            "aggressive" => Ok(Profile::Aggressive),
            other => anyhow::bail!("Unknown profile '{other}' (expected balanced or aggressive)"),
        }
    }
}

/// Every tunable of the tailoring engine.
///
/// `Default` is the balanced profile. Values are plain data so callers and
/// tests can tweak a single field with struct update syntax.
#[derive(Debug, Clone)]
pub struct TailorConfig {
    /// Maximum keywords kept after ranking (mandatory hits may exceed it)
    pub max_keywords: usize,
    /// JDs shorter than this (in chars, after cleaning) yield no keywords
    pub min_jd_chars: usize,
    /// Cleaned JD text is truncated to this many bytes
    pub max_jd_chars: usize,
    /// Résumés with fewer rendered words pass through unchanged
    pub min_resume_words: usize,
    /// Fraction of ranked keywords placed in the high tier
    pub high_tier_share: f64,
    /// Fraction of ranked keywords placed in the medium tier (low gets the rest)
    pub medium_tier_share: f64,
    pub high_mentions: MentionRange,
    pub medium_mentions: MentionRange,
    pub low_mentions: MentionRange,
    /// Match score (percent) below which one recovery pass runs
    pub target_match_score: f64,
    /// Maximum keyword occurrences per rendered word
    pub density_ceiling: f64,
    /// Distinct keywords a single bullet may hold (validator warns above it,
    /// the engine never injects past it)
    pub max_keywords_per_bullet: usize,
    /// Keyword cap per bullet during the main sweep for recent roles
    pub recent_bullet_cap: usize,
    /// Keyword cap per bullet during the main sweep for older roles
    pub older_bullet_cap: usize,
    /// How many roles from the top of the experience list count as recent
    pub recent_roles: usize,
    /// Extra passes for tiers still below their minimum
    pub extra_passes: usize,
    /// Rounds per extra pass are capped at `iteration_factor × bullet count`
    pub iteration_factor: usize,
    /// High-tier terms reserved for the summary
    pub summary_slice: usize,
    /// Terms the summary "Expertise includes" clause may list
    pub summary_clause_max: usize,
    /// Maximum entries in the skills section
    pub skills_cap: usize,
    pub cache_ttl: Duration,
    pub cache_capacity: usize,
    pub learned_capacity: usize,
    /// Upper bound of the multiplicative learned-keyword boost
    pub learned_boost_cap: f64,
    /// How many top-ranked keywords are written back to the learned store
    pub learned_update_top_n: usize,
}

impl Default for TailorConfig {
    fn default() -> Self {
        Self::for_profile(Profile::Balanced)
    }
}

impl TailorConfig {
    pub fn for_profile(profile: Profile) -> Self {
        let (high_share, medium_share, high_mentions) = match profile {
            Profile::Balanced => (0.40, 0.35, MentionRange::new(3, 5)),
            Profile::Aggressive => (0.45, 0.35, MentionRange::new(4, 6)),
        };

        Self {
            max_keywords: 35,
            min_jd_chars: 50,
            max_jd_chars: 15_000,
            min_resume_words: 20,
            high_tier_share: high_share,
            medium_tier_share: medium_share,
            high_mentions,
            medium_mentions: MentionRange::new(2, 4),
            low_mentions: MentionRange::new(1, 2),
            target_match_score: 90.0,
            density_ceiling: 0.05,
            max_keywords_per_bullet: 4,
            recent_bullet_cap: 3,
            older_bullet_cap: 2,
            recent_roles: 2,
            extra_passes: 3,
            iteration_factor: 5,
            summary_slice: 3,
            summary_clause_max: 6,
            skills_cap: 22,
            cache_ttl: Duration::minutes(30),
            cache_capacity: 100,
            learned_capacity: 500,
            learned_boost_cap: 2.0,
            learned_update_top_n: 20,
        }
    }

    /// Mention target for a tier.
    pub fn mentions_for(&self, tier: Tier) -> MentionRange {
        match tier {
            Tier::High => self.high_mentions,
            Tier::Medium => self.medium_mentions,
            Tier::Low => self.low_mentions,
        }
    }

    /// Reject settings the engine cannot honour.
    pub fn validate(&self) -> Result<()> {
        if self.high_tier_share < 0.0
            || self.medium_tier_share < 0.0
            || self.high_tier_share + self.medium_tier_share > 1.0
        {
            anyhow::bail!(
                "Tier shares must be non-negative and sum to at most 1.0 (high {}, medium {})",
                self.high_tier_share,
                self.medium_tier_share
            );
        }
        for (name, range) in [
            ("high", self.high_mentions),
            ("medium", self.medium_mentions),
            ("low", self.low_mentions),
        ] {
            if range.min == 0 || range.min > range.max {
                anyhow::bail!(
                    "Invalid {name} mention range {}-{}: need 1 <= min <= max",
                    range.min,
                    range.max
                );
            }
        }
        if !(self.density_ceiling > 0.0 && self.density_ceiling <= 1.0) {
            anyhow::bail!(
                "Density ceiling must be in (0, 1], got {}",
                self.density_ceiling
            );
        }
        if !(0.0..=100.0).contains(&self.target_match_score) {
            anyhow::bail!(
                "Target match score must be a percentage, got {}",
                self.target_match_score
            );
        }
        if self.max_keywords == 0 {
            anyhow::bail!("max_keywords must be at least 1");
        }
        Ok(())
    }
}

/// Central configuration loaded from environment variables.
///
/// The .env file is loaded by the binary before this runs. Every tailoring
/// tunable has a default, so an empty environment is a valid configuration.
pub struct Config {
    /// SQLite file for the learned keyword store and run history
    pub db_path: String,
    /// Optional JSON classification ruleset replacing the built-in one
    pub ruleset_path: Option<PathBuf>,
    pub profile: Profile,
    pub tailor: TailorConfig,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self> {
        let profile: Profile = env::var("ATSFIT_PROFILE")
            .unwrap_or_default()
            .parse()
            .context("Invalid ATSFIT_PROFILE")?;

        let mut tailor = TailorConfig::for_profile(profile);
        tailor.max_keywords = env_or("ATSFIT_MAX_KEYWORDS", tailor.max_keywords)?;
        tailor.target_match_score = env_or("ATSFIT_TARGET_SCORE", tailor.target_match_score)?;
        tailor.density_ceiling = env_or("ATSFIT_DENSITY_CEILING", tailor.density_ceiling)?;
        tailor.recent_bullet_cap = env_or("ATSFIT_BULLET_CAP", tailor.recent_bullet_cap)?;
        tailor.cache_capacity = env_or("ATSFIT_CACHE_CAPACITY", tailor.cache_capacity)?;
        tailor.learned_capacity = env_or("ATSFIT_LEARNED_CAPACITY", tailor.learned_capacity)?;
        let ttl_minutes: i64 = env_or("ATSFIT_CACHE_TTL_MINUTES", tailor.cache_ttl.num_minutes())?;
        tailor.cache_ttl = Duration::minutes(ttl_minutes);
        tailor.validate()?;

        Ok(Self {
            db_path: env::var("ATSFIT_DB_PATH").unwrap_or_else(|_| "./atsfit.db".to_string()),
            ruleset_path: env::var("ATSFIT_RULESET_PATH").ok().map(PathBuf::from),
            profile,
            tailor,
        })
    }
}

/// Parse an optional environment variable, falling back to `default` when unset.
fn env_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("{key}={raw:?} is not valid: {e}")),
        _ => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_balanced_profile() {
        let config = TailorConfig::default();
        assert_eq!(config.max_keywords, 35);
        assert_eq!(config.high_mentions, MentionRange::new(3, 5));
        assert!((config.high_tier_share - 0.40).abs() < f64::EPSILON);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_aggressive_profile_shifts_split() {
        let config = TailorConfig::for_profile(Profile::Aggressive);
        assert!((config.high_tier_share - 0.45).abs() < f64::EPSILON);
        assert_eq!(config.high_mentions, MentionRange::new(4, 6));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_split() {
        let config = TailorConfig {
            high_tier_share: 0.8,
            medium_tier_share: 0.4,
            ..TailorConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_inverted_range() {
        let config = TailorConfig {
            low_mentions: MentionRange { min: 3, max: 1 },
            ..TailorConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_profile_parse() {
        assert_eq!("Aggressive".parse::<Profile>().unwrap(), Profile::Aggressive);
        assert_eq!("".parse::<Profile>().unwrap(), Profile::Balanced);
        assert!("loud".parse::<Profile>().is_err());
    }
}
