//! Keyword-driven advisory matcher.
//!
//! Maps a free-text farming question to one canned answer. Rules are tested
//! in a fixed priority order and the first rule with any keyword contained in
//! the lowercased question wins. Questions matching nothing get the generic
//! advice, so every input has exactly one answer.

use std::fmt;

/// Topic an advisory rule answers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AdvisoryCategory {
    Irrigation,
    Fertilizer,
    Pest,
    Soil,
    Planting,
    Disease,
    Harvest,
    Weather,
}

impl fmt::Display for AdvisoryCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AdvisoryCategory::Irrigation => "irrigation",
            AdvisoryCategory::Fertilizer => "fertilizer",
            AdvisoryCategory::Pest => "pest",
            AdvisoryCategory::Soil => "soil",
            AdvisoryCategory::Planting => "planting",
            AdvisoryCategory::Disease => "disease",
            AdvisoryCategory::Harvest => "harvest",
            AdvisoryCategory::Weather => "weather",
        };
        f.write_str(name)
    }
}

/// Trigger keywords paired with the answer they select.
#[derive(Clone, Copy, Debug)]
pub struct AdvisoryRule {
    pub category: AdvisoryCategory,
    /// Lowercase substrings; any one of them triggers the rule.
    pub keywords: &'static [&'static str],
    pub answer: &'static str,
}

impl AdvisoryRule {
    /// Whether `lowered` (already lowercased) contains any trigger keyword.
    fn triggers(&self, lowered: &str) -> bool {
        self.keywords.iter().any(|kw| lowered.contains(kw))
    }
}

pub const IRRIGATION_ANSWER: &str = "Water your crops early morning or late evening. Most crops need 1-2 inches of water per week. Check soil moisture by inserting your finger 2 inches deep - if dry, it's time to water.";
pub const FERTILIZER_ANSWER: &str = "Use balanced NPK fertilizer (10-10-10) for most crops. Apply organic compost monthly. For vegetables, use nitrogen-rich fertilizer during growth phase and phosphorus-rich during flowering.";
pub const PEST_ANSWER: &str = "Use neem oil for organic pest control. Companion planting with marigolds helps repel pests. Check plants regularly for early pest detection. Encourage beneficial insects like ladybugs.";
pub const SOIL_ANSWER: &str = "Good soil should be well-draining, rich in organic matter, with pH 6.0-7.0. Add compost annually. Test soil pH every 2-3 years. Rotate crops to prevent soil depletion.";
pub const PLANTING_ANSWER: &str = "Plant seeds at depth 2-3 times their diameter. Space according to plant requirements. Start seeds indoors 6-8 weeks before last frost for warm season crops.";
pub const DISEASE_ANSWER: &str = "Prevent disease with good air circulation and proper spacing. Remove affected plant parts immediately. Use copper fungicide for fungal issues. Avoid overhead watering.";
pub const HARVEST_ANSWER: &str = "Harvest in early morning when plants are fully hydrated. Pick fruits when fully colored but still firm. Leafy greens taste best when young and tender.";
pub const WEATHER_ANSWER: &str = "Monitor local weather forecasts. Protect crops from frost with row covers. Provide shade during extreme heat. Adjust watering based on weather conditions.";

/// Returned when no rule matches.
pub const DEFAULT_ANSWER: &str = "For best farming results, focus on healthy soil, proper watering, adequate sunlight, and regular monitoring. Consider your local climate and growing season when planning crops.";

/// Rules in priority order; earlier entries win.
pub static ADVISORY_RULES: [AdvisoryRule; 8] = [
    AdvisoryRule {
        category: AdvisoryCategory::Irrigation,
        keywords: &["water", "irrigation"],
        answer: IRRIGATION_ANSWER,
    },
    AdvisoryRule {
        category: AdvisoryCategory::Fertilizer,
        keywords: &["fertilizer", "nutrients"],
        answer: FERTILIZER_ANSWER,
    },
    AdvisoryRule {
        category: AdvisoryCategory::Pest,
        keywords: &["pest", "insect"],
        answer: PEST_ANSWER,
    },
    AdvisoryRule {
        category: AdvisoryCategory::Soil,
        keywords: &["soil", "ground"],
        answer: SOIL_ANSWER,
    },
    AdvisoryRule {
        category: AdvisoryCategory::Planting,
        keywords: &["plant", "seed", "grow"],
        answer: PLANTING_ANSWER,
    },
    AdvisoryRule {
        category: AdvisoryCategory::Disease,
        keywords: &["disease", "sick"],
        answer: DISEASE_ANSWER,
    },
    AdvisoryRule {
        category: AdvisoryCategory::Harvest,
        keywords: &["harvest", "pick"],
        answer: HARVEST_ANSWER,
    },
    AdvisoryRule {
        category: AdvisoryCategory::Weather,
        keywords: &["weather", "climate"],
        answer: WEATHER_ANSWER,
    },
];

/// Pure question-to-answer lookup over an immutable rule table.
#[derive(Clone, Copy, Debug)]
pub struct AdvisoryMatcher {
    rules: &'static [AdvisoryRule],
}

impl Default for AdvisoryMatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl AdvisoryMatcher {
    pub fn new() -> Self {
        Self {
            rules: &ADVISORY_RULES,
        }
    }

    pub fn rules(&self) -> &'static [AdvisoryRule] {
        self.rules
    }

    /// The first rule triggered by `question`, if any.
    pub fn classify(&self, question: &str) -> Option<&'static AdvisoryRule> {
        let lowered = question.to_lowercase();
        self.rules.iter().find(|rule| rule.triggers(&lowered))
    }

    /// Answer for `question`. Never empty; unmatched input gets [`DEFAULT_ANSWER`].
    pub fn answer(&self, question: &str) -> &'static str {
        self.classify(question)
            .map(|rule| rule.answer)
            .unwrap_or(DEFAULT_ANSWER)
    }
}

/// Convenience wrapper over the built-in rule table.
pub fn match_question(question: &str) -> &'static str {
    AdvisoryMatcher::new().answer(question)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn m() -> AdvisoryMatcher {
        AdvisoryMatcher::new()
    }

    #[test]
    fn test_watering_question_gets_irrigation_answer() {
        let answer = m().answer("How often should I water my tomatoes?");
        assert_eq!(answer, IRRIGATION_ANSWER);
        assert!(answer.starts_with("Water your crops early morning"));
    }

    #[test]
    fn test_unmatched_question_gets_default() {
        assert_eq!(m().answer("xyz"), DEFAULT_ANSWER);
        assert!(m().classify("xyz").is_none());
    }

    #[test]
    fn test_empty_question_gets_default() {
        assert_eq!(m().answer(""), DEFAULT_ANSWER);
    }

    #[test]
    fn test_matching_is_case_insensitive() {
        assert_eq!(m().answer("IRRIGATION schedule"), IRRIGATION_ANSWER);
        assert_eq!(m().answer("Which FERTILIZER?"), FERTILIZER_ANSWER);
    }

    #[test]
    fn test_each_keyword_selects_its_own_category() {
        for rule in m().rules() {
            for kw in rule.keywords {
                let question = format!("tell me about {}", kw);
                let hit = m().classify(&question).unwrap();
                assert_eq!(hit.category, rule.category, "keyword {kw}");
            }
        }
    }

    #[test]
    fn test_pest_beats_soil() {
        let rule = m().classify("pest in my soil").unwrap();
        assert_eq!(rule.category, AdvisoryCategory::Pest);
        assert_eq!(m().answer("soil full of pests"), PEST_ANSWER);
    }

    #[test]
    fn test_irrigation_beats_every_later_category() {
        let q = "water fertilizer pest soil seed disease harvest climate";
        assert_eq!(m().answer(q), IRRIGATION_ANSWER);
    }

    #[test]
    fn test_substring_not_token_matching() {
        // "watering" and "groundnut" contain trigger substrings
        assert_eq!(m().answer("watering can"), IRRIGATION_ANSWER);
        assert_eq!(m().answer("groundnut yield"), SOIL_ANSWER);
        // "planting" contains "plant"
        assert_eq!(m().answer("planting depth"), PLANTING_ANSWER);
    }

    #[test]
    fn test_weather_is_last_priority() {
        assert_eq!(m().answer("climate change"), WEATHER_ANSWER);
        assert_eq!(m().answer("harvest weather"), HARVEST_ANSWER);
    }

    #[test]
    fn test_mixed_language_question() {
        assert_eq!(m().answer("मेरी फसल में pest लग गया है"), PEST_ANSWER);
        assert_eq!(m().answer("ਮੌਸਮ kaisa hai"), DEFAULT_ANSWER);
    }

    #[test]
    fn test_match_is_deterministic() {
        let q = "When should I pick mangoes?";
        let first = m().answer(q);
        for _ in 0..10 {
            assert_eq!(m().answer(q), first);
        }
        assert_eq!(first, HARVEST_ANSWER);
    }

    #[test]
    fn test_every_answer_non_empty() {
        for rule in m().rules() {
            assert!(!rule.answer.is_empty());
        }
        assert!(!DEFAULT_ANSWER.is_empty());
    }

    #[test]
    fn test_priority_order_is_documented_order() {
        let order: Vec<AdvisoryCategory> = m().rules().iter().map(|r| r.category).collect();
        assert_eq!(
            order,
            vec![
                AdvisoryCategory::Irrigation,
                AdvisoryCategory::Fertilizer,
                AdvisoryCategory::Pest,
                AdvisoryCategory::Soil,
                AdvisoryCategory::Planting,
                AdvisoryCategory::Disease,
                AdvisoryCategory::Harvest,
                AdvisoryCategory::Weather,
            ]
        );
    }

    #[test]
    fn test_match_question_helper() {
        assert_eq!(match_question("sick leaves"), DISEASE_ANSWER);
    }

    #[test]
    fn test_very_long_input() {
        let q = "a".repeat(100_000) + " insect";
        assert_eq!(m().answer(&q), PEST_ANSWER);
    }

    #[test]
    fn test_category_display() {
        assert_eq!(AdvisoryCategory::Irrigation.to_string(), "irrigation");
        assert_eq!(AdvisoryCategory::Weather.to_string(), "weather");
    }
}
