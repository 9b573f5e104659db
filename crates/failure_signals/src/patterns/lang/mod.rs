//! Builtin language packs. Each pack is static data; patterns are compiled case-insensitively
//! by the registry.

use super::PatternCategory;

mod de;
mod en;
mod es;
mod fr;

#[derive(Debug)]
pub struct LanguagePack {
    pub code: &'static str,
    pub name: &'static str,
    pub correction: &'static [&'static str],
    /// Anchored patterns matched against a whole (trimmed) user message.
    pub short_negative: &'static [&'static str],
    pub dissatisfaction: &'static [&'static str],
    pub satisfaction_override: &'static [&'static str],
    pub resolution: &'static [&'static str],
    pub system_claim: &'static [&'static str],
    pub hedge: &'static [&'static str],
    pub decision: &'static [&'static str],
    /// Each entry has exactly one capture group.
    pub topic: &'static [&'static str],
    pub noise_words: &'static [&'static str],
    pub keywords: &'static [&'static str],
}

impl LanguagePack {
    pub fn patterns(&self, category: PatternCategory) -> &'static [&'static str] {
        match category {
            PatternCategory::Correction => self.correction,
            PatternCategory::ShortNegative => self.short_negative,
            PatternCategory::Dissatisfaction => self.dissatisfaction,
            PatternCategory::SatisfactionOverride => self.satisfaction_override,
            PatternCategory::Resolution => self.resolution,
            PatternCategory::SystemClaim => self.system_claim,
            PatternCategory::Hedge => self.hedge,
            PatternCategory::Decision => self.decision,
            PatternCategory::Topic => self.topic,
        }
    }
}

static PACKS: [LanguagePack; 4] = [en::PACK, es::PACK, de::PACK, fr::PACK];

pub fn builtin_packs() -> &'static [LanguagePack] {
    &PACKS
}

pub fn pack(code: &str) -> Option<&'static LanguagePack> {
    let code = code.trim();
    PACKS.iter().find(|p| p.code.eq_ignore_ascii_case(code))
}
