//! Prompt scores and APE variants

use serde::{Deserialize, Serialize};

use crate::constants::scoring::{CLARITY_CAP, SPECIFICITY_CAP, STRUCTURE_CAP, TOTAL_CAP};

/// Quality score on three axes
///
/// Built only through [`PromptScore::new`], so each axis is within its cap
/// and `total` always equals the capped sum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PromptScore {
    clarity: u32,
    specificity: u32,
    structure: u32,
    total: u32,
}

impl PromptScore {
    pub fn new(clarity: u32, specificity: u32, structure: u32) -> Self {
        let clarity = clarity.min(CLARITY_CAP);
        let specificity = specificity.min(SPECIFICITY_CAP);
        let structure = structure.min(STRUCTURE_CAP);
        Self {
            clarity,
            specificity,
            structure,
            total: (clarity + specificity + structure).min(TOTAL_CAP),
        }
    }

    pub fn clarity(&self) -> u32 {
        self.clarity
    }

    pub fn specificity(&self) -> u32 {
        self.specificity
    }

    pub fn structure(&self) -> u32 {
        self.structure
    }

    pub fn total(&self) -> u32 {
        self.total
    }
}

impl<'de> Deserialize<'de> for PromptScore {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Raw {
            clarity: u32,
            specificity: u32,
            structure: u32,
        }

        // Stored totals are recomputed rather than trusted
        let raw = Raw::deserialize(deserializer)?;
        Ok(Self::new(raw.clarity, raw.specificity, raw.structure))
    }
}

impl std::fmt::Display for PromptScore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}/{} (clarity {}/{}, specificity {}/{}, structure {}/{})",
            self.total,
            TOTAL_CAP,
            self.clarity,
            CLARITY_CAP,
            self.specificity,
            SPECIFICITY_CAP,
            self.structure,
            STRUCTURE_CAP
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantMeta {
    /// Style name, or `Fallback` when the rewrite failed
    pub variation: String,
    /// Technique name of the source config, or `Error` when the rewrite failed
    pub technique: String,
}

/// One rewritten prompt produced by the variant generator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApeVariant {
    pub id: String,
    pub prompt: String,
    pub score: PromptScore,
    pub meta: VariantMeta,
}

impl ApeVariant {
    pub fn is_fallback(&self) -> bool {
        self.id.ends_with("-fallback")
    }
}

/// Variants ordered by total score, highest first. Ties keep input order.
pub fn rank_variants(variants: &[ApeVariant]) -> Vec<&ApeVariant> {
    let mut ranked: Vec<&ApeVariant> = variants.iter().collect();
    ranked.sort_by(|a, b| b.score.total().cmp(&a.score.total()));
    ranked
}

/// Highest-scoring variant; the earliest one on ties
pub fn best_variant(variants: &[ApeVariant]) -> Option<&ApeVariant> {
    rank_variants(variants).into_iter().next()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn variant(id: &str, total_parts: (u32, u32, u32)) -> ApeVariant {
        ApeVariant {
            id: id.to_string(),
            prompt: String::new(),
            score: PromptScore::new(total_parts.0, total_parts.1, total_parts.2),
            meta: VariantMeta {
                variation: "style".to_string(),
                technique: "Zero-Shot".to_string(),
            },
        }
    }

    #[test]
    fn test_new_clamps_each_axis() {
        let score = PromptScore::new(45, 31, 99);
        assert_eq!(score.clarity(), 30);
        assert_eq!(score.specificity(), 30);
        assert_eq!(score.structure(), 40);
        assert_eq!(score.total(), 100);
    }

    #[test]
    fn test_deserialize_recomputes_total() {
        let score: PromptScore =
            serde_json::from_str(r#"{"clarity": 10, "specificity": 5, "structure": 50, "total": 7}"#)
                .unwrap();
        assert_eq!(score.structure(), 40);
        assert_eq!(score.total(), 55);
    }

    #[test]
    fn test_rank_is_descending_and_stable() {
        let variants = vec![
            variant("variant-0", (10, 0, 0)),
            variant("variant-1", (20, 0, 0)),
            variant("variant-2", (10, 0, 0)),
        ];
        let ids: Vec<&str> = rank_variants(&variants).iter().map(|v| v.id.as_str()).collect();
        assert_eq!(ids, vec!["variant-1", "variant-0", "variant-2"]);
        assert_eq!(best_variant(&variants).unwrap().id, "variant-1");
        assert!(best_variant(&[]).is_none());
    }

    #[test]
    fn test_fallback_detection() {
        assert!(variant("variant-2-fallback", (0, 0, 0)).is_fallback());
        assert!(!variant("variant-2", (0, 0, 0)).is_fallback());
    }

    proptest! {
        #[test]
        fn prop_total_is_capped_sum(c in 0u32..200, s in 0u32..200, t in 0u32..200) {
            let score = PromptScore::new(c, s, t);
            prop_assert!(score.clarity() <= CLARITY_CAP);
            prop_assert!(score.specificity() <= SPECIFICITY_CAP);
            prop_assert!(score.structure() <= STRUCTURE_CAP);
            prop_assert_eq!(
                score.total(),
                (score.clarity() + score.specificity() + score.structure()).min(TOTAL_CAP)
            );
        }
    }
}
