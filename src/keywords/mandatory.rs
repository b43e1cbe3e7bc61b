// Mandatory-term matcher: guaranteed inclusion for dictionary hits.
//
// Frequency ranking alone misses terms a JD mentions once in a comma list
// ("Python, AWS, Kubernetes"). Every mandatory dictionary term found in the
// cleaned JD as a whole word is reported here, regardless of frequency.

use std::collections::BTreeSet;

use super::models::Category;
use super::ruleset::Classifier;
use crate::text::{count_whole_word, normalize_term};

/// A mandatory dictionary term present in the JD.
#[derive(Debug, Clone, PartialEq)]
pub struct MandatoryHit {
    /// Canonical display form
    pub term: String,
    pub categories: BTreeSet<Category>,
    pub frequency: usize,
}

impl MandatoryHit {
    pub fn is_soft_skill(&self) -> bool {
        self.categories.contains(&Category::SoftSkill)
            && !self.categories.iter().any(|c| c.is_technical())
    }
}

/// Find every mandatory term in `clean_text`, most frequent first.
///
/// A hit whose every occurrence sits inside a longer hit ("Spark" inside
/// "Apache Spark") is dropped in favour of the longer term.
pub fn find_mandatory(classifier: &Classifier, clean_text: &str) -> Vec<MandatoryHit> {
    let mut hits: Vec<MandatoryHit> = classifier
        .mandatory_terms()
        .filter_map(|info| {
            let frequency = count_whole_word(clean_text, &info.display);
            (frequency > 0).then(|| MandatoryHit {
                term: info.display.clone(),
                categories: info.categories.clone(),
                frequency,
            })
        })
        .collect();

    let subsumed: Vec<bool> = hits
        .iter()
        .map(|short| {
            let key = normalize_term(&short.term);
            hits.iter().any(|long| {
                long.term.len() > short.term.len()
                    && count_whole_word(&long.term, &key) > 0
                    && long.frequency >= short.frequency
            })
        })
        .collect();
    let mut keep = subsumed.iter().map(|s| !s);
    hits.retain(|_| keep.next().unwrap_or(true));

    hits.sort_by(|a, b| b.frequency.cmp(&a.frequency).then_with(|| a.term.cmp(&b.term)));
    hits
}
