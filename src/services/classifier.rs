//! Title classifier.
//!
//! Decides whether an ad belongs to the watched product family and whether it
//! mentions one of the priority models.

use crate::models::{Classification, FilterConfig};
use crate::utils::contains_any;

/// Pure title classifier.
#[derive(Debug, Clone)]
pub struct Classifier {
    include: Vec<String>,
    priority: Vec<String>,
}

impl Classifier {
    /// Create a classifier from include and priority token lists.
    pub fn new(include: Vec<String>, priority: Vec<String>) -> Self {
        let normalize = |tokens: Vec<String>| {
            tokens
                .into_iter()
                .map(|t| t.trim().to_lowercase())
                .filter(|t| !t.is_empty())
                .collect::<Vec<_>>()
        };
        Self {
            include: normalize(include),
            priority: normalize(priority),
        }
    }

    pub fn from_config(config: &FilterConfig) -> Self {
        Self::new(config.include.clone(), config.priority.clone())
    }

    pub fn classify(&self, title: &str) -> Classification {
        let title = title.to_lowercase();
        Classification {
            included: contains_any(&title, &self.include),
            priority: contains_any(&title, &self.priority),
        }
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::from_config(&FilterConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_model() {
        let c = Classifier::default().classify("Canon IXUS 135");
        assert_eq!(
            c,
            Classification {
                included: true,
                priority: true
            }
        );
    }

    #[test]
    fn test_standard_model() {
        let c = Classifier::default().classify("Canon IXUS 300");
        assert_eq!(
            c,
            Classification {
                included: true,
                priority: false
            }
        );
    }

    #[test]
    fn test_other_family() {
        let c = Classifier::default().classify("Nikon Coolpix");
        assert_eq!(c, Classification::default());
    }

    #[test]
    fn test_priority_never_implies_inclusion() {
        let c = Classifier::default().classify("Sony DSC-W220");
        assert!(!c.included);
        assert!(c.priority);
        assert_eq!(c.tier(), None);
    }

    #[test]
    fn test_tokens_are_case_insensitive() {
        let classifier = Classifier::new(vec!["ELPH".into()], vec!["Hs".into()]);
        let c = classifier.classify("canon PowerShot elph 190 hs");
        assert!(c.included);
        assert!(c.priority);
    }
}
