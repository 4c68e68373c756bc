//! The one place where the pipeline makes a random choice.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Picks one tag out of several equally good ones
pub trait TieBreaker {
    fn pick(&mut self, options: &[String]) -> Option<String>;
}

/// Uniform choice backed by a seedable generator
pub struct SeededSampler {
    rng: StdRng,
}

impl SeededSampler {
    pub fn new(seed: u64) -> Self {
        SeededSampler {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn from_entropy() -> Self {
        SeededSampler {
            rng: StdRng::from_entropy(),
        }
    }

    /// Seeded when a seed is given, entropy otherwise
    pub fn from_seed(seed: Option<u64>) -> Self {
        seed.map(Self::new).unwrap_or_else(Self::from_entropy)
    }
}

impl TieBreaker for SeededSampler {
    fn pick(&mut self, options: &[String]) -> Option<String> {
        options.choose(&mut self.rng).cloned()
    }
}

/// Always takes the first option
#[cfg(test)]
pub(crate) struct FirstOption;

#[cfg(test)]
impl TieBreaker for FirstOption {
    fn pick(&mut self, options: &[String]) -> Option<String> {
        options.first().cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> Vec<String> {
        vec!["ADJ".to_string(), "NOUN".to_string(), "VERB".to_string()]
    }

    #[test]
    fn test_same_seed_same_choices() {
        let mut a = SeededSampler::new(7);
        let mut b = SeededSampler::new(7);
        let picks_a: Vec<_> = (0..20).map(|_| a.pick(&options())).collect();
        let picks_b: Vec<_> = (0..20).map(|_| b.pick(&options())).collect();
        assert_eq!(picks_a, picks_b);
        assert!(picks_a.iter().all(|p| p.as_ref().is_some_and(|t| options().contains(t))));
    }

    #[test]
    fn test_empty_options() {
        assert_eq!(SeededSampler::new(1).pick(&[]), None);
        assert_eq!(FirstOption.pick(&[]), None);
        assert_eq!(FirstOption.pick(&options()).as_deref(), Some("ADJ"));
    }
}
