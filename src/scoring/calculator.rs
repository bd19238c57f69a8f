/// Fixed reference count the jelly-bean guesses are compared against.
/// This is the experimenter's estimate, not the real number of beans in the pile.
pub const JELLY_BEANS_REFERENCE_COUNT: u32 = 634;

/// Points awarded for a guess that hits the reference exactly
pub const MAX_ROUND_SCORE: u32 = 10;

/// Scores jelly-bean guesses by their distance from the reference count
#[derive(Debug, Clone, Copy)]
pub struct JellyBeanScorer {
    reference_count: u32,
}

impl Default for JellyBeanScorer {
    fn default() -> Self {
        Self::new(JELLY_BEANS_REFERENCE_COUNT)
    }
}

impl JellyBeanScorer {
    pub fn new(reference_count: u32) -> Self {
        Self {
            reference_count: reference_count.max(1),
        }
    }

    pub fn reference_count(&self) -> u32 {
        self.reference_count
    }

    /// `round((1 - |guess - reference| / reference) * 10)`, never below zero.
    /// A missing, zero or NaN guess scores zero.
    pub fn round_score(&self, guess: Option<f64>) -> u32 {
        let guess = match guess {
            Some(g) if g != 0.0 && !g.is_nan() => g,
            _ => return 0,
        };

        let reference = f64::from(self.reference_count);
        let deviation = (guess - reference).abs();
        let score = ((1.0 - deviation / reference) * f64::from(MAX_ROUND_SCORE)).round();

        if score > 0.0 {
            score as u32
        } else {
            0
        }
    }
}
