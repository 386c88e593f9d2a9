use std::fmt;

use log::debug;

use crate::error::RecommendError;

/// A source of recommended postgresql.conf values for a fixed set of keys.
pub trait Recommender {
    /// Keys this recommender can tune, in the order they should be reported.
    fn keys(&self) -> &'static [&'static str];

    fn recommend(&self, key: &str) -> Result<String, RecommendError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recommendation {
    pub key: String,
    pub value: String,
}

impl Recommendation {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.key, self.value)
    }
}

/// Collects a recommendation for every key of `recommender`, stopping at the first error.
pub fn recommend_all(recommender: &dyn Recommender) -> Result<Vec<Recommendation>, RecommendError> {
    recommender
        .keys()
        .iter()
        .map(|key| {
            let value = recommender.recommend(key)?;
            debug!("recommend {} = {}", key, value);
            Ok(Recommendation::new(*key, value))
        })
        .collect()
}
