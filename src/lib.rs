pub mod conf;
pub mod error;
pub mod parallel;
pub mod recommend;
pub mod system;

pub use error::RecommendError;
pub use parallel::{ParallelKey, ParallelRecommender, PARALLEL_KEYS};
pub use recommend::{recommend_all, Recommendation, Recommender};
