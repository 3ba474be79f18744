pub mod dataset;
pub mod error;
pub mod model;
pub mod record;
pub mod score;
pub mod transcript;

pub use dataset::{Dataset, Question};
pub use error::{BenchError, BenchResult};
pub use model::{ModelQuery, QueryError};
pub use record::{Accuracy, Condition, ExperimentRecord, TrialResults};
pub use score::score_answer;
pub use transcript::{word_count, Role, Turn};
