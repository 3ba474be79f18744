use thiserror::Error;

#[derive(Debug, Error)]
pub enum BenchError {
    #[error("dataset error: {0}")]
    Dataset(String),

    #[error("unknown thread '{thread}' referenced by question {question}")]
    UnknownThread { question: u32, thread: String },

    #[error("io error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("config error: {0}")]
    Config(String),
}

pub type BenchResult<T> = Result<T, BenchError>;
