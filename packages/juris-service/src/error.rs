use std::fmt::{Display, Formatter, Result as FmtResult};

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// The mandatory collaborator call that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
	Embedding,
	Search,
}
impl Stage {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Embedding => "embedding",
			Self::Search => "search",
		}
	}
}
impl Display for Stage {
	fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
		f.write_str(self.as_str())
	}
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid input: {message}")]
	InvalidInput { message: String },
	#[error("Retrieval failed at {stage} stage: {message}")]
	RetrievalFailure { stage: Stage, message: String },
}
