pub mod plan;
pub mod quiz;
pub mod word;

pub use plan::StudyPlan;
pub use quiz::{Direction, QuizMode, QuizQuestion, QuizSession};
pub use word::{Folder, Group, NewWord, Profile, Word, WordPatch};
