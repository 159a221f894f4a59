pub mod heuristics;
mod judgment;
mod prompts;
pub mod validator;

pub use judgment::{parse_judgment, CompletenessJudgment, JudgmentParseError, RelevanceJudgment};
pub use prompts::ValidatorPrompts;
pub use validator::{
    AnswerValidator, Check, ValidationRecord, ValidationStats, Verdict, EMPTY_ANSWER_REASON,
};
