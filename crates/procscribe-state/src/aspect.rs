use serde::{Deserialize, Serialize};

/// A facet of a process the interview tries to cover.
///
/// Variants are declared in interview priority order; `Ord` follows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Aspect {
    Purpose,
    Inputs,
    Tools,
    Steps,
    Exceptions,
    SuccessCriteria,
    Actors,
}

impl Aspect {
    /// Every aspect, in the order the interview asks about them
    pub const ALL: [Aspect; 7] = [
        Aspect::Purpose,
        Aspect::Inputs,
        Aspect::Tools,
        Aspect::Steps,
        Aspect::Exceptions,
        Aspect::SuccessCriteria,
        Aspect::Actors,
    ];

    /// Substrings that mark a question as being about this aspect
    pub fn keywords(self) -> &'static [&'static str] {
        match self {
            Aspect::Purpose => &["purpose", "why"],
            Aspect::Inputs => &["input", "material"],
            Aspect::Tools => &["tool", "equipment"],
            Aspect::Steps => &["step", "instruction"],
            Aspect::Exceptions => &["exception", "problem"],
            Aspect::SuccessCriteria => &["success", "criteria"],
            Aspect::Actors => &["actor", "role"],
        }
    }

    /// Infer the aspect a question is about. First match in priority order wins.
    pub fn from_question(question: &str) -> Option<Aspect> {
        let lower = question.to_lowercase();
        Self::ALL
            .into_iter()
            .find(|aspect| aspect.keywords().iter().any(|k| lower.contains(k)))
    }

    /// Human-readable name used in prompts
    pub fn label(self) -> &'static str {
        match self {
            Aspect::Purpose => "purpose",
            Aspect::Inputs => "inputs",
            Aspect::Tools => "tools",
            Aspect::Steps => "steps",
            Aspect::Exceptions => "exceptions",
            Aspect::SuccessCriteria => "success criteria",
            Aspect::Actors => "actors",
        }
    }

    /// What this aspect means, for the interviewer's instructions
    pub fn description(self) -> &'static str {
        match self {
            Aspect::Purpose => "Why this process exists, its objectives and goals",
            Aspect::Inputs => "All materials, information, or resources needed",
            Aspect::Tools => "Equipment, software, or resources required",
            Aspect::Steps => "Detailed step-by-step instructions in chronological order",
            Aspect::Exceptions => "What could go wrong and how to handle it",
            Aspect::SuccessCriteria => "How to determine if the process was successful",
            Aspect::Actors => "Who performs the process and their responsibilities",
        }
    }

    /// Canned question asked when no backend is available.
    ///
    /// Each one contains a keyword of its own aspect and none of a
    /// higher-priority aspect, so asking it marks the aspect covered.
    pub fn fallback_question(self) -> &'static str {
        match self {
            Aspect::Purpose => "What is the main purpose or objective of this process?",
            Aspect::Inputs => {
                "What materials, information, or resources are needed to perform this process?"
            }
            Aspect::Tools => "What tools, equipment, or software are required for this process?",
            Aspect::Steps => {
                "What are the specific step-by-step instructions for performing this process?"
            }
            Aspect::Exceptions => {
                "What problems could come up during this process, and how should they be handled?"
            }
            Aspect::SuccessCriteria => {
                "What are the success criteria that tell you this process was completed correctly?"
            }
            Aspect::Actors => {
                "Who is responsible for performing this process, and what are their specific roles?"
            }
        }
    }
}

impl std::fmt::Display for Aspect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for Aspect {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace(' ', "_").replace('-', "_").as_str() {
            "purpose" => Ok(Aspect::Purpose),
            "inputs" | "input" => Ok(Aspect::Inputs),
            "tools" | "tool" => Ok(Aspect::Tools),
            "steps" | "step" => Ok(Aspect::Steps),
            "exceptions" | "exception" => Ok(Aspect::Exceptions),
            "success_criteria" => Ok(Aspect::SuccessCriteria),
            "actors" | "actor" => Ok(Aspect::Actors),
            _ => Err(format!("Unknown aspect: {}", s)),
        }
    }
}
