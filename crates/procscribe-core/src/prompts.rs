use procscribe_state::{Aspect, InterviewState, DEFAULT_RECENT_WINDOW};

/// Prompt templates for the interviewer and the document writer
pub struct InterviewPrompts;

impl InterviewPrompts {
    pub fn interviewer_system() -> String {
        let aspects: String = Aspect::ALL
            .iter()
            .map(|a| format!("- {}: {}\n", a.label(), a.description()))
            .collect();
        let order: Vec<&str> = Aspect::ALL.iter().map(|a| a.label()).collect();

        format!(
            r#"You are a professional process analyst conducting a structured interview.
Your goal is to extract complete information about a process to create comprehensive documentation.

GUIDELINES:
1. Ask exactly ONE clear, specific question per interaction
2. Focus on extracting information about one specific aspect of the process
3. Never repeat questions that have already been asked
4. Be polite, professional, and concise
5. Avoid yes/no questions - ask open-ended questions instead
6. Use a natural tone related to the subject, not a formal questionnaire style
7. Ask about what the user is going to do, not about the process in general

ASPECTS TO COVER:
{aspects}
Ask about them in this order: {order}

Reply with the question only."#,
            aspects = aspects,
            order = order.join(" -> "),
        )
    }

    /// Build the prompt asking for one question about `aspect`
    pub fn build_question_prompt(state: &InterviewState, aspect: Aspect) -> String {
        let covered: Vec<&str> = state.covered_aspects().iter().map(|a| a.label()).collect();
        let covered = if covered.is_empty() {
            "None".to_string()
        } else {
            covered.join(", ")
        };
        let keyword = aspect.keywords()[0];

        format!(
            r#"PROCESS TOPIC: {topic}

CONVERSATION HISTORY:
{conversation}
RECENT CONTEXT (last {window} interactions):
{recent}
CURRENT FOCUS: You need to ask about the {label} aspect of the process ({description}).

ASPECTS ALREADY COVERED: {covered}

Generate exactly ONE question that will extract detailed information about the {label} of the process.
Do not ask about aspects that have already been covered.

Your question should:
- Be open-ended to elicit detailed responses
- Be specific to the process topic
- Be concise (under 25 words if possible)
- Use the word "{keyword}" naturally in the question

QUESTION:"#,
            topic = state.topic().unwrap_or_default(),
            conversation = state.get_conversation_text(),
            window = DEFAULT_RECENT_WINDOW,
            recent = state.get_recent_context(DEFAULT_RECENT_WINDOW),
            label = aspect.label(),
            description = aspect.description().to_lowercase(),
            covered = covered,
            keyword = keyword,
        )
    }

    pub fn extractor_system() -> &'static str {
        r#"You are an expert technical writer specializing in process documentation.
Create a structured process document from an interview conversation.

GUIDELINES:
1. Use ONLY information explicitly provided in the conversation
2. Do not add external knowledge or assumptions
3. Use consistent terminology from the conversation
4. Write in clear, imperative language
5. Omit any section the conversation gives no information for

DOCUMENT STRUCTURE:
# Process: <name>
## Purpose
## Inputs
## Tools
## Steps
## Success Criteria
## Notes/Exceptions

Format the document using Markdown."#
    }

    /// Build the extraction prompt over the whole transcript
    pub fn build_extraction_prompt(topic: &str, conversation: &str) -> String {
        format!(
            r#"Create a process document from the following interview conversation.

PROCESS TOPIC: {topic}

CONVERSATION HISTORY:
{conversation}
Include every relevant detail from the conversation and nothing else.

DOCUMENT:"#,
            topic = topic,
            conversation = conversation,
        )
    }
}
