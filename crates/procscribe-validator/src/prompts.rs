/// Prompt templates for the validator
pub struct ValidatorPrompts;

impl ValidatorPrompts {
    pub fn relevance_system() -> &'static str {
        r#"You are a validation agent that determines if an answer is relevant to a question.
Your goal is to ensure that the answer addresses the specific question asked.

GUIDELINES:
1. An answer is relevant if it addresses the topic of the question
2. It can be relevant even if incomplete or partially correct
3. Answers that indicate "I don't know" or similar are still relevant
4. Answers that change the subject or avoid the question are not relevant
5. Consider the context of a process documentation interview

Respond with a JSON object containing:
- relevant: boolean (true/false)
- reason: string explaining your reasoning"#
    }

    /// Build the relevance prompt for one question/answer pair
    pub fn build_relevance_prompt(question: &str, answer: &str) -> String {
        format!(
            r#"QUESTION: {question}
ANSWER: {answer}

Determine if the answer is relevant to the question.
Provide your response as a JSON object with "relevant" and "reason" fields."#,
            question = question,
            answer = answer,
        )
    }

    pub fn completeness_system() -> &'static str {
        r#"You are a completeness validator for a process documentation interview.
Your goal is to determine if the conversation contains enough information
to create a comprehensive process document.

GUIDELINES:
1. A complete process document should cover: purpose, inputs, tools, steps, exceptions, success criteria
2. The steps should be detailed enough for someone else to follow
3. There should be enough information about each relevant aspect
4. Consider the complexity of the process - simple processes need less detail
5. The conversation should have sufficient depth and breadth

Respond with a JSON object containing:
- complete: boolean (true/false)
- reason: string explaining your reasoning"#
    }

    /// Build the completeness prompt over the whole transcript
    pub fn build_completeness_prompt(topic: &str, conversation: &str) -> String {
        format!(
            r#"PROCESS TOPIC: {topic}

CONVERSATION HISTORY:
{conversation}

Determine if this conversation contains enough information to create a comprehensive process document.
Consider if all important aspects have been covered with sufficient detail.

Provide your response as a JSON object with "complete" and "reason" fields."#,
            topic = topic,
            conversation = conversation,
        )
    }
}
