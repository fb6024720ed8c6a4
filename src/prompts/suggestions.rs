//! Follow-up question suggestions and the quick remedies request

use super::Condition;

/// Follow-ups offered when no condition is in focus
pub const BASE_QUESTIONS: [&str; 5] = [
    "What are the best natural remedies?",
    "Are there any dietary changes I should make?",
    "How long until I see improvement?",
    "Are there any side effects to watch for?",
    "Can I combine these remedies with medication?",
];

/// Suggested follow-up questions
///
/// With a condition the list is three questions about that condition
/// followed by the first two base questions.
///
/// # Examples
///
/// ```
/// use vaidya::prompts::{suggested_questions, Condition};
///
/// assert_eq!(suggested_questions(None).len(), 5);
/// let insomnia = Condition::named("Insomnia");
/// assert_eq!(suggested_questions(Some(&insomnia))[0], "What causes Insomnia?");
/// ```
pub fn suggested_questions(condition: Option<&Condition>) -> Vec<String> {
    match condition {
        Some(condition) => {
            let title = &condition.title;
            let mut questions = vec![
                format!("What causes {}?", title),
                format!("How can I prevent {}?", title),
                format!("What foods should I avoid with {}?", title),
            ];
            questions.extend(BASE_QUESTIONS[..2].iter().map(|q| q.to_string()));
            questions
        }
        None => BASE_QUESTIONS.iter().map(|q| q.to_string()).collect(),
    }
}

/// Prompt asking for a short numbered list of remedies for a condition
pub fn quick_remedies_prompt(condition: &Condition) -> String {
    let mut prompt = format!(
        "As an Ayurvedic expert, provide 3-5 quick, practical natural remedies for \"{}\".\n\n",
        condition.title
    );
    if !condition.symptoms.is_empty() {
        prompt.push_str(&format!("Symptoms: {}\n\n", condition.symptoms.join(", ")));
    }
    prompt.push_str(
        "Please provide:\n\
         1. Immediate relief remedies (herbs, home remedies)\n\
         2. Dietary recommendations\n\
         3. Lifestyle tips\n\n\
         Keep it concise, actionable, and safe. Format as a numbered list.",
    );
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_questions_without_condition() {
        let questions = suggested_questions(None);
        assert_eq!(questions, BASE_QUESTIONS.map(String::from).to_vec());
    }

    #[test]
    fn test_condition_questions_then_two_base() {
        let questions = suggested_questions(Some(&Condition::named("Acidity")));
        assert_eq!(
            questions,
            vec![
                "What causes Acidity?",
                "How can I prevent Acidity?",
                "What foods should I avoid with Acidity?",
                "What are the best natural remedies?",
                "Are there any dietary changes I should make?",
            ]
        );
    }

    #[test]
    fn test_quick_remedies_prompt_lists_symptoms() {
        let condition = Condition {
            title: "Common Cold".to_string(),
            description: String::new(),
            symptoms: vec!["sneezing".to_string(), "sore throat".to_string()],
        };
        let prompt = quick_remedies_prompt(&condition);
        assert!(prompt.contains("remedies for \"Common Cold\""));
        assert!(prompt.contains("Symptoms: sneezing, sore throat"));
        assert!(prompt.ends_with("Format as a numbered list."));
    }

    #[test]
    fn test_quick_remedies_prompt_without_symptoms() {
        let prompt = quick_remedies_prompt(&Condition::named("Fatigue"));
        assert!(!prompt.contains("Symptoms:"));
    }
}
