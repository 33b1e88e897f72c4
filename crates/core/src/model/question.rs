use serde::{Deserialize, Serialize};

//
// ─── QUESTION ─────────────────────────────────────────────────────────────────
//

/// A single multiple-choice question, ready to be asked.
///
/// The answer choices arrive pre-shuffled from the formatter; `correct_answer`
/// holds the winning choice verbatim, so scoring is a plain string compare.
/// Serializes under camelCase names (`correctAnswer`) to stay snapshot
/// compatible with the browser reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    /// One-based position in the fetched batch.
    pub id: u32,
    pub question: String,
    pub choices: Vec<String>,
    pub correct_answer: String,
}

//
// ─── RAW QUESTION ─────────────────────────────────────────────────────────────
//

/// A question as delivered by the trivia provider, before formatting.
///
/// Field names mirror the Open Trivia DB payload (snake_case, correct answer
/// separate from the incorrect ones), so this deserializes straight out of
/// the `results` array.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RawQuestion {
    pub question: String,
    pub correct_answer: String,
    pub incorrect_answers: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn question_serializes_with_camel_case_answer_key() {
        let question = Question {
            id: 1,
            question: "2 + 2?".into(),
            choices: vec!["3".into(), "4".into()],
            correct_answer: "4".into(),
        };

        let json = serde_json::to_string(&question).unwrap();

        assert!(json.contains("\"correctAnswer\":\"4\""));
        assert!(!json.contains("correct_answer"));
    }

    #[test]
    fn raw_question_deserializes_from_provider_payload() {
        let raw: RawQuestion = serde_json::from_str(
            r#"{
                "category": "Science & Nature",
                "type": "multiple",
                "difficulty": "easy",
                "question": "What planet is known as the Red Planet?",
                "correct_answer": "Mars",
                "incorrect_answers": ["Venus", "Jupiter", "Saturn"]
            }"#,
        )
        .unwrap();

        assert_eq!(raw.question, "What planet is known as the Red Planet?");
        assert_eq!(raw.correct_answer, "Mars");
        assert_eq!(raw.incorrect_answers.len(), 3);
    }
}
