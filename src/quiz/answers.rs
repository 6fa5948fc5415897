//! In-memory answer store

use crate::error::QuizError;
use crate::schema::Schema;
use crate::Answer;
use std::collections::{BTreeMap, HashMap};

/// Answers keyed by question position, so iteration follows question order
#[derive(Debug, Clone, Default)]
pub struct AnswerStore {
    positions: HashMap<String, usize>,
    answers: BTreeMap<usize, Answer>,
}

impl AnswerStore {
    /// Empty store accepting answers for the schema's questions
    pub fn for_schema(schema: &Schema) -> Self {
        let positions = schema
            .questions()
            .enumerate()
            .map(|(i, (_, q))| (q.id.clone(), i))
            .collect();
        Self {
            positions,
            answers: BTreeMap::new(),
        }
    }

    /// Store an answer, replacing an earlier answer to the same question
    pub fn record(&mut self, answer: Answer) -> Result<Option<Answer>, QuizError> {
        let position = *self
            .positions
            .get(&answer.question_id)
            .ok_or_else(|| QuizError::UnknownQuestion(answer.question_id.clone()))?;
        Ok(self.answers.insert(position, answer))
    }

    pub fn remove(&mut self, question_id: &str) -> Option<Answer> {
        let position = self.positions.get(question_id)?;
        self.answers.remove(position)
    }

    pub fn get(&self, question_id: &str) -> Option<&Answer> {
        let position = self.positions.get(question_id)?;
        self.answers.get(position)
    }

    pub fn contains(&self, question_id: &str) -> bool {
        self.get(question_id).is_some()
    }

    /// Answers in question order
    pub fn iter(&self) -> impl Iterator<Item = &Answer> {
        self.answers.values()
    }

    pub fn to_vec(&self) -> Vec<Answer> {
        self.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.answers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::default_schema;
    use crate::AnswerValue;

    #[test]
    fn rejects_unknown_question() {
        let mut store = AnswerStore::for_schema(&default_schema());
        let err = store
            .record(Answer::new("ghost", AnswerValue::Choice(0)))
            .unwrap_err();
        assert_eq!(err, QuizError::UnknownQuestion("ghost".to_string()));
        assert!(store.is_empty());
    }

    #[test]
    fn iterates_in_question_order_and_replaces() {
        let mut store = AnswerStore::for_schema(&default_schema());
        store
            .record(Answer::new("stress", AnswerValue::Slider(3.0)))
            .unwrap();
        store
            .record(Answer::new("puzzle", AnswerValue::Choice(1)))
            .unwrap();
        let previous = store
            .record(Answer::new("puzzle", AnswerValue::Choice(2)))
            .unwrap();
        assert_eq!(previous.map(|a| a.value), Some(AnswerValue::Choice(1)));

        let ids: Vec<&str> = store.iter().map(|a| a.question_id.as_str()).collect();
        assert_eq!(ids, vec!["puzzle", "stress"]);
        assert_eq!(store.get("puzzle").unwrap().value, AnswerValue::Choice(2));
    }

    #[test]
    fn remove_answer() {
        let mut store = AnswerStore::for_schema(&default_schema());
        store
            .record(Answer::new("idea", AnswerValue::Text("x".to_string())))
            .unwrap();
        assert!(store.remove("idea").is_some());
        assert!(!store.contains("idea"));
        assert!(store.remove("idea").is_none());
    }
}
