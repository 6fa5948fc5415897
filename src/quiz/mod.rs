//! Quiz runner: a linear pointer through the schema's questions

mod answers;
mod input;

pub use answers::AnswerStore;
pub use input::{parse_input, validate_value};

use crate::error::QuizError;
use crate::schema::{Phase, Question, Schema};
use crate::{Answer, AnswerValue, QuizResult};
use chrono::Utc;

/// The question under the cursor, with its context
#[derive(Debug, Clone, Copy)]
pub struct QuestionRef<'a> {
    pub phase: &'a Phase,
    pub question: &'a Question,
    /// 0-based position in the flattened question list
    pub index: usize,
    pub total: usize,
}

/// Result of moving the cursor forward
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Cursor now points at this question index
    Next(usize),
    /// Cursor passed the last question
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub answered: usize,
    pub total: usize,
    pub position: usize,
}

impl Progress {
    pub fn percent(&self) -> u8 {
        if self.total == 0 {
            return 100;
        }
        ((self.answered * 100) / self.total).min(100) as u8
    }
}

/// Walks a schema one question at a time and keeps the answers
#[derive(Debug, Clone)]
pub struct QuizRunner {
    schema: Schema,
    /// (phase index, question index) in presentation order
    order: Vec<(usize, usize)>,
    cursor: usize,
    answers: AnswerStore,
}

impl QuizRunner {
    pub fn new(schema: Schema) -> Self {
        let order = schema
            .phases
            .iter()
            .enumerate()
            .flat_map(|(p, phase)| (0..phase.questions.len()).map(move |q| (p, q)))
            .collect();
        let answers = AnswerStore::for_schema(&schema);
        Self {
            schema,
            order,
            cursor: 0,
            answers,
        }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn answers(&self) -> &AnswerStore {
        &self.answers
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Move the cursor, clamped to one past the last question
    pub fn seek(&mut self, position: usize) {
        self.cursor = position.min(self.order.len());
    }

    /// Question at a position in the flattened list
    pub fn question_at(&self, index: usize) -> Option<QuestionRef<'_>> {
        let (p, q) = *self.order.get(index)?;
        let phase = &self.schema.phases[p];
        Some(QuestionRef {
            phase,
            question: &phase.questions[q],
            index,
            total: self.order.len(),
        })
    }

    /// Question under the cursor, `None` once all have been visited
    pub fn current(&self) -> Option<QuestionRef<'_>> {
        self.question_at(self.cursor)
    }

    /// Answer the current question and advance
    pub fn submit(&mut self, value: AnswerValue) -> Result<Step, QuizError> {
        let question = self.current().ok_or(QuizError::Finished)?.question;
        let value = validate_value(question, &value)?;
        let answer = Answer::new(question.id.clone(), value);
        self.answers.record(answer)?;
        Ok(self.advance())
    }

    /// Record an answer for any question without moving the cursor
    pub fn record(&mut self, answer: Answer) -> Result<(), QuizError> {
        let question = self
            .schema
            .question(&answer.question_id)
            .ok_or_else(|| QuizError::UnknownQuestion(answer.question_id.clone()))?;
        let value = validate_value(question, &answer.value)?;
        self.answers.record(Answer { value, ..answer })?;
        Ok(())
    }

    /// Skip an optional question, discarding any earlier answer to it
    pub fn skip(&mut self) -> Result<Step, QuizError> {
        let question = self.current().ok_or(QuizError::Finished)?.question;
        if question.required {
            return Err(QuizError::Required(question.id.clone()));
        }
        let id = question.id.clone();
        self.answers.remove(&id);
        Ok(self.advance())
    }

    /// Step back one question; no-op on the first
    pub fn back(&mut self) -> usize {
        self.cursor = self.cursor.saturating_sub(1);
        self.cursor
    }

    pub fn progress(&self) -> Progress {
        Progress {
            answered: self.answers.len(),
            total: self.order.len(),
            position: self.cursor,
        }
    }

    /// Ids of required questions without an answer, in order
    pub fn missing_required(&self) -> Vec<String> {
        self.schema
            .questions()
            .filter(|(_, q)| q.required && !self.answers.contains(&q.id))
            .map(|(_, q)| q.id.clone())
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.missing_required().is_empty()
    }

    /// Score and classify; fails while required questions are unanswered
    pub fn finish(&self) -> Result<QuizResult, QuizError> {
        let missing = self.missing_required();
        if !missing.is_empty() {
            return Err(QuizError::Incomplete(missing));
        }
        let answers = self.answers.to_vec();
        let (scores, archetype) = crate::evaluate(&self.schema, &answers);
        Ok(QuizResult {
            schema_id: self.schema.id.clone(),
            schema_title: self.schema.title.clone(),
            schema_version: self.schema.version.clone(),
            completed_at: Utc::now(),
            answers,
            scores,
            archetype,
        })
    }

    fn advance(&mut self) -> Step {
        self.cursor = (self.cursor + 1).min(self.order.len());
        if self.cursor < self.order.len() {
            Step::Next(self.cursor)
        } else {
            Step::Finished
        }
    }
}
