//! Interactive line-oriented quiz view
//!
//! Renders the intro, phase headers and one question at a time, then reads a
//! line per answer. Lines starting with `:` are commands (on text questions
//! only the words below; anything else is an answer):
//!
//! - `:back` returns to the previous question
//! - `:skip` skips an optional question
//! - `:save` writes the session file
//! - `:quit` saves and stops (so does end of input)

use crate::quiz::{parse_input, QuestionRef, QuizRunner};
use crate::schema::QuestionKind;
use crate::session::save_session;
use crate::{format_number, QuizResult};
use anyhow::Result;
use std::io::{BufRead, Write};
use std::path::PathBuf;

/// How an interactive run ended
#[derive(Debug)]
pub enum Outcome {
    Completed(Box<QuizResult>),
    /// Stopped before the end; answers so far were saved if autosave is on
    Suspended,
}

enum Command {
    Back,
    Skip,
    Save,
    Quit,
    Unknown(String),
}

impl Command {
    fn parse(input: &str, free_text: bool) -> Option<Command> {
        let rest = input.strip_prefix(':')?;
        Some(match rest.trim().to_ascii_lowercase().as_str() {
            "back" | "b" => Command::Back,
            "skip" | "s" => Command::Skip,
            "save" => Command::Save,
            "quit" | "q" => Command::Quit,
            _ if free_text => return None,
            other => Command::Unknown(other.to_string()),
        })
    }
}

/// Drives a [`QuizRunner`] over any reader and writer
pub struct Prompter<R, W> {
    input: R,
    output: W,
    session_path: Option<PathBuf>,
    autosave: bool,
    /// Whether the most recent save attempt wrote the session file
    saved: bool,
    autosave_warned: bool,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self {
            input,
            output,
            session_path: None,
            autosave: false,
            saved: false,
            autosave_warned: false,
        }
    }

    /// Session file written on `:save`, `:quit` and end of input
    pub fn with_session(mut self, path: PathBuf) -> Self {
        self.session_path = Some(path);
        self
    }

    /// Also save the session after every accepted answer
    pub fn with_autosave(mut self, path: PathBuf) -> Self {
        self.session_path = Some(path);
        self.autosave = true;
        self
    }

    pub fn into_output(self) -> W {
        self.output
    }

    /// False when the last attempt to write the session file failed
    pub fn progress_saved(&self) -> bool {
        self.saved
    }

    pub fn run(&mut self, runner: &mut QuizRunner) -> Result<Outcome> {
        self.print_intro(runner)?;
        let mut shown_phase: Option<String> = None;

        loop {
            let Some(current) = runner.current() else {
                let missing = runner.missing_required();
                if missing.is_empty() {
                    let result = runner.finish()?;
                    return Ok(Outcome::Completed(Box::new(result)));
                }
                writeln!(
                    self.output,
                    "\nStill unanswered: {}",
                    missing.join(", ")
                )?;
                let first = runner
                    .schema()
                    .questions()
                    .position(|(_, q)| q.id == missing[0])
                    .unwrap_or(0);
                runner.seek(first);
                continue;
            };

            if shown_phase.as_deref() != Some(current.phase.id.as_str()) {
                self.print_phase(&current)?;
                shown_phase = Some(current.phase.id.clone());
            }
            self.print_question(runner, &current)?;
            let required = current.question.required;
            let question = current.question.clone();

            write!(self.output, "> ")?;
            self.output.flush()?;
            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                writeln!(self.output)?;
                self.save(runner)?;
                return Ok(Outcome::Suspended);
            }

            let free_text = matches!(question.kind, QuestionKind::Text(_));
            match Command::parse(line.trim(), free_text) {
                Some(Command::Back) => {
                    runner.back();
                }
                Some(Command::Skip) => {
                    if let Err(e) = runner.skip() {
                        writeln!(self.output, "  ! {}", e)?;
                    } else {
                        self.autosave(runner)?;
                    }
                }
                Some(Command::Save) => {
                    if self.session_path.is_some() {
                        if self.save(runner)? {
                            writeln!(
                                self.output,
                                "  Progress saved ({}% answered).",
                                runner.progress().percent()
                            )?;
                        }
                    } else {
                        writeln!(self.output, "  ! no session file configured")?;
                    }
                }
                Some(Command::Quit) => {
                    self.save(runner)?;
                    return Ok(Outcome::Suspended);
                }
                Some(Command::Unknown(name)) => {
                    writeln!(
                        self.output,
                        "  ! unknown command ':{}' (try :back, :skip, :save, :quit)",
                        name
                    )?;
                }
                None => {
                    let blank = line.trim().is_empty();
                    let has_default = matches!(
                        &question.kind,
                        QuestionKind::Slider(spec) if spec.default.is_some()
                    );
                    if blank && !required && !has_default {
                        runner.skip()?;
                        self.autosave(runner)?;
                        continue;
                    }
                    match parse_input(&question, &line).and_then(|v| runner.submit(v)) {
                        Ok(_) => self.autosave(runner)?,
                        Err(e) => writeln!(self.output, "  ! {}", e)?,
                    }
                }
            }
        }
    }

    fn print_intro(&mut self, runner: &QuizRunner) -> Result<()> {
        let schema = runner.schema();
        writeln!(self.output, "{}", schema.title)?;
        writeln!(self.output, "{}", "=".repeat(schema.title.chars().count()))?;
        let progress = runner.progress();
        if progress.answered == 0 && progress.position == 0 {
            if let Some(ref intro) = schema.intro {
                writeln!(self.output, "{}", intro)?;
            }
            writeln!(
                self.output,
                "{} questions in {} phases. Commands: :back :skip :save :quit",
                progress.total,
                schema.phases.len()
            )?;
        } else {
            writeln!(
                self.output,
                "Resuming at question {} of {} ({} answered).",
                (progress.position + 1).min(progress.total),
                progress.total,
                progress.answered
            )?;
        }
        Ok(())
    }

    fn print_phase(&mut self, current: &QuestionRef<'_>) -> Result<()> {
        writeln!(self.output)?;
        writeln!(self.output, "## {}", current.phase.title)?;
        if let Some(ref description) = current.phase.description {
            writeln!(self.output, "{}", description)?;
        }
        Ok(())
    }

    fn print_question(&mut self, runner: &QuizRunner, current: &QuestionRef<'_>) -> Result<()> {
        let question = current.question;
        writeln!(self.output)?;
        let optional = if question.required { "" } else { " (optional)" };
        writeln!(
            self.output,
            "[{}/{}] {}{}",
            current.index + 1,
            current.total,
            question.prompt,
            optional
        )?;
        if let Some(ref help) = question.help {
            writeln!(self.output, "  {}", help)?;
        }
        match &question.kind {
            QuestionKind::Choice(spec) => {
                for (i, option) in spec.options.iter().enumerate() {
                    writeln!(self.output, "  {}. {}", i + 1, option.label)?;
                }
            }
            QuestionKind::Slider(spec) => {
                let low = spec.min_label.as_deref().unwrap_or("");
                let high = spec.max_label.as_deref().unwrap_or("");
                write!(
                    self.output,
                    "  {} {} .. {} {}",
                    low,
                    format_number(spec.min),
                    format_number(spec.max),
                    high
                )?;
                if let Some(default) = spec.default {
                    write!(self.output, " [default {}]", format_number(default))?;
                }
                writeln!(self.output)?;
            }
            QuestionKind::Text(_) => {}
        }
        if let Some(previous) = runner.answers().get(&question.id) {
            writeln!(
                self.output,
                "  (current answer: {})",
                previous.value.describe(question)
            )?;
        }
        Ok(())
    }

    /// Failures are reported once and the quiz goes on
    fn autosave(&mut self, runner: &QuizRunner) -> Result<()> {
        if !self.autosave {
            return Ok(());
        }
        let Some(ref path) = self.session_path else {
            return Ok(());
        };
        match save_session(path, runner) {
            Ok(()) => self.saved = true,
            Err(e) => {
                self.saved = false;
                log::warn!("autosave failed: {:#}", e);
                if !self.autosave_warned {
                    self.autosave_warned = true;
                    writeln!(self.output, "  ! could not save progress: {:#}", e)?;
                }
            }
        }
        Ok(())
    }

    /// Write the session file if one is configured; returns whether it was written.
    /// Only errors on the output stream propagate.
    fn save(&mut self, runner: &QuizRunner) -> Result<bool> {
        let Some(ref path) = self.session_path else {
            return Ok(false);
        };
        match save_session(path, runner) {
            Ok(()) => self.saved = true,
            Err(e) => {
                self.saved = false;
                log::warn!("saving session failed: {:#}", e);
                writeln!(self.output, "  ! could not save progress: {:#}", e)?;
            }
        }
        Ok(self.saved)
    }
}
