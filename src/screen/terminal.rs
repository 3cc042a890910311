//! Interactive line-oriented screen.
//!
//! Works over any async reader/writer pair, so the same code drives a
//! real terminal and in-memory buffers. Invalid input re-prompts; a
//! form is never submitted incomplete. End of input aborts the session.

use async_trait::async_trait;
use tokio::io::{
    AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, Stdin, Stdout,
};
use tracing::debug;

use crate::error::{InputError, ScreenError};
use crate::study::{Preference, ReasoningPreference};

use super::forms::{parse_preference, parse_reasoning, parse_score, parse_yes_no};
use super::{
    ComparisonForm, Completion, ConditionView, ConsentForm, ResultsView, Screen, ScreenRequest,
    SurveyForm,
};

const RULE: &str = "------------------------------------------------------------";

/// Screen reading participant input line by line.
#[derive(Debug)]
pub struct TerminalScreen<R, W> {
    reader: R,
    writer: W,
}

impl TerminalScreen<BufReader<Stdin>, Stdout> {
    /// Screen over the process's stdin and stdout.
    #[must_use]
    pub fn stdio() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
    }
}

impl<R, W> TerminalScreen<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    /// Creates a screen over the given reader and writer.
    pub const fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    /// Returns the reader and writer.
    pub fn into_inner(self) -> (R, W) {
        (self.reader, self.writer)
    }

    async fn write(&mut self, text: &str) -> Result<(), ScreenError> {
        self.writer.write_all(text.as_bytes()).await?;
        self.writer.flush().await?;
        Ok(())
    }

    async fn read_line(&mut self, prompt: &str) -> Result<String, ScreenError> {
        self.write(prompt).await?;
        let mut line = String::new();
        if self.reader.read_line(&mut line).await? == 0 {
            return Err(ScreenError::InputClosed);
        }
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }

    /// Prompts until `parse` accepts the input.
    async fn ask<T>(
        &mut self,
        prompt: &str,
        parse: fn(&str) -> Result<T, InputError>,
    ) -> Result<T, ScreenError>
    where
        T: Send,
    {
        loop {
            let line = self.read_line(prompt).await?;
            match parse(&line) {
                Ok(value) => return Ok(value),
                Err(e) => {
                    debug!(error = %e, "input rejected");
                    self.write(&format!("  {e}\n")).await?;
                }
            }
        }
    }

    async fn introduction(&mut self, text: &str, consent: &str) -> Result<Completion, ScreenError> {
        self.write(&format!("{RULE}\nAI Transparency Study\n{RULE}\n\n{text}\n\n{consent}\n"))
            .await?;
        let mut form = ConsentForm::default();
        loop {
            let answer = self.ask("Do you consent? [yes/no] ", parse_yes_no).await?;
            form.set_consent(answer);
            match form.submit() {
                Ok(()) => return Ok(Completion::Consented),
                Err(e) => {
                    self.write(&format!("  {e}. Answer 'yes' to begin.\n")).await?;
                }
            }
        }
    }

    async fn condition_view(&mut self, mut view: ConditionView<'_>) -> Result<Completion, ScreenError> {
        self.write(&format!(
            "\n{RULE}\n{}\n{RULE}\n{}\n",
            view.condition().label(),
            view.render()
        ))
        .await?;

        let mut prompt = "Press Enter to run the AI analysis. ";
        loop {
            self.read_line(prompt).await?;
            self.write("Analyzing...\n").await?;
            match view.analyze().await {
                Ok(()) => break,
                Err(e) => {
                    self.write(&format!("  Analysis failed: {e}\n")).await?;
                    prompt = "Press Enter to retry. ";
                }
            }
        }

        self.write(&format!("\n{}\n", view.render())).await?;
        self.read_line("Press Enter when you have finished reviewing. ")
            .await?;
        Ok(view.finish()?)
    }

    async fn survey(
        &mut self,
        label: &str,
        questions: &[String],
    ) -> Result<Completion, ScreenError> {
        self.write(&format!(
            "\n{RULE}\nSurvey: {label}\n{RULE}\n\
             Rate each statement from 1 (strongly disagree) to 5 (strongly agree).\n"
        ))
        .await?;

        let mut form = SurveyForm::new(questions);
        for (index, question) in questions.iter().enumerate() {
            let score = self
                .ask(&format!("{}. {question}\n> ", index + 1), parse_score)
                .await?;
            form.set_score_at(index, i64::from(score.value()))?;
        }
        let comment = self
            .read_line("Any additional feedback? (optional, press Enter to skip)\n> ")
            .await?;
        form.set_comment(comment);
        Ok(Completion::SurveySubmitted(form.submit()?))
    }

    async fn comparison(
        &mut self,
        preferred: &str,
        trustworthy: &str,
        reasoning: &str,
    ) -> Result<Completion, ScreenError> {
        let preference_menu = menu(&Preference::ALL.map(Preference::label));
        let reasoning_menu = menu(&ReasoningPreference::ALL.map(ReasoningPreference::label));

        self.write(&format!("\n{RULE}\nFinal comparison\n{RULE}\n"))
            .await?;

        let mut form = ComparisonForm::default();
        form.preferred = Some(
            self.ask(&format!("{preferred}\n{preference_menu}> "), parse_preference)
                .await?,
        );
        form.trustworthy = Some(
            self.ask(&format!("{trustworthy}\n{preference_menu}> "), parse_preference)
                .await?,
        );
        form.reasoning = Some(
            self.ask(&format!("{reasoning}\n{reasoning_menu}> "), parse_reasoning)
                .await?,
        );
        Ok(Completion::ComparisonSubmitted(form.submit()?))
    }
}

fn menu(labels: &[&str]) -> String {
    labels
        .iter()
        .enumerate()
        .map(|(i, label)| format!("  {}) {label}\n", i + 1))
        .collect()
}

#[async_trait]
impl<R, W> Screen for TerminalScreen<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    async fn present(&mut self, request: ScreenRequest<'_>) -> Result<Completion, ScreenError> {
        match request {
            ScreenRequest::Introduction { text, consent } => self.introduction(text, consent).await,
            ScreenRequest::ConditionView(ctx) => self.condition_view(ConditionView::new(ctx)).await,
            ScreenRequest::Survey {
                condition,
                questions,
            } => self.survey(condition.label(), questions).await,
            ScreenRequest::Comparison { prompts } => {
                self.comparison(&prompts.preferred, &prompts.trustworthy, &prompts.reasoning)
                    .await
            }
        }
    }

    async fn show_results(&mut self, results: ResultsView<'_>) -> Result<(), ScreenError> {
        let summary = results.summary;
        let mut text = format!(
            "\n{RULE}\nThank you for participating!\n{RULE}\n\
             Participant: {}\n\
             Condition order: {}\n\
             Policy reviewed: {}\n\
             Average rating (Transparent AI): {:.2}\n\
             Average rating (Opaque AI): {:.2}\n",
            summary.participant_id,
            summary.condition_order,
            results.document.title,
            summary.transparent_average,
            summary.opaque_average,
        );
        if let Some(answers) = summary.final_preference {
            text.push_str(&format!(
                "Preferred system: {}\nMore trustworthy: {}\nReasoning preference: {}\n",
                answers.preferred.label(),
                answers.trustworthy.label(),
                answers.reasoning.label(),
            ));
        }
        text.push_str(&format!(
            "\nResults saved to {}\n",
            results.export_path.display()
        ));
        self.write(&text).await
    }
}
