use std::{collections::VecDeque, sync::Mutex};

use anyhow::Result;

use crate::types::DiffResult;

/// A yes/no decision the import needs from the operator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Question {
    ApplyChanges { new: usize, existing: usize },
    BackupExisting { tables: Vec<String> },
}

impl Question {
    pub fn apply_changes(diff: &DiffResult) -> Self {
        Self::ApplyChanges {
            new: diff.new.len(),
            existing: diff.existing.len(),
        }
    }

    pub fn prompt(&self) -> String {
        match self {
            Self::ApplyChanges { new, existing } => format!(
                "Create {} new table(s) and update {} existing table(s)?",
                new, existing
            ),
            Self::BackupExisting { tables } => format!(
                "Back up {} existing table(s) ({}) before changing them?",
                tables.len(),
                tables.join(", ")
            ),
        }
    }

    /// Answer used when the operator just presses enter.
    pub fn default_answer(&self) -> bool {
        match self {
            Self::ApplyChanges { .. } => false,
            Self::BackupExisting { .. } => true,
        }
    }
}

pub trait Confirmer: Send + Sync {
    fn confirm(&self, question: &Question) -> Result<bool>;
}

/// Answers every question with yes, for `--yes` and scripted runs.
#[derive(Clone, Copy, Debug, Default)]
pub struct AssumeYes;

impl Confirmer for AssumeYes {
    fn confirm(&self, _question: &Question) -> Result<bool> {
        Ok(true)
    }
}

/// Replays canned answers in order and records what was asked.
/// Runs out to `false`.
#[derive(Debug, Default)]
pub struct ScriptedConfirmer {
    answers: Mutex<VecDeque<bool>>,
    asked: Mutex<Vec<Question>>,
}

impl ScriptedConfirmer {
    pub fn new(answers: impl IntoIterator<Item = bool>) -> Self {
        Self {
            answers: Mutex::new(answers.into_iter().collect()),
            asked: Mutex::new(Vec::new()),
        }
    }

    pub fn asked(&self) -> Vec<Question> {
        self.asked.lock().map(|a| a.clone()).unwrap_or_default()
    }
}

impl Confirmer for ScriptedConfirmer {
    fn confirm(&self, question: &Question) -> Result<bool> {
        if let Ok(mut asked) = self.asked.lock() {
            asked.push(question.clone());
        }
        let answer = self
            .answers
            .lock()
            .map_err(|_| anyhow::anyhow!("confirmer state poisoned"))?
            .pop_front()
            .unwrap_or(false);
        Ok(answer)
    }
}
