//! Adapters that expose an external judge as pipeline scorers
//!
//! A single judge usually scores both halves of salience and keeps its own
//! history, so both adapters share one handle to it.

use std::cell::RefCell;
use std::fmt::Debug;
use std::rc::Rc;

use crate::error::SalienceError;
use crate::scorer::{Score, Scorer};

/// An external valuation judge
pub trait Judge: Debug {
    /// Judge identity recorded in provenance
    fn name(&self) -> &str;

    fn judge_novelty(&mut self, text: &str) -> Result<Score, SalienceError>;

    fn judge_value(&mut self, text: &str) -> Result<Score, SalienceError>;

    /// Clear the judge's rolling state
    fn reset(&mut self);
}

/// Shared handle to a judge
pub type SharedJudge<J> = Rc<RefCell<J>>;

/// Wrap a judge so it can back both adapters
pub fn share<J: Judge>(judge: J) -> SharedJudge<J> {
    Rc::new(RefCell::new(judge))
}

/// Novelty half of a judge
#[derive(Debug)]
pub struct JudgeNovelty<J: Judge> {
    judge: SharedJudge<J>,
}

impl<J: Judge> JudgeNovelty<J> {
    pub fn new(judge: SharedJudge<J>) -> Self {
        Self { judge }
    }
}

impl<J: Judge> Scorer for JudgeNovelty<J> {
    fn method(&self) -> &'static str {
        "judge_novelty"
    }

    fn score(&mut self, text: &str) -> Result<Score, SalienceError> {
        let mut judge = self.judge.borrow_mut();
        let name = judge.name().to_string();
        Ok(judge
            .judge_novelty(text)?
            .with_provenance("novelty_method", self.method())
            .with_provenance("judge", name))
    }

    /// Resetting either adapter resets the shared judge
    fn reset(&mut self) {
        self.judge.borrow_mut().reset();
    }
}

/// Value half of a judge
#[derive(Debug)]
pub struct JudgeValue<J: Judge> {
    judge: SharedJudge<J>,
}

impl<J: Judge> JudgeValue<J> {
    pub fn new(judge: SharedJudge<J>) -> Self {
        Self { judge }
    }
}

impl<J: Judge> Scorer for JudgeValue<J> {
    fn method(&self) -> &'static str {
        "judge_value"
    }

    fn score(&mut self, text: &str) -> Result<Score, SalienceError> {
        let mut judge = self.judge.borrow_mut();
        let name = judge.name().to_string();
        Ok(judge
            .judge_value(text)?
            .with_provenance("value_method", self.method())
            .with_provenance("judge", name))
    }

    fn reset(&mut self) {
        self.judge.borrow_mut().reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct EchoJudge {
        seen: Vec<String>,
        resets: usize,
    }

    impl Judge for EchoJudge {
        fn name(&self) -> &str {
            "echo"
        }

        fn judge_novelty(&mut self, text: &str) -> Result<Score, SalienceError> {
            let repeat = self.seen.iter().any(|s| s == text);
            self.seen.push(text.to_string());
            Ok(Score::new(if repeat { 0.0 } else { 1.0 }))
        }

        fn judge_value(&mut self, text: &str) -> Result<Score, SalienceError> {
            Ok(Score::new(if text.len() < 10 { 0.3 } else { 0.8 }))
        }

        fn reset(&mut self) {
            self.seen.clear();
            self.resets += 1;
        }
    }

    #[test]
    fn test_adapters_share_judge() {
        let judge = share(EchoJudge::default());
        let mut novelty = JudgeNovelty::new(Rc::clone(&judge));
        let mut value = JudgeValue::new(Rc::clone(&judge));

        assert_eq!(novelty.score("hello there").unwrap().value, 1.0);
        assert_eq!(novelty.score("hello there").unwrap().value, 0.0);
        let v = value.score("hi").unwrap();
        assert_eq!(v.value, 0.3);
        assert_eq!(v.provenance["judge"], "echo");

        value.reset();
        assert_eq!(judge.borrow().resets, 1);
        assert_eq!(novelty.score("hello there").unwrap().value, 1.0);
    }
}
