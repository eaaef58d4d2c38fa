//! Testing utilities: a scripted oracle.
//!
//! Useful for exercising the pipeline without calling a real LLM.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::error::{OracleError, OracleResult};
use crate::traits::oracle::{Oracle, OracleRequest, OracleTask};

/// Scripted reply for one (task, term) pair.
#[derive(Debug, Clone)]
enum Reply {
    Text(String),
    Fail(String),
}

/// A mock oracle with per-term scripted replies.
///
/// Replies are keyed by task and by the quoted search term embedded in the
/// user prompt. Unscripted requests fail as unavailable, which drives the
/// pipeline onto its fallbacks. Clones share scripts and call history.
#[derive(Debug, Clone, Default)]
pub struct MockOracle {
    replies: Arc<RwLock<HashMap<(OracleTask, String), Reply>>>,
    /// Reply for any unscripted request of a task
    defaults: Arc<RwLock<HashMap<OracleTask, Reply>>>,
    calls: Arc<RwLock<Vec<MockOracleCall>>>,
}

/// Record of a call made to the mock oracle.
#[derive(Debug, Clone, PartialEq)]
pub struct MockOracleCall {
    pub task: OracleTask,
    pub user: String,
    pub temperature: f32,
    pub max_output_tokens: u32,
}

impl MockOracle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Classifier reply for a term.
    pub fn with_language(self, term: &str, reply: &str) -> Self {
        self.script(OracleTask::ClassifyLanguage, term, Reply::Text(reply.into()))
    }

    /// Matcher reply for a term.
    pub fn with_match(self, term: &str, reply: &str) -> Self {
        self.script(OracleTask::MatchAdGroup, term, Reply::Text(reply.into()))
    }

    /// Make a task fail for a term.
    pub fn failing(self, task: OracleTask, term: &str) -> Self {
        self.script(task, term, Reply::Fail("simulated outage".into()))
    }

    /// Reply to every unscripted request of a task.
    pub fn with_default(self, task: OracleTask, reply: &str) -> Self {
        self.defaults
            .write()
            .unwrap()
            .insert(task, Reply::Text(reply.into()));
        self
    }

    /// All calls made so far.
    pub fn calls(&self) -> Vec<MockOracleCall> {
        self.calls.read().unwrap().clone()
    }

    fn script(self, task: OracleTask, term: &str, reply: Reply) -> Self {
        self.replies
            .write()
            .unwrap()
            .insert((task, term.to_string()), reply);
        self
    }

    fn lookup(&self, request: &OracleRequest) -> Option<Reply> {
        let replies = self.replies.read().unwrap();
        replies
            .iter()
            .filter(|((task, _), _)| *task == request.task)
            .find(|((_, term), _)| request.user.contains(&format!("\"{}\"", term)))
            .map(|(_, reply)| reply.clone())
            .or_else(|| self.defaults.read().unwrap().get(&request.task).cloned())
    }
}

#[async_trait]
impl Oracle for MockOracle {
    async fn complete(&self, request: &OracleRequest) -> OracleResult<String> {
        self.calls.write().unwrap().push(MockOracleCall {
            task: request.task,
            user: request.user.clone(),
            temperature: request.temperature,
            max_output_tokens: request.max_output_tokens,
        });

        match self.lookup(request) {
            Some(Reply::Text(text)) => Ok(text),
            Some(Reply::Fail(reason)) => Err(OracleError::Network(reason)),
            None => Err(OracleError::Api {
                status: 503,
                body: format!("no scripted {} reply", request.task),
            }),
        }
    }
}
