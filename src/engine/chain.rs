//! Prompt chains
//!
//! Steps run strictly in order. Each step drafts a prompt from its config
//! (with earlier outputs substituted into the context) and executes it with
//! the step's own model. The first failure aborts the chain.

use tracing::{info, warn};

use super::{EngineEvent, PromptEngine};
use crate::ai::credentials::Credentials;
use crate::constants::chain::{STEP_TOKEN_PREFIX, STEP_TOKEN_SUFFIX};
use crate::model::{ChainStep, PromptRecord};
use crate::types::{PromptError, Result, ValidationError, ValidationErrorKind};

/// Receives chain progress as it happens
pub trait ChainObserver: Send + Sync {
    fn step_started(&self, _step: usize, _step_name: &str) {}

    /// `step` is 1-based
    fn step_completed(&self, step: usize, step_name: &str, output: &str);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl ChainObserver for NoopObserver {
    fn step_completed(&self, _step: usize, _step_name: &str, _output: &str) {}
}

/// Terminal state of a chain run
#[derive(Debug)]
pub enum ChainOutcome {
    Completed(Vec<String>),
    FailedAtStep {
        step: usize,
        step_name: String,
        completed: Vec<String>,
        error: Box<PromptError>,
    },
}

impl ChainOutcome {
    /// Split a chain result into its terminal state
    ///
    /// Errors raised before the first step (an empty chain) are returned
    /// unchanged.
    pub fn from_result(result: Result<Vec<String>>) -> Result<Self> {
        match result {
            Ok(outputs) => Ok(Self::Completed(outputs)),
            Err(PromptError::ChainAborted {
                step,
                step_name,
                completed,
                source,
            }) => Ok(Self::FailedAtStep {
                step,
                step_name,
                completed,
                error: source,
            }),
            Err(e) => Err(e),
        }
    }

    /// Outputs produced before the chain ended
    pub fn outputs(&self) -> &[String] {
        match self {
            Self::Completed(outputs) => outputs,
            Self::FailedAtStep { completed, .. } => completed,
        }
    }
}

/// Replace `{{STEP_<k>_OUTPUT}}` with the k-th output, for k = 1..=outputs.len()
///
/// Replacement runs in ascending k, one pass per output.
pub fn substitute_step_outputs(context: &str, outputs: &[String]) -> String {
    outputs
        .iter()
        .enumerate()
        .fold(context.to_string(), |text, (i, output)| {
            let token = format!("{}{}{}", STEP_TOKEN_PREFIX, i + 1, STEP_TOKEN_SUFFIX);
            text.replace(&token, output)
        })
}

impl PromptEngine {
    /// Run every step and return their outputs in order
    pub async fn execute_chain(
        &self,
        steps: &[ChainStep],
        credentials: &Credentials,
    ) -> Result<Vec<String>> {
        self.execute_chain_with(steps, credentials, &NoopObserver)
            .await
    }

    /// [`execute_chain`](Self::execute_chain), reporting each output to
    /// `observer` as soon as it exists
    pub async fn execute_chain_with(
        &self,
        steps: &[ChainStep],
        credentials: &Credentials,
        observer: &dyn ChainObserver,
    ) -> Result<Vec<String>> {
        if steps.is_empty() {
            return Err(ValidationError::new(
                ValidationErrorKind::MissingField,
                "A chain needs at least one step",
            )
            .with_field("steps")
            .into());
        }

        let mut outputs: Vec<String> = Vec::with_capacity(steps.len());

        for (index, step) in steps.iter().enumerate() {
            let number = index + 1;
            observer.step_started(number, &step.step_name);
            info!("Chain step {}/{}: {}", number, steps.len(), step.step_name);

            match self.run_step(step, &outputs, credentials).await {
                Ok(output) => {
                    observer.step_completed(number, &step.step_name, &output);
                    outputs.push(output);
                }
                Err(e) => {
                    warn!("Chain aborted at step {} ({}): {}", number, step.step_name, e);
                    return Err(PromptError::ChainAborted {
                        step: number,
                        step_name: step.step_name.clone(),
                        completed: outputs,
                        source: Box::new(e),
                    });
                }
            }
        }

        if let Some(record) =
            PromptRecord::workflow(steps, outputs.last().cloned().unwrap_or_default())
        {
            self.emit(EngineEvent::PromptGenerated(record));
        }
        Ok(outputs)
    }

    async fn run_step(
        &self,
        step: &ChainStep,
        outputs: &[String],
        credentials: &Credentials,
    ) -> Result<String> {
        let context = substitute_step_outputs(&step.config.context, outputs);
        let config = step.config.with_context(context);

        let drafted = self.generate(&config, credentials).await?;
        let completion = self
            .run_prompt(&drafted.prompt, &config.model_config, credentials)
            .await?;
        Ok(completion.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::provider::ProviderKind;
    use crate::engine::testing::{
        CollectingSink, ScriptedService, default_config, groq_credentials, upstream_error,
    };
    use crate::model::ModelConfig;
    use std::sync::Mutex;

    fn step(name: &str, context: &str) -> ChainStep {
        let mut config = default_config();
        config.context = context.to_string();
        ChainStep::new(name, config)
    }

    /// Drafts echo the meta-prompt's context line; executions answer "OUT:<n>"
    fn echo_service() -> std::sync::Arc<ScriptedService> {
        let executions = Mutex::new(0usize);
        ScriptedService::new(move |req| {
            let prompt = &req.messages[0].content;
            if prompt.starts_with("You are an expert prompt engineer.") {
                let context = prompt
                    .lines()
                    .find_map(|l| l.strip_prefix("**Context/Task**: "))
                    .unwrap_or_default();
                Ok(format!("DRAFT[{}]", context))
            } else {
                let mut n = executions.lock().unwrap();
                *n += 1;
                Ok(format!("OUT:{}", *n))
            }
        })
    }

    #[derive(Default)]
    struct Recorder {
        seen: Mutex<Vec<(usize, String)>>,
    }

    impl ChainObserver for Recorder {
        fn step_completed(&self, step: usize, _step_name: &str, output: &str) {
            self.seen.lock().unwrap().push((step, output.to_string()));
        }
    }

    #[test]
    fn test_substitute_step_outputs() {
        let outputs = vec!["alpha".to_string(), "beta".to_string()];
        assert_eq!(
            substitute_step_outputs("{{STEP_1_OUTPUT}} + {{STEP_2_OUTPUT}} + {{STEP_1_OUTPUT}}", &outputs),
            "alpha + beta + alpha"
        );
        // Tokens beyond the outputs so far stay as written
        assert_eq!(
            substitute_step_outputs("{{STEP_3_OUTPUT}}", &outputs),
            "{{STEP_3_OUTPUT}}"
        );
        assert_eq!(substitute_step_outputs("plain", &[]), "plain");
    }

    #[tokio::test]
    async fn test_outputs_are_piped_forward() {
        let service = echo_service();
        let sink = CollectingSink::new();
        let engine = PromptEngine::new(service.clone()).with_events(sink.clone());
        let observer = Recorder::default();

        let steps = vec![
            step("Outline", "Topic: rust"),
            step("Expand", "Expand {{STEP_1_OUTPUT}}"),
        ];
        let outputs = engine
            .execute_chain_with(&steps, &groq_credentials(), &observer)
            .await
            .unwrap();

        assert_eq!(outputs, vec!["OUT:1", "OUT:2"]);
        let prompts = service.prompts();
        assert_eq!(prompts.len(), 4);
        assert!(prompts[2].contains("**Context/Task**: Expand OUT:1"));
        assert_eq!(prompts[3], "DRAFT[Expand OUT:1]");
        assert_eq!(
            *observer.seen.lock().unwrap(),
            vec![(1, "OUT:1".to_string()), (2, "OUT:2".to_string())]
        );

        let records = sink.prompts();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].final_prompt, "OUT:2");
        assert_eq!(records[0].chain_steps.len(), 2);
    }

    #[tokio::test]
    async fn test_each_step_executes_with_its_own_model() {
        let service = echo_service();
        let engine = PromptEngine::new(service.clone());
        let mut second = step("Second", "x");
        second.config.model_config = ModelConfig {
            provider: ProviderKind::OpenAi,
            model: "gpt-4o-mini".to_string(),
            ..Default::default()
        };
        let credentials = groq_credentials().with_key(ProviderKind::OpenAi, "sk");

        engine
            .execute_chain(&[step("First", "y"), second], &credentials)
            .await
            .unwrap();

        let calls = service.calls();
        let models: Vec<&str> = calls.iter().map(|c| c.model.as_str()).collect();
        assert_eq!(
            models,
            vec![
                "llama-3.3-70b-versatile",
                "llama-3.3-70b-versatile",
                "llama-3.3-70b-versatile",
                "gpt-4o-mini"
            ]
        );
    }

    #[tokio::test]
    async fn test_failure_aborts_with_completed_outputs() {
        let executions = Mutex::new(0usize);
        let service = ScriptedService::new(move |req| {
            if req.messages[0].content.starts_with("You are an expert prompt engineer.") {
                return Ok("draft".to_string());
            }
            let mut n = executions.lock().unwrap();
            *n += 1;
            if *n == 2 {
                Err(upstream_error("overloaded", req.provider))
            } else {
                Ok(format!("OUT:{}", *n))
            }
        });
        let engine = PromptEngine::new(service.clone());
        let steps = vec![step("A", ""), step("B", ""), step("C", "")];

        let err = engine
            .execute_chain(&steps, &groq_credentials())
            .await
            .unwrap_err();
        match err {
            PromptError::ChainAborted {
                step,
                ref step_name,
                ref completed,
                ..
            } => {
                assert_eq!(step, 2);
                assert_eq!(step_name, "B");
                assert_eq!(completed, &vec!["OUT:1".to_string()]);
            }
            other => panic!("unexpected error: {other}"),
        }
        // Step C never ran
        assert_eq!(service.calls().len(), 4);
    }

    #[tokio::test]
    async fn test_missing_step_credential_aborts_at_that_step() {
        let engine = PromptEngine::new(echo_service());
        let mut only = step("Only", "");
        only.config.model_config.provider = ProviderKind::Gemini;
        only.config.model_config.model = "gemini-1.5-flash".to_string();

        let result = engine.execute_chain(&[only], &groq_credentials()).await;
        let outcome = ChainOutcome::from_result(result).unwrap();
        match outcome {
            ChainOutcome::FailedAtStep { step, error, .. } => {
                assert_eq!(step, 1);
                assert!(matches!(
                    *error,
                    PromptError::MissingCredential {
                        provider: ProviderKind::Gemini,
                        ..
                    }
                ));
            }
            ChainOutcome::Completed(_) => panic!("chain should have failed"),
        }
    }

    #[tokio::test]
    async fn test_empty_chain_is_validation_error() {
        let engine = PromptEngine::new(echo_service());
        let result = engine.execute_chain(&[], &groq_credentials()).await;
        let err = ChainOutcome::from_result(result).unwrap_err();
        assert!(err.is_validation());
    }
}
