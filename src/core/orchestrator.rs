use crate::domain::ports::DependentCall;
use crate::utils::error::Result;

/// 依序執行 fetch → resolve → submit；任何一步失敗即停止，不會送出後續請求
pub struct Orchestrator<P: DependentCall> {
    call: P,
}

impl<P: DependentCall> Orchestrator<P> {
    pub fn new(call: P) -> Self {
        Self { call }
    }

    pub async fn run(&self) -> Result<P::Output> {
        let name = self.call.describe();
        tracing::debug!("Starting {}", name);

        // 取得 context
        let context = self.call.fetch_context().await?;

        // 解析依賴
        let resolved = self.call.resolve(context).map_err(|e| {
            tracing::debug!("{} stopped before mutation: {}", name, e);
            e
        })?;

        // 送出變更
        let output = self.call.submit(resolved).await?;
        tracing::debug!("{} completed", name);

        Ok(output)
    }

    pub fn into_inner(self) -> P {
        self.call
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::OutsetaError;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct RecordingCall {
        context: Option<u32>,
        steps: Mutex<Vec<&'static str>>,
    }

    impl RecordingCall {
        fn new(context: Option<u32>) -> Self {
            Self {
                context,
                steps: Mutex::new(Vec::new()),
            }
        }

        fn steps(&self) -> Vec<&'static str> {
            self.steps.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl DependentCall for RecordingCall {
        type Context = Option<u32>;
        type Resolved = u32;
        type Output = String;

        fn describe(&self) -> String {
            "recording call".to_string()
        }

        async fn fetch_context(&self) -> Result<Self::Context> {
            self.steps.lock().unwrap().push("fetch");
            Ok(self.context)
        }

        fn resolve(&self, context: Self::Context) -> Result<Self::Resolved> {
            self.steps.lock().unwrap().push("resolve");
            context.ok_or_else(|| OutsetaError::precondition("nothing to resolve"))
        }

        async fn submit(&self, resolved: Self::Resolved) -> Result<Self::Output> {
            self.steps.lock().unwrap().push("submit");
            Ok(format!("submitted {}", resolved))
        }
    }

    #[tokio::test]
    async fn test_runs_steps_in_order() {
        let orchestrator = Orchestrator::new(RecordingCall::new(Some(7)));
        assert_eq!(orchestrator.run().await.unwrap(), "submitted 7");
        assert_eq!(
            orchestrator.into_inner().steps(),
            vec!["fetch", "resolve", "submit"]
        );
    }

    #[tokio::test]
    async fn test_precondition_failure_skips_submit() {
        let orchestrator = Orchestrator::new(RecordingCall::new(None));
        let err = orchestrator.run().await.unwrap_err();

        assert!(matches!(err, OutsetaError::PreconditionError { .. }));
        assert_eq!(orchestrator.into_inner().steps(), vec!["fetch", "resolve"]);
    }
}
