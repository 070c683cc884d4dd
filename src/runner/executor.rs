use tracing::{debug, info};

use crate::assertion::AssertionEngine;
use crate::collection::{Collection, RequestInstance};
use crate::http::Transport;
use crate::runner::types::RunSummary;

/// 顺序执行选中的请求实例，每个实例先发送再求值
pub struct RunExecutor<'a, T: Transport> {
    transport: &'a T,
    engine: &'a AssertionEngine,
}

impl<'a, T: Transport> RunExecutor<'a, T> {
    pub fn new(transport: &'a T, engine: &'a AssertionEngine) -> Self {
        Self { transport, engine }
    }

    pub async fn run(&self, collection: &mut Collection, ids: &[u64]) -> RunSummary {
        self.run_with(collection, ids, |_| {}).await
    }

    /// 每个实例求值后回调一次
    pub async fn run_with<F>(
        &self,
        collection: &mut Collection,
        ids: &[u64],
        mut on_result: F,
    ) -> RunSummary
    where
        F: FnMut(&RequestInstance),
    {
        let mut ids = ids.to_vec();
        ids.sort_unstable();
        ids.dedup();

        info!("Running {} request(s)", ids.len());
        for id in &ids {
            let Some(instance) = collection.get_mut(*id) else {
                debug!("Skipping unknown request id {}", id);
                continue;
            };

            instance.execute(self.transport).await;
            instance.evaluate(self.engine);
            on_result(instance);
        }

        RunSummary::from_collection(collection, &ids)
    }
}
