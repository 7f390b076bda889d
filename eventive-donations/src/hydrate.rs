//! Page hydration: discover every fundraiser container in saved page markup,
//! run the engine once per container concurrently, and write each outcome
//! into its own container.

use eventive_core::{BlockInstance, discover_blocks};
use futures_util::future::join_all;
use tracing::info;

use crate::engine::{BlockOutcome, DonationProgressEngine};

#[derive(Debug, Clone)]
pub struct HydratedPage {
    pub html: String,
    /// One entry per container, in document order
    pub outcomes: Vec<(BlockInstance, BlockOutcome)>,
}

impl HydratedPage {
    pub fn failure_count(&self) -> usize {
        self.outcomes.iter().filter(|(_, o)| o.is_failure()).count()
    }
}

/// Hydrate every container in `page`. Containers never see each other's
/// results: each outcome is paired with the instance it was computed for.
pub async fn hydrate_page(engine: &DonationProgressEngine, page: &str) -> HydratedPage {
    let instances = discover_blocks(page);
    info!(containers = instances.len(), "hydrating donation containers");

    let results = join_all(instances.iter().map(|inst| engine.run(&inst.attributes))).await;

    let mut html = String::with_capacity(page.len());
    let mut cursor = 0;
    for (inst, outcome) in instances.iter().zip(&results) {
        html.push_str(&page[cursor..inst.inner.start]);
        html.push_str(&outcome.markup());
        cursor = inst.inner.end;
    }
    html.push_str(&page[cursor..]);

    HydratedPage {
        html,
        outcomes: instances.into_iter().zip(results).collect(),
    }
}
