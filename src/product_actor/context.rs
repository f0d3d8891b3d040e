use std::sync::Arc;

use crate::pricing::PricingChain;
use crate::publish::Publisher;
use crate::views::ViewPipeline;

/// Collaborators injected into the product actor's run loop.
#[derive(Clone)]
pub struct CatalogContext {
    pub pricing: PricingChain,
    pub views: ViewPipeline,
    pub publisher: Arc<dyn Publisher>,
    pub topic: String,
}
