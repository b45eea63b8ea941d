use std::sync::Arc;

use crate::application::admin::{AdminContentService, AdminProductService};
use crate::application::repos::HealthRepo;

#[derive(Clone)]
pub struct ApiState {
    pub content: Arc<AdminContentService>,
    pub products: Arc<AdminProductService>,
    pub health: Arc<dyn HealthRepo>,
}
