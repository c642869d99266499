//! Application state and shared resources.

use anyhow::Result;
use std::sync::Arc;

use crate::config::{AppConfig, CourseBackend};
use crate::courses::{CourseStore, MemoryCourseStore, RedisCourseStore};
use crate::turnstile::TokenValidator;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: AppConfig,

    /// Turnstile token validator
    pub validator: Arc<TokenValidator>,

    /// Course records
    pub courses: Arc<dyn CourseStore>,
}

impl AppState {
    /// Create new application state, connecting to the configured course store
    pub async fn new(config: AppConfig, validator: TokenValidator) -> Result<Self> {
        let courses: Arc<dyn CourseStore> = match config.course_store {
            CourseBackend::Redis => {
                let store = RedisCourseStore::connect(&config.redis_url).await?;
                tracing::info!(redis_url = %config.redis_url, "Redis course store connected");
                Arc::new(store)
            }
            CourseBackend::Memory => {
                tracing::info!(count = config.courses.len(), "Serving courses from config");
                Arc::new(MemoryCourseStore::new(config.courses.clone()))
            }
        };

        Ok(Self::with_store(config, validator, courses))
    }

    /// Assemble state around an existing course store
    pub fn with_store(
        config: AppConfig,
        validator: TokenValidator,
        courses: Arc<dyn CourseStore>,
    ) -> Self {
        Self {
            config,
            validator: Arc::new(validator),
            courses,
        }
    }
}
