//! Course store backends.

use anyhow::{Context, Result};
use futures::future::BoxFuture;
use gatehouse_common::constants::redis_keys::COURSES;
use gatehouse_common::{Course, GateError};
use redis::AsyncCommands;
use redis::aio::ConnectionManager;

/// Read access to course records
pub trait CourseStore: Send + Sync {
    /// All courses, ordered by id
    fn list_courses(&self) -> BoxFuture<'_, Result<Vec<Course>, GateError>>;

    /// Is the backing store reachable?
    fn ping(&self) -> BoxFuture<'_, bool>;

    /// Look up a single course
    fn find_course<'a>(&'a self, id: &'a str) -> BoxFuture<'a, Result<Option<Course>, GateError>> {
        Box::pin(async move {
            let courses = self.list_courses().await?;
            Ok(courses.into_iter().find(|c| c.id == id))
        })
    }
}

/// Courses stored in a Redis hash: `gatehouse:courses` { course_id -> JSON }
#[derive(Clone)]
pub struct RedisCourseStore {
    redis: ConnectionManager,
}

impl RedisCourseStore {
    /// Connect with a connection manager (handles reconnection)
    pub async fn connect(redis_url: &str) -> Result<Self> {
        let client = redis::Client::open(redis_url).context("Failed to create Redis client")?;

        let redis = ConnectionManager::new(client)
            .await
            .context("Failed to connect to Redis")?;

        Ok(Self { redis })
    }
}

fn decode(raw: &str) -> Result<Course, GateError> {
    serde_json::from_str(raw)
        .map_err(|e| GateError::Internal(format!("Corrupt course record: {}", e)))
}

impl CourseStore for RedisCourseStore {
    fn list_courses(&self) -> BoxFuture<'_, Result<Vec<Course>, GateError>> {
        Box::pin(async move {
            let mut conn = self.redis.clone();
            let raw: Vec<String> = conn
                .hvals(COURSES)
                .await
                .map_err(|e| GateError::Redis(e.to_string()))?;

            let mut courses = raw
                .iter()
                .map(|r| decode(r))
                .collect::<Result<Vec<_>, _>>()?;
            courses.sort_by(|a, b| a.id.cmp(&b.id));

            tracing::debug!(count = courses.len(), "Loaded courses from Redis");
            Ok(courses)
        })
    }

    fn ping(&self) -> BoxFuture<'_, bool> {
        Box::pin(async move {
            let mut conn = self.redis.clone();
            let result: Result<String, _> = redis::cmd("PING").query_async(&mut conn).await;
            result.is_ok()
        })
    }

    fn find_course<'a>(&'a self, id: &'a str) -> BoxFuture<'a, Result<Option<Course>, GateError>> {
        Box::pin(async move {
            let mut conn = self.redis.clone();
            let raw: Option<String> = conn
                .hget(COURSES, id)
                .await
                .map_err(|e| GateError::Redis(e.to_string()))?;

            raw.as_deref().map(decode).transpose()
        })
    }
}

/// Fixed in-process course list (local development and tests)
#[derive(Debug, Clone, Default)]
pub struct MemoryCourseStore {
    courses: Vec<Course>,
}

impl MemoryCourseStore {
    pub fn new(mut courses: Vec<Course>) -> Self {
        courses.sort_by(|a, b| a.id.cmp(&b.id));
        Self { courses }
    }
}

impl CourseStore for MemoryCourseStore {
    fn list_courses(&self) -> BoxFuture<'_, Result<Vec<Course>, GateError>> {
        Box::pin(async move { Ok(self.courses.clone()) })
    }

    fn ping(&self) -> BoxFuture<'_, bool> {
        Box::pin(async { true })
    }
}
