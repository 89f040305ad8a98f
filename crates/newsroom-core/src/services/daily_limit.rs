//! Per-author daily publishing cap.

use crate::domain::NewPost;
use crate::error::RepoError;
use crate::ports::PostRepository;

pub const DEFAULT_DAILY_POST_LIMIT: u32 = 3;

/// Counts an author's posts on the candidate's calendar day and decides
/// whether one more is allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailyPostLimit {
    max_per_day: u32,
}

impl DailyPostLimit {
    pub fn new(max_per_day: u32) -> Self {
        Self { max_per_day }
    }

    pub fn max_per_day(&self) -> u32 {
        self.max_per_day
    }

    /// Posts already published by the candidate's author on the candidate's UTC day.
    pub async fn posts_today(
        &self,
        posts: &dyn PostRepository,
        candidate: &NewPost,
    ) -> Result<u64, RepoError> {
        posts
            .count_by_author_on(candidate.author_id, candidate.created_on())
            .await
    }

    pub fn allows(&self, posts_today: u64) -> bool {
        posts_today < u64::from(self.max_per_day)
    }
}

impl Default for DailyPostLimit {
    fn default() -> Self {
        Self::new(DEFAULT_DAILY_POST_LIMIT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_allows_three_posts_per_day() {
        let limit = DailyPostLimit::default();
        assert!(limit.allows(0));
        assert!(limit.allows(2));
        assert!(!limit.allows(3));
        assert!(!limit.allows(10));
    }

    #[test]
    fn test_zero_limit_blocks_everything() {
        assert!(!DailyPostLimit::new(0).allows(0));
    }
}
