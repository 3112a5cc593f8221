//! Social network session used for social quests.

use std::future::Future;

use crate::ClientError;

pub trait SocialClient: Send + Sync {
    /// Publish a post and return its URL.
    ///
    /// Fails with [`ClientError::DuplicatePost`] when the text repeats an earlier post.
    fn post(&self, text: &str) -> impl Future<Output = Result<String, ClientError>> + Send;

    fn follow(&self, username: &str) -> impl Future<Output = Result<(), ClientError>> + Send;

    fn retweet(&self, tweet_id: &str) -> impl Future<Output = Result<(), ClientError>> + Send;

    /// Like a post; `false` when the like was not delivered.
    fn like(&self, tweet_id: &str) -> impl Future<Output = Result<bool, ClientError>> + Send;
}
