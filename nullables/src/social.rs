//! Nullable social session.

use std::sync::{Arc, Mutex, MutexGuard};

use well3_clients::{ClientError, SocialClient};

struct State {
    duplicates_left: usize,
    like_delivers: bool,
    posts: Vec<String>,
    rejected_posts: Vec<String>,
    follows: Vec<String>,
    retweets: Vec<String>,
    likes: Vec<String>,
}

impl Default for State {
    fn default() -> Self {
        Self {
            duplicates_left: 0,
            like_delivers: true,
            posts: Vec::new(),
            rejected_posts: Vec::new(),
            follows: Vec::new(),
            retweets: Vec::new(),
            likes: Vec::new(),
        }
    }
}

/// Records social actions instead of performing them.
#[derive(Clone, Default)]
pub struct NullSocial {
    state: Arc<Mutex<State>>,
}

impl NullSocial {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Reject the next `n` posts as duplicates.
    pub fn reject_duplicates(&self, n: usize) {
        self.lock().duplicates_left = n;
    }

    pub fn set_like_delivers(&self, delivers: bool) {
        self.lock().like_delivers = delivers;
    }

    /// Published post texts.
    pub fn posts(&self) -> Vec<String> {
        self.lock().posts.clone()
    }

    /// Texts rejected as duplicates.
    pub fn rejected_posts(&self) -> Vec<String> {
        self.lock().rejected_posts.clone()
    }

    pub fn follows(&self) -> Vec<String> {
        self.lock().follows.clone()
    }

    pub fn retweets(&self) -> Vec<String> {
        self.lock().retweets.clone()
    }

    pub fn likes(&self) -> Vec<String> {
        self.lock().likes.clone()
    }
}

impl SocialClient for NullSocial {
    async fn post(&self, text: &str) -> Result<String, ClientError> {
        let mut state = self.lock();
        if state.duplicates_left > 0 {
            state.duplicates_left -= 1;
            state.rejected_posts.push(text.to_string());
            return Err(ClientError::DuplicatePost);
        }
        state.posts.push(text.to_string());
        Ok(format!("https://x.com/null/status/{}", state.posts.len()))
    }

    async fn follow(&self, username: &str) -> Result<(), ClientError> {
        self.lock().follows.push(username.to_string());
        Ok(())
    }

    async fn retweet(&self, tweet_id: &str) -> Result<(), ClientError> {
        self.lock().retweets.push(tweet_id.to_string());
        Ok(())
    }

    async fn like(&self, tweet_id: &str) -> Result<bool, ClientError> {
        let mut state = self.lock();
        state.likes.push(tweet_id.to_string());
        Ok(state.like_delivers)
    }
}
