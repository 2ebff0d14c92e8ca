//! Request bodies for the mutating endpoints, with the checks the dashboard
//! runs before submitting them.

use crate::error::ValidationError;
use crate::model::{Platform, Sentiment};
use serde::Serialize;

pub const MAX_KEYWORD_LEN: usize = 100;
pub const MAX_TEXT_LEN: usize = 1000;
pub const MAX_URL_LEN: usize = 500;

/// Keywords track every platform unless told otherwise.
pub const DEFAULT_KEYWORD_PLATFORM: &str = "all";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewKeyword {
    pub keyword: String,
    pub platform: String,
    pub sentiment: Sentiment,
}

impl NewKeyword {
    pub fn new(keyword: &str, sentiment: Sentiment) -> Result<Self, ValidationError> {
        let form = Self {
            keyword: keyword.trim().to_string(),
            platform: DEFAULT_KEYWORD_PLATFORM.to_string(),
            sentiment,
        };
        form.validate()?;
        Ok(form)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        let keyword = self.keyword.trim();
        if keyword.is_empty() {
            return Err(ValidationError::EmptyKeyword);
        }
        if keyword.chars().count() > MAX_KEYWORD_LEN {
            return Err(ValidationError::KeywordTooLong {
                max: MAX_KEYWORD_LEN,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewMention {
    pub text: String,
    pub platform: Platform,
    pub sentiment: Sentiment,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl NewMention {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let text = self.text.trim();
        if text.is_empty() {
            return Err(ValidationError::EmptyText);
        }
        if text.chars().count() > MAX_TEXT_LEN {
            return Err(ValidationError::TextTooLong { max: MAX_TEXT_LEN });
        }
        if let Some(score) = self.score {
            if !(-1.0..=1.0).contains(&score) {
                return Err(ValidationError::ScoreOutOfRange(score));
            }
        }
        if let Some(url) = &self.url {
            if url.chars().count() > MAX_URL_LEN {
                return Err(ValidationError::UrlTooLong { max: MAX_URL_LEN });
            }
        }
        Ok(())
    }
}

/// What the user filled in on the add-mention form: one text, any number of
/// platforms.
#[derive(Debug, Clone, Default)]
pub struct MentionDraft {
    pub text: String,
    pub platforms: Vec<Platform>,
    pub sentiment: Option<Sentiment>,
    pub score: Option<f64>,
    pub url: Option<String>,
}

impl MentionDraft {
    /// Expands the draft into one submission per selected platform.
    pub fn into_submissions(self) -> Result<Vec<NewMention>, ValidationError> {
        if self.text.trim().is_empty() {
            return Err(ValidationError::EmptyText);
        }
        if self.platforms.is_empty() {
            return Err(ValidationError::NoPlatform);
        }

        let mut platforms = self.platforms;
        let mut seen = Vec::with_capacity(platforms.len());
        platforms.retain(|p| {
            if seen.contains(p) {
                false
            } else {
                seen.push(*p);
                true
            }
        });

        let text = self.text.trim().to_string();
        let sentiment = self.sentiment.unwrap_or(Sentiment::Neutral);
        let url = self.url.filter(|u| !u.trim().is_empty());

        platforms
            .into_iter()
            .map(|platform| {
                let mention = NewMention {
                    text: text.clone(),
                    platform,
                    sentiment,
                    score: self.score,
                    url: url.clone(),
                };
                mention.validate().map(|_| mention)
            })
            .collect()
    }
}
