use std::collections::BTreeSet;

use thiserror::Error;

use crate::is_valid_video_url;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please enter a video URL")]
    MissingUrl,
    #[error("Please enter a valid YouTube URL")]
    InvalidUrl,
    #[error("Please select at least one content type")]
    NoOptionsSelected,
}

/// Parameters for one repurposing job. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobRequest {
    source_url: String,
    selected_options: BTreeSet<String>,
}

impl JobRequest {
    /// Builds a request that carries at least one selected option.
    pub fn new<I, S>(source_url: impl Into<String>, options: I) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let source_url = source_url.into();
        if source_url.trim().is_empty() {
            return Err(ValidationError::MissingUrl);
        }
        let selected_options: BTreeSet<String> = options
            .into_iter()
            .map(Into::into)
            .filter(|option| !option.trim().is_empty())
            .collect();
        if selected_options.is_empty() {
            return Err(ValidationError::NoOptionsSelected);
        }
        if !is_valid_video_url(&source_url) {
            return Err(ValidationError::InvalidUrl);
        }
        Ok(Self {
            source_url,
            selected_options,
        })
    }

    /// Builds a request for flows that send only the URL.
    pub fn url_only(source_url: impl Into<String>) -> Result<Self, ValidationError> {
        let source_url = source_url.into();
        if source_url.trim().is_empty() {
            return Err(ValidationError::MissingUrl);
        }
        if !is_valid_video_url(&source_url) {
            return Err(ValidationError::InvalidUrl);
        }
        Ok(Self {
            source_url,
            selected_options: BTreeSet::new(),
        })
    }

    pub fn source_url(&self) -> &str {
        &self.source_url
    }

    pub fn selected_options(&self) -> &BTreeSet<String> {
        &self.selected_options
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentType {
    pub id: &'static str,
    pub label: &'static str,
}

/// Content types offered by the content profile.
pub const CONTENT_TYPES: &[ContentType] = &[
    ContentType { id: "blog", label: "Blog Post" },
    ContentType { id: "linkedin_post", label: "LinkedIn Post" },
    ContentType { id: "x_post", label: "X (Twitter) Post" },
    ContentType { id: "instagram_post", label: "Instagram Post" },
    ContentType { id: "instagram_reel_script", label: "Instagram Reel Script" },
    ContentType { id: "facebook_post", label: "Facebook Post" },
    ContentType { id: "youtube_shorts_script", label: "YouTube Shorts Script" },
];

/// Maps legacy hyphenated UI ids onto the tokens the workflow expects.
/// Unknown ids pass through unchanged.
pub fn map_content_types<I, S>(selected: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    selected
        .into_iter()
        .map(|id| {
            let id = id.as_ref();
            match id {
                "blog-post" => "blog",
                "linkedin-post" => "linkedin",
                "x-post" => "x",
                "instagram-post" => "instagram",
                "image-only" => "image",
                "facebook-post" | "facebook" => "facebook",
                "instagram-reel-script" | "instagram-reel" | "video-script" | "video_script" => {
                    "video_script"
                }
                other => other,
            }
            .to_string()
        })
        .collect()
}
