use std::time::Duration;

use crate::schedule::{AnimationPool, ProgressStage, StagePlan};
use crate::{map_content_types, JobRequest, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileKind {
    /// Written content generated from a video.
    Content,
    /// Short clips cut from a video.
    Clips,
}

/// Per-flow timing and display parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct JobProfile {
    pub kind: ProfileKind,
    /// Whether the flow sends a list of selected options.
    pub requires_options: bool,
    /// Client-side timeout for one execution.
    pub budget: Duration,
    pub stages: StagePlan,
    pub animations: AnimationPool,
}

impl JobProfile {
    pub fn content() -> Self {
        let stages = [
            (0, "fetch", "Fetching video…", "Hang tight, we're fetching the good bits."),
            (20, "draft", "Drafting posts…", "Cooking up the post you wished for."),
            (45, "highlights", "Extracting highlights…", "Pulling out highlights and smart snippets."),
            (90, "format", "Formatting copy…", "Formatting copy for high engagement."),
            (135, "images", "Generating images…", "Generating image prompts and thumbnails."),
            (180, "polish", "Polishing…", "Polishing SEO and AEO magic."),
            (240, "finish", "Almost there…", "Final touches."),
        ];
        Self {
            kind: ProfileKind::Content,
            requires_options: true,
            budget: Duration::from_secs(5 * 60),
            stages: plan_from(&stages),
            animations: AnimationPool::numbered(6, 420.0),
        }
    }

    pub fn clips() -> Self {
        let stages = [
            (0, "download", "Downloading video…", "Fetching video content from YouTube"),
            (30, "transcript", "Analyzing transcript…", "Extracting and processing speech content"),
            (60, "highlights", "Selecting highlights…", "AI is identifying the most engaging moments"),
            (120, "render", "Rendering clips…", "Creating optimized video clips with subtitles"),
            (180, "upload", "Uploading clips…", "Finalizing and preparing download links"),
        ];
        Self {
            kind: ProfileKind::Clips,
            requires_options: false,
            budget: Duration::from_secs(10 * 60),
            stages: plan_from(&stages),
            animations: AnimationPool::numbered(11, 300.0),
        }
    }

    /// Validates form input into a request for this profile.
    pub fn build_request<I, S>(&self, url: &str, options: I) -> Result<JobRequest, ValidationError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        if self.requires_options {
            JobRequest::new(url, map_content_types(options))
        } else {
            JobRequest::url_only(url)
        }
    }
}

impl Default for JobProfile {
    fn default() -> Self {
        Self::content()
    }
}

fn plan_from(stages: &[(u64, &str, &str, &str)]) -> StagePlan {
    StagePlan::from_validated(
        stages
            .iter()
            .zip(0u32..)
            .map(|(&(threshold, id, label, description), order)| {
                ProgressStage::new(order, threshold, id, label, description)
            })
            .collect(),
    )
}
