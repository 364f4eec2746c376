//! The Chartsworth client: one Slack thread per channel.
//!
//! The first post to a channel opens a thread and every later post to that
//! channel becomes a reply in it. Threads are remembered only for the lifetime
//! of the client.
//!
//! The registry lock is held while an opening message is in flight, so two
//! tasks posting to the same fresh channel cannot both open a thread; the
//! second one waits and replies into the first one's thread.

use crate::config::ChartsworthConfig;
use crate::encode::{ImageSource, ImageUpload};
use crate::error::{Error, Result};
use crate::monster::MonsterPlot;
use crate::notebook::NotebookContext;
use crate::slack::{SlackApi, SlackWebClient};
use crate::threads::ThreadRegistry;
use tokio::sync::Mutex;

const IMAGE_OPENING: &str = "Image :thread:";
const REACTION_OPENING: &str = "Post :thread:";
const MONSTER_OPENING: &str = "Monster Plot :thread:";
const MONSTER_FILENAME: &str = "monster_plot.png";

/// What to post through [`Chartsworth::post`].
#[derive(Debug)]
pub enum Post {
    Text(String),
    Image {
        image: ImageSource,
        filename: Option<String>,
    },
}

impl From<&str> for Post {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for Post {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

/// Result of [`Chartsworth::post_image_or_notice`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadOutcome {
    Uploaded,
    /// The upload failed and a text notice was posted instead.
    Notice,
}

pub struct Chartsworth<A = SlackWebClient> {
    api: A,
    default_channel: Option<String>,
    notebook: NotebookContext,
    threads: Mutex<ThreadRegistry>,
}

impl Chartsworth<SlackWebClient> {
    /// Validate `config` and connect through the Slack Web API.
    pub fn new(config: &ChartsworthConfig) -> Result<Self> {
        let api = SlackWebClient::from_config(config)?;
        Self::with_api(config, api)
    }

    /// Build from `CHARTSWORTH_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::new(&ChartsworthConfig::from_env())
    }
}

impl<A: SlackApi> Chartsworth<A> {
    /// Validate `config` and talk to Slack through `api`.
    pub fn with_api(config: &ChartsworthConfig, api: A) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            api,
            default_channel: config.default_channel.clone(),
            notebook: NotebookContext::from_env(config.base_deployment.as_str()),
            threads: Mutex::new(ThreadRegistry::new()),
        })
    }

    pub fn with_notebook(mut self, notebook: NotebookContext) -> Self {
        self.notebook = notebook;
        self
    }

    /// `explicit` if given, otherwise the default channel.
    pub fn resolve_channel(&self, explicit: Option<&str>) -> Result<String> {
        explicit
            .or(self.default_channel.as_deref())
            .map(str::to_string)
            .ok_or_else(|| {
                Error::config(
                    "No default channel set. Pass a channel in or set a default channel when initializing",
                )
            })
    }

    /// Current thread for the channel, if one is open.
    pub async fn thread_for(&self, channel: Option<&str>) -> Result<Option<String>> {
        let channel = self.resolve_channel(channel)?;
        Ok(self.threads.lock().await.get(&channel).map(str::to_string))
    }

    /// Open a new thread with `text`, abandoning the channel's current one.
    ///
    /// Nothing is recorded if Slack rejects the opening message.
    pub async fn begin_thread(&self, text: &str, channel: Option<&str>) -> Result<String> {
        let channel = self.resolve_channel(channel)?;
        let mut threads = self.threads.lock().await;
        let ts = self.api.post_message(&channel, text, None).await?;
        if let Some(previous) = threads.record(&channel, ts.as_str()) {
            tracing::info!(%channel, %previous, thread_ts = %ts, "replaced thread");
        } else {
            tracing::info!(%channel, thread_ts = %ts, open_threads = threads.len(), "opened thread");
        }
        Ok(ts)
    }

    /// Forget the channel's thread; the next post opens a new one.
    pub async fn forget_thread(&self, channel: Option<&str>) -> Result<Option<String>> {
        let channel = self.resolve_channel(channel)?;
        Ok(self.threads.lock().await.forget(&channel))
    }

    /// Thread for `channel`, opening it with `opening` if there is none yet.
    async fn ensure_thread(&self, channel: &str, opening: &str) -> Result<String> {
        let mut threads = self.threads.lock().await;
        if let Some(ts) = threads.get(channel) {
            return Ok(ts.to_string());
        }

        let ts = self.api.post_message(channel, opening, None).await?;
        threads.record(channel, ts.as_str());
        tracing::info!(%channel, thread_ts = %ts, open_threads = threads.len(), "opened thread");
        Ok(ts)
    }

    pub async fn post(&self, post: Post, channel: Option<&str>) -> Result<()> {
        match post {
            Post::Text(text) => self.post_text(&text, channel).await,
            Post::Image { image, filename } => {
                self.post_image(image, filename.as_deref(), channel).await
            }
        }
    }

    /// Post `text`: the first post to a channel opens its thread, later ones reply.
    pub async fn post_text(&self, text: &str, channel: Option<&str>) -> Result<()> {
        let channel = self.resolve_channel(channel)?;
        let mut threads = self.threads.lock().await;

        match threads.get(&channel).map(str::to_string) {
            Some(thread_ts) => {
                drop(threads);
                self.api
                    .post_message(&channel, text, Some(&thread_ts))
                    .await?;
            }
            None => {
                let ts = self.api.post_message(&channel, text, None).await?;
                threads.record(&channel, ts.as_str());
                tracing::info!(%channel, thread_ts = %ts, open_threads = threads.len(), "opened thread");
            }
        }
        Ok(())
    }

    /// Encode `image` as PNG and attach it to the channel's thread.
    ///
    /// Encoding happens before any request, so a bad image never opens a thread.
    pub async fn post_image(
        &self,
        image: impl Into<ImageSource>,
        filename: Option<&str>,
        channel: Option<&str>,
    ) -> Result<()> {
        let (channel, thread_ts, upload) = self
            .prepare_image(image.into(), filename, channel)
            .await?;
        self.upload(&channel, &thread_ts, upload).await
    }

    /// Like [`post_image`](Self::post_image), but a failed upload is replaced by
    /// a text notice in the thread pointing at the notebook.
    ///
    /// Only the upload itself falls back; a rejected opening message is returned
    /// as-is. If the notice cannot be posted either, the upload error is returned.
    pub async fn post_image_or_notice(
        &self,
        image: impl Into<ImageSource>,
        filename: Option<&str>,
        channel: Option<&str>,
    ) -> Result<UploadOutcome> {
        let (channel, thread_ts, upload) = self
            .prepare_image(image.into(), filename, channel)
            .await?;
        let filename = upload.filename.clone();

        let err = match self.upload(&channel, &thread_ts, upload).await {
            Ok(()) => return Ok(UploadOutcome::Uploaded),
            Err(err) => err,
        };

        tracing::warn!(error = %err, %filename, "image upload failed, posting notice instead");
        let notice = format!(
            "Unable to upload `{}` to Slack. Check the <{}|Notebook> for more details.",
            filename,
            self.notebook_link()
        );
        match self
            .api
            .post_message(&channel, &notice, Some(&thread_ts))
            .await
        {
            Ok(_) => Ok(UploadOutcome::Notice),
            Err(notice_err) => {
                tracing::warn!(error = %notice_err, "could not post upload notice");
                Err(err)
            }
        }
    }

    /// Resolve the channel, encode the image, then make sure a thread exists.
    async fn prepare_image(
        &self,
        image: ImageSource,
        filename: Option<&str>,
        channel: Option<&str>,
    ) -> Result<(String, String, ImageUpload)> {
        let channel = self.resolve_channel(channel)?;
        let upload = ImageUpload::new(image, filename)?;
        let thread_ts = self.ensure_thread(&channel, IMAGE_OPENING).await?;
        Ok((channel, thread_ts, upload))
    }

    async fn upload(&self, channel: &str, thread_ts: &str, upload: ImageUpload) -> Result<()> {
        tracing::debug!(
            %channel,
            filename = %upload.filename,
            size = upload.bytes.len(),
            "uploading image"
        );
        self.api
            .upload_file(channel, thread_ts, upload.bytes, &upload.filename)
            .await
    }

    /// React to the opening message of the channel's thread.
    pub async fn react_to_thread(&self, name: &str, channel: Option<&str>) -> Result<()> {
        let channel = self.resolve_channel(channel)?;
        let thread_ts = self.ensure_thread(&channel, REACTION_OPENING).await?;
        self.api.add_reaction(&channel, &thread_ts, name).await
    }

    /// Post a freshly generated monster plot.
    pub async fn post_monster(&self, channel: Option<&str>) -> Result<()> {
        self.post_monster_plot(MonsterPlot::random(), channel).await
    }

    pub async fn post_monster_plot(
        &self,
        monster: MonsterPlot,
        channel: Option<&str>,
    ) -> Result<()> {
        let channel = self.resolve_channel(channel)?;
        self.ensure_thread(&channel, MONSTER_OPENING).await?;
        self.post_image(
            ImageSource::figure(monster),
            Some(MONSTER_FILENAME),
            Some(channel.as_str()),
        )
        .await
    }

    pub fn notebook_id(&self) -> Option<&str> {
        self.notebook.file_id()
    }

    pub fn notebook_link(&self) -> String {
        self.notebook.link()
    }
}
