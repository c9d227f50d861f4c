//! Media path resolution and captioning.

use std::path::{Path, PathBuf};

use futures::future::try_join_all;
use tracing::debug;

use deckhand_core::{ContentId, ContentItem, LanguageModel, ResponseFormat, Section};

use crate::error::{IngestError, IngestResult};
use crate::prompts;

/// Resolve every media path in `section` against `image_dir`.
///
/// Tables without a snapshot are untouched. A path that resolves nowhere
/// fails the chunk.
pub fn resolve_media(section: &mut Section, image_dir: &Path) -> IngestResult<()> {
    for item in section.content.iter_mut() {
        item.resolve(image_dir)?;
    }
    Ok(())
}

enum CaptionJob {
    Image {
        id: ContentId,
        path: PathBuf,
        context: String,
    },
    Table {
        id: ContentId,
        body: String,
        context: String,
    },
}

/// Caption every media item in `section`, all calls in flight together.
///
/// Images go to the vision model, tables to the language model. A blank
/// caption is rejected, and any failure fails the whole chunk.
pub async fn caption_media(
    section: &mut Section,
    language_model: &dyn LanguageModel,
    vision_model: &dyn LanguageModel,
) -> IngestResult<()> {
    let jobs: Vec<CaptionJob> = section
        .content
        .iter()
        .filter_map(|item| match item {
            ContentItem::Media(media) => Some(CaptionJob::Image {
                id: media.id,
                path: media.path.clone(),
                context: media.context.clone(),
            }),
            ContentItem::Table(table) => Some(CaptionJob::Table {
                id: table.id,
                body: table.body.clone(),
                context: table.context.clone(),
            }),
            ContentItem::SubSection(_) => None,
        })
        .collect();

    if jobs.is_empty() {
        return Ok(());
    }

    let captions = try_join_all(
        jobs.into_iter()
            .map(|job| run_caption(job, language_model, vision_model)),
    )
    .await?;

    for (id, caption) in captions {
        if let Some(item) = section.content.iter_mut().find(|item| item.id() == id) {
            item.set_caption(caption);
        }
    }
    Ok(())
}

async fn run_caption(
    job: CaptionJob,
    language_model: &dyn LanguageModel,
    vision_model: &dyn LanguageModel,
) -> IngestResult<(ContentId, String)> {
    let (id, raw) = match job {
        CaptionJob::Image { id, path, context } => {
            let prompt = prompts::image_caption_prompt(&context);
            let text = vision_model
                .invoke_vision(&prompt, &path)
                .await
                .map_err(|e| IngestError::Caption(e.to_string()))?;
            (id, text)
        }
        CaptionJob::Table { id, body, context } => {
            let prompt = prompts::table_caption_prompt(&body, &context);
            let text = language_model
                .invoke(&prompt, ResponseFormat::Text)
                .await
                .map_err(|e| IngestError::Caption(e.to_string()))?;
            (id, text)
        }
    };

    let caption = raw.trim().to_string();
    if caption.is_empty() {
        return Err(IngestError::Caption(
            "model returned a blank caption".to_string(),
        ));
    }
    debug!(%id, "media captioned");
    Ok((id, caption))
}
