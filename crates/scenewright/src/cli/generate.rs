//! Generate command handler.

use super::GenerateArgs;
use scenewright::{
    ExportBundle, GeminiClient, GenerationGateway, GenerativeDriver, ImageData, Pipeline,
    SceneId, ScenewrightConfig, ScenewrightResult, ValidationError, ValidationErrorKind,
};
use std::path::{Path, PathBuf};
use tracing::{info, instrument, warn};

/// Run the full pipeline for one idea and write the export bundle.
#[instrument(skip_all, fields(out = %args.out.display(), keyframes = args.keyframes))]
pub async fn run_generate(args: &GenerateArgs, config: &ScenewrightConfig) -> ScenewrightResult<()> {
    let idea = match (&args.idea, &args.file) {
        (Some(idea), _) => idea.clone(),
        (None, Some(path)) => std::fs::read_to_string(path).map_err(|e| unreadable(path, &e))?,
        (None, None) => Err(ValidationError::new(ValidationErrorKind::BlankIdea))?,
    };

    let mut settings = config.pipeline().clone();
    if let Some(aspect_ratio) = args.aspect_ratio {
        settings.aspect_ratio = aspect_ratio;
    }

    let client = GeminiClient::from_settings(config.gemini(), config.models().script().clone())?;
    let gateway = GenerationGateway::new(client, config.models().clone());
    let pipeline = Pipeline::new(gateway, settings);

    let Some((title, written)) = produce(&pipeline, &idea, args).await? else {
        return Ok(());
    };

    println!("{}", title);
    for path in written {
        println!("  {}", path.display());
    }
    Ok(())
}

/// Drive one story through the pipeline and export whatever was produced.
///
/// Only a failed screenplay stops the run; character, anchor and keyframe
/// failures are logged and the screenplay is exported without them.
async fn produce<D: GenerativeDriver + 'static>(
    pipeline: &Pipeline<D>,
    idea: &str,
    args: &GenerateArgs,
) -> ScenewrightResult<Option<(String, Vec<PathBuf>)>> {
    pipeline.submit_idea(idea).await?;

    for path in &args.characters {
        let image = load_image(path)?;
        let added = pipeline.add_character_reference(image).await;
        info!(path = %path.display(), added, "Loaded character reference");
    }

    if let Some(prompt) = &args.character_prompt {
        if let Err(err) = pipeline.request_character_image(prompt).await {
            warn!(error = %err, "Continuing without a generated character");
        }
    }

    if let Some(anchor) = args.anchor_scene {
        let scene_id = SceneId(anchor);
        match pipeline.request_keyframe(scene_id, None).await {
            Ok(Some(_)) => {
                let locked = pipeline.lock_scene_keyframe(scene_id).await;
                info!(scene = anchor, locked, "Anchored scene keyframe");
            }
            Ok(None) => warn!(scene = anchor, "Anchor scene not found"),
            Err(err) => {
                warn!(scene = anchor, error = %err, "Continuing without an anchor keyframe");
            }
        }
    }

    if args.keyframes {
        let snapshot = pipeline.snapshot().await;
        let pending: Vec<SceneId> = snapshot
            .screenplay
            .iter()
            .flat_map(|screenplay| screenplay.scenes())
            .filter(|scene| scene.keyframe_image().is_none())
            .map(|scene| *scene.id())
            .collect();

        let results = futures::future::join_all(
            pending
                .iter()
                .map(|scene_id| pipeline.request_keyframe(*scene_id, None)),
        )
        .await;
        let failed = results.iter().filter(|result| result.is_err()).count();
        if failed > 0 {
            warn!(failed, "Some keyframes could not be generated");
        }
    }

    pipeline.wait_for_thumbnail().await;

    let snapshot = pipeline.snapshot().await;
    let Some(screenplay) = snapshot.screenplay else {
        warn!("No screenplay to export");
        return Ok(None);
    };
    let title = screenplay.title().clone();
    let written = ExportBundle::new(screenplay, snapshot.thumbnail).write_to(&args.out)?;
    Ok(Some((title, written)))
}

fn load_image(path: &Path) -> ScenewrightResult<ImageData> {
    let bytes = std::fs::read(path).map_err(|e| unreadable(path, &e))?;
    let extension = path
        .extension()
        .and_then(|extension| extension.to_str())
        .unwrap_or_default();
    Ok(ImageData::from_bytes(
        ImageData::mime_for_extension(extension),
        &bytes,
    ))
}

fn unreadable(path: &Path, err: &std::io::Error) -> ValidationError {
    ValidationError::new(ValidationErrorKind::UnreadableInput {
        path: path.display().to_string(),
        message: err.to_string(),
    })
}
