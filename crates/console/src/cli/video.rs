//! `supportdesk video`: script a support video, optionally from a
//! screenshot, and render the placeholder.

use std::path::Path;

use sd_domain::config::Config;
use sd_domain::request::VideoType;
use sd_domain::video::VideoGeneration;
use sd_providers::InlineImage;

use crate::bootstrap;

pub struct VideoArgs {
    pub message: String,
    pub image: Option<std::path::PathBuf>,
    pub video_type: VideoType,
    pub json: bool,
}

pub async fn run(config: &Config, args: VideoArgs) -> anyhow::Result<()> {
    let router = bootstrap::build_router(config)?;
    let multimodal = router.multimodal();

    let generated = match &args.image {
        Some(path) => {
            let image = load_image(path)?;
            multimodal.generate_with_image(&args.message, &image).await
        }
        None => {
            multimodal
                .generate_video_script(&args.message, args.video_type)
                .await
        }
    }
    .map_err(|e| anyhow::anyhow!("{e}\n{}", e.hint()))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&generated)?);
    } else {
        print!("{}", render(&generated));
    }
    Ok(())
}

/// Read an image file and tag it with the MIME type of its extension.
pub fn load_image(path: &Path) -> anyhow::Result<InlineImage> {
    let data = std::fs::read(path)
        .map_err(|e| anyhow::anyhow!("reading {}: {e}", path.display()))?;
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default();
    Ok(InlineImage::new(InlineImage::mime_for_extension(ext), data))
}

fn render(generated: &VideoGeneration) -> String {
    format!(
        "{}\n{}\n",
        generated.script.to_markdown(),
        generated.actual_video.summary()
    )
}
