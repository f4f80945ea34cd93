//! Subcommand handlers.

use std::path::Path;

use anyhow::{Context, bail};
use dotmatrix_engine::{Settings, process, process_with_rng};
use genai_client::GeminiClient;
use image::{ImageFormat, RgbaImage};
use label_store::debounce::DEFAULT_SAVE_DELAY;
use label_store::{DebouncedSettingsWriter, apply_field};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde_json::Value;

use crate::args::RenderArgs;
use crate::bootstrap::{Foundation, load_fonts};

/// Split `key=value`. The value is JSON when it parses as JSON, a string otherwise.
pub fn parse_assignment(raw: &str) -> anyhow::Result<(String, Value)> {
    let Some((key, value)) = raw.split_once('=') else {
        bail!("expected KEY=VALUE, got '{raw}'");
    };
    let key = key.trim();
    if key.is_empty() {
        bail!("missing key in '{raw}'");
    }
    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((key.to_string(), value))
}

/// Apply a list of assignments on top of `settings`.
pub fn apply_assignments(mut settings: Settings, raw: &[String]) -> anyhow::Result<Settings> {
    for item in raw {
        let (key, value) = parse_assignment(item)?;
        settings = apply_field(&settings, &key, value)?;
    }
    Ok(settings)
}

pub fn render(foundation: &Foundation, args: RenderArgs) -> anyhow::Result<()> {
    let settings = apply_assignments(foundation.store.load()?, &args.overrides)?;
    let fonts = load_fonts(&foundation.data_dir, args.font_dir.as_deref())?;

    let source = image::open(&args.input)
        .with_context(|| format!("failed to decode {}", args.input.display()))?
        .to_rgba8();

    let mut output = RgbaImage::new(0, 0);
    match args.seed {
        Some(seed) => {
            let mut rng = StdRng::seed_from_u64(seed);
            process_with_rng(&source, &mut output, &settings, &fonts, &mut rng)
        }
        None => process(&source, &mut output, &settings, &fonts),
    }
    if output.width() == 0 || output.height() == 0 {
        bail!("settings produced no output (check outputWidth, outputHeight and pixelSize)");
    }

    write_png(&output, &args.output)?;
    tracing::info!(
        output = %args.output.display(),
        width = output.width(),
        height = output.height(),
        "Rendered label"
    );
    Ok(())
}

pub async fn generate_image(prompt: &str, output: &Path) -> anyhow::Result<()> {
    let client = GeminiClient::from_env()?;
    let img = client.generate_image(prompt).await?;
    write_png(&img, output)?;
    tracing::info!(output = %output.display(), "Saved generated image");
    Ok(())
}

pub async fn generate_label(foundation: &Foundation, context: &str, save: bool) -> anyhow::Result<()> {
    let client = GeminiClient::from_env()?;
    let text = client.generate_label_text(context).await?;
    println!("{text}");

    if save {
        foundation.store.set_field("text", Value::String(text))?;
        foundation.store.set_field("showText", Value::Bool(true))?;
        tracing::info!("Stored generated text as overlay");
    }
    Ok(())
}

pub fn settings_show(foundation: &Foundation) -> anyhow::Result<()> {
    let settings = foundation.store.load()?;
    println!("{}", serde_json::to_string_pretty(&settings)?);
    Ok(())
}

/// All assignments are validated before anything is queued, so a bad one
/// leaves the stored settings untouched.
pub async fn settings_set(foundation: &Foundation, raw: &[String]) -> anyhow::Result<()> {
    let settings = apply_assignments(foundation.store.load()?, raw)?;

    let writer = DebouncedSettingsWriter::new(foundation.store.clone(), DEFAULT_SAVE_DELAY);
    writer.update(settings.clone());
    writer.shutdown().await;

    println!("{}", serde_json::to_string_pretty(&settings)?);
    Ok(())
}

pub fn settings_reset(foundation: &Foundation) -> anyhow::Result<()> {
    foundation.store.reset()?;
    println!("Settings reset to defaults.");
    Ok(())
}

fn write_png(img: &RgbaImage, path: &Path) -> anyhow::Result<()> {
    img.save_with_format(path, ImageFormat::Png)
        .with_context(|| format!("failed to write {}", path.display()))
}
