//! Pipeline commands: full run and OCR only.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::config::Settings;
use crate::intake::ImageUpload;
use crate::llm::LlmClient;
use crate::ocr;
use crate::pipeline::Pipeline;

fn spinner() -> anyhow::Result<ProgressBar> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}")?);
    pb.enable_steady_tick(Duration::from_millis(100));
    Ok(pb)
}

fn build_pipeline(settings: &Settings) -> anyhow::Result<Pipeline> {
    let llm = LlmClient::new(settings.llm.clone())?;
    Ok(Pipeline::new(
        ocr::create_backend(&settings.ocr),
        Arc::new(llm),
    ))
}

/// Process one image end to end and write the document.
pub async fn cmd_run(settings: &Settings, image: &Path, output: &Path) -> anyhow::Result<()> {
    let upload = ImageUpload::from_path(image)?;
    let pipeline = build_pipeline(settings)?;

    if !settings.llm.has_credentials() {
        println!(
            "{} No API key set for {}; set OPENAI_API_KEY or LLM_API_KEY",
            style("!").yellow(),
            settings.llm.provider.as_str()
        );
    }

    let pb = spinner()?;
    pb.set_message(format!("Reading text from {}...", upload.filename));
    let extracted_text = match pipeline.extract_text(&upload).await {
        Ok(text) => text,
        Err(e) => {
            pb.finish_and_clear();
            return Err(e.into());
        }
    };

    pb.set_message(format!(
        "Generating questions with {}...",
        settings.llm.model
    ));
    let result = pipeline.generate(extracted_text).await;
    pb.finish_and_clear();
    let result = result?;

    println!("{}", style("Extracted Text").bold());
    println!("{}", "-".repeat(50));
    println!("{}\n", result.extracted_text);

    println!("{}", style("Identified Topics").bold());
    println!("{}", "-".repeat(50));
    println!("{}\n", result.topics);

    println!("{}", style("Generated Questions and Answers").bold());
    println!("{}", "-".repeat(50));
    println!("{}\n", result.combined());

    let bytes = result.to_document().to_bytes()?;
    std::fs::write(output, &bytes)?;

    println!(
        "{} Wrote {} ({} bytes)",
        style("✓").green(),
        output.display(),
        bytes.len()
    );
    Ok(())
}

/// Print the text OCR finds in an image.
pub async fn cmd_ocr(settings: &Settings, image: &Path) -> anyhow::Result<()> {
    let upload = ImageUpload::from_path(image)?;
    let pipeline = build_pipeline(settings)?;

    if !pipeline.ocr().is_available() {
        println!(
            "{} {}",
            style("!").yellow(),
            pipeline.ocr().availability_hint()
        );
    }

    let pb = spinner()?;
    pb.set_message(format!("Reading text from {}...", upload.filename));
    let text = pipeline.extract_text(&upload).await;
    pb.finish_and_clear();

    println!("{}", text?);
    Ok(())
}
