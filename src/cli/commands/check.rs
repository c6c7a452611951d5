//! Configuration check command.

use console::style;

use crate::config::Settings;
use crate::ocr;

/// Report whether OCR and the language model are usable.
pub async fn cmd_check(settings: &Settings) -> anyhow::Result<()> {
    println!("\n{}", style("quizscribe Status").bold());
    println!("{}", "-".repeat(50));

    println!("\n{}", style("OCR:").cyan());
    let backend = ocr::create_backend(&settings.ocr);
    let ocr_ok = backend.is_available();
    let status = if ocr_ok {
        style("✓ available").green()
    } else {
        style("✗ not available").red()
    };
    println!("  {:<15} {}", backend.backend_type().as_str(), status);
    println!("  {:<15} {}", "Command", settings.ocr.tesseract_cmd);
    println!("  {:<15} {}", "Language", settings.ocr.language);
    if !ocr_ok {
        println!("                  {}", style(backend.availability_hint()).dim());
    }

    println!("\n{}", style("Language Model:").cyan());
    println!("  {:<15} {}", "Provider", settings.llm.provider.as_str());
    println!("  {:<15} {}", "Model", settings.llm.model);
    println!("  {:<15} {}", "Endpoint", settings.llm.effective_endpoint());
    println!("  {:<15} {}", "Temperature", crate::llm::prompts::TEMPERATURE);
    let llm_ok = settings.llm.has_credentials();
    let key_status = if llm_ok {
        style("✓ configured").green()
    } else {
        style("✗ missing (set OPENAI_API_KEY or LLM_API_KEY)").red()
    };
    println!("  {:<15} {}", "API key", key_status);

    println!("\n{}", style("Web Server:").cyan());
    println!("  {:<15} {}", "Bind", settings.server.bind);
    println!(
        "  {:<15} {} bytes",
        "Upload limit", settings.server.max_upload_bytes
    );

    println!();
    if ocr_ok && llm_ok {
        println!("{} Ready", style("✓").green());
    } else {
        println!("{} Some components need attention", style("!").yellow());
    }

    Ok(())
}
