use std::path::PathBuf;

use clap::{Parser, Subcommand};
use wavescript_core::{
    AudioObject, FadeShape, Wave,
    diagnostics::init_tracing,
    fixtures::demo_host,
};

#[derive(Debug, Parser)]
#[command(name = "wavescript-cli")]
#[command(about = "Headless driver for scripted wave/montage batch workflows")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, default_value = "logs")]
    log_dir: PathBuf,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Runs a representative scripted batch against the demo session and
    /// renders the results.
    DemoBatch {
        #[arg(long, default_value = "data/renders")]
        output_dir: PathBuf,
    },
    /// Opens a WAV file and prints its shape as JSON.
    Probe { input: PathBuf },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let _telemetry = init_tracing(&cli.log_dir)?;

    match cli.command {
        Commands::DemoBatch { output_dir } => run_demo_batch(&output_dir)?,
        Commands::Probe { input } => probe(&input)?,
    }

    Ok(())
}

fn run_demo_batch(output_dir: &std::path::Path) -> anyhow::Result<()> {
    std::fs::create_dir_all(output_dir)?;

    let session = demo_host();
    let mut host = session.host;
    let presets = host.presets.clone();

    host.application.set_responsive_ui(false);
    host.log_window.print_info("demo batch starting");

    {
        let wave = host.workspace.wave_mut(session.wave)?;
        wave.select(0, 2_000);
        wave.fade_in(FadeShape::Sinus)?;
        let size = wave.size();
        wave.select(size - 2_000, 2_000);
        wave.fade_out(FadeShape::Sinus)?;
        wave.select(0, size);
        wave.normalize("Peak -1 dB", &presets)?;
    }

    let mut written = Vec::new();
    let take_output = output_dir.join("demo-take.wav");
    written.extend(host.render_wave(session.wave, &take_output.display().to_string())?);
    let region_output = output_dir.join("*");
    written.extend(host.render_wave(session.wave, &region_output.display().to_string())?);

    {
        let montage = host.workspace.montage_mut(session.montage)?;
        let first = montage
            .first_clip()
            .ok_or_else(|| anyhow::anyhow!("demo montage has no clips"))?;
        montage.select_active_clip(first)?;
    }
    let first = host
        .workspace
        .montage(session.montage)?
        .active_clip()
        .ok_or_else(|| anyhow::anyhow!("demo montage lost its active clip"))?;
    host.set_clip_default_fade_in(session.montage, first)?;
    host.set_clip_default_fade_out(session.montage, first)?;
    let montage_output = output_dir.join("demo-montage.wav");
    written.extend(host.render_montage(session.montage, &montage_output.display().to_string())?);

    let drained = host.application.wait_until_tasks_finished();
    host.log_window.print_info("demo batch finished");

    let summary = serde_json::json!({
        "outputs": written,
        "background_tasks_drained": drained,
        "log_entries": host.log_window.entries().len(),
    });
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

fn probe(input: &std::path::Path) -> anyhow::Result<()> {
    let wave = Wave::from_file(input)?;
    let report = serde_json::json!({
        "path": input.display().to_string(),
        "sample_rate": wave.sample_rate(),
        "channels": wave.num_channels(),
        "frames": wave.size(),
        "duration_seconds": wavescript_core::units::samples_to_seconds(
            wave.size(),
            wave.sample_rate(),
        ),
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
