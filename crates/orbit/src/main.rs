use anyhow::Context;
use clap::Parser;
use orbit::cli::{Cli, Command};
use orbit::draw::DrawOptions;
use orbit::render::{PointerInput, RenderJob};
use orbit::sys::watch::FileWatcher;
use orbit::{config, dataset};

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    match cli.command {
        Command::Init => {
            let path = config::write_default_config().context("Failed to write default config")?;
            println!("{}", path.display());
        }
        Command::Plan { input } => {
            let config = config::load_config(cli.config.as_deref())?;
            let dataset = dataset::load(input.dataset.as_deref())?;
            let plan = orbit_layout::plan(&dataset, &input.layout(&config.layout));
            println!("{}", serde_json::to_string_pretty(&plan)?);
        }
        Command::Render {
            input,
            output,
            pointer,
            click,
            dial,
            at,
            watch,
        } => {
            let pointer = PointerInput {
                pointer,
                click,
                dial,
            };
            let draw = DrawOptions { elapsed_secs: at };
            let mut job = RenderJob::new(input, cli.config, output, pointer, draw);
            job.run()?;

            if watch {
                let watcher = FileWatcher::new(job.input.dataset.clone(), job.config_paths())?;
                log::info!("Watching for changes, press Ctrl-C to stop");
                while let Some(event) = watcher.next_change() {
                    log::info!("{:?}, re-rendering", event);
                    if let Err(e) = job.run() {
                        log::error!("Render failed: {:#}", e);
                    }
                }
                log::debug!("Computed {} plan(s)", job.plans_computed());
            }
        }
    }
    Ok(())
}
