use std::process::ExitCode;

use clap::Parser;

use mirrorwater::{Args, Viewer};

fn main() -> ExitCode {
    let _ = env_logger::try_init();
    let args = Args::parse();

    match try_main(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err}");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn try_main(args: &Args) -> mirrorwater::Result<()> {
    let config = args.load_config()?;
    let mut viewer = Viewer::new(config, args.simulation()?);

    match &args.headless {
        Some(path) => mirrorwater::render_to_file(&mut viewer, path, args.width, args.height, args.time),
        None => mirrorwater::run(viewer, args.width, args.height),
    }
}
