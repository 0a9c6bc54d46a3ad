use std::path::Path;

use cubefield::{options::Options, Viewer};

fn load_options(arg: Option<String>) -> Result<Options, cubefield::CubefieldError> {
    arg.map_or_else(
        || Ok(Options::default()),
        |path| Options::load(Path::new(&path)),
    )
}

fn main() {
    env_logger::init();

    let options = match load_options(std::env::args().nth(1)) {
        Ok(options) => options,
        Err(e) => {
            log::error!("{e}");
            log::error!("Usage: cubefield [preset.toml]");
            std::process::exit(1);
        }
    };

    if let Err(e) = Viewer::builder().with_options(options).build().run() {
        log::error!("{e}");
        std::process::exit(1);
    }
}
