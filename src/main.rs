mod app;
mod canvas;
mod character;
mod clock;
mod driver;
mod input;
mod render;
mod sprite;

fn main() {
    env_logger::init();
    log::info!("runcat starting up");

    if let Err(e) = app::run() {
        log::error!("Fatal error: {e:#}");
        std::process::exit(1);
    }
}
