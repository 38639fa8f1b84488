mod animation;
mod app;
mod camera;
mod input;
mod interaction;
mod physics;
mod player;
mod render;
mod session;
mod settings;
mod snapshot;
mod targeting;
mod world;

fn main() {
    if let Err(err) = app::run() {
        eprintln!("{err}");
        std::process::exit(1);
    }
}
