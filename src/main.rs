use cvecollect::application::Application;

use log::LevelFilter;
use simple_logger::SimpleLogger;

fn main() {
    // RUST_LOG overrides the default level
    SimpleLogger::new()
        .with_level(LevelFilter::Warn)
        .env()
        .init()
        .expect("Unable to initialize the logger.");

    let mut application = Application::new();
    application.read_argv();
    application.run();
}
