use log::info;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut app = orbital_gallery::default()?;
    app.start_default_sources()?;

    info!("Starting gallery");
    app.run()
}
