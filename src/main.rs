use glimpse::{Config, run};

fn main() -> anyhow::Result<()> {
    let config = Config::load()?;

    let mut builder = tokio::runtime::Builder::new_multi_thread();
    builder.enable_all();
    match config.general.worker_threads {
        0 => {}
        n => {
            builder.worker_threads(n);
        }
    }

    builder.build()?.block_on(run(config))
}
