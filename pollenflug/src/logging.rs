use tracing_subscriber::{
    EnvFilter, Registry, fmt, layer::SubscriberExt, reload, util::SubscriberInitExt,
};

/// Handle to adjust the log level once the settings file has been read.
pub struct LogHandle(reload::Handle<EnvFilter, Registry>);

impl LogHandle {
    pub fn set_verbose(&self, verbose: bool) {
        if let Err(err) = self.0.reload(env_filter(verbose)) {
            eprintln!("failed to update log level: {err}");
        }
    }
}

/// Install a stderr subscriber. `RUST_LOG` wins over `verbose` when set.
pub fn init(verbose: bool) -> LogHandle {
    let (filter, handle) = reload::Layer::new(env_filter(verbose));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
        .init();

    LogHandle(handle)
}

fn env_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("warn,pollenflug=debug,pollen_core=debug")
        } else {
            EnvFilter::new("warn")
        }
    })
}
