use std::io::Write;

/// Initialises the `env_logger` backend.
///
/// `RUST_LOG` wins when set; otherwise the filter is `debug` with `verbose`
/// and `warn` without.
pub fn init(verbose: bool) {
    let filter = if verbose { "debug" } else { "warn" };

    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter))
        .format(|buf, record| {
            writeln!(
                buf,
                "[{}] {} [{}] {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
                record.level(),
                record.target(),
                record.args()
            )
        })
        .try_init();
}
