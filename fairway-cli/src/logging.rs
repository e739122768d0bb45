//! Stderr logging for the `fairway` binary.

use log::{LevelFilter, Metadata};

const LOCAL_TARGETS: [&str; 3] = ["fairway_core", "fairway_data", "fairway_cli"];

/// Level for Fairway's own crates given the number of `-v` flags.
pub(crate) const fn level_for(verbosity: u8) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    }
}

/// Install the global logger.
///
/// Dependencies only get through at `warn` and above; Fairway's crates log at
/// [`level_for`] `verbosity`.
pub(crate) fn init_logging(verbosity: u8) -> Result<(), log::SetLoggerError> {
    let local_level = level_for(verbosity);
    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "{} {:<5} {}: {}",
                chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ"),
                record.level(),
                record.target(),
                message
            ));
        })
        .level(local_level)
        .filter(move |meta| allowed(meta, local_level))
        .chain(std::io::stderr())
        .apply()
}

fn allowed(meta: &Metadata<'_>, local_level: LevelFilter) -> bool {
    if is_local(meta.target()) {
        meta.level() <= local_level
    } else {
        meta.level() <= LevelFilter::Warn
    }
}

fn is_local(target: &str) -> bool {
    let module = target.split("::").next().unwrap_or(target);
    LOCAL_TARGETS.contains(&module)
}

#[cfg(test)]
mod tests {
    use super::*;
    use log::Level;
    use rstest::rstest;

    fn meta(target: &str, level: Level) -> Metadata<'_> {
        Metadata::builder().target(target).level(level).build()
    }

    #[rstest]
    #[case(0, LevelFilter::Warn)]
    #[case(1, LevelFilter::Info)]
    #[case(2, LevelFilter::Debug)]
    #[case(9, LevelFilter::Debug)]
    fn verbosity_maps_to_level(#[case] verbosity: u8, #[case] expected: LevelFilter) {
        assert_eq!(level_for(verbosity), expected);
    }

    #[rstest]
    fn dependencies_are_held_at_warn() {
        assert!(!allowed(&meta("reqwest::connect", Level::Info), LevelFilter::Debug));
        assert!(allowed(&meta("rusqlite", Level::Warn), LevelFilter::Debug));
    }

    #[rstest]
    fn local_crates_follow_verbosity() {
        let info = meta("fairway_core::directory", Level::Info);
        assert!(!allowed(&info, LevelFilter::Warn));
        assert!(allowed(&info, LevelFilter::Info));
    }
}
