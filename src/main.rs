use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use num_rational::BigRational;

use aeb_verify::calibration::{Calibration, ThresholdValues};
use aeb_verify::controller::TableLayout;
use aeb_verify::decimal::parse_rational;
use aeb_verify::solver::SolverConfig;
use aeb_verify::verify::{Report, VerificationCase};

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Cli {
    /// Full-braking deceleration.
    #[arg(long, value_name = "NUM", value_parser = parse_rational, default_value = "9.8")]
    fb_decel: BigRational,

    /// Partial-braking (stage 2) deceleration.
    #[arg(long, value_name = "NUM", value_parser = parse_rational, default_value = "5.3")]
    pb2_decel: BigRational,

    /// Partial-braking (stage 1) deceleration.
    #[arg(long, value_name = "NUM", value_parser = parse_rational, default_value = "3.8")]
    pb1_decel: BigRational,

    /// Pin the full-braking threshold (free if unset).
    #[arg(long, value_name = "NUM", value_parser = parse_rational)]
    fb_time: Option<BigRational>,

    /// Pin the PB2 threshold (free if unset).
    #[arg(long, value_name = "NUM", value_parser = parse_rational)]
    pb2_time: Option<BigRational>,

    /// Pin the PB1 threshold (free if unset).
    #[arg(long, value_name = "NUM", value_parser = parse_rational)]
    pb1_time: Option<BigRational>,

    /// Pin the forward-collision-warning threshold (free if unset).
    #[arg(long, value_name = "NUM", value_parser = parse_rational)]
    fcw_time: Option<BigRational>,

    /// Decision table to verify.
    #[arg(long, value_enum, default_value_t = Layout::Standard)]
    layout: Layout,

    /// Theory checks before giving up with `unknown`.
    #[arg(long, value_name = "INT", default_value = "10000")]
    max_checks: usize,

    /// Log level.
    #[arg(long, value_enum, default_value_t = LogLevel::Warn)]
    log_level: LogLevel,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
enum Layout {
    Standard,
    PriorityInverted,
}

impl From<Layout> for TableLayout {
    fn from(layout: Layout) -> Self {
        match layout {
            Layout::Standard => TableLayout::Standard,
            Layout::PriorityInverted => TableLayout::PriorityInverted,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for simplelog::LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => simplelog::LevelFilter::Off,
            LogLevel::Error => simplelog::LevelFilter::Error,
            LogLevel::Warn => simplelog::LevelFilter::Warn,
            LogLevel::Info => simplelog::LevelFilter::Info,
            LogLevel::Debug => simplelog::LevelFilter::Debug,
            LogLevel::Trace => simplelog::LevelFilter::Trace,
        }
    }
}

fn main() -> color_eyre::Result<ExitCode> {
    color_eyre::install()?;

    let args = Cli::parse();

    simplelog::TermLogger::init(
        args.log_level.into(),
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    log::debug!("args = {:?}", args);

    let calibration = Calibration {
        fb_decel: args.fb_decel,
        pb2_decel: args.pb2_decel,
        pb1_decel: args.pb1_decel,
        thresholds: ThresholdValues {
            fb_time: args.fb_time,
            pb2_time: args.pb2_time,
            pb1_time: args.pb1_time,
            fcw_time: args.fcw_time,
        },
    };
    let config = SolverConfig {
        max_theory_checks: args.max_checks,
        ..SolverConfig::default()
    };

    let time_total = std::time::Instant::now();
    let case = VerificationCase::with_layout(&calibration, args.layout.into());
    let result = case.verify(&config);
    log::info!("verification took {:.3} s", time_total.elapsed().as_secs_f64());

    print!("{}", Report::new(&case, &result));

    Ok(ExitCode::from(result.exit_code()))
}

#[cfg(test)]
mod tests {
    use aeb_verify::calibration::{DEFAULT_FB_DECEL, DEFAULT_PB1_DECEL, DEFAULT_PB2_DECEL};
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_defaults_match_calibration() {
        let args = Cli::parse_from(["aeb-verify"]);
        assert_eq!(args.fb_decel, DEFAULT_FB_DECEL.to_rational());
        assert_eq!(args.pb2_decel, DEFAULT_PB2_DECEL.to_rational());
        assert_eq!(args.pb1_decel, DEFAULT_PB1_DECEL.to_rational());
        assert_eq!(args.fb_time, None);
        assert_eq!(args.layout, Layout::Standard);
        assert_eq!(args.max_checks, 10_000);
    }

    #[test]
    fn test_help_shows_decimal_defaults() {
        let command = Cli::command();
        let default_of = |id: &str| {
            let arg = command.get_arguments().find(|arg| arg.get_id().as_str() == id).unwrap();
            arg.get_default_values()[0].to_string_lossy().into_owned()
        };
        assert_eq!(default_of("fb_decel"), DEFAULT_FB_DECEL.to_string());
        assert_eq!(default_of("pb2_decel"), DEFAULT_PB2_DECEL.to_string());
        assert_eq!(default_of("pb1_decel"), DEFAULT_PB1_DECEL.to_string());
    }

    #[test]
    fn test_exact_arguments() {
        let args = Cli::parse_from([
            "aeb-verify",
            "--fb-time",
            "0.6",
            "--pb2-decel",
            "49/5",
            "--layout",
            "priority-inverted",
        ]);
        assert_eq!(args.fb_time, Some(BigRational::new(3.into(), 5.into())));
        assert_eq!(args.pb2_decel, BigRational::new(49.into(), 5.into()));
        assert_eq!(TableLayout::from(args.layout), TableLayout::PriorityInverted);
        assert!(Cli::try_parse_from(["aeb-verify", "--fb-decel", "9,8"]).is_err());
    }
}
