use clap::Parser;
use mri_lense_lib::cli::{Cli, Commands, MAX_TIMEOUT_SECS};
use mri_lense_lib::services::views::tabs::Tab;
use std::time::Duration;

#[test]
fn analyze_defaults() {
    let cli = Cli::try_parse_from(["mri-lense", "analyze", "--file", "scan.jpg"]).unwrap();
    assert_eq!(cli.timeout_secs, 180);
    match &cli.command {
        Commands::Analyze(args) => {
            assert_eq!(args.tab, Tab::ActivationMaps);
            assert!(!args.gradcam);
            assert!(args.maps_dir.is_none());
        }
        Commands::Health => panic!("expected analyze"),
    }
    assert_eq!(cli.client_config(true).timeout, Duration::from_secs(180));
}

#[test]
fn timeout_outside_range_is_rejected() {
    for bad in ["0", "86401", "18446744073709551615"] {
        let parsed = Cli::try_parse_from(["mri-lense", "--timeout-secs", bad, "health"]);
        assert!(parsed.is_err(), "accepted --timeout-secs {}", bad);
    }
    let max = MAX_TIMEOUT_SECS.to_string();
    let cli = Cli::try_parse_from(["mri-lense", "--timeout-secs", max.as_str(), "health"]).unwrap();
    assert_eq!(cli.timeout_secs, MAX_TIMEOUT_SECS);
}
