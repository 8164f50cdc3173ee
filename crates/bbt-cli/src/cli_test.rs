use super::*;

#[test]
fn test_run_with_positional_and_select() {
    let cli = Cli::try_parse_from([
        "bbt",
        "run",
        "block_stats",
        "-s",
        "tag:daily",
        "-s",
        "+gas_summary",
    ])
    .unwrap();

    match cli.command {
        Commands::Run(args) => {
            assert_eq!(args.targets, vec!["block_stats"]);
            assert_eq!(args.select, vec!["tag:daily", "+gas_summary"]);
            assert!(!args.full_refresh);
            assert!(args.threads.is_none());
        }
        _ => panic!("expected run command"),
    }
}

#[test]
fn test_run_flags() {
    let cli = Cli::try_parse_from([
        "bbt",
        "run",
        "--full-refresh",
        "--threads",
        "4",
        "--timeout",
        "30",
    ])
    .unwrap();

    match cli.command {
        Commands::Run(args) => {
            assert!(args.full_refresh);
            assert_eq!(args.threads, Some(4));
            assert_eq!(args.timeout, Some(30));
        }
        _ => panic!("expected run command"),
    }
}

#[test]
fn test_compile_defaults_to_all() {
    let cli = Cli::try_parse_from(["bbt", "compile"]).unwrap();
    match cli.command {
        Commands::Compile(args) => {
            assert!(args.targets.is_empty());
            assert!(args.select.is_empty());
        }
        _ => panic!("expected compile command"),
    }
}

#[test]
fn test_init_with_adapter() {
    let cli = Cli::try_parse_from(["bbt", "init", "chainlytics", "--adapter", "polygon"]).unwrap();
    match cli.command {
        Commands::Init(args) => {
            assert_eq!(args.name, "chainlytics");
            assert_eq!(args.adapter, "polygon");
        }
        _ => panic!("expected init command"),
    }
}

#[test]
fn test_global_project_dir() {
    let cli = Cli::try_parse_from(["bbt", "test", "-p", "/tmp/proj"]).unwrap();
    assert_eq!(cli.global.project_dir, "/tmp/proj");
}

#[test]
fn test_unknown_subcommand_rejected() {
    assert!(Cli::try_parse_from(["bbt", "deploy"]).is_err());
}
