//! Argument parsing for the trackops command line

use std::path::PathBuf;

use clap::Parser;
use rstest::rstest;

use trackops::cli::args::{
    ConfigCommands, DeadlineCommands, ExportFormat, OppCommands, WbsCommands,
};
use trackops::cli::{Cli, Commands};

fn parse(args: &[&str]) -> Cli {
    Cli::try_parse_from(std::iter::once("trackops").chain(args.iter().copied()))
        .unwrap_or_else(|e| panic!("parse {args:?}: {e}"))
}

#[test]
fn given_no_arguments_when_parsing_then_no_command() {
    let cli = parse(&[]);
    assert!(cli.command.is_none());
    assert_eq!(cli.verbose, 0);
}

#[test]
fn given_global_flags_after_subcommand_when_parsing_then_accepted() {
    let cli = parse(&["wbs", "list", "-vv", "-C", "/tmp/ws"]);
    assert_eq!(cli.verbose, 2);
    assert_eq!(cli.workspace, Some(PathBuf::from("/tmp/ws")));
}

#[test]
fn given_indent_with_times_when_parsing_then_item_and_count() {
    let cli = parse(&["wbs", "indent", "1.2", "--times", "2"]);
    match cli.command {
        Some(Commands::Wbs {
            command: WbsCommands::Indent { item, times },
        }) => {
            assert_eq!(item, "1.2");
            assert_eq!(times, 2);
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn given_child_without_title_when_parsing_then_blank_title() {
    let cli = parse(&["wbs", "child", "1"]);
    match cli.command {
        Some(Commands::Wbs {
            command: WbsCommands::Child { after, title },
        }) => {
            assert_eq!(after, "1");
            assert_eq!(title, "");
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn given_set_with_blank_owner_when_parsing_then_empty_string_kept() {
    let cli = parse(&["wbs", "set", "1.1", "--owner", "", "--status", "done"]);
    match cli.command {
        Some(Commands::Wbs {
            command: WbsCommands::Set { item, fields },
        }) => {
            assert_eq!(item, "1.1");
            assert_eq!(fields.owner.as_deref(), Some(""));
            assert_eq!(fields.status.as_deref(), Some("done"));
            assert_eq!(fields.due, None);
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[rstest]
#[case(&["wbs", "export"], ExportFormat::Csv)]
#[case(&["wbs", "export", "-f", "ics"], ExportFormat::Ics)]
fn test_export_format(#[case] args: &[&str], #[case] expected: ExportFormat) {
    match parse(args).command {
        Some(Commands::Wbs {
            command: WbsCommands::Export { format, output },
        }) => {
            assert_eq!(format, expected);
            assert_eq!(output, None);
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn given_keys_when_parsing_then_all_collected_in_order() {
    let cli = parse(&["wbs", "keys", "--at", "2", "enter", "tab", "-t", "Debrief"]);
    match cli.command {
        Some(Commands::Wbs {
            command: WbsCommands::Keys { at, title, keys },
        }) => {
            assert_eq!(at.as_deref(), Some("2"));
            assert_eq!(title.as_deref(), Some("Debrief"));
            assert_eq!(keys, vec!["enter", "tab"]);
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn given_keys_without_any_key_when_parsing_then_error() {
    assert!(Cli::try_parse_from(["trackops", "wbs", "keys"]).is_err());
}

#[test]
fn given_deadline_add_when_parsing_then_tags_split_and_category_defaulted() {
    let cli = parse(&[
        "deadline", "add", "SBIR Phase I", "-d", "2025-10-01", "-t", "SBIR,Air Force",
    ]);
    match cli.command {
        Some(Commands::Deadline {
            command:
                DeadlineCommands::Add {
                    title,
                    date,
                    category,
                    url,
                    tags,
                },
        }) => {
            assert_eq!(title, "SBIR Phase I");
            assert_eq!(date, "2025-10-01");
            assert_eq!(category, "govcon");
            assert_eq!(url, None);
            assert_eq!(tags, vec!["SBIR", "Air Force"]);
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn given_deadline_add_without_date_when_parsing_then_error() {
    assert!(Cli::try_parse_from(["trackops", "deadline", "add", "Beta"]).is_err());
}

#[test]
fn given_ics_with_ids_when_parsing_then_ids_and_wbs_flag() {
    let cli = parse(&["deadline", "ics", "ab12", "cd34", "--with-wbs", "-o", "plan.ics"]);
    match cli.command {
        Some(Commands::Deadline {
            command:
                DeadlineCommands::Ics {
                    ids,
                    with_wbs,
                    output,
                },
        }) => {
            assert_eq!(ids, vec!["ab12", "cd34"]);
            assert!(with_wbs);
            assert_eq!(output, Some(PathBuf::from("plan.ics")));
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn given_opp_list_filters_when_parsing_then_all_captured() {
    let cli = parse(&["opp", "list", "--all", "-q", "autonomy", "--naics", "541715"]);
    match cli.command {
        Some(Commands::Opp {
            command:
                OppCommands::List {
                    all,
                    query,
                    naics,
                    agency,
                    ..
                },
        }) => {
            assert!(all);
            assert_eq!(query.as_deref(), Some("autonomy"));
            assert_eq!(naics.as_deref(), Some("541715"));
            assert_eq!(agency, None);
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn given_config_init_global_when_parsing_then_flag_set() {
    match parse(&["config", "init", "--global"]).command {
        Some(Commands::Config {
            command: ConfigCommands::Init { global },
        }) => assert!(global),
        other => panic!("unexpected {other:?}"),
    }
}
