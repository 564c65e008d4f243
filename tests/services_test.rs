//! Service round trips against JSON stores in a temporary data directory
//!
//! Every service call loads its store, applies one change and saves, so
//! each assertion below also checks persistence.

use std::sync::Arc;

use chrono::NaiveDate;
use tempfile::TempDir;

use trackops::application::{
    ApplicationError, OpportunityService, OutlineService, PlannerService,
};
use trackops::config::Settings;
use trackops::domain::{
    parse_date, Category, DomainError, ItemPatch, Key, NewDeadline, OpportunityFilter,
    OpportunitySource, Priority, Status,
};
use trackops::infrastructure::traits::RealFileSystem;
use trackops::util::testing::{init_test_setup, temp_settings};

fn date(s: &str) -> NaiveDate {
    parse_date(s).unwrap()
}

fn services(settings: Settings) -> (OutlineService, PlannerService, OpportunityService) {
    let fs = Arc::new(RealFileSystem);
    let settings = Arc::new(settings);
    (
        OutlineService::new(fs.clone(), settings.clone()),
        PlannerService::new(fs.clone(), settings.clone()),
        OpportunityService::new(fs, settings),
    )
}

// ============================================================
// OutlineService
// ============================================================

#[test]
fn given_empty_data_dir_when_init_template_then_outline_saved() {
    init_test_setup();
    let (dir, settings) = temp_settings();
    let (outline, _, _) = services(settings);

    assert!(outline.init_template().unwrap());
    assert!(!outline.init_template().unwrap(), "second init is a no-op");

    let rows = outline.rows().unwrap();
    assert_eq!(rows.len(), 5);
    assert_eq!(rows[3].number, "1.2.1");
    assert!(dir.path().join("outline.json").exists());
}

#[test]
fn given_dotted_number_when_inserting_child_then_new_item_numbered_under_it() {
    let (_dir, settings) = temp_settings();
    let (outline, _, _) = services(settings);
    outline.init_template().unwrap();

    outline.insert_after("1.2.1", "Interfaces", false).unwrap();
    outline.insert_after("2", "Upload", true).unwrap();

    let rows = outline.rows().unwrap();
    let numbered: Vec<(String, String)> = rows
        .into_iter()
        .map(|r| (r.number, r.title))
        .collect();
    assert_eq!(numbered[4], ("1.2.2".to_string(), "Interfaces".to_string()));
    assert_eq!(numbered[6], ("2.1".to_string(), "Upload".to_string()));
}

#[test]
fn given_unknown_reference_when_removing_then_not_found_error() {
    let (_dir, settings) = temp_settings();
    let (outline, _, _) = services(settings);
    outline.init_template().unwrap();

    let err = outline.remove("7.7").unwrap_err();

    assert!(matches!(
        err,
        ApplicationError::Domain(DomainError::ItemNotFound(_))
    ));
    assert_eq!(outline.rows().unwrap().len(), 5);
}

#[test]
fn given_unknown_anchor_when_inserting_then_not_found_and_nothing_saved() {
    let (_dir, settings) = temp_settings();
    let (outline, _, _) = services(settings);
    outline.init_template().unwrap();

    let err = outline.insert_after("9.9", "Ghost", true).unwrap_err();

    assert!(matches!(
        err,
        ApplicationError::Domain(DomainError::ItemNotFound(_))
    ));
    let rows = outline.rows().unwrap();
    assert_eq!(rows.len(), 5);
    assert!(rows.iter().all(|r| !r.id.is_empty() && r.title != "Ghost"));
}

#[test]
fn given_lower_max_level_in_config_when_loading_then_deep_items_clamped() {
    let (_dir, settings) = temp_settings();
    let data_dir = settings.data_dir.clone();
    let (outline, _, _) = services(settings);
    outline.init_template().unwrap();

    let mut shallow = Settings {
        data_dir,
        ..Settings::default()
    };
    shallow.outline.max_level = 1;
    let (outline, _, _) = services(shallow);

    let levels: Vec<usize> = outline.rows().unwrap().iter().map(|r| r.level).collect();
    assert_eq!(levels, vec![0, 1, 1, 1, 0]);
}

#[test]
fn given_stored_negative_and_deep_levels_when_loading_then_clamped() {
    let (dir, settings) = temp_settings();
    std::fs::write(
        dir.path().join("outline.json"),
        r#"{"items":[{"id":"a","title":"A","level":-1},{"id":"b","title":"B","level":9}],"max_level":5}"#,
    )
    .unwrap();
    let (outline, _, _) = services(settings);

    let rows = outline.rows().unwrap();

    assert_eq!(rows[0].level, 0);
    assert_eq!(rows[1].level, 5);
    assert_eq!(rows[1].number, "1.1");
}

#[test]
fn given_field_patch_when_updating_then_persisted() {
    let (_dir, settings) = temp_settings();
    let (outline, _, _) = services(settings);
    outline.init_template().unwrap();

    outline
        .update(
            "1.1",
            &ItemPatch {
                owner: Some(Some("dana".into())),
                due: Some(Some(date("2025-06-01"))),
                priority: Some(Priority::P0),
                ..ItemPatch::default()
            },
        )
        .unwrap();

    let row = &outline.rows().unwrap()[1];
    assert_eq!(row.owner.as_deref(), Some("dana"));
    assert_eq!(row.due, Some(date("2025-06-01")));
    assert_eq!(row.priority, Priority::P0);
}

#[test]
fn given_keys_when_replayed_then_editor_contract_applied() {
    let (_dir, settings) = temp_settings();
    let (outline, _, _) = services(settings);
    outline.init_template().unwrap();

    let focus = outline
        .apply_keys(Some("2"), &[Key::Enter, Key::Tab], Some("Lessons learned"))
        .unwrap()
        .expect("new item has focus");

    let rows = outline.rows().unwrap();
    assert_eq!(rows.len(), 6);
    assert_eq!(rows[5].id, focus);
    assert_eq!(rows[5].number, "2.1");
    assert_eq!(rows[5].title, "Lessons learned");
}

#[test]
fn given_tsv_block_when_pasting_then_owner_and_due_written() {
    let (_dir, settings) = temp_settings();
    let (outline, _, _) = services(settings);
    outline.init_template().unwrap();

    let written = outline.paste(1, 1, "ana\t2025-07-01\nbo\tsoon\n").unwrap();

    assert_eq!(written, 4);
    let rows = outline.rows().unwrap();
    assert_eq!(rows[1].owner.as_deref(), Some("ana"));
    assert_eq!(rows[1].due, Some(date("2025-07-01")));
    assert_eq!(rows[2].owner.as_deref(), Some("bo"));
    assert_eq!(rows[2].due, None, "unparseable date leaves field unchanged");
}

#[test]
fn given_padded_titles_when_pasting_elsewhere_then_titles_kept_verbatim() {
    let (_dir, settings) = temp_settings();
    let (outline, _, _) = services(settings);
    outline.add_row("  Draft  ").unwrap();
    outline.add_row("B").unwrap();

    outline.paste(1, 1, "lee").unwrap();

    let rows = outline.rows().unwrap();
    assert_eq!(rows[0].title, "  Draft  ");
    assert_eq!(rows[1].owner.as_deref(), Some("lee"));
}

#[test]
fn given_csv_file_when_importing_wbs_then_defaults_applied_and_appended() {
    let (dir, settings) = temp_settings();
    let (outline, _, _) = services(settings);
    let file = dir.path().join("wbs.csv");
    std::fs::write(
        &file,
        "Number,Title,Owner,Due,Status,Priority\n\
         1,Volume I,,,,\n\
         1.1,Approach,lee,2025-05-05,done,P1\n\
         ,Loose end,,,,\n",
    )
    .unwrap();

    let added = outline.import(&file).unwrap();

    assert_eq!(added, 3);
    let rows = outline.rows().unwrap();
    assert_eq!(rows[0].status, Status::NotStarted);
    assert_eq!(rows[0].priority, Priority::P2);
    assert_eq!(rows[1].number, "1.1");
    assert_eq!(rows[1].status, Status::Done);
    assert_eq!(rows[2].level, 0);
}

#[test]
fn given_outline_when_exporting_csv_then_header_and_numbers() {
    let (_dir, settings) = temp_settings();
    let (outline, _, _) = services(settings);
    outline.init_template().unwrap();

    let csv = outline.export_csv().unwrap();

    assert!(csv.starts_with("number,title,owner,due,status,priority\n1,Proposal,"));
    assert!(csv.contains("\n2,Submission,,,not-started,P2\n"));
}

// ============================================================
// PlannerService
// ============================================================

fn add(planner: &PlannerService, title: &str, on: &str, category: Category) -> String {
    planner
        .add(NewDeadline {
            title: title.into(),
            date: Some(date(on)),
            category,
            ..NewDeadline::default()
        })
        .unwrap()
        .expect("valid deadline")
}

#[test]
fn given_deadlines_when_planning_then_grouped_by_month_in_order() {
    let (_dir, settings) = temp_settings();
    let (_, planner, _) = services(settings);
    add(&planner, "Board deck", "2025-03-20", Category::Fundraise);
    add(&planner, "Beta", "2025-02-02", Category::Product);
    add(&planner, "SBIR", "2025-02-28", Category::Govcon);

    let months = planner.by_month().unwrap();

    let labels: Vec<&str> = months.iter().map(|(m, _)| m.as_str()).collect();
    assert_eq!(labels, vec!["February 2025", "March 2025"]);
    assert_eq!(months[0].1[0].title, "Beta");
    assert_eq!(months[0].1[1].title, "SBIR");
}

#[test]
fn given_blank_title_when_adding_deadline_then_ignored() {
    let (_dir, settings) = temp_settings();
    let (_, planner, _) = services(settings);

    let id = planner
        .add(NewDeadline {
            title: "  ".into(),
            date: Some(date("2025-01-01")),
            ..NewDeadline::default()
        })
        .unwrap();

    assert!(id.is_none());
    assert!(planner.load().unwrap().is_empty());
}

#[test]
fn given_deadlines_when_summarizing_then_counts_horizon_and_categories() {
    let (_dir, settings) = temp_settings();
    let (_, planner, _) = services(settings);
    add(&planner, "Past", "2025-01-01", Category::Product);
    add(&planner, "Soon", "2025-01-20", Category::Govcon);
    add(&planner, "Later", "2025-04-01", Category::Product);

    let summary = planner.summary(date("2025-01-10")).unwrap();

    assert_eq!(summary.total, 3);
    assert_eq!(summary.due_soon, 1);
    assert_eq!(summary.categories, vec![Category::Product, Category::Govcon]);
}

#[test]
fn given_new_deadline_when_added_then_configured_reminders_attached() {
    let (_dir, mut settings) = temp_settings();
    settings.planner.default_reminders = vec![-14, -2];
    let (_, planner, _) = services(settings);

    add(&planner, "Proposal due", "2025-05-01", Category::Govcon);

    assert_eq!(planner.load().unwrap().all()[0].reminders, vec![-14, -2]);
}

#[test]
fn given_selected_deadline_when_exporting_ics_then_only_that_event() {
    let (_dir, settings) = temp_settings();
    let (outline, planner, _) = services(settings);
    let keep = add(&planner, "Keep", "2025-02-01", Category::Govcon);
    add(&planner, "Skip", "2025-02-02", Category::Govcon);
    outline.init_template().unwrap();
    outline
        .update(
            "2",
            &ItemPatch {
                due: Some(Some(date("2025-02-10"))),
                ..ItemPatch::default()
            },
        )
        .unwrap();
    let stamp = date("2025-01-01").and_hms_opt(0, 0, 0).unwrap();

    let ics = planner
        .export_ics(&[keep[..8].to_string()], Some(&outline), stamp)
        .unwrap()
        .expect("calendar");

    assert_eq!(ics.matches("BEGIN:VEVENT").count(), 2);
    assert!(ics.contains("SUMMARY:Keep [GovCon]"));
    assert!(ics.contains("SUMMARY:2 Submission"));
    assert!(!ics.contains("Skip"));
}

#[test]
fn given_no_deadlines_when_exporting_ics_then_nothing() {
    let (_dir, settings) = temp_settings();
    let (_, planner, _) = services(settings);
    let stamp = date("2025-01-01").and_hms_opt(0, 0, 0).unwrap();
    assert_eq!(planner.export_ics(&[], None, stamp).unwrap(), None);
}

// ============================================================
// OpportunityService
// ============================================================

const OPPS_CSV: &str = "title,agency,source,topic,naics,keywords,url,due,tags\n\
AFWERX Open Topic,USAF,AFWERX,Open Topic,541715|541330,SBIR;autonomy,https://a.test,2025-10-01,SBIR|Air Force\n\
Navy Sensors,USN,DSIP,Sensing,334511,sonar,,not-a-date,Navy\n";

fn import_opps(dir: &TempDir, opps: &OpportunityService) -> usize {
    let file = dir.path().join("opps.csv");
    std::fs::write(&file, OPPS_CSV).unwrap();
    opps.import(&file, date("2025-01-01")).unwrap()
}

#[test]
fn given_csv_when_importing_opportunities_then_lists_split_and_defaults_applied() {
    let (dir, settings) = temp_settings();
    let (_, _, opps) = services(settings);

    assert_eq!(import_opps(&dir, &opps), 2);

    let all = opps.relevant(&OpportunityFilter::default(), true).unwrap();
    assert_eq!(all[0].naics, vec!["541715", "541330"]);
    assert_eq!(all[0].keywords, vec!["SBIR", "autonomy"]);
    assert_eq!(all[0].source, OpportunitySource::Afwerx);
    assert!(all[0].id.starts_with("csv-") && all[0].id.ends_with("-0"));
    assert_eq!(all[1].due, date("2025-03-02"));
    assert_eq!(all[1].url, None);
}

#[test]
fn given_second_import_when_listing_then_new_batch_comes_first() {
    let (dir, settings) = temp_settings();
    let (_, _, opps) = services(settings);
    import_opps(&dir, &opps);
    let file = dir.path().join("more.csv");
    std::fs::write(&file, "title\nFresh\n").unwrap();
    opps.import(&file, date("2025-01-01")).unwrap();

    let all = opps.relevant(&OpportunityFilter::default(), true).unwrap();

    assert_eq!(all.len(), 3);
    assert_eq!(all[0].title, "Fresh");
}

#[test]
fn given_company_profile_when_filtering_then_only_matching_opportunities() {
    let (dir, mut settings) = temp_settings();
    settings.company.keywords = vec!["Autonomy".into()];
    let (_, _, opps) = services(settings);
    import_opps(&dir, &opps);

    let relevant = opps.relevant(&OpportunityFilter::default(), false).unwrap();
    assert_eq!(relevant.len(), 1);
    assert_eq!(relevant[0].agency, "USAF");

    let filter = OpportunityFilter {
        query: Some("sens".into()),
        ..OpportunityFilter::default()
    };
    assert!(opps.relevant(&filter, false).unwrap().is_empty());
    assert_eq!(opps.relevant(&filter, true).unwrap().len(), 1);
}

#[test]
fn given_catalog_when_listing_facets_then_distinct_values_in_first_seen_order() {
    let (dir, settings) = temp_settings();
    let (_, _, opps) = services(settings);
    import_opps(&dir, &opps);

    let facets = opps.facets().unwrap();

    assert_eq!(facets.agencies, vec!["USAF", "USN"]);
    assert_eq!(facets.naics, vec!["541715", "541330", "334511"]);
    assert_eq!(facets.tags, vec!["SBIR", "Air Force", "Navy"]);
}

#[test]
fn given_opportunity_when_tracked_then_govcon_deadline_linked() {
    let (dir, settings) = temp_settings();
    let (_, planner, opps) = services(settings);
    import_opps(&dir, &opps);
    let first = opps.relevant(&OpportunityFilter::default(), true).unwrap()[0].clone();

    opps.track(&first.id, &planner).unwrap();

    let book = planner.load().unwrap();
    let deadline = &book.all()[0];
    assert_eq!(deadline.category, Category::Govcon);
    assert_eq!(deadline.date, date("2025-10-01"));
    assert_eq!(deadline.from_opportunity_id.as_deref(), Some(first.id.as_str()));
    assert_eq!(deadline.source.as_deref(), Some("AFWERX"));
}
