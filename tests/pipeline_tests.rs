//! Pipeline and CLI integration tests.
//!
//! These tests exercise snapshot loading, the save sink and the CLI command
//! handlers with the fixture project.

use opossum_tools::cli::{
    LocateConfig, PanelsConfig, UrlConfig, run_locate, run_panels, run_url,
};
use opossum_tools::config::{AppConfig, OutputFormat};
use opossum_tools::filters::{ActiveFilters, Filter, SelectedCriticality, SortOption};
use opossum_tools::model::SaveFileArgs;
use opossum_tools::pipeline::{
    JsonFileSink, LinkCheck, exit_codes, link_problems, load_file_content, parse_file_content_str,
};
use opossum_tools::{AppState, OpossumError, SaveScope};
use pretty_assertions::assert_eq;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

// ============================================================================
// Test Fixtures
// ============================================================================

const FIXTURES_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures");

fn fixture_path(name: &str) -> PathBuf {
    Path::new(FIXTURES_DIR).join(name)
}

const DANGLING: &str = r#"{
    "resources": {"a.js": 1},
    "manualAttributions": {
        "attributions": {"m1": {"packageName": "react"}},
        "resourcesToAttributions": {"/a.js": ["m1", "m-gone"], "/b.js": ["m1"]}
    }
}"#;

/// App config writing output of `format` into `dir/out`.
fn app(dir: &TempDir, format: OutputFormat) -> AppConfig {
    AppConfig::builder()
        .output_format(format)
        .output_file(Some(dir.path().join("out")))
        .build()
}

fn read_out(dir: &TempDir) -> String {
    std::fs::read_to_string(dir.path().join("out")).expect("output written")
}

fn read_json(dir: &TempDir) -> Value {
    serde_json::from_str(&read_out(dir)).expect("valid JSON output")
}

// ============================================================================
// Loading
// ============================================================================

mod load {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn fixture_loads_strictly() {
        let content = load_file_content(&fixture_path("project.json"), LinkCheck::Strict)
            .expect("fixture should load");
        assert_eq!(content.metadata.project_id, "demo-project");
        assert_eq!(content.resources.file_count(), 5);
        assert_eq!(content.manual_attributions.attributions.len(), 2);
        assert_eq!(content.external_attributions.attributions.len(), 4);
        assert!(content.attribution_breakpoints.contains("/src/vendor/"));
        assert!(link_problems(&content).is_empty());
    }

    #[test]
    fn strict_check_rejects_dangling_links() {
        let err = parse_file_content_str(DANGLING, LinkCheck::Strict).unwrap_err();
        assert!(matches!(err, OpossumError::Load { .. }), "got {err:?}");
        assert!(err.to_string().contains("checking links"));
    }

    #[test]
    fn lenient_check_drops_unknown_attributions_in_the_store() {
        let content = parse_file_content_str(DANGLING, LinkCheck::Lenient).expect("lenient");
        assert_eq!(link_problems(&content).len(), 2);

        let mut state = AppState::new();
        state.load_from_file(content);
        let manual = state.resource_state().manual_data();
        assert_eq!(manual.attribution_ids_of("/a.js"), ["m1"]);
        assert!(!manual.contains("m-gone"));
        assert!(manual.is_consistent());
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = load_file_content(&fixture_path("missing.json"), LinkCheck::Lenient).unwrap_err();
        assert!(matches!(err, OpossumError::Io { .. }), "got {err:?}");
    }

    #[test]
    fn malformed_json_is_rejected() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("broken.json");
        std::fs::write(&path, "{\"resources\": ").unwrap();
        let err = load_file_content(&path, LinkCheck::Lenient).unwrap_err();
        assert!(err.to_string().contains("broken.json"), "got {err}");
    }
}

// ============================================================================
// Save sink
// ============================================================================

mod sink {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn saving_writes_the_payload() {
        let tmp = TempDir::new().unwrap();
        let target = tmp.path().join("saved.json");
        let content = load_file_content(&fixture_path("project.json"), LinkCheck::Strict).unwrap();

        let mut state = AppState::new().with_sink(JsonFileSink::new(&target));
        state.load_from_file(content);
        state.set_selected_resource_id_or_open_unsaved_popup("/README.md");
        state.edit_temporary_display_package_info(|info| {
            info.license_name = Some("MIT".to_string());
            info.package_name = Some("demo".to_string());
        });
        assert!(state.save(SaveScope::SelectedResource).is_saved());
        state.resolve_signals(["s-readme"]);

        let saved: SaveFileArgs =
            serde_json::from_str(&std::fs::read_to_string(&target).unwrap()).unwrap();
        assert_eq!(saved.manual_attributions.len(), 3);
        assert_eq!(saved.resources_to_attributions["/README.md"].len(), 1);
        assert!(saved.resolved_external_attributions.contains("s-readme"));
        assert_eq!(saved, state.resource_state().save_file_args());
    }

    #[test]
    fn unwritable_sink_does_not_fail_the_save() {
        let tmp = TempDir::new().unwrap();
        let target = tmp.path().join("missing-dir").join("saved.json");
        let content = load_file_content(&fixture_path("project.json"), LinkCheck::Strict).unwrap();

        let mut state = AppState::new().with_sink(JsonFileSink::new(&target));
        state.load_from_file(content);
        state.set_selected_resource_id_or_open_unsaved_popup("/src/main.rs");
        state.edit_temporary_display_package_info(|info| info.follow_up = true);

        assert!(state.save(SaveScope::Globally).is_saved());
        assert!(!target.exists());
        assert!(
            state
                .resource_state()
                .manual_data()
                .get("m-serde")
                .is_some_and(|record| record.follow_up)
        );
    }
}

// ============================================================================
// CLI command handlers
// ============================================================================

mod panels_cmd {
    use super::*;
    use pretty_assertions::assert_eq;

    fn config(dir: &TempDir, resource_id: &str, format: OutputFormat) -> PanelsConfig {
        PanelsConfig {
            file: fixture_path("project.json"),
            resource_id: resource_id.to_string(),
            filters: ActiveFilters::default(),
            sort: None,
            strict: true,
            app: app(dir, format),
            quiet: true,
        }
    }

    fn card_ids(report: &Value, panel: &str) -> Vec<String> {
        report["panels"]
            .as_array()
            .unwrap()
            .iter()
            .find(|p| p["title"] == panel)
            .map(|p| {
                p["cards"]
                    .as_array()
                    .unwrap()
                    .iter()
                    .map(|card| card["attributionId"].as_str().unwrap().to_string())
                    .collect()
            })
            .unwrap_or_default()
    }

    #[test]
    fn file_panels_as_text() {
        let tmp = TempDir::new().unwrap();
        let code = run_panels(config(&tmp, "/src/vendor/zlib/inflate.c", OutputFormat::Text))
            .unwrap();
        assert_eq!(code, exit_codes::SUCCESS);
        assert_eq!(
            read_out(&tmp),
            "Resource: /src/vendor/zlib/inflate.c\n\
             \n\
             Attributions\n  (none)\n\
             \n\
             Signals\n  zlib [Zlib] (2)  <s-zlib-1>"
        );
    }

    #[test]
    fn folder_panels_sorted_by_occurrence() {
        let tmp = TempDir::new().unwrap();
        let mut cfg = config(&tmp, "/src/vendor/", OutputFormat::Json);
        cfg.sort = Some(SortOption::Occurrence);
        run_panels(cfg).unwrap();

        let report = read_json(&tmp);
        assert_eq!(report["resourceId"], "/src/vendor/");
        assert_eq!(
            card_ids(&report, "Signals in Folder Content"),
            ["s-zlib-1", "s-openssl", "s-zlib-2"]
        );
        assert_eq!(report["panels"][1]["cards"][0]["count"], 2);
        assert!(card_ids(&report, "Attributions in Folder Content").is_empty());
    }

    #[test]
    fn folder_panels_sorted_by_name() {
        let tmp = TempDir::new().unwrap();
        run_panels(config(&tmp, "/src/", OutputFormat::Json)).unwrap();

        let report = read_json(&tmp);
        assert_eq!(
            card_ids(&report, "Signals in Folder Content"),
            ["s-openssl", "s-zlib-1", "s-zlib-2"]
        );
        assert_eq!(
            card_ids(&report, "Attributions in Folder Content"),
            ["m-serde", "m-tokio"]
        );
    }

    #[test]
    fn filters_and_threshold_apply_to_cards() {
        let tmp = TempDir::new().unwrap();
        let mut cfg = config(&tmp, "/src/vendor/", OutputFormat::Json);
        cfg.filters = [Filter::LowConfidence].into_iter().collect();
        run_panels(cfg.clone()).unwrap();
        assert_eq!(
            card_ids(&read_json(&tmp), "Signals in Folder Content"),
            ["s-openssl"]
        );

        cfg.app.filters.low_confidence_threshold = 30;
        run_panels(cfg).unwrap();
        assert!(card_ids(&read_json(&tmp), "Signals in Folder Content").is_empty());
    }

    #[test]
    fn worker_and_synchronous_runs_agree() {
        let tmp = TempDir::new().unwrap();
        let mut cfg = config(&tmp, "/src/", OutputFormat::Json);
        cfg.app.worker.enabled = false;
        run_panels(cfg.clone()).unwrap();
        let synchronous = read_out(&tmp);

        cfg.app.worker.enabled = true;
        cfg.app.worker.offload_threshold = 1;
        cfg.app.worker.threads = 2;
        run_panels(cfg).unwrap();
        assert_eq!(read_out(&tmp), synchronous);
    }

    #[test]
    fn purl_is_rendered_for_typed_packages() {
        let tmp = TempDir::new().unwrap();
        run_panels(config(&tmp, "/src/main.rs", OutputFormat::Json)).unwrap();
        let report = read_json(&tmp);
        assert_eq!(
            report["attributions"][0]["purl"],
            "pkg:cargo/serde@1.0.210"
        );
    }

    #[test]
    fn unknown_resource_fails() {
        let tmp = TempDir::new().unwrap();
        assert!(run_panels(config(&tmp, "/src/nope.rs", OutputFormat::Text)).is_err());
    }
}

mod locate_cmd {
    use super::*;
    use pretty_assertions::assert_eq;

    fn config(dir: &TempDir) -> LocateConfig {
        LocateConfig {
            file: fixture_path("project.json"),
            criticality: SelectedCriticality::Any,
            licenses: Vec::new(),
            search_term: None,
            license_only: false,
            strict: true,
            app: app(dir, OutputFormat::Text),
            quiet: true,
        }
    }

    #[test]
    fn high_criticality_lists_files() {
        let tmp = TempDir::new().unwrap();
        let code = run_locate(LocateConfig {
            criticality: SelectedCriticality::High,
            ..config(&tmp)
        })
        .unwrap();
        assert_eq!(code, exit_codes::SUCCESS);
        assert_eq!(
            read_out(&tmp),
            "/src/vendor/zlib/deflate.c\n/src/vendor/zlib/inflate.c"
        );
    }

    #[test]
    fn json_output_includes_ancestors() {
        let tmp = TempDir::new().unwrap();
        let mut cfg = LocateConfig {
            licenses: vec!["Apache License 2.0".to_string()],
            ..config(&tmp)
        };
        cfg.app.output.format = OutputFormat::Json;
        run_locate(cfg).unwrap();

        let located = read_json(&tmp);
        assert_eq!(
            located["locatedResources"],
            serde_json::json!(["/src/vendor/zlib/deflate.c"])
        );
        assert_eq!(
            located["resourcesWithLocatedChildren"],
            serde_json::json!(["/", "/src/", "/src/vendor/", "/src/vendor/zlib/"])
        );
    }

    #[test]
    fn nothing_located_is_no_match() {
        let tmp = TempDir::new().unwrap();
        let code = run_locate(LocateConfig {
            search_term: Some("left-pad".to_string()),
            ..config(&tmp)
        })
        .unwrap();
        assert_eq!(code, exit_codes::NO_MATCH);
        assert_eq!(read_out(&tmp), "No resources located");
    }

    #[test]
    fn empty_query_is_rejected() {
        let tmp = TempDir::new().unwrap();
        assert!(run_locate(config(&tmp)).is_err());
    }
}

mod url_cmd {
    use super::*;
    use pretty_assertions::assert_eq;

    fn config(dir: &TempDir, resource_id: &str) -> UrlConfig {
        UrlConfig {
            file: fixture_path("project.json"),
            resource_id: resource_id.to_string(),
            open: false,
            strict: true,
            app: app(dir, OutputFormat::Text),
            quiet: true,
        }
    }

    #[test]
    fn closest_base_url_wins() {
        let tmp = TempDir::new().unwrap();
        run_url(config(&tmp, "/src/vendor/zlib/inflate.c")).unwrap();
        assert_eq!(
            read_out(&tmp),
            "https://github.com/madler/zlib/blob/master/inflate.c"
        );

        run_url(config(&tmp, "/src/main.rs")).unwrap();
        assert_eq!(
            read_out(&tmp),
            "https://github.com/acme/demo/blob/main/src/main.rs"
        );
    }

    #[test]
    fn breakpoint_without_url_has_none() {
        let tmp = TempDir::new().unwrap();
        let code = run_url(config(&tmp, "/src/vendor/")).unwrap();
        assert_eq!(code, exit_codes::NO_MATCH);
        assert_eq!(read_out(&tmp), "No URL for /src/vendor/");
    }
}
