//! Tests for change note parsing and parent PR body maintenance

use nimbus::release_notes::parent_pr::append_unaggregated_link;
use nimbus::release_notes::parser::default_parsers;
use nimbus::release_notes::UNAGGREGATED_HEADER;

use crate::common::merged_pull;

const ISSUES_URL: &str = "https://github.com/TestOwner/TestRepo/issues";

// =============================================================================
// PARSER STACK TESTS
// =============================================================================

#[test]
fn test_default_parsers_assemble_sections_in_order() {
    let pulls = vec![
        merged_pull(
            10,
            "feature/alpha",
            "main",
            "# Critical Changes\nOld tags are gone\n\n# Changes\nFaster parsing",
        ),
        merged_pull(11, "feature/beta", "main", "# Changes\nNew retry knobs\n\n# Issues Closed\nFixes #17"),
    ];

    let mut parsers = default_parsers(false, ISSUES_URL);
    for pull in &pulls {
        for parser in &mut parsers {
            parser.parse(pull);
        }
    }
    let sections: Vec<String> = parsers.iter().filter_map(|p| p.render()).collect();
    let document = sections.join("\n\n");

    let critical = document.find("# Critical Changes").unwrap();
    let changes = document.find("# Changes").unwrap();
    let issues = document.find("# Issues Closed").unwrap();
    assert!(critical < changes && changes < issues);

    assert!(document.contains("Old tags are gone"));
    assert!(document.contains("Faster parsing\nNew retry knobs"));
    assert!(document.contains(&format!("- [#17]({ISSUES_URL}/17)")));
}

#[test]
fn test_default_parsers_link_lines_back_to_pulls() {
    let pull = merged_pull(12, "feature/gamma", "main", "# Changes\nShinier output");

    let mut parsers = default_parsers(true, ISSUES_URL);
    for parser in &mut parsers {
        parser.parse(&pull);
    }
    let changes = parsers.iter().find_map(|p| p.render()).unwrap();

    assert_eq!(
        changes,
        "# Changes\n\nShinier output [[PR12](https://github.com/TestOwner/TestRepo/pull/12)]"
    );
}

#[test]
fn test_parsers_skip_notes_without_matching_sections() {
    let pull = merged_pull(13, "feature/docs", "main", "Just a plain description, no headings.");

    let mut parsers = default_parsers(false, ISSUES_URL);
    for parser in &mut parsers {
        parser.parse(&pull);
    }
    assert!(parsers.iter().all(|p| p.render().is_none()));
}

// =============================================================================
// PARENT PR BODY TESTS
// =============================================================================

#[test]
fn test_unaggregated_section_grows_one_link_at_a_time() {
    let first = merged_pull(20, "feature/big__part-one", "feature/big", "# Changes\nPart one");
    let second = merged_pull(21, "feature/big__part-two", "feature/big", "# Changes\nPart two");

    let body = append_unaggregated_link("", &first.markdown_link()).unwrap();
    let body = append_unaggregated_link(&body, &second.markdown_link()).unwrap();

    assert_eq!(body.matches(UNAGGREGATED_HEADER).count(), 1);
    assert!(body.contains("* PR 20 [[PR20]("));
    assert!(body.contains("* PR 21 [[PR21]("));
}

#[test]
fn test_unaggregated_section_preserves_human_written_body() {
    let child = merged_pull(22, "feature/big__part-three", "feature/big", "# Changes\nPart three");
    let original = "This PR tracks the big feature.\n\nSee the design doc for details.";

    let body = append_unaggregated_link(original, &child.markdown_link()).unwrap();

    assert!(body.starts_with(original));
    assert!(body.contains(UNAGGREGATED_HEADER));
}

#[test]
fn test_recording_the_same_child_twice_is_a_no_op() {
    let child = merged_pull(23, "feature/big__part-four", "feature/big", "# Changes\nPart four");

    let body = append_unaggregated_link("", &child.markdown_link()).unwrap();
    assert_eq!(append_unaggregated_link(&body, &child.markdown_link()), None);
}
