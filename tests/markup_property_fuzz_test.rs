use form_enhancer::{Error, Page};
use proptest::collection::vec;
use proptest::prelude::*;
use proptest::test_runner::{FileFailurePersistence, TestCaseError, TestCaseResult};

const MARKUP_PROPTEST_REGRESSION_FILE: &str =
    "tests/proptest-regressions/markup_property_fuzz_test.txt";
const DEFAULT_MARKUP_PROPTEST_CASES: u32 = 64;

fn markup_proptest_cases() -> u32 {
    std::env::var("FORM_ENHANCER_PROPTEST_CASES")
        .ok()
        .and_then(|raw| raw.parse::<u32>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(DEFAULT_MARKUP_PROPTEST_CASES)
}

fn fragment_strategy() -> BoxedStrategy<String> {
    let leaf = prop_oneof![
        Just("text".to_string()),
        Just("a &amp; b".to_string()),
        Just("&#233;&#x41;".to_string()),
        Just("<br>".to_string()),
        Just("<img src='x.png' data-fallback=''>".to_string()),
        Just("<input name='q' required>".to_string()),
        Just("<!-- note -->".to_string()),
        Just("</div>".to_string()),
        Just("a < b".to_string()),
        Just("<button class='btn-close'>x</button>".to_string()),
        Just("<span data-bs-toggle='tooltip' title='t'>?</span>".to_string()),
        Just("<button data-copy-target='#nope'>c</button>".to_string()),
        Just("<button data-export-csv='[['>e</button>".to_string()),
    ]
    .boxed();

    leaf.prop_recursive(4, 64, 6, |inner| {
        prop_oneof![
            vec(inner.clone(), 0..4).prop_map(|children| format!(
                "<div class='alert show'>{}</div>",
                children.concat()
            )),
            vec(inner.clone(), 0..4).prop_map(|children| format!(
                "<table><thead><tr><th class='sortable'>h</th></tr></thead>\
                 <tbody><tr><td>{}</td></tr><tr><td>0</td></tr></tbody></table>",
                children.concat()
            )),
            vec(inner, 0..4).prop_map(|children| format!(
                "<form class='needs-validation'>{}<button>go</button></form>",
                children.concat()
            )),
        ]
    })
    .boxed()
}

fn document_strategy() -> BoxedStrategy<String> {
    vec(fragment_strategy(), 1..6)
        .prop_map(|fragments| format!("<body>{}</body>", fragments.concat()))
        .boxed()
}

fn fail(err: Error) -> TestCaseError {
    TestCaseError::fail(format!("{err:?}"))
}

fn exercise_document(html: &str) -> TestCaseResult {
    let mut page = match Page::from_html(html) {
        Ok(page) => page,
        Err(Error::HtmlParse(_)) => return Ok(()),
        Err(other) => return Err(fail(other)),
    };

    for selector in ["th.sortable", "button", "input", "img"] {
        let count = page.count(selector).map_err(fail)?;
        if count == 0 {
            continue;
        }
        match selector {
            "input" => page.type_text(selector, "value").map_err(fail)?,
            "img" => page.fail_image(selector).map_err(fail)?,
            _ => page.click(selector).map_err(fail)?,
        }
    }

    page.flush().map_err(fail)?;
    prop_assert!(page.pending_timers().is_empty());
    prop_assert_eq!(page.count(".alert").map_err(fail)?, 0);
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: markup_proptest_cases(),
        failure_persistence: Some(Box::new(
            FileFailurePersistence::Direct(MARKUP_PROPTEST_REGRESSION_FILE),
        )),
        .. ProptestConfig::default()
    })]

    #[test]
    fn generated_markup_loads_and_reacts_without_errors(html in document_strategy()) {
        exercise_document(&html)?;
    }
}
