//! Regex search integration tests.

use anyhow::Result;
use fuzzy_span::regex_search::{ApproxLiteral, CompiledPattern, PatternError};
use fuzzy_span::{Document, FuzzyCounts, MatchError, RegexConfig, RegexMatch, RegexSearcher};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}

fn contact_doc() -> Result<Document> {
    let words = [
        "Call", "(", "555", ")", "555", "-", "5555", "or", "mail", "jane.doe@example.com",
        "from", "192.168.0.1", ".",
    ];
    let spaces = [
        true, false, false, true, false, false, true, true, true, true, true, false, false,
    ];
    Ok(Document::from_words(&words, &spaces)?)
}

fn spans(matches: &[RegexMatch]) -> Vec<(usize, usize)> {
    matches.iter().map(|m| (m.start, m.end)).collect()
}

#[test]
fn test_predefined_patterns_over_document() -> Result<()> {
    init_tracing();
    let doc = contact_doc()?;
    assert_eq!(
        doc.text(),
        "Call (555) 555-5555 or mail jane.doe@example.com from 192.168.0.1."
    );

    let searcher = RegexSearcher::new();
    let phones = searcher.find_matches(&doc, "phones", true, true)?;
    assert_eq!(spans(&phones), vec![(1, 7)]);
    let emails = searcher.find_matches(&doc, "emails", true, true)?;
    assert_eq!(spans(&emails), vec![(9, 10)]);
    let ips = searcher.find_matches(&doc, "ips", true, true)?;
    assert_eq!(spans(&ips), vec![(11, 12)]);
    Ok(())
}

#[test]
fn test_literal_pattern_with_inline_flags() -> Result<()> {
    let doc = contact_doc()?;
    let matches = RegexSearcher::new().find_matches(&doc, "(?i)CALL", false, false)?;
    assert_eq!(matches, vec![RegexMatch::new(0, 1, FuzzyCounts::default())]);
    Ok(())
}

#[test]
fn test_custom_library_entry() -> Result<()> {
    let config = RegexConfig::empty().with_pattern("mail_verbs", r"\b(?:mail|call)\b");
    let searcher = RegexSearcher::with_config(config);
    let matches = searcher.find_matches(&contact_doc()?, "mail_verbs", false, true)?;
    assert_eq!(spans(&matches), vec![(8, 9)]);

    let err = searcher
        .find_matches(&contact_doc()?, "phones", false, true)
        .expect_err("not in the custom library");
    assert!(matches!(err, MatchError::UnknownPredefinedPattern { name } if name == "phones"));
    Ok(())
}

#[test]
fn test_approximate_match_reports_counts() -> Result<()> {
    init_tracing();
    let doc = Document::from_words(
        &["Patient", "was", "prescribed", "Zithromx", "daily"],
        &[true, true, true, true, false],
    )?;
    let matches =
        RegexSearcher::new().find_matches(&doc, "(?i)(?:zithromax){e<=2}", true, false)?;
    assert_eq!(matches, vec![RegexMatch::new(3, 4, FuzzyCounts::new(0, 0, 1))]);
    Ok(())
}

#[test]
fn test_embedded_fuzzy_constraint_is_a_compile_error() -> Result<()> {
    let doc = Document::from_words(&["brwn", "fox"], &[true, false])?;
    let searcher = RegexSearcher::new();
    for pattern in [r"(?:brown){e<=1}\s+fox", "(?:brown){s<=1,d<=1}"] {
        let err = searcher
            .find_matches(&doc, pattern, true, false)
            .expect_err("constraint the engines cannot honour");
        assert!(
            matches!(
                err,
                MatchError::RegexCompile {
                    source: PatternError::UnsupportedFuzzyConstraint,
                    ..
                }
            ),
            "{pattern}: {err}"
        );
    }

    let whole = searcher.find_matches(&doc, "(?:brown){e<=1}", true, false)?;
    assert_eq!(whole, vec![RegexMatch::new(0, 1, FuzzyCounts::new(0, 0, 1))]);
    Ok(())
}

#[test]
fn test_find_with_prebuilt_engines() -> Result<()> {
    let doc = Document::from_words(&["brwn", "cow"], &[true, false])?;
    let approx = ApproxLiteral::new("brown", 1, false);
    let matches = RegexSearcher::find_with(&doc, &approx, false)?;
    assert_eq!(matches, vec![RegexMatch::new(0, 1, FuzzyCounts::new(0, 0, 1))]);

    let compiled = CompiledPattern::compile(r"(?<=brwn )cow")?;
    assert!(compiled.is_fancy());
    assert_eq!(spans(&RegexSearcher::find_with(&doc, &compiled, false)?), vec![(1, 2)]);
    Ok(())
}

#[test]
fn test_regex_match_serializes() -> Result<()> {
    let m = RegexMatch::new(3, 4, FuzzyCounts::new(0, 0, 1));
    let json = serde_json::to_value(m)?;
    assert_eq!(json["start"], 3);
    assert_eq!(json["fuzzy_counts"]["deletions"], 1);
    Ok(())
}
